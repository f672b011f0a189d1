//! # analyst-runtime
//!
//! Concrete oracle backends and fallback-chain configuration. Currently
//! one backend exists (Ollama); the `ORACLE_ORDER` environment variable
//! selects which models form the chain and in what order.

pub mod ollama;

use std::sync::Arc;

use analyst_core::oracle::{DecisionChain, GenerationChain};

pub use ollama::{OllamaConfig, OllamaOracle};

/// Comma-separated "provider/model" entries, primary first.
/// Example: `ORACLE_ORDER=ollama/llama3.1,ollama/qwen2.5`
pub const ORACLE_ORDER_VAR: &str = "ORACLE_ORDER";

/// Build the decision and generation chains from `ORACLE_ORDER`.
///
/// Unknown providers are skipped with a warning. When the variable is
/// unset or yields no usable entries, a single Ollama oracle configured
/// from the environment is used.
pub fn chains_from_env() -> (DecisionChain, GenerationChain) {
    let order = std::env::var(ORACLE_ORDER_VAR).unwrap_or_default();
    let oracles = oracles_from_order(&order);

    let decision = DecisionChain::new(
        oracles
            .iter()
            .map(|o| Arc::clone(o) as Arc<dyn analyst_core::oracle::DecisionOracle>)
            .collect(),
    );
    let generation = GenerationChain::new(
        oracles
            .into_iter()
            .map(|o| o as Arc<dyn analyst_core::oracle::GenerationOracle>)
            .collect(),
    );

    (decision, generation)
}

fn oracles_from_order(order: &str) -> Vec<Arc<OllamaOracle>> {
    let mut oracles = Vec::new();

    for entry in order.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match entry.split_once('/') {
            Some(("ollama", model)) if !model.is_empty() => {
                oracles.push(Arc::new(OllamaOracle::with_model(model)));
            }
            _ => {
                tracing::warn!(entry, "unsupported oracle entry skipped");
            }
        }
    }

    if oracles.is_empty() {
        tracing::info!("no oracle order configured, using environment defaults");
        oracles.push(Arc::new(OllamaOracle::from_env()));
    }

    oracles
}
