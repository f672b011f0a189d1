//! Oracle Abstractions
//!
//! The orchestration layer never talks to a concrete language model. It
//! consumes two capabilities:
//!
//! - a **Decision Oracle** returning values from a closed set (intent
//!   classification, supervisor routing), and
//! - a **Generation Oracle** producing assistant turns that may request
//!   tool calls.
//!
//! Both are configured as ordered fallback chains: a failing oracle is
//! retried transparently against the next entry with the same input, so
//! conversational context survives a failover.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::tool::{ToolCall, ToolSchema};

/// Intent classification verdict
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Intent {
    /// True if the query is about finance, stocks, companies or the economy
    pub is_finance: bool,

    /// Brief explanation of why
    #[serde(default)]
    pub reasoning: String,
}

/// One assistant turn produced by a generation oracle
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssistantTurn {
    /// Free-form response text
    pub content: String,

    /// Tool calls requested by the model, in request order
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl AssistantTurn {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Convert into a transcript message
    pub fn into_message(self) -> Message {
        Message::assistant_with_calls(self.content, self.tool_calls)
    }
}

/// Closed-set decision capability (classification and routing)
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    /// Classify whether a first user message is finance-relevant
    async fn classify(&self, query: &str) -> Result<Intent>;

    /// Choose the next actor from `options` given the conversation so far.
    ///
    /// Returns the raw choice string; the supervisor validates membership
    /// and treats out-of-set values as a protocol violation.
    async fn route(&self, messages: &[Message], options: &[&str]) -> Result<String>;

    /// Oracle name, for logs
    fn name(&self) -> &str;
}

/// Free-form generation capability with tool calling
#[async_trait]
pub trait GenerationOracle: Send + Sync {
    /// Produce the next assistant turn for a worker
    async fn generate(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolSchema],
    ) -> Result<AssistantTurn>;

    /// Oracle name, for logs
    fn name(&self) -> &str;
}

/// Ordered fallback chain over decision oracles
pub struct DecisionChain {
    oracles: Vec<Arc<dyn DecisionOracle>>,
}

impl DecisionChain {
    pub fn new(oracles: Vec<Arc<dyn DecisionOracle>>) -> Self {
        Self { oracles }
    }

    pub fn single(oracle: Arc<dyn DecisionOracle>) -> Self {
        Self::new(vec![oracle])
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }
}

#[async_trait]
impl DecisionOracle for DecisionChain {
    async fn classify(&self, query: &str) -> Result<Intent> {
        let mut last_err = None;
        for oracle in &self.oracles {
            match oracle.classify(query).await {
                Ok(intent) => return Ok(intent),
                Err(e) => {
                    tracing::warn!(oracle = oracle.name(), error = %e, "classify failed, trying next");
                    last_err = Some(e);
                }
            }
        }
        Err(exhausted(last_err))
    }

    async fn route(&self, messages: &[Message], options: &[&str]) -> Result<String> {
        let mut last_err = None;
        for oracle in &self.oracles {
            match oracle.route(messages, options).await {
                Ok(choice) => return Ok(choice),
                Err(e) => {
                    tracing::warn!(oracle = oracle.name(), error = %e, "route failed, trying next");
                    last_err = Some(e);
                }
            }
        }
        Err(exhausted(last_err))
    }

    fn name(&self) -> &str {
        "decision-chain"
    }
}

/// Ordered fallback chain over generation oracles
pub struct GenerationChain {
    oracles: Vec<Arc<dyn GenerationOracle>>,
}

impl GenerationChain {
    pub fn new(oracles: Vec<Arc<dyn GenerationOracle>>) -> Self {
        Self { oracles }
    }

    pub fn single(oracle: Arc<dyn GenerationOracle>) -> Self {
        Self::new(vec![oracle])
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }
}

#[async_trait]
impl GenerationOracle for GenerationChain {
    async fn generate(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolSchema],
    ) -> Result<AssistantTurn> {
        let mut last_err = None;
        for oracle in &self.oracles {
            match oracle.generate(system_prompt, messages, tools).await {
                Ok(turn) => return Ok(turn),
                Err(e) => {
                    tracing::warn!(oracle = oracle.name(), error = %e, "generate failed, trying next");
                    last_err = Some(e);
                }
            }
        }
        Err(exhausted(last_err))
    }

    fn name(&self) -> &str {
        "generation-chain"
    }
}

fn exhausted(last_err: Option<AgentError>) -> AgentError {
    match last_err {
        Some(e) => AgentError::OracleUnavailable(e.to_string()),
        None => AgentError::OracleUnavailable("no oracles configured".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Decision oracle that always fails
    struct FailingOracle;

    #[async_trait]
    impl DecisionOracle for FailingOracle {
        async fn classify(&self, _query: &str) -> Result<Intent> {
            Err(AgentError::Oracle("connection refused".into()))
        }

        async fn route(&self, _messages: &[Message], _options: &[&str]) -> Result<String> {
            Err(AgentError::Oracle("connection refused".into()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    /// Decision oracle that records the context it was handed
    struct RecordingOracle {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DecisionOracle for RecordingOracle {
        async fn classify(&self, query: &str) -> Result<Intent> {
            self.seen.lock().unwrap().push(query.to_string());
            Ok(Intent {
                is_finance: true,
                reasoning: String::new(),
            })
        }

        async fn route(&self, messages: &[Message], _options: &[&str]) -> Result<String> {
            for m in messages {
                self.seen.lock().unwrap().push(m.content().to_string());
            }
            Ok("FINISH".into())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    /// Generation oracle that always fails
    struct FailingGen;

    #[async_trait]
    impl GenerationOracle for FailingGen {
        async fn generate(
            &self,
            _system_prompt: &str,
            _messages: &[Message],
            _tools: &[ToolSchema],
        ) -> Result<AssistantTurn> {
            Err(AgentError::Oracle("connection refused".into()))
        }

        fn name(&self) -> &str {
            "failing-gen"
        }
    }

    /// Generation oracle that records the transcript it was handed
    struct RecordingGen {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl GenerationOracle for RecordingGen {
        async fn generate(
            &self,
            system_prompt: &str,
            messages: &[Message],
            _tools: &[ToolSchema],
        ) -> Result<AssistantTurn> {
            let mut seen = self.seen.lock().unwrap();
            seen.push(system_prompt.to_string());
            for m in messages {
                seen.push(m.content().to_string());
            }
            Ok(AssistantTurn::text("backup answer"))
        }

        fn name(&self) -> &str {
            "recording-gen"
        }
    }

    #[tokio::test]
    async fn test_failover_passes_context_unmodified() {
        let backup = Arc::new(RecordingOracle {
            seen: Mutex::new(Vec::new()),
        });
        let chain = DecisionChain::new(vec![Arc::new(FailingOracle), backup.clone()]);

        let messages = vec![Message::user("price of AAPL"), Message::assistant("done")];
        let choice = chain.route(&messages, &["FINISH"]).await.unwrap();

        assert_eq!(choice, "FINISH");
        let seen = backup.seen.lock().unwrap().clone();
        assert_eq!(seen, vec!["price of AAPL".to_string(), "done".to_string()]);
    }

    #[tokio::test]
    async fn test_generation_failover_passes_context_unmodified() {
        let backup = Arc::new(RecordingGen {
            seen: Mutex::new(Vec::new()),
        });
        let chain = GenerationChain::new(vec![Arc::new(FailingGen), backup.clone()]);

        let messages = vec![Message::user("price of AAPL"), Message::assistant("done")];
        let turn = chain.generate("be helpful", &messages, &[]).await.unwrap();

        assert_eq!(turn.content, "backup answer");
        assert!(turn.tool_calls.is_empty());
        let seen = backup.seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                "be helpful".to_string(),
                "price of AAPL".to_string(),
                "done".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_exhausted_chain_is_unavailable() {
        let chain = DecisionChain::new(vec![Arc::new(FailingOracle), Arc::new(FailingOracle)]);
        let err = chain.classify("hello").await.unwrap_err();
        assert!(matches!(err, AgentError::OracleUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_chain_is_unavailable() {
        let chain = DecisionChain::new(Vec::new());
        let err = chain.classify("hello").await.unwrap_err();
        assert!(matches!(err, AgentError::OracleUnavailable(_)));
    }
}
