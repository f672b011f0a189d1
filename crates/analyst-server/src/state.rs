//! Application State

use std::sync::Arc;

use analyst_core::Orchestrator;
use stock_analyst::MarketDataCache;

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    /// The supervisor state machine over the analyst team
    pub orchestrator: Arc<Orchestrator>,

    /// Bounded market data cache (also serves the raw data endpoint)
    pub cache: Arc<MarketDataCache>,
}
