//! Routing Types
//!
//! The closed set of actors the supervisor may choose from, and the decision
//! type produced on every router invocation.

use serde::{Deserialize, Serialize};

/// Hard cap on orchestration turns per submitted user turn. Once
/// `turn_count` exceeds this the router is bypassed and the session is
/// forced to finish, guaranteeing termination under any oracle.
pub const MAX_TURNS: u32 = 10;

/// The specialist workers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkerKind {
    Technical,
    Sentiment,
    Fundamental,
    Valuation,
    Quant,
}

impl WorkerKind {
    pub const ALL: [WorkerKind; 5] = [
        WorkerKind::Technical,
        WorkerKind::Sentiment,
        WorkerKind::Fundamental,
        WorkerKind::Valuation,
        WorkerKind::Quant,
    ];

    /// Name exposed to the decision oracle
    pub fn as_str(self) -> &'static str {
        match self {
            WorkerKind::Technical => "TechnicalAnalyst",
            WorkerKind::Sentiment => "SentimentAnalyst",
            WorkerKind::Fundamental => "FundamentalAnalyst",
            WorkerKind::Valuation => "ValuationAnalyst",
            WorkerKind::Quant => "QuantAnalyst",
        }
    }

    pub fn parse(value: &str) -> Option<WorkerKind> {
        Self::ALL.iter().copied().find(|k| k.as_str() == value)
    }
}

impl std::fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decision produced by one supervisor invocation; never persisted beyond
/// the current turn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    Dispatch(WorkerKind),
    Finish,
}

/// Token the oracle emits to end the routing loop
pub const FINISH: &str = "FINISH";

impl RouteDecision {
    /// The option set declared to the decision oracle
    pub fn options() -> Vec<&'static str> {
        let mut opts: Vec<&'static str> = WorkerKind::ALL.iter().map(|k| k.as_str()).collect();
        opts.push(FINISH);
        opts
    }

    /// Parse an oracle choice. `None` means the value is outside the
    /// declared option set (a protocol violation).
    pub fn parse(value: &str) -> Option<RouteDecision> {
        if value == FINISH {
            return Some(RouteDecision::Finish);
        }
        WorkerKind::parse(value).map(RouteDecision::Dispatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_are_closed_set() {
        let opts = RouteDecision::options();
        assert_eq!(opts.len(), 6);
        assert!(opts.contains(&"QuantAnalyst"));
        assert!(opts.contains(&FINISH));
    }

    #[test]
    fn test_parse_round_trip() {
        for kind in WorkerKind::ALL {
            assert_eq!(
                RouteDecision::parse(kind.as_str()),
                Some(RouteDecision::Dispatch(kind))
            );
        }
        assert_eq!(RouteDecision::parse("FINISH"), Some(RouteDecision::Finish));
    }

    #[test]
    fn test_parse_rejects_out_of_set() {
        assert_eq!(RouteDecision::parse("ChaosAnalyst"), None);
        assert_eq!(RouteDecision::parse("finish"), None);
    }
}
