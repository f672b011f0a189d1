//! # analyst-core
//!
//! Orchestration core for the agentic stock analyst: oracle-agnostic routing
//! state machine, bounded worker reasoning loops and the tool system.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Orchestrator                            │
//! │  IntentGate ─► Supervisor ─► Worker(n) ─► Supervisor ─► ...  │
//! │       │            │  ▲          │                           │
//! │  DecisionOracle    │  └── circuit breaker (MAX_TURNS)        │
//! │                    ▼                                         │
//! │              GenerationOracle ──► ToolRegistry               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `DecisionOracle` and `GenerationOracle` traits keep the state machine
//! independent of any concrete language model; both are consumed through
//! ordered fallback chains.

pub mod error;
pub mod message;
pub mod oracle;
pub mod orchestrator;
pub mod routing;
pub mod session;
pub mod tool;
pub mod worker;

pub use error::{AgentError, Result};
pub use message::Message;
pub use oracle::{
    AssistantTurn, DecisionChain, DecisionOracle, GenerationChain, GenerationOracle, Intent,
};
pub use orchestrator::{Orchestrator, TurnEvent, REFUSAL_MESSAGE};
pub use routing::{RouteDecision, WorkerKind, FINISH, MAX_TURNS};
pub use session::{MemorySessionStore, NextHop, SessionState, SessionStore};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
pub use worker::{Worker, WorkerConfig};
