//! Supervisor Orchestration
//!
//! The orchestration state machine for one conversation thread:
//!
//! ```text
//! Init -> IntentCheck -> Routing -> Dispatched(worker) -> Routing -> ... -> Finished
//!                    \-> Finished (off-topic refusal)
//! ```
//!
//! The intent gate runs only on a session's very first message. After that,
//! every submitted turn enters at Routing, where the decision oracle picks
//! the next worker (or FINISH). A turn-count circuit breaker wraps the
//! router so the loop terminates even against an oracle that never emits
//! FINISH.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::{AgentError, Result};
use crate::message::{last_assistant_content, Message};
use crate::oracle::DecisionOracle;
use crate::routing::{RouteDecision, MAX_TURNS};
use crate::session::{NextHop, SessionStore};
use crate::worker::Worker;

/// Fixed refusal for off-topic first messages
pub const REFUSAL_MESSAGE: &str = "I am a specialized financial stock analyzer agent. \
I can only assist with finance, stocks, valuation, and market analysis. \
Please ask me a financial question!";

/// Length of the summary carried by the terminal `done` event
const SUMMARY_LEN: usize = 200;

/// Actor name reported when the intent gate itself produces output
const INTENT_GATE: &str = "IntentGate";

/// One event in a turn's ordered event sequence. Every turn terminates with
/// exactly one `Done` or `Error` event.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum TurnEvent {
    WorkerStart { worker: String },
    WorkerOutput { worker: String, content: String },
    Error { message: String },
    Done { summary: String },
}

/// Supervisor loop over the specialist workers
pub struct Orchestrator {
    decision: Arc<dyn DecisionOracle>,
    workers: HashMap<crate::routing::WorkerKind, Arc<Worker>>,
    sessions: Arc<dyn SessionStore>,
    max_turns: u32,
}

impl Orchestrator {
    pub fn new(
        decision: Arc<dyn DecisionOracle>,
        workers: Vec<Worker>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            decision,
            workers: workers
                .into_iter()
                .map(|w| (w.kind(), Arc::new(w)))
                .collect(),
            sessions,
            max_turns: MAX_TURNS,
        }
    }

    /// Override the circuit breaker budget (tests)
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Submit one user turn for a thread; returns its ordered event stream.
    ///
    /// Turns for the same thread are serialized on the session lock; turns
    /// for distinct threads proceed concurrently.
    pub fn submit_turn(
        self: &Arc<Self>,
        thread_id: impl Into<String>,
        user_text: impl Into<String>,
    ) -> ReceiverStream<TurnEvent> {
        let (tx, rx) = mpsc::channel(32);
        let this = Arc::clone(self);
        let thread_id = thread_id.into();
        let user_text = user_text.into();

        tokio::spawn(async move {
            this.run_turn(&thread_id, user_text, &tx).await;
        });

        ReceiverStream::new(rx)
    }

    async fn run_turn(&self, thread_id: &str, user_text: String, tx: &mpsc::Sender<TurnEvent>) {
        let handle = self.sessions.open(thread_id);
        let mut session = handle.lock().await;

        session.push(Message::user(user_text));
        session.next_hop = NextHop::Supervisor;
        session.turn_count = 0;

        // Intent gate: one-time check on the session's first message.
        if session.is_first_turn() {
            let first = session.messages[0].content().to_string();
            match self.decision.classify(&first).await {
                Ok(intent) => {
                    tracing::info!(
                        thread = thread_id,
                        is_finance = intent.is_finance,
                        reasoning = %intent.reasoning,
                        "intent classified"
                    );
                    if !intent.is_finance {
                        session.push(Message::assistant(REFUSAL_MESSAGE));
                        session.next_hop = NextHop::Finish;
                        send(tx, TurnEvent::WorkerOutput {
                            worker: INTENT_GATE.into(),
                            content: REFUSAL_MESSAGE.into(),
                        })
                        .await;
                        send(tx, TurnEvent::Done {
                            summary: truncate(REFUSAL_MESSAGE),
                        })
                        .await;
                        return;
                    }
                }
                // Non-fatal for the session, fatal for this turn: never
                // silently default to either branch.
                Err(e) => {
                    tracing::error!(thread = thread_id, error = %e, "intent gate failed");
                    send(tx, TurnEvent::Error { message: e.user_message() }).await;
                    return;
                }
            }
        }

        // Routing loop.
        let mut final_content = String::new();
        loop {
            session.turn_count += 1;

            let decision = match self.route_with_breaker(&session.messages, session.turn_count).await {
                Ok(d) => d,
                Err(e) => {
                    tracing::error!(thread = thread_id, error = %e, "routing failed");
                    session.next_hop = NextHop::Supervisor;
                    send(tx, TurnEvent::Error { message: e.user_message() }).await;
                    return;
                }
            };

            let kind = match decision {
                RouteDecision::Finish => break,
                RouteDecision::Dispatch(kind) => kind,
            };

            let Some(worker) = self.workers.get(&kind).cloned() else {
                tracing::error!(thread = thread_id, worker = %kind, "no worker registered");
                send(tx, TurnEvent::Error {
                    message: format!("Worker {} is not configured.", kind),
                })
                .await;
                return;
            };

            session.next_hop = NextHop::Worker(kind);
            send(tx, TurnEvent::WorkerStart { worker: kind.to_string() }).await;

            match worker.run(&mut session.messages).await {
                Ok(answer) => {
                    send(tx, TurnEvent::WorkerOutput {
                        worker: kind.to_string(),
                        content: answer.clone(),
                    })
                    .await;
                    final_content = answer;
                    session.next_hop = NextHop::Supervisor;
                }
                // Worker oracle failure cancels only this turn; the
                // session stays usable for the next one.
                Err(e) => {
                    tracing::error!(thread = thread_id, worker = %kind, error = %e, "worker failed");
                    session.next_hop = NextHop::Supervisor;
                    send(tx, TurnEvent::Error { message: e.user_message() }).await;
                    return;
                }
            }
        }

        session.next_hop = NextHop::Finish;

        if final_content.is_empty() {
            final_content = last_assistant_content(&session.messages)
                .unwrap_or("No response generated")
                .to_string();
        }
        send(tx, TurnEvent::Done { summary: truncate(&final_content) }).await;
    }

    /// One router invocation, wrapped by the circuit breaker.
    ///
    /// Past the turn budget the oracle is not consulted at all; the session
    /// finishes with whatever partial answer exists. An out-of-set oracle
    /// choice also maps to finish, annotated as a protocol violation.
    async fn route_with_breaker(
        &self,
        messages: &[Message],
        turn_count: u32,
    ) -> Result<RouteDecision> {
        if turn_count > self.max_turns {
            tracing::warn!(turn_count, max_turns = self.max_turns, "turn budget exceeded, forcing FINISH");
            return Ok(RouteDecision::Finish);
        }

        let options = RouteDecision::options();
        let choice = self.decision.route(messages, &options).await?;

        match RouteDecision::parse(&choice) {
            Some(decision) => {
                tracing::info!(turn_count, decision = %choice, "supervisor decision");
                Ok(decision)
            }
            None => {
                let violation = AgentError::OracleProtocolViolation {
                    value: choice,
                    options: options.iter().map(ToString::to_string).collect(),
                };
                tracing::error!(error = %violation, "routing protocol violation, forcing FINISH");
                Ok(RouteDecision::Finish)
            }
        }
    }
}

async fn send(tx: &mpsc::Sender<TurnEvent>, event: TurnEvent) {
    // Receiver dropped means the caller went away; nothing left to notify.
    let _ = tx.send(event).await;
}

fn truncate(text: &str) -> String {
    text.chars().take(SUMMARY_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use crate::oracle::{AssistantTurn, GenerationOracle, Intent};
    use crate::routing::WorkerKind;
    use crate::session::MemorySessionStore;
    use crate::tool::{ToolRegistry, ToolSchema};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio_stream::StreamExt;

    /// Decision oracle driven by a fixed script of route choices
    struct StubDecision {
        is_finance: bool,
        routes: Mutex<Vec<&'static str>>,
        /// Choice used once the script is exhausted
        fallthrough: &'static str,
        route_calls: AtomicUsize,
    }

    impl StubDecision {
        fn new(is_finance: bool, routes: Vec<&'static str>, fallthrough: &'static str) -> Self {
            Self {
                is_finance,
                routes: Mutex::new(routes),
                fallthrough,
                route_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DecisionOracle for StubDecision {
        async fn classify(&self, _query: &str) -> Result<Intent> {
            Ok(Intent {
                is_finance: self.is_finance,
                reasoning: "stub".into(),
            })
        }

        async fn route(&self, _messages: &[Message], _options: &[&str]) -> Result<String> {
            self.route_calls.fetch_add(1, Ordering::SeqCst);
            let mut routes = self.routes.lock().unwrap();
            let choice = if routes.is_empty() {
                self.fallthrough
            } else {
                routes.remove(0)
            };
            Ok(choice.to_string())
        }

        fn name(&self) -> &str {
            "stub-decision"
        }
    }

    struct CannedGeneration(&'static str);

    #[async_trait]
    impl GenerationOracle for CannedGeneration {
        async fn generate(
            &self,
            _system_prompt: &str,
            _messages: &[Message],
            _tools: &[ToolSchema],
        ) -> Result<AssistantTurn> {
            Ok(AssistantTurn::text(self.0))
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    fn build(decision: StubDecision) -> Arc<Orchestrator> {
        let oracle = Arc::new(CannedGeneration("Analysis complete."));
        let workers = WorkerKind::ALL
            .iter()
            .map(|&kind| {
                Worker::new(kind, "stub role", oracle.clone(), Arc::new(ToolRegistry::new()))
            })
            .collect();
        Arc::new(Orchestrator::new(
            Arc::new(decision),
            workers,
            Arc::new(MemorySessionStore::new()),
        ))
    }

    async fn collect(
        orchestrator: &Arc<Orchestrator>,
        thread: &str,
        text: &str,
    ) -> Vec<TurnEvent> {
        orchestrator
            .submit_turn(thread, text)
            .collect::<Vec<_>>()
            .await
    }

    fn done_summary(events: &[TurnEvent]) -> Option<String> {
        events.iter().rev().find_map(|e| match e {
            TurnEvent::Done { summary } => Some(summary.clone()),
            _ => None,
        })
    }

    #[tokio::test]
    async fn test_single_dispatch_then_finish() {
        let orchestrator = build(StubDecision::new(
            true,
            vec!["TechnicalAnalyst", "FINISH"],
            "FINISH",
        ));

        let events = collect(&orchestrator, "t1", "What is the price of AAPL?").await;

        assert!(matches!(events[0], TurnEvent::WorkerStart { .. }));
        assert!(matches!(events[1], TurnEvent::WorkerOutput { .. }));
        assert_eq!(done_summary(&events).unwrap(), "Analysis complete.");

        // Exactly one terminal event
        let terminal = events
            .iter()
            .filter(|e| matches!(e, TurnEvent::Done { .. } | TurnEvent::Error { .. }))
            .count();
        assert_eq!(terminal, 1);
    }

    #[tokio::test]
    async fn test_off_topic_refusal_never_dispatches() {
        let orchestrator = build(StubDecision::new(false, vec![], "FINISH"));

        let events = collect(&orchestrator, "t1", "hello").await;

        assert!(!events.iter().any(|e| matches!(e, TurnEvent::WorkerStart { .. })));
        assert!(done_summary(&events).unwrap().contains("financial stock analyzer"));
    }

    #[tokio::test]
    async fn test_circuit_breaker_liveness() {
        // An oracle that never says FINISH must still terminate, with the
        // router consulted at most MAX_TURNS times.
        let decision = StubDecision::new(true, vec![], "QuantAnalyst");
        let orchestrator = build(decision);

        let events = collect(&orchestrator, "t1", "backtest everything forever").await;

        assert!(done_summary(&events).is_some());
        let dispatches = events
            .iter()
            .filter(|e| matches!(e, TurnEvent::WorkerStart { .. }))
            .count();
        assert_eq!(dispatches, MAX_TURNS as usize);
    }

    #[tokio::test]
    async fn test_turn_budget_resets_per_submission() {
        // The breaker budget is per submitted user message. A second turn
        // on the same thread gets a fresh budget rather than inheriting the
        // exhausted counter from the first.
        let decision = StubDecision::new(true, vec![], "QuantAnalyst");
        let orchestrator = build(decision);

        let first = collect(&orchestrator, "t1", "backtest AAPL").await;
        let second = collect(&orchestrator, "t1", "now backtest MSFT").await;

        for events in [&first, &second] {
            let dispatches = events
                .iter()
                .filter(|e| matches!(e, TurnEvent::WorkerStart { .. }))
                .count();
            assert_eq!(dispatches, MAX_TURNS as usize);
            assert!(done_summary(events).is_some());
        }
    }

    #[tokio::test]
    async fn test_protocol_violation_maps_to_finish() {
        let orchestrator = build(StubDecision::new(true, vec!["ChaosAnalyst"], "FINISH"));

        let events = collect(&orchestrator, "t1", "analyze TSLA").await;

        assert!(!events.iter().any(|e| matches!(e, TurnEvent::WorkerStart { .. })));
        // A violation is a defined terminal outcome, not a turn error.
        assert!(done_summary(&events).is_some());
    }

    #[tokio::test]
    async fn test_intent_gate_bypassed_after_first_turn() {
        // First turn refused; the session still accepts a second turn,
        // which enters at Routing directly.
        let orchestrator = build(StubDecision::new(
            false,
            vec!["TechnicalAnalyst", "FINISH"],
            "FINISH",
        ));

        let first = collect(&orchestrator, "t1", "hello").await;
        assert!(done_summary(&first).unwrap().contains("financial"));
        assert!(!first.iter().any(|e| matches!(e, TurnEvent::WorkerStart { .. })));

        // classify() still returns false, but the gate no longer runs: the
        // second turn enters at Routing and dispatches a worker.
        let second = collect(&orchestrator, "t1", "ok, what about AAPL?").await;
        assert!(second.iter().any(|e| matches!(e, TurnEvent::WorkerStart { .. })));
        assert_eq!(done_summary(&second).unwrap(), "Analysis complete.");
    }

    /// Decision oracle whose classify always fails
    struct BrokenClassifier;

    #[async_trait]
    impl DecisionOracle for BrokenClassifier {
        async fn classify(&self, _query: &str) -> Result<Intent> {
            Err(AgentError::OracleUnavailable("all oracles down".into()))
        }

        async fn route(&self, _messages: &[Message], _options: &[&str]) -> Result<String> {
            Ok("FINISH".into())
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_intent_gate_failure_is_turn_error() {
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::new(BrokenClassifier),
            vec![],
            Arc::new(MemorySessionStore::new()),
        ));

        let events = collect(&orchestrator, "t1", "price of AAPL").await;
        assert!(matches!(events.last(), Some(TurnEvent::Error { .. })));
        assert!(done_summary(&events).is_none());
    }
}
