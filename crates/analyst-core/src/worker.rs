//! Worker Reasoning Loop
//!
//! Implements the bounded ReAct pattern for one specialist: ask the
//! generation oracle for the next assistant turn, execute any requested
//! tool calls through the worker's bundle, append results, repeat. The
//! loop ends when the oracle answers without tool calls or the iteration
//! cap is hit.

use std::sync::Arc;

use crate::error::Result;
use crate::message::{last_assistant_content, Message};
use crate::oracle::GenerationOracle;
use crate::routing::WorkerKind;
use crate::tool::{ToolCall, ToolRegistry, ToolResult};

/// Shared preamble constraining every specialist to its own role
const TEAM_PREAMBLE: &str = "You are a specialized worker in a team of AI agents. \
Your role is defined below. \
You must focus ONLY on your specific task. \
Ignore any parts of the user request that are outside your scope. \
Do not apologize for not doing other tasks. \
Just perform your specific action and return the result.\n\n";

/// Answer used when a worker exhausts its loop without producing any text
const NO_ANSWER: &str = "I was unable to complete the analysis within the allotted steps.";

/// Worker configuration
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Maximum reasoning iterations per dispatch. Kept well below the
    /// supervisor's global turn budget.
    pub max_iterations: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { max_iterations: 5 }
    }
}

/// A role-scoped, tool-using reasoning unit
pub struct Worker {
    kind: WorkerKind,
    role_prompt: String,
    oracle: Arc<dyn GenerationOracle>,
    tools: Arc<ToolRegistry>,
    config: WorkerConfig,
}

impl Worker {
    pub fn new(
        kind: WorkerKind,
        role_prompt: impl Into<String>,
        oracle: Arc<dyn GenerationOracle>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            kind,
            role_prompt: role_prompt.into(),
            oracle,
            tools,
            config: WorkerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: WorkerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn kind(&self) -> WorkerKind {
        self.kind
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// System prompt: team preamble, role instruction, tool descriptions
    fn build_system_prompt(&self) -> String {
        let mut prompt = String::from(TEAM_PREAMBLE);
        prompt.push_str(&self.role_prompt);

        if !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.generate_prompt_section());
        }

        prompt
    }

    /// Run one bounded dispatch, appending to the transcript.
    ///
    /// Returns the worker's final answer for this dispatch. Oracle failures
    /// abort the dispatch with an error; tool failures do not - they become
    /// descriptive tool-result messages the oracle can reason about.
    pub async fn run(&self, messages: &mut Vec<Message>) -> Result<String> {
        let system_prompt = self.build_system_prompt();
        let schemas = self.tools.schemas();

        for iteration in 1..=self.config.max_iterations {
            let turn = self
                .oracle
                .generate(&system_prompt, messages, &schemas)
                .await?;

            // Assign call ids before the turn enters the transcript so
            // every tool result can reference one.
            let mut calls = turn.tool_calls;
            for call in &mut calls {
                if call.id.is_none() {
                    call.id = Some(uuid::Uuid::new_v4().to_string());
                }
            }

            let content = turn.content.clone();
            messages.push(Message::assistant_with_calls(content.clone(), calls.clone()));

            if calls.is_empty() {
                return Ok(content);
            }

            tracing::debug!(
                worker = %self.kind,
                iteration,
                calls = calls.len(),
                "executing tool calls"
            );

            // Sequential, in request order; results append in the same order.
            for call in &calls {
                let result = self.execute_tool(call).await;
                let call_id = call.id.clone().unwrap_or_default();
                messages.push(Message::tool(call_id, &call.name, format_tool_result(&result)));
            }
        }

        tracing::warn!(worker = %self.kind, "iteration cap reached");
        Ok(last_assistant_content(messages)
            .filter(|c| !c.is_empty())
            .unwrap_or(NO_ANSWER)
            .to_string())
    }

    /// Execute one tool call, folding every failure into a result
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        match self.tools.execute(call).await {
            Ok(mut result) => {
                result.id = call.id.clone();
                result
            }
            Err(e) => ToolResult {
                name: call.name.clone(),
                id: call.id.clone(),
                success: false,
                output: format!("Error: {}", e),
            },
        }
    }
}

/// Format tool result for the transcript
fn format_tool_result(result: &ToolResult) -> String {
    if result.success {
        format!("[Tool '{}' returned]\n{}", result.name, result.output)
    } else {
        format!("[Tool '{}' failed]\n{}", result.name, result.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use crate::oracle::AssistantTurn;
    use crate::tool::{ParameterSchema, Tool, ToolSchema};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Generation oracle replaying a fixed script of turns
    struct ScriptedOracle {
        turns: Mutex<Vec<AssistantTurn>>,
    }

    impl ScriptedOracle {
        fn new(turns: Vec<AssistantTurn>) -> Self {
            Self {
                turns: Mutex::new(turns),
            }
        }
    }

    #[async_trait]
    impl GenerationOracle for ScriptedOracle {
        async fn generate(
            &self,
            _system_prompt: &str,
            _messages: &[Message],
            _tools: &[ToolSchema],
        ) -> Result<AssistantTurn> {
            let mut turns = self.turns.lock().unwrap();
            if turns.is_empty() {
                return Err(AgentError::Oracle("script exhausted".into()));
            }
            Ok(turns.remove(0))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct PriceStub;

    #[async_trait]
    impl Tool for PriceStub {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "fetch_price".into(),
                description: "stub".into(),
                parameters: vec![ParameterSchema {
                    name: "ticker".into(),
                    param_type: "string".into(),
                    description: "ticker".into(),
                    required: true,
                    default: None,
                }],
            }
        }

        async fn execute(&self, _call: &ToolCall) -> Result<ToolResult> {
            Ok(ToolResult::success("fetch_price", "182.50"))
        }
    }

    fn worker_with(oracle: ScriptedOracle) -> Worker {
        let mut tools = ToolRegistry::new();
        tools.register(PriceStub);
        Worker::new(
            WorkerKind::Technical,
            "You are a Technical Analyst.",
            Arc::new(oracle),
            Arc::new(tools),
        )
    }

    #[tokio::test]
    async fn test_direct_answer_ends_loop() {
        let worker = worker_with(ScriptedOracle::new(vec![AssistantTurn::text("No tools needed.")]));
        let mut messages = vec![Message::user("hi")];

        let answer = worker.run(&mut messages).await.unwrap();
        assert_eq!(answer, "No tools needed.");
        assert_eq!(messages.len(), 2);
    }

    #[tokio::test]
    async fn test_tool_call_then_answer() {
        let call = ToolCall::new("fetch_price").with_arg("ticker", serde_json::json!("AAPL"));
        let worker = worker_with(ScriptedOracle::new(vec![
            AssistantTurn {
                content: String::new(),
                tool_calls: vec![call],
            },
            AssistantTurn::text("AAPL last traded at 182.50."),
        ]));

        let mut messages = vec![Message::user("price of AAPL?")];
        let answer = worker.run(&mut messages).await.unwrap();

        assert!(answer.contains("182.50"));
        // user, assistant(call), tool result, assistant(final)
        assert_eq!(messages.len(), 4);

        // The tool result references the call id assigned by the worker
        let Message::Assistant { tool_calls, .. } = &messages[1] else {
            panic!("expected assistant message");
        };
        let Message::Tool { call_id, .. } = &messages[2] else {
            panic!("expected tool message");
        };
        assert_eq!(tool_calls[0].id.as_deref(), Some(call_id.as_str()));
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_failure_text() {
        let call = ToolCall::new("teleport");
        let worker = worker_with(ScriptedOracle::new(vec![
            AssistantTurn {
                content: String::new(),
                tool_calls: vec![call],
            },
            AssistantTurn::text("That tool was unavailable."),
        ]));

        let mut messages = vec![Message::user("go")];
        let answer = worker.run(&mut messages).await.unwrap();
        assert_eq!(answer, "That tool was unavailable.");

        let Message::Tool { content, .. } = &messages[2] else {
            panic!("expected tool message");
        };
        assert!(content.contains("failed"));
    }

    #[tokio::test]
    async fn test_iteration_cap_returns_last_content() {
        // Oracle that always requests a tool call never terminates on its own
        let looping: Vec<AssistantTurn> = (0..10)
            .map(|i| AssistantTurn {
                content: format!("step {}", i),
                tool_calls: vec![
                    ToolCall::new("fetch_price").with_arg("ticker", serde_json::json!("AAPL")),
                ],
            })
            .collect();
        let worker = worker_with(ScriptedOracle::new(looping));

        let mut messages = vec![Message::user("loop forever")];
        let answer = worker.run(&mut messages).await.unwrap();

        // Default cap is 5 iterations: the last assistant content wins
        assert_eq!(answer, "step 4");
    }

    #[tokio::test]
    async fn test_oracle_failure_aborts_dispatch() {
        let worker = worker_with(ScriptedOracle::new(vec![]));
        let mut messages = vec![Message::user("hi")];
        assert!(worker.run(&mut messages).await.is_err());
    }
}
