//! Ollama Oracle Backend
//!
//! Implements both oracle capabilities against a local Ollama server via
//! its REST API. Decisions use Ollama's JSON mode so the model answers
//! with a parseable object; generation turns carry tool requests as
//! fenced ```tool blocks, which are parsed out here.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use analyst_core::oracle::{AssistantTurn, DecisionOracle, GenerationOracle, Intent};
use analyst_core::{AgentError, Message, Result, ToolCall, ToolSchema};

const CLASSIFIER_PROMPT: &str = "You are a classifier for a stock analysis service. \
Decide whether the user's message is about finance, stocks, companies, markets, or the economy. \
Respond with a JSON object: {\"is_finance\": true|false, \"reasoning\": \"<one sentence>\"}. \
Respond with JSON only.";

/// Ollama connection configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,

    /// Model name (e.g. "llama3.1")
    pub model: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            model: "llama3.1".into(),
            timeout_secs: 120,
        }
    }
}

impl OllamaConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("OLLAMA_HOST").unwrap_or(defaults.host),
            port: std::env::var("OLLAMA_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            model: std::env::var("OLLAMA_MODEL").unwrap_or(defaults.model),
            timeout_secs: defaults.timeout_secs,
        }
    }

    fn chat_url(&self) -> String {
        format!("{}:{}/api/chat", self.host, self.port)
    }

    fn tags_url(&self) -> String {
        format!("{}:{}/api/tags", self.host, self.port)
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

/// Oracle backed by one Ollama model
pub struct OllamaOracle {
    client: reqwest::Client,
    config: OllamaConfig,
    name: String,
}

impl OllamaOracle {
    pub fn from_config(config: OllamaConfig) -> Self {
        let name = format!("ollama/{}", config.model);
        Self {
            client: reqwest::Client::new(),
            config,
            name,
        }
    }

    pub fn from_env() -> Self {
        Self::from_config(OllamaConfig::from_env())
    }

    /// A config from the environment with a specific model
    pub fn with_model(model: impl Into<String>) -> Self {
        Self::from_config(OllamaConfig {
            model: model.into(),
            ..OllamaConfig::from_env()
        })
    }

    /// True when the server answers and knows at least one model
    pub async fn health_check(&self) -> bool {
        match self.client.get(self.config.tags_url()).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!(oracle = %self.name, error = %e, "health check failed");
                false
            }
        }
    }

    /// One non-streaming chat completion
    async fn chat(&self, messages: Vec<Value>, json_mode: bool) -> Result<String> {
        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
            "stream": false,
        });
        if json_mode {
            body["format"] = json!("json");
        }

        let response = self
            .client
            .post(self.config.chat_url())
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Oracle(format!("{}: {e}", self.name)))?;

        if !response.status().is_success() {
            return Err(AgentError::Oracle(format!(
                "{}: server returned {}",
                self.name,
                response.status()
            )));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Oracle(format!("{}: bad response body: {e}", self.name)))?;

        Ok(payload.message.content)
    }
}

/// Render the transcript for the chat API. Tool results travel as user
/// context; the worker loop already labels them with the tool name.
fn render_transcript(system_prompt: &str, messages: &[Message]) -> Vec<Value> {
    let mut out = Vec::with_capacity(messages.len() + 1);
    out.push(json!({"role": "system", "content": system_prompt}));

    for message in messages {
        let (role, content) = match message {
            Message::User { content } => ("user", content.clone()),
            Message::Assistant { content, .. } => ("assistant", content.clone()),
            Message::Tool { content, .. } => ("user", content.clone()),
        };
        out.push(json!({"role": role, "content": content}));
    }

    out
}

/// Extract every fenced ```tool block from a response
fn parse_tool_calls(content: &str) -> Vec<ToolCall> {
    const BLOCK_START: &str = "```tool";
    const BLOCK_END: &str = "```";

    let mut calls = Vec::new();
    let mut rest = content;

    while let Some(start) = rest.find(BLOCK_START) {
        let after = &rest[start + BLOCK_START.len()..];
        let Some(end) = after.find(BLOCK_END) else {
            break;
        };

        let json_str = after[..end].trim();
        match serde_json::from_str::<ToolCall>(json_str) {
            Ok(call) => calls.push(call),
            Err(e) => {
                tracing::warn!(error = %e, block = json_str, "unparseable tool block ignored");
            }
        }

        rest = &after[end + BLOCK_END.len()..];
    }

    if calls.is_empty() {
        if let Some(call) = parse_inline_tool_call(content) {
            calls.push(call);
        }
    }

    calls
}

/// Fallback for models that emit a bare JSON object instead of a fence
fn parse_inline_tool_call(content: &str) -> Option<ToolCall> {
    if !content.contains(r#""tool""#) {
        return None;
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }

    serde_json::from_str::<ToolCall>(&content[start..=end]).ok()
}

/// System prompt for one routing decision
fn route_prompt(options: &[&str]) -> String {
    format!(
        "You are the supervisor of a team of financial analysts. \
Given the conversation so far, choose who should act next, or FINISH when \
the user's request has been answered. \
Valid choices: {}. \
Respond with a JSON object: {{\"next\": \"<choice>\"}}. Respond with JSON only.",
        options.join(", ")
    )
}

#[derive(Deserialize)]
struct RouteChoice {
    next: String,
}

#[async_trait]
impl DecisionOracle for OllamaOracle {
    async fn classify(&self, query: &str) -> Result<Intent> {
        let messages = vec![
            json!({"role": "system", "content": CLASSIFIER_PROMPT}),
            json!({"role": "user", "content": query}),
        ];

        let content = self.chat(messages, true).await?;
        serde_json::from_str(&content)
            .map_err(|e| AgentError::Parse(format!("intent verdict: {e}: {content}")))
    }

    async fn route(&self, messages: &[Message], options: &[&str]) -> Result<String> {
        let transcript = render_transcript(&route_prompt(options), messages);
        let content = self.chat(transcript, true).await?;

        let choice: RouteChoice = serde_json::from_str(&content)
            .map_err(|e| AgentError::Parse(format!("route choice: {e}: {content}")))?;

        // Raw value; the supervisor validates set membership.
        Ok(choice.next.trim().to_string())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl GenerationOracle for OllamaOracle {
    async fn generate(
        &self,
        system_prompt: &str,
        messages: &[Message],
        _tools: &[ToolSchema],
    ) -> Result<AssistantTurn> {
        let transcript = render_transcript(system_prompt, messages);
        let content = self.chat(transcript, false).await?;
        let tool_calls = parse_tool_calls(&content);

        Ok(AssistantTurn {
            content,
            tool_calls,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
