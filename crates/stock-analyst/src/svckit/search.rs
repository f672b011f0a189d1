//! Web Search Tool
//!
//! Offline stand-in for a news search backend. Returns a deterministic
//! headline digest so the sentiment worker has something to reason over
//! without a network dependency.
//!
//! TODO: swap in a real search backend (Tavily or similar) once an API
//! key story exists for deployments.

use async_trait::async_trait;

use analyst_core::{tool::ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

pub struct WebSearchTool;

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

impl WebSearchTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_web".into(),
            description: "Search recent news and commentary for a query. Returns a short digest of results.".into(),
            parameters: vec![ParameterSchema {
                name: "query".into(),
                param_type: "string".into(),
                description: "Search query, typically a company name or ticker".into(),
                required: true,
                default: None,
            }],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call.str_arg("query").unwrap_or_default();

        let output = format!(
            "Search results for \"{query}\":\n  1. Analysts remain split on near-term outlook; consensus leans cautiously positive.\n  2. Recent earnings coverage highlights steady demand with margin pressure noted.\n  3. No major regulatory or legal developments reported in the last quarter.\n(Note: offline search stub; results are a canned digest, not live news.)"
        );

        Ok(ToolResult::success("search_web", output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_echoes_query() {
        let call = ToolCall::new("search_web").with_arg("query", serde_json::json!("AAPL outlook"));
        let result = WebSearchTool::new().execute(&call).await.unwrap();

        assert!(result.success);
        assert!(result.output.contains("AAPL outlook"));
    }
}
