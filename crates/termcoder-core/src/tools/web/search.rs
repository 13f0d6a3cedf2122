//! Web search tool

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ToolError;
use crate::tools::{BoxFuture, Tool, ToolOutput, WEB_SEARCH, required_str};

use super::{WebClient, clamp_max_results, decode_reply};

/// One search hit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// Tool for searching the web
pub struct WebSearch {
    client: WebClient,
}

impl WebSearch {
    pub fn new(client: WebClient) -> Self {
        Self { client }
    }
}

impl Tool for WebSearch {
    fn name(&self) -> &str {
        WEB_SEARCH
    }

    fn description(&self) -> &str {
        "Search the web for current information. Returns a list of results with title, URL and content snippet."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Number of results, 1-10 (default: 5)",
                    "default": self.client.default_max_results
                }
            },
            "required": ["query"]
        })
    }

    fn execute(&self, params: Value) -> BoxFuture<'_, Result<ToolOutput, ToolError>> {
        Box::pin(async move {
            let query = required_str(&params, "query")?;
            let max_results = params["max_results"]
                .as_i64()
                .map(clamp_max_results)
                .unwrap_or(self.client.default_max_results);

            let body = self
                .client
                .post("/api/web_search", &json!({"query": query, "max_results": max_results}))
                .await?;
            let response: SearchResponse = decode_reply(body)?;

            tracing::debug!(query, count = response.results.len(), "Web search finished");
            Ok(ToolOutput::success(json!({ "results": response.results })))
        })
    }
}
