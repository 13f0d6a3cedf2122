//! Ollama chat transport
//!
//! Non-streaming `POST {base_url}/api/chat` with native tool calling and the
//! `think` flag. Works against a local daemon or the hosted service; a bearer
//! key is sent when one is configured.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::{ChatRequest, ChatResponse, ModelClient, Usage};
use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::session::types::{Message, ToolCall};
use crate::tools::ToolDefinition;

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    stream: bool,
    think: bool,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thinking: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolDefinition,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    message: WireMessage,
    #[serde(default)]
    prompt_eval_count: u64,
    #[serde(default)]
    eval_count: u64,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
}

impl WireMessage {
    fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    fn from_message(message: &Message) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.text().to_string(),
            // Reasoning is display only and is not replayed to the model
            thinking: None,
            tool_calls: message
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    function: WireFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                })
                .collect(),
            tool_name: message.tool_name.clone(),
        }
    }

    fn into_message(self) -> Message {
        let tool_calls = self
            .tool_calls
            .into_iter()
            .map(|call| ToolCall::new(call.function.name, normalize_arguments(call.function.arguments)))
            .collect();

        Message::assistant(
            Some(self.content).filter(|c| !c.is_empty()),
            self.thinking.filter(|t| !t.is_empty()),
            tool_calls,
        )
    }
}

/// Some models send arguments as a JSON-encoded string
fn normalize_arguments(arguments: Value) -> Value {
    match arguments {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        Value::Null => Value::Object(Default::default()),
        other => other,
    }
}

/// HTTP client for the Ollama chat API
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OllamaClient {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Provider(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_body<'a>(request: &'a ChatRequest) -> WireRequest<'a> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system.is_empty() {
            messages.push(WireMessage::system(&request.system));
        }
        messages.extend(request.messages.iter().map(WireMessage::from_message));

        WireRequest {
            model: &request.model,
            messages,
            tools: request
                .tools
                .iter()
                .map(|function| WireTool {
                    kind: "function",
                    function,
                })
                .collect(),
            stream: false,
            think: request.think,
        }
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/api/chat", self.base_url);
        let body = Self::build_body(&request);
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending chat request"
        );

        let mut builder = self.http.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Provider(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<WireError>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            warn!(status = %status, "Model service returned an error");
            return Err(Error::Provider(format!("{} {}", status, detail)));
        }

        let wire: WireResponse = serde_json::from_str(&text)
            .map_err(|e| Error::Provider(format!("Invalid response from model service: {}", e)))?;
        let usage = Usage::new(wire.prompt_eval_count, wire.eval_count);
        debug!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            tool_calls = wire.message.tool_calls.len(),
            "Chat response received"
        );

        Ok(ChatResponse {
            message: wire.message.into_message(),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::types::Role;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "llama3".into(),
            system: "be brief".into(),
            messages: vec![
                Message::user("hi"),
                Message::assistant(None, Some("hmm".into()), vec![ToolCall::new("read_file", json!({"filename": "a"}))]),
                Message::tool("read_file", "{\"success\":true}"),
            ],
            tools: vec![ToolDefinition {
                name: "read_file".into(),
                description: "Read".into(),
                parameters: json!({"type": "object"}),
            }],
            think: true,
        };

        let body = serde_json::to_value(OllamaClient::build_body(&request)).unwrap();
        assert_eq!(body["stream"], json!(false));
        assert_eq!(body["think"], json!(true));
        assert_eq!(body["messages"][0], json!({"role": "system", "content": "be brief"}));
        assert_eq!(
            body["messages"][2]["tool_calls"][0]["function"],
            json!({"name": "read_file", "arguments": {"filename": "a"}})
        );
        assert!(body["messages"][2].get("thinking").is_none());
        assert_eq!(body["messages"][3]["tool_name"], json!("read_file"));
        assert_eq!(body["tools"][0]["type"], json!("function"));
        assert_eq!(body["tools"][0]["function"]["name"], json!("read_file"));
    }

    #[test]
    fn test_response_parsing() {
        let wire: WireResponse = serde_json::from_value(json!({
            "model": "llama3",
            "message": {
                "role": "assistant",
                "content": "",
                "thinking": "need to look",
                "tool_calls": [
                    {"function": {"name": "list_files", "arguments": {}}},
                    {"function": {"name": "read_file", "arguments": "{\"filename\": \"x\"}"}}
                ]
            },
            "done": true,
            "prompt_eval_count": 120,
            "eval_count": 30
        }))
        .unwrap();

        assert_eq!(wire.prompt_eval_count, 120);
        let message = wire.message.into_message();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, None);
        assert_eq!(message.thinking.as_deref(), Some("need to look"));
        assert_eq!(message.tool_calls[1].arguments, json!({"filename": "x"}));
    }
}
