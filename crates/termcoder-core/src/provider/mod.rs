//! Model service abstraction
//!
//! The orchestrator talks to the model through [`ModelClient`]: one request
//! with the full history and tool descriptors, one complete response back.
//! [`OllamaClient`] is the HTTP implementation; tests script their own.

mod ollama;

pub use ollama::OllamaClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::types::Message;
use crate::tools::ToolDefinition;

/// Token counters reported for a model call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

impl std::ops::AddAssign for Usage {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// One model call
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    /// System instructions, sent ahead of the history
    pub system: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    /// Ask the model for a reasoning trace
    pub think: bool,
}

/// The model's reply to a [`ChatRequest`]
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    /// Always an assistant-role message
    pub message: Message,
    pub usage: Usage,
}

/// Transport to a chat model
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send the request and wait for the complete response
    ///
    /// Transport failures and non-success replies are `Error::Provider`.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_accumulates() {
        let mut usage = Usage::default();
        usage += Usage::new(100, 20);
        usage += Usage::new(5, 1);
        assert_eq!(usage, Usage::new(105, 21));
        assert_eq!(usage.total(), 126);
    }
}
