//! Shared test doubles for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use termcoder_core::error::{Error, Result};
use termcoder_core::provider::{ChatRequest, ChatResponse, ModelClient, Usage};
use termcoder_core::session::{Message, ToolCall};

/// Model client that replays canned replies and records every request
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ChatResponse>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a plain answer
    pub fn answer(self, text: &str) -> Self {
        self.push(Ok(reply(Message::assistant(Some(text.to_string()), None, Vec::new()))))
    }

    /// Queue a reply requesting the given tool calls
    pub fn tool_calls(self, calls: Vec<(&str, Value)>) -> Self {
        let calls = calls
            .into_iter()
            .map(|(name, args)| ToolCall::new(name, args))
            .collect();
        self.push(Ok(reply(Message::assistant(None, None, calls))))
    }

    /// Queue a transport failure
    pub fn failure(self, message: &str) -> Self {
        self.push(Err(Error::Provider(message.to_string())))
    }

    fn push(self, reply: Result<ChatResponse>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Provider("script exhausted".to_string())))
    }
}

/// Model client whose calls never complete
pub struct HangingModel;

#[async_trait]
impl ModelClient for HangingModel {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        std::future::pending().await
    }
}

fn reply(message: Message) -> ChatResponse {
    ChatResponse {
        message,
        usage: Usage::new(100, 20),
    }
}
