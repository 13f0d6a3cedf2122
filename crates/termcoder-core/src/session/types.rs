//! Session types shared by the orchestrator and the front end
//!
//! These types define the conversation record, the per-session context that
//! the controller threads into every turn, and the output protocol the
//! orchestrator reports progress through.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::approval::PermissionMode;
use crate::provider::Usage;
use crate::tools::ToolOutput;

/// Author of a history message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    /// Argument mapping as sent by the model; not validated
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// One entry of the conversation history
///
/// Messages are immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Reasoning trace of an assistant message, display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Name of the tool that produced a tool-role message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            thinking: None,
            tool_calls: Vec::new(),
            tool_name: None,
        }
    }

    pub fn assistant(content: Option<String>, thinking: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            thinking,
            tool_calls,
            tool_name: None,
        }
    }

    pub fn tool(tool_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            thinking: None,
            tool_calls: Vec::new(),
            tool_name: Some(tool_name.into()),
        }
    }

    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Per-session state threaded through each turn
///
/// Only the session controller mutates it; tools never see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub mode: PermissionMode,
    pub model: String,
}

impl SessionContext {
    pub fn new(model: impl Into<String>, mode: PermissionMode) -> Self {
        Self {
            model: model.into(),
            mode,
        }
    }
}

/// Progress reported by the orchestrator during a turn
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutput {
    /// A model call is about to start
    ModelCallStarted { model: String },
    /// The model call ended (successfully or not); always follows `ModelCallStarted`
    ModelCallFinished,
    /// Reasoning trace from the model
    Thinking { content: String },
    /// A tool call is about to be dispatched
    ToolCall { name: String, arguments: Value },
    /// A tool call finished
    ToolResult {
        name: String,
        arguments: Value,
        output: ToolOutput,
    },
    /// Final answer of the turn
    AssistantMessage { content: String },
    /// The turn used up its tool rounds
    RoundLimitReached { rounds: usize },
}

/// Receiver of [`SessionOutput`] events
///
/// Called inline on the orchestrator's task; implementations should return
/// quickly.
pub trait OutputSink: Send + Sync {
    fn emit(&self, output: SessionOutput);
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn emit(&self, _output: SessionOutput) {}
}

/// How a user turn ended
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The model answered without requesting tools
    Answered { content: String, usage: Usage },
    /// The tool round cap was hit; history keeps everything so far
    RoundLimitReached { rounds: usize, usage: Usage },
    /// The user interrupted the model call; the turn was rolled back
    Cancelled,
}
