//! Termcoder Core - tool-calling orchestration for a terminal coding assistant
//!
//! This crate provides:
//! - Tool executors for files, shell commands and the web
//! - A dangerous-command interceptor and a mode-based permission gate
//! - A dispatcher that routes every tool call through both
//! - The conversation loop and the session controller
//! - The model-service contract and its Ollama transport

pub mod approval;
pub mod config;
pub mod error;
pub mod formatting;
pub mod orchestration;
pub mod provider;
pub mod session;
pub mod tools;

pub use approval::{
    AutoApprove, AutoDecline, ConfirmationRequest, Confirmer, DangerCheck, DangerousCommandInterceptor,
    PermissionDecision, PermissionGate, PermissionMode, Verdict,
};
pub use config::{Config, ConfigManager, ModelConfig, WebConfig, defaults};
pub use error::{Error, Result, ToolError};
pub use orchestration::{SystemPrompt, ToolDispatcher};
pub use provider::{ChatRequest, ChatResponse, ModelClient, OllamaClient, Usage};
pub use session::{
    AgentLoop, CommandOutcome, Conversation, Message, NullSink, OutputSink, Role, Session, SessionContext,
    SessionOutput, SlashCommand, TokenUsage, ToolCall, TurnOutcome, UserInput,
};
pub use tools::{Tool, ToolDefinition, ToolOutput, ToolRegistry, standard_registry};

pub use formatting::{
    LineStyle, StyledLine, format_thousands, format_tool_call, format_tool_result, to_relative_display,
    truncate_chars,
};
