//! Session controller
//!
//! Owns the permission mode, the model selection and the orchestrator across
//! user turns. Interprets slash commands; everything else becomes a turn.

use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::approval::{Confirmer, PermissionGate, PermissionMode};
use crate::config::Config;
use crate::error::Result;
use crate::orchestration::{SystemPrompt, ToolDispatcher};
use crate::provider::{ModelClient, OllamaClient};
use crate::tools::standard_registry;

use super::agent_loop::AgentLoop;
use super::history::TokenUsage;
use super::types::{OutputSink, SessionContext, TurnOutcome};

/// A line typed at the prompt, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    Empty,
    Command(SlashCommand),
    Message(String),
}

impl UserInput {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return UserInput::Empty;
        }
        if trimmed.starts_with('/') {
            return UserInput::Command(SlashCommand::parse(trimmed));
        }
        if matches!(trimmed.to_lowercase().as_str(), "quit" | "exit") {
            return UserInput::Command(SlashCommand::Quit);
        }
        UserInput::Message(trimmed.to_string())
    }
}

/// Slash commands understood by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    /// Cycle the permission mode
    Mode,
    /// Switch model, or show the current one when no name is given
    Model(Option<String>),
    Clear,
    Tokens,
    Quit,
    Unknown(String),
}

impl SlashCommand {
    /// Parse a line starting with `/`; the command word is case-insensitive
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (trimmed, ""),
        };

        match word.to_lowercase().as_str() {
            "/help" => SlashCommand::Help,
            "/mode" => SlashCommand::Mode,
            "/model" => SlashCommand::Model(Some(rest.to_string()).filter(|m| !m.is_empty())),
            "/clear" => SlashCommand::Clear,
            "/tokens" => SlashCommand::Tokens,
            "/quit" | "/exit" => SlashCommand::Quit,
            _ => SlashCommand::Unknown(word.to_lowercase()),
        }
    }
}

/// Result of a slash command, for the front end to render
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Help(String),
    ModeChanged(PermissionMode),
    ModelChanged(String),
    CurrentModel(String),
    Cleared,
    Tokens(TokenUsage),
    Quit,
    Unknown(String),
}

/// Top-level session state across turns
pub struct Session {
    context: SessionContext,
    agent: AgentLoop,
}

impl Session {
    pub fn new(agent: AgentLoop, context: SessionContext) -> Self {
        Self { context, agent }
    }

    /// Wire the standard tools, the Ollama transport and the system prompt
    /// for a session working in `workspace`
    pub fn from_config(config: &Config, workspace: &Path) -> Result<Self> {
        let client: Arc<dyn ModelClient> = Arc::new(OllamaClient::new(&config.ollama)?);
        Self::with_client(config, workspace, client)
    }

    /// Same as [`Session::from_config`] with a caller-supplied model client
    pub fn with_client(config: &Config, workspace: &Path, client: Arc<dyn ModelClient>) -> Result<Self> {
        let registry = standard_registry(workspace, &config.web, config.ollama.api_key())?;
        let system_prompt = SystemPrompt::new(workspace)
            .with_tools(&registry.list())
            .build();
        let dispatcher = ToolDispatcher::new(registry, PermissionGate::new(workspace));
        let agent = AgentLoop::new(client, dispatcher, system_prompt).with_max_tool_rounds(config.max_tool_rounds);

        Ok(Self::new(agent, SessionContext::new(config.model.clone(), config.permission_mode)))
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn mode(&self) -> PermissionMode {
        self.context.mode
    }

    pub fn model(&self) -> &str {
        &self.context.model
    }

    pub fn usage(&self) -> TokenUsage {
        self.agent.usage()
    }

    pub fn agent(&self) -> &AgentLoop {
        &self.agent
    }

    /// Advance `default -> accept-edits -> yolo -> default`
    pub fn cycle_mode(&mut self) -> PermissionMode {
        self.context.mode = self.context.mode.next();
        info!(mode = %self.context.mode, "Permission mode changed");
        self.context.mode
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.context.model = model.into();
        info!(model = %self.context.model, "Model changed");
    }

    /// Drop the history and usage counters; the mode is kept
    pub fn clear(&mut self) {
        self.agent.reset();
        info!("Conversation cleared");
    }

    /// Run one user turn with the current mode and model
    pub async fn submit(
        &mut self,
        input: &str,
        confirmer: &dyn Confirmer,
        sink: &dyn OutputSink,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome> {
        self.agent
            .run_turn(&self.context, input, confirmer, sink, cancel)
            .await
    }

    pub fn handle_command(&mut self, command: SlashCommand) -> CommandOutcome {
        match command {
            SlashCommand::Help => CommandOutcome::Help(self.help_text()),
            SlashCommand::Mode => CommandOutcome::ModeChanged(self.cycle_mode()),
            SlashCommand::Model(Some(model)) => {
                self.set_model(model.clone());
                CommandOutcome::ModelChanged(model)
            }
            SlashCommand::Model(None) => CommandOutcome::CurrentModel(self.context.model.clone()),
            SlashCommand::Clear => {
                self.clear();
                CommandOutcome::Cleared
            }
            SlashCommand::Tokens => CommandOutcome::Tokens(self.usage()),
            SlashCommand::Quit => CommandOutcome::Quit,
            SlashCommand::Unknown(word) => CommandOutcome::Unknown(word),
        }
    }

    pub fn help_text(&self) -> String {
        let tools = self.agent.dispatcher().registry().names().join(", ");
        format!(
            "Available commands:\n\
             \x20 /help            Show this help message\n\
             \x20 /mode            Cycle permission mode (default -> accept-edits -> yolo)\n\
             \x20 /model <name>    Switch to a different model\n\
             \x20 /clear           Clear conversation history\n\
             \x20 /tokens          Show token usage\n\
             \x20 /quit            Exit\n\
             \n\
             Current model: {}\n\
             Permission mode: {} ({})\n\
             \n\
             Available tools:\n\
             \x20 {}",
            self.context.model,
            self.context.mode,
            self.context.mode.description(),
            tools
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(UserInput::parse("   "), UserInput::Empty);
        assert_eq!(UserInput::parse("EXIT"), UserInput::Command(SlashCommand::Quit));
        assert_eq!(
            UserInput::parse("  list the files "),
            UserInput::Message("list the files".into())
        );
    }

    #[test]
    fn test_parse_slash_commands() {
        assert_eq!(SlashCommand::parse("/HELP"), SlashCommand::Help);
        assert_eq!(SlashCommand::parse("/mode"), SlashCommand::Mode);
        assert_eq!(SlashCommand::parse("/model"), SlashCommand::Model(None));
        assert_eq!(
            SlashCommand::parse("/model   llama3:8b "),
            SlashCommand::Model(Some("llama3:8b".into()))
        );
        assert_eq!(SlashCommand::parse("/exit"), SlashCommand::Quit);
        assert_eq!(SlashCommand::parse("/Frobnicate now"), SlashCommand::Unknown("/frobnicate".into()));
    }
}
