//! Conversation orchestrator
//!
//! Drives one user turn at a time:
//!
//! ```text
//! user text ─▶ append user message
//!                 │
//!                 ▼
//!          ┌─▶ model call ──(cancel / transport error)──▶ roll back turn
//!          │      │
//!          │      ▼
//!          │   append assistant message
//!          │      │
//!          │      ├── no tool calls ──▶ final answer
//!          │      ▼
//!          └── dispatch each call in order, append one tool message each
//! ```
//!
//! Tool calls run strictly one after another in the order the model asked
//! for them, since later calls may depend on earlier side effects. The number
//! of tool rounds per turn is capped; hitting the cap ends the turn without
//! losing history.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::approval::Confirmer;
use crate::config::defaults;
use crate::error::Result;
use crate::orchestration::ToolDispatcher;
use crate::provider::{ChatRequest, ModelClient, Usage};
use crate::tools::ToolOutput;

use super::history::{Checkpoint, Conversation, TokenUsage};
use super::types::{Message, OutputSink, SessionContext, SessionOutput, TurnOutcome};

/// Owns the conversation and runs the model/tool loop
pub struct AgentLoop {
    client: Arc<dyn ModelClient>,
    dispatcher: ToolDispatcher,
    system_prompt: String,
    conversation: Conversation,
    usage: TokenUsage,
    max_tool_rounds: usize,
    think: bool,
}

impl AgentLoop {
    pub fn new(client: Arc<dyn ModelClient>, dispatcher: ToolDispatcher, system_prompt: impl Into<String>) -> Self {
        Self {
            client,
            dispatcher,
            system_prompt: system_prompt.into(),
            conversation: Conversation::new(),
            usage: TokenUsage::default(),
            max_tool_rounds: defaults::MAX_TOOL_ROUNDS,
            think: true,
        }
    }

    /// Cap on consecutive tool rounds within one user turn (minimum 1)
    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds.max(1);
        self
    }

    /// Whether to request reasoning traces from the model
    pub fn with_thinking(mut self, think: bool) -> Self {
        self.think = think;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn usage(&self) -> TokenUsage {
        self.usage
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn max_tool_rounds(&self) -> usize {
        self.max_tool_rounds
    }

    /// Drop all messages and reset the usage counters
    pub fn reset(&mut self) {
        self.conversation.clear();
        self.usage.reset();
    }

    /// Run one user turn until the model answers without tool calls
    ///
    /// On cancellation the turn is rolled back and `TurnOutcome::Cancelled`
    /// is returned. A transport failure is rolled back the same way and
    /// returned as the error.
    pub async fn run_turn(
        &mut self,
        ctx: &SessionContext,
        input: &str,
        confirmer: &dyn Confirmer,
        sink: &dyn OutputSink,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome> {
        let checkpoint = self.conversation.checkpoint();
        self.conversation.push(Message::user(input));

        let mut turn_usage = Usage::default();
        let mut rounds = 0;

        loop {
            let request = ChatRequest {
                model: ctx.model.clone(),
                system: self.system_prompt.clone(),
                messages: self.conversation.messages().to_vec(),
                tools: self.dispatcher.definitions(),
                think: self.think,
            };

            debug!(model = %ctx.model, messages = request.messages.len(), round = rounds, "Calling model");
            sink.emit(SessionOutput::ModelCallStarted {
                model: ctx.model.clone(),
            });
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self.client.chat(request) => Some(result),
            };
            sink.emit(SessionOutput::ModelCallFinished);

            let response = match result {
                None => {
                    self.abandon_turn(checkpoint, "cancelled");
                    return Ok(TurnOutcome::Cancelled);
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Model call failed");
                    self.abandon_turn(checkpoint, "model call failed");
                    return Err(e);
                }
                Some(Ok(response)) => response,
            };

            self.usage.add(response.usage);
            turn_usage += response.usage;

            let message = response.message;
            if let Some(thinking) = message.thinking.as_ref().filter(|t| !t.trim().is_empty()) {
                sink.emit(SessionOutput::Thinking {
                    content: thinking.clone(),
                });
            }

            let tool_calls = message.tool_calls.clone();
            self.conversation.push(message);

            if tool_calls.is_empty() {
                let content = self.conversation.last().map(|m| m.text().to_string()).unwrap_or_default();
                sink.emit(SessionOutput::AssistantMessage {
                    content: content.clone(),
                });
                return Ok(TurnOutcome::Answered {
                    content,
                    usage: turn_usage,
                });
            }

            if rounds >= self.max_tool_rounds {
                warn!(rounds, "Tool round limit reached");
                let skipped = ToolOutput::error(format!(
                    "Not executed: limit of {} tool rounds reached for this turn",
                    self.max_tool_rounds
                ));
                for call in &tool_calls {
                    self.conversation.push(Message::tool(&call.name, skipped.to_llm_string()));
                }
                sink.emit(SessionOutput::RoundLimitReached { rounds });
                return Ok(TurnOutcome::RoundLimitReached {
                    rounds,
                    usage: turn_usage,
                });
            }
            rounds += 1;

            for call in tool_calls {
                sink.emit(SessionOutput::ToolCall {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                });

                let output = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    output = self.dispatcher.dispatch(&call.name, &call.arguments, ctx.mode, confirmer) => Some(output),
                };
                let Some(output) = output else {
                    self.abandon_turn(checkpoint, "cancelled during tool execution");
                    return Ok(TurnOutcome::Cancelled);
                };

                self.conversation
                    .push(Message::tool(&call.name, output.to_llm_string()));
                sink.emit(SessionOutput::ToolResult {
                    name: call.name,
                    arguments: call.arguments,
                    output,
                });
            }
        }
    }

    fn abandon_turn(&mut self, checkpoint: Checkpoint, why: &str) {
        let removed = self.conversation.rollback(checkpoint);
        info!(removed, reason = why, "Rolled back turn");
    }
}
