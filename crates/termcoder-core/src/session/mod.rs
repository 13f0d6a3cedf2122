//! Session module - conversation state and the turn loop
//!
//! - `Session`: owns mode, model and history across turns; handles slash commands
//! - `AgentLoop`: runs one user turn through model and tool rounds
//! - `Conversation`: append-only history with checkpoint rollback
//! - `SessionOutput`/`OutputSink`: progress events for the front end
//!
//! # Example Usage
//!
//! ```ignore
//! use termcoder_core::session::{Session, UserInput, CommandOutcome};
//!
//! match UserInput::parse(&line) {
//!     UserInput::Command(cmd) => match session.handle_command(cmd) {
//!         CommandOutcome::Quit => break,
//!         other => render(other),
//!     },
//!     UserInput::Message(text) => {
//!         session.submit(&text, &confirmer, &sink, &cancel).await?;
//!     }
//!     UserInput::Empty => {}
//! }
//! ```

mod agent_loop;
mod controller;
mod history;
pub mod types;

pub use agent_loop::AgentLoop;
pub use controller::{CommandOutcome, Session, SlashCommand, UserInput};
pub use history::{Checkpoint, Conversation, TokenUsage};
pub use types::{Message, NullSink, OutputSink, Role, SessionContext, SessionOutput, ToolCall, TurnOutcome};
