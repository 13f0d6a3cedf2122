//! Orchestration shared by every front end
//!
//! - Tool dispatch through the interceptor and the permission gate
//! - System prompt generation

mod dispatcher;
mod system_prompt;

pub use dispatcher::ToolDispatcher;
pub use system_prompt::{DEFAULT_GUIDELINES, SystemPrompt};
