//! Conversation history and token accounting

use crate::formatting::format_thousands;
use crate::provider::Usage;

use super::types::Message;

/// Position in the history that a failed turn can roll back to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Append-only message history
///
/// Messages are never edited. The history only shrinks through
/// [`Conversation::rollback`] (failed or cancelled turn) and
/// [`Conversation::clear`] (explicit reset).
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Mark the current end of the history
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.messages.len())
    }

    /// Drop everything appended after `checkpoint`; returns how many messages went
    pub fn rollback(&mut self, checkpoint: Checkpoint) -> usize {
        let removed = self.messages.len().saturating_sub(checkpoint.0);
        self.messages.truncate(checkpoint.0);
        removed
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Running total of token usage for a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn add(&mut self, usage: Usage) {
        self.input_tokens += usage.input_tokens;
        self.output_tokens += usage.output_tokens;
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl std::fmt::Display for TokenUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} tokens (in: {}, out: {})",
            format_thousands(self.total()),
            format_thousands(self.input_tokens),
            format_thousands(self.output_tokens)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollback_to_checkpoint() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("first"));
        let checkpoint = conversation.checkpoint();
        conversation.push(Message::user("second"));
        conversation.push(Message::tool("read_file", "{}"));

        assert_eq!(conversation.rollback(checkpoint), 2);
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages()[0].text(), "first");

        // Rolling back twice is harmless
        assert_eq!(conversation.rollback(checkpoint), 0);
    }

    #[test]
    fn test_usage_display() {
        let mut usage = TokenUsage::default();
        usage.add(Usage::new(12_000, 345));
        usage.add(Usage::new(1_000, 5));
        assert_eq!(usage.to_string(), "13,350 tokens (in: 13,000, out: 350)");

        usage.reset();
        assert_eq!(usage.to_string(), "0 tokens (in: 0, out: 0)");
    }
}
