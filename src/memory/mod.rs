//! Conversation memory.
//!
//! A token-budgeted rolling window over the conversation: the engine feeds
//! it every turn and reads it back when building model context. Display
//! history is unbounded elsewhere; only what is sent to the model is
//! bounded here.

use std::collections::VecDeque;

use crate::types::Message;

/// Estimates token count for a text (rough approximation).
///
/// Uses a simple heuristic of ~4 characters per token for English text.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// Token-budgeted rolling window over conversation turns.
///
/// Oldest turns are evicted first once the estimated token total exceeds
/// the budget, so the history forwarded to the model never exceeds it.
pub struct ChatMemoryBuffer {
    token_limit: usize,
    messages: VecDeque<Message>,
}

impl ChatMemoryBuffer {
    /// Create a buffer with the given token budget.
    pub fn new(token_limit: usize) -> Self {
        Self {
            token_limit,
            messages: VecDeque::new(),
        }
    }

    /// Append a turn, evicting the oldest turns until the buffer fits the
    /// budget again. A single over-budget turn empties the buffer entirely
    /// rather than exceeding the limit.
    pub fn push(&mut self, message: Message) {
        self.messages.push_back(message);
        while self.total_tokens() > self.token_limit && !self.messages.is_empty() {
            self.messages.pop_front();
        }
    }

    /// Current `(role, content)` history in chronological order.
    pub fn history(&self) -> Vec<(String, String)> {
        self.messages
            .iter()
            .map(|m| (m.role.as_str().to_string(), m.content.clone()))
            .collect()
    }

    /// Estimated token total of the buffered turns.
    pub fn total_tokens(&self) -> usize {
        self.messages.iter().map(|m| estimate_tokens(&m.content)).sum()
    }

    /// Number of buffered turns.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the buffer holds no turns.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Configured token budget.
    pub fn token_limit(&self) -> usize {
        self.token_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageRole;

    fn msg(content: &str) -> Message {
        Message::new(MessageRole::User, content)
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("test"), 1);
        assert_eq!(estimate_tokens("this is a longer test string"), 7);
    }

    #[test]
    fn test_push_and_history_order() {
        let mut buffer = ChatMemoryBuffer::new(1000);
        buffer.push(msg("first"));
        buffer.push(Message::new(MessageRole::Assistant, "second"));

        let history = buffer.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], ("user".to_string(), "first".to_string()));
        assert_eq!(history[1], ("assistant".to_string(), "second".to_string()));
    }

    #[test]
    fn test_evicts_oldest_first() {
        // Each message is ~5 tokens; budget fits two of them
        let mut buffer = ChatMemoryBuffer::new(10);
        buffer.push(msg("aaaaaaaaaaaaaaaaaaaa")); // 20 chars = 5 tokens
        buffer.push(msg("bbbbbbbbbbbbbbbbbbbb"));
        buffer.push(msg("cccccccccccccccccccc"));

        let history = buffer.history();
        assert_eq!(history.len(), 2);
        assert!(history[0].1.starts_with('b'));
        assert!(history[1].1.starts_with('c'));
    }

    #[test]
    fn test_never_exceeds_budget() {
        let mut buffer = ChatMemoryBuffer::new(25);
        for i in 0..50 {
            buffer.push(msg(&format!("message number {} with some padding", i)));
            assert!(buffer.total_tokens() <= buffer.token_limit());
        }
    }

    #[test]
    fn test_single_oversized_message_empties_buffer() {
        let mut buffer = ChatMemoryBuffer::new(5);
        buffer.push(msg(&"x".repeat(400)));

        assert!(buffer.is_empty());
        assert_eq!(buffer.total_tokens(), 0);
    }
}
