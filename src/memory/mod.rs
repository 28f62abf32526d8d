//! Conversation memory for the chat loop.
//!
//! The transcript only ever grows, two messages per answered question:
//! the user's input first, then the model's answer.

use crate::types::{Message, MessageRole};

/// Ordered human/AI transcript of one chat session.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    messages: Vec<Message>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one turn: the question as a user message, then the answer.
    pub fn record_turn(&mut self, question: &str, answer: &str) {
        self.messages.push(Message::new(MessageRole::User, question));
        self.messages.push(Message::new(MessageRole::Assistant, answer));
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

    /// Completed question/answer turns.
    pub fn turns(&self) -> usize {
        self.messages.len() / 2
    }

    /// Messages to send to the model: the last `window` of them, or all when
    /// `window` is 0.
    pub fn window(&self, window: usize) -> Vec<Message> {
        if window == 0 {
            self.messages.clone()
        } else {
            truncate_history(&self.messages, window)
        }
    }
}

/// Truncates conversation history to a window of recent messages.
///
/// # Arguments
/// * `history` - Full conversation history
/// * `window_size` - Maximum number of messages to keep
///
/// # Returns
/// A new vector containing only the most recent messages.
pub fn truncate_history(history: &[Message], window_size: usize) -> Vec<Message> {
    if history.len() <= window_size {
        history.to_vec()
    } else {
        history[history.len() - window_size..].to_vec()
    }
}

/// `(role, content)` pairs in the shape [`LLMClient::generate_with_history`]
/// expects.
///
/// [`LLMClient::generate_with_history`]: crate::llm::LLMClient::generate_with_history
pub fn to_role_pairs(history: &[Message]) -> Vec<(String, String)> {
    history
        .iter()
        .map(|m| (m.role.as_str().to_string(), m.content.clone()))
        .collect()
}
