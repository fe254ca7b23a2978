//! Conversation Log
//!
//! Append-only, ordered record of the dialogue between the user and the
//! copilot.

use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in the conversation.
///
/// Messages are only created by [`ConversationStore::append`], which assigns
/// the sequence number; fields are read-only from outside the crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    role: Role,
    text: String,
    sequence_number: u64,
}

impl Message {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }
}

/// Append-only log of messages with strictly increasing sequence numbers.
///
/// Sequence numbers keep increasing across [`ConversationStore::clear`], so a
/// message from before a reset can never be confused with one after it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationStore {
    messages: Vec<Message>,
    next_sequence: u64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return the stored copy
    pub fn append(&mut self, role: Role, text: impl Into<String>) -> &Message {
        self.next_sequence += 1;
        self.messages.push(Message {
            role,
            text: text.into(),
            sequence_number: self.next_sequence,
        });
        &self.messages[self.messages.len() - 1]
    }

    /// All messages in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent `limit` messages, in order
    pub fn recent(&self, limit: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop every message
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
