//! Message and conversation-history domain types.
//!
//! [`Message`] is what flows between the agent and the completion backend
//! within a single turn. [`HistoryEntry`] is what the calling session layer
//! remembers *across* turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions
    System,
    /// Tool execution result
    Tool,
}

/// A single message in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content.into())
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content.into())
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content.into())
    }

    /// Create a tool result message.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut msg = Self::with_role(Role::Tool, content.into());
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }
}

/// A tool call embedded in an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageToolCall {
    /// Unique ID for this tool call
    pub id: String,

    /// Name of the tool to invoke, exactly as the backend sent it
    pub name: String,

    /// Arguments as JSON string
    pub arguments: String,
}

/// One remembered turn of a conversation, as kept by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl HistoryEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Label used when the entry is replayed into a prompt.
    ///
    /// Anything that is not the user reads as the assistant.
    pub fn speaker(&self) -> &'static str {
        match self.role {
            Role::User => "User",
            _ => "Assistant",
        }
    }
}

/// Default number of entries a session keeps (five exchanges).
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// An ordered, bounded record of prior turns.
///
/// Oldest entries are evicted first once `limit` is exceeded.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl ConversationHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit + 2),
            limit,
        }
    }

    /// Record a completed exchange: the user's message, then the answer.
    pub fn record_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.entries.push_back(HistoryEntry::user(user));
        self.entries.push_back(HistoryEntry::assistant(assistant));
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    /// A contiguous snapshot of all entries, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
