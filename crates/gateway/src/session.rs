//! Per-session conversation history.

use std::collections::HashMap;
use reelbot_core::message::{ConversationHistory, HistoryEntry};
use tokio::sync::RwLock;

/// Session id used when a request does not carry one.
pub const DEFAULT_SESSION: &str = "default";

/// In-memory map from session id to its bounded history.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, ConversationHistory>>,
    history_limit: usize,
}

impl SessionStore {
    pub fn new(history_limit: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            history_limit,
        }
    }

    /// Copy of a session's history, oldest first. Unknown sessions are empty.
    pub async fn history(&self, session_id: &str) -> Vec<HistoryEntry> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|h| h.entries())
            .unwrap_or_default()
    }

    /// Append a completed exchange, creating the session if needed.
    pub async fn record(&self, session_id: &str, user: &str, assistant: &str) {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| ConversationHistory::new(self.history_limit))
            .record_exchange(user, assistant);
    }

    /// Forget a session. Returns whether it existed.
    pub async fn reset(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
