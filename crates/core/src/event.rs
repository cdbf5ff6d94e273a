//! Domain event system: observation hooks for a running turn.
//!
//! Events are published when something interesting happens during a turn.
//! Nothing in the core reacts to them; subscribers are log sinks and tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// The guardrail decided whether a query may proceed
    QueryClassified {
        accepted: bool,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// A lookup tool was executed
    ToolExecuted {
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The backend produced a completion
    ResponseGenerated {
        model: String,
        tokens_used: u32,
        timestamp: DateTime<Utc>,
    },

    /// A run failed
    ErrorOccurred {
        context: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
