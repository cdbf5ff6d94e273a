//! # ReelBot Core
//!
//! Domain types, traits, and error definitions for the ReelBot streaming-link
//! agent. This crate has **zero framework dependencies**: it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here. Implementations live in their
//! respective crates:
//! - the completion backend ([`Provider`]) in `reelbot-providers`
//! - the lookup tools ([`Tool`]) in `reelbot-tools`
//!
//! The agent and the HTTP layer only ever see these traits, so tests can swap
//! in scripted providers and stub catalogs.

pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{AgentError, CatalogError, Error, ProviderError, Result, ToolError};
pub use event::{DomainEvent, EventBus};
pub use message::{ConversationHistory, HistoryEntry, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ResponseFormat, ToolDefinition};
pub use tool::{Tool, ToolCall, ToolName, ToolRegistry, ToolResult};
