//! Query processor: one user turn in, one normalized outcome out.
//!
//! This is the single place where an `Err` from the agent becomes a
//! user-facing failure. Nothing here retries or caches.

use std::sync::Arc;
use reelbot_core::error::ProviderError;
use reelbot_core::event::EventBus;
use reelbot_core::message::HistoryEntry;
use reelbot_tools::{EmbedLinks, TmdbCatalog, media_registry};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::{info, warn};

use crate::loop_runner::{AgentLoop, AgentOutcome};

/// Number of prior entries replayed into the prompt.
pub const DEFAULT_CONTEXT_TURNS: usize = 2;

/// Result of processing one query.
///
/// Serializes to one of:
/// - `{"success": true, "output": ...}`
/// - `{"success": false, "rejected": true, "reason": ...}`
/// - `{"success": false, "error": ...}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Answered { output: String },
    Rejected { reason: String },
    Failed { error: String },
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Answered { .. })
    }
}

impl Serialize for QueryOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QueryOutcome::Answered { output } => {
                let mut s = serializer.serialize_struct("QueryOutcome", 2)?;
                s.serialize_field("success", &true)?;
                s.serialize_field("output", output)?;
                s.end()
            }
            QueryOutcome::Rejected { reason } => {
                let mut s = serializer.serialize_struct("QueryOutcome", 3)?;
                s.serialize_field("success", &false)?;
                s.serialize_field("rejected", &true)?;
                s.serialize_field("reason", reason)?;
                s.end()
            }
            QueryOutcome::Failed { error } => {
                let mut s = serializer.serialize_struct("QueryOutcome", 2)?;
                s.serialize_field("success", &false)?;
                s.serialize_field("error", error)?;
                s.end()
            }
        }
    }
}

/// Build the prompt the tool loop sees.
///
/// With no history the prompt is the query itself. Otherwise the last
/// `context_turns` entries are replayed as `User: ...` / `Assistant: ...`
/// lines under a `Previous context:` header, followed by the current request.
pub fn compose_prompt(query: &str, history: &[HistoryEntry], context_turns: usize) -> String {
    if history.is_empty() || context_turns == 0 {
        return query.to_string();
    }

    let start = history.len().saturating_sub(context_turns);
    let recent = history[start..]
        .iter()
        .map(|entry| format!("{}: {}", entry.speaker(), entry.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!("Previous context:\n{recent}\n\nCurrent request: {query}")
}

/// Wraps an [`AgentLoop`] with prompt composition and outcome mapping.
pub struct QueryProcessor {
    agent: AgentLoop,
    context_turns: usize,
}

impl QueryProcessor {
    pub fn new(agent: AgentLoop) -> Self {
        Self {
            agent,
            context_turns: DEFAULT_CONTEXT_TURNS,
        }
    }

    /// Wire the full pipeline from configuration: provider, catalog, tools, agent.
    pub fn from_config(
        config: &reelbot_config::AppConfig,
        event_bus: Arc<EventBus>,
    ) -> Result<Self, ProviderError> {
        if !config.default_provider_ready() {
            return Err(ProviderError::NotConfigured(format!(
                "no API key for '{}'; set GROQ_API_KEY or api_key in config.toml",
                config.default_provider
            )));
        }
        if !config.has_catalog_key() {
            warn!("No catalog API key configured; catalog lookups will fail (set TMDB_API_KEY)");
        }

        let provider = reelbot_providers::router::build_from_config(config).require_default()?;
        let catalog = Arc::new(TmdbCatalog::from_config(&config.catalog));
        let tools = Arc::new(media_registry(catalog, EmbedLinks::from_config(&config.embed)));

        let agent = AgentLoop::from_config(config, provider, tools, event_bus);
        Ok(Self::new(agent).with_context_turns(config.agent.context_turns))
    }

    pub fn with_context_turns(mut self, turns: usize) -> Self {
        self.context_turns = turns;
        self
    }

    pub fn agent(&self) -> &AgentLoop {
        &self.agent
    }

    /// Process one turn against the caller's recent history.
    pub async fn process_query(&self, query: &str, history: &[HistoryEntry]) -> QueryOutcome {
        let query = query.trim();
        if query.is_empty() {
            return QueryOutcome::Failed {
                error: "Message is required".into(),
            };
        }

        info!(history = history.len(), chars = query.len(), "Processing query");
        let prompt = compose_prompt(query, history, self.context_turns);

        match self.agent.run(query, &prompt).await {
            Ok(AgentOutcome::Answered { output, tool_calls }) => {
                info!(tool_calls = tool_calls.len(), "Query answered");
                QueryOutcome::Answered { output }
            }
            Ok(AgentOutcome::Rejected { reason }) => QueryOutcome::Rejected { reason },
            Err(e) => {
                warn!(error = %e, "Query failed");
                QueryOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
