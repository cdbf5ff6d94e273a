//! Error types for the ReelBot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; they all fold into [`Error`].
//!
//! A guardrail rejection is *not* represented here. Rejections
//! are a normal outcome of a turn; only faults travel through `Err`.

use thiserror::Error;

/// The top-level error type for all ReelBot operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Completion backend errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Agent run errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures talking to the movie/TV catalog service.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("catalog returned status {status_code}: {message}")]
    Http { status_code: u16, message: String },

    #[error("catalog request failed: {0}")]
    Network(String),

    #[error("catalog response could not be decoded: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    /// The completion backend asked for a name outside the fixed tool set.
    #[error("Unknown tool requested: {0}")]
    UnknownTool(String),

    /// The name is valid but no handler is registered for it.
    #[error("Tool not registered: {0}")]
    NotFound(String),

    #[error("Invalid arguments for {tool_name}: {reason}")]
    InvalidArguments { tool_name: String, reason: String },

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("{tool_name} failed: {source}")]
    Catalog {
        tool_name: String,
        #[source]
        source: CatalogError,
    },
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Max turns ({max_turns}) exceeded without a final answer")]
    MaxTurnsExceeded { max_turns: u32 },

    /// A structured-output completion did not match its declared schema.
    #[error("Malformed {stage} output: {reason}")]
    MalformedOutput { stage: String, reason: String },

    #[error("Answer contains links not produced by any tool: {}", .0.join(", "))]
    UngroundedLinks(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn catalog_failure_inside_tool_keeps_status() {
        let err = Error::Tool(ToolError::Catalog {
            tool_name: "search_movie_by_name".into(),
            source: CatalogError::Http {
                status_code: 401,
                message: "Invalid API key".into(),
            },
        });
        let text = err.to_string();
        assert!(text.contains("search_movie_by_name"));
        assert!(text.contains("401"));
    }

    #[test]
    fn ungrounded_links_lists_every_url() {
        let err = AgentError::UngroundedLinks(vec![
            "https://a.example/1".into(),
            "https://b.example/2".into(),
        ]);
        assert_eq!(
            err.to_string(),
            "Answer contains links not produced by any tool: https://a.example/1, https://b.example/2"
        );
    }
}
