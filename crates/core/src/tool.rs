//! Tool trait: the abstraction over the agent's lookup capabilities.
//!
//! The tool set is closed: [`ToolName`] enumerates every tool the agent may
//! call. A name coming back from the completion backend is validated against
//! that enumeration before anything is dispatched, so an unknown name is a
//! fault rather than a silent no-op.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use crate::error::ToolError;
use crate::provider::ToolDefinition;

/// Every tool the agent can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    SearchMovieByName,
    GetStreamingLink,
    SearchTvSeriesByName,
    GetTvSeriesDetails,
    GetTvSeriesStreamingLink,
    GetAllEpisodeLinksForSeason,
}

impl ToolName {
    pub const ALL: [ToolName; 6] = [
        ToolName::SearchMovieByName,
        ToolName::GetStreamingLink,
        ToolName::SearchTvSeriesByName,
        ToolName::GetTvSeriesDetails,
        ToolName::GetTvSeriesStreamingLink,
        ToolName::GetAllEpisodeLinksForSeason,
    ];

    /// The wire name declared to the completion backend.
    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::SearchMovieByName => "search_movie_by_name",
            ToolName::GetStreamingLink => "get_streaming_link",
            ToolName::SearchTvSeriesByName => "search_tv_series_by_name",
            ToolName::GetTvSeriesDetails => "get_tv_series_details",
            ToolName::GetTvSeriesStreamingLink => "get_tv_series_streaming_link",
            ToolName::GetAllEpisodeLinksForSeason => "get_all_episode_links_for_season",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool(s.to_string()))
    }
}

/// A request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the LLM's tool_call.id)
    pub id: String,

    /// Name of the tool to execute, as sent by the backend
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// The output content handed back to the model
    pub output: String,

    /// Structured form of the output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    /// Build a result whose text output is the JSON rendering of `value`.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        let data = serde_json::to_value(value)?;
        Ok(Self {
            call_id: String::new(),
            output: data.to_string(),
            data: Some(data),
        })
    }
}

/// The core Tool trait.
///
/// Tools are stateless: everything they need arrives in `arguments`, and
/// they never depend on another tool's internal state.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Which member of the fixed tool set this is.
    fn name(&self) -> ToolName;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().as_str().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Dispatch table from tool identifier to handler.
///
/// Ordered by [`ToolName`] so the definitions sent to the backend are stable
/// from one request to the next.
pub struct ToolRegistry {
    tools: BTreeMap<ToolName, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name(), tool);
    }

    /// Get all tool definitions (for sending to the LLM).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Validate the call's name, then execute the matching handler.
    pub async fn execute(&self, call: &ToolCall) -> std::result::Result<ToolResult, ToolError> {
        let name: ToolName = call.name.parse()?;
        let tool = self
            .tools
            .get(&name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        let mut result = tool.execute(call.arguments.clone()).await?;
        result.call_id = call.id.clone();
        Ok(result)
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<ToolName> {
        self.tools.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
