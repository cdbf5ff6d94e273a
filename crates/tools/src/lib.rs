//! Lookup tools for ReelBot.
//!
//! Six stateless tools sit between the agent and the outside world: two
//! catalog searches, one series detail fetch, and three embed-link
//! derivations. Catalog access goes through the [`Catalog`] trait so tests
//! can swap in a stub.

pub mod catalog;
pub mod embed;
pub mod episode_link;
pub mod movie_link;
pub mod search_movie;
pub mod search_series;
pub mod season_links;
pub mod series_details;

pub use catalog::{Catalog, MediaMatch, SeasonSummary, SeriesDetails, TmdbCatalog};
pub use embed::EmbedLinks;

use reelbot_core::error::{CatalogError, ToolError};
use reelbot_core::tool::{ToolName, ToolRegistry, ToolResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Build a registry holding all six lookup tools.
pub fn media_registry(catalog: Arc<dyn Catalog>, embed: EmbedLinks) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(search_movie::SearchMovieTool::new(catalog.clone())));
    registry.register(Box::new(movie_link::MovieLinkTool::new(embed.clone())));
    registry.register(Box::new(search_series::SearchSeriesTool::new(catalog.clone())));
    registry.register(Box::new(series_details::SeriesDetailsTool::new(catalog)));
    registry.register(Box::new(episode_link::EpisodeLinkTool::new(embed.clone())));
    registry.register(Box::new(season_links::SeasonLinksTool::new(embed)));
    registry
}

/// Deserialize a tool's arguments into its typed parameter struct.
pub(crate) fn parse_arguments<T: DeserializeOwned>(
    tool: ToolName,
    arguments: serde_json::Value,
) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
        tool_name: tool.to_string(),
        reason: e.to_string(),
    })
}

/// Accept `8` and `8.0` alike; models sometimes emit integral floats.
pub(crate) fn whole_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: TryFrom<u64>,
{
    use serde::de::Error;

    let number = serde_json::Number::deserialize(deserializer)?;
    let value = match number.as_u64() {
        Some(v) => v,
        None => match number.as_f64() {
            Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => f as u64,
            _ => return Err(D::Error::custom(format!("expected a non-negative integer, got {number}"))),
        },
    };
    T::try_from(value).map_err(|_| D::Error::custom(format!("{value} is out of range")))
}

pub(crate) fn json_output<T: Serialize>(tool: ToolName, value: &T) -> Result<ToolResult, ToolError> {
    ToolResult::json(value).map_err(|e| ToolError::ExecutionFailed {
        tool_name: tool.to_string(),
        reason: e.to_string(),
    })
}

/// A single URL as the tool output, unquoted.
pub(crate) fn link_output(link: String) -> ToolResult {
    ToolResult {
        call_id: String::new(),
        data: Some(serde_json::Value::String(link.clone())),
        output: link,
    }
}

pub(crate) fn catalog_failure(tool: ToolName) -> impl FnOnce(CatalogError) -> ToolError {
    move |source| ToolError::Catalog {
        tool_name: tool.to_string(),
        source,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_support::StubCatalog;

    #[test]
    fn registry_holds_all_six_tools() {
        let registry = media_registry(Arc::new(StubCatalog::default()), EmbedLinks::default());
        assert_eq!(registry.len(), 6);
        assert_eq!(registry.names(), ToolName::ALL.to_vec());
    }

    #[test]
    fn every_definition_declares_an_object_schema() {
        let registry = media_registry(Arc::new(StubCatalog::default()), EmbedLinks::default());
        for def in registry.definitions() {
            assert_eq!(def.parameters["type"], "object", "{}", def.name);
            assert!(def.parameters["required"].as_array().is_some_and(|r| !r.is_empty()));
            assert!(!def.description.is_empty());
        }
    }

    #[test]
    fn bad_arguments_name_the_tool() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Args {
            movie_id: u64,
        }
        let err = parse_arguments::<Args>(ToolName::GetStreamingLink, serde_json::json!({}))
            .unwrap_err();
        assert!(err.to_string().contains("get_streaming_link"));
    }
}
