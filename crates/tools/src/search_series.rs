//! `search_tv_series_by_name`: title search against the series catalog.

use async_trait::async_trait;
use reelbot_core::error::ToolError;
use reelbot_core::tool::{Tool, ToolName, ToolResult};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::catalog::Catalog;
use crate::{catalog_failure, json_output, parse_arguments};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Args {
    series_name: String,
}

pub struct SearchSeriesTool {
    catalog: Arc<dyn Catalog>,
}

impl SearchSeriesTool {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for SearchSeriesTool {
    fn name(&self) -> ToolName {
        ToolName::SearchTvSeriesByName
    }

    fn description(&self) -> &str {
        "Searches for TV series by name in The Movie Database (TMDB) and returns a list of \
         matching TV shows with their IDs and titles. Use this tool first to find the correct \
         TV series ID based on the user's query."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "seriesName": {
                    "type": "string",
                    "description": "The title or partial title of the TV series to search for (e.g., 'Breaking Bad', 'Game of Thrones')"
                }
            },
            "required": ["seriesName"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: Args = parse_arguments(self.name(), arguments)?;
        let matches = self
            .catalog
            .search_series(&args.series_name)
            .await
            .map_err(catalog_failure(self.name()))?;
        debug!(query = %args.series_name, hits = matches.len(), "Series search");
        json_output(self.name(), &matches)
    }
}
