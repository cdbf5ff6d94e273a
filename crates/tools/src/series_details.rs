//! `get_tv_series_details`: season and episode structure of one series.

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
    #[serde(deserialize_with = "crate::whole_number")]
    series_id: u64,
}

pub struct SeriesDetailsTool {
    catalog: Arc<dyn Catalog>,
}

impl SeriesDetailsTool {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for SeriesDetailsTool {
    fn name(&self) -> ToolName {
        ToolName::GetTvSeriesDetails
    }

    fn description(&self) -> &str {
        "Retrieves detailed information about a TV series using its TMDB ID, including the \
         number of seasons and episodes. Use this tool after obtaining the TV series ID from \
         the search_tv_series_by_name tool to understand the series structure before \
         generating streaming links."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "seriesId": {
                    "type": "number",
                    "description": "The Movie Database (TMDB) ID of the TV series"
                }
            },
            "required": ["seriesId"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: Args = parse_arguments(self.name(), arguments)?;
        let details = self
            .catalog
            .series_details(args.series_id)
            .await
            .map_err(catalog_failure(self.name()))?;
        debug!(
            series_id = args.series_id,
            seasons = details.number_of_seasons,
            "Series details"
        );
        json_output(self.name(), &details)
    }
}
