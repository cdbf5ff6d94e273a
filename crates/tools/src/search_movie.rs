//! `search_movie_by_name`: title search against the movie catalog.

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
    movie_name: String,
}

pub struct SearchMovieTool {
    catalog: Arc<dyn Catalog>,
}

impl SearchMovieTool {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for SearchMovieTool {
    fn name(&self) -> ToolName {
        ToolName::SearchMovieByName
    }

    fn description(&self) -> &str {
        "Searches for movies by name in The Movie Database (TMDB) and returns a list of \
         matching movies with their IDs and titles. Use this tool first to find the correct \
         movie ID based on the user's query."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "movieName": {
                    "type": "string",
                    "description": "The title or partial title of the movie to search for (e.g., 'Inception', 'The Dark Knight')"
                }
            },
            "required": ["movieName"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: Args = parse_arguments(self.name(), arguments)?;
        let matches = self
            .catalog
            .search_movies(&args.movie_name)
            .await
            .map_err(catalog_failure(self.name()))?;
        debug!(query = %args.movie_name, hits = matches.len(), "Movie search");
        json_output(self.name(), &matches)
    }
}
