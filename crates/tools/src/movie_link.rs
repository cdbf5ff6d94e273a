//! `get_streaming_link`: embed URL for a movie id.

use async_trait::async_trait;
use reelbot_core::error::ToolError;
use reelbot_core::tool::{Tool, ToolName, ToolResult};
use serde::Deserialize;

use crate::embed::EmbedLinks;
use crate::{link_output, parse_arguments};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Args {
    #[serde(deserialize_with = "crate::whole_number")]
    movie_id: u64,
}

pub struct MovieLinkTool {
    links: EmbedLinks,
}

impl MovieLinkTool {
    pub fn new(links: EmbedLinks) -> Self {
        Self { links }
    }
}

#[async_trait]
impl Tool for MovieLinkTool {
    fn name(&self) -> ToolName {
        ToolName::GetStreamingLink
    }

    fn description(&self) -> &str {
        "Generates a streaming link for a specific movie using its TMDB ID. This tool \
         constructs an embeddable video player URL that can be used to watch the movie. Call \
         this tool after obtaining the movie ID from the search_movie_by_name tool."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "movieId": {
                    "type": "number",
                    "description": "The Movie Database (TMDB) ID of the movie for which to generate a streaming link"
                }
            },
            "required": ["movieId"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: Args = parse_arguments(self.name(), arguments)?;
        Ok(link_output(self.links.movie(args.movie_id)))
    }
}
