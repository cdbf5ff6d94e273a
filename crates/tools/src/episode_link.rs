//! `get_tv_series_streaming_link`: embed URL for one episode.

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
    series_id: u64,
    #[serde(deserialize_with = "crate::whole_number")]
    season_number: u32,
    #[serde(deserialize_with = "crate::whole_number")]
    episode_number: u32,
}

pub struct EpisodeLinkTool {
    links: EmbedLinks,
}

impl EpisodeLinkTool {
    pub fn new(links: EmbedLinks) -> Self {
        Self { links }
    }
}

#[async_trait]
impl Tool for EpisodeLinkTool {
    fn name(&self) -> ToolName {
        ToolName::GetTvSeriesStreamingLink
    }

    fn description(&self) -> &str {
        "Generates a streaming link for a specific episode of a TV series using its TMDB ID, \
         season number, and episode number. Call this tool after obtaining the series ID and \
         understanding the series structure from the get_tv_series_details tool."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "seriesId": {
                    "type": "number",
                    "description": "The Movie Database (TMDB) ID of the TV series"
                },
                "seasonNumber": {
                    "type": "number",
                    "description": "The season number (e.g., 1 for Season 1)"
                },
                "episodeNumber": {
                    "type": "number",
                    "description": "The episode number within the season (e.g., 8 for Episode 8)"
                }
            },
            "required": ["seriesId", "seasonNumber", "episodeNumber"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: Args = parse_arguments(self.name(), arguments)?;
        Ok(link_output(self.links.episode(
            args.series_id,
            args.season_number,
            args.episode_number,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn derives_the_episode_url() {
        let tool = EpisodeLinkTool::new(EmbedLinks::default());
        let result = tool
            .execute(serde_json::json!({"seriesId": 1396, "seasonNumber": 1, "episodeNumber": 8}))
            .await
            .unwrap();
        assert_eq!(result.output, "https://www.vidking.net/embed/tv/1396/1/8");
    }

    #[tokio::test]
    async fn id_is_not_validated_against_the_catalog() {
        let tool = EpisodeLinkTool::new(EmbedLinks::new("http://player.test"));
        let result = tool
            .execute(serde_json::json!({"seriesId": 999999999, "seasonNumber": 0, "episodeNumber": 1}))
            .await
            .unwrap();
        assert_eq!(result.output, "http://player.test/embed/tv/999999999/0/1");
    }

    #[tokio::test]
    async fn missing_episode_is_invalid() {
        let tool = EpisodeLinkTool::new(EmbedLinks::default());
        let err = tool
            .execute(serde_json::json!({"seriesId": 1396, "seasonNumber": 1}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("episodeNumber"));
    }
}
