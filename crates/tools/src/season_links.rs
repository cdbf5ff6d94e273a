//! `get_all_episode_links_for_season`: one embed URL per episode.

use async_trait::async_trait;
use reelbot_core::error::ToolError;
use reelbot_core::tool::{Tool, ToolName, ToolResult};
use serde::{Deserialize, Serialize};

use crate::embed::EmbedLinks;
use crate::{json_output, parse_arguments};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Args {
    #[serde(deserialize_with = "crate::whole_number")]
    series_id: u64,
    #[serde(deserialize_with = "crate::whole_number")]
    season_number: u32,
    #[serde(deserialize_with = "crate::whole_number")]
    episode_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeLink {
    pub episode_number: u32,
    pub link: String,
}

pub struct SeasonLinksTool {
    links: EmbedLinks,
}

impl SeasonLinksTool {
    pub fn new(links: EmbedLinks) -> Self {
        Self { links }
    }

    /// Links for episodes `1..=episode_count`, ascending. Empty when the count is zero.
    pub fn season(&self, series_id: u64, season: u32, episode_count: u32) -> Vec<EpisodeLink> {
        (1..=episode_count)
            .map(|episode_number| EpisodeLink {
                episode_number,
                link: self.links.episode(series_id, season, episode_number),
            })
            .collect()
    }
}

#[async_trait]
impl Tool for SeasonLinksTool {
    fn name(&self) -> ToolName {
        ToolName::GetAllEpisodeLinksForSeason
    }

    fn description(&self) -> &str {
        "Generates streaming links for ALL episodes in a specific season of a TV series. Use \
         this tool when the user requests a season but doesn't specify a particular episode \
         number. This tool will return an array of streaming links for every episode in that \
         season."
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
                "episodeCount": {
                    "type": "number",
                    "description": "The total number of episodes in this season (obtained from get_tv_series_details tool)"
                }
            },
            "required": ["seriesId", "seasonNumber", "episodeCount"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: Args = parse_arguments(self.name(), arguments)?;
        let episodes = self.season(args.series_id, args.season_number, args.episode_count);
        json_output(self.name(), &episodes)
    }
}
