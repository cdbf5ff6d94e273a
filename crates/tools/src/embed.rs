//! Embed-player URL templates.

/// Derives player URLs from catalog ids. Pure string work, no network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedLinks {
    base_url: String,
}

impl EmbedLinks {
    pub const DEFAULT_BASE_URL: &'static str = "https://www.vidking.net";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &reelbot_config::EmbedConfig) -> Self {
        Self::new(&config.base_url)
    }

    /// `<base>/embed/movie/<id>`
    pub fn movie(&self, movie_id: u64) -> String {
        format!("{}/embed/movie/{}", self.base_url, movie_id)
    }

    /// `<base>/embed/tv/<id>/<season>/<episode>`
    pub fn episode(&self, series_id: u64, season: u32, episode: u32) -> String {
        format!(
            "{}/embed/tv/{}/{}/{}",
            self.base_url, series_id, season, episode
        )
    }
}

impl Default for EmbedLinks {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}
