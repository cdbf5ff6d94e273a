//! Movie/TV catalog client.
//!
//! The [`Catalog`] trait is the seam the lookup tools depend on;
//! [`TmdbCatalog`] talks to a TMDB-style HTTP API. Nothing here retries or
//! checks that an id exists.

use async_trait::async_trait;
use reelbot_core::error::CatalogError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// One search hit: a catalog id and its display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaMatch {
    pub id: u64,
    pub name: String,
}

/// Season/episode structure of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDetails {
    pub id: u64,
    pub name: String,
    pub number_of_seasons: u32,
    pub number_of_episodes: u32,
    pub seasons: Vec<SeasonSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonSummary {
    pub season_number: u32,
    pub episode_count: u32,
    pub name: String,
}

/// Read-only access to a movie/TV catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// All movies matching `title`, in the catalog's own ranking order.
    async fn search_movies(&self, title: &str) -> Result<Vec<MediaMatch>, CatalogError>;

    /// All series matching `title`, in the catalog's own ranking order.
    async fn search_series(&self, title: &str) -> Result<Vec<MediaMatch>, CatalogError>;

    /// Season and episode counts for one series.
    async fn series_details(&self, series_id: u64) -> Result<SeriesDetails, CatalogError>;
}

/// HTTP client for The Movie Database v3 API (or anything shaped like it).
pub struct TmdbCatalog {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl TmdbCatalog {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Build a client from the `[catalog]` config section.
    pub fn from_config(config: &reelbot_config::CatalogConfig) -> Self {
        Self::new(
            &config.base_url,
            config.api_key.clone().unwrap_or_default(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Catalog request");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "Catalog returned error");
            return Err(CatalogError::Http {
                status_code: status.as_u16(),
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Catalog for TmdbCatalog {
    async fn search_movies(&self, title: &str) -> Result<Vec<MediaMatch>, CatalogError> {
        let page: SearchPage<MovieHit> = self.get("/search/movie", &[("query", title)]).await?;
        Ok(page
            .results
            .into_iter()
            .map(|hit| MediaMatch {
                id: hit.id,
                name: hit.title,
            })
            .collect())
    }

    async fn search_series(&self, title: &str) -> Result<Vec<MediaMatch>, CatalogError> {
        let page: SearchPage<SeriesHit> = self.get("/search/tv", &[("query", title)]).await?;
        Ok(page
            .results
            .into_iter()
            .map(|hit| MediaMatch {
                id: hit.id,
                name: hit.name,
            })
            .collect())
    }

    async fn series_details(&self, series_id: u64) -> Result<SeriesDetails, CatalogError> {
        let raw: RawSeriesDetails = self.get(&format!("/tv/{series_id}"), &[]).await?;
        Ok(SeriesDetails {
            id: raw.id,
            name: raw.name,
            number_of_seasons: raw.number_of_seasons,
            number_of_episodes: raw.number_of_episodes,
            seasons: raw
                .seasons
                .into_iter()
                .map(|s| SeasonSummary {
                    season_number: s.season_number,
                    episode_count: s.episode_count,
                    name: s.name,
                })
                .collect(),
        })
    }
}

// --- TMDB wire types (internal) ---

#[derive(Debug, Deserialize)]
struct SearchPage<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct MovieHit {
    id: u64,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct SeriesHit {
    id: u64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawSeriesDetails {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    number_of_seasons: u32,
    #[serde(default)]
    number_of_episodes: u32,
    #[serde(default)]
    seasons: Vec<RawSeason>,
}

#[derive(Debug, Deserialize)]
struct RawSeason {
    season_number: u32,
    #[serde(default)]
    episode_count: u32,
    #[serde(default)]
    name: String,
}
