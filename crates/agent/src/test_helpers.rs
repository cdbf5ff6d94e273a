//! Shared test helpers: a scripted provider and a stub catalog.

use async_trait::async_trait;
use reelbot_core::error::{CatalogError, ProviderError};
use reelbot_core::message::{Message, MessageToolCall};
use reelbot_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use reelbot_tools::{Catalog, MediaMatch, SeasonSummary, SeriesDetails};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request it was given. Running out of responses is an error.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len() - 1
        };
        let responses = self.responses.lock().unwrap();
        responses
            .get(index)
            .cloned()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 500,
                message: format!("no scripted response for call #{index}"),
            })
    }
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Guardrail verdict as the backend would return it.
pub fn make_verdict(accepted: bool, reason: &str) -> ProviderResponse {
    make_text_response(
        &serde_json::json!({ "isValidMediaQuestion": accepted, "reason": reason }).to_string(),
    )
}

/// Create a response carrying tool calls.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    let mut msg = Message::assistant("");
    msg.tool_calls = tool_calls;
    ProviderResponse {
        message: msg,
        usage: None,
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: args.to_string(),
    }
}

/// Catalog with a couple of well-known titles.
pub struct StubCatalog {
    pub fail: bool,
}

#[async_trait]
impl Catalog for StubCatalog {
    async fn search_movies(&self, title: &str) -> Result<Vec<MediaMatch>, CatalogError> {
        if self.fail {
            return Err(CatalogError::Http {
                status_code: 503,
                message: "Service Unavailable".into(),
            });
        }
        Ok(match title {
            "Inception" => vec![MediaMatch { id: 27205, name: "Inception".into() }],
            "The Matrix" => vec![
                MediaMatch { id: 603, name: "The Matrix".into() },
                MediaMatch { id: 604, name: "The Matrix Reloaded".into() },
            ],
            _ => vec![],
        })
    }

    async fn search_series(&self, title: &str) -> Result<Vec<MediaMatch>, CatalogError> {
        if self.fail {
            return Err(CatalogError::Network("connection reset".into()));
        }
        Ok(match title {
            "Breaking Bad" => vec![MediaMatch { id: 1396, name: "Breaking Bad".into() }],
            _ => vec![],
        })
    }

    async fn series_details(&self, series_id: u64) -> Result<SeriesDetails, CatalogError> {
        if self.fail || series_id != 1396 {
            return Err(CatalogError::Http {
                status_code: 404,
                message: "not found".into(),
            });
        }
        Ok(SeriesDetails {
            id: 1396,
            name: "Breaking Bad".into(),
            number_of_seasons: 5,
            number_of_episodes: 62,
            seasons: vec![
                SeasonSummary { season_number: 1, episode_count: 7, name: "Season 1".into() },
                SeasonSummary { season_number: 2, episode_count: 13, name: "Season 2".into() },
            ],
        })
    }
}
