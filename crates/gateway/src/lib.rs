//! HTTP chat gateway for ReelBot.
//!
//! Exposes the query processor to browsers and scripts:
//!
//! - `POST /api/chat` runs one turn against the caller's session history
//! - `POST /api/reset` forgets a session
//! - `GET /api/health` is a liveness probe
//!
//! Built on Axum. History is kept here, not in the agent.

pub mod session;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use reelbot_agent::{QueryOutcome, QueryProcessor};
use reelbot_core::event::EventBus;

pub use session::{DEFAULT_SESSION, SessionStore};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub processor: Arc<QueryProcessor>,
    pub sessions: SessionStore,
}

impl GatewayState {
    pub fn new(processor: Arc<QueryProcessor>, history_limit: usize) -> Self {
        Self {
            processor,
            sessions: SessionStore::new(history_limit),
        }
    }
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - CORS open to any origin
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/reset", post(reset_handler))
        .route("/api/health", get(health_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(config: reelbot_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let event_bus = Arc::new(EventBus::default());
    let processor = Arc::new(QueryProcessor::from_config(&config, event_bus)?);
    let state = Arc::new(GatewayState::new(processor, config.gateway.history_limit));

    let app = build_router(state);

    info!(addr = %addr, model = %config.default_model, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetRequest {
    #[serde(default)]
    session_id: Option<String>,
}

fn session_key(session_id: Option<String>) -> String {
    session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION.to_string())
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let message = payload.message.unwrap_or_default();
    if message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Message is required" })),
        );
    }

    let session_id = session_key(payload.session_id);
    info!(session = %session_id, message_len = message.len(), "Chat request");

    let history = state.sessions.history(&session_id).await;
    let outcome = state.processor.process_query(&message, &history).await;

    match outcome {
        QueryOutcome::Answered { output } => {
            state
                .sessions
                .record(&session_id, message.trim(), &output)
                .await;
            (
                StatusCode::OK,
                Json(json!({ "success": true, "message": output })),
            )
        }
        QueryOutcome::Rejected { reason } => (
            StatusCode::OK,
            Json(json!({ "success": false, "rejected": true, "message": reason })),
        ),
        QueryOutcome::Failed { error } => {
            error!(session = %session_id, error = %error, "Chat request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": error })),
            )
        }
    }
}

/// The body is optional; anything unparseable resets the default session.
async fn reset_handler(State(state): State<SharedState>, body: Bytes) -> Json<serde_json::Value> {
    let request: ResetRequest = serde_json::from_slice(&body).unwrap_or_default();
    let session_id = session_key(request.session_id);

    let existed = state.sessions.reset(&session_id).await;
    info!(session = %session_id, existed, "Conversation reset");

    Json(json!({ "success": true, "message": "Conversation reset" }))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use reelbot_agent::AgentLoop;
    use reelbot_core::error::{CatalogError, ProviderError};
    use reelbot_core::message::{Message, MessageToolCall};
    use reelbot_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use reelbot_tools::{Catalog, EmbedLinks, MediaMatch, SeriesDetails, media_registry};
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Replays canned assistant messages in order and keeps every request.
    struct ScriptedProvider {
        script: Mutex<Vec<Message>>,
        seen: Mutex<Vec<ProviderRequest>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Message>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            self.seen.lock().unwrap().push(request);
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                return Err(ProviderError::Network("script exhausted".into()));
            }
            Ok(ProviderResponse {
                message: script.remove(0),
                usage: None,
                model: "scripted".into(),
            })
        }
    }

    struct OfflineCatalog;

    #[async_trait]
    impl Catalog for OfflineCatalog {
        async fn search_movies(&self, _: &str) -> Result<Vec<MediaMatch>, CatalogError> {
            Err(CatalogError::Network("offline".into()))
        }
        async fn search_series(&self, _: &str) -> Result<Vec<MediaMatch>, CatalogError> {
            Err(CatalogError::Network("offline".into()))
        }
        async fn series_details(&self, _: u64) -> Result<SeriesDetails, CatalogError> {
            Err(CatalogError::Network("offline".into()))
        }
    }

    fn verdict(accepted: bool, reason: &str) -> Message {
        Message::assistant(
            json!({ "isValidMediaQuestion": accepted, "reason": reason }).to_string(),
        )
    }

    fn call(name: &str, args: serde_json::Value) -> Message {
        let mut msg = Message::assistant("");
        msg.tool_calls = vec![MessageToolCall {
            id: format!("call_{name}"),
            name: name.into(),
            arguments: args.to_string(),
        }];
        msg
    }

    fn state_with(provider: Arc<ScriptedProvider>) -> SharedState {
        let tools = media_registry(Arc::new(OfflineCatalog), EmbedLinks::default());
        let agent = AgentLoop::new(
            provider,
            "scripted",
            0.7,
            Arc::new(tools),
            Arc::new(EventBus::default()),
        );
        Arc::new(GatewayState::new(Arc::new(QueryProcessor::new(agent)), 10))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(state_with(ScriptedProvider::new(vec![])));
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn blank_message_is_a_bad_request() {
        let provider = ScriptedProvider::new(vec![]);
        let app = build_router(state_with(provider.clone()));

        let response = app
            .oneshot(post_json("/api/chat", json!({ "message": "   ", "sessionId": "s" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "error": "Message is required" }));
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn answered_chat_is_recorded_in_history() {
        let provider = ScriptedProvider::new(vec![
            verdict(true, "Names a movie"),
            call("get_streaming_link", json!({ "movieId": 603 })),
            Message::assistant("- [Watch here](https://www.vidking.net/embed/movie/603)"),
        ]);
        let state = state_with(provider);
        let app = build_router(state.clone());

        let response = app
            .oneshot(post_json(
                "/api/chat",
                json!({ "message": "Watch The Matrix", "sessionId": "abc" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "success": true,
                "message": "- [Watch here](https://www.vidking.net/embed/movie/603)"
            })
        );

        let history = state.sessions.history("abc").await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "Watch The Matrix");
    }

    #[tokio::test]
    async fn rejection_is_ok_and_not_recorded() {
        let provider = ScriptedProvider::new(vec![verdict(false, "Not about movies or TV.")]);
        let state = state_with(provider);
        let app = build_router(state.clone());

        let response = app
            .oneshot(post_json("/api/chat", json!({ "message": "hello", "sessionId": "abc" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "success": false, "rejected": true, "message": "Not about movies or TV." })
        );
        assert!(state.sessions.history("abc").await.is_empty());
    }

    #[tokio::test]
    async fn fault_is_a_server_error() {
        let provider = ScriptedProvider::new(vec![
            verdict(true, "Names a movie"),
            call("search_movie_by_name", json!({ "movieName": "Inception" })),
        ]);
        let state = state_with(provider);
        let app = build_router(state.clone());

        let response = app
            .oneshot(post_json("/api/chat", json!({ "message": "Inception" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("offline"));
        assert!(state.sessions.history(DEFAULT_SESSION).await.is_empty());
    }

    #[tokio::test]
    async fn history_feeds_the_next_turn() {
        let provider = ScriptedProvider::new(vec![
            verdict(true, "Names a series"),
            Message::assistant("Which season and episode of Breaking Bad?"),
            verdict(true, "Asks for an episode"),
            Message::assistant("- [Watch here](https://www.vidking.net/embed/tv/1396/1/8)"),
        ]);
        let state = state_with(provider.clone());

        for message in ["Breaking Bad", "season 1 episode 8"] {
            let response = build_router(state.clone())
                .oneshot(post_json("/api/chat", json!({ "message": message, "sessionId": "bb" })))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let seen = provider.seen.lock().unwrap();
        let second_loop_prompt = &seen[3].messages[1].content;
        assert!(second_loop_prompt.starts_with("Previous context:\nUser: Breaking Bad\n"));
        assert!(second_loop_prompt.ends_with("Current request: season 1 episode 8"));
        // The guardrail only ever sees the raw turn.
        assert_eq!(seen[2].messages[1].content, "season 1 episode 8");
    }

    #[tokio::test]
    async fn reset_clears_the_session() {
        let state = state_with(ScriptedProvider::new(vec![]));
        state.sessions.record("abc", "q", "a").await;

        let response = build_router(state.clone())
            .oneshot(post_json("/api/reset", json!({ "sessionId": "abc" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "success": true, "message": "Conversation reset" })
        );
        assert!(state.sessions.history("abc").await.is_empty());
    }

    #[tokio::test]
    async fn reset_without_body_still_succeeds() {
        let state = state_with(ScriptedProvider::new(vec![]));
        let req = Request::builder()
            .method("POST")
            .uri("/api/reset")
            .body(Body::empty())
            .unwrap();
        let response = build_router(state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
