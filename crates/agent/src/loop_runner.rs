//! The agent reasoning loop implementation.

use std::sync::Arc;
use std::time::Instant;
use reelbot_core::error::{AgentError, ToolError};
use reelbot_core::event::{DomainEvent, EventBus};
use reelbot_core::message::{Message, MessageToolCall};
use reelbot_core::provider::{Provider, ProviderRequest};
use reelbot_core::tool::{ToolCall, ToolName, ToolRegistry};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::grounding::ungrounded_links;
use crate::guardrail::GuardrailClassifier;
use crate::instructions::AGENT_INSTRUCTIONS;

/// One tool call made during a turn, with what it returned.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInvocation {
    pub tool: ToolName,
    pub arguments: serde_json::Value,
    pub output: String,
    pub duration_ms: u64,
}

/// How a turn ended, when it did not fault.
#[derive(Debug, Clone)]
pub enum AgentOutcome {
    /// The agent produced a final answer.
    Answered {
        output: String,
        tool_calls: Vec<ToolInvocation>,
    },
    /// The guardrail stopped the query before any tool ran.
    Rejected { reason: String },
}

/// Working state for a single turn: the message trace sent to the backend
/// and every tool invocation so far. Dropped when the turn ends.
#[derive(Debug)]
struct AgentRun {
    messages: Vec<Message>,
    invocations: Vec<ToolInvocation>,
}

impl AgentRun {
    fn new(prompt: &str) -> Self {
        Self {
            messages: vec![Message::system(AGENT_INSTRUCTIONS), Message::user(prompt)],
            invocations: Vec::new(),
        }
    }

    fn tool_outputs(&self) -> Vec<&str> {
        self.invocations.iter().map(|i| i.output.as_str()).collect()
    }
}

/// The orchestrating agent: guardrail gate, then a sequential tool loop.
pub struct AgentLoop {
    /// The completion backend
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Default max tokens per response
    max_tokens: Option<u32>,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    /// Gate run before any tool
    guardrail: GuardrailClassifier,

    /// Maximum completion calls per turn
    max_turns: u32,

    /// Fail the run when the answer links to something no tool produced
    enforce_grounding: bool,

    /// Event bus for domain events
    event_bus: Arc<EventBus>,
}

impl AgentLoop {
    pub const DEFAULT_MAX_TURNS: u32 = 10;

    /// Create a new agent loop. The guardrail shares the same backend and model.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let model = model.into();
        debug!(model = %model, tools = ?tools.names(), "Agent loop ready");
        Self {
            guardrail: GuardrailClassifier::new(provider.clone(), model.clone()),
            provider,
            model,
            temperature,
            max_tokens: None,
            tools,
            max_turns: Self::DEFAULT_MAX_TURNS,
            enforce_grounding: false,
            event_bus,
        }
    }

    /// Build an agent from the `[agent]` section and top-level model settings.
    pub fn from_config(
        config: &reelbot_config::AppConfig,
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self::new(
            provider,
            &config.default_model,
            config.default_temperature,
            tools,
            event_bus,
        )
        .with_max_tokens(config.default_max_tokens)
        .with_max_turns(config.agent.max_turns)
        .with_grounding_enforced(config.agent.enforce_grounding)
    }

    /// Set the maximum number of completion calls per turn.
    pub fn with_max_turns(mut self, max: u32) -> Self {
        self.max_turns = max;
        self
    }

    /// Set the default max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_grounding_enforced(mut self, enforce: bool) -> Self {
        self.enforce_grounding = enforce;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one turn.
    ///
    /// `current_turn` is the user's raw text and is all the guardrail sees.
    /// `prompt` is what the tool loop works on, usually the same text with
    /// recent history prepended.
    pub async fn run(
        &self,
        current_turn: &str,
        prompt: &str,
    ) -> Result<AgentOutcome, reelbot_core::Error> {
        let verdict = match self.guardrail.classify(current_turn).await {
            Ok(verdict) => verdict,
            Err(e) => {
                self.publish_failure("guardrail", &e);
                return Err(e);
            }
        };
        self.event_bus.publish(DomainEvent::QueryClassified {
            accepted: verdict.is_valid,
            reason: verdict.reason.clone(),
            timestamp: chrono::Utc::now(),
        });

        if !verdict.is_valid {
            warn!(reason = %verdict.reason, "Query rejected by guardrail");
            return Ok(AgentOutcome::Rejected {
                reason: verdict.reason,
            });
        }

        let mut run = AgentRun::new(prompt);
        let result = self.drive(&mut run).await;

        if let Err(e) = &result {
            self.publish_failure("agent_run", e);
        }
        result
    }

    fn publish_failure(&self, context: &str, error: &reelbot_core::Error) {
        self.event_bus.publish(DomainEvent::ErrorOccurred {
            context: context.into(),
            error_message: error.to_string(),
            timestamp: chrono::Utc::now(),
        });
    }

    /// The tool-calling loop. Returns once the backend answers without tool calls.
    async fn drive(&self, run: &mut AgentRun) -> Result<AgentOutcome, reelbot_core::Error> {
        let tool_definitions = self.tools.definitions();

        for iteration in 1..=self.max_turns {
            debug!(iteration, messages = run.messages.len(), "Agent loop iteration");

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: run.messages.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
                response_format: None,
            };

            let response = self.provider.complete(request).await?;

            if let Some(usage) = &response.usage {
                self.event_bus.publish(DomainEvent::ResponseGenerated {
                    model: response.model.clone(),
                    tokens_used: usage.total_tokens,
                    timestamp: chrono::Utc::now(),
                });
            }

            if response.message.tool_calls.is_empty() {
                let output = response.message.content.trim().to_string();
                if output.is_empty() {
                    return Err(AgentError::MalformedOutput {
                        stage: "agent".into(),
                        reason: "final answer was empty".into(),
                    }
                    .into());
                }
                self.check_grounding(&output, run)?;

                info!(
                    iterations = iteration,
                    tool_calls = run.invocations.len(),
                    "Agent produced final answer"
                );
                return Ok(AgentOutcome::Answered {
                    output,
                    tool_calls: std::mem::take(&mut run.invocations),
                });
            }

            let tool_calls = response.message.tool_calls.clone();
            run.messages.push(response.message);

            for tc in &tool_calls {
                let output = self.invoke(tc, run).await?;
                run.messages.push(Message::tool_result(&tc.id, &output));
            }
        }

        warn!(max_turns = self.max_turns, "Agent hit the turn limit");
        Err(AgentError::MaxTurnsExceeded {
            max_turns: self.max_turns,
        }
        .into())
    }

    /// Validate, execute, and record one tool call. Any failure aborts the run.
    async fn invoke(
        &self,
        tc: &MessageToolCall,
        run: &mut AgentRun,
    ) -> Result<String, reelbot_core::Error> {
        let tool: ToolName = tc.name.parse()?;
        let arguments = parse_call_arguments(tool, &tc.arguments)?;
        debug!(tool = %tool, %arguments, "Executing tool call");

        let call = ToolCall {
            id: tc.id.clone(),
            name: tc.name.clone(),
            arguments: arguments.clone(),
        };

        let start = Instant::now();
        let result = self.tools.execute(&call).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        self.event_bus.publish(DomainEvent::ToolExecuted {
            tool_name: tool.to_string(),
            success: result.is_ok(),
            duration_ms,
            timestamp: chrono::Utc::now(),
        });

        let result = result.inspect_err(|e| {
            warn!(tool = %tool, error = %e, duration_ms, "Tool execution failed");
        })?;

        run.invocations.push(ToolInvocation {
            tool,
            arguments,
            output: result.output.clone(),
            duration_ms,
        });
        Ok(result.output)
    }

    fn check_grounding(&self, answer: &str, run: &AgentRun) -> Result<(), AgentError> {
        let missing = ungrounded_links(answer, run.tool_outputs().as_slice());
        if missing.is_empty() {
            return Ok(());
        }
        warn!(links = ?missing, "Answer contains links no tool produced");
        if self.enforce_grounding {
            return Err(AgentError::UngroundedLinks(missing));
        }
        Ok(())
    }
}

/// Tool-call arguments arrive as a JSON string; an empty string means no arguments.
fn parse_call_arguments(tool: ToolName, raw: &str) -> Result<serde_json::Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(raw).map_err(|e| ToolError::InvalidArguments {
        tool_name: tool.to_string(),
        reason: format!("arguments are not valid JSON: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use reelbot_core::Error;
    use reelbot_tools::{EmbedLinks, media_registry};

    fn agent(provider: Arc<SequentialMockProvider>, catalog_fails: bool) -> AgentLoop {
        let tools = media_registry(
            Arc::new(StubCatalog { fail: catalog_fails }),
            EmbedLinks::default(),
        );
        AgentLoop::new(
            provider,
            "mock-model",
            0.7,
            Arc::new(tools),
            Arc::new(EventBus::default()),
        )
    }

    #[tokio::test]
    async fn rejection_stops_before_any_tool() {
        let provider = Arc::new(SequentialMockProvider::new(vec![make_verdict(
            false,
            "This is a math question, not a request for streaming links.",
        )]));
        let bus = Arc::new(EventBus::default());
        let mut events = bus.subscribe();
        let tools = media_registry(Arc::new(StubCatalog { fail: false }), EmbedLinks::default());
        let agent = AgentLoop::new(provider.clone(), "mock-model", 0.7, Arc::new(tools), bus);

        let outcome = agent.run("what's 2+2?", "what's 2+2?").await.unwrap();
        match outcome {
            AgentOutcome::Rejected { reason } => assert!(reason.contains("math")),
            other => panic!("Expected rejection, got {other:?}"),
        }
        assert_eq!(provider.call_count(), 1);

        let event = events.recv().await.unwrap();
        assert!(matches!(event.as_ref(), DomainEvent::QueryClassified { accepted: false, .. }));
        assert!(events.try_recv().is_err(), "no tool events expected");
    }

    #[tokio::test]
    async fn movie_flow_resolves_name_before_link() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_verdict(true, "Names a movie"),
            make_tool_call_response(vec![make_tool_call(
                "search_movie_by_name",
                serde_json::json!({"movieName": "The Matrix"}),
            )]),
            make_tool_call_response(vec![make_tool_call(
                "get_streaming_link",
                serde_json::json!({"movieId": 603}),
            )]),
            make_text_response("- [Watch here](https://www.vidking.net/embed/movie/603)"),
        ]));
        let agent = agent(provider.clone(), false);

        let outcome = agent.run("Watch The Matrix", "Watch The Matrix").await.unwrap();
        let AgentOutcome::Answered { output, tool_calls } = outcome else {
            panic!("Expected an answer");
        };
        assert_eq!(output, "- [Watch here](https://www.vidking.net/embed/movie/603)");
        assert_eq!(
            tool_calls.iter().map(|i| i.tool).collect::<Vec<_>>(),
            vec![ToolName::SearchMovieByName, ToolName::GetStreamingLink]
        );
        assert!(tool_calls[0].output.contains("\"id\":603"));

        // The final completion saw both tool results.
        let last = provider.requests().pop().unwrap();
        let tool_messages: Vec<_> = last
            .messages
            .iter()
            .filter(|m| m.role == reelbot_core::Role::Tool)
            .collect();
        assert_eq!(tool_messages.len(), 2);
        assert_eq!(tool_messages[1].content, "https://www.vidking.net/embed/movie/603");
        assert_eq!(last.tools.len(), 6);
    }

    #[tokio::test]
    async fn guardrail_sees_raw_turn_and_loop_sees_prompt() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_verdict(true, "Asks for an episode"),
            make_text_response("Which season would you like?"),
        ]));
        let agent = agent(provider.clone(), false);

        agent
            .run("episode 3 please", "Previous context:\nUser: Breaking Bad\n\nCurrent request: episode 3 please")
            .await
            .unwrap();

        let requests = provider.requests();
        assert_eq!(requests[0].messages[1].content, "episode 3 please");
        assert!(requests[1].messages[1].content.starts_with("Previous context:"));
        assert_eq!(requests[1].messages[0].content, AGENT_INSTRUCTIONS);
    }

    #[tokio::test]
    async fn catalog_fault_aborts_the_run() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_verdict(true, "Names a movie"),
            make_tool_call_response(vec![make_tool_call(
                "search_movie_by_name",
                serde_json::json!({"movieName": "Inception"}),
            )]),
            make_text_response("should never be requested"),
        ]));
        let agent = agent(provider.clone(), true);

        let err = agent.run("Inception", "Inception").await.unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::Catalog { .. })));
        assert!(err.to_string().contains("503"));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn unknown_tool_name_is_a_fault() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_verdict(true, "Names a movie"),
            make_tool_call_response(vec![make_tool_call("download_movie", serde_json::json!({}))]),
        ]));
        let agent = agent(provider, false);

        let err = agent.run("Inception", "Inception").await.unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::UnknownTool(ref n)) if n == "download_movie"));
    }

    #[tokio::test]
    async fn malformed_tool_arguments_are_a_fault() {
        let mut call = make_tool_call("get_streaming_link", serde_json::json!({}));
        call.arguments = "{movieId: 603".into();
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_verdict(true, "Names a movie"),
            make_tool_call_response(vec![call]),
        ]));
        let agent = agent(provider, false);

        let err = agent.run("Inception", "Inception").await.unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[tokio::test]
    async fn malformed_verdict_propagates() {
        let provider = Arc::new(SequentialMockProvider::new(vec![make_text_response(
            "yes this is fine",
        )]));
        let agent = agent(provider.clone(), false);

        let err = agent.run("Inception", "Inception").await.unwrap_err();
        assert!(matches!(err, Error::Agent(AgentError::MalformedOutput { .. })));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn turn_limit_is_a_fault() {
        let search = || {
            make_tool_call_response(vec![make_tool_call(
                "search_movie_by_name",
                serde_json::json!({"movieName": "Inception"}),
            )])
        };
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_verdict(true, "Names a movie"),
            search(),
            search(),
            search(),
        ]));
        let agent = agent(provider.clone(), false).with_max_turns(2);

        let err = agent.run("Inception", "Inception").await.unwrap_err();
        assert!(matches!(err, Error::Agent(AgentError::MaxTurnsExceeded { max_turns: 2 })));
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn ungrounded_link_fails_only_when_enforced() {
        let script = || {
            vec![
                make_verdict(true, "Names a movie"),
                make_text_response("- [Watch here](https://www.vidking.net/embed/movie/27205)"),
            ]
        };

        let relaxed = agent(Arc::new(SequentialMockProvider::new(script())), false);
        let outcome = relaxed.run("Inception", "Inception").await.unwrap();
        assert!(matches!(outcome, AgentOutcome::Answered { .. }));

        let strict = agent(Arc::new(SequentialMockProvider::new(script())), false)
            .with_grounding_enforced(true);
        let err = strict.run("Inception", "Inception").await.unwrap_err();
        assert!(matches!(err, Error::Agent(AgentError::UngroundedLinks(ref links)) if links.len() == 1));
    }

    fn season_script(answer: String) -> Vec<reelbot_core::provider::ProviderResponse> {
        vec![
            make_verdict(true, "Asks for a whole season"),
            make_tool_call_response(vec![make_tool_call(
                "search_tv_series_by_name",
                serde_json::json!({"seriesName": "Breaking Bad"}),
            )]),
            make_tool_call_response(vec![make_tool_call(
                "get_tv_series_details",
                serde_json::json!({"seriesId": 1396}),
            )]),
            make_tool_call_response(vec![make_tool_call(
                "get_all_episode_links_for_season",
                serde_json::json!({"seriesId": 1396, "seasonNumber": 1, "episodeCount": 7}),
            )]),
            make_text_response(&answer),
        ]
    }

    fn season_answer(episodes: impl Iterator<Item = u32>) -> String {
        episodes
            .map(|e| format!("- [Watch here](https://www.vidking.net/embed/tv/1396/1/{e})"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn whole_season_answer_is_grounded_per_episode() {
        let provider = Arc::new(SequentialMockProvider::new(season_script(season_answer(1..=7))));
        let agent = agent(provider.clone(), false).with_grounding_enforced(true);

        let outcome = agent
            .run("Breaking Bad season 1", "Breaking Bad season 1")
            .await
            .unwrap();
        let AgentOutcome::Answered { output, tool_calls } = outcome else {
            panic!("Expected an answer");
        };
        assert_eq!(output.lines().count(), 7);
        assert_eq!(
            tool_calls.iter().map(|i| i.tool).collect::<Vec<_>>(),
            vec![
                ToolName::SearchTvSeriesByName,
                ToolName::GetTvSeriesDetails,
                ToolName::GetAllEpisodeLinksForSeason,
            ]
        );
        assert!(tool_calls[1].output.contains("\"episodeCount\":7"));
        assert!(tool_calls[2].output.contains("https://www.vidking.net/embed/tv/1396/1/7"));
        assert_eq!(provider.call_count(), 5);
    }

    #[tokio::test]
    async fn episode_beyond_the_season_is_ungrounded() {
        let provider = Arc::new(SequentialMockProvider::new(season_script(season_answer(1..=8))));
        let agent = agent(provider, false).with_grounding_enforced(true);

        let err = agent
            .run("Breaking Bad season 1", "Breaking Bad season 1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Agent(AgentError::UngroundedLinks(ref links))
                if links == &["https://www.vidking.net/embed/tv/1396/1/8".to_string()]
        ));
    }

    #[tokio::test]
    async fn guardrail_fault_is_published() {
        let provider = Arc::new(SequentialMockProvider::new(vec![]));
        let bus = Arc::new(EventBus::default());
        let mut events = bus.subscribe();
        let tools = media_registry(Arc::new(StubCatalog { fail: false }), EmbedLinks::default());
        let agent = AgentLoop::new(provider, "mock-model", 0.7, Arc::new(tools), bus);

        let err = agent.run("Inception", "Inception").await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));

        let event = events.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::ErrorOccurred {
                context,
                error_message,
                ..
            } => {
                assert_eq!(context, "guardrail");
                assert_eq!(error_message, &err.to_string());
            }
            other => panic!("Expected ErrorOccurred, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_final_answer_is_malformed() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_verdict(true, "Names a movie"),
            make_text_response("   "),
        ]));
        let err = agent(provider, false).run("Inception", "Inception").await.unwrap_err();
        assert!(err.to_string().contains("final answer was empty"));
    }

    #[test]
    fn empty_argument_string_is_an_empty_object() {
        let args = parse_call_arguments(ToolName::GetStreamingLink, "").unwrap();
        assert_eq!(args, serde_json::json!({}));
    }
}
