//! Guardrail classifier: decides whether a query may reach the tools.
//!
//! One structured-output completion per query. The reply must validate
//! against [`ClassificationResult::schema`]; anything else is a fault, never
//! an implicit approval.

use std::sync::Arc;
use reelbot_core::error::AgentError;
use reelbot_core::message::Message;
use reelbot_core::provider::{Provider, ProviderRequest, ResponseFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::instructions::GUARDRAIL_INSTRUCTIONS;

const SCHEMA_NAME: &str = "media_query_check";

/// The classifier's verdict on one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "isValidMediaQuestion")]
    pub is_valid: bool,
    pub reason: String,
}

impl ClassificationResult {
    /// JSON Schema the backend must answer with.
    pub fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "isValidMediaQuestion": {
                    "type": "boolean",
                    "description": "true if the question is about finding movie or TV series streaming links, false otherwise"
                },
                "reason": {
                    "type": "string",
                    "description": "Clear explanation of why the query was accepted or rejected"
                }
            },
            "required": ["isValidMediaQuestion", "reason"],
            "additionalProperties": false
        })
    }

    /// Validate a raw completion against the schema.
    pub fn parse(content: &str) -> Result<Self, AgentError> {
        let malformed = |reason: String| AgentError::MalformedOutput {
            stage: "guardrail".into(),
            reason,
        };

        let value: serde_json::Value = serde_json::from_str(content.trim())
            .map_err(|e| malformed(format!("not JSON: {e}")))?;

        let object = value
            .as_object()
            .ok_or_else(|| malformed("expected a JSON object".into()))?;

        let is_valid = object
            .get("isValidMediaQuestion")
            .ok_or_else(|| malformed("missing field `isValidMediaQuestion`".into()))?
            .as_bool()
            .ok_or_else(|| malformed("`isValidMediaQuestion` must be a boolean".into()))?;

        let reason = object
            .get("reason")
            .ok_or_else(|| malformed("missing field `reason`".into()))?
            .as_str()
            .ok_or_else(|| malformed("`reason` must be a string".into()))?
            .to_string();

        Ok(Self { is_valid, reason })
    }
}

/// Runs the media-query check against a completion backend.
pub struct GuardrailClassifier {
    provider: Arc<dyn Provider>,
    model: String,
}

impl GuardrailClassifier {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Classify the raw text of the current turn. History is never included.
    pub async fn classify(&self, query: &str) -> Result<ClassificationResult, reelbot_core::Error> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::system(GUARDRAIL_INSTRUCTIONS), Message::user(query)],
            temperature: 0.0,
            max_tokens: None,
            tools: vec![],
            response_format: Some(ResponseFormat {
                name: SCHEMA_NAME.into(),
                schema: ClassificationResult::schema(),
            }),
        };

        let response = self.provider.complete(request).await?;
        let verdict = ClassificationResult::parse(&response.message.content)?;

        debug!(accepted = verdict.is_valid, reason = %verdict.reason, "Guardrail verdict");
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{SequentialMockProvider, make_text_response};

    #[test]
    fn parses_accepting_verdict() {
        let verdict = ClassificationResult::parse(
            r#"{"isValidMediaQuestion": true, "reason": "Asks for a movie by name"}"#,
        )
        .unwrap();
        assert!(verdict.is_valid);
        assert_eq!(verdict.reason, "Asks for a movie by name");
    }

    #[test]
    fn missing_flag_is_malformed_not_approval() {
        let err = ClassificationResult::parse(r#"{"reason": "looks fine"}"#).unwrap_err();
        assert!(matches!(err, AgentError::MalformedOutput { ref stage, .. } if stage == "guardrail"));
    }

    #[test]
    fn string_flag_is_malformed() {
        let err =
            ClassificationResult::parse(r#"{"isValidMediaQuestion": "true", "reason": "x"}"#)
                .unwrap_err();
        assert!(err.to_string().contains("boolean"));
    }

    #[test]
    fn prose_reply_is_malformed() {
        let err = ClassificationResult::parse("Sure, that's a movie question!").unwrap_err();
        assert!(err.to_string().contains("not JSON"));
    }

    #[test]
    fn array_reply_is_malformed() {
        assert!(ClassificationResult::parse("[true]").is_err());
    }

    #[tokio::test]
    async fn classify_sends_schema_and_raw_query() {
        let provider = Arc::new(SequentialMockProvider::new(vec![make_text_response(
            r#"{"isValidMediaQuestion": false, "reason": "Math question, not media"}"#,
        )]));
        let classifier = GuardrailClassifier::new(provider.clone(), "mock-model");

        let verdict = classifier.classify("what's 2+2?").await.unwrap();
        assert!(!verdict.is_valid);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert!(request.tools.is_empty());
        assert_eq!(
            request.response_format.as_ref().map(|f| f.name.as_str()),
            Some(SCHEMA_NAME)
        );
        assert_eq!(request.messages.last().unwrap().content, "what's 2+2?");
    }
}
