//! The ReelBot agent.
//!
//! One user turn flows through three stages:
//!
//! 1. **Guardrail**: a structured-output completion decides whether the
//!    current turn is a movie/TV streaming request at all
//! 2. **Tool loop**: the orchestrating agent calls lookup tools one at a
//!    time until it can answer
//! 3. **Query processor**: folds the result into answered, rejected, or
//!    failed
//!
//! Any fault aborts the turn. A rejection is an outcome, not an error.

pub mod grounding;
pub mod guardrail;
pub mod instructions;
pub mod loop_runner;
pub mod processor;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use guardrail::{ClassificationResult, GuardrailClassifier};
pub use loop_runner::{AgentLoop, AgentOutcome, ToolInvocation};
pub use processor::{QueryOutcome, QueryProcessor, compose_prompt};
