//! Text-generation clients for `llm` relationships.

use portflow_core::LlmRequest;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Failure of one `llm` attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    /// The client reported an error.
    #[error("{0}")]
    Failed(String),

    /// The attempt did not finish in time.
    #[error("timed out after {0}ms")]
    Timeout(u64),
}

/// Performs `llm` relationship calls.
///
/// Implementations are shared by every in-flight call of a session.
pub trait LlmClient: Send + Sync + 'static {
    /// Run one attempt of a request.
    fn complete(&self, request: LlmRequest) -> impl Future<Output = Result<Value, LlmError>> + Send;
}

/// An [`LlmClient`] answering from a fixed prompt table.
///
/// Clones share the remaining failure counts.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLlm {
    responses: BTreeMap<String, Value>,
    latency_ms: u64,
    failures: Arc<Mutex<BTreeMap<String, u32>>>,
}

impl ScriptedLlm {
    /// Create a client with no responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `prompt` with `value`.
    #[must_use]
    pub fn with_response(mut self, prompt: impl Into<String>, value: Value) -> Self {
        self.responses.insert(prompt.into(), value);
        self
    }

    /// Fail the first `count` attempts for `prompt` before answering.
    #[must_use]
    pub fn with_failures(self, prompt: impl Into<String>, count: u32) -> Self {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(prompt.into(), count);
        self
    }

    /// Delay every answer.
    #[must_use]
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: LlmRequest) -> Result<Value, LlmError> {
        if self.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.latency_ms)).await;
        }
        {
            let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(left) = failures.get_mut(&request.prompt).filter(|left| **left > 0) {
                *left = left.saturating_sub(1);
                return Err(LlmError::Failed(format!(
                    "scripted failure for prompt '{}'",
                    request.prompt
                )));
            }
        }
        self.responses
            .get(&request.prompt)
            .cloned()
            .ok_or_else(|| LlmError::Failed(format!("no response for prompt '{}'", request.prompt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(prompt: &str) -> LlmRequest {
        LlmRequest {
            ticket: 0,
            binding_id: "b1".to_string(),
            prompt: prompt.to_string(),
            input: json!("x"),
            target: "W.text".to_string(),
        }
    }

    #[tokio::test]
    async fn scripted_answers_known_prompts() {
        let llm = ScriptedLlm::new().with_response("summarize", json!("short"));
        assert_eq!(llm.complete(request("summarize")).await, Ok(json!("short")));
        assert!(matches!(
            llm.complete(request("other")).await,
            Err(LlmError::Failed(_))
        ));
    }

    #[tokio::test]
    async fn scripted_failures_run_out() {
        let llm = ScriptedLlm::new()
            .with_response("summarize", json!("short"))
            .with_failures("summarize", 2);
        let shared = llm.clone();
        assert!(matches!(
            llm.complete(request("summarize")).await,
            Err(LlmError::Failed(_))
        ));
        assert!(matches!(
            shared.complete(request("summarize")).await,
            Err(LlmError::Failed(_))
        ));
        assert_eq!(llm.complete(request("summarize")).await, Ok(json!("short")));
    }

    #[test]
    fn error_messages() {
        assert_eq!(LlmError::Timeout(250).to_string(), "timed out after 250ms");
        assert_eq!(LlmError::Failed("boom".to_string()).to_string(), "boom");
    }
}
