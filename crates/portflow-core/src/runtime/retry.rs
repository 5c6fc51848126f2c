//! Retry policy for asynchronous `llm` edges.
//!
//! The engine only describes the policy; the session driver sleeps and
//! re-issues calls according to it.

use crate::primitives::{
    DEFAULT_LLM_INITIAL_BACKOFF_MS, DEFAULT_LLM_MAX_ATTEMPTS, DEFAULT_LLM_MAX_BACKOFF_MS,
    DEFAULT_LLM_TIMEOUT_MS,
};
use crate::types::PortflowError;
use serde::{Deserialize, Serialize};

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first call.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff_ms: u64,
    /// Cap on any single delay.
    pub max_backoff_ms: u64,
    /// Per-attempt time limit.
    pub timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_LLM_MAX_ATTEMPTS,
            initial_backoff_ms: DEFAULT_LLM_INITIAL_BACKOFF_MS,
            max_backoff_ms: DEFAULT_LLM_MAX_BACKOFF_MS,
            timeout_ms: DEFAULT_LLM_TIMEOUT_MS,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (0-based), doubling each time.
    #[must_use]
    pub fn delay_ms(&self, retry: u32) -> u64 {
        let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
        self.initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms)
    }

    /// Check if another attempt is allowed after `attempts` tries.
    #[must_use]
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }

    /// Check that the policy can make at least one call.
    pub fn check(&self) -> Result<(), PortflowError> {
        if self.max_attempts == 0 {
            return Err(PortflowError::Config(
                "retry max_attempts must be at least 1".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(PortflowError::Config(
                "retry timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
