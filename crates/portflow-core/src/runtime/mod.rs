//! # Reactive Port Runtime
//!
//! The live, per-session store of port values plus the propagation engine
//! that walks the reactive bindings of a [`crate::ValidatedUiSpec`].
//!
//! The runtime is sans-IO. Every operation runs to completion
//! synchronously and returns an [`Outcome`] listing what happened (port
//! writes, subscriber notifications) and what the caller must drive next:
//!
//! - [`DebounceTimer`]: call [`PortRuntime::fire_debounce`] after the delay
//! - [`LlmRequest`]: perform the call, then [`PortRuntime::resolve_llm`] or
//!   [`PortRuntime::fail_llm`]
//! - cancelled tickets: abort those in-flight calls
//!
//! `portflow-session` is the driver that does this on `tokio`.
//!
//! ## Propagation order
//!
//! Writes are applied breadth-first from a FIFO queue. Bindings sharing a
//! source fire in declaration order, so when several bindings target one
//! port the last declared one wins. Every top-level call is bounded by
//! [`RuntimeConfig::max_propagation_steps`].

mod engine;
mod relationship;
mod result;
mod retry;
mod store;

pub use engine::PortRuntime;
pub use relationship::{TransformFn, TransformRegistry, Verdict, truthy};
pub use result::{Interaction, InteractionKind, ResultMetadata, WidgetResult};
pub use retry::RetryPolicy;
pub use store::PortStore;

use crate::primitives::MAX_PROPAGATION_STEPS;
use crate::types::PortflowError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Runtime tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Port writes allowed per top-level call before giving up.
    pub max_propagation_steps: usize,
    /// Retry policy for `llm` edges.
    pub retry: RetryPolicy,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_propagation_steps: MAX_PROPAGATION_STEPS,
            retry: RetryPolicy::default(),
        }
    }
}

impl RuntimeConfig {
    /// Check that the config is usable.
    pub fn check(&self) -> Result<(), PortflowError> {
        if self.max_propagation_steps == 0 {
            return Err(PortflowError::Config(
                "max_propagation_steps must be at least 1".to_string(),
            ));
        }
        self.retry.check()
    }
}

// =============================================================================
// EFFECTS
// =============================================================================

/// A port value written during propagation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortWrite {
    /// `widget.port` key.
    pub path: String,
    /// New value.
    pub value: Value,
}

/// A debounce window the caller must time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceTimer {
    /// Binding whose window restarted.
    pub binding_id: String,
    /// Pass back to [`PortRuntime::fire_debounce`]; older sequences are ignored.
    pub seq: u64,
    /// Window length.
    pub delay_ms: u64,
}

/// An asynchronous `llm` edge evaluation the caller must perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Identifies the request when resolving it.
    pub ticket: u64,
    /// Binding being evaluated.
    pub binding_id: String,
    /// Relationship body.
    pub prompt: String,
    /// Source value snapshot.
    pub input: Value,
    /// `widget.port` key the result is applied to.
    pub target: String,
}

/// Handle of a port subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

/// A subscribed port changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Subscription that matched.
    pub subscription: SubscriptionId,
    /// `widget.port` key.
    pub path: String,
    /// New value.
    pub value: Value,
}

/// Everything one runtime call did and requested.
#[derive(Debug, Clone, PartialEq, Default)]
#[must_use]
pub struct Outcome {
    /// Port writes, in application order.
    pub writes: Vec<PortWrite>,
    /// Debounce windows to start or restart.
    pub timers: Vec<DebounceTimer>,
    /// `llm` calls to start.
    pub llm_requests: Vec<LlmRequest>,
    /// Tickets of in-flight `llm` calls whose results will be discarded.
    pub cancelled: Vec<u64>,
    /// Subscriber notifications, in write order.
    pub notifications: Vec<Notification>,
}

impl Outcome {
    /// Check if the call had no effect.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
            && self.timers.is_empty()
            && self.llm_requests.is_empty()
            && self.cancelled.is_empty()
            && self.notifications.is_empty()
    }

    /// Last value written to a port during this call.
    #[must_use]
    pub fn last_write(&self, path: &str) -> Option<&Value> {
        self.writes
            .iter()
            .rev()
            .find(|w| w.path == path)
            .map(|w| &w.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_defaults_and_check() {
        let config = RuntimeConfig::default();
        assert_eq!(config.max_propagation_steps, 1024);
        assert!(config.check().is_ok());
        let zero = RuntimeConfig {
            max_propagation_steps: 0,
            ..config
        };
        assert!(zero.check().is_err());
    }

    #[test]
    fn last_write_wins_lookup() {
        let outcome = Outcome {
            writes: vec![
                PortWrite {
                    path: "b.in".to_string(),
                    value: json!(1),
                },
                PortWrite {
                    path: "b.in".to_string(),
                    value: json!(2),
                },
            ],
            ..Outcome::default()
        };
        assert_eq!(outcome.last_write("b.in"), Some(&json!(2)));
        assert!(outcome.last_write("c.in").is_none());
        assert!(Outcome::default().is_empty());
    }
}
