//! # Innate Primitives
//!
//! Hardcoded constants for the portflow engine.
//!
//! These are compiled into the binary and immutable at runtime. Anything a
//! deployment may want to tune lives in [`crate::validate::ValidationRules`]
//! or [`crate::runtime::RuntimeConfig`] instead, with these as defaults.

/// Reserved error port present on every widget instance.
///
/// Value shape: `{"hasError": bool, "messages": [string]}`.
pub const ERROR_PORT: &str = "_error";

/// Reserved completion port present on every widget instance.
///
/// Value shape: `{"isCompleted": bool, "requiredFields": [string]}`.
pub const COMPLETED_PORT: &str = "_completed";

/// All reserved port ids, in a fixed order.
pub const RESERVED_PORTS: [&str; 2] = [ERROR_PORT, COMPLETED_PORT];

/// Data type reported for reserved ports when type-checking bindings.
pub const RESERVED_PORT_DATA_TYPE: &str = "object";

/// Separator between the two segments of an address.
pub const PATH_SEPARATOR: char = '.';

/// Artifact version expected by default for schemas, selections and UI specs.
pub const DEFAULT_ARTIFACT_VERSION: &str = "1.0";

/// Default per-stage complexity budget, in thousandths (0.8).
pub const DEFAULT_MAX_STAGE_COMPLEXITY_MILLIS: u32 = 800;

/// Default complexity above which realtime bindings into a widget are flagged (0.7).
pub const DEFAULT_REALTIME_COMPLEXITY_MILLIS: u32 = 700;

/// Default validate-edge density above which a warning is raised (1.5 edges per node).
pub const DEFAULT_VALIDATE_DENSITY_MILLIS: u32 = 1500;

/// Minimum number of widgets selected for a stage.
pub const MIN_WIDGETS_PER_STAGE: usize = 1;

/// Maximum number of widgets selected for a stage.
pub const MAX_WIDGETS_PER_STAGE: usize = 3;

/// Widgets allowed to close the summary stage by default.
pub const DEFAULT_CLOSING_WIDGETS: [&str; 2] = ["summary_card", "action_plan"];

/// Debounce window applied when a debounced binding omits `debounceMs`.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Upper bound on binding applications triggered by a single emission.
///
/// Update cycles are rejected at validation time, but validate edges may
/// write `_error`, which can itself be a binding source. This bound keeps
/// every emission computationally finite.
pub const MAX_PROPAGATION_STEPS: usize = 1024;

/// Maximum nesting depth for `source.a.b.c` field access in expressions.
pub const MAX_FIELD_ACCESS_DEPTH: usize = 16;

/// Default number of attempts for an `llm` relationship call.
pub const DEFAULT_LLM_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first `llm` retry, in milliseconds.
pub const DEFAULT_LLM_INITIAL_BACKOFF_MS: u64 = 200;

/// Default ceiling for the `llm` retry delay, in milliseconds.
pub const DEFAULT_LLM_MAX_BACKOFF_MS: u64 = 5_000;

/// Default timeout for a single `llm` call attempt, in milliseconds.
pub const DEFAULT_LLM_TIMEOUT_MS: u64 = 30_000;
