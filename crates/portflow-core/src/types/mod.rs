//! # Core Type Definitions
//!
//! Types shared by every layer of the engine:
//! - Fixed-point scores (`Score`)
//! - Edge semantics shared by data dependencies and reactive bindings
//!   (`Mechanism`, `Relationship`)
//! - Error types (`PortflowError`)
//!
//! ## Determinism Guarantees
//!
//! Scores are stored as integer thousandths. Budget sums are exact, so the
//! same selection always produces the same verdict and the same message.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use thiserror::Error;

// =============================================================================
// SCORE
// =============================================================================

/// A non-negative fixed-point score with three decimal places.
///
/// Used for widget metadata (`timing`, `versatility`, `complexity`) and for
/// configured thresholds. JSON and TOML carry plain floats; conversion
/// happens once at the boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "f64", into = "f64")]
pub struct Score(u32);

impl Score {
    /// The zero score.
    pub const ZERO: Score = Score(0);

    /// The unit score (1.0), upper bound of metadata values.
    pub const ONE: Score = Score(1000);

    /// Create a score from thousandths.
    #[must_use]
    pub const fn from_millis(millis: u32) -> Self {
        Self(millis)
    }

    /// Get the raw value in thousandths.
    #[must_use]
    pub const fn millis(self) -> u32 {
        self.0
    }

    /// Add two scores using saturating arithmetic.
    #[must_use]
    pub const fn saturating_add(self, other: Score) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Check if the score lies within `[0, 1]`.
    #[must_use]
    pub const fn is_unit(self) -> bool {
        self.0 <= Self::ONE.0
    }
}

impl TryFrom<f64> for Score {
    type Error = PortflowError;

    #[allow(clippy::float_arithmetic)]
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value < 0.0 {
            return Err(PortflowError::InvalidScore(value.to_string()));
        }
        let millis = (value * 1000.0).round();
        if millis > f64::from(u32::MAX) {
            return Err(PortflowError::InvalidScore(value.to_string()));
        }
        Ok(Self(millis as u32))
    }
}

impl From<Score> for f64 {
    #[allow(clippy::float_arithmetic)]
    fn from(score: Score) -> Self {
        f64::from(score.0) / 1000.0
    }
}

impl Sum for Score {
    fn sum<I: Iterator<Item = Score>>(iter: I) -> Self {
        iter.fold(Score::ZERO, Score::saturating_add)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = self.0 / 1000;
        let frac = self.0 % 1000;
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:03}", frac);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

// =============================================================================
// EDGE SEMANTICS
// =============================================================================

/// What an edge does to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mechanism {
    /// Checks the target. Never mutates it, so cycles are allowed.
    Validate,
    /// Writes the target. Cycles can never converge and are rejected.
    Update,
}

impl Mechanism {
    /// Get the wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Mechanism::Validate => "validate",
            Mechanism::Update => "update",
        }
    }
}

/// How a source value becomes a target value.
///
/// Wire shape: `{"type": "javascript", "body": "source.length"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Relationship {
    /// Copy the value unchanged.
    Passthrough,
    /// Pure synchronous expression over the source value.
    Javascript {
        /// Expression text.
        body: String,
    },
    /// Pure synchronous transform over the source value.
    Transform {
        /// Transform text or registered transform name.
        body: String,
    },
    /// Asynchronous text-generation call; the only suspension point.
    Llm {
        /// Prompt text.
        body: String,
    },
}

impl Relationship {
    /// Get the wire name of the relationship kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Relationship::Passthrough => "passthrough",
            Relationship::Javascript { .. } => "javascript",
            Relationship::Transform { .. } => "transform",
            Relationship::Llm { .. } => "llm",
        }
    }

    /// Get the body text, if the relationship carries one.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Relationship::Passthrough => None,
            Relationship::Javascript { body }
            | Relationship::Transform { body }
            | Relationship::Llm { body } => Some(body),
        }
    }

    /// Check if the relationship may convert between data types.
    #[must_use]
    pub fn bridges_types(&self) -> bool {
        matches!(
            self,
            Relationship::Javascript { .. } | Relationship::Transform { .. }
        )
    }

    /// Check if evaluation suspends.
    #[must_use]
    pub fn is_async(&self) -> bool {
        matches!(self, Relationship::Llm { .. })
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by path parsing, registry construction and the port runtime.
///
/// Validators never return these; they report [`crate::Diagnostic`]s.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortflowError {
    /// An address did not have exactly one separator with two non-empty segments.
    #[error("Malformed path '{path}': {reason}")]
    MalformedPath {
        /// The offending input.
        path: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A widget definition or widget instance was not found.
    #[error("Unknown widget: {0}")]
    UnknownWidget(String),

    /// A port was not declared on the widget.
    #[error("Unknown port: {widget}.{port}")]
    UnknownPort {
        /// Widget instance id.
        widget: String,
        /// Port id.
        port: String,
    },

    /// A registry entry declared a reserved port or duplicated an id.
    #[error("Invalid widget definition '{widget}': {reason}")]
    InvalidDefinition {
        /// Widget definition id.
        widget: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The widget instance is not mounted.
    #[error("Widget not mounted: {0}")]
    NotMounted(String),

    /// The widget instance is already mounted.
    #[error("Widget already mounted: {0}")]
    AlreadyMounted(String),

    /// A written value violates a port constraint.
    #[error("Constraint violated on {path}: {reason}")]
    ConstraintViolation {
        /// `widget.port` address.
        path: String,
        /// Which constraint failed.
        reason: String,
    },

    /// A widget tried to write a port the runtime owns.
    #[error("Reserved port cannot be emitted: {0}")]
    ReservedPort(String),

    /// An emission triggered more binding applications than allowed.
    #[error("Propagation exceeded {0} steps")]
    PropagationTimeout(usize),

    /// A score was negative, non-finite or out of range.
    #[error("Invalid score: {0}")]
    InvalidScore(String),

    /// An artifact failed validation and cannot drive a runtime.
    #[error("Invalid artifact: {0} error(s)")]
    InvalidArtifact(usize),

    /// Configuration could not be applied.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for PortflowError {
    fn from(e: serde_json::Error) -> Self {
        PortflowError::Serialization(e.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_sums_are_exact() {
        let a = Score::try_from(0.6).expect("score");
        let b = Score::try_from(0.5).expect("score");
        let sum: Score = [a, b].into_iter().sum();
        assert_eq!(sum, Score::from_millis(1100));
        assert_eq!(sum.to_string(), "1.1");
    }

    #[test]
    fn score_display_trims_zeros() {
        assert_eq!(Score::from_millis(800).to_string(), "0.8");
        assert_eq!(Score::from_millis(1000).to_string(), "1");
        assert_eq!(Score::from_millis(0).to_string(), "0");
        assert_eq!(Score::from_millis(1250).to_string(), "1.25");
        assert_eq!(Score::from_millis(5).to_string(), "0.005");
    }

    #[test]
    fn score_rejects_negative_and_nan() {
        assert!(Score::try_from(-0.1).is_err());
        assert!(Score::try_from(f64::NAN).is_err());
        assert!(Score::try_from(f64::INFINITY).is_err());
    }

    #[test]
    fn score_unit_interval() {
        assert!(Score::ONE.is_unit());
        assert!(!Score::from_millis(1001).is_unit());
    }

    #[test]
    fn score_deserializes_from_float() {
        let score: Score = serde_json::from_str("0.35").expect("deserialize");
        assert_eq!(score.millis(), 350);
        let back = serde_json::to_string(&score).expect("serialize");
        assert_eq!(back, "0.35");
    }

    #[test]
    fn relationship_wire_shape() {
        let rel: Relationship =
            serde_json::from_str(r#"{"type":"javascript","body":"source"}"#).expect("parse");
        assert_eq!(rel.kind(), "javascript");
        assert_eq!(rel.body(), Some("source"));
        assert!(rel.bridges_types());

        let pass: Relationship = serde_json::from_str(r#"{"type":"passthrough"}"#).expect("parse");
        assert_eq!(pass, Relationship::Passthrough);
        assert!(!pass.bridges_types());
    }

    #[test]
    fn only_llm_is_async() {
        assert!(
            Relationship::Llm {
                body: "x".to_string()
            }
            .is_async()
        );
        assert!(!Relationship::Passthrough.is_async());
    }
}
