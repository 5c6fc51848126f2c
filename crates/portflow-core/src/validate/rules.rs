//! Tunable validation rules.

use crate::primitives::{
    DEFAULT_ARTIFACT_VERSION, DEFAULT_CLOSING_WIDGETS, DEFAULT_MAX_STAGE_COMPLEXITY_MILLIS,
    DEFAULT_REALTIME_COMPLEXITY_MILLIS, DEFAULT_VALIDATE_DENSITY_MILLIS, MAX_WIDGETS_PER_STAGE,
    MIN_WIDGETS_PER_STAGE,
};
use crate::types::{PortflowError, Score};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Thresholds and whitelists applied by the validators.
///
/// Every field has a default, so a config file only names what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Expected schema version tag.
    pub schema_version: String,
    /// Expected selection version tag.
    pub selection_version: String,
    /// Expected UI-spec version tag.
    pub ui_spec_version: String,
    /// Maximum summed widget complexity per stage.
    pub max_stage_complexity: Score,
    /// Minimum widgets per stage.
    pub min_widgets_per_stage: usize,
    /// Maximum widgets per stage.
    pub max_widgets_per_stage: usize,
    /// Widgets of which the summary stage needs at least one.
    pub closing_widgets: BTreeSet<String>,
    /// Validate edges per node above which a density warning is raised.
    pub validate_density_threshold: Score,
    /// Widget complexity above which realtime bindings into it are flagged.
    pub realtime_complexity_threshold: Score,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            schema_version: DEFAULT_ARTIFACT_VERSION.to_string(),
            selection_version: DEFAULT_ARTIFACT_VERSION.to_string(),
            ui_spec_version: DEFAULT_ARTIFACT_VERSION.to_string(),
            max_stage_complexity: Score::from_millis(DEFAULT_MAX_STAGE_COMPLEXITY_MILLIS),
            min_widgets_per_stage: MIN_WIDGETS_PER_STAGE,
            max_widgets_per_stage: MAX_WIDGETS_PER_STAGE,
            closing_widgets: DEFAULT_CLOSING_WIDGETS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            validate_density_threshold: Score::from_millis(DEFAULT_VALIDATE_DENSITY_MILLIS),
            realtime_complexity_threshold: Score::from_millis(DEFAULT_REALTIME_COMPLEXITY_MILLIS),
        }
    }
}

impl ValidationRules {
    /// Override the stage complexity budget.
    #[must_use]
    pub fn with_max_stage_complexity(mut self, budget: Score) -> Self {
        self.max_stage_complexity = budget;
        self
    }

    /// Check that the rules are self-consistent.
    pub fn check(&self) -> Result<(), PortflowError> {
        if self.min_widgets_per_stage > self.max_widgets_per_stage {
            return Err(PortflowError::Config(format!(
                "min_widgets_per_stage {} exceeds max_widgets_per_stage {}",
                self.min_widgets_per_stage, self.max_widgets_per_stage
            )));
        }
        if self.closing_widgets.is_empty() {
            return Err(PortflowError::Config(
                "closing_widgets must name at least one widget".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let rules = ValidationRules::default();
        assert_eq!(rules.max_stage_complexity.to_string(), "0.8");
        assert_eq!(rules.min_widgets_per_stage, 1);
        assert_eq!(rules.max_widgets_per_stage, 3);
        assert!(rules.closing_widgets.contains("summary_card"));
        assert!(rules.check().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let rules: ValidationRules =
            serde_json::from_str(r#"{"max_stage_complexity": 1.2}"#).expect("parse");
        assert_eq!(rules.max_stage_complexity, Score::from_millis(1200));
        assert_eq!(rules.schema_version, "1.0");
    }

    #[test]
    fn inconsistent_rules_rejected() {
        let rules = ValidationRules {
            min_widgets_per_stage: 4,
            ..ValidationRules::default()
        };
        assert!(rules.check().is_err());
    }
}
