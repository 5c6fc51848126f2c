//! # Selection Model
//!
//! The per-stage widget selection produced by the generation pipeline.
//!
//! Stage keys are kept as raw strings so that an unexpected stage name is a
//! diagnostic rather than a parse failure.

use crate::stage::Stage;
use crate::types::PortflowError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One widget picked for a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedWidget {
    /// Registry definition id.
    pub widget_id: String,
    /// Why the generator picked it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl SelectedWidget {
    /// Create a selection entry without rationale.
    #[must_use]
    pub fn new(widget_id: impl Into<String>) -> Self {
        Self {
            widget_id: widget_id.into(),
            rationale: None,
        }
    }
}

/// Widgets picked for one stage, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageSelection {
    /// Selected widgets.
    #[serde(default)]
    pub widgets: Vec<SelectedWidget>,
}

/// The full widget-selection result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Version tag; must equal the expected selection version.
    pub version: String,
    /// Selections keyed by stage name.
    #[serde(default)]
    pub stages: BTreeMap<String, StageSelection>,
}

impl SelectionResult {
    /// Create an empty selection.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            stages: BTreeMap::new(),
        }
    }

    /// Parse a selection from JSON text.
    pub fn from_json(text: &str) -> Result<Self, PortflowError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Set the widgets for a stage.
    #[must_use]
    pub fn with_stage(mut self, stage: Stage, widget_ids: &[&str]) -> Self {
        self.stages.insert(
            stage.as_str().to_string(),
            StageSelection {
                widgets: widget_ids.iter().map(|id| SelectedWidget::new(*id)).collect(),
            },
        );
        self
    }

    /// Widgets selected for a stage; empty if the stage is absent.
    #[must_use]
    pub fn widgets_for(&self, stage: Stage) -> &[SelectedWidget] {
        self.stages
            .get(stage.as_str())
            .map(|s| s.widgets.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selection_json() {
        let json = r#"{"version":"1.0","stages":{
            "converge":{"widgets":[{"widgetId":"tradeoff_balance","rationale":"weigh"}]}
        }}"#;
        let selection = SelectionResult::from_json(json).expect("parse");
        let converge = selection.widgets_for(Stage::Converge);
        assert_eq!(converge.len(), 1);
        assert_eq!(converge[0].widget_id, "tradeoff_balance");
        assert!(selection.widgets_for(Stage::Diverge).is_empty());
    }

    #[test]
    fn builder_sets_stage() {
        let selection = SelectionResult::new("1.0").with_stage(Stage::Summary, &["summary_card"]);
        assert_eq!(selection.widgets_for(Stage::Summary)[0].widget_id, "summary_card");
    }
}
