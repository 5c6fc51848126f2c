//! # Widget Controllers
//!
//! One state module per typed component. Every state is an immutable value:
//! transitions consume `self` and return the next state or a
//! [`ControllerError`], so a controller is fully testable without a host UI.
//!
//! Each state maps itself to port values ([`WidgetState::emissions`]) and a
//! one-line human summary ([`WidgetState::summary`]). The runtime hydrates a
//! [`WidgetState`] from a widget's config plus its current port values when
//! it builds a [`crate::WidgetResult`].

mod brainstorm;
mod priority_grid;
mod summary;
mod tradeoff;

pub use brainstorm::BrainstormState;
pub use priority_grid::PriorityGridState;
pub use summary::SummaryState;
pub use tradeoff::TradeoffState;

use crate::widget_config::WidgetConfig;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Rejected controller transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// Text input was empty after trimming.
    #[error("Text must not be empty")]
    EmptyText,

    /// The item already exists.
    #[error("Duplicate item: {0}")]
    DuplicateItem(String),

    /// The collection is at capacity.
    #[error("At most {max} items allowed")]
    Full {
        /// Capacity.
        max: usize,
    },

    /// An index did not address an existing item.
    #[error("Index {index} out of range for {len} items")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Current length.
        len: usize,
    },

    /// A named item or section does not exist.
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// A numeric value fell outside its bounds.
    #[error("Value {value} outside [{min}, {max}]")]
    OutOfRange {
        /// Offered value.
        value: i64,
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
    },

    /// Confirmation attempted with required parts still empty.
    #[error("Cannot confirm; missing: {}", .0.join(", "))]
    Incomplete(Vec<String>),

    /// The state is already confirmed and no longer editable.
    #[error("Already confirmed")]
    Confirmed,
}

/// Controller state of a widget, keyed by component type.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetState {
    /// `brainstorm`.
    Brainstorm(BrainstormState),
    /// `tradeoff_balance`.
    TradeoffBalance(TradeoffState),
    /// `priority_slider_grid`.
    PrioritySliderGrid(PriorityGridState),
    /// `summary_card`.
    SummaryCard(SummaryState),
    /// Component without a controller; only counts its set ports.
    Untyped {
        /// Component type name.
        component: String,
        /// Number of non-null port values.
        populated: usize,
    },
}

impl WidgetState {
    /// Initial state from a typed config.
    #[must_use]
    pub fn from_config(config: &WidgetConfig) -> Self {
        match config {
            WidgetConfig::Brainstorm(c) => WidgetState::Brainstorm(BrainstormState::new(c)),
            WidgetConfig::TradeoffBalance(c) => WidgetState::TradeoffBalance(TradeoffState::new(c)),
            WidgetConfig::PrioritySliderGrid(c) => {
                WidgetState::PrioritySliderGrid(PriorityGridState::new(c))
            }
            WidgetConfig::SummaryCard(c) => WidgetState::SummaryCard(SummaryState::new(c)),
            WidgetConfig::Untyped(u) => WidgetState::Untyped {
                component: u.component.clone(),
                populated: 0,
            },
        }
    }

    /// State from a config overlaid with current port values.
    ///
    /// Port values with an unexpected shape are ignored.
    #[must_use]
    pub fn hydrate(config: &WidgetConfig, ports: &BTreeMap<String, Value>) -> Self {
        match Self::from_config(config) {
            WidgetState::Brainstorm(s) => WidgetState::Brainstorm(s.hydrate(ports)),
            WidgetState::TradeoffBalance(s) => WidgetState::TradeoffBalance(s.hydrate(ports)),
            WidgetState::PrioritySliderGrid(s) => WidgetState::PrioritySliderGrid(s.hydrate(ports)),
            WidgetState::SummaryCard(s) => WidgetState::SummaryCard(s.hydrate(ports)),
            WidgetState::Untyped { component, .. } => WidgetState::Untyped {
                component,
                populated: ports.values().filter(|v| !v.is_null()).count(),
            },
        }
    }

    /// Port values this state publishes, keyed by port id.
    #[must_use]
    pub fn emissions(&self) -> BTreeMap<&'static str, Value> {
        match self {
            WidgetState::Brainstorm(s) => s.emissions(),
            WidgetState::TradeoffBalance(s) => s.emissions(),
            WidgetState::PrioritySliderGrid(s) => s.emissions(),
            WidgetState::SummaryCard(s) => s.emissions(),
            WidgetState::Untyped { .. } => BTreeMap::new(),
        }
    }

    /// One-line human summary.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            WidgetState::Brainstorm(s) => s.summary(),
            WidgetState::TradeoffBalance(s) => s.summary(),
            WidgetState::PrioritySliderGrid(s) => s.summary(),
            WidgetState::SummaryCard(s) => s.summary(),
            WidgetState::Untyped {
                component,
                populated,
            } => format!("{}: {} ports set", component, populated),
        }
    }

    /// Check if the user has done what the widget asks for.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match self {
            WidgetState::Brainstorm(s) => s.is_complete(),
            WidgetState::TradeoffBalance(s) => s.is_complete(),
            WidgetState::PrioritySliderGrid(s) => s.is_complete(),
            WidgetState::SummaryCard(s) => s.is_complete(),
            WidgetState::Untyped { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget_config::components;
    use serde_json::json;

    #[test]
    fn hydrate_overlays_port_values() {
        let config = WidgetConfig::parse(components::BRAINSTORM, &json!({"minItems": 2}))
            .expect("config");
        let mut ports = BTreeMap::new();
        ports.insert("items".to_string(), json!(["a", "b"]));
        let state = WidgetState::hydrate(&config, &ports);
        assert!(state.is_complete());
        assert_eq!(state.emissions().get("items"), Some(&json!(["a", "b"])));
    }

    #[test]
    fn untyped_counts_populated_ports() {
        let config = WidgetConfig::parse("mood_board", &json!({})).expect("config");
        let mut ports = BTreeMap::new();
        ports.insert("a".to_string(), json!(1));
        ports.insert("b".to_string(), Value::Null);
        let state = WidgetState::hydrate(&config, &ports);
        assert_eq!(state.summary(), "mood_board: 1 ports set");
        assert!(state.emissions().is_empty());
    }

    #[test]
    fn incomplete_error_lists_missing() {
        let err = ControllerError::Incomplete(vec!["Risks".to_string(), "Next steps".to_string()]);
        assert_eq!(err.to_string(), "Cannot confirm; missing: Risks, Next steps");
    }
}
