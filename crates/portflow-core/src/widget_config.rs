//! # Typed Widget Configs
//!
//! Widget instances carry a raw `config` object. This module turns it into a
//! tagged union keyed by component type, each variant owning a typed shape.
//! Components without a typed shape land in [`WidgetConfig::Untyped`], which
//! keeps the raw data and is flagged by the UI-spec validator.

use crate::types::PortflowError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Component type names with a typed config and controller.
pub mod components {
    /// Free-form idea collection.
    pub const BRAINSTORM: &str = "brainstorm";
    /// Two-sided balance slider.
    pub const TRADEOFF_BALANCE: &str = "tradeoff_balance";
    /// Grid of priority sliders.
    pub const PRIORITY_SLIDER_GRID: &str = "priority_slider_grid";
    /// Closing summary card.
    pub const SUMMARY_CARD: &str = "summary_card";
}

/// Config of a `brainstorm` widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrainstormConfig {
    /// Prompt shown above the list.
    pub prompt: String,
    /// Items needed before the widget counts as complete.
    pub min_items: usize,
    /// Hard cap on items.
    pub max_items: usize,
}

impl Default for BrainstormConfig {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            min_items: 1,
            max_items: 20,
        }
    }
}

/// Config of a `tradeoff_balance` widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TradeoffConfig {
    /// Label of the 0 end.
    pub left_label: String,
    /// Label of the 100 end.
    pub right_label: String,
    /// Balance at mount, 0..=100.
    pub initial_balance: u8,
}

impl Default for TradeoffConfig {
    fn default() -> Self {
        Self {
            left_label: "left".to_string(),
            right_label: "right".to_string(),
            initial_balance: 50,
        }
    }
}

/// Config of a `priority_slider_grid` widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriorityGridConfig {
    /// Items to prioritize, in display order.
    pub items: Vec<String>,
    /// Slider minimum.
    pub min: i64,
    /// Slider maximum.
    pub max: i64,
}

impl Default for PriorityGridConfig {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            min: 0,
            max: 100,
        }
    }
}

/// Config of a `summary_card` widget.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryConfig {
    /// Card title.
    pub title: String,
    /// Section headings that must be filled before confirming.
    pub sections: Vec<String>,
}

/// Raw config of a component without a typed shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UntypedConfig {
    /// Component type name.
    pub component: String,
    /// Config exactly as received.
    pub raw: Value,
}

/// Widget config keyed by component type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "component", content = "config", rename_all = "snake_case")]
pub enum WidgetConfig {
    /// `brainstorm`.
    Brainstorm(BrainstormConfig),
    /// `tradeoff_balance`.
    TradeoffBalance(TradeoffConfig),
    /// `priority_slider_grid`.
    PrioritySliderGrid(PriorityGridConfig),
    /// `summary_card`.
    SummaryCard(SummaryConfig),
    /// Any other component. Always flagged by validation.
    Untyped(UntypedConfig),
}

fn typed<T: for<'de> Deserialize<'de>>(component: &str, raw: &Value) -> Result<T, PortflowError> {
    let value = if raw.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        raw.clone()
    };
    serde_json::from_value(value)
        .map_err(|e| PortflowError::Config(format!("{} config: {}", component, e)))
}

impl WidgetConfig {
    /// Type a raw config for a component.
    ///
    /// Fails only when a known component's config has the wrong shape or
    /// breaks its own bounds. Unknown components never fail.
    pub fn parse(component: &str, raw: &Value) -> Result<Self, PortflowError> {
        let config = match component {
            components::BRAINSTORM => WidgetConfig::Brainstorm(typed(component, raw)?),
            components::TRADEOFF_BALANCE => WidgetConfig::TradeoffBalance(typed(component, raw)?),
            components::PRIORITY_SLIDER_GRID => {
                WidgetConfig::PrioritySliderGrid(typed(component, raw)?)
            }
            components::SUMMARY_CARD => WidgetConfig::SummaryCard(typed(component, raw)?),
            other => WidgetConfig::Untyped(UntypedConfig {
                component: other.to_string(),
                raw: raw.clone(),
            }),
        };
        config.check().map_err(PortflowError::Config)?;
        Ok(config)
    }

    /// Component type name.
    #[must_use]
    pub fn component(&self) -> &str {
        match self {
            WidgetConfig::Brainstorm(_) => components::BRAINSTORM,
            WidgetConfig::TradeoffBalance(_) => components::TRADEOFF_BALANCE,
            WidgetConfig::PrioritySliderGrid(_) => components::PRIORITY_SLIDER_GRID,
            WidgetConfig::SummaryCard(_) => components::SUMMARY_CARD,
            WidgetConfig::Untyped(u) => &u.component,
        }
    }

    /// Check if the config has no typed shape.
    #[must_use]
    pub fn is_untyped(&self) -> bool {
        matches!(self, WidgetConfig::Untyped(_))
    }

    fn check(&self) -> Result<(), String> {
        match self {
            WidgetConfig::Brainstorm(c) if c.min_items > c.max_items => Err(format!(
                "brainstorm minItems {} exceeds maxItems {}",
                c.min_items, c.max_items
            )),
            WidgetConfig::TradeoffBalance(c) if c.initial_balance > 100 => Err(format!(
                "tradeoff_balance initialBalance {} exceeds 100",
                c.initial_balance
            )),
            WidgetConfig::PrioritySliderGrid(c) if c.min >= c.max => Err(format!(
                "priority_slider_grid min {} must be below max {}",
                c.min, c.max
            )),
            _ => Ok(()),
        }
    }
}
