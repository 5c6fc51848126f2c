//! # UI Specification Model
//!
//! A generated UI specification: widget instances, their data bindings to
//! schema attributes, and the reactive bindings wiring widget ports together.
//!
//! As with the schema, addresses stay raw strings until validation.

use crate::primitives::DEFAULT_DEBOUNCE_MS;
use crate::stage::Stage;
use crate::types::{Mechanism, PortflowError, Relationship};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Layout slot of a widget instance. Opaque to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Grid row.
    #[serde(default)]
    pub row: u32,
    /// Grid column.
    #[serde(default)]
    pub col: u32,
    /// Column span.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<u32>,
}

/// Direction of a data binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingDirection {
    /// Attribute feeds the port.
    In,
    /// Port feeds the attribute.
    Out,
    /// Both.
    Inout,
}

impl BindingDirection {
    /// Check if the binding feeds the port.
    #[must_use]
    pub fn feeds_port(&self) -> bool {
        matches!(self, BindingDirection::In | BindingDirection::Inout)
    }
}

/// Binds a widget port to a schema attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataBinding {
    /// Port on the owning widget.
    pub port_id: String,
    /// `entity.attribute` address.
    pub entity_attribute_path: String,
    /// Flow direction.
    pub direction: BindingDirection,
}

/// A widget instance in a UI specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSpec {
    /// Unique within the spec.
    pub id: String,
    /// Registry definition id.
    pub component: String,
    /// Layout slot.
    #[serde(default)]
    pub position: Position,
    /// Raw config object; typed through [`crate::WidgetConfig`].
    #[serde(default)]
    pub config: Value,
    /// Bindings to schema attributes.
    #[serde(default)]
    pub data_bindings: Vec<DataBinding>,
}

impl WidgetSpec {
    /// Create a widget instance with an empty config.
    #[must_use]
    pub fn new(id: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component: component.into(),
            position: Position::default(),
            config: Value::Object(serde_json::Map::new()),
            data_bindings: Vec::new(),
        }
    }

    /// Add a data binding.
    #[must_use]
    pub fn bind(mut self, port_id: &str, path: &str, direction: BindingDirection) -> Self {
        self.data_bindings.push(DataBinding {
            port_id: port_id.to_string(),
            entity_attribute_path: path.to_string(),
            direction,
        });
        self
    }

    /// Replace the config.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }
}

/// When a binding propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Within the emission that triggered it.
    Realtime,
    /// Once, with the last value, after the window goes quiet.
    Debounced,
    /// When the source widget confirms.
    OnConfirm,
}

/// A UI-level edge from one widget port to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactiveBinding {
    /// Unique within the spec.
    pub id: String,
    /// `widget.port` address.
    pub source: String,
    /// `widget.port` address; never a reserved port.
    pub target: String,
    /// Check or write.
    pub mechanism: Mechanism,
    /// How the target value is derived.
    pub relationship: Relationship,
    /// Propagation timing.
    pub update_mode: UpdateMode,
    /// Debounce window for `debounced` bindings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    /// Disabled bindings are validated but never propagate.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ReactiveBinding {
    /// Create an enabled realtime passthrough update binding.
    #[must_use]
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            mechanism: Mechanism::Update,
            relationship: Relationship::Passthrough,
            update_mode: UpdateMode::Realtime,
            debounce_ms: None,
            enabled: true,
        }
    }

    /// Set the mechanism.
    #[must_use]
    pub fn with_mechanism(mut self, mechanism: Mechanism) -> Self {
        self.mechanism = mechanism;
        self
    }

    /// Set the relationship.
    #[must_use]
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationship = relationship;
        self
    }

    /// Make the binding debounced with the given window.
    #[must_use]
    pub fn debounced(mut self, window_ms: u64) -> Self {
        self.update_mode = UpdateMode::Debounced;
        self.debounce_ms = Some(window_ms);
        self
    }

    /// Make the binding wait for confirmation.
    #[must_use]
    pub fn on_confirm(mut self) -> Self {
        self.update_mode = UpdateMode::OnConfirm;
        self
    }

    /// Disable the binding.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Debounce window, falling back to the default.
    #[must_use]
    pub fn effective_debounce_ms(&self) -> u64 {
        self.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)
    }
}

/// A generated UI specification for one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSpec {
    /// Version tag; must equal the expected UI-spec version.
    pub version: String,
    /// Stage the spec renders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    /// Widget instances, in declaration order.
    #[serde(default)]
    pub widgets: Vec<WidgetSpec>,
    /// Reactive bindings, in declaration order. Order is the propagation tie-break.
    #[serde(default)]
    pub reactive_bindings: Vec<ReactiveBinding>,
}

impl UiSpec {
    /// Create an empty spec.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            stage: None,
            widgets: Vec::new(),
            reactive_bindings: Vec::new(),
        }
    }

    /// Parse a spec from JSON text.
    pub fn from_json(text: &str) -> Result<Self, PortflowError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Add a widget instance.
    #[must_use]
    pub fn with_widget(mut self, widget: WidgetSpec) -> Self {
        self.widgets.push(widget);
        self
    }

    /// Add a reactive binding.
    #[must_use]
    pub fn with_binding(mut self, binding: ReactiveBinding) -> Self {
        self.reactive_bindings.push(binding);
        self
    }

    /// Find the first widget instance with the given id.
    #[must_use]
    pub fn widget(&self, id: &str) -> Option<&WidgetSpec> {
        self.widgets.iter().find(|w| w.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ui_spec_json() {
        let json = r#"{
            "version": "1.0",
            "stage": "converge",
            "widgets": [
                {"id": "A", "component": "tradeoff_balance",
                 "position": {"row": 0, "col": 1},
                 "config": {"leftLabel": "cost"},
                 "dataBindings": [{"portId": "options", "entityAttributePath": "converge_data.options", "direction": "in"}]}
            ],
            "reactiveBindings": [
                {"id": "b1", "source": "A.balance", "target": "B.input", "mechanism": "update",
                 "relationship": {"type": "passthrough"}, "updateMode": "debounced", "debounceMs": 500}
            ]
        }"#;
        let spec = UiSpec::from_json(json).expect("parse");
        assert_eq!(spec.widgets[0].position.col, 1);
        assert_eq!(spec.widgets[0].data_bindings[0].direction, BindingDirection::In);
        let binding = &spec.reactive_bindings[0];
        assert!(binding.enabled);
        assert_eq!(binding.update_mode, UpdateMode::Debounced);
        assert_eq!(binding.effective_debounce_ms(), 500);
    }

    #[test]
    fn debounce_window_defaults() {
        let binding = ReactiveBinding::new("b", "a.x", "c.y");
        assert_eq!(binding.effective_debounce_ms(), DEFAULT_DEBOUNCE_MS);
    }

    #[test]
    fn binding_direction_feeds_port() {
        assert!(BindingDirection::In.feeds_port());
        assert!(BindingDirection::Inout.feeds_port());
        assert!(!BindingDirection::Out.feeds_port());
    }
}
