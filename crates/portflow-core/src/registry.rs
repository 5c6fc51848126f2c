//! # Widget Registry
//!
//! The static catalog of widget definitions, loaded once at process start.
//!
//! The registry is an explicit, immutable value passed by reference into
//! every validator and runtime constructor. There is no global instance.
//!
//! Construction enforces the catalog's own invariants:
//! - Definition ids are unique
//! - Port ids are unique per definition
//! - Reserved ports (`_error`, `_completed`) are never declared
//! - Metadata scores lie within `[0, 1]`
//! - Pattern constraints compile

use crate::path::is_reserved_port;
use crate::primitives::RESERVED_PORT_DATA_TYPE;
use crate::stage::Stage;
use crate::types::{PortflowError, Score};
use serde::{Deserialize, Serialize};
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

// =============================================================================
// PORTS
// =============================================================================

/// Direction of a port relative to its widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    /// The widget consumes values on this port.
    In,
    /// The widget produces values on this port.
    Out,
}

/// A check applied to every value written to a port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PortConstraint {
    /// Numeric bounds, inclusive.
    Range {
        /// Lower bound.
        #[serde(default)]
        min: Option<f64>,
        /// Upper bound.
        #[serde(default)]
        max: Option<f64>,
    },
    /// Value must equal one of the listed values.
    Enum {
        /// Allowed values.
        values: Vec<Value>,
    },
    /// Array length bounds, inclusive.
    #[serde(rename_all = "camelCase")]
    Array {
        /// Minimum length.
        #[serde(default)]
        min_items: Option<usize>,
        /// Maximum length.
        #[serde(default)]
        max_items: Option<usize>,
    },
    /// String must match the regular expression.
    Pattern {
        /// Regular expression.
        pattern: PatternRule,
    },
}

/// A regular expression kept as its source text, compiled on first use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PatternRule {
    source: String,
    compiled: OnceLock<Regex>,
}

impl PatternRule {
    /// Wrap a pattern. It is compiled when first checked.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            compiled: OnceLock::new(),
        }
    }

    /// The pattern source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled expression, built once.
    pub fn regex(&self) -> Result<&Regex, regex::Error> {
        if let Some(re) = self.compiled.get() {
            return Ok(re);
        }
        let re = Regex::new(&self.source)?;
        Ok(self.compiled.get_or_init(|| re))
    }
}

impl PartialEq for PatternRule {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl From<String> for PatternRule {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl From<PatternRule> for String {
    fn from(rule: PatternRule) -> Self {
        rule.source
    }
}

impl PortConstraint {
    /// Check a value. Returns a reason on failure.
    ///
    /// `null` passes every constraint; absence is expressed by `required`.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        if value.is_null() {
            return Ok(());
        }
        match self {
            PortConstraint::Range { min, max } => {
                let Some(n) = value.as_f64() else {
                    return Err(format!("expected a number, got {}", value));
                };
                if min.is_some_and(|m| n < m) || max.is_some_and(|m| n > m) {
                    return Err(format!(
                        "{} outside range [{}, {}]",
                        n,
                        min.map_or("-inf".to_string(), |m| m.to_string()),
                        max.map_or("inf".to_string(), |m| m.to_string()),
                    ));
                }
                Ok(())
            }
            PortConstraint::Enum { values } => {
                if values.contains(value) {
                    Ok(())
                } else {
                    Err(format!("{} is not an allowed value", value))
                }
            }
            PortConstraint::Array {
                min_items,
                max_items,
            } => {
                let Some(items) = value.as_array() else {
                    return Err(format!("expected an array, got {}", value));
                };
                let len = items.len();
                if min_items.is_some_and(|m| len < m) || max_items.is_some_and(|m| len > m) {
                    return Err(format!("array length {} outside allowed bounds", len));
                }
                Ok(())
            }
            PortConstraint::Pattern { pattern } => {
                let Some(text) = value.as_str() else {
                    return Err(format!("expected a string, got {}", value));
                };
                let re = pattern
                    .regex()
                    .map_err(|e| format!("invalid pattern '{}': {}", pattern.as_str(), e))?;
                if re.is_match(text) {
                    Ok(())
                } else {
                    Err(format!("'{}' does not match /{}/", text, pattern.as_str()))
                }
            }
        }
    }
}

/// A named, typed slot on a widget definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortDefinition {
    /// Unique within the widget definition; never a reserved id.
    pub id: String,
    /// Input or output.
    pub direction: PortDirection,
    /// Type name compared across bindings, e.g. `number`, `array<string>`.
    pub data_type: String,
    /// Free text.
    #[serde(default)]
    pub description: String,
    /// Checks applied on write.
    #[serde(default)]
    pub constraints: Vec<PortConstraint>,
    /// Initial value at mount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Input must be fed by a data binding.
    #[serde(default)]
    pub required: bool,
}

impl PortDefinition {
    /// Create an input port.
    #[must_use]
    pub fn input(id: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            direction: PortDirection::In,
            data_type: data_type.into(),
            description: String::new(),
            constraints: Vec::new(),
            default_value: None,
            required: false,
        }
    }

    /// Create an output port.
    #[must_use]
    pub fn output(id: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            direction: PortDirection::Out,
            ..Self::input(id, data_type)
        }
    }

    /// Mark the port required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Add a constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: PortConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Run every constraint against a value.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        self.constraints.iter().try_for_each(|c| c.check(value))
    }
}

/// Declared ports of a widget definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WidgetPorts {
    /// Input ports.
    #[serde(default)]
    pub inputs: Vec<PortDefinition>,
    /// Output ports.
    #[serde(default)]
    pub outputs: Vec<PortDefinition>,
}

/// Scoring metadata used by selection budgets and binding policy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WidgetMetadata {
    /// Relative time cost.
    pub timing: Score,
    /// How many situations the widget fits.
    pub versatility: Score,
    /// Known friction points.
    #[serde(default)]
    pub bottleneck: Vec<String>,
    /// Rendering and generation cost; summed against the stage budget.
    pub complexity: Score,
}

// =============================================================================
// WIDGET DEFINITION
// =============================================================================

/// A widget kind as catalogued in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDefinition {
    /// Component type name, e.g. `tradeoff_balance`.
    pub id: String,
    /// Stage the widget is designed for.
    pub stage: Stage,
    /// Declared ports.
    #[serde(default)]
    pub ports: WidgetPorts,
    /// Scores.
    #[serde(default)]
    pub metadata: WidgetMetadata,
    /// JSON schema of the config object, opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_schema: Option<Value>,
    /// Hints for the generation pipeline, opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_hints: Option<Value>,
}

impl WidgetDefinition {
    /// Create a definition with no ports and zero metadata.
    #[must_use]
    pub fn new(id: impl Into<String>, stage: Stage) -> Self {
        Self {
            id: id.into(),
            stage,
            ports: WidgetPorts::default(),
            metadata: WidgetMetadata::default(),
            config_schema: None,
            generation_hints: None,
        }
    }

    /// Add a port, routed by its direction.
    #[must_use]
    pub fn with_port(mut self, port: PortDefinition) -> Self {
        match port.direction {
            PortDirection::In => self.ports.inputs.push(port),
            PortDirection::Out => self.ports.outputs.push(port),
        }
        self
    }

    /// Set the complexity score.
    #[must_use]
    pub fn with_complexity(mut self, complexity: Score) -> Self {
        self.metadata.complexity = complexity;
        self
    }

    /// All declared ports, inputs first, in declaration order.
    pub fn all_ports(&self) -> impl Iterator<Item = &PortDefinition> {
        self.ports.inputs.iter().chain(self.ports.outputs.iter())
    }

    /// Find a declared port.
    #[must_use]
    pub fn port(&self, id: &str) -> Option<&PortDefinition> {
        self.all_ports().find(|p| p.id == id)
    }

    /// Data type of a declared or reserved port.
    #[must_use]
    pub fn port_data_type(&self, id: &str) -> Option<&str> {
        if is_reserved_port(id) {
            return Some(RESERVED_PORT_DATA_TYPE);
        }
        self.port(id).map(|p| p.data_type.as_str())
    }

    /// Ids of required input ports, in declaration order.
    pub fn required_inputs(&self) -> impl Iterator<Item = &str> {
        self.ports
            .inputs
            .iter()
            .filter(|p| p.required)
            .map(|p| p.id.as_str())
    }

    /// Check the definition's own invariants.
    fn check(&self) -> Result<(), PortflowError> {
        let invalid = |reason: String| PortflowError::InvalidDefinition {
            widget: self.id.clone(),
            reason,
        };

        let mut seen = BTreeSet::new();
        for port in self.all_ports() {
            if is_reserved_port(&port.id) {
                return Err(invalid(format!("declares reserved port '{}'", port.id)));
            }
            if !seen.insert(port.id.as_str()) {
                return Err(invalid(format!("duplicate port '{}'", port.id)));
            }
            for constraint in &port.constraints {
                if let PortConstraint::Pattern { pattern } = constraint {
                    pattern.regex().map_err(|e| {
                        invalid(format!(
                            "port '{}' has invalid pattern '{}': {}",
                            port.id,
                            pattern.as_str(),
                            e
                        ))
                    })?;
                }
            }
        }
        for port in &self.ports.inputs {
            if port.direction != PortDirection::In {
                return Err(invalid(format!("port '{}' listed as input", port.id)));
            }
        }
        for port in &self.ports.outputs {
            if port.direction != PortDirection::Out {
                return Err(invalid(format!("port '{}' listed as output", port.id)));
            }
        }

        let meta = &self.metadata;
        for (name, score) in [
            ("timing", meta.timing),
            ("versatility", meta.versatility),
            ("complexity", meta.complexity),
        ] {
            if !score.is_unit() {
                return Err(invalid(format!("{} {} outside [0, 1]", name, score)));
            }
        }
        Ok(())
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Immutable catalog of widget definitions keyed by id.
#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    definitions: BTreeMap<String, WidgetDefinition>,
}

impl WidgetRegistry {
    /// Build a registry, rejecting any definition that breaks an invariant.
    pub fn new(definitions: Vec<WidgetDefinition>) -> Result<Self, PortflowError> {
        let mut map = BTreeMap::new();
        for definition in definitions {
            definition.check()?;
            if map.contains_key(&definition.id) {
                return Err(PortflowError::InvalidDefinition {
                    widget: definition.id,
                    reason: "duplicate definition id".to_string(),
                });
            }
            map.insert(definition.id.clone(), definition);
        }
        Ok(Self { definitions: map })
    }

    /// Parse a JSON array of definitions.
    pub fn from_json(text: &str) -> Result<Self, PortflowError> {
        let definitions: Vec<WidgetDefinition> = serde_json::from_str(text)?;
        Self::new(definitions)
    }

    /// Look up a definition.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WidgetDefinition> {
        self.definitions.get(id)
    }

    /// Check if a definition exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// All definitions, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &WidgetDefinition> {
        self.definitions.values()
    }

    /// Definitions designed for a stage, ordered by id.
    pub fn for_stage(&self, stage: Stage) -> impl Iterator<Item = &WidgetDefinition> {
        self.definitions.values().filter(move |d| d.stage == stage)
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
