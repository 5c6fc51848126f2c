//! # Path Addressing
//!
//! The two address grammars used throughout the engine:
//!
//! - `entity.attribute` addresses a schema attribute ([`EntityAttributePath`])
//! - `widget.port` addresses a widget instance port ([`WidgetPortPath`])
//!
//! Both share one structural rule: exactly one `.` with a non-empty segment
//! on each side. Formatting is the exact inverse of parsing, so
//! `create_port_key(parse(x)) == x` for every well-formed `x`.

use crate::primitives::{PATH_SEPARATOR, RESERVED_PORTS};
use crate::types::PortflowError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Split an address into its two segments.
fn split_address(path: &str) -> Result<(&str, &str), PortflowError> {
    let malformed = |reason| PortflowError::MalformedPath {
        path: path.to_string(),
        reason,
    };

    let mut parts = path.split(PATH_SEPARATOR);
    let (Some(left), Some(right)) = (parts.next(), parts.next()) else {
        return Err(malformed("missing '.' separator"));
    };
    if parts.next().is_some() {
        return Err(malformed("more than one '.' separator"));
    }
    if left.is_empty() {
        return Err(malformed("empty leading segment"));
    }
    if right.is_empty() {
        return Err(malformed("empty trailing segment"));
    }
    Ok((left, right))
}

// =============================================================================
// ENTITY ATTRIBUTE PATH
// =============================================================================

/// Address of a schema attribute: `"entityId.attributeName"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityAttributePath {
    entity_id: String,
    attribute: String,
}

impl EntityAttributePath {
    /// Build a path from its segments. Segments are validated by reparsing.
    pub fn new(entity_id: &str, attribute: &str) -> Result<Self, PortflowError> {
        parse_entity_attribute_path(&create_entity_attribute_key(entity_id, attribute))
    }

    /// The entity segment.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// The attribute segment.
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }
}

impl FromStr for EntityAttributePath {
    type Err = PortflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_entity_attribute_path(s)
    }
}

impl TryFrom<String> for EntityAttributePath {
    type Error = PortflowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_entity_attribute_path(&value)
    }
}

impl From<EntityAttributePath> for String {
    fn from(path: EntityAttributePath) -> Self {
        path.to_string()
    }
}

impl std::fmt::Display for EntityAttributePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.entity_id, PATH_SEPARATOR, self.attribute)
    }
}

// =============================================================================
// WIDGET PORT PATH
// =============================================================================

/// Address of a widget instance port: `"widgetId.portId"`.
///
/// Reserved ports may be addressed (and read), but never as a binding target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WidgetPortPath {
    widget_id: String,
    port_id: String,
}

impl WidgetPortPath {
    /// Build a path from its segments. Segments are validated by reparsing.
    pub fn new(widget_id: &str, port_id: &str) -> Result<Self, PortflowError> {
        parse_widget_port_path(&create_port_key(widget_id, port_id))
    }

    /// The widget instance segment.
    #[must_use]
    pub fn widget_id(&self) -> &str {
        &self.widget_id
    }

    /// The port segment.
    #[must_use]
    pub fn port_id(&self) -> &str {
        &self.port_id
    }

    /// Check if the port segment names a reserved port.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        is_reserved_port(&self.port_id)
    }
}

impl FromStr for WidgetPortPath {
    type Err = PortflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_widget_port_path(s)
    }
}

impl TryFrom<String> for WidgetPortPath {
    type Error = PortflowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_widget_port_path(&value)
    }
}

impl From<WidgetPortPath> for String {
    fn from(path: WidgetPortPath) -> Self {
        path.to_string()
    }
}

impl std::fmt::Display for WidgetPortPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.widget_id, PATH_SEPARATOR, self.port_id)
    }
}

// =============================================================================
// FREE FUNCTIONS
// =============================================================================

/// Parse `"entityId.attributeName"`.
pub fn parse_entity_attribute_path(path: &str) -> Result<EntityAttributePath, PortflowError> {
    let (entity_id, attribute) = split_address(path)?;
    Ok(EntityAttributePath {
        entity_id: entity_id.to_string(),
        attribute: attribute.to_string(),
    })
}

/// Parse `"widgetId.portId"`.
pub fn parse_widget_port_path(path: &str) -> Result<WidgetPortPath, PortflowError> {
    let (widget_id, port_id) = split_address(path)?;
    Ok(WidgetPortPath {
        widget_id: widget_id.to_string(),
        port_id: port_id.to_string(),
    })
}

/// Alias of [`parse_widget_port_path`] for store keys.
pub fn parse_port_key(key: &str) -> Result<WidgetPortPath, PortflowError> {
    parse_widget_port_path(key)
}

/// Format a store key for a widget port.
#[must_use]
pub fn create_port_key(widget_id: &str, port_id: &str) -> String {
    format!("{}{}{}", widget_id, PATH_SEPARATOR, port_id)
}

/// Format a schema attribute key.
#[must_use]
pub fn create_entity_attribute_key(entity_id: &str, attribute: &str) -> String {
    format!("{}{}{}", entity_id, PATH_SEPARATOR, attribute)
}

/// Check membership in `{_error, _completed}`.
#[must_use]
pub fn is_reserved_port(port_id: &str) -> bool {
    RESERVED_PORTS.contains(&port_id)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_entity_path() {
        let path = parse_entity_attribute_path("concern.text").expect("parse");
        assert_eq!(path.entity_id(), "concern");
        assert_eq!(path.attribute(), "text");
        assert_eq!(path.to_string(), "concern.text");
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["", "concern", ".text", "concern.", "a.b.c", "."] {
            let result = parse_widget_port_path(bad);
            assert!(
                matches!(result, Err(PortflowError::MalformedPath { .. })),
                "expected failure for {bad:?}"
            );
        }
    }

    #[test]
    fn create_is_inverse_of_parse() {
        let key = "tradeoff.balance";
        let path = parse_port_key(key).expect("parse");
        assert_eq!(create_port_key(path.widget_id(), path.port_id()), key);
    }

    #[test]
    fn reserved_ports_detected() {
        assert!(is_reserved_port("_error"));
        assert!(is_reserved_port("_completed"));
        assert!(!is_reserved_port("error"));
        let path = WidgetPortPath::new("a", "_completed").expect("path");
        assert!(path.is_reserved());
    }

    #[test]
    fn serde_round_trip_as_string() {
        let path: WidgetPortPath = serde_json::from_str("\"a.out\"").expect("parse");
        assert_eq!(path.widget_id(), "a");
        assert_eq!(serde_json::to_string(&path).expect("serialize"), "\"a.out\"");
        assert!(serde_json::from_str::<WidgetPortPath>("\"aout\"").is_err());
    }

    #[test]
    fn constructor_validates_segments() {
        assert!(EntityAttributePath::new("a", "b").is_ok());
        assert!(EntityAttributePath::new("a.x", "b").is_err());
        assert!(WidgetPortPath::new("", "b").is_err());
    }
}
