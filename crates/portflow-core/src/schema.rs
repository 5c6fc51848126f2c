//! # Schema Model
//!
//! The generated data model for a stage: entities, their attributes, and the
//! data-level dependency graph between attributes. Plain data, no behavior
//! beyond lookups.
//!
//! Paths are kept as raw strings here. The schema arrives from an external
//! generator, and a malformed path is a diagnostic, not a parse failure of
//! the whole document.

use crate::stage::Stage;
use crate::types::{Mechanism, PortflowError, Relationship};
use serde::{Deserialize, Serialize};

/// Role an entity plays in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// The session's central concern. A schema should have one.
    Primary,
    /// Data owned by a stage.
    StageData,
    /// Data owned by a single widget.
    WidgetData,
    /// Data shared across stages.
    SharedData,
}

/// How an attribute is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StructuralType {
    /// Single value.
    #[serde(rename = "SVAL")]
    Sval,
    /// Array of items. Requires `itemType` and `itemValueType`.
    #[serde(rename = "ARRY")]
    Arry,
    /// Pointer to another attribute. Requires a resolvable `target`.
    #[serde(rename = "PNTR")]
    Pntr,
    /// Keyed dictionary.
    #[serde(rename = "DICT")]
    Dict,
}

impl StructuralType {
    /// Get the wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StructuralType::Sval => "SVAL",
            StructuralType::Arry => "ARRY",
            StructuralType::Pntr => "PNTR",
            StructuralType::Dict => "DICT",
        }
    }
}

/// A named, typed field of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// Unique within its entity.
    pub name: String,
    /// Shape of the attribute.
    pub structural_type: StructuralType,
    /// Scalar type, e.g. `string`, `number`.
    pub value_type: String,
    /// Item shape for `ARRY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<StructuralType>,
    /// Item scalar type for `ARRY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_value_type: Option<String>,
    /// `entity.attribute` address for `PNTR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Opaque generation instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_spec: Option<serde_json::Value>,
}

impl Attribute {
    /// Create a single-value attribute.
    #[must_use]
    pub fn sval(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            structural_type: StructuralType::Sval,
            value_type: value_type.into(),
            item_type: None,
            item_value_type: None,
            target: None,
            generation_spec: None,
        }
    }

    /// Create an array attribute.
    #[must_use]
    pub fn arry(name: impl Into<String>, item_type: StructuralType, item_value_type: &str) -> Self {
        Self {
            name: name.into(),
            structural_type: StructuralType::Arry,
            value_type: "array".to_string(),
            item_type: Some(item_type),
            item_value_type: Some(item_value_type.to_string()),
            target: None,
            generation_spec: None,
        }
    }

    /// Create a pointer attribute.
    #[must_use]
    pub fn pntr(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            structural_type: StructuralType::Pntr,
            value_type: "pointer".to_string(),
            item_type: None,
            item_value_type: None,
            target: Some(target.into()),
            generation_spec: None,
        }
    }
}

/// A node of the data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Unique within the schema.
    pub id: String,
    /// Role of the entity.
    pub kind: EntityKind,
    /// Fields, in declaration order.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl Entity {
    /// Create an entity.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: EntityKind, attributes: Vec<Attribute>) -> Self {
        Self {
            id: id.into(),
            kind,
            attributes,
        }
    }

    /// Find an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// A directed edge between two attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDependency {
    /// Unique within the schema.
    pub id: String,
    /// `entity.attribute` address.
    pub source: String,
    /// `entity.attribute` address, or `widget.port` for widget-bound targets.
    pub target: String,
    /// Check or write.
    pub mechanism: Mechanism,
    /// How the target is derived from the source.
    pub relationship: Relationship,
}

/// A generated data schema for one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Version tag; must equal the expected schema version.
    pub version: String,
    /// Stage the schema was generated for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    /// Entities, in declaration order.
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Dependency edges, in declaration order.
    #[serde(default)]
    pub dependencies: Vec<DataDependency>,
}

impl Schema {
    /// Parse a schema from JSON text.
    pub fn from_json(text: &str) -> Result<Self, PortflowError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Find the first entity with the given id.
    #[must_use]
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Resolve an `entity.attribute` pair to its declared attribute.
    #[must_use]
    pub fn resolve(&self, entity_id: &str, attribute: &str) -> Option<&Attribute> {
        self.entity(entity_id)?.attribute(attribute)
    }
}
