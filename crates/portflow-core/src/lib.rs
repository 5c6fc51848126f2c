//! # portflow-core
//!
//! The deterministic validation and propagation engine for Portflow.
//!
//! Portflow checks the artifacts an upstream generator produces for a
//! staged, widget-based UI (a data schema, a per-stage widget selection and
//! a UI specification wiring widget ports together) and then runs the
//! reactive port graph of a validated UI spec for one session.
//!
//! ## Layers
//!
//! - `path`, `schema`, `registry`, `selection`, `ui_spec`: the artifact model
//! - `graph`: dependency graphs and cycle detection
//! - `validate`: pure validators producing a [`ValidationReport`]
//! - `controllers`: per-component widget state and transitions
//! - `runtime`: the sans-IO [`PortRuntime`]
//!
//! ## Architectural Constraints
//!
//! The core:
//! - Has NO async, NO network dependencies (pure Rust)
//! - Uses `BTreeMap` only, so every report and propagation order is stable
//! - Scores complexity in fixed-point thousandths, never floats
//! - Receives the widget registry by reference; there is no global state

// =============================================================================
// MODULES
// =============================================================================

pub mod controllers;
pub mod diagnostic;
pub mod graph;
pub mod path;
pub mod primitives;
pub mod registry;
pub mod runtime;
pub mod schema;
pub mod selection;
pub mod stage;
pub mod types;
pub mod ui_spec;
pub mod validate;
pub mod widget_config;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use stage::Stage;
pub use types::{Mechanism, PortflowError, Relationship, Score};

// =============================================================================
// RE-EXPORTS: Artifact Model
// =============================================================================

pub use path::{
    EntityAttributePath, WidgetPortPath, create_entity_attribute_key, create_port_key,
    is_reserved_port, parse_entity_attribute_path, parse_port_key, parse_widget_port_path,
};
pub use registry::{
    PatternRule, PortConstraint, PortDefinition, PortDirection, WidgetDefinition, WidgetMetadata,
    WidgetPorts, WidgetRegistry,
};
pub use schema::{Attribute, DataDependency, Entity, EntityKind, Schema, StructuralType};
pub use selection::{SelectedWidget, SelectionResult, StageSelection};
pub use ui_spec::{
    BindingDirection, DataBinding, Position, ReactiveBinding, UiSpec, UpdateMode, WidgetSpec,
};
pub use widget_config::{
    BrainstormConfig, PriorityGridConfig, SummaryConfig, TradeoffConfig, UntypedConfig,
    WidgetConfig,
};

// =============================================================================
// RE-EXPORTS: Validation
// =============================================================================

pub use diagnostic::{Diagnostic, DiagnosticCode, ValidationReport};
pub use graph::{Cycle, DependencyGraph};
pub use validate::{
    ValidatedUiSpec, ValidationRules, validate_schema, validate_schema_with, validate_selection,
    validate_ui_spec, validate_ui_spec_with,
};

// =============================================================================
// RE-EXPORTS: Controllers and Runtime
// =============================================================================

pub use controllers::{
    BrainstormState, ControllerError, PriorityGridState, SummaryState, TradeoffState, WidgetState,
};
pub use runtime::{
    DebounceTimer, Interaction, InteractionKind, LlmRequest, Notification, Outcome, PortRuntime,
    PortWrite, ResultMetadata, RetryPolicy, RuntimeConfig, SubscriptionId, TransformRegistry,
    Verdict, WidgetResult,
};
