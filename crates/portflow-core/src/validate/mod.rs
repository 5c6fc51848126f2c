//! # Validators
//!
//! Pure, side-effect-free checks over the three generated artifacts:
//!
//! - [`validate_schema`]: data model and dependency graph
//! - [`validate_selection`]: per-stage widget picks against the registry
//! - [`validate_ui_spec`]: widget instances, data bindings, reactive bindings
//!
//! Validators never fail. Every finding becomes a [`Diagnostic`]; any error
//! marks the whole artifact invalid and the caller must regenerate or fall
//! back. Tunables live in [`ValidationRules`].

mod rules;
mod schema;
mod selection;
mod ui_spec;

pub use rules::ValidationRules;
pub use schema::{validate_schema, validate_schema_with};
pub use selection::validate_selection;
pub use ui_spec::{ValidatedUiSpec, validate_ui_spec, validate_ui_spec_with};

use crate::diagnostic::{Diagnostic, DiagnosticCode, ReportBuilder};
use crate::graph::DependencyGraph;

/// Report a version tag that differs from the expected one.
fn check_version(report: &mut ReportBuilder, artifact: &str, found: &str, expected: &str) {
    if found != expected {
        report.error(
            Diagnostic::new(
                DiagnosticCode::VersionMismatch,
                format!(
                    "{} version '{}' does not match expected '{}'",
                    artifact, found, expected
                ),
            )
            .at("version"),
        );
    }
}

/// Report every update cycle in a graph as a circular dependency error.
fn report_cycles(report: &mut ReportBuilder, graph: &DependencyGraph, location: &str) {
    for cycle in graph.find_cycles() {
        let mut message = format!("Circular update dependency: {}", cycle.describe());
        // The path repeats its first node at the end.
        if cycle.members.len() > cycle.path.len().saturating_sub(1) {
            message.push_str(&format!(
                " (strongly connected: {})",
                cycle.members.join(", ")
            ));
        }
        report.error(Diagnostic::new(DiagnosticCode::CircularDependency, message).at(location));
    }
}
