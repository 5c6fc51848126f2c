//! # Diagnostics
//!
//! Every validator returns a [`ValidationReport`]: a verdict plus ordered
//! errors and warnings. Errors make the whole artifact invalid; warnings are
//! informational and never block.
//!
//! Diagnostics are emitted in input order (declaration order of entities,
//! widgets and bindings, fixed stage order), so validating the same artifact
//! twice yields identical reports.

use serde::{Deserialize, Serialize};

/// Machine-readable diagnostic code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// An address failed to parse.
    MalformedPath,
    /// The artifact version tag is not the expected one.
    VersionMismatch,
    /// A widget id is not in the registry.
    UnknownWidget,
    /// An id appears more than once where it must be unique.
    DuplicateId,
    /// A required input port has no inbound data binding.
    MissingRequiredBinding,
    /// Source and target data types differ without a bridging relationship.
    TypeMismatch,
    /// Update edges form a directed cycle.
    CircularDependency,
    /// A stage's summed complexity exceeds the budget.
    ComplexityBudgetExceeded,
    /// A reserved port is used as a binding target or declared explicitly.
    ReservedPortViolation,
    /// Propagation did not settle within the step budget.
    PropagationTimeout,
    /// A reference names nothing declared.
    UnresolvedReference,
    /// An attribute is missing fields its structural type requires.
    InvalidAttribute,
    /// A stage has too few or too many widgets.
    StageWidgetCount,
    /// A component type repeats within a stage.
    DuplicateComponent,
    /// The summary stage has no closing widget.
    MissingClosingWidget,
    /// No entity of the primary kind exists.
    MissingPrimaryEntity,
    /// Validate edges are denser than the configured threshold.
    DenseValidationGraph,
    /// A realtime binding targets a widget above the complexity threshold.
    RealtimeOnComplexWidget,
    /// A widget config does not match its component's typed shape.
    InvalidConfig,
    /// A component has no typed config shape.
    UntypedConfig,
    /// A data binding direction disagrees with the port direction.
    DirectionMismatch,
    /// A widget was selected for a stage it was not designed for.
    StageMismatch,
    /// A selection names a stage outside the four fixed stages.
    UnknownStage,
    /// A debounce window is missing or set on a non-debounced binding.
    DebounceWindow,
}

impl DiagnosticCode {
    /// Get the wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::MalformedPath => "malformed_path",
            DiagnosticCode::VersionMismatch => "version_mismatch",
            DiagnosticCode::UnknownWidget => "unknown_widget",
            DiagnosticCode::DuplicateId => "duplicate_id",
            DiagnosticCode::MissingRequiredBinding => "missing_required_binding",
            DiagnosticCode::TypeMismatch => "type_mismatch",
            DiagnosticCode::CircularDependency => "circular_dependency",
            DiagnosticCode::ComplexityBudgetExceeded => "complexity_budget_exceeded",
            DiagnosticCode::ReservedPortViolation => "reserved_port_violation",
            DiagnosticCode::PropagationTimeout => "propagation_timeout",
            DiagnosticCode::UnresolvedReference => "unresolved_reference",
            DiagnosticCode::InvalidAttribute => "invalid_attribute",
            DiagnosticCode::StageWidgetCount => "stage_widget_count",
            DiagnosticCode::DuplicateComponent => "duplicate_component",
            DiagnosticCode::MissingClosingWidget => "missing_closing_widget",
            DiagnosticCode::MissingPrimaryEntity => "missing_primary_entity",
            DiagnosticCode::DenseValidationGraph => "dense_validation_graph",
            DiagnosticCode::RealtimeOnComplexWidget => "realtime_on_complex_widget",
            DiagnosticCode::InvalidConfig => "invalid_config",
            DiagnosticCode::UntypedConfig => "untyped_config",
            DiagnosticCode::DirectionMismatch => "direction_mismatch",
            DiagnosticCode::StageMismatch => "stage_mismatch",
            DiagnosticCode::UnknownStage => "unknown_stage",
            DiagnosticCode::DebounceWindow => "debounce_window",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding about an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What kind of finding this is.
    pub code: DiagnosticCode,
    /// Human-readable description.
    pub message: String,
    /// Location inside the artifact, e.g. `stages.converge` or `reactiveBindings[2]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic without a location.
    #[must_use]
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Attach a location.
    #[must_use]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "[{}] {} (at {})", self.code, self.message, path),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

/// Result of validating one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// `true` iff `errors` is empty.
    pub valid: bool,
    /// Blocking findings.
    pub errors: Vec<Diagnostic>,
    /// Informational findings.
    pub warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Check if any error carries the given code.
    #[must_use]
    pub fn has_error(&self, code: DiagnosticCode) -> bool {
        self.errors.iter().any(|d| d.code == code)
    }

    /// Check if any warning carries the given code.
    #[must_use]
    pub fn has_warning(&self, code: DiagnosticCode) -> bool {
        self.warnings.iter().any(|d| d.code == code)
    }

    /// All errors carrying the given code.
    pub fn errors_with(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().filter(move |d| d.code == code)
    }
}

/// Accumulates diagnostics while a validator walks an artifact.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl ReportBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a blocking finding.
    pub fn error(&mut self, diagnostic: Diagnostic) {
        self.errors.push(diagnostic);
    }

    /// Record an informational finding.
    pub fn warning(&mut self, diagnostic: Diagnostic) {
        self.warnings.push(diagnostic);
    }

    /// Number of errors recorded so far.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Seal the report.
    #[must_use]
    pub fn finish(self) -> ValidationReport {
        ValidationReport {
            valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_valid_iff_no_errors() {
        let mut builder = ReportBuilder::new();
        builder.warning(Diagnostic::new(DiagnosticCode::UntypedConfig, "w"));
        let report = builder.finish();
        assert!(report.valid);
        assert!(report.has_warning(DiagnosticCode::UntypedConfig));

        let mut builder = ReportBuilder::new();
        builder.error(Diagnostic::new(DiagnosticCode::DuplicateId, "e").at("entities[1]"));
        let report = builder.finish();
        assert!(!report.valid);
        assert!(report.has_error(DiagnosticCode::DuplicateId));
    }

    #[test]
    fn diagnostic_serializes_snake_case_code() {
        let diag = Diagnostic::new(DiagnosticCode::CircularDependency, "cycle").at("x");
        let json = serde_json::to_string(&diag).expect("serialize");
        assert!(json.contains("\"code\":\"circular_dependency\""));
        assert!(json.contains("\"path\":\"x\""));
    }

    #[test]
    fn code_names_match_serde() {
        for code in [
            DiagnosticCode::ComplexityBudgetExceeded,
            DiagnosticCode::ReservedPortViolation,
            DiagnosticCode::MissingRequiredBinding,
        ] {
            let json = serde_json::to_string(&code).expect("serialize");
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn display_includes_location() {
        let diag = Diagnostic::new(DiagnosticCode::TypeMismatch, "bad").at("b[0]");
        assert_eq!(diag.to_string(), "[type_mismatch] bad (at b[0])");
    }
}
