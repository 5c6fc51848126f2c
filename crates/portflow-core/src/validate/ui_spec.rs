//! UI specification validation and the validated-spec handle.

use super::{ValidationRules, check_version, report_cycles};
use crate::diagnostic::{Diagnostic, DiagnosticCode, ReportBuilder, ValidationReport};
use crate::graph::DependencyGraph;
use crate::path::{WidgetPortPath, parse_entity_attribute_path, parse_widget_port_path};
use crate::primitives::{ERROR_PORT, PATH_SEPARATOR};
use crate::registry::{PortDirection, WidgetDefinition, WidgetRegistry};
use crate::schema::Schema;
use crate::types::Mechanism;
use crate::ui_spec::{BindingDirection, DataBinding, ReactiveBinding, UiSpec, UpdateMode, WidgetSpec};
use crate::widget_config::WidgetConfig;
use std::collections::{BTreeMap, BTreeSet};

/// Validate a UI spec with default rules.
#[must_use]
pub fn validate_ui_spec(
    spec: &UiSpec,
    schema: &Schema,
    registry: &WidgetRegistry,
) -> ValidationReport {
    validate_ui_spec_with(spec, schema, registry, &ValidationRules::default())
}

/// Validate a UI spec against its schema and the registry.
///
/// Widgets are checked first (ids, components, configs, data bindings,
/// required inputs), then reactive bindings in declaration order, then the
/// widget-level update graph, then widget-port targets left over from the
/// schema's dependency list.
#[must_use]
pub fn validate_ui_spec_with(
    spec: &UiSpec,
    schema: &Schema,
    registry: &WidgetRegistry,
    rules: &ValidationRules,
) -> ValidationReport {
    let mut report = ReportBuilder::new();
    check_version(&mut report, "UI spec", &spec.version, &rules.ui_spec_version);

    let instances = check_widgets(spec, schema, registry, &mut report);
    let graph = check_bindings(spec, &instances, rules, &mut report);
    report_cycles(&mut report, &graph, "reactiveBindings");
    check_schema_port_targets(schema, &instances, &mut report);

    report.finish()
}

/// Widget instance ids mapped to their registry definitions.
type Instances<'a> = BTreeMap<&'a str, &'a WidgetDefinition>;

fn check_widgets<'a>(
    spec: &'a UiSpec,
    schema: &Schema,
    registry: &'a WidgetRegistry,
    report: &mut ReportBuilder,
) -> Instances<'a> {
    let mut instances = BTreeMap::new();
    let mut seen = BTreeSet::new();

    for (i, widget) in spec.widgets.iter().enumerate() {
        let location = format!("widgets[{}]", i);

        if !seen.insert(widget.id.as_str()) {
            report.error(
                Diagnostic::new(
                    DiagnosticCode::DuplicateId,
                    format!("Duplicate widget id: {}", widget.id),
                )
                .at(location),
            );
            continue;
        }

        let Some(definition) = registry.get(&widget.component) else {
            report.error(
                Diagnostic::new(
                    DiagnosticCode::UnknownWidget,
                    format!(
                        "Widget {} uses unknown component {}",
                        widget.id, widget.component
                    ),
                )
                .at(format!("{}.component", location)),
            );
            continue;
        };
        instances.insert(widget.id.as_str(), definition);

        match WidgetConfig::parse(&widget.component, &widget.config) {
            Ok(config) if config.is_untyped() => report.warning(
                Diagnostic::new(
                    DiagnosticCode::UntypedConfig,
                    format!(
                        "Component {} has no typed config; widget {} keeps raw config",
                        widget.component, widget.id
                    ),
                )
                .at(format!("{}.config", location)),
            ),
            Ok(_) => {}
            Err(e) => report.error(
                Diagnostic::new(
                    DiagnosticCode::InvalidConfig,
                    format!("Widget {}: {}", widget.id, e),
                )
                .at(format!("{}.config", location)),
            ),
        }

        for (j, binding) in widget.data_bindings.iter().enumerate() {
            let at = format!("{}.dataBindings[{}]", location, j);
            if let Some(diagnostic) = check_data_binding(widget, definition, binding, schema) {
                report.error(diagnostic.at(at));
            }
        }

        for port in definition.required_inputs() {
            let bound = widget
                .data_bindings
                .iter()
                .any(|b| b.port_id == port && b.direction.feeds_port());
            if !bound {
                report.error(
                    Diagnostic::new(
                        DiagnosticCode::MissingRequiredBinding,
                        format!(
                            "Widget {} has no inbound binding for required port {}",
                            widget.id, port
                        ),
                    )
                    .at(location.clone()),
                );
            }
        }
    }

    instances
}

fn check_data_binding(
    widget: &WidgetSpec,
    definition: &WidgetDefinition,
    binding: &DataBinding,
    schema: &Schema,
) -> Option<Diagnostic> {
    let path = match parse_entity_attribute_path(&binding.entity_attribute_path) {
        Ok(path) => path,
        Err(e) => {
            return Some(Diagnostic::new(
                DiagnosticCode::MalformedPath,
                format!("Widget {} data binding: {}", widget.id, e),
            ));
        }
    };
    if schema.resolve(path.entity_id(), path.attribute()).is_none() {
        return Some(Diagnostic::new(
            DiagnosticCode::UnresolvedReference,
            format!(
                "Widget {} binds {} which is not a declared attribute",
                widget.id, path
            ),
        ));
    }
    let Some(port) = definition.port(&binding.port_id) else {
        return Some(Diagnostic::new(
            DiagnosticCode::UnresolvedReference,
            format!(
                "Widget {} binds undeclared port {}",
                widget.id, binding.port_id
            ),
        ));
    };
    let agrees = match binding.direction {
        BindingDirection::In => port.direction == PortDirection::In,
        BindingDirection::Out => port.direction == PortDirection::Out,
        BindingDirection::Inout => true,
    };
    if !agrees {
        return Some(Diagnostic::new(
            DiagnosticCode::DirectionMismatch,
            format!(
                "Widget {} binds {:?} port {} with direction {:?}",
                widget.id, port.direction, port.id, binding.direction
            ),
        ));
    }
    None
}

/// Resolve a reactive binding endpoint to its parsed path and data type.
fn resolve_endpoint<'a>(
    address: &str,
    role: &str,
    binding: &ReactiveBinding,
    instances: &Instances<'a>,
) -> Result<(WidgetPortPath, &'a WidgetDefinition, &'a str), Diagnostic> {
    let path = parse_widget_port_path(address).map_err(|e| {
        Diagnostic::new(
            DiagnosticCode::MalformedPath,
            format!("Binding {} {}: {}", binding.id, role, e),
        )
    })?;
    let Some(definition) = instances.get(path.widget_id()).copied() else {
        return Err(Diagnostic::new(
            DiagnosticCode::UnknownWidget,
            format!(
                "Binding {} {} names widget {} which is not in this spec",
                binding.id,
                role,
                path.widget_id()
            ),
        ));
    };
    let Some(data_type) = definition.port_data_type(path.port_id()) else {
        return Err(Diagnostic::new(
            DiagnosticCode::UnresolvedReference,
            format!(
                "Binding {} {} names undeclared port {}",
                binding.id, role, path
            ),
        ));
    };
    Ok((path, definition, data_type))
}

fn check_bindings(
    spec: &UiSpec,
    instances: &Instances<'_>,
    rules: &ValidationRules,
    report: &mut ReportBuilder,
) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    let mut ids = BTreeSet::new();
    let error_readers = error_readers(spec);

    for (i, binding) in spec.reactive_bindings.iter().enumerate() {
        let location = format!("reactiveBindings[{}]", i);

        if !ids.insert(binding.id.as_str()) {
            report.error(
                Diagnostic::new(
                    DiagnosticCode::DuplicateId,
                    format!("Duplicate binding id: {}", binding.id),
                )
                .at(location.clone()),
            );
        }

        check_debounce_window(binding, &location, report);

        let source = resolve_endpoint(&binding.source, "source", binding, instances);
        let target = resolve_endpoint(&binding.target, "target", binding, instances);
        let ((source, _, source_type), (target, target_def, target_type)) = match (source, target)
        {
            (Ok(s), Ok(t)) => (s, t),
            (s, t) => {
                for diagnostic in [s.err(), t.err()].into_iter().flatten() {
                    report.error(diagnostic.at(location.clone()));
                }
                continue;
            }
        };

        if target.is_reserved() {
            report.error(
                Diagnostic::new(
                    DiagnosticCode::ReservedPortViolation,
                    format!(
                        "Binding {} targets reserved port {}",
                        binding.id, target
                    ),
                )
                .at(location),
            );
            continue;
        }

        if target_def
            .port(target.port_id())
            .is_some_and(|p| p.direction == PortDirection::Out)
        {
            report.warning(
                Diagnostic::new(
                    DiagnosticCode::DirectionMismatch,
                    format!("Binding {} writes output port {}", binding.id, target),
                )
                .at(location.clone()),
            );
        }

        if binding.mechanism == Mechanism::Update
            && source_type != target_type
            && !binding.relationship.bridges_types()
        {
            report.error(
                Diagnostic::new(
                    DiagnosticCode::TypeMismatch,
                    format!(
                        "Binding {} connects {} ({}) to {} ({}) through {} without conversion",
                        binding.id,
                        source,
                        source_type,
                        target,
                        target_type,
                        binding.relationship.kind()
                    ),
                )
                .at(location.clone()),
            );
        }

        if binding.update_mode == UpdateMode::Realtime
            && target_def.metadata.complexity > rules.realtime_complexity_threshold
        {
            report.warning(
                Diagnostic::new(
                    DiagnosticCode::RealtimeOnComplexWidget,
                    format!(
                        "Binding {} updates {} (complexity {}) in realtime; use debounced or on_confirm",
                        binding.id,
                        target.widget_id(),
                        target_def.metadata.complexity
                    ),
                )
                .at(location.clone()),
            );
        }

        // A validate verdict lands on the target's _error, which feeds
        // any update binding reading it.
        let feeds_update = binding.mechanism == Mechanism::Validate
            && error_readers.contains(target.widget_id());
        if binding.mechanism == Mechanism::Update || feeds_update {
            graph.add_edge(source.widget_id(), target.widget_id());
        }
    }

    graph
}

/// Widgets whose `_error` port is the source of an update binding.
fn error_readers(spec: &UiSpec) -> BTreeSet<&str> {
    spec.reactive_bindings
        .iter()
        .filter(|b| b.mechanism == Mechanism::Update)
        .filter_map(|b| {
            let (widget, port) = b.source.split_once(PATH_SEPARATOR)?;
            (port == ERROR_PORT).then_some(widget)
        })
        .collect()
}

fn check_debounce_window(binding: &ReactiveBinding, location: &str, report: &mut ReportBuilder) {
    let message = match (binding.update_mode, binding.debounce_ms) {
        (UpdateMode::Debounced, None) => format!(
            "Binding {} is debounced without debounceMs; using {}ms",
            binding.id,
            binding.effective_debounce_ms()
        ),
        (UpdateMode::Debounced, Some(0)) => {
            format!("Binding {} is debounced with a zero window", binding.id)
        }
        (UpdateMode::Realtime | UpdateMode::OnConfirm, Some(_)) => format!(
            "Binding {} sets debounceMs but is not debounced",
            binding.id
        ),
        _ => return,
    };
    report.warning(Diagnostic::new(DiagnosticCode::DebounceWindow, message).at(location));
}

/// Cross-check schema dependencies that target widget ports.
fn check_schema_port_targets(schema: &Schema, instances: &Instances<'_>, report: &mut ReportBuilder) {
    for (i, dependency) in schema.dependencies.iter().enumerate() {
        let Ok(path) = parse_widget_port_path(&dependency.target) else {
            continue;
        };
        if schema.entity(path.widget_id()).is_some() {
            continue;
        }
        let message = match instances.get(path.widget_id()) {
            None => format!(
                "Schema dependency {} targets widget {} which is not in this spec",
                dependency.id,
                path.widget_id()
            ),
            Some(definition) if definition.port(path.port_id()).is_none() => format!(
                "Schema dependency {} targets undeclared port {}",
                dependency.id, path
            ),
            Some(_) => continue,
        };
        report.warning(
            Diagnostic::new(DiagnosticCode::UnresolvedReference, message)
                .at(format!("schema.dependencies[{}]", i)),
        );
    }
}

// =============================================================================
// VALIDATED SPEC
// =============================================================================

/// A UI spec that passed validation, with its typed configs and the
/// definitions of every component it uses.
///
/// The only way to obtain one is [`ValidatedUiSpec::new`], so holding one
/// proves the spec was valid against its schema and registry.
#[derive(Debug, Clone)]
pub struct ValidatedUiSpec {
    spec: UiSpec,
    definitions: BTreeMap<String, WidgetDefinition>,
    configs: BTreeMap<String, WidgetConfig>,
    warnings: Vec<Diagnostic>,
}

impl ValidatedUiSpec {
    /// Validate a spec and keep it if valid; otherwise return the report.
    pub fn new(
        spec: UiSpec,
        schema: &Schema,
        registry: &WidgetRegistry,
        rules: &ValidationRules,
    ) -> Result<Self, ValidationReport> {
        let report = validate_ui_spec_with(&spec, schema, registry, rules);
        if !report.valid {
            return Err(report);
        }

        let mut definitions = BTreeMap::new();
        let mut configs = BTreeMap::new();
        for widget in &spec.widgets {
            if let Some(definition) = registry.get(&widget.component) {
                definitions
                    .entry(widget.component.clone())
                    .or_insert_with(|| definition.clone());
            }
            if let Ok(config) = WidgetConfig::parse(&widget.component, &widget.config) {
                configs.insert(widget.id.clone(), config);
            }
        }

        Ok(Self {
            spec,
            definitions,
            configs,
            warnings: report.warnings,
        })
    }

    /// The validated spec.
    #[must_use]
    pub fn spec(&self) -> &UiSpec {
        &self.spec
    }

    /// Find a widget instance.
    #[must_use]
    pub fn widget(&self, widget_id: &str) -> Option<&WidgetSpec> {
        self.spec.widget(widget_id)
    }

    /// Registry definition of a widget instance's component.
    #[must_use]
    pub fn definition_of(&self, widget_id: &str) -> Option<&WidgetDefinition> {
        let widget = self.spec.widget(widget_id)?;
        self.definitions.get(&widget.component)
    }

    /// Typed config of a widget instance.
    #[must_use]
    pub fn config(&self, widget_id: &str) -> Option<&WidgetConfig> {
        self.configs.get(widget_id)
    }

    /// Warnings raised while validating.
    #[must_use]
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PortDefinition;
    use crate::schema::{Attribute, DataDependency, Entity, EntityKind, StructuralType};
    use crate::stage::Stage;
    use crate::types::{Relationship, Score};
    use serde_json::json;

    fn registry() -> WidgetRegistry {
        WidgetRegistry::new(vec![
            WidgetDefinition::new("relay", Stage::Converge)
                .with_port(PortDefinition::input("in", "number"))
                .with_port(PortDefinition::output("out", "number"))
                .with_complexity(Score::from_millis(200)),
            WidgetDefinition::new("labeler", Stage::Converge)
                .with_port(PortDefinition::input("text", "string"))
                .with_port(PortDefinition::output("label", "string"))
                .with_complexity(Score::from_millis(900)),
            WidgetDefinition::new("brainstorm", Stage::Diverge)
                .with_port(PortDefinition::input("input_items", "array<string>").required())
                .with_port(PortDefinition::output("items", "array<string>")),
        ])
        .expect("registry")
    }

    fn schema() -> Schema {
        Schema {
            version: "1.0".to_string(),
            stage: Some(Stage::Converge),
            entities: vec![Entity::new(
                "diverge_data",
                EntityKind::Primary,
                vec![
                    Attribute::arry("items", StructuralType::Sval, "string"),
                    Attribute::sval("score", "number"),
                ],
            )],
            dependencies: Vec::new(),
        }
    }

    fn two_relays() -> UiSpec {
        UiSpec::new("1.0")
            .with_widget(WidgetSpec::new("A", "relay"))
            .with_widget(WidgetSpec::new("B", "relay"))
    }

    #[test]
    fn simple_chain_is_valid() {
        let spec = two_relays().with_binding(ReactiveBinding::new("b1", "A.out", "B.in"));
        let report = validate_ui_spec(&spec, &schema(), &registry());
        assert!(report.valid, "{:?}", report.errors);
    }

    #[test]
    fn two_widget_cycle_names_both() {
        let spec = two_relays()
            .with_binding(ReactiveBinding::new("b1", "A.out", "B.in"))
            .with_binding(ReactiveBinding::new("b2", "B.out", "A.in"));
        let report = validate_ui_spec(&spec, &schema(), &registry());
        assert!(!report.valid);
        let cycle = report
            .errors_with(DiagnosticCode::CircularDependency)
            .next()
            .expect("cycle");
        assert!(cycle.message.contains("A -> B -> A"));
    }

    #[test]
    fn validate_cycle_is_allowed() {
        let spec = two_relays()
            .with_binding(ReactiveBinding::new("b1", "A.out", "B.in").with_mechanism(Mechanism::Validate))
            .with_binding(ReactiveBinding::new("b2", "B.out", "A.in").with_mechanism(Mechanism::Validate));
        assert!(validate_ui_spec(&spec, &schema(), &registry()).valid);
    }

    #[test]
    fn reserved_target_is_violation() {
        let spec = two_relays().with_binding(ReactiveBinding::new("b1", "A.out", "B._error"));
        let report = validate_ui_spec(&spec, &schema(), &registry());
        assert!(report.has_error(DiagnosticCode::ReservedPortViolation));
    }

    #[test]
    fn unknown_component_is_error() {
        let spec = UiSpec::new("1.0")
            .with_widget(WidgetSpec::new("A", "relay"))
            .with_widget(WidgetSpec::new("S", "summary_like"));
        let report = validate_ui_spec(&spec, &schema(), &registry());
        assert!(report.has_error(DiagnosticCode::UnknownWidget));
    }

    #[test]
    fn reserved_source_is_readable() {
        let spec = two_relays().with_binding(
            ReactiveBinding::new("b1", "A._completed", "B.in").with_relationship(Relationship::Transform {
                body: "Number(source)".to_string(),
            }),
        );
        assert!(validate_ui_spec(&spec, &schema(), &registry()).valid);
    }

    #[test]
    fn validate_verdict_read_back_by_update_is_cycle() {
        let spec = two_relays()
            .with_binding(ReactiveBinding::new("v1", "A.out", "B.in").with_mechanism(Mechanism::Validate))
            .with_binding(
                ReactiveBinding::new("u1", "B._error", "A.in").with_relationship(Relationship::Transform {
                    body: "source.hasError".to_string(),
                }),
            );
        let report = validate_ui_spec(&spec, &schema(), &registry());
        assert!(!report.valid);
        let cycle = report
            .errors_with(DiagnosticCode::CircularDependency)
            .next()
            .expect("cycle");
        assert!(cycle.message.contains('A') && cycle.message.contains('B'));
    }

    #[test]
    fn validate_verdict_without_reader_is_not_cycle() {
        let spec = two_relays()
            .with_binding(ReactiveBinding::new("v1", "A.out", "B.in").with_mechanism(Mechanism::Validate))
            .with_binding(
                ReactiveBinding::new("u1", "B._completed", "A.in").with_relationship(Relationship::Transform {
                    body: "source.isCompleted".to_string(),
                }),
            );
        let report = validate_ui_spec(&spec, &schema(), &registry());
        assert!(report.valid, "{:?}", report.errors);
    }

    #[test]
    fn type_mismatch_unless_bridged() {
        let spec = UiSpec::new("1.0")
            .with_widget(WidgetSpec::new("A", "relay"))
            .with_widget(WidgetSpec::new("L", "labeler"))
            .with_binding(ReactiveBinding::new("b1", "A.out", "L.text").debounced(200));
        let report = validate_ui_spec(&spec, &schema(), &registry());
        assert!(report.has_error(DiagnosticCode::TypeMismatch));

        let mut bridged = spec.clone();
        bridged.reactive_bindings[0].relationship = Relationship::Javascript {
            body: "String(source)".to_string(),
        };
        let report = validate_ui_spec(&bridged, &schema(), &registry());
        assert!(report.valid, "{:?}", report.errors);
    }

    #[test]
    fn realtime_into_complex_widget_warns() {
        let spec = UiSpec::new("1.0")
            .with_widget(WidgetSpec::new("L1", "labeler"))
            .with_widget(WidgetSpec::new("L2", "labeler"))
            .with_binding(ReactiveBinding::new("b1", "L1.label", "L2.text"));
        let report = validate_ui_spec(&spec, &schema(), &registry());
        assert!(report.valid);
        assert!(report.has_warning(DiagnosticCode::RealtimeOnComplexWidget));
    }

    #[test]
    fn missing_required_binding_names_port() {
        let spec = UiSpec::new("1.0").with_widget(WidgetSpec::new("bw", "brainstorm"));
        let report = validate_ui_spec(&spec, &schema(), &registry());
        let diag = report
            .errors_with(DiagnosticCode::MissingRequiredBinding)
            .next()
            .expect("missing binding");
        assert!(diag.message.contains("input_items"));

        let spec = UiSpec::new("1.0").with_widget(WidgetSpec::new("bw", "brainstorm").bind(
            "input_items",
            "diverge_data.items",
            BindingDirection::In,
        ));
        let report = validate_ui_spec(&spec, &schema(), &registry());
        assert!(report.valid, "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn data_binding_must_resolve_and_agree() {
        let spec = UiSpec::new("1.0").with_widget(
            WidgetSpec::new("bw", "brainstorm")
                .bind("input_items", "diverge_data.items", BindingDirection::In)
                .bind("items", "diverge_data.missing", BindingDirection::Out)
                .bind("items", "diverge_data.items", BindingDirection::In),
        );
        let report = validate_ui_spec(&spec, &schema(), &registry());
        assert!(report.has_error(DiagnosticCode::UnresolvedReference));
        assert!(report.has_error(DiagnosticCode::DirectionMismatch));
    }

    #[test]
    fn duplicate_widget_ids_rejected() {
        let spec = two_relays().with_widget(WidgetSpec::new("A", "relay"));
        let report = validate_ui_spec(&spec, &schema(), &registry());
        assert!(report.has_error(DiagnosticCode::DuplicateId));
    }

    #[test]
    fn invalid_config_is_error() {
        let spec = UiSpec::new("1.0").with_widget(
            WidgetSpec::new("bw", "brainstorm")
                .bind("input_items", "diverge_data.items", BindingDirection::In)
                .with_config(json!({"minItems": 9, "maxItems": 1})),
        );
        let report = validate_ui_spec(&spec, &schema(), &registry());
        assert!(report.has_error(DiagnosticCode::InvalidConfig));
    }

    #[test]
    fn debounce_window_warnings() {
        let mut binding = ReactiveBinding::new("b1", "A.out", "B.in");
        binding.update_mode = UpdateMode::Debounced;
        let spec = two_relays().with_binding(binding);
        let report = validate_ui_spec(&spec, &schema(), &registry());
        assert!(report.valid);
        assert!(report.has_warning(DiagnosticCode::DebounceWindow));
    }

    #[test]
    fn schema_port_targets_cross_checked() {
        let mut schema = schema();
        schema.dependencies.push(DataDependency {
            id: "d1".to_string(),
            source: "diverge_data.score".to_string(),
            target: "A.nope".to_string(),
            mechanism: Mechanism::Update,
            relationship: Relationship::Passthrough,
        });
        let report = validate_ui_spec(&two_relays(), &schema, &registry());
        assert!(report.valid);
        let warning = report
            .warnings
            .iter()
            .find(|d| d.code == DiagnosticCode::UnresolvedReference)
            .expect("warning");
        assert_eq!(warning.path.as_deref(), Some("schema.dependencies[0]"));
    }

    #[test]
    fn validated_spec_carries_definitions() {
        let spec = two_relays().with_binding(ReactiveBinding::new("b1", "A.out", "B.in"));
        let validated =
            ValidatedUiSpec::new(spec, &schema(), &registry(), &ValidationRules::default())
                .expect("valid");
        assert_eq!(validated.definition_of("A").map(|d| d.id.as_str()), Some("relay"));
        assert!(validated.config("A").is_some_and(WidgetConfig::is_untyped));

        let cyclic = two_relays()
            .with_binding(ReactiveBinding::new("b1", "A.out", "B.in"))
            .with_binding(ReactiveBinding::new("b2", "B.out", "A.in"));
        let report = ValidatedUiSpec::new(cyclic, &schema(), &registry(), &ValidationRules::default())
            .expect_err("cyclic");
        assert!(report.has_error(DiagnosticCode::CircularDependency));
    }
}
