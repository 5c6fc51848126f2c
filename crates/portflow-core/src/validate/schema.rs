//! Dependency graph validation for generated schemas.

use super::{ValidationRules, check_version, report_cycles};
use crate::diagnostic::{Diagnostic, DiagnosticCode, ReportBuilder, ValidationReport};
use crate::graph::DependencyGraph;
use crate::path::parse_entity_attribute_path;
use crate::schema::{Attribute, EntityKind, Schema, StructuralType};
use crate::types::Mechanism;
use std::collections::BTreeSet;

/// Validate a schema with default rules.
#[must_use]
pub fn validate_schema(schema: &Schema) -> ValidationReport {
    validate_schema_with(schema, &ValidationRules::default())
}

/// Validate a schema.
///
/// Checks, in order: version, entity and attribute id uniqueness, presence
/// of a primary entity, structural attribute requirements, dependency
/// endpoints, update cycles, and validate-edge density.
#[must_use]
pub fn validate_schema_with(schema: &Schema, rules: &ValidationRules) -> ValidationReport {
    let mut report = ReportBuilder::new();
    check_version(&mut report, "Schema", &schema.version, &rules.schema_version);

    check_entities(schema, &mut report);
    check_attributes(schema, &mut report);

    let (update_graph, validate_graph) = check_dependencies(schema, &mut report);
    report_cycles(&mut report, &update_graph, "dependencies");

    let density = validate_graph.density_millionths();
    let threshold = u64::from(rules.validate_density_threshold.millis()).saturating_mul(1000);
    if density > threshold {
        report.warning(
            Diagnostic::new(
                DiagnosticCode::DenseValidationGraph,
                format!(
                    "Validate dependencies are dense: {} edges over {} attributes exceeds {} per attribute",
                    validate_graph.edge_count(),
                    validate_graph.node_count(),
                    rules.validate_density_threshold
                ),
            )
            .at("dependencies"),
        );
    }

    report.finish()
}

fn check_entities(schema: &Schema, report: &mut ReportBuilder) {
    let mut seen = BTreeSet::new();
    for (i, entity) in schema.entities.iter().enumerate() {
        if !seen.insert(entity.id.as_str()) {
            report.error(
                Diagnostic::new(
                    DiagnosticCode::DuplicateId,
                    format!("Duplicate entity id: {}", entity.id),
                )
                .at(format!("entities[{}]", i)),
            );
        }

        let mut names = BTreeSet::new();
        for (j, attribute) in entity.attributes.iter().enumerate() {
            if !names.insert(attribute.name.as_str()) {
                report.error(
                    Diagnostic::new(
                        DiagnosticCode::DuplicateId,
                        format!("Duplicate attribute name: {}.{}", entity.id, attribute.name),
                    )
                    .at(format!("entities[{}].attributes[{}]", i, j)),
                );
            }
        }
    }

    if !schema
        .entities
        .iter()
        .any(|e| e.kind == EntityKind::Primary)
    {
        report.warning(
            Diagnostic::new(
                DiagnosticCode::MissingPrimaryEntity,
                "Schema has no primary entity",
            )
            .at("entities"),
        );
    }
}

fn check_attributes(schema: &Schema, report: &mut ReportBuilder) {
    for (i, entity) in schema.entities.iter().enumerate() {
        for (j, attribute) in entity.attributes.iter().enumerate() {
            let location = format!("entities[{}].attributes[{}]", i, j);
            if let Some(diagnostic) = check_attribute(schema, &entity.id, attribute) {
                report.error(diagnostic.at(location));
            }
        }
    }
}

fn check_attribute(schema: &Schema, entity_id: &str, attribute: &Attribute) -> Option<Diagnostic> {
    let name = format!("{}.{}", entity_id, attribute.name);
    match attribute.structural_type {
        StructuralType::Arry => {
            if attribute.item_type.is_none() || attribute.item_value_type.is_none() {
                return Some(Diagnostic::new(
                    DiagnosticCode::InvalidAttribute,
                    format!("ARRY attribute {} requires itemType and itemValueType", name),
                ));
            }
            None
        }
        StructuralType::Pntr => {
            let Some(target) = &attribute.target else {
                return Some(Diagnostic::new(
                    DiagnosticCode::InvalidAttribute,
                    format!("PNTR attribute {} has no target", name),
                ));
            };
            match parse_entity_attribute_path(target) {
                Err(e) => Some(Diagnostic::new(
                    DiagnosticCode::MalformedPath,
                    format!("PNTR attribute {}: {}", name, e),
                )),
                Ok(path) if schema.resolve(path.entity_id(), path.attribute()).is_none() => {
                    Some(Diagnostic::new(
                        DiagnosticCode::UnresolvedReference,
                        format!("PNTR attribute {} targets undeclared attribute {}", name, path),
                    ))
                }
                Ok(_) => None,
            }
        }
        StructuralType::Sval | StructuralType::Dict => None,
    }
}

/// Check every dependency and build the update and validate graphs.
fn check_dependencies(
    schema: &Schema,
    report: &mut ReportBuilder,
) -> (DependencyGraph, DependencyGraph) {
    let mut update_graph = DependencyGraph::new();
    let mut validate_graph = DependencyGraph::new();
    let mut ids = BTreeSet::new();

    for (i, dependency) in schema.dependencies.iter().enumerate() {
        let location = format!("dependencies[{}]", i);

        if !ids.insert(dependency.id.as_str()) {
            report.error(
                Diagnostic::new(
                    DiagnosticCode::DuplicateId,
                    format!("Duplicate dependency id: {}", dependency.id),
                )
                .at(location.clone()),
            );
        }

        let source = match parse_entity_attribute_path(&dependency.source) {
            Ok(path) => path,
            Err(e) => {
                report.error(
                    Diagnostic::new(
                        DiagnosticCode::MalformedPath,
                        format!("Dependency {} source: {}", dependency.id, e),
                    )
                    .at(location),
                );
                continue;
            }
        };
        let target = match parse_entity_attribute_path(&dependency.target) {
            Ok(path) => path,
            Err(e) => {
                report.error(
                    Diagnostic::new(
                        DiagnosticCode::MalformedPath,
                        format!("Dependency {} target: {}", dependency.id, e),
                    )
                    .at(location),
                );
                continue;
            }
        };

        let mut resolved = true;
        if schema
            .resolve(source.entity_id(), source.attribute())
            .is_none()
        {
            resolved = false;
            report.error(
                Diagnostic::new(
                    DiagnosticCode::UnresolvedReference,
                    format!(
                        "Dependency {} source {} does not resolve to a declared attribute",
                        dependency.id, source
                    ),
                )
                .at(location.clone()),
            );
        }

        if schema.entity(target.entity_id()).is_some() {
            if schema
                .resolve(target.entity_id(), target.attribute())
                .is_none()
            {
                resolved = false;
                report.error(
                    Diagnostic::new(
                        DiagnosticCode::UnresolvedReference,
                        format!(
                            "Dependency {} target {} does not resolve to a declared attribute",
                            dependency.id, target
                        ),
                    )
                    .at(location.clone()),
                );
            }
        } else {
            report.warning(
                Diagnostic::new(
                    DiagnosticCode::UnresolvedReference,
                    format!(
                        "Dependency {} target {} names no entity; treated as a widget port",
                        dependency.id, target
                    ),
                )
                .at(location.clone()),
            );
        }

        if !resolved {
            continue;
        }

        let (from, to) = (source.to_string(), target.to_string());
        match dependency.mechanism {
            Mechanism::Update => update_graph.add_edge(&from, &to),
            Mechanism::Validate => validate_graph.add_edge(&from, &to),
        }
    }

    (update_graph, validate_graph)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DataDependency, Entity};
    use crate::types::Relationship;

    fn dependency(id: &str, source: &str, target: &str, mechanism: Mechanism) -> DataDependency {
        DataDependency {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            mechanism,
            relationship: Relationship::Javascript {
                body: "source".to_string(),
            },
        }
    }

    fn base_schema() -> Schema {
        Schema {
            version: "1.0".to_string(),
            stage: None,
            entities: vec![
                Entity::new(
                    "concern",
                    EntityKind::Primary,
                    vec![Attribute::sval("text", "string")],
                ),
                Entity::new(
                    "options",
                    EntityKind::StageData,
                    vec![
                        Attribute::sval("a", "string"),
                        Attribute::sval("b", "string"),
                        Attribute::sval("c", "string"),
                    ],
                ),
            ],
            dependencies: Vec::new(),
        }
    }

    #[test]
    fn minimal_schema_is_valid() {
        let report = validate_schema(&base_schema());
        assert!(report.valid, "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn version_mismatch_is_error() {
        let mut schema = base_schema();
        schema.version = "0.9".to_string();
        let report = validate_schema(&schema);
        assert!(report.has_error(DiagnosticCode::VersionMismatch));
    }

    #[test]
    fn duplicate_entity_message() {
        let mut schema = base_schema();
        schema.entities.push(Entity::new("concern", EntityKind::SharedData, vec![]));
        let report = validate_schema(&schema);
        let dup = report
            .errors_with(DiagnosticCode::DuplicateId)
            .next()
            .expect("duplicate error");
        assert_eq!(dup.message, "Duplicate entity id: concern");
        assert_eq!(dup.path.as_deref(), Some("entities[2]"));
    }

    #[test]
    fn missing_primary_is_warning_only() {
        let mut schema = base_schema();
        schema.entities[0].kind = EntityKind::SharedData;
        let report = validate_schema(&schema);
        assert!(report.valid);
        assert!(report.has_warning(DiagnosticCode::MissingPrimaryEntity));
    }

    #[test]
    fn array_without_item_types_is_error() {
        let mut schema = base_schema();
        let mut items = Attribute::arry("items", StructuralType::Sval, "string");
        items.item_value_type = None;
        schema.entities[1].attributes.push(items);
        let report = validate_schema(&schema);
        assert!(report.has_error(DiagnosticCode::InvalidAttribute));
    }

    #[test]
    fn pointer_targets_must_resolve() {
        let mut schema = base_schema();
        schema.entities[1]
            .attributes
            .push(Attribute::pntr("ref", "concern.text"));
        assert!(validate_schema(&schema).valid);

        schema.entities[1]
            .attributes
            .push(Attribute::pntr("bad", "concern.missing"));
        schema.entities[1]
            .attributes
            .push(Attribute::pntr("worse", "concern"));
        let report = validate_schema(&schema);
        assert!(report.has_error(DiagnosticCode::UnresolvedReference));
        assert!(report.has_error(DiagnosticCode::MalformedPath));
    }

    #[test]
    fn unresolved_source_is_error() {
        let mut schema = base_schema();
        schema.dependencies.push(dependency(
            "d1",
            "concern.nothing",
            "options.a",
            Mechanism::Update,
        ));
        let report = validate_schema(&schema);
        assert!(report.has_error(DiagnosticCode::UnresolvedReference));
    }

    #[test]
    fn widget_port_target_is_warning() {
        let mut schema = base_schema();
        schema.dependencies.push(dependency(
            "d1",
            "concern.text",
            "brainstorm_widget.input_items",
            Mechanism::Update,
        ));
        let report = validate_schema(&schema);
        assert!(report.valid);
        assert!(report.has_warning(DiagnosticCode::UnresolvedReference));
    }

    #[test]
    fn update_cycle_is_error_naming_nodes() {
        let mut schema = base_schema();
        schema.dependencies = vec![
            dependency("d1", "options.a", "options.b", Mechanism::Update),
            dependency("d2", "options.b", "options.c", Mechanism::Update),
            dependency("d3", "options.c", "options.a", Mechanism::Update),
        ];
        let report = validate_schema(&schema);
        let cycle = report
            .errors_with(DiagnosticCode::CircularDependency)
            .next()
            .expect("cycle error");
        assert!(cycle.message.contains("options.a -> options.b -> options.c -> options.a"));
    }

    #[test]
    fn validate_cycle_is_allowed() {
        let mut schema = base_schema();
        schema.dependencies = vec![
            dependency("d1", "options.a", "options.b", Mechanism::Validate),
            dependency("d2", "options.b", "options.a", Mechanism::Validate),
        ];
        let report = validate_schema(&schema);
        assert!(report.valid);
        assert!(!report.has_warning(DiagnosticCode::DenseValidationGraph));
    }

    #[test]
    fn dense_validate_graph_warns() {
        let mut schema = base_schema();
        let pairs = [("a", "b"), ("b", "a"), ("a", "c"), ("c", "a"), ("b", "c"), ("c", "b")];
        schema.dependencies = pairs
            .iter()
            .enumerate()
            .map(|(i, (s, t))| {
                dependency(
                    &format!("v{i}"),
                    &format!("options.{s}"),
                    &format!("options.{t}"),
                    Mechanism::Validate,
                )
            })
            .collect();
        let report = validate_schema(&schema);
        assert!(report.valid);
        assert!(report.has_warning(DiagnosticCode::DenseValidationGraph));
    }

    #[test]
    fn duplicate_dependency_id_is_error() {
        let mut schema = base_schema();
        schema.dependencies = vec![
            dependency("d1", "options.a", "options.b", Mechanism::Update),
            dependency("d1", "options.b", "options.c", Mechanism::Update),
        ];
        assert!(validate_schema(&schema).has_error(DiagnosticCode::DuplicateId));
    }
}
