//! Per-stage widget selection validation.

use super::{ValidationRules, check_version};
use crate::diagnostic::{Diagnostic, DiagnosticCode, ReportBuilder, ValidationReport};
use crate::registry::WidgetRegistry;
use crate::selection::SelectionResult;
use crate::stage::Stage;
use crate::types::Score;
use std::collections::BTreeSet;

/// Validate a widget selection against the registry and rules.
///
/// Stages are checked in fixed order (`diverge`, `organize`, `converge`,
/// `summary`) regardless of key order in the input.
#[must_use]
pub fn validate_selection(
    result: &SelectionResult,
    registry: &WidgetRegistry,
    rules: &ValidationRules,
) -> ValidationReport {
    let mut report = ReportBuilder::new();
    check_version(
        &mut report,
        "Selection",
        &result.version,
        &rules.selection_version,
    );

    for key in result.stages.keys() {
        if Stage::from_name(key).is_none() {
            report.warning(
                Diagnostic::new(
                    DiagnosticCode::UnknownStage,
                    format!("Selection names unknown stage '{}'", key),
                )
                .at(format!("stages.{}", key)),
            );
        }
    }

    for stage in Stage::ALL {
        check_stage(stage, result, registry, rules, &mut report);
    }

    report.finish()
}

fn check_stage(
    stage: Stage,
    result: &SelectionResult,
    registry: &WidgetRegistry,
    rules: &ValidationRules,
    report: &mut ReportBuilder,
) {
    let location = format!("stages.{}", stage);
    let widgets = result.widgets_for(stage);

    let count = widgets.len();
    if count < rules.min_widgets_per_stage || count > rules.max_widgets_per_stage {
        report.error(
            Diagnostic::new(
                DiagnosticCode::StageWidgetCount,
                format!(
                    "Stage {} selects {} widgets; expected {} to {}",
                    stage, count, rules.min_widgets_per_stage, rules.max_widgets_per_stage
                ),
            )
            .at(location.clone()),
        );
    }

    let mut seen = BTreeSet::new();
    let mut total = Score::ZERO;
    let mut terms = Vec::new();

    for (i, selected) in widgets.iter().enumerate() {
        let at = format!("{}.widgets[{}]", location, i);

        if !seen.insert(selected.widget_id.as_str()) {
            report.error(
                Diagnostic::new(
                    DiagnosticCode::DuplicateComponent,
                    format!(
                        "Component {} is selected more than once in stage {}",
                        selected.widget_id, stage
                    ),
                )
                .at(at.clone()),
            );
        }

        let Some(definition) = registry.get(&selected.widget_id) else {
            report.error(
                Diagnostic::new(
                    DiagnosticCode::UnknownWidget,
                    format!("Unknown widget: {}", selected.widget_id),
                )
                .at(at),
            );
            continue;
        };

        if definition.stage != stage {
            report.warning(
                Diagnostic::new(
                    DiagnosticCode::StageMismatch,
                    format!(
                        "Widget {} is designed for stage {} but selected for {}",
                        definition.id, definition.stage, stage
                    ),
                )
                .at(at),
            );
        }

        total = total.saturating_add(definition.metadata.complexity);
        terms.push(format!("{} {}", definition.id, definition.metadata.complexity));
    }

    if total > rules.max_stage_complexity {
        report.error(
            Diagnostic::new(
                DiagnosticCode::ComplexityBudgetExceeded,
                format!(
                    "Stage {} complexity {} > {} ({})",
                    stage,
                    total,
                    rules.max_stage_complexity,
                    terms.join(" + ")
                ),
            )
            .at(location.clone()),
        );
    }

    if stage == Stage::Summary
        && !widgets
            .iter()
            .any(|w| rules.closing_widgets.contains(&w.widget_id))
    {
        let closing: Vec<&str> = rules.closing_widgets.iter().map(String::as_str).collect();
        report.error(
            Diagnostic::new(
                DiagnosticCode::MissingClosingWidget,
                format!(
                    "Stage summary must include one of: {}",
                    closing.join(", ")
                ),
            )
            .at(location),
        );
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::WidgetDefinition;

    fn registry() -> WidgetRegistry {
        WidgetRegistry::new(vec![
            WidgetDefinition::new("brainstorm", Stage::Diverge).with_complexity(Score::from_millis(300)),
            WidgetDefinition::new("affinity_map", Stage::Organize)
                .with_complexity(Score::from_millis(400)),
            WidgetDefinition::new("tradeoff_balance", Stage::Converge)
                .with_complexity(Score::from_millis(600)),
            WidgetDefinition::new("priority_slider_grid", Stage::Converge)
                .with_complexity(Score::from_millis(500)),
            WidgetDefinition::new("summary_card", Stage::Summary)
                .with_complexity(Score::from_millis(200)),
        ])
        .expect("registry")
    }

    fn valid_selection() -> SelectionResult {
        SelectionResult::new("1.0")
            .with_stage(Stage::Diverge, &["brainstorm"])
            .with_stage(Stage::Organize, &["affinity_map"])
            .with_stage(Stage::Converge, &["tradeoff_balance"])
            .with_stage(Stage::Summary, &["summary_card"])
    }

    #[test]
    fn valid_selection_passes() {
        let report = validate_selection(&valid_selection(), &registry(), &ValidationRules::default());
        assert!(report.valid, "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn complexity_budget_names_stage_and_sum() {
        let selection =
            valid_selection().with_stage(Stage::Converge, &["tradeoff_balance", "priority_slider_grid"]);
        let report = validate_selection(&selection, &registry(), &ValidationRules::default());
        assert!(!report.valid);
        let diag = report
            .errors_with(DiagnosticCode::ComplexityBudgetExceeded)
            .next()
            .expect("budget error");
        assert_eq!(diag.path.as_deref(), Some("stages.converge"));
        assert!(diag.message.contains("converge"));
        assert!(diag.message.contains("1.1 > 0.8"));
    }

    #[test]
    fn budget_is_inclusive() {
        let rules = ValidationRules::default().with_max_stage_complexity(Score::from_millis(1100));
        let selection =
            valid_selection().with_stage(Stage::Converge, &["tradeoff_balance", "priority_slider_grid"]);
        assert!(validate_selection(&selection, &registry(), &rules).valid);
    }

    #[test]
    fn unknown_widget_is_error() {
        let selection = valid_selection().with_stage(Stage::Diverge, &["mind_map"]);
        let report = validate_selection(&selection, &registry(), &ValidationRules::default());
        let diag = report
            .errors_with(DiagnosticCode::UnknownWidget)
            .next()
            .expect("unknown widget");
        assert_eq!(diag.path.as_deref(), Some("stages.diverge.widgets[0]"));
    }

    #[test]
    fn widget_count_bounds() {
        let mut selection = valid_selection();
        selection.stages.remove("organize");
        let report = validate_selection(&selection, &registry(), &ValidationRules::default());
        assert!(report.has_error(DiagnosticCode::StageWidgetCount));
    }

    #[test]
    fn repeated_component_is_error() {
        let selection = valid_selection().with_stage(Stage::Diverge, &["brainstorm", "brainstorm"]);
        let report = validate_selection(&selection, &registry(), &ValidationRules::default());
        assert!(report.has_error(DiagnosticCode::DuplicateComponent));
    }

    #[test]
    fn summary_needs_closing_widget() {
        let selection = valid_selection().with_stage(Stage::Summary, &["brainstorm"]);
        let report = validate_selection(&selection, &registry(), &ValidationRules::default());
        assert!(report.has_error(DiagnosticCode::MissingClosingWidget));
        assert!(report.has_warning(DiagnosticCode::StageMismatch));
    }

    #[test]
    fn unknown_stage_key_warns() {
        let mut selection = valid_selection();
        selection
            .stages
            .insert("reflect".to_string(), Default::default());
        let report = validate_selection(&selection, &registry(), &ValidationRules::default());
        assert!(report.valid);
        assert!(report.has_warning(DiagnosticCode::UnknownStage));
    }

    #[test]
    fn errors_follow_fixed_stage_order() {
        let selection = SelectionResult::new("1.0")
            .with_stage(Stage::Summary, &["x"])
            .with_stage(Stage::Diverge, &["y"]);
        let report = validate_selection(&selection, &registry(), &ValidationRules::default());
        let paths: Vec<_> = report
            .errors_with(DiagnosticCode::UnknownWidget)
            .filter_map(|d| d.path.clone())
            .collect();
        assert_eq!(
            paths,
            vec!["stages.diverge.widgets[0]", "stages.summary.widgets[0]"]
        );
    }
}
