//! # CLI Integration Tests
//!
//! Artifacts and config files are written to a temporary directory and run
//! through the command functions the binary dispatches to.

use clap::Parser;
use portflow::cli::{self, Cli, CliError};
use portflow::config::PortflowConfig;
use portflow_core::{DiagnosticCode, Score};
use serde_json::{Value, json};
use std::path::PathBuf;
use tempfile::TempDir;

fn registry() -> Value {
    json!([
        {
            "id": "brainstorm",
            "stage": "diverge",
            "ports": {"outputs": [{"id": "items", "direction": "out", "dataType": "array<string>"}]},
            "metadata": {"timing": 0.4, "versatility": 0.8, "complexity": 0.3}
        },
        {
            "id": "cluster_board",
            "stage": "organize",
            "metadata": {"timing": 0.5, "versatility": 0.5, "complexity": 0.4}
        },
        {
            "id": "tradeoff_balance",
            "stage": "converge",
            "ports": {"outputs": [
                {"id": "balance", "direction": "out", "dataType": "number",
                 "constraints": [{"type": "range", "min": 0, "max": 100}]},
                {"id": "leaning", "direction": "out", "dataType": "string"}
            ]},
            "metadata": {"timing": 0.3, "versatility": 0.6, "complexity": 0.6}
        },
        {
            "id": "priority_slider_grid",
            "stage": "converge",
            "ports": {
                "inputs": [{"id": "input", "direction": "in", "dataType": "number"}],
                "outputs": [{"id": "priorities", "direction": "out", "dataType": "object"}]
            },
            "metadata": {"timing": 0.5, "versatility": 0.5, "complexity": 0.5}
        },
        {
            "id": "summary_card",
            "stage": "summary",
            "metadata": {"timing": 0.2, "versatility": 0.9, "complexity": 0.2}
        }
    ])
}

fn schema() -> Value {
    json!({
        "version": "1.0",
        "stage": "converge",
        "entities": [
            {"id": "concern", "kind": "primary", "attributes": [
                {"name": "text", "structuralType": "SVAL", "valueType": "string"}
            ]}
        ]
    })
}

fn selection(converge: &[&str]) -> Value {
    let converge: Vec<_> = converge.iter().map(|id| json!({"widgetId": id})).collect();
    json!({
        "version": "1.0",
        "stages": {
            "diverge": {"widgets": [{"widgetId": "brainstorm"}]},
            "organize": {"widgets": [{"widgetId": "cluster_board"}]},
            "converge": {"widgets": converge},
            "summary": {"widgets": [{"widgetId": "summary_card"}]}
        }
    })
}

fn ui_spec(update_mode: &str) -> Value {
    json!({
        "version": "1.0",
        "widgets": [
            {"id": "A", "component": "tradeoff_balance",
             "config": {"leftLabel": "cost", "rightLabel": "speed"}},
            {"id": "B", "component": "priority_slider_grid",
             "config": {"items": ["x", "y"]}}
        ],
        "reactiveBindings": [
            {"id": "b1", "source": "A.balance", "target": "B.input",
             "mechanism": "update", "relationship": {"type": "passthrough"},
             "updateMode": update_mode, "debounceMs": 500}
        ]
    })
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    fn write(&self, name: &str, value: &Value) -> PathBuf {
        self.write_text(name, &value.to_string())
    }

    fn write_text(&self, name: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, text).expect("write");
        path
    }
}

// =============================================================================
// VALIDATION COMMANDS
// =============================================================================

#[test]
fn schema_command_reports_valid_schema() {
    let ws = Workspace::new();
    let file = ws.write("schema.json", &schema());

    let report = cli::cmd_schema(&file, &PortflowConfig::default()).expect("run");
    assert!(report.valid, "{:?}", report.errors);
}

#[test]
fn selection_command_reports_budget_overrun() {
    let ws = Workspace::new();
    let file = ws.write(
        "selection.json",
        &selection(&["tradeoff_balance", "priority_slider_grid"]),
    );
    let registry = ws.write("registry.json", &registry());

    let report =
        cli::cmd_selection(&file, &registry, &PortflowConfig::default()).expect("run");
    assert!(!report.valid);
    assert!(report.has_error(DiagnosticCode::ComplexityBudgetExceeded));
}

#[test]
fn raised_budget_accepts_same_selection() {
    let ws = Workspace::new();
    let file = ws.write(
        "selection.json",
        &selection(&["tradeoff_balance", "priority_slider_grid"]),
    );
    let registry = ws.write("registry.json", &registry());
    let config_file = ws.write_text("portflow.toml", "[rules]\nmax_stage_complexity = 1.2\n");

    let config = PortflowConfig::load(Some(&config_file)).expect("config");
    assert_eq!(config.rules.max_stage_complexity, Score::from_millis(1200));

    let report = cli::cmd_selection(&file, &registry, &config).expect("run");
    assert!(report.valid, "{:?}", report.errors);
}

#[test]
fn check_command_validates_all_three() {
    let ws = Workspace::new();
    let schema = ws.write("schema.json", &schema());
    let selection = ws.write("selection.json", &selection(&["tradeoff_balance"]));
    let spec = ws.write("ui.json", &ui_spec("realtime"));
    let registry = ws.write("registry.json", &registry());

    let reports = cli::cmd_check(
        &schema,
        &selection,
        &spec,
        &registry,
        &PortflowConfig::default(),
    )
    .expect("run");
    assert!(reports.all_valid(), "{:?}", reports);
}

#[test]
fn ui_spec_command_flags_unknown_component() {
    let ws = Workspace::new();
    let mut spec = ui_spec("realtime");
    spec["widgets"][1]["component"] = json!("mystery_widget");
    let file = ws.write("ui.json", &spec);
    let schema = ws.write("schema.json", &schema());
    let registry = ws.write("registry.json", &registry());

    let report =
        cli::cmd_ui_spec(&file, &schema, &registry, &PortflowConfig::default()).expect("run");
    assert!(report.has_error(DiagnosticCode::UnknownWidget));
}

#[test]
fn missing_and_malformed_files_are_errors() {
    let ws = Workspace::new();
    let missing = ws.dir.path().join("nope.json");
    assert!(matches!(
        cli::cmd_schema(&missing, &PortflowConfig::default()),
        Err(CliError::Io(_))
    ));

    let garbage = ws.write_text("schema.json", "{ not json");
    assert!(matches!(
        cli::cmd_schema(&garbage, &PortflowConfig::default()),
        Err(CliError::Portflow(_))
    ));

    assert!(matches!(
        cli::cmd_schema(ws.dir.path(), &PortflowConfig::default()),
        Err(CliError::Io(_))
    ));
}

#[test]
fn explicit_config_path_must_exist() {
    let ws = Workspace::new();
    assert!(PortflowConfig::load(Some(&ws.dir.path().join("absent.toml"))).is_err());

    let bad = ws.write_text("bad.toml", "[rules]\nmax_widgets_per_stage = 0\n");
    assert!(PortflowConfig::load(Some(&bad)).is_err());
}

#[test]
fn registry_command_lists_definitions() {
    let ws = Workspace::new();
    let file = ws.write("registry.json", &registry());

    let registry = cli::cmd_registry(&file, true).expect("run");
    assert_eq!(registry.len(), 5);
    assert!(registry.contains("summary_card"));
}

#[tokio::test]
async fn execute_reports_invalid_artifact_as_false() {
    let ws = Workspace::new();
    let valid = ws.write("schema.json", &schema());
    let invalid = ws.write("old.json", &json!({"version": "0.9"}));

    let valid = valid.to_str().expect("utf8 path");
    let invalid = invalid.to_str().expect("utf8 path");

    let cli = Cli::try_parse_from(["portflow", "--quiet", "schema", valid]).expect("args");
    assert!(cli::execute(cli).await.expect("execute"));

    let cli =
        Cli::try_parse_from(["portflow", "--quiet", "--json", "schema", invalid]).expect("args");
    assert!(!cli::execute(cli).await.expect("execute"));
}

// =============================================================================
// SIMULATE
// =============================================================================

#[tokio::test(start_paused = true)]
async fn simulate_replays_debounced_session() {
    let ws = Workspace::new();
    let script = ws.write(
        "script.json",
        &json!({
            "steps": [
                {"mount": {"widget": "A"}},
                {"mount": {"widget": "B"}},
                {"emit": {"widget": "A", "port": "balance", "value": 10}},
                {"emit": {"widget": "A", "port": "balance", "value": 20}},
                {"emit": {"widget": "A", "port": "balance", "value": 30}},
                {"wait": {"ms": 600}},
                {"read": {"path": "B.input"}},
                {"emit": {"widget": "A", "port": "balance", "value": 150}},
                {"result": {"widget": "A"}}
            ]
        }),
    );
    let spec = ws.write("ui.json", &ui_spec("debounced"));
    let schema = ws.write("schema.json", &schema());
    let registry = ws.write("registry.json", &registry());

    let transcript = cli::cmd_simulate(
        &script,
        &spec,
        &schema,
        &registry,
        &PortflowConfig::default(),
    )
    .await
    .expect("simulate");

    assert_eq!(transcript.len(), 9);
    assert_eq!(transcript[6]["step"], "read");
    assert_eq!(transcript[6]["value"], json!(30));

    assert_eq!(transcript[7]["step"], "emit");
    assert!(transcript[7]["error"].is_string(), "{}", transcript[7]);

    let result = &transcript[8]["result"];
    assert_eq!(result["widgetId"], "A");
    assert_eq!(result["data"]["balance"], json!(30));
}

#[tokio::test]
async fn simulate_rejects_invalid_ui_spec() {
    let ws = Workspace::new();
    let script = ws.write("script.json", &json!({"steps": []}));
    let mut spec = ui_spec("realtime");
    spec["reactiveBindings"][0]["target"] = json!("B._error");
    let spec = ws.write("ui.json", &spec);
    let schema = ws.write("schema.json", &schema());
    let registry = ws.write("registry.json", &registry());

    let err = cli::cmd_simulate(
        &script,
        &spec,
        &schema,
        &registry,
        &PortflowConfig::default(),
    )
    .await
    .expect_err("rejected");
    assert!(matches!(err, CliError::Rejected { .. }));
}
