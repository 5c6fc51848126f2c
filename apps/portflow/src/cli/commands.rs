//! # CLI Command Implementations
//!
//! Each `cmd_*` function loads its inputs and returns what it found; printing
//! is kept separate so the commands can be driven from tests.

use super::CliError;
use crate::config::PortflowConfig;
use portflow_core::{
    PortRuntime, Schema, SelectionResult, UiSpec, ValidatedUiSpec, ValidationReport,
    WidgetRegistry, validate_schema_with, validate_selection, validate_ui_spec_with,
};
use portflow_session::{ScriptedLlm, Session, SessionError, SessionHandle};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// FILE LIMITS
// =============================================================================

/// Maximum artifact file size (16 MB).
const MAX_ARTIFACT_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Resolve a path and make sure it names a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, CliError> {
    let canonical = path
        .canonicalize()
        .map_err(|e| CliError::Io(format!("Invalid file path '{}': {}", path.display(), e)))?;

    if !canonical.is_file() {
        return Err(CliError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Reject files over the size limit before reading them.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), CliError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| CliError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(CliError::Io(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Read an artifact file as text.
fn read_artifact(path: &Path) -> Result<String, CliError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_ARTIFACT_FILE_SIZE)?;
    tracing::debug!(path = %path.display(), "Reading artifact");
    std::fs::read_to_string(&path)
        .map_err(|e| CliError::Io(format!("Read '{}': {}", path.display(), e)))
}

fn load_schema(path: &Path) -> Result<Schema, CliError> {
    Ok(Schema::from_json(&read_artifact(path)?)?)
}

fn load_registry(path: &Path) -> Result<WidgetRegistry, CliError> {
    Ok(WidgetRegistry::from_json(&read_artifact(path)?)?)
}

// =============================================================================
// VALIDATION COMMANDS
// =============================================================================

/// Validate a schema file.
pub fn cmd_schema(file: &Path, config: &PortflowConfig) -> Result<ValidationReport, CliError> {
    let schema = load_schema(file)?;
    Ok(validate_schema_with(&schema, &config.rules))
}

/// Validate a selection file against a registry.
pub fn cmd_selection(
    file: &Path,
    registry: &Path,
    config: &PortflowConfig,
) -> Result<ValidationReport, CliError> {
    let selection = SelectionResult::from_json(&read_artifact(file)?)?;
    let registry = load_registry(registry)?;
    Ok(validate_selection(&selection, &registry, &config.rules))
}

/// Validate a UI spec file against its schema and a registry.
pub fn cmd_ui_spec(
    file: &Path,
    schema: &Path,
    registry: &Path,
    config: &PortflowConfig,
) -> Result<ValidationReport, CliError> {
    let spec = UiSpec::from_json(&read_artifact(file)?)?;
    let schema = load_schema(schema)?;
    let registry = load_registry(registry)?;
    Ok(validate_ui_spec_with(&spec, &schema, &registry, &config.rules))
}

/// Reports of a `check` run.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReports {
    /// Schema report.
    pub schema: ValidationReport,
    /// Selection report.
    pub selection: ValidationReport,
    /// UI spec report.
    pub ui_spec: ValidationReport,
}

impl CheckReports {
    /// `true` iff every artifact is valid.
    pub fn all_valid(&self) -> bool {
        self.schema.valid && self.selection.valid && self.ui_spec.valid
    }
}

/// Validate all three artifacts.
pub fn cmd_check(
    schema: &Path,
    selection: &Path,
    ui_spec: &Path,
    registry: &Path,
    config: &PortflowConfig,
) -> Result<CheckReports, CliError> {
    let schema = load_schema(schema)?;
    let selection = SelectionResult::from_json(&read_artifact(selection)?)?;
    let spec = UiSpec::from_json(&read_artifact(ui_spec)?)?;
    let registry = load_registry(registry)?;

    Ok(CheckReports {
        schema: validate_schema_with(&schema, &config.rules),
        selection: validate_selection(&selection, &registry, &config.rules),
        ui_spec: validate_ui_spec_with(&spec, &schema, &registry, &config.rules),
    })
}

// =============================================================================
// REGISTRY COMMAND
// =============================================================================

/// List registry definitions.
pub fn cmd_registry(file: &Path, json_mode: bool) -> Result<WidgetRegistry, CliError> {
    let registry = load_registry(file)?;

    if json_mode {
        let definitions: Vec<_> = registry.iter().collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&definitions).unwrap_or_default()
        );
        return Ok(registry);
    }

    println!("Widget Registry ({} definitions)", registry.len());
    println!("==========================");
    for definition in registry.iter() {
        println!(
            "  {:<24} {:<9} complexity {:<5} in {} / out {}",
            definition.id,
            definition.stage.to_string(),
            definition.metadata.complexity.to_string(),
            definition.ports.inputs.len(),
            definition.ports.outputs.len()
        );
    }
    Ok(registry)
}

// =============================================================================
// SIMULATE COMMAND
// =============================================================================

/// A scripted session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    /// Canned `llm` answers keyed by prompt.
    #[serde(default)]
    pub llm: BTreeMap<String, Value>,
    /// Delay before each `llm` answer.
    #[serde(default)]
    pub llm_latency_ms: u64,
    /// Steps in order.
    pub steps: Vec<Step>,
}

/// One scripted action.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Mount a widget.
    Mount {
        /// Widget id.
        widget: String,
        /// Initial port values.
        #[serde(default)]
        initial: BTreeMap<String, Value>,
    },
    /// Emit a port value.
    Emit {
        /// Widget id.
        widget: String,
        /// Port id.
        port: String,
        /// Value to write.
        value: Value,
    },
    /// Let time pass.
    Wait {
        /// Milliseconds.
        ms: u64,
    },
    /// Flush a widget's `on_confirm` bindings.
    Confirm {
        /// Widget id.
        widget: String,
    },
    /// Read a port.
    Read {
        /// `widget.port` path.
        path: String,
    },
    /// Unmount a widget.
    Unmount {
        /// Widget id.
        widget: String,
    },
    /// Snapshot a widget.
    Result {
        /// Widget id.
        widget: String,
    },
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Mount { .. } => "mount",
            Step::Emit { .. } => "emit",
            Step::Wait { .. } => "wait",
            Step::Confirm { .. } => "confirm",
            Step::Read { .. } => "read",
            Step::Unmount { .. } => "unmount",
            Step::Result { .. } => "result",
        }
    }
}

/// Validate the artifacts and replay a script file.
pub async fn cmd_simulate(
    script: &Path,
    ui_spec: &Path,
    schema: &Path,
    registry: &Path,
    config: &PortflowConfig,
) -> Result<Vec<Value>, CliError> {
    let script: Script = serde_json::from_str(&read_artifact(script)?)
        .map_err(|e| CliError::Io(format!("Invalid script: {}", e)))?;
    let spec = UiSpec::from_json(&read_artifact(ui_spec)?)?;
    let schema = load_schema(schema)?;
    let registry = load_registry(registry)?;

    let validated =
        ValidatedUiSpec::new(spec, &schema, &registry, &config.rules).map_err(|report| {
            CliError::Rejected {
                artifact: "UI spec",
                errors: report.errors.len(),
            }
        })?;
    let runtime = PortRuntime::new(validated, config.session)?;
    run_script(runtime, script).await
}

/// Replay a script on a fresh session and return the transcript.
///
/// Each step yields one transcript entry. Steps the runtime rejects are
/// recorded with their error and the replay continues.
pub async fn run_script(runtime: PortRuntime, script: Script) -> Result<Vec<Value>, CliError> {
    let mut llm = ScriptedLlm::new().with_latency(script.llm_latency_ms);
    for (prompt, value) in script.llm {
        llm = llm.with_response(prompt, value);
    }
    let handle = Session::spawn(runtime, llm);
    let started = tokio::time::Instant::now();

    let mut transcript = Vec::with_capacity(script.steps.len());
    for step in script.steps {
        let name = step.name();
        match run_step(&handle, step, started).await {
            Ok(entry) => transcript.push(entry),
            Err(SessionError::Runtime(e)) => {
                tracing::info!(step = name, error = %e, "Step rejected");
                transcript.push(json!({ "step": name, "error": e.to_string() }));
            }
            Err(e) => return Err(e.into()),
        }
    }

    handle.shutdown().await?;
    Ok(transcript)
}

async fn run_step(
    handle: &SessionHandle,
    step: Step,
    started: tokio::time::Instant,
) -> Result<Value, SessionError> {
    let entry = match step {
        Step::Mount { widget, initial } => {
            handle.mount(&widget, initial).await?;
            json!({ "step": "mount", "widget": widget })
        }
        Step::Emit {
            widget,
            port,
            value,
        } => {
            handle.emit(&widget, &port, value.clone()).await?;
            json!({ "step": "emit", "path": format!("{}.{}", widget, port), "value": value })
        }
        Step::Wait { ms } => {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            json!({ "step": "wait", "ms": ms })
        }
        Step::Confirm { widget } => {
            handle.confirm(&widget).await?;
            json!({ "step": "confirm", "widget": widget })
        }
        Step::Read { path } => {
            let value = handle.read(&path).await?;
            json!({ "step": "read", "path": path, "value": value })
        }
        Step::Unmount { widget } => {
            handle.unmount(&widget).await?;
            json!({ "step": "unmount", "widget": widget })
        }
        Step::Result { widget } => {
            let timestamp = started.elapsed().as_millis() as u64;
            let result = handle.get_result(&widget, timestamp).await?;
            json!({ "step": "result", "result": result })
        }
    };
    Ok(entry)
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Print validation reports. Returns `true` iff all are valid.
pub fn print_reports(reports: &[(&str, &ValidationReport)], json_mode: bool) -> bool {
    let all_valid = reports.iter().all(|(_, report)| report.valid);

    if json_mode {
        let output: serde_json::Map<String, Value> = reports
            .iter()
            .map(|(name, report)| {
                (
                    (*name).to_string(),
                    serde_json::to_value(report).unwrap_or_default(),
                )
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return all_valid;
    }

    for (name, report) in reports {
        let verdict = if report.valid { "valid" } else { "INVALID" };
        println!(
            "{}: {} ({} errors, {} warnings)",
            name,
            verdict,
            report.errors.len(),
            report.warnings.len()
        );
        for error in &report.errors {
            println!("  error   {}", error);
        }
        for warning in &report.warnings {
            println!("  warning {}", warning);
        }
    }
    all_valid
}

/// Print a simulation transcript.
pub fn print_transcript(transcript: &[Value], json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(transcript).unwrap_or_default()
        );
        return;
    }
    for (index, entry) in transcript.iter().enumerate() {
        println!("{:>3}  {}", index + 1, entry);
    }
}
