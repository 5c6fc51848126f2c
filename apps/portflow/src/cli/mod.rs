//! # Portflow CLI Module
//!
//! ## Available Commands
//!
//! - `schema` - Validate a data schema
//! - `selection` - Validate a widget selection against a registry
//! - `ui-spec` - Validate a UI spec against its schema and a registry
//! - `check` - Validate all three artifacts together
//! - `registry` - List the widget definitions of a registry
//! - `simulate` - Replay a scripted session against a UI spec

mod commands;

use crate::config::PortflowConfig;
use clap::{Parser, Subcommand};
use portflow_core::PortflowError;
use portflow_session::SessionError;
use std::path::PathBuf;
use thiserror::Error;

pub use commands::*;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A file could not be read.
    #[error("I/O error: {0}")]
    Io(String),

    /// The engine rejected an input.
    #[error(transparent)]
    Portflow(#[from] PortflowError),

    /// The session driver failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// An artifact needed to run a session is invalid.
    #[error("{artifact} is invalid ({errors} errors)")]
    Rejected {
        /// Which artifact.
        artifact: &'static str,
        /// Number of blocking diagnostics.
        errors: usize,
    },
}

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Portflow - validate generated widget artifacts and replay sessions.
#[derive(Parser, Debug)]
#[command(name = "portflow")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file (default: ./portflow.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a data schema
    Schema {
        /// Schema JSON file
        file: PathBuf,
    },

    /// Validate a widget selection
    Selection {
        /// Selection JSON file
        file: PathBuf,

        /// Widget registry JSON file
        #[arg(short, long)]
        registry: PathBuf,
    },

    /// Validate a UI spec
    UiSpec {
        /// UI spec JSON file
        file: PathBuf,

        /// Schema the spec was generated from
        #[arg(short, long)]
        schema: PathBuf,

        /// Widget registry JSON file
        #[arg(short, long)]
        registry: PathBuf,
    },

    /// Validate schema, selection and UI spec together
    Check {
        /// Schema JSON file
        #[arg(long)]
        schema: PathBuf,

        /// Selection JSON file
        #[arg(long)]
        selection: PathBuf,

        /// UI spec JSON file
        #[arg(long)]
        ui_spec: PathBuf,

        /// Widget registry JSON file
        #[arg(short, long)]
        registry: PathBuf,
    },

    /// List registry definitions
    Registry {
        /// Widget registry JSON file
        file: PathBuf,
    },

    /// Replay a scripted session
    Simulate {
        /// Script JSON file
        script: PathBuf,

        /// UI spec JSON file
        #[arg(long)]
        ui_spec: PathBuf,

        /// Schema JSON file
        #[arg(short, long)]
        schema: PathBuf,

        /// Widget registry JSON file
        #[arg(short, long)]
        registry: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
///
/// Returns `false` when a validated artifact was found invalid.
pub async fn execute(cli: Cli) -> Result<bool, CliError> {
    let config = PortflowConfig::load(cli.config.as_deref())?;
    let json = cli.json;

    match cli.command {
        Commands::Schema { file } => {
            let report = cmd_schema(&file, &config)?;
            Ok(print_reports(&[("schema", &report)], json))
        }
        Commands::Selection { file, registry } => {
            let report = cmd_selection(&file, &registry, &config)?;
            Ok(print_reports(&[("selection", &report)], json))
        }
        Commands::UiSpec {
            file,
            schema,
            registry,
        } => {
            let report = cmd_ui_spec(&file, &schema, &registry, &config)?;
            Ok(print_reports(&[("uiSpec", &report)], json))
        }
        Commands::Check {
            schema,
            selection,
            ui_spec,
            registry,
        } => {
            let reports = cmd_check(&schema, &selection, &ui_spec, &registry, &config)?;
            Ok(print_reports(
                &[
                    ("schema", &reports.schema),
                    ("selection", &reports.selection),
                    ("uiSpec", &reports.ui_spec),
                ],
                json,
            ))
        }
        Commands::Registry { file } => {
            cmd_registry(&file, json)?;
            Ok(true)
        }
        Commands::Simulate {
            script,
            ui_spec,
            schema,
            registry,
        } => {
            let transcript = cmd_simulate(&script, &ui_spec, &schema, &registry, &config).await?;
            print_transcript(&transcript, json);
            Ok(true)
        }
    }
}
