//! # portflow
//!
//! Command line tool for generated widget artifacts.
//!
//! ## Usage
//!
//! ```bash
//! # Validate one artifact
//! portflow schema schema.json
//! portflow selection selection.json --registry registry.json
//! portflow ui-spec ui_spec.json --schema schema.json --registry registry.json
//!
//! # Validate all three, machine-readable
//! portflow --json check --schema s.json --selection sel.json --ui-spec ui.json -r registry.json
//!
//! # Replay a scripted session
//! portflow simulate script.json --ui-spec ui.json -s schema.json -r registry.json
//! ```

use clap::Parser;
use portflow::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // PORTFLOW_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("PORTFLOW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "portflow=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if cli.verbose {
        tracing::info!(command = ?cli.command, "Starting");
    }
    if !cli.quiet && !cli.json {
        print_banner();
    }

    match cli::execute(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  portflow v{}
  schema -> selection -> ui spec -> ports
"#,
        env!("CARGO_PKG_VERSION")
    );
}
