//! # Configuration
//!
//! Optional TOML file with two tables, both fully defaulted:
//!
//! ```toml
//! [rules]
//! max_stage_complexity = 0.9
//! closing_widgets = ["summary_card"]
//!
//! [session]
//! max_propagation_steps = 2048
//!
//! [session.retry]
//! max_attempts = 5
//! timeout_ms = 10000
//! ```
//!
//! Environment:
//! - `PORTFLOW_MAX_STAGE_COMPLEXITY`: overrides `rules.max_stage_complexity`

use portflow_core::{PortflowError, RuntimeConfig, Score, ValidationRules};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "portflow.toml";

/// Environment override for the stage complexity budget.
pub const MAX_STAGE_COMPLEXITY_ENV: &str = "PORTFLOW_MAX_STAGE_COMPLEXITY";

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Everything the CLI can be configured with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortflowConfig {
    /// Validator thresholds.
    pub rules: ValidationRules,
    /// Port runtime and `llm` retry settings.
    pub session: RuntimeConfig,
}

impl PortflowConfig {
    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, PortflowError> {
        toml::from_str(text).map_err(|e| PortflowError::Config(e.to_string()))
    }

    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// read if present and defaults are used otherwise. The environment
    /// override is applied last, then the result is checked.
    pub fn load(path: Option<&Path>) -> Result<Self, PortflowError> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::read(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.check()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, PortflowError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            PortflowError::Config(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(PortflowError::Config(format!(
                "Config file '{}' exceeds {} bytes",
                path.display(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            PortflowError::Config(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Self::from_toml(&text)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), PortflowError> {
        if let Some(raw) = lookup(MAX_STAGE_COMPLEXITY_ENV) {
            let value: f64 = raw.trim().parse().map_err(|_| {
                PortflowError::Config(format!(
                    "{} must be a number, got '{}'",
                    MAX_STAGE_COMPLEXITY_ENV, raw
                ))
            })?;
            self.rules.max_stage_complexity = Score::try_from(value)?;
        }
        Ok(())
    }

    /// Check both tables.
    pub fn check(&self) -> Result<(), PortflowError> {
        self.rules.check()?;
        self.session.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = PortflowConfig::from_toml("").expect("parse");
        assert_eq!(config, PortflowConfig::default());
        assert!(config.check().is_ok());
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = PortflowConfig::from_toml(
            "[rules]\nmax_stage_complexity = 0.9\n\n[session.retry]\nmax_attempts = 5\n",
        )
        .expect("parse");
        assert_eq!(config.rules.max_stage_complexity, Score::from_millis(900));
        assert_eq!(config.rules.max_widgets_per_stage, 3);
        assert_eq!(config.session.retry.max_attempts, 5);
        assert_eq!(config.session.max_propagation_steps, 1024);
    }

    #[test]
    fn env_overrides_budget() {
        let mut config = PortflowConfig::default();
        config
            .apply_env(|key| (key == MAX_STAGE_COMPLEXITY_ENV).then(|| "1.25".to_string()))
            .expect("apply");
        assert_eq!(config.rules.max_stage_complexity, Score::from_millis(1250));

        assert!(config.apply_env(|_| Some("lots".to_string())).is_err());
        assert!(config.apply_env(|_| Some("-1".to_string())).is_err());
    }

    #[test]
    fn inconsistent_rules_rejected() {
        let config = PortflowConfig::from_toml(
            "[rules]\nmin_widgets_per_stage = 4\nmax_widgets_per_stage = 2\n",
        )
        .expect("parse");
        assert!(config.check().is_err());
        assert!(PortflowConfig::from_toml("[session]\nmax_propagation_steps = \"x\"").is_err());
    }
}
