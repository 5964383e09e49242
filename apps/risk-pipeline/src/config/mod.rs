//! Configuration module for the risk pipeline.
//!
//! Provides configuration loading with environment variable interpolation,
//! the typed [`RuntimeConfig`] consumed by every component, and the
//! pre-flight [`ConfigValidator`] that certifies a config before any
//! capital is at risk.
//!
//! Loading and validation are deliberately separate steps: the loader only
//! deserializes, so a mis-configured file still produces a full validation
//! report instead of failing on the first bad field.
//!
//! # Usage
//!
//! ```rust,ignore
//! use risk_pipeline::config::{ConfigValidator, load_config};
//!
//! let config = load_config(None)?;
//! let report = ConfigValidator::new().validate(&config);
//! if !report.is_safe() {
//!     // refuse to start
//! }
//! ```

mod confirmation;
mod credentials;
mod execution;
mod limits;
mod risk;
mod sizing;
mod validator;

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::TradingMode;

pub use confirmation::ConfirmationPolicy;
pub use credentials::CredentialRefs;
pub use execution::ExecutionConfig;
pub use limits::SafetyLimits;
pub use risk::RiskManagementConfig;
pub use sizing::SizingConfig;
pub use validator::{ConfigValidator, IssueSeverity, ValidationIssue, ValidationReport};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),
}

/// Root runtime configuration.
///
/// Immutable after validation; constructed once at startup and read-shared
/// by the gate, sizer, and engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Trading mode for this deployment.
    #[serde(default = "default_mode")]
    pub mode: TradingMode,
    /// Starting capital for the deployment.
    pub initial_capital: Decimal,
    /// Hard safety limits.
    #[serde(default)]
    pub safety_limits: SafetyLimits,
    /// Stop-loss and take-profit settings.
    #[serde(default)]
    pub risk_management: RiskManagementConfig,
    /// Manual confirmation policy.
    #[serde(default)]
    pub confirmation_policy: ConfirmationPolicy,
    /// Position sizing knobs.
    #[serde(default)]
    pub sizing: SizingConfig,
    /// Execution retry policy.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Opaque credential reference names.
    #[serde(default)]
    pub credential_refs: CredentialRefs,
    /// Where ledger snapshots are written.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
    /// Where the pipeline log is written.
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

const fn default_mode() -> TradingMode {
    TradingMode::Paper
}

fn default_state_path() -> PathBuf {
    PathBuf::from("state/ledger.json")
}

fn default_log_path() -> PathBuf {
    PathBuf::from("logs/pipeline.log")
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read or parsed. Range and
/// policy rules are the [`ConfigValidator`]'s job, not the loader's.
pub fn load_config(path: Option<&str>) -> Result<RuntimeConfig, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed.
pub fn load_config_from_string(yaml: &str) -> Result<RuntimeConfig, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: RuntimeConfig = serde_yaml_bw::from_str(&interpolated)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let mut result = input.to_string();

    // Match ${VAR} or ${VAR:-default} patterns
    let re = ENV_VAR_REGEX.get_or_init(|| {
        // This regex pattern is compile-time constant and always valid
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    for cap in re.captures_iter(input) {
        // Group 0 and group 1 are guaranteed by the regex pattern structure
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let Some(var_match) = cap.get(1) else {
            continue;
        };
        let full_match = full_match.as_str();
        let var_name = var_match.as_str();
        let default_value = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        };

        result = result.replace(full_match, &value);
    }

    result
}
