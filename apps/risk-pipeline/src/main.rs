//! Risk Pipeline Pre-Flight Certifier
//!
//! Certifies a runtime configuration before any capital is at risk: loads
//! the YAML config, runs the validation rulebook for the configured
//! trading mode, logs every finding, and exits non-zero when the
//! configuration is unsafe to deploy.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin risk-pipeline
//! ```
//!
//! # Environment Variables
//!
//! - `RISK_PIPELINE_CONFIG`: Path to the config file (default: config.yaml)
//! - `RUST_LOG`: Log level (default: info)

use risk_pipeline::config::{ConfigValidator, ValidationReport, load_config};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let path =
        std::env::var("RISK_PIPELINE_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
    tracing::info!(config_path = %path, "certifying runtime configuration");

    let config = load_config(Some(&path))?;
    tracing::info!(
        mode = %config.mode,
        initial_capital = %config.initial_capital,
        "configuration loaded"
    );

    let validator = ConfigValidator::new();
    let report = if config.mode.is_live() {
        validator.validate(&config)
    } else {
        validator.validate_paper(&config)
    };

    log_report(&report);

    if !report.is_safe() {
        return Err(anyhow::anyhow!(
            "configuration failed certification with {} error(s)",
            report.errors.len()
        ));
    }

    tracing::info!(
        warnings = report.warnings.len(),
        "configuration certified safe for deployment"
    );
    Ok(())
}

/// Initialize the tracing subscriber with environment filter.
///
/// Uses static directive strings that are compile-time constants guaranteed to parse.
#[allow(clippy::expect_used)]
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "risk_pipeline=info"
                    .parse()
                    .expect("static directive 'risk_pipeline=info' is valid"),
            ),
        )
        .init();
}

/// Log every finding as a structured record, errors first.
fn log_report(report: &ValidationReport) {
    for issue in &report.errors {
        tracing::error!(
            code = %issue.code,
            field = %issue.field,
            observed = %issue.observed,
            limit = %issue.limit,
            "{}",
            issue.message
        );
    }
    for issue in &report.warnings {
        tracing::warn!(
            code = %issue.code,
            field = %issue.field,
            observed = %issue.observed,
            limit = %issue.limit,
            "{}",
            issue.message
        );
    }
}
