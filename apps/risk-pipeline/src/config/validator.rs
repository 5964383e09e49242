//! Pre-flight configuration certification.
//!
//! Checks a full [`RuntimeConfig`] against a fixed rulebook before the
//! pipeline is allowed to start:
//! - capital bounds and loss/stop ceilings
//! - confirmation policy (emergency actions must stay manual)
//! - credential reference presence
//! - writable state/log paths
//!
//! Any single error is fatal to startup. Warnings are surfaced for operator
//! awareness and never block.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::RuntimeConfig;

/// Ceiling for `daily_loss_limit_pct`.
pub const MAX_DAILY_LOSS_CEILING: f64 = 0.20;
/// Ceiling for `emergency_stop_pct`.
pub const MAX_EMERGENCY_CEILING: f64 = 0.50;
/// Ceiling for `max_position_size_pct`.
pub const MAX_POSITION_CEILING: f64 = 0.10;
/// Ceiling for `stop_loss_pct`.
pub const MAX_STOP_LOSS_CEILING: f64 = 0.05;
/// Allowed range for `consecutive_losses_max`.
pub const CONSECUTIVE_LOSSES_RANGE: (u32, u32) = (1, 10);

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueSeverity {
    /// Blocks startup.
    Error,
    /// Surfaced to the operator, never blocking.
    Warning,
}

/// A single finding from configuration certification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Machine-readable issue code.
    pub code: String,
    /// Severity of the issue.
    pub severity: IssueSeverity,
    /// Human-readable message.
    pub message: String,
    /// Dotted path of the offending field.
    pub field: String,
    /// Observed value.
    pub observed: String,
    /// The limit or expectation that was violated.
    pub limit: String,
}

/// Certification result: errors block startup, warnings do not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Fatal findings. Any entry blocks startup.
    pub errors: Vec<ValidationIssue>,
    /// Advisory findings.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// The sole gate for allowing the pipeline to start.
    #[must_use]
    pub fn is_safe(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(
        &mut self,
        code: &str,
        field: &str,
        message: String,
        observed: String,
        limit: String,
    ) {
        self.errors.push(ValidationIssue {
            code: code.to_string(),
            severity: IssueSeverity::Error,
            message,
            field: field.to_string(),
            observed,
            limit,
        });
    }

    fn warning(
        &mut self,
        code: &str,
        field: &str,
        message: String,
        observed: String,
        limit: String,
    ) {
        self.warnings.push(ValidationIssue {
            code: code.to_string(),
            severity: IssueSeverity::Warning,
            message,
            field: field.to_string(),
            observed,
            limit,
        });
    }
}

/// Certifies runtime configurations against the safety rulebook.
#[derive(Debug, Clone)]
pub struct ConfigValidator {
    min_capital: Decimal,
    reasonable_capital_ceiling: Decimal,
}

impl ConfigValidator {
    /// Create a validator with the default capital bounds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_capital: Decimal::from(100),
            reasonable_capital_ceiling: Decimal::from(1_000_000),
        }
    }

    /// Create a validator with custom capital bounds.
    #[must_use]
    pub const fn with_capital_bounds(min_capital: Decimal, reasonable_ceiling: Decimal) -> Self {
        Self {
            min_capital,
            reasonable_capital_ceiling: reasonable_ceiling,
        }
    }

    /// Certify a configuration for the live-trading profile.
    ///
    /// Deterministic and side-effect-free except for directory-existence
    /// checks on `state_path`/`log_path`, which may create parents.
    #[must_use]
    pub fn validate(&self, config: &RuntimeConfig) -> ValidationReport {
        self.run_rulebook(config, true)
    }

    /// Certify a configuration for the paper/test profile.
    ///
    /// Identical rulebook except the live-mode requirement is skipped.
    /// Every safety ceiling still applies.
    #[must_use]
    pub fn validate_paper(&self, config: &RuntimeConfig) -> ValidationReport {
        self.run_rulebook(config, false)
    }

    fn run_rulebook(&self, config: &RuntimeConfig, require_live: bool) -> ValidationReport {
        let mut report = ValidationReport::default();

        if require_live && !config.mode.is_live() {
            report.error(
                "MODE_NOT_LIVE",
                "mode",
                format!(
                    "Live-trading profile requires LIVE mode, got {}",
                    config.mode
                ),
                config.mode.to_string(),
                "LIVE".to_string(),
            );
        }

        self.check_capital(config, &mut report);
        self.check_safety_limits(config, &mut report);
        self.check_risk_management(config, &mut report);
        self.check_confirmation_policy(config, &mut report);
        self.check_sizing(config, &mut report);
        self.check_credentials(config, &mut report);
        self.check_paths(config, &mut report);
        self.check_exposure_arithmetic(config, &mut report);

        report
    }

    fn check_capital(&self, config: &RuntimeConfig, report: &mut ValidationReport) {
        if config.initial_capital < self.min_capital {
            report.error(
                "CAPITAL_BELOW_MINIMUM",
                "initial_capital",
                format!(
                    "Initial capital {} below minimum {}",
                    config.initial_capital, self.min_capital
                ),
                config.initial_capital.to_string(),
                format!(">= {}", self.min_capital),
            );
        } else if config.initial_capital > self.reasonable_capital_ceiling {
            report.warning(
                "CAPITAL_ABOVE_REASONABLE",
                "initial_capital",
                format!(
                    "Initial capital {} far above the reasonable ceiling {}; verify this is intentional",
                    config.initial_capital, self.reasonable_capital_ceiling
                ),
                config.initial_capital.to_string(),
                format!("<= {}", self.reasonable_capital_ceiling),
            );
        }
    }

    fn check_safety_limits(&self, config: &RuntimeConfig, report: &mut ValidationReport) {
        let limits = &config.safety_limits;

        if limits.daily_loss_limit_pct <= 0.0 || limits.daily_loss_limit_pct > MAX_DAILY_LOSS_CEILING
        {
            report.error(
                "DAILY_LOSS_PCT_OUT_OF_RANGE",
                "safety_limits.daily_loss_limit_pct",
                format!(
                    "Daily loss limit {} outside (0, {MAX_DAILY_LOSS_CEILING}]",
                    limits.daily_loss_limit_pct
                ),
                limits.daily_loss_limit_pct.to_string(),
                format!("(0, {MAX_DAILY_LOSS_CEILING}]"),
            );
        }

        if limits.daily_loss_limit_abs <= Decimal::ZERO {
            report.error(
                "DAILY_LOSS_ABS_MISSING",
                "safety_limits.daily_loss_limit_abs",
                "Absolute daily loss limit must be positive".to_string(),
                limits.daily_loss_limit_abs.to_string(),
                "> 0".to_string(),
            );
        }

        if limits.emergency_stop_pct <= 0.0 || limits.emergency_stop_pct > MAX_EMERGENCY_CEILING {
            report.error(
                "EMERGENCY_STOP_PCT_OUT_OF_RANGE",
                "safety_limits.emergency_stop_pct",
                format!(
                    "Emergency stop {} outside (0, {MAX_EMERGENCY_CEILING}]",
                    limits.emergency_stop_pct
                ),
                limits.emergency_stop_pct.to_string(),
                format!("(0, {MAX_EMERGENCY_CEILING}]"),
            );
        } else if limits.emergency_stop_pct < limits.daily_loss_limit_pct {
            report.error(
                "EMERGENCY_BELOW_DAILY_LOSS",
                "safety_limits.emergency_stop_pct",
                format!(
                    "Emergency stop {} tighter than daily loss limit {}; the daily limit would never fire",
                    limits.emergency_stop_pct, limits.daily_loss_limit_pct
                ),
                limits.emergency_stop_pct.to_string(),
                format!(">= {}", limits.daily_loss_limit_pct),
            );
        }

        if limits.emergency_stop_abs <= Decimal::ZERO {
            report.error(
                "EMERGENCY_STOP_ABS_MISSING",
                "safety_limits.emergency_stop_abs",
                "Absolute emergency stop must be positive".to_string(),
                limits.emergency_stop_abs.to_string(),
                "> 0".to_string(),
            );
        }

        if limits.max_position_size_pct <= 0.0 || limits.max_position_size_pct > MAX_POSITION_CEILING
        {
            report.error(
                "POSITION_SIZE_PCT_OUT_OF_RANGE",
                "safety_limits.max_position_size_pct",
                format!(
                    "Max position size {} outside (0, {MAX_POSITION_CEILING}]",
                    limits.max_position_size_pct
                ),
                limits.max_position_size_pct.to_string(),
                format!("(0, {MAX_POSITION_CEILING}]"),
            );
        }

        if limits.max_position_size_abs <= Decimal::ZERO {
            report.error(
                "POSITION_SIZE_ABS_MISSING",
                "safety_limits.max_position_size_abs",
                "Absolute max position size must be positive".to_string(),
                limits.max_position_size_abs.to_string(),
                "> 0".to_string(),
            );
        }

        let (min_losses, max_losses) = CONSECUTIVE_LOSSES_RANGE;
        if limits.consecutive_losses_max < min_losses || limits.consecutive_losses_max > max_losses
        {
            report.error(
                "CONSECUTIVE_LOSSES_OUT_OF_RANGE",
                "safety_limits.consecutive_losses_max",
                format!(
                    "Consecutive loss cap {} outside [{min_losses}, {max_losses}]",
                    limits.consecutive_losses_max
                ),
                limits.consecutive_losses_max.to_string(),
                format!("[{min_losses}, {max_losses}]"),
            );
        }

        if limits.max_daily_trades == 0 {
            report.warning(
                "DAILY_TRADE_CAP_ZERO",
                "safety_limits.max_daily_trades",
                "Daily trade cap of 0 rejects every signal".to_string(),
                "0".to_string(),
                "> 0".to_string(),
            );
        }

        if limits.loss_cooldown_minutes == 0 {
            report.warning(
                "COOLDOWN_DISABLED",
                "safety_limits.loss_cooldown_minutes",
                "Zero cooldown disables the consecutive-loss brake".to_string(),
                "0".to_string(),
                "> 0".to_string(),
            );
        }
    }

    fn check_risk_management(&self, config: &RuntimeConfig, report: &mut ValidationReport) {
        let risk = &config.risk_management;

        if risk.stop_loss_pct <= 0.0 || risk.stop_loss_pct > MAX_STOP_LOSS_CEILING {
            report.error(
                "STOP_LOSS_PCT_OUT_OF_RANGE",
                "risk_management.stop_loss_pct",
                format!(
                    "Stop loss {} outside (0, {MAX_STOP_LOSS_CEILING}]",
                    risk.stop_loss_pct
                ),
                risk.stop_loss_pct.to_string(),
                format!("(0, {MAX_STOP_LOSS_CEILING}]"),
            );
        } else if risk.take_profit_pct / risk.stop_loss_pct < 2.0 {
            report.warning(
                "TAKE_PROFIT_RATIO_LOW",
                "risk_management.take_profit_pct",
                format!(
                    "Reward:risk ratio {:.2} below the advisory 2.0",
                    risk.take_profit_pct / risk.stop_loss_pct
                ),
                format!("{:.2}", risk.take_profit_pct / risk.stop_loss_pct),
                ">= 2.0".to_string(),
            );
        }
    }

    fn check_confirmation_policy(&self, config: &RuntimeConfig, report: &mut ValidationReport) {
        let policy = &config.confirmation_policy;

        if !policy.emergency_actions_manual {
            report.error(
                "EMERGENCY_AUTO_RESUME",
                "confirmation_policy.emergency_actions_manual",
                "Emergency actions must require manual confirmation".to_string(),
                "false".to_string(),
                "true".to_string(),
            );
        }

        if !policy.first_n_trades_manual {
            report.warning(
                "FIRST_TRADES_UNSUPERVISED",
                "confirmation_policy.first_n_trades_manual",
                "First trades of a deployment will run unsupervised".to_string(),
                "false".to_string(),
                "true".to_string(),
            );
        }
    }

    fn check_sizing(&self, config: &RuntimeConfig, report: &mut ValidationReport) {
        let sizing = &config.sizing;

        for (field, value) in [
            ("sizing.base_fraction", sizing.base_fraction),
            ("sizing.min_fraction", sizing.min_fraction),
            ("sizing.max_fraction", sizing.max_fraction),
            ("sizing.min_confidence", sizing.min_confidence),
        ] {
            if value <= 0.0 || value > 1.0 {
                report.error(
                    "SIZING_FRACTION_OUT_OF_RANGE",
                    field,
                    format!("{field} = {value} outside (0, 1]"),
                    value.to_string(),
                    "(0, 1]".to_string(),
                );
            }
        }

        if sizing.min_fraction > sizing.max_fraction {
            report.error(
                "SIZING_FRACTIONS_INVERTED",
                "sizing.min_fraction",
                format!(
                    "min_fraction {} exceeds max_fraction {}",
                    sizing.min_fraction, sizing.max_fraction
                ),
                sizing.min_fraction.to_string(),
                format!("<= {}", sizing.max_fraction),
            );
        }

        if sizing.max_fraction > config.safety_limits.max_position_size_pct {
            report.warning(
                "SIZING_MAX_ABOVE_POSITION_CAP",
                "sizing.max_fraction",
                format!(
                    "max_fraction {} above max_position_size_pct {}; the tighter cap applies",
                    sizing.max_fraction, config.safety_limits.max_position_size_pct
                ),
                sizing.max_fraction.to_string(),
                format!("<= {}", config.safety_limits.max_position_size_pct),
            );
        }
    }

    fn check_credentials(&self, config: &RuntimeConfig, report: &mut ValidationReport) {
        for (field, reference) in [
            (
                "credential_refs.api_key_ref",
                &config.credential_refs.api_key_ref,
            ),
            (
                "credential_refs.api_secret_ref",
                &config.credential_refs.api_secret_ref,
            ),
        ] {
            if reference.trim().is_empty() {
                report.error(
                    "CREDENTIAL_REF_MISSING",
                    field,
                    format!("{field} is empty; a resolvable reference name is required"),
                    "<empty>".to_string(),
                    "non-empty reference".to_string(),
                );
            }
        }
    }

    fn check_paths(&self, config: &RuntimeConfig, report: &mut ValidationReport) {
        Self::check_writable_parent("state_path", &config.state_path, report);
        Self::check_writable_parent("log_path", &config.log_path, report);
    }

    fn check_writable_parent(field: &str, path: &Path, report: &mut ValidationReport) {
        let Some(parent) = path.parent() else {
            report.error(
                "PATH_UNAVAILABLE",
                field,
                format!("{field} has no usable parent directory"),
                path.display().to_string(),
                "path with a creatable parent".to_string(),
            );
            return;
        };

        // Empty parent means the current working directory.
        if parent.as_os_str().is_empty() || parent.exists() {
            return;
        }

        if let Err(e) = std::fs::create_dir_all(parent) {
            report.error(
                "PATH_UNAVAILABLE",
                field,
                format!("Cannot create parent directory for {field}: {e}"),
                path.display().to_string(),
                "creatable parent directory".to_string(),
            );
        }
    }

    fn check_exposure_arithmetic(&self, config: &RuntimeConfig, report: &mut ValidationReport) {
        let limits = &config.safety_limits;
        let open_positions = f64::from(limits.max_open_positions);

        let pct_exposure = limits.max_position_size_pct * open_positions;
        if pct_exposure > 1.0 {
            report.warning(
                "POSITION_EXPOSURE_OVERCOMMITTED",
                "safety_limits.max_position_size_pct",
                format!(
                    "Fully deployed exposure {:.0}% of capital across {} positions",
                    pct_exposure * 100.0,
                    limits.max_open_positions
                ),
                format!("{pct_exposure:.2}"),
                "<= 1.0".to_string(),
            );
        }

        let abs_exposure = limits.max_position_size_abs * Decimal::from(limits.max_open_positions);
        if abs_exposure > config.initial_capital {
            report.warning(
                "ABS_EXPOSURE_EXCEEDS_CAPITAL",
                "safety_limits.max_position_size_abs",
                format!(
                    "Absolute exposure cap {} across {} positions exceeds initial capital {}",
                    abs_exposure, limits.max_open_positions, config.initial_capital
                ),
                abs_exposure.to_string(),
                format!("<= {}", config.initial_capital),
            );
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
