//! Per-trade risk management configuration.

use serde::{Deserialize, Serialize};

/// Stop-loss and take-profit settings applied to every position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskManagementConfig {
    /// Stop-loss as a fraction of entry notional.
    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,
    /// Take-profit as a fraction of entry notional.
    #[serde(default = "default_take_profit_pct")]
    pub take_profit_pct: f64,
    /// Whether the stop trails price in the position's favor.
    #[serde(default)]
    pub trailing_stop_enabled: bool,
}

impl Default for RiskManagementConfig {
    fn default() -> Self {
        Self {
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: default_take_profit_pct(),
            trailing_stop_enabled: false,
        }
    }
}

const fn default_stop_loss_pct() -> f64 {
    0.02
}

const fn default_take_profit_pct() -> f64 {
    0.05
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_management_defaults() {
        let config = RiskManagementConfig::default();
        assert!((config.stop_loss_pct - 0.02).abs() < f64::EPSILON);
        assert!((config.take_profit_pct - 0.05).abs() < f64::EPSILON);
        assert!(!config.trailing_stop_enabled);
        // Default reward:risk stays above the 2x advisory ratio.
        assert!(config.take_profit_pct >= 2.0 * config.stop_loss_pct);
    }
}
