//! Safety limit configuration gating every trading cycle.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Hard limits protecting capital. All percentages are fractions in (0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyLimits {
    /// Daily realized-loss limit as a fraction of initial capital.
    #[serde(default = "default_daily_loss_limit_pct")]
    pub daily_loss_limit_pct: f64,
    /// Daily realized-loss limit in account currency.
    #[serde(default = "default_daily_loss_limit_abs")]
    pub daily_loss_limit_abs: Decimal,
    /// Drawdown fraction of initial capital that halts all trading.
    #[serde(default = "default_emergency_stop_pct")]
    pub emergency_stop_pct: f64,
    /// Absolute capital floor equivalent for the emergency stop.
    #[serde(default = "default_emergency_stop_abs")]
    pub emergency_stop_abs: Decimal,
    /// Largest single position as a fraction of current capital.
    #[serde(default = "default_max_position_size_pct")]
    pub max_position_size_pct: f64,
    /// Largest single position in account currency.
    #[serde(default = "default_max_position_size_abs")]
    pub max_position_size_abs: Decimal,
    /// Consecutive losses that trigger the cooldown.
    #[serde(default = "default_consecutive_losses_max")]
    pub consecutive_losses_max: u32,
    /// Maximum trades per calendar day.
    #[serde(default = "default_max_daily_trades")]
    pub max_daily_trades: u32,
    /// Minutes the cooldown lasts after the loss streak hits its cap.
    #[serde(default = "default_loss_cooldown_minutes")]
    pub loss_cooldown_minutes: u32,
    /// Maximum simultaneously open positions (exposure arithmetic only;
    /// the single-cycle pipeline holds at most one).
    #[serde(default = "default_max_open_positions")]
    pub max_open_positions: u32,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            daily_loss_limit_pct: default_daily_loss_limit_pct(),
            daily_loss_limit_abs: default_daily_loss_limit_abs(),
            emergency_stop_pct: default_emergency_stop_pct(),
            emergency_stop_abs: default_emergency_stop_abs(),
            max_position_size_pct: default_max_position_size_pct(),
            max_position_size_abs: default_max_position_size_abs(),
            consecutive_losses_max: default_consecutive_losses_max(),
            max_daily_trades: default_max_daily_trades(),
            loss_cooldown_minutes: default_loss_cooldown_minutes(),
            max_open_positions: default_max_open_positions(),
        }
    }
}

const fn default_daily_loss_limit_pct() -> f64 {
    0.05
}

fn default_daily_loss_limit_abs() -> Decimal {
    Decimal::from(500)
}

const fn default_emergency_stop_pct() -> f64 {
    0.30
}

fn default_emergency_stop_abs() -> Decimal {
    Decimal::from(3000)
}

const fn default_max_position_size_pct() -> f64 {
    0.10
}

fn default_max_position_size_abs() -> Decimal {
    Decimal::from(1000)
}

const fn default_consecutive_losses_max() -> u32 {
    3
}

const fn default_max_daily_trades() -> u32 {
    10
}

const fn default_loss_cooldown_minutes() -> u32 {
    30
}

const fn default_max_open_positions() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_safety_limits_defaults() {
        let limits = SafetyLimits::default();
        assert!((limits.daily_loss_limit_pct - 0.05).abs() < f64::EPSILON);
        assert_eq!(limits.daily_loss_limit_abs, dec!(500));
        assert!((limits.emergency_stop_pct - 0.30).abs() < f64::EPSILON);
        assert_eq!(limits.consecutive_losses_max, 3);
        assert_eq!(limits.max_daily_trades, 10);
        assert_eq!(limits.loss_cooldown_minutes, 30);
    }
}
