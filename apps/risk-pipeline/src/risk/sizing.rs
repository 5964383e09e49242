//! Deterministic position sizing.
//!
//! Notional size is a pure function of current capital, signal confidence,
//! and the live loss streak. No randomness, no market data:
//!
//! - base allocation: `current_capital * base_fraction`
//! - confidence scales it linearly between 0.5x (confidence 0.0) and 1.5x
//!   (confidence 1.0)
//! - each consecutive loss shaves 10%, floored at a 50% penalty
//! - the resulting fraction is clamped into the configured band, then the
//!   notional is capped at the absolute position limit
//!
//! # Example
//!
//! ```rust,ignore
//! use risk_pipeline::risk::{PositionSizer, SizingInput};
//! use rust_decimal_macros::dec;
//!
//! let sizer = PositionSizer::from_config(&config);
//! let result = sizer.size(&SizingInput {
//!     current_capital: dec!(1000),
//!     confidence: 0.8,
//!     consecutive_losses: 0,
//! });
//! assert!(result.notional > dec!(0));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{RuntimeConfig, SizingConfig};

/// Per-loss reduction applied to the sized fraction.
const LOSS_PENALTY_STEP: f64 = 0.1;

/// The loss penalty never reduces size below half the confidence-scaled base.
const LOSS_PENALTY_FLOOR: f64 = 0.5;

// ============================================================================
// Input and Output
// ============================================================================

/// Ledger snapshot the sizer needs. Taken by value so the sizer stays a pure
/// function that is trivial to exercise in tests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SizingInput {
    /// Capital available right now.
    pub current_capital: Decimal,
    /// Signal confidence in `[0, 1]`. The gate screens shape before sizing.
    pub confidence: f64,
    /// Current consecutive loss count.
    pub consecutive_losses: u32,
}

/// Sized notional plus how the caps shaped it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingResult {
    /// Final notional amount for the order.
    pub notional: Decimal,
    /// Fraction of capital after band clamping (before the absolute cap).
    pub applied_fraction: f64,
    /// Whether any clamp or cap changed the raw result.
    pub was_capped: bool,
    /// Which cap applied, if any.
    pub cap_reason: Option<String>,
}

// ============================================================================
// Position Sizer
// ============================================================================

/// Confidence- and streak-aware position sizer.
#[derive(Debug, Clone)]
pub struct PositionSizer {
    sizing: SizingConfig,
    max_position_size_pct: f64,
    max_position_size_abs: Decimal,
}

impl PositionSizer {
    /// Builds a sizer from the runtime config, folding the position cap from
    /// the safety limits into the sizing band.
    #[must_use]
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            sizing: config.sizing.clone(),
            max_position_size_pct: config.safety_limits.max_position_size_pct,
            max_position_size_abs: config.safety_limits.max_position_size_abs,
        }
    }

    /// Calculates the notional size for an approved signal.
    ///
    /// Always returns a positive notional for positive capital; the fraction
    /// band has a positive lower bound.
    #[must_use]
    pub fn size(&self, input: &SizingInput) -> SizingResult {
        let confidence_multiplier = lerp(0.5, 1.5, input.confidence);
        let loss_penalty = (1.0
            - LOSS_PENALTY_STEP * f64::from(input.consecutive_losses))
        .max(LOSS_PENALTY_FLOOR);
        let raw_fraction = self.sizing.base_fraction * confidence_multiplier * loss_penalty;

        // The tighter of the sizing band ceiling and the safety position cap
        // wins; the ceiling also wins over an inverted band.
        let effective_max = self.sizing.max_fraction.min(self.max_position_size_pct);
        let clamped_fraction = raw_fraction.max(self.sizing.min_fraction).min(effective_max);

        let mut was_capped = (clamped_fraction - raw_fraction).abs() > f64::EPSILON;
        let mut cap_reason = was_capped.then(|| {
            if raw_fraction < clamped_fraction {
                format!("raised to minimum fraction {}", self.sizing.min_fraction)
            } else {
                format!("clamped to maximum fraction {effective_max}")
            }
        });

        // Single f64 -> Decimal crossing; everything monetary stays Decimal
        // from here on.
        let fraction = super::decimal_from_f64(clamped_fraction);
        let mut notional = input.current_capital * fraction;

        if notional > self.max_position_size_abs {
            was_capped = true;
            cap_reason = Some(format!(
                "capped at absolute position limit {}",
                self.max_position_size_abs
            ));
            notional = self.max_position_size_abs;
        }

        SizingResult {
            notional,
            applied_fraction: clamped_fraction,
            was_capped,
            cap_reason,
        }
    }
}

/// Linear interpolation between `lo` and `hi` at parameter `t`.
fn lerp(lo: f64, hi: f64, t: f64) -> f64 {
    lo + (hi - lo) * t
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn sizer(sizing: SizingConfig, max_pct: f64, max_abs: Decimal) -> PositionSizer {
        PositionSizer {
            sizing,
            max_position_size_pct: max_pct,
            max_position_size_abs: max_abs,
        }
    }

    fn wide_band() -> SizingConfig {
        SizingConfig {
            base_fraction: 0.25,
            min_fraction: 0.05,
            max_fraction: 0.50,
            min_confidence: 0.55,
        }
    }

    #[test]
    fn test_confidence_scales_base_allocation() {
        let s = sizer(wide_band(), 0.50, dec!(100000));
        let input = SizingInput {
            current_capital: dec!(1000),
            confidence: 0.8,
            consecutive_losses: 0,
        };

        // 1000 * 0.25 * (0.5 + 0.8) = 325
        let result = s.size(&input);
        assert_eq!(result.notional, dec!(325));
        assert!(!result.was_capped);
        assert!(result.cap_reason.is_none());
    }

    #[test]
    fn test_sized_within_band_for_mid_confidence() {
        let config = SizingConfig {
            base_fraction: 0.25,
            min_fraction: 0.25,
            max_fraction: 0.35,
            min_confidence: 0.55,
        };
        let s = sizer(config, 0.50, dec!(100000));
        let result = s.size(&SizingInput {
            current_capital: dec!(1000),
            confidence: 0.8,
            consecutive_losses: 0,
        });

        assert!(result.notional >= dec!(250));
        assert!(result.notional <= dec!(350));
        assert_eq!(result.notional, dec!(325));
    }

    #[test]
    fn test_each_loss_shaves_ten_percent() {
        let s = sizer(wide_band(), 0.50, dec!(100000));
        let result = s.size(&SizingInput {
            current_capital: dec!(1000),
            confidence: 0.8,
            consecutive_losses: 2,
        });

        // 1000 * 0.25 * 1.3 * 0.8 = 260
        assert_eq!(result.notional, dec!(260));
    }

    #[test]
    fn test_loss_penalty_floors_at_half() {
        let s = sizer(wide_band(), 0.50, dec!(100000));
        let ten_losses = s.size(&SizingInput {
            current_capital: dec!(1000),
            confidence: 0.8,
            consecutive_losses: 10,
        });
        let twenty_losses = s.size(&SizingInput {
            current_capital: dec!(1000),
            confidence: 0.8,
            consecutive_losses: 20,
        });

        // 1000 * 0.25 * 1.3 * 0.5 = 162.5 for both
        assert_eq!(ten_losses.notional, dec!(162.5));
        assert_eq!(twenty_losses.notional, ten_losses.notional);
    }

    #[test]
    fn test_minimum_fraction_raises_small_results() {
        let config = SizingConfig {
            base_fraction: 0.25,
            min_fraction: 0.15,
            max_fraction: 0.50,
            min_confidence: 0.55,
        };
        let s = sizer(config, 0.50, dec!(100000));
        let result = s.size(&SizingInput {
            current_capital: dec!(1000),
            confidence: 0.0,
            consecutive_losses: 0,
        });

        // raw 0.25 * 0.5 = 0.125, raised to 0.15
        assert_eq!(result.notional, dec!(150));
        assert!(result.was_capped);
        let reason = match result.cap_reason {
            Some(r) => r,
            None => panic!("capped result should carry a reason"),
        };
        assert!(reason.contains("minimum"));
    }

    #[test]
    fn test_position_cap_tightens_the_band() {
        let s = sizer(wide_band(), 0.10, dec!(100000));
        let result = s.size(&SizingInput {
            current_capital: dec!(10000),
            confidence: 1.0,
            consecutive_losses: 0,
        });

        // raw 0.25 * 1.5 = 0.375, but the safety cap holds the band at 0.10
        assert_eq!(result.notional, dec!(1000));
        assert!(result.was_capped);
        assert!((result.applied_fraction - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_absolute_cap_binds_last() {
        let s = sizer(wide_band(), 0.50, dec!(1000));
        let result = s.size(&SizingInput {
            current_capital: dec!(100000),
            confidence: 0.8,
            consecutive_losses: 0,
        });

        assert_eq!(result.notional, dec!(1000));
        assert!(result.was_capped);
        let reason = match result.cap_reason {
            Some(r) => r,
            None => panic!("capped result should carry a reason"),
        };
        assert!(reason.contains("absolute"));
    }

    #[test]
    fn test_sizing_is_deterministic() {
        let s = sizer(wide_band(), 0.50, dec!(100000));
        let input = SizingInput {
            current_capital: dec!(12345.67),
            confidence: 0.71,
            consecutive_losses: 1,
        };
        assert_eq!(s.size(&input).notional, s.size(&input).notional);
    }

    proptest! {
        #[test]
        fn prop_notional_respects_every_cap(
            capital in 100u32..1_000_000,
            confidence in 0.0f64..=1.0,
            losses in 0u32..25,
        ) {
            let max_abs = dec!(50000);
            let s = sizer(wide_band(), 0.10, max_abs);
            let capital = Decimal::from(capital);
            let result = s.size(&SizingInput {
                current_capital: capital,
                confidence,
                consecutive_losses: losses,
            });

            prop_assert!(result.notional > Decimal::ZERO);
            prop_assert!(result.notional <= max_abs);
            prop_assert!(result.notional <= capital * dec!(0.10));
        }
    }
}
