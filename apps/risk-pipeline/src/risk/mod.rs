//! Risk gating and position sizing.
//!
//! The gate decides whether a signal may trade at all; the sizer decides how
//! much. Both are pure over ledger state and configuration, which keeps
//! every admission decision replayable from logs.

mod gate;
mod sizing;

pub use gate::RiskGate;
pub use sizing::{PositionSizer, SizingInput, SizingResult};

use rust_decimal::Decimal;

/// Converts a configured fraction into `Decimal` at the money boundary.
/// Fractions live in config as `f64`; all arithmetic on capital is exact.
pub(crate) fn decimal_from_f64(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}
