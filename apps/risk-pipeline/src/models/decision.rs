//! Gated position decisions produced by the risk gate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    /// Buy order.
    Buy,
    /// Sell order.
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Why the gate refused a signal.
///
/// Every variant carries the observed values so rejections are actionable
/// in logs without replaying the cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    /// Signal was `HOLD`; nothing to do this cycle.
    NoAction,
    /// Signal failed shape validation.
    MalformedSignal {
        /// What was wrong with the signal.
        detail: String,
    },
    /// Confidence below the effective threshold.
    LowConfidence {
        /// Observed signal confidence.
        confidence: f64,
        /// Effective threshold (may be tightened after losses).
        threshold: f64,
    },
    /// Daily trade count already at the configured cap.
    DailyTradeCapReached {
        /// Trades already taken today.
        count: u32,
        /// Configured daily maximum.
        max: u32,
    },
    /// Daily realized loss at or past the configured limit.
    DailyLossBreached {
        /// Today's realized PnL.
        daily_pnl: Decimal,
        /// Loss limit that was breached (absolute, positive).
        limit: Decimal,
    },
    /// Capital at or below the emergency floor. Trading must halt.
    EmergencyStop {
        /// Current capital.
        current_capital: Decimal,
        /// Emergency floor.
        floor: Decimal,
    },
    /// Loss streak at the maximum and the cooldown window has not elapsed.
    CooldownActive {
        /// Current consecutive loss count.
        consecutive_losses: u32,
        /// Minutes until trading may resume.
        remaining_minutes: i64,
    },
}

impl RejectionReason {
    /// Stable machine-readable code for this rejection.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoAction => "NO_ACTION",
            Self::MalformedSignal { .. } => "MALFORMED_SIGNAL",
            Self::LowConfidence { .. } => "LOW_CONFIDENCE",
            Self::DailyTradeCapReached { .. } => "DAILY_TRADE_CAP_REACHED",
            Self::DailyLossBreached { .. } => "DAILY_LOSS_BREACHED",
            Self::EmergencyStop { .. } => "EMERGENCY_STOP",
            Self::CooldownActive { .. } => "COOLDOWN_ACTIVE",
        }
    }

    /// Returns true if this rejection must latch the trading halt.
    #[must_use]
    pub const fn is_emergency(&self) -> bool {
        matches!(self, Self::EmergencyStop { .. })
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAction => write!(f, "signal requested no action"),
            Self::MalformedSignal { detail } => write!(f, "malformed signal: {detail}"),
            Self::LowConfidence {
                confidence,
                threshold,
            } => write!(
                f,
                "confidence {confidence:.4} below effective threshold {threshold:.4}"
            ),
            Self::DailyTradeCapReached { count, max } => {
                write!(f, "daily trade cap reached: {count} of {max}")
            }
            Self::DailyLossBreached { daily_pnl, limit } => {
                write!(f, "daily loss limit breached: pnl {daily_pnl}, limit -{limit}")
            }
            Self::EmergencyStop {
                current_capital,
                floor,
            } => write!(
                f,
                "emergency stop: capital {current_capital} at or below floor {floor}"
            ),
            Self::CooldownActive {
                consecutive_losses,
                remaining_minutes,
            } => write!(
                f,
                "cooldown active after {consecutive_losses} consecutive losses, {remaining_minutes}m remaining"
            ),
        }
    }
}

/// The outcome of gating one trade signal.
///
/// Constructed once per signal and discarded after the execution attempt
/// reaches a terminal state. An accepted decision always carries a side and
/// a positive notional no larger than current capital.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionDecision {
    /// Correlation ID tying the decision to its order attempts.
    pub correlation_id: Uuid,
    /// Instrument symbol.
    pub symbol: String,
    /// Order side. Absent when the signal carried no direction (`HOLD`).
    pub side: Option<TradeSide>,
    /// Sized notional amount. Zero for rejected decisions.
    pub notional_size: Decimal,
    /// Confidence carried over from the signal.
    pub confidence: f64,
    /// Whether the gate approved the trade.
    pub accepted: bool,
    /// Populated when `accepted` is false.
    pub rejection_reason: Option<RejectionReason>,
}

impl PositionDecision {
    /// Builds an approved decision with a fresh correlation ID.
    #[must_use]
    pub fn approved(
        symbol: impl Into<String>,
        side: TradeSide,
        notional_size: Decimal,
        confidence: f64,
    ) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            symbol: symbol.into(),
            side: Some(side),
            notional_size,
            confidence,
            accepted: true,
            rejection_reason: None,
        }
    }

    /// Builds a rejected decision.
    #[must_use]
    pub fn rejected(
        symbol: impl Into<String>,
        side: Option<TradeSide>,
        confidence: f64,
        reason: RejectionReason,
    ) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            symbol: symbol.into(),
            side,
            notional_size: Decimal::ZERO,
            confidence,
            accepted: false,
            rejection_reason: Some(reason),
        }
    }
}
