//! Trade signal types proposed by upstream strategy code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TradeSide;

/// Proposed action for a trading cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalAction {
    /// Enter a long position.
    Buy,
    /// Enter a short position (or exit a long).
    Sell,
    /// No trade for this cycle.
    Hold,
}

impl SignalAction {
    /// Returns true if this action requests an order.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        !matches!(self, Self::Hold)
    }

    /// Maps the action to an order side, when one exists.
    #[must_use]
    pub const fn to_side(self) -> Option<TradeSide> {
        match self {
            Self::Buy => Some(TradeSide::Buy),
            Self::Sell => Some(TradeSide::Sell),
            Self::Hold => None,
        }
    }
}

/// A proposed trade for one cycle.
///
/// Signals are ephemeral: consumed by a single gate evaluation and never
/// stored. How the signal was produced is outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSignal {
    /// Instrument symbol (non-empty).
    pub symbol: String,
    /// Proposed action.
    pub action: SignalAction,
    /// Model confidence in [0.0, 1.0].
    pub confidence: f64,
    /// When the signal was generated.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_is_actionable() {
        assert!(SignalAction::Buy.is_actionable());
        assert!(SignalAction::Sell.is_actionable());
        assert!(!SignalAction::Hold.is_actionable());
    }

    #[test]
    fn test_action_to_side() {
        assert_eq!(SignalAction::Buy.to_side(), Some(TradeSide::Buy));
        assert_eq!(SignalAction::Sell.to_side(), Some(TradeSide::Sell));
        assert_eq!(SignalAction::Hold.to_side(), None);
    }

    #[test]
    fn test_signal_serde_round_trip() {
        let signal = TradeSignal {
            symbol: "BTC-USD".to_string(),
            action: SignalAction::Buy,
            confidence: 0.8,
            timestamp: Utc::now(),
        };
        let json = match serde_json::to_string(&signal) {
            Ok(j) => j,
            Err(e) => panic!("signal should serialize: {e}"),
        };
        assert!(json.contains("\"BUY\""));
        let back: TradeSignal = match serde_json::from_str(&json) {
            Ok(s) => s,
            Err(e) => panic!("signal should deserialize: {e}"),
        };
        assert_eq!(back.symbol, "BTC-USD");
        assert_eq!(back.action, SignalAction::Buy);
    }
}
