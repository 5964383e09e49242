//! Fill and closed-trade records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TradeSide;

/// A successful fill reported by an order sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Order ID assigned by the sink.
    pub order_id: String,
    /// Correlation ID from the originating decision.
    pub correlation_id: Uuid,
    /// Instrument symbol.
    pub symbol: String,
    /// Order side.
    pub side: TradeSide,
    /// Filled notional amount.
    pub notional: Decimal,
    /// Fill price.
    pub fill_price: Decimal,
    /// Fee charged by the venue.
    pub fee: Decimal,
    /// Realized outcome of the round trip, net of fees. Simulated by paper
    /// sinks, reported by the venue otherwise.
    pub pnl: Decimal,
    /// Fill timestamp.
    pub filled_at: DateTime<Utc>,
}

/// A completed round trip applied to the performance ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedTrade {
    /// Correlation ID from the originating decision.
    pub correlation_id: Uuid,
    /// Instrument symbol.
    pub symbol: String,
    /// Order side.
    pub side: TradeSide,
    /// Notional amount traded.
    pub notional: Decimal,
    /// Fill price.
    pub fill_price: Decimal,
    /// Fee paid.
    pub fee: Decimal,
    /// Realized profit or loss (negative for losses), net of fees.
    pub pnl: Decimal,
    /// When the trade closed.
    pub closed_at: DateTime<Utc>,
}

impl ClosedTrade {
    /// Returns true if the trade realized a profit.
    #[must_use]
    pub fn is_win(&self) -> bool {
        self.pnl > Decimal::ZERO
    }
}

impl From<OrderRecord> for ClosedTrade {
    fn from(record: OrderRecord) -> Self {
        Self {
            correlation_id: record.correlation_id,
            symbol: record.symbol,
            side: record.side,
            notional: record.notional,
            fill_price: record.fill_price,
            fee: record.fee,
            pnl: record.pnl,
            closed_at: record.filled_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_trade(pnl: Decimal) -> ClosedTrade {
        ClosedTrade {
            correlation_id: Uuid::new_v4(),
            symbol: "SOL-USD".to_string(),
            side: TradeSide::Buy,
            notional: dec!(100),
            fill_price: dec!(25.50),
            fee: dec!(0.10),
            pnl,
            closed_at: Utc::now(),
        }
    }

    #[test]
    fn test_win_classification() {
        assert!(sample_trade(dec!(5)).is_win());
        assert!(!sample_trade(dec!(-5)).is_win());
        // Break-even counts as a loss for streak purposes.
        assert!(!sample_trade(Decimal::ZERO).is_win());
    }

    #[test]
    fn test_closed_trade_from_order_record() {
        let record = OrderRecord {
            order_id: "paper-1".to_string(),
            correlation_id: Uuid::new_v4(),
            symbol: "SOL-USD".to_string(),
            side: TradeSide::Sell,
            notional: dec!(200),
            fill_price: dec!(25.50),
            fee: dec!(0.20),
            pnl: dec!(-0.20),
            filled_at: Utc::now(),
        };

        let trade = ClosedTrade::from(record.clone());
        assert_eq!(trade.correlation_id, record.correlation_id);
        assert_eq!(trade.pnl, dec!(-0.20));
        assert_eq!(trade.closed_at, record.filled_at);
        assert!(!trade.is_win());
    }
}
