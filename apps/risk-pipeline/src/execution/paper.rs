//! Deterministic paper order sink.
//!
//! Simulates fills without touching a venue. Every output is a pure
//! function of the configured price table, the fee rate, and the scripted
//! outcome queue; there is no randomness anywhere, so paper runs replay
//! identically.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{OrderRecord, TradeSide};

use super::sink::{OrderSink, OrderSinkError};

/// Paper sink with a fixed price table and a basis-point fee.
///
/// Round-trip outcomes come from a scripted queue so tests and demos can
/// drive wins and losses deterministically; once the queue is empty every
/// round trip settles flat and the fee is the whole loss.
#[derive(Debug)]
pub struct PaperOrderSink {
    order_counter: AtomicU64,
    prices: HashMap<String, Decimal>,
    default_price: Decimal,
    fee_bps: Decimal,
    outcomes: Mutex<VecDeque<Decimal>>,
}

impl PaperOrderSink {
    /// Creates a sink with an empty price table and a 10 bps fee.
    #[must_use]
    pub fn new() -> Self {
        Self {
            order_counter: AtomicU64::new(1),
            prices: HashMap::new(),
            default_price: Decimal::from(100),
            fee_bps: Decimal::from(10),
            outcomes: Mutex::new(VecDeque::new()),
        }
    }

    /// Pins the fill price for a symbol.
    #[must_use]
    pub fn with_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }

    /// Overrides the fee rate in basis points of notional.
    #[must_use]
    pub fn with_fee_bps(mut self, fee_bps: Decimal) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    /// Queues round-trip outcomes, consumed one per fill in order.
    #[must_use]
    pub fn with_outcomes<I>(self, outcomes: I) -> Self
    where
        I: IntoIterator<Item = Decimal>,
    {
        if let Ok(mut queue) = self.outcomes.lock() {
            queue.extend(outcomes);
        }
        self
    }
}

impl Default for PaperOrderSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderSink for PaperOrderSink {
    async fn place_market_order(
        &self,
        symbol: &str,
        side: TradeSide,
        notional: Decimal,
        correlation_id: Uuid,
    ) -> Result<OrderRecord, OrderSinkError> {
        if notional <= Decimal::ZERO {
            return Err(OrderSinkError::Rejected(
                "notional must be positive".to_string(),
            ));
        }

        let order_id = self.order_counter.fetch_add(1, Ordering::SeqCst);
        let fill_price = self
            .prices
            .get(symbol)
            .copied()
            .unwrap_or(self.default_price);
        let fee = notional * self.fee_bps / Decimal::from(10_000);
        let scripted = self
            .outcomes
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());
        let pnl = scripted.unwrap_or(-fee);

        Ok(OrderRecord {
            order_id: format!("paper-{order_id}"),
            correlation_id,
            symbol: symbol.to_string(),
            side,
            notional,
            fill_price,
            fee,
            pnl,
            filled_at: Utc::now(),
        })
    }

    fn sink_name(&self) -> &'static str {
        "paper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_order_ids_are_sequential() {
        let sink = PaperOrderSink::new();

        let first = sink
            .place_market_order("ETH-USD", TradeSide::Buy, dec!(100), Uuid::new_v4())
            .await;
        let second = sink
            .place_market_order("ETH-USD", TradeSide::Buy, dec!(100), Uuid::new_v4())
            .await;

        match (first, second) {
            (Ok(a), Ok(b)) => {
                assert_eq!(a.order_id, "paper-1");
                assert_eq!(b.order_id, "paper-2");
            }
            other => panic!("both fills should succeed: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_price_table_and_default() {
        let sink = PaperOrderSink::new().with_price("ETH-USD", dec!(2500));

        let pinned = sink
            .place_market_order("ETH-USD", TradeSide::Buy, dec!(100), Uuid::new_v4())
            .await;
        let fallback = sink
            .place_market_order("SOL-USD", TradeSide::Buy, dec!(100), Uuid::new_v4())
            .await;

        match (pinned, fallback) {
            (Ok(a), Ok(b)) => {
                assert_eq!(a.fill_price, dec!(2500));
                assert_eq!(b.fill_price, dec!(100));
            }
            other => panic!("both fills should succeed: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fee_is_basis_points_of_notional() {
        let sink = PaperOrderSink::new();

        let record = match sink
            .place_market_order("ETH-USD", TradeSide::Buy, dec!(1000), Uuid::new_v4())
            .await
        {
            Ok(r) => r,
            Err(e) => panic!("fill should succeed: {e}"),
        };

        // 10 bps of 1000
        assert_eq!(record.fee, dec!(1));
        assert_eq!(record.pnl, dec!(-1));
    }

    #[tokio::test]
    async fn test_scripted_outcomes_are_consumed_in_order() {
        let sink = PaperOrderSink::new().with_outcomes([dec!(50), dec!(-20)]);

        let mut pnls = Vec::new();
        for _ in 0..3 {
            let record = match sink
                .place_market_order("ETH-USD", TradeSide::Buy, dec!(1000), Uuid::new_v4())
                .await
            {
                Ok(r) => r,
                Err(e) => panic!("fill should succeed: {e}"),
            };
            pnls.push(record.pnl);
        }

        // Queue first, then flat (fee-only) once exhausted.
        assert_eq!(pnls, vec![dec!(50), dec!(-20), dec!(-1)]);
    }

    #[tokio::test]
    async fn test_non_positive_notional_is_rejected() {
        let sink = PaperOrderSink::new();
        let result = sink
            .place_market_order("ETH-USD", TradeSide::Buy, Decimal::ZERO, Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(OrderSinkError::Rejected(_))));
    }

    #[test]
    fn test_sink_name() {
        assert_eq!(PaperOrderSink::new().sink_name(), "paper");
    }
}
