//! Fill registry for idempotent order placement.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::models::OrderRecord;

/// Completed fills indexed by correlation ID.
///
/// Consulted before any order leaves the engine: a decision whose fill is
/// already on record can never place a second order, however the attempt
/// loop was re-entered.
#[derive(Debug, Default)]
pub struct FillRegistry {
    fills: RwLock<HashMap<Uuid, OrderRecord>>,
}

impl FillRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed fill.
    pub fn record(&self, fill: OrderRecord) {
        if let Ok(mut fills) = self.fills.write() {
            fills.insert(fill.correlation_id, fill);
        }
    }

    /// Looks up the recorded fill for a decision.
    #[must_use]
    pub fn get(&self, correlation_id: Uuid) -> Option<OrderRecord> {
        self.fills
            .read()
            .ok()
            .and_then(|fills| fills.get(&correlation_id).cloned())
    }

    /// Number of recorded fills.
    #[must_use]
    pub fn count(&self) -> usize {
        self.fills.read().map(|fills| fills.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use crate::models::TradeSide;

    fn fill(correlation_id: Uuid, order_id: &str) -> OrderRecord {
        OrderRecord {
            order_id: order_id.to_string(),
            correlation_id,
            symbol: "ETH-USD".to_string(),
            side: TradeSide::Buy,
            notional: dec!(250),
            fill_price: dec!(2000),
            fee: dec!(0.25),
            pnl: dec!(-0.25),
            filled_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_and_get() {
        let registry = FillRegistry::new();
        let id = Uuid::new_v4();
        registry.record(fill(id, "order-1"));

        let recorded = match registry.get(id) {
            Some(r) => r,
            None => panic!("fill should be recorded"),
        };
        assert_eq!(recorded.order_id, "order-1");
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_unknown_id_is_absent() {
        let registry = FillRegistry::new();
        assert!(registry.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_rerecording_same_id_keeps_one_entry() {
        let registry = FillRegistry::new();
        let id = Uuid::new_v4();
        registry.record(fill(id, "order-1"));
        registry.record(fill(id, "order-1"));
        assert_eq!(registry.count(), 1);
    }
}
