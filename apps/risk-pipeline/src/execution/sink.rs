//! Order sink trait definition.
//!
//! An order sink is the boundary where an approved decision leaves the
//! pipeline. Implementations wrap a venue connection or a paper simulator;
//! the engine only relies on the error taxonomy below to decide whether an
//! attempt may be retried.
//!
//! # Retryable vs Terminal
//!
//! | Retryable | Terminal |
//! |-----------|----------|
//! | Timeout in transit | Unknown symbol |
//! | Venue rate limit | Insufficient balance |
//! | Connection failure | Rejected by the venue |

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{OrderRecord, TradeSide};

/// Errors from order placement.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderSinkError {
    /// Request timed out in transit; fill state unknown.
    #[error("order request timed out")]
    Timeout,

    /// Venue rate limit hit.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds the venue asked us to wait.
        retry_after_secs: u64,
    },

    /// Transport-level failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// Venue does not know the symbol.
    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Account cannot cover the order.
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Notional the order needed.
        required: Decimal,
        /// Balance the venue reported.
        available: Decimal,
    },

    /// Venue rejected the order outright.
    #[error("order rejected: {0}")]
    Rejected(String),
}

impl OrderSinkError {
    /// True when a later attempt may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::RateLimited { .. } | Self::Connection(_)
        )
    }
}

/// Destination for approved orders.
///
/// Implementations must treat `correlation_id` as the idempotency key for
/// the order: the engine guarantees it never asks for a second fill under
/// the same id, and sinks should carry the id through to the venue where
/// the protocol allows it.
#[async_trait]
pub trait OrderSink: Send + Sync {
    /// Places a market order for the given notional.
    ///
    /// # Errors
    ///
    /// Returns an `OrderSinkError`; the engine retries only the variants
    /// `is_retryable` admits.
    async fn place_market_order(
        &self,
        symbol: &str,
        side: TradeSide,
        notional: Decimal,
        correlation_id: Uuid,
    ) -> Result<OrderRecord, OrderSinkError>;

    /// Sink name for logging.
    fn sink_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transient_errors_are_retryable() {
        assert!(OrderSinkError::Timeout.is_retryable());
        assert!(
            OrderSinkError::RateLimited {
                retry_after_secs: 5
            }
            .is_retryable()
        );
        assert!(OrderSinkError::Connection("reset by peer".to_string()).is_retryable());
    }

    #[test]
    fn test_business_errors_are_terminal() {
        assert!(!OrderSinkError::InvalidSymbol("NOPE".to_string()).is_retryable());
        assert!(
            !OrderSinkError::InsufficientBalance {
                required: dec!(500),
                available: dec!(100),
            }
            .is_retryable()
        );
        assert!(!OrderSinkError::Rejected("risk desk said no".to_string()).is_retryable());
    }
}
