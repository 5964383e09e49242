//! Core domain models for the risk pipeline.
//!
//! These types define the data structures flowing through a trading cycle:
//! the proposed signal, the gated decision, and the closed-trade records
//! that feed the performance ledger.

mod decision;
mod mode;
mod signal;
mod trade;

pub use decision::{PositionDecision, RejectionReason, TradeSide};
pub use mode::TradingMode;
pub use signal::{SignalAction, TradeSignal};
pub use trade::{ClosedTrade, OrderRecord};
