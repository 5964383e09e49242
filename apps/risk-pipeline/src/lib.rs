// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Risk Pipeline - Rust Core Library
//!
//! Deterministic risk-gated execution pipeline for the Keel trading system.
//!
//! # Flow
//!
//! A [`models::TradeSignal`] enters the [`pipeline::Pipeline`] once per
//! cycle and leaves as a [`pipeline::CycleOutcome`]:
//!
//! - **Gate**: [`risk::RiskGate`] checks signal shape, confidence,
//!   daily caps, the capital floor, and the loss cooldown against the
//!   [`ledger::PerformanceLedger`].
//! - **Sizing**: [`risk::PositionSizer`] scales the position by
//!   confidence and the consecutive-loss streak, clamped by the sizing
//!   band and the hard position caps.
//! - **Execution**: [`execution::ExecutionEngine`] places the order
//!   through an [`execution::OrderSink`] with bounded linear-backoff
//!   retries, idempotent per correlation ID.
//! - **Record**: the resulting [`models::ClosedTrade`] feeds the ledger,
//!   moving capital, streaks, and daily counters for the next cycle.
//!
//! Configuration is certified up front by [`config::ConfigValidator`];
//! an unsafe config never reaches the pipeline. The safety posture is
//! fail-closed: any breached limit rejects the cycle, and a breached
//! capital floor latches the process-wide [`safety::TradingHalt`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Modules
// =============================================================================

/// Injectable time source for daily resets and cooldowns.
pub mod clock;

/// Configuration loading and pre-flight validation.
pub mod config;

/// Pipeline lifecycle events and sinks.
pub mod events;

/// Order execution: sinks, retries, idempotence.
pub mod execution;

/// Rolling performance ledger.
pub mod ledger;

/// Core domain models: signals, decisions, trades.
pub mod models;

/// The signal-to-fill orchestrator.
pub mod pipeline;

/// Risk gating and position sizing.
pub mod risk;

/// The process-wide trading halt.
pub mod safety;

// =============================================================================
// Re-exports
// =============================================================================

// Domain models
pub use models::{
    ClosedTrade, OrderRecord, PositionDecision, RejectionReason, SignalAction, TradeSide,
    TradeSignal, TradingMode,
};

// Configuration
pub use config::{
    ConfigValidator, RuntimeConfig, ValidationReport, load_config, load_config_from_string,
};

// Pipeline assembly
pub use clock::{Clock, FixedClock, SystemClock};
pub use events::{EventSink, LogEventSink, MemoryEventSink, PipelineEvent};
pub use execution::{
    ExecutionEngine, ExecutionFailure, ExecutionResult, OrderSink, OrderSinkError, PaperOrderSink,
};
pub use ledger::PerformanceLedger;
pub use pipeline::{CycleOutcome, Pipeline, PipelineError};
pub use risk::{PositionSizer, RiskGate};
pub use safety::TradingHalt;
