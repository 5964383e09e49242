//! Order execution: sinks, retry, idempotence, and the engine.
//!
//! An accepted decision enters [`ExecutionEngine::execute`] and leaves as an
//! [`ExecutionResult`]: either a fill recorded in the [`FillRegistry`] or a
//! classified [`ExecutionFailure`]. Venues implement [`OrderSink`];
//! [`PaperOrderSink`] is the deterministic in-process implementation used
//! for paper trading and tests.

mod engine;
mod paper;
mod registry;
mod retry;
mod sink;

pub use engine::{ExecutionEngine, ExecutionFailure, ExecutionResult};
pub use paper::PaperOrderSink;
pub use registry::FillRegistry;
pub use retry::{LinearBackoff, RetryPolicy};
pub use sink::{OrderSink, OrderSinkError};
