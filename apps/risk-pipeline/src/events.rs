//! Pipeline lifecycle events.
//!
//! Every externally meaningful state transition is announced as a
//! [`PipelineEvent`] through an [`EventSink`]. The default sink writes
//! structured log lines; tests capture events in memory. Emission is
//! fire-and-forget: a sink must never block or fail the cycle that
//! produced the event.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ClosedTrade, PositionDecision};

/// State transitions announced by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineEvent {
    /// The gate refused a signal.
    DecisionRejected {
        /// The rejected decision, reason included.
        decision: PositionDecision,
    },
    /// A fill closed and was applied to the ledger.
    TradeClosed {
        /// The applied trade.
        trade: ClosedTrade,
    },
    /// An accepted decision failed to fill.
    ExecutionFailed {
        /// Correlation ID of the failed decision.
        correlation_id: Uuid,
        /// Instrument symbol.
        symbol: String,
        /// Failure rendered for operators.
        error: String,
    },
    /// The trading halt latched.
    EmergencyStopTripped {
        /// Why the halt latched.
        reason: String,
    },
    /// Daily counters reset for a new session date.
    DayRolled {
        /// The new session date.
        date: NaiveDate,
    },
}

impl PipelineEvent {
    /// Stable machine-readable name for this event.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::DecisionRejected { .. } => "DECISION_REJECTED",
            Self::TradeClosed { .. } => "TRADE_CLOSED",
            Self::ExecutionFailed { .. } => "EXECUTION_FAILED",
            Self::EmergencyStopTripped { .. } => "EMERGENCY_STOP_TRIPPED",
            Self::DayRolled { .. } => "DAY_ROLLED",
        }
    }
}

/// Receives pipeline events.
pub trait EventSink: Send + Sync {
    /// Delivers one event. Must not block.
    fn emit(&self, event: &PipelineEvent);
}

/// Sink that renders each event as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: &PipelineEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => {
                tracing::info!(event = event.event_type(), %payload, "pipeline event");
            }
            Err(error) => {
                tracing::warn!(
                    event = event.event_type(),
                    %error,
                    "pipeline event failed to serialize"
                );
            }
        }
    }
}

/// Sink that buffers events in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: std::sync::Mutex<Vec<PipelineEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    #[must_use]
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Event type names in emission order.
    #[must_use]
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events().iter().map(PipelineEvent::event_type).collect()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: &PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
