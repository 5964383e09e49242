//! Signal-to-fill orchestration.
//!
//! [`Pipeline`] wires the gate, sizer, engine, and ledger into one
//! sequential trading loop. Each cycle:
//!
//! 1. Refuses outright when the trading halt is latched.
//! 2. Rolls the ledger's daily counters when the calendar day advanced.
//! 3. Gates the signal against safety limits and portfolio state.
//! 4. Executes an accepted decision against the order sink.
//! 5. Applies the resulting closed trade to the ledger.
//!
//! The pipeline holds the only mutable reference to the ledger; every
//! other component reads it during evaluation. An emergency rejection
//! latches the halt before its events are emitted, so no later cycle can
//! race past the floor check.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::clock::Clock;
use crate::config::RuntimeConfig;
use crate::events::{EventSink, PipelineEvent};
use crate::execution::{ExecutionEngine, ExecutionFailure, ExecutionResult, OrderSink};
use crate::ledger::PerformanceLedger;
use crate::models::{ClosedTrade, PositionDecision, TradeSignal};
use crate::risk::RiskGate;
use crate::safety::TradingHalt;

/// Pipeline-level errors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The trading halt is latched; no further cycles will run.
    #[error("trading halted: {reason}")]
    EmergencyStopTriggered {
        /// Why the halt latched.
        reason: String,
    },
}

/// What one trading cycle produced.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The gate refused the signal.
    Rejected(PositionDecision),
    /// The decision filled and the trade was applied to the ledger.
    Filled {
        /// The accepted decision.
        decision: PositionDecision,
        /// The closed trade as applied.
        trade: ClosedTrade,
    },
    /// The decision was accepted but execution ended without a fill.
    Failed {
        /// The accepted decision.
        decision: PositionDecision,
        /// Why execution failed.
        failure: ExecutionFailure,
    },
}

impl CycleOutcome {
    /// Short name for logging.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "rejected",
            Self::Filled { .. } => "filled",
            Self::Failed { .. } => "failed",
        }
    }
}

/// The risk-gated trading pipeline.
pub struct Pipeline {
    config: RuntimeConfig,
    ledger: PerformanceLedger,
    gate: RiskGate,
    engine: ExecutionEngine,
    halt: Arc<TradingHalt>,
    clock: Arc<dyn Clock>,
    order_sink: Box<dyn OrderSink>,
    event_sink: Arc<dyn EventSink>,
}

impl Pipeline {
    /// Assembles a pipeline from validated configuration.
    ///
    /// The ledger starts fresh at the configured initial capital with its
    /// daily counters anchored to the clock's current day.
    #[must_use]
    pub fn new(
        config: RuntimeConfig,
        clock: Arc<dyn Clock>,
        order_sink: Box<dyn OrderSink>,
        event_sink: Arc<dyn EventSink>,
    ) -> Self {
        let halt = Arc::new(TradingHalt::new());
        let engine = ExecutionEngine::new(&config.execution, halt.clone());
        let ledger = PerformanceLedger::new(config.initial_capital, clock.today());
        let gate = RiskGate::new(clock.clone());

        Self {
            config,
            ledger,
            gate,
            engine,
            halt,
            clock,
            order_sink,
            event_sink,
        }
    }

    /// Read access to the ledger.
    #[must_use]
    pub const fn ledger(&self) -> &PerformanceLedger {
        &self.ledger
    }

    /// The configuration this pipeline runs under.
    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Shared halt handle, for operators and supervisors.
    #[must_use]
    pub fn halt_handle(&self) -> Arc<TradingHalt> {
        self.halt.clone()
    }

    /// Runs one signal through gate, sizing, and execution.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmergencyStopTriggered`] when the halt is
    /// already latched. The cycle that trips the halt itself still returns
    /// `Ok` with the rejection.
    pub async fn run_cycle(&mut self, signal: &TradeSignal) -> Result<CycleOutcome, PipelineError> {
        if self.halt.is_tripped() {
            return Err(self.halted_error());
        }

        let today = self.clock.today();
        if self.ledger.roll_day(today) {
            tracing::info!(date = %today, "daily counters reset");
            self.event_sink.emit(&PipelineEvent::DayRolled { date: today });
        }

        let decision = self.gate.evaluate(signal, &self.ledger, &self.config);

        if !decision.accepted {
            if let Some(reason) = &decision.rejection_reason {
                if reason.is_emergency() {
                    let text = reason.to_string();
                    self.halt.trip(&text);
                    self.event_sink
                        .emit(&PipelineEvent::EmergencyStopTripped { reason: text });
                }
                tracing::info!(
                    correlation_id = %decision.correlation_id,
                    symbol = %decision.symbol,
                    code = reason.code(),
                    %reason,
                    "signal rejected"
                );
            }
            self.event_sink.emit(&PipelineEvent::DecisionRejected {
                decision: decision.clone(),
            });
            return Ok(CycleOutcome::Rejected(decision));
        }

        match self.engine.execute(&decision, self.order_sink.as_ref()).await {
            ExecutionResult::Filled(record) => {
                let trade = ClosedTrade::from(record);
                self.ledger.apply(trade.clone());
                tracing::info!(
                    correlation_id = %trade.correlation_id,
                    symbol = %trade.symbol,
                    pnl = %trade.pnl,
                    capital = %self.ledger.current_capital(),
                    "trade closed"
                );
                self.event_sink.emit(&PipelineEvent::TradeClosed {
                    trade: trade.clone(),
                });
                Ok(CycleOutcome::Filled { decision, trade })
            }
            ExecutionResult::Failed(failure) => {
                tracing::warn!(
                    correlation_id = %decision.correlation_id,
                    symbol = %decision.symbol,
                    error = %failure,
                    "execution failed, ledger unchanged"
                );
                self.event_sink.emit(&PipelineEvent::ExecutionFailed {
                    correlation_id: decision.correlation_id,
                    symbol: decision.symbol.clone(),
                    error: failure.to_string(),
                });
                Ok(CycleOutcome::Failed { decision, failure })
            }
        }
    }

    /// Drains a signal channel until it closes or the halt latches.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmergencyStopTriggered`] when the halt
    /// latches; a closed channel is a clean shutdown.
    pub async fn run(
        &mut self,
        mut signals: mpsc::Receiver<TradeSignal>,
    ) -> Result<(), PipelineError> {
        let halt = self.halt.clone();
        loop {
            tokio::select! {
                maybe_signal = signals.recv() => {
                    let Some(signal) = maybe_signal else {
                        tracing::info!("signal channel closed, pipeline stopping");
                        return Ok(());
                    };
                    let outcome = self.run_cycle(&signal).await?;
                    tracing::debug!(outcome = outcome.label(), "cycle complete");
                }
                () = halt.notified() => {
                    return Err(self.halted_error());
                }
            }
        }
    }

    fn halted_error(&self) -> PipelineError {
        PipelineError::EmergencyStopTriggered {
            reason: self
                .halt
                .reason()
                .unwrap_or_else(|| "trading halt tripped".to_string()),
        }
    }
}
