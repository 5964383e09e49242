//! Order execution with bounded retry.
//!
//! The engine drives one accepted decision to a terminal outcome: `Filled`
//! with the sink's order record, or `Failed` with the reason. Transient
//! sink errors are retried under the configured linear backoff; terminal
//! errors fail on first occurrence. A shared halt handle is checked before
//! every attempt and raced against every backoff sleep, so an emergency
//! stop never waits out a retry delay.
//!
//! The engine never touches the ledger. Recording outcomes is the caller's
//! job; the engine's only state is the fill registry that makes placement
//! idempotent per correlation ID.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::ExecutionConfig;
use crate::models::{OrderRecord, PositionDecision};
use crate::safety::TradingHalt;

use super::registry::FillRegistry;
use super::retry::{LinearBackoff, RetryPolicy};
use super::sink::{OrderSink, OrderSinkError};

/// Terminal outcome of executing one decision.
#[derive(Debug)]
pub enum ExecutionResult {
    /// Order filled; the record is returned for ledger application.
    Filled(OrderRecord),
    /// No fill was obtained.
    Failed(ExecutionFailure),
}

impl ExecutionResult {
    /// Returns true for a fill.
    #[must_use]
    pub const fn is_filled(&self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

/// Why execution ended without a fill.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutionFailure {
    /// The decision was rejected upstream; nothing was sent anywhere.
    #[error("decision was not accepted, nothing to execute")]
    NotAccepted,

    /// Every allowed attempt failed with a retryable error.
    #[error("retries exhausted after {attempts} attempts, last error: {last}")]
    RetriesExhausted {
        /// Attempts made, first try included.
        attempts: u32,
        /// Error from the final attempt.
        last: OrderSinkError,
    },

    /// The sink reported an error retrying cannot fix.
    #[error("terminal order error: {0}")]
    Terminal(OrderSinkError),

    /// The trading halt latched before or during execution.
    #[error("execution aborted by trading halt")]
    Halted,

    /// The decision deadline elapsed before a fill was obtained.
    #[error("decision deadline exceeded after {elapsed_ms}ms")]
    DeadlineExceeded {
        /// Milliseconds spent before giving up.
        elapsed_ms: u64,
    },
}

/// Attempt lifecycle for one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptStatus {
    Pending,
    Retrying,
    Filled,
    Failed,
}

impl AttemptStatus {
    const fn is_terminal(self) -> bool {
        matches!(self, Self::Filled | Self::Failed)
    }
}

/// Tracks one decision through the attempt loop. Dropped once terminal.
#[derive(Debug)]
struct ExecutionAttempt<'a> {
    decision: &'a PositionDecision,
    attempt_count: u32,
    last_error: Option<OrderSinkError>,
    status: AttemptStatus,
}

impl<'a> ExecutionAttempt<'a> {
    const fn new(decision: &'a PositionDecision) -> Self {
        Self {
            decision,
            attempt_count: 0,
            last_error: None,
            status: AttemptStatus::Pending,
        }
    }

    fn begin(&mut self) {
        self.attempt_count += 1;
    }

    fn note_retry(&mut self, error: OrderSinkError) {
        self.last_error = Some(error);
        self.status = AttemptStatus::Retrying;
    }

    fn filled(&mut self) {
        self.status = AttemptStatus::Filled;
    }

    fn failed(&mut self, error: Option<OrderSinkError>) {
        if error.is_some() {
            self.last_error = error;
        }
        self.status = AttemptStatus::Failed;
    }
}

/// Executes accepted decisions against an order sink.
pub struct ExecutionEngine {
    policy: RetryPolicy,
    deadline: Option<Duration>,
    halt: Arc<TradingHalt>,
    registry: FillRegistry,
}

impl ExecutionEngine {
    /// Creates an engine from runtime configuration and the shared halt.
    #[must_use]
    pub fn new(config: &ExecutionConfig, halt: Arc<TradingHalt>) -> Self {
        Self {
            policy: RetryPolicy::from_config(config),
            deadline: config.decision_deadline(),
            halt,
            registry: FillRegistry::new(),
        }
    }

    /// Number of fills recorded so far.
    #[must_use]
    pub fn fills_recorded(&self) -> usize {
        self.registry.count()
    }

    /// Drives one decision to a terminal outcome.
    ///
    /// A decision whose fill is already on record returns that fill without
    /// issuing a new order, even while halted; the replay has no side
    /// effects.
    pub async fn execute(
        &self,
        decision: &PositionDecision,
        sink: &dyn OrderSink,
    ) -> ExecutionResult {
        if !decision.accepted {
            return ExecutionResult::Failed(ExecutionFailure::NotAccepted);
        }
        let Some(side) = decision.side else {
            return ExecutionResult::Failed(ExecutionFailure::NotAccepted);
        };

        if let Some(fill) = self.registry.get(decision.correlation_id) {
            tracing::info!(
                correlation_id = %decision.correlation_id,
                order_id = %fill.order_id,
                "fill already recorded, not issuing a new order"
            );
            return ExecutionResult::Filled(fill);
        }

        let started = Instant::now();
        let mut backoff = LinearBackoff::new(&self.policy);
        let mut attempt = ExecutionAttempt::new(decision);

        loop {
            if self.halt.is_tripped() {
                attempt.failed(None);
                tracing::warn!(
                    correlation_id = %attempt.decision.correlation_id,
                    attempts = attempt.attempt_count,
                    last_error = ?attempt.last_error,
                    "execution aborted by trading halt"
                );
                return ExecutionResult::Failed(ExecutionFailure::Halted);
            }
            if let Some(failure) = self.deadline_failure(started) {
                attempt.failed(None);
                return ExecutionResult::Failed(failure);
            }

            attempt.begin();
            let placed = sink
                .place_market_order(
                    &decision.symbol,
                    side,
                    decision.notional_size,
                    decision.correlation_id,
                )
                .await;

            match placed {
                Ok(fill) => {
                    attempt.filled();
                    self.registry.record(fill.clone());
                    tracing::info!(
                        correlation_id = %decision.correlation_id,
                        order_id = %fill.order_id,
                        sink = sink.sink_name(),
                        attempts = attempt.attempt_count,
                        status = ?attempt.status,
                        "order filled"
                    );
                    return ExecutionResult::Filled(fill);
                }
                Err(error) if !error.is_retryable() => {
                    attempt.failed(Some(error.clone()));
                    tracing::warn!(
                        correlation_id = %decision.correlation_id,
                        sink = sink.sink_name(),
                        attempts = attempt.attempt_count,
                        status = ?attempt.status,
                        error = %error,
                        "terminal order error"
                    );
                    return ExecutionResult::Failed(ExecutionFailure::Terminal(error));
                }
                Err(error) => {
                    let Some(delay) = backoff.next_delay() else {
                        attempt.failed(Some(error.clone()));
                        tracing::warn!(
                            correlation_id = %decision.correlation_id,
                            sink = sink.sink_name(),
                            attempts = attempt.attempt_count,
                            status = ?attempt.status,
                            error = %error,
                            "retries exhausted"
                        );
                        return ExecutionResult::Failed(ExecutionFailure::RetriesExhausted {
                            attempts: attempt.attempt_count,
                            last: error,
                        });
                    };

                    attempt.note_retry(error);
                    tracing::warn!(
                        correlation_id = %decision.correlation_id,
                        attempt = attempt.attempt_count,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        last_error = ?attempt.last_error,
                        "order attempt failed, backing off"
                    );
                    if let Some(failure) = self.wait_out_backoff(delay, started).await {
                        attempt.failed(None);
                        return ExecutionResult::Failed(failure);
                    }
                }
            }
        }
    }

    /// Sleeps out a backoff delay, aborting early on halt or deadline.
    async fn wait_out_backoff(
        &self,
        delay: Duration,
        started: Instant,
    ) -> Option<ExecutionFailure> {
        let (sleep_for, deadline_bound) = match self.deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_sub(started.elapsed());
                if remaining <= delay {
                    (remaining, true)
                } else {
                    (delay, false)
                }
            }
            None => (delay, false),
        };

        tokio::select! {
            () = tokio::time::sleep(sleep_for) => {
                deadline_bound.then(|| ExecutionFailure::DeadlineExceeded {
                    elapsed_ms: elapsed_ms(started),
                })
            }
            () = self.halt.notified() => Some(ExecutionFailure::Halted),
        }
    }

    fn deadline_failure(&self, started: Instant) -> Option<ExecutionFailure> {
        let deadline = self.deadline?;
        (started.elapsed() >= deadline).then(|| ExecutionFailure::DeadlineExceeded {
            elapsed_ms: elapsed_ms(started),
        })
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    use crate::models::TradeSide;

    /// Sink that fails a scripted number of times before filling.
    struct ScriptedSink {
        failures_left: AtomicU32,
        error: OrderSinkError,
        calls: AtomicU32,
        call_times: Mutex<Vec<Instant>>,
    }

    impl ScriptedSink {
        fn failing_times(failures: u32, error: OrderSinkError) -> Self {
            Self {
                failures_left: AtomicU32::new(failures),
                error,
                calls: AtomicU32::new(0),
                call_times: Mutex::new(Vec::new()),
            }
        }

        fn fills_immediately() -> Self {
            Self::failing_times(0, OrderSinkError::Timeout)
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }

        fn gaps_between_calls(&self) -> Vec<Duration> {
            let times = match self.call_times.lock() {
                Ok(t) => t.clone(),
                Err(e) => panic!("call_times poisoned: {e}"),
            };
            times.windows(2).map(|pair| pair[1] - pair[0]).collect()
        }
    }

    #[async_trait]
    impl OrderSink for ScriptedSink {
        async fn place_market_order(
            &self,
            symbol: &str,
            side: TradeSide,
            notional: rust_decimal::Decimal,
            correlation_id: uuid::Uuid,
        ) -> Result<OrderRecord, OrderSinkError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Ok(mut times) = self.call_times.lock() {
                times.push(Instant::now());
            }

            let remaining = self.failures_left.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_left.store(remaining - 1, Ordering::SeqCst);
                return Err(self.error.clone());
            }

            Ok(OrderRecord {
                order_id: format!("sink-{call}"),
                correlation_id,
                symbol: symbol.to_string(),
                side,
                notional,
                fill_price: dec!(100),
                fee: dec!(0.10),
                pnl: dec!(1),
                filled_at: chrono::Utc::now(),
            })
        }

        fn sink_name(&self) -> &'static str {
            "scripted"
        }
    }

    fn engine_with(config: &ExecutionConfig) -> ExecutionEngine {
        ExecutionEngine::new(config, Arc::new(TradingHalt::new()))
    }

    fn default_config() -> ExecutionConfig {
        ExecutionConfig {
            max_retries: 3,
            retry_delay_ms: 1000,
            decision_deadline_ms: None,
        }
    }

    fn accepted_decision() -> PositionDecision {
        PositionDecision::approved("ETH-USD", TradeSide::Buy, dec!(500), 0.8)
    }

    #[tokio::test]
    async fn test_fills_on_first_attempt() {
        let engine = engine_with(&default_config());
        let sink = ScriptedSink::fills_immediately();

        let result = engine.execute(&accepted_decision(), &sink).await;

        assert!(result.is_filled());
        assert_eq!(sink.calls(), 1);
        assert_eq!(engine.fills_recorded(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_fill_on_third_attempt() {
        let engine = engine_with(&default_config());
        let sink = ScriptedSink::failing_times(
            2,
            OrderSinkError::Connection("connection reset".to_string()),
        );

        let result = engine.execute(&accepted_decision(), &sink).await;

        assert!(result.is_filled());
        assert_eq!(sink.calls(), 3);

        // Linear backoff: 1s after the first failure, 2s after the second.
        let gaps = sink.gaps_between_calls();
        assert_eq!(gaps, vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn test_terminal_error_fails_on_first_occurrence() {
        let engine = engine_with(&default_config());
        let sink = ScriptedSink::failing_times(
            5,
            OrderSinkError::Rejected("not tradable".to_string()),
        );

        let result = engine.execute(&accepted_decision(), &sink).await;

        match result {
            ExecutionResult::Failed(ExecutionFailure::Terminal(OrderSinkError::Rejected(_))) => {}
            other => panic!("expected Terminal failure, got {other:?}"),
        }
        assert_eq!(sink.calls(), 1);
        assert_eq!(engine.fills_recorded(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_exhausted_after_max_attempts() {
        let engine = engine_with(&default_config());
        let sink = ScriptedSink::failing_times(10, OrderSinkError::Timeout);

        let result = engine.execute(&accepted_decision(), &sink).await;

        match result {
            ExecutionResult::Failed(ExecutionFailure::RetriesExhausted { attempts: 3, last }) => {
                assert_eq!(last, OrderSinkError::Timeout);
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert_eq!(sink.calls(), 3);
    }

    #[tokio::test]
    async fn test_rejected_decision_is_not_executed() {
        let engine = engine_with(&default_config());
        let sink = ScriptedSink::fills_immediately();
        let decision = PositionDecision::rejected(
            "ETH-USD",
            Some(TradeSide::Buy),
            0.9,
            crate::models::RejectionReason::NoAction,
        );

        let result = engine.execute(&decision, &sink).await;

        assert!(matches!(
            result,
            ExecutionResult::Failed(ExecutionFailure::NotAccepted)
        ));
        assert_eq!(sink.calls(), 0);
    }

    #[tokio::test]
    async fn test_recorded_fill_is_replayed_not_reordered() {
        let engine = engine_with(&default_config());
        let sink = ScriptedSink::fills_immediately();
        let decision = accepted_decision();

        let first = engine.execute(&decision, &sink).await;
        let second = engine.execute(&decision, &sink).await;

        let (first_id, second_id) = match (first, second) {
            (ExecutionResult::Filled(a), ExecutionResult::Filled(b)) => (a.order_id, b.order_id),
            other => panic!("both executions should fill: {other:?}"),
        };
        assert_eq!(first_id, second_id);
        assert_eq!(sink.calls(), 1, "no second order for the same decision");
    }

    #[tokio::test]
    async fn test_halt_blocks_before_first_attempt() {
        let halt = Arc::new(TradingHalt::new());
        let engine = ExecutionEngine::new(&default_config(), halt.clone());
        let sink = ScriptedSink::fills_immediately();
        halt.trip("capital floor breached");

        let result = engine.execute(&accepted_decision(), &sink).await;

        assert!(matches!(
            result,
            ExecutionResult::Failed(ExecutionFailure::Halted)
        ));
        assert_eq!(sink.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_halt_cuts_backoff_short() {
        let halt = Arc::new(TradingHalt::new());
        let config = ExecutionConfig {
            max_retries: 3,
            retry_delay_ms: 60_000,
            decision_deadline_ms: None,
        };
        let engine = ExecutionEngine::new(&config, halt.clone());
        let sink = ScriptedSink::failing_times(10, OrderSinkError::Timeout);

        let tripper = {
            let halt = halt.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                halt.trip("operator stop");
            })
        };

        let started = Instant::now();
        let result = engine.execute(&accepted_decision(), &sink).await;

        assert!(matches!(
            result,
            ExecutionResult::Failed(ExecutionFailure::Halted)
        ));
        assert_eq!(sink.calls(), 1);
        let elapsed = started.elapsed();
        assert!(
            elapsed < Duration::from_secs(60),
            "halt should abort the backoff, elapsed {elapsed:?}"
        );
        let joined = tripper.await;
        assert!(joined.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded_during_backoff() {
        let config = ExecutionConfig {
            max_retries: 5,
            retry_delay_ms: 1000,
            decision_deadline_ms: Some(1500),
        };
        let engine = engine_with(&config);
        let sink = ScriptedSink::failing_times(10, OrderSinkError::Timeout);

        let result = engine.execute(&accepted_decision(), &sink).await;

        match result {
            ExecutionResult::Failed(ExecutionFailure::DeadlineExceeded { elapsed_ms }) => {
                assert_eq!(elapsed_ms, 1500);
            }
            other => panic!("expected DeadlineExceeded, got {other:?}"),
        }
        assert_eq!(sink.calls(), 2);
    }

    #[tokio::test]
    async fn test_zero_deadline_blocks_before_first_attempt() {
        let config = ExecutionConfig {
            max_retries: 3,
            retry_delay_ms: 1000,
            decision_deadline_ms: Some(0),
        };
        let engine = engine_with(&config);
        let sink = ScriptedSink::fills_immediately();

        let result = engine.execute(&accepted_decision(), &sink).await;

        assert!(matches!(
            result,
            ExecutionResult::Failed(ExecutionFailure::DeadlineExceeded { .. })
        ));
        assert_eq!(sink.calls(), 0);
    }

    #[test]
    fn test_attempt_status_transitions() {
        let decision = accepted_decision();
        let mut attempt = ExecutionAttempt::new(&decision);
        assert_eq!(attempt.status, AttemptStatus::Pending);
        assert!(!attempt.status.is_terminal());

        attempt.begin();
        attempt.note_retry(OrderSinkError::Timeout);
        assert_eq!(attempt.status, AttemptStatus::Retrying);
        assert!(!attempt.status.is_terminal());
        assert_eq!(attempt.attempt_count, 1);

        attempt.begin();
        attempt.filled();
        assert_eq!(attempt.status, AttemptStatus::Filled);
        assert!(attempt.status.is_terminal());
        assert_eq!(attempt.attempt_count, 2);
        assert_eq!(attempt.last_error, Some(OrderSinkError::Timeout));
    }
}
