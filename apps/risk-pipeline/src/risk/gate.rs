//! Pre-trade risk gate.
//!
//! Every signal passes through an ordered rulebook before any order is
//! created. The first rule that fails decides the rejection and later rules
//! are not consulted, so a malformed signal never reports a capital problem
//! and a daily-loss breach outranks the cooldown. The ordering is part of
//! the contract.
//!
//! The gate reads ledger state and never writes it. Recording fills and
//! rolling the trading day belong to the pipeline.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::clock::Clock;
use crate::config::RuntimeConfig;
use crate::ledger::PerformanceLedger;
use crate::models::{PositionDecision, RejectionReason, TradeSide, TradeSignal};

use super::decimal_from_f64;
use super::sizing::{PositionSizer, SizingInput};

/// Loss streak beyond which the confidence threshold tightens.
const ADAPTIVE_STREAK_TRIGGER: u32 = 2;

/// Factor applied to the baseline threshold while the streak is hot.
const ADAPTIVE_THRESHOLD_FACTOR: f64 = 1.1;

/// Ordered pre-trade rulebook.
///
/// Holds a clock handle so the cooldown window can be evaluated against
/// injectable time in tests.
pub struct RiskGate {
    clock: Arc<dyn Clock>,
}

impl RiskGate {
    /// Creates a gate evaluating cooldown windows against the given clock.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Gates one signal against the current ledger state.
    ///
    /// Returns an accepted decision with a sized notional, or a rejected
    /// decision carrying the first rule violation. Never errors: a `Hold`
    /// signal is an ordinary `NoAction` rejection.
    #[must_use]
    pub fn evaluate(
        &self,
        signal: &TradeSignal,
        ledger: &PerformanceLedger,
        config: &RuntimeConfig,
    ) -> PositionDecision {
        let side = match Self::validate_shape(signal) {
            Ok(side) => side,
            Err(reason) => {
                return PositionDecision::rejected(
                    &signal.symbol,
                    signal.action.to_side(),
                    signal.confidence,
                    reason,
                );
            }
        };

        let rejection = Self::check_confidence(signal.confidence, ledger, config)
            .or_else(|| Self::check_daily_trade_cap(ledger, config))
            .or_else(|| Self::check_daily_loss(ledger, config))
            .or_else(|| Self::check_emergency_floor(ledger, config))
            .or_else(|| self.check_cooldown(ledger, config));
        if let Some(reason) = rejection {
            return PositionDecision::rejected(
                &signal.symbol,
                Some(side),
                signal.confidence,
                reason,
            );
        }

        let sized = PositionSizer::from_config(config).size(&SizingInput {
            current_capital: ledger.current_capital(),
            confidence: signal.confidence,
            consecutive_losses: ledger.consecutive_losses(),
        });
        PositionDecision::approved(&signal.symbol, side, sized.notional, signal.confidence)
    }

    /// Baseline confidence threshold, tightened by 10% (capped at 1.0) while
    /// more than two consecutive losses are on the books. A winning trade
    /// zeroes the streak, which restores the baseline without any explicit
    /// reset.
    #[must_use]
    pub fn effective_threshold(ledger: &PerformanceLedger, config: &RuntimeConfig) -> f64 {
        let base = config.sizing.min_confidence;
        if ledger.consecutive_losses() > ADAPTIVE_STREAK_TRIGGER {
            (base * ADAPTIVE_THRESHOLD_FACTOR).min(1.0)
        } else {
            base
        }
    }

    fn validate_shape(signal: &TradeSignal) -> Result<TradeSide, RejectionReason> {
        let Some(side) = signal.action.to_side() else {
            return Err(RejectionReason::NoAction);
        };
        if signal.symbol.trim().is_empty() {
            return Err(RejectionReason::MalformedSignal {
                detail: "empty symbol".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&signal.confidence) {
            return Err(RejectionReason::MalformedSignal {
                detail: format!("confidence {} outside [0, 1]", signal.confidence),
            });
        }
        Ok(side)
    }

    fn check_confidence(
        confidence: f64,
        ledger: &PerformanceLedger,
        config: &RuntimeConfig,
    ) -> Option<RejectionReason> {
        let threshold = Self::effective_threshold(ledger, config);
        (confidence < threshold).then_some(RejectionReason::LowConfidence {
            confidence,
            threshold,
        })
    }

    fn check_daily_trade_cap(
        ledger: &PerformanceLedger,
        config: &RuntimeConfig,
    ) -> Option<RejectionReason> {
        let count = ledger.daily_trade_count();
        let max = config.safety_limits.max_daily_trades;
        (count >= max).then_some(RejectionReason::DailyTradeCapReached { count, max })
    }

    fn check_daily_loss(
        ledger: &PerformanceLedger,
        config: &RuntimeConfig,
    ) -> Option<RejectionReason> {
        // The tighter of the absolute limit and the percentage of initial
        // capital is the one that trips.
        let pct_limit =
            ledger.initial_capital() * decimal_from_f64(config.safety_limits.daily_loss_limit_pct);
        let limit = config.safety_limits.daily_loss_limit_abs.min(pct_limit);
        (ledger.daily_pnl() <= -limit).then(|| RejectionReason::DailyLossBreached {
            daily_pnl: ledger.daily_pnl(),
            limit,
        })
    }

    fn check_emergency_floor(
        ledger: &PerformanceLedger,
        config: &RuntimeConfig,
    ) -> Option<RejectionReason> {
        let retained = Decimal::ONE - decimal_from_f64(config.safety_limits.emergency_stop_pct);
        let floor = ledger.initial_capital() * retained;
        // Capital sitting exactly on the floor counts as breached.
        (ledger.current_capital() <= floor).then(|| RejectionReason::EmergencyStop {
            current_capital: ledger.current_capital(),
            floor,
        })
    }

    fn check_cooldown(
        &self,
        ledger: &PerformanceLedger,
        config: &RuntimeConfig,
    ) -> Option<RejectionReason> {
        let streak = ledger.consecutive_losses();
        if streak < config.safety_limits.consecutive_losses_max {
            return None;
        }

        let window_minutes = i64::from(config.safety_limits.loss_cooldown_minutes);
        let remaining_minutes = match ledger.last_loss_at() {
            Some(last_loss_at) => {
                let elapsed = self.clock.now() - last_loss_at;
                if elapsed >= chrono::Duration::minutes(window_minutes) {
                    return None;
                }
                window_minutes - elapsed.num_minutes()
            }
            // Streak without a recorded loss time: treat the window as
            // fully unexpired rather than open the gate.
            None => window_minutes,
        };

        Some(RejectionReason::CooldownActive {
            consecutive_losses: streak,
            remaining_minutes,
        })
    }
}
