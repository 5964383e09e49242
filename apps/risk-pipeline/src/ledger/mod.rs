//! Rolling performance ledger.
//!
//! Single-owner record of realized trades: running capital, win/loss
//! counts, the consecutive-loss streak, and daily counters. The pipeline
//! owns the only mutable reference; the gate and sizer read it during
//! evaluation. All mutation funnels through [`PerformanceLedger::apply`]
//! and [`PerformanceLedger::roll_day`], which keeps the capital invariant
//! (`current == initial + sum of pnl`) enforceable in one place.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ClosedTrade;

/// Running record of realized performance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceLedger {
    initial_capital: Decimal,
    current_capital: Decimal,
    total_trades: u32,
    wins: u32,
    losses: u32,
    consecutive_losses: u32,
    daily_pnl: Decimal,
    daily_trade_count: u32,
    last_reset_date: NaiveDate,
    last_loss_at: Option<DateTime<Utc>>,
    trade_history: Vec<ClosedTrade>,
}

impl PerformanceLedger {
    /// Create a fresh ledger for a deployment starting `today`.
    #[must_use]
    pub const fn new(initial_capital: Decimal, today: NaiveDate) -> Self {
        Self {
            initial_capital,
            current_capital: initial_capital,
            total_trades: 0,
            wins: 0,
            losses: 0,
            consecutive_losses: 0,
            daily_pnl: Decimal::ZERO,
            daily_trade_count: 0,
            last_reset_date: today,
            last_loss_at: None,
            trade_history: Vec::new(),
        }
    }

    /// Apply a closed trade.
    ///
    /// A winning trade zeroes the consecutive-loss streak; anything else
    /// (including break-even) extends it and stamps the loss time used by
    /// the cooldown check.
    pub fn apply(&mut self, trade: ClosedTrade) {
        self.current_capital += trade.pnl;
        self.daily_pnl += trade.pnl;
        self.total_trades += 1;
        self.daily_trade_count += 1;

        if trade.is_win() {
            self.wins += 1;
            self.consecutive_losses = 0;
        } else {
            self.losses += 1;
            self.consecutive_losses += 1;
            self.last_loss_at = Some(trade.closed_at);
        }

        self.trade_history.push(trade);
    }

    /// Reset the daily counters when the calendar day has advanced.
    ///
    /// Idempotent within a day; a clock that appears to move backwards
    /// never resets (losing daily loss tracking would weaken the gate).
    /// Returns true when a reset happened.
    pub fn roll_day(&mut self, today: NaiveDate) -> bool {
        if today <= self.last_reset_date {
            return false;
        }
        self.daily_pnl = Decimal::ZERO;
        self.daily_trade_count = 0;
        self.last_reset_date = today;
        true
    }

    /// Capital the deployment started with.
    #[must_use]
    pub const fn initial_capital(&self) -> Decimal {
        self.initial_capital
    }

    /// Capital right now.
    #[must_use]
    pub const fn current_capital(&self) -> Decimal {
        self.current_capital
    }

    /// Total closed trades.
    #[must_use]
    pub const fn total_trades(&self) -> u32 {
        self.total_trades
    }

    /// Winning trades.
    #[must_use]
    pub const fn wins(&self) -> u32 {
        self.wins
    }

    /// Losing trades (break-even counts as a loss).
    #[must_use]
    pub const fn losses(&self) -> u32 {
        self.losses
    }

    /// Current consecutive-loss streak.
    #[must_use]
    pub const fn consecutive_losses(&self) -> u32 {
        self.consecutive_losses
    }

    /// Realized PnL since the last day rollover.
    #[must_use]
    pub const fn daily_pnl(&self) -> Decimal {
        self.daily_pnl
    }

    /// Trades since the last day rollover.
    #[must_use]
    pub const fn daily_trade_count(&self) -> u32 {
        self.daily_trade_count
    }

    /// Calendar day of the last daily reset.
    #[must_use]
    pub const fn last_reset_date(&self) -> NaiveDate {
        self.last_reset_date
    }

    /// When the most recent losing trade closed.
    #[must_use]
    pub const fn last_loss_at(&self) -> Option<DateTime<Utc>> {
        self.last_loss_at
    }

    /// Realized PnL over the deployment lifetime.
    #[must_use]
    pub fn realized_pnl(&self) -> Decimal {
        self.current_capital - self.initial_capital
    }

    /// Fraction of closed trades that won. Zero with no trades.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.total_trades == 0 {
            return 0.0;
        }
        f64::from(self.wins) / f64::from(self.total_trades)
    }

    /// All closed trades, oldest first.
    #[must_use]
    pub fn trade_history(&self) -> &[ClosedTrade] {
        &self.trade_history
    }
}
