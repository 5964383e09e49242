//! Trading halt latch.
//!
//! One shared kill switch covers the whole pipeline: the gate trips it on an
//! emergency stop, the engine checks it before every order attempt and races
//! it against backoff sleeps, and operators clear it manually after review.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Latched halt shared between the pipeline and the execution engine.
///
/// Trips once and stays tripped until `reset`. The first trip wins; repeat
/// trips keep the original reason.
#[derive(Debug, Default)]
pub struct TradingHalt {
    tripped: AtomicBool,
    reason: RwLock<Option<String>>,
    notify: Notify,
}

impl TradingHalt {
    /// Creates an untripped halt.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the halt and wakes everyone racing it. A no-op when already
    /// tripped.
    pub fn trip(&self, reason: &str) {
        if self.tripped.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(mut guard) = self.reason.write() {
            *guard = Some(reason.to_string());
        }
        tracing::error!(reason, "trading halt tripped");
        self.notify.notify_waiters();
    }

    /// Whether the halt is currently latched.
    #[must_use]
    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }

    /// Reason recorded by the first trip, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.read().ok().and_then(|guard| guard.clone())
    }

    /// Waits until the halt trips. Resolves immediately when already
    /// tripped, so racing this against a sleep never waits out the sleep.
    pub async fn notified(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before the latch check; a trip landing between the two
        // would otherwise notify nobody and strand this waiter.
        notified.as_mut().enable();
        if self.is_tripped() {
            return;
        }
        notified.await;
    }

    /// Manual reset after operator review. Clears the latch and the reason.
    pub fn reset(&self) {
        if let Ok(mut guard) = self.reason.write() {
            *guard = None;
        }
        self.tripped.store(false, Ordering::SeqCst);
        tracing::warn!("trading halt reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_first_trip_wins() {
        let halt = TradingHalt::new();
        assert!(!halt.is_tripped());

        halt.trip("capital at emergency floor");
        halt.trip("second reason");

        assert!(halt.is_tripped());
        assert_eq!(halt.reason().as_deref(), Some("capital at emergency floor"));
    }

    #[test]
    fn test_reset_clears_latch_and_reason() {
        let halt = TradingHalt::new();
        halt.trip("boom");
        halt.reset();

        assert!(!halt.is_tripped());
        assert!(halt.reason().is_none());

        halt.trip("again");
        assert_eq!(halt.reason().as_deref(), Some("again"));
    }

    #[tokio::test]
    async fn test_notified_resolves_immediately_when_already_tripped() {
        let halt = TradingHalt::new();
        halt.trip("pre-tripped");

        let result = tokio::time::timeout(Duration::from_millis(50), halt.notified()).await;
        assert!(result.is_ok(), "notified should not wait on a tripped halt");
    }

    #[tokio::test]
    async fn test_notified_wakes_a_waiter() {
        let halt = Arc::new(TradingHalt::new());

        let waiter = {
            let halt = halt.clone();
            tokio::spawn(async move {
                halt.notified().await;
            })
        };
        tokio::task::yield_now().await;
        halt.trip("wake up");

        let joined = tokio::time::timeout(Duration::from_secs(1), waiter).await;
        assert!(joined.is_ok(), "waiter should observe the trip");
    }
}
