//! Cooperative, cancellable tick scheduling.
//!
//! Ticks never overlap: the next wait starts only after the caller has
//! finished processing the previous tick, so the interval is measured from
//! completion to start.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

/// Shared cancellation flag with wakeup.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking so a concurrent cancel is not missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Fixed-interval ticker bound to a [`CancelToken`].
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    token: CancelToken,
}

impl Ticker {
    pub fn new(interval: Duration, token: CancelToken) -> Self {
        Self { interval, token }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Wait one interval. Returns `false` if cancelled before or during
    /// the wait, in which case no tick should run.
    pub async fn wait(&self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        tokio::select! {
            _ = self.token.cancelled() => false,
            _ = tokio::time::sleep(self.interval) => !self.token.is_cancelled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn wait_elapses_one_interval() {
        let ticker = Ticker::new(Duration::from_millis(200), CancelToken::new());
        let started = tokio::time::Instant::now();
        assert!(ticker.wait().await);
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_interrupts_a_pending_wait() {
        let token = CancelToken::new();
        let ticker = Ticker::new(Duration::from_secs(60), token.clone());
        let waiter = tokio::spawn(async move { ticker.wait().await });

        tokio::task::yield_now().await;
        token.cancel();

        assert!(!waiter.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_ticker_never_ticks() {
        let token = CancelToken::new();
        token.cancel();
        let ticker = Ticker::new(Duration::from_millis(10), token);
        assert!(!ticker.wait().await);
    }

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        token.cancelled().await;
        assert!(token.is_cancelled());
    }
}
