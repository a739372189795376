//! Cooperative cancellation and progress reporting.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio_util::sync::CancellationToken;

/// Cancellation signal and progress counter shared by every worker of a
/// pass.
#[derive(Debug, Default)]
pub struct ProgressIndicator {
    token: CancellationToken,
    processed: AtomicUsize,
    total: AtomicUsize,
}

impl ProgressIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Sets the amount of work expected for the pass.
    pub fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
    }

    /// Records `amount` units of finished work.
    pub fn advance(&self, amount: usize) {
        self.processed.fetch_add(amount, Ordering::Relaxed);
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    /// Finished fraction in `0.0..=1.0`; `1.0` when no work is expected.
    pub fn fraction(&self) -> f64 {
        let total = self.total.load(Ordering::Relaxed);
        if total == 0 {
            return 1.0;
        }
        (self.processed() as f64 / total as f64).min(1.0)
    }
}
