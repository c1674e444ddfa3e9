//! Run statistics.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters for one run.
///
/// Updated concurrently by item workers, so every counter is atomic.
#[derive(Debug, Default)]
pub struct RunStats {
    completed: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    retried: AtomicUsize,
    bytes: AtomicU64,
}

impl RunStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Items whose assets were downloaded in this run.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Items found in the archive or already on disk.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Items or URLs that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Extra attempts spent on successful transfers.
    #[must_use]
    pub fn retried(&self) -> usize {
        self.retried.load(Ordering::SeqCst)
    }

    /// Bytes written to final files.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.completed() + self.skipped() + self.failed()
    }

    pub(crate) fn increment_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_transfer(&self, bytes: u64, attempts: u32) {
        self.bytes.fetch_add(bytes, Ordering::SeqCst);
        let extra = attempts.saturating_sub(1) as usize;
        self.retried.fetch_add(extra, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_start_at_zero() {
        let stats = RunStats::new();
        assert_eq!(stats.total(), 0);
        assert_eq!(stats.bytes(), 0);
        assert_eq!(stats.retried(), 0);
    }

    #[test]
    fn test_stats_counts() {
        let stats = RunStats::new();
        stats.increment_completed();
        stats.increment_completed();
        stats.increment_skipped();
        stats.increment_failed();
        assert_eq!(stats.completed(), 2);
        assert_eq!(stats.skipped(), 1);
        assert_eq!(stats.failed(), 1);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn test_record_transfer_counts_extra_attempts() {
        let stats = RunStats::new();
        stats.record_transfer(100, 1);
        stats.record_transfer(50, 3);
        assert_eq!(stats.bytes(), 150);
        assert_eq!(stats.retried(), 2);
    }
}
