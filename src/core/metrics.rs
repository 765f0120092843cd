//! Logger metrics for observability
//!
//! Counters for records written, records lost to sink failures, file
//! rotations, failed error-file copies, and fields rejected at construction
//! time.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use fieldlog::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_dropped();
/// metrics.record_logged();
///
/// assert_eq!(metrics.dropped_count(), 1);
/// assert_eq!(metrics.total_logged(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records whose write to the sink or file failed
    dropped_count: AtomicU64,

    /// Records successfully written
    total_logged: AtomicU64,

    /// Completed file rotations
    rotations: AtomicU64,

    /// Rotations whose backup could not be archived
    archive_failures: AtomicU64,

    /// Records written to the active file but not to the error file
    error_file_failures: AtomicU64,

    /// Callable field values refused by `with_field`/`with_fields`
    rejected_fields: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            dropped_count: AtomicU64::new(0),
            total_logged: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            archive_failures: AtomicU64::new(0),
            error_file_failures: AtomicU64::new(0),
            rejected_fields: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn archive_failures(&self) -> u64 {
        self.archive_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn error_file_failures(&self) -> u64 {
        self.error_file_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected_fields(&self) -> u64 {
        self.rejected_fields.load(Ordering::Relaxed)
    }

    /// Record a dropped log
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped_count.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a successfully logged entry
    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.total_logged.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation(&self) -> u64 {
        self.rotations.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_archive_failure(&self) -> u64 {
        self.archive_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_error_file_failure(&self) -> u64 {
        self.error_file_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rejected_field(&self) -> u64 {
        self.rejected_fields.fetch_add(1, Ordering::Relaxed)
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no logs have been processed.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.total_logged() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.dropped_count.store(0, Ordering::Relaxed);
        self.total_logged.store(0, Ordering::Relaxed);
        self.rotations.store(0, Ordering::Relaxed);
        self.archive_failures.store(0, Ordering::Relaxed);
        self.error_file_failures.store(0, Ordering::Relaxed);
        self.rejected_fields.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            dropped_count: AtomicU64::new(self.dropped_count()),
            total_logged: AtomicU64::new(self.total_logged()),
            rotations: AtomicU64::new(self.rotations()),
            archive_failures: AtomicU64::new(self.archive_failures()),
            error_file_failures: AtomicU64::new(self.error_file_failures()),
            rejected_fields: AtomicU64::new(self.rejected_fields()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.dropped_count(), 0);
        assert_eq!(metrics.total_logged(), 0);
        assert_eq!(metrics.rotations(), 0);
        assert_eq!(metrics.archive_failures(), 0);
        assert_eq!(metrics.error_file_failures(), 0);
        assert_eq!(metrics.rejected_fields(), 0);
    }

    #[test]
    fn test_metrics_record_dropped() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_dropped(), 0); // Returns previous value
        assert_eq!(metrics.dropped_count(), 1);
        metrics.record_dropped();
        assert_eq!(metrics.dropped_count(), 2);
    }

    #[test]
    fn test_metrics_drop_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.drop_rate(), 0.0);

        for _ in 0..100 {
            metrics.record_logged();
        }
        assert_eq!(metrics.drop_rate(), 0.0);

        for _ in 0..10 {
            metrics.record_dropped();
        }
        let rate = metrics.drop_rate();
        assert!(rate > 9.0 && rate < 10.0, "Drop rate was {}", rate);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = LoggerMetrics::new();
        metrics.record_dropped();
        metrics.record_rotation();
        metrics.record_rejected_field();
        metrics.record_error_file_failure();

        metrics.reset();

        assert_eq!(metrics.dropped_count(), 0);
        assert_eq!(metrics.rotations(), 0);
        assert_eq!(metrics.rejected_fields(), 0);
        assert_eq!(metrics.error_file_failures(), 0);
    }

    #[test]
    fn test_metrics_clone_is_snapshot() {
        let metrics = LoggerMetrics::new();
        metrics.record_rotation();
        metrics.record_archive_failure();

        let snapshot = metrics.clone();
        metrics.record_rotation();

        assert_eq!(snapshot.rotations(), 1);
        assert_eq!(snapshot.archive_failures(), 1);
        assert_eq!(metrics.rotations(), 2);
    }
}
