//! Dispatch counters
//!
//! Lock-free counters describing how records moved through the logger:
//! how many reached every sink, how many were lost to a full queue, and how
//! often an individual sink failed.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared between the logger and its workers
///
/// # Example
///
/// ```
/// use sink_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_dispatched();
/// metrics.record_sink_failure();
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.dispatched, 1);
/// assert_eq!(snapshot.sink_failures, 1);
/// ```
#[derive(Debug, Default)]
pub struct LoggerMetrics {
    /// Records handed to the sinks
    dispatched: AtomicU64,

    /// Records lost before reaching any sink
    dropped: AtomicU64,

    /// Times the dispatch queue was found full
    queue_full_events: AtomicU64,

    /// Times a caller blocked waiting for queue space
    block_events: AtomicU64,

    /// Severe records written inline because the queue was full
    critical_preserved: AtomicU64,

    /// Individual sink calls that returned an error or panicked
    sink_failures: AtomicU64,
}

/// Point-in-time copy of [`LoggerMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub dispatched: u64,
    pub dropped: u64,
    pub queue_full_events: u64,
    pub block_events: u64,
    pub critical_preserved: u64,
    pub sink_failures: u64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            dispatched: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            queue_full_events: AtomicU64::new(0),
            block_events: AtomicU64::new(0),
            critical_preserved: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn queue_full_events(&self) -> u64 {
        self.queue_full_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn block_events(&self) -> u64 {
        self.block_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn critical_preserved(&self) -> u64 {
        self.critical_preserved.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    /// Returns the previous value
    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the previous value
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_queue_full(&self) -> u64 {
        self.queue_full_events.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_block(&self) -> u64 {
        self.block_events.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_critical_preserved(&self) -> u64 {
        self.critical_preserved.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Percentage (0.0 - 100.0) of records lost before dispatch
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_count() as f64;
        let total = self.dispatched() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dispatched: self.dispatched(),
            dropped: self.dropped_count(),
            queue_full_events: self.queue_full_events(),
            block_events: self.block_events(),
            critical_preserved: self.critical_preserved(),
            sink_failures: self.sink_failures(),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.dispatched,
            &self.dropped,
            &self.queue_full_events,
            &self.block_events,
            &self.critical_preserved,
            &self.sink_failures,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_start_at_zero() {
        assert_eq!(LoggerMetrics::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_dropped(), 0);
        assert_eq!(metrics.record_dropped(), 1);
        assert_eq!(metrics.dropped_count(), 2);
    }

    #[test]
    fn test_drop_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.drop_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_dispatched();
        }
        for _ in 0..10 {
            metrics.record_dropped();
        }
        let rate = metrics.drop_rate();
        assert!((9.9..=10.1).contains(&rate), "Drop rate was {}", rate);
    }

    #[test]
    fn test_reset_clears_every_counter() {
        let metrics = LoggerMetrics::new();
        metrics.record_dispatched();
        metrics.record_queue_full();
        metrics.record_sink_failure();
        metrics.record_critical_preserved();

        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let metrics = LoggerMetrics::new();
        metrics.record_sink_failure();
        let snapshot = metrics.snapshot();
        metrics.record_sink_failure();

        assert_eq!(snapshot.sink_failures, 1);
        assert_eq!(metrics.sink_failures(), 2);
    }
}
