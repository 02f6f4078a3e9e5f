//! Logger metrics for observability
//!
//! Counters describing the dispatcher pipeline: how many records were accepted
//! and routed, how many were dropped, and how often producers hit backpressure.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rust_leveled_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_accepted();
/// metrics.record_routed();
///
/// assert_eq!(metrics.accepted(), 1);
/// assert_eq!(metrics.routed(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records placed on the dispatcher queue
    accepted: AtomicU64,

    /// Records handed to at least one sink
    routed: AtomicU64,

    /// Records dropped because the call site could not be resolved
    dropped: AtomicU64,

    /// Sink writes that returned an error
    write_failures: AtomicU64,

    /// Enqueue attempts that found the dispatcher queue full
    backpressure_events: AtomicU64,

    /// Drains triggered by queue pressure rather than the flush interval
    pressure_drains: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            accepted: AtomicU64::new(0),
            routed: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            backpressure_events: AtomicU64::new(0),
            pressure_drains: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn routed(&self) -> u64 {
        self.routed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn backpressure_events(&self) -> u64 {
        self.backpressure_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn pressure_drains(&self) -> u64 {
        self.pressure_drains.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_accepted(&self) -> u64 {
        self.accepted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_routed(&self) -> u64 {
        self.routed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_backpressure(&self) -> u64 {
        self.backpressure_events.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_pressure_drain(&self) -> u64 {
        self.pressure_drains.fetch_add(1, Ordering::Relaxed)
    }

    /// Records accepted but not yet routed.
    pub fn in_flight(&self) -> u64 {
        self.accepted().saturating_sub(self.routed())
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.accepted.store(0, Ordering::Relaxed);
        self.routed.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.backpressure_events.store(0, Ordering::Relaxed);
        self.pressure_drains.store(0, Ordering::Relaxed);
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
            accepted: AtomicU64::new(self.accepted()),
            routed: AtomicU64::new(self.routed()),
            dropped: AtomicU64::new(self.dropped()),
            write_failures: AtomicU64::new(self.write_failures()),
            backpressure_events: AtomicU64::new(self.backpressure_events()),
            pressure_drains: AtomicU64::new(self.pressure_drains()),
        }
    }
}
