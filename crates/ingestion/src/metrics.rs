//! Ingestion counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Raw records consumed
    pub records_read: AtomicU64,

    /// Axis updates applied
    pub axis_updates: AtomicU64,

    /// Samples written to caller buffers
    pub samples_emitted: AtomicU64,

    /// Unknown event types or codes
    pub unknown_events: AtomicU64,

    /// Failed stream reads
    pub stream_errors: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_read(&self) {
        self.records_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_axis_update(&self) {
        self.axis_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sample(&self) {
        self.samples_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unknown(&self) {
        self.unknown_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stream_error(&self) {
        self.stream_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_read: self.records_read.load(Ordering::Relaxed),
            axis_updates: self.axis_updates.load(Ordering::Relaxed),
            samples_emitted: self.samples_emitted.load(Ordering::Relaxed),
            unknown_events: self.unknown_events.load(Ordering::Relaxed),
            stream_errors: self.stream_errors.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub records_read: u64,
    pub axis_updates: u64,
    pub samples_emitted: u64,
    pub unknown_events: u64,
    pub stream_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = IngestionMetrics::new();
        metrics.record_read();
        metrics.record_read();
        metrics.record_sample();
        metrics.record_unknown();

        let snap = metrics.snapshot();
        assert_eq!(snap.records_read, 2);
        assert_eq!(snap.samples_emitted, 1);
        assert_eq!(snap.unknown_events, 1);
        assert_eq!(snap.stream_errors, 0);
    }
}
