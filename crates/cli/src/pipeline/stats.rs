//! Run statistics.

use std::time::Duration;

use ingestion::MetricsSnapshot;
use observability::SampleStatsAggregator;

use super::StopReason;

/// Statistics from a sampling run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Samples read from the driver
    pub samples: u64,

    /// `read_events` calls
    pub reads: u64,

    /// Reads that returned no sample
    pub empty_reads: u64,

    /// Total duration of the run
    pub duration: Duration,

    /// Why the run ended
    pub stop_reason: Option<StopReason>,

    /// Driver ingestion counters at the end of the run
    pub ingestion: MetricsSnapshot,

    /// Per-axis sample statistics
    pub sample_stats: SampleStatsAggregator,
}

impl RunStats {
    /// Samples per second of wall time
    pub fn sample_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.samples as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Gyro Run Statistics                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Samples: {}", self.samples);
        println!("   ├─ Reads: {} ({} empty)", self.reads, self.empty_reads);
        println!("   ├─ Rate: {:.2} samples/s", self.sample_rate());
        match self.stop_reason {
            Some(reason) => println!("   └─ Stopped: {reason}"),
            None => println!("   └─ Stopped: -"),
        }

        let ingestion = &self.ingestion;
        println!("\n📥 Ingestion");
        println!("   ├─ Records read: {}", ingestion.records_read);
        println!("   ├─ Axis updates: {}", ingestion.axis_updates);
        println!("   ├─ Unknown events: {}", ingestion.unknown_events);
        println!("   └─ Stream errors: {}", ingestion.stream_errors);

        let summary = self.sample_stats.summary();
        println!("\n📈 Angular Velocity (rad/s)");
        println!("   ├─ X: {}", summary.x);
        println!("   ├─ Y: {}", summary.y);
        println!("   ├─ Z: {}", summary.z);
        println!("   ├─ |w|: {}", summary.magnitude);
        println!("   └─ Interval (ms): {}", summary.interval_ms);

        println!();
    }
}
