//! # Ingestion
//!
//! Gyroscope event ingestion module.
//!
//! Responsibilities:
//! - Read fixed-size input-event records from a byte stream (`InputReader`)
//! - Accumulate relative-axis updates into a pending sample (`AxisAccumulator`)
//! - Convert raw units with calibration offsets and per-axis scale
//! - Count records, samples and anomalies (`IngestionMetrics`)
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{AxisAccumulator, InputReader};
//! use contracts::{EventClass, EventSource};
//!
//! let mut reader = InputReader::new(file, 32);
//! let mut acc = AxisAccumulator::from_config(&config);
//! reader.fill()?;
//! while let Some(event) = reader.peek() {
//!     match event.class() {
//!         EventClass::AxisUpdate => { acc.apply_event(event.code, event.value, &offsets); }
//!         EventClass::Sync => samples.push(acc.finalize(clock.now_ns())),
//!         EventClass::Other(_) => {}
//!     }
//!     reader.advance();
//! }
//! ```
//!
//! ## Mock Testing
//!
//! ```ignore
//! use ingestion::MockEventSource;
//!
//! let source = MockEventSource::from_events([RawEvent::relative(REL_RX, 10), RawEvent::sync()]);
//! ```

mod accumulator;
mod metrics;
mod mock;
mod reader;

// Re-exports
pub use accumulator::AxisAccumulator;
pub use contracts::{EventSource, RawEvent};
pub use metrics::{IngestionMetrics, MetricsSnapshot};
pub use mock::{MockEventSource, ScriptedFill};
pub use reader::InputReader;
