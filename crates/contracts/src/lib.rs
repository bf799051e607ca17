//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Units
//! - Raw axis values are signed device units, offsets share that unit
//! - Emitted samples carry rad/s and a monotonic nanosecond timestamp

mod calibration;
mod config;
mod error;
mod event;
mod event_source;
mod sensor;

pub use calibration::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use event_source::{EventSource, MonotonicClock};
pub use sensor::*;
