//! Sampling session module.

mod session;
mod stats;

pub use session::{Session, SessionConfig, StopReason};
pub use stats::RunStats;
