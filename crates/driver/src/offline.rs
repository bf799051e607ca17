//! Offline control device
//!
//! Stands in for the control node when replaying a captured event stream.

use contracts::{CalibrationOffsets, DriverResult};
use tracing::debug;

use crate::control::DeviceControl;

/// Control device without hardware
///
/// Accepts every directive and reports fixed calibration offsets.
#[derive(Debug, Clone, Default)]
pub struct OfflineControl {
    offsets: CalibrationOffsets,
    open: bool,
    enabled: bool,
    delay_ms: Option<i32>,
}

impl OfflineControl {
    pub fn new(offsets: CalibrationOffsets) -> Self {
        Self {
            offsets,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Last requested delay, if any
    pub fn delay_ms(&self) -> Option<i32> {
        self.delay_ms
    }
}

impl DeviceControl for OfflineControl {
    fn open(&mut self) -> DriverResult<()> {
        self.open = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn set_enabled(&mut self, enabled: bool) -> DriverResult<()> {
        debug!(enabled, "offline enable");
        self.enabled = enabled;
        Ok(())
    }

    fn set_delay_ms(&mut self, delay_ms: i32) -> DriverResult<()> {
        debug!(delay_ms, "offline delay");
        self.delay_ms = Some(delay_ms);
        Ok(())
    }

    fn read_calibration(&mut self) -> DriverResult<CalibrationOffsets> {
        Ok(self.offsets)
    }
}
