//! Calibration store
//!
//! Instance-owned zero-rate offsets, refreshed on demand from the device.

use contracts::{CalibrationOffsets, DriverResult};
use tracing::{error, info};

use crate::control::DeviceControl;

/// Calibration offsets owned by one sensor instance
///
/// Offsets start at zero and change only through [`refresh`](Self::refresh).
#[derive(Debug, Clone, Copy, Default)]
pub struct CalibrationStore {
    offsets: CalibrationOffsets,
    calibrated: bool,
}

impl CalibrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with known offsets (replay of a calibrated capture)
    pub fn with_offsets(offsets: CalibrationOffsets) -> Self {
        Self {
            offsets,
            calibrated: true,
        }
    }

    /// Offsets applied to every conversion
    pub fn offsets(&self) -> &CalibrationOffsets {
        &self.offsets
    }

    /// True once a device read has succeeded
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Query the device and replace all three offsets
    ///
    /// On failure the previous offsets are kept untouched.
    pub fn refresh<D: DeviceControl + ?Sized>(
        &mut self,
        device: &mut D,
    ) -> DriverResult<CalibrationOffsets> {
        match device.read_calibration() {
            Ok(offsets) => {
                self.offsets = offsets;
                self.calibrated = true;
                info!(
                    x = offsets.x,
                    y = offsets.y,
                    z = offsets.z,
                    "gyro calibration loaded"
                );
                observability::metrics::record_calibration(&offsets);
                Ok(offsets)
            }
            Err(e) => {
                error!(error = %e, "failed to read gyro calibration");
                observability::metrics::record_device_error("get_calibration");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockConfig, MockDevice};

    #[test]
    fn test_refresh_replaces_offsets() {
        let mut device = MockDevice::with_config(MockConfig {
            calibration: CalibrationOffsets::new(1, -2, 3),
            ..Default::default()
        });
        device.open().unwrap();

        let mut store = CalibrationStore::new();
        assert!(!store.is_calibrated());

        let offsets = store.refresh(&mut device).unwrap();
        assert_eq!(offsets, CalibrationOffsets::new(1, -2, 3));
        assert_eq!(*store.offsets(), offsets);
        assert!(store.is_calibrated());
    }

    #[test]
    fn test_failed_refresh_keeps_previous_offsets() {
        let mut device = MockDevice::with_config(MockConfig {
            fail_calibration: Some(5),
            ..Default::default()
        });
        device.open().unwrap();

        let mut store = CalibrationStore::with_offsets(CalibrationOffsets::new(7, 8, 9));
        let err = store.refresh(&mut device).unwrap_err();

        assert_eq!(err.errno(), 5);
        assert_eq!(*store.offsets(), CalibrationOffsets::new(7, 8, 9));
    }
}
