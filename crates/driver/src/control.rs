//! Device control channel abstraction
//!
//! Directive-based control of the gyro part: enable, sample interval and
//! calibration readout. The Linux implementation issues ioctls on the
//! control node; tests use [`MockDevice`](crate::MockDevice).

use contracts::{CalibrationOffsets, DriverResult};

/// Device control trait
///
/// Every failure is reported as
/// [`DriverError::DeviceIo`](contracts::DriverError::DeviceIo) carrying the
/// operation name and the OS error code. Implementations never retry.
pub trait DeviceControl {
    /// Acquire the control handle
    ///
    /// Calling `open` on an already open device is a no-op.
    fn open(&mut self) -> DriverResult<()>;

    /// Whether the control handle is currently valid
    fn is_open(&self) -> bool;

    /// Release the control handle (idempotent)
    fn close(&mut self);

    /// Enable or disable sampling
    fn set_enabled(&mut self, enabled: bool) -> DriverResult<()>;

    /// Set the sample interval in milliseconds
    fn set_delay_ms(&mut self, delay_ms: i32) -> DriverResult<()>;

    /// Read the three zero-rate offsets in one directive
    fn read_calibration(&mut self) -> DriverResult<CalibrationOffsets>;
}

impl<T: DeviceControl + ?Sized> DeviceControl for Box<T> {
    fn open(&mut self) -> DriverResult<()> {
        (**self).open()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn set_enabled(&mut self, enabled: bool) -> DriverResult<()> {
        (**self).set_enabled(enabled)
    }

    fn set_delay_ms(&mut self, delay_ms: i32) -> DriverResult<()> {
        (**self).set_delay_ms(delay_ms)
    }

    fn read_calibration(&mut self) -> DriverResult<CalibrationOffsets> {
        (**self).read_calibration()
    }
}
