//! Sensor HAL interface
//!
//! Per-sensor entry points as seen by the sensor service. Results use the
//! negative-errno convention through [`DriverError::status`](contracts::DriverError::status).

use contracts::{DriverResult, EventSource, GyroSample, MonotonicClock, SensorHandle};

use crate::control::DeviceControl;
use crate::sensor::GyroSensor;

/// Sensor driver trait
pub trait SensorDriver {
    /// Handle this driver answers for
    fn handle(&self) -> SensorHandle;

    /// Enable or disable the sensor behind `handle`
    fn enable(&mut self, handle: SensorHandle, on: bool) -> DriverResult<()>;

    /// Set the sample interval in nanoseconds
    fn set_delay(&mut self, handle: SensorHandle, delay_ns: i64) -> DriverResult<()>;

    fn is_activated(&self, handle: SensorHandle) -> bool;

    /// Write up to `out.len()` samples, returns how many were written
    fn read_events(&mut self, out: &mut [GyroSample]) -> DriverResult<usize>;

    /// True when a previous read left records buffered
    fn has_pending_events(&self) -> bool;
}

/// The gyro drives a single sensor, so the handle argument is not consulted.
impl<D: DeviceControl, S: EventSource, C: MonotonicClock> SensorDriver for GyroSensor<D, S, C> {
    fn handle(&self) -> SensorHandle {
        GyroSensor::handle(self)
    }

    fn enable(&mut self, _handle: SensorHandle, on: bool) -> DriverResult<()> {
        GyroSensor::enable(self, on)
    }

    fn set_delay(&mut self, _handle: SensorHandle, delay_ns: i64) -> DriverResult<()> {
        GyroSensor::set_delay(self, delay_ns)
    }

    fn is_activated(&self, _handle: SensorHandle) -> bool {
        GyroSensor::is_activated(self)
    }

    fn read_events(&mut self, out: &mut [GyroSample]) -> DriverResult<usize> {
        GyroSensor::read_events(self, out)
    }

    fn has_pending_events(&self) -> bool {
        GyroSensor::has_pending_events(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDevice, StepClock};
    use contracts::{DriverConfig, RawEvent, REL_RZ};
    use ingestion::MockEventSource;

    fn boxed() -> Box<dyn SensorDriver> {
        let source =
            MockEventSource::from_events([RawEvent::relative(REL_RZ, 1), RawEvent::sync()]);
        Box::new(GyroSensor::new(
            &DriverConfig::default(),
            MockDevice::new(),
            source,
            StepClock::default(),
        ))
    }

    #[test]
    fn test_handle_argument_is_ignored() {
        let mut driver = boxed();
        driver.enable(SensorHandle(99), true).unwrap();
        assert!(driver.is_activated(SensorHandle(0)));
        assert_eq!(driver.handle(), contracts::GYRO_HANDLE);
    }

    #[test]
    fn test_status_convention() {
        let mut driver = boxed();
        let handle = driver.handle();
        let err = driver.set_delay(handle, -5).unwrap_err();
        assert_eq!(err.status(), -22);

        let mut out = [GyroSample::default(); 1];
        assert_eq!(driver.read_events(&mut out).unwrap(), 1);
        assert!(!driver.has_pending_events());
    }
}
