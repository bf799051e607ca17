//! Axis accumulator
//!
//! Holds the in-progress sample between sync boundaries and converts raw
//! axis values to rad/s.

use contracts::{
    Axis, AxisCodes, CalibrationOffsets, ConversionScale, DriverConfig, GyroSample, SensorHandle,
    SensorStatus, SensorType, Vector3,
};
use tracing::{trace, warn};

/// Pending-sample state machine
///
/// Each axis update overwrites that axis only (last value wins until the
/// next sync). Values persist across syncs: an axis that receives no update
/// repeats its previous value in the next sample.
#[derive(Debug, Clone)]
pub struct AxisAccumulator {
    handle: SensorHandle,
    status: SensorStatus,
    axes: Vector3,
    scale: ConversionScale,
    codes: AxisCodes,
}

impl AxisAccumulator {
    pub fn new(
        handle: SensorHandle,
        status: SensorStatus,
        scale: ConversionScale,
        codes: AxisCodes,
    ) -> Self {
        Self {
            handle,
            status,
            axes: Vector3::default(),
            scale,
            codes,
        }
    }

    pub fn from_config(config: &DriverConfig) -> Self {
        Self::new(
            config.sensor.handle,
            config.sensor.status,
            config.scale,
            config.axes,
        )
    }

    /// Set one axis to `(raw - offset) * scale`
    #[inline]
    pub fn apply_axis_update(&mut self, axis: Axis, raw: i32, offsets: &CalibrationOffsets) {
        let value = self.scale.convert(axis, raw, offsets);
        match axis {
            Axis::X => self.axes.x = value,
            Axis::Y => self.axes.y = value,
            Axis::Z => self.axes.z = value,
        }
        trace!(?axis, raw, value, "axis updated");
    }

    /// Route a relative event by code
    ///
    /// Unknown codes are logged and leave the pending sample untouched.
    /// Returns the axis that was updated.
    pub fn apply_event(
        &mut self,
        code: u16,
        raw: i32,
        offsets: &CalibrationOffsets,
    ) -> Option<Axis> {
        match self.codes.axis_for(code) {
            Some(axis) => {
                self.apply_axis_update(axis, raw, offsets);
                Some(axis)
            }
            None => {
                warn!(code, value = raw, "gyro: unknown relative event code");
                None
            }
        }
    }

    /// Snapshot the pending sample at `timestamp_ns`
    pub fn finalize(&mut self, timestamp_ns: i64) -> GyroSample {
        GyroSample {
            handle: self.handle,
            sensor_type: SensorType::Gyroscope,
            axes: self.axes,
            status: self.status,
            timestamp_ns,
        }
    }

    /// Current axis values (rad/s)
    pub fn axes(&self) -> Vector3 {
        self.axes
    }

    pub fn handle(&self) -> SensorHandle {
        self.handle
    }
}
