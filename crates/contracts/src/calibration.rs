//! Calibration offsets and unit conversion

use serde::{Deserialize, Serialize};

use crate::Axis;

/// Zero-rate offsets in raw device units
///
/// Zero until the first successful calibration read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationOffsets {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CalibrationOffsets {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Ioctl layout (`int[3]`)
    pub fn to_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[i32; 3]> for CalibrationOffsets {
    fn from(raw: [i32; 3]) -> Self {
        Self::new(raw[0], raw[1], raw[2])
    }
}

/// rad/s per raw unit at the ±2000 °/s full scale of a 16-bit gyro
pub const DEFAULT_GYRO_SCALE: f32 = (2000.0 / 32768.0) * (std::f32::consts::PI / 180.0);

/// Raw-unit to rad/s factors, one per axis
///
/// Signs encode the mounting orientation of the part on the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConversionScale {
    #[serde(default = "default_scale")]
    pub x: f32,
    #[serde(default = "default_scale")]
    pub y: f32,
    #[serde(default = "default_scale")]
    pub z: f32,
}

fn default_scale() -> f32 {
    DEFAULT_GYRO_SCALE
}

impl Default for ConversionScale {
    fn default() -> Self {
        Self::uniform(DEFAULT_GYRO_SCALE)
    }
}

impl ConversionScale {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn uniform(scale: f32) -> Self {
        Self::new(scale, scale, scale)
    }

    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// `(raw - offset) * scale` for one axis
    #[inline]
    pub fn convert(&self, axis: Axis, raw: i32, offsets: &CalibrationOffsets) -> f32 {
        let centered = i64::from(raw) - i64::from(offsets.get(axis));
        centered as f32 * self.get(axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_applies_offset_then_scale() {
        let scale = ConversionScale::new(0.5, -2.0, 1.0);
        let offsets = CalibrationOffsets::new(10, 20, 30);
        assert_eq!(scale.convert(Axis::X, 100, &offsets), 45.0);
        assert_eq!(scale.convert(Axis::Y, 200, &offsets), -360.0);
        assert_eq!(scale.convert(Axis::Z, 300, &offsets), 270.0);
    }

    #[test]
    fn test_convert_does_not_overflow_at_extremes() {
        let scale = ConversionScale::uniform(1.0);
        let offsets = CalibrationOffsets::new(i32::MAX, 0, 0);
        let value = scale.convert(Axis::X, i32::MIN, &offsets);
        assert!(value < -4.0e9);
    }

    #[test]
    fn test_default_scale_is_2000_dps() {
        // 32768 raw units -> 2000 deg/s
        let rad = 32768.0 * DEFAULT_GYRO_SCALE;
        assert!((rad.to_degrees() - 2000.0).abs() < 0.01);
    }

    #[test]
    fn test_offsets_array_round_trip() {
        let offsets = CalibrationOffsets::from([1, -2, 3]);
        assert_eq!(offsets.to_array(), [1, -2, 3]);
        assert_eq!(offsets.get(Axis::Y), -2);
    }
}
