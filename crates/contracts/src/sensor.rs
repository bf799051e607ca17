//! GyroSample - Driver output
//!
//! Calibrated angular-velocity sample structure.

use serde::{Deserialize, Serialize};

/// Default handle of the gyroscope in the sensor list
pub const GYRO_HANDLE: SensorHandle = SensorHandle(4);

/// Sensor handle as exposed by the sensor HAL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorHandle(pub i32);

impl std::fmt::Display for SensorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sensor kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Gyroscope,
}

/// Reported accuracy of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorStatus {
    Unreliable,
    AccuracyLow,
    AccuracyMedium,
    #[default]
    AccuracyHigh,
}

/// 3D vector (rad/s for gyro samples)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Finalized gyroscope sample
///
/// An owned snapshot of the accumulator at a sync boundary. Later axis
/// updates never alter a sample that has already been emitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GyroSample {
    /// Emitting sensor
    pub handle: SensorHandle,

    /// Sensor kind
    pub sensor_type: SensorType,

    /// Angular velocity (rad/s)
    pub axes: Vector3,

    /// Accuracy tag
    pub status: SensorStatus,

    /// Monotonic timestamp (ns)
    pub timestamp_ns: i64,
}

impl Default for GyroSample {
    fn default() -> Self {
        Self {
            handle: GYRO_HANDLE,
            sensor_type: SensorType::Gyroscope,
            axes: Vector3::default(),
            status: SensorStatus::default(),
            timestamp_ns: 0,
        }
    }
}
