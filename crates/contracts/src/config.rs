//! DriverConfig - Config Loader output
//!
//! Describes the device nodes, axis mapping, unit conversion and reader sizing.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{AxisCodes, CalibrationOffsets, ConversionScale, SensorHandle, SensorStatus, GYRO_HANDLE};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete driver configuration
///
/// Every section has defaults, so an empty document is a valid config for
/// the stock L3G4200D part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Device nodes
    #[serde(default)]
    pub device: DeviceConfig,

    /// Identity and status reported in samples
    #[serde(default)]
    pub sensor: SensorConfig,

    /// Event codes carrying each axis
    #[serde(default)]
    pub axes: AxisCodes,

    /// Raw unit to rad/s factors
    #[serde(default)]
    pub scale: ConversionScale,

    /// Input reader sizing
    #[serde(default)]
    pub reader: ReaderConfig,

    /// Offsets applied when replaying a capture (no control node to ask)
    #[serde(default)]
    pub calibration: CalibrationOffsets,
}

/// Device node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Control character device (enable / delay / calibration ioctls)
    #[serde(default = "default_control_path")]
    pub control_path: PathBuf,

    /// Input device name matched during `/dev/input` discovery
    #[serde(default = "default_input_name")]
    pub input_name: String,

    /// Explicit input node, skips discovery when set
    #[serde(default)]
    pub input_path: Option<PathBuf>,
}

fn default_control_path() -> PathBuf {
    PathBuf::from("/dev/l3g4200d")
}

fn default_input_name() -> String {
    "gyro".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            control_path: default_control_path(),
            input_name: default_input_name(),
            input_path: None,
        }
    }
}

/// Sensor identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Handle stamped on every sample
    #[serde(default = "default_handle")]
    pub handle: SensorHandle,

    /// Initial accuracy tag
    #[serde(default)]
    pub status: SensorStatus,
}

fn default_handle() -> SensorHandle {
    GYRO_HANDLE
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            handle: GYRO_HANDLE,
            status: SensorStatus::default(),
        }
    }
}

/// Input reader configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Records buffered between fills
    #[serde(default = "default_reader_capacity")]
    pub capacity: usize,
}

/// Upper bound for `reader.capacity` (records)
pub const MAX_READER_CAPACITY: usize = 4096;

fn default_reader_capacity() -> usize {
    32
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            capacity: default_reader_capacity(),
        }
    }
}
