//! # Driver
//!
//! Gyroscope sensor driver facade.
//!
//! Responsibilities:
//! - Own the control-device lifecycle (lazy open, enable, delay, teardown)
//! - Drive the event source into the axis accumulator
//! - Hold calibration offsets and refresh them on demand
//! - Expose the per-sensor HAL interface (`SensorDriver`)
//! - Support Linux, offline replay and Mock modes
//!
//! ## Platform
//!
//! The `linux` module (control-node ioctls, `/dev/input` discovery) is only
//! built on Linux and Android.

pub mod calibration;
pub mod clock;
pub mod control;
pub mod hal;
pub mod mock;
pub mod offline;
pub mod sensor;

#[cfg(any(target_os = "linux", target_os = "android"))]
pub mod linux;

pub use calibration::CalibrationStore;
pub use clock::SystemClock;
pub use contracts::{DriverError, DriverResult, GyroSample};
pub use control::DeviceControl;
pub use hal::SensorDriver;
pub use mock::{CallLog, Directive, MockConfig, MockDevice, StepClock};
pub use offline::OfflineControl;
pub use sensor::{DeviceState, GyroSensor};

#[cfg(any(target_os = "linux", target_os = "android"))]
pub use linux::{open_gyro, InputNode, L3g4200dControl, LinuxGyro};
