//! RawEvent - Event source output
//!
//! Linux input-event records and the event classes the gyro stream uses.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Synchronization boundary event type
pub const EV_SYN: u16 = 0x00;
/// Key event type (not produced by the gyro, listed for diagnostics)
pub const EV_KEY: u16 = 0x01;
/// Relative-axis event type
pub const EV_REL: u16 = 0x02;
/// Absolute-axis event type
pub const EV_ABS: u16 = 0x03;

/// `SYN_REPORT` code
pub const SYN_REPORT: u16 = 0x00;

/// Rotational relative axes
pub const REL_RX: u16 = 0x03;
pub const REL_RY: u16 = 0x04;
pub const REL_RZ: u16 = 0x05;

/// Size of one `struct input_event` record on 64-bit Linux
pub const INPUT_EVENT_SIZE: usize = std::mem::size_of::<InputEventRecord>();

/// Raw `struct input_event` layout (64-bit `timeval`)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct InputEventRecord {
    pub tv_sec: i64,
    pub tv_usec: i64,
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
}

impl InputEventRecord {
    /// Decode one record from exactly `INPUT_EVENT_SIZE` bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != INPUT_EVENT_SIZE {
            return None;
        }
        Some(bytemuck::pod_read_unaligned(bytes))
    }

    /// Record bytes in native layout
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Input event stripped of its kernel timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    pub fn new(event_type: u16, code: u16, value: i32) -> Self {
        Self {
            event_type,
            code,
            value,
        }
    }

    /// Relative-axis update
    pub fn relative(code: u16, value: i32) -> Self {
        Self::new(EV_REL, code, value)
    }

    /// `SYN_REPORT` boundary
    pub fn sync() -> Self {
        Self::new(EV_SYN, SYN_REPORT, 0)
    }

    /// Event class of this record
    pub fn class(&self) -> EventClass {
        EventClass::from_type(self.event_type)
    }

    /// Wrap into a kernel record with the given timestamp
    pub fn to_record(&self, tv_sec: i64, tv_usec: i64) -> InputEventRecord {
        InputEventRecord {
            tv_sec,
            tv_usec,
            event_type: self.event_type,
            code: self.code,
            value: self.value,
        }
    }
}

impl From<InputEventRecord> for RawEvent {
    fn from(record: InputEventRecord) -> Self {
        Self::new(record.event_type, record.code, record.value)
    }
}

/// How the driver treats an event type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    /// Finalizes the pending sample
    Sync,
    /// Updates one axis of the pending sample
    AxisUpdate,
    /// Logged and ignored
    Other(u16),
}

impl EventClass {
    pub fn from_type(event_type: u16) -> Self {
        match event_type {
            EV_SYN => Self::Sync,
            EV_REL => Self::AxisUpdate,
            other => Self::Other(other),
        }
    }
}

/// Gyroscope axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Array index (x=0, y=1, z=2)
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Relative event codes carrying each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisCodes {
    #[serde(default = "default_code_x")]
    pub x: u16,
    #[serde(default = "default_code_y")]
    pub y: u16,
    #[serde(default = "default_code_z")]
    pub z: u16,
}

fn default_code_x() -> u16 {
    REL_RX
}

fn default_code_y() -> u16 {
    REL_RY
}

fn default_code_z() -> u16 {
    REL_RZ
}

impl Default for AxisCodes {
    fn default() -> Self {
        Self {
            x: REL_RX,
            y: REL_RY,
            z: REL_RZ,
        }
    }
}

impl AxisCodes {
    /// Axis for an `EV_REL` code, `None` for unknown codes
    pub fn axis_for(&self, code: u16) -> Option<Axis> {
        if code == self.x {
            Some(Axis::X)
        } else if code == self.y {
            Some(Axis::Y)
        } else if code == self.z {
            Some(Axis::Z)
        } else {
            None
        }
    }

    /// Event code for an axis
    pub fn code_for(&self, axis: Axis) -> u16 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// True when no two axes share a code
    pub fn is_distinct(&self) -> bool {
        self.x != self.y && self.y != self.z && self.x != self.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_size_matches_kernel_layout() {
        assert_eq!(INPUT_EVENT_SIZE, 24);
    }

    #[test]
    fn test_record_decode() {
        let record = RawEvent::relative(REL_RY, -42).to_record(10, 500);
        let decoded = InputEventRecord::from_bytes(record.as_bytes()).unwrap();
        assert_eq!(decoded.tv_sec, 10);
        assert_eq!(RawEvent::from(decoded), RawEvent::relative(REL_RY, -42));
        assert!(InputEventRecord::from_bytes(&[0u8; 16]).is_none());
    }

    #[test]
    fn test_event_class() {
        assert_eq!(RawEvent::sync().class(), EventClass::Sync);
        assert_eq!(RawEvent::relative(REL_RX, 1).class(), EventClass::AxisUpdate);
        assert_eq!(RawEvent::new(EV_ABS, 0, 1).class(), EventClass::Other(EV_ABS));
    }

    #[test]
    fn test_axis_codes_lookup() {
        let codes = AxisCodes::default();
        assert_eq!(codes.axis_for(REL_RX), Some(Axis::X));
        assert_eq!(codes.axis_for(REL_RZ), Some(Axis::Z));
        assert_eq!(codes.axis_for(0x09), None);
        assert_eq!(codes.code_for(Axis::Y), REL_RY);
        assert!(codes.is_distinct());
        assert!(!AxisCodes { x: 1, y: 1, z: 2 }.is_distinct());
    }
}
