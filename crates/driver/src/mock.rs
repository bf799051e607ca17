//! Mock device control
//!
//! In-memory test double for the control channel with per-operation failure
//! injection and a shared call log.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicI64, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use contracts::{CalibrationOffsets, DriverError, DriverResult, MonotonicClock};
use tracing::{debug, instrument};

use crate::control::DeviceControl;

/// `EBADF`, returned by directives issued on a closed mock
const EBADF: i32 = 9;

/// Mock device configuration
///
/// Each `fail_*` field holds the errno the matching operation fails with.
#[derive(Debug, Default, Clone)]
pub struct MockConfig {
    /// Open fails with this errno
    pub fail_open: Option<i32>,
    /// Enable / disable fails with this errno
    pub fail_enable: Option<i32>,
    /// Delay fails with this errno
    pub fail_delay: Option<i32>,
    /// Calibration read fails with this errno
    pub fail_calibration: Option<i32>,
    /// Offsets reported by a successful calibration read
    pub calibration: CalibrationOffsets,
}

/// Directive recorded by the mock, in call order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Open,
    Close,
    SetEnabled(bool),
    SetDelay(i32),
    ReadCalibration,
}

/// Shared call log
///
/// Failed directives are logged too: the log counts invocations, not
/// successes.
#[derive(Debug, Default)]
pub struct CallLog {
    opens: AtomicU32,
    closes: AtomicU32,
    enables: AtomicU32,
    delays: AtomicU32,
    calibrations: AtomicU32,
    last_delay_ms: AtomicI32,
    hw_enabled: AtomicBool,
    directives: Mutex<Vec<Directive>>,
}

impl CallLog {
    fn push(&self, directive: Directive) {
        let counter = match directive {
            Directive::Open => &self.opens,
            Directive::Close => &self.closes,
            Directive::SetEnabled(_) => &self.enables,
            Directive::SetDelay(_) => &self.delays,
            Directive::ReadCalibration => &self.calibrations,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        self.directives
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(directive);
    }

    pub fn open_count(&self) -> u32 {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> u32 {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn enable_count(&self) -> u32 {
        self.enables.load(Ordering::SeqCst)
    }

    pub fn delay_count(&self) -> u32 {
        self.delays.load(Ordering::SeqCst)
    }

    pub fn calibration_count(&self) -> u32 {
        self.calibrations.load(Ordering::SeqCst)
    }

    /// Last delay accepted by the device (ms)
    pub fn last_delay_ms(&self) -> i32 {
        self.last_delay_ms.load(Ordering::SeqCst)
    }

    /// Enable state as seen by the "hardware"
    pub fn hw_enabled(&self) -> bool {
        self.hw_enabled.load(Ordering::SeqCst)
    }

    /// Total directives of any kind
    pub fn total(&self) -> usize {
        self.directives.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// All directives in call order
    pub fn directives(&self) -> Vec<Directive> {
        self.directives
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Mock control device
pub struct MockDevice {
    config: Arc<Mutex<MockConfig>>,
    log: Arc<CallLog>,
    open: bool,
}

impl MockDevice {
    /// Create default mock device
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create mock device with configuration
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
            log: Arc::new(CallLog::default()),
            open: false,
        }
    }

    /// Call log shared with the test body
    pub fn log(&self) -> Arc<CallLog> {
        Arc::clone(&self.log)
    }

    /// Configuration handle, changes apply to later calls
    pub fn config_handle(&self) -> Arc<Mutex<MockConfig>> {
        Arc::clone(&self.config)
    }

    fn config(&self) -> MockConfig {
        self.config
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn ensure_open(&self, operation: &'static str) -> DriverResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(DriverError::DeviceIo {
                operation,
                errno: EBADF,
            })
        }
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceControl for MockDevice {
    #[instrument(name = "mock_device_open", skip(self))]
    fn open(&mut self) -> DriverResult<()> {
        if self.open {
            return Ok(());
        }
        self.log.push(Directive::Open);
        if let Some(errno) = self.config().fail_open {
            return Err(DriverError::DeviceIo {
                operation: "open",
                errno,
            });
        }
        self.open = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        if self.open {
            self.log.push(Directive::Close);
            self.open = false;
        }
    }

    #[instrument(name = "mock_device_set_enabled", skip(self))]
    fn set_enabled(&mut self, enabled: bool) -> DriverResult<()> {
        self.log.push(Directive::SetEnabled(enabled));
        self.ensure_open("set_enable")?;
        if let Some(errno) = self.config().fail_enable {
            return Err(DriverError::DeviceIo {
                operation: "set_enable",
                errno,
            });
        }
        self.log.hw_enabled.store(enabled, Ordering::SeqCst);
        Ok(())
    }

    #[instrument(name = "mock_device_set_delay", skip(self))]
    fn set_delay_ms(&mut self, delay_ms: i32) -> DriverResult<()> {
        self.log.push(Directive::SetDelay(delay_ms));
        self.ensure_open("set_delay")?;
        if let Some(errno) = self.config().fail_delay {
            return Err(DriverError::DeviceIo {
                operation: "set_delay",
                errno,
            });
        }
        self.log.last_delay_ms.store(delay_ms, Ordering::SeqCst);
        Ok(())
    }

    fn read_calibration(&mut self) -> DriverResult<CalibrationOffsets> {
        self.log.push(Directive::ReadCalibration);
        self.ensure_open("get_calibration")?;
        let config = self.config();
        if let Some(errno) = config.fail_calibration {
            return Err(DriverError::DeviceIo {
                operation: "get_calibration",
                errno,
            });
        }
        debug!(offsets = ?config.calibration, "mock calibration read");
        Ok(config.calibration)
    }
}

/// Deterministic clock
///
/// Each reading returns the current value, then moves forward by `step`.
#[derive(Debug)]
pub struct StepClock {
    next: AtomicI64,
    step: i64,
}

impl StepClock {
    pub fn new(start_ns: i64, step_ns: i64) -> Self {
        Self {
            next: AtomicI64::new(start_ns),
            step: step_ns,
        }
    }
}

impl Default for StepClock {
    fn default() -> Self {
        Self::new(1_000, 1_000)
    }
}

impl MonotonicClock for StepClock {
    fn now_ns(&self) -> i64 {
        self.next.fetch_add(self.step, Ordering::SeqCst)
    }
}
