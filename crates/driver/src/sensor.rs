//! GyroSensor core implementation
//!
//! Owns the device lifecycle and drives the event source into the axis
//! accumulator.

use contracts::{
    CalibrationOffsets, DriverConfig, DriverError, DriverResult, EventClass, EventSource,
    GyroSample, MonotonicClock, SensorHandle,
};
use ingestion::{AxisAccumulator, IngestionMetrics, MetricsSnapshot};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::calibration::CalibrationStore;
use crate::control::DeviceControl;

const NANOS_PER_MILLI: i64 = 1_000_000;

/// Observable device lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    /// Control handle not open (construction-time open failed)
    Uninitialized,
    HandleOpenDisabled,
    HandleOpenEnabled,
}

/// Gyroscope driver facade
///
/// Single-threaded: one polling loop owns the instance. The control handle
/// is opened at construction and lazily re-opened by any operation that
/// needs it. Dropping the sensor disables it if enabled, then closes the
/// handle.
pub struct GyroSensor<D: DeviceControl, S: EventSource, C: MonotonicClock> {
    device: D,
    source: S,
    clock: C,
    accumulator: AxisAccumulator,
    calibration: CalibrationStore,
    enabled: bool,
    metrics: IngestionMetrics,
}

impl<D: DeviceControl, S: EventSource, C: MonotonicClock> GyroSensor<D, S, C> {
    /// Create a sensor and attempt to open the control handle
    ///
    /// An open failure is logged and leaves the sensor `Uninitialized`;
    /// the next operation that needs the handle retries the open.
    pub fn new(config: &DriverConfig, device: D, source: S, clock: C) -> Self {
        let mut sensor = Self {
            device,
            source,
            clock,
            accumulator: AxisAccumulator::from_config(config),
            calibration: CalibrationStore::new(),
            enabled: false,
            metrics: IngestionMetrics::new(),
        };

        match sensor.ensure_open() {
            Ok(()) => debug!(handle = %config.sensor.handle, "gyro control handle opened"),
            Err(e) => warn!(error = %e, "gyro starts uninitialized"),
        }
        sensor
    }

    /// Seed the calibration store (offline replay of a calibrated capture)
    pub fn with_calibration(mut self, offsets: CalibrationOffsets) -> Self {
        self.calibration = CalibrationStore::with_offsets(offsets);
        self
    }

    fn ensure_open(&mut self) -> DriverResult<()> {
        if self.device.is_open() {
            return Ok(());
        }
        self.device.open().inspect_err(|e| {
            error!(error = %e, "failed to open gyro control device");
            observability::metrics::record_device_error("open");
        })
    }

    /// Handle stamped on emitted samples
    pub fn handle(&self) -> SensorHandle {
        self.accumulator.handle()
    }

    /// Enable or disable sampling
    ///
    /// Requesting the current state is a no-op that performs no device I/O.
    /// The enabled flag only changes when the device accepts the directive.
    #[instrument(name = "gyro_enable", skip(self), fields(current = self.enabled))]
    pub fn enable(&mut self, on: bool) -> DriverResult<()> {
        if on == self.enabled {
            debug!("gyro enable state unchanged");
            return Ok(());
        }

        self.ensure_open()?;
        match self.device.set_enabled(on) {
            Ok(()) => {
                self.enabled = on;
                info!(enabled = on, "gyro enable state changed");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "gyro set_enable failed");
                observability::metrics::record_device_error("set_enable");
                Err(e)
            }
        }
    }

    /// Set the sample interval
    ///
    /// Nanoseconds are truncated to whole milliseconds, so requests below
    /// 1 ms become 0 ms.
    #[instrument(name = "gyro_set_delay", skip(self))]
    pub fn set_delay(&mut self, delay_ns: i64) -> DriverResult<()> {
        if delay_ns < 0 {
            return Err(DriverError::invalid_argument(format!(
                "delay must be non-negative, got {delay_ns} ns"
            )));
        }
        let delay_ms = i32::try_from(delay_ns / NANOS_PER_MILLI).map_err(|_| {
            DriverError::invalid_argument(format!("delay of {delay_ns} ns exceeds i32 ms"))
        })?;

        self.ensure_open()?;
        info!(delay_ms, "gyro update delay");
        match self.device.set_delay_ms(delay_ms) {
            Ok(()) => {
                debug!(delay_ms, "gyro delay applied");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, delay_ms, "gyro set_delay failed");
                observability::metrics::record_device_error("set_delay");
                Err(e)
            }
        }
    }

    /// Whether sampling is enabled (no device I/O)
    pub fn is_activated(&self) -> bool {
        self.enabled
    }

    /// Drain buffered records into `out`
    ///
    /// Returns the number of samples written, one per sync record, never
    /// more than `out.len()`. Records left once `out` is full stay buffered
    /// in the source for the next call. A failed fill is returned before
    /// any record is processed.
    pub fn read_events(&mut self, out: &mut [GyroSample]) -> DriverResult<usize> {
        if out.is_empty() {
            return Err(DriverError::invalid_argument(
                "output buffer must hold at least one sample",
            ));
        }

        if let Err(e) = self.source.fill() {
            self.metrics.record_stream_error();
            warn!(error = %e, "gyro event fill failed");
            return Err(e);
        }

        let offsets = *self.calibration.offsets();
        let mut emitted = 0;
        while emitted < out.len() {
            let Some(event) = self.source.peek() else {
                break;
            };
            self.metrics.record_read();

            match event.class() {
                EventClass::AxisUpdate => {
                    if self
                        .accumulator
                        .apply_event(event.code, event.value, &offsets)
                        .is_some()
                    {
                        self.metrics.record_axis_update();
                    } else {
                        self.metrics.record_unknown();
                        observability::metrics::record_unknown_event(
                            event.event_type,
                            event.code,
                        );
                    }
                }
                EventClass::Sync => {
                    let sample = self.accumulator.finalize(self.clock.now_ns());
                    observability::metrics::record_sample(&sample);
                    out[emitted] = sample;
                    emitted += 1;
                    self.metrics.record_sample();
                }
                EventClass::Other(event_type) => {
                    warn!(event_type, code = event.code, "gyro: unknown event type");
                    self.metrics.record_unknown();
                    observability::metrics::record_unknown_event(event_type, event.code);
                }
            }
            self.source.advance();
        }

        Ok(emitted)
    }

    /// Whether records remain buffered from a previous call
    pub fn has_pending_events(&self) -> bool {
        self.source.has_pending()
    }

    /// Re-read calibration offsets from the device
    ///
    /// All three offsets are replaced together, or none on failure.
    #[instrument(name = "gyro_refresh_calibration", skip(self))]
    pub fn refresh_calibration(&mut self) -> DriverResult<CalibrationOffsets> {
        self.ensure_open()?;
        self.calibration.refresh(&mut self.device)
    }

    /// Offsets applied to conversions
    pub fn calibration(&self) -> CalibrationOffsets {
        *self.calibration.offsets()
    }

    pub fn state(&self) -> DeviceState {
        match (self.device.is_open(), self.enabled) {
            (false, _) => DeviceState::Uninitialized,
            (true, false) => DeviceState::HandleOpenDisabled,
            (true, true) => DeviceState::HandleOpenEnabled,
        }
    }

    /// Ingestion counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<D: DeviceControl, S: EventSource, C: MonotonicClock> Drop for GyroSensor<D, S, C> {
    fn drop(&mut self) {
        if self.enabled {
            if let Err(e) = self.enable(false) {
                warn!(error = %e, "failed to disable gyro on teardown");
            }
        }
        self.device.close();
        debug!("gyro control handle closed");
    }
}
