//! Blocking sampling session.
//!
//! Drives a [`GyroSensor`] through enable, delay and optional calibration,
//! then drains samples until a stop condition is met.

use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use contracts::{EventSource, GyroSample, MonotonicClock};
use driver::{DeviceControl, GyroSensor};
use tracing::{debug, info, warn};

use super::RunStats;
use crate::error::{CliError, Result};

/// Session settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sample interval in nanoseconds
    pub delay_ns: i64,

    /// Refresh calibration before sampling
    pub calibrate: bool,

    /// Samples requested per read
    pub batch: usize,

    /// Stop after this many samples
    pub max_samples: Option<u64>,

    /// Emit each sample as a JSON line
    pub print: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            delay_ns: 20_000_000,
            calibrate: false,
            batch: 16,
            max_samples: None,
            print: false,
        }
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxSamples,
    Exhausted,
    Shutdown,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::MaxSamples => write!(f, "sample limit reached"),
            StopReason::Exhausted => write!(f, "end of stream"),
            StopReason::Shutdown => write!(f, "shutdown requested"),
        }
    }
}

/// Sampling session
pub struct Session {
    config: SessionConfig,
    shutdown: Arc<AtomicBool>,
}

impl Session {
    pub fn new(config: SessionConfig, shutdown: Arc<AtomicBool>) -> Self {
        Self { config, shutdown }
    }

    /// Run against stdout
    pub fn run<D, S, C>(&self, sensor: &mut GyroSensor<D, S, C>) -> Result<RunStats>
    where
        D: DeviceControl,
        S: EventSource,
        C: MonotonicClock,
    {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(sensor, &mut out)
    }

    /// Run, writing JSON lines to `out` when printing is enabled
    ///
    /// The sensor is disabled again before returning, also when sampling
    /// fails part way.
    pub fn run_with_output<D, S, C, W>(
        &self,
        sensor: &mut GyroSensor<D, S, C>,
        out: &mut W,
    ) -> Result<RunStats>
    where
        D: DeviceControl,
        S: EventSource,
        C: MonotonicClock,
        W: Write,
    {
        sensor
            .enable(true)
            .map_err(|e| CliError::driver("enable", e))?;

        let result = self.sample(sensor, out);

        if let Err(e) = sensor.enable(false) {
            warn!(error = %e, "failed to disable gyro after session");
            if result.is_ok() {
                return Err(CliError::driver("disable", e));
            }
        }
        result
    }

    fn sample<D, S, C, W>(&self, sensor: &mut GyroSensor<D, S, C>, out: &mut W) -> Result<RunStats>
    where
        D: DeviceControl,
        S: EventSource,
        C: MonotonicClock,
        W: Write,
    {
        sensor
            .set_delay(self.config.delay_ns)
            .map_err(|e| CliError::driver("set_delay", e))?;

        if self.config.calibrate {
            let offsets = sensor
                .refresh_calibration()
                .map_err(|e| CliError::driver("get_calibration", e))?;
            info!(x = offsets.x, y = offsets.y, z = offsets.z, "calibration loaded");
        }

        let mut stats = RunStats::default();
        let mut buf = vec![GyroSample::default(); self.config.batch.max(1)];
        let started = Instant::now();

        let reason = loop {
            if self.shutdown.load(Ordering::Relaxed) {
                break StopReason::Shutdown;
            }

            let want = match self.config.max_samples {
                Some(max) if stats.samples >= max => break StopReason::MaxSamples,
                Some(max) => buf.len().min((max - stats.samples) as usize),
                None => buf.len(),
            };

            let n = sensor
                .read_events(&mut buf[..want])
                .map_err(|e| CliError::driver("read_events", e))?;
            stats.reads += 1;
            observability::record_read_batch(n);

            if n == 0 {
                stats.empty_reads += 1;
                if sensor.source().is_exhausted() && !sensor.has_pending_events() {
                    break StopReason::Exhausted;
                }
                continue;
            }

            for sample in &buf[..n] {
                stats.sample_stats.update(sample);
                if self.config.print {
                    let line = serde_json::to_string(sample).map_err(std::io::Error::other)?;
                    writeln!(out, "{line}")?;
                }
            }
            stats.samples += n as u64;
        };

        stats.duration = started.elapsed();
        stats.stop_reason = Some(reason);
        stats.ingestion = sensor.metrics();
        debug!(samples = stats.samples, reason = %reason, "session finished");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ConversionScale, DriverConfig, DriverError, RawEvent, REL_RX, REL_RZ};
    use driver::{MockConfig, MockDevice, StepClock};
    use ingestion::MockEventSource;

    fn unit_config() -> DriverConfig {
        DriverConfig {
            scale: ConversionScale::uniform(1.0),
            ..Default::default()
        }
    }

    fn source(samples: usize) -> MockEventSource {
        let events: Vec<RawEvent> = (0..samples)
            .flat_map(|i| [RawEvent::relative(REL_RX, i as i32), RawEvent::sync()])
            .collect();
        MockEventSource::from_events(events)
    }

    fn session(config: SessionConfig) -> Session {
        Session::new(config, Arc::new(AtomicBool::new(false)))
    }

    #[test]
    fn test_runs_until_stream_exhausted() {
        let device = MockDevice::new();
        let log = device.log();
        let mut sensor = GyroSensor::new(&unit_config(), device, source(5), StepClock::default());

        let mut out = Vec::new();
        let stats = session(SessionConfig::default())
            .run_with_output(&mut sensor, &mut out)
            .unwrap();

        assert_eq!(stats.samples, 5);
        assert_eq!(stats.stop_reason, Some(StopReason::Exhausted));
        assert_eq!(stats.ingestion.samples_emitted, 5);
        assert!(out.is_empty());
        assert_eq!(log.last_delay_ms(), 20);
        assert!(!sensor.is_activated());
    }

    #[test]
    fn test_max_samples_limits_consumption() {
        let mut sensor =
            GyroSensor::new(&unit_config(), MockDevice::new(), source(10), StepClock::default());

        let stats = session(SessionConfig {
            batch: 4,
            max_samples: Some(6),
            ..Default::default()
        })
        .run_with_output(&mut sensor, &mut Vec::<u8>::new())
        .unwrap();

        assert_eq!(stats.samples, 6);
        assert_eq!(stats.stop_reason, Some(StopReason::MaxSamples));
        // the remaining samples stay buffered in the source
        assert!(sensor.has_pending_events());
    }

    #[test]
    fn test_print_writes_json_lines() {
        let source =
            MockEventSource::from_events([RawEvent::relative(REL_RZ, 3), RawEvent::sync()]);
        let mut sensor = GyroSensor::new(&unit_config(), MockDevice::new(), source, StepClock::default());

        let mut out = Vec::new();
        session(SessionConfig {
            print: true,
            ..Default::default()
        })
        .run_with_output(&mut sensor, &mut out)
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["axes"]["z"], 3.0);
    }

    #[test]
    fn test_shutdown_flag_stops_before_reading() {
        let mut sensor =
            GyroSensor::new(&unit_config(), MockDevice::new(), source(3), StepClock::default());
        let session = Session::new(SessionConfig::default(), Arc::new(AtomicBool::new(true)));

        let stats = session.run_with_output(&mut sensor, &mut Vec::<u8>::new()).unwrap();
        assert_eq!(stats.samples, 0);
        assert_eq!(stats.stop_reason, Some(StopReason::Shutdown));
    }

    #[test]
    fn test_invalid_delay_disables_sensor() {
        let device = MockDevice::new();
        let log = device.log();
        let mut sensor = GyroSensor::new(&unit_config(), device, source(1), StepClock::default());

        let err = session(SessionConfig {
            delay_ns: -1,
            ..Default::default()
        })
        .run_with_output(&mut sensor, &mut Vec::<u8>::new())
        .unwrap_err();

        match err {
            CliError::Driver { operation, status, .. } => {
                assert_eq!(operation, "set_delay");
                assert_eq!(status, -22);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!log.hw_enabled());
    }

    #[test]
    fn test_calibration_failure_is_reported() {
        let device = MockDevice::with_config(MockConfig {
            fail_calibration: Some(5),
            ..Default::default()
        });
        let mut sensor = GyroSensor::new(&unit_config(), device, source(1), StepClock::default());

        let err = session(SessionConfig {
            calibrate: true,
            ..Default::default()
        })
        .run_with_output(&mut sensor, &mut Vec::<u8>::new())
        .unwrap_err();

        assert!(matches!(
            err,
            CliError::Driver {
                source: DriverError::DeviceIo { errno: 5, .. },
                ..
            }
        ));
    }
}
