//! `record` command implementation.
//!
//! Samples the gyro through the driver facade while copying every raw input
//! event byte it reads into a file that `run --replay` can read back.

use anyhow::Result;
use std::io::{self, Read, Write};

use contracts::{CalibrationOffsets, DriverConfig};
use driver::{DeviceControl, GyroSensor, SystemClock};
use ingestion::InputReader;
use tracing::{info, warn};

use crate::cli::RecordArgs;
use crate::error::CliError;
use crate::pipeline::{RunStats, Session};

/// Reader that copies everything it reads into `sink`
pub(crate) struct TeeReader<R, W> {
    inner: R,
    sink: W,
    written: u64,
}

impl<R: Read, W: Write> TeeReader<R, W> {
    pub(crate) fn new(inner: R, sink: W) -> Self {
        Self {
            inner,
            sink,
            written: 0,
        }
    }

    /// Bytes copied to the sink so far
    pub(crate) fn written(&self) -> u64 {
        self.written
    }
}

impl<R: Read, W: Write> Read for TeeReader<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.sink.write_all(&buf[..n])?;
        self.written += n as u64;
        Ok(n)
    }
}

/// Outcome of a recording
#[derive(Debug)]
pub(crate) struct Recording {
    pub stats: RunStats,
    pub bytes: u64,
    pub calibration: Option<CalibrationOffsets>,
}

/// Record through the facade
///
/// The sensor is disabled and closed before this returns, whatever the
/// outcome. Calibration is read best effort so the capture can be replayed
/// with the same offsets.
pub(crate) fn record_session<D, R, W>(
    config: &DriverConfig,
    device: D,
    input: R,
    output: W,
    session: &Session,
) -> Result<Recording, CliError>
where
    D: DeviceControl,
    R: Read,
    W: Write,
{
    let source = InputReader::new(TeeReader::new(input, output), config.reader.capacity);
    let mut sensor = GyroSensor::new(config, device, source, SystemClock);

    let calibration = match sensor.refresh_calibration() {
        Ok(offsets) => Some(offsets),
        Err(e) => {
            warn!(error = %e, "calibration unavailable, capture has no offsets");
            None
        }
    };

    let stats = session.run(&mut sensor)?;
    Ok(Recording {
        stats,
        bytes: sensor.source().get_ref().written(),
        calibration,
    })
}

/// Execute the `record` command
#[cfg(any(target_os = "linux", target_os = "android"))]
pub async fn run_record(args: &RecordArgs) -> Result<()> {
    use anyhow::Context;
    use std::fs::File;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use driver::{InputNode, L3g4200dControl};

    use super::signal::setup_shutdown_signal;
    use crate::pipeline::SessionConfig;

    let config = super::run::load_config(args.config.as_deref())?;

    // nothing touches the device until the output exists
    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let input_path = driver::linux::resolve_input_path(&config.device)
        .map_err(|e| CliError::device_unavailable(e.to_string()))?;
    let node = InputNode::open(&input_path, Duration::from_millis(200))
        .with_context(|| format!("Failed to open {}", input_path.display()))?;

    info!(
        input = %input_path.display(),
        output = %args.output.display(),
        delay_ns = args.delay_ns,
        count = args.count,
        "Recording raw gyro events"
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let session = Session::new(
        SessionConfig {
            delay_ns: args.delay_ns,
            max_samples: if args.count == 0 { None } else { Some(args.count) },
            ..Default::default()
        },
        Arc::clone(&shutdown),
    );
    let control = L3g4200dControl::new(&config.device.control_path);

    let mut task = tokio::task::spawn_blocking(move || {
        record_session(&config, control, node, file, &session)
    });

    let joined = tokio::select! {
        joined = &mut task => joined,
        _ = setup_shutdown_signal() => {
            warn!("Received shutdown signal, stopping recording...");
            shutdown.store(true, Ordering::Relaxed);
            task.await
        }
    };

    let recording = joined
        .context("Recording task panicked")?
        .context("Recording failed")?;

    info!(
        samples = recording.stats.samples,
        bytes = recording.bytes,
        output = %args.output.display(),
        "Recording finished"
    );
    println!(
        "Recorded {} samples ({} bytes) to {}",
        recording.stats.samples,
        recording.bytes,
        args.output.display()
    );
    if let Some(offsets) = recording.calibration {
        println!("\nReplay with these offsets in the config:\n");
        println!("[calibration]\nx = {}\ny = {}\nz = {}", offsets.x, offsets.y, offsets.z);
    }

    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub async fn run_record(_args: &RecordArgs) -> Result<()> {
    Err(CliError::Unsupported { feature: "Recording" }.into())
}
