//! `run` command implementation.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use contracts::DriverConfig;
use driver::{GyroSensor, OfflineControl, SystemClock};
use ingestion::InputReader;

use super::signal::setup_shutdown_signal;
use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{RunStats, Session, SessionConfig};

/// Bounded wait per device read, so shutdown is noticed promptly
#[cfg(any(target_os = "linux", target_os = "android"))]
const POLL_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(200);

/// Execute the `run` command
pub async fn run_sampling(args: &RunArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    info!(
        control = %config.device.control_path.display(),
        input = %config.device.input_name,
        capacity = config.reader.capacity,
        delay_ns = args.delay_ns,
        replay = args.replay.is_some(),
        "Configuration loaded"
    );

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)
            .context("Failed to start metrics endpoint")?;
    }

    let session_config = SessionConfig {
        delay_ns: args.delay_ns,
        calibrate: args.calibrate,
        batch: args.batch,
        max_samples: if args.max_samples == 0 {
            None
        } else {
            Some(args.max_samples)
        },
        print: args.print,
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    let session = Session::new(session_config, Arc::clone(&shutdown));
    let replay = args.replay.clone();

    let mut task = tokio::task::spawn_blocking(move || -> Result<RunStats, CliError> {
        match replay {
            Some(path) => {
                let mut sensor = replay_sensor(&config, &path)?;
                session.run(&mut sensor)
            }
            None => run_device(&config, &session),
        }
    });

    info!("Starting gyro session...");

    let joined = tokio::select! {
        joined = &mut task => joined,
        _ = setup_shutdown_signal() => {
            warn!("Received shutdown signal, stopping session...");
            shutdown.store(true, Ordering::Relaxed);
            task.await
        }
    };

    let stats = joined
        .context("Sampling task panicked")?
        .context("Gyro session failed")?;

    info!(
        samples = stats.samples,
        duration_secs = stats.duration.as_secs_f64(),
        rate = format!("{:.2}", stats.sample_rate()),
        "Gyro session completed"
    );
    stats.print_summary();

    Ok(())
}

/// Load the configuration, defaults when no path is given
pub(crate) fn load_config(path: Option<&Path>) -> Result<DriverConfig> {
    if let Some(path) = path {
        if !path.exists() {
            return Err(CliError::config_not_found(path).into());
        }
        info!(config = %path.display(), "Loading configuration");
    }
    config_loader::ConfigLoader::load_or_default(path).context("Failed to load configuration")
}

/// Sensor over a recorded event stream
///
/// The offline control device reports the configured offsets, which are
/// also applied from the first sample on.
pub(crate) fn replay_sensor(
    config: &DriverConfig,
    path: &Path,
) -> Result<GyroSensor<OfflineControl, InputReader<File>, SystemClock>, CliError> {
    info!(
        path = %path.display(),
        x = config.calibration.x,
        y = config.calibration.y,
        z = config.calibration.z,
        "Replaying recorded event stream"
    );
    let file = File::open(path)?;
    Ok(GyroSensor::new(
        config,
        OfflineControl::new(config.calibration),
        InputReader::new(file, config.reader.capacity),
        SystemClock,
    )
    .with_calibration(config.calibration))
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn run_device(config: &DriverConfig, session: &Session) -> Result<RunStats, CliError> {
    let mut sensor = driver::open_gyro(config, POLL_TIMEOUT)
        .map_err(|e| CliError::device_unavailable(e.to_string()))?;
    session.run(&mut sensor)
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn run_device(_config: &DriverConfig, _session: &Session) -> Result<RunStats, CliError> {
    Err(CliError::Unsupported {
        feature: "Device access",
    })
}
