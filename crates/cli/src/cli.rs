//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Gyro Reader - L3G4200D gyroscope driver front end
#[derive(Parser, Debug)]
#[command(
    name = "gyro-reader",
    author,
    version,
    about = "Read calibrated angular-velocity samples from an L3G4200D gyroscope",
    long_about = "Drives the L3G4200D gyroscope through its control node and input device.\n\n\
                  Enables the sensor, sets the sample interval, reads calibrated rad/s \n\
                  samples, and can record or replay raw input event streams."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "GYRO_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "GYRO_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read samples from the device or a recorded stream
    Run(RunArgs),

    /// Record raw input events from the device to a file
    Record(RecordArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration and device information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON), defaults apply when omitted
    #[arg(short, long, env = "GYRO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Sample interval in nanoseconds (truncated to whole milliseconds)
    #[arg(
        long,
        default_value = "20000000",
        env = "GYRO_DELAY_NS",
        allow_negative_numbers = true
    )]
    pub delay_ns: i64,

    /// Read calibration offsets from the device before sampling
    #[arg(long)]
    pub calibrate: bool,

    /// Samples requested per read
    #[arg(long, default_value = "16", env = "GYRO_BATCH")]
    pub batch: usize,

    /// Stop after this many samples (0 = unlimited)
    #[arg(long, default_value = "0", env = "GYRO_MAX_SAMPLES")]
    pub max_samples: u64,

    /// Replay a recorded raw event file instead of opening the device
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Print each sample as a JSON line on stdout
    #[arg(long)]
    pub print: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "GYRO_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `record` command
#[derive(Parser, Debug, Clone)]
pub struct RecordArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "GYRO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output file for raw input event records
    #[arg(short, long)]
    pub output: PathBuf,

    /// Stop after this many records (0 = until Ctrl+C)
    #[arg(long, default_value = "0")]
    pub count: u64,

    /// Sample interval in nanoseconds during recording
    #[arg(long, default_value = "20000000", env = "GYRO_DELAY_NS")]
    pub delay_ns: i64,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "gyro.toml", env = "GYRO_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file, defaults apply when omitted
    #[arg(short, long, env = "GYRO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Query the device: locate the input node and read calibration
    #[arg(long)]
    pub probe: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
