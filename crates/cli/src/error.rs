//! Error types for CLI operations.

use std::path::Path;

use contracts::DriverError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Device could not be brought up
    #[error("Gyro device unavailable: {message}")]
    DeviceUnavailable { message: String },

    /// Driver operation failed during a session
    #[error("Driver {operation} failed (status {status}): {source}")]
    Driver {
        operation: &'static str,
        status: i32,
        #[source]
        source: DriverError,
    },

    /// Requested mode is not available on this platform
    #[cfg_attr(any(target_os = "linux", target_os = "android"), allow(dead_code))]
    #[error("{feature} requires Linux; use --replay for recorded streams")]
    Unsupported { feature: &'static str },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn device_unavailable(message: impl Into<String>) -> Self {
        Self::DeviceUnavailable {
            message: message.into(),
        }
    }

    /// Wrap a driver error with the operation that produced it
    pub fn driver(operation: &'static str, source: DriverError) -> Self {
        Self::Driver {
            operation,
            status: source.status(),
            source,
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_carries_status() {
        let err = CliError::driver("enable", DriverError::StreamRead { errno: 19 });
        assert!(err.to_string().contains("status -19"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
