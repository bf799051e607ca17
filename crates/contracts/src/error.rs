//! Layered error definitions
//!
//! Categorized by source: config / device / stream

use thiserror::Error;

/// Configuration and general error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// `EINVAL`, kept local so the contract has no libc dependency.
const EINVAL: i32 = 22;

/// `EIO`, used when the OS did not report a code.
pub const EIO: i32 = 5;

/// Errors surfaced by driver operations
///
/// Every variant maps back to the negative errno status the sensor HAL
/// interface reports (see [`DriverError::status`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Rejected before any I/O (empty output buffer, negative delay)
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Control channel failure (open / ioctl)
    #[error("device {operation} failed: errno {errno}")]
    DeviceIo { operation: &'static str, errno: i32 },

    /// The raw event source reported an error
    #[error("event stream read failed: errno {errno}")]
    StreamRead { errno: i32 },
}

impl DriverError {
    /// Create invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create device I/O error from an `io::Error`
    pub fn device_io(operation: &'static str, err: &std::io::Error) -> Self {
        Self::DeviceIo {
            operation,
            errno: err.raw_os_error().unwrap_or(EIO),
        }
    }

    /// Create stream read error from an `io::Error`
    pub fn stream_read(err: &std::io::Error) -> Self {
        Self::StreamRead {
            errno: err.raw_os_error().unwrap_or(EIO),
        }
    }

    /// Positive errno carried by this error
    pub fn errno(&self) -> i32 {
        match self {
            Self::InvalidArgument { .. } => EINVAL,
            Self::DeviceIo { errno, .. } | Self::StreamRead { errno } => *errno,
        }
    }

    /// Negative errno, the status code convention of the HAL interface
    pub fn status(&self) -> i32 {
        -self.errno()
    }
}

/// Driver Result alias
pub type DriverResult<T> = std::result::Result<T, DriverError>;
