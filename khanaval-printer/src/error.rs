//! Error types for the printer library

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Invalid printer configuration (missing address or identity)
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Host has no Bluetooth/USB stack for this transport
    #[error("Not supported: {0}")]
    Unsupported(String),

    /// Operator dismissed the device chooser
    #[error("Device selection cancelled")]
    Cancelled,

    /// Device or host unreachable
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Printer answered the HTTP bridge with a non-success status
    #[error("Network printer responded with {0}")]
    HttpStatus(u16),

    /// USB device exposes no bulk OUT endpoint
    #[error("No bulk OUT endpoint found on {0}")]
    NoEndpoint(String),

    /// A chunk write or bulk transfer was rejected
    #[error("Write failed: {0}")]
    Write(String),

    /// Timeout waiting for printer
    #[error("Timeout: {0}")]
    Timeout(String),

    /// IO error during printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PrintError {
    /// Whether this is the operator cancelling a chooser rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<reqwest::Error> for PrintError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PrintError::Timeout(e.to_string())
        } else {
            PrintError::Connection(e.to_string())
        }
    }
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
