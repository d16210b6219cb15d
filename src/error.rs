// src/error.rs
//! Error types for the NMEA relay

use std::fmt;

pub type Result<T> = std::result::Result<T, RelayError>;

#[derive(Debug)]
pub enum RelayError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// The serial port could not be opened. Fatal to the whole session.
    PortUnavailable {
        port: String,
        source: tokio_serial::Error,
    },
    /// The device side hung up while a loop was reading from it.
    ConnectionClosed,
    Config(String),
    Task(String),
    Other(String),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::Io(e) => write!(f, "IO error: {}", e),
            RelayError::Json(e) => write!(f, "JSON error: {}", e),
            RelayError::PortUnavailable { port, source } => {
                write!(f, "{} not available: {}", port, source)
            }
            RelayError::ConnectionClosed => write!(f, "Connection closed by device"),
            RelayError::Config(msg) => write!(f, "Configuration error: {}", msg),
            RelayError::Task(msg) => write!(f, "Task error: {}", msg),
            RelayError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelayError::Io(e) => Some(e),
            RelayError::Json(e) => Some(e),
            RelayError::PortUnavailable { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl RelayError {
    /// True when the error means the serial port itself could not be reached
    pub fn is_port_unavailable(&self) -> bool {
        matches!(self, RelayError::PortUnavailable { .. })
    }
}

impl From<std::io::Error> for RelayError {
    fn from(error: std::io::Error) -> Self {
        RelayError::Io(error)
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(error: serde_json::Error) -> Self {
        RelayError::Json(error)
    }
}

impl From<tokio::task::JoinError> for RelayError {
    fn from(error: tokio::task::JoinError) -> Self {
        RelayError::Task(error.to_string())
    }
}
