use std::path::PathBuf;
use thiserror::Error;

/// Fatal construction-time problems. Never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config error: WebSocket address must be provided")]
    MissingAddress,
    #[error("config error: WebSocket origin must be provided")]
    MissingOrigin,
    #[error("config error: invalid WebSocket address '{address}': {detail}")]
    InvalidAddress { address: String, detail: String },
    #[error("config error: invalid throttle interval: {0}")]
    InvalidThrottle(String),
}

/// Failures at the physical connection layer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {address}: {detail}")]
    Connect { address: String, detail: String },
    #[error("failed to send frame: {0}")]
    Send(String),
    #[error("failed to receive frame: {0}")]
    Receive(String),
    #[error("connection closed by peer")]
    Closed,
    #[error("no live connection")]
    NotConnected,
}

/// One request/response round-trip failed. Triggers the reconnect-and-retry path.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("malformed response frame: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no response within {0:?}")]
    Timeout(std::time::Duration),
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: invalid JSON record: {source}")]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}:{line}: record has no string field '{field}'")]
    MissingField {
        path: PathBuf,
        line: usize,
        field: String,
    },
    #[error("{path}: csv error: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{0}: no records to convert")]
    Empty(PathBuf),
}

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
