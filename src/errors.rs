//! Error types for rawfetch
//!
//! Errors are split by concern: wire-level protocol faults, per-URL fetch
//! failures and configuration problems. Every fetch failure is scoped to the
//! single URL that produced it.

use std::path::PathBuf;

use thiserror::Error;

/// Faults detected while reading an HTTP response off the wire
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Stream ended before a line terminator (or before any byte at all)
    #[error("Connection closed after {bytes_read} bytes of an unterminated line")]
    ConnectionClosed { bytes_read: usize },

    /// A single line exceeded the configured maximum
    #[error("Line exceeds maximum length of {limit} bytes")]
    LineTooLong { limit: usize },

    /// First response line is not `HTTP/<ver> <3 digits> <reason>`
    #[error("Malformed status line: {line:?}")]
    MalformedStatusLine { line: String },

    /// `Content-Length` header without a usable decimal value
    #[error("Invalid Content-Length header: {line:?}")]
    InvalidContentLength { line: String },

    /// Chunk-size line that is not a hexadecimal number
    #[error("Invalid chunk size line: {line:?}")]
    InvalidChunkSize { line: String },

    /// Bytes after a chunk body were not CR LF
    #[error("Chunk framing error: expected CRLF after chunk data, found {found:?}")]
    ChunkFraming { found: Vec<u8> },

    /// Stream ended before a fixed-length body was complete
    #[error("Incomplete body: received {received} bytes, expected {expected} bytes")]
    IncompleteBody { expected: u64, received: u64 },

    /// Underlying I/O error while reading or writing
    #[error("I/O error during transfer")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// True when the peer closed the connection before sending anything,
    /// which is how a stale keep-alive connection shows up.
    pub fn is_closed_before_response(&self) -> bool {
        matches!(self, ProtocolError::ConnectionClosed { bytes_read: 0 })
    }

    /// True when the underlying error is a connection reset
    pub fn is_connection_reset(&self) -> bool {
        matches!(self, ProtocolError::Io(e) if e.kind() == std::io::ErrorKind::ConnectionReset)
    }
}

/// Failures of a single `process_address` invocation
#[derive(Error, Debug)]
pub enum FetchError {
    /// URL could not be parsed
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// URL scheme other than plain http
    #[error("Unsupported scheme '{scheme}' in {url}. Only http:// URLs are supported")]
    UnsupportedScheme { url: String, scheme: String },

    /// DNS/address lookup failed or returned nothing
    #[error("Host not found: {host}")]
    HostResolution {
        host: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Local socket could not be created
    #[error("Failed to create socket")]
    SocketCreation(#[source] std::io::Error),

    /// TCP connect failed
    #[error("Connection to {address} failed")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the request failed
    #[error("Failed to send request: {0}")]
    Send(#[source] std::io::Error),

    /// Server answered with anything but 200
    #[error("Server returned HTTP {status} {reason}")]
    NonSuccessStatus { status: u16, reason: &'static str },

    /// Connection reset by the peer during a transfer
    #[error("Connection reset by peer during transfer")]
    ConnectionReset,

    /// User cancelled while the request was being retried
    #[error("Cancelled by user")]
    Cancelled,

    /// The fetch task panicked or was aborted
    #[error("Fetch task failed: {0}")]
    TaskFailed(String),

    /// Response could not be decoded
    #[error(transparent)]
    Protocol(ProtocolError),

    /// Creating, writing or renaming a destination file failed
    #[error("File operation failed for {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ProtocolError> for FetchError {
    fn from(error: ProtocolError) -> Self {
        if error.is_connection_reset() {
            FetchError::ConnectionReset
        } else {
            FetchError::Protocol(error)
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration file could not be read
    #[error("Failed to read configuration file")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Fetch error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Fetch(FetchError::Protocol(_)) => "protocol",
            AppError::Fetch(_) => "fetch",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Protocol result type alias
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

/// Fetch result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
