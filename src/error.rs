use thiserror::Error;

/// Classifies transport errors for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection to the remote host failed
    ConnectionFailed,
    /// Operation timed out
    Timeout,
    /// DNS resolution failed
    DnsFailed,
    /// Protocol-level error (invalid response, unsupported version, etc.)
    Protocol,
    /// I/O error during data transfer
    Io,
    /// Request could not be sent as given (bad URI, unsupported scheme, etc.)
    InvalidInput,
    /// Response body exceeded the configured limit
    BodyTooLarge,
}

/// Classifies preload dataset errors for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadErrorKind {
    /// Required path not configured
    NotConfigured,
    /// File open/read failure
    FileError,
    /// Data format or decoding error
    InvalidData,
}

/// HSTS preload error types
#[derive(Error, Debug)]
pub enum HstsError {
    #[error("Preload data error: {message}")]
    PreloadError {
        kind: PreloadErrorKind,
        message: String,
    },

    #[error("Transport error: {message}")]
    TransportError {
        kind: TransportErrorKind,
        message: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl HstsError {
    pub(crate) fn transport(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        HstsError::TransportError {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn preload(kind: PreloadErrorKind, message: impl Into<String>) -> Self {
        HstsError::PreloadError {
            kind,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HstsError>;
