//! Error types and handling infrastructure for decompfs.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! the library's error type. The binary layers `anyhow` on top for context.
//!
//! ## Error Classes
//!
//! Every [`DecompFsError`] falls into one of four classes (see [`ErrorKind`]):
//!
//! - **NotFound**: the only class that triggers suffix probing
//! - **StoreFault**: any other failure reported by the underlying store
//! - **DecodeFault**: a decoder rejected the compressed content
//! - **CloseFault**: releasing a handle or decoder failed

use crate::codec::Codec;
use thiserror::Error;

/// The main error type for decompfs operations.
#[derive(Error, Debug)]
pub enum DecompFsError {
    /// Path does not exist in the store
    #[error("File not found: {path}")]
    NotFound { path: String },

    /// Path exists but is a directory where a file was expected
    #[error("Path is not a regular file: {path}")]
    NotAFile { path: String },

    /// Path exists but is a file where a directory was expected
    #[error("Path is not a directory: {path}")]
    NotADirectory { path: String },

    /// Path is not a valid slash-separated relative store path
    #[error("Invalid path: {path:?}")]
    InvalidPath { path: String },

    /// Any other failure reported by the underlying store
    #[error("Store operation failed: {message}")]
    StoreError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// A decoder rejected the compressed content
    #[error("Failed to decode {codec} stream: {message}")]
    DecodeError {
        codec: Codec,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Releasing a decoder or raw handle failed
    #[error("Failed to release resources: {message}")]
    CloseError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Coarse classification of a [`DecompFsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    StoreFault,
    DecodeFault,
    CloseFault,
}

/// Standard Result type for decompfs operations.
pub type Result<T> = std::result::Result<T, DecompFsError>;

impl DecompFsError {
    /// Create a NotFound error for `path`
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a StoreError from an io::Error with additional context
    pub fn store(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::StoreError {
            message: message.into(),
            source,
        }
    }

    /// Map an io::Error raised while accessing `path`, keeping not-found distinct
    pub fn from_io(path: &str, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(path),
            std::io::ErrorKind::PermissionDenied => {
                Self::store(format!("Permission denied: {path}"), source)
            }
            _ => Self::store(format!("I/O error on {path}"), source),
        }
    }

    /// Create a DecodeError with a descriptive message
    pub fn decode(codec: Codec, message: impl Into<String>) -> Self {
        Self::DecodeError {
            codec,
            message: message.into(),
            source: None,
        }
    }

    /// Create a DecodeError wrapping the decoder's io::Error
    pub fn decode_io(codec: Codec, message: impl Into<String>, source: std::io::Error) -> Self {
        Self::DecodeError {
            codec,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a CloseError from an io::Error with additional context
    pub fn close(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::CloseError {
            message: message.into(),
            source,
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NotAFile { .. }
            | Self::NotADirectory { .. }
            | Self::InvalidPath { .. }
            | Self::StoreError { .. } => ErrorKind::StoreFault,
            Self::DecodeError { .. } => ErrorKind::DecodeFault,
            Self::CloseError { .. } => ErrorKind::CloseFault,
        }
    }

    /// True when the error means "no such path"
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

// Automatic conversion from io::Error to DecompFsError
impl From<std::io::Error> for DecompFsError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            // The path is lost here; stores should prefer `from_io` at the call site
            std::io::ErrorKind::NotFound => Self::NotFound {
                path: String::new(),
            },
            std::io::ErrorKind::PermissionDenied => Self::StoreError {
                message: "Permission denied".to_string(),
                source: err,
            },
            _ => Self::StoreError {
                message: "IO operation failed".to_string(),
                source: err,
            },
        }
    }
}

/// Convert back into an io::Error so errors can cross `Read` boundaries
impl From<DecompFsError> for std::io::Error {
    fn from(err: DecompFsError) -> Self {
        let kind = match &err {
            DecompFsError::NotFound { .. } => std::io::ErrorKind::NotFound,
            DecompFsError::InvalidPath { .. } => std::io::ErrorKind::InvalidInput,
            DecompFsError::DecodeError { .. } => std::io::ErrorKind::InvalidData,
            DecompFsError::StoreError { source, .. } | DecompFsError::CloseError { source, .. } => {
                source.kind()
            }
            _ => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}
