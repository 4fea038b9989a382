//! Typed error definitions for checkin_control.
//! `BackendError` covers failures of a single storage primitive; `CheckinError`
//! is what the checkin, path-resolution and cleanup entry points return.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type BackendResult<T> = Result<T, BackendError>;

/// Failure of a backend primitive (exists/copy/remove/...).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no such file or directory: {0}")]
    NotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("not a file: {0}")]
    NotAFile(String),

    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("content of '{0}' is not valid UTF-8")]
    InvalidUtf8(String),

    #[error("{op} is not supported by {backend}")]
    Unsupported { op: &'static str, backend: String },

    /// Host I/O failure; `message` already names the operation, the path and a hint.
    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: io::Error,
    },
}

impl BackendError {
    /// True when the primitive failed because the target is absent.
    pub fn is_not_found(&self) -> bool {
        match self {
            BackendError::NotFound(_) => true,
            BackendError::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Errors surfaced by `checkin`, `checkin_paths` and `cleanup`.
#[derive(Debug, Error)]
pub enum CheckinError {
    #[error("source not found: {path} in {backend}")]
    NotFound { backend: String, path: String },

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("source and destination are the same location: {path} in {backend}")]
    SameLocation { backend: String, path: String },

    #[error("destination '{dest}' lies inside source directory '{src}'")]
    NestedDestination { src: String, dest: String },

    #[error("no existing ancestor directory for destination {0}")]
    NoExistingAncestor(PathBuf),

    #[error("destination parent '{path}' unavailable in {backend}")]
    DestinationUnavailable {
        backend: String,
        path: String,
        #[source]
        source: BackendError,
    },

    #[error("transfer '{src}' -> '{dest}' failed")]
    TransferFailed {
        src: String,
        dest: String,
        #[source]
        source: BackendError,
    },

    #[error("could not write checkin marker '{path}'")]
    MarkerWriteFailed {
        path: String,
        #[source]
        source: BackendError,
    },

    #[error("cleanup of '{path}' could not prune top-level directory '{top}'")]
    CleanupInconsistency {
        path: String,
        top: String,
        #[source]
        source: BackendError,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl CheckinError {
    /// Stable numeric code for logs and process exit status.
    pub fn code(&self) -> i32 {
        match self {
            CheckinError::NotFound { .. } => 10,
            CheckinError::InvalidPath { .. } => 11,
            CheckinError::SameLocation { .. } => 12,
            CheckinError::NestedDestination { .. } => 13,
            CheckinError::NoExistingAncestor(_) => 14,
            CheckinError::DestinationUnavailable { .. } => 20,
            CheckinError::TransferFailed { .. } => 21,
            CheckinError::MarkerWriteFailed { .. } => 22,
            CheckinError::CleanupInconsistency { .. } => 30,
            CheckinError::Backend(_) => 40,
        }
    }
}
