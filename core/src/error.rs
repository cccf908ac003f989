//! Error types for scanning and index caching.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from reading workflow sources.
///
/// A block or section that cannot be found is not an error: lookups return
/// `None` or an empty list. Only failing to read the file surfaces here.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The source file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The parameter schema was not valid JSON.
    #[error("invalid parameter schema {}: {source}", path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors from fetching or persisting an index cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache blob {} is corrupt: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode cache blob: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("index command `{command}` could not be started: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("index command `{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("index command is empty")]
    EmptyCommand,
}

pub type ScanResult<T> = Result<T, ScanError>;
