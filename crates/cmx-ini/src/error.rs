//! Fatal error type for store I/O.
//!
//! Only two things can go wrong with a settings file: a value inside it does
//! not parse (recoverable, see [`crate::codec::CodecError`]) or the file itself
//! cannot be read or written.  The second case is what [`StoreError`] models.
//! A file that simply does not exist yet is *not* an error.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// I/O failure while loading or flushing the settings file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file exists but could not be opened or read.
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file could not be created or overwritten.
    #[error("failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Path of the file the failed operation was working on.
    pub fn path(&self) -> &std::path::Path {
        match self {
            StoreError::Read { path, .. } | StoreError::Write { path, .. } => path,
        }
    }
}
