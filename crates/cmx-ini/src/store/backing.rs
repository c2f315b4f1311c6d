//! Where the settings text lives.
//!
//! [`Backing`] is the seam between the store and the file system.  The
//! production implementation, [`FileBacking`], opens the file for every call
//! and closes it before returning, so other processes can read the file
//! between loads and flushes.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Raw text storage for a settings file.
#[cfg_attr(test, mockall::automock)]
pub trait Backing: Send {
    /// Returns the full text, or `None` when nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Any failure other than "not found" is a [`StoreError::Read`].
    fn read(&self) -> StoreResult<Option<String>>;

    /// Replaces the stored text with `contents`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the text could not be stored.
    fn write(&self, contents: &str) -> StoreResult<()>;
}

/// A settings file on the local file system.
#[derive(Debug, Clone)]
pub struct FileBacking {
    path: PathBuf,
}

impl FileBacking {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backing for FileBacking {
    /// Reads the file as UTF-8.  Invalid sequences are replaced rather than
    /// rejected so a stray byte cannot make the installer unusable.
    fn read(&self) -> StoreResult<Option<String>> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                debug!("read {} bytes from {}", bytes.len(), self.path.display());
                Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} does not exist yet", self.path.display());
                Ok(None)
            }
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write(&self, contents: &str) -> StoreResult<()> {
        fs::write(&self.path, contents).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("wrote {} bytes to {}", contents.len(), self.path.display());
        Ok(())
    }
}
