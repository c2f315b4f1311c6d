//! The cached settings store.
//!
//! [`ConfigStore`] owns the parsed contents of one settings file and is the
//! only way to read or change them.  All state lives in a single
//! `Inner` value behind one `std::sync::Mutex`:
//!
//! ```text
//! ConfigStore
//!  └─ Mutex<Inner>
//!       ├─ backing   where the text is read from / written to
//!       ├─ phase     Uninitialized → Loaded (at most once, lazily)
//!       ├─ dirty     set by every change, cleared by a successful flush
//!       └─ sections  SectionMap (section → key → string)
//! ```
//!
//! # One coarse lock
//!
//! Every public operation (refresh, get, set, flush) takes the same lock for
//! its whole duration, including the lazy first load and the file write.  Two
//! threads can therefore never observe a half-loaded cache or interleave two
//! flushes.  The store is touched by a few threads at start-up and shutdown,
//! so contention is not a concern.
//!
//! # Reads create defaults
//!
//! [`ConfigStore::get_value`] on a missing section or key stores the default
//! it was given and marks the store dirty.  After one run of the installer the
//! settings file therefore lists every setting the program consulted, ready
//! to be edited by hand.

pub mod backing;
pub mod cache;
pub mod loader;
pub mod writer;

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDateTime;
use tracing::{debug, error, warn};

use crate::codec::IniValue;
use crate::error::{StoreError, StoreResult};

pub use backing::{Backing, FileBacking};
pub use cache::{Section, SectionMap};

/// When the settings file is first read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Read during construction; construction fails on I/O errors.
    Eager,
    /// Defer the read until the first get or set.
    Lazy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Loaded,
}

/// Everything the guard lock protects.
struct Inner<B> {
    backing: B,
    phase: Phase,
    dirty: bool,
    sections: SectionMap,
}

impl<B: Backing> Inner<B> {
    /// Replaces the cache with the backing's current contents.
    ///
    /// On failure the previous cache and flags are left untouched.
    fn load(&mut self) -> StoreResult<()> {
        self.sections = loader::load(&self.backing)?;
        self.phase = Phase::Loaded;
        self.dirty = false;
        Ok(())
    }

    fn ensure_loaded(&mut self) -> StoreResult<()> {
        if self.phase == Phase::Uninitialized {
            self.load()?;
        }
        Ok(())
    }

    fn set(&mut self, section: &str, key: &str, value: &str) {
        let (section, key) = (section.trim(), key.trim());
        if let Err(reason) = check_writable(section, key, value) {
            warn!("ignoring setting [{section}] {key:?}: {reason}");
            return;
        }
        self.sections.set(section, key, value);
        self.dirty = true;
    }

    fn get(&mut self, section: &str, key: &str, default: &str) -> String {
        let (section, key) = (section.trim(), key.trim());
        if let Some(value) = self.sections.get(section, key) {
            return value.to_string();
        }
        self.set(section, key, default);
        default.to_string()
    }

    fn flush(&mut self) -> StoreResult<()> {
        debug!("flush requested, cache modified: {}", self.dirty);
        if !self.dirty {
            return Ok(());
        }
        let text = writer::render(&self.sections);
        self.backing.write(&text)?;
        self.dirty = false;
        Ok(())
    }
}

/// Rejects entries the loader would read back differently.  Names arrive
/// already trimmed.
fn check_writable(section: &str, key: &str, value: &str) -> Result<(), &'static str> {
    let breaks_line = |s: &str| s.contains(['\n', '\r']);
    if section.is_empty() || key.is_empty() {
        return Err("empty name");
    }
    if breaks_line(section) || breaks_line(key) || breaks_line(value) {
        return Err("line break");
    }
    if key.contains('=') {
        return Err("'=' in key");
    }
    Ok(())
}

/// Thread-safe, cached, section-keyed settings store.
///
/// Share it between threads with `Arc<ConfigStore>`; every method takes
/// `&self`.
///
/// Dropping a dirty store flushes it one last time.  Errors from that final
/// flush can only be logged, so prefer [`ConfigStore::close`] or
/// [`ConfigStore::scope`] when the caller needs to know whether the file was
/// written.
///
/// # Examples
///
/// ```rust
/// use cmx_ini::ConfigStore;
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = ConfigStore::open(dir.path().join("InstallCMX.ini")).unwrap();
///
/// // A missing key is created with its default...
/// assert_eq!(store.get_int("Net", "Retries", 3).unwrap(), 3);
/// // ...and later reads return the stored value, whatever the default.
/// assert_eq!(store.get_int("Net", "Retries", 9).unwrap(), 3);
///
/// store.close().unwrap();
/// ```
pub struct ConfigStore<B: Backing = FileBacking> {
    inner: Mutex<Inner<B>>,
}

impl ConfigStore<FileBacking> {
    /// Opens the settings file at `path` and reads it immediately.
    ///
    /// A file that does not exist yields an empty, clean store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::with_backing(FileBacking::new(path), LoadMode::Eager)
    }

    /// Opens the settings file at `path` without touching the disk.  The file
    /// is read on the first get or set.
    pub fn open_lazy(path: impl Into<PathBuf>) -> Self {
        Self::unloaded(FileBacking::new(path))
    }

    /// Path of the settings file.
    pub fn path(&self) -> PathBuf {
        self.lock().backing.path().to_path_buf()
    }

    /// Opens the store, hands it to `f`, and flushes it on every exit path.
    ///
    /// If `f` fails, its error is returned even when the flush fails too.  If
    /// `f` panics, the drop-time flush still runs.
    ///
    /// # Errors
    ///
    /// Returns the open error, the error from `f`, or the flush error, in that
    /// order of precedence.
    pub fn scope<R, E, F>(path: impl Into<PathBuf>, f: F) -> Result<R, E>
    where
        F: FnOnce(&ConfigStore) -> Result<R, E>,
        E: From<StoreError>,
    {
        let store = ConfigStore::open(path)?;
        let outcome = f(&store);
        let closed = store.close();
        let value = outcome?;
        closed?;
        Ok(value)
    }
}

impl<B: Backing> ConfigStore<B> {
    /// Builds a store over an arbitrary [`Backing`].
    ///
    /// # Errors
    ///
    /// With [`LoadMode::Eager`], returns the backing's read error.
    pub fn with_backing(backing: B, mode: LoadMode) -> StoreResult<Self> {
        let store = Self::unloaded(backing);
        if mode == LoadMode::Eager {
            store.refresh()?;
        }
        Ok(store)
    }

    fn unloaded(backing: B) -> Self {
        Self {
            inner: Mutex::new(Inner {
                backing,
                phase: Phase::Uninitialized,
                dirty: false,
                sections: SectionMap::new(),
            }),
        }
    }

    /// Acquires the guard lock.
    ///
    /// A panic while the lock was held cannot leave the cache half-updated
    /// (every mutation is a single map operation), so a poisoned lock is
    /// recovered rather than propagated.
    fn lock(&self) -> MutexGuard<'_, Inner<B>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-reads the file, discarding all cached values and pending changes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`]; the cache is unchanged in that case.
    pub fn refresh(&self) -> StoreResult<()> {
        self.lock().load()
    }

    /// Returns the stored string, or stores and returns `default` when the
    /// section or key is missing.
    ///
    /// # Errors
    ///
    /// Only a lazily opened store can fail here, when its first read fails.
    pub fn get_value(&self, section: &str, key: &str, default: &str) -> StoreResult<String> {
        let mut inner = self.lock();
        inner.ensure_loaded()?;
        Ok(inner.get(section, key, default))
    }

    /// Stores `value`, creating the section if needed and overwriting any
    /// previous value.
    ///
    /// Section and key names are trimmed, as the loader trims them.  Entries
    /// the file could not carry back unchanged are ignored: an empty name, a
    /// line break anywhere, or `=` in the key.
    ///
    /// # Errors
    ///
    /// Only a lazily opened store can fail here, when its first read fails.
    pub fn set_value(&self, section: &str, key: &str, value: &str) -> StoreResult<()> {
        let mut inner = self.lock();
        inner.ensure_loaded()?;
        inner.set(section, key, value);
        Ok(())
    }

    /// Typed read.  The encoded `default` is stored when the key is missing;
    /// a stored value that does not decode yields `default` and is left as is.
    ///
    /// # Errors
    ///
    /// See [`ConfigStore::get_value`].
    pub fn get<T: IniValue>(&self, section: &str, key: &str, default: T) -> StoreResult<T> {
        let raw = self.get_value(section, key, &default.to_ini())?;
        match T::from_ini(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!("[{section}] {key}: {e}; using default");
                Ok(default)
            }
        }
    }

    /// Typed write.
    ///
    /// # Errors
    ///
    /// See [`ConfigStore::set_value`].
    pub fn set<T: IniValue>(&self, section: &str, key: &str, value: &T) -> StoreResult<()> {
        self.set_value(section, key, &value.to_ini())
    }

    pub fn get_string(&self, section: &str, key: &str, default: &str) -> StoreResult<String> {
        self.get_value(section, key, default)
    }

    pub fn set_string(&self, section: &str, key: &str, value: &str) -> StoreResult<()> {
        self.set_value(section, key, value)
    }

    /// Booleans are stored as `1` / `0`; any non-zero integer reads as `true`.
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> StoreResult<bool> {
        self.get(section, key, default)
    }

    pub fn set_bool(&self, section: &str, key: &str, value: bool) -> StoreResult<()> {
        self.set(section, key, &value)
    }

    pub fn get_int(&self, section: &str, key: &str, default: i32) -> StoreResult<i32> {
        self.get(section, key, default)
    }

    pub fn set_int(&self, section: &str, key: &str, value: i32) -> StoreResult<()> {
        self.set(section, key, &value)
    }

    pub fn get_float(&self, section: &str, key: &str, default: f64) -> StoreResult<f64> {
        self.get(section, key, default)
    }

    pub fn set_float(&self, section: &str, key: &str, value: f64) -> StoreResult<()> {
        self.set(section, key, &value)
    }

    pub fn get_bytes(&self, section: &str, key: &str, default: &[u8]) -> StoreResult<Vec<u8>> {
        self.get(section, key, default.to_vec())
    }

    pub fn set_bytes(&self, section: &str, key: &str, value: &[u8]) -> StoreResult<()> {
        self.set_value(section, key, &crate::codec::encode_bytes(value))
    }

    pub fn get_timestamp(
        &self,
        section: &str,
        key: &str,
        default: NaiveDateTime,
    ) -> StoreResult<NaiveDateTime> {
        self.get(section, key, default)
    }

    pub fn set_timestamp(&self, section: &str, key: &str, value: NaiveDateTime) -> StoreResult<()> {
        self.set(section, key, &value)
    }

    /// Writes the cache to the file if anything changed since the last load
    /// or flush.  A clean store does not touch the file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`]; the store stays dirty so a later flush
    /// can retry.
    pub fn flush(&self) -> StoreResult<()> {
        self.lock().flush()
    }

    /// Flushes and releases the store.
    ///
    /// # Errors
    ///
    /// Returns the flush error.  The drop that follows retries the write once
    /// more and logs a second failure.
    pub fn close(self) -> StoreResult<()> {
        self.flush()
    }

    /// `true` when there are changes that have not been flushed.
    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    /// `true` once the file has been read.
    pub fn is_loaded(&self) -> bool {
        self.lock().phase == Phase::Loaded
    }

    /// Names of all cached sections in file order.  Does not trigger a load.
    pub fn section_names(&self) -> Vec<String> {
        self.lock().sections.names()
    }
}

impl<B: Backing> Drop for ConfigStore<B> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = inner.flush() {
            error!("final flush failed: {e}");
        }
    }
}
