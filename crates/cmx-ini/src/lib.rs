//! # cmx-ini
//!
//! The settings store used by the InstallCMX installer: a cached,
//! section-keyed, typed key/value layer backed by a flat INI-style text file.
//!
//! # Architecture overview (for beginners)
//!
//! The file on disk looks like this:
//!
//! ```text
//! [InstallCMX]
//! TraceInfoLevel=Warning
//! NormalMessageToConsole=false
//!
//! [Net]
//! Timeout=30
//! ```
//!
//! The crate is split into a few small layers:
//!
//! - **`codec`** – Stateless conversions between typed values (`bool`, `i32`,
//!   `f64`, byte strings, timestamps) and the canonical text stored in the
//!   file.  A value that fails to parse is never fatal; the caller's default
//!   is returned instead.
//!
//! - **`store`** – The in-memory cache (section name → key → string), the
//!   loader that fills it from disk, the writer that serialises it back, and
//!   the [`ConfigStore`] that guards all of them behind a single mutex.
//!
//! Reading a key that does not exist yet *creates* it with the supplied
//! default, so the next [`ConfigStore::flush`] writes a complete settings
//! file that the user can edit by hand.

pub mod codec;
pub mod error;
pub mod store;

// Re-export the most-used types at the crate root so callers can write
// `cmx_ini::ConfigStore` instead of `cmx_ini::store::ConfigStore`.
pub use codec::{CodecError, IniValue};
pub use error::{StoreError, StoreResult};
pub use store::{Backing, ConfigStore, FileBacking, LoadMode};
