//! Infrastructure layer for the installer.
//!
//! Contains OS-facing adapters.  Today that is only the logging bootstrap,
//! which reads its configuration from the installer settings store.

pub mod logging;
