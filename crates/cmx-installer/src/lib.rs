//! cmx-installer library entry point.
//!
//! Re-exports all public modules so that tests and the binary entry point in
//! `main.rs` share the same module tree.
//!
//! The installer keeps its own settings in `InstallCMX.ini` through
//! [`cmx_ini::ConfigStore`].  The store is opened once at start-up, consulted
//! for the logging configuration, and flushed on every exit path so that any
//! setting read for the first time is written out with its default.

/// Command-line arguments.
pub mod cli;

/// Infrastructure: logging bootstrap.
pub mod infrastructure;
