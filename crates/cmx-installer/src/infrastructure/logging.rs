//! Logging bootstrap driven by the installer settings file.
//!
//! Two settings in the `[InstallCMX]` section control logging:
//!
//! | Key                      | Default   | Meaning                                   |
//! |--------------------------|-----------|-------------------------------------------|
//! | `TraceInfoLevel`         | `Warning` | `Off`, `Error`, `Warning`, `Info`, `Verbose` (or `0`–`4`) |
//! | `NormalMessageToConsole` | `false`   | `true` echoes log lines to stderr         |
//!
//! Reading them through [`ConfigStore::get_string`] stores the defaults on
//! first run, so a fresh `InstallCMX.ini` shows the user which knobs exist.
//!
//! Log lines always go to the log file.  `RUST_LOG`, when set, overrides the
//! level from the settings file.

use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::Context;
use cmx_ini::{Backing, ConfigStore, StoreResult};
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Settings section owned by the installer itself.
pub const SECTION: &str = "InstallCMX";
pub const LEVEL_KEY: &str = "TraceInfoLevel";
pub const CONSOLE_KEY: &str = "NormalMessageToConsole";

const DEFAULT_LEVEL: &str = "Warning";
const DEFAULT_CONSOLE: &str = "false";

/// Verbosity names accepted in `TraceInfoLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceLevel {
    Off,
    Error,
    Warning,
    Info,
    Verbose,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown trace level {0:?}")]
pub struct UnknownTraceLevel(pub String);

impl FromStr for TraceLevel {
    type Err = UnknownTraceLevel;

    /// Names are matched case-insensitively; the numeric values `0` (off)
    /// to `4` (verbose) are accepted as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.trim().to_ascii_lowercase().as_str() {
            "off" | "0" => TraceLevel::Off,
            "error" | "1" => TraceLevel::Error,
            "warning" | "2" => TraceLevel::Warning,
            "info" | "3" => TraceLevel::Info,
            "verbose" | "4" => TraceLevel::Verbose,
            _ => return Err(UnknownTraceLevel(s.to_string())),
        };
        Ok(level)
    }
}

impl TraceLevel {
    pub fn filter(self) -> LevelFilter {
        match self {
            TraceLevel::Off => LevelFilter::OFF,
            TraceLevel::Error => LevelFilter::ERROR,
            TraceLevel::Warning => LevelFilter::WARN,
            TraceLevel::Info => LevelFilter::INFO,
            TraceLevel::Verbose => LevelFilter::TRACE,
        }
    }
}

/// Logging configuration read from the settings store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: TraceLevel,
    pub console: bool,
    /// The stored level text when it was not recognised.  The level falls
    /// back to [`TraceLevel::Warning`]; the caller reports this once logging
    /// is up.
    pub rejected_level: Option<String>,
}

impl LogSettings {
    /// Reads (and on first run, creates) the logging settings.
    ///
    /// # Errors
    ///
    /// Propagates store I/O errors from a lazily opened store.
    pub fn from_store<B: Backing>(store: &ConfigStore<B>) -> StoreResult<Self> {
        // Only the exact text `true` enables console output.
        let console = store.get_string(SECTION, CONSOLE_KEY, DEFAULT_CONSOLE)? == "true";
        let raw = store.get_string(SECTION, LEVEL_KEY, DEFAULT_LEVEL)?;

        let (level, rejected_level) = match raw.parse::<TraceLevel>() {
            Ok(level) => (level, None),
            Err(_) => (TraceLevel::Warning, Some(raw)),
        };
        Ok(Self {
            level,
            console,
            rejected_level,
        })
    }
}

/// Installs the global `tracing` subscriber.
///
/// # Errors
///
/// Fails if the log file cannot be created or a subscriber is already set.
pub fn init(settings: &LogSettings, log_path: &Path) -> anyhow::Result<()> {
    let file = File::create(log_path)
        .with_context(|| format!("can't create log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.filter().to_string()));

    let file_layer = fmt::layer().with_ansi(false).with_writer(Mutex::new(file));
    let console_layer = settings
        .console
        .then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("logging was already initialised")?;
    Ok(())
}
