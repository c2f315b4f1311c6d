//! Command-line interface.
//!
//! ```text
//! installcmx [OPTIONS] [BUILD]...
//!
//! Arguments:
//!   [BUILD]...       Build number to install; when several are given the last wins
//!
//! Options:
//!   --ini <PATH>     Settings file [default: InstallCMX.ini] [env: INSTALLCMX_INI]
//!   --log <PATH>     Log file, truncated on start [default: InstallCMX.log]
//! ```

use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_SETTINGS_FILE: &str = "InstallCMX.ini";
pub const DEFAULT_LOG_FILE: &str = "InstallCMX.log";

/// Multiplatform installer for CumulusMX.
#[derive(Debug, Parser)]
#[command(name = "installcmx", version)]
pub struct Cli {
    /// Build number of the distribution archive to install.
    ///
    /// Without a build number the installer looks for any
    /// `CumulusMXDist*.zip` in the working directory.
    #[arg(value_name = "BUILD")]
    pub builds: Vec<String>,

    /// Installer settings file.  Created on exit if it does not exist.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SETTINGS_FILE, env = "INSTALLCMX_INI")]
    pub ini: PathBuf,

    /// Log file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOG_FILE)]
    pub log: PathBuf,
}

impl Cli {
    /// The requested build.  Only the last positional argument counts.
    pub fn build(&self) -> Option<&str> {
        self.builds.last().map(String::as_str)
    }
}
