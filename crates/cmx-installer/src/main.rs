//! InstallCMX entry point.
//!
//! Opens the installer settings file, configures logging from it, and makes
//! sure the settings are flushed whatever happens afterwards.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ Cli::parse()
//!  └─ ConfigStore::scope(InstallCMX.ini)   -- flushes on every exit path
//!       └─ LogSettings::from_store()       -- TraceInfoLevel, NormalMessageToConsole
//!       └─ logging::init()                 -- InstallCMX.log (+ stderr)
//!       └─ run()
//! ```

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use cmx_ini::ConfigStore;
use cmx_installer::cli::Cli;
use cmx_installer::infrastructure::logging::{self, LogSettings, LEVEL_KEY};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    ConfigStore::scope(&cli.ini, |store| run(store, &cli))
        .with_context(|| format!("installer settings {}", cli.ini.display()))
}

fn run(store: &ConfigStore, cli: &Cli) -> anyhow::Result<()> {
    let settings = LogSettings::from_store(store)?;
    logging::init(&settings, &cli.log)?;

    if let Some(rejected) = &settings.rejected_level {
        error!("{LEVEL_KEY}: unknown level {rejected:?}, using Warning");
    }
    info!(
        "CMX multiplatform installer version {} - (c) Hans Rottier",
        env!("CARGO_PKG_VERSION")
    );
    info!("settings file: {}", store.path().display());

    match cli.build() {
        Some(build) => info!("build number to install: {build}"),
        None => info!("no build number given"),
    }

    println!("Done");
    info!("Done");
    Ok(())
}
