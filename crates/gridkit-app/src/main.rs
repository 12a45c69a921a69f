//! gridkit - headless data grid engine and column-definition client
//!
//! This is the entry point for the `gridkit` binary.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use gridkit_app::cli::{Cli, Command};
use gridkit_app::logging::{self, LoggingConfig};
use gridkit_app::{columns, grid_options, view};
use gridkit_services::{ColumnConfigStore, ColumnDefTransport, HttpTransport};
use gridkit_settings::GridSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = if cli.verbose {
        LoggingConfig::development()
    } else {
        LoggingConfig::production()
    };
    if let Some(level) = &cli.log_level {
        config = config.with_filter(level.clone());
    }
    // Keep the file writer alive until exit
    let _log_guard = logging::init(config).context("Failed to initialize logging")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting gridkit");

    if let Err(err) = gridkit_settings::ensure_directories() {
        tracing::warn!(error = %err, "Failed to create gridkit directories");
    }
    let mut settings = match &cli.settings {
        Some(path) => GridSettings::load_from(path)?,
        None => GridSettings::load()?,
    };
    if let Some(base_url) = cli.base_url {
        settings.service.base_url = base_url;
    }

    let output = match &cli.command {
        Command::View(args) => view::run(args, grid_options(&settings))?,
        Command::Columns {
            page_name,
            table,
            command,
        } => {
            let transport =
                HttpTransport::new(&settings.service.base_url, settings.service.request_timeout())?;
            tracing::debug!(endpoint = %transport.endpoint(), "Using column service");
            let store = ColumnConfigStore::new(Arc::new(transport) as Arc<dyn ColumnDefTransport>);
            columns::run(&store, page_name, table, command).await?
        }
    };

    println!("{}", output);
    Ok(())
}
