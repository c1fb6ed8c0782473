//! deskrelay - display capture and input injection relay.
//!
//! Reads JSON requests line by line from stdin and writes replies to stdout.

mod cli;
mod config;
mod logging;
mod reporter;
mod server;

use anyhow::{Context, Result};
use clap::Parser;
use deskrelay_core::{
    Bridge, DisplayHost, InputInjector, NoopInjector, NoopReporter, PointerHost, Reporter,
};
use deskrelay_platform::{
    collect_host_metadata, set_dpi_aware, EnigoInjector, SystemPointer, XcapDisplayHost,
};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::runtime::Handle;
use tracing::info;

use crate::cli::Cli;
use crate::reporter::HttpReporter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut settings, outcome) = config::loader::load_settings(cli.config.as_deref());
    settings.apply_cli(&cli);

    logging::setup(&settings.logging);
    outcome.log();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        dry_run = settings.input.dry_run,
        telemetry = settings.telemetry.enabled,
        "deskrelay starting"
    );

    set_dpi_aware();

    let displays: Arc<dyn DisplayHost> = Arc::new(XcapDisplayHost::new());
    let injector: Arc<dyn InputInjector> = if settings.input.dry_run {
        Arc::new(NoopInjector)
    } else {
        Arc::new(EnigoInjector::new().context("input injection unavailable")?)
    };
    let pointer: Arc<dyn PointerHost> =
        Arc::new(SystemPointer::new().context("pointer queries unavailable")?);
    let reporter: Arc<dyn Reporter> = if settings.telemetry.enabled {
        info!("Reporting errors to {}", settings.telemetry.endpoint);
        Arc::new(HttpReporter::new(
            &settings.telemetry,
            Handle::current(),
            collect_host_metadata,
        )?)
    } else {
        Arc::new(NoopReporter)
    };

    let bridge = Arc::new(
        tokio::task::spawn_blocking(move || Bridge::new(displays, injector, pointer, reporter))
            .await?,
    );

    let mut stdout = tokio::io::stdout();
    server::serve(bridge, BufReader::new(tokio::io::stdin()), &mut stdout).await?;

    info!("Input closed, shutting down");
    Ok(())
}
