use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for deskrelay
#[derive(Parser, Debug, Default)]
#[command(name = "deskrelay")]
#[command(version, about = "Display capture and input injection relay over stdio", long_about = None)]
pub struct Cli {
    /// Settings file (defaults to settings.yaml in the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `deskrelay_core=trace` (RUST_LOG wins)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log injected input instead of performing it
    #[arg(long)]
    pub dry_run: bool,

    /// Do not send error reports
    #[arg(long)]
    pub no_telemetry: bool,
}
