//! CLI argument parsing via clap.

use clap::Parser;

/// Telegram bot that lists and controls local Docker or Podman containers.
#[derive(Debug, Parser)]
#[command(name = "dockhand", version)]
pub struct Args {
    /// Path to config file (default: ./dockhand.toml or ~/.config/dockhand/dockhand.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Log filter directive, e.g. `debug` or `dockhand=trace`. Overrides RUST_LOG.
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Validate configuration and engine access, print a summary, and exit.
    #[arg(long = "check")]
    pub check: bool,
}
