//! civis CLI: CI pipeline visibility reporter.
//!
//! Reads CI provider variables (plugin, Drone, Harness, generic CI), builds
//! one pipeline event, and sends it to Datadog or logs it in dry-run mode.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
