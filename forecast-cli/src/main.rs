//! Binary crate for the `forecast` command-line tool.
//!
//! This crate acts as a minimal host around `forecast-core`:
//! - Persisting validated location configurations
//! - Running one polling coordinator per location
//! - Printing sensor values as snapshots are replaced

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
