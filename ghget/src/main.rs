mod cli;
mod config;
mod endpoint;
mod error;
mod extract;
mod fetcher;
mod github;
mod pattern;
mod platform;
mod resolver;
mod retry;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::fetcher::Fetcher;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Command::Get(args) => args.verbose,
        Command::LatestTag(args) => args.verbose,
        Command::OsArch(args) => args.verbose,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(if verbose { "info" } else { "warn" })),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Get(args) => Fetcher::new(args)?.run().await?,
        Command::LatestTag(args) => fetcher::latest_tag(args).await?,
        Command::OsArch(args) => fetcher::os_arch(args)?,
    }

    Ok(())
}
