//! StreamWatch - resolve and play catalog videos
//!
//! Command-line front end over the playback engine in the library crate.
//!
//! # Usage
//!
//! ```bash
//! streamwatch resolve 64f1c2 -s 1 -e 3
//! streamwatch tracks 64f1c2 --json
//! streamwatch play 64f1c2 --audio Hindi --player vlc
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=streamwatch=debug` for detail.

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ExitCode, Output};
use streamwatch::api::CatalogClient;
use streamwatch::config::Config;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let exit_code = run_cli(cli).await;
    std::process::exit(exit_code.into());
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let catalog_url = cli
        .catalog
        .clone()
        .unwrap_or_else(|| config.catalog_url());
    let catalog = CatalogClient::new(catalog_url);

    match cli.command {
        Command::Resolve(cmd) => commands::resolve_cmd(cmd, &catalog, &output).await,

        Command::Tracks(cmd) => commands::tracks_cmd(cmd, &catalog, &output).await,

        Command::Probe(cmd) => commands::probe_cmd(cmd, &catalog, &output).await,

        Command::Play(cmd) => commands::play_cmd(cmd, &catalog, &config, &output).await,
    }
}
