mod build;
mod cli;
mod config;
mod error;
mod jenkins;
mod logging;
mod output;
mod pipeline;
mod plan;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let log_path = logging::init_logging()?;

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting jenkins-bt, logging to {}", log_path.display());

    cli.execute().await
}
