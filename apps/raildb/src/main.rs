//! RailDB - student grades and fragility curve service.

use clap::Parser;
use raildb::cli::{Cli, run};
use raildb::config::{load_dotenv, process_env};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "raildb=info,tower_http=info";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();

    match run(cli, process_env).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
