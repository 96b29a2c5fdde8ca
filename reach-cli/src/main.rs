//! Entry point for the `reach` command-line interface.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use reach_cli::{CliError, run};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays machine-readable. The subscriber
    // also forwards `log` records from the library crates.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            tracing::error!("reach: {err}");
            ExitCode::FAILURE
        }
    }
}
