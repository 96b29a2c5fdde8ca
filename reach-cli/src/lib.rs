//! Command-line interface for the reachable-user engine.
//!
//! `reach select` and `reach count` run the engine against a SQLite
//! population database; `reach announce` composes the announcement for a
//! new location and prints the queued message. Options layer CLI flags,
//! `REACH_*` environment variables and configuration files.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod announce;
mod error;
mod fs;
mod select;

pub use error::CliError;

use announce::AnnounceArgs;
use select::{CountArgs, SelectArgs};

pub(crate) const ARG_CAMPAIGN: &str = "campaign";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_LIMIT: &str = "limit";
pub(crate) const ARG_SEED: &str = "seed";
pub(crate) const ARG_EXCLUSION_HOURS: &str = "exclusion-hours";
pub(crate) const ARG_CELL_DEGREES: &str = "cell-degrees";
pub(crate) const ARG_LOCATION: &str = "location";
pub(crate) const ARG_ADMIN_URL: &str = "admin-url";
pub(crate) const ARG_PRODUCTION: &str = "production";
pub(crate) const ENV_SELECT_CAMPAIGN: &str = "REACH_CMDS_SELECT_CAMPAIGN_PATH";
pub(crate) const ENV_SELECT_DATABASE: &str = "REACH_CMDS_SELECT_DATABASE";
pub(crate) const ENV_COUNT_CAMPAIGN: &str = "REACH_CMDS_COUNT_CAMPAIGN_PATH";
pub(crate) const ENV_COUNT_DATABASE: &str = "REACH_CMDS_COUNT_DATABASE";
pub(crate) const ENV_ANNOUNCE_LOCATION: &str = "REACH_CMDS_ANNOUNCE_LOCATION_PATH";
pub(crate) const ENV_ANNOUNCE_ADMIN_URL: &str = "REACH_CMDS_ANNOUNCE_ADMIN_URL";

/// Run the `reach` CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, configuration, the engine or
/// output fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Select(args) => select::run_select_with(args, chrono::Utc::now(), &mut stdout),
        Command::Count(args) => select::run_count_with(args, chrono::Utc::now(), &mut stdout),
        Command::Announce(args) => announce::run_announce_with(args, &mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "reach",
    about = "Select and rank users reachable by an outreach campaign",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Select and rank candidates for a campaign.
    Select(SelectArgs),
    /// Estimate how many users a campaign could reach.
    Count(CountArgs),
    /// Compose the announcement for a newly created location.
    Announce(AnnounceArgs),
}

#[cfg(test)]
mod tests;
