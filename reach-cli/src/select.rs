//! `select` and `count` command implementations.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use reach_core::{
    Campaign, CampaignId, ExclusionPolicy, RankingMode, ReachEngine, SelectionRequest,
    UniformGrid, UserId,
};
use reach_store::SqlitePopulationSource;
use serde::{Deserialize, Serialize};

use crate::fs::{load_json, require_existing, write_json};
use crate::{
    ARG_CAMPAIGN, ARG_CELL_DEGREES, ARG_DATABASE, ARG_EXCLUSION_HOURS, ARG_LIMIT, ARG_SEED,
    CliError, ENV_COUNT_CAMPAIGN, ENV_COUNT_DATABASE, ENV_SELECT_CAMPAIGN, ENV_SELECT_DATABASE,
};

/// CLI arguments for the `select` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Select and rank the users a campaign may contact. The \
                 campaign is read from a JSON file and the population from \
                 a SQLite database; the ranked user identifiers are printed \
                 as JSON.",
    about = "Select and rank candidates for a campaign"
)]
#[ortho_config(prefix = "REACH")]
pub(crate) struct SelectArgs {
    /// Path to a JSON file containing the campaign.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) campaign_path: Option<Utf8PathBuf>,
    /// Path to the SQLite population database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Maximum number of candidates to print.
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Seed for random sampling; drawn at random when absent.
    #[arg(long = ARG_SEED, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Hours during which a recent contact excludes a user.
    #[arg(long = ARG_EXCLUSION_HOURS, value_name = "hours")]
    #[serde(default)]
    pub(crate) exclusion_hours: Option<u64>,
    /// Grid cell size in degrees used by random sampling.
    #[arg(long = ARG_CELL_DEGREES, value_name = "degrees")]
    #[serde(default)]
    pub(crate) cell_degrees: Option<f64>,
}

impl SelectArgs {
    pub(crate) fn into_config(self) -> Result<SelectConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SelectConfig::try_from(merged)
    }
}

/// CLI arguments for the `count` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Estimate how many users a campaign could reach, ignoring \
                 recent contacts. The campaign is read from a JSON file and \
                 the population from a SQLite database.",
    about = "Estimate the reachable population of a campaign"
)]
#[ortho_config(prefix = "REACH")]
pub(crate) struct CountArgs {
    /// Path to a JSON file containing the campaign.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) campaign_path: Option<Utf8PathBuf>,
    /// Path to the SQLite population database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl CountArgs {
    pub(crate) fn into_config(self) -> Result<SelectConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SelectConfig::try_from(merged)
    }
}

/// Resolved configuration shared by `select` and `count`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SelectConfig {
    /// Path to the campaign JSON file.
    pub(crate) campaign_path: Utf8PathBuf,
    /// Path to the SQLite population database.
    pub(crate) database: Utf8PathBuf,
    /// Maximum number of candidates, if any.
    pub(crate) limit: Option<usize>,
    /// Sampling seed, if fixed.
    pub(crate) seed: Option<u64>,
    /// Recent-contact exclusion policy.
    pub(crate) policy: ExclusionPolicy,
    /// Grid used for random-sampling coverings.
    pub(crate) grid: UniformGrid,
}

impl SelectConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.campaign_path, ARG_CAMPAIGN)?;
        require_existing(&self.database, ARG_DATABASE)
    }

    fn engine(&self) -> ReachEngine<SqlitePopulationSource, UniformGrid> {
        ReachEngine::new(
            SqlitePopulationSource::new(self.database.as_std_path()),
            self.grid,
        )
        .with_policy(self.policy)
    }
}

impl TryFrom<SelectArgs> for SelectConfig {
    type Error = CliError;

    fn try_from(args: SelectArgs) -> Result<Self, Self::Error> {
        let campaign_path = args.campaign_path.ok_or(CliError::MissingArgument {
            field: ARG_CAMPAIGN,
            env: ENV_SELECT_CAMPAIGN,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_SELECT_DATABASE,
        })?;
        let policy = ExclusionPolicy::from_hours(
            args.exclusion_hours
                .unwrap_or(ExclusionPolicy::DEFAULT_PERIOD_HOURS),
        )?;
        let grid = UniformGrid::new(
            args.cell_degrees
                .unwrap_or(UniformGrid::DEFAULT_CELL_DEGREES),
        )?;
        Ok(Self {
            campaign_path,
            database,
            limit: args.limit,
            seed: args.seed,
            policy,
            grid,
        })
    }
}

impl TryFrom<CountArgs> for SelectConfig {
    type Error = CliError;

    fn try_from(args: CountArgs) -> Result<Self, Self::Error> {
        let campaign_path = args.campaign_path.ok_or(CliError::MissingArgument {
            field: ARG_CAMPAIGN,
            env: ENV_COUNT_CAMPAIGN,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_COUNT_DATABASE,
        })?;
        Ok(Self {
            campaign_path,
            database,
            limit: None,
            seed: None,
            policy: ExclusionPolicy::default(),
            grid: UniformGrid::default(),
        })
    }
}

/// Output of the `select` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SelectionReport {
    pub(crate) campaign_id: CampaignId,
    pub(crate) ranking_mode: RankingMode,
    pub(crate) seed: u64,
    pub(crate) user_ids: Vec<UserId>,
}

/// Output of the `count` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CountReport {
    pub(crate) campaign_id: CampaignId,
    pub(crate) estimated_count: usize,
}

pub(crate) fn run_select_with(
    args: SelectArgs,
    now: DateTime<Utc>,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let report = execute_select(&config, now)?;
    write_json(writer, &report)
}

pub(crate) fn run_count_with(
    args: CountArgs,
    now: DateTime<Utc>,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let report = execute_count(&config, now)?;
    write_json(writer, &report)
}

fn execute_select(config: &SelectConfig, now: DateTime<Utc>) -> Result<SelectionReport, CliError> {
    let campaign = load_campaign(&config.campaign_path)?;
    let seed = config.seed.unwrap_or_else(|| {
        let drawn = rand::random();
        info!("no seed supplied, sampling with seed {drawn}");
        drawn
    });
    let request = SelectionRequest {
        limit: config.limit,
        ..SelectionRequest::new(now).with_seed(seed)
    };
    let user_ids = config.engine().select_candidates(&campaign, &request)?;
    Ok(SelectionReport {
        campaign_id: campaign.id,
        ranking_mode: campaign.ranking_mode,
        seed,
        user_ids,
    })
}

fn execute_count(config: &SelectConfig, now: DateTime<Utc>) -> Result<CountReport, CliError> {
    let campaign = load_campaign(&config.campaign_path)?;
    let estimated_count = config.engine().estimate_candidate_count(&campaign, now)?;
    Ok(CountReport {
        campaign_id: campaign.id,
        estimated_count,
    })
}

/// Loads a JSON-encoded [`Campaign`] from disk.
pub(crate) fn load_campaign(path: &Utf8Path) -> Result<Campaign, CliError> {
    load_json(path, ARG_CAMPAIGN)
}

#[cfg(test)]
pub(crate) fn select_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SelectConfig, CliError> {
    let merged = SelectArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SelectConfig::try_from(merged)
}
