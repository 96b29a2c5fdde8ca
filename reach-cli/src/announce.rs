//! `announce` command implementation.
//!
//! Standard output stands in for the message queue: the command prints the
//! job that would be enqueued.

use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use reach_notify::{
    Announcement, AnnouncementPublisher, Environment, Location, MessageQueue, QueueError,
};
use serde::{Deserialize, Serialize};

use crate::fs::{load_json, require_existing, write_json};
use crate::{
    ARG_ADMIN_URL, ARG_LOCATION, ARG_PRODUCTION, CliError, ENV_ANNOUNCE_ADMIN_URL,
    ENV_ANNOUNCE_LOCATION,
};

/// CLI arguments for the `announce` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Compose the review announcement for a newly created \
                 location read from a JSON file and print the message that \
                 would be queued.",
    about = "Announce a new location to reviewers"
)]
#[ortho_config(prefix = "REACH")]
pub(crate) struct AnnounceArgs {
    /// Path to a JSON file containing the location.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) location_path: Option<Utf8PathBuf>,
    /// Review page of the location.
    #[arg(long = ARG_ADMIN_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) admin_url: Option<String>,
    /// Send to the production review channel.
    #[arg(
        long = ARG_PRODUCTION,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) production: Option<bool>,
}

impl AnnounceArgs {
    pub(crate) fn into_config(self) -> Result<AnnounceConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        AnnounceConfig::try_from(merged)
    }
}

/// Resolved `announce` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AnnounceConfig {
    /// Path to the location JSON file.
    pub(crate) location_path: Utf8PathBuf,
    /// Review page of the location.
    pub(crate) admin_url: String,
    /// Deployment environment selecting the channel.
    pub(crate) environment: Environment,
}

impl TryFrom<AnnounceArgs> for AnnounceConfig {
    type Error = CliError;

    fn try_from(args: AnnounceArgs) -> Result<Self, Self::Error> {
        let location_path = args.location_path.ok_or(CliError::MissingArgument {
            field: ARG_LOCATION,
            env: ENV_ANNOUNCE_LOCATION,
        })?;
        let admin_url = args.admin_url.ok_or(CliError::MissingArgument {
            field: ARG_ADMIN_URL,
            env: ENV_ANNOUNCE_ADMIN_URL,
        })?;
        let environment = if args.production.unwrap_or(false) {
            Environment::Production
        } else {
            Environment::Development
        };
        Ok(Self {
            location_path,
            admin_url,
            environment,
        })
    }
}

/// Job as it would be handed to the delivery worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct QueuedJob {
    pub(crate) channel: String,
    pub(crate) text: String,
    /// Attachments encoded as a JSON array string.
    pub(crate) attachments: String,
    pub(crate) delay_seconds: u64,
}

/// Queue holding jobs until the command prints them.
#[derive(Debug, Default)]
struct Outbox {
    jobs: Mutex<Vec<QueuedJob>>,
}

impl Outbox {
    fn into_jobs(self) -> Vec<QueuedJob> {
        self.jobs.into_inner().unwrap_or_default()
    }
}

impl MessageQueue for Outbox {
    fn enqueue(&self, announcement: &Announcement, delay: Duration) -> Result<(), QueueError> {
        let attachments = announcement.attachments_json().map_err(QueueError::new)?;
        let job = QueuedJob {
            channel: announcement.channel.clone(),
            text: announcement.text.clone(),
            attachments,
            delay_seconds: delay.as_secs(),
        };
        self.jobs
            .lock()
            .map_err(|_| QueueError::new("outbox lock poisoned"))?
            .push(job);
        Ok(())
    }
}

pub(crate) fn run_announce_with(args: AnnounceArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.location_path, ARG_LOCATION)?;
    let location = load_location(&config.location_path)?;

    let outbox = Outbox::default();
    AnnouncementPublisher::new(&outbox, config.environment)
        .publish(&location, &config.admin_url)?;
    for job in outbox.into_jobs() {
        write_json(writer, &job)?;
    }
    Ok(())
}

/// Loads a JSON-encoded [`Location`] from disk.
pub(crate) fn load_location(path: &Utf8Path) -> Result<Location, CliError> {
    load_json(path, ARG_LOCATION)
}
