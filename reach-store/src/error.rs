//! Errors raised by the SQLite population store.

use std::path::PathBuf;

use reach_core::RetrievalError;
use rusqlite::Error as SqliteError;
use thiserror::Error;

/// Errors raised while initialising the population schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Enabling foreign keys failed.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A migration statement failed.
    #[error("failed to execute migration step '{step}'")]
    Migration {
        /// Human-readable name of the step.
        step: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// The database was created by an incompatible version.
    #[error("expected population schema version {expected} but found {found}")]
    VersionMismatch {
        /// Version this crate writes.
        expected: i64,
        /// Version recorded in the database.
        found: i64,
    },
}

/// Errors raised while reading the population.
#[derive(Debug, Error)]
pub enum SqlitePopulationError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A campaign row carried a status code this crate does not know.
    #[error("campaign {campaign_id} has unknown status code {code}")]
    UnknownCampaignStatus {
        /// Identifier of the campaign.
        campaign_id: u64,
        /// Stored status code.
        code: i64,
    },
    /// Generic SQLite error when reading rows.
    #[error(transparent)]
    Database(#[from] SqliteError),
}

impl From<SqlitePopulationError> for RetrievalError {
    fn from(err: SqlitePopulationError) -> Self {
        Self::new(err)
    }
}
