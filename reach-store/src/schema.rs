//! Schema creation and row writers for the population database.
//!
//! Timestamps are stored as text using rusqlite's `chrono` encoding, birth
//! dates as `YYYY-MM-DD` and campaign statuses as their integer code.

use reach_core::{Campaign, Match, User};
use rusqlite::{Connection, OptionalExtension, Transaction, params};

use crate::SchemaError;

/// Version recorded in `reach_schema_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// Create the `users`, `campaigns` and `matches` tables and their indexes.
///
/// Existing databases must already carry [`SCHEMA_VERSION`]; mismatches are
/// rejected so migrations can be applied explicitly.
///
/// # Errors
/// Returns [`SchemaError`] when a step fails or the recorded version differs.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use reach_store::{SCHEMA_VERSION, initialise_schema};
///
/// let mut conn = Connection::open_in_memory().expect("in-memory database");
/// initialise_schema(&mut conn).expect("create schema");
/// initialise_schema(&mut conn).expect("initialising twice is a no-op");
///
/// let version: i64 = conn
///     .query_row("SELECT version FROM reach_schema_version", [], |row| row.get(0))
///     .expect("read version");
/// assert_eq!(version, SCHEMA_VERSION);
/// ```
pub fn initialise_schema(connection: &mut Connection) -> Result<(), SchemaError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| SchemaError::ForeignKeys { source })?;

    let transaction = connection
        .transaction()
        .map_err(|source| SchemaError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    create_tables(&transaction)?;
    create_indexes(&transaction)?;
    ensure_schema_version(&transaction)?;

    transaction
        .commit()
        .map_err(|source| SchemaError::Migration {
            step: "commit schema transaction",
            source,
        })
}

fn create_tables(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "create users",
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            lon REAL NOT NULL,
            lat REAL NOT NULL,
            birth_date TEXT NOT NULL,
            registered_at TEXT NOT NULL,
            confirmed_at TEXT,
            anonymized_at TEXT,
            grid_row INTEGER NOT NULL,
            grid_col INTEGER NOT NULL
        )",
    )?;
    run_migration_step(
        transaction,
        "create campaigns",
        "CREATE TABLE IF NOT EXISTS campaigns (
            id INTEGER PRIMARY KEY,
            lon REAL NOT NULL,
            lat REAL NOT NULL,
            max_distance_meters REAL NOT NULL,
            min_age INTEGER NOT NULL,
            max_age INTEGER NOT NULL,
            vaccine_type TEXT NOT NULL,
            ranking_mode TEXT NOT NULL DEFAULT 'scored',
            status INTEGER NOT NULL DEFAULT 0
        )",
    )?;
    run_migration_step(
        transaction,
        "create matches",
        "CREATE TABLE IF NOT EXISTS matches (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id),
            campaign_id INTEGER NOT NULL,
            vaccine_type TEXT NOT NULL,
            created_at TEXT NOT NULL,
            confirmed_at TEXT,
            refused_at TEXT
        )",
    )
}

fn create_indexes(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "index users by cell",
        "CREATE INDEX IF NOT EXISTS idx_users_cell ON users(grid_row, grid_col)",
    )?;
    run_migration_step(
        transaction,
        "index matches by user",
        "CREATE INDEX IF NOT EXISTS idx_matches_user ON matches(user_id, created_at)",
    )
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS reach_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0)
        ) WITHOUT ROWID",
    )?;

    let existing: Option<i64> = transaction
        .query_row("SELECT version FROM reach_schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|source| SchemaError::Migration {
            step: "read schema version",
            source,
        })?;

    match existing {
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(found) => Err(SchemaError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => transaction
            .execute(
                "INSERT INTO reach_schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(|source| SchemaError::Migration {
                step: "record schema version",
                source,
            }),
    }
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), SchemaError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| SchemaError::Migration { step, source })
}

/// Insert or replace a user row.
///
/// # Errors
/// Returns the underlying SQLite error.
pub fn insert_user(connection: &Connection, user: &User) -> Result<(), rusqlite::Error> {
    connection
        .execute(
            "INSERT OR REPLACE INTO users
                (id, lon, lat, birth_date, registered_at, confirmed_at, anonymized_at,
                 grid_row, grid_col)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user.id.0,
                user.location.x,
                user.location.y,
                user.birth_date,
                user.registered_at,
                user.confirmed_at,
                user.anonymized_at,
                user.cell.row,
                user.cell.col,
            ],
        )
        .map(|_| ())
}

/// Insert or replace a campaign row.
///
/// # Errors
/// Returns the underlying SQLite error.
pub fn insert_campaign(connection: &Connection, campaign: &Campaign) -> Result<(), rusqlite::Error> {
    connection
        .execute(
            "INSERT OR REPLACE INTO campaigns
                (id, lon, lat, max_distance_meters, min_age, max_age, vaccine_type,
                 ranking_mode, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                campaign.id.0,
                campaign.location.x,
                campaign.location.y,
                campaign.max_distance_meters,
                campaign.min_age,
                campaign.max_age,
                campaign.vaccine_type,
                campaign.ranking_mode.as_str(),
                campaign.status.code(),
            ],
        )
        .map(|_| ())
}

/// Insert or replace a match row.
///
/// # Errors
/// Returns the underlying SQLite error.
pub fn insert_match(connection: &Connection, contact: &Match) -> Result<(), rusqlite::Error> {
    connection
        .execute(
            "INSERT OR REPLACE INTO matches
                (id, user_id, campaign_id, vaccine_type, created_at, confirmed_at, refused_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                contact.id.0,
                contact.user_id.0,
                contact.campaign_id.0,
                contact.vaccine_type,
                contact.created_at,
                contact.confirmed_at,
                contact.refused_at,
            ],
        )
        .map(|_| ())
}
