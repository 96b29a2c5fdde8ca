//! Population source reading a SQLite database.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use geo::Coord;
use reach_core::{
    CampaignId, CampaignStatus, GridCell, HistoryEntry, Match, MatchId, PopulationQuery,
    PopulationSnapshot, PopulationSource, RetrievalError, User, UserId,
};
use rusqlite::{Connection, OpenFlags, Row, params_from_iter, types::Value};

use crate::SqlitePopulationError;

/// SQLite limits bound parameters per statement to 999 by default. Queries
/// are chunked to remain below that ceiling.
const SQLITE_MAX_VARIABLE_NUMBER: usize = 999;

/// Birth-window bounds take two parameters and each cell two more, so 498
/// cells keep a statement at 998 parameters.
const CELLS_PER_CHUNK: usize = 498;

const USER_COLUMNS: &str = "id, lon, lat, birth_date, registered_at, confirmed_at, \
                            anonymized_at, grid_row, grid_col";

/// Read-only [`PopulationSource`] backed by a SQLite database.
///
/// The source only remembers the database path. Each
/// [`load`](PopulationSource::load) opens a read-only connection, pushes the
/// confirmation, anonymisation, birth-window and grid predicates into SQL,
/// reads the history of the selected users and closes the connection before
/// returning.
///
/// # Examples
/// ```no_run
/// use reach_core::{ReachEngine, UniformGrid};
/// use reach_store::SqlitePopulationSource;
///
/// let engine = ReachEngine::new(
///     SqlitePopulationSource::new("population.db"),
///     UniformGrid::default(),
/// );
/// # let _ = engine;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlitePopulationSource {
    path: PathBuf,
}

impl SqlitePopulationSource {
    /// Build a source reading the database at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the database.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the users and history matching `query`.
    ///
    /// # Errors
    /// Returns [`SqlitePopulationError`] when the database cannot be opened
    /// or read, or when a campaign carries an unknown status.
    pub fn read(&self, query: &PopulationQuery) -> Result<PopulationSnapshot, SqlitePopulationError> {
        let connection = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| SqlitePopulationError::OpenDatabase {
                path: self.path.clone(),
                source,
            })?;

        let users = load_users(&connection, query)?;
        let ids: Vec<UserId> = users.iter().map(|user| user.id).collect();
        let history = load_history(&connection, &ids)?;
        log::debug!(
            "read {} users and {} matches from {}",
            users.len(),
            history.len(),
            self.path.display()
        );
        Ok(PopulationSnapshot::new(users, history))
    }
}

impl PopulationSource for SqlitePopulationSource {
    fn load(&self, query: &PopulationQuery) -> Result<PopulationSnapshot, RetrievalError> {
        self.read(query).map_err(RetrievalError::from)
    }
}

fn birth_window_params(query: &PopulationQuery) -> [Value; 2] {
    [
        Value::Text(query.birth_window.earliest.to_string()),
        Value::Text(query.birth_window.latest.to_string()),
    ]
}

fn load_users(
    connection: &Connection,
    query: &PopulationQuery,
) -> Result<Vec<User>, SqlitePopulationError> {
    let base = format!(
        "SELECT {USER_COLUMNS} FROM users
         WHERE confirmed_at IS NOT NULL
           AND anonymized_at IS NULL
           AND birth_date BETWEEN ?1 AND ?2"
    );
    let Some(covering) = &query.cells else {
        return query_users(connection, &base, birth_window_params(query).to_vec());
    };

    let cells: Vec<GridCell> = covering.iter().copied().collect();
    let mut users = Vec::new();
    for chunk in cells.chunks(CELLS_PER_CHUNK) {
        let tuples = vec!["(?, ?)"; chunk.len()].join(", ");
        let sql = format!("{base} AND (grid_row, grid_col) IN (VALUES {tuples})");
        let mut values = birth_window_params(query).to_vec();
        for cell in chunk {
            values.push(Value::Integer(i64::from(cell.row)));
            values.push(Value::Integer(i64::from(cell.col)));
        }
        users.extend(query_users(connection, &sql, values)?);
    }
    Ok(users)
}

fn query_users(
    connection: &Connection,
    sql: &str,
    values: Vec<Value>,
) -> Result<Vec<User>, SqlitePopulationError> {
    let mut statement = connection.prepare(sql)?;
    let users = statement
        .query_map(params_from_iter(values), user_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let lon: f64 = row.get(1)?;
    let lat: f64 = row.get(2)?;
    let birth_date: NaiveDate = row.get(3)?;
    let registered_at: DateTime<Utc> = row.get(4)?;
    Ok(User {
        id: UserId(row.get(0)?),
        location: Coord { x: lon, y: lat },
        birth_date,
        registered_at,
        confirmed_at: row.get(5)?,
        anonymized_at: row.get(6)?,
        cell: GridCell::new(row.get(7)?, row.get(8)?),
    })
}

fn load_history(
    connection: &Connection,
    ids: &[UserId],
) -> Result<Vec<HistoryEntry>, SqlitePopulationError> {
    let mut history = Vec::new();
    for chunk in ids.chunks(SQLITE_MAX_VARIABLE_NUMBER) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!(
            "SELECT m.id, m.user_id, m.campaign_id, m.vaccine_type, m.created_at,
                    m.confirmed_at, m.refused_at, COALESCE(c.status, 0)
             FROM matches AS m
             LEFT JOIN campaigns AS c ON c.id = m.campaign_id
             WHERE m.user_id IN ({placeholders})"
        );
        let mut statement = connection.prepare(&sql)?;
        let mut rows = statement.query(params_from_iter(chunk.iter().map(|id| id.0)))?;
        while let Some(row) = rows.next()? {
            history.push(history_from_row(row)?);
        }
    }
    Ok(history)
}

fn history_from_row(row: &Row<'_>) -> Result<HistoryEntry, SqlitePopulationError> {
    let campaign_id = CampaignId(row.get(2)?);
    let code: i64 = row.get(7)?;
    let campaign_status = CampaignStatus::from_code(code).ok_or(
        SqlitePopulationError::UnknownCampaignStatus {
            campaign_id: campaign_id.0,
            code,
        },
    )?;
    Ok(HistoryEntry {
        contact: Match {
            id: MatchId(row.get(0)?),
            user_id: UserId(row.get(1)?),
            campaign_id,
            vaccine_type: row.get(3)?,
            created_at: row.get(4)?,
            confirmed_at: row.get(5)?,
            refused_at: row.get(6)?,
        },
        campaign_status,
    })
}
