use std::path::PathBuf;
use std::time::Duration;

use rusqlite::functions::FunctionFlags;
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OpenFlags};

use super::model::{CellValue, Table};
use super::normalize::parse_count;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot open database {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("query failed: {query}")]
    Query {
        query: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("result set has no column `{column}`")]
    MissingColumn { column: String },
    #[error("invalid table name `{0}`: use ASCII letters, digits and underscores")]
    InvalidTableName(String),
}

/// Check that `name` can be spliced into query text as a bare identifier.
pub fn validate_table_name(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidTableName(name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Report queries
// ---------------------------------------------------------------------------

/// The fixed, parameterless read-only queries the dashboard issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportQuery {
    /// Every column of every row.
    FullTable,
    /// Ten best movies by rating, then by parsed vote count.
    TopRated,
    Genres,
    GenreDurations,
    GenreVotes,
    GenreRatings,
    Ratings,
    RatingsVotesDuration,
    NameGenreDuration,
    /// Movies whose rating equals the maximum rating of their genre.
    GenreLeaders,
}

impl ReportQuery {
    /// SQL text for the given (already validated) table name.
    ///
    /// Rows tied on every sort key come back in storage order, which SQLite
    /// does not guarantee.
    pub fn sql(self, table: &str) -> String {
        match self {
            ReportQuery::FullTable => format!("SELECT * FROM {table}"),
            ReportQuery::TopRated => format!(
                "SELECT * FROM {table} \
                 ORDER BY Ratings DESC, vote_count(Voting_Counts) DESC LIMIT 10"
            ),
            ReportQuery::Genres => format!("SELECT Genre FROM {table}"),
            ReportQuery::GenreDurations => format!("SELECT Genre, Duration FROM {table}"),
            ReportQuery::GenreVotes => format!("SELECT Genre, Voting_Counts FROM {table}"),
            ReportQuery::GenreRatings => format!("SELECT Genre, Ratings FROM {table}"),
            ReportQuery::Ratings => format!("SELECT Ratings FROM {table}"),
            ReportQuery::RatingsVotesDuration => {
                format!("SELECT Ratings, Voting_Counts, Duration FROM {table}")
            }
            ReportQuery::NameGenreDuration => {
                format!("SELECT Movie_Name, Genre, Duration FROM {table}")
            }
            ReportQuery::GenreLeaders => format!(
                "SELECT * FROM {table} AS a \
                 WHERE Ratings = (SELECT MAX(Ratings) FROM {table} AS b WHERE a.Genre = b.Genre) \
                 ORDER BY Genre, Ratings DESC"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// MovieStore – scoped read-only access to the movie table
// ---------------------------------------------------------------------------

/// Where the movie table lives. Holds no connection: every query opens one
/// and closes it before returning.
#[derive(Debug, Clone)]
pub struct MovieStore {
    db_path: PathBuf,
    table: String,
    busy_timeout: Duration,
}

impl MovieStore {
    pub fn new(db_path: impl Into<PathBuf>, table: &str, busy_timeout: Duration) -> Result<Self, StoreError> {
        validate_table_name(table)?;
        Ok(Self {
            db_path: db_path.into(),
            table: table.to_string(),
            busy_timeout,
        })
    }

    /// SQL text of `query` against this store's table.
    pub fn sql_for(&self, query: ReportQuery) -> String {
        query.sql(&self.table)
    }

    /// Run `sql` on a fresh read-only connection and materialise every row.
    pub fn run(&self, sql: &str) -> Result<Table, StoreError> {
        let conn = self.open()?;
        let table = query_table(&conn, sql).map_err(|source| StoreError::Query {
            query: sql.to_string(),
            source,
        })?;
        log::debug!("{} rows from {:?}", table.len(), sql);
        Ok(table)
    }

    fn open(&self) -> Result<Connection, StoreError> {
        let open_err = |source| StoreError::Open {
            path: self.db_path.clone(),
            source,
        };
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(open_err)?;
        conn.busy_timeout(self.busy_timeout).map_err(open_err)?;
        register_functions(&conn).map_err(open_err)?;
        Ok(conn)
    }
}

/// `vote_count(x)` exposes the vote-count parser to SQL so ordering follows
/// the numeric value rather than the stored text.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "vote_count",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let cell = cell_from_value_ref(ctx.get_raw(0));
            Ok(i64::try_from(parse_count(&cell)).unwrap_or(i64::MAX))
        },
    )
}

fn query_table(conn: &Connection, sql: &str) -> rusqlite::Result<Table> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();

    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|i| row.get_ref(i).map(cell_from_value_ref))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Table { columns, rows })
}

pub(crate) fn cell_from_value_ref(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(f) => CellValue::Float(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            CellValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

impl ToSql for CellValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            CellValue::Integer(i) => ToSqlOutput::from(*i),
            CellValue::Float(f) => ToSqlOutput::from(*f),
            CellValue::Text(s) => ToSqlOutput::from(s.as_str()),
            CellValue::Null => ToSqlOutput::from(rusqlite::types::Null),
        })
    }
}
