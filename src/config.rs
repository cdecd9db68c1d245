use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::data::store::{validate_table_name, MovieStore, StoreError};

pub const DEFAULT_TABLE: &str = "imdbmovielist2024";

/// Command-line options. Every flag can also come from the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "imdb-dashboard")]
#[command(about = "Analytics dashboard for the IMDB 2024 movie list", long_about = None)]
pub struct Cli {
    /// SQLite database holding the movie table
    #[arg(long, env = "IMDB_DASHBOARD_DB", default_value = "imdbmovielist2024.db")]
    pub db: PathBuf,

    /// Name of the movie table
    #[arg(long, env = "IMDB_DASHBOARD_TABLE", default_value = DEFAULT_TABLE)]
    pub table: String,

    /// How long a query waits on a locked database, in milliseconds
    #[arg(long, env = "IMDB_DASHBOARD_BUSY_TIMEOUT_MS", default_value_t = 5000)]
    pub busy_timeout_ms: u64,

    /// Re-run every query instead of reusing results within the session
    #[arg(long, env = "IMDB_DASHBOARD_NO_CACHE")]
    pub no_cache: bool,

    /// Import a CSV or JSON movie list into the database before starting
    #[arg(long, value_name = "FILE")]
    pub import: Option<PathBuf>,
}

/// Resolved settings for a dashboard session.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub db_path: PathBuf,
    pub table: String,
    pub busy_timeout: Duration,
    pub cache_enabled: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("imdbmovielist2024.db"),
            table: DEFAULT_TABLE.to_string(),
            busy_timeout: Duration::from_millis(5000),
            cache_enabled: true,
        }
    }
}

impl TryFrom<&Cli> for DashboardConfig {
    type Error = StoreError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        validate_table_name(&cli.table)?;
        Ok(Self {
            db_path: cli.db.clone(),
            table: cli.table.clone(),
            busy_timeout: Duration::from_millis(cli.busy_timeout_ms),
            cache_enabled: !cli.no_cache,
        })
    }
}

impl DashboardConfig {
    pub fn store(&self) -> Result<MovieStore, StoreError> {
        MovieStore::new(&self.db_path, &self.table, self.busy_timeout)
    }
}
