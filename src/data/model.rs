use std::collections::BTreeSet;
use std::fmt;

use super::normalize::{parse_count, parse_duration};
use super::store::StoreError;

/// Column names of the movie table, case-sensitive at the storage boundary.
pub mod columns {
    pub const MOVIE_NAME: &str = "Movie_Name";
    pub const GENRE: &str = "Genre";
    pub const DURATION: &str = "Duration";
    pub const VOTING_COUNTS: &str = "Voting_Counts";
    pub const RATINGS: &str = "Ratings";
    /// Derived: parsed duration in minutes.
    pub const DURATION_MINUTES: &str = "Duration_Minutes";

    pub const ALL: [&str; 5] = [MOVIE_NAME, GENRE, DURATION, VOTING_COUNTS, RATINGS];
}

// ---------------------------------------------------------------------------
// CellValue – a single cell of a query result
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring SQLite's storage classes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64`; text is parsed leniently.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// Text content for label-like columns. `Null` becomes the empty string.
    pub fn as_label(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            other => other.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – a materialised result set
// ---------------------------------------------------------------------------

/// Column names plus rows, in the order the query produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like [`Table::column_index`] but reports a missing column as an error.
    pub fn require_column(&self, name: &str) -> Result<usize, StoreError> {
        self.column_index(name)
            .ok_or_else(|| StoreError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Values of one column, top to bottom.
    pub fn column_values(&self, name: &str) -> Result<Vec<&CellValue>, StoreError> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }
}

static NULL_CELL: CellValue = CellValue::Null;

// ---------------------------------------------------------------------------
// NormalizedMovie – one row with derived numeric columns
// ---------------------------------------------------------------------------

/// A movie row plus the numeric columns derived from its free-text fields.
///
/// Columns the source query did not select are left at their empty value
/// (`""`, `Null`, `None`).
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMovie {
    pub name: String,
    pub genre: String,
    /// Raw duration text, e.g. `"2h 15m"`.
    pub duration: String,
    /// Raw vote count as stored, e.g. `"12K"`.
    pub voting_counts: CellValue,
    pub rating: Option<f64>,
    /// Parsed duration; `None` when the text is unparseable.
    pub duration_minutes: Option<u32>,
    /// Parsed vote count; `0` when unparseable.
    pub votes: u64,
}

// ---------------------------------------------------------------------------
// MovieDataset – normalised rows with a genre index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MovieDataset {
    pub movies: Vec<NormalizedMovie>,
    /// Distinct genres present, sorted.
    pub genres: BTreeSet<String>,
}

impl MovieDataset {
    /// Normalise a query result. Derived columns are recomputed on every call.
    pub fn from_table(table: &Table) -> Self {
        let idx = |name: &str| table.column_index(name);
        let (name_i, genre_i, duration_i, votes_i, rating_i) = (
            idx(columns::MOVIE_NAME),
            idx(columns::GENRE),
            idx(columns::DURATION),
            idx(columns::VOTING_COUNTS),
            idx(columns::RATINGS),
        );

        let movies: Vec<NormalizedMovie> = table
            .rows
            .iter()
            .map(|row| {
                let cell = |i: Option<usize>| i.map(|i| &row[i]).unwrap_or(&NULL_CELL);
                let duration = cell(duration_i).as_label();
                let voting_counts = cell(votes_i).clone();
                NormalizedMovie {
                    name: cell(name_i).as_label(),
                    genre: cell(genre_i).as_label(),
                    duration_minutes: parse_duration(&duration),
                    votes: parse_count(&voting_counts),
                    rating: cell(rating_i).as_f64(),
                    duration,
                    voting_counts,
                }
            })
            .collect();

        let unknown = movies
            .iter()
            .filter(|m| duration_i.is_some() && m.duration_minutes.is_none())
            .count();
        if unknown > 0 {
            log::debug!("{unknown} of {} rows have an unknown duration", movies.len());
        }

        Self::from_movies(movies)
    }

    pub fn from_movies(movies: Vec<NormalizedMovie>) -> Self {
        let genres = movies.iter().map(|m| m.genre.clone()).collect();
        Self { movies, genres }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Render as a table for display: the stored columns with `Voting_Counts`
    /// replaced by its parsed value, plus `Duration_Minutes`.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(
            columns::ALL
                .iter()
                .chain(std::iter::once(&columns::DURATION_MINUTES))
                .map(|c| c.to_string())
                .collect(),
        );
        table.rows = self
            .movies
            .iter()
            .map(|m| {
                vec![
                    CellValue::Text(m.name.clone()),
                    CellValue::Text(m.genre.clone()),
                    CellValue::Text(m.duration.clone()),
                    CellValue::Integer(i64::try_from(m.votes).unwrap_or(i64::MAX)),
                    m.rating.map(CellValue::Float).unwrap_or(CellValue::Null),
                    m.duration_minutes
                        .map(|d| CellValue::Integer(i64::from(d)))
                        .unwrap_or(CellValue::Null),
                ]
            })
            .collect();
        table
    }
}
