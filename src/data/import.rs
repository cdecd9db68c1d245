use std::path::Path;

use anyhow::{bail, Context, Result};
use rusqlite::{params_from_iter, Connection};
use serde::Deserialize;

use super::model::{columns, CellValue, Table};
use super::store::validate_table_name;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read a movie list file and append its rows to `table` in the SQLite
/// database at `db_path`, creating the database and table if needed.
///
/// Supported formats, dispatched by extension:
/// * `.csv`  – header row naming the five movie columns (extra columns ignored)
/// * `.json` – `[{ "Movie_Name": ..., "Genre": ..., ... }, ...]`
///
/// Returns the number of rows inserted.
pub fn import_file(path: &Path, db_path: &Path, table: &str) -> Result<usize> {
    let movies = read_file(path)?;
    let mut conn = Connection::open(db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;
    write_movies(&mut conn, table, &movies)
}

/// Parse a movie list file into a table with exactly the five movie columns.
pub fn read_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => read_csv(path),
        "json" => read_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Create `table` if absent and insert every row of `movies` in one
/// transaction. `movies` must carry the five movie columns.
pub fn write_movies(conn: &mut Connection, table: &str, movies: &Table) -> Result<usize> {
    validate_table_name(table)?;
    let indices = columns::ALL
        .iter()
        .map(|c| movies.require_column(c))
        .collect::<Result<Vec<_>, _>>()?;

    let tx = conn.transaction().context("starting import transaction")?;
    tx.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            Movie_Name    TEXT,
            Genre         TEXT,
            Duration      TEXT,
            Voting_Counts TEXT,
            Ratings       REAL
        )"
    ))
    .context("creating movie table")?;
    {
        let mut stmt = tx
            .prepare(&format!(
                "INSERT INTO {table} (Movie_Name, Genre, Duration, Voting_Counts, Ratings)
                 VALUES (?1, ?2, ?3, ?4, ?5)"
            ))
            .context("preparing insert")?;
        for (row_no, row) in movies.rows.iter().enumerate() {
            stmt.execute(params_from_iter(indices.iter().map(|&i| &row[i])))
                .with_context(|| format!("inserting row {row_no}"))?;
        }
    }
    tx.commit().context("committing import")?;

    log::info!("Imported {} movies into {table}", movies.len());
    Ok(movies.len())
}

// ---------------------------------------------------------------------------
// Record layout shared by the CSV and JSON readers
// ---------------------------------------------------------------------------

/// One movie as it appears in an import file. Missing keys and empty CSV
/// fields become `None`; a `Ratings` value that is not a number is dropped.
#[derive(Debug, Deserialize)]
struct MovieRecord {
    #[serde(rename = "Movie_Name")]
    name: Option<String>,
    #[serde(rename = "Genre")]
    genre: Option<String>,
    #[serde(rename = "Duration")]
    duration: Option<RawField>,
    #[serde(rename = "Voting_Counts")]
    voting_counts: Option<RawField>,
    #[serde(rename = "Ratings", default, deserialize_with = "csv::invalid_option")]
    rating: Option<f64>,
}

/// Free-text columns that some exports write as bare numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawField {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<RawField> for CellValue {
    fn from(field: RawField) -> Self {
        match field {
            RawField::Integer(i) => CellValue::Integer(i),
            RawField::Float(f) => CellValue::Float(f),
            RawField::Text(s) => CellValue::Text(s),
        }
    }
}

impl MovieRecord {
    fn into_row(self) -> Vec<CellValue> {
        let text = |s: Option<String>| s.map_or(CellValue::Null, CellValue::Text);
        vec![
            text(self.name),
            text(self.genre),
            self.duration.map_or(CellValue::Null, CellValue::from),
            self.voting_counts.map_or(CellValue::Null, CellValue::from),
            self.rating.map_or(CellValue::Null, CellValue::Float),
        ]
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();
    if let Some(missing) = columns::ALL.iter().find(|c| !headers.iter().any(|h| h == **c)) {
        bail!("CSV missing '{missing}' column");
    }

    let mut table = movie_table();
    for (row_no, result) in reader.deserialize::<MovieRecord>().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        table.rows.push(record.into_row());
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, one object per movie.
fn read_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let records: Vec<MovieRecord> =
        serde_json::from_str(&text).context("parsing JSON movie records")?;

    let mut table = movie_table();
    table.rows.extend(records.into_iter().map(MovieRecord::into_row));
    Ok(table)
}

fn movie_table() -> Table {
    Table::new(columns::ALL.iter().map(|c| c.to_string()).collect())
}
