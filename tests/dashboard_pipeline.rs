use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;

use imdb_dashboard::config::DashboardConfig;
use imdb_dashboard::data::filter::{init_filter_state, DurationBucket, MovieFilter};
use imdb_dashboard::data::import::{import_file, write_movies};
use imdb_dashboard::data::loader::{DatasetLoader, TableSource};
use imdb_dashboard::data::model::{columns, CellValue, MovieDataset, Table};
use imdb_dashboard::data::store::{MovieStore, ReportQuery, StoreError};
use imdb_dashboard::report::{build_report, Page, ReportBody};
use imdb_dashboard::state::AppState;

const TABLE: &str = "imdbmovielist2024";

fn movie(name: &str, genre: &str, duration: &str, votes: CellValue, rating: Option<f64>) -> Vec<CellValue> {
    vec![
        CellValue::Text(name.to_string()),
        CellValue::Text(genre.to_string()),
        CellValue::Text(duration.to_string()),
        votes,
        rating.map(CellValue::Float).unwrap_or(CellValue::Null),
    ]
}

fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

fn seed(dir: &Path) -> PathBuf {
    let db = dir.join("movies.db");
    let mut table = Table::new(columns::ALL.iter().map(|c| c.to_string()).collect());
    table.rows = vec![
        movie("Dune: Part Two", "Sci-Fi", "2h 46m", text("512K"), Some(8.5)),
        movie("Inside Out 2", "Animation", "1h 36m", text("150K"), Some(7.6)),
        movie("Short Cuts", "Animation", "45m", text("900"), Some(6.2)),
        movie("Civil War", "Action", "1h 49m", text("1.2M"), Some(8.5)),
        movie("The Long Night", "Drama", "3h 20m", text("12,345"), Some(7.9)),
        movie("Exactly Two", "Drama", "2h", CellValue::Integer(4_000), Some(6.8)),
        movie("Untitled Project", "Horror", "TBA", text("n/a"), None),
    ];
    let mut conn = Connection::open(&db).unwrap();
    write_movies(&mut conn, TABLE, &table).unwrap();
    db
}

fn loader(db: &Path) -> DatasetLoader {
    let store = MovieStore::new(db, TABLE, Duration::from_millis(500)).unwrap();
    DatasetLoader::new(store, true)
}

#[test]
fn top_rated_orders_by_rating_then_parsed_votes() {
    let dir = tempfile::tempdir().unwrap();
    let mut loader = loader(&seed(dir.path()));
    let report = build_report(Page::TopRated, &mut loader).unwrap();
    let ReportBody::Table(table) = report.body else {
        panic!("expected table");
    };
    let names: Vec<String> = table
        .column_values(columns::MOVIE_NAME)
        .unwrap()
        .into_iter()
        .map(|c| c.as_label())
        .collect();
    // 1.2M beats 512K even though "1.2M" < "512K" as text.
    assert_eq!(&names[..2], ["Civil War", "Dune: Part Two"]);
    assert_eq!(names.len(), 7);
}

#[test]
fn genre_leaders_pick_max_rating_per_genre() {
    let dir = tempfile::tempdir().unwrap();
    let mut loader = loader(&seed(dir.path()));
    let ReportBody::Table(table) = build_report(Page::GenreRatingLeaders, &mut loader).unwrap().body else {
        panic!("expected table");
    };
    let pairs: Vec<(String, String)> = table
        .rows
        .iter()
        .map(|r| (r[1].as_label(), r[0].as_label()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("Action".to_string(), "Civil War".to_string()),
            ("Animation".to_string(), "Inside Out 2".to_string()),
            ("Drama".to_string(), "The Long Night".to_string()),
            ("Sci-Fi".to_string(), "Dune: Part Two".to_string()),
        ]
    );
}

#[test]
fn filter_page_over_real_storage() {
    let dir = tempfile::tempdir().unwrap();
    let mut loader = loader(&seed(dir.path()));
    let ReportBody::Filter(ds) = build_report(Page::FilterData, &mut loader).unwrap().body else {
        panic!("expected filter dataset");
    };
    assert_eq!(ds.len(), 7);

    let defaults = init_filter_state(&ds).apply(&ds);
    assert_eq!(defaults.movies, ds.movies);

    let two_three = MovieFilter {
        duration: DurationBucket::TwoToThreeHours,
        ..MovieFilter::default()
    }
    .apply(&ds);
    let names: Vec<&str> = two_three.movies.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Dune: Part Two", "Exactly Two"]);

    let popular = MovieFilter {
        min_votes: 100_000,
        min_rating: 8.0,
        ..MovieFilter::default()
    }
    .apply(&ds);
    let names: Vec<&str> = popular.movies.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Dune: Part Two", "Civil War"]);

    let short = MovieFilter {
        duration: DurationBucket::UnderOneHour,
        ..MovieFilter::default()
    }
    .apply(&ds);
    assert!(short.movies.iter().all(|m| m.duration_minutes.is_some_and(|d| d < 60)));
    assert_eq!(short.len(), 1);
}

#[test]
fn repeated_loads_hit_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    let mut loader = loader(&seed(dir.path()));
    build_report(Page::GenreAnalysis, &mut loader).unwrap();
    build_report(Page::GenreAnalysis, &mut loader).unwrap();
    assert_eq!(loader.cache().stats(), (1, 1));
    loader.reload();
    assert!(loader.cache().is_empty());
}

#[test]
fn missing_table_is_a_query_error() {
    let dir = tempfile::tempdir().unwrap();
    let db = seed(dir.path());
    let store = MovieStore::new(&db, "no_such_table", Duration::from_millis(100)).unwrap();
    let mut loader = DatasetLoader::new(store, true);
    let err = loader.load(ReportQuery::FullTable).unwrap_err();
    assert!(matches!(err, StoreError::Query { .. }));
    assert!(loader.cache().is_empty());
}

#[test]
fn queries_do_not_write() {
    let dir = tempfile::tempdir().unwrap();
    let db = seed(dir.path());
    let store = MovieStore::new(&db, TABLE, Duration::from_millis(100)).unwrap();
    let err = store.run(&format!("DELETE FROM {TABLE}")).unwrap_err();
    assert!(matches!(err, StoreError::Query { .. }));
    let remaining = store.run(&format!("SELECT * FROM {TABLE}")).unwrap();
    assert_eq!(MovieDataset::from_table(&remaining).len(), 7);
}

#[test]
fn app_state_keeps_other_pages_working_after_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = DashboardConfig {
        db_path: dir.path().join("absent.db"),
        ..DashboardConfig::default()
    };
    let mut state = AppState::new(config).unwrap();
    state.select_page(Page::GenreAnalysis);
    assert!(state.page_error.is_some());
    assert!(state.report.is_none());

    let db = seed(dir.path());
    state.open_database(&db);
    assert!(state.page_error.is_none());
    state.select_page(Page::FilterData);
    assert_eq!(state.filtered.as_ref().map(|d| d.len()), Some(7));

    state.select_no_genres();
    assert_eq!(state.filtered.as_ref().map(|d| d.len()), Some(0));
    state.toggle_genre("Drama");
    assert_eq!(state.filtered.as_ref().map(|d| d.len()), Some(2));
    state.select_all_genres();
    assert_eq!(state.filtered.as_ref().map(|d| d.len()), Some(7));
}

#[test]
fn import_appends_csv_rows() {
    let dir = tempfile::tempdir().unwrap();
    let db = seed(dir.path());
    let csv_path = dir.path().join("more.csv");
    std::fs::write(
        &csv_path,
        "Movie_Name,Genre,Duration,Voting_Counts,Ratings\nLate Entry,Comedy,1h 30m,2.5K,6.9\n",
    )
    .unwrap();
    assert_eq!(import_file(&csv_path, &db, TABLE).unwrap(), 1);

    let mut loader = loader(&db);
    let ReportBody::Bars { series, .. } = build_report(Page::GenreAnalysis, &mut loader).unwrap().body else {
        panic!("expected bars");
    };
    assert!(series.points.iter().any(|(g, n)| g == "Comedy" && *n == 1.0));
}

#[test]
fn reloaded_filter_page_selects_newly_imported_genres() {
    let dir = tempfile::tempdir().unwrap();
    let config = DashboardConfig {
        db_path: seed(dir.path()),
        ..DashboardConfig::default()
    };
    let mut state = AppState::new(config).unwrap();
    state.select_page(Page::FilterData);
    assert_eq!(state.filtered.as_ref().map(|d| d.len()), Some(7));

    let csv_path = dir.path().join("comedy.csv");
    std::fs::write(
        &csv_path,
        "Movie_Name,Genre,Duration,Voting_Counts,Ratings\nLate Entry,Comedy,1h 30m,2.5K,6.9\n",
    )
    .unwrap();
    state.import_file(&csv_path);

    assert!(state.available_genres().contains("Comedy"));
    assert_eq!(state.filter.genres.as_ref(), Some(&state.available_genres()));
    assert_eq!(state.filtered.as_ref().map(|d| d.len()), Some(8));
}
