use std::fmt;

use anyhow::{Context, Result};

use crate::data::aggregate::{
    self, duration_extremes, five_number_summary, grouped_mean, grouped_sum, histogram,
    pearson_correlation, FiveNumberSummary, HistogramBin, Series, SortOrder,
};
use crate::data::loader::TableSource;
use crate::data::model::{columns, MovieDataset, NormalizedMovie, Table};
use crate::data::store::ReportQuery;

pub const HISTOGRAM_BINS: usize = 15;

// ---------------------------------------------------------------------------
// Pages of the sidebar menu
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Page {
    #[default]
    TopRated,
    Correlation,
    GenreAnalysis,
    DurationInsights,
    VotingPatterns,
    RatingDistribution,
    GenreRatingLeaders,
    PopularGenresByVotes,
    DurationExtremes,
    RatingsByGenre,
    FilterData,
}

impl Page {
    pub const ALL: [Page; 11] = [
        Page::TopRated,
        Page::Correlation,
        Page::GenreAnalysis,
        Page::DurationInsights,
        Page::VotingPatterns,
        Page::RatingDistribution,
        Page::GenreRatingLeaders,
        Page::PopularGenresByVotes,
        Page::DurationExtremes,
        Page::RatingsByGenre,
        Page::FilterData,
    ];

    /// Menu entry text.
    pub fn label(self) -> &'static str {
        match self {
            Page::TopRated => "Top-Rated Movies",
            Page::Correlation => "Correlation Analysis",
            Page::GenreAnalysis => "Genre Analysis",
            Page::DurationInsights => "Duration Insights",
            Page::VotingPatterns => "Voting Patterns",
            Page::RatingDistribution => "Rating Distribution",
            Page::GenreRatingLeaders => "Genre-Based Rating Leader",
            Page::PopularGenresByVotes => "Most Popular Genres by Voting",
            Page::DurationExtremes => "Duration Extremes",
            Page::RatingsByGenre => "Ratings by Genre",
            Page::FilterData => "Filter Data",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::TopRated => "Top 10 Movies by Rating and Voting Counts",
            Page::GenreAnalysis => "Genre Distribution",
            Page::DurationInsights => "Average Duration by Genre",
            Page::VotingPatterns => "Voting Trends by Genre",
            Page::GenreRatingLeaders => "Genre-Based Rating Leaders",
            Page::PopularGenresByVotes => "Most Popular Genres by Voting",
            Page::FilterData => "Interactive Filtering",
            other => other.label(),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Page::TopRated => "The ten highest-rated movies, ties broken by vote count.",
            Page::Correlation => "Relationship between Ratings and Voting Counts.",
            Page::GenreAnalysis => "Count of movies for each genre.",
            Page::DurationInsights => "Average duration of movies across genres.",
            Page::VotingPatterns => "Genres with the highest average voting counts.",
            Page::RatingDistribution => "Distribution of ratings across all movies.",
            Page::GenreRatingLeaders => "The top-rated movie for each genre.",
            Page::PopularGenresByVotes => "Share of total voting counts per genre.",
            Page::DurationExtremes => "The shortest and longest movies.",
            Page::RatingsByGenre => "Average rating for each genre.",
            Page::FilterData => "Narrow the movie list by duration, rating, votes and genre.",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Report content handed to the UI
// ---------------------------------------------------------------------------

/// How bar values are printed next to the bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Count,
    Minutes,
    Thousands,
}

impl ValueFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            ValueFormat::Count => format!("{value:.0}"),
            ValueFormat::Minutes => format!("{} min", value as i64),
            ValueFormat::Thousands => group_thousands(value as i64),
        }
    }
}

/// `1234567` → `"1,234,567"`.
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone)]
pub enum ReportBody {
    Table(Table),
    Bars {
        series: Series,
        horizontal: bool,
        format: ValueFormat,
    },
    Scatter {
        points: Vec<[f64; 2]>,
        x_label: String,
        y_label: String,
        correlation: Option<f64>,
    },
    Distribution {
        bins: Vec<HistogramBin>,
        summary: Option<FiveNumberSummary>,
    },
    Pie(Series),
    Heatmap(Series),
    Extremes {
        shortest: Table,
        longest: Table,
    },
    /// The full normalised table; the filter is applied by the caller.
    Filter(MovieDataset),
}

#[derive(Debug, Clone)]
pub struct Report {
    pub page: Page,
    pub body: ReportBody,
}

// ---------------------------------------------------------------------------
// Building reports
// ---------------------------------------------------------------------------

/// Load, normalise and summarise the data behind `page`.
///
/// Each call performs its own load, so a failure here affects this page only.
pub fn build_report(page: Page, source: &mut impl TableSource) -> Result<Report> {
    let mut load = |query: ReportQuery| {
        source
            .load(query)
            .with_context(|| format!("loading data for \"{}\"", page.label()))
    };

    let body = match page {
        Page::TopRated => ReportBody::Table(Table::clone(&*load(ReportQuery::TopRated)?)),
        Page::GenreRatingLeaders => {
            ReportBody::Table(Table::clone(&*load(ReportQuery::GenreLeaders)?))
        }
        Page::GenreAnalysis => {
            let table = load(ReportQuery::Genres)?;
            let ds = normalized(&table, &[columns::GENRE])?;
            ReportBody::Bars {
                series: Series::new(
                    "Genre",
                    "Movie Count",
                    aggregate::value_counts(ds.movies.iter().map(|m| m.genre.as_str())),
                ),
                horizontal: false,
                format: ValueFormat::Count,
            }
        }
        Page::DurationInsights => {
            let table = load(ReportQuery::GenreDurations)?;
            let ds = normalized(&table, &[columns::GENRE, columns::DURATION])?;
            let pairs = ds
                .movies
                .iter()
                .map(|m| (m.genre.as_str(), m.duration_minutes.map(f64::from)));
            ReportBody::Bars {
                series: Series::new(
                    "Genre",
                    "Average Duration (minutes)",
                    grouped_mean(pairs, SortOrder::Ascending),
                ),
                horizontal: true,
                format: ValueFormat::Minutes,
            }
        }
        Page::VotingPatterns => {
            let table = load(ReportQuery::GenreVotes)?;
            let ds = normalized(&table, &[columns::GENRE, columns::VOTING_COUNTS])?;
            let pairs = ds.movies.iter().map(|m| (m.genre.as_str(), Some(m.votes as f64)));
            ReportBody::Bars {
                series: Series::new(
                    "Genre",
                    "Average Voting Counts",
                    grouped_mean(pairs, SortOrder::Ascending),
                ),
                horizontal: true,
                format: ValueFormat::Thousands,
            }
        }
        Page::Correlation => {
            let table = load(ReportQuery::RatingsVotesDuration)?;
            let ds = normalized(&table, &[columns::RATINGS, columns::VOTING_COUNTS])?;
            let points: Vec<[f64; 2]> = ds
                .movies
                .iter()
                .filter_map(|m| Some([m.rating?, m.votes as f64]))
                .collect();
            let pairs: Vec<(f64, f64)> = points.iter().map(|p| (p[0], p[1])).collect();
            ReportBody::Scatter {
                correlation: pearson_correlation(&pairs),
                points,
                x_label: "IMDB Ratings".to_string(),
                y_label: "Voting Counts".to_string(),
            }
        }
        Page::RatingDistribution => {
            let table = load(ReportQuery::Ratings)?;
            let ds = normalized(&table, &[columns::RATINGS])?;
            let ratings: Vec<f64> = ds.movies.iter().filter_map(|m| m.rating).collect();
            ReportBody::Distribution {
                bins: histogram(&ratings, HISTOGRAM_BINS),
                summary: five_number_summary(&ratings),
            }
        }
        Page::PopularGenresByVotes => {
            let table = load(ReportQuery::GenreVotes)?;
            let ds = normalized(&table, &[columns::GENRE, columns::VOTING_COUNTS])?;
            let pairs = ds.movies.iter().map(|m| (m.genre.as_str(), Some(m.votes as f64)));
            ReportBody::Pie(Series::new(
                "Genre",
                "Total Voting Counts",
                grouped_sum(pairs, SortOrder::Descending),
            ))
        }
        Page::DurationExtremes => {
            let table = load(ReportQuery::NameGenreDuration)?;
            let ds = normalized(&table, &[columns::MOVIE_NAME, columns::GENRE, columns::DURATION])?;
            let (shortest, longest) = match duration_extremes(&ds.movies) {
                Some((s, l)) => (vec![s], vec![l]),
                None => (Vec::new(), Vec::new()),
            };
            ReportBody::Extremes {
                shortest: extremes_table(&shortest),
                longest: extremes_table(&longest),
            }
        }
        Page::RatingsByGenre => {
            let table = load(ReportQuery::GenreRatings)?;
            let ds = normalized(&table, &[columns::GENRE, columns::RATINGS])?;
            let pairs = ds.movies.iter().map(|m| (m.genre.as_str(), m.rating));
            // Heatmap rows read alphabetically.
            let mut points = grouped_mean(pairs, SortOrder::Ascending);
            points.sort_by(|a, b| a.0.cmp(&b.0));
            ReportBody::Heatmap(Series::new("Genre", "Average Rating", points))
        }
        Page::FilterData => {
            let table = load(ReportQuery::FullTable)?;
            ReportBody::Filter(normalized(&table, &columns::ALL)?)
        }
    };

    Ok(Report { page, body })
}

/// Normalise `table` after checking it carries the columns the page reads.
fn normalized(table: &Table, required: &[&str]) -> Result<MovieDataset> {
    for column in required {
        table.require_column(column)?;
    }
    Ok(MovieDataset::from_table(table))
}

fn extremes_table(movies: &[&NormalizedMovie]) -> Table {
    use crate::data::model::CellValue;
    let mut table = Table::new(
        [columns::MOVIE_NAME, columns::GENRE, columns::DURATION]
            .map(String::from)
            .to_vec(),
    );
    table.rows = movies
        .iter()
        .map(|m| {
            vec![
                CellValue::Text(m.name.clone()),
                CellValue::Text(m.genre.clone()),
                CellValue::Text(m.duration.clone()),
            ]
        })
        .collect();
    table
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::data::model::CellValue;
    use crate::data::store::StoreError;

    /// Serves canned tables per query; queries without a table fail.
    #[derive(Default)]
    struct FakeSource {
        tables: HashMap<ReportQuery, Table>,
        loads: usize,
    }

    impl TableSource for FakeSource {
        fn load(&mut self, query: ReportQuery) -> Result<Arc<Table>, StoreError> {
            self.loads += 1;
            self.tables
                .get(&query)
                .cloned()
                .map(Arc::new)
                .ok_or_else(|| StoreError::MissingColumn {
                    column: format!("{query:?}"),
                })
        }
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn table(cols: &[&str], rows: Vec<Vec<CellValue>>) -> Table {
        Table {
            columns: cols.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn genre_analysis_counts_movies() {
        let mut src = FakeSource::default();
        src.tables.insert(
            ReportQuery::Genres,
            table(&["Genre"], vec![vec![text("Drama")], vec![text("Action")], vec![text("Drama")]]),
        );
        let report = build_report(Page::GenreAnalysis, &mut src).unwrap();
        let ReportBody::Bars { series, horizontal, .. } = report.body else {
            panic!("expected bars");
        };
        assert!(!horizontal);
        assert_eq!(series.points, vec![("Drama".into(), 2.0), ("Action".into(), 1.0)]);
    }

    #[test]
    fn duration_insights_average_known_durations() {
        let mut src = FakeSource::default();
        src.tables.insert(
            ReportQuery::GenreDurations,
            table(
                &["Genre", "Duration"],
                vec![
                    vec![text("Drama"), text("2h")],
                    vec![text("Drama"), text("1h 40m")],
                    vec![text("Drama"), text("??")],
                    vec![text("Horror"), text("90m")],
                ],
            ),
        );
        let report = build_report(Page::DurationInsights, &mut src).unwrap();
        let ReportBody::Bars { series, format, .. } = report.body else {
            panic!("expected bars");
        };
        assert_eq!(format, ValueFormat::Minutes);
        assert_eq!(series.points, vec![("Horror".into(), 90.0), ("Drama".into(), 110.0)]);
    }

    #[test]
    fn empty_tables_render_empty_reports() {
        let mut src = FakeSource::default();
        src.tables.insert(ReportQuery::GenreRatings, table(&["Genre", "Ratings"], vec![]));
        src.tables.insert(ReportQuery::Ratings, table(&["Ratings"], vec![]));
        src.tables.insert(ReportQuery::NameGenreDuration, table(&["Movie_Name", "Genre", "Duration"], vec![]));

        let ReportBody::Heatmap(series) = build_report(Page::RatingsByGenre, &mut src).unwrap().body else {
            panic!("expected heatmap");
        };
        assert!(series.is_empty());

        let ReportBody::Distribution { bins, summary } =
            build_report(Page::RatingDistribution, &mut src).unwrap().body
        else {
            panic!("expected distribution");
        };
        assert!(bins.is_empty());
        assert!(summary.is_none());

        let ReportBody::Extremes { shortest, longest } =
            build_report(Page::DurationExtremes, &mut src).unwrap().body
        else {
            panic!("expected extremes");
        };
        assert!(shortest.is_empty() && longest.is_empty());
    }

    #[test]
    fn failure_is_confined_to_the_page() {
        let mut src = FakeSource::default();
        src.tables.insert(ReportQuery::Genres, table(&["Genre"], vec![vec![text("Drama")]]));
        let err = build_report(Page::TopRated, &mut src).unwrap_err();
        assert!(format!("{err:#}").contains("Top-Rated Movies"));
        assert!(build_report(Page::GenreAnalysis, &mut src).is_ok());
    }

    #[test]
    fn missing_column_is_reported() {
        let mut src = FakeSource::default();
        src.tables.insert(ReportQuery::Genres, table(&["genre"], vec![vec![text("Drama")]]));
        let err = build_report(Page::GenreAnalysis, &mut src).unwrap_err();
        assert!(format!("{err:#}").contains("Genre"));
    }

    #[test]
    fn correlation_skips_unrated_rows() {
        let mut src = FakeSource::default();
        src.tables.insert(
            ReportQuery::RatingsVotesDuration,
            table(
                &["Ratings", "Voting_Counts", "Duration"],
                vec![
                    vec![CellValue::Float(6.0), text("1K"), text("1h")],
                    vec![CellValue::Float(7.0), text("2K"), text("1h")],
                    vec![CellValue::Null, text("9K"), text("1h")],
                    vec![CellValue::Float(8.0), text("3K"), text("1h")],
                ],
            ),
        );
        let ReportBody::Scatter { points, correlation, .. } =
            build_report(Page::Correlation, &mut src).unwrap().body
        else {
            panic!("expected scatter");
        };
        assert_eq!(points.len(), 3);
        assert!((correlation.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn popular_genres_sum_parsed_votes() {
        let mut src = FakeSource::default();
        src.tables.insert(
            ReportQuery::GenreVotes,
            table(
                &["Genre", "Voting_Counts"],
                vec![
                    vec![text("Drama"), text("1.5K")],
                    vec![text("Action"), text("1M")],
                    vec![text("Drama"), CellValue::Integer(500)],
                ],
            ),
        );
        let ReportBody::Pie(series) = build_report(Page::PopularGenresByVotes, &mut src).unwrap().body else {
            panic!("expected pie");
        };
        assert_eq!(series.points, vec![("Action".into(), 1_000_000.0), ("Drama".into(), 2_000.0)]);
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(-12_345), "-12,345");
    }

    #[test]
    fn every_page_has_a_distinct_label() {
        let labels: std::collections::HashSet<_> = Page::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(labels.len(), Page::ALL.len());
        assert_eq!(Page::default(), Page::TopRated);
    }
}
