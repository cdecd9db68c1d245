use std::collections::BTreeSet;
use std::fmt;

use super::model::{MovieDataset, NormalizedMovie};

// ---------------------------------------------------------------------------
// Duration buckets
// ---------------------------------------------------------------------------

/// Coarse duration ranges offered by the filter page.
///
/// Ranges are inclusive at 60/120/180 on both sides where they meet: a
/// 120-minute movie is in both `OneToTwoHours` and `TwoToThreeHours`.
/// `UnderOneHour` and `OverThreeHours` are strict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DurationBucket {
    #[default]
    All,
    UnderOneHour,
    OneToTwoHours,
    TwoToThreeHours,
    OverThreeHours,
}

impl DurationBucket {
    pub const ALL: [DurationBucket; 5] = [
        DurationBucket::All,
        DurationBucket::UnderOneHour,
        DurationBucket::OneToTwoHours,
        DurationBucket::TwoToThreeHours,
        DurationBucket::OverThreeHours,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DurationBucket::All => "All",
            DurationBucket::UnderOneHour => "< 1 hrs",
            DurationBucket::OneToTwoHours => "1-2 hrs",
            DurationBucket::TwoToThreeHours => "2-3 hrs",
            DurationBucket::OverThreeHours => "> 3 hrs",
        }
    }

    /// Whether a movie of `minutes` length falls in this bucket. Unknown
    /// durations only match `All`.
    pub fn contains(self, minutes: Option<u32>) -> bool {
        match (self, minutes) {
            (DurationBucket::All, _) => true,
            (_, None) => false,
            (DurationBucket::UnderOneHour, Some(m)) => m < 60,
            (DurationBucket::OneToTwoHours, Some(m)) => (60..=120).contains(&m),
            (DurationBucket::TwoToThreeHours, Some(m)) => (120..=180).contains(&m),
            (DurationBucket::OverThreeHours, Some(m)) => m > 180,
        }
    }
}

impl fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// MovieFilter – conjunction of optional predicates
// ---------------------------------------------------------------------------

/// User-chosen predicate values. The default value of each field disables
/// that predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilter {
    pub duration: DurationBucket,
    /// Minimum rating, 0.0–10.0. At `0.0` the predicate is off, so movies
    /// without a rating are kept.
    pub min_rating: f64,
    /// Minimum parsed vote count.
    pub min_votes: u64,
    /// Selected genres; `None` selects every genre.
    pub genres: Option<BTreeSet<String>>,
}

pub const RATING_STEP: f64 = 0.1;
pub const VOTES_STEP: u64 = 100;

/// A filter that selects every genre currently present in `dataset`.
pub fn init_filter_state(dataset: &MovieDataset) -> MovieFilter {
    MovieFilter {
        genres: Some(dataset.genres.clone()),
        ..MovieFilter::default()
    }
}

impl MovieFilter {
    pub fn matches(&self, movie: &NormalizedMovie) -> bool {
        if !self.duration.contains(movie.duration_minutes) {
            return false;
        }
        if self.min_rating > 0.0 && !movie.rating.is_some_and(|r| r >= self.min_rating) {
            return false;
        }
        if movie.votes < self.min_votes {
            return false;
        }
        match &self.genres {
            Some(selected) => selected.contains(&movie.genre),
            None => true,
        }
    }

    /// Rows passing every active predicate, as a new dataset in input order.
    pub fn apply(&self, dataset: &MovieDataset) -> MovieDataset {
        MovieDataset::from_movies(
            dataset
                .movies
                .iter()
                .filter(|m| self.matches(m))
                .cloned()
                .collect(),
        )
    }

    /// Clamp user input into the accepted ranges.
    pub fn sanitize(&mut self) {
        self.min_rating = if self.min_rating.is_finite() {
            self.min_rating.clamp(0.0, 10.0)
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn movie(name: &str, genre: &str, minutes: Option<u32>, rating: Option<f64>, votes: u64) -> NormalizedMovie {
        NormalizedMovie {
            name: name.to_string(),
            genre: genre.to_string(),
            duration: String::new(),
            voting_counts: CellValue::Null,
            rating,
            duration_minutes: minutes,
            votes,
        }
    }

    fn dataset() -> MovieDataset {
        MovieDataset::from_movies(vec![
            movie("Short", "Animation", Some(45), Some(6.1), 800),
            movie("Hour", "Drama", Some(60), Some(7.0), 12_000),
            movie("Two", "Action", Some(120), Some(8.2), 250_000),
            movie("Long", "Sci-Fi", Some(180), Some(7.5), 30_000),
            movie("Epic", "Drama", Some(200), Some(8.9), 90_000),
            movie("Mystery", "Horror", None, None, 0),
        ])
    }

    fn names(ds: &MovieDataset) -> Vec<&str> {
        ds.movies.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn default_filter_keeps_everything_in_order() {
        let ds = dataset();
        let out = MovieFilter::default().apply(&ds);
        assert_eq!(out.movies, ds.movies);

        let all_genres = init_filter_state(&ds).apply(&ds);
        assert_eq!(all_genres.movies, ds.movies);
    }

    #[test]
    fn bucket_boundaries_overlap() {
        let ds = dataset();
        let one_two = MovieFilter { duration: DurationBucket::OneToTwoHours, ..Default::default() };
        let two_three = MovieFilter { duration: DurationBucket::TwoToThreeHours, ..Default::default() };
        assert_eq!(names(&one_two.apply(&ds)), vec!["Hour", "Two"]);
        assert_eq!(names(&two_three.apply(&ds)), vec!["Two", "Long"]);
    }

    #[test]
    fn three_hours_belongs_to_two_to_three() {
        assert!(DurationBucket::TwoToThreeHours.contains(Some(180)));
        assert!(!DurationBucket::OverThreeHours.contains(Some(180)));

        let ds = dataset();
        let over = MovieFilter { duration: DurationBucket::OverThreeHours, ..Default::default() };
        assert_eq!(names(&over.apply(&ds)), vec!["Epic"]);

        let epic_buckets: Vec<DurationBucket> = DurationBucket::ALL
            .into_iter()
            .filter(|b| *b != DurationBucket::All && b.contains(Some(200)))
            .collect();
        assert_eq!(epic_buckets, vec![DurationBucket::OverThreeHours]);
    }

    #[test]
    fn under_one_hour_is_strict() {
        let ds = dataset();
        let f = MovieFilter { duration: DurationBucket::UnderOneHour, ..Default::default() };
        let out = f.apply(&ds);
        assert_eq!(names(&out), vec!["Short"]);
        assert!(out.movies.iter().all(|m| m.duration_minutes.is_some_and(|d| d < 60)));
    }

    #[test]
    fn unknown_duration_only_matches_all() {
        for bucket in DurationBucket::ALL {
            assert_eq!(bucket.contains(None), bucket == DurationBucket::All);
        }
    }

    #[test]
    fn predicates_combine_with_and() {
        let ds = dataset();
        let f = MovieFilter {
            duration: DurationBucket::All,
            min_rating: 7.0,
            min_votes: 50_000,
            genres: Some(["Drama".to_string()].into_iter().collect()),
        };
        assert_eq!(names(&f.apply(&ds)), vec!["Epic"]);
    }

    #[test]
    fn rating_threshold_drops_unrated_movies() {
        let ds = dataset();
        let f = MovieFilter { min_rating: 0.1, ..Default::default() };
        assert!(!names(&f.apply(&ds)).contains(&"Mystery"));
    }

    #[test]
    fn filter_is_idempotent() {
        let ds = dataset();
        let f = MovieFilter { min_votes: 1_000, duration: DurationBucket::OneToTwoHours, ..Default::default() };
        let once = f.apply(&ds);
        let twice = f.apply(&once);
        assert_eq!(once.movies, twice.movies);
    }

    #[test]
    fn disjoint_genre_set_yields_nothing() {
        let ds = dataset();
        let f = MovieFilter { genres: Some(["Western".to_string()].into_iter().collect()), ..Default::default() };
        assert!(f.apply(&ds).is_empty());
        let none = MovieFilter { genres: Some(BTreeSet::new()), ..Default::default() };
        assert!(none.apply(&ds).is_empty());
    }

    #[test]
    fn input_is_not_mutated() {
        let ds = dataset();
        let before = ds.movies.clone();
        let _ = MovieFilter { min_votes: 1_000_000, ..Default::default() }.apply(&ds);
        assert_eq!(ds.movies, before);
    }

    #[test]
    fn sanitize_clamps_rating() {
        let mut f = MovieFilter { min_rating: 12.0, ..Default::default() };
        f.sanitize();
        assert_eq!(f.min_rating, 10.0);
        f.min_rating = f64::NAN;
        f.sanitize();
        assert_eq!(f.min_rating, 0.0);
    }
}
