//! Grouped summaries handed to the chart widgets.
//!
//! Every function accepts empty input and returns an empty (or `None`)
//! result rather than panicking.

use std::collections::BTreeMap;

use super::model::NormalizedMovie;

/// A labelled `{category → value}` series ready for charting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub category_label: String,
    pub value_label: String,
    pub points: Vec<(String, f64)>,
}

impl Series {
    pub fn new(category_label: &str, value_label: &str, points: Vec<(String, f64)>) -> Self {
        Self {
            category_label: category_label.to_string(),
            value_label: value_label.to_string(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|(_, v)| v).sum()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.points.iter().map(|(_, v)| *v).reduce(f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Number of rows per category, most frequent first (ties by label).
pub fn value_counts<'a>(categories: impl IntoIterator<Item = &'a str>) -> Vec<(String, f64)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for c in categories {
        *counts.entry(c).or_default() += 1;
    }
    let mut points: Vec<(String, f64)> = counts
        .into_iter()
        .map(|(k, n)| (k.to_string(), n as f64))
        .collect();
    // BTreeMap order is by label, and the sort is stable.
    points.sort_by(|a, b| b.1.total_cmp(&a.1));
    points
}

fn group<'a>(pairs: impl IntoIterator<Item = (&'a str, Option<f64>)>) -> BTreeMap<&'a str, Vec<f64>> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (key, value) in pairs {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            groups.entry(key).or_default().push(v);
        }
    }
    groups
}

fn sorted(mut points: Vec<(String, f64)>, order: SortOrder) -> Vec<(String, f64)> {
    match order {
        SortOrder::Ascending => points.sort_by(|a, b| a.1.total_cmp(&b.1)),
        SortOrder::Descending => points.sort_by(|a, b| b.1.total_cmp(&a.1)),
    }
    points
}

/// Mean of the present values per category. Absent values are skipped and
/// categories with no present value are dropped.
pub fn grouped_mean<'a>(
    pairs: impl IntoIterator<Item = (&'a str, Option<f64>)>,
    order: SortOrder,
) -> Vec<(String, f64)> {
    let points = group(pairs)
        .into_iter()
        .map(|(k, vs)| (k.to_string(), vs.iter().sum::<f64>() / vs.len() as f64))
        .collect();
    sorted(points, order)
}

/// Sum of the present values per category.
pub fn grouped_sum<'a>(
    pairs: impl IntoIterator<Item = (&'a str, Option<f64>)>,
    order: SortOrder,
) -> Vec<(String, f64)> {
    let points = group(pairs)
        .into_iter()
        .map(|(k, vs)| (k.to_string(), vs.iter().sum::<f64>()))
        .collect();
    sorted(points, order)
}

/// Pearson correlation of paired samples. `None` with fewer than two pairs or
/// when either side has zero variance.
pub fn pearson_correlation(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// One histogram bar: `[start, end)` (the last bin is closed) and its count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins spanning the data range.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (Some(min), Some(max)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    // A single distinct value still gets one bar of unit width.
    let (lo, hi) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + width * i as f64,
            end: lo + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in finite {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Min, quartiles and max for a box plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Quartiles use linear interpolation between closest ranks.
pub fn five_number_summary(values: &[f64]) -> Option<FiveNumberSummary> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let quantile = |q: f64| {
        let pos = q * (sorted.len() - 1) as f64;
        let (lo, hi) = (pos.floor() as usize, pos.ceil() as usize);
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    };
    Some(FiveNumberSummary {
        min: sorted[0],
        q1: quantile(0.25),
        median: quantile(0.5),
        q3: quantile(0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Shortest and longest movie by known duration. The first movie wins ties.
pub fn duration_extremes(movies: &[NormalizedMovie]) -> Option<(&NormalizedMovie, &NormalizedMovie)> {
    let known = || movies.iter().filter_map(|m| m.duration_minutes.map(|d| (d, m)));
    let shortest = known().reduce(|best, cur| if cur.0 < best.0 { cur } else { best })?;
    let longest = known().reduce(|best, cur| if cur.0 > best.0 { cur } else { best })?;
    Some((shortest.1, longest.1))
}
