//! Parsing of the free-text `Duration` and `Voting_Counts` columns.
//!
//! Both parsers are total: malformed input yields a sentinel (`None` for
//! durations, `0` for vote counts) instead of an error.

use super::model::CellValue;

// ---------------------------------------------------------------------------
// Duration
// ---------------------------------------------------------------------------

/// Parse a duration such as `"2h 15m"`, `"45m"`, `"3h"` or a bare `"95"`
/// into whole minutes.
///
/// Case and whitespace are ignored. A bare number is taken as minutes.
/// The minute marker may be omitted after an hour component (`"1h30"`).
/// Returns `None` for anything else, or when the total overflows `u32`.
pub fn parse_duration(text: &str) -> Option<u32> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    let (hours, rest) = match compact.split_once('h') {
        Some((h, rest)) => (Some(parse_digits(h)?), rest),
        None => (None, compact.as_str()),
    };

    let minutes = if rest.is_empty() {
        None
    } else {
        let digits = rest.strip_suffix('m').unwrap_or(rest);
        Some(parse_digits(digits)?)
    };

    if hours.is_none() && minutes.is_none() {
        return None;
    }
    hours
        .unwrap_or(0)
        .checked_mul(60)?
        .checked_add(minutes.unwrap_or(0))
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

// ---------------------------------------------------------------------------
// Vote counts
// ---------------------------------------------------------------------------

/// Parse a stored vote count into an absolute number.
///
/// Numbers pass through truncated toward zero; negative or non-finite
/// numbers become `0`. Text goes through [`parse_count_text`]. `Null` is `0`.
pub fn parse_count(value: &CellValue) -> u64 {
    match value {
        CellValue::Integer(i) => u64::try_from(*i).unwrap_or(0),
        CellValue::Float(f) if f.is_finite() && *f > 0.0 => *f as u64,
        CellValue::Float(_) | CellValue::Null => 0,
        CellValue::Text(s) => parse_count_text(s),
    }
}

/// Parse `"12.3K"`, `"1.5M"`, `"2,345"` or `"870"` into an absolute count.
///
/// The fractional part is applied exactly in decimal, so `"12.3K"` is 12300
/// and never 12299. Anything unrecognised yields `0`.
pub fn parse_count_text(text: &str) -> u64 {
    let cleaned: String = text
        .trim()
        .to_uppercase()
        .chars()
        .filter(|&c| c != ',')
        .collect();

    let (number, exponent) = if let Some(prefix) = cleaned.strip_suffix('K') {
        (prefix, 3)
    } else if let Some(prefix) = cleaned.strip_suffix('M') {
        (prefix, 6)
    } else {
        (cleaned.as_str(), 0)
    };

    scale_decimal(number, exponent).unwrap_or(0)
}

/// Evaluate `floor(number * 10^exponent)` for a plain decimal literal
/// (digits with at most one `.`), without going through floating point.
fn scale_decimal(number: &str, exponent: u32) -> Option<u64> {
    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }

    let scale = 10u64.checked_pow(exponent)?;
    let whole = if int_part.is_empty() {
        0
    } else {
        int_part.parse::<u64>().ok()?.checked_mul(scale)?
    };

    // Only the first `exponent` fractional digits survive the floor.
    let kept: String = frac_part
        .chars()
        .chain(std::iter::repeat('0'))
        .take(exponent as usize)
        .collect();
    let fraction = if kept.is_empty() { 0 } else { kept.parse::<u64>().ok()? };

    whole.checked_add(fraction)
}
