//! Trailing-month range selection for the chart

use crate::aggregate::MonthlyAggregate;
use serde::{Deserialize, Serialize};
use sheetdash_config::DEFAULT_RANGE;

/// Number of trailing months to display, always at least one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayRange(usize);

impl Default for DisplayRange {
    fn default() -> Self {
        DisplayRange(DEFAULT_RANGE)
    }
}

impl DisplayRange {
    /// Zero falls back to `default`
    pub fn new(months: usize, default: usize) -> Self {
        if months == 0 {
            DisplayRange(default.max(1))
        } else {
            DisplayRange(months)
        }
    }

    /// Parse user input the way a range control submits it
    ///
    /// The leading integer is used (`"6 months"` is 6). Missing, non-numeric,
    /// zero and negative input all fall back to `default`.
    pub fn parse(input: Option<&str>, default: usize) -> Self {
        match input.and_then(leading_integer) {
            Some(n) if n > 0 => DisplayRange::new(usize::try_from(n).unwrap_or(usize::MAX), default),
            _ => DisplayRange::new(0, default),
        }
    }

    pub fn months(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for DisplayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn leading_integer(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    // Oversized input saturates rather than failing.
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// The slice of the monthly series handed to the chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesWindow {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl SeriesWindow {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Select the trailing `min(range, len)` months, preserving order
pub fn select_range(aggregate: &MonthlyAggregate, range: DisplayRange) -> SeriesWindow {
    let skip = aggregate.series.len().saturating_sub(range.months());
    let (labels, values) = aggregate
        .series
        .iter()
        .skip(skip)
        .map(|(k, v)| (k.clone(), *v))
        .unzip();
    SeriesWindow { labels, values }
}
