//! Monthly aggregation of parsed transactions

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sheetdash_parser::{Transaction, TransactionKind};
use std::collections::BTreeMap;

/// Totals plus the per-month net series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub total_income: f64,
    pub total_expense: f64,
    /// Always `total_income - total_expense`
    pub balance: f64,
    /// `YYYY-MM` -> net amount. BTreeMap keeps keys unique and ascending,
    /// which is chronological for fixed-width month keys.
    pub series: BTreeMap<String, f64>,
}

impl MonthlyAggregate {
    /// Month keys in ascending order
    pub fn labels(&self) -> Vec<String> {
        self.series.keys().cloned().collect()
    }

    /// Net values aligned with [`labels`](Self::labels)
    pub fn values(&self) -> Vec<f64> {
        self.series.values().copied().collect()
    }

    pub fn month_count(&self) -> usize {
        self.series.len()
    }
}

/// Reduce transactions to totals and a monthly series
///
/// Transactions without a resolvable month still count toward the totals.
pub fn aggregate(transactions: &[Transaction]) -> MonthlyAggregate {
    let mut result = MonthlyAggregate::default();

    for tx in transactions {
        match tx.kind {
            TransactionKind::Income => result.total_income += tx.amount,
            TransactionKind::Expense => result.total_expense += tx.amount,
            TransactionKind::Other(_) => {}
        }

        if let Some(month) = month_key(tx) {
            *result.series.entry(month).or_insert(0.0) += tx.signed_amount();
        }
    }

    result.balance = result.total_income - result.total_expense;
    result
}

/// Resolve the `YYYY-MM` bucket of a transaction
///
/// The date column wins and is truncated to seven characters without any
/// calendar validation; otherwise the timestamp is parsed and its UTC
/// year-month used.
pub fn month_key(tx: &Transaction) -> Option<String> {
    if let Some(date) = &tx.date {
        return Some(date.chars().take(7).collect());
    }
    tx.timestamp
        .as_ref()
        .and_then(parse_timestamp)
        .map(|dt| dt.format("%Y-%m").to_string())
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a sheet timestamp cell
///
/// Numbers are milliseconds since the Unix epoch. Strings may be RFC 3339 or
/// one of the naive layouts the spreadsheet emits; naive values are read as UTC.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))?;
            DateTime::from_timestamp_millis(millis)
        }
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}
