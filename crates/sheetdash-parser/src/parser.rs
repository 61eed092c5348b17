//! Positional row parser
//!
//! Rows follow the sheet layout `[timestamp, type, category, amount,
//! description, date]`. Nothing here fails: malformed cells fall back to
//! defaults and are reported as [`CellDegrade`] diagnostics.

use crate::types::{
    column, CellDegrade, DegradeReason, ParseOutcome, RawRow, Transaction, TransactionKind,
};
use serde_json::Value;

/// Returns true if the row looks like the sheet header
///
/// The first cell must be text containing "timestamp" in any case.
pub fn is_header_row(row: &RawRow) -> bool {
    match row.first() {
        Some(Value::String(s)) => s.to_lowercase().contains("timestamp"),
        _ => false,
    }
}

/// Parse raw rows into transactions, logging every degraded cell
pub fn parse_rows(rows: &[RawRow]) -> Vec<Transaction> {
    let outcome = parse_rows_detailed(rows);
    for degrade in &outcome.degrades {
        log::debug!(target: "sheetdash::parser", "degraded cell: {}", degrade);
    }
    outcome.transactions
}

/// Parse raw rows and keep the diagnostics
pub fn parse_rows_detailed(rows: &[RawRow]) -> ParseOutcome {
    let header_skipped = rows.first().map(is_header_row).unwrap_or(false);
    let skip = usize::from(header_skipped);

    let mut outcome = ParseOutcome {
        transactions: Vec::with_capacity(rows.len().saturating_sub(skip)),
        degrades: Vec::new(),
        header_skipped,
    };

    for (index, row) in rows.iter().enumerate().skip(skip) {
        let transaction = parse_row(index, row, &mut outcome.degrades);
        outcome.transactions.push(transaction);
    }

    outcome
}

fn parse_row(index: usize, row: &RawRow, degrades: &mut Vec<CellDegrade>) -> Transaction {
    let kind = match row.get(column::KIND) {
        Some(Value::String(label)) => TransactionKind::from_label(label),
        Some(Value::Null) | None => TransactionKind::Other(String::new()),
        Some(other) => TransactionKind::Other(other.to_string()),
    };
    if let TransactionKind::Other(label) = &kind {
        degrades.push(CellDegrade {
            row: index,
            column: column::KIND,
            reason: DegradeReason::UnknownKind(label.clone()),
        });
    }

    let (amount, amount_degrade) = parse_amount(row.get(column::AMOUNT));
    if let Some(reason) = amount_degrade {
        degrades.push(CellDegrade {
            row: index,
            column: column::AMOUNT,
            reason,
        });
    }

    Transaction {
        timestamp: row
            .get(column::TIMESTAMP)
            .filter(|v| !v.is_null())
            .cloned(),
        kind,
        category: text_cell(row.get(column::CATEGORY)),
        amount,
        description: text_cell(row.get(column::DESCRIPTION)),
        date: date_cell(row.get(column::DATE)),
    }
}

/// Coerce the amount cell to a finite number
///
/// Returns the value together with the reason it was degraded, if it was.
pub fn parse_amount(cell: Option<&Value>) -> (f64, Option<DegradeReason>) {
    match cell {
        None | Some(Value::Null) => (0.0, Some(DegradeReason::Missing)),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => (v, None),
            _ => (0.0, Some(DegradeReason::NonFinite(n.to_string()))),
        },
        Some(Value::String(s)) => match leading_decimal(s) {
            None => (0.0, Some(DegradeReason::Unparseable(s.clone()))),
            Some((v, _)) if !v.is_finite() => (0.0, Some(DegradeReason::NonFinite(s.clone()))),
            Some((v, true)) => (v, None),
            Some((v, false)) => (v, Some(DegradeReason::Truncated(s.clone()))),
        },
        Some(_) => (0.0, Some(DegradeReason::UnsupportedType)),
    }
}

/// Parse the longest decimal prefix of `input`
///
/// Leading whitespace is skipped. Returns the value and whether the whole
/// trimmed input was consumed.
pub fn leading_decimal(input: &str) -> Option<(f64, bool)> {
    static DECIMAL_PREFIX: once_cell::sync::OnceCell<regex::Regex> =
        once_cell::sync::OnceCell::new();
    let re = DECIMAL_PREFIX.get_or_init(|| {
        regex::Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?")
            .expect("decimal prefix pattern is valid")
    });

    let trimmed = input.trim_start();
    let matched = re.find(trimmed)?;
    let value: f64 = matched.as_str().parse().ok()?;
    let complete = matched.end() == trimmed.trim_end().len();
    Some((value, complete))
}

fn text_cell(cell: Option<&Value>) -> Option<String> {
    match cell {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// Empty strings, null, zero and false all count as "no date"
fn date_cell(cell: Option<&Value>) -> Option<String> {
    match cell {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => None,
        Some(other) => Some(other.to_string()),
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<RawRow> {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> Vec<RawRow> {
        rows(json!([
            ["Timestamp", "Tipo", "Categoria", "Monto", "Desc", "Fecha"],
            ["t1", "Ingreso", "Salary", "1000", "", "2024-01-15"],
            ["t2", "Gasto", "Food", "250", "", "2024-01-20"],
            ["t3", "Ingreso", "Bonus", "abc", "", "2024-02-01"]
        ]))
    }

    #[test]
    fn test_parse_sample_with_header() {
        let parsed = parse_rows(&sample());
        assert_eq!(parsed.len(), 3);
        let amounts: Vec<f64> = parsed.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![1000.0, 250.0, 0.0]);
        assert!(parsed[0].is_income());
        assert!(parsed[1].is_expense());
        assert_eq!(parsed[1].category.as_deref(), Some("Food"));
        assert_eq!(parsed[2].date.as_deref(), Some("2024-02-01"));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_rows(&[]).is_empty());
        let outcome = parse_rows_detailed(&[]);
        assert!(!outcome.header_skipped);
        assert!(outcome.degrades.is_empty());
    }

    #[test]
    fn test_header_detection_is_case_insensitive() {
        let input = rows(json!([["marca TIMESTAMP", "Tipo"], ["t1", "Gasto", "x", "5"]]));
        let outcome = parse_rows_detailed(&input);
        assert!(outcome.header_skipped);
        assert_eq!(outcome.transactions.len(), 1);
    }

    #[test]
    fn test_no_header_keeps_all_rows() {
        let input = rows(json!([
            ["2024-01-01T00:00:00Z", "Ingreso", "Salary", 10],
            [1704067200000u64, "Gasto", "Rent", 4]
        ]));
        let outcome = parse_rows_detailed(&input);
        assert!(!outcome.header_skipped);
        assert_eq!(outcome.transactions.len(), 2);
    }

    #[test]
    fn test_numeric_first_cell_is_not_header() {
        let input = rows(json!([[12, "Ingreso", "x", "1"]]));
        assert!(!is_header_row(&input[0]));
        assert_eq!(parse_rows(&input).len(), 1);
    }

    #[test]
    fn test_header_only_in_first_row() {
        let input = rows(json!([
            ["t0", "Ingreso", "x", "1"],
            ["Timestamp", "Tipo", "Categoria", "Monto"]
        ]));
        assert_eq!(parse_rows(&input).len(), 2);
    }

    #[test]
    fn test_short_row_yields_absent_fields() {
        let input = rows(json!([["t1", "Gasto"]]));
        let outcome = parse_rows_detailed(&input);
        let tx = &outcome.transactions[0];
        assert_eq!(tx.amount, 0.0);
        assert!(tx.category.is_none());
        assert!(tx.description.is_none());
        assert!(tx.date.is_none());
        assert_eq!(
            outcome.degrades,
            vec![CellDegrade {
                row: 0,
                column: column::AMOUNT,
                reason: DegradeReason::Missing,
            }]
        );
    }

    #[test]
    fn test_empty_row_is_kept() {
        let input = rows(json!([[]]));
        let parsed = parse_rows(&input);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].kind, TransactionKind::Other(String::new()));
        assert!(parsed[0].timestamp.is_none());
    }

    #[test]
    fn test_amount_coercions() {
        assert_eq!(parse_amount(Some(&json!(42.5))), (42.5, None));
        assert_eq!(parse_amount(Some(&json!("  -12.75 "))), (-12.75, None));
        assert_eq!(parse_amount(Some(&json!("1e3"))), (1000.0, None));
        assert_eq!(parse_amount(Some(&json!(".5"))), (0.5, None));

        let (value, reason) = parse_amount(Some(&json!("1,000")));
        assert_eq!(value, 1.0);
        assert!(matches!(reason, Some(DegradeReason::Truncated(_))));

        let (value, reason) = parse_amount(Some(&json!("12abc")));
        assert_eq!(value, 12.0);
        assert!(matches!(reason, Some(DegradeReason::Truncated(_))));

        assert_eq!(parse_amount(Some(&json!("abc"))).0, 0.0);
        assert_eq!(parse_amount(Some(&json!(""))).0, 0.0);
        assert_eq!(parse_amount(Some(&json!(true))), (0.0, Some(DegradeReason::UnsupportedType)));
        assert_eq!(parse_amount(None), (0.0, Some(DegradeReason::Missing)));
        assert_eq!(parse_amount(Some(&Value::Null)), (0.0, Some(DegradeReason::Missing)));
    }

    #[test]
    fn test_amount_is_always_finite() {
        let cells = [
            json!("1e400"),
            json!("-1e999"),
            json!("Infinity"),
            json!("NaN"),
            json!("--5"),
            json!("."),
            json!(["nested"]),
            json!({"a": 1}),
        ];
        for cell in &cells {
            let (value, reason) = parse_amount(Some(cell));
            assert!(value.is_finite(), "cell {:?} gave {}", cell, value);
            assert!(reason.is_some(), "cell {:?} should degrade", cell);
        }
    }

    #[test]
    fn test_leading_decimal() {
        assert_eq!(leading_decimal("3.14"), Some((3.14, true)));
        assert_eq!(leading_decimal("3.14 "), Some((3.14, true)));
        assert_eq!(leading_decimal("+7"), Some((7.0, true)));
        assert_eq!(leading_decimal("7."), Some((7.0, true)));
        assert_eq!(leading_decimal("2e"), Some((2.0, false)));
        assert_eq!(leading_decimal("$10"), None);
        assert_eq!(leading_decimal(""), None);
    }

    #[test]
    fn test_unknown_kind_preserved() {
        let input = rows(json!([["t1", "Transferencia", "x", "50", "", "2024-03-01"]]));
        let outcome = parse_rows_detailed(&input);
        assert_eq!(
            outcome.transactions[0].kind,
            TransactionKind::Other("Transferencia".to_string())
        );
        assert_eq!(outcome.transactions[0].amount, 50.0);
        assert_eq!(outcome.degrades.len(), 1);
        assert_eq!(outcome.degrades[0].column, column::KIND);
    }

    #[test]
    fn test_kind_match_is_exact() {
        assert_eq!(TransactionKind::from_label("Ingreso"), TransactionKind::Income);
        assert_eq!(
            TransactionKind::from_label("ingreso"),
            TransactionKind::Other("ingreso".to_string())
        );
        assert_eq!(TransactionKind::Expense.to_string(), "Gasto");
    }

    #[test]
    fn test_falsy_dates_are_absent() {
        let input = rows(json!([
            ["t", "Gasto", "x", "1", "", ""],
            ["t", "Gasto", "x", "1", "", null],
            ["t", "Gasto", "x", "1", "", 0],
            ["t", "Gasto", "x", "1", "", false],
            ["t", "Gasto", "x", "1", "", "2024-05"]
        ]));
        let dates: Vec<Option<String>> = parse_rows(&input).into_iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![None, None, None, None, Some("2024-05".to_string())]);
    }

    #[test]
    fn test_text_cells() {
        let input = rows(json!([[null, "Ingreso", 7, "1", true, "2024-01-01"]]));
        let tx = &parse_rows(&input)[0];
        assert!(tx.timestamp.is_none());
        assert_eq!(tx.category.as_deref(), Some("7"));
        assert_eq!(tx.description.as_deref(), Some("true"));
    }

    #[test]
    fn test_degrade_display() {
        let degrade = CellDegrade {
            row: 3,
            column: column::AMOUNT,
            reason: DegradeReason::Unparseable("abc".to_string()),
        };
        assert_eq!(degrade.to_string(), "row 3 column 3 (amount): not a number: \"abc\"");
    }
}
