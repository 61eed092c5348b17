//! Spreadsheet row parser
//!
//! Turns the loosely typed rows returned by a spreadsheet web app into
//! [`Transaction`] records. Every coercion is lenient: a bad cell degrades to
//! a default value instead of failing the whole batch.

pub mod parser;
pub mod types;

pub use parser::{is_header_row, leading_decimal, parse_amount, parse_rows, parse_rows_detailed};

// Re-export commonly used types
pub use types::{
    column, CellDegrade, DegradeReason, ParseOutcome, RawRow, Transaction, TransactionKind,
    EXPENSE_LABEL, INCOME_LABEL,
};
