//! Common types for the row parser

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One untyped row as returned by the spreadsheet endpoint
pub type RawRow = Vec<Value>;

/// Column positions of the fixed six-column sheet layout
pub mod column {
    pub const TIMESTAMP: usize = 0;
    pub const KIND: usize = 1;
    pub const CATEGORY: usize = 2;
    pub const AMOUNT: usize = 3;
    pub const DESCRIPTION: usize = 4;
    pub const DATE: usize = 5;

    /// Human-readable column name for diagnostics
    pub fn name(index: usize) -> &'static str {
        match index {
            TIMESTAMP => "timestamp",
            KIND => "type",
            CATEGORY => "category",
            AMOUNT => "amount",
            DESCRIPTION => "description",
            DATE => "date",
            _ => "unknown",
        }
    }
}

/// Sheet label for income rows
pub const INCOME_LABEL: &str = "Ingreso";
/// Sheet label for expense rows
pub const EXPENSE_LABEL: &str = "Gasto";

/// Transaction kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    /// Unrecognized label, kept verbatim
    Other(String),
}

impl TransactionKind {
    /// Map a sheet label to a kind. Matching is exact and case-sensitive.
    pub fn from_label(label: &str) -> Self {
        match label {
            INCOME_LABEL => TransactionKind::Income,
            EXPENSE_LABEL => TransactionKind::Expense,
            other => TransactionKind::Other(other.to_string()),
        }
    }

    /// Multiplier applied to the amount when building the monthly series
    pub fn sign(&self) -> f64 {
        match self {
            TransactionKind::Income => 1.0,
            TransactionKind::Expense => -1.0,
            TransactionKind::Other(_) => 0.0,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "{}", INCOME_LABEL),
            TransactionKind::Expense => write!(f, "{}", EXPENSE_LABEL),
            TransactionKind::Other(label) => write!(f, "{}", label),
        }
    }
}

/// A typed ledger row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Source timestamp, only used as a date fallback
    pub timestamp: Option<Value>,
    pub kind: TransactionKind,
    pub category: Option<String>,
    /// Always finite; unparseable input becomes 0.0
    pub amount: f64,
    pub description: Option<String>,
    /// `YYYY-MM` or `YYYY-MM-DD`, absent when the cell is empty
    pub date: Option<String>,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Net contribution to a month: income positive, expense negative
    pub fn signed_amount(&self) -> f64 {
        self.kind.sign() * self.amount
    }
}

/// Why a cell fell back to its default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "value", rename_all = "snake_case")]
pub enum DegradeReason {
    /// Cell absent or null
    Missing,
    /// Text without a numeric prefix
    Unparseable(String),
    /// Only a numeric prefix was used (e.g. "1,000" read as 1)
    Truncated(String),
    /// Parsed to infinity
    NonFinite(String),
    /// Booleans, arrays and objects
    UnsupportedType,
    /// Type label other than income or expense
    UnknownKind(String),
}

impl std::fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradeReason::Missing => write!(f, "missing value"),
            DegradeReason::Unparseable(s) => write!(f, "not a number: {:?}", s),
            DegradeReason::Truncated(s) => write!(f, "only numeric prefix used: {:?}", s),
            DegradeReason::NonFinite(s) => write!(f, "non-finite number: {:?}", s),
            DegradeReason::UnsupportedType => write!(f, "unsupported cell type"),
            DegradeReason::UnknownKind(s) => write!(f, "unknown type label: {:?}", s),
        }
    }
}

/// A lenient coercion applied while parsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellDegrade {
    /// Index of the row in the raw input (header included)
    pub row: usize,
    pub column: usize,
    pub reason: DegradeReason,
}

impl std::fmt::Display for CellDegrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row {} column {} ({}): {}",
            self.row,
            self.column,
            column::name(self.column),
            self.reason
        )
    }
}

/// Parsed rows plus the diagnostics collected on the way
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub transactions: Vec<Transaction>,
    pub degrades: Vec<CellDegrade>,
    /// Whether a header row was detected and dropped
    pub header_skipped: bool,
}
