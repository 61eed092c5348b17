//! Report structures for API responses

use crate::aggregate::MonthlyAggregate;
use crate::range::SeriesWindow;
use serde::{Deserialize, Serialize};
use sheetdash_config::{ChartConfig, CurrencyConfig, SymbolPosition};
use sheetdash_utils::MoneyFormat;

/// The three headline totals, already formatted for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedTotals {
    pub income: String,
    pub expense: String,
    pub balance: String,
}

impl FormattedTotals {
    pub fn from_aggregate(aggregate: &MonthlyAggregate, format: &MoneyFormat) -> Self {
        Self {
            income: format.format(aggregate.total_income),
            expense: format.format(aggregate.total_expense),
            balance: format.format(aggregate.balance),
        }
    }
}

/// Dashboard summary for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub formatted: FormattedTotals,
    pub currency: String,
    pub range: usize,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Months in the full series, before range selection
    pub month_count: usize,
    pub transaction_count: usize,
    pub degraded_cells: usize,
    /// RFC 3339 time of the cached fetch
    pub fetched_at: Option<String>,
}

/// Chart data for visualization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub chart_type: String,
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
    pub options: serde_json::Value,
}

/// Chart dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Option<String>,
    pub border_color: Option<String>,
}

const CHART_FILL: &str = "rgba(54, 162, 235, 0.5)";
const CHART_BORDER: &str = "rgba(54, 162, 235, 1)";

impl ChartData {
    /// Single-dataset monthly balance chart
    pub fn monthly_balance(window: &SeriesWindow, charts: &ChartConfig, currency: &str) -> Self {
        let dataset = ChartDataset {
            label: format!("Monthly balance ({})", currency),
            data: window.values.clone(),
            background_color: Some(CHART_FILL.to_string()),
            border_color: Some(CHART_BORDER.to_string()),
        };

        Self {
            chart_type: charts.default_chart_type.to_string(),
            title: "Monthly balance".to_string(),
            labels: window.labels.clone(),
            datasets: vec![dataset],
            options: serde_json::json!({
                "responsive": true,
                "plugins": { "legend": { "display": charts.show_legend } },
                "scales": { "y": { "beginAtZero": charts.begin_at_zero } }
            }),
        }
    }

    /// Chart.js `{type, data, options}` object
    pub fn to_chartjs(&self) -> serde_json::Value {
        let datasets: Vec<serde_json::Value> = self
            .datasets
            .iter()
            .map(|d| {
                serde_json::json!({
                    "label": d.label,
                    "data": d.data,
                    "backgroundColor": d.background_color,
                    "borderColor": d.border_color,
                    "borderWidth": 1
                })
            })
            .collect();

        serde_json::json!({
            "type": self.chart_type,
            "data": { "labels": self.labels, "datasets": datasets },
            "options": self.options
        })
    }
}

/// Currency rules from configuration
pub fn money_format(currency: &CurrencyConfig) -> MoneyFormat {
    MoneyFormat {
        symbol: currency.symbol.clone(),
        symbol_before: currency.symbol_position == SymbolPosition::Before,
        decimal_places: currency.decimal_places,
        thousands_separator: currency.thousands_separator.clone(),
        decimal_separator: currency.decimal_separator.clone(),
    }
}
