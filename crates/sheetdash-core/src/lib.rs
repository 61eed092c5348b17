//! Core dashboard processing
//!
//! The [`Dashboard`] owns the row source and the single-slot cache and runs
//! the fetch → cache → parse → aggregate → present chain.

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod range;
pub mod reports;
pub mod source;

use chrono::{DateTime, Utc};
use sheetdash_config::{ChartConfig, Config};
use sheetdash_parser::{parse_rows_detailed, RawRow};
use sheetdash_utils::MoneyFormat;

pub use aggregate::{aggregate, month_key, parse_timestamp, MonthlyAggregate};
pub use cache::RowCache;
pub use error::{
    CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger,
    ErrorSeverity,
};
pub use range::{select_range, DisplayRange, SeriesWindow};
pub use reports::{money_format, ChartData, ChartDataset, DashboardSummary, FormattedTotals};
pub use source::{decode_rows, demo_rows, HttpRowSource, RowSource, SourceRef, StaticRowSource};

/// Fetch orchestration plus the cached snapshot
pub struct Dashboard {
    config: Config,
    source: SourceRef,
    cache: RowCache,
    default_range: usize,
    last_error: Option<ErrorDetails>,
    error_logger: DefaultErrorLogger,
}

impl Dashboard {
    /// Create a dashboard with config and source
    pub fn new(config: Config, source: SourceRef) -> Self {
        let default_range = config.dashboard.default_range;
        Self {
            config,
            source,
            cache: RowCache::new(),
            default_range,
            last_error: None,
            error_logger: DefaultErrorLogger,
        }
    }

    /// Pick the source from configuration: HTTP when an endpoint is set,
    /// the bundled demo rows otherwise
    pub fn from_config(config: Config) -> CoreResult<Self> {
        let source: SourceRef = if config.is_demo() {
            log::info!("No source endpoint configured, serving demo data");
            std::sync::Arc::new(StaticRowSource::demo())
        } else {
            std::sync::Arc::new(HttpRowSource::from_config(&config.source)?)
        };
        Ok(Self::new(config, source))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared handle to the source, for fetching outside a lock
    pub fn source(&self) -> SourceRef {
        self.source.clone()
    }

    pub fn cache(&self) -> &RowCache {
        &self.cache
    }

    pub fn default_range(&self) -> usize {
        self.default_range
    }

    /// Details of the most recent failed fetch, cleared by a successful one
    pub fn last_error(&self) -> Option<&ErrorDetails> {
        self.last_error.as_ref()
    }

    /// Fetch from the source and replace the cache
    ///
    /// On failure the previous snapshot is kept.
    pub async fn load(&mut self) -> CoreResult<usize> {
        let outcome = self.source.fetch().await;
        self.apply_fetch(outcome)
    }

    /// Commit the result of a fetch performed elsewhere
    ///
    /// Returns the number of rows stored.
    pub fn apply_fetch(&mut self, outcome: CoreResult<Vec<RawRow>>) -> CoreResult<usize> {
        match outcome {
            Ok(rows) => {
                let count = rows.len();
                self.cache.store(rows);
                self.last_error = None;
                log::info!("Loaded {} rows from {}", count, self.source.describe());
                Ok(count)
            }
            Err(error) => {
                let context = ErrorContext::new("fetch_rows")
                    .with_data("source", serde_json::json!(self.source.describe()))
                    .with_data("cache_kept", serde_json::json!(!self.cache.is_empty()));
                self.error_logger.log_error(&error, &context);
                self.last_error = Some(error.to_details());
                Err(error)
            }
        }
    }

    /// Load only when nothing is cached yet
    pub async fn ensure_loaded(&mut self) -> CoreResult<()> {
        if self.cache.is_empty() {
            self.load().await?;
        }
        Ok(())
    }

    /// Drop the cached snapshot so the next render re-fetches
    ///
    /// Returns whether anything was evicted.
    pub fn invalidate(&mut self) -> bool {
        let evicted = self.cache.invalidate();
        if let Some(rows) = &evicted {
            log::info!("Invalidated cache ({} rows)", rows.len());
        }
        evicted.is_some()
    }

    /// Range from user input, falling back to the configured default
    pub fn parse_range(&self, input: Option<&str>) -> DisplayRange {
        DisplayRange::parse(input, self.default_range)
    }

    /// Parse and aggregate the cached rows for display
    pub fn render(&self, range: DisplayRange) -> CoreResult<DashboardView> {
        let rows = self.cache.get().ok_or(CoreError::NotLoaded)?;
        let outcome = parse_rows_detailed(rows);
        for degrade in &outcome.degrades {
            log::debug!(target: "sheetdash::parser", "{}", degrade);
        }

        let aggregate = aggregate(&outcome.transactions);
        let window = select_range(&aggregate, range);
        let format = money_format(&self.config.currency);
        let totals = FormattedTotals::from_aggregate(&aggregate, &format);

        Ok(DashboardView {
            aggregate,
            window,
            totals,
            range,
            transaction_count: outcome.transactions.len(),
            degraded_cells: outcome.degrades.len(),
            fetched_at: self.cache.fetched_at(),
            currency: self.config.currency.default_currency.clone(),
            charts: self.config.charts.clone(),
            format,
        })
    }
}

/// One rendered snapshot of the dashboard
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub aggregate: MonthlyAggregate,
    pub window: SeriesWindow,
    pub totals: FormattedTotals,
    pub range: DisplayRange,
    pub transaction_count: usize,
    pub degraded_cells: usize,
    pub fetched_at: Option<DateTime<Utc>>,
    pub currency: String,
    charts: ChartConfig,
    format: MoneyFormat,
}

impl DashboardView {
    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary {
            total_income: self.aggregate.total_income,
            total_expense: self.aggregate.total_expense,
            balance: self.aggregate.balance,
            formatted: self.totals.clone(),
            currency: self.currency.clone(),
            range: self.range.months(),
            labels: self.window.labels.clone(),
            values: self.window.values.clone(),
            month_count: self.aggregate.month_count(),
            transaction_count: self.transaction_count,
            degraded_cells: self.degraded_cells,
            fetched_at: self.fetched_at.map(|t| t.to_rfc3339()),
        }
    }

    pub fn chart_data(&self) -> ChartData {
        ChartData::monthly_balance(&self.window, &self.charts, &self.currency)
    }

    /// Format an arbitrary amount with the view's currency rules
    pub fn format_amount(&self, value: f64) -> String {
        self.format.format(value)
    }
}

// ==================== Tests ====================
