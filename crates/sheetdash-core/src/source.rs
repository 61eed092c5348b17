//! Row sources
//!
//! A [`RowSource`] performs one read of the spreadsheet and returns the raw
//! rows untouched. [`HttpRowSource`] talks to a deployed spreadsheet web app;
//! [`StaticRowSource`] serves rows held in memory for demo mode and tests.

use crate::error::{CoreError, CoreResult};
use async_trait::async_trait;
use serde_json::json;
use sheetdash_config::SourceConfig;
use sheetdash_parser::RawRow;
use std::sync::Arc;
use std::time::Duration;

/// One remote read of the sheet
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Fetch every row, header included
    async fn fetch(&self) -> CoreResult<Vec<RawRow>>;

    /// Short human-readable description for logs and the settings page
    fn describe(&self) -> String;
}

pub type SourceRef = Arc<dyn RowSource>;

/// Reads rows from a spreadsheet web app with `GET {endpoint}?{read_param}=true`
pub struct HttpRowSource {
    client: reqwest::Client,
    endpoint: String,
    read_param: String,
}

impl HttpRowSource {
    /// `timeout` of `None` lets a request wait indefinitely
    pub fn new(endpoint: &str, read_param: &str, timeout: Option<Duration>) -> CoreResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CoreError::Config {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            read_param: read_param.to_string(),
        })
    }

    pub fn from_config(config: &SourceConfig) -> CoreResult<Self> {
        Self::new(
            &config.endpoint,
            &config.read_param,
            (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs)),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RowSource for HttpRowSource {
    async fn fetch(&self) -> CoreResult<Vec<RawRow>> {
        log::debug!(target: "sheetdash::source", "GET {}?{}=true", self.endpoint, self.read_param);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[(self.read_param.as_str(), "true")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Transport {
                message: format!("Endpoint answered with HTTP {}", status),
            });
        }

        let body = response.text().await?;
        let rows = decode_rows(&body)?;
        log::debug!(target: "sheetdash::source", "Fetched {} rows", rows.len());
        Ok(rows)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

/// Decode a response body into rows
///
/// The body must be a JSON array of arrays. Cell values are kept as-is.
pub fn decode_rows(body: &str) -> CoreResult<Vec<RawRow>> {
    serde_json::from_str(body).map_err(|e| CoreError::Format {
        message: e.to_string(),
    })
}

/// In-memory rows, returned on every fetch
#[derive(Debug, Clone, Default)]
pub struct StaticRowSource {
    rows: Vec<RawRow>,
    label: String,
}

impl StaticRowSource {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self {
            rows,
            label: "static rows".to_string(),
        }
    }

    /// The bundled sample ledger
    pub fn demo() -> Self {
        Self {
            rows: demo_rows(),
            label: "demo data".to_string(),
        }
    }
}

#[async_trait]
impl RowSource for StaticRowSource {
    async fn fetch(&self) -> CoreResult<Vec<RawRow>> {
        Ok(self.rows.clone())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// Fifteen months of sample rows shaped like a form-response sheet
///
/// Amounts are mixed strings and numbers, and a few rows carry only a
/// timestamp, so the sample exercises the same paths as a real sheet.
pub fn demo_rows() -> Vec<RawRow> {
    let mut rows: Vec<RawRow> = vec![vec![
        json!("Timestamp"),
        json!("Tipo"),
        json!("Categoria"),
        json!("Monto"),
        json!("Descripcion"),
        json!("Fecha"),
    ]];

    let expenses: [(&str, f64, &str); 4] = [
        ("Renta", 8500.0, "Departamento"),
        ("Comida", 3200.0, "Supermercado"),
        ("Transporte", 950.0, "Gasolina"),
        ("Servicios", 1240.5, "Luz e internet"),
    ];

    for i in 0..15u32 {
        let year = 2023 + (i + 9) / 12;
        let month = (i + 9) % 12 + 1;
        let date = format!("{}-{:02}-01", year, month);
        let stamp = format!("{}-{:02}-01 09:00:00", year, month);

        rows.push(vec![
            json!(stamp),
            json!("Ingreso"),
            json!("Salario"),
            json!(format!("{:.2}", 16000.0 + f64::from(i % 4) * 250.0)),
            json!("Nomina"),
            json!(date),
        ]);

        for (n, (category, base, description)) in expenses.iter().enumerate() {
            let day = 5 + n as u32 * 6;
            let amount = base + f64::from((i * 37 + n as u32 * 11) % 9) * 85.0;
            // Every third month the grocery row has no date column.
            let date_cell = if n == 1 && i % 3 == 0 {
                json!("")
            } else {
                json!(format!("{}-{:02}-{:02}", year, month, day))
            };
            rows.push(vec![
                json!(format!("{}-{:02}-{:02} 20:15:00", year, month, day)),
                json!("Gasto"),
                json!(category),
                json!(amount),
                json!(description),
                date_cell,
            ]);
        }

        if i % 5 == 2 {
            rows.push(vec![
                json!(format!("{}-{:02}-28 18:30:00", year, month)),
                json!("Ingreso"),
                json!("Freelance"),
                json!("2500.00"),
                json!("Proyecto"),
                json!(format!("{}-{:02}-28", year, month)),
            ]);
        }
    }

    rows
}
