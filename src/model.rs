// Core structs: raw/clean tables, pivot cells, lifecycle records, error types
use serde::Serialize;
use thiserror::Error;

/// Tabular dataset as handed over by the loader: verbatim headers, string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }
}

/// One cleaned input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub name: String,
    pub platform: String,
    pub year_of_release: i32,
    /// Regional figures, aligned with `CleanTable::sales_columns`.
    pub regional_sales: Vec<f64>,
    pub total_sales: f64,
}

/// Output of the normalizer. Every record has a non-negative `total_sales`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanTable {
    pub sales_columns: Vec<String>,
    pub records: Vec<SalesRecord>,
}

impl CleanTable {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Aggregated sales for one (platform, year) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformYearCell {
    pub platform: String,
    pub year: i32,
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformLifecycle {
    pub platform: String,
    pub first_year: i32,
    pub peak_year: i32,
    pub last_year: i32,
    pub years_active: i32,
    pub years_to_peak: i32,
    pub years_decline: i32,
    pub peak_sales: f64,
    pub total_sales: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeclineReason {
    /// Recent-window sales fell under the absolute threshold.
    RecentSalesNegligible,
    /// Recent-window sales are a small fraction of the peak year.
    FarBelowPeak,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeclineCandidate {
    pub platform: String,
    pub past_avg_share: f64,
    pub recent_sales: f64,
    pub peak_sales: f64,
    pub reason: DeclineReason,
}

/// Mean and median of one lifecycle metric. `None` when there is nothing to reduce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LifecycleSummary {
    pub platforms: usize,
    pub years_active: MetricSummary,
    pub years_to_peak: MetricSummary,
    pub years_decline: MetricSummary,
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("missing required column: {0}")]
    MissingColumn(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for {field}: {reason}")]
    InvalidThreshold { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error("failed to write report: {0}")]
    Report(#[from] serde_json::Error),
}
