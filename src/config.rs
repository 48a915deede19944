use crate::filter::DatasetFilter;
use crate::model::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Longest span of release years a dataset may cover.
const MAX_YEAR_SPAN: i32 = 1000;

/// Names of the input columns. Lookups are case-insensitive.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColumnConfig {
    pub name: String,
    pub platform: String,
    pub year: String,
    pub sales: Vec<String>,
    /// Release years outside `min_year..=max_year` are treated as unparseable.
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            name: "name".into(),
            platform: "platform".into(),
            year: "year_of_release".into(),
            sales: vec![
                "na_sales".into(),
                "eu_sales".into(),
                "jp_sales".into(),
                "other_sales".into(),
            ],
            min_year: 1950,
            max_year: 2100,
        }
    }
}

impl ColumnConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_year > self.max_year {
            return Err(invalid(
                "columns.min_year",
                format!("{} is after max_year {}", self.min_year, self.max_year),
            ));
        }
        if i64::from(self.max_year) - i64::from(self.min_year) > i64::from(MAX_YEAR_SPAN) {
            return Err(invalid(
                "columns.max_year",
                format!(
                    "{}..={} spans more than {} years",
                    self.min_year, self.max_year, MAX_YEAR_SPAN
                ),
            ));
        }
        Ok(())
    }

    pub fn year_in_range(&self, year: i32) -> bool {
        (self.min_year..=self.max_year).contains(&year)
    }
}

/// Windows and thresholds of the decline rule.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeclineConfig {
    pub recent_window: u32,
    pub popular_past_window: u32,
    pub popular_top_pct: f64,
    pub decline_sales_abs_thresh: f64,
    pub decline_peak_ratio: f64,
}

impl Default for DeclineConfig {
    fn default() -> Self {
        Self {
            recent_window: 3,
            popular_past_window: 10,
            popular_top_pct: 0.2,
            decline_sales_abs_thresh: 0.01,
            decline_peak_ratio: 0.10,
        }
    }
}

impl DeclineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recent_window == 0 {
            return Err(invalid("recent_window", "must be at least 1"));
        }
        if self.popular_past_window == 0 {
            return Err(invalid("popular_past_window", "must be at least 1"));
        }
        if !(self.popular_top_pct > 0.0 && self.popular_top_pct < 1.0) {
            return Err(invalid(
                "popular_top_pct",
                format!("{} is outside (0, 1)", self.popular_top_pct),
            ));
        }
        if !self.decline_sales_abs_thresh.is_finite() || self.decline_sales_abs_thresh < 0.0 {
            return Err(invalid(
                "decline_sales_abs_thresh",
                format!(
                    "{} is not a finite non-negative number",
                    self.decline_sales_abs_thresh
                ),
            ));
        }
        if !(self.decline_peak_ratio > 0.0 && self.decline_peak_ratio <= 1.0) {
            return Err(invalid(
                "decline_peak_ratio",
                format!("{} is outside (0, 1]", self.decline_peak_ratio),
            ));
        }
        Ok(())
    }
}

/// Everything the analysis stage needs besides the data itself.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub decline: DeclineConfig,
    pub top_k: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            decline: DeclineConfig::default(),
            top_k: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub data_path: String,
    pub columns: ColumnConfig,
    pub filter: DatasetFilter,
    #[serde(flatten)]
    pub analysis: AnalysisConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: "V_GAMES.csv".into(),
            columns: ColumnConfig::default(),
            filter: DatasetFilter::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.columns.validate()?;
        self.analysis.decline.validate()?;
        self.filter.validate()
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidThreshold {
        field,
        reason: reason.into(),
    }
}
