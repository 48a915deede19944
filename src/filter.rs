use crate::config::invalid;
use crate::model::{CleanTable, ConfigError};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::info;

/// Year range and platform selection applied before analysis.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatasetFilter {
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub platforms: Option<Vec<String>>,
}

impl DatasetFilter {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(from), Some(to)) = (self.year_from, self.year_to) {
            if from > to {
                return Err(invalid(
                    "filter.year_from",
                    format!("{} is after year_to {}", from, to),
                ));
            }
        }
        Ok(())
    }

    /// Returns a new table holding only records inside the year range and platform selection.
    pub fn apply(&self, table: &CleanTable) -> CleanTable {
        let selected: Option<HashSet<&str>> = self
            .platforms
            .as_ref()
            .map(|ps| ps.iter().map(String::as_str).collect());

        let records: Vec<_> = table
            .records
            .iter()
            .filter(|r| self.year_from.is_none_or(|from| r.year_of_release >= from))
            .filter(|r| self.year_to.is_none_or(|to| r.year_of_release <= to))
            .filter(|r| selected.as_ref().is_none_or(|s| s.contains(r.platform.as_str())))
            .cloned()
            .collect();

        info!("Filter kept {} of {} records", records.len(), table.len());

        CleanTable {
            sales_columns: table.sales_columns.clone(),
            records,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.year_from.is_none() && self.year_to.is_none() && self.platforms.is_none()
    }
}
