use crate::model::{CleanTable, PlatformYearCell};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Dense year x platform matrix of summed total sales.
///
/// Rows cover every year from the first to the last observed year, ascending.
/// Columns are the platforms in lexicographic order. Absent combinations hold 0.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesPivot {
    years: Vec<i32>,
    platforms: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl SalesPivot {
    pub fn build(table: &CleanTable) -> Self {
        let Some(min_year) = table.records.iter().map(|r| r.year_of_release).min() else {
            return Self::default();
        };
        let max_year = table
            .records
            .iter()
            .map(|r| r.year_of_release)
            .max()
            .unwrap_or(min_year);

        let mut platforms: Vec<String> =
            table.records.iter().map(|r| r.platform.clone()).collect();
        platforms.sort();
        platforms.dedup();
        let column: HashMap<&str, usize> = platforms
            .iter()
            .enumerate()
            .map(|(i, p)| (p.as_str(), i))
            .collect();

        let years: Vec<i32> = (min_year..=max_year).collect();
        let mut values = vec![vec![0.0; platforms.len()]; years.len()];
        for rec in &table.records {
            let row = (i64::from(rec.year_of_release) - i64::from(min_year)) as usize;
            values[row][column[rec.platform.as_str()]] += rec.total_sales;
        }

        debug!("Pivot built: {} years x {} platforms", years.len(), platforms.len());
        Self { years, platforms, values }
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn platforms(&self) -> &[String] {
        &self.platforms
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn max_year(&self) -> Option<i32> {
        self.years.last().copied()
    }

    fn platform_index(&self, platform: &str) -> Option<usize> {
        self.platforms
            .binary_search_by(|p| p.as_str().cmp(platform))
            .ok()
    }

    fn year_index(&self, year: i32) -> Option<usize> {
        let first = *self.years.first()?;
        let idx = usize::try_from(i64::from(year) - i64::from(first)).ok()?;
        (idx < self.years.len()).then_some(idx)
    }

    /// Sales for one cell; `None` only when the platform or year is outside the pivot.
    pub fn get(&self, year: i32, platform: &str) -> Option<f64> {
        Some(self.values[self.year_index(year)?][self.platform_index(platform)?])
    }

    /// (year, sales) pairs of one platform, ascending by year.
    pub fn column(&self, platform: &str) -> Vec<(i32, f64)> {
        let Some(col) = self.platform_index(platform) else {
            return Vec::new();
        };
        self.years
            .iter()
            .zip(&self.values)
            .map(|(&year, row)| (year, row[col]))
            .collect()
    }

    pub fn column_sum(&self, platform: &str) -> f64 {
        self.column(platform).iter().map(|(_, v)| v).sum()
    }

    /// Sales of all platforms in one year.
    pub fn year_total(&self, year: i32) -> f64 {
        self.year_index(year)
            .map(|i| self.values[i].iter().sum())
            .unwrap_or(0.0)
    }

    /// Every cell of the pivot, year-major.
    pub fn cells(&self) -> Vec<PlatformYearCell> {
        self.years
            .iter()
            .zip(&self.values)
            .flat_map(|(&year, row)| {
                self.platforms
                    .iter()
                    .zip(row)
                    .map(move |(platform, &total_sales)| PlatformYearCell {
                        platform: platform.clone(),
                        year,
                        total_sales,
                    })
            })
            .collect()
    }
}

/// Output of the aggregation stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregation {
    /// Total sales per platform, descending; ties keep first-seen order.
    pub platform_total: Vec<(String, f64)>,
    pub pivot: SalesPivot,
}

impl Aggregation {
    /// First `k` platforms of the ranking, or all of them when fewer exist.
    pub fn top_platforms(&self, k: usize) -> Vec<String> {
        self.platform_total
            .iter()
            .take(k)
            .map(|(p, _)| p.clone())
            .collect()
    }
}

pub fn aggregate(table: &CleanTable) -> Aggregation {
    let pivot = SalesPivot::build(table);

    let mut first_seen: Vec<&str> = Vec::new();
    for rec in &table.records {
        if !first_seen.contains(&rec.platform.as_str()) {
            first_seen.push(rec.platform.as_str());
        }
    }

    let mut platform_total: Vec<(String, f64)> = first_seen
        .into_iter()
        .map(|p| (p.to_string(), pivot.column_sum(p)))
        .collect();
    // stable: ties keep first-seen order
    platform_total.sort_by(|a, b| b.1.total_cmp(&a.1));

    Aggregation { platform_total, pivot }
}
