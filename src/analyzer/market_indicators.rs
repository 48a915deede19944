use crate::analyzer::aggregate::Aggregation;
use crate::model::CleanTable;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Headline figures for the whole (filtered) dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketIndicators {
    pub total_sales: f64,
    pub total_games: usize,
    pub total_platforms: usize,
    /// Number of releases per year, ascending.
    pub games_per_year: Vec<(i32, usize)>,
    /// Column sum per configured sales column.
    pub sales_by_region: Vec<(String, f64)>,
    pub dominant_platform: Option<(String, f64)>,
}

impl MarketIndicators {
    pub fn compute(table: &CleanTable, aggregation: &Aggregation) -> Self {
        let total_games = table
            .records
            .iter()
            .map(|r| r.name.as_str())
            .collect::<HashSet<_>>()
            .len();
        let total_platforms = table
            .records
            .iter()
            .map(|r| r.platform.as_str())
            .collect::<HashSet<_>>()
            .len();

        Self {
            total_sales: table.records.iter().map(|r| r.total_sales).sum(),
            total_games,
            total_platforms,
            games_per_year: Self::games_per_year(table),
            sales_by_region: Self::sales_by_region(table),
            dominant_platform: aggregation.platform_total.first().cloned(),
        }
    }

    pub fn games_per_year(table: &CleanTable) -> Vec<(i32, usize)> {
        let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
        for rec in &table.records {
            *counts.entry(rec.year_of_release).or_default() += 1;
        }
        counts.into_iter().collect()
    }

    pub fn sales_by_region(table: &CleanTable) -> Vec<(String, f64)> {
        table
            .sales_columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let sum: f64 = table
                    .records
                    .iter()
                    .filter_map(|r| r.regional_sales.get(i))
                    .sum();
                (column.clone(), sum)
            })
            .collect()
    }
}
