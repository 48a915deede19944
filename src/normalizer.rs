use crate::config::ColumnConfig;
use crate::model::{CleanTable, NormalizeError, RawTable, SalesRecord};
use crate::utils::{parse_sales, parse_year};
use tracing::{debug, info};

/// Resolved positions of the configured columns inside a raw header row.
struct ColumnIndex {
    name: usize,
    platform: usize,
    year: usize,
    sales: Vec<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &[String], columns: &ColumnConfig) -> Result<Self, NormalizeError> {
        let folded: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |wanted: &str| {
            let wanted = wanted.trim().to_lowercase();
            folded
                .iter()
                .position(|h| *h == wanted)
                .ok_or_else(|| NormalizeError::MissingColumn(wanted))
        };

        let sales = columns
            .sales
            .iter()
            .map(|c| find(c.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: find(&columns.name)?,
            platform: find(&columns.platform)?,
            year: find(&columns.year)?,
            sales,
        })
    }
}

/// Counts of rows dropped for data-quality reasons.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DropStats {
    pub missing_name: usize,
    pub missing_platform: usize,
    pub bad_year: usize,
}

impl DropStats {
    pub fn total(&self) -> usize {
        self.missing_name + self.missing_platform + self.bad_year
    }
}

/// Builds a clean table from raw rows. The input is left untouched.
///
/// Missing required columns abort the whole step. Rows with an empty name or platform,
/// or a year that cannot be coerced to an integer inside the configured bounds, are dropped.
pub fn normalize(raw: &RawTable, columns: &ColumnConfig) -> Result<CleanTable, NormalizeError> {
    normalize_with_stats(raw, columns).map(|(table, _)| table)
}

pub fn normalize_with_stats(
    raw: &RawTable,
    columns: &ColumnConfig,
) -> Result<(CleanTable, DropStats), NormalizeError> {
    let index = ColumnIndex::resolve(&raw.headers, columns)?;
    let mut stats = DropStats::default();
    let mut records = Vec::with_capacity(raw.rows.len());

    let cell = |row: &[String], i: usize| {
        row.get(i).map(|s| s.trim().to_string()).unwrap_or_default()
    };

    for row in &raw.rows {
        let name = cell(row, index.name);
        if name.is_empty() {
            stats.missing_name += 1;
            continue;
        }
        let platform = cell(row, index.platform);
        if platform.is_empty() {
            stats.missing_platform += 1;
            continue;
        }
        let year = parse_year(&cell(row, index.year)).filter(|&y| columns.year_in_range(y));
        let Some(year_of_release) = year else {
            stats.bad_year += 1;
            continue;
        };

        let regional_sales: Vec<f64> = index
            .sales
            .iter()
            .map(|&i| parse_sales(&cell(row, i)))
            .collect();
        let total_sales = regional_sales.iter().sum();

        records.push(SalesRecord {
            name,
            platform,
            year_of_release,
            regional_sales,
            total_sales,
        });
    }

    if stats.total() > 0 {
        debug!(
            "Dropped rows: {} without name, {} without platform, {} with bad year",
            stats.missing_name, stats.missing_platform, stats.bad_year
        );
    }
    info!("Normalized {} of {} rows", records.len(), raw.rows.len());

    let table = CleanTable {
        sales_columns: columns.sales.iter().map(|c| c.to_lowercase()).collect(),
        records,
    };
    Ok((table, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    const HEADERS: [&str; 7] = [
        "Name",
        "Platform",
        "Year_of_Release",
        "NA_sales",
        "EU_sales",
        "JP_sales",
        "Other_sales",
    ];

    #[test]
    fn test_case_folded_lookup_and_totals() {
        let table = raw(
            &HEADERS,
            &[&["Wii Sports", "Wii", "2006", "41.36", "28.96", "3.77", "8.45"]],
        );
        let clean = normalize(&table, &ColumnConfig::default()).unwrap();
        assert_eq!(clean.len(), 1);
        let rec = &clean.records[0];
        assert_eq!(rec.year_of_release, 2006);
        assert!((rec.total_sales - 82.54).abs() < 1e-9);
        assert_eq!(clean.sales_columns[2], "jp_sales");
    }

    #[test]
    fn test_drops_bad_rows_and_defaults_sales() {
        let table = raw(
            &HEADERS,
            &[
                &["", "PS2", "2004", "1", "1", "1", "1"],
                &["Game", "", "2004", "1", "1", "1", "1"],
                &["Game", "PS2", "tbd", "1", "1", "1", "1"],
                &["Game", "PS2", "2004.0", "", "0.5", "-1", "x"],
            ],
        );
        let (clean, stats) = normalize_with_stats(&table, &ColumnConfig::default()).unwrap();
        assert_eq!(stats, DropStats { missing_name: 1, missing_platform: 1, bad_year: 1 });
        assert_eq!(clean.len(), 1);
        assert_eq!(clean.records[0].regional_sales, vec![0.0, 0.5, 0.0, 0.0]);
        assert_eq!(clean.records[0].total_sales, 0.5);
    }

    #[test]
    fn test_out_of_range_years_are_dropped() {
        let table = raw(
            &HEADERS,
            &[
                &["Typo", "PS2", "200400000", "1", "0", "0", "0"],
                &["Sentinel", "PS2", "-1", "1", "0", "0", "0"],
                &["Low", "Wii", "-2147483648", "1", "0", "0", "0"],
                &["High", "Wii", "2147483647", "1", "0", "0", "0"],
                &["Kept", "PS2", "2004", "1", "0", "0", "0"],
            ],
        );
        let (clean, stats) = normalize_with_stats(&table, &ColumnConfig::default()).unwrap();
        assert_eq!(stats.bad_year, 4);
        assert_eq!(clean.len(), 1);
        assert_eq!(clean.records[0].name, "Kept");

        let narrow = ColumnConfig { min_year: 2005, max_year: 2010, ..Default::default() };
        let (clean, stats) = normalize_with_stats(&table, &narrow).unwrap();
        assert!(clean.is_empty());
        assert_eq!(stats.bad_year, 5);
    }

    #[test]
    fn test_missing_sales_column_is_fatal() {
        let table = raw(
            &["name", "platform", "year_of_release", "na_sales", "eu_sales", "other_sales"],
            &[&["Game", "PS2", "2004", "1", "1", "1"]],
        );
        match normalize(&table, &ColumnConfig::default()) {
            Err(NormalizeError::MissingColumn(col)) => assert_eq!(col, "jp_sales"),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn test_input_is_not_mutated() {
        let table = raw(&HEADERS, &[&["", "PS2", "2004", "1", "1", "1", "1"]]);
        let before = table.clone();
        let _ = normalize(&table, &ColumnConfig::default()).unwrap();
        assert_eq!(table, before);
    }

    #[test]
    fn test_unknown_columns_are_ignored() {
        let mut headers = HEADERS.to_vec();
        headers.push("Genre");
        let table = raw(&headers, &[&["Game", "GB", "1989", "1", "0", "0", "0", "Puzzle"]]);
        let clean = normalize(&table, &ColumnConfig::default()).unwrap();
        assert_eq!(clean.records[0].regional_sales.len(), 4);
    }
}
