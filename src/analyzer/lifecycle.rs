use crate::analyzer::aggregate::SalesPivot;
use crate::model::PlatformLifecycle;
use tracing::debug;

/// Derives one lifecycle per platform that has at least one year with positive sales.
/// Result is ordered by total sales, descending.
pub fn extract_lifecycles(pivot: &SalesPivot) -> Vec<PlatformLifecycle> {
    let mut lifecycles: Vec<PlatformLifecycle> = pivot
        .platforms()
        .iter()
        .filter_map(|platform| {
            let lifecycle = platform_lifecycle(platform, &pivot.column(platform));
            if lifecycle.is_none() {
                debug!("Skipping {}: no year with positive sales", platform);
            }
            lifecycle
        })
        .collect();

    // stable: equal totals stay in platform-name order
    lifecycles.sort_by(|a, b| b.total_sales.total_cmp(&a.total_sales));
    lifecycles
}

/// `series` must be ascending by year.
fn platform_lifecycle(platform: &str, series: &[(i32, f64)]) -> Option<PlatformLifecycle> {
    let first_year = series.iter().find(|(_, v)| *v > 0.0)?.0;
    let last_year = series.iter().rev().find(|(_, v)| *v > 0.0)?.0;

    // strict comparison keeps the earliest year on ties
    let mut peak = series[0];
    for &(year, sales) in &series[1..] {
        if sales > peak.1 {
            peak = (year, sales);
        }
    }
    let (peak_year, peak_sales) = peak;

    Some(PlatformLifecycle {
        platform: platform.to_string(),
        first_year,
        peak_year,
        last_year,
        years_active: last_year - first_year + 1,
        years_to_peak: peak_year - first_year,
        years_decline: last_year - peak_year,
        peak_sales,
        total_sales: series.iter().map(|(_, v)| v).sum(),
    })
}
