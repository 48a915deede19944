use crate::analyzer::aggregate::SalesPivot;
use crate::config::DeclineConfig;
use crate::model::{DeclineCandidate, DeclineReason, PlatformLifecycle};
use crate::utils::{mean, quantile};
use tracing::{debug, info};

/// Year bounds of the two windows, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windows {
    pub past: Option<(i32, i32)>,
    pub recent: (i32, i32),
}

impl Windows {
    /// Windows relative to the last pivot year. `past` is `None` when the pivot
    /// has no year before the recent window.
    pub fn resolve(pivot: &SalesPivot, cfg: &DeclineConfig) -> Option<Self> {
        let max_year = pivot.max_year()?;
        let first_year = *pivot.years().first()?;
        let recent_len = i32::try_from(cfg.recent_window).unwrap_or(i32::MAX);
        let past_len = i32::try_from(cfg.popular_past_window).unwrap_or(i32::MAX);
        let recent_start = max_year.saturating_sub(recent_len).saturating_add(1);
        let past_end = recent_start.saturating_sub(1);
        let past_start = recent_start.saturating_sub(past_len).max(first_year);

        let past = (past_start <= past_end).then_some((past_start, past_end));
        Some(Self {
            past,
            recent: (recent_start, max_year),
        })
    }
}

/// Flags formerly-popular platforms whose recent sales have dried up.
///
/// A platform is formerly popular when its mean yearly market share over the past
/// window reaches the `1 - popular_top_pct` quantile of all platforms' shares. It is
/// declining when its recent-window sales are under `decline_sales_abs_thresh`, or
/// under `decline_peak_ratio` of its peak-year sales. Sorted by past share, descending.
pub fn classify_decline(
    pivot: &SalesPivot,
    lifecycles: &[PlatformLifecycle],
    cfg: &DeclineConfig,
) -> Vec<DeclineCandidate> {
    let Some(windows) = Windows::resolve(pivot, cfg) else {
        return Vec::new();
    };
    let Some((past_start, past_end)) = windows.past else {
        debug!("Past window is empty, no decline candidates");
        return Vec::new();
    };

    let past_years: Vec<(i32, f64)> = (past_start..=past_end)
        .map(|y| (y, pivot.year_total(y)))
        .filter(|&(_, total)| total > 0.0)
        .collect();
    if past_years.is_empty() {
        debug!("No sales in past window {}-{}", past_start, past_end);
        return Vec::new();
    }

    let shares: Vec<(&PlatformLifecycle, f64)> = lifecycles
        .iter()
        .filter_map(|lc| {
            let yearly: Vec<f64> = past_years
                .iter()
                .map(|&(year, total)| pivot.get(year, &lc.platform).unwrap_or(0.0) / total)
                .collect();
            mean(&yearly).map(|share| (lc, share))
        })
        .collect();

    let share_values: Vec<f64> = shares.iter().map(|(_, s)| *s).collect();
    let Some(popular_cutoff) = quantile(&share_values, 1.0 - cfg.popular_top_pct) else {
        return Vec::new();
    };

    let (recent_start, recent_end) = windows.recent;
    let mut candidates: Vec<DeclineCandidate> = shares
        .into_iter()
        .filter(|&(_, share)| share >= popular_cutoff)
        .filter_map(|(lc, past_avg_share)| {
            let recent_sales: f64 = pivot
                .column(&lc.platform)
                .iter()
                .filter(|(year, _)| *year >= recent_start)
                .map(|(_, sales)| sales)
                .sum();
            let reason = decline_reason(recent_sales, lc.peak_sales, cfg)?;
            Some(DeclineCandidate {
                platform: lc.platform.clone(),
                past_avg_share,
                recent_sales,
                peak_sales: lc.peak_sales,
                reason,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.past_avg_share.total_cmp(&a.past_avg_share));
    info!(
        "Decline check over {}-{} (recent {}-{}): {} candidates",
        past_start,
        past_end,
        recent_start,
        recent_end,
        candidates.len()
    );
    candidates
}

fn decline_reason(
    recent_sales: f64,
    peak_sales: f64,
    cfg: &DeclineConfig,
) -> Option<DeclineReason> {
    if recent_sales < cfg.decline_sales_abs_thresh {
        return Some(DeclineReason::RecentSalesNegligible);
    }
    if peak_sales > 0.0 && recent_sales / peak_sales < cfg.decline_peak_ratio {
        return Some(DeclineReason::FarBelowPeak);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::aggregate::aggregate;
    use crate::analyzer::lifecycle::extract_lifecycles;
    use crate::model::{CleanTable, SalesRecord};

    fn pivot_of(rows: &[(&str, i32, f64)]) -> SalesPivot {
        let table = CleanTable {
            sales_columns: vec!["na_sales".into()],
            records: rows
                .iter()
                .map(|&(platform, year, sales)| SalesRecord {
                    name: "game".into(),
                    platform: platform.into(),
                    year_of_release: year,
                    regional_sales: vec![sales],
                    total_sales: sales,
                })
                .collect(),
        };
        aggregate(&table).pivot
    }

    /// PS2 dominates 2000-2009 and vanishes; DS dominates too but keeps selling;
    /// three small platforms fill out the market.
    fn market() -> SalesPivot {
        let mut rows = Vec::new();
        for year in 2000..=2009 {
            rows.push(("PS2", year, 50.0));
            rows.push(("DS", year, 40.0));
            rows.push(("GC", year, 5.0));
            rows.push(("XB", year, 4.0));
            rows.push(("GBA", year, 3.0));
        }
        for year in 2010..=2012 {
            rows.push(("DS", year, 30.0));
            rows.push(("GC", year, 0.0));
        }
        pivot_of(&rows)
    }

    #[test]
    fn test_windows_resolution() {
        let pivot = market();
        let w = Windows::resolve(&pivot, &DeclineConfig::default()).unwrap();
        assert_eq!(w.recent, (2010, 2012));
        assert_eq!(w.past, Some((2000, 2009)));

        let cfg = DeclineConfig { popular_past_window: 4, ..Default::default() };
        let w = Windows::resolve(&pivot, &cfg).unwrap();
        assert_eq!(w.past, Some((2006, 2009)));
    }

    #[test]
    fn test_flags_formerly_popular_quiet_platform() {
        let pivot = market();
        let lifecycles = extract_lifecycles(&pivot);
        let candidates = classify_decline(&pivot, &lifecycles, &DeclineConfig::default());

        assert_eq!(candidates.len(), 1);
        let ps2 = &candidates[0];
        assert_eq!(ps2.platform, "PS2");
        assert_eq!(ps2.recent_sales, 0.0);
        assert_eq!(ps2.peak_sales, 50.0);
        assert_eq!(ps2.reason, DeclineReason::RecentSalesNegligible);
        assert!((ps2.past_avg_share - 50.0 / 102.0).abs() < 1e-12);
    }

    #[test]
    fn test_small_quiet_platform_is_not_formerly_popular() {
        let pivot = market();
        let lifecycles = extract_lifecycles(&pivot);
        let candidates = classify_decline(&pivot, &lifecycles, &DeclineConfig::default());
        assert!(candidates.iter().all(|c| c.platform != "GC" && c.platform != "XB"));
    }

    #[test]
    fn test_ratio_to_peak_rule() {
        let mut rows = vec![("A", 2000, 100.0), ("B", 2000, 1.0), ("C", 2000, 1.0)];
        rows.extend([("A", 2001, 5.0), ("B", 2001, 1.0), ("C", 2001, 1.0)]);
        let pivot = pivot_of(&rows);
        let lifecycles = extract_lifecycles(&pivot);
        let cfg = DeclineConfig { recent_window: 1, ..Default::default() };
        let candidates = classify_decline(&pivot, &lifecycles, &cfg);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].platform, "A");
        assert_eq!(candidates[0].recent_sales, 5.0);
        assert_eq!(candidates[0].reason, DeclineReason::FarBelowPeak);
    }

    #[test]
    fn test_years_without_market_sales_are_left_out_of_share() {
        let mut rows = Vec::new();
        for year in [2000, 2001, 2003] {
            rows.push(("A", year, 6.0));
            rows.extend([("B", year, 1.0), ("C", year, 1.0), ("D", year, 1.0), ("E", year, 1.0)]);
        }
        rows.push(("B", 2006, 1.0));
        let pivot = pivot_of(&rows);
        assert_eq!(pivot.year_total(2002), 0.0);

        let w = Windows::resolve(&pivot, &DeclineConfig::default()).unwrap();
        assert_eq!(w.past, Some((2000, 2003)));

        let lifecycles = extract_lifecycles(&pivot);
        let candidates = classify_decline(&pivot, &lifecycles, &DeclineConfig::default());
        assert_eq!(candidates.len(), 1);
        let a = &candidates[0];
        assert_eq!(a.platform, "A");
        assert!(a.past_avg_share.is_finite());
        // mean over 2000, 2001 and 2003 only; counting 2002 would give 0.45
        assert!((a.past_avg_share - 0.6).abs() < 1e-12, "share {}", a.past_avg_share);
        assert_eq!(a.reason, DeclineReason::RecentSalesNegligible);
    }

    #[test]
    fn test_single_year_has_no_candidates() {
        let pivot = pivot_of(&[("PS2", 2004, 5.0), ("Wii", 2004, 1.0)]);
        let lifecycles = extract_lifecycles(&pivot);
        let w = Windows::resolve(&pivot, &DeclineConfig::default()).unwrap();
        assert_eq!(w.past, None);
        assert!(classify_decline(&pivot, &lifecycles, &DeclineConfig::default()).is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        let pivot = SalesPivot::default();
        assert!(classify_decline(&pivot, &[], &DeclineConfig::default()).is_empty());
    }

    #[test]
    fn test_raising_abs_threshold_never_shrinks_candidates() {
        let pivot = market();
        let lifecycles = extract_lifecycles(&pivot);
        let mut previous = 0;
        for thresh in [0.0, 0.01, 1.0, 50.0, 100.0, 1000.0] {
            let cfg = DeclineConfig {
                popular_top_pct: 0.5,
                decline_sales_abs_thresh: thresh,
                ..Default::default()
            };
            let n = classify_decline(&pivot, &lifecycles, &cfg).len();
            assert!(n >= previous, "threshold {} shrank set to {}", thresh, n);
            previous = n;
        }
        assert_eq!(previous, 3);
    }

    #[test]
    fn test_zero_peak_is_not_declining_by_ratio() {
        assert_eq!(decline_reason(0.5, 0.0, &DeclineConfig::default()), None);
        assert_eq!(
            decline_reason(0.0, 0.0, &DeclineConfig::default()),
            Some(DeclineReason::RecentSalesNegligible)
        );
    }
}
