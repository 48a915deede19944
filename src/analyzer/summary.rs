use crate::model::{LifecycleSummary, MetricSummary, PlatformLifecycle};
use crate::utils::{mean, median, round_to};

const DISPLAY_PRECISION: i32 = 2;

/// Mean and median of the duration fields across all lifecycles.
/// An empty list yields `None` everywhere.
pub fn summarize(lifecycles: &[PlatformLifecycle]) -> LifecycleSummary {
    let metric = |field: fn(&PlatformLifecycle) -> i32| {
        let values: Vec<f64> = lifecycles.iter().map(|lc| field(lc) as f64).collect();
        MetricSummary {
            mean: mean(&values).map(|v| round_to(v, DISPLAY_PRECISION)),
            median: median(&values).map(|v| round_to(v, DISPLAY_PRECISION)),
        }
    };

    LifecycleSummary {
        platforms: lifecycles.len(),
        years_active: metric(|lc| lc.years_active),
        years_to_peak: metric(|lc| lc.years_to_peak),
        years_decline: metric(|lc| lc.years_decline),
    }
}
