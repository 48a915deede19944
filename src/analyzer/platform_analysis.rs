use crate::analyzer::aggregate::{aggregate, Aggregation};
use crate::analyzer::decline::classify_decline;
use crate::analyzer::lifecycle::extract_lifecycles;
use crate::analyzer::market_indicators::MarketIndicators;
use crate::analyzer::summary::summarize;
use crate::config::AnalysisConfig;
use crate::model::{CleanTable, DeclineCandidate, LifecycleSummary, PlatformLifecycle};
use serde::Serialize;
use tracing::info;

/// Trait defining the interface for a platform lifecycle analyzer.
pub trait Analyzer {
    fn analyze(&self, table: &CleanTable, cfg: &AnalysisConfig) -> AnalysisResult;
}

/// Implementation of the platform lifecycle analyzer.
pub struct AnalyzerImpl;

impl AnalyzerImpl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnalyzerImpl {
    fn default() -> Self {
        Self::new()
    }
}

/// Structure representing the overall analysis result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Sales ranking and the dense year x platform pivot.
    pub aggregation: Aggregation,
    /// The `top_k` best-selling platforms.
    pub top_platforms: Vec<String>,
    /// Lifecycle of every platform with positive sales, best-selling first.
    pub lifecycles: Vec<PlatformLifecycle>,
    pub decline: Vec<DeclineCandidate>,
    pub summary: LifecycleSummary,
    pub indicators: MarketIndicators,
}

impl AnalysisResult {
    /// Lifecycles of the `top_k` best-selling platforms, for the timeline view.
    pub fn top_lifecycles(&self, k: usize) -> &[PlatformLifecycle] {
        &self.lifecycles[..k.min(self.lifecycles.len())]
    }
}

impl Analyzer for AnalyzerImpl {
    /// Runs aggregation, lifecycle extraction, decline classification and the summary
    /// over an already normalized table. Pure: equal inputs give equal results.
    fn analyze(&self, table: &CleanTable, cfg: &AnalysisConfig) -> AnalysisResult {
        let aggregation = aggregate(table);
        let lifecycles = extract_lifecycles(&aggregation.pivot);
        let decline = classify_decline(&aggregation.pivot, &lifecycles, &cfg.decline);
        let summary = summarize(&lifecycles);
        let indicators = MarketIndicators::compute(table, &aggregation);

        info!(
            "Analysis done: {} platforms, {} with lifecycle, {} declining",
            aggregation.platform_total.len(),
            lifecycles.len(),
            decline.len()
        );

        AnalysisResult {
            top_platforms: aggregation.top_platforms(cfg.top_k),
            aggregation,
            lifecycles,
            decline,
            summary,
            indicators,
        }
    }
}
