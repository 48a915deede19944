pub mod analyzer;
pub mod config;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalizer;
pub mod utils;

use analyzer::{AnalysisResult, Analyzer, AnalyzerImpl};
use config::AppConfig;
use model::{PipelineError, RawTable};
use normalizer::normalize;

/// Normalizes, filters and analyzes one raw table.
///
/// Configuration and schema problems abort before any aggregation happens.
pub fn run_pipeline(raw: &RawTable, config: &AppConfig) -> Result<AnalysisResult, PipelineError> {
    config.validate()?;
    let clean = normalize(raw, &config.columns)?;
    let table = if config.filter.is_noop() {
        clean
    } else {
        config.filter.apply(&clean)
    };
    Ok(AnalyzerImpl::new().analyze(&table, &config.analysis))
}
