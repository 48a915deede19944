// Analyzer module: aggregates submodules for the stages of the lifecycle analysis.

pub mod aggregate;
pub mod lifecycle;
pub mod decline;
pub mod summary;
pub mod market_indicators;
pub mod platform_analysis;

// Re-export the main Analyzer implementation for ease of use.
pub use platform_analysis::{AnalysisResult, Analyzer, AnalyzerImpl};
