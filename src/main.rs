use chrono::{DateTime, Utc};
use platform_lifecycle::analyzer::AnalysisResult;
use platform_lifecycle::config::{load_config, AppConfig};
use platform_lifecycle::loader::load_csv;
use platform_lifecycle::model::{ConfigError, PipelineError};
use platform_lifecycle::run_pipeline;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Serialize)]
struct Report<'a> {
    generated_at: DateTime<Utc>,
    source: &'a str,
    #[serde(flatten)]
    analysis: &'a AnalysisResult,
}

fn main() -> ExitCode {
    // Initialize logging; stdout carries the JSON report
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".into());
    match run(&config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: &str) -> Result<(), PipelineError> {
    let config = read_config(config_path)?;

    info!("Loading dataset from {}...", config.data_path);
    let raw = load_csv(&config.data_path)?;
    let result = run_pipeline(&raw, &config)?;

    if result.aggregation.platform_total.is_empty() {
        warn!("No data left for the selected filters");
    }
    log_result(&result, config.analysis.top_k);

    let report = Report {
        generated_at: Utc::now(),
        source: &config.data_path,
        analysis: &result,
    };
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

/// Loads the config file, falling back to defaults when it does not exist.
fn read_config(path: &str) -> Result<AppConfig, ConfigError> {
    if !Path::new(path).exists() {
        warn!("Config {} not found, using defaults", path);
        let config = AppConfig::default();
        config.validate()?;
        return Ok(config);
    }
    load_config(path)
}

fn log_result(result: &AnalysisResult, top_k: usize) {
    let ind = &result.indicators;
    info!(
        "Games: {} | Platforms: {} | Total sales: {:.2} M",
        ind.total_games, ind.total_platforms, ind.total_sales
    );

    for lc in result.top_lifecycles(top_k) {
        info!(
            "{}: {}-{} (peak {}), {:.2} M total",
            lc.platform, lc.first_year, lc.last_year, lc.peak_year, lc.total_sales
        );
    }

    for c in &result.decline {
        info!(
            "Declining: {} | past share {:.1}% | recent {:.2} M | peak {:.2} M | {:?}",
            c.platform,
            c.past_avg_share * 100.0,
            c.recent_sales,
            c.peak_sales,
            c.reason
        );
    }

    let fmt = |v: Option<f64>| v.map_or_else(|| "undefined".to_string(), |v| format!("{:.2}", v));
    let s = &result.summary;
    info!(
        "Lifecycle summary: active mean {} / median {}, to peak mean {}, decline mean {}",
        fmt(s.years_active.mean),
        fmt(s.years_active.median),
        fmt(s.years_to_peak.mean),
        fmt(s.years_decline.mean)
    );

    if let Some((platform, sales)) = &ind.dominant_platform {
        info!("Dominant platform was {} with {:.2} M units sold", platform, sales);
    }
}
