//! CLI entry point for the forecast evaluation summarizer.
//!
//! Given an evaluation date or a weeks-ahead horizon (not both), summarizes
//! every historical projection evaluation that fits the criteria.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use forecast_eval_summary::config::SummaryConfig;
use forecast_eval_summary::filename::DATE_FORMAT;
use forecast_eval_summary::pipeline;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "forecast_eval_summary")]
#[command(
    about = "Summarize historical forecast evaluations by evaluation date or weeks ahead",
    long_about = None
)]
struct Cli {
    /// Evaluate all projections based on this evaluation date (YYYY-MM-DD)
    #[arg(long = "eval_date", visible_alias = "eval-date", value_parser = parse_cli_date)]
    eval_date: Option<NaiveDate>,

    /// Evaluate all projections based on number of weeks ahead
    #[arg(long = "weeks_ahead", visible_alias = "weeks-ahead")]
    weeks_ahead: Option<u32>,

    /// Directory containing the raw evaluations
    #[arg(long = "evaluations_dir", visible_alias = "evaluations-dir")]
    evaluations_dir: Option<PathBuf>,

    /// Directory to save summary CSVs to; summaries are only logged if omitted
    #[arg(long = "out_dir", visible_alias = "out-dir")]
    out_dir: Option<PathBuf>,

    /// Also log each summary table as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| format!("invalid date {s:?}: {e}"))
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/forecast_eval_summary.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("forecast_eval_summary.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::try_from_env("RUST_LOG_JSON").unwrap_or_else(|_| EnvFilter::new("debug")),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = SummaryConfig::new(
        cli.eval_date,
        cli.weeks_ahead,
        cli.evaluations_dir,
        cli.out_dir,
        cli.json,
    )?;

    let output = pipeline::run(&config)?;

    info!(
        written = output.written.len(),
        models_us = output.national.table.rows().len(),
        models_states = output.states.table.rows().len(),
        "Done"
    );
    Ok(())
}
