use chrono::NaiveDate;
use std::path::PathBuf;

use crate::error::SummaryError;
use crate::selector::Mode;

/// Used when neither `--evaluations_dir` nor `EVALUATIONS_DIR` is set.
pub const DEFAULT_EVALUATIONS_DIR: &str = "evaluations";
pub const EVALUATIONS_DIR_ENV: &str = "EVALUATIONS_DIR";

/// Effective settings for one summary run.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    pub mode: Mode,
    pub evaluations_dir: PathBuf,
    /// Summaries are only logged when unset.
    pub out_dir: Option<PathBuf>,
    /// Also log each table as JSON.
    pub json: bool,
}

impl SummaryConfig {
    pub fn new(
        eval_date: Option<NaiveDate>,
        weeks_ahead: Option<u32>,
        evaluations_dir: Option<PathBuf>,
        out_dir: Option<PathBuf>,
        json: bool,
    ) -> Result<Self, SummaryError> {
        let mode = Mode::from_options(eval_date, weeks_ahead)?;
        let evaluations_dir = evaluations_dir
            .or_else(|| std::env::var_os(EVALUATIONS_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EVALUATIONS_DIR));
        Ok(Self {
            mode,
            evaluations_dir,
            out_dir,
            json,
        })
    }
}
