//! Fatal error conditions raised by the summary pipeline.
//!
//! Any of these aborts the run. I/O and CSV failures travel as plain
//! [`anyhow::Error`] with context instead.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummaryError {
    /// `--eval_date` and `--weeks_ahead` were both set, or neither was.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no matching files for {family}")]
    NoMatchingFiles { family: String },

    #[error("malformed evaluation filename: {}", path.display())]
    MalformedFilename { path: PathBuf },

    #[error(
        "evaluation date {evaluation_date} is not after projection date {projection_date} in {}",
        path.display()
    )]
    DateOrdering {
        path: PathBuf,
        projection_date: NaiveDate,
        evaluation_date: NaiveDate,
    },
}
