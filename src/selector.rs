//! Resolves the evaluation files to summarize from the evaluations directory.
//!
//! The directory holds one subdirectory per evaluation date:
//!
//! ```text
//! evaluations/
//!   2020-12-01/
//!     2020-11-01_2020-12-01_us_errs.csv
//!     2020-11-01_2020-12-01_states_abs_errs.csv
//!     2020-11-01_2020-12-01_states_sq_errs.csv
//!     projections_2020-11-01_2020-12-01.csv
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use glob::{Pattern, glob};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::SummaryError;
use crate::filename::{DATE_FORMAT, EvalDates, parse_eval_dates};
use crate::horizon::filter_by_weeks_ahead;

/// Which slice of the evaluation history to summarize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    EvalDate(NaiveDate),
    WeeksAhead(u32),
}

impl Mode {
    /// Builds the mode from the two mutually exclusive options.
    pub fn from_options(
        eval_date: Option<NaiveDate>,
        weeks_ahead: Option<u32>,
    ) -> Result<Self, SummaryError> {
        match (eval_date, weeks_ahead) {
            (Some(date), None) => Ok(Mode::EvalDate(date)),
            (None, Some(weeks)) => Ok(Mode::WeeksAhead(weeks)),
            (None, None) => Err(SummaryError::Configuration(
                "must provide either an --eval_date or --weeks_ahead".into(),
            )),
            (Some(_), Some(_)) => Err(SummaryError::Configuration(
                "must provide only one of --eval_date or --weeks_ahead".into(),
            )),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::EvalDate(date) => write!(f, "eval_date={}", date.format(DATE_FORMAT)),
            Mode::WeeksAhead(weeks) => write!(f, "weeks_ahead={weeks}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    NationalError,
    StateAbsError,
    StateSqError,
    StateProjection,
}

impl FileKind {
    pub fn family(&self) -> &'static str {
        match self {
            FileKind::NationalError => "US evaluation files",
            FileKind::StateAbsError => "state-by-state absolute error files",
            FileKind::StateSqError => "state-by-state squared error files",
            FileKind::StateProjection => "state-by-state projection files",
        }
    }

    /// File name pattern inside one evaluation-date directory.
    fn file_pattern(&self, eval_date: Option<&str>) -> String {
        let eval = eval_date.unwrap_or("");
        match (self, eval_date) {
            (FileKind::StateProjection, Some(date)) => format!("projections_*_{date}.csv"),
            (FileKind::StateProjection, None) => "projections_*.csv".to_string(),
            (FileKind::NationalError, _) => format!("*{}_us_errs.csv", underscored(eval)),
            (FileKind::StateAbsError, _) => format!("*{}_states_abs_errs.csv", underscored(eval)),
            (FileKind::StateSqError, _) => format!("*{}_states_sq_errs.csv", underscored(eval)),
        }
    }
}

fn underscored(s: &str) -> String {
    if s.is_empty() {
        String::new()
    } else {
        format!("_{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationFile {
    pub path: PathBuf,
    pub dates: EvalDates,
    pub kind: FileKind,
}

/// The four input families, each sorted by path.
#[derive(Debug, Clone)]
pub struct SelectedFiles {
    pub national: Vec<EvaluationFile>,
    pub state_abs: Vec<EvaluationFile>,
    pub state_sq: Vec<EvaluationFile>,
    pub projections: Vec<EvaluationFile>,
}

#[tracing::instrument(skip_all, fields(root = %root.display(), mode = %mode))]
pub fn select_files(root: &Path, mode: Mode) -> Result<SelectedFiles> {
    Ok(SelectedFiles {
        national: select_kind(root, mode, FileKind::NationalError)?,
        state_abs: select_kind(root, mode, FileKind::StateAbsError)?,
        state_sq: select_kind(root, mode, FileKind::StateSqError)?,
        projections: select_kind(root, mode, FileKind::StateProjection)?,
    })
}

pub fn select_kind(root: &Path, mode: Mode, kind: FileKind) -> Result<Vec<EvaluationFile>> {
    let root_escaped = Pattern::escape(&root.to_string_lossy());
    let pattern = match mode {
        Mode::EvalDate(date) => {
            let date = date.format(DATE_FORMAT).to_string();
            format!("{root_escaped}/{date}/{}", kind.file_pattern(Some(&date)))
        }
        Mode::WeeksAhead(_) => format!("{root_escaped}/*/{}", kind.file_pattern(None)),
    };
    debug!(pattern = %pattern, family = kind.family(), "Globbing");

    let mut paths = glob(&pattern)
        .with_context(|| format!("invalid glob pattern {pattern}"))?
        .collect::<std::result::Result<Vec<PathBuf>, _>>()
        .with_context(|| format!("read matches for {pattern}"))?;
    paths.sort();

    if let Mode::WeeksAhead(weeks) = mode {
        paths = filter_by_weeks_ahead(paths, weeks)?;
    }

    if paths.is_empty() {
        return Err(SummaryError::NoMatchingFiles {
            family: kind.family().to_string(),
        }
        .into());
    }

    let files = paths
        .into_iter()
        .map(|path| {
            let dates = parse_eval_dates(&path)?;
            Ok(EvaluationFile { path, dates, kind })
        })
        .collect::<Result<Vec<_>, SummaryError>>()?;

    info!(family = kind.family(), files = files.len(), "Selected files");
    Ok(files)
}
