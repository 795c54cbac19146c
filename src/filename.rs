//! Extracts projection and evaluation dates from evaluation file names.
//!
//! Two layouts are recognized:
//!
//! | Layout | Example                                      |
//! |--------|----------------------------------------------|
//! | A      | `2020-11-01_2020-12-01_us_errs.csv`          |
//! | B      | `projections_2020-11-01_2020-12-01.csv`      |

use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

use crate::error::SummaryError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// (projection date, evaluation date) pair parsed from a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EvalDates {
    pub projection_date: NaiveDate,
    pub evaluation_date: NaiveDate,
}

impl EvalDates {
    pub fn days_ahead(&self) -> i64 {
        (self.evaluation_date - self.projection_date).num_days()
    }

    /// `<projection>_<evaluation>`, the pair label used for table columns.
    pub fn label(&self) -> String {
        format!(
            "{}_{}",
            self.projection_date.format(DATE_FORMAT),
            self.evaluation_date.format(DATE_FORMAT)
        )
    }
}

type LayoutParser = fn(&[&str]) -> Option<(NaiveDate, NaiveDate)>;

/// Layouts in priority order; the first that parses wins.
const LAYOUTS: &[LayoutParser] = &[leading_dates, prefixed_dates];

fn leading_dates(tokens: &[&str]) -> Option<(NaiveDate, NaiveDate)> {
    Some((parse_date(tokens.first()?)?, parse_date(tokens.get(1)?)?))
}

fn prefixed_dates(tokens: &[&str]) -> Option<(NaiveDate, NaiveDate)> {
    Some((parse_date(tokens.get(1)?)?, parse_date(tokens.get(2)?)?))
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Parses the dates out of `path`'s file name.
///
/// # Errors
///
/// [`SummaryError::MalformedFilename`] if no layout matches, and
/// [`SummaryError::DateOrdering`] if the evaluation date does not come strictly
/// after the projection date.
pub fn parse_eval_dates(path: &Path) -> Result<EvalDates, SummaryError> {
    let stem = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.replace(".csv", ""))
        .ok_or_else(|| SummaryError::MalformedFilename {
            path: path.to_path_buf(),
        })?;
    let tokens: Vec<&str> = stem.split('_').collect();

    let (projection_date, evaluation_date) = LAYOUTS
        .iter()
        .find_map(|layout| layout(&tokens))
        .ok_or_else(|| SummaryError::MalformedFilename {
            path: path.to_path_buf(),
        })?;

    if evaluation_date <= projection_date {
        return Err(SummaryError::DateOrdering {
            path: path.to_path_buf(),
            projection_date,
            evaluation_date,
        });
    }

    Ok(EvalDates {
        projection_date,
        evaluation_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_layout_a() {
        let dates =
            parse_eval_dates(Path::new("evals/2020-12-01/2020-11-01_2020-12-01_us_errs.csv"))
                .unwrap();
        assert_eq!(dates.projection_date, d("2020-11-01"));
        assert_eq!(dates.evaluation_date, d("2020-12-01"));
        assert_eq!(dates.days_ahead(), 30);
    }

    #[test]
    fn test_layout_b_prefixed() {
        let dates = parse_eval_dates(Path::new("projections_2020-11-08_2020-12-08.csv")).unwrap();
        assert_eq!(dates.projection_date, d("2020-11-08"));
        assert_eq!(dates.evaluation_date, d("2020-12-08"));
    }

    #[test]
    fn test_label() {
        let dates = parse_eval_dates(Path::new("2020-11-01_2020-12-01_states_abs_errs.csv")).unwrap();
        assert_eq!(dates.label(), "2020-11-01_2020-12-01");
    }

    #[test]
    fn test_malformed_name() {
        let err = parse_eval_dates(Path::new("notes_about_2020.csv")).unwrap_err();
        assert!(matches!(err, SummaryError::MalformedFilename { .. }));

        let err = parse_eval_dates(Path::new("2020-11-01.csv")).unwrap_err();
        assert!(matches!(err, SummaryError::MalformedFilename { .. }));
    }

    #[test]
    fn test_eval_must_follow_projection() {
        let err = parse_eval_dates(Path::new("2020-12-01_2020-11-01_us_errs.csv")).unwrap_err();
        assert!(matches!(err, SummaryError::DateOrdering { .. }));

        let err = parse_eval_dates(Path::new("projections_2020-12-01_2020-12-01.csv")).unwrap_err();
        assert!(matches!(err, SummaryError::DateOrdering { .. }));
    }
}
