use std::path::PathBuf;

use crate::error::SummaryError;
use crate::filename::parse_eval_dates;

/// Allowed slack, in days, around `7 * weeks_ahead`.
pub const MAX_DAYS_TOLERANCE: i64 = 3;

pub fn matches_horizon(days_ahead: i64, weeks_ahead: u32) -> bool {
    (days_ahead - 7 * i64::from(weeks_ahead)).abs() <= MAX_DAYS_TOLERANCE
}

/// Keeps the files whose projection-to-evaluation gap is `weeks_ahead` weeks,
/// preserving input order. Every name is parsed, so a malformed one fails the
/// whole call.
pub fn filter_by_weeks_ahead(
    paths: Vec<PathBuf>,
    weeks_ahead: u32,
) -> Result<Vec<PathBuf>, SummaryError> {
    let mut kept = Vec::new();
    for path in paths {
        let dates = parse_eval_dates(&path)?;
        if matches_horizon(dates.days_ahead(), weeks_ahead) {
            kept.push(path);
        }
    }
    Ok(kept)
}
