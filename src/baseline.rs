//! Per-pair comparison of each model against the `Baseline` model across
//! individual states.

use anyhow::Result;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::frame::IndexedFrame;
use crate::selector::EvaluationFile;
use crate::table::WideTable;

pub const BASELINE_MODEL: &str = "Baseline";
/// Aggregate row excluded from the state counts.
pub const NATIONAL_ROW: &str = "US";

const ERROR_PREFIX: &str = "error-";
const BEAT_BASELINE_PREFIX: &str = "beat_baseline-";

pub const NUM_STATES: &str = "num_states";
pub const NUM_WITH_PROJECTIONS: &str = "num_states_with_projections";
pub const NUM_BEAT_BASELINE: &str = "num_states_beat_baseline";
pub const PERC_BEAT_BASELINE: &str = "perc_beat_baseline";
pub const MEAN_ABS_ERROR: &str = "mean_abs_error";

/// Row categories, in output order.
const CATEGORIES: [&str; 4] = [
    NUM_WITH_PROJECTIONS,
    NUM_BEAT_BASELINE,
    PERC_BEAT_BASELINE,
    MEAN_ABS_ERROR,
];

/// Metric key -> value (or missing) for one evaluation pair.
pub type BaselineSummaryRow = BTreeMap<String, Option<f64>>;

fn metric_key(metric: &str, model: &str) -> String {
    format!("{metric}-{model}")
}

/// `Baseline` followed by every model column, in file order. Derived
/// `error-`/`beat_baseline-` columns are not models.
pub fn model_names(frame: &IndexedFrame) -> Vec<String> {
    std::iter::once(BASELINE_MODEL.to_string())
        .chain(
            frame
                .columns
                .iter()
                .filter(|c| {
                    c.contains('-') && !c.contains(ERROR_PREFIX) && !c.contains(BEAT_BASELINE_PREFIX)
                })
                .cloned(),
        )
        .collect()
}

fn count_present(frame: &IndexedFrame, column: &str) -> usize {
    frame
        .column(column)
        .map(|cells| cells.iter().filter(|(_, v)| v.is_some()).count())
        .unwrap_or(0)
}

/// Sum of `|v|` over present entries; missing if the column is absent or has
/// no present entries.
fn abs_sum(frame: &IndexedFrame, column: &str) -> Option<f64> {
    let values = frame.numeric_column(column)?;
    let present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().map(|v| v.abs()).sum())
    }
}

/// Comparison statistics for one state projection frame.
pub fn compare_frame(frame: IndexedFrame) -> BaselineSummaryRow {
    let states = frame.without_row(NATIONAL_ROW);
    let num_states = states.len();

    let mut row = BaselineSummaryRow::new();
    row.insert(NUM_STATES.to_string(), Some(num_states as f64));

    for model in model_names(&states) {
        let num_with_projections = count_present(&states, &model);

        if model != BASELINE_MODEL {
            let num_beat_baseline = abs_sum(&states, &metric_key("beat_baseline", &model));
            let perc_beat_baseline = match num_beat_baseline {
                Some(beat) if num_with_projections > 0 => {
                    Some(beat / num_with_projections as f64)
                }
                _ => None,
            };

            row.insert(
                metric_key(NUM_WITH_PROJECTIONS, &model),
                Some(num_with_projections as f64),
            );
            row.insert(
                metric_key(NUM_BEAT_BASELINE, &model),
                num_beat_baseline.map(f64::trunc),
            );
            row.insert(metric_key(PERC_BEAT_BASELINE, &model), perc_beat_baseline);
        }

        // only when every state has a projection
        let mean_abs_error = if num_with_projections == num_states && num_states > 0 {
            abs_sum(&states, &metric_key("error", &model)).map(|s| s / num_states as f64)
        } else {
            None
        };
        row.insert(metric_key(MEAN_ABS_ERROR, &model), mean_abs_error);
    }

    row
}

/// `num_states`, then each category's keys in alphabetical order.
pub fn row_ordering<'a>(keys: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let keys: Vec<&String> = keys.into_iter().collect();
    let mut ordering = Vec::new();
    if keys.iter().any(|k| *k == NUM_STATES) {
        ordering.push(NUM_STATES.to_string());
    }
    for category in CATEGORIES {
        let prefix = format!("{category}-");
        let mut in_category: Vec<String> = keys
            .iter()
            .filter(|k| k.starts_with(&prefix))
            .map(|k| k.to_string())
            .collect();
        in_category.sort();
        in_category.dedup();
        ordering.extend(in_category);
    }
    ordering
}

#[tracing::instrument(skip_all, fields(files = files.len()))]
pub fn compare_to_baseline(files: &[EvaluationFile]) -> Result<WideTable> {
    let mut table = WideTable::new("metric");
    for file in files {
        let frame = IndexedFrame::from_path(&file.path)?;
        let row = compare_frame(frame);
        let label = file.dates.label();
        debug!(label = %label, metrics = row.len(), "Compared to baseline");
        table.insert_column(&label, row);
    }
    table.sort_columns();

    let ordering = row_ordering(table.rows());
    table.select_rows(&ordering);

    info!(
        pairs = table.columns().len(),
        metrics = table.rows().len(),
        "Baseline comparison"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(body: &str) -> IndexedFrame {
        IndexedFrame::from_reader(body.as_bytes()).unwrap()
    }

    const FIVE_STATES: &str = "\
state,Baseline,Model-M,error-Baseline,error-Model-M,beat_baseline-Model-M
US,1000,900,50,40,
NY,10,12,1,2,1
CA,20,18,2,1,1
TX,30,31,3,4,0
FL,40,41,4,5,0
WA,50,49,5,3,1
";

    #[test]
    fn test_model_names() {
        let f = frame(FIVE_STATES);
        assert_eq!(model_names(&f), vec!["Baseline", "Model-M"]);
    }

    #[test]
    fn test_five_state_comparison() {
        let row = compare_frame(frame(FIVE_STATES));
        assert_eq!(row["num_states"], Some(5.0));
        assert_eq!(row["num_states_with_projections-Model-M"], Some(5.0));
        assert_eq!(row["num_states_beat_baseline-Model-M"], Some(3.0));
        assert_eq!(row["perc_beat_baseline-Model-M"], Some(0.6));
        assert_eq!(row["mean_abs_error-Model-M"], Some(15.0 / 5.0));
        assert_eq!(row["mean_abs_error-Baseline"], Some(3.0));
        assert!(!row.contains_key("num_states_with_projections-Baseline"));
    }

    #[test]
    fn test_partial_coverage_has_no_mean_error() {
        let body = "\
state,Baseline,Model-M,error-Baseline,error-Model-M,beat_baseline-Model-M
S0,1,1,1,1,1
S1,1,1,1,1,1
S2,1,1,1,1,1
S3,1,1,1,1,1
S4,1,1,1,1,1
S5,1,1,1,1,1
S6,1,1,1,1,1
S7,1,1,1,1,1
S8,1,1,1,1,1
S9,1,,1,,
";
        let row = compare_frame(frame(body));
        assert_eq!(row["num_states"], Some(10.0));
        assert_eq!(row["num_states_with_projections-Model-M"], Some(9.0));
        assert_eq!(row["mean_abs_error-Model-M"], None);
        assert_eq!(row["mean_abs_error-Baseline"], Some(1.0));
        assert_eq!(row["perc_beat_baseline-Model-M"], Some(1.0));
    }

    #[test]
    fn test_missing_beat_count_stays_missing() {
        let body = "\
state,Baseline,Model-M,error-Model-M,beat_baseline-Model-M
NY,10,12,2,
CA,20,18,1,
";
        let row = compare_frame(frame(body));
        assert_eq!(row["num_states_beat_baseline-Model-M"], None);
        assert_eq!(row["perc_beat_baseline-Model-M"], None);

        let body = "state,Baseline,Model-M\nNY,10,12\n";
        let row = compare_frame(frame(body));
        assert_eq!(row["perc_beat_baseline-Model-M"], None);
        assert_eq!(row["mean_abs_error-Model-M"], None);
    }

    #[test]
    fn test_row_ordering() {
        let keys: Vec<String> = [
            "mean_abs_error-Zeta",
            "perc_beat_baseline-Alpha",
            "num_states_with_projections-Zeta",
            "mean_abs_error-Baseline",
            "num_states",
            "num_states_beat_baseline-Alpha",
            "num_states_with_projections-Alpha",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(
            row_ordering(&keys),
            vec![
                "num_states",
                "num_states_with_projections-Alpha",
                "num_states_with_projections-Zeta",
                "num_states_beat_baseline-Alpha",
                "perc_beat_baseline-Alpha",
                "mean_abs_error-Baseline",
                "mean_abs_error-Zeta",
            ]
        );
    }
}
