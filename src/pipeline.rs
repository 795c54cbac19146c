//! Runs the three summary branches (national, state, baseline) over the
//! selected evaluation files, logging each table and persisting it when an
//! output directory is configured.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::baseline::compare_to_baseline;
use crate::config::SummaryConfig;
use crate::filename::DATE_FORMAT;
use crate::merge::{RankedTable, summarize_national, summarize_states};
use crate::output::{NumberFormat, print_json, print_pretty, render_table, write_table};
use crate::selector::{Mode, select_files};
use crate::table::WideTable;

pub const NATIONAL_FORMAT: NumberFormat = NumberFormat::Fixed(3);
pub const STATE_FORMAT: NumberFormat = NumberFormat::Fixed(1);
pub const BASELINE_FORMAT: NumberFormat = NumberFormat::Significant(10);
const RANK_FORMAT: NumberFormat = NumberFormat::Fixed(1);

pub const BASELINE_SUBDIR: &str = "baseline_comparison";

/// Where each summary is written for a given mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub national: PathBuf,
    pub states: PathBuf,
    pub baseline: PathBuf,
}

impl OutputPaths {
    pub fn new(out_dir: &Path, mode: Mode) -> Self {
        let baseline_dir = out_dir.join(BASELINE_SUBDIR);
        match mode {
            Mode::EvalDate(date) => {
                let date = date.format(DATE_FORMAT);
                Self {
                    national: out_dir.join(format!("summary_us_{date}.csv")),
                    states: out_dir.join(format!("summary_states_{date}.csv")),
                    baseline: baseline_dir.join(format!("baseline_comparison_states_{date}.csv")),
                }
            }
            Mode::WeeksAhead(weeks) => Self {
                national: out_dir.join(format!("summary_{weeks}_weeks_ahead_us.csv")),
                states: out_dir.join(format!("summary_{weeks}_weeks_ahead_states.csv")),
                baseline: baseline_dir.join(format!(
                    "baseline_comparison_{weeks}_weeks_ahead_states.csv"
                )),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct SummaryOutput {
    pub national: RankedTable,
    pub states: RankedTable,
    pub baseline: WideTable,
    /// Files written, empty when no output directory is configured.
    pub written: Vec<PathBuf>,
}

#[tracing::instrument(skip_all, fields(mode = %config.mode))]
pub fn run(config: &SummaryConfig) -> Result<SummaryOutput> {
    info!(
        mode = %config.mode,
        evaluations_dir = %config.evaluations_dir.display(),
        out_dir = ?config.out_dir,
        "Summarizing evaluations"
    );

    let paths = match &config.out_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir.join(BASELINE_SUBDIR))
                .with_context(|| format!("create {}", dir.display()))?;
            Some(OutputPaths::new(dir, config.mode))
        }
        None => None,
    };

    let files = select_files(&config.evaluations_dir, config.mode)?;
    let mut written = Vec::new();

    let national = summarize_national(&files.national, config.mode)?;
    show_ranked("US", &national, NATIONAL_FORMAT, config.json)?;
    if let Some(paths) = &paths {
        write_table(&paths.national, &national.table, NATIONAL_FORMAT)?;
        info!(path = %paths.national.display(), "Saved US summary");
        written.push(paths.national.clone());
    }

    let states = summarize_states(&files.state_abs, &files.state_sq, config.mode)?;
    show_ranked("State-by-state", &states, STATE_FORMAT, config.json)?;
    if let Some(paths) = &paths {
        write_table(&paths.states, &states.table, STATE_FORMAT)?;
        info!(path = %paths.states.display(), "Saved states summary");
        written.push(paths.states.clone());
    }

    let baseline = compare_to_baseline(&files.projections)?;
    info!(
        "Baseline comparison:\n{}",
        render_table(&baseline, BASELINE_FORMAT)
    );
    if config.json {
        print_json(&baseline)?;
    }
    if let Some(paths) = &paths {
        write_table(&paths.baseline, &baseline, BASELINE_FORMAT)?;
        info!(path = %paths.baseline.display(), "Saved baseline comparison");
        written.push(paths.baseline.clone());
    }

    Ok(SummaryOutput {
        national,
        states,
        baseline,
        written,
    })
}

fn show_ranked(name: &str, ranked: &RankedTable, format: NumberFormat, json: bool) -> Result<()> {
    let errors = ranked.table.with_columns(&ranked.ranking_columns);
    info!(
        ranked_by = ?ranked.window_columns,
        "{name} errors:\n{}",
        render_table(&errors, format)
    );
    info!(
        "{name} rankings:\n{}",
        render_table(&ranked.ranks, RANK_FORMAT)
    );
    print_pretty(&ranked.table);
    if json {
        print_json(&ranked.table)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filename::parse_date;

    #[test]
    fn test_output_paths_by_eval_date() {
        let date = parse_date("2020-12-01").unwrap();
        let paths = OutputPaths::new(Path::new("out"), Mode::EvalDate(date));
        assert_eq!(paths.national, PathBuf::from("out/summary_us_2020-12-01.csv"));
        assert_eq!(paths.states, PathBuf::from("out/summary_states_2020-12-01.csv"));
        assert_eq!(
            paths.baseline,
            PathBuf::from("out/baseline_comparison/baseline_comparison_states_2020-12-01.csv")
        );
    }

    #[test]
    fn test_output_paths_by_weeks_ahead() {
        let paths = OutputPaths::new(Path::new("out"), Mode::WeeksAhead(4));
        assert_eq!(paths.national, PathBuf::from("out/summary_4_weeks_ahead_us.csv"));
        assert_eq!(paths.states, PathBuf::from("out/summary_4_weeks_ahead_states.csv"));
        assert_eq!(
            paths.baseline,
            PathBuf::from("out/baseline_comparison/baseline_comparison_4_weeks_ahead_states.csv")
        );
    }
}
