//! Joins per-file error columns into a wide model-by-pair table and orders the
//! models by mean rank.

use anyhow::{Result, bail};
use tracing::{debug, info};

use crate::frame::{IndexedFrame, parse_f64, parse_percent};
use crate::rank::{mean_rank_order, rank_table};
use crate::selector::{EvaluationFile, Mode};
use crate::table::WideTable;

/// Columns considered when ranking by evaluation date.
pub const RECENT_RANKING_COLUMNS: usize = 6;

pub const NATIONAL_PREFIX: &str = "perc_error";
pub const STATE_ABS_PREFIX: &str = "mean_abs_error";
pub const STATE_SQ_PREFIX: &str = "mean_sq_abs_error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// `"12.3%"`, stored as a fraction.
    Percent,
    Plain,
}

impl ValueFormat {
    fn parse(&self, s: &str) -> Option<f64> {
        match self {
            ValueFormat::Percent => parse_percent(s),
            ValueFormat::Plain => parse_f64(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingWindow {
    All,
    Recent(usize),
}

impl RankingWindow {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::EvalDate(_) => RankingWindow::Recent(RECENT_RANKING_COLUMNS),
            Mode::WeeksAhead(_) => RankingWindow::All,
        }
    }

    pub fn apply<'a>(&self, columns: &'a [String]) -> &'a [String] {
        match *self {
            RankingWindow::All => columns,
            RankingWindow::Recent(n) => &columns[columns.len().saturating_sub(n)..],
        }
    }
}

/// One input column: which file, which value column, and how it is labeled.
#[derive(Debug, Clone)]
pub struct ColumnSource<'a> {
    pub file: &'a EvaluationFile,
    pub value_column: &'static str,
    pub label_prefix: &'static str,
    pub format: ValueFormat,
}

impl ColumnSource<'_> {
    pub fn label(&self) -> String {
        format!("{}_{}", self.label_prefix, self.file.dates.label())
    }
}

/// Wide table in mean-rank order plus the rank matrix used to explain it.
#[derive(Debug, Clone)]
pub struct RankedTable {
    pub table: WideTable,
    /// Columns whose label contains the ranking prefix, sorted.
    pub ranking_columns: Vec<String>,
    /// Columns that actually drove the ordering.
    pub window_columns: Vec<String>,
    /// Unfilled ranks over `ranking_columns`, rows in `table` order.
    pub ranks: WideTable,
}

pub fn load_column(source: &ColumnSource<'_>) -> Result<Vec<(String, Option<f64>)>> {
    let path = &source.file.path;
    let frame = IndexedFrame::from_path(path)?;
    let Some(cells) = frame.column(source.value_column) else {
        bail!(
            "missing column: {} in {}",
            source.value_column,
            path.display()
        );
    };
    Ok(cells
        .into_iter()
        .map(|(model, v)| (model.to_string(), v.and_then(|v| source.format.parse(v))))
        .collect())
}

/// Builds the wide table from `sources` and reorders rows by mean rank over the
/// `ranking_prefix` columns selected by `window`.
pub fn merge_and_rank(
    sources: &[ColumnSource<'_>],
    ranking_prefix: &str,
    window: RankingWindow,
) -> Result<RankedTable> {
    let mut table = WideTable::new("model");
    for source in sources {
        let label = source.label();
        let values = load_column(source)?;
        debug!(label = %label, models = values.len(), "Merged column");
        table.insert_column(&label, values);
    }
    table.drop_empty_rows();
    table.sort_columns();

    let ranking_columns: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| c.contains(ranking_prefix))
        .cloned()
        .collect();
    let window_columns = window.apply(&ranking_columns).to_vec();

    let order = mean_rank_order(&table, &window_columns);
    table.reorder_rows(&order);
    let ranks = rank_table(&table, &ranking_columns);

    info!(
        models = table.rows().len(),
        columns = table.columns().len(),
        ranking_columns = window_columns.len(),
        "Ranked table"
    );

    Ok(RankedTable {
        table,
        ranking_columns,
        window_columns,
        ranks,
    })
}

#[tracing::instrument(skip_all, fields(files = files.len()))]
pub fn summarize_national(files: &[EvaluationFile], mode: Mode) -> Result<RankedTable> {
    let sources: Vec<ColumnSource<'_>> = files
        .iter()
        .map(|file| ColumnSource {
            file,
            value_column: "perc_error",
            label_prefix: NATIONAL_PREFIX,
            format: ValueFormat::Percent,
        })
        .collect();
    merge_and_rank(&sources, NATIONAL_PREFIX, RankingWindow::for_mode(mode))
}

#[tracing::instrument(skip_all, fields(abs_files = abs_files.len(), sq_files = sq_files.len()))]
pub fn summarize_states(
    abs_files: &[EvaluationFile],
    sq_files: &[EvaluationFile],
    mode: Mode,
) -> Result<RankedTable> {
    let abs = abs_files.iter().map(|file| ColumnSource {
        file,
        value_column: "mean",
        label_prefix: STATE_ABS_PREFIX,
        format: ValueFormat::Plain,
    });
    let sq = sq_files.iter().map(|file| ColumnSource {
        file,
        value_column: "mean",
        label_prefix: STATE_SQ_PREFIX,
        format: ValueFormat::Plain,
    });
    let sources: Vec<ColumnSource<'_>> = abs.chain(sq).collect();
    merge_and_rank(&sources, STATE_ABS_PREFIX, RankingWindow::for_mode(mode))
}
