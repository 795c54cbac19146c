//! Output formatting and persistence for summary tables.
//!
//! Supports a fixed-width text rendering for the log, JSON logging, and CSV
//! files with per-table numeric formatting.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::path::Path;
use tracing::{debug, info};

use crate::table::WideTable;

/// How numbers are written to a summary file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// Fixed decimals, like `%.3f`.
    Fixed(usize),
    /// Significant digits with trailing zeros trimmed, like `%.10g`.
    Significant(usize),
}

impl NumberFormat {
    pub fn format(&self, v: f64) -> String {
        match *self {
            NumberFormat::Fixed(decimals) => format!("{v:.decimals$}"),
            NumberFormat::Significant(digits) => format_significant(v, digits),
        }
    }
}

/// `%g`-style formatting at `digits` significant digits.
pub fn format_significant(v: f64, digits: usize) -> String {
    if !v.is_finite() {
        return if v.is_nan() {
            "nan".to_string()
        } else if v > 0.0 {
            "inf".to_string()
        } else {
            "-inf".to_string()
        };
    }
    let digits = digits.max(1);
    let sci = format!("{:.*e}", digits - 1, v);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => (sci.clone(), 0),
    };

    if exp >= -4 && exp < digits as i32 {
        let decimals = (digits as i32 - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{v:.decimals$}"))
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(&mantissa), sign, exp.abs())
    }
}

fn trim_fraction(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

/// Logs the table using Rust's debug pretty-print format.
pub fn print_pretty(table: &WideTable) {
    debug!("{:#?}", table);
}

/// Logs the table as pretty-printed JSON.
pub fn print_json(table: &WideTable) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(table)?);
    Ok(())
}

/// Fixed-width text rendering; missing cells show as `NaN`.
pub fn render_table(table: &WideTable, format: NumberFormat) -> String {
    let mut grid: Vec<Vec<String>> = Vec::with_capacity(table.rows().len() + 1);
    let mut header = vec![table.index_name.clone()];
    header.extend(table.columns().iter().cloned());
    grid.push(header);
    for row in table.rows() {
        let mut line = vec![row.clone()];
        line.extend(table.columns().iter().map(|c| {
            table
                .get(row, c)
                .map(|v| format.format(v))
                .unwrap_or_else(|| "NaN".to_string())
        }));
        grid.push(line);
    }

    let widths: Vec<usize> = (0..grid[0].len())
        .map(|i| grid.iter().map(|line| line[i].len()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for line in &grid {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, &w))| {
                if i == 0 {
                    format!("{cell:<w$}")
                } else {
                    format!("{cell:>w$}")
                }
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Writes `table` to `path` as CSV: index header, one column per label,
/// missing cells empty.
pub fn write_table(path: &Path, table: &WideTable, format: NumberFormat) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;

    let mut header = vec![table.index_name.clone()];
    header.extend(table.columns().iter().cloned());
    writer.write_record(&header).context("write header")?;

    for row in table.rows() {
        let mut record = vec![row.clone()];
        record.extend(
            table
                .columns()
                .iter()
                .map(|c| table.get(row, c).map(|v| format.format(v)).unwrap_or_default()),
        );
        writer.write_record(&record).context("write row")?;
    }

    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    debug!(path = %path.display(), rows = table.rows().len(), "Wrote table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WideTable {
        let mut t = WideTable::new("model");
        t.insert_column("c1", vec![("A", Some(0.1234)), ("B", None)]);
        t.insert_column("c2", vec![("A", Some(2.0)), ("B", Some(-0.5))]);
        t
    }

    #[test]
    fn test_fixed_format() {
        assert_eq!(NumberFormat::Fixed(3).format(0.1234), "0.123");
        assert_eq!(NumberFormat::Fixed(1).format(12.0), "12.0");
    }

    #[test]
    fn test_significant_format() {
        assert_eq!(format_significant(5.0, 10), "5");
        assert_eq!(format_significant(0.6, 10), "0.6");
        assert_eq!(format_significant(1.0 / 3.0, 10), "0.3333333333");
        assert_eq!(format_significant(123456.789, 10), "123456.789");
        assert_eq!(format_significant(0.0, 10), "0");
        assert_eq!(format_significant(1.5e-7, 10), "1.5e-07");
        assert_eq!(format_significant(2.0e12, 10), "2e+12");
        assert_eq!(format_significant(-42.125, 10), "-42.125");
    }

    #[test]
    fn test_render_table_does_not_panic() {
        let text = render_table(&sample(), NumberFormat::Fixed(3));
        assert!(text.starts_with("model"));
        assert!(text.contains("NaN"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_pretty(&sample());
        print_json(&sample()).unwrap();
    }

    #[test]
    fn test_write_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        write_table(&path, &sample(), NumberFormat::Fixed(3)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, vec!["model,c1,c2", "A,0.123,2.000", "B,,-0.500"]);
    }
}
