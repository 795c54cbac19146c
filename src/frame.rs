//! Minimal row-indexed view over an evaluation CSV file.
//!
//! The first column is the row index (model name or state abbreviation); the
//! remaining cells are kept as raw strings with missing markers normalized to
//! `None`.

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Cell contents treated as missing.
const MISSING_MARKERS: &[&str] = &["", "NaN", "nan", "NA", "N/A", "null", "None"];

#[derive(Debug, Clone)]
pub struct IndexedFrame {
    pub columns: Vec<String>,
    pub index: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl IndexedFrame {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
        let frame =
            Self::from_reader(file).with_context(|| format!("read {}", path.display()))?;
        debug!(
            path = %path.display(),
            rows = frame.index.len(),
            columns = frame.columns.len(),
            "Loaded CSV"
        );
        Ok(frame)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let header = rdr.headers().context("read header")?.clone();
        let columns: Vec<String> = header.iter().skip(1).map(str::to_string).collect();

        let mut index = Vec::new();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.context("read row")?;
            let Some(key) = record.get(0) else {
                continue;
            };
            let cells = (0..columns.len())
                .map(|i| record.get(i + 1).and_then(normalize_cell))
                .collect();
            index.push(key.to_string());
            rows.push(cells);
        }

        Ok(Self {
            columns,
            index,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_position(name).is_some()
    }

    fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// `(row key, cell)` pairs for `name`, or `None` if the column is absent.
    pub fn column(&self, name: &str) -> Option<Vec<(&str, Option<&str>)>> {
        let pos = self.column_position(name)?;
        Some(
            self.index
                .iter()
                .zip(&self.rows)
                .map(|(key, row)| (key.as_str(), row[pos].as_deref()))
                .collect(),
        )
    }

    /// Numeric view of `name`; unparseable cells count as missing.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.column(name)
            .map(|cells| cells.into_iter().map(|(_, v)| v.and_then(parse_f64)).collect())
    }

    /// Drops every row whose index equals `key`.
    pub fn without_row(self, key: &str) -> Self {
        let (index, rows) = self
            .index
            .into_iter()
            .zip(self.rows)
            .filter(|(k, _)| k != key)
            .unzip();
        Self {
            columns: self.columns,
            index,
            rows,
        }
    }
}

fn normalize_cell(s: &str) -> Option<String> {
    if MISSING_MARKERS.contains(&s) {
        None
    } else {
        Some(s.to_string())
    }
}

pub fn parse_f64(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_nan() { None } else { Some(v) }
}

/// Parses `"12.3%"` as `0.123`. A value without the suffix is still divided
/// by 100.
pub fn parse_percent(s: &str) -> Option<f64> {
    parse_f64(s.trim().trim_end_matches('%')).map(|v| v / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
state,Baseline,Model-A,error-Model-A
US,100,90,10
NY,10,,
CA,20,NaN,3
";

    #[test]
    fn test_reads_index_and_columns() {
        let frame = IndexedFrame::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(frame.columns, vec!["Baseline", "Model-A", "error-Model-A"]);
        assert_eq!(frame.index, vec!["US", "NY", "CA"]);
        assert_eq!(frame.len(), 3);
    }

    #[test]
    fn test_missing_markers_are_none() {
        let frame = IndexedFrame::from_reader(SAMPLE.as_bytes()).unwrap();
        let col = frame.column("Model-A").unwrap();
        assert_eq!(col, vec![("US", Some("90")), ("NY", None), ("CA", None)]);
        assert!(frame.column("Model-B").is_none());
    }

    #[test]
    fn test_without_row() {
        let frame = IndexedFrame::from_reader(SAMPLE.as_bytes())
            .unwrap()
            .without_row("US");
        assert_eq!(frame.index, vec!["NY", "CA"]);
        assert_eq!(
            frame.numeric_column("Baseline").unwrap(),
            vec![Some(10.0), Some(20.0)]
        );
    }

    #[test]
    fn test_parse_percent() {
        assert!((parse_percent("12.3%").unwrap() - 0.123).abs() < 1e-12);
        assert!((parse_percent("-5%").unwrap() + 0.05).abs() < 1e-12);
        assert_eq!(parse_percent("abc%"), None);
    }
}
