//! Labeled sparse matrix: row labels (models or metric keys) by column labels
//! (evaluation pairs). Absent cells are missing values.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, Serialize)]
pub struct WideTable {
    /// Header cell above the row labels when persisted.
    pub index_name: String,
    rows: Vec<String>,
    columns: Vec<String>,
    cells: BTreeMap<String, BTreeMap<String, f64>>,
}

impl WideTable {
    pub fn new(index_name: &str) -> Self {
        Self {
            index_name: index_name.to_string(),
            ..Default::default()
        }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Adds (or replaces) column `label`. Row labels are unioned in ascending
    /// order; a `None` value still registers the row.
    pub fn insert_column<I, K>(&mut self, label: &str, values: I)
    where
        I: IntoIterator<Item = (K, Option<f64>)>,
        K: Into<String>,
    {
        let mut rows: BTreeSet<String> = self.rows.drain(..).collect();
        let mut column = BTreeMap::new();
        for (row, value) in values {
            let row = row.into();
            if let Some(v) = value {
                column.insert(row.clone(), v);
            }
            rows.insert(row);
        }
        self.rows = rows.into_iter().collect();

        if !self.columns.iter().any(|c| c == label) {
            self.columns.push(label.to_string());
        }
        self.cells.insert(label.to_string(), column);
    }

    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        self.cells.get(column)?.get(row).copied()
    }

    pub fn set(&mut self, row: &str, column: &str, value: Option<f64>) {
        if !self.rows.iter().any(|r| r == row) {
            self.rows.push(row.to_string());
        }
        if !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
        let col = self.cells.entry(column.to_string()).or_default();
        match value {
            Some(v) => {
                col.insert(row.to_string(), v);
            }
            None => {
                col.remove(row);
            }
        }
    }

    /// Values of `column` in current row order.
    pub fn column_values(&self, column: &str) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| self.get(r, column)).collect()
    }

    /// Removes rows with no value in any column.
    pub fn drop_empty_rows(&mut self) {
        let cells = &self.cells;
        self.rows
            .retain(|row| cells.values().any(|col| col.contains_key(row)));
    }

    pub fn sort_columns(&mut self) {
        self.columns.sort();
    }

    /// Reorders rows by `order`, a permutation of row positions.
    pub fn reorder_rows(&mut self, order: &[usize]) {
        debug_assert_eq!(order.len(), self.rows.len());
        self.rows = order.iter().map(|&i| self.rows[i].clone()).collect();
    }

    /// Reorders rows to `labels`, dropping rows not listed.
    pub fn select_rows(&mut self, labels: &[String]) {
        self.rows = labels
            .iter()
            .filter(|l| self.rows.contains(l))
            .cloned()
            .collect();
    }

    /// Copy restricted to `columns`, in the given order.
    pub fn with_columns(&self, columns: &[String]) -> WideTable {
        WideTable {
            index_name: self.index_name.clone(),
            rows: self.rows.clone(),
            columns: columns.to_vec(),
            cells: columns
                .iter()
                .filter_map(|c| self.cells.get(c).map(|col| (c.clone(), col.clone())))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_of_rows() {
        let mut t = WideTable::new("model");
        t.insert_column("b", vec![("M2", Some(1.0)), ("M1", Some(2.0))]);
        t.insert_column("a", vec![("M3", Some(3.0))]);
        assert_eq!(t.rows(), &["M1", "M2", "M3"]);
        assert_eq!(t.get("M3", "b"), None);
        assert_eq!(t.get("M3", "a"), Some(3.0));
    }

    #[test]
    fn test_drop_empty_rows_and_sort_columns() {
        let mut t = WideTable::new("model");
        t.insert_column("z", vec![("A", Some(1.0)), ("B", None)]);
        t.insert_column("y", vec![("A", None), ("B", None), ("C", Some(2.0))]);
        t.drop_empty_rows();
        t.sort_columns();
        assert_eq!(t.rows(), &["A", "C"]);
        assert_eq!(t.columns(), &["y", "z"]);
        assert_eq!(t.column_values("z"), vec![Some(1.0), None]);
    }

    #[test]
    fn test_reorder_rows() {
        let mut t = WideTable::new("model");
        t.insert_column("c", vec![("A", Some(1.0)), ("B", Some(2.0)), ("C", Some(3.0))]);
        t.reorder_rows(&[2, 0, 1]);
        assert_eq!(t.rows(), &["C", "A", "B"]);
        assert_eq!(t.column_values("c"), vec![Some(3.0), Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_set_and_select_rows() {
        let mut t = WideTable::new("metric");
        t.set("num_states", "p1", Some(5.0));
        t.set("mean_abs_error-M", "p1", None);
        t.set("mean_abs_error-M", "p2", Some(1.5));
        t.select_rows(&["mean_abs_error-M".to_string(), "num_states".to_string()]);
        assert_eq!(t.rows(), &["mean_abs_error-M", "num_states"]);
        assert_eq!(t.get("mean_abs_error-M", "p1"), None);
        assert_eq!(t.columns(), &["p1", "p2"]);
    }
}
