//! Rank-based model ordering.
//!
//! Each column is ranked by absolute value, ascending, with ties sharing the
//! average of the positions they span. Missing entries rank one past the worst
//! observed rank so models without a recent forecast sink to the bottom.

use std::cmp::Ordering;

use crate::table::WideTable;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rank {
    pub rank: f64,
    pub is_missing: bool,
}

/// Average ranks of `|v|` for the observed entries; missing entries stay `None`.
pub fn raw_ranks(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut observed: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v.abs())))
        .collect();
    observed.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut ranks = vec![None; values.len()];
    let mut start = 0;
    while start < observed.len() {
        let mut end = start + 1;
        while end < observed.len() && observed[end].1 == observed[start].1 {
            end += 1;
        }
        // positions start..end are 1-based ranks start+1..=end
        let avg = (start + 1 + end) as f64 / 2.0;
        for &(i, _) in &observed[start..end] {
            ranks[i] = Some(avg);
        }
        start = end;
    }
    ranks
}

/// Ranks with missing entries filled as `max observed rank + 1`.
pub fn rank_column(values: &[Option<f64>]) -> Vec<Rank> {
    let raw = raw_ranks(values);
    let worst = raw.iter().flatten().copied().fold(0.0, f64::max) + 1.0;
    raw.into_iter()
        .map(|r| match r {
            Some(rank) => Rank {
                rank,
                is_missing: false,
            },
            None => Rank {
                rank: worst,
                is_missing: true,
            },
        })
        .collect()
}

/// Mean filled rank of each row across `window`, in the table's row order.
pub fn mean_ranks(table: &WideTable, window: &[String]) -> Vec<Option<f64>> {
    let per_column: Vec<Vec<Rank>> = window
        .iter()
        .map(|c| rank_column(&table.column_values(c)))
        .collect();

    (0..table.rows().len())
        .map(|row| {
            if per_column.is_empty() {
                return None;
            }
            let sum: f64 = per_column.iter().map(|col| col[row].rank).sum();
            Some(sum / per_column.len() as f64)
        })
        .collect()
}

/// Row permutation sorting by ascending mean rank. Stable, so ties keep their
/// current relative order.
pub fn mean_rank_order(table: &WideTable, window: &[String]) -> Vec<usize> {
    let means = mean_ranks(table, window);
    let mut order: Vec<usize> = (0..means.len()).collect();
    order.sort_by(|&a, &b| match (means[a], means[b]) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    order
}

/// Unfilled rank matrix over `columns`, for display.
pub fn rank_table(table: &WideTable, columns: &[String]) -> WideTable {
    let mut ranks = WideTable::new(&table.index_name);
    for column in columns {
        let values = raw_ranks(&table.column_values(column));
        ranks.insert_column(column, table.rows().iter().cloned().zip(values));
    }
    ranks.select_rows(table.rows());
    ranks
}
