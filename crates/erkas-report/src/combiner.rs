//! National table combine.
//!
//! The combiner moves `Empty -> Accumulating -> Finalized` and never back.
//! Every pushed table is reindexed onto the canonical columns: absent
//! columns become empty cells and unknown columns are dropped.

use std::collections::BTreeMap;

use erkas_model::columns::canonical_columns;
use erkas_model::{OutputLayout, SourceKind};
use tracing::{debug, info};

use crate::error::{ReportError, Result};
use crate::table::SummaryTable;

/// Lifecycle of a [`RegionCombiner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinerState {
    Empty,
    Accumulating,
    Finalized,
}

/// Projects a table onto `columns`.
///
/// Reindexing a table that already has exactly `columns` returns it
/// unchanged.
pub fn reindex(table: &SummaryTable, columns: &[String]) -> SummaryTable {
    let positions: BTreeMap<&str, usize> = table
        .headers
        .iter()
        .enumerate()
        .rev()
        .map(|(idx, header)| (header.as_str(), idx))
        .collect();
    let source: Vec<Option<usize>> = columns
        .iter()
        .map(|column| positions.get(column.as_str()).copied())
        .collect();

    let rows = table
        .rows
        .iter()
        .map(|row| {
            source
                .iter()
                .map(|idx| {
                    idx.and_then(|idx| row.get(idx))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();
    SummaryTable {
        headers: columns.to_vec(),
        rows,
    }
}

/// Unions per-kind tables into the national table.
#[derive(Debug, Clone)]
pub struct RegionCombiner {
    state: CombinerState,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Default for RegionCombiner {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionCombiner {
    /// A combiner over the canonical summary columns.
    pub fn new() -> Self {
        Self::with_columns(canonical_columns())
    }

    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            state: CombinerState::Empty,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn state(&self) -> CombinerState {
        self.state
    }

    /// Appends the rows of a table, reindexed.
    pub fn push(&mut self, table: &SummaryTable) -> Result<()> {
        if self.state == CombinerState::Finalized {
            return Err(ReportError::InvalidTransition {
                state: self.state,
                action: "push into",
            });
        }
        let dropped: Vec<&String> = table
            .headers
            .iter()
            .filter(|header| !self.columns.contains(*header))
            .collect();
        if !dropped.is_empty() {
            debug!(columns = ?dropped, "dropping non-canonical columns");
        }
        let reindexed = reindex(table, &self.columns);
        self.rows.extend(reindexed.rows);
        self.state = CombinerState::Accumulating;
        Ok(())
    }

    /// Emits the national table. Only possible once.
    pub fn finalize(&mut self) -> Result<SummaryTable> {
        if self.state == CombinerState::Finalized {
            return Err(ReportError::InvalidTransition {
                state: self.state,
                action: "finalize",
            });
        }
        self.state = CombinerState::Finalized;
        Ok(SummaryTable {
            headers: self.columns.clone(),
            rows: std::mem::take(&mut self.rows),
        })
    }
}

/// Combines the persisted per-kind tables in kind order.
///
/// Kinds without a table file are skipped.
pub fn combine_kind_tables(layout: &OutputLayout) -> Result<SummaryTable> {
    let mut combiner = RegionCombiner::new();
    for kind in SourceKind::ALL {
        let path = layout.kind_table(kind);
        if !path.is_file() {
            debug!(kind = %kind, path = %path.display(), "no summary table for kind");
            continue;
        }
        let table = SummaryTable::read_csv(&path)?;
        combiner.push(&table)?;
    }
    let national = combiner.finalize()?;
    info!(rows = national.len(), "national table combined");
    Ok(national)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> SummaryTable {
        SummaryTable {
            headers: strings(headers),
            rows: rows.iter().map(|row| strings(row)).collect(),
        }
    }

    #[test]
    fn test_reindex_fills_and_drops() {
        let source = table(&["B", "Extra", "A"], &[&["b1", "x", "a1"], &["b2", "y"]]);
        let reindexed = reindex(&source, &strings(&["A", "B", "C"]));
        assert_eq!(reindexed.headers, ["A", "B", "C"]);
        assert_eq!(
            reindexed.rows,
            vec![strings(&["a1", "b1", ""]), strings(&["", "b2", ""])]
        );
    }

    #[test]
    fn test_reindex_is_idempotent() {
        let columns = canonical_columns();
        let source = table(&["Kanton", "Format", "AmpelcodeGW5", "Notiz"], &[&["ZH", "CSV", "3", "-"]]);
        let once = reindex(&source, &columns);
        let twice = reindex(&once, &columns);
        assert_eq!(once, twice);
        assert_eq!(once.headers, columns);
    }

    #[test]
    fn test_state_machine() {
        let mut combiner = RegionCombiner::with_columns(strings(&["Kanton"]));
        assert_eq!(combiner.state(), CombinerState::Empty);

        combiner.push(&table(&["Kanton"], &[&["ZH"]])).unwrap();
        assert_eq!(combiner.state(), CombinerState::Accumulating);
        combiner.push(&table(&["Kanton"], &[&["BE"]])).unwrap();

        let national = combiner.finalize().unwrap();
        assert_eq!(national.rows, vec![strings(&["ZH"]), strings(&["BE"])]);
        assert_eq!(combiner.state(), CombinerState::Finalized);

        let err = combiner.push(&table(&["Kanton"], &[&["TI"]])).unwrap_err();
        assert!(matches!(err, ReportError::InvalidTransition { .. }));
        assert!(combiner.finalize().is_err());
    }

    #[test]
    fn test_finalize_empty() {
        let mut combiner = RegionCombiner::new();
        let national = combiner.finalize().unwrap();
        assert!(national.is_empty());
        assert_eq!(national.headers, canonical_columns());
    }
}
