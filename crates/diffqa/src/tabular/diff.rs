//! Keyed and row-set comparison of tables.

use super::table::{Cell, Sheet, Table};
use crate::result::{DiffqaError, DiffqaResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Which dataset a row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// First input
    Source,
    /// Second input
    Target,
}

impl Side {
    /// Lowercase label
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One differing cell of a paired row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellChange {
    /// Column header (source naming)
    pub column: String,
    /// Value in source
    pub source: Cell,
    /// Value in target
    pub target: Cell,
}

/// A key present in both datasets whose rows differ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangedRow {
    /// Key cell
    pub key: Cell,
    /// Full source row, in source column order
    pub source: Vec<Cell>,
    /// Full target row, aligned to source column order
    pub target: Vec<Cell>,
    /// Differing non-key cells
    pub changes: Vec<CellChange>,
}

impl ChangedRow {
    /// Whether the cell at `column` differs
    #[must_use]
    pub fn is_changed(&self, column: usize) -> bool {
        match (self.source.get(column), self.target.get(column)) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }
}

/// A row that occurs in only one dataset (row-set mode)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedRow {
    /// Originating dataset
    pub side: Side,
    /// Row cells, in source column order
    pub cells: Vec<Cell>,
}

/// How rows were matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DiffMode {
    /// Rows paired by a key column
    Keyed {
        /// Key column header
        key_column: String,
    },
    /// Rows compared as multisets
    RowSet,
}

/// Differences between two tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetDiff {
    /// Sheet name for workbook comparisons
    pub name: Option<String>,
    /// Column headers used for every row below
    pub columns: Vec<String>,
    /// Matching strategy
    pub mode: DiffMode,
    /// Paired rows with differing cells
    pub changed: Vec<ChangedRow>,
    /// Keys only in source
    pub removed: Vec<Vec<Cell>>,
    /// Keys only in target
    pub added: Vec<Vec<Cell>>,
    /// Row-set mode: rows without a counterpart
    pub unmatched: Vec<UnmatchedRow>,
}

impl SheetDiff {
    fn empty(columns: Vec<String>, mode: DiffMode) -> Self {
        Self {
            name: None,
            columns,
            mode,
            changed: Vec::new(),
            removed: Vec::new(),
            added: Vec::new(),
            unmatched: Vec::new(),
        }
    }

    /// Whether any row differs
    #[must_use]
    pub fn is_different(&self) -> bool {
        !(self.changed.is_empty()
            && self.removed.is_empty()
            && self.added.is_empty()
            && self.unmatched.is_empty())
    }

    /// Key column index in `columns` (keyed mode only)
    #[must_use]
    pub fn key_index(&self) -> Option<usize> {
        match &self.mode {
            DiffMode::Keyed { key_column } => self.columns.iter().position(|c| c == key_column),
            DiffMode::RowSet => None,
        }
    }
}

/// Result of a tabular comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularDiff {
    /// Whether both inputs have the same ordered sheet names
    pub sheet_names_match: bool,
    /// Sheet names of the source workbook (empty for single tables)
    pub source_sheets: Vec<String>,
    /// Sheet names of the target workbook (empty for single tables)
    pub target_sheets: Vec<String>,
    /// Per-sheet results; empty when sheet names do not match
    pub sheets: Vec<SheetDiff>,
}

impl TabularDiff {
    /// Wrap a single-table comparison
    #[must_use]
    pub fn single(sheet: SheetDiff) -> Self {
        Self {
            sheet_names_match: true,
            source_sheets: Vec::new(),
            target_sheets: Vec::new(),
            sheets: vec![sheet],
        }
    }

    /// Whether the inputs differ
    #[must_use]
    pub fn is_different(&self) -> bool {
        !self.sheet_names_match || self.sheets.iter().any(SheetDiff::is_different)
    }

    /// Total changed rows across sheets
    #[must_use]
    pub fn changed_count(&self) -> usize {
        self.sheets.iter().map(|s| s.changed.len()).sum()
    }
}

/// Compare two tables
///
/// Both tables must have the same shape and at least one row between
/// them. When `key_column` exists on both sides rows are paired by key;
/// otherwise `require_key` decides between [`DiffqaError::KeyColumnNotFound`]
/// and row-set matching.
pub fn compare_tables(
    source: &Table,
    target: &Table,
    key_column: &str,
    require_key: bool,
) -> DiffqaResult<SheetDiff> {
    if let Err(err) = check_shape(source, target) {
        tracing::warn!("{err}");
        return Err(err);
    }

    let aligned = align_columns(source, target, key_column);

    match (source.column_index(key_column), target.column_index(key_column)) {
        (Some(key), Some(_)) => Ok(keyed_diff(source, &aligned, key, key_column)),
        (source_key, _) if require_key => {
            let side = if source_key.is_none() { "source" } else { "target" };
            let err = DiffqaError::KeyColumnNotFound {
                column: key_column.to_string(),
                side,
            };
            tracing::warn!("{err}");
            Err(err)
        }
        _ => {
            tracing::debug!(key_column, "key column absent, comparing row sets");
            Ok(row_set_diff(source, &aligned))
        }
    }
}

/// Compare two workbooks sheet by sheet
///
/// Different ordered sheet-name lists make the result different without
/// per-sheet detail.
pub fn compare_workbooks(
    source: &[Sheet],
    target: &[Sheet],
    key_column: &str,
    require_key: bool,
) -> DiffqaResult<TabularDiff> {
    let source_sheets: Vec<String> = source.iter().map(|s| s.name.clone()).collect();
    let target_sheets: Vec<String> = target.iter().map(|s| s.name.clone()).collect();

    if source_sheets != target_sheets {
        tracing::warn!(
            source = ?source_sheets,
            target = ?target_sheets,
            "sheet names differ"
        );
        return Ok(TabularDiff {
            sheet_names_match: false,
            source_sheets,
            target_sheets,
            sheets: Vec::new(),
        });
    }

    if source
        .iter()
        .zip(target)
        .all(|(a, b)| a.table.is_empty() && b.table.is_empty())
    {
        tracing::warn!("every sheet is empty on both sides");
        return Err(DiffqaError::EmptyDataset);
    }

    let mut sheets = Vec::with_capacity(source.len());
    for (a, b) in source.iter().zip(target) {
        if a.table.is_empty() && b.table.is_empty() {
            tracing::warn!(sheet = %a.name, "sheet is empty on both sides, skipping");
            let mode = if require_key {
                DiffMode::Keyed {
                    key_column: key_column.to_string(),
                }
            } else {
                DiffMode::RowSet
            };
            let mut diff = SheetDiff::empty(a.table.columns.clone(), mode);
            diff.name = Some(a.name.clone());
            sheets.push(diff);
            continue;
        }
        let mut diff = compare_tables(&a.table, &b.table, key_column, require_key)?;
        tracing::debug!(sheet = %a.name, different = diff.is_different(), "compared sheet");
        diff.name = Some(a.name.clone());
        sheets.push(diff);
    }

    Ok(TabularDiff {
        sheet_names_match: true,
        source_sheets,
        target_sheets,
        sheets,
    })
}

fn check_shape(source: &Table, target: &Table) -> DiffqaResult<()> {
    if source.is_empty() && target.is_empty() {
        return Err(DiffqaError::EmptyDataset);
    }
    if source.row_count() != target.row_count() {
        return Err(DiffqaError::RowCountMismatch {
            source_rows: source.row_count(),
            target_rows: target.row_count(),
        });
    }
    if source.column_count() != target.column_count() {
        return Err(DiffqaError::ColumnCountMismatch {
            source_columns: source.column_count(),
            target_columns: target.column_count(),
        });
    }
    Ok(())
}

/// Reorder target columns onto source order by header name
///
/// Falls back to positional order when the header multisets differ. The
/// key column stays paired by name in the fallback.
fn align_columns(source: &Table, target: &Table, key_column: &str) -> Vec<Vec<Cell>> {
    let order = header_order(source, target).unwrap_or_else(|| {
        tracing::warn!(
            source = ?source.columns,
            target = ?target.columns,
            "column headers differ, aligning by position"
        );
        positional_order(source, target, key_column)
    });

    if order.iter().enumerate().all(|(i, &j)| i == j) {
        return target.rows.clone();
    }
    tracing::debug!(?order, "reordered target columns");
    target
        .rows
        .iter()
        .map(|row| order.iter().map(|&j| row[j].clone()).collect())
        .collect()
}

/// Target column index for each source column, matched by name
fn header_order(source: &Table, target: &Table) -> Option<Vec<usize>> {
    let mut used = vec![false; target.column_count()];
    let mut order = Vec::with_capacity(source.column_count());
    for name in &source.columns {
        let i = (0..target.column_count()).find(|&i| !used[i] && target.columns[i] == *name)?;
        used[i] = true;
        order.push(i);
    }
    Some(order)
}

/// Positional order with the target key column moved under the source key
fn positional_order(source: &Table, target: &Table, key_column: &str) -> Vec<usize> {
    let identity: Vec<usize> = (0..target.column_count()).collect();
    let (Some(source_key), Some(target_key)) =
        (source.column_index(key_column), target.column_index(key_column))
    else {
        return identity;
    };

    let mut rest = identity.into_iter().filter(|&j| j != target_key);
    (0..source.column_count())
        .map(|i| {
            if i == source_key {
                target_key
            } else {
                rest.next().unwrap_or(target_key)
            }
        })
        .collect()
}

/// Row indices sorted by key, descending; equal keys keep input order
fn sorted_by_key_desc(rows: &[Vec<Cell>], key: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..rows.len()).collect();
    indices.sort_by(|&a, &b| rows[b][key].total_cmp(&rows[a][key]));
    indices
}

fn keyed_diff(
    source: &Table,
    target_rows: &[Vec<Cell>],
    key: usize,
    key_column: &str,
) -> SheetDiff {
    let source_order = sorted_by_key_desc(&source.rows, key);
    let target_order = sorted_by_key_desc(target_rows, key);

    let mut pending: HashMap<String, VecDeque<usize>> = HashMap::new();
    for &t in &target_order {
        pending
            .entry(target_rows[t][key].fingerprint())
            .or_default()
            .push_back(t);
    }

    let mut diff = SheetDiff::empty(
        source.columns.clone(),
        DiffMode::Keyed {
            key_column: key_column.to_string(),
        },
    );
    let mut paired = vec![false; target_rows.len()];

    for &s in &source_order {
        let row = &source.rows[s];
        let partner = pending
            .get_mut(&row[key].fingerprint())
            .and_then(VecDeque::pop_front);
        let Some(t) = partner else {
            diff.removed.push(row.clone());
            continue;
        };
        paired[t] = true;

        let other = &target_rows[t];
        let changes: Vec<CellChange> = source
            .columns
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != key && row[i] != other[i])
            .map(|(i, column)| CellChange {
                column: column.clone(),
                source: row[i].clone(),
                target: other[i].clone(),
            })
            .collect();

        if !changes.is_empty() {
            diff.changed.push(ChangedRow {
                key: row[key].clone(),
                source: row.clone(),
                target: other.clone(),
                changes,
            });
        }
    }

    diff.added = target_order
        .iter()
        .filter(|&&t| !paired[t])
        .map(|&t| target_rows[t].clone())
        .collect();

    diff
}

fn row_fingerprint(row: &[Cell]) -> Vec<String> {
    row.iter().map(Cell::fingerprint).collect()
}

fn row_set_diff(source: &Table, target_rows: &[Vec<Cell>]) -> SheetDiff {
    let mut pending: HashMap<Vec<String>, VecDeque<usize>> = HashMap::new();
    for (i, row) in source.rows.iter().enumerate() {
        pending.entry(row_fingerprint(row)).or_default().push_back(i);
    }

    let mut matched = vec![false; source.row_count()];
    let mut target_only = Vec::new();
    for row in target_rows {
        match pending
            .get_mut(&row_fingerprint(row))
            .and_then(VecDeque::pop_front)
        {
            Some(s) => matched[s] = true,
            None => target_only.push(row.clone()),
        }
    }

    let mut diff = SheetDiff::empty(source.columns.clone(), DiffMode::RowSet);
    diff.unmatched = source
        .rows
        .iter()
        .zip(&matched)
        .filter(|(_, matched)| !**matched)
        .map(|(row, _)| UnmatchedRow {
            side: Side::Source,
            cells: row.clone(),
        })
        .chain(target_only.into_iter().map(|cells| UnmatchedRow {
            side: Side::Target,
            cells,
        }))
        .collect();
    diff
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn accounts() -> Table {
        Table::new(["id", "name", "balance"])
            .with_row([Cell::Int(1), Cell::text("alice"), Cell::Float(10.5)])
            .with_row([Cell::Int(2), Cell::text("bob"), Cell::Float(3.0)])
            .with_row([Cell::Int(3), Cell::text("carol"), Cell::Float(0.0)])
    }

    #[test]
    fn test_identical_tables() {
        let diff = compare_tables(&accounts(), &accounts(), "id", true).unwrap();
        assert!(!diff.is_different());
        assert!(diff.changed.is_empty());
        assert_eq!(diff.mode, DiffMode::Keyed { key_column: "id".into() });
    }

    #[test]
    fn test_single_cell_change() {
        let mut target = accounts();
        target.rows[1][2] = Cell::Float(4.0);

        let diff = compare_tables(&accounts(), &target, "id", true).unwrap();
        assert!(diff.is_different());
        assert_eq!(diff.changed.len(), 1);
        assert!(diff.removed.is_empty());
        assert!(diff.added.is_empty());

        let row = &diff.changed[0];
        assert_eq!(row.key, Cell::Int(2));
        assert_eq!(row.changes.len(), 1);
        assert_eq!(row.changes[0].column, "balance");
        assert_eq!(row.changes[0].source, Cell::Float(3.0));
        assert_eq!(row.changes[0].target, Cell::Float(4.0));
        assert!(row.is_changed(2));
        assert!(!row.is_changed(1));
    }

    #[test]
    fn test_row_order_is_irrelevant() {
        let source = accounts();
        let mut target = accounts();
        target.rows.reverse();
        let diff = compare_tables(&source, &target, "id", true).unwrap();
        assert!(!diff.is_different());
    }

    #[test]
    fn test_removed_and_added_keys() {
        let mut target = accounts();
        target.rows[2][0] = Cell::Int(9);

        let diff = compare_tables(&accounts(), &target, "id", true).unwrap();
        assert!(diff.changed.is_empty());
        assert_eq!(diff.removed, vec![accounts().rows[2].clone()]);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0][0], Cell::Int(9));
    }

    #[test]
    fn test_changed_rows_sorted_descending() {
        let mut target = accounts();
        for row in &mut target.rows {
            row[1] = Cell::text("renamed");
        }
        let diff = compare_tables(&accounts(), &target, "id", true).unwrap();
        let keys: Vec<_> = diff.changed.iter().map(|r| r.key.clone()).collect();
        assert_eq!(keys, vec![Cell::Int(3), Cell::Int(2), Cell::Int(1)]);
    }

    #[test]
    fn test_duplicate_keys_pair_in_order() {
        let source = Table::new(["id", "v"])
            .with_row([Cell::Int(1), Cell::text("a")])
            .with_row([Cell::Int(1), Cell::text("b")]);
        let target = Table::new(["id", "v"])
            .with_row([Cell::Int(1), Cell::text("a")])
            .with_row([Cell::Int(1), Cell::text("c")]);

        let diff = compare_tables(&source, &target, "id", true).unwrap();
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.changed[0].changes[0].source, Cell::text("b"));
        assert_eq!(diff.changed[0].changes[0].target, Cell::text("c"));
    }

    #[test]
    fn test_columns_aligned_by_name() {
        let source = Table::new(["id", "name"]).with_row([Cell::Int(1), Cell::text("x")]);
        let target = Table::new(["name", "id"]).with_row([Cell::text("x"), Cell::Int(1)]);
        let diff = compare_tables(&source, &target, "id", true).unwrap();
        assert!(!diff.is_different());
    }

    #[test]
    fn test_positional_fallback_when_headers_differ() {
        let source = Table::new(["id", "name"]).with_row([Cell::Int(1), Cell::text("x")]);
        let target = Table::new(["id", "label"]).with_row([Cell::Int(1), Cell::text("y")]);
        let diff = compare_tables(&source, &target, "id", true).unwrap();
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.changed[0].changes[0].column, "name");
    }

    #[test]
    fn test_positional_fallback_keeps_key_column_by_name() {
        let source = Table::new(["id", "name", "b"])
            .with_row([Cell::Int(1), Cell::text("x"), Cell::Int(5)])
            .with_row([Cell::Int(2), Cell::text("y"), Cell::Int(6)]);
        let target = Table::new(["b2", "id", "name"])
            .with_row([Cell::Int(5), Cell::Int(1), Cell::text("x")])
            .with_row([Cell::Int(6), Cell::Int(2), Cell::text("y")]);

        let diff = compare_tables(&source, &target, "id", true).unwrap();
        assert!(diff.removed.is_empty());
        assert!(diff.added.is_empty());
        assert_eq!(diff.changed.len(), 2);
        assert_eq!(diff.changed[0].key, Cell::Int(2));
        assert_eq!(diff.changed[0].changes.len(), 2);
        assert_eq!(diff.changed[0].changes[0].column, "name");
        assert_eq!(diff.changed[0].changes[0].target, Cell::Int(6));
    }

    #[test]
    fn test_positional_order_moves_key_only() {
        let source = Table::new(["id", "name", "b"]);
        let target = Table::new(["b2", "id", "name"]);
        assert_eq!(positional_order(&source, &target, "id"), vec![1, 0, 2]);
        assert_eq!(positional_order(&source, &target, "sku"), vec![0, 1, 2]);
    }

    #[test]
    fn test_custom_key_column() {
        let source = Table::new(["account number", "owner"])
            .with_row([Cell::text("A-1"), Cell::text("dana")]);
        let target = Table::new(["account number", "owner"])
            .with_row([Cell::text("A-1"), Cell::text("eli")]);
        let diff = compare_tables(&source, &target, "account number", true).unwrap();
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.key_index(), Some(0));
    }

    #[test]
    fn test_numeric_keys_match_across_types() {
        let source = Table::new(["id", "v"]).with_row([Cell::Float(5.0), Cell::Int(1)]);
        let target = Table::new(["id", "v"]).with_row([Cell::Int(5), Cell::Int(1)]);
        let diff = compare_tables(&source, &target, "id", true).unwrap();
        assert!(!diff.is_different());
    }

    #[test]
    fn test_key_type_change_is_different() {
        let source = Table::new(["id", "v"]).with_row([Cell::text("1"), Cell::Int(1)]);
        let target = Table::new(["id", "v"]).with_row([Cell::Int(1), Cell::Int(1)]);
        let diff = compare_tables(&source, &target, "id", true).unwrap();
        assert!(diff.is_different());
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.removed[0][0], Cell::text("1"));
    }

    #[test]
    fn test_empty_dataset() {
        let empty = Table::new(["id"]);
        let err = compare_tables(&empty, &empty, "id", true).unwrap_err();
        assert!(matches!(err, DiffqaError::EmptyDataset));
    }

    #[test]
    fn test_row_count_mismatch() {
        let mut target = accounts();
        target.rows.pop();
        let err = compare_tables(&accounts(), &target, "id", true).unwrap_err();
        assert!(matches!(
            err,
            DiffqaError::RowCountMismatch {
                source_rows: 3,
                target_rows: 2
            }
        ));
    }

    #[test]
    fn test_row_count_mismatch_with_one_side_empty() {
        let err = compare_tables(&accounts(), &Table::new(["id", "name", "balance"]), "id", true)
            .unwrap_err();
        assert!(matches!(err, DiffqaError::RowCountMismatch { .. }));
    }

    #[test]
    fn test_column_count_mismatch() {
        let source = Table::new(["id", "a"]).with_row([1_i64, 2]);
        let target = Table::new(["id", "a", "b"]).with_row([1_i64, 2, 3]);
        let err = compare_tables(&source, &target, "id", true).unwrap_err();
        assert!(matches!(err, DiffqaError::ColumnCountMismatch { .. }));
    }

    #[test]
    fn test_missing_key_required() {
        let source = Table::new(["code", "v"]).with_row([1_i64, 2]);
        let err = compare_tables(&source, &source, "id", true).unwrap_err();
        assert!(matches!(
            err,
            DiffqaError::KeyColumnNotFound { side: "source", .. }
        ));
    }

    #[test]
    fn test_row_set_mode() {
        let source = Table::new(["a", "b"])
            .with_row([1_i64, 2])
            .with_row([3_i64, 4])
            .with_row([3_i64, 4]);
        let target = Table::new(["a", "b"])
            .with_row([3_i64, 4])
            .with_row([1_i64, 2])
            .with_row([5_i64, 6]);

        let diff = compare_tables(&source, &target, "id", false).unwrap();
        assert_eq!(diff.mode, DiffMode::RowSet);
        assert!(diff.is_different());
        assert_eq!(diff.unmatched.len(), 2);
        assert_eq!(diff.unmatched[0].side, Side::Source);
        assert_eq!(diff.unmatched[0].cells, vec![Cell::Int(3), Cell::Int(4)]);
        assert_eq!(diff.unmatched[1].side, Side::Target);
        assert_eq!(diff.unmatched[1].cells, vec![Cell::Int(5), Cell::Int(6)]);
    }

    #[test]
    fn test_row_set_equal_in_any_order() {
        let source = Table::new(["a"]).with_row([1_i64]).with_row([2_i64]);
        let target = Table::new(["a"]).with_row([2_i64]).with_row([1_i64]);
        let diff = compare_tables(&source, &target, "id", false).unwrap();
        assert!(!diff.is_different());
    }

    #[test]
    fn test_workbook_sheet_names_mismatch() {
        let a = vec![Sheet {
            name: "one".into(),
            table: accounts(),
        }];
        let b = vec![Sheet {
            name: "two".into(),
            table: accounts(),
        }];
        let diff = compare_workbooks(&a, &b, "id", true).unwrap();
        assert!(!diff.sheet_names_match);
        assert!(diff.is_different());
        assert!(diff.sheets.is_empty());
    }

    #[test]
    fn test_workbook_sheet_by_sheet() {
        let mut changed = accounts();
        changed.rows[0][1] = Cell::text("alicia");
        let a = vec![
            Sheet {
                name: "first".into(),
                table: accounts(),
            },
            Sheet {
                name: "second".into(),
                table: accounts(),
            },
        ];
        let b = vec![
            Sheet {
                name: "first".into(),
                table: accounts(),
            },
            Sheet {
                name: "second".into(),
                table: changed,
            },
        ];

        let diff = compare_workbooks(&a, &b, "id", true).unwrap();
        assert!(diff.sheet_names_match);
        assert_eq!(diff.sheets.len(), 2);
        assert!(!diff.sheets[0].is_different());
        assert!(diff.sheets[1].is_different());
        assert_eq!(diff.sheets[1].name.as_deref(), Some("second"));
        assert_eq!(diff.changed_count(), 1);
    }

    #[test]
    fn test_workbook_skips_sheet_empty_on_both_sides() {
        let book = vec![
            Sheet {
                name: "data".into(),
                table: accounts(),
            },
            Sheet {
                name: "Sheet2".into(),
                table: Table::default(),
            },
        ];

        let diff = compare_workbooks(&book, &book, "id", true).unwrap();
        assert!(!diff.is_different());
        assert_eq!(diff.sheets.len(), 2);
        assert_eq!(diff.sheets[1].name.as_deref(), Some("Sheet2"));
        assert!(!diff.sheets[1].is_different());
    }

    #[test]
    fn test_workbook_all_sheets_empty() {
        let book = vec![Sheet {
            name: "Sheet1".into(),
            table: Table::new(["id"]),
        }];
        let err = compare_workbooks(&book, &book, "id", true).unwrap_err();
        assert!(matches!(err, DiffqaError::EmptyDataset));
    }

    #[test]
    fn test_comparison_is_repeatable() {
        let mut target = accounts();
        target.rows[0][2] = Cell::Float(11.0);
        let first = compare_tables(&accounts(), &target, "id", true).unwrap();
        let second = compare_tables(&accounts(), &target, "id", true).unwrap();
        assert_eq!(first, second);
    }

    fn table_strategy() -> impl Strategy<Value = (Table, Table)> {
        (1usize..6).prop_flat_map(|rows| {
            let row = || prop::collection::vec(0i64..4, 3);
            (
                prop::collection::vec(row(), rows),
                prop::collection::vec(row(), rows),
            )
                .prop_map(|(a, b)| {
                    let mut source = Table::new(["id", "x", "y"]);
                    let mut target = Table::new(["id", "x", "y"]);
                    for r in a {
                        source.push_row(r);
                    }
                    for r in b {
                        target.push_row(r);
                    }
                    (source, target)
                })
        })
    }

    proptest! {
        #[test]
        fn prop_keyed_symmetric((a, b) in table_strategy()) {
            let ab = compare_tables(&a, &b, "id", true).unwrap();
            let ba = compare_tables(&b, &a, "id", true).unwrap();
            prop_assert_eq!(ab.is_different(), ba.is_different());
            prop_assert_eq!(ab.removed.len(), ba.added.len());
        }

        #[test]
        fn prop_row_set_symmetric((a, b) in table_strategy()) {
            let ab = compare_tables(&a, &b, "missing", false).unwrap();
            let ba = compare_tables(&b, &a, "missing", false).unwrap();
            prop_assert_eq!(ab.is_different(), ba.is_different());
            prop_assert_eq!(ab.unmatched.len(), ba.unmatched.len());
        }

        #[test]
        fn prop_self_comparison_equal((a, _b) in table_strategy()) {
            let diff = compare_tables(&a, &a, "id", true).unwrap();
            prop_assert!(!diff.is_different());
        }
    }
}
