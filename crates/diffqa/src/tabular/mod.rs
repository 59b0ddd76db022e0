//! Spreadsheet and delimited-text comparison.
//!
//! Tables are decoded by [`loader`], then compared by [`diff`]:
//!
//! - **Keyed**: rows are paired by a unique key column (default `"id"`)
//!   after both tables are sorted by that key, descending.
//! - **Row set**: delimited text without the key column is compared as a
//!   multiset of rows.
//!
//! Workbooks are compared sheet by sheet once their sheet names agree.

pub mod diff;
pub mod loader;
pub mod table;

pub use diff::{
    compare_tables, compare_workbooks, CellChange, ChangedRow, DiffMode, SheetDiff, Side,
    TabularDiff, UnmatchedRow,
};
pub use loader::{load_table, load_workbook, parse_html_table, read_delimited};
pub use table::{Cell, Sheet, Table};

use crate::format::{classify_pair, ComparisonKind};
use crate::result::{DiffqaError, DiffqaResult};
use std::path::Path;

/// Default key column
pub const DEFAULT_KEY_COLUMN: &str = "id";

/// Compares tables, workbooks and tabular files
#[derive(Debug, Clone)]
pub struct TabularComparator {
    key_column: String,
}

impl Default for TabularComparator {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_COLUMN)
    }
}

impl TabularComparator {
    /// Create a comparator keyed on `key_column`
    #[must_use]
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
        }
    }

    /// Key column name
    #[must_use]
    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Compare two in-memory tables; falls back to row-set mode when the
    /// key column is absent
    pub fn compare_tables(&self, source: &Table, target: &Table) -> DiffqaResult<TabularDiff> {
        compare_tables(source, target, &self.key_column, false).map(TabularDiff::single)
    }

    /// Compare two workbooks; every sheet must carry the key column
    pub fn compare_workbooks(
        &self,
        source: &[Sheet],
        target: &[Sheet],
    ) -> DiffqaResult<TabularDiff> {
        compare_workbooks(source, target, &self.key_column, true)
    }

    /// Compare two spreadsheet or delimited-text files of the same kind
    pub fn compare_files(
        &self,
        source: impl AsRef<Path>,
        target: impl AsRef<Path>,
    ) -> DiffqaResult<TabularDiff> {
        let (source, target) = (source.as_ref(), target.as_ref());
        match classify_pair(source, target)? {
            ComparisonKind::Spreadsheet => {
                let a = load_workbook(source)?;
                let b = load_workbook(target)?;
                self.compare_workbooks(&a, &b)
            }
            ComparisonKind::DelimitedText => {
                let a = load_table(source)?;
                let b = load_table(target)?;
                self.compare_tables(&a, &b)
            }
            other => Err(DiffqaError::unsupported(format!(
                "{other} files are not tabular"
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use std::path::PathBuf;

    const ACCOUNTS: &[(&str, &str, f64)] = &[
        ("1001", "alice", 250.0),
        ("1002", "bob", 75.5),
        ("1003", "carol", 0.0),
    ];

    fn write_workbook(dir: &Path, name: &str, rows: &[(&str, &str, f64)]) -> PathBuf {
        let path = dir.join(name);
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("accounts").unwrap();
        sheet.write_string(0, 0, "account number").unwrap();
        sheet.write_string(0, 1, "owner").unwrap();
        sheet.write_string(0, 2, "balance").unwrap();
        for (i, (id, owner, balance)) in rows.iter().enumerate() {
            let r = u32::try_from(i + 1).unwrap();
            sheet.write_string(r, 0, *id).unwrap();
            sheet.write_string(r, 1, *owner).unwrap();
            sheet.write_number(r, 2, *balance).unwrap();
        }
        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn test_default_key() {
        assert_eq!(TabularComparator::default().key_column(), "id");
    }

    #[test]
    fn test_one_changed_cell_in_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let mut edited = ACCOUNTS.to_vec();
        edited[1].2 = 80.0;
        let a = write_workbook(dir.path(), "before.xlsx", ACCOUNTS);
        let b = write_workbook(dir.path(), "after.xlsx", &edited);

        let diff = TabularComparator::new("account number")
            .compare_files(&a, &b)
            .unwrap();

        assert!(diff.is_different());
        assert_eq!(diff.sheets.len(), 1);
        let sheet = &diff.sheets[0];
        assert_eq!(sheet.changed.len(), 1);
        assert_eq!(sheet.changed[0].key, Cell::text("1002"));
        assert!(sheet.removed.is_empty());
        assert!(sheet.added.is_empty());
    }

    #[test]
    fn test_identical_workbooks() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_workbook(dir.path(), "a.xlsx", ACCOUNTS);
        let b = write_workbook(dir.path(), "b.xlsx", ACCOUNTS);
        let diff = TabularComparator::new("account number")
            .compare_files(&a, &b)
            .unwrap();
        assert!(!diff.is_different());
        assert!(diff.sheets[0].changed.is_empty());
    }

    #[test]
    fn test_workbook_requires_key() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_workbook(dir.path(), "a.xlsx", ACCOUNTS);
        let err = TabularComparator::default().compare_files(&a, &a).unwrap_err();
        assert!(matches!(err, DiffqaError::KeyColumnNotFound { .. }));
    }

    #[test]
    fn test_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        std::fs::write(&a, "id,name\n1,x\n2,y\n").unwrap();
        std::fs::write(&b, "name,id\ny,2\nz,1\n").unwrap();

        let diff = TabularComparator::default().compare_files(&a, &b).unwrap();
        assert!(diff.is_different());
        let sheet = &diff.sheets[0];
        assert_eq!(sheet.changed.len(), 1);
        assert_eq!(sheet.changed[0].changes[0].column, "name");
    }

    #[test]
    fn test_csv_without_key_uses_row_set() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.tsv");
        let b = dir.path().join("b.tsv");
        std::fs::write(&a, "code\tqty\nA\t1\nB\t2\n").unwrap();
        std::fs::write(&b, "code\tqty\nB\t2\nA\t1\n").unwrap();

        let diff = TabularComparator::default().compare_files(&a, &b).unwrap();
        assert_eq!(diff.sheets[0].mode, DiffMode::RowSet);
        assert!(!diff.is_different());
    }

    #[test]
    fn test_row_count_mismatch_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        std::fs::write(&a, "id\n1\n2\n").unwrap();
        std::fs::write(&b, "id\n1\n").unwrap();
        let err = TabularComparator::default().compare_files(&a, &b).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_mixed_tabular_kinds_rejected() {
        let err = TabularComparator::default()
            .compare_files("a.csv", "b.xlsx")
            .unwrap_err();
        assert!(matches!(err, DiffqaError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_non_tabular_rejected() {
        let err = TabularComparator::default()
            .compare_files("a.json", "b.json")
            .unwrap_err();
        assert!(matches!(err, DiffqaError::UnsupportedFormat { .. }));
    }
}
