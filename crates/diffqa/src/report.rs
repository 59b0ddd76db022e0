//! Diff report writers.
//!
//! Every writer removes an existing file at the destination first, so a
//! report never mixes content from two runs. Empty diffs still produce a
//! report (a zero-block text file or headers-only sheets).

use crate::comparator::DiffResult;
use crate::image_diff::ImageDiff;
use crate::json_diff::{JsonDiff, JsonDifference};
use crate::result::{DiffqaError, DiffqaResult};
use crate::tabular::{Cell, DiffMode, SheetDiff, TabularDiff};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

/// Separator between before and after values in a changed cell
pub const CHANGE_ARROW: &str = " ---> ";

/// Excel's sheet-name length limit
pub const MAX_SHEET_NAME: usize = 31;

/// Highest row index a worksheet accepts
const MAX_ROW: u32 = 1_048_575;

/// Write the report matching the result's kind
///
/// Image results write the visual diff PNG; nothing is written when the
/// comparison did not produce one.
pub fn write_report(result: &DiffResult, path: impl AsRef<Path>) -> DiffqaResult<()> {
    let path = path.as_ref();
    match result {
        DiffResult::Json(diff) => write_json_report(diff, path),
        DiffResult::Tabular(diff) => write_tabular_report(diff, path),
        DiffResult::Image(diff) => write_visual_diff(diff, path).map(|_| ()),
    }
}

/// Render JSON differences as text blocks
///
/// ```text
/// path: b
///   source: 1
///   target: 2
///
/// ```
#[must_use]
pub fn render_json_report(diff: &JsonDiff) -> String {
    let mut out = String::new();
    for difference in &diff.differences {
        let _ = writeln!(out, "path: {}", difference.path());
        match difference {
            JsonDifference::MissingInTarget { .. } => out.push_str("  missing in target\n"),
            JsonDifference::MissingInSource { .. } => out.push_str("  missing in source\n"),
            JsonDifference::ValueMismatch { source, target, .. } => {
                let _ = writeln!(out, "  source: {source}");
                let _ = writeln!(out, "  target: {target}");
            }
        }
        out.push('\n');
    }
    out
}

/// Write a JSON diff as a text report
pub fn write_json_report(diff: &JsonDiff, path: impl AsRef<Path>) -> DiffqaResult<()> {
    let path = path.as_ref();
    prepare_destination(path)?;
    std::fs::write(path, render_json_report(diff))
        .map_err(|e| DiffqaError::report_write(path, e.to_string()))?;
    tracing::info!(path = %path.display(), differences = diff.len(), "wrote JSON report");
    Ok(())
}

/// Write a PNG visual diff; returns whether an image was written
pub fn write_visual_diff(diff: &ImageDiff, path: impl AsRef<Path>) -> DiffqaResult<bool> {
    let path = path.as_ref();
    prepare_destination(path)?;
    let Some(png) = &diff.diff_image else {
        tracing::debug!(path = %path.display(), "no visual diff to write");
        return Ok(false);
    };
    std::fs::write(path, png).map_err(|e| DiffqaError::report_write(path, e.to_string()))?;
    tracing::info!(path = %path.display(), "wrote visual diff");
    Ok(true)
}

/// Write a tabular diff as a workbook
///
/// Keyed diffs get `changed`, `removed` and `added` sheets; row-set diffs
/// get a single `difference` sheet with a `version` column. With more than
/// one compared sheet each name is prefixed with the source sheet name.
pub fn write_tabular_report(diff: &TabularDiff, path: impl AsRef<Path>) -> DiffqaResult<()> {
    let path = path.as_ref();
    prepare_destination(path)?;
    let xlsx_err = |e: XlsxError| DiffqaError::report_write(path, e.to_string());

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let mut names = SheetNames::default();

    if !diff.sheet_names_match {
        let mut sheet = Worksheet::new();
        sheet
            .set_name(names.claim(None, "sheet_names"))
            .map_err(xlsx_err)?;
        sheet
            .write_string_with_format(0, 0, "source", &header)
            .map_err(xlsx_err)?;
        sheet
            .write_string_with_format(0, 1, "target", &header)
            .map_err(xlsx_err)?;
        let rows = diff.source_sheets.len().max(diff.target_sheets.len());
        for i in 0..rows {
            let r = row_index(i + 1, path)?;
            if let Some(name) = diff.source_sheets.get(i) {
                sheet.write_string(r, 0, name).map_err(xlsx_err)?;
            }
            if let Some(name) = diff.target_sheets.get(i) {
                sheet.write_string(r, 1, name).map_err(xlsx_err)?;
            }
        }
        workbook.push_worksheet(sheet);
    }

    let prefixed = diff.sheets.len() > 1;
    for sheet_diff in &diff.sheets {
        let prefix = if prefixed { sheet_diff.name.as_deref() } else { None };
        for sheet in build_sheets(sheet_diff, prefix, &mut names, &header, path)? {
            workbook.push_worksheet(sheet);
        }
    }

    workbook.save(path).map_err(xlsx_err)?;
    tracing::info!(
        path = %path.display(),
        sheets = diff.sheets.len(),
        changed = diff.changed_count(),
        "wrote tabular report"
    );
    Ok(())
}

fn build_sheets(
    diff: &SheetDiff,
    prefix: Option<&str>,
    names: &mut SheetNames,
    header: &Format,
    path: &Path,
) -> DiffqaResult<Vec<Worksheet>> {
    let xlsx_err = |e: XlsxError| DiffqaError::report_write(path, e.to_string());

    match &diff.mode {
        DiffMode::Keyed { .. } => {
            let mut changed = Worksheet::new();
            changed
                .set_name(names.claim(prefix, "changed"))
                .map_err(xlsx_err)?;
            write_header(&mut changed, &diff.columns, Some("has_change"), header, path)?;
            for (i, row) in diff.changed.iter().enumerate() {
                let r = row_index(i + 1, path)?;
                for (c, cell) in row.source.iter().enumerate() {
                    let col = col_index(c, path)?;
                    if row.is_changed(c) {
                        let target = row.target.get(c).cloned().unwrap_or_default();
                        changed
                            .write_string(r, col, format!("{cell}{CHANGE_ARROW}{target}"))
                            .map_err(xlsx_err)?;
                    } else {
                        write_cell(&mut changed, r, col, cell).map_err(xlsx_err)?;
                    }
                }
                let flag = col_index(diff.columns.len(), path)?;
                changed.write_boolean(r, flag, true).map_err(xlsx_err)?;
            }

            let removed = rows_sheet(
                names.claim(prefix, "removed"),
                &diff.columns,
                &diff.removed,
                header,
                path,
            )?;
            let added = rows_sheet(
                names.claim(prefix, "added"),
                &diff.columns,
                &diff.added,
                header,
                path,
            )?;
            Ok(vec![changed, removed, added])
        }
        DiffMode::RowSet => {
            let mut sheet = Worksheet::new();
            sheet
                .set_name(names.claim(prefix, "difference"))
                .map_err(xlsx_err)?;
            write_header(&mut sheet, &diff.columns, Some("version"), header, path)?;
            for (i, row) in diff.unmatched.iter().enumerate() {
                let r = row_index(i + 1, path)?;
                for (c, cell) in row.cells.iter().enumerate() {
                    write_cell(&mut sheet, r, col_index(c, path)?, cell).map_err(xlsx_err)?;
                }
                let version = col_index(diff.columns.len(), path)?;
                sheet
                    .write_string(r, version, row.side.name())
                    .map_err(xlsx_err)?;
            }
            Ok(vec![sheet])
        }
    }
}

fn rows_sheet(
    name: String,
    columns: &[String],
    rows: &[Vec<Cell>],
    header: &Format,
    path: &Path,
) -> DiffqaResult<Worksheet> {
    let xlsx_err = |e: XlsxError| DiffqaError::report_write(path, e.to_string());
    let mut sheet = Worksheet::new();
    sheet.set_name(name).map_err(xlsx_err)?;
    write_header(&mut sheet, columns, None, header, path)?;
    for (i, row) in rows.iter().enumerate() {
        let r = row_index(i + 1, path)?;
        for (c, cell) in row.iter().enumerate() {
            write_cell(&mut sheet, r, col_index(c, path)?, cell).map_err(xlsx_err)?;
        }
    }
    Ok(sheet)
}

/// Bold header row, plus an optional trailing column
fn write_header(
    sheet: &mut Worksheet,
    columns: &[String],
    extra: Option<&str>,
    format: &Format,
    path: &Path,
) -> DiffqaResult<()> {
    let names = columns.iter().map(String::as_str).chain(extra);
    for (c, name) in names.enumerate() {
        sheet
            .write_string_with_format(0, col_index(c, path)?, name, format)
            .map_err(|e| DiffqaError::report_write(path, e.to_string()))?;
    }
    Ok(())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<(), XlsxError> {
    match cell {
        Cell::Empty => {}
        Cell::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        Cell::Int(n) => {
            sheet.write_number(row, col, *n as f64)?;
        }
        Cell::Float(f) => {
            sheet.write_number(row, col, *f)?;
        }
        Cell::Text(s) => {
            sheet.write_string(row, col, s)?;
        }
    }
    Ok(())
}

fn row_index(i: usize, path: &Path) -> DiffqaResult<u32> {
    u32::try_from(i)
        .ok()
        .filter(|&r| r <= MAX_ROW)
        .ok_or_else(|| DiffqaError::report_write(path, format!("row {i} exceeds sheet limit")))
}

fn col_index(i: usize, path: &Path) -> DiffqaResult<u16> {
    u16::try_from(i)
        .map_err(|_| DiffqaError::report_write(path, format!("column {i} exceeds sheet limit")))
}

/// Make a valid worksheet name: forbidden characters become `_` and the
/// result is at most 31 characters
#[must_use]
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    if cleaned.is_empty() {
        "sheet".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Hands out unique sheet names within one workbook
#[derive(Debug, Default)]
struct SheetNames {
    used: HashSet<String>,
}

impl SheetNames {
    fn claim(&mut self, prefix: Option<&str>, group: &str) -> String {
        let base = match prefix {
            Some(prefix) => {
                let room = MAX_SHEET_NAME.saturating_sub(group.len() + 1);
                let short: String = prefix.chars().take(room).collect();
                sanitize_sheet_name(&format!("{short}_{group}"))
            }
            None => sanitize_sheet_name(group),
        };

        let mut name = base.clone();
        let mut n = 2;
        // Excel compares sheet names case-insensitively
        while self.used.contains(&name.to_lowercase()) {
            let suffix = format!("~{n}");
            let keep = MAX_SHEET_NAME.saturating_sub(suffix.len());
            name = format!("{}{suffix}", base.chars().take(keep).collect::<String>());
            n += 1;
        }
        self.used.insert(name.to_lowercase());
        name
    }
}

/// Remove a stale report and create missing parent directories
fn prepare_destination(path: &Path) -> DiffqaResult<()> {
    if path.exists() {
        tracing::debug!(path = %path.display(), "removing stale report");
        std::fs::remove_file(path).map_err(|e| DiffqaError::report_write(path, e.to_string()))?;
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| DiffqaError::report_write(path, e.to_string()))?;
    }
    Ok(())
}
