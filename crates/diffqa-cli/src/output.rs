//! Output formatting

use console::{style, Term};
use diffqa::{DiffResult, SheetDiff, TabularDiff};
use std::fmt::Write as _;

/// Maximum changed rows listed per sheet in text output
const MAX_LISTED_ROWS: usize = 20;

/// Styled status lines on stderr
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            use_color,
            quiet,
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "SAME".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "DIFF".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        let prefix = if self.use_color {
            style("error:").red().bold().to_string()
        } else {
            "error:".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }
}

/// Human-readable detail for a comparison result
#[must_use]
pub fn render_text(result: &DiffResult) -> String {
    let mut out = String::new();
    match result {
        DiffResult::Image(diff) => {
            let _ = writeln!(
                out,
                "similarity: {:.6}\nmse: {:.4}\nidentical: {}",
                diff.similarity, diff.mse, diff.identical
            );
            if diff.resized {
                let (sw, sh) = diff.source_dimensions;
                let (tw, th) = diff.target_dimensions;
                let _ = writeln!(out, "resized: {sw}x{sh} vs {tw}x{th}");
            }
        }
        DiffResult::Json(diff) => {
            for difference in &diff.differences {
                let _ = writeln!(out, "{difference}");
            }
        }
        DiffResult::Tabular(diff) => render_tabular(&mut out, diff),
    }
    out
}

fn render_tabular(out: &mut String, diff: &TabularDiff) {
    if !diff.sheet_names_match {
        let _ = writeln!(
            out,
            "sheet names differ: [{}] vs [{}]",
            diff.source_sheets.join(", "),
            diff.target_sheets.join(", ")
        );
        return;
    }
    for sheet in &diff.sheets {
        render_sheet(out, sheet);
    }
}

fn render_sheet(out: &mut String, sheet: &SheetDiff) {
    let label = sheet.name.as_deref().unwrap_or("table");
    if sheet.unmatched.is_empty() {
        let _ = writeln!(
            out,
            "{label}: {} changed, {} removed, {} added",
            sheet.changed.len(),
            sheet.removed.len(),
            sheet.added.len()
        );
    } else {
        let _ = writeln!(out, "{label}: {} unmatched rows", sheet.unmatched.len());
    }

    for row in sheet.changed.iter().take(MAX_LISTED_ROWS) {
        let cells: Vec<String> = row
            .changes
            .iter()
            .map(|c| format!("{} {} ---> {}", c.column, c.source, c.target))
            .collect();
        let _ = writeln!(out, "  key {}: {}", row.key, cells.join("; "));
    }
    if sheet.changed.len() > MAX_LISTED_ROWS {
        let _ = writeln!(out, "  ... {} more", sheet.changed.len() - MAX_LISTED_ROWS);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use diffqa::{compare_json_str, Cell, ComparisonInput, CompareEngine, Table};

    #[test]
    fn test_reporter_quiet() {
        let reporter = Reporter::new(false, true);
        assert!(reporter.quiet);
        reporter.success("hidden");
        reporter.failure("shown");
    }

    #[test]
    fn test_render_json() {
        let diff = compare_json_str(r#"{"a":1}"#, r#"{"a":2,"b":3}"#).unwrap();
        let text = render_text(&DiffResult::Json(diff));
        assert_eq!(text, "a: 1 != 2\nb: missing in source\n");
    }

    #[test]
    fn test_render_tabular() {
        let source = Table::new(["id", "v"]).with_row([Cell::Int(1), Cell::text("a")]);
        let target = Table::new(["id", "v"]).with_row([Cell::Int(1), Cell::text("b")]);
        let result = CompareEngine::default()
            .run(ComparisonInput::tables(source, target))
            .unwrap();
        let text = render_text(&result);
        assert!(text.contains("table: 1 changed, 0 removed, 0 added"));
        assert!(text.contains("key 1: v a ---> b"));
    }
}
