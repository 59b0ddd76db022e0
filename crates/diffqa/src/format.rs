//! Format classification by file extension.
//!
//! Routes a pair of paths to a comparator. Lookup uses the lowercased final
//! suffix, so `Shot.PNG` and `report.v2.json` classify as expected.

use crate::result::{DiffqaError, DiffqaResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Comparator category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonKind {
    /// Raster image (PNG, JPEG)
    Image,
    /// Structured JSON data
    Json,
    /// Multi-sheet workbook (XLS, XLSX)
    Spreadsheet,
    /// Single-table text formats (CSV, TSV, HTML, HDF)
    DelimitedText,
}

const EXTENSION_TABLE: &[(&str, ComparisonKind)] = &[
    ("jpg", ComparisonKind::Image),
    ("jpeg", ComparisonKind::Image),
    ("png", ComparisonKind::Image),
    ("json", ComparisonKind::Json),
    ("xls", ComparisonKind::Spreadsheet),
    ("xlsx", ComparisonKind::Spreadsheet),
    ("csv", ComparisonKind::DelimitedText),
    ("tsv", ComparisonKind::DelimitedText),
    ("hdf", ComparisonKind::DelimitedText),
    ("html", ComparisonKind::DelimitedText),
];

impl ComparisonKind {
    /// Get display name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Json => "json",
            Self::Spreadsheet => "spreadsheet",
            Self::DelimitedText => "delimited-text",
        }
    }

    /// Extensions mapped to this kind
    #[must_use]
    pub fn extensions(self) -> Vec<&'static str> {
        EXTENSION_TABLE
            .iter()
            .filter(|(_, kind)| *kind == self)
            .map(|(ext, _)| *ext)
            .collect()
    }

    /// Whether this kind is handled by the tabular comparator
    #[must_use]
    pub const fn is_tabular(self) -> bool {
        matches!(self, Self::Spreadsheet | Self::DelimitedText)
    }
}

impl fmt::Display for ComparisonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercased final extension of a path, if any
#[must_use]
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Map a bare extension (without the dot, any case) to its kind
#[must_use]
pub fn kind_for_extension(ext: &str) -> Option<ComparisonKind> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    EXTENSION_TABLE
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, kind)| *kind)
}

/// Classify a single path
pub fn classify(path: impl AsRef<Path>) -> DiffqaResult<ComparisonKind> {
    let path = path.as_ref();
    let ext = extension_of(path).ok_or_else(|| {
        DiffqaError::unsupported(format!("{} has no file extension", path.display()))
    })?;
    kind_for_extension(&ext).ok_or_else(|| {
        DiffqaError::unsupported(format!(
            "'.{ext}' is not a supported extension ({})",
            path.display()
        ))
    })
}

/// Classify a source/target pair; both sides must resolve to the same kind
pub fn classify_pair(
    source: impl AsRef<Path>,
    target: impl AsRef<Path>,
) -> DiffqaResult<ComparisonKind> {
    let (source, target) = (source.as_ref(), target.as_ref());
    let source_kind = classify(source)?;
    let target_kind = classify(target)?;

    if source_kind != target_kind {
        return Err(DiffqaError::unsupported(format!(
            "cannot compare {} ({source_kind}) with {} ({target_kind})",
            source.display(),
            target.display()
        )));
    }

    tracing::debug!(
        source = %source.display(),
        target = %target.display(),
        kind = %source_kind,
        "classified comparison pair"
    );
    Ok(source_kind)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extension_table() {
        assert_eq!(classify("a.jpg").unwrap(), ComparisonKind::Image);
        assert_eq!(classify("a.jpeg").unwrap(), ComparisonKind::Image);
        assert_eq!(classify("a.png").unwrap(), ComparisonKind::Image);
        assert_eq!(classify("a.json").unwrap(), ComparisonKind::Json);
        assert_eq!(classify("a.xls").unwrap(), ComparisonKind::Spreadsheet);
        assert_eq!(classify("a.xlsx").unwrap(), ComparisonKind::Spreadsheet);
        assert_eq!(classify("a.csv").unwrap(), ComparisonKind::DelimitedText);
        assert_eq!(classify("a.tsv").unwrap(), ComparisonKind::DelimitedText);
        assert_eq!(classify("a.hdf").unwrap(), ComparisonKind::DelimitedText);
        assert_eq!(classify("a.html").unwrap(), ComparisonKind::DelimitedText);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("Shot.PNG").unwrap(), ComparisonKind::Image);
        assert_eq!(classify("DATA.Json").unwrap(), ComparisonKind::Json);
    }

    #[test]
    fn test_multi_dot_uses_last_suffix() {
        assert_eq!(classify("report.v2.json").unwrap(), ComparisonKind::Json);
        assert_eq!(
            classify("dir.with.dots/sheet.final.xlsx").unwrap(),
            ComparisonKind::Spreadsheet
        );
        assert!(classify("archive.json.gz").is_err());
    }

    #[test]
    fn test_missing_extension() {
        let err = classify("Makefile").unwrap_err();
        assert!(matches!(err, DiffqaError::UnsupportedFormat { .. }));
        assert!(classify("trailing.").is_err());
    }

    #[test]
    fn test_unknown_extension() {
        assert!(matches!(
            classify("notes.txt").unwrap_err(),
            DiffqaError::UnsupportedFormat { .. }
        ));
    }

    #[test]
    fn test_pair_same_kind() {
        assert_eq!(
            classify_pair("a.jpg", "b.PNG").unwrap(),
            ComparisonKind::Image
        );
        assert_eq!(
            classify_pair("a.csv", "b.tsv").unwrap(),
            ComparisonKind::DelimitedText
        );
    }

    #[test]
    fn test_pair_mixed_kinds_rejected() {
        let err = classify_pair("a.png", "b.json").unwrap_err();
        assert!(err.to_string().contains("cannot compare"));
        assert!(classify_pair("a.xlsx", "b.csv").is_err());
    }

    #[test]
    fn test_pair_one_side_unknown() {
        assert!(classify_pair("a.json", "b.yaml").is_err());
        assert!(classify_pair("a.doc", "b.json").is_err());
    }

    #[test]
    fn test_kind_extensions() {
        assert_eq!(
            ComparisonKind::Image.extensions(),
            vec!["jpg", "jpeg", "png"]
        );
        assert_eq!(ComparisonKind::Spreadsheet.extensions(), vec!["xls", "xlsx"]);
    }

    #[test]
    fn test_kind_for_extension_accepts_dot() {
        assert_eq!(kind_for_extension(".CSV"), Some(ComparisonKind::DelimitedText));
        assert_eq!(kind_for_extension("bmp"), None);
    }

    #[test]
    fn test_is_tabular() {
        assert!(ComparisonKind::Spreadsheet.is_tabular());
        assert!(ComparisonKind::DelimitedText.is_tabular());
        assert!(!ComparisonKind::Json.is_tabular());
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(ComparisonKind::DelimitedText.to_string(), "delimited-text");
        let json = serde_json::to_string(&ComparisonKind::DelimitedText).unwrap();
        assert_eq!(json, "\"delimited_text\"");
    }

    proptest! {
        #[test]
        fn prop_classification_ignores_stem_and_case(
            stem in "[a-z0-9_.]{1,12}",
            idx in 0..EXTENSION_TABLE.len(),
            upper in any::<bool>(),
        ) {
            let (ext, kind) = EXTENSION_TABLE[idx];
            let ext = if upper { ext.to_ascii_uppercase() } else { ext.to_string() };
            let name = format!("{stem}x.{ext}");
            prop_assert_eq!(classify(&name).unwrap(), kind);
        }
    }
}
