//! Comparator contract and the engine that dispatches on [`ComparisonKind`].

use crate::config::CompareConfig;
use crate::format::{classify, classify_pair, ComparisonKind};
use crate::image_diff::{load_image, ImageComparator, ImageDiff};
use crate::json_diff::{compare_values, load_json, JsonDiff};
use crate::report;
use crate::result::{DiffqaError, DiffqaResult};
use crate::tabular::{
    compare_tables, compare_workbooks, load_table, load_workbook, Sheet, Table,
    TabularComparator, TabularDiff,
};
use image::DynamicImage;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// One side of a comparison
#[derive(Debug, Clone)]
pub enum Reference {
    /// File on disk, decoded according to its extension
    Path(PathBuf),
    /// Parsed JSON document
    Json(Value),
    /// Single table
    Table(Table),
    /// Workbook sheets, in workbook order
    Workbook(Vec<Sheet>),
    /// Decoded image
    Image(DynamicImage),
}

impl Reference {
    /// Reference a file
    #[must_use]
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Kind this reference resolves to
    pub fn kind(&self) -> DiffqaResult<ComparisonKind> {
        match self {
            Self::Path(path) => classify(path),
            Self::Json(_) => Ok(ComparisonKind::Json),
            Self::Table(_) => Ok(ComparisonKind::DelimitedText),
            Self::Workbook(_) => Ok(ComparisonKind::Spreadsheet),
            Self::Image(_) => Ok(ComparisonKind::Image),
        }
    }

    const fn describe(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::Json(_) => "JSON value",
            Self::Table(_) => "table",
            Self::Workbook(_) => "workbook",
            Self::Image(_) => "image",
        }
    }
}

impl From<PathBuf> for Reference {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for Reference {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Value> for Reference {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Table> for Reference {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

impl From<DynamicImage> for Reference {
    fn from(image: DynamicImage) -> Self {
        Self::Image(image)
    }
}

/// A source/target pair and the kind they are compared as
#[derive(Debug, Clone)]
pub struct ComparisonInput {
    /// First input
    pub source: Reference,
    /// Second input
    pub target: Reference,
    /// Comparison kind shared by both sides
    pub kind: ComparisonKind,
}

impl ComparisonInput {
    /// Build an input, checking both references resolve to `kind`
    pub fn new(source: Reference, target: Reference, kind: ComparisonKind) -> DiffqaResult<Self> {
        for (side, reference) in [("source", &source), ("target", &target)] {
            let resolved = reference.kind()?;
            if resolved != kind {
                return Err(DiffqaError::unsupported(format!(
                    "{side} {} resolves to {resolved}, expected {kind}",
                    reference.describe()
                )));
            }
        }
        Ok(Self {
            source,
            target,
            kind,
        })
    }

    /// Build an input from two file paths, classifying them by extension
    pub fn from_paths(source: impl AsRef<Path>, target: impl AsRef<Path>) -> DiffqaResult<Self> {
        let (source, target) = (source.as_ref(), target.as_ref());
        let kind = classify_pair(source, target)?;
        Ok(Self {
            source: Reference::from(source),
            target: Reference::from(target),
            kind,
        })
    }

    /// Compare two JSON values
    #[must_use]
    pub const fn json(source: Value, target: Value) -> Self {
        Self {
            source: Reference::Json(source),
            target: Reference::Json(target),
            kind: ComparisonKind::Json,
        }
    }

    /// Compare two tables
    #[must_use]
    pub const fn tables(source: Table, target: Table) -> Self {
        Self {
            source: Reference::Table(source),
            target: Reference::Table(target),
            kind: ComparisonKind::DelimitedText,
        }
    }

    /// Compare two workbooks
    #[must_use]
    pub const fn workbooks(source: Vec<Sheet>, target: Vec<Sheet>) -> Self {
        Self {
            source: Reference::Workbook(source),
            target: Reference::Workbook(target),
            kind: ComparisonKind::Spreadsheet,
        }
    }

    /// Compare two decoded images
    #[must_use]
    pub const fn images(source: DynamicImage, target: DynamicImage) -> Self {
        Self {
            source: Reference::Image(source),
            target: Reference::Image(target),
            kind: ComparisonKind::Image,
        }
    }
}

/// Outcome of one comparison
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "diff", rename_all = "snake_case")]
pub enum DiffResult {
    /// Image statistics
    Image(ImageDiff),
    /// JSON tree differences
    Json(JsonDiff),
    /// Row differences
    Tabular(TabularDiff),
}

impl DiffResult {
    /// Whether the inputs differ
    #[must_use]
    pub fn is_different(&self) -> bool {
        match self {
            Self::Image(diff) => diff.is_different(),
            Self::Json(diff) => diff.is_different(),
            Self::Tabular(diff) => diff.is_different(),
        }
    }

    /// Short label of the result variant
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Image(_) => "image",
            Self::Json(_) => "json",
            Self::Tabular(_) => "tabular",
        }
    }

    /// Image statistics, if this is an image result
    #[must_use]
    pub const fn as_image(&self) -> Option<&ImageDiff> {
        match self {
            Self::Image(diff) => Some(diff),
            _ => None,
        }
    }

    /// JSON differences, if this is a JSON result
    #[must_use]
    pub const fn as_json(&self) -> Option<&JsonDiff> {
        match self {
            Self::Json(diff) => Some(diff),
            _ => None,
        }
    }

    /// Row differences, if this is a tabular result
    #[must_use]
    pub const fn as_tabular(&self) -> Option<&TabularDiff> {
        match self {
            Self::Tabular(diff) => Some(diff),
            _ => None,
        }
    }
}

/// A comparison strategy for one family of formats
pub trait Comparator {
    /// Kind handled by this comparator
    fn kind(&self) -> ComparisonKind;

    /// Whether this comparator handles `kind`
    fn accepts(&self, kind: ComparisonKind) -> bool {
        kind == self.kind()
    }

    /// Compare two references
    fn compare(&self, source: &Reference, target: &Reference) -> DiffqaResult<DiffResult>;
}

fn mismatched(kind: ComparisonKind, reference: &Reference) -> DiffqaError {
    DiffqaError::unsupported(format!(
        "a {} cannot be compared as {kind}",
        reference.describe()
    ))
}

fn resolve_image(reference: &Reference) -> DiffqaResult<Cow<'_, DynamicImage>> {
    match reference {
        Reference::Image(image) => Ok(Cow::Borrowed(image)),
        Reference::Path(path) => load_image(path).map(Cow::Owned),
        other => Err(mismatched(ComparisonKind::Image, other)),
    }
}

impl Comparator for ImageComparator {
    fn kind(&self) -> ComparisonKind {
        ComparisonKind::Image
    }

    fn compare(&self, source: &Reference, target: &Reference) -> DiffqaResult<DiffResult> {
        let a = resolve_image(source)?;
        let b = resolve_image(target)?;
        self.compare_images(&a, &b).map(DiffResult::Image)
    }
}

/// Compares JSON documents
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonComparator;

impl JsonComparator {
    fn resolve(reference: &Reference) -> DiffqaResult<Cow<'_, Value>> {
        match reference {
            Reference::Json(value) => Ok(Cow::Borrowed(value)),
            Reference::Path(path) => load_json(path).map(Cow::Owned),
            other => Err(mismatched(ComparisonKind::Json, other)),
        }
    }
}

impl Comparator for JsonComparator {
    fn kind(&self) -> ComparisonKind {
        ComparisonKind::Json
    }

    fn compare(&self, source: &Reference, target: &Reference) -> DiffqaResult<DiffResult> {
        let a = Self::resolve(source)?;
        let b = Self::resolve(target)?;
        Ok(DiffResult::Json(compare_values(&a, &b)))
    }
}

enum TabularData<'a> {
    Single(Cow<'a, Table>),
    Book(Cow<'a, [Sheet]>),
}

fn resolve_tabular(reference: &Reference) -> DiffqaResult<TabularData<'_>> {
    match reference {
        Reference::Table(table) => Ok(TabularData::Single(Cow::Borrowed(table))),
        Reference::Workbook(sheets) => Ok(TabularData::Book(Cow::Borrowed(sheets.as_slice()))),
        Reference::Path(path) => match classify(path)? {
            ComparisonKind::Spreadsheet => Ok(TabularData::Book(Cow::Owned(load_workbook(path)?))),
            ComparisonKind::DelimitedText => Ok(TabularData::Single(Cow::Owned(load_table(path)?))),
            other => Err(DiffqaError::unsupported(format!(
                "{} is {other}, not tabular",
                path.display()
            ))),
        },
        other => Err(mismatched(ComparisonKind::Spreadsheet, other)),
    }
}

impl Comparator for TabularComparator {
    fn kind(&self) -> ComparisonKind {
        ComparisonKind::Spreadsheet
    }

    fn accepts(&self, kind: ComparisonKind) -> bool {
        kind.is_tabular()
    }

    fn compare(&self, source: &Reference, target: &Reference) -> DiffqaResult<DiffResult> {
        let diff = match (resolve_tabular(source)?, resolve_tabular(target)?) {
            (TabularData::Single(a), TabularData::Single(b)) => {
                compare_tables(&a, &b, self.key_column(), false).map(TabularDiff::single)?
            }
            (TabularData::Book(a), TabularData::Book(b)) => {
                compare_workbooks(&a, &b, self.key_column(), true)?
            }
            _ => {
                return Err(DiffqaError::unsupported(
                    "cannot compare a single table with a workbook",
                ))
            }
        };
        Ok(DiffResult::Tabular(diff))
    }
}

/// Runs comparisons and writes the configured reports
#[derive(Debug, Clone)]
pub struct CompareEngine {
    config: CompareConfig,
    image: ImageComparator,
    json: JsonComparator,
    tabular: TabularComparator,
}

impl Default for CompareEngine {
    fn default() -> Self {
        Self::from_valid(CompareConfig::default())
    }
}

impl CompareEngine {
    /// Create an engine from a validated configuration
    pub fn new(config: CompareConfig) -> DiffqaResult<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: CompareConfig) -> Self {
        Self {
            image: ImageComparator::new(config.image_config()),
            json: JsonComparator,
            tabular: TabularComparator::new(config.key_column.clone()),
            config,
        }
    }

    /// Get configuration
    #[must_use]
    pub const fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Comparator responsible for `kind`
    #[must_use]
    pub fn comparator_for(&self, kind: ComparisonKind) -> &dyn Comparator {
        match kind {
            ComparisonKind::Image => &self.image,
            ComparisonKind::Json => &self.json,
            ComparisonKind::Spreadsheet | ComparisonKind::DelimitedText => &self.tabular,
        }
    }

    /// Run one comparison and write its report, if one is configured
    pub fn run(&self, input: ComparisonInput) -> DiffqaResult<DiffResult> {
        let comparator = self.comparator_for(input.kind);
        let result = comparator.compare(&input.source, &input.target)?;

        tracing::info!(
            kind = %input.kind,
            different = result.is_different(),
            "comparison complete"
        );

        if let Some(path) = self.report_path(&result) {
            report::write_report(&result, path)?;
        }
        Ok(result)
    }

    /// Classify two files by extension and compare them
    pub fn compare_files(
        &self,
        source: impl AsRef<Path>,
        target: impl AsRef<Path>,
    ) -> DiffqaResult<DiffResult> {
        self.run(ComparisonInput::from_paths(source, target)?)
    }

    /// Whether a result counts as a pass: no differences, or an image
    /// scoring at least the configured similarity threshold
    #[must_use]
    pub fn is_equal(&self, result: &DiffResult) -> bool {
        match (result, self.config.similarity_threshold) {
            (DiffResult::Image(diff), Some(threshold)) => diff.meets(threshold),
            _ => !result.is_different(),
        }
    }

    fn report_path(&self, result: &DiffResult) -> Option<&Path> {
        match result {
            DiffResult::Image(_) => self.config.visual_diff.as_deref(),
            DiffResult::Json(_) => self.config.json_report.as_deref(),
            DiffResult::Tabular(_) => self.config.tabular_report.as_deref(),
        }
    }
}

/// Compare two files with the default configuration
pub fn compare_files(
    source: impl AsRef<Path>,
    target: impl AsRef<Path>,
) -> DiffqaResult<DiffResult> {
    CompareEngine::default().compare_files(source, target)
}
