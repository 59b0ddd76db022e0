//! diffqa: file comparison for test assertions
//!
//! Compares two files (or two in-memory values) of the same kind and
//! returns a structured [`DiffResult`]:
//!
//! - **Images** (`png`, `jpg`, `jpeg`): exact channel check, MSE and
//!   structural similarity, with an optional red-highlight visual diff.
//! - **JSON**: recursive tree diff reporting missing keys and mismatched
//!   values by `parent->child` path.
//! - **Spreadsheets and delimited text** (`xls`, `xlsx`, `csv`, `tsv`,
//!   `html`): row diff paired by a key column, or a row-set diff when the
//!   key is absent.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ format       │    │ CompareEngine│    │ report       │
//! │ classify()   │───►│ Comparator   │───►│ text / xlsx  │
//! │ by extension │    │ per kind     │    │ / png        │
//! └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use diffqa::{CompareConfig, CompareEngine};
//!
//! let engine = CompareEngine::new(
//!     CompareConfig::new()
//!         .with_key_column("account number")
//!         .with_tabular_report("target/diffqa/accounts.xlsx"),
//! )?;
//! let result = engine.compare_files("expected/accounts.xlsx", "actual/accounts.xlsx")?;
//! assert!(!result.is_different());
//! # Ok::<(), diffqa::DiffqaError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod comparator;
mod config;
mod format;
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
mod image_diff;
mod json_diff;
#[allow(clippy::cast_precision_loss, clippy::missing_errors_doc)]
pub mod report;
mod result;

/// Tabular decoding and row diff
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc
)]
pub mod tabular;

pub use comparator::{
    compare_files, CompareEngine, Comparator, ComparisonInput, DiffResult, JsonComparator,
    Reference,
};
pub use config::CompareConfig;
pub use format::{classify, classify_pair, extension_of, kind_for_extension, ComparisonKind};
pub use image_diff::{
    load_image, mean_squared_error, structural_similarity, ImageCompareConfig, ImageComparator,
    ImageDiff, CANONICAL_WIDTH,
};
pub use json_diff::{
    compare_json_files, compare_json_str, compare_values, load_json, JsonDiff, JsonDifference,
    PATH_SEPARATOR,
};
pub use result::{DiffqaError, DiffqaResult};
pub use tabular::{
    Cell, SheetDiff, Table, TabularComparator, TabularDiff, DEFAULT_KEY_COLUMN,
};
