//! Result and error types for diffqa.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for diffqa operations
pub type DiffqaResult<T> = Result<T, DiffqaError>;

/// Errors that can occur while comparing files
///
/// A comparison that cannot complete always surfaces one of these; it is
/// never folded into an "equal" result.
#[derive(Debug, Error)]
pub enum DiffqaError {
    /// Extension not recognized, or the two sides resolve to different kinds
    #[error("Unsupported format: {message}")]
    UnsupportedFormat {
        /// Error message
        message: String,
    },

    /// Image could not be decoded, or has a zero dimension
    #[error("Invalid image {}: {message}", path.display())]
    InvalidImage {
        /// Image that failed
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Similarity statistic could not be computed
    #[error("Image comparison failed: {message}")]
    ImageComparison {
        /// Error message
        message: String,
    },

    /// Structured data did not parse as JSON
    #[error("Invalid JSON in {origin}: {message}")]
    InvalidJson {
        /// File path or `"<source>"` / `"<target>"` for in-memory text
        origin: String,
        /// Error message
        message: String,
    },

    /// Both tabular inputs have no rows
    #[error("Both datasets are empty")]
    EmptyDataset,

    /// Tabular inputs have different row counts
    #[error("Row counts differ: source has {source_rows}, target has {target_rows}")]
    RowCountMismatch {
        /// Rows in source
        source_rows: usize,
        /// Rows in target
        target_rows: usize,
    },

    /// Tabular inputs have different column counts
    #[error("Column counts differ: source has {source_columns}, target has {target_columns}")]
    ColumnCountMismatch {
        /// Columns in source
        source_columns: usize,
        /// Columns in target
        target_columns: usize,
    },

    /// Key column missing from a keyed comparison
    #[error("Key column '{column}' not found in {side}")]
    KeyColumnNotFound {
        /// Requested key column
        column: String,
        /// `"source"` or `"target"`
        side: &'static str,
    },

    /// Tabular file could not be decoded
    #[error("Failed to decode table {}: {message}", path.display())]
    TableDecode {
        /// File that failed
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Report could not be written
    #[error("Failed to write report {}: {message}", path.display())]
    ReportWrite {
        /// Report destination
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DiffqaError {
    /// Create an unsupported format error
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            message: message.into(),
        }
    }

    /// Create an invalid image error
    #[must_use]
    pub fn invalid_image(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::InvalidImage {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create an invalid JSON error
    #[must_use]
    pub fn invalid_json(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidJson {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Create a table decode error
    #[must_use]
    pub fn table_decode(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::TableDecode {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a report write error
    #[must_use]
    pub fn report_write(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::ReportWrite {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the error is a tabular precondition violation rather than a
    /// decode or I/O failure
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::EmptyDataset
                | Self::RowCountMismatch { .. }
                | Self::ColumnCountMismatch { .. }
                | Self::KeyColumnNotFound { .. }
        )
    }
}
