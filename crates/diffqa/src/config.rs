//! Comparison configuration.

use crate::format::extension_of;
use crate::image_diff::{ImageCompareConfig, CANONICAL_WIDTH};
use crate::result::{DiffqaError, DiffqaResult};
use crate::tabular::DEFAULT_KEY_COLUMN;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for a [`CompareEngine`](crate::CompareEngine)
///
/// Loadable from YAML or JSON; missing fields take their defaults.
///
/// ```yaml
/// key_column: account number
/// canonical_width: 1920
/// similarity_threshold: 0.98
/// tabular_report: target/diffqa/rows.xlsx
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
    /// Column used to pair rows in tabular comparisons
    pub key_column: String,
    /// Width images are resampled to when their sizes differ
    pub canonical_width: u32,
    /// Text report destination for JSON diffs
    pub json_report: Option<PathBuf>,
    /// Workbook report destination for tabular diffs
    pub tabular_report: Option<PathBuf>,
    /// PNG destination for the image visual diff
    pub visual_diff: Option<PathBuf>,
    /// Minimum similarity for two images to count as equal
    pub similarity_threshold: Option<f64>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            canonical_width: CANONICAL_WIDTH,
            json_report: None,
            tabular_report: None,
            visual_diff: None,
            similarity_threshold: None,
        }
    }
}

impl CompareConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a `.yaml`, `.yml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> DiffqaResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DiffqaError::config(format!("cannot read {}: {e}", path.display()))
        })?;

        let config: Self = match extension_of(path).as_deref() {
            Some("yaml" | "yml") => serde_yaml_ng::from_str(&text)
                .map_err(|e| DiffqaError::config(format!("{}: {e}", path.display())))?,
            Some("json") => serde_json::from_str(&text)
                .map_err(|e| DiffqaError::config(format!("{}: {e}", path.display())))?,
            _ => {
                return Err(DiffqaError::config(format!(
                    "{} must be a .yaml, .yml or .json file",
                    path.display()
                )))
            }
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded compare config");
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> DiffqaResult<()> {
        if self.key_column.trim().is_empty() {
            return Err(DiffqaError::config("key_column must not be empty"));
        }
        if self.canonical_width == 0 {
            return Err(DiffqaError::config("canonical_width must be non-zero"));
        }
        if let Some(t) = self.similarity_threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(DiffqaError::config(format!(
                    "similarity_threshold must be within 0.0..=1.0, got {t}"
                )));
            }
        }
        Ok(())
    }

    /// Set the key column
    #[must_use]
    pub fn with_key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = column.into();
        self
    }

    /// Set the canonical image width
    #[must_use]
    pub const fn with_canonical_width(mut self, width: u32) -> Self {
        self.canonical_width = width;
        self
    }

    /// Set the JSON report destination
    #[must_use]
    pub fn with_json_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.json_report = Some(path.into());
        self
    }

    /// Set the tabular report destination
    #[must_use]
    pub fn with_tabular_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.tabular_report = Some(path.into());
        self
    }

    /// Set the visual diff destination
    #[must_use]
    pub fn with_visual_diff(mut self, path: impl Into<PathBuf>) -> Self {
        self.visual_diff = Some(path.into());
        self
    }

    /// Set the image similarity threshold
    #[must_use]
    pub const fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }

    /// Image comparator settings derived from this configuration
    #[must_use]
    pub const fn image_config(&self) -> ImageCompareConfig {
        ImageCompareConfig {
            canonical_width: self.canonical_width,
            visual_diff: self.visual_diff.is_some(),
        }
    }
}
