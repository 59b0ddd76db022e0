//! Recursive JSON tree diff.
//!
//! Differences are emitted in source key order, followed by keys that only
//! the target has. Nested objects extend the path with `->key`; arrays and
//! scalars are compared by deep equality.

use crate::result::{DiffqaError, DiffqaResult};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

/// Separator between path segments
pub const PATH_SEPARATOR: &str = "->";

/// One difference between two JSON trees
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JsonDifference {
    /// Key present in source only
    MissingInTarget {
        /// Path of the key
        path: String,
    },
    /// Key present in target only
    MissingInSource {
        /// Path of the key
        path: String,
    },
    /// Key present in both with unequal values
    ValueMismatch {
        /// Path of the key
        path: String,
        /// Value in source
        source: Value,
        /// Value in target
        target: Value,
    },
}

impl JsonDifference {
    /// Path of the differing key
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::MissingInTarget { path }
            | Self::MissingInSource { path }
            | Self::ValueMismatch { path, .. } => path,
        }
    }

    /// Whether this is a key-only difference
    #[must_use]
    pub const fn is_missing_key(&self) -> bool {
        matches!(self, Self::MissingInTarget { .. } | Self::MissingInSource { .. })
    }
}

impl fmt::Display for JsonDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInTarget { path } => write!(f, "{path}: missing in target"),
            Self::MissingInSource { path } => write!(f, "{path}: missing in source"),
            Self::ValueMismatch {
                path,
                source,
                target,
            } => write!(f, "{path}: {source} != {target}"),
        }
    }
}

/// Result of comparing two JSON trees
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JsonDiff {
    /// Ordered differences; empty means equal
    pub differences: Vec<JsonDifference>,
}

impl JsonDiff {
    /// Whether any difference was found
    #[must_use]
    pub fn is_different(&self) -> bool {
        !self.differences.is_empty()
    }

    /// Number of differences
    #[must_use]
    pub fn len(&self) -> usize {
        self.differences.len()
    }

    /// Whether there are no differences
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    /// Look up the difference recorded for a path
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&JsonDifference> {
        self.differences.iter().find(|d| d.path() == path)
    }
}

/// Compare two JSON values
#[must_use]
pub fn compare_values(source: &Value, target: &Value) -> JsonDiff {
    let mut differences = Vec::new();
    match (source, target) {
        (Value::Object(a), Value::Object(b)) => diff_objects(a, b, "", &mut differences),
        _ if !json_eq(source, target) => differences.push(JsonDifference::ValueMismatch {
            path: String::new(),
            source: source.clone(),
            target: target.clone(),
        }),
        _ => {}
    }
    JsonDiff { differences }
}

/// Compare two JSON documents given as text
pub fn compare_json_str(source: &str, target: &str) -> DiffqaResult<JsonDiff> {
    let a = parse_json(source, "<source>")?;
    let b = parse_json(target, "<target>")?;
    Ok(compare_values(&a, &b))
}

/// Compare two JSON files
pub fn compare_json_files(
    source: impl AsRef<Path>,
    target: impl AsRef<Path>,
) -> DiffqaResult<JsonDiff> {
    let a = load_json(source)?;
    let b = load_json(target)?;
    Ok(compare_values(&a, &b))
}

/// Read and parse a JSON file
pub fn load_json(path: impl AsRef<Path>) -> DiffqaResult<Value> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| DiffqaError::invalid_json(path.display().to_string(), e.to_string()))
}

fn parse_json(text: &str, origin: &str) -> DiffqaResult<Value> {
    serde_json::from_str(text).map_err(|e| DiffqaError::invalid_json(origin, e.to_string()))
}

/// Deep equality where numbers compare by value, so `1 == 1.0`
fn json_eq(source: &Value, target: &Value) -> bool {
    match (source, target) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
                return x == y;
            }
            if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
                return x == y;
            }
            match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => a == b,
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len() && a.iter().all(|(k, x)| b.get(k).is_some_and(|y| json_eq(x, y)))
        }
        _ => source == target,
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}{PATH_SEPARATOR}{key}")
    }
}

fn diff_objects(
    source: &Map<String, Value>,
    target: &Map<String, Value>,
    path: &str,
    out: &mut Vec<JsonDifference>,
) {
    for (key, source_value) in source {
        let key_path = join_path(path, key);
        match target.get(key) {
            None => out.push(JsonDifference::MissingInTarget { path: key_path }),
            Some(target_value) => match (source_value, target_value) {
                (Value::Object(a), Value::Object(b)) => diff_objects(a, b, &key_path, out),
                _ if !json_eq(source_value, target_value) => {
                    out.push(JsonDifference::ValueMismatch {
                        path: key_path,
                        source: source_value.clone(),
                        target: target_value.clone(),
                    });
                }
                _ => {}
            },
        }
    }

    for key in target.keys().filter(|k| !source.contains_key(*k)) {
        out.push(JsonDifference::MissingInSource {
            path: join_path(path, key),
        });
    }
}
