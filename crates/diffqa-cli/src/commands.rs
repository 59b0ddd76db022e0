//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// diffqa: compare images, JSON documents and spreadsheets
#[derive(Parser, Debug)]
#[command(name = "diffqa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare two files of the same kind
    ///
    /// Exits 0 when the files match, 1 when they differ and 2 on error.
    Compare(CompareArgs),

    /// Print the comparison kind of each path
    Classify(ClassifyArgs),
}

/// Arguments for the compare command
#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// Expected file
    pub source: PathBuf,

    /// Actual file
    pub target: PathBuf,

    /// Key column for spreadsheet and CSV comparisons
    #[arg(short, long, env = "DIFFQA_KEY")]
    pub key: Option<String>,

    /// Write a diff report (text for JSON, .xlsx for tables, PNG for images)
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Write a PNG highlighting differing pixels
    #[arg(long)]
    pub visual_diff: Option<PathBuf>,

    /// Width images are resampled to when their sizes differ
    #[arg(long)]
    pub canonical_width: Option<u32>,

    /// Minimum similarity (0.0-1.0) for images to count as equal
    #[arg(long)]
    pub min_similarity: Option<f64>,

    /// Configuration file (.yaml, .yml or .json)
    #[arg(short, long, env = "DIFFQA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the classify command
#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    /// Paths to classify
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Result output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output for CI integration
    Json,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
