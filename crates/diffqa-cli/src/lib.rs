//! diffqa CLI Library
//!
//! Command-line interface for the diffqa comparison engine.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod output;

pub use commands::{Cli, ClassifyArgs, ColorArg, Commands, CompareArgs, OutputFormat};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{render_text, Reporter};
