//! diffqa CLI: compare files from the command line
//!
//! ## Usage
//!
//! ```bash
//! diffqa compare expected.json actual.json               # JSON tree diff
//! diffqa compare a.xlsx b.xlsx --key "account number"    # keyed row diff
//! diffqa compare home.png home_new.png --min-similarity 0.98
//! diffqa classify report.csv shot.PNG
//! ```
//!
//! Exit status: 0 when equal, 1 when different, 2 on error.

use clap::Parser;
use diffqa::{classify, classify_pair, CompareConfig, CompareEngine, ComparisonKind, DiffResult};
use diffqa_cli::{
    render_text, ClassifyArgs, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands,
    CompareArgs, OutputFormat, Reporter, Verbosity,
};
use std::process::ExitCode;

/// Outcome of a successful run
enum Outcome {
    Same,
    Different,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());
    match run(cli.command, &reporter) {
        Ok(Outcome::Same) => ExitCode::SUCCESS,
        Ok(Outcome::Different) => ExitCode::from(1),
        Err(e) => {
            reporter.error(&e.to_string());
            ExitCode::from(2)
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn init_tracing(verbosity: Verbosity) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.log_filter())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands, reporter: &Reporter) -> CliResult<Outcome> {
    match command {
        Commands::Compare(args) => run_compare(&args, reporter),
        Commands::Classify(args) => run_classify(&args, reporter),
    }
}

fn compare_config(args: &CompareArgs, kind: ComparisonKind) -> CliResult<CompareConfig> {
    let mut config = match &args.config {
        Some(path) => CompareConfig::from_file(path)?,
        None => CompareConfig::default(),
    };

    if let Some(key) = &args.key {
        config = config.with_key_column(key.clone());
    }
    if let Some(width) = args.canonical_width {
        config = config.with_canonical_width(width);
    }
    if let Some(threshold) = args.min_similarity {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(CliError::invalid_argument(format!(
                "--min-similarity must be within 0.0..=1.0, got {threshold}"
            )));
        }
        config = config.with_similarity_threshold(threshold);
    }
    if let Some(path) = &args.visual_diff {
        config = config.with_visual_diff(path.clone());
    }
    if let Some(path) = &args.report {
        config = match kind {
            ComparisonKind::Json => config.with_json_report(path.clone()),
            ComparisonKind::Spreadsheet | ComparisonKind::DelimitedText => {
                config.with_tabular_report(path.clone())
            }
            ComparisonKind::Image if args.visual_diff.is_some() => {
                return Err(CliError::invalid_argument(
                    "--report and --visual-diff both name the image diff; pass one",
                ))
            }
            ComparisonKind::Image => config.with_visual_diff(path.clone()),
        };
    }
    Ok(config)
}

fn run_compare(args: &CompareArgs, reporter: &Reporter) -> CliResult<Outcome> {
    let kind = classify_pair(&args.source, &args.target)?;
    let config = compare_config(args, kind)?;
    tracing::debug!(
        %kind,
        source = %args.source.display(),
        target = %args.target.display(),
        "resolved comparison"
    );
    let engine = CompareEngine::new(config)?;

    let result = engine.compare_files(&args.source, &args.target)?;
    let equal = engine.is_equal(&result);
    let pair = format!("{} vs {}", args.source.display(), args.target.display());

    match args.format {
        OutputFormat::Json => {
            let doc = serde_json::json!({
                "source": args.source.display().to_string(),
                "target": args.target.display().to_string(),
                "equal": equal,
                "result": serde_json::to_value(&result)?,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Text => {
            let summary = match &result {
                DiffResult::Image(diff) => format!("{pair} (similarity {:.4})", diff.similarity),
                _ => pair,
            };
            if equal {
                reporter.success(&summary);
            } else {
                reporter.failure(&summary);
            }
            if result.is_different() {
                print!("{}", render_text(&result));
            }
        }
    }

    for path in [
        &engine.config().json_report,
        &engine.config().tabular_report,
        &engine.config().visual_diff,
    ]
    .into_iter()
    .flatten()
    {
        if path.exists() {
            reporter.info(&format!("report written to {}", path.display()));
        }
    }

    Ok(if equal { Outcome::Same } else { Outcome::Different })
}

fn run_classify(args: &ClassifyArgs, reporter: &Reporter) -> CliResult<Outcome> {
    let mut failures = 0usize;
    for path in &args.paths {
        match classify(path) {
            Ok(kind) => println!("{}\t{kind}", path.display()),
            Err(e) => {
                failures += 1;
                reporter.error(&e.to_string());
            }
        }
    }

    if failures > 0 {
        return Err(CliError::invalid_argument(format!(
            "{failures} of {} path(s) could not be classified",
            args.paths.len()
        )));
    }
    Ok(Outcome::Same)
}
