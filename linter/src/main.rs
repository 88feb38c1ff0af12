//! Event type linter - command-line front end.
//!
//! # Commands
//!
//! - `eventtype-lint check [FILES...]`: Lint event type definitions
//! - `eventtype-lint rules`: List the rule table
//!
//! Files may hold a single event type object or an array of them, exactly
//! as returned by the broker's `/event-types` endpoint. Without files (or
//! with `-`) the definition is read from stdin.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use eventtype_linter::error::LintError;
use eventtype_linter::report::{exceeds, render_text};
use eventtype_linter::{Linter, ValidationResult};

/// Exit status when an issue reaches the `--fail-on` severity.
const EXIT_ISSUES: u8 = 1;

/// Exit status for unreadable or malformed input.
const EXIT_INVALID_INPUT: u8 = 2;

/// Event type linter.
///
/// Checks broker event type definitions for security, schema and naming
/// problems.
#[derive(Parser, Debug)]
#[command(name = "eventtype-lint")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    RUST_LOG    Log level filter (default: warn)

EXAMPLES:
    # Lint a single definition
    eventtype-lint check order-placed.json

    # Lint everything the broker knows about
    curl -s $NAKADI_API_URL/event-types | eventtype-lint check --format json

    # Fail CI only on security problems of admins or worse
    eventtype-lint check --fail-on 60 event-types/*.json
")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Lint event type definitions.
    Check {
        /// JSON files to lint; reads stdin when empty or `-`.
        files: Vec<PathBuf>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Exit with status 1 when any issue has at least this severity.
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(0..=100))]
        fail_on: u8,
    },

    /// List all rules with their id, group and default severity.
    Rules,
}

/// Report formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Command::Check {
            files,
            format,
            fail_on,
        } => run_check(&files, format, fail_on),
        Command::Rules => {
            run_rules();
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Initialize logging to stderr so reports on stdout stay clean.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Runs the check command.
fn run_check(files: &[PathBuf], format: OutputFormat, fail_on: u8) -> Result<ExitCode> {
    let linter = Linter::standard();
    let mut results: Vec<ValidationResult> = Vec::new();

    let sources: Vec<Option<&Path>> = if files.is_empty() {
        vec![None]
    } else {
        files
            .iter()
            .map(|p| (p.as_os_str() != "-").then_some(p.as_path()))
            .collect()
    };

    for source in sources {
        let label = source.map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());
        match lint_source(&linter, source) {
            Ok(mut found) => {
                debug!(source = %label, event_types = found.len(), "Source linted");
                results.append(&mut found);
            }
            Err(err) => {
                error!(source = %label, error = %err, "Failed to lint source");
                eprintln!("Error: {label}: {err}");
                return Ok(ExitCode::from(EXIT_INVALID_INPUT));
            }
        }
    }

    match format {
        OutputFormat::Text => print!("{}", render_text(&results)),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&results).context("Failed to serialize results")?;
            println!("{json}");
        }
    }

    if exceeds(&results, fail_on) {
        info!(fail_on, "Issues at or above the failure threshold");
        return Ok(ExitCode::from(EXIT_ISSUES));
    }

    Ok(ExitCode::SUCCESS)
}

/// Reads one source and lints every event type in it.
fn lint_source(
    linter: &Linter,
    source: Option<&Path>,
) -> std::result::Result<Vec<ValidationResult>, LintError> {
    let text = match source {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let value: Value = serde_json::from_str(&text)?;
    match value {
        Value::Array(_) => linter.lint_values(&value),
        _ => linter.lint_value(&value).map(|result| vec![result]),
    }
}

/// Runs the rules command.
fn run_rules() {
    let linter = Linter::standard();
    for rule in linter.rules() {
        let issue = rule.issue;
        println!(
            "{:>3}  {:<9} {:>3}{}  {:<34} {}",
            issue.id(),
            issue.group().to_string(),
            issue.default_severity(),
            if rule.critical { "!" } else { " " },
            issue.code_name(),
            issue.title().trim()
        );
    }
}
