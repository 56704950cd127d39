// regtrim CLI - classify registered vehicles by trim from their catalog price

mod catalog;
mod config;
mod exit_codes;
mod logging;
mod resolve;
mod stats;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use regtrim_classifier::ClassifyError;

use exit_codes::{classify_exit_code, EXIT_ERROR, EXIT_INPUT, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "regtrim")]
#[command(about = "Classify registered vehicles by trim from their catalog price")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug); REGTRIM_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every record of a registrations CSV
    #[command(after_help = "\
Columns (by header name):
  plate,variant,trim,type_approval,price,color,date,taxi,export,named

Examples:
  regtrim resolve registrations.csv
  regtrim resolve registrations.csv --json
  regtrim resolve registrations.csv --stats-out week42.json
  regtrim resolve registrations.csv --config classifier.toml -vv")]
    Resolve {
        /// Registrations CSV with a header row
        records: PathBuf,

        /// Config file (default: <config dir>/regtrim/classifier.toml, else built-in)
        #[arg(long, env = "REGTRIM_CONFIG")]
        config: Option<PathBuf>,

        /// Output JSON to stdout instead of one line per vehicle
        #[arg(long)]
        json: bool,

        /// Write the accumulated statistics to this file
        #[arg(long)]
        stats_out: Option<PathBuf>,
    },

    /// Merge or report persisted statistics
    Stats {
        #[command(subcommand)]
        command: stats::StatsCommands,
    },

    /// Dump the price lists in force for a segment on a date
    #[command(after_help = "\
Examples:
  regtrim catalog --date 20220610 --segment large
  regtrim catalog --date 20230115 --segment small --revision 2023
  regtrim catalog --date 20210917 --segment large-awd --json")]
    Catalog {
        /// Registration date, YYYYMMDD
        #[arg(long)]
        date: String,

        /// Battery and drivetrain segment
        #[arg(long, value_enum)]
        segment: catalog::SegmentArg,

        /// Model-year revision of the segment
        #[arg(long, value_enum)]
        revision: Option<catalog::RevisionArg>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Show or validate classifier configs
    Config {
        #[command(subcommand)]
        command: config::ConfigCommands,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nclassifier: regtrim-classifier ", env!("CARGO_PKG_VERSION"),
        "\ntarget:     ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Resolve { records, config, json, stats_out } => {
            resolve::cmd_resolve(records, config, json, stats_out)
        }
        Commands::Stats { command } => stats::cmd_stats(command),
        Commands::Catalog { date, segment, revision, json } => {
            catalog::cmd_catalog(date, segment, revision, json)
        }
        Commands::Config { command } => config::cmd_config(command),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT, message: msg.into(), hint: None }
    }

    /// Create error from a classifier error with proper exit code.
    pub fn classify(err: ClassifyError) -> Self {
        let code = classify_exit_code(&err);
        let hint = match &err {
            ClassifyError::UnknownVariant { .. }
            | ClassifyError::UnknownTrimCode { .. }
            | ClassifyError::UnknownTypeApproval { .. } => {
                Some("correct the record with an [[overrides]] entry for this plate".to_string())
            }
            ClassifyError::DateOutOfRange { .. } => {
                Some("registrations are accepted from 20210401 up to 20280101".to_string())
            }
            ClassifyError::NoPriceList { .. } => {
                Some("the registration predates the first price list for its segment".to_string())
            }
            ClassifyError::MissingColumn { .. } => Some(
                "expected columns: plate,variant,trim,type_approval,price,color,date,taxi,export,named"
                    .to_string(),
            ),
            ClassifyError::ConfigParse(_) | ClassifyError::ConfigValidation(_) => {
                Some("check the file with `regtrim config validate <file>`".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
