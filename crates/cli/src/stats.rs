//! `regtrim stats` — merge and report persisted fleet statistics.
//!
//! Statistics files are the flat counter maps written by
//! `regtrim resolve --stats-out`.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use regtrim_classifier::model::PaintFinish;
use regtrim_classifier::stats::Equipment;
use regtrim_classifier::FleetStats;
use serde_json::json;

use crate::exit_codes::EXIT_STATS_INVALID;
use crate::resolve::write_json;
use crate::CliError;

#[derive(Subcommand)]
pub enum StatsCommands {
    /// Sum several statistics files into one
    #[command(after_help = "\
Examples:
  regtrim stats merge week1.json week2.json
  regtrim stats merge part-*.json --output fleet.json")]
    Merge {
        /// Statistics files written by `resolve --stats-out`
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write the merged counters here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Print the fleet report for a statistics file
    #[command(after_help = "\
Examples:
  regtrim stats show fleet.json
  regtrim stats show fleet.json --json")]
    Show {
        /// Statistics file written by `resolve --stats-out` or `stats merge`
        file: PathBuf,

        /// Output JSON to stdout instead of the text report
        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_stats(cmd: StatsCommands) -> Result<(), CliError> {
    match cmd {
        StatsCommands::Merge { files, output } => cmd_stats_merge(&files, output.as_deref()),
        StatsCommands::Show { file, json } => cmd_stats_show(&file, json),
    }
}

fn read_stats(path: &Path) -> Result<FleetStats, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::input(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text).map_err(|e| CliError {
        code: EXIT_STATS_INVALID,
        message: format!("{}: {e}", path.display()),
        hint: Some("expected a JSON object of counter name to count".into()),
    })
}

fn cmd_stats_merge(files: &[PathBuf], output: Option<&Path>) -> Result<(), CliError> {
    let mut merged = FleetStats::new();
    for path in files {
        merged.merge(&read_stats(path)?);
    }

    match output {
        Some(path) => {
            write_json(path, &merged)?;
            eprintln!("wrote {}", path.display());
        }
        None => {
            let json_str = serde_json::to_string_pretty(&merged)
                .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
            println!("{json_str}");
        }
    }
    eprintln!("merged {} files: {} vehicles", files.len(), merged.total);
    Ok(())
}

fn cmd_stats_show(file: &Path, json_output: bool) -> Result<(), CliError> {
    let stats = read_stats(file)?;

    if json_output {
        let paint: serde_json::Map<String, serde_json::Value> = PaintFinish::ALL
            .iter()
            .map(|f| (f.name().to_string(), json!(stats.paint_count(*f))))
            .collect();
        let equipment: serde_json::Map<String, serde_json::Value> = Equipment::ALL
            .iter()
            .map(|e| (e.name().to_string(), json!(stats.equipment_count(*e))))
            .collect();
        let report = json!({
            "total": stats.total,
            "taxi": stats.taxi,
            "exported": stats.exported,
            "ranking": stats.ranking(),
            "paint": paint,
            "wheels": {
                "19": stats.wheels.inch_19,
                "20": stats.wheels.inch_20,
                "lounge_19": stats.wheels.lounge_19,
                "lounge_20": stats.wheels.lounge_20,
            },
            "model_years": stats.model_years,
            "trim_levels": stats.trim_levels,
            "equipment": equipment,
            "named_per_year": stats.named_per_year(),
        });
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    println!("{} vehicles ({} taxi, {} exported)", stats.total, stats.taxi, stats.exported);

    println!();
    println!("{:>6} {:>10}  trim", "count", "not named");
    for t in stats.ranking() {
        println!("{:>6} {:>10}  {}", t.count, t.not_named, t.key);
    }

    println!();
    println!("paint:");
    for finish in PaintFinish::ALL {
        println!("  {:<10} {:>6}", finish.name(), stats.paint_count(finish));
    }

    let w = &stats.wheels;
    println!();
    println!(
        "wheels: 19 inch {}, 20 inch {} (Lounge: 19 inch {}, 20 inch {})",
        w.inch_19, w.inch_20, w.lounge_19, w.lounge_20
    );

    println!();
    println!("model years:");
    for (year, count) in &stats.model_years {
        println!("  {year:<10} {count:>6}");
    }

    println!();
    println!("trim levels:");
    for (level, count) in &stats.trim_levels {
        println!("  {level:<16} {count:>6}");
    }

    println!();
    println!("equipment:");
    for e in Equipment::ALL {
        println!("  {:<16} {:>6}", e.name(), stats.equipment_count(e));
    }

    println!();
    println!("named per year:");
    for (year, count) in stats.named_per_year() {
        println!("  {year:<10} {count:>6}");
    }
    Ok(())
}
