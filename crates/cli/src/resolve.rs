//! `regtrim resolve` — classify a CSV of registrations.

use std::path::{Path, PathBuf};

use regtrim_classifier::{build_catalog, load_csv_records, run, Resolver};

use crate::config::load_config;
use crate::CliError;

pub fn cmd_resolve(
    records: PathBuf,
    config: Option<PathBuf>,
    json_output: bool,
    stats_out: Option<PathBuf>,
) -> Result<(), CliError> {
    let csv_data = std::fs::read_to_string(&records)
        .map_err(|e| CliError::input(format!("cannot read {}: {e}", records.display())))?;
    let rows = load_csv_records(&csv_data).map_err(CliError::classify)?;

    let config = load_config(config.as_deref())?;
    let resolver = Resolver::new(build_catalog(), config);
    let outcome = run(&resolver, &rows).map_err(CliError::classify)?;

    if let Some(ref path) = stats_out {
        write_json(path, &outcome.stats)?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        let json_str = serde_json::to_string_pretty(&outcome)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        for r in &outcome.resolutions {
            println!("{}\t{}", r.plate, r.label);
        }
    }

    let s = &outcome.stats;
    eprintln!(
        "{} records classified into {} trims ({} taxi, {} exported)",
        s.total,
        s.trims.len(),
        s.taxi,
        s.exported,
    );
    Ok(())
}

pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    let json_str = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
    std::fs::write(path, json_str + "\n")
        .map_err(|e| CliError::input(format!("cannot write {}: {e}", path.display())))
}
