//! `regtrim catalog` — dump the price lists in force on a date.

use chrono::NaiveDate;
use clap::ValueEnum;
use regtrim_classifier::build_catalog;
use regtrim_classifier::matcher::eligible_tables;
use regtrim_classifier::model::{Revision, Segment};
use serde_json::json;

use crate::exit_codes::EXIT_RECORD_UNRESOLVED;
use crate::CliError;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SegmentArg {
    Small,
    Large,
    LargeAwd,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RevisionArg {
    #[value(name = "2023")]
    ModelYear2023,
}

fn segment(segment: SegmentArg, revision: Option<RevisionArg>) -> Segment {
    let base = match segment {
        SegmentArg::Small => Segment::SMALL,
        SegmentArg::Large => Segment::LARGE,
        SegmentArg::LargeAwd => Segment::LARGE_AWD,
    };
    match revision {
        Some(RevisionArg::ModelYear2023) => base.revised(Revision::ModelYear2023),
        None => base,
    }
}

pub fn cmd_catalog(
    date: String,
    segment_arg: SegmentArg,
    revision: Option<RevisionArg>,
    json_output: bool,
) -> Result<(), CliError> {
    let day = NaiveDate::parse_from_str(&date, "%Y%m%d").map_err(|_| {
        CliError::usage(format!("invalid --date '{date}'")).with_hint("use YYYYMMDD, e.g. 20220610")
    })?;
    let segment = segment(segment_arg, revision);

    let catalog = build_catalog();
    let tables = eligible_tables(&catalog, segment, day);
    if tables.is_empty() {
        return Err(CliError {
            code: EXIT_RECORD_UNRESOLVED,
            message: format!("no {segment} price list in force on {date}"),
            hint: None,
        });
    }

    if json_output {
        let out: Vec<serde_json::Value> = tables
            .iter()
            .map(|(effective, table)| {
                json!({
                    "effective": effective.format("%Y-%m-%d").to_string(),
                    "segment": segment.to_string(),
                    "entries": table.entries().collect::<Vec<_>>(),
                })
            })
            .collect();
        let json_str = serde_json::to_string_pretty(&out)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    for (i, (effective, table)) in tables.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{segment} price list in force since {}", effective.format("%Y-%m-%d"));
        for entry in table.entries() {
            println!("{:>8}  {}", entry.price, entry.label);
        }
    }
    Ok(())
}
