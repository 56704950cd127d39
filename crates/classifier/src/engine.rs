//! Batch driver.
//!
//! Loads registration records from CSV and classifies them in order,
//! threading one `FleetStats` through every call. The first record that
//! fails to classify stops the batch.

use log::info;
use serde::Serialize;

use crate::error::ClassifyError;
use crate::model::{Resolution, VehicleRecord};
use crate::resolver::Resolver;
use crate::stats::FleetStats;

/// Result of a completed batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub resolutions: Vec<Resolution>,
    pub stats: FleetStats,
}

/// Classify every record with a fresh accumulator.
pub fn run(resolver: &Resolver, records: &[VehicleRecord]) -> Result<BatchOutcome, ClassifyError> {
    info!("classifying {} records", records.len());

    let mut stats = FleetStats::new();
    let mut resolutions = Vec::with_capacity(records.len());
    for record in records {
        resolutions.push(resolver.resolve(&mut stats, record)?);
    }

    info!(
        "classified {} records into {} trims",
        resolutions.len(),
        stats.trims.len()
    );
    Ok(BatchOutcome { resolutions, stats })
}

// ---------------------------------------------------------------------------
// CSV loading
// ---------------------------------------------------------------------------

/// Load registration records from CSV with a header row.
///
/// Columns are found by name:
/// `plate,variant,trim,type_approval,price,color,date,taxi,export,named`.
/// Extra columns are ignored. Code fields are kept verbatim for the
/// resolver to validate.
pub fn load_csv_records(csv_data: &str) -> Result<Vec<VehicleRecord>, ClassifyError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ClassifyError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();

    let idx = |name: &str| -> Result<usize, ClassifyError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ClassifyError::MissingColumn { column: name.into() })
    };

    let plate_idx = idx("plate")?;
    let variant_idx = idx("variant")?;
    let trim_idx = idx("trim")?;
    let approval_idx = idx("type_approval")?;
    let price_idx = idx("price")?;
    let color_idx = idx("color")?;
    let date_idx = idx("date")?;
    let taxi_idx = idx("taxi")?;
    let export_idx = idx("export")?;
    let named_idx = idx("named")?;

    let mut records = Vec::new();

    for (i, row) in reader.records().enumerate() {
        let row = row.map_err(|e| ClassifyError::Io(e.to_string()))?;
        // Header is line 1.
        let line = i + 2;
        let field = |idx: usize| row.get(idx).unwrap_or("").to_string();
        let flag = |idx: usize, column: &str| -> Result<bool, ClassifyError> {
            let value = row.get(idx).unwrap_or("");
            parse_flag(value).ok_or_else(|| {
                ClassifyError::Io(format!("line {line}: invalid {column} flag '{value}'"))
            })
        };

        records.push(VehicleRecord {
            plate: field(plate_idx),
            variant: field(variant_idx),
            trim: field(trim_idx),
            type_approval: field(approval_idx),
            price: field(price_idx),
            color: field(color_idx),
            date: field(date_idx),
            taxi: flag(taxi_idx, "taxi")?,
            exported: flag(export_idx, "export")?,
            named: flag(named_idx, "named")?,
        });
    }

    Ok(records)
}

/// Registry exports use Ja/Nee; hand-made files tend to use true/false.
fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "" | "nee" | "no" | "false" | "0" => Some(false),
        "ja" | "yes" | "true" | "1" => Some(true),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "plate,variant,trim,type_approval,price,color,date,taxi,export,named\n";

    #[test]
    fn loads_records_by_header_name() {
        let csv = "named,plate,date,color,price,type_approval,trim,variant,export,taxi,extra\n\
                   Ja,N331SH,20210917,GRIJS,61090,e9*2018/858*11054*01,E11B11,F5E32,Nee,,x\n";
        let records = load_csv_records(csv).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.plate, "N331SH");
        assert_eq!(r.variant, "F5E32");
        assert_eq!(r.trim, "E11B11");
        assert_eq!(r.type_approval, "e9*2018/858*11054*01");
        assert_eq!(r.price, "61090");
        assert_eq!(r.color, "GRIJS");
        assert_eq!(r.date, "20210917");
        assert!(r.named);
        assert!(!r.taxi);
        assert!(!r.exported);
    }

    #[test]
    fn fields_are_trimmed() {
        let csv = format!(
            "{HEADER} L162KD , F5E14 ,E11A11,e9*2018/858*11054*01, 58000 ,ZWART,20210601,true,1,no\n"
        );
        let records = load_csv_records(&csv).unwrap();
        assert_eq!(records[0].plate, "L162KD");
        assert_eq!(records[0].price, "58000");
        assert!(records[0].taxi);
        assert!(records[0].exported);
        assert!(!records[0].named);
    }

    #[test]
    fn missing_column() {
        let csv = "plate,variant,trim,type_approval,price,color,date,taxi,named\n";
        let err = load_csv_records(csv).unwrap_err();
        assert!(matches!(err, ClassifyError::MissingColumn { ref column } if column == "export"));
    }

    #[test]
    fn invalid_flag_names_the_line() {
        let csv = format!(
            "{HEADER}A,F5E14,E11A11,x,58000,ZWART,20210601,,,\n\
             B,F5E14,E11A11,x,58000,ZWART,20210601,maybe,,\n"
        );
        let err = load_csv_records(&csv).unwrap_err();
        assert_eq!(err.to_string(), "IO error: line 3: invalid taxi flag 'maybe'");
    }

    #[test]
    fn empty_input_has_no_records() {
        assert!(load_csv_records(HEADER).unwrap().is_empty());
    }

    #[test]
    fn run_counts_every_record() {
        let records = vec![
            VehicleRecord {
                plate: "L162KD".into(),
                variant: "F5E14".into(),
                trim: "E11A11".into(),
                type_approval: "e9*2018/858*11054*01".into(),
                price: "61000".into(),
                color: "ZWART".into(),
                date: "20210601".into(),
                ..Default::default()
            },
            VehicleRecord {
                plate: "X001AA".into(),
                variant: "F5E14".into(),
                trim: "E11A11".into(),
                type_approval: "e9*2018/858*11054*01".into(),
                price: "58000".into(),
                color: "ROOD".into(),
                date: "20210601".into(),
                named: true,
                ..Default::default()
            },
        ];
        let outcome = run(&Resolver::builtin(), &records).unwrap();
        assert_eq!(outcome.resolutions.len(), 2);
        assert_eq!(outcome.stats.total, 2);
        assert_eq!(outcome.stats.trim_total(), 2);
        assert!(outcome.resolutions.iter().all(|r| r.is_limited_edition()));
    }

    #[test]
    fn run_stops_at_first_failure() {
        let records = vec![VehicleRecord {
            plate: "BAD001".into(),
            variant: "F5P41".into(),
            ..Default::default()
        }];
        let err = run(&Resolver::builtin(), &records).unwrap_err();
        assert_eq!(err.plate(), Some("BAD001"));
    }
}
