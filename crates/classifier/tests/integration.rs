use std::path::PathBuf;

use regtrim_classifier::engine::{load_csv_records, run};
use regtrim_classifier::model::{MatchKind, PaintFinish, VehicleRecord};
use regtrim_classifier::stats::FleetStats;
use regtrim_classifier::{ClassifierConfig, ClassifyError, Resolver};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn load_records(name: &str) -> Vec<VehicleRecord> {
    load_csv_records(&read_fixture(name)).unwrap()
}

fn record(plate: &str, variant: &str, trim: &str, ta: &str, price: &str, color: &str, date: &str) -> VehicleRecord {
    VehicleRecord {
        plate: plate.into(),
        variant: variant.into(),
        trim: trim.into(),
        type_approval: format!("e9*2018/858*11054*{ta}"),
        price: price.into(),
        color: color.into(),
        date: date.into(),
        named: true,
        ..Default::default()
    }
}

// -------------------------------------------------------------------------
// Single records
// -------------------------------------------------------------------------

#[test]
fn grey_lounge_on_first_price_list() {
    let resolver = Resolver::builtin();
    let mut stats = FleetStats::new();
    let r = resolver
        .resolve(&mut stats, &record("N101AA", "F5E32", "E11B11", "01", "55600", "GRIJS", "20210917"))
        .unwrap();

    assert_eq!(r.label, "73 kWh Lounge (price list May 2021) (model 2022)");
    assert_eq!(r.match_kind, MatchKind::Exact);
    assert_eq!(r.paint_finish, PaintFinish::Metallic);
    assert_eq!(stats.trims.get("73 kWh Lounge"), Some(&1));
    assert_eq!(stats.paint_count(PaintFinish::Metallic), 1);
}

#[test]
fn limited_edition_price_short_circuits() {
    let resolver = Resolver::builtin();
    let mut stats = FleetStats::new();
    let r = resolver
        .resolve(&mut stats, &record("N200AA", "F5E14", "E11B11", "01", "58000", "ZWART", "20211001"))
        .unwrap();

    assert_eq!(r.label, "PROJECT45 (model 2022)");
    assert_eq!(r.match_kind, MatchKind::LimitedEdition);
    assert_eq!(r.trim_key, "PROJECT45");
}

#[test]
fn registration_before_window_fails() {
    let resolver = Resolver::builtin();
    let mut stats = FleetStats::new();
    let err = resolver
        .resolve(&mut stats, &record("N300AA", "F5E32", "E11B11", "01", "55600", "GRIJS", "20200101"))
        .unwrap_err();

    assert!(matches!(err, ClassifyError::DateOutOfRange { .. }));
    assert_eq!(err.plate(), Some("N300AA"));
    assert_eq!(stats.total, 0);
}

#[test]
fn white_matte_when_only_the_matte_price_exists() {
    let resolver = Resolver::builtin();
    let mut stats = FleetStats::new();
    let r = resolver
        .resolve(&mut stats, &record("N102AA", "F5E32", "E11B11", "04", "55995", "WIT", "20230115"))
        .unwrap();

    assert_eq!(
        r.label,
        "73 kWh Connect (price list Jan 2023) (Atlas White Matte) (20 inch wheels) (model 2023)"
    );
    assert_eq!(r.paint_finish, PaintFinish::Matte);
    assert_eq!(r.trim_key, "73 kWh Connect");
}

// -------------------------------------------------------------------------
// Batches
// -------------------------------------------------------------------------

#[test]
fn batch_over_csv_fixture() {
    let records = load_records("records.csv");
    assert_eq!(records.len(), 5);

    let outcome = run(&Resolver::builtin(), &records).unwrap();
    let stats = &outcome.stats;

    assert_eq!(outcome.resolutions.len(), 5);
    assert_eq!(stats.total, 5);
    assert_eq!(stats.trim_total(), 5);
    assert_eq!(stats.trims.get("73 kWh Lounge"), Some(&2));
    assert_eq!(stats.trims.get("PROJECT45"), Some(&1));
    assert_eq!(stats.trims.get("73 kWh Connect"), Some(&1));
    assert_eq!(stats.trims.get("58 kWh Style"), Some(&1));
    assert_eq!(stats.taxi, 1);
    assert_eq!(stats.exported, 1);

    let labels: Vec<&str> = outcome.resolutions.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "73 kWh Lounge (price list May 2021) (model 2022)",
            "PROJECT45 (19 inch wheels) (model 2022)",
            "73 kWh Connect (price list Jan 2023) (Atlas White Matte) (20 inch wheels) (model 2023)",
            "58 kWh Style (price list May 2021) (model 2022)",
            "73 kWh Lounge (price list May 2021) (19 inch wheels) (Taxi) (exported) (model 2022.5)",
        ]
    );

    let ranking = stats.ranking();
    assert_eq!(ranking[0].key, "73 kWh Lounge");
    assert_eq!(ranking[0].count, 2);
    assert_eq!(ranking[0].not_named, 1);
}

#[test]
fn batch_stops_at_bad_record() {
    let records = load_records("bad_date.csv");
    let err = run(&Resolver::builtin(), &records).unwrap_err();
    assert_eq!(err.plate(), Some("N666ZZ"));
    assert!(err.to_string().contains("20200101"));
}

#[test]
fn merged_partial_batches_equal_one_batch() {
    let records = load_records("records.csv");
    let resolver = Resolver::builtin();

    let whole = run(&resolver, &records).unwrap().stats;
    let (left, right) = records.split_at(2);
    let mut merged = run(&resolver, left).unwrap().stats;
    merged.merge(&run(&resolver, right).unwrap().stats);

    assert_eq!(merged, whole);
}

#[test]
fn stats_survive_json_persistence() {
    let records = load_records("records.csv");
    let stats = run(&Resolver::builtin(), &records).unwrap().stats;

    let json = serde_json::to_string(&stats).unwrap();
    let back: FleetStats = serde_json::from_str(&json).unwrap();
    assert_eq!(back, stats);

    let counters: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(counters["total"], 5);
    assert_eq!(counters["trim:73 kWh Lounge"], 2);
}

// -------------------------------------------------------------------------
// Configuration
// -------------------------------------------------------------------------

#[test]
fn config_fixture_override_applies() {
    let config = ClassifierConfig::from_toml(&read_fixture("classifier.toml")).unwrap();
    let resolver = Resolver::new(regtrim_classifier::build_catalog(), config);
    let mut stats = FleetStats::new();

    let r = resolver
        .resolve(&mut stats, &record("ZZ001Z", "F5P41", "E11A11", "02", "55600", "GRIJS", "20210917"))
        .unwrap();
    assert_eq!(r.label, "73 kWh Lounge (price list May 2021) (model 2022)");

    // builtin corrections are replaced, not extended
    let err = resolver
        .resolve(&mut stats, &record("R296FL", "XXXXX", "E11A11", "01", "55600", "GRIJS", "20210917"))
        .unwrap_err();
    assert!(matches!(err, ClassifyError::UnknownVariant { .. }));
}
