//! `regtrim-classifier` — Trim classification for registered vehicles.
//!
//! Pure engine crate: receives raw registration records, returns the trim
//! each one was most likely sold as, and accumulates fleet statistics.
//! No CLI or IO dependencies beyond parsing CSV and TOML text.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod hypothesis;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod resolver;
pub mod stats;

pub use catalog::PriceCatalog;
pub use config::ClassifierConfig;
pub use engine::{load_csv_records, run, BatchOutcome};
pub use error::ClassifyError;
pub use history::build_catalog;
pub use model::{Resolution, VehicleRecord};
pub use normalize::normalize_label;
pub use resolver::Resolver;
pub use stats::FleetStats;
