//! Versioned price lists.
//!
//! A [`PriceCatalog`] maps `(effective date, segment)` to a [`PriceTable`]
//! of absolute price → configuration. Tables are filled from a handful of
//! base trim prices by adding the fixed option deltas each trim offers;
//! when two configurations land on the same price the later one wins.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{BatteryClass, Drivetrain, Revision, Segment};

// ---------------------------------------------------------------------------
// Trims and options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Trim {
    Style,
    Connect,
    #[serde(rename = "Connect+")]
    ConnectPlus,
    Lounge,
    #[serde(rename = "N Line")]
    NLine,
    #[serde(rename = "N Line Edition")]
    NLineEdition,
}

impl Trim {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Style => "Style",
            Self::Connect => "Connect",
            Self::ConnectPlus => "Connect+",
            Self::Lounge => "Lounge",
            Self::NLine => "N Line",
            Self::NLineEdition => "N Line Edition",
        }
    }

    /// Vehicle-to-load is standard from Connect upwards.
    pub fn standard_v2l(&self) -> bool {
        !matches!(self, Self::Style)
    }

    /// Heat pump is standard from Connect+ upwards.
    pub fn standard_heat_pump(&self) -> bool {
        !matches!(self, Self::Style | Self::Connect)
    }

    /// Option combinations offered on this trim, in insertion order.
    fn option_sets(&self, without_fca: bool, mirrors: bool) -> Vec<Vec<TrimOption>> {
        use TrimOption::*;

        let mut sets: Vec<Vec<TrimOption>> = vec![vec![]];
        match self {
            Self::Style => {
                sets.push(vec![HeatPump]);
                sets.push(vec![HeatPump, V2l]);
            }
            Self::Connect => {
                sets.push(vec![HeatPump]);
                if without_fca {
                    sets.push(vec![WithoutFca]);
                    sets.push(vec![HeatPump, WithoutFca]);
                }
            }
            Self::ConnectPlus | Self::NLineEdition => {
                if without_fca {
                    sets.push(vec![WithoutFca]);
                }
            }
            Self::Lounge | Self::NLine => {
                let roofs: [&[TrimOption]; 3] = [&[], &[PanoramicRoof], &[SolarRoof]];
                sets.clear();
                sets.extend(roofs.iter().map(|r| r.to_vec()));
                if without_fca {
                    sets.extend(roofs.iter().map(|r| with(r, &[WithoutFca])));
                }
                if mirrors {
                    sets.extend(roofs.iter().map(|r| with(r, &[DigitalMirrors])));
                    if without_fca {
                        sets.extend(
                            roofs.iter().map(|r| with(r, &[DigitalMirrors, WithoutFca])),
                        );
                    }
                }
            }
        }
        sets
    }
}

fn with(base: &[TrimOption], extra: &[TrimOption]) -> Vec<TrimOption> {
    base.iter().chain(extra).copied().collect()
}

impl fmt::Display for Trim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimOption {
    HeatPump,
    V2l,
    PanoramicRoof,
    SolarRoof,
    DigitalMirrors,
    /// Deletes the FCA-JX/HDA2 driver assistance package.
    WithoutFca,
}

impl TrimOption {
    pub fn price_delta(&self) -> i64 {
        match self {
            Self::HeatPump => 1200,
            Self::V2l => 795,
            Self::PanoramicRoof => 895,
            Self::SolarRoof => 1200,
            Self::DigitalMirrors => 1400,
            Self::WithoutFca => -750,
        }
    }

    fn phrase(&self) -> &'static str {
        match self {
            Self::HeatPump => "heat pump",
            Self::V2l => "V2L",
            Self::PanoramicRoof => "panoramic roof",
            Self::SolarRoof => "solar roof",
            Self::DigitalMirrors => "digital exterior mirrors",
            Self::WithoutFca => "FCA-JX/HDA2",
        }
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// What a price-list entry stands for, kept alongside the rendered label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    pub kwh: u16,
    pub drivetrain: Drivetrain,
    pub trim: Trim,
    pub options: Vec<TrimOption>,
    pub price_list: String,
}

impl Configuration {
    pub fn has(&self, option: TrimOption) -> bool {
        self.options.contains(&option)
    }

    pub fn label(&self) -> String {
        let mut label = format!("{} kWh ", self.kwh);
        if self.drivetrain == Drivetrain::Awd {
            label.push_str("AWD ");
        }
        label.push_str(self.trim.name());

        let added: Vec<&str> = self
            .options
            .iter()
            .filter(|o| **o != TrimOption::WithoutFca)
            .map(TrimOption::phrase)
            .collect();
        if !added.is_empty() {
            label.push_str(" with ");
            label.push_str(&added.join(" and "));
        }
        if self.has(TrimOption::WithoutFca) {
            label.push_str(" without ");
            label.push_str(TrimOption::WithoutFca.phrase());
        }

        label.push_str(&format!(" (price list {})", self.price_list));
        label
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceListEntry {
    pub price: i64,
    pub label: String,
    pub configuration: Configuration,
}

impl PriceListEntry {
    pub fn new(price: i64, configuration: Configuration) -> Self {
        Self { price, label: configuration.label(), configuration }
    }
}

/// Prices of one segment for one effective date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriceTable {
    entries: BTreeMap<i64, PriceListEntry>,
}

impl PriceTable {
    /// Insert an entry; an existing entry at the same price is replaced.
    pub fn insert(&mut self, entry: PriceListEntry) -> Option<PriceListEntry> {
        self.entries.insert(entry.price, entry)
    }

    pub fn get(&self, price: i64) -> Option<&PriceListEntry> {
        self.entries.get(&price)
    }

    /// Entries in ascending price order.
    pub fn entries(&self) -> impl Iterator<Item = &PriceListEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Generations
// ---------------------------------------------------------------------------

/// One dated manufacturer price list for a segment.
#[derive(Debug, Clone)]
pub struct Generation {
    pub effective: NaiveDate,
    pub battery: BatteryClass,
    pub drivetrain: Drivetrain,
    pub kwh: u16,
    pub revision: Option<Revision>,
    /// Name used in the `(price list ...)` suffix.
    pub price_list: String,
    /// Whether the FCA-JX/HDA2 package could be deleted for a refund.
    pub without_fca: bool,
    pub base_prices: Vec<(Trim, i64)>,
    /// Per-trim discounts, each published as its own price list.
    pub discounts: Vec<(Trim, i64)>,
}

impl Generation {
    pub fn segment(&self) -> Segment {
        let segment = Segment::new(self.battery, self.drivetrain);
        match self.revision {
            Some(revision) => segment.revised(revision),
            None => segment,
        }
    }

    fn derive(&self, table: &mut PriceTable, trim: Trim, base: i64, price_list: &str) {
        let mirrors = self.revision == Some(Revision::ModelYear2023);
        for options in trim.option_sets(self.without_fca, mirrors) {
            let price = base + options.iter().map(TrimOption::price_delta).sum::<i64>();
            let configuration = Configuration {
                kwh: self.kwh,
                drivetrain: self.drivetrain,
                trim,
                options,
                price_list: price_list.to_string(),
            };
            table.insert(PriceListEntry::new(price, configuration));
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct PriceCatalog {
    tables: BTreeMap<(NaiveDate, Segment), PriceTable>,
}

impl PriceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive every priced configuration of `generation` into its table.
    ///
    /// Regular prices go in first, discounted prices after them, so a
    /// discounted configuration replaces a regular one at the same price.
    pub fn add_generation(&mut self, generation: &Generation) {
        let table = self
            .tables
            .entry((generation.effective, generation.segment()))
            .or_default();

        for &(trim, base) in &generation.base_prices {
            generation.derive(table, trim, base, &generation.price_list);
        }
        for &(trim, discount) in &generation.discounts {
            let Some(&(_, base)) = generation.base_prices.iter().find(|(t, _)| *t == trim)
            else {
                continue;
            };
            let name = format!("{} E{discount} discount", generation.price_list);
            generation.derive(table, trim, base - discount, &name);
        }
    }

    pub fn lookup(&self, effective: NaiveDate, segment: Segment, price: i64) -> Option<&str> {
        self.table(effective, segment)
            .and_then(|t| t.get(price))
            .map(|e| e.label.as_str())
    }

    pub fn table(&self, effective: NaiveDate, segment: Segment) -> Option<&PriceTable> {
        self.tables.get(&(effective, segment))
    }

    /// Effective dates known for `segment`, newest first.
    pub fn effective_dates(&self, segment: Segment) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .tables
            .keys()
            .filter(|(_, s)| *s == segment)
            .map(|(d, _)| *d)
            .collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates
    }

    pub fn segments(&self) -> Vec<Segment> {
        let mut segments: Vec<Segment> = self.tables.keys().map(|(_, s)| *s).collect();
        segments.sort();
        segments.dedup();
        segments
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn generation(trim: Trim, base: i64, without_fca: bool) -> Generation {
        Generation {
            effective: date(2022, 5, 1),
            battery: BatteryClass::Large,
            drivetrain: Drivetrain::Rwd,
            kwh: 73,
            revision: None,
            price_list: "May 2022".into(),
            without_fca,
            base_prices: vec![(trim, base)],
            discounts: vec![],
        }
    }

    #[test]
    fn style_options() {
        let mut catalog = PriceCatalog::new();
        catalog.add_generation(&generation(Trim::Style, 47905, true));
        let table = catalog.table(date(2022, 5, 1), Segment::LARGE).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(47905).unwrap().label, "73 kWh Style (price list May 2022)");
        assert_eq!(
            table.get(49105).unwrap().label,
            "73 kWh Style with heat pump (price list May 2022)"
        );
        assert_eq!(
            table.get(49900).unwrap().label,
            "73 kWh Style with heat pump and V2L (price list May 2022)"
        );
    }

    #[test]
    fn connect_plus_only_has_fca_deletion_when_offered() {
        let mut catalog = PriceCatalog::new();
        catalog.add_generation(&generation(Trim::ConnectPlus, 55005, false));
        assert_eq!(catalog.table(date(2022, 5, 1), Segment::LARGE).unwrap().len(), 1);

        let mut catalog = PriceCatalog::new();
        catalog.add_generation(&generation(Trim::ConnectPlus, 55005, true));
        assert_eq!(
            catalog.lookup(date(2022, 5, 1), Segment::LARGE, 54255),
            Some("73 kWh Connect+ without FCA-JX/HDA2 (price list May 2022)")
        );
    }

    #[test]
    fn lounge_with_mirrors_on_revised_segment() {
        let mut g = generation(Trim::Lounge, 57405, true);
        g.kwh = 77;
        g.revision = Some(Revision::ModelYear2023);
        let mut catalog = PriceCatalog::new();
        catalog.add_generation(&g);

        let segment = Segment::LARGE.revised(Revision::ModelYear2023);
        let table = catalog.table(date(2022, 5, 1), segment).unwrap();
        assert_eq!(table.len(), 12);
        assert_eq!(
            table.get(57405 + 895 + 1400 - 750).unwrap().label,
            "77 kWh Lounge with panoramic roof and digital exterior mirrors without FCA-JX/HDA2 (price list May 2022)"
        );
        assert!(catalog.table(date(2022, 5, 1), Segment::LARGE).is_none());
    }

    #[test]
    fn discount_list_overwrites_on_collision() {
        let mut g = generation(Trim::Lounge, 57405, true);
        g.discounts = vec![(Trim::Lounge, 1200)];
        let mut catalog = PriceCatalog::new();
        catalog.add_generation(&g);

        // 57405 - 1200 + 1200 (solar roof) lands on the regular base price.
        let entry = catalog.table(date(2022, 5, 1), Segment::LARGE).unwrap().get(57405).unwrap();
        assert_eq!(
            entry.label,
            "73 kWh Lounge with solar roof (price list May 2022 E1200 discount)"
        );
        assert!(entry.configuration.has(TrimOption::SolarRoof));
    }

    #[test]
    fn effective_dates_newest_first() {
        let mut catalog = PriceCatalog::new();
        let mut a = generation(Trim::Style, 1, true);
        a.effective = date(2021, 5, 1);
        let b = generation(Trim::Style, 1, true);
        catalog.add_generation(&b);
        catalog.add_generation(&a);
        assert_eq!(
            catalog.effective_dates(Segment::LARGE),
            vec![date(2022, 5, 1), date(2021, 5, 1)]
        );
        assert!(catalog.effective_dates(Segment::SMALL).is_empty());
    }
}
