//! Fleet statistics, accumulated one resolution at a time.
//!
//! [`FleetStats`] is owned by the caller and passed into every resolve
//! call. Parallel batches keep one accumulator per worker and combine them
//! with [`FleetStats::merge`]. For persistence it converts to and from a
//! flat `counter name -> count` map, which is also its serde form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Trim, TrimOption};
use crate::error::ClassifyError;
use crate::model::{BatteryClass, Color, Drivetrain, PaintFinish, Resolution, WheelSize};

/// Flat counter mapping used for persistence.
pub type Counters = BTreeMap<String, u64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Equipment {
    HeatPump,
    V2l,
    PanoramicRoof,
    SolarRoof,
    LongRange,
    Rwd,
}

impl Equipment {
    pub const ALL: [Equipment; 6] = [
        Self::HeatPump,
        Self::V2l,
        Self::PanoramicRoof,
        Self::SolarRoof,
        Self::LongRange,
        Self::Rwd,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::HeatPump => "heat_pump",
            Self::V2l => "v2l",
            Self::PanoramicRoof => "panoramic_roof",
            Self::SolarRoof => "solar_roof",
            Self::LongRange => "long_range",
            Self::Rwd => "rwd",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }
}

pub const UNTAGGED_MODEL_YEAR: &str = "untagged";
pub const LIMITED_EDITION_LEVEL: &str = "limited_edition";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WheelCounts {
    pub inch_19: u64,
    pub inch_20: u64,
    pub lounge_19: u64,
    pub lounge_20: u64,
}

/// One line of the trim ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedTrim {
    pub key: String,
    pub count: u64,
    pub not_named: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Counters", into = "Counters")]
pub struct FleetStats {
    pub total: u64,
    /// Per normalized trim key.
    pub trims: BTreeMap<String, u64>,
    /// Per normalized trim key, vehicles not yet registered to an owner.
    pub trims_not_named: BTreeMap<String, u64>,
    pub paint: BTreeMap<PaintFinish, u64>,
    pub wheels: WheelCounts,
    pub taxi: u64,
    pub exported: u64,
    /// `2022`, `2022.5`, `2023` or `untagged`.
    pub model_years: BTreeMap<String, u64>,
    pub colors: BTreeMap<Color, u64>,
    /// Trim name, or `limited_edition`.
    pub trim_levels: BTreeMap<String, u64>,
    pub equipment: BTreeMap<Equipment, u64>,
    /// Named registrations per `YYYY-MM`.
    pub named_per_month: BTreeMap<String, u64>,
}

fn bump<K: Ord>(map: &mut BTreeMap<K, u64>, key: K) {
    *map.entry(key).or_insert(0) += 1;
}

fn add_all<K: Ord + Clone>(into: &mut BTreeMap<K, u64>, from: &BTreeMap<K, u64>) {
    for (k, v) in from {
        *into.entry(k.clone()).or_insert(0) += v;
    }
}

impl FleetStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one resolved vehicle.
    pub fn record(&mut self, r: &Resolution) {
        let limited = r.is_limited_edition();
        let configuration = r.configuration.as_ref();
        let trim = configuration.map(|c| c.trim);
        let has = |option: TrimOption| configuration.is_some_and(|c| c.has(option));
        let lounge = trim == Some(Trim::Lounge);

        self.total += 1;
        bump(&mut self.trims, r.trim_key.clone());
        if !r.named {
            bump(&mut self.trims_not_named, r.trim_key.clone());
        }
        bump(&mut self.paint, r.paint_finish);

        match r.wheel_size {
            WheelSize::Inch19 => {
                self.wheels.inch_19 += 1;
                if lounge {
                    self.wheels.lounge_19 += 1;
                }
            }
            WheelSize::Inch20 => {
                self.wheels.inch_20 += 1;
                if lounge {
                    self.wheels.lounge_20 += 1;
                }
            }
        }

        if r.taxi {
            self.taxi += 1;
        }
        if r.exported {
            self.exported += 1;
        }

        let model_year = r.model_year.map_or(UNTAGGED_MODEL_YEAR, |y| y.tag());
        bump(&mut self.model_years, model_year.to_string());
        bump(&mut self.colors, r.color);

        let level = match trim {
            _ if limited => LIMITED_EDITION_LEVEL,
            Some(t) => t.name(),
            None => "unknown",
        };
        bump(&mut self.trim_levels, level.to_string());

        let equipped = [
            (
                Equipment::HeatPump,
                limited || has(TrimOption::HeatPump) || trim.is_some_and(|t| t.standard_heat_pump()),
            ),
            (
                Equipment::V2l,
                limited || has(TrimOption::V2l) || trim.is_some_and(|t| t.standard_v2l()),
            ),
            (Equipment::PanoramicRoof, has(TrimOption::PanoramicRoof)),
            (Equipment::SolarRoof, limited || has(TrimOption::SolarRoof)),
            (Equipment::LongRange, r.variant.battery_class() == BatteryClass::Large),
            (Equipment::Rwd, !limited && r.variant.drivetrain() == Drivetrain::Rwd),
        ];
        for (equipment, present) in equipped {
            if present {
                bump(&mut self.equipment, equipment);
            }
        }

        if r.named {
            bump(&mut self.named_per_month, r.date.format("%Y-%m").to_string());
        }
    }

    /// Add every counter of `other` into `self`.
    pub fn merge(&mut self, other: &FleetStats) {
        self.total += other.total;
        add_all(&mut self.trims, &other.trims);
        add_all(&mut self.trims_not_named, &other.trims_not_named);
        add_all(&mut self.paint, &other.paint);
        self.wheels.inch_19 += other.wheels.inch_19;
        self.wheels.inch_20 += other.wheels.inch_20;
        self.wheels.lounge_19 += other.wheels.lounge_19;
        self.wheels.lounge_20 += other.wheels.lounge_20;
        self.taxi += other.taxi;
        self.exported += other.exported;
        add_all(&mut self.model_years, &other.model_years);
        add_all(&mut self.colors, &other.colors);
        add_all(&mut self.trim_levels, &other.trim_levels);
        add_all(&mut self.equipment, &other.equipment);
        add_all(&mut self.named_per_month, &other.named_per_month);
    }

    /// Sum of the per-trim counters; equals `total` for any accumulator
    /// built with [`record`](Self::record) and [`merge`](Self::merge).
    pub fn trim_total(&self) -> u64 {
        self.trims.values().sum()
    }

    pub fn paint_count(&self, finish: PaintFinish) -> u64 {
        self.paint.get(&finish).copied().unwrap_or(0)
    }

    pub fn equipment_count(&self, equipment: Equipment) -> u64 {
        self.equipment.get(&equipment).copied().unwrap_or(0)
    }

    /// Named registrations per calendar year.
    pub fn named_per_year(&self) -> BTreeMap<String, u64> {
        let mut years = BTreeMap::new();
        for (month, count) in &self.named_per_month {
            let year = month.split('-').next().unwrap_or(month).to_string();
            *years.entry(year).or_insert(0) += count;
        }
        years
    }

    /// Trim keys by count, most frequent first; larger battery first on
    /// equal counts, keys without a capacity ahead of those with one.
    pub fn ranking(&self) -> Vec<RankedTrim> {
        let mut ranked: Vec<RankedTrim> = self
            .trims
            .iter()
            .map(|(key, count)| RankedTrim {
                key: key.clone(),
                count: *count,
                not_named: self.trims_not_named.get(key).copied().unwrap_or(0),
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| capacity(&b.key).cmp(&capacity(&a.key)))
                .then_with(|| a.key.cmp(&b.key))
        });
        ranked
    }

    // -----------------------------------------------------------------------
    // Counter mapping
    // -----------------------------------------------------------------------

    pub fn to_counters(&self) -> Counters {
        let mut out = Counters::new();
        out.insert("total".into(), self.total);
        out.insert("taxi".into(), self.taxi);
        out.insert("exported".into(), self.exported);
        out.insert("wheels:19".into(), self.wheels.inch_19);
        out.insert("wheels:20".into(), self.wheels.inch_20);
        out.insert("lounge_wheels:19".into(), self.wheels.lounge_19);
        out.insert("lounge_wheels:20".into(), self.wheels.lounge_20);

        let mut section = |prefix: &str, entries: Vec<(String, u64)>| {
            for (k, v) in entries {
                out.insert(format!("{prefix}:{k}"), v);
            }
        };
        let owned = |m: &BTreeMap<String, u64>| m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        section("trim", owned(&self.trims));
        section("trim_not_named", owned(&self.trims_not_named));
        section("model_year", owned(&self.model_years));
        section("trim_level", owned(&self.trim_levels));
        section("named_month", owned(&self.named_per_month));
        section("paint", self.paint.iter().map(|(k, v)| (k.name().to_string(), *v)).collect());
        section("color", self.colors.iter().map(|(k, v)| (k.code().to_string(), *v)).collect());
        section(
            "equipment",
            self.equipment.iter().map(|(k, v)| (k.name().to_string(), *v)).collect(),
        );
        out
    }

    pub fn from_counters(counters: &Counters) -> Result<Self, ClassifyError> {
        let mut stats = FleetStats::new();
        for (name, &value) in counters {
            let unknown = |reason: &str| ClassifyError::CounterParse {
                counter: name.clone(),
                reason: reason.to_string(),
            };
            match name.split_once(':') {
                None => match name.as_str() {
                    "total" => stats.total = value,
                    "taxi" => stats.taxi = value,
                    "exported" => stats.exported = value,
                    _ => return Err(unknown("unknown counter")),
                },
                Some((prefix, key)) => {
                    if key.is_empty() {
                        return Err(unknown("empty counter key"));
                    }
                    match prefix {
                        "trim" => {
                            stats.trims.insert(key.to_string(), value);
                        }
                        "trim_not_named" => {
                            stats.trims_not_named.insert(key.to_string(), value);
                        }
                        "model_year" => {
                            stats.model_years.insert(key.to_string(), value);
                        }
                        "trim_level" => {
                            stats.trim_levels.insert(key.to_string(), value);
                        }
                        "named_month" => {
                            stats.named_per_month.insert(key.to_string(), value);
                        }
                        "paint" => {
                            let finish = PaintFinish::from_name(key)
                                .ok_or_else(|| unknown("unknown paint finish"))?;
                            stats.paint.insert(finish, value);
                        }
                        "color" => {
                            let color =
                                Color::from_code(key).ok_or_else(|| unknown("unknown colour"))?;
                            stats.colors.insert(color, value);
                        }
                        "equipment" => {
                            let equipment = Equipment::from_name(key)
                                .ok_or_else(|| unknown("unknown equipment"))?;
                            stats.equipment.insert(equipment, value);
                        }
                        "wheels" | "lounge_wheels" => {
                            let lounge = prefix == "lounge_wheels";
                            let slot = match (lounge, key) {
                                (false, "19") => &mut stats.wheels.inch_19,
                                (false, "20") => &mut stats.wheels.inch_20,
                                (true, "19") => &mut stats.wheels.lounge_19,
                                (true, "20") => &mut stats.wheels.lounge_20,
                                _ => return Err(unknown("unknown wheel size")),
                            };
                            *slot = value;
                        }
                        _ => return Err(unknown("unknown counter")),
                    }
                }
            }
        }
        Ok(stats)
    }
}

/// Leading `NN kWh` of a trim key; keys without one sort as largest.
fn capacity(key: &str) -> u16 {
    key.split(' ')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(u16::MAX)
}

impl TryFrom<Counters> for FleetStats {
    type Error = ClassifyError;

    fn try_from(counters: Counters) -> Result<Self, Self::Error> {
        FleetStats::from_counters(&counters)
    }
}

impl From<FleetStats> for Counters {
    fn from(stats: FleetStats) -> Self {
        stats.to_counters()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
