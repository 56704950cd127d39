//! Record classification.
//!
//! [`Resolver::resolve`] turns one raw registration into a labelled
//! [`Resolution`] and counts it in the caller's [`FleetStats`]:
//!
//! 1. apply the configured hand corrections for the plate
//! 2. validate and normalize the codes, price and date
//! 3. short-circuit the limited edition
//! 4. reverse the colour surcharge into one or two base-price hypotheses
//! 5. match them exactly, or failing that to the nearest list price
//! 6. pick one match with the per-colour rule
//! 7. annotate wheel size, taxi, export and model year
//!
//! Any malformed field, missing price list or unmatched price is an error;
//! nothing is guessed.

use chrono::NaiveDate;
use log::{debug, warn};

use crate::catalog::{Configuration, PriceCatalog, Trim};
use crate::config::ClassifierConfig;
use crate::error::ClassifyError;
use crate::history::build_catalog;
use crate::hypothesis::{disambiguate, hypotheses, paint_finish, PaintNote, Pick};
use crate::matcher::{eligible_tables, find_exact, find_nearest};
use crate::model::{
    parse_registration_date, BatteryClass, Color, MatchKind, Resolution, Revision, Segment,
    TypeApproval, VariantCode, VehicleRecord, WheelSize,
};
use crate::normalize::normalize_label;
use crate::stats::FleetStats;

/// Round to a multiple of 5: remainders 0-2 round down, 3-4 round up.
pub fn round5(price: i64) -> i64 {
    let rem = price.rem_euclid(5);
    if rem < 3 {
        price - rem
    } else {
        price + 5 - rem
    }
}

/// Catalog prices are recorded as exactly five digits.
fn parse_price(plate: &str, value: &str) -> Result<i64, ClassifyError> {
    let trimmed = value.trim();
    if trimmed.len() != 5 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClassifyError::InvalidPrice { plate: plate.into(), value: value.into() });
    }
    trimmed
        .parse()
        .map_err(|_| ClassifyError::InvalidPrice { plate: plate.into(), value: value.into() })
}

fn model_2023_window(date: NaiveDate) -> bool {
    let from = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap_or_default();
    let until = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap_or_default();
    date >= from && date < until
}

/// Price table bucket for a variant.
pub fn segment_for(variant: VariantCode, model_2023: bool) -> Segment {
    let segment = Segment::new(variant.battery_class(), variant.drivetrain());
    let revised = variant.always_revised()
        || (model_2023 && variant.battery_class() == BatteryClass::Small);
    if revised {
        segment.revised(Revision::ModelYear2023)
    } else {
        segment
    }
}

/// A record with every field validated.
#[derive(Debug, Clone)]
struct Normalized {
    plate: String,
    variant: VariantCode,
    wheel_size: WheelSize,
    type_approval: TypeApproval,
    color: Color,
    date: NaiveDate,
    price: i64,
    model_2023: bool,
}

/// Outcome of price matching for a regular (non limited-edition) record.
struct PricedMatch {
    label: String,
    configuration: Configuration,
    match_kind: MatchKind,
    note: Option<PaintNote>,
}

pub struct Resolver {
    catalog: PriceCatalog,
    config: ClassifierConfig,
}

impl Resolver {
    pub fn new(catalog: PriceCatalog, config: ClassifierConfig) -> Self {
        Self { catalog, config }
    }

    /// Historical price lists with the built-in corrections.
    pub fn builtin() -> Self {
        Self::new(build_catalog(), ClassifierConfig::builtin())
    }

    pub fn catalog(&self) -> &PriceCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    fn normalize(&self, record: &VehicleRecord) -> Result<Normalized, ClassifyError> {
        let plate = record.plate.trim().to_string();
        let patch = self.config.override_for(&plate);
        if patch.is_some() {
            debug!("{plate}: applying configured correction");
        }

        let variant_code = patch.and_then(|o| o.variant.as_deref()).unwrap_or(&record.variant);
        let trim_code = patch.and_then(|o| o.trim.as_deref()).unwrap_or(&record.trim);
        let approval_code = patch
            .and_then(|o| o.type_approval.as_deref())
            .unwrap_or(&record.type_approval);

        let variant = VariantCode::from_code(variant_code).ok_or_else(|| {
            ClassifyError::UnknownVariant { plate: plate.clone(), code: variant_code.into() }
        })?;
        let wheel_size = WheelSize::from_code(trim_code).ok_or_else(|| {
            ClassifyError::UnknownTrimCode { plate: plate.clone(), code: trim_code.into() }
        })?;
        if wheel_size == WheelSize::Inch20 && variant.battery_class() == BatteryClass::Small {
            return Err(ClassifyError::WheelSizeNotOffered {
                plate,
                variant: variant.code().into(),
            });
        }
        let type_approval = TypeApproval::from_code(approval_code).ok_or_else(|| {
            ClassifyError::UnknownTypeApproval { plate: plate.clone(), code: approval_code.into() }
        })?;
        let color = Color::from_code(&record.color).ok_or_else(|| ClassifyError::UnknownColor {
            plate: plate.clone(),
            color: record.color.clone(),
        })?;
        let date = parse_registration_date(&plate, &record.date)?;
        let raw_price = match patch.and_then(|o| o.price) {
            Some(price) => price,
            None => parse_price(&plate, &record.price)?,
        };

        let model_2023 = type_approval.revision == 4 && model_2023_window(date);
        Ok(Normalized {
            plate,
            variant,
            wheel_size,
            type_approval,
            color,
            date,
            price: round5(raw_price),
            model_2023,
        })
    }

    /// Classify one record and count it in `stats`.
    ///
    /// `stats` is only touched when classification succeeds.
    pub fn resolve(
        &self,
        stats: &mut FleetStats,
        record: &VehicleRecord,
    ) -> Result<Resolution, ClassifyError> {
        let n = self.normalize(record)?;
        debug!(
            "{}: {} {:?} {} price {} {} on {}",
            n.plate,
            n.variant,
            n.wheel_size,
            n.type_approval.code(),
            n.price,
            n.color,
            n.date.format("%Y%m%d")
        );

        let limited = &self.config.limited_edition;
        let (mut label, configuration, match_kind, note) =
            if limited.matches(&n.plate, n.variant, n.price) {
                (limited.label.clone(), None, MatchKind::LimitedEdition, None)
            } else {
                let m = self.match_price(&n)?;
                (m.label, Some(m.configuration), m.match_kind, m.note)
            };

        let lounge_like = match_kind == MatchKind::LimitedEdition
            || configuration.as_ref().is_some_and(|c| c.trim == Trim::Lounge);
        match n.wheel_size {
            WheelSize::Inch20 if !lounge_like => label.push_str(" (20 inch wheels)"),
            WheelSize::Inch19 if lounge_like => label.push_str(" (19 inch wheels)"),
            _ => {}
        }
        if record.taxi {
            label.push_str(" (Taxi)");
        }
        if record.exported {
            label.push_str(" (exported)");
        }
        let model_year = n.type_approval.model_year();
        if let Some(year) = model_year {
            label.push_str(&format!(" (model {})", year.tag()));
        }

        let resolution = Resolution {
            trim_key: normalize_label(&label),
            plate: n.plate,
            date: n.date,
            label,
            configuration,
            variant: n.variant,
            color: n.color,
            paint_finish: paint_finish(n.color, note),
            wheel_size: n.wheel_size,
            model_year,
            price: n.price,
            match_kind,
            taxi: record.taxi,
            exported: record.exported,
            named: record.named,
        };
        debug!("{}: resolved to [{}]", resolution.plate, resolution.label);

        stats.record(&resolution);
        Ok(resolution)
    }

    fn match_price(&self, n: &Normalized) -> Result<PricedMatch, ClassifyError> {
        let segment = segment_for(n.variant, n.model_2023);
        if eligible_tables(&self.catalog, segment, n.date).is_empty() {
            return Err(ClassifyError::NoPriceList {
                plate: n.plate.clone(),
                segment,
                date: n.date,
            });
        }

        let h = hypotheses(n.color, n.price, n.date, n.model_2023);
        debug!("{}: hypotheses {} / {:?} in {segment}", n.plate, h.primary, h.alternate);

        let mut primary = find_exact(&self.catalog, segment, n.date, h.primary);
        let mut alternate = h
            .alternate
            .and_then(|p| find_exact(&self.catalog, segment, n.date, p));

        if primary.is_none() && alternate.is_none() {
            primary = find_nearest(&self.catalog, segment, n.date, h.primary);
            alternate = h
                .alternate
                .and_then(|p| find_nearest(&self.catalog, segment, n.date, p));
            let alternate_closer = match (&primary, &alternate) {
                (Some(p), Some(a)) => Some(a.delta.abs() < p.delta.abs()),
                _ => None,
            };
            match alternate_closer {
                Some(true) => primary = None,
                Some(false) => alternate = None,
                None => {}
            }
        }

        let unresolved = || ClassifyError::Unresolved { plate: n.plate.clone(), price: n.price };
        let decision = disambiguate(n.color, n.model_2023, primary.as_ref(), alternate.as_ref())
            .ok_or_else(unresolved)?;
        if decision.conflict {
            warn!(
                "{}: two configurations match {} {}: [{}] and [{}], keeping the first",
                n.plate,
                n.color,
                n.price,
                primary.as_ref().map(|m| m.label()).unwrap_or_default(),
                alternate.as_ref().map(|m| m.label()).unwrap_or_default(),
            );
        }

        let chosen = match decision.pick {
            Pick::Primary => primary,
            Pick::Alternate => alternate,
        }
        .ok_or_else(unresolved)?;

        let mut label = chosen.label();
        if let Some(note) = decision.note {
            label.push(' ');
            label.push_str(note.annotation());
        }
        let match_kind = if chosen.is_exact() {
            MatchKind::Exact
        } else {
            MatchKind::Nearest { delta: chosen.delta }
        };
        Ok(PricedMatch {
            label,
            configuration: chosen.entry.configuration.clone(),
            match_kind,
            note: decision.note,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
