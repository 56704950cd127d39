//! Colour surcharges and paint-finish disambiguation.
//!
//! The registry only records a colour family. Some families cover two
//! paints with different surcharges, so the observed price yields one or
//! two candidate base prices, and a fixed per-colour rule decides which
//! match to keep.

use chrono::NaiveDate;

use crate::catalog::TrimOption;
use crate::matcher::PriceMatch;
use crate::model::{Color, PaintFinish};

const WHITE_SOLID: i64 = 695;
const METALLIC: i64 = 895;
const MATTE: i64 = 1095;

/// Candidate base prices for one observed price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hypotheses {
    pub primary: i64,
    /// Only set when it differs from the primary.
    pub alternate: Option<i64>,
}

/// Reverse the colour surcharge.
pub fn hypotheses(color: Color, price: i64, date: NaiveDate, model_2023: bool) -> Hypotheses {
    let (primary, alternate) = match color {
        Color::White if model_2023 => (price - WHITE_SOLID, Some(price - MATTE)),
        Color::White => (price - WHITE_SOLID, None),
        Color::Black => (price - METALLIC, None),
        Color::Blue if date > blue_pearl_from() => (price, Some(price - METALLIC)),
        Color::Blue => (price - METALLIC, None),
        Color::Yellow => (price - MATTE, None),
        Color::Grey => (price - METALLIC, Some(price - MATTE)),
        Color::Green => (price, Some(price - METALLIC)),
        Color::Brown | Color::Red => (price, None),
    };
    let alternate = alternate.filter(|a| *a != 0 && *a != primary);
    Hypotheses { primary, alternate }
}

/// Blue registered after this day may also be the unpainted base price.
fn blue_pearl_from() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 8, 1).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Disambiguation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    Primary,
    Alternate,
}

/// Paint annotation appended to the chosen label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintNote {
    ShootingStar,
    AtlasWhiteMatte,
    Olive,
    TealOrOliveWithPanoramicRoof,
}

impl PaintNote {
    pub fn annotation(&self) -> &'static str {
        match self {
            Self::ShootingStar => "(Shooting Star)",
            Self::AtlasWhiteMatte => "(Atlas White Matte)",
            Self::Olive => "(Olive)",
            Self::TealOrOliveWithPanoramicRoof => {
                "(Digital Teal/Mystic Olive with Panoramic Roof)"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub pick: Pick,
    pub note: Option<PaintNote>,
    /// Both hypotheses matched for a colour with a single paint.
    pub conflict: bool,
}

impl Decision {
    fn new(pick: Pick, note: Option<PaintNote>) -> Self {
        Self { pick, note, conflict: false }
    }
}

/// Choose between the matches of the two hypotheses.
pub fn disambiguate(
    color: Color,
    model_2023: bool,
    primary: Option<&PriceMatch<'_>>,
    alternate: Option<&PriceMatch<'_>>,
) -> Option<Decision> {
    use PaintNote::*;
    use Pick::*;

    let decision = match (color, primary, alternate) {
        (_, None, None) => return None,

        (Color::Grey, Some(_), _) => Decision::new(Primary, None),
        (Color::Grey, None, Some(_)) => Decision::new(Alternate, Some(ShootingStar)),

        (Color::White, Some(_), Some(_)) if model_2023 => {
            Decision::new(Alternate, Some(AtlasWhiteMatte))
        }
        (Color::White, Some(_), _) => Decision::new(Primary, None),
        (Color::White, None, Some(_)) => Decision::new(Alternate, Some(AtlasWhiteMatte)),

        (Color::Green, Some(p), Some(_)) if p.entry.configuration.has(TrimOption::PanoramicRoof) => {
            Decision::new(Alternate, Some(TealOrOliveWithPanoramicRoof))
        }
        (Color::Green, Some(_), Some(_)) => Decision::new(Alternate, None),
        (Color::Green, Some(_), None) => Decision::new(Primary, Some(Olive)),
        (Color::Green, None, Some(_)) => Decision::new(Alternate, None),

        (_, Some(_), Some(_)) => Decision { pick: Primary, note: None, conflict: true },
        (_, Some(_), None) => Decision::new(Primary, None),
        (_, None, Some(_)) => Decision::new(Alternate, None),
    };
    Some(decision)
}

/// Paint-finish family from the colour and the paint annotation.
pub fn paint_finish(color: Color, note: Option<PaintNote>) -> PaintFinish {
    match color {
        Color::White if note == Some(PaintNote::AtlasWhiteMatte) => PaintFinish::Matte,
        Color::White | Color::Red => PaintFinish::Solid,
        Color::Black | Color::Blue => PaintFinish::Pearl,
        Color::Yellow => PaintFinish::Matte,
        Color::Grey if note == Some(PaintNote::ShootingStar) => PaintFinish::Matte,
        Color::Grey => PaintFinish::Metallic,
        Color::Green if note == Some(PaintNote::Olive) => PaintFinish::Mica,
        Color::Green => PaintFinish::Pearl,
        Color::Brown => PaintFinish::Mica,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Configuration, PriceListEntry, Trim};
    use crate::model::Drivetrain;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(price: i64, options: Vec<TrimOption>) -> PriceListEntry {
        PriceListEntry::new(
            price,
            Configuration {
                kwh: 73,
                drivetrain: Drivetrain::Rwd,
                trim: Trim::Lounge,
                options,
                price_list: "May 2022".into(),
            },
        )
    }

    fn matched(entry: &PriceListEntry) -> PriceMatch<'_> {
        PriceMatch { entry, effective: date(2022, 5, 1), delta: 0 }
    }

    #[test]
    fn surcharges_per_colour() {
        let d = date(2022, 6, 1);
        assert_eq!(hypotheses(Color::Grey, 55600, d, false), Hypotheses {
            primary: 54705,
            alternate: Some(54505)
        });
        assert_eq!(hypotheses(Color::White, 55600, d, false).alternate, None);
        assert_eq!(hypotheses(Color::White, 55600, d, true).alternate, Some(54505));
        assert_eq!(hypotheses(Color::Yellow, 55600, d, false).primary, 54505);
        assert_eq!(hypotheses(Color::Red, 55600, d, false), Hypotheses {
            primary: 55600,
            alternate: None
        });
        assert_eq!(hypotheses(Color::Green, 55600, d, false).alternate, Some(54705));
    }

    #[test]
    fn blue_gains_second_hypothesis_after_august_2022() {
        let before = hypotheses(Color::Blue, 55600, date(2022, 8, 1), false);
        assert_eq!(before, Hypotheses { primary: 54705, alternate: None });
        let after = hypotheses(Color::Blue, 55600, date(2022, 8, 2), false);
        assert_eq!(after, Hypotheses { primary: 55600, alternate: Some(54705) });
    }

    #[test]
    fn zero_alternate_is_dropped() {
        assert_eq!(hypotheses(Color::Green, 895, date(2022, 6, 1), false).alternate, None);
    }

    #[test]
    fn grey_prefers_metallic() {
        let a = entry(54705, vec![]);
        let b = entry(54505, vec![]);
        let d = disambiguate(Color::Grey, false, Some(&matched(&a)), Some(&matched(&b))).unwrap();
        assert_eq!(d, Decision::new(Pick::Primary, None));

        let d = disambiguate(Color::Grey, false, None, Some(&matched(&b))).unwrap();
        assert_eq!(d, Decision::new(Pick::Alternate, Some(PaintNote::ShootingStar)));
        assert_eq!(paint_finish(Color::Grey, d.note), PaintFinish::Matte);
    }

    #[test]
    fn white_matte_only_for_model_2023() {
        let a = entry(54705, vec![]);
        let b = entry(54305, vec![]);
        let (pa, pb) = (matched(&a), matched(&b));
        let d = disambiguate(Color::White, true, Some(&pa), Some(&pb)).unwrap();
        assert_eq!(d.pick, Pick::Alternate);
        assert_eq!(paint_finish(Color::White, d.note), PaintFinish::Matte);

        let d = disambiguate(Color::White, false, Some(&pa), Some(&pb)).unwrap();
        assert_eq!(d.pick, Pick::Primary);
        assert_eq!(paint_finish(Color::White, d.note), PaintFinish::Solid);
    }

    #[test]
    fn green_rules() {
        let plain = entry(54705, vec![]);
        let pano = entry(55600, vec![TrimOption::PanoramicRoof]);
        let other = entry(54705, vec![]);

        let d = disambiguate(Color::Green, false, Some(&matched(&plain)), None).unwrap();
        assert_eq!(d, Decision::new(Pick::Primary, Some(PaintNote::Olive)));
        assert_eq!(paint_finish(Color::Green, d.note), PaintFinish::Mica);

        let d = disambiguate(
            Color::Green,
            false,
            Some(&matched(&pano)),
            Some(&matched(&other)),
        )
        .unwrap();
        assert_eq!(
            d,
            Decision::new(Pick::Alternate, Some(PaintNote::TealOrOliveWithPanoramicRoof))
        );
        assert_eq!(paint_finish(Color::Green, d.note), PaintFinish::Pearl);

        let d = disambiguate(
            Color::Green,
            false,
            Some(&matched(&plain)),
            Some(&matched(&other)),
        )
        .unwrap();
        assert_eq!(d, Decision::new(Pick::Alternate, None));
    }

    #[test]
    fn unexpected_double_match_is_a_conflict() {
        let a = entry(54705, vec![]);
        let b = entry(53810, vec![]);
        let d = disambiguate(Color::Blue, false, Some(&matched(&a)), Some(&matched(&b))).unwrap();
        assert!(d.conflict);
        assert_eq!(d.pick, Pick::Primary);
        assert!(disambiguate(Color::Blue, false, None, None).is_none());
    }
}
