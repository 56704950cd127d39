use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::Configuration;
use crate::error::ClassifyError;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One raw registration record, as handed over by the ingestion layer.
///
/// All code fields are kept verbatim; the resolver normalizes them and
/// rejects anything it does not recognize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VehicleRecord {
    pub plate: String,
    pub variant: String,
    pub trim: String,
    pub type_approval: String,
    pub price: String,
    pub color: String,
    /// Registration date, `YYYYMMDD`.
    pub date: String,
    pub taxi: bool,
    pub exported: bool,
    /// Already registered to a named owner.
    pub named: bool,
}

/// First day on which registrations are accepted.
pub fn valid_from() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 4, 1).unwrap_or(NaiveDate::MIN)
}

/// First day on which registrations are no longer accepted.
pub fn valid_until() -> NaiveDate {
    NaiveDate::from_ymd_opt(2028, 1, 1).unwrap_or(NaiveDate::MAX)
}

/// Parse a `YYYYMMDD` registration date and check it against the window.
pub fn parse_registration_date(plate: &str, value: &str) -> Result<NaiveDate, ClassifyError> {
    let trimmed = value.trim();
    if trimmed.len() != 8 {
        return Err(ClassifyError::InvalidDate { plate: plate.into(), value: value.into() });
    }
    let date = NaiveDate::parse_from_str(trimmed, "%Y%m%d")
        .map_err(|_| ClassifyError::InvalidDate { plate: plate.into(), value: value.into() })?;
    if date < valid_from() || date >= valid_until() {
        return Err(ClassifyError::DateOutOfRange { plate: plate.into(), date });
    }
    Ok(date)
}

// ---------------------------------------------------------------------------
// Normalized codes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryClass {
    Small,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Drivetrain {
    Rwd,
    Awd,
}

/// Internal variant code: battery capacity and drivetrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VariantCode {
    F5E12,
    F5E14,
    F5E22,
    F5E24,
    F5E32,
    F5E34,
    F5E42,
    F5E54,
    F5E62,
    F5E74,
    A5E22,
}

impl VariantCode {
    pub const ALL: [VariantCode; 11] = [
        Self::F5E12,
        Self::F5E14,
        Self::F5E22,
        Self::F5E24,
        Self::F5E32,
        Self::F5E34,
        Self::F5E42,
        Self::F5E54,
        Self::F5E62,
        Self::F5E74,
        Self::A5E22,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.code() == code.trim())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::F5E12 => "F5E12",
            Self::F5E14 => "F5E14",
            Self::F5E22 => "F5E22",
            Self::F5E24 => "F5E24",
            Self::F5E32 => "F5E32",
            Self::F5E34 => "F5E34",
            Self::F5E42 => "F5E42",
            Self::F5E54 => "F5E54",
            Self::F5E62 => "F5E62",
            Self::F5E74 => "F5E74",
            Self::A5E22 => "A5E22",
        }
    }

    /// Nominal battery capacity in kWh as used in labels.
    pub fn kwh(&self) -> u16 {
        match self {
            Self::F5E24 | Self::F5E42 => 58,
            Self::F5E12 => 63,
            Self::F5E14 | Self::F5E22 | Self::F5E32 => 73,
            Self::F5E54 | Self::F5E62 => 77,
            Self::F5E34 | Self::F5E74 | Self::A5E22 => 84,
        }
    }

    pub fn drivetrain(&self) -> Drivetrain {
        match self {
            Self::F5E14 | Self::F5E54 | Self::F5E74 => Drivetrain::Awd,
            _ => Drivetrain::Rwd,
        }
    }

    pub fn battery_class(&self) -> BatteryClass {
        match self.kwh() {
            58 | 63 => BatteryClass::Small,
            _ => BatteryClass::Large,
        }
    }

    /// 77 kWh packs only exist in the model-2023 price lists.
    pub fn always_revised(&self) -> bool {
        self.kwh() == 77
    }

    /// Battery + drivetrain description, e.g. `73 kWh AWD`.
    pub fn description(&self) -> String {
        match self.drivetrain() {
            Drivetrain::Awd => format!("{} kWh AWD", self.kwh()),
            Drivetrain::Rwd => format!("{} kWh", self.kwh()),
        }
    }
}

impl fmt::Display for VariantCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelSize {
    Inch19,
    Inch20,
}

impl WheelSize {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "E11A11" => Some(Self::Inch19),
            "E11B11" => Some(Self::Inch20),
            _ => None,
        }
    }

    pub fn inches(&self) -> u8 {
        match self {
            Self::Inch19 => 19,
            Self::Inch20 => 20,
        }
    }
}

const TYPE_APPROVAL_PREFIX: &str = "e9*2018/858*11054*";

/// EU whole-vehicle type approval, identified by its revision suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TypeApproval {
    pub revision: u8,
}

impl TypeApproval {
    const KNOWN: [u8; 8] = [1, 3, 4, 5, 6, 7, 8, 9];

    pub fn from_code(code: &str) -> Option<Self> {
        let suffix = code.trim().strip_prefix(TYPE_APPROVAL_PREFIX)?;
        if suffix.len() != 2 {
            return None;
        }
        let revision: u8 = suffix.parse().ok()?;
        Self::KNOWN.contains(&revision).then_some(Self { revision })
    }

    pub fn code(&self) -> String {
        format!("{TYPE_APPROVAL_PREFIX}{:02}", self.revision)
    }

    pub fn model_year(&self) -> Option<ModelYear> {
        match self.revision {
            1 => Some(ModelYear::Y2022),
            3 => Some(ModelYear::Y2022_5),
            4 => Some(ModelYear::Y2023),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ModelYear {
    #[serde(rename = "2022")]
    Y2022,
    #[serde(rename = "2022.5")]
    Y2022_5,
    #[serde(rename = "2023")]
    Y2023,
}

impl ModelYear {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Y2022 => "2022",
            Self::Y2022_5 => "2022.5",
            Self::Y2023 => "2023",
        }
    }
}

/// Registry colour names. One name can cover several paint finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Color {
    #[serde(rename = "WIT")]
    White,
    #[serde(rename = "GRIJS")]
    Grey,
    #[serde(rename = "GROEN")]
    Green,
    #[serde(rename = "ZWART")]
    Black,
    #[serde(rename = "BLAUW")]
    Blue,
    #[serde(rename = "GEEL")]
    Yellow,
    #[serde(rename = "BRUIN")]
    Brown,
    #[serde(rename = "ROOD")]
    Red,
}

impl Color {
    pub const ALL: [Color; 8] = [
        Self::White,
        Self::Grey,
        Self::Green,
        Self::Black,
        Self::Blue,
        Self::Yellow,
        Self::Brown,
        Self::Red,
    ];

    /// Accepts the registry code (`GRIJS`) or the English name (`grey`).
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL.into_iter().find(|c| {
            c.code() == code || c.english().eq_ignore_ascii_case(code)
        })
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::White => "WIT",
            Self::Grey => "GRIJS",
            Self::Green => "GROEN",
            Self::Black => "ZWART",
            Self::Blue => "BLAUW",
            Self::Yellow => "GEEL",
            Self::Brown => "BRUIN",
            Self::Red => "ROOD",
        }
    }

    pub fn english(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Grey => "grey",
            Self::Green => "green",
            Self::Black => "black",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Brown => "brown",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaintFinish {
    Matte,
    Metallic,
    Mica,
    Solid,
    Pearl,
}

impl PaintFinish {
    pub const ALL: [PaintFinish; 5] =
        [Self::Matte, Self::Metallic, Self::Mica, Self::Solid, Self::Pearl];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Matte => "matte",
            Self::Metallic => "metallic",
            Self::Mica => "mica",
            Self::Solid => "solid",
            Self::Pearl => "pearl",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

// ---------------------------------------------------------------------------
// Segment (catalog key)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Revision {
    ModelYear2023,
}

/// Price-table bucket: battery class, drivetrain and optional model-year
/// revision. Revised tables never shadow unrevised ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Segment {
    pub battery: BatteryClass,
    pub drivetrain: Drivetrain,
    pub revision: Option<Revision>,
}

impl Segment {
    pub const SMALL: Segment = Segment::new(BatteryClass::Small, Drivetrain::Rwd);
    pub const LARGE: Segment = Segment::new(BatteryClass::Large, Drivetrain::Rwd);
    pub const LARGE_AWD: Segment = Segment::new(BatteryClass::Large, Drivetrain::Awd);

    pub const fn new(battery: BatteryClass, drivetrain: Drivetrain) -> Self {
        Self { battery, drivetrain, revision: None }
    }

    pub const fn revised(self, revision: Revision) -> Self {
        Self { revision: Some(revision), ..self }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let battery = match self.battery {
            BatteryClass::Small => "small",
            BatteryClass::Large => "large",
        };
        f.write_str(battery)?;
        if self.drivetrain == Drivetrain::Awd {
            f.write_str(" AWD")?;
        }
        if let Some(Revision::ModelYear2023) = self.revision {
            f.write_str(" (model 2023)")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    /// Signed difference `observed - list price`.
    Nearest { delta: i64 },
    LimitedEdition,
}

/// The classified record.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub plate: String,
    pub date: NaiveDate,
    /// Fully annotated label.
    pub label: String,
    /// Label with every annotation stripped; the aggregation key.
    pub trim_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Configuration>,
    pub variant: VariantCode,
    pub color: Color,
    pub paint_finish: PaintFinish,
    pub wheel_size: WheelSize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_year: Option<ModelYear>,
    /// Observed price rounded to a multiple of 5.
    pub price: i64,
    pub match_kind: MatchKind,
    pub taxi: bool,
    pub exported: bool,
    pub named: bool,
}

impl Resolution {
    pub fn is_limited_edition(&self) -> bool {
        self.match_kind == MatchKind::LimitedEdition
    }
}
