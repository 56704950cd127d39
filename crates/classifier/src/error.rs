use std::fmt;

use chrono::NaiveDate;

use crate::model::Segment;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// Variant code is not one of the known battery/drivetrain codes.
    UnknownVariant { plate: String, code: String },
    /// Trim/wheel code is not one of the known codes.
    UnknownTrimCode { plate: String, code: String },
    /// Type-approval number is not one of the known approvals.
    UnknownTypeApproval { plate: String, code: String },
    /// Colour name is not one of the enumerated colours.
    UnknownColor { plate: String, color: String },
    /// Catalog price is empty, not numeric or of the wrong length.
    InvalidPrice { plate: String, value: String },
    /// Registration date does not parse as `YYYYMMDD`.
    InvalidDate { plate: String, value: String },
    /// Registration date outside the supported window.
    DateOutOfRange { plate: String, date: NaiveDate },
    /// The variant is not sold with the requested wheel size.
    WheelSizeNotOffered { plate: String, variant: String },
    /// No price list was in force for the segment on the registration date.
    NoPriceList { plate: String, segment: Segment, date: NaiveDate },
    /// No hypothesis produced a label, neither exact nor nearest.
    Unresolved { plate: String, price: i64 },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (duplicate plate, empty override, etc.).
    ConfigValidation(String),
    /// Persisted counter mapping cannot be read back.
    CounterParse { counter: String, reason: String },
    /// Input table lacks a required column.
    MissingColumn { column: String },
    /// IO / CSV read error.
    Io(String),
}

impl ClassifyError {
    /// Licence plate of the offending record, if the error is record-scoped.
    pub fn plate(&self) -> Option<&str> {
        match self {
            Self::UnknownVariant { plate, .. }
            | Self::UnknownTrimCode { plate, .. }
            | Self::UnknownTypeApproval { plate, .. }
            | Self::UnknownColor { plate, .. }
            | Self::InvalidPrice { plate, .. }
            | Self::InvalidDate { plate, .. }
            | Self::DateOutOfRange { plate, .. }
            | Self::WheelSizeNotOffered { plate, .. }
            | Self::NoPriceList { plate, .. }
            | Self::Unresolved { plate, .. } => Some(plate),
            Self::ConfigParse(_)
            | Self::ConfigValidation(_)
            | Self::CounterParse { .. }
            | Self::MissingColumn { .. }
            | Self::Io(_) => None,
        }
    }
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVariant { plate, code } => {
                write!(f, "{plate}: unknown variant code '{code}'")
            }
            Self::UnknownTrimCode { plate, code } => {
                write!(f, "{plate}: unknown trim code '{code}'")
            }
            Self::UnknownTypeApproval { plate, code } => {
                write!(f, "{plate}: unknown type approval '{code}'")
            }
            Self::UnknownColor { plate, color } => write!(f, "{plate}: unknown colour '{color}'"),
            Self::InvalidPrice { plate, value } => {
                write!(f, "{plate}: invalid catalog price '{value}'")
            }
            Self::InvalidDate { plate, value } => {
                write!(f, "{plate}: cannot parse registration date '{value}'")
            }
            Self::DateOutOfRange { plate, date } => {
                write!(f, "{plate}: registration date {} outside supported window", date.format("%Y%m%d"))
            }
            Self::WheelSizeNotOffered { plate, variant } => {
                write!(f, "{plate}: variant {variant} is not offered with 20 inch wheels")
            }
            Self::NoPriceList { plate, segment, date } => {
                write!(
                    f,
                    "{plate}: no price list for {segment} in force on {}",
                    date.format("%Y%m%d")
                )
            }
            Self::Unresolved { plate, price } => {
                write!(f, "{plate}: no configuration found for price {price}")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::CounterParse { counter, reason } => {
                write!(f, "counter '{counter}': {reason}")
            }
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ClassifyError {}
