use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;
use crate::model::{TypeApproval, VariantCode, WheelSize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub limited_edition: LimitedEdition,
    #[serde(default)]
    pub overrides: Vec<RecordOverride>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Limited edition
// ---------------------------------------------------------------------------

/// A run sold at one fixed price, recognized before any price matching.
///
/// Matches when the variant code agrees and either the rounded price
/// equals `price` or the plate is listed in `plates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitedEdition {
    pub variant: String,
    pub price: i64,
    pub label: String,
    #[serde(default)]
    pub plates: Vec<String>,
}

impl Default for LimitedEdition {
    fn default() -> Self {
        Self {
            variant: "F5E14".into(),
            price: 58000,
            label: "PROJECT45".into(),
            plates: ["L162KD", "L430TK", "L431TK", "L432TK", "N309TK", "P229NR"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl LimitedEdition {
    pub fn matches(&self, plate: &str, variant: VariantCode, price: i64) -> bool {
        variant.code() == self.variant
            && (price == self.price || self.plates.iter().any(|p| p == plate))
    }
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// Hand corrections for one registration whose source record is wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOverride {
    pub plate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_approval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
}

impl RecordOverride {
    fn codes(plate: &str, variant: &str, trim: &str, type_approval_rev: u8) -> Self {
        Self {
            plate: plate.into(),
            variant: Some(variant.into()),
            trim: Some(trim.into()),
            type_approval: Some(TypeApproval { revision: type_approval_rev }.code()),
            price: None,
        }
    }

    fn with_price(mut self, price: i64) -> Self {
        self.price = Some(price);
        self
    }

    fn is_empty(&self) -> bool {
        self.variant.is_none()
            && self.trim.is_none()
            && self.type_approval.is_none()
            && self.price.is_none()
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ClassifierConfig {
    pub fn from_toml(input: &str) -> Result<Self, ClassifyError> {
        let config: ClassifierConfig =
            toml::from_str(input).map_err(|e| ClassifyError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The corrections and limited-edition rule known from the registry.
    pub fn builtin() -> Self {
        let overrides = vec![
            RecordOverride::codes("N331SH", "F5E14", "E11B11", 1),
            RecordOverride::codes("P085GJ", "F5E14", "E11B11", 1),
            RecordOverride::codes("N688DR", "F5E32", "E11B11", 1),
            RecordOverride {
                plate: "P380DR".into(),
                variant: Some("F5E14".into()),
                trim: None,
                type_approval: None,
                price: None,
            },
            RecordOverride {
                plate: "N770TS".into(),
                variant: None,
                trim: None,
                type_approval: None,
                price: Some(72300),
            },
            RecordOverride::codes("R296FL", "F5E32", "E11B11", 1).with_price(55600),
            RecordOverride::codes("R303XF", "F5E42", "E11A11", 1).with_price(52426),
            RecordOverride::codes("R818ZL", "F5E42", "E11A11", 1),
            RecordOverride::codes("R494RB", "F5E42", "E11A11", 4),
        ];
        Self { limited_edition: LimitedEdition::default(), overrides }
    }

    pub fn override_for(&self, plate: &str) -> Option<&RecordOverride> {
        self.overrides.iter().find(|o| o.plate == plate)
    }

    pub fn validate(&self) -> Result<(), ClassifyError> {
        let le = &self.limited_edition;
        if VariantCode::from_code(&le.variant).is_none() {
            return Err(ClassifyError::ConfigValidation(format!(
                "limited_edition: unknown variant '{}'",
                le.variant
            )));
        }
        if le.price <= 0 || le.price % 5 != 0 {
            return Err(ClassifyError::ConfigValidation(format!(
                "limited_edition: price must be a positive multiple of 5, got {}",
                le.price
            )));
        }
        if le.label.trim().is_empty() {
            return Err(ClassifyError::ConfigValidation(
                "limited_edition: label must not be empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        for o in &self.overrides {
            if o.plate.trim().is_empty() {
                return Err(ClassifyError::ConfigValidation(
                    "override with empty plate".into(),
                ));
            }
            if !seen.insert(o.plate.as_str()) {
                return Err(ClassifyError::ConfigValidation(format!(
                    "duplicate override for plate '{}'",
                    o.plate
                )));
            }
            if o.is_empty() {
                return Err(ClassifyError::ConfigValidation(format!(
                    "override for plate '{}' sets no field",
                    o.plate
                )));
            }
            if let Some(v) = &o.variant {
                if VariantCode::from_code(v).is_none() {
                    return Err(ClassifyError::ConfigValidation(format!(
                        "override for plate '{}': unknown variant '{v}'",
                        o.plate
                    )));
                }
            }
            if let Some(t) = &o.trim {
                if WheelSize::from_code(t).is_none() {
                    return Err(ClassifyError::ConfigValidation(format!(
                        "override for plate '{}': unknown trim code '{t}'",
                        o.plate
                    )));
                }
            }
            if let Some(ta) = &o.type_approval {
                if TypeApproval::from_code(ta).is_none() {
                    return Err(ClassifyError::ConfigValidation(format!(
                        "override for plate '{}': unknown type approval '{ta}'",
                        o.plate
                    )));
                }
            }
            if let Some(p) = o.price {
                if p <= 0 {
                    return Err(ClassifyError::ConfigValidation(format!(
                        "override for plate '{}': price must be positive",
                        o.plate
                    )));
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
