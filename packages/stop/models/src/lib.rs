#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Traffic stop record types and categorical label maps.
//!
//! A [`StopRecord`] is one row of the Texas statewide stop dataset. Its
//! coded columns (race, sex, violation) are held as [`CategoryValue`]s so
//! that a record can carry either the raw integer code from the CSV or the
//! display label it was normalized to.

pub mod labels;

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use labels::{CategoryLabelMap, LabelMapError, LabelMaps};

/// Columns every stop dataset must provide.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "subject_race",
    "subject_sex",
    "search_conducted",
    "search_vehicle",
    "violation_parsed",
    "county_name",
    "lat",
    "lng",
    "timestamp",
];

/// Value of a coded categorical column.
///
/// The cleaned dataset stores categories as integer codes. After
/// normalization, codes with a known label become [`CategoryValue::Label`];
/// unknown codes stay [`CategoryValue::Code`], so a single column can hold
/// both.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryValue {
    /// Raw integer code.
    Code(i64),
    /// Display label (or free text that never was a code).
    Label(String),
}

impl CategoryValue {
    /// Parses a raw CSV cell.
    ///
    /// Integers and integral floats (`"2"`, `"2.0"`) become codes; anything
    /// else is kept as trimmed text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Ok(code) = trimmed.parse::<i64>() {
            return Self::Code(code);
        }

        if let Ok(float) = trimmed.parse::<f64>()
            && float.is_finite()
            && float.fract() == 0.0
            && float.abs() < 9.0e15
        {
            #[allow(clippy::cast_possible_truncation)]
            return Self::Code(float as i64);
        }

        Self::Label(trimmed.to_string())
    }

    /// Returns the integer code, if this value has not been labelled.
    #[must_use]
    pub const fn code(&self) -> Option<i64> {
        match self {
            Self::Code(code) => Some(*code),
            Self::Label(_) => None,
        }
    }

    /// Returns the label text, if this value is a label.
    #[must_use]
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Self::Code(_) => None,
            Self::Label(label) => Some(label),
        }
    }
}

impl fmt::Display for CategoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

impl From<i64> for CategoryValue {
    fn from(code: i64) -> Self {
        Self::Code(code)
    }
}

impl From<&str> for CategoryValue {
    fn from(label: &str) -> Self {
        Self::Label(label.to_string())
    }
}

/// The coded columns of a [`StopRecord`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CategoricalField {
    /// `subject_race`
    Race,
    /// `subject_sex`
    Sex,
    /// `violation_parsed`
    Violation,
}

impl CategoricalField {
    /// Returns the CSV column backing this field.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Race => "subject_race",
            Self::Sex => "subject_sex",
            Self::Violation => "violation_parsed",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Race, Self::Sex, Self::Violation]
    }
}

/// One logged traffic stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopRecord {
    /// Race of the stopped driver.
    pub subject_race: CategoryValue,
    /// Sex of the stopped driver.
    pub subject_sex: CategoryValue,
    /// Whether any search was conducted.
    pub search_conducted: bool,
    /// Whether the vehicle was searched.
    pub search_vehicle: bool,
    /// Parsed violation type.
    pub violation_parsed: CategoryValue,
    /// County the stop happened in.
    pub county_name: String,
    /// Latitude, `None` when missing or zero.
    pub lat: Option<f64>,
    /// Longitude, `None` when missing or zero.
    pub lng: Option<f64>,
    /// When the stop happened (local time, as recorded).
    pub timestamp: NaiveDateTime,
}

impl StopRecord {
    /// Returns the value of a coded column.
    #[must_use]
    pub const fn category(&self, field: CategoricalField) -> &CategoryValue {
        match field {
            CategoricalField::Race => &self.subject_race,
            CategoricalField::Sex => &self.subject_sex,
            CategoricalField::Violation => &self.violation_parsed,
        }
    }

    /// Returns this record with one coded column replaced.
    #[must_use]
    pub fn with_category(mut self, field: CategoricalField, value: CategoryValue) -> Self {
        match field {
            CategoricalField::Race => self.subject_race = value,
            CategoricalField::Sex => self.subject_sex = value,
            CategoricalField::Violation => self.violation_parsed = value,
        }
        self
    }

    /// Returns `(lat, lng)` when both coordinates are present.
    #[must_use]
    pub const fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_codes() {
        assert_eq!(CategoryValue::parse("2"), CategoryValue::Code(2));
        assert_eq!(CategoryValue::parse(" 7 "), CategoryValue::Code(7));
    }

    #[test]
    fn parses_integral_floats_as_codes() {
        assert_eq!(CategoryValue::parse("1.0"), CategoryValue::Code(1));
        assert_eq!(
            CategoryValue::parse("1.5"),
            CategoryValue::Label("1.5".to_string())
        );
    }

    #[test]
    fn keeps_text_as_label() {
        assert_eq!(
            CategoryValue::parse("hispanic"),
            CategoryValue::Label("hispanic".to_string())
        );
        assert_eq!(CategoryValue::parse(""), CategoryValue::Label(String::new()));
    }

    #[test]
    fn displays_codes_and_labels() {
        assert_eq!(CategoryValue::Code(3).to_string(), "3");
        assert_eq!(CategoryValue::from("White").to_string(), "White");
    }

    #[test]
    fn categorical_fields_name_required_columns() {
        for field in CategoricalField::all() {
            assert!(REQUIRED_COLUMNS.contains(&field.column()));
        }
    }

    #[test]
    fn categorical_field_roundtrips_through_strum() {
        for field in CategoricalField::all() {
            let parsed: CategoricalField = field.to_string().parse().unwrap();
            assert_eq!(parsed, *field);
        }
    }
}
