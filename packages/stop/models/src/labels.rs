//! Code → display label tables for the coded stop columns.
//!
//! The default tables are embedded from `labels/texas.toml` at compile
//! time. A replacement file with the same layout can be loaded at runtime
//! with [`LabelMaps::from_file`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{CategoricalField, CategoryValue};

/// Label tables embedded at compile time.
const TEXAS_LABELS_TOML: &str = include_str!("../labels/texas.toml");

/// Errors that can occur while loading label tables.
#[derive(Debug, thiserror::Error)]
pub enum LabelMapError {
    /// The label file could not be read.
    #[error("Failed to read label file {}: {source}", path.display())]
    Io {
        /// Path of the file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The label file is not valid TOML for this layout.
    #[error("Invalid label TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A table key is not an integer code.
    #[error("Invalid {field} code '{key}': expected an integer")]
    InvalidCode {
        /// Table the key was found in.
        field: CategoricalField,
        /// The offending key.
        key: String,
    },
}

/// Fixed mapping from integer code to display name for one coded column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryLabelMap {
    labels: BTreeMap<i64, String>,
}

impl CategoryLabelMap {
    /// Creates a label map from an existing table.
    #[must_use]
    pub const fn new(labels: BTreeMap<i64, String>) -> Self {
        Self { labels }
    }

    /// Returns the label for `code`, if one is defined.
    #[must_use]
    pub fn label(&self, code: i64) -> Option<&str> {
        self.labels.get(&code).map(String::as_str)
    }

    /// Maps a value through this table.
    ///
    /// Known codes become labels. Unknown codes and values that are already
    /// labels are returned unchanged.
    #[must_use]
    pub fn resolve(&self, value: &CategoryValue) -> CategoryValue {
        match value {
            CategoryValue::Code(code) => self
                .label(*code)
                .map_or_else(|| value.clone(), |label| CategoryValue::Label(label.to_string())),
            CategoryValue::Label(_) => value.clone(),
        }
    }

    /// Iterates `(code, label)` pairs in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.labels.iter().map(|(code, label)| (*code, label.as_str()))
    }

    /// Number of codes with a label.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(i64, S)> for CategoryLabelMap {
    fn from_iter<T: IntoIterator<Item = (i64, S)>>(iter: T) -> Self {
        Self {
            labels: iter
                .into_iter()
                .map(|(code, label)| (code, label.into()))
                .collect(),
        }
    }
}

/// The label tables for every coded column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelMaps {
    /// `subject_race` labels.
    pub race: CategoryLabelMap,
    /// `subject_sex` labels.
    pub gender: CategoryLabelMap,
    /// `violation_parsed` labels.
    pub violation: CategoryLabelMap,
}

/// On-disk layout: TOML tables keyed by the code as a string.
#[derive(Debug, Deserialize)]
struct LabelMapsFile {
    #[serde(default)]
    race: BTreeMap<String, String>,
    #[serde(default)]
    gender: BTreeMap<String, String>,
    #[serde(default)]
    violation: BTreeMap<String, String>,
}

fn parse_table(
    field: CategoricalField,
    table: BTreeMap<String, String>,
) -> Result<CategoryLabelMap, LabelMapError> {
    let mut labels = BTreeMap::new();
    for (key, label) in table {
        let code = key
            .trim()
            .parse::<i64>()
            .map_err(|_| LabelMapError::InvalidCode {
                field,
                key: key.clone(),
            })?;
        labels.insert(code, label);
    }
    Ok(CategoryLabelMap::new(labels))
}

impl LabelMaps {
    /// Returns the table for a coded column.
    #[must_use]
    pub const fn for_field(&self, field: CategoricalField) -> &CategoryLabelMap {
        match field {
            CategoricalField::Race => &self.race,
            CategoricalField::Sex => &self.gender,
            CategoricalField::Violation => &self.violation,
        }
    }

    /// Parses label tables from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`LabelMapError`] if the TOML is malformed or a key is not
    /// an integer.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, LabelMapError> {
        let file: LabelMapsFile = toml::from_str(toml_str)?;
        Ok(Self {
            race: parse_table(CategoricalField::Race, file.race)?,
            gender: parse_table(CategoricalField::Sex, file.gender)?,
            violation: parse_table(CategoricalField::Violation, file.violation)?,
        })
    }

    /// Reads label tables from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`LabelMapError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, LabelMapError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LabelMapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// The built-in tables for the Texas statewide dataset.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (covered by tests).
    #[must_use]
    pub fn texas() -> Self {
        Self::from_toml_str(TEXAS_LABELS_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse texas.toml: {e}"))
    }
}

impl Default for LabelMaps {
    fn default() -> Self {
        Self::texas()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_texas_labels_parse() {
        let maps = LabelMaps::texas();
        assert_eq!(maps.race.len(), 5);
        assert_eq!(maps.race.label(0), Some("White"));
        assert_eq!(maps.race.label(2), Some("Hispanic"));
        assert_eq!(maps.gender.label(1), Some("Men"));
        assert_eq!(maps.violation.label(0), Some("Speeding"));
    }

    #[test]
    fn resolve_passes_unknown_codes_through() {
        let map: CategoryLabelMap = [(0, "White")].into_iter().collect();
        assert_eq!(
            map.resolve(&CategoryValue::Code(0)),
            CategoryValue::Label("White".to_string())
        );
        assert_eq!(map.resolve(&CategoryValue::Code(7)), CategoryValue::Code(7));
        assert_eq!(
            map.resolve(&CategoryValue::from("Black")),
            CategoryValue::from("Black")
        );
    }

    #[test]
    fn missing_tables_default_to_empty() {
        let maps = LabelMaps::from_toml_str("[race]\n0 = \"White\"\n").unwrap();
        assert_eq!(maps.race.len(), 1);
        assert!(maps.gender.is_empty());
        assert!(maps.violation.is_empty());
    }

    #[test]
    fn rejects_non_integer_keys() {
        let err = LabelMaps::from_toml_str("[gender]\nmale = \"Men\"\n").unwrap_err();
        assert!(matches!(
            err,
            LabelMapError::InvalidCode {
                field: CategoricalField::Sex,
                ..
            }
        ));
    }

    #[test]
    fn for_field_selects_matching_table() {
        let maps = LabelMaps::texas();
        assert_eq!(maps.for_field(CategoricalField::Sex).label(0), Some("Women"));
        assert_eq!(
            maps.for_field(CategoricalField::Violation).label(0),
            Some("Speeding")
        );
    }

    #[test]
    fn from_file_reports_missing_path() {
        let err = LabelMaps::from_file(Path::new("/nonexistent/labels.toml")).unwrap_err();
        assert!(matches!(err, LabelMapError::Io { .. }));
        assert!(
            err.to_string()
                .starts_with("Failed to read label file /nonexistent/labels.toml: ")
        );
    }
}
