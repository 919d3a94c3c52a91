//! Helpers for turning dashboard control values into [`StopFilter`]s.
//!
//! Controls may send either a raw code (`race=0`) or a label
//! (`race=White`). Records are compared after normalization, so codes are
//! resolved through the active label maps before matching.

use tx_stops_analytics_models::StopFilter;
use tx_stops_stop_models::{CategoryValue, LabelMaps};

/// Parses a categorical control value. Blank values mean "no constraint".
#[must_use]
pub fn parse_category_param(raw: &str) -> Option<CategoryValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(CategoryValue::parse(trimmed))
    }
}

/// Returns `filter` with coded categorical constraints replaced by their
/// labels so it can be matched against normalized records.
#[must_use]
pub fn resolve_filter(filter: &StopFilter, labels: &LabelMaps) -> StopFilter {
    StopFilter {
        race: filter.race.as_ref().map(|v| labels.race.resolve(v)),
        sex: filter.sex.as_ref().map(|v| labels.gender.resolve(v)),
        violation: filter.violation.as_ref().map(|v| labels.violation.resolve(v)),
        ..filter.clone()
    }
}
