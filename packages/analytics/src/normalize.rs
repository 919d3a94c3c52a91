//! Maps coded categorical columns to display labels.

use tx_stops_stop_models::{CategoricalField, CategoryLabelMap, LabelMaps, StopRecord};

/// Replaces `field` on every record with its label from `labels`.
///
/// Codes without a label, and values that are already text, pass through
/// unchanged.
#[must_use]
pub fn normalize(
    records: Vec<StopRecord>,
    field: CategoricalField,
    labels: &CategoryLabelMap,
) -> Vec<StopRecord> {
    records
        .into_iter()
        .map(|record| {
            let value = labels.resolve(record.category(field));
            record.with_category(field, value)
        })
        .collect()
}

/// Applies the race, gender, and violation tables.
#[must_use]
pub fn normalize_all(records: Vec<StopRecord>, labels: &LabelMaps) -> Vec<StopRecord> {
    CategoricalField::all()
        .iter()
        .fold(records, |records, field| {
            normalize(records, *field, labels.for_field(*field))
        })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tx_stops_analytics_models::StopFilter;
    use tx_stops_stop_models::CategoryValue;

    use super::*;
    use crate::aggregate::{AggregateOptions, aggregate};

    fn record(race: CategoryValue, sex: i64, violation: i64) -> StopRecord {
        StopRecord {
            subject_race: race,
            subject_sex: CategoryValue::Code(sex),
            search_conducted: false,
            search_vehicle: false,
            violation_parsed: CategoryValue::Code(violation),
            county_name: "Travis County".to_string(),
            lat: None,
            lng: None,
            timestamp: NaiveDate::from_ymd_opt(2019, 5, 5)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn maps_known_codes() {
        let labels = LabelMaps::texas();
        let records = normalize(
            vec![record(CategoryValue::Code(0), 1, 0), record(CategoryValue::Code(3), 0, 0)],
            CategoricalField::Race,
            &labels.race,
        );
        assert_eq!(records[0].subject_race, CategoryValue::from("White"));
        assert_eq!(records[1].subject_race, CategoryValue::from("Asian"));
        // other columns untouched
        assert_eq!(records[0].subject_sex, CategoryValue::Code(1));
    }

    #[test]
    fn unmapped_codes_pass_through() {
        let labels = LabelMaps::texas();
        let records = normalize(
            vec![record(CategoryValue::Code(7), 1, 0)],
            CategoricalField::Race,
            &labels.race,
        );
        assert_eq!(records[0].subject_race, CategoryValue::Code(7));
    }

    #[test]
    fn labels_pass_through() {
        let labels = LabelMaps::texas();
        let records = normalize(
            vec![record(CategoryValue::from("Black"), 1, 0)],
            CategoricalField::Race,
            &labels.race,
        );
        assert_eq!(records[0].subject_race, CategoryValue::from("Black"));
    }

    #[test]
    fn normalize_all_maps_every_coded_column() {
        let records = normalize_all(
            vec![record(CategoryValue::Code(1), 0, 0), record(CategoryValue::Code(2), 1, 3)],
            &LabelMaps::texas(),
        );
        assert_eq!(records[0].subject_race, CategoryValue::from("Black"));
        assert_eq!(records[0].subject_sex, CategoryValue::from("Women"));
        assert_eq!(records[0].violation_parsed, CategoryValue::from("Speeding"));
        assert_eq!(records[1].subject_sex, CategoryValue::from("Men"));
        assert_eq!(records[1].violation_parsed, CategoryValue::Code(3));
    }

    #[test]
    fn coded_races_count_by_label() {
        let map: CategoryLabelMap = [(0, "White"), (1, "Black"), (2, "Hispanic")]
            .into_iter()
            .collect();
        let records = normalize(
            [0, 0, 1, 2]
                .into_iter()
                .map(|code| record(CategoryValue::Code(code), 1, 0))
                .collect(),
            CategoricalField::Race,
            &map,
        );

        let result = aggregate(
            &records,
            |r| r.subject_race.clone(),
            &StopFilter::default(),
            AggregateOptions::counts(),
        );

        assert_eq!(result.labels(), vec!["White", "Black", "Hispanic"]);
        assert_eq!(
            result.entries.iter().map(|e| e.count).collect::<Vec<_>>(),
            vec![2, 1, 1]
        );
        assert_eq!(result.total, 4);
    }
}
