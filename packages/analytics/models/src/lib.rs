#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregate, view, and filter types for the traffic stop dashboard.
//!
//! These are the values handed to the presentation layer: every chart on
//! the dashboard is one [`SummaryView`], made of one or more labelled
//! [`AggregateResult`] series.

use chrono::Datelike as _;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use tx_stops_stop_models::{CategoryValue, StopRecord};

/// Granularity for ticket-count time series.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TimeGranularity {
    /// Hour of day (0-23).
    #[serde(alias = "hours")]
    #[strum(to_string = "hour", serialize = "hours")]
    Hour,
    /// Day of month (1-31).
    #[serde(alias = "days")]
    #[strum(to_string = "day", serialize = "days")]
    Day,
    /// Month of year (January-December).
    #[serde(alias = "months")]
    #[strum(to_string = "month", serialize = "months")]
    Month,
    /// Calendar year.
    #[default]
    #[serde(alias = "years")]
    #[strum(to_string = "year", serialize = "years")]
    Year,
}

impl TimeGranularity {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Hour, Self::Day, Self::Month, Self::Year]
    }
}

/// One group of an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateEntry {
    /// Display label of the group.
    pub label: String,
    /// Number of records in the group.
    pub count: u64,
    /// Share of the aggregate's total, in percent, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

/// Ordered group counts plus the denominator they were computed against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// Groups in presentation order.
    pub entries: Vec<AggregateEntry>,
    /// Number of records that passed the filter.
    pub total: u64,
    /// Median count across the retained entries (top-N views only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
}

impl AggregateResult {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the entry counts.
    #[must_use]
    pub fn count_sum(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Sum of the entry percentages (0 when percentages were not requested).
    #[must_use]
    pub fn percentage_sum(&self) -> f64 {
        self.entries.iter().filter_map(|e| e.percentage).sum()
    }

    /// Entry labels in order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Count for `label`, if present.
    #[must_use]
    pub fn count_of(&self, label: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.count)
    }
}

/// The named aggregation recipes the dashboard can request.
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
pub enum ViewName {
    /// Stops per race, most frequent first.
    RaceDistribution,
    /// Stops per gender, most frequent first.
    GenderDistribution,
    /// Stops per violation type, most frequent first.
    ViolationDistribution,
    /// Gender split of speeding stops, in percent.
    SpeedingByGender,
    /// Gender split for the selected race, in percent.
    GenderByRace,
    /// Counties with the most stops, with the median as reference line.
    CountyRanking,
    /// Stops per county, every county.
    CountyDistribution,
    /// Stops per hour of day.
    TicketsByHour,
    /// Stops per day of month.
    TicketsByDay,
    /// Stops per month of year.
    TicketsByMonth,
    /// Stops per year.
    TicketsByYear,
    /// Stops over time at the requested granularity.
    TicketsOverTime,
    /// One hour-of-day series per race.
    RaceByHour,
}

impl ViewName {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::RaceDistribution,
            Self::GenderDistribution,
            Self::ViolationDistribution,
            Self::SpeedingByGender,
            Self::GenderByRace,
            Self::CountyRanking,
            Self::CountyDistribution,
            Self::TicketsByHour,
            Self::TicketsByDay,
            Self::TicketsByMonth,
            Self::TicketsByYear,
            Self::TicketsOverTime,
            Self::RaceByHour,
        ]
    }

    /// Chart title for this view.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::RaceDistribution => "Disparity in Number of Tickets by Race",
            Self::GenderDistribution => "Gender Count",
            Self::ViolationDistribution => "Tickets by Violation",
            Self::SpeedingByGender => "Percentage of Speeding Tickets by Gender",
            Self::GenderByRace => "Arrests by Gender for Selected Race",
            Self::CountyRanking => "Counties with the Highest Number of Arrests",
            Self::CountyDistribution => "County Distribution",
            Self::TicketsByHour => "Number of Tickets by Hour",
            Self::TicketsByDay => "Number of Tickets by Day",
            Self::TicketsByMonth => "Number of Tickets per Month",
            Self::TicketsByYear => "Number of Tickets by Year",
            Self::TicketsOverTime => "Number of Tickets Issued Over Time",
            Self::RaceByHour => "Tickets by Hour for Each Race",
        }
    }
}

/// One labelled series inside a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSeries {
    /// Series name (the view title for single-series views).
    pub name: String,
    /// The aggregate behind the series.
    pub result: AggregateResult,
}

/// The data behind one dashboard widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    /// Which recipe produced this view.
    pub name: ViewName,
    /// Chart title.
    pub title: String,
    /// One or more series.
    pub series: Vec<ViewSeries>,
}

impl SummaryView {
    /// Returns the first series' aggregate, which is the whole view for
    /// single-series views.
    #[must_use]
    pub fn primary(&self) -> Option<&AggregateResult> {
        self.series.first().map(|s| &s.result)
    }
}

/// Per-request view parameters driven by dashboard controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewParams {
    /// Granularity of [`ViewName::TicketsOverTime`].
    pub period: TimeGranularity,
    /// Race shown by [`ViewName::GenderByRace`].
    pub selected_race: CategoryValue,
    /// Number of counties kept by [`ViewName::CountyRanking`].
    pub top_n: usize,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            period: TimeGranularity::Year,
            selected_race: CategoryValue::Label("White".to_string()),
            top_n: 30,
        }
    }
}

/// Restricts which records an aggregate counts. Unset fields match
/// everything, so the default filter keeps every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopFilter {
    /// Required `subject_race`.
    pub race: Option<CategoryValue>,
    /// Required `subject_sex`.
    pub sex: Option<CategoryValue>,
    /// Required `violation_parsed`.
    pub violation: Option<CategoryValue>,
    /// Required county name (case-insensitive).
    pub county: Option<String>,
    /// Required calendar year.
    pub year: Option<i32>,
    /// Required month (1-12).
    pub month: Option<u32>,
    /// Required `search_conducted` flag.
    pub search_conducted: Option<bool>,
}

impl StopFilter {
    /// Whether no constraint is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.race.is_none()
            && self.sex.is_none()
            && self.violation.is_none()
            && self.county.is_none()
            && self.year.is_none()
            && self.month.is_none()
            && self.search_conducted.is_none()
    }

    /// Whether `record` satisfies every set constraint.
    #[must_use]
    pub fn matches(&self, record: &StopRecord) -> bool {
        self.race.as_ref().is_none_or(|v| *v == record.subject_race)
            && self.sex.as_ref().is_none_or(|v| *v == record.subject_sex)
            && self
                .violation
                .as_ref()
                .is_none_or(|v| *v == record.violation_parsed)
            && self
                .county
                .as_deref()
                .is_none_or(|c| c.eq_ignore_ascii_case(&record.county_name))
            && self.year.is_none_or(|y| record.timestamp.year() == y)
            && self.month.is_none_or(|m| record.timestamp.month() == m)
            && self
                .search_conducted
                .is_none_or(|s| record.search_conducted == s)
    }
}

/// Headline numbers shown above the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCards {
    /// Records after filtering.
    pub total_records: u64,
    /// Records with a search conducted.
    pub search_conducted: u64,
    /// Records with a vehicle search.
    pub search_vehicle: u64,
}

/// One marker on the scatter map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Race (label after normalization).
    pub race: CategoryValue,
    /// Sex (label after normalization).
    pub sex: CategoryValue,
    /// Whether a search was conducted.
    pub search_conducted: bool,
    /// Whether the vehicle was searched.
    pub search_vehicle: bool,
}

/// Everything the dashboard renders for one set of control values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Row cap the requested limit resolved to.
    pub row_cap: u64,
    /// Records loaded (before filtering).
    pub loaded_records: u64,
    /// Rows skipped while loading.
    pub skipped_rows: u64,
    /// Headline cards, computed on the filtered records.
    pub cards: SummaryCards,
    /// Map markers for filtered records with coordinates.
    pub points: Vec<MapPoint>,
    /// Requested views in request order.
    pub views: Vec<SummaryView>,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn record(race: i64, year: i32, month: u32) -> StopRecord {
        StopRecord {
            subject_race: CategoryValue::Code(race),
            subject_sex: CategoryValue::from("Men"),
            search_conducted: race == 0,
            search_vehicle: false,
            violation_parsed: CategoryValue::from("Speeding"),
            county_name: "Harris County".to_string(),
            lat: None,
            lng: None,
            timestamp: NaiveDate::from_ymd_opt(year, month, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn default_filter_matches_everything() {
        let filter = StopFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&record(0, 2020, 1)));
        assert!(filter.matches(&record(9, 2013, 12)));
    }

    #[test]
    fn filter_constraints_combine() {
        let filter = StopFilter {
            year: Some(2020),
            month: Some(3),
            county: Some("harris county".to_string()),
            ..StopFilter::default()
        };
        assert!(filter.matches(&record(1, 2020, 3)));
        assert!(!filter.matches(&record(1, 2020, 4)));
        assert!(!filter.matches(&record(1, 2019, 3)));
    }

    #[test]
    fn filter_compares_category_values_exactly() {
        let filter = StopFilter {
            race: Some(CategoryValue::Code(2)),
            search_conducted: Some(false),
            ..StopFilter::default()
        };
        assert!(filter.matches(&record(2, 2020, 1)));
        assert!(!filter.matches(&record(0, 2020, 1)));
    }

    #[test]
    fn view_names_roundtrip() {
        for view in ViewName::all() {
            let parsed: ViewName = view.to_string().parse().unwrap();
            assert_eq!(parsed, *view);
        }
        assert_eq!(ViewName::RaceByHour.to_string(), "race_by_hour");
    }

    #[test]
    fn granularity_accepts_dropdown_values() {
        assert_eq!("years".parse::<TimeGranularity>().unwrap(), TimeGranularity::Year);
        assert_eq!("hour".parse::<TimeGranularity>().unwrap(), TimeGranularity::Hour);
        assert_eq!(TimeGranularity::Year.to_string(), "year");
        assert_eq!("Months".parse::<TimeGranularity>().unwrap(), TimeGranularity::Month);
        let parsed: TimeGranularity = serde_json::from_str("\"days\"").unwrap();
        assert_eq!(parsed, TimeGranularity::Day);
    }

    #[test]
    fn aggregate_result_helpers() {
        let result = AggregateResult {
            entries: vec![
                AggregateEntry {
                    label: "White".to_string(),
                    count: 3,
                    percentage: Some(75.0),
                },
                AggregateEntry {
                    label: "Black".to_string(),
                    count: 1,
                    percentage: Some(25.0),
                },
            ],
            total: 4,
            median: None,
        };
        assert_eq!(result.count_sum(), 4);
        assert!((result.percentage_sum() - 100.0).abs() < 1e-9);
        assert_eq!(result.labels(), vec!["White", "Black"]);
        assert_eq!(result.count_of("Black"), Some(1));
        assert_eq!(result.count_of("Asian"), None);
    }

    #[test]
    fn median_is_omitted_from_json_when_absent() {
        let json = serde_json::to_value(AggregateResult::default()).unwrap();
        assert!(json.get("median").is_none());
        assert_eq!(json["total"], 0);
    }
}
