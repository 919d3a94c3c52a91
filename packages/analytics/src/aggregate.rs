//! Group-by counts over stop records.
//!
//! Every aggregate applies a [`StopFilter`] first, then counts records per
//! key. The filtered record count is the denominator for percentages, so
//! the counts of an untruncated aggregate always sum to
//! [`AggregateResult::total`].

use std::collections::BTreeMap;

use chrono::{Datelike as _, Month, NaiveDateTime, Timelike as _};
use tx_stops_analytics_models::{AggregateEntry, AggregateResult, StopFilter, TimeGranularity};
use tx_stops_stop_models::{CategoryValue, StopRecord};

/// A value records can be grouped by.
pub trait GroupKey: Ord + Clone {
    /// Display label of the group.
    fn label(&self) -> String;
}

impl GroupKey for CategoryValue {
    fn label(&self) -> String {
        self.to_string()
    }
}

impl GroupKey for String {
    fn label(&self) -> String {
        self.clone()
    }
}

impl GroupKey for u32 {
    fn label(&self) -> String {
        self.to_string()
    }
}

impl GroupKey for i32 {
    fn label(&self) -> String {
        self.to_string()
    }
}

impl<A: GroupKey, B: GroupKey> GroupKey for (A, B) {
    fn label(&self) -> String {
        format!("{} / {}", self.0.label(), self.1.label())
    }
}

/// Order of the entries in a categorical aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryOrder {
    /// Largest count first; ties keep first-seen order.
    #[default]
    DescendingCount,
    /// Order in which keys first appear in the records.
    FirstSeen,
    /// Ascending key order.
    KeyAscending,
}

/// How an aggregate is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Entry order.
    pub order: EntryOrder,
    /// Whether to fill in [`AggregateEntry::percentage`].
    pub percentages: bool,
}

impl AggregateOptions {
    /// Plain counts, largest first.
    #[must_use]
    pub const fn counts() -> Self {
        Self {
            order: EntryOrder::DescendingCount,
            percentages: false,
        }
    }

    /// Counts with percentages, largest first.
    #[must_use]
    pub const fn percentages() -> Self {
        Self {
            order: EntryOrder::DescendingCount,
            percentages: true,
        }
    }

    /// Returns these options with a different entry order.
    #[must_use]
    pub const fn ordered(mut self, order: EntryOrder) -> Self {
        self.order = order;
        self
    }
}

/// `count / total * 100`, or `None` when `total` is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(count: u64, total: u64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(count as f64 / total as f64 * 100.0)
    }
}

/// Median of `counts`: the middle value, or the mean of the two middle
/// values for an even number of counts. `None` when empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn median(counts: impl IntoIterator<Item = u64>) -> Option<f64> {
    let mut counts: Vec<u64> = counts.into_iter().collect();
    if counts.is_empty() {
        return None;
    }
    counts.sort_unstable();

    let mid = counts.len() / 2;
    if counts.len() % 2 == 0 {
        Some((counts[mid - 1] as f64 + counts[mid] as f64) / 2.0)
    } else {
        Some(counts[mid] as f64)
    }
}

fn build_result(
    counts: impl IntoIterator<Item = (String, u64)>,
    total: u64,
    percentages: bool,
) -> AggregateResult {
    let entries = counts
        .into_iter()
        .map(|(label, count)| AggregateEntry {
            label,
            count,
            percentage: if percentages {
                percentage(count, total)
            } else {
                None
            },
        })
        .collect();

    AggregateResult {
        entries,
        total,
        median: None,
    }
}

struct Group<K> {
    key: K,
    count: u64,
}

/// Counts filtered records per key. Groups come back in first-seen order
/// together with the number of records that passed the filter.
fn group_counts<'a, I, K, F>(records: I, key_fn: F, filter: &StopFilter) -> (Vec<Group<K>>, u64)
where
    I: IntoIterator<Item = &'a StopRecord>,
    K: GroupKey,
    F: Fn(&StopRecord) -> K,
{
    let mut index: BTreeMap<K, usize> = BTreeMap::new();
    let mut groups: Vec<Group<K>> = Vec::new();
    let mut total = 0;

    for record in records.into_iter().filter(|r| filter.matches(r)) {
        total += 1;
        let key = key_fn(record);

        if let Some(&i) = index.get(&key) {
            groups[i].count += 1;
        } else {
            index.insert(key.clone(), groups.len());
            groups.push(Group { key, count: 1 });
        }
    }

    (groups, total)
}

/// Counts records per `key_fn` value after applying `filter`.
///
/// Keys may be composite, e.g. `|r| (r.subject_race.clone(), r.timestamp.hour())`.
#[must_use]
pub fn aggregate<'a, I, K, F>(
    records: I,
    key_fn: F,
    filter: &StopFilter,
    options: AggregateOptions,
) -> AggregateResult
where
    I: IntoIterator<Item = &'a StopRecord>,
    K: GroupKey,
    F: Fn(&StopRecord) -> K,
{
    let (mut groups, total) = group_counts(records, key_fn, filter);

    // stable sorts, so equal counts keep first-seen order
    match options.order {
        EntryOrder::DescendingCount => groups.sort_by(|a, b| b.count.cmp(&a.count)),
        EntryOrder::FirstSeen => {}
        EntryOrder::KeyAscending => groups.sort_by(|a, b| a.key.cmp(&b.key)),
    }

    build_result(
        groups.into_iter().map(|g| (g.key.label(), g.count)),
        total,
        options.percentages,
    )
}

/// Keeps the `n` largest groups and reports the median of their counts.
///
/// `total` still counts every filtered record, including those in groups
/// that were cut.
#[must_use]
pub fn aggregate_top_n<'a, I, K, F>(
    records: I,
    key_fn: F,
    filter: &StopFilter,
    n: usize,
) -> AggregateResult
where
    I: IntoIterator<Item = &'a StopRecord>,
    K: GroupKey,
    F: Fn(&StopRecord) -> K,
{
    let mut result = aggregate(records, key_fn, filter, AggregateOptions::counts());
    result.entries.truncate(n);
    result.median = median(result.entries.iter().map(|e| e.count));
    result
}

/// The component of `timestamp` a granularity groups by.
#[allow(clippy::cast_possible_wrap)]
fn temporal_component(granularity: TimeGranularity, timestamp: &NaiveDateTime) -> i32 {
    match granularity {
        TimeGranularity::Hour => timestamp.hour() as i32,
        TimeGranularity::Day => timestamp.day() as i32,
        TimeGranularity::Month => timestamp.month() as i32,
        TimeGranularity::Year => timestamp.year(),
    }
}

/// Display label for a temporal bucket.
#[must_use]
pub fn temporal_label(granularity: TimeGranularity, value: i32) -> String {
    match granularity {
        TimeGranularity::Hour => format!("{value:02}"),
        TimeGranularity::Month => u8::try_from(value)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map_or_else(|| value.to_string(), |m| m.name().to_string()),
        TimeGranularity::Day | TimeGranularity::Year => value.to_string(),
    }
}

/// Counts records per hour, day, month, or year in ascending order.
///
/// Every bucket in the range is present, zero when no record falls in it:
/// hours `00`-`23`, days `1`-`31`, months January-December, and years from
/// the earliest to the latest observed (empty when nothing matched).
#[must_use]
pub fn aggregate_temporal<'a, I>(
    records: I,
    granularity: TimeGranularity,
    filter: &StopFilter,
    percentages: bool,
) -> AggregateResult
where
    I: IntoIterator<Item = &'a StopRecord>,
{
    let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
    let mut total = 0;

    for record in records.into_iter().filter(|r| filter.matches(r)) {
        total += 1;
        *counts
            .entry(temporal_component(granularity, &record.timestamp))
            .or_default() += 1;
    }

    let range = match granularity {
        TimeGranularity::Hour => 0..=23,
        TimeGranularity::Day => 1..=31,
        TimeGranularity::Month => 1..=12,
        TimeGranularity::Year => match (counts.keys().next(), counts.keys().next_back()) {
            (Some(first), Some(last)) => *first..=*last,
            _ => return build_result(std::iter::empty(), total, percentages),
        },
    };

    build_result(
        range.map(|value| {
            (
                temporal_label(granularity, value),
                counts.get(&value).copied().unwrap_or(0),
            )
        }),
        total,
        percentages,
    )
}

#[cfg(test)]
mod tests {
    use chrono::Timelike as _;

    use super::*;

    fn stop(race: &str, county: &str, ts: &str) -> StopRecord {
        StopRecord {
            subject_race: CategoryValue::from(race),
            subject_sex: CategoryValue::from("Men"),
            search_conducted: false,
            search_vehicle: false,
            violation_parsed: CategoryValue::from("Speeding"),
            county_name: county.to_string(),
            lat: None,
            lng: None,
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
        }
    }

    fn races(labels: &[&str]) -> Vec<StopRecord> {
        labels
            .iter()
            .map(|r| stop(r, "Harris County", "2020-01-01 12:00:00"))
            .collect()
    }

    fn by_race(r: &StopRecord) -> CategoryValue {
        r.subject_race.clone()
    }

    #[test]
    fn counts_descending_with_first_seen_ties() {
        let records = races(&["White", "White", "Black", "Hispanic"]);
        let result = aggregate(
            &records,
            by_race,
            &StopFilter::default(),
            AggregateOptions::counts(),
        );

        assert_eq!(result.labels(), vec!["White", "Black", "Hispanic"]);
        assert_eq!(
            result.entries.iter().map(|e| e.count).collect::<Vec<_>>(),
            vec![2, 1, 1]
        );
        assert_eq!(result.total, 4);
        assert!(result.entries.iter().all(|e| e.percentage.is_none()));
    }

    #[test]
    fn first_seen_and_key_orders() {
        let records = races(&["Other", "Asian", "Asian", "Black"]);

        let first_seen = aggregate(
            &records,
            by_race,
            &StopFilter::default(),
            AggregateOptions::counts().ordered(EntryOrder::FirstSeen),
        );
        assert_eq!(first_seen.labels(), vec!["Other", "Asian", "Black"]);

        let ascending = aggregate(
            &records,
            by_race,
            &StopFilter::default(),
            AggregateOptions::counts().ordered(EntryOrder::KeyAscending),
        );
        assert_eq!(ascending.labels(), vec!["Asian", "Black", "Other"]);
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let records = races(&["White", "Black", "Black", "Asian", "Other", "Hispanic", "White"]);
        let result = aggregate(
            &records,
            by_race,
            &StopFilter::default(),
            AggregateOptions::percentages(),
        );

        assert!((result.percentage_sum() - 100.0).abs() < 1e-6);
        assert_eq!(result.count_sum(), records.len() as u64);
    }

    #[test]
    fn filter_restricts_counts_and_denominator() {
        let mut records = races(&["White", "White", "Black"]);
        records[0].subject_sex = CategoryValue::from("Women");

        let filter = StopFilter {
            sex: Some(CategoryValue::from("Men")),
            ..StopFilter::default()
        };
        let result = aggregate(&records, by_race, &filter, AggregateOptions::percentages());

        assert_eq!(result.total, 2);
        assert_eq!(result.count_of("White"), Some(1));
        assert_eq!(result.count_of("Black"), Some(1));
        assert!((result.percentage_sum() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn empty_input_has_no_entries() {
        let result = aggregate(
            std::iter::empty(),
            by_race,
            &StopFilter::default(),
            AggregateOptions::percentages(),
        );
        assert!(result.is_empty());
        assert_eq!(result.total, 0);
    }

    #[test]
    fn composite_keys_group_by_both_parts() {
        let records = vec![
            stop("White", "Harris County", "2020-01-01 07:00:00"),
            stop("White", "Harris County", "2020-01-02 07:30:00"),
            stop("White", "Harris County", "2020-01-02 08:00:00"),
            stop("Black", "Harris County", "2020-01-02 07:00:00"),
        ];
        let result = aggregate(
            &records,
            |r| (r.subject_race.clone(), r.timestamp.hour()),
            &StopFilter::default(),
            AggregateOptions::counts(),
        );

        assert_eq!(result.count_of("White / 7"), Some(2));
        assert_eq!(result.count_of("White / 8"), Some(1));
        assert_eq!(result.count_of("Black / 7"), Some(1));
    }

    #[test]
    fn top_n_of_fifty_counties() {
        // county i has i + 1 stops
        let records: Vec<StopRecord> = (0..50)
            .flat_map(|i| {
                (0..=i).map(move |_| stop("White", &format!("County {i}"), "2020-01-01 00:00:00"))
            })
            .collect();

        let result = aggregate_top_n(
            &records,
            |r| r.county_name.clone(),
            &StopFilter::default(),
            30,
        );

        assert_eq!(result.len(), 30);
        assert_eq!(result.entries[0].label, "County 49");
        assert_eq!(result.entries[0].count, 50);
        assert_eq!(result.entries[29].count, 21);
        assert!(result.entries.windows(2).all(|w| w[0].count >= w[1].count));
        // counts 21..=50, median (35 + 36) / 2
        assert_eq!(result.median, Some(35.5));
        assert_eq!(result.total, records.len() as u64);
    }

    #[test]
    fn top_n_larger_than_groups_keeps_all() {
        let records = races(&["White", "White", "Black"]);
        let result = aggregate_top_n(&records, by_race, &StopFilter::default(), 30);
        assert_eq!(result.len(), 2);
        assert_eq!(result.median, Some(1.5));
    }

    #[test]
    fn median_values() {
        assert_eq!(median(std::iter::empty()), None);
        assert_eq!(median([5]), Some(5.0));
        assert_eq!(median([9, 1, 4]), Some(4.0));
        assert_eq!(median([4, 1, 3, 2]), Some(2.5));
    }

    #[test]
    fn hours_are_always_twenty_four() {
        let records = vec![
            stop("White", "Harris County", "2020-01-01 00:15:00"),
            stop("White", "Harris County", "2020-01-01 23:59:59"),
            stop("White", "Harris County", "2020-01-02 23:00:00"),
        ];
        let result = aggregate_temporal(
            &records,
            TimeGranularity::Hour,
            &StopFilter::default(),
            false,
        );

        assert_eq!(result.len(), 24);
        assert_eq!(result.entries[0].label, "00");
        assert_eq!(result.entries[23].label, "23");
        assert_eq!(result.entries[0].count, 1);
        assert_eq!(result.entries[23].count, 2);
        assert_eq!(result.entries[12].count, 0);
        assert_eq!(result.count_sum(), 3);

        let empty = aggregate_temporal(
            std::iter::empty(),
            TimeGranularity::Hour,
            &StopFilter::default(),
            false,
        );
        assert_eq!(empty.len(), 24);
    }

    #[test]
    fn months_are_always_twelve_named() {
        let records = vec![stop("White", "Harris County", "2020-03-10 10:00:00")];
        let result = aggregate_temporal(
            &records,
            TimeGranularity::Month,
            &StopFilter::default(),
            false,
        );

        assert_eq!(result.len(), 12);
        assert_eq!(result.entries[0].label, "January");
        assert_eq!(result.entries[11].label, "December");
        assert_eq!(result.count_of("March"), Some(1));

        let empty = aggregate_temporal(
            std::iter::empty(),
            TimeGranularity::Month,
            &StopFilter::default(),
            false,
        );
        assert_eq!(empty.len(), 12);
        assert_eq!(empty.entries[0].label, "January");
        assert!(empty.entries.iter().all(|e| e.count == 0));
        assert_eq!(empty.total, 0);
    }

    #[test]
    fn days_cover_one_to_thirty_one() {
        let records = vec![stop("White", "Harris County", "2020-01-31 10:00:00")];
        let result = aggregate_temporal(
            &records,
            TimeGranularity::Day,
            &StopFilter::default(),
            false,
        );
        assert_eq!(result.len(), 31);
        assert_eq!(result.entries[0].label, "1");
        assert_eq!(result.count_of("31"), Some(1));
    }

    #[test]
    fn years_fill_gaps_between_min_and_max() {
        let records = vec![
            stop("White", "Harris County", "2016-06-01 10:00:00"),
            stop("White", "Harris County", "2019-06-01 10:00:00"),
            stop("White", "Harris County", "2019-07-01 10:00:00"),
        ];
        let result = aggregate_temporal(
            &records,
            TimeGranularity::Year,
            &StopFilter::default(),
            true,
        );

        assert_eq!(result.labels(), vec!["2016", "2017", "2018", "2019"]);
        assert_eq!(result.count_of("2017"), Some(0));
        assert_eq!(result.count_of("2019"), Some(2));
        assert!((result.percentage_sum() - 100.0).abs() < 1e-6);

        let empty = aggregate_temporal(
            std::iter::empty(),
            TimeGranularity::Year,
            &StopFilter::default(),
            true,
        );
        assert!(empty.is_empty());
    }

    #[test]
    fn temporal_respects_filter() {
        let records = vec![
            stop("White", "Harris County", "2020-01-01 10:00:00"),
            stop("Black", "Harris County", "2020-01-01 11:00:00"),
        ];
        let filter = StopFilter {
            race: Some(CategoryValue::from("Black")),
            ..StopFilter::default()
        };
        let result = aggregate_temporal(&records, TimeGranularity::Hour, &filter, true);
        assert_eq!(result.total, 1);
        assert_eq!(result.count_of("11"), Some(1));
        assert_eq!(result.count_of("10"), Some(0));
        assert_eq!(result.entries[11].percentage, Some(100.0));
    }

    #[test]
    fn percentage_of_zero_total_is_none() {
        assert_eq!(percentage(0, 0), None);
        assert_eq!(percentage(1, 4), Some(25.0));
    }

    #[test]
    fn month_labels_fall_back_to_number() {
        assert_eq!(temporal_label(TimeGranularity::Month, 13), "13");
        assert_eq!(temporal_label(TimeGranularity::Hour, 7), "07");
    }
}
