//! Plain-text rendering of dashboard snapshots for the terminal.

use std::fmt::Write as _;

use tx_stops_analytics_models::{AggregateResult, DashboardSnapshot};

fn write_result(out: &mut String, result: &AggregateResult, indent: &str) {
    let width = result
        .entries
        .iter()
        .map(|e| e.label.len())
        .max()
        .unwrap_or(0)
        .max(8);

    for entry in &result.entries {
        match entry.percentage {
            Some(pct) => {
                let _ = writeln!(
                    out,
                    "{indent}{:<width$}  {:>9}  {pct:>6.2}%",
                    entry.label, entry.count
                );
            }
            None => {
                let _ = writeln!(out, "{indent}{:<width$}  {:>9}", entry.label, entry.count);
            }
        }
    }

    if let Some(median) = result.median {
        let _ = writeln!(out, "{indent}{:<width$}  {median:>9.1}", "median");
    }
}

/// Formats cards, point count, and every view as aligned text.
#[must_use]
pub fn format_snapshot(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Loaded {} rows (cap {}, {} skipped)",
        snapshot.loaded_records, snapshot.row_cap, snapshot.skipped_rows
    );
    let _ = writeln!(
        out,
        "Stops: {}  Searches: {}  Vehicle searches: {}  Map points: {}",
        snapshot.cards.total_records,
        snapshot.cards.search_conducted,
        snapshot.cards.search_vehicle,
        snapshot.points.len()
    );

    for view in &snapshot.views {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} ({})", view.title, view.name);

        if let [series] = view.series.as_slice() {
            write_result(&mut out, &series.result, "  ");
        } else {
            for series in &view.series {
                let _ = writeln!(out, "  {}", series.name);
                write_result(&mut out, &series.result, "    ");
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use tx_stops_analytics_models::{
        AggregateEntry, SummaryCards, SummaryView, ViewName, ViewSeries,
    };

    use super::*;

    fn entry(label: &str, count: u64, percentage: Option<f64>) -> AggregateEntry {
        AggregateEntry {
            label: label.to_string(),
            count,
            percentage,
        }
    }

    #[test]
    fn formats_cards_and_views() {
        let snapshot = DashboardSnapshot {
            row_cap: 1_000,
            loaded_records: 3,
            skipped_rows: 1,
            cards: SummaryCards {
                total_records: 3,
                search_conducted: 1,
                search_vehicle: 0,
            },
            points: Vec::new(),
            views: vec![SummaryView {
                name: ViewName::SpeedingByGender,
                title: ViewName::SpeedingByGender.title().to_string(),
                series: vec![ViewSeries {
                    name: "speeding".to_string(),
                    result: AggregateResult {
                        entries: vec![
                            entry("Men", 2, Some(66.666)),
                            entry("Women", 1, Some(33.333)),
                        ],
                        total: 3,
                        median: None,
                    },
                }],
            }],
        };

        let text = format_snapshot(&snapshot);

        assert!(text.starts_with("Loaded 3 rows (cap 1000, 1 skipped)\n"));
        assert!(text.contains("Stops: 3  Searches: 1"));
        assert!(text.contains("Percentage of Speeding Tickets by Gender (speeding_by_gender)"));
        assert!(text.contains("  Men               2   66.67%"));
    }

    #[test]
    fn multi_series_views_list_each_series() {
        let result = AggregateResult {
            entries: vec![entry("00", 1, None)],
            total: 1,
            median: Some(1.0),
        };
        let snapshot = DashboardSnapshot {
            row_cap: 10,
            loaded_records: 2,
            skipped_rows: 0,
            cards: SummaryCards::default(),
            points: Vec::new(),
            views: vec![SummaryView {
                name: ViewName::RaceByHour,
                title: ViewName::RaceByHour.title().to_string(),
                series: vec![
                    ViewSeries {
                        name: "White".to_string(),
                        result: result.clone(),
                    },
                    ViewSeries {
                        name: "Black".to_string(),
                        result,
                    },
                ],
            }],
        };

        let text = format_snapshot(&snapshot);
        assert!(text.contains("\n  White\n    00"));
        assert!(text.contains("\n  Black\n"));
        assert!(text.contains("    median"));
    }
}
