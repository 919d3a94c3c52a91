//! Headline cards and scatter-map points.

use tx_stops_analytics_models::{MapPoint, SummaryCards};
use tx_stops_stop_models::StopRecord;

/// Counts records and searches for the headline cards.
#[must_use]
pub fn summary_cards<'a>(records: impl IntoIterator<Item = &'a StopRecord>) -> SummaryCards {
    records
        .into_iter()
        .fold(SummaryCards::default(), |mut cards, record| {
            cards.total_records += 1;
            cards.search_conducted += u64::from(record.search_conducted);
            cards.search_vehicle += u64::from(record.search_vehicle);
            cards
        })
}

/// Map markers for records with coordinates, in record order, keeping at
/// most `limit` when one is given.
#[must_use]
pub fn map_points<'a>(
    records: impl IntoIterator<Item = &'a StopRecord>,
    limit: Option<usize>,
) -> Vec<MapPoint> {
    records
        .into_iter()
        .filter_map(|record| {
            let (lat, lng) = record.coordinates()?;
            Some(MapPoint {
                lat,
                lng,
                race: record.subject_race.clone(),
                sex: record.subject_sex.clone(),
                search_conducted: record.search_conducted,
                search_vehicle: record.search_vehicle,
            })
        })
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}
