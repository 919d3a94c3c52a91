//! The registry of named dashboard views.
//!
//! Each [`ViewName`] is a fixed recipe over [`crate::aggregate`]. Requested
//! names are resolved against the registry before anything is computed, so
//! a single unknown name fails the whole request.

use tx_stops_analytics_models::{
    AggregateResult, StopFilter, SummaryView, TimeGranularity, ViewName, ViewParams, ViewSeries,
};
use tx_stops_stop_models::{CategoryValue, LabelMaps, StopRecord};

use crate::AnalyticsError;
use crate::aggregate::{AggregateOptions, aggregate, aggregate_temporal, aggregate_top_n};
use crate::filter::resolve_filter;

/// `violation_parsed` code for speeding.
pub const SPEEDING_CODE: i64 = 0;

/// Inputs shared by every view of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryParams {
    /// Dropdown-driven view settings.
    pub view: ViewParams,
    /// Global filter applied before every view's own filter.
    pub filter: StopFilter,
}

/// Resolves requested names against the registry, in request order.
///
/// # Errors
///
/// Returns [`AnalyticsError::UnknownView`] for the first name that is not
/// registered.
pub fn resolve_views<S: AsRef<str>>(requested: &[S]) -> Result<Vec<ViewName>, AnalyticsError> {
    requested
        .iter()
        .map(|name| {
            let name = name.as_ref().trim();
            name.parse::<ViewName>()
                .map_err(|_| AnalyticsError::UnknownView {
                    name: name.to_string(),
                })
        })
        .collect()
}

/// Builds the requested views over `records` (already normalized).
///
/// # Errors
///
/// Returns [`AnalyticsError::UnknownView`] if any requested name is not
/// registered. No view is computed in that case.
pub fn build_summary<S: AsRef<str>>(
    records: &[StopRecord],
    requested: &[S],
    params: &SummaryParams,
    labels: &LabelMaps,
) -> Result<Vec<SummaryView>, AnalyticsError> {
    let views = resolve_views(requested)?;

    let filter = resolve_filter(&params.filter, labels);
    let filtered: Vec<&StopRecord> = records.iter().filter(|r| filter.matches(r)).collect();

    Ok(render_views(&filtered, &views, &params.view, labels))
}

/// Builds already-resolved views over records that passed the global
/// filter.
#[must_use]
pub fn render_views(
    records: &[&StopRecord],
    views: &[ViewName],
    params: &ViewParams,
    labels: &LabelMaps,
) -> Vec<SummaryView> {
    views
        .iter()
        .map(|view| build_view(*view, records, params, labels))
        .collect()
}

fn single(view: ViewName, result: AggregateResult) -> Vec<ViewSeries> {
    vec![ViewSeries {
        name: view.title().to_string(),
        result,
    }]
}

fn build_view(
    view: ViewName,
    records: &[&StopRecord],
    params: &ViewParams,
    labels: &LabelMaps,
) -> SummaryView {
    let all = StopFilter::default();
    let iter = || records.iter().copied();

    let series = match view {
        ViewName::RaceDistribution => single(
            view,
            aggregate(iter(), |r| r.subject_race.clone(), &all, AggregateOptions::counts()),
        ),
        ViewName::GenderDistribution => single(
            view,
            aggregate(iter(), |r| r.subject_sex.clone(), &all, AggregateOptions::counts()),
        ),
        ViewName::ViolationDistribution => single(
            view,
            aggregate(
                iter(),
                |r| r.violation_parsed.clone(),
                &all,
                AggregateOptions::counts(),
            ),
        ),
        ViewName::SpeedingByGender => {
            let speeding = StopFilter {
                violation: Some(labels.violation.resolve(&CategoryValue::Code(SPEEDING_CODE))),
                ..StopFilter::default()
            };
            single(
                view,
                aggregate(
                    iter(),
                    |r| r.subject_sex.clone(),
                    &speeding,
                    AggregateOptions::percentages(),
                ),
            )
        }
        ViewName::GenderByRace => {
            let race = labels.race.resolve(&params.selected_race);
            let selected = StopFilter {
                race: Some(race.clone()),
                ..StopFilter::default()
            };
            vec![ViewSeries {
                name: race.to_string(),
                result: aggregate(
                    iter(),
                    |r| r.subject_sex.clone(),
                    &selected,
                    AggregateOptions::percentages(),
                ),
            }]
        }
        ViewName::CountyRanking => single(
            view,
            aggregate_top_n(iter(), |r| r.county_name.clone(), &all, params.top_n),
        ),
        ViewName::CountyDistribution => single(
            view,
            aggregate(iter(), |r| r.county_name.clone(), &all, AggregateOptions::counts()),
        ),
        ViewName::TicketsByHour => single(
            view,
            aggregate_temporal(iter(), TimeGranularity::Hour, &all, false),
        ),
        ViewName::TicketsByDay => single(
            view,
            aggregate_temporal(iter(), TimeGranularity::Day, &all, false),
        ),
        ViewName::TicketsByMonth => single(
            view,
            aggregate_temporal(iter(), TimeGranularity::Month, &all, false),
        ),
        ViewName::TicketsByYear => single(
            view,
            aggregate_temporal(iter(), TimeGranularity::Year, &all, false),
        ),
        ViewName::TicketsOverTime => vec![ViewSeries {
            name: format!("Tickets by {}", params.period),
            result: aggregate_temporal(iter(), params.period, &all, false),
        }],
        ViewName::RaceByHour => race_by_hour(records),
    };

    SummaryView {
        name: view,
        title: view.title().to_string(),
        series,
    }
}

/// One 24-hour series per race, races ordered by total stops. Percentages
/// are relative to each race's own total.
fn race_by_hour(records: &[&StopRecord]) -> Vec<ViewSeries> {
    let mut races: Vec<(CategoryValue, u64)> = Vec::new();
    for record in records {
        if let Some(race) = races.iter_mut().find(|(v, _)| *v == record.subject_race) {
            race.1 += 1;
        } else {
            races.push((record.subject_race.clone(), 1));
        }
    }
    races.sort_by(|a, b| b.1.cmp(&a.1));

    races
        .into_iter()
        .map(|(race, _)| {
            let filter = StopFilter {
                race: Some(race.clone()),
                ..StopFilter::default()
            };
            ViewSeries {
                name: race.to_string(),
                result: aggregate_temporal(
                    records.iter().copied(),
                    TimeGranularity::Hour,
                    &filter,
                    true,
                ),
            }
        })
        .collect()
}
