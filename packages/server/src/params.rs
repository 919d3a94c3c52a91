//! Validation of `/api/summary` query parameters.

use tx_stops_analytics::filter::parse_category_param;
use tx_stops_analytics::{AnalyticsError, DashboardParams};
use tx_stops_analytics_models::{StopFilter, TimeGranularity, ViewParams};
use tx_stops_server_models::SummaryQueryParams;
use tx_stops_source::RowLimit;

use crate::ServerError;

/// Splits a comma-separated list, dropping blank items.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Converts query parameters into dashboard parameters. Omitted values
/// fall back to the dashboard defaults.
///
/// # Errors
///
/// * [`ServerError::Analytics`] wrapping `InvalidLimit` for a bad `limit`.
/// * [`ServerError::InvalidPeriod`] for an unknown `period`.
pub fn dashboard_params(query: &SummaryQueryParams) -> Result<DashboardParams, ServerError> {
    let limit = query
        .limit
        .map(RowLimit::from_param)
        .transpose()
        .map_err(AnalyticsError::from)?
        .unwrap_or_default();

    let defaults = ViewParams::default();

    let period = match non_blank(query.period.as_deref()) {
        Some(period) => period
            .parse::<TimeGranularity>()
            .map_err(|_| ServerError::InvalidPeriod(period.to_string()))?,
        None => defaults.period,
    };

    let view = ViewParams {
        period,
        selected_race: query
            .selected_race
            .as_deref()
            .and_then(parse_category_param)
            .unwrap_or(defaults.selected_race),
        top_n: query.top_n.unwrap_or(defaults.top_n),
    };

    let filter = StopFilter {
        race: query.race.as_deref().and_then(parse_category_param),
        sex: query.sex.as_deref().and_then(parse_category_param),
        violation: query.violation.as_deref().and_then(parse_category_param),
        county: non_blank(query.county.as_deref()).map(ToString::to_string),
        year: query.year,
        month: query.month,
        search_conducted: query.search_conducted,
    };

    Ok(DashboardParams {
        limit,
        views: query.views.as_deref().map(split_list).unwrap_or_default(),
        filter,
        view,
        point_limit: query.point_limit,
    })
}

#[cfg(test)]
mod tests {
    use tx_stops_source::SourceError;
    use tx_stops_stop_models::CategoryValue;

    use super::*;

    #[test]
    fn empty_query_uses_defaults() {
        let params = dashboard_params(&SummaryQueryParams::default()).unwrap();
        assert_eq!(params, DashboardParams::default());
    }

    #[test]
    fn parses_every_parameter() {
        let query = SummaryQueryParams {
            limit: Some(0.25),
            views: Some("race_distribution, county_ranking,,".to_string()),
            period: Some("months".to_string()),
            selected_race: Some("2".to_string()),
            top_n: Some(10),
            race: Some("White".to_string()),
            sex: Some("1".to_string()),
            violation: Some(String::new()),
            county: Some(" Harris County ".to_string()),
            year: Some(2019),
            month: Some(6),
            search_conducted: Some(true),
            point_limit: Some(500),
        };
        let params = dashboard_params(&query).unwrap();

        assert_eq!(params.limit, RowLimit::Fraction(0.25));
        assert_eq!(params.views, vec!["race_distribution", "county_ranking"]);
        assert_eq!(params.view.period, TimeGranularity::Month);
        assert_eq!(params.view.selected_race, CategoryValue::Code(2));
        assert_eq!(params.view.top_n, 10);
        assert_eq!(params.filter.race, Some(CategoryValue::from("White")));
        assert_eq!(params.filter.sex, Some(CategoryValue::Code(1)));
        assert_eq!(params.filter.violation, None);
        assert_eq!(params.filter.county.as_deref(), Some("Harris County"));
        assert_eq!(params.filter.month, Some(6));
        assert_eq!(params.point_limit, Some(500));
    }

    #[test]
    fn absolute_limit() {
        let query = SummaryQueryParams {
            limit: Some(50.0),
            ..SummaryQueryParams::default()
        };
        assert_eq!(dashboard_params(&query).unwrap().limit, RowLimit::Absolute(50));
    }

    #[test]
    fn bad_limit_is_rejected() {
        let query = SummaryQueryParams {
            limit: Some(-1.0),
            ..SummaryQueryParams::default()
        };
        let err = dashboard_params(&query).unwrap_err();
        assert!(matches!(
            err,
            ServerError::Analytics(AnalyticsError::Source(SourceError::InvalidLimit { .. }))
        ));
    }

    #[test]
    fn bad_period_is_rejected() {
        let query = SummaryQueryParams {
            period: Some("fortnights".to_string()),
            ..SummaryQueryParams::default()
        };
        assert!(matches!(
            dashboard_params(&query),
            Err(ServerError::InvalidPeriod(p)) if p == "fortnights"
        ));
    }
}
