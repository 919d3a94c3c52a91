//! HTTP handler functions for the dashboard API.

use std::sync::Arc;

use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use tx_stops_analytics::AnalyticsError;
use tx_stops_analytics_models::ViewName;
use tx_stops_server_models::{ApiError, ApiHealth, ApiViewInfo, SummaryQueryParams};
use tx_stops_source::SourceError;

use crate::params::dashboard_params;
use crate::{AppState, ServerError};

/// Status code and error kind for a failed request.
const fn classify(e: &ServerError) -> (StatusCode, &'static str) {
    match e {
        ServerError::InvalidPeriod(_) => (StatusCode::BAD_REQUEST, "invalid_period"),
        ServerError::Analytics(AnalyticsError::UnknownView { .. }) => {
            (StatusCode::BAD_REQUEST, "unknown_view")
        }
        ServerError::Analytics(AnalyticsError::Labels(_)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "labels")
        }
        ServerError::Analytics(AnalyticsError::Source(source)) => match source {
            SourceError::InvalidLimit { .. } => (StatusCode::BAD_REQUEST, "invalid_limit"),
            SourceError::DataUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "data_unavailable")
            }
            SourceError::SchemaMismatch { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "schema_mismatch")
            }
            SourceError::Csv(_) => (StatusCode::INTERNAL_SERVER_ERROR, "csv"),
        },
    }
}

fn error_response(e: &ServerError) -> HttpResponse {
    let (status, kind) = classify(e);

    if status.is_server_error() {
        log::error!("Failed to render summary: {e}");
    } else {
        log::debug!("Rejected summary request: {e}");
    }

    HttpResponse::build(status).json(ApiError {
        kind: kind.to_string(),
        error: e.to_string(),
    })
}

/// Rejects query strings that do not deserialize with the same `{kind, error}`
/// body as every other failure.
pub fn query_error(e: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected query for {}: {e}", req.path());

    let response = HttpResponse::BadRequest().json(ApiError {
        kind: "invalid_query".to_string(),
        error: e.to_string(),
    });
    InternalError::from_response(e, response).into()
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/views`
///
/// Lists the registered view names and their chart titles.
pub async fn views() -> HttpResponse {
    let views: Vec<ApiViewInfo> = ViewName::all()
        .iter()
        .copied()
        .map(ApiViewInfo::from)
        .collect();

    HttpResponse::Ok().json(views)
}

/// `GET /api/labels`
///
/// Returns the active code-to-label tables.
pub async fn labels(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.dashboard.labels())
}

/// `GET /api/summary`
///
/// Renders cards, map points, and the requested views for the given
/// control values. Loading and aggregation run on the blocking pool.
pub async fn summary(
    state: web::Data<AppState>,
    query: web::Query<SummaryQueryParams>,
) -> HttpResponse {
    let params = match dashboard_params(&query) {
        Ok(params) => params,
        Err(e) => return error_response(&e),
    };

    let dashboard = Arc::clone(&state.dashboard);

    match web::block(move || dashboard.render(&params)).await {
        Ok(Ok(snapshot)) => HttpResponse::Ok().json(snapshot),
        Ok(Err(e)) => error_response(&ServerError::from(e)),
        Err(e) => {
            log::error!("Summary task failed: {e}");
            HttpResponse::InternalServerError().json(ApiError {
                kind: "internal".to_string(),
                error: "Failed to render summary".to_string(),
            })
        }
    }
}
