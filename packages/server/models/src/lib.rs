#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the traffic stop dashboard server.
//!
//! Query parameters arrive as loosely typed strings from the page's
//! dropdowns and sliders; the server validates them into dashboard
//! parameters. Responses reuse the analytics types where they already
//! serialize the way the page expects.

use serde::{Deserialize, Serialize};
use tx_stops_analytics_models::ViewName;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// A registered view as listed by `GET /api/views`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiViewInfo {
    /// Name to pass in the `views` parameter.
    pub name: ViewName,
    /// Chart title.
    pub title: String,
}

impl From<ViewName> for ApiViewInfo {
    fn from(name: ViewName) -> Self {
        Self {
            name,
            title: name.title().to_string(),
        }
    }
}

/// Error body returned for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error kind (e.g. `unknown_view`).
    pub kind: String,
    /// Human-readable message.
    pub error: String,
}

/// Query parameters for `GET /api/summary`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQueryParams {
    /// Row limit: a fraction in `(0, 1]` or an absolute row count.
    pub limit: Option<f64>,
    /// Comma-separated view names. All views when omitted.
    pub views: Option<String>,
    /// Granularity for `tickets_over_time` (`hours`, `days`, `months`,
    /// `years`).
    pub period: Option<String>,
    /// Race for `gender_by_race`, as a code or a label.
    pub selected_race: Option<String>,
    /// Number of counties in `county_ranking`.
    pub top_n: Option<usize>,
    /// Global race filter, as a code or a label.
    pub race: Option<String>,
    /// Global sex filter, as a code or a label.
    pub sex: Option<String>,
    /// Global violation filter, as a code or a label.
    pub violation: Option<String>,
    /// Global county filter.
    pub county: Option<String>,
    /// Global year filter.
    pub year: Option<i32>,
    /// Global month filter (1-12).
    pub month: Option<u32>,
    /// Global search-conducted filter.
    pub search_conducted: Option<bool>,
    /// Maximum number of map points returned.
    pub point_limit: Option<usize>,
}
