#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation engine behind the traffic stop dashboard.
//!
//! Records loaded by `tx_stops_source` are normalized to display labels,
//! filtered by the dashboard controls, and grouped into the named views
//! the presentation layer renders. [`dashboard::Dashboard`] ties the steps
//! together for one request.

pub mod aggregate;
pub mod cards;
pub mod dashboard;
pub mod filter;
pub mod normalize;
pub mod views;

use thiserror::Error;
use tx_stops_source::SourceError;
use tx_stops_stop_models::LabelMapError;

pub use dashboard::{Dashboard, DashboardConfig, DashboardParams};
pub use views::{SummaryParams, build_summary};

/// Errors that can occur while building dashboard data.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Loading the dataset failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A requested view is not registered.
    #[error("Unknown view '{name}'")]
    UnknownView {
        /// The name as requested.
        name: String,
    },

    /// The label override file could not be used.
    #[error("Label configuration error: {0}")]
    Labels(#[from] LabelMapError),
}
