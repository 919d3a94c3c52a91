#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the traffic stop dashboard.
//!
//! The browser page calls `GET /api/summary` on every control change. Each
//! request renders a [`DashboardSnapshot`](tx_stops_analytics_models::DashboardSnapshot)
//! on Actix's blocking pool; repeated requests with the same row limit are
//! served from the dashboard's record cache.

mod handlers;
pub mod interactive;
pub mod params;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use thiserror::Error;
use tx_stops_analytics::{AnalyticsError, Dashboard, DashboardConfig};
use tx_stops_source::RowLimit;

/// Environment variable for the bind address.
pub const BIND_ADDR_ENV: &str = "BIND_ADDR";

/// Environment variable for the port.
pub const PORT_ENV: &str = "PORT";

/// Errors surfaced to API clients.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Loading or aggregating failed.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// The `period` parameter is not a known granularity.
    #[error("Invalid period '{0}': expected hours, days, months, or years")]
    InvalidPeriod(String),
}

/// Shared application state.
pub struct AppState {
    /// Dashboard over the configured dataset, shared by every worker.
    pub dashboard: Arc<Dashboard>,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_addr: String,
    /// Port to bind.
    pub port: u16,
    /// Dataset and label configuration.
    pub dashboard: DashboardConfig,
}

impl ServerConfig {
    /// Reads `BIND_ADDR` and `PORT` along with the dashboard variables.
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr = std::env::var(BIND_ADDR_ENV).unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = std::env::var(PORT_ENV)
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Self {
            bind_addr,
            port,
            dashboard: DashboardConfig::from_env(),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::QueryConfig::default().error_handler(handlers::query_error))
            .route("/health", web::get().to(handlers::health))
            .route("/views", web::get().to(handlers::views))
            .route("/labels", web::get().to(handlers::labels))
            .route("/summary", web::get().to(handlers::summary)),
    );
}

/// Starts the dashboard API server.
///
/// Builds the [`Dashboard`], warms its cache with the default row limit,
/// and serves until shut down. The caller provides the async runtime (e.g.
/// via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the label configuration is
/// unusable, or if the HTTP server fails to bind or encounters a runtime
/// error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    log::info!("Using dataset {}", config.dashboard.dataset.display());

    let dashboard = Dashboard::new(config.dashboard).map_err(std::io::Error::other)?;

    // a missing dataset is reported per request as 503, not fatal here
    if let Err(e) = dashboard.records(RowLimit::default()) {
        log::warn!("Initial dataset load failed: {e}");
    }

    let state = web::Data::new(AppState {
        dashboard: Arc::new(dashboard),
    });

    let bind_addr = config.bind_addr;
    let port = config.port;

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
