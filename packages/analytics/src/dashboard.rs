//! One dashboard request, end to end.
//!
//! [`Dashboard::render`] resolves the requested views, loads the dataset
//! through the shared [`RecordCache`], normalizes it, applies the global
//! filter, and returns everything the page draws in one
//! [`DashboardSnapshot`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tx_stops_analytics_models::{DashboardSnapshot, StopFilter, ViewName, ViewParams};
use tx_stops_source::paths::dataset_path_from_env;
use tx_stops_source::progress::{ProgressCallback, null_progress};
use tx_stops_source::{DEFAULT_MAX_ROWS, LoadedRecords, RecordCache, RowLimit};
use tx_stops_stop_models::{LabelMaps, StopRecord};

use crate::AnalyticsError;
use crate::cards::{map_points, summary_cards};
use crate::filter::resolve_filter;
use crate::normalize::normalize_all;
use crate::views::{render_views, resolve_views};

/// Environment variable overriding the fraction denominator.
pub const MAX_ROWS_ENV: &str = "TX_STOPS_MAX_ROWS";

/// Environment variable pointing at a label override TOML file.
pub const LABELS_ENV: &str = "TX_STOPS_LABELS";

/// Where the dashboard reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// CSV dataset path.
    pub dataset: PathBuf,
    /// Row count a fractional limit is a fraction of.
    pub max_rows: u64,
    /// Optional label override file. The embedded Texas labels are used
    /// when unset.
    pub labels: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset: tx_stops_source::paths::default_dataset_path(),
            max_rows: DEFAULT_MAX_ROWS,
            labels: None,
        }
    }
}

impl DashboardConfig {
    /// Reads `TX_STOPS_DATASET`, `TX_STOPS_MAX_ROWS`, and `TX_STOPS_LABELS`.
    #[must_use]
    pub fn from_env() -> Self {
        let max_rows = std::env::var(MAX_ROWS_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_MAX_ROWS);

        let labels = std::env::var(LABELS_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Self {
            dataset: dataset_path_from_env(),
            max_rows,
            labels,
        }
    }
}

/// Control values for one render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardParams {
    /// Row limit slider value.
    pub limit: RowLimit,
    /// Requested view names. Empty means every registered view.
    pub views: Vec<String>,
    /// Global filter.
    pub filter: StopFilter,
    /// Dropdown-driven view settings.
    pub view: ViewParams,
    /// Maximum number of map points to return.
    pub point_limit: Option<usize>,
}

/// Renders dashboard snapshots over one dataset.
pub struct Dashboard {
    dataset: PathBuf,
    max_rows: u64,
    labels: LabelMaps,
    cache: RecordCache,
    progress: Arc<dyn ProgressCallback>,
}

impl Dashboard {
    /// Creates a dashboard from configuration, reading the label override
    /// file if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Labels`] if the override file cannot be
    /// read or parsed.
    pub fn new(config: DashboardConfig) -> Result<Self, AnalyticsError> {
        let labels = match &config.labels {
            Some(path) => {
                log::info!("Loading label overrides from {}", path.display());
                LabelMaps::from_file(path)?
            }
            None => LabelMaps::texas(),
        };

        Ok(Self::with_labels(config.dataset, config.max_rows, labels))
    }

    /// Creates a dashboard with explicit label tables.
    #[must_use]
    pub fn with_labels(dataset: PathBuf, max_rows: u64, labels: LabelMaps) -> Self {
        Self {
            dataset,
            max_rows,
            labels,
            cache: RecordCache::new(),
            progress: null_progress(),
        }
    }

    /// Reports load progress to `progress` instead of discarding it.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// The dataset path.
    #[must_use]
    pub fn dataset(&self) -> &Path {
        &self.dataset
    }

    /// The fraction denominator.
    #[must_use]
    pub const fn max_rows(&self) -> u64 {
        self.max_rows
    }

    /// The active label tables.
    #[must_use]
    pub const fn labels(&self) -> &LabelMaps {
        &self.labels
    }

    /// Loads (or reuses) the normalized records for `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Source`] if the dataset cannot be loaded.
    pub fn records(&self, limit: RowLimit) -> Result<Arc<LoadedRecords>, AnalyticsError> {
        let labels = &self.labels;
        Ok(self.cache.get_or_load(
            &self.dataset,
            limit,
            self.max_rows,
            &self.progress,
            |loaded| loaded.map_records(|records| normalize_all(records, labels)),
        )?)
    }

    /// Builds the snapshot for one set of control values.
    ///
    /// # Errors
    ///
    /// * [`AnalyticsError::UnknownView`] if a requested view is not
    ///   registered. Nothing is loaded in that case.
    /// * [`AnalyticsError::Source`] if the dataset cannot be loaded.
    pub fn render(&self, params: &DashboardParams) -> Result<DashboardSnapshot, AnalyticsError> {
        let views = if params.views.is_empty() {
            ViewName::all().to_vec()
        } else {
            resolve_views(&params.views)?
        };

        let loaded = self.records(params.limit)?;

        let filter = resolve_filter(&params.filter, &self.labels);
        let filtered: Vec<&StopRecord> = loaded
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .collect();

        log::debug!(
            "Rendering {} views over {} of {} records",
            views.len(),
            filtered.len(),
            loaded.records.len()
        );

        Ok(DashboardSnapshot {
            row_cap: loaded.row_cap,
            loaded_records: loaded.records.len() as u64,
            skipped_rows: loaded.skipped,
            cards: summary_cards(filtered.iter().copied()),
            points: map_points(filtered.iter().copied(), params.point_limit),
            views: render_views(&filtered, &views, &params.view, &self.labels),
        })
    }
}
