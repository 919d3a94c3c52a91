#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Record source for the Texas traffic stop dataset.
//!
//! Reads stop records from a CSV file, bounded by a [`limit::RowLimit`],
//! and keeps the most recent load in a [`cache::RecordCache`] so that
//! repeated dashboard requests with the same parameters skip the file.

pub mod cache;
pub mod limit;
pub mod loader;
pub mod parsing;
pub mod paths;
pub mod progress;

use std::path::PathBuf;

pub use cache::RecordCache;
pub use limit::{DEFAULT_MAX_ROWS, RowLimit};
pub use loader::{LoadedRecords, load};

/// Errors that can occur while loading stop records.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The dataset file is missing or cannot be read.
    #[error("Dataset unavailable at {}: {source}", path.display())]
    DataUnavailable {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The dataset header lacks required columns.
    #[error("Dataset {} is missing required columns: {}", path.display(), missing.join(", "))]
    SchemaMismatch {
        /// Path that was requested.
        path: PathBuf,
        /// Every required column absent from the header.
        missing: Vec<String>,
    },

    /// A row-limit parameter is out of range.
    #[error("Invalid row limit {value}: {reason}")]
    InvalidLimit {
        /// The rejected parameter.
        value: f64,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A header or data row is not valid CSV for the expected layout.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
