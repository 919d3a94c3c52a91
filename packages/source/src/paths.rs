#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for stop datasets.
//!
//! The dataset lives under the project root's `data/` directory unless the
//! `TX_STOPS_DATASET` environment variable points elsewhere.

use std::path::{Path, PathBuf};

/// Environment variable overriding the dataset path.
pub const DATASET_ENV: &str = "TX_STOPS_DATASET";

/// File name of the cleaned statewide extract.
pub const DEFAULT_DATASET_FILE: &str = "tx_statewide_2020_04_01-002_clean.csv";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
///
/// # Panics
///
/// Panics if the project root cannot be resolved.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .to_path_buf()
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the default dataset path inside `data/`.
#[must_use]
pub fn default_dataset_path() -> PathBuf {
    data_dir().join(DEFAULT_DATASET_FILE)
}

/// Returns the dataset path from `TX_STOPS_DATASET`, falling back to
/// [`default_dataset_path`].
#[must_use]
pub fn dataset_path_from_env() -> PathBuf {
    std::env::var(DATASET_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map_or_else(default_dataset_path, PathBuf::from)
}

/// Returns the directory holding the small sample datasets shipped with
/// this crate.
#[must_use]
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Returns the path of a sample dataset by file name.
#[must_use]
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}
