//! CSV loading for stop records.
//!
//! The header is checked against [`REQUIRED_COLUMNS`] before any row is
//! read. Rows are then deserialized until the resolved row cap is reached.
//! Rows with an unparseable timestamp are skipped and counted. A row that
//! is not valid CSV for the header (too few fields, invalid UTF-8) fails
//! the whole load.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tx_stops_stop_models::{CategoryValue, REQUIRED_COLUMNS, StopRecord};

use crate::SourceError;
use crate::limit::RowLimit;
use crate::parsing::{parse_flag, parse_lat_lng, parse_timestamp};
use crate::progress::ProgressCallback;

/// Rows between progress updates.
const PROGRESS_BATCH: u64 = 10_000;

/// Skipped rows logged individually before switching to a summary.
const MAX_LOGGED_SKIPS: u64 = 10;

/// Result of a single load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRecords {
    /// Records in file order.
    pub records: Vec<StopRecord>,
    /// Data rows consumed from the file (loaded + skipped).
    pub rows_read: u64,
    /// Rows that were read but could not be used.
    pub skipped: u64,
    /// Row cap the limit resolved to.
    pub row_cap: u64,
}

impl LoadedRecords {
    /// Replaces the records, keeping the load statistics.
    #[must_use]
    pub fn map_records(self, f: impl FnOnce(Vec<StopRecord>) -> Vec<StopRecord>) -> Self {
        Self {
            records: f(self.records),
            ..self
        }
    }
}

/// One CSV row before validation. Extra columns in the file are ignored.
#[derive(Debug, Deserialize)]
struct RawStopRow {
    subject_race: String,
    subject_sex: String,
    search_conducted: String,
    search_vehicle: String,
    violation_parsed: String,
    county_name: String,
    lat: String,
    lng: String,
    timestamp: String,
}

impl RawStopRow {
    fn into_record(self) -> Result<StopRecord, String> {
        let timestamp = parse_timestamp(&self.timestamp)
            .ok_or_else(|| format!("unparseable timestamp '{}'", self.timestamp))?;
        let coordinates = parse_lat_lng(&self.lat, &self.lng);

        Ok(StopRecord {
            subject_race: CategoryValue::parse(&self.subject_race),
            subject_sex: CategoryValue::parse(&self.subject_sex),
            search_conducted: parse_flag(&self.search_conducted),
            search_vehicle: parse_flag(&self.search_vehicle),
            violation_parsed: CategoryValue::parse(&self.violation_parsed),
            county_name: self.county_name.trim().to_string(),
            lat: coordinates.map(|(lat, _)| lat),
            lng: coordinates.map(|(_, lng)| lng),
            timestamp,
        })
    }
}

/// Converts a CSV error into the source taxonomy. I/O failures mean the
/// dataset could not be read at all.
fn map_csv_error(path: &Path, e: csv::Error) -> SourceError {
    if !e.is_io_error() {
        return SourceError::Csv(e);
    }

    let source = match e.into_kind() {
        csv::ErrorKind::Io(source) => source,
        kind => std::io::Error::other(format!("{kind:?}")),
    };
    SourceError::DataUnavailable {
        path: path.to_path_buf(),
        source,
    }
}

/// Returns every required column absent from `headers`.
fn missing_columns(headers: &csv::StringRecord) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h == **required))
        .map(|required| (*required).to_string())
        .collect()
}

/// Loads stop records from the CSV at `path`.
///
/// # Errors
///
/// * [`SourceError::DataUnavailable`] if the file does not exist or cannot
///   be read.
/// * [`SourceError::SchemaMismatch`] if required columns are missing.
/// * [`SourceError::Csv`] if a row is malformed.
pub fn load(
    path: &Path,
    limit: RowLimit,
    max_rows: u64,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<LoadedRecords, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::DataUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let row_cap = limit.resolve(max_rows);
    log::info!("Loading up to {row_cap} rows ({limit}) from {}", path.display());

    load_from_reader(BufReader::new(file), path, row_cap, progress)
}

/// Loads stop records from any reader. `path` is only used for error
/// messages.
///
/// # Errors
///
/// Same as [`load`], minus the file-open failure.
pub fn load_from_reader<R: Read>(
    reader: R,
    path: &Path,
    row_cap: u64,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<LoadedRecords, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| map_csv_error(path, e))?
        .clone();

    let missing = missing_columns(&headers);
    if !missing.is_empty() {
        return Err(SourceError::SchemaMismatch {
            path: PathBuf::from(path),
            missing,
        });
    }

    progress.set_total(row_cap);

    let take = usize::try_from(row_cap).unwrap_or(usize::MAX);
    let mut records = Vec::with_capacity(take.min(100_000));
    let mut rows_read: u64 = 0;
    let mut skipped: u64 = 0;

    for result in reader.deserialize::<RawStopRow>().take(take) {
        rows_read += 1;

        let row = result.map_err(|e| map_csv_error(path, e))?;

        match row.into_record() {
            Ok(record) => records.push(record),
            Err(reason) => {
                skipped += 1;
                if skipped <= MAX_LOGGED_SKIPS {
                    log::warn!("Skipping row {rows_read} of {}: {reason}", path.display());
                }
            }
        }

        if rows_read % PROGRESS_BATCH == 0 {
            progress.inc(PROGRESS_BATCH);
        }
    }

    progress.inc(rows_read % PROGRESS_BATCH);

    if skipped > MAX_LOGGED_SKIPS {
        log::warn!(
            "Skipped {skipped} unusable rows in {} ({} not logged)",
            path.display(),
            skipped - MAX_LOGGED_SKIPS
        );
    }

    log::info!(
        "Loaded {} stop records from {} ({rows_read} rows read, {skipped} skipped)",
        records.len(),
        path.display()
    );
    progress.finish(format!("loaded {} records", records.len()));

    Ok(LoadedRecords {
        records,
        rows_read,
        skipped,
        row_cap,
    })
}
