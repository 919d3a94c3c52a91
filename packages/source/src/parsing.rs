//! Cell parsing for the stop CSV.
//!
//! Timestamp, boolean, and coordinate parsing shared by the loader. All
//! functions return `None`/`false` on bad input rather than failing, so the
//! loader can decide whether a row is usable.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parses a stop timestamp.
///
/// Accepts space- or `T`-separated date-times with optional fractional
/// seconds, minute precision, RFC 3339 with an offset (kept as local time),
/// and bare dates (midnight).
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses a boolean flag column. Anything unrecognized (including empty)
/// is `false`.
#[must_use]
pub fn parse_flag(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "true" | "t" | "1" | "1.0" | "yes" | "y"
    )
}

/// Parses lat/lng strings. Returns `None` if either is missing,
/// unparseable, or zero.
#[must_use]
pub fn parse_lat_lng(lat: &str, lng: &str) -> Option<(f64, f64)> {
    let latitude = lat.trim().parse::<f64>().ok()?;
    let longitude = lng.trim().parse::<f64>().ok()?;
    if !latitude.is_finite() || !longitude.is_finite() {
        return None;
    }
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }
    Some((latitude, longitude))
}
