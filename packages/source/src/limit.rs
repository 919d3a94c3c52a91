//! Row limits for dataset loads.
//!
//! The dashboard slider sends either an absolute number of rows or a
//! fraction of a fixed maximum. Both resolve to a concrete row cap before
//! any I/O happens, and that cap is what the load cache keys on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SourceError;

/// Default maximum row count that fractions are taken of.
pub const DEFAULT_MAX_ROWS: u64 = 1_000_000;

/// How many rows to read from the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum RowLimit {
    /// Read at most this many rows.
    Absolute(u64),
    /// Read this fraction (`0 < f <= 1`) of the maximum row count.
    Fraction(f64),
}

impl RowLimit {
    /// Interprets a single numeric parameter.
    ///
    /// Values in `(0, 1]` are fractions, integral values above 1 are
    /// absolute caps.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidLimit`] for non-finite, non-positive,
    /// or fractional values above 1.
    pub fn from_param(value: f64) -> Result<Self, SourceError> {
        if !value.is_finite() {
            return Err(SourceError::InvalidLimit {
                value,
                reason: "must be a finite number",
            });
        }
        if value <= 0.0 {
            return Err(SourceError::InvalidLimit {
                value,
                reason: "must be greater than zero",
            });
        }
        if value <= 1.0 {
            return Ok(Self::Fraction(value));
        }
        if value.fract() != 0.0 {
            return Err(SourceError::InvalidLimit {
                value,
                reason: "values above 1 must be whole row counts",
            });
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self::Absolute(value as u64))
    }

    /// Creates a fractional limit.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidLimit`] unless `0 < fraction <= 1`.
    pub fn fraction(fraction: f64) -> Result<Self, SourceError> {
        if fraction.is_finite() && fraction > 0.0 && fraction <= 1.0 {
            Ok(Self::Fraction(fraction))
        } else {
            Err(SourceError::InvalidLimit {
                value: fraction,
                reason: "fractions must be within (0, 1]",
            })
        }
    }

    /// Resolves this limit to a row cap.
    ///
    /// Fractions round to the nearest row and never resolve below one row
    /// or above `max_rows`.
    #[must_use]
    pub fn resolve(self, max_rows: u64) -> u64 {
        match self {
            Self::Absolute(rows) => rows,
            Self::Fraction(fraction) => {
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let rows = (fraction * max_rows as f64).round() as u64;
                rows.clamp(1, max_rows.max(1))
            }
        }
    }
}

impl Default for RowLimit {
    fn default() -> Self {
        Self::Absolute(1_000)
    }
}

impl TryFrom<f64> for RowLimit {
    type Error = SourceError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_param(value)
    }
}

impl From<RowLimit> for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from(limit: RowLimit) -> Self {
        match limit {
            RowLimit::Absolute(rows) => rows as Self,
            RowLimit::Fraction(fraction) => fraction,
        }
    }
}

impl FromStr for RowLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|e| format!("invalid row limit '{s}': {e}"))?;
        Self::from_param(value).map_err(|e| e.to_string())
    }
}

impl fmt::Display for RowLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(rows) => write!(f, "{rows} rows"),
            Self::Fraction(fraction) => write!(f, "{:.1}% of max", fraction * 100.0),
        }
    }
}
