//! Progress reporting for dataset loads.
//!
//! The loader reports rows read through [`ProgressCallback`] so that the
//! CLI can draw an `indicatif` bar while the HTTP server stays silent.

use std::sync::Arc;

/// Receives progress updates from a load.
///
/// Implementations must be `Send + Sync` so a single reporter can be shared
/// behind an `Arc`.
pub trait ProgressCallback: Send + Sync {
    /// Set the number of rows the load will read at most.
    fn set_total(&self, total: u64);

    /// Advance by `delta` rows.
    fn inc(&self, delta: u64);

    /// Mark the load complete with a final message.
    fn finish(&self, msg: String);
}

/// Reporter that ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
