//! Progress reporting for multi-file statement runs.

use std::sync::Arc;

/// Receives per-file updates while a batch of statements is parsed.
pub trait BatchProgress: Send + Sync {
    /// A file is about to be parsed.
    fn start_file(&self, name: &str);

    /// The current file is finished, successfully or not.
    fn file_done(&self);

    /// Every file is finished; the indicator should disappear.
    fn finish(&self);
}

/// Draws nothing. Used for single-file runs.
pub struct Silent;

impl BatchProgress for Silent {
    fn start_file(&self, _name: &str) {}
    fn file_done(&self) {}
    fn finish(&self) {}
}

/// Returns a shared [`Silent`] reporter.
#[must_use]
pub fn silent() -> Arc<dyn BatchProgress> {
    Arc::new(Silent)
}
