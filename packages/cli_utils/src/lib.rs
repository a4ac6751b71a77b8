#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the statement parser.
//!
//! Provides an `indicatif` files bar behind the [`BatchProgress`] trait,
//! plus [`init_logger`] which sets up `indicatif-log-bridge` so that
//! `log::info!` and friends are suspended while progress bars redraw.

pub mod progress;

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;
pub use progress::{BatchProgress, Silent, silent};

const FILES_TEMPLATE: &str = "{msg} {wide_bar:.green/dim} {pos}/{len} [{elapsed_precise}]";

/// One tick per statement file, labelled with the file being parsed.
pub struct FilesBar {
    bar: ProgressBar,
}

impl FilesBar {
    /// Adds a bar for `total` files to `multi`. It draws on stderr so
    /// stdout stays valid JSON.
    #[must_use]
    pub fn new(multi: &MultiProgress, total: u64) -> Self {
        let bar = multi.add(ProgressBar::new(total));
        bar.set_style(
            ProgressStyle::with_template(FILES_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );

        Self { bar }
    }

    /// Same as [`FilesBar::new`], shared behind the progress trait.
    #[must_use]
    pub fn shared(multi: &MultiProgress, total: u64) -> Arc<dyn BatchProgress> {
        Arc::new(Self::new(multi, total))
    }
}

impl BatchProgress for FilesBar {
    fn start_file(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn file_done(&self) {
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while progress bars redraw.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // already set (e.g. in tests)

    log::set_max_level(level);

    multi
}

#[cfg(test)]
mod tests {
    use indicatif::ProgressDrawTarget;

    use super::*;

    #[test]
    fn files_bar_counts_finished_files() {
        let multi = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let progress = FilesBar::new(&multi, 3);

        progress.start_file("a.pdf");
        progress.file_done();
        progress.start_file("b.pdf");
        progress.file_done();

        assert_eq!(progress.bar.position(), 2);
        assert_eq!(progress.bar.message(), "b.pdf");
        progress.finish();
        assert!(progress.bar.is_finished());
    }

    #[test]
    fn silent_ignores_updates() {
        let progress = silent();
        progress.start_file("a.pdf");
        progress.file_done();
        progress.finish();
    }
}
