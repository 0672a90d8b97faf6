#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the accident map tools.
//!
//! [`IndicatifProgress`] draws pipeline stages as an `indicatif` bar behind
//! the [`StageProgress`] trait. [`init_logger`] installs
//! `pretty_env_logger` behind `indicatif-log-bridge`, so log lines are
//! suspended while bars redraw instead of tearing them.

use std::sync::Arc;

use accident_map_pipeline::progress::StageProgress;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// An `indicatif` [`ProgressBar`] that implements [`StageProgress`].
pub struct IndicatifProgress {
    bar: ProgressBar,
    label: String,
}

impl IndicatifProgress {
    /// A bar that advances once per pipeline stage.
    ///
    /// `label` prefixes every stage name, e.g. `"Building dashboard: Reading
    /// boundaries"`.
    #[must_use]
    pub fn stages_bar(multi: &MultiProgress, label: &str) -> Arc<dyn StageProgress> {
        let bar = multi.add(ProgressBar::new(0));
        bar.set_style(
            ProgressStyle::with_template(
                "{msg:<52} {wide_bar:.green/dim} {pos}/{len} [{elapsed_precise}]",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
        );
        bar.set_message(label.to_string());

        Arc::new(Self {
            bar,
            label: label.to_string(),
        })
    }
}

impl StageProgress for IndicatifProgress {
    fn begin(&self, stages: u64) {
        self.bar.set_length(stages);
        self.bar.set_position(0);
    }

    fn stage(&self, name: &str) {
        self.bar.set_message(format!("{}: {name}", self.label));
    }

    fn stage_done(&self) {
        self.bar.inc(1);
    }

    fn complete(&self, summary: &str) {
        self.bar.finish_with_message(format!("{}: {summary}", self.label));
    }

    fn abandon(&self) {
        self.bar.finish_and_clear();
    }
}

/// Initializes `pretty_env_logger` (filtered by `RUST_LOG`) wrapped in
/// `indicatif-log-bridge`.
///
/// Returns the [`MultiProgress`] every progress bar must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    // A logger may already be installed (e.g. by a test harness).
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}
