//! Stage progress for pipeline runs.
//!
//! [`run`](crate::run) walks a fixed list of stages and announces each one
//! through [`StageProgress`]. The CLI draws them as an `indicatif` bar;
//! library callers and tests pass [`null_progress`].

use std::sync::Arc;

/// Receives stage updates from a pipeline run.
pub trait StageProgress: Send + Sync {
    /// A run with `stages` stages is starting.
    fn begin(&self, stages: u64);

    /// Stage `name` is starting.
    fn stage(&self, name: &str);

    /// The current stage finished.
    fn stage_done(&self);

    /// Every stage finished.
    fn complete(&self, summary: &str);

    /// The run stopped early, either because it failed or because a cached
    /// dataset was reused.
    fn abandon(&self);
}

/// Ignores every update.
pub struct NullProgress;

impl StageProgress for NullProgress {
    fn begin(&self, _stages: u64) {}
    fn stage(&self, _name: &str) {}
    fn stage_done(&self) {}
    fn complete(&self, _summary: &str) {}
    fn abandon(&self) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn StageProgress> {
    Arc::new(NullProgress)
}
