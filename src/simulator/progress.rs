use indicatif::{ProgressBar, ProgressStyle};

use crate::config::TrainMethod;

/// Observer notified once per propagated step.
pub trait Progress {
    fn inc(&self);

    fn finish(&self) {}
}

/// Terminal progress bar for trajectory sampling.
pub struct ProgressTracker {
    bar: ProgressBar,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self::with_bar(ProgressBar::new(total as u64))
    }

    /// A tracker that counts but never draws
    pub fn hidden(total: usize) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total as u64);
        Self::with_bar(bar)
    }

    /// Joint training resamples trajectories on every iteration, so no bar is drawn.
    pub fn for_train_method(train_method: TrainMethod, total: usize) -> Option<Self> {
        match train_method {
            TrainMethod::Joint => None,
            TrainMethod::Alternate => Some(Self::new(total)),
        }
    }

    fn with_bar(bar: ProgressBar) -> Self {
        if let Ok(style) = ProgressStyle::with_template(
            "{msg} {bar:40.yellow/white} {pos}/{len} [{elapsed_precise} < {eta_precise}]",
        ) {
            bar.set_style(style);
        }
        bar.set_message("Propagating dynamics");
        Self { bar }
    }

    /// Steps counted so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// `true` once every expected step has been counted
    pub fn is_complete(&self) -> bool {
        self.bar.length().is_some_and(|len| self.position() >= len)
    }
}

impl Progress for ProgressTracker {
    fn inc(&self) {
        self.bar.inc(1);
    }

    fn finish(&self) {
        if !self.is_complete() {
            tracing::warn!(
                steps = self.position(),
                expected = self.bar.length(),
                "Propagation finished before the expected number of steps"
            );
        }
        self.bar.finish_and_clear();
    }
}
