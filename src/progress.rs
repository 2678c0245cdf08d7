//! Terminal progress bar for enrichment batches.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::enrich::{BatchProgress, BatchReport};

const TEMPLATE: &str = "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

pub struct EnrichmentProgress {
    bar: ProgressBar,
}

impl EnrichmentProgress {
    /// A bar of `total` steps drawn on stderr.
    pub fn new(total: usize) -> Self {
        Self::with_target(total, ProgressDrawTarget::stderr())
    }

    /// A bar that tracks position without drawing anything.
    pub fn hidden(total: usize) -> Self {
        Self::with_target(total, ProgressDrawTarget::hidden())
    }

    fn with_target(total: usize, target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total as u64), target);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Self { bar }
    }

    /// Advance by one finished meteorite. Failures are printed above the bar.
    pub fn observe(&self, progress: BatchProgress<'_>) {
        self.bar.inc(1);
        self.bar.set_message(progress.name.to_string());
        if !progress.succeeded {
            self.bar.println(format!("{} failed", progress.name));
        }
    }

    pub fn finish(&self, batch: &BatchReport) {
        self.bar.finish_with_message(format!(
            "{} of {} detail pages read",
            batch.succeeded, batch.total
        ));
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}
