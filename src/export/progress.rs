//! Progress tracking for export operations
//!
//! Provides a progress bar for long-running exports, giving the operator
//! real-time feedback on how far along the download is.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress tracker for export operations
///
/// Tracks exported row counts and displays a progress bar with throughput.
/// The total is always known upfront because the pipeline asks the API for
/// the row count before fetching pages.
pub struct ProgressTracker {
    /// Number of rows exported so far
    exported: AtomicU64,
    /// Start time of the operation
    start_time: Instant,
    /// Progress bar (optional, can be disabled)
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// Create a new progress tracker
    ///
    /// # Arguments
    /// * `total` - Total number of rows the export will produce
    /// * `enable_bar` - Whether to display a progress bar
    pub fn new(total: u64, enable_bar: bool) -> Self {
        let bar = if enable_bar {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("#>-"),
            );
            Some(bar)
        } else {
            None
        };

        Self {
            exported: AtomicU64::new(0),
            start_time: Instant::now(),
            bar,
        }
    }

    /// Update progress with the total row count exported so far
    pub fn update(&self, count: u64) {
        self.exported.store(count, Ordering::Relaxed);

        if let Some(ref bar) = self.bar {
            bar.set_position(count);

            let elapsed = self.start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let speed = count as f64 / elapsed;
                bar.set_message(format!("({:.0} rows/sec)", speed));
            }
        }
    }

    /// Rows reported so far
    pub fn exported(&self) -> u64 {
        self.exported.load(Ordering::Relaxed)
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
