//! Monotonic stage progress.

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::info;

/// Observable progress for one pipeline stage.
///
/// Updates are clamped so the signal never moves backwards; callers feed
/// it synthetic percentages during remote polling and it reaches 100 only
/// when the stage reports completion.
#[derive(Debug)]
pub struct ProgressReporter {
    stage: &'static str,
    percent: AtomicU8,
}

impl ProgressReporter {
    /// Create a reporter for a named stage.
    pub fn new(stage: &'static str) -> Self {
        Self {
            stage,
            percent: AtomicU8::new(0),
        }
    }

    /// Record progress. Regressions are ignored.
    pub fn update(&self, percent: u8) {
        let clamped = percent.min(100);
        let previous = self.percent.fetch_max(clamped, Ordering::Relaxed);
        if clamped > previous {
            info!(stage = self.stage, percent = clamped, "Progress");
        }
    }

    /// Current percentage.
    pub fn percent(&self) -> u8 {
        self.percent.load(Ordering::Relaxed)
    }

    /// Mark the stage complete.
    pub fn finish(&self) {
        self.update(100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_monotonic() {
        let progress = ProgressReporter::new("test");
        progress.update(10);
        progress.update(50);
        progress.update(30);
        assert_eq!(progress.percent(), 50);
    }

    #[test]
    fn test_progress_clamps_to_100() {
        let progress = ProgressReporter::new("test");
        progress.update(250);
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn test_finish_reaches_100() {
        let progress = ProgressReporter::new("test");
        progress.update(95);
        progress.finish();
        assert_eq!(progress.percent(), 100);
    }
}
