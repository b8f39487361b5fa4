/// Time series helpers for activity-burst analysis

use chrono::{DateTime, Duration as ChronoDuration, Utc};

/// Ordered activity timestamps for one account
#[derive(Clone, Debug, Default)]
pub struct ActivitySeries {
    timestamps: Vec<DateTime<Utc>>,
    sorted: bool,
}

impl ActivitySeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, timestamp: DateTime<Utc>) {
        self.timestamps.push(timestamp);
        self.sorted = false;
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Largest number of events inside any window of the given width.
    ///
    /// Both window edges are inclusive. Series with fewer than two events
    /// report a window of one.
    pub fn peak_window_count(&mut self, window: ChronoDuration) -> usize {
        if self.timestamps.len() < 2 {
            return 1;
        }
        if !self.sorted {
            self.timestamps.sort_unstable();
            self.sorted = true;
        }
        max_events_within(&self.timestamps, window)
    }
}

/// Two-pointer sweep over timestamps sorted ascending
pub fn max_events_within(sorted: &[DateTime<Utc>], window: ChronoDuration) -> usize {
    let mut left = 0;
    let mut peak = 0;

    for right in 0..sorted.len() {
        while left < right && sorted[right] - sorted[left] > window {
            left += 1;
        }
        peak = peak.max(right - left + 1);
    }

    peak
}
