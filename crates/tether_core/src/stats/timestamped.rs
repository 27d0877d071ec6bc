//! Time-bounded sample history.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Samples tagged with the instant they were recorded.
///
/// Entries older than `buffer` (relative to the newest push) are evicted on
/// every push, so memory is bounded by the sample rate times the buffer.
#[derive(Clone, Debug)]
pub struct TimestampedList<T> {
    buffer: Duration,
    entries: VecDeque<(Instant, T)>,
}

impl<T> TimestampedList<T> {
    /// Creates an empty list retaining samples for `buffer`.
    #[must_use]
    pub fn new(buffer: Duration) -> Self {
        Self {
            buffer,
            entries: VecDeque::new(),
        }
    }

    /// Retention window.
    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> Duration {
        self.buffer
    }

    /// Changes the retention window. Takes effect on the next push.
    pub fn set_buffer(&mut self, buffer: Duration) {
        self.buffer = buffer;
    }

    /// Records `value` now.
    pub fn push(&mut self, value: T) {
        self.push_at(Instant::now(), value);
    }

    /// Records `value` at `at`. Instants must be pushed in non-decreasing order.
    pub fn push_at(&mut self, at: Instant, value: T) {
        self.entries.push_back((at, value));

        let Some(threshold) = at.checked_sub(self.buffer) else {
            return;
        };
        while self
            .entries
            .front()
            .is_some_and(|(recorded, _)| *recorded < threshold)
        {
            self.entries.pop_front();
        }
    }

    /// Number of retained samples.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no samples are retained.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every sample.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone> TimestampedList<T> {
    /// Samples recorded within the last `window`, oldest first.
    #[must_use]
    pub fn get_last(&self, window: Duration) -> Vec<T> {
        self.get_last_at(Instant::now(), window)
    }

    /// Samples recorded strictly after `now - window`, oldest first.
    #[must_use]
    pub fn get_last_at(&self, now: Instant, window: Duration) -> Vec<T> {
        let threshold = now.checked_sub(window);
        let newer = self
            .entries
            .iter()
            .rev()
            .take_while(|(recorded, _)| threshold.map_or(true, |t| *recorded > t))
            .count();

        self.entries
            .iter()
            .skip(self.entries.len() - newer)
            .map(|(_, value)| value.clone())
            .collect()
    }
}
