//! Percentile summary of step durations.

use std::time::Duration;

/// Median and tail step times, in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimingStats {
    /// 50th percentile.
    pub median_ms: f64,
    /// 5th percentile (fastest ticks).
    pub best5_ms: f64,
    /// 95th percentile (slowest ticks).
    pub worst5_ms: f64,
}

impl TimingStats {
    /// Computes stats over `samples`. Empty input gives all zeros.
    #[must_use]
    pub fn from_samples(samples: &[Duration]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();

        let at = |percent: usize| {
            let index = (sorted.len() * percent / 100).min(sorted.len() - 1);
            sorted[index].as_secs_f64() * 1000.0
        };

        Self {
            median_ms: at(50),
            best5_ms: at(5),
            worst5_ms: at(95),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(TimingStats::from_samples(&[]), TimingStats::default());
    }

    #[test]
    fn test_percentiles() {
        // 1..=20 ms, shuffled order must not matter
        let mut samples: Vec<Duration> = (1..=20).map(Duration::from_millis).collect();
        samples.reverse();

        let stats = TimingStats::from_samples(&samples);
        assert!((stats.median_ms - 11.0).abs() < 1e-9);
        assert!((stats.best5_ms - 2.0).abs() < 1e-9);
        assert!((stats.worst5_ms - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_sample() {
        let stats = TimingStats::from_samples(&[Duration::from_micros(2500)]);
        assert!((stats.median_ms - 2.5).abs() < 1e-9);
        assert!((stats.best5_ms - 2.5).abs() < 1e-9);
        assert!((stats.worst5_ms - 2.5).abs() < 1e-9);
    }
}
