//! # Step Timing Statistics
//!
//! A rolling, time-bounded history of samples and percentile summaries of it.
//! The tick coordinator records one sample per completed tick.

mod timestamped;
mod timing;

pub use timestamped::TimestampedList;
pub use timing::TimingStats;
