//! # Tick Coordinator
//!
//! Advances every attached simulation once per host tick, and never twice at
//! the same time.
//!
//! ## State Machine
//!
//! ```text
//!            compare_exchange(false → true)
//!   ┌──────┐ ─────────────────────────────> ┌──────────┐
//!   │ Idle │                                │ Stepping │
//!   └──────┘ <───────────────────────────── └──────────┘
//!            unconditional reset (drop guard)
//!
//!   tick() while Stepping  ──>  Skipped, zero work, nothing queued
//! ```
//!
//! A dropped tick is not retried: the host calls again next tick, and running
//! two steps inside one host tick would push simulation time ahead of host time.
//!
//! ## Step Body
//!
//! ```text
//!   before-step hooks(dt)                        (no lock held)
//!   for each scope:
//!       lock scope ─> on_physics_step(dt) ─> advance(dt) ─> unlock
//!       failure    ─> warn!, record, continue
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tether_core::{GuardedCell, TimestampedList, TimingStats};

use crate::error::StepFailure;
use crate::state::Steppable;

/// A scope the coordinator can step: locks itself, advances, unlocks.
pub trait StepScope {
    /// Locks the scope's state, advances it by `dt`, releases the lock.
    ///
    /// # Errors
    ///
    /// Returns the scope's [`StepFailure`] if the advance failed.
    fn step_locked(&self, dt: f64) -> Result<(), StepFailure>;
}

impl<T: Steppable> StepScope for GuardedCell<T> {
    fn step_locked(&self, dt: f64) -> Result<(), StepFailure> {
        self.with_lock(|state| {
            state.on_physics_step(dt);
            state.step(dt)
        })
    }
}

/// Runs once per executed tick, before any scope steps.
pub type BeforeStep = dyn Fn(f64) + Send + Sync;

/// What one call to [`TickCoordinator::tick`] did.
#[derive(Clone, Debug)]
pub enum TickOutcome {
    /// Another step was in progress; this call did nothing.
    Skipped,
    /// This call ran the step body.
    Stepped(StepReport),
}

impl TickOutcome {
    /// Returns true if the tick was dropped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// The step report, if the tick ran.
    #[must_use]
    pub const fn report(&self) -> Option<&StepReport> {
        match self {
            Self::Skipped => None,
            Self::Stepped(report) => Some(report),
        }
    }
}

/// Result of one executed step body.
#[derive(Clone, Debug, Default)]
pub struct StepReport {
    /// Time step passed to every scope, in seconds.
    pub dt: f64,
    /// Scopes that advanced successfully.
    pub stepped: usize,
    /// Scopes whose advance failed, in step order.
    pub failures: Vec<StepFailure>,
    /// Wall time of the whole step body.
    pub elapsed: Duration,
}

impl StepReport {
    /// Scopes the body attempted, successful or not.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.stepped + self.failures.len()
    }
}

/// Resets the stepping flag when dropped, including during unwinding.
struct SteppingReset<'a>(&'a AtomicBool);

impl Drop for SteppingReset<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Per-server tick coordinator.
///
/// Holds the stepping flag and the history of tick durations.
pub struct TickCoordinator {
    /// True exactly while a step body is running.
    stepping: AtomicBool,
    /// Completed tick durations.
    timings: GuardedCell<TimestampedList<Duration>>,
    /// Hooks run at the start of every executed tick.
    before_step: GuardedCell<Vec<Arc<BeforeStep>>>,
    /// Ticks whose body ran.
    completed: AtomicU64,
    /// Ticks dropped because a step was in progress.
    skipped: AtomicU64,
}

impl TickCoordinator {
    /// Creates an idle coordinator keeping tick timings for `retention`.
    #[must_use]
    pub fn new(retention: Duration) -> Self {
        Self {
            stepping: AtomicBool::new(false),
            timings: GuardedCell::new(TimestampedList::new(retention)),
            before_step: GuardedCell::new(Vec::new()),
            completed: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
        }
    }

    /// Returns whether a step body is currently running.
    #[inline]
    #[must_use]
    pub fn is_stepping(&self) -> bool {
        self.stepping.load(Ordering::Acquire)
    }

    /// Registers `hook` to run with `dt` at the start of every executed tick,
    /// before any scope is locked. Dropped ticks do not run hooks.
    pub fn on_before_step(&self, hook: impl Fn(f64) + Send + Sync + 'static) {
        self.before_step.with_lock(|hooks| hooks.push(Arc::new(hook)));
    }

    /// Runs one tick over `scopes`, unless a tick is already running.
    ///
    /// `scopes` is consumed lazily, only after the flag is won, so a dropped
    /// tick touches no scope at all.
    pub fn tick<'a, I>(&self, dt: f64, scopes: I) -> TickOutcome
    where
        I: IntoIterator<Item = &'a dyn StepScope>,
    {
        if self
            .stepping
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.skipped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("physics tick dropped: previous step still in progress");
            return TickOutcome::Skipped;
        }
        let _idle = SteppingReset(&self.stepping);

        let start = Instant::now();

        // Snapshot, so a hook may register another hook without re-locking.
        let hooks = self.before_step.with_lock(|hooks| hooks.clone());
        for hook in &hooks {
            hook(dt);
        }

        let mut report = StepReport {
            dt,
            ..StepReport::default()
        };

        for scope in scopes {
            match scope.step_locked(dt) {
                Ok(()) => report.stepped += 1,
                Err(failure) => {
                    tracing::warn!(
                        scope = %failure.scope,
                        error = %failure.source,
                        "physics step failed"
                    );
                    report.failures.push(failure);
                }
            }
        }

        report.elapsed = start.elapsed();
        self.timings.with_lock(|timings| timings.push(report.elapsed));
        self.completed.fetch_add(1, Ordering::Relaxed);

        tracing::trace!(
            scopes = report.attempted(),
            failed = report.failures.len(),
            elapsed_us = u64::try_from(report.elapsed.as_micros()).unwrap_or(u64::MAX),
            "physics tick complete"
        );

        TickOutcome::Stepped(report)
    }

    /// Number of ticks whose body ran.
    #[must_use]
    pub fn completed_ticks(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Number of ticks dropped because a step was in progress.
    #[must_use]
    pub fn skipped_ticks(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Tick durations recorded within the last `window`, oldest first.
    #[must_use]
    pub fn timings(&self, window: Duration) -> Vec<Duration> {
        self.timings.with_lock(|timings| timings.get_last(window))
    }

    /// Median and tail tick durations over the last `window`.
    #[must_use]
    pub fn timing_stats(&self, window: Duration) -> TimingStats {
        TimingStats::from_samples(&self.timings(window))
    }
}

impl Default for TickCoordinator {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}
