//! # Guarded Cell
//!
//! Exclusive access to a value shared across threads.
//!
//! ## Thread Safety
//!
//! - `with_lock`: blocks until free, runs the closure, releases on every exit path
//! - Re-entrant acquisition from the holding thread panics instead of deadlocking
//! - The lock never poisons: a panic inside the closure still releases it

use std::any::type_name;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Token `0` means "no holder".
static NEXT_THREAD_TOKEN: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_TOKEN: u64 = NEXT_THREAD_TOKEN.fetch_add(1, Ordering::Relaxed);
}

fn thread_token() -> u64 {
    THREAD_TOKEN.with(|token| *token)
}

/// A value behind a single mutual-exclusion lock.
///
/// A cell always holds a value. It is constructed with one and is never
/// observably "locked but empty".
///
/// ## Usage
///
/// ```rust
/// use tether_core::GuardedCell;
///
/// let cell = GuardedCell::new(0_u32);
/// cell.with_lock(|count| *count += 1);
/// assert_eq!(cell.with_lock(|count| *count), 1);
/// ```
///
/// ## Misuse
///
/// Calling `with_lock` on the same cell from inside its own closure is a
/// defect. The cell detects it before blocking and panics:
///
/// ```rust,should_panic
/// use tether_core::GuardedCell;
///
/// let cell = GuardedCell::new(0_u8);
/// cell.with_lock(|_| cell.with_lock(|_| ()));
/// ```
pub struct GuardedCell<T> {
    /// Thread token of the current lock holder, or 0.
    holder: AtomicU64,
    value: Mutex<T>,
}

impl<T> GuardedCell<T> {
    /// Creates a new cell holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            holder: AtomicU64::new(0),
            value: Mutex::new(value),
        }
    }

    /// Runs `f` with exclusive access to the value.
    ///
    /// Blocks the calling thread until the lock is free. The lock is released
    /// when `f` returns or unwinds.
    ///
    /// # Panics
    ///
    /// Panics if the calling thread already holds this cell's lock.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let token = thread_token();
        // Only the holding thread ever stores its own token here, so seeing it
        // means we are inside our own closure.
        assert!(
            self.holder.load(Ordering::Acquire) != token,
            "re-entrant lock acquisition on GuardedCell<{}>",
            type_name::<T>()
        );

        let mut value = self.value.lock();
        self.holder.store(token, Ordering::Release);
        // Declared after the guard, so it runs first: holder is cleared before unlock.
        let _holder = HolderReset(&self.holder);
        f(&mut *value)
    }

    /// Returns whether some thread currently holds the lock.
    ///
    /// Only a hint: the answer may be stale by the time it is read.
    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.value.is_locked()
    }

    /// Mutable access without locking. Exclusive borrow proves no one else holds it.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    /// Consumes the cell, returning the value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: Default> Default for GuardedCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for GuardedCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedCell")
            .field("type", &type_name::<T>())
            .field("locked", &self.is_locked())
            .finish()
    }
}

struct HolderReset<'a>(&'a AtomicU64);

impl Drop for HolderReset<'_> {
    fn drop(&mut self) {
        self.0.store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_with_lock_returns_value() {
        let cell = GuardedCell::new(vec![1, 2, 3]);
        let sum: i32 = cell.with_lock(|v| v.iter().sum());
        assert_eq!(sum, 6);
        assert!(!cell.is_locked());
    }

    #[test]
    fn test_one_body_at_a_time() {
        const THREADS: usize = 8;
        const ITERATIONS: usize = 200;

        let cell = Arc::new(GuardedCell::new(0_usize));
        let inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..THREADS)
            .map(|seed| {
                let cell = Arc::clone(&cell);
                let inside = Arc::clone(&inside);
                thread::spawn(move || {
                    let mut rng = StdRng::seed_from_u64(seed as u64);
                    for _ in 0..ITERATIONS {
                        let pause = rng.gen_range(0..20_u64);
                        cell.with_lock(|count| {
                            assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0, "overlapping bodies");
                            if pause == 0 {
                                thread::sleep(Duration::from_micros(50));
                            } else {
                                thread::yield_now();
                            }
                            *count += 1;
                            inside.fetch_sub(1, Ordering::SeqCst);
                        });
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cell.with_lock(|count| *count), THREADS * ITERATIONS);
    }

    #[test]
    #[should_panic(expected = "re-entrant lock acquisition")]
    fn test_reentrant_acquisition_panics() {
        let cell = GuardedCell::new(0_u8);
        cell.with_lock(|_| cell.with_lock(|_| ()));
    }

    #[test]
    fn test_released_after_panic() {
        let cell = GuardedCell::new(1_u32);

        let result = catch_unwind(AssertUnwindSafe(|| {
            cell.with_lock(|value| {
                *value = 2;
                panic!("boom");
            });
        }));
        assert!(result.is_err());

        // Same thread can lock again: both the mutex and the holder were released.
        assert!(!cell.is_locked());
        assert_eq!(cell.with_lock(|value| *value), 2);
    }

    #[test]
    fn test_other_cell_inside_body_is_fine() {
        let a = GuardedCell::new(1);
        let b = GuardedCell::new(2);
        let total = a.with_lock(|x| b.with_lock(|y| *x + *y));
        assert_eq!(total, 3);
    }

    #[test]
    fn test_into_inner_and_get_mut() {
        let mut cell = GuardedCell::new(String::from("a"));
        cell.get_mut().push('b');
        assert_eq!(cell.into_inner(), "ab");
    }
}
