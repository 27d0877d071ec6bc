//! # Access
//!
//! The two entry points the rest of a game reaches physics through:
//! [`physics_of`] to find a scope's handle and [`with_lock`] to use it.
//!
//! ```rust,ignore
//! if let Some(world) = physics_of(&level) {
//!     let bodies = with_lock(world, |w| w.stats().counts.rigid_bodies);
//! }
//! ```
//!
//! There is no global "current server". Every lookup starts from a host
//! object the caller already holds, and the state borrowed from it cannot
//! outlive that object.

use tether_core::GuardedCell;

use crate::scope::HostScope;

/// Returns the state attached to `scope`, or `None` if it has no physics.
///
/// Safe from any thread. `None` before the construction hook has run and
/// after an unload; callers treat it as "nothing to do".
#[inline]
#[must_use]
pub fn physics_of<S: HostScope>(scope: &S) -> Option<&S::State> {
    scope.physics_slot().get()
}

/// Returns whether `scope` currently has physics attached.
#[inline]
#[must_use]
pub fn has_physics<S: HostScope>(scope: &S) -> bool {
    scope.physics_slot().is_attached()
}

/// Runs `f` with exclusive access to the state behind `handle`.
///
/// # Panics
///
/// Panics if called for the same handle from inside `f`.
#[inline]
pub fn with_lock<T, R>(handle: &GuardedCell<T>, f: impl FnOnce(&mut T) -> R) -> R {
    handle.with_lock(f)
}

/// Looks up `scope`'s state and runs `f` on it under its lock.
///
/// Returns `None` without calling `f` if the scope has no physics.
pub fn with_physics<S, T, R>(scope: &S, f: impl FnOnce(&mut T) -> R) -> Option<R>
where
    S: HostScope<State = GuardedCell<T>>,
{
    physics_of(scope).map(|handle| handle.with_lock(f))
}
