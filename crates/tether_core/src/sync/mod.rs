//! # Synchronization Primitives for Attached State
//!
//! ## The Problem
//!
//! ```text
//! Tick thread:        step world physics (mutates positions, velocities, bodies)
//! Other threads:      spawn bodies, query state, read stats between ticks
//!
//! Field groups are not individually atomic. A reader must never see
//! positions from one step and velocities from another.
//! ```
//!
//! ## The Solution: One Lock Per State
//!
//! Every access, read or write, goes through [`GuardedCell::with_lock`].
//! There is no reader/writer split and no lock-free fast path: physics
//! mutation dominates, so a plain mutex is the cheapest correct option.

mod guarded;

pub use guarded::GuardedCell;
