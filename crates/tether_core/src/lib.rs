//! # TETHER Core
//!
//! Host-agnostic building blocks for attaching simulation state to objects
//! whose lifecycle belongs to someone else.
//!
//! ## Architecture
//!
//! ```text
//!   Host object (server / world / player)
//!        │
//!        └── AttachmentSlot<GuardedCell<State>>   set at construction, cleared at teardown
//!                   │
//!                   └── GuardedCell<State>         owned by the slot, borrowed by readers
//!                              │
//!                              └── parking_lot::Mutex<State>   every read and write
//! ```
//!
//! ## Rules
//!
//! 1. **One lock per state** - readers lock too, snapshots are always consistent
//! 2. **No silent replacement** - attaching over a live state is an error
//! 3. **Empty is not an error** - a missing attachment is `None`

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod attach;
pub mod error;
pub mod stats;
pub mod sync;

pub use attach::AttachmentSlot;
pub use error::{CoreError, CoreResult};
pub use stats::{TimestampedList, TimingStats};
pub use sync::GuardedCell;
