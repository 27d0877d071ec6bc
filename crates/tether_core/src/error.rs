//! # Core Error Types
//!
//! Errors raised by the attachment primitives.

use thiserror::Error;

/// Errors that can occur while attaching state to a host object.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A handle was attached to a slot that already holds one.
    ///
    /// This is a programming error in the integration layer: the slot must be
    /// detached before a new handle goes in.
    #[error("attachment conflict: a {state} handle is already attached")]
    AttachmentConflict {
        /// Type name of the attached state.
        state: &'static str,
    },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
