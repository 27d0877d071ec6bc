//! # Attachment Slots
//!
//! Storage for a state, carried by a host object the host itself knows
//! nothing about.
//!
//! ## Lifecycle
//!
//! ```text
//!   host constructs object ──> attach(state)      slot: Some(state)
//!   any thread, any time   ──> get()              &T or None
//!   unload / teardown      ──> detach()           slot: None, state dropped by caller
//!   host drops object      ──> slot dropped       state dropped with it
//! ```
//!
//! The slot owns its state outright. Readers only ever get a borrow tied to
//! the host object, so nothing can keep a state alive past its scope.
//!
//! The slot itself is not locked. Attach and detach need `&mut`, which only
//! the construction and teardown paths have; readers borrow `&` and get a
//! state whose contents are guarded by their own lock.

use std::any::type_name;
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// A per-host-object slot holding at most one state.
///
/// Once set, the state stays in place until an explicit
/// [`detach`](Self::detach) or until the slot is dropped.
pub struct AttachmentSlot<T> {
    state: Option<T>,
}

impl<T> AttachmentSlot<T> {
    /// Creates an empty slot.
    #[must_use]
    pub const fn empty() -> Self {
        Self { state: None }
    }

    fn conflict() -> CoreError {
        CoreError::AttachmentConflict {
            state: type_name::<T>(),
        }
    }

    /// Stores `state` in the slot and returns a borrow of it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AttachmentConflict`] if a state is already
    /// attached. The existing state stays in place and `state` is dropped.
    pub fn attach(&mut self, state: T) -> CoreResult<&T> {
        self.attach_with(|| Ok::<_, CoreError>(state))
    }

    /// Creates a state with `create` and stores it.
    ///
    /// The slot is checked first, so `create` never runs when the slot is
    /// occupied.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AttachmentConflict`] (converted into `E`) if a
    /// state is already attached, or whatever `create` fails with.
    pub fn attach_with<E>(&mut self, create: impl FnOnce() -> Result<T, E>) -> Result<&T, E>
    where
        E: From<CoreError>,
    {
        if self.state.is_some() {
            return Err(Self::conflict().into());
        }
        let state = create()?;
        Ok(self.state.insert(state))
    }

    /// Returns the attached state, creating and storing it first if the slot
    /// is empty.
    ///
    /// # Errors
    ///
    /// Returns whatever `create` fails with. The slot stays empty.
    pub fn get_or_attach_with<E>(&mut self, create: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        let state = match self.state.take() {
            Some(state) => state,
            None => create()?,
        };
        Ok(self.state.insert(state))
    }

    /// Returns the attached state, or `None` if nothing is attached.
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.state.as_ref()
    }

    /// Clears the slot, returning the state that was attached.
    pub fn detach(&mut self) -> Option<T> {
        self.state.take()
    }

    /// Returns whether a state is attached.
    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.state.is_some()
    }
}

impl<T> Default for AttachmentSlot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for AttachmentSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentSlot")
            .field("state", &type_name::<T>())
            .field("attached", &self.is_attached())
            .finish()
    }
}
