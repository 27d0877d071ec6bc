//! # Host Scopes
//!
//! The host's servers, worlds and players, as seen from here.
//!
//! The host owns these objects and their lifecycle. To carry physics, a host
//! object implements [`HostScope`] and stores one [`AttachmentSlot`] field,
//! which the host's construction path leaves empty and the lifecycle hooks in
//! [`crate::lifecycle`] fill.
//!
//! ```text
//!   ServerHost ── slot: ServerPhysics (coordinator, engine, settings)
//!     ├── WorldHost  ── slot: GuardedCell<WorldPhysics>
//!     └── PlayerHost ── slot: GuardedCell<PlayerPhysics>
//! ```

use std::fmt;

use tether_core::{AttachmentSlot, GuardedCell};

use crate::server::ServerPhysics;
use crate::state::{PlayerPhysics, WorldPhysics};

/// Kind of host object a state is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// The game server.
    Server,
    /// A world / level.
    World,
    /// A connected player.
    Player,
}

impl ScopeKind {
    /// Lowercase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::World => "world",
            Self::Player => "player",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one scope in logs and step reports, e.g. `world[overworld]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopeLabel {
    /// Kind of scope.
    pub kind: ScopeKind,
    /// Host key (world name, player name, ...).
    pub key: String,
}

impl ScopeLabel {
    /// Creates a label.
    #[must_use]
    pub fn new(kind: ScopeKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }
}

impl fmt::Display for ScopeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind, self.key)
    }
}

/// A host object that carries an attachment slot.
pub trait HostScope {
    /// Which kind of scope this is.
    const KIND: ScopeKind;

    /// What the slot holds.
    type State;

    /// Stable host key for this object.
    fn key(&self) -> &str;

    /// The slot, for reads.
    fn physics_slot(&self) -> &AttachmentSlot<Self::State>;

    /// The slot, for attach and detach.
    fn physics_slot_mut(&mut self) -> &mut AttachmentSlot<Self::State>;

    /// Label for logs.
    fn label(&self) -> ScopeLabel {
        ScopeLabel::new(Self::KIND, self.key())
    }
}

/// A host world.
pub trait WorldHost: HostScope<State = GuardedCell<WorldPhysics>> {}

/// A host player.
pub trait PlayerHost: HostScope<State = GuardedCell<PlayerPhysics>> {
    /// Key of the world the player is currently in.
    fn world_key(&self) -> &str;
}

/// The host server, aggregating its worlds and players.
pub trait ServerHost: HostScope<State = ServerPhysics> {
    /// World type of this host.
    type World: WorldHost;
    /// Player type of this host.
    type Player: PlayerHost;

    /// Every loaded world.
    fn worlds(&self) -> impl Iterator<Item = &Self::World>;

    /// Every loaded world, mutably (teardown).
    fn worlds_mut(&mut self) -> impl Iterator<Item = &mut Self::World>;

    /// Every connected player.
    fn players(&self) -> impl Iterator<Item = &Self::Player>;

    /// Every connected player, mutably (teardown).
    fn players_mut(&mut self) -> impl Iterator<Item = &mut Self::Player>;
}
