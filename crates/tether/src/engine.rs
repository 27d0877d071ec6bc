//! # Physics Engine Interface
//!
//! Traits the physics engine implements to plug into tether.
//!
//! ## Architecture
//!
//! tether DOES NOT integrate bodies, solve constraints or detect collisions.
//! The engine does, behind these traits:
//!
//! ```text
//! tether defines:              engine implements:
//! ┌────────────────────┐       ┌────────────────────┐
//! │ trait PhysicsEngine│  ←──  │ impl PhysicsEngine │   creates simulations
//! │ trait Simulation   │  ←──  │ impl Simulation    │   advances one of them
//! └────────────────────┘       └────────────────────┘
//! ```
//!
//! Both operations are synchronous and fallible. Their duration is the
//! host's tick budget to manage.

use crate::config::SpaceSettings;
use crate::error::EngineError;
use crate::scope::ScopeKind;

/// Body totals reported by a simulation after each step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BodyCounts {
    /// Colliders in the simulation.
    pub colliders: usize,
    /// Rigid bodies in the simulation.
    pub rigid_bodies: usize,
    /// Rigid bodies that are awake.
    pub active_rigid_bodies: usize,
}

/// One engine-owned simulation (a physics space).
///
/// Always accessed under the owning state's lock, so implementations do not
/// need their own synchronization.
pub trait Simulation: Send {
    /// Advances the simulation by `dt` seconds.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the step could not complete. The state is
    /// left as the engine left it; the next tick tries again.
    fn advance(&mut self, dt: f64) -> Result<(), EngineError>;

    /// Current body totals.
    fn counts(&self) -> BodyCounts {
        BodyCounts::default()
    }
}

/// The physics engine collaborator.
pub trait PhysicsEngine: Send + Sync {
    /// Engine name, for logs.
    fn name(&self) -> &str;

    /// Engine version, for logs.
    fn version(&self) -> &str;

    /// Creates a simulation for a scope of the given kind.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the engine cannot allocate the space.
    fn create_simulation(
        &self,
        kind: ScopeKind,
        settings: &SpaceSettings,
    ) -> Result<Box<dyn Simulation>, EngineError>;
}
