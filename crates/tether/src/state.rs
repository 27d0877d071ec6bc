//! # Simulation State
//!
//! Per-scope physics data: one [`WorldPhysics`] per world, one
//! [`PlayerPhysics`] per player.
//!
//! A state is owned by its scope's attachment slot and lives behind that
//! slot's [`GuardedCell`](tether_core::GuardedCell). Nothing in here locks;
//! every method assumes the caller already holds the cell.

use std::fmt;
use std::time::Instant;

use crate::config::SpaceSettings;
use crate::engine::{BodyCounts, Simulation};
use crate::error::StepFailure;
use crate::scope::{ScopeKind, ScopeLabel};

/// Something the tick coordinator can advance.
pub trait Steppable: Send {
    /// Which scope this state belongs to.
    fn label(&self) -> &ScopeLabel;

    /// Runs just before [`step`](Self::step), under the same lock, so
    /// terrain, entities and bodies can be synced into the simulation.
    fn on_physics_step(&mut self, _dt: f64) {}

    /// Advances the state by `dt` seconds.
    ///
    /// # Errors
    ///
    /// Returns a [`StepFailure`] if the engine could not advance.
    fn step(&mut self, dt: f64) -> Result<(), StepFailure>;
}

/// Step bookkeeping kept alongside every simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Steps that completed.
    pub steps: u64,
    /// Steps the engine failed.
    pub failed_steps: u64,
    /// Body totals after the last completed step.
    pub counts: BodyCounts,
}

/// Called with the simulation and `dt` before every step of one scope.
pub type StepListener = Box<dyn FnMut(&mut dyn Simulation, f64) + Send>;

/// Engine simulation plus its bookkeeping.
struct Simulated {
    simulation: Box<dyn Simulation>,
    listeners: Vec<StepListener>,
    stats: StepStats,
    last_step: Option<Instant>,
}

impl Simulated {
    fn new(simulation: Box<dyn Simulation>) -> Self {
        let counts = simulation.counts();
        Self {
            simulation,
            listeners: Vec::new(),
            stats: StepStats {
                counts,
                ..StepStats::default()
            },
            last_step: None,
        }
    }

    fn before_step(&mut self, dt: f64) {
        for listener in &mut self.listeners {
            listener(self.simulation.as_mut(), dt);
        }
    }

    fn step(&mut self, label: &ScopeLabel, dt: f64) -> Result<(), StepFailure> {
        match self.simulation.advance(dt) {
            Ok(()) => {
                self.stats.steps += 1;
                self.stats.counts = self.simulation.counts();
                self.last_step = Some(Instant::now());
                Ok(())
            }
            Err(source) => {
                self.stats.failed_steps += 1;
                Err(StepFailure {
                    scope: label.clone(),
                    source,
                })
            }
        }
    }
}

/// World-scoped physics: the world's physics space.
pub struct WorldPhysics {
    label: ScopeLabel,
    settings: SpaceSettings,
    inner: Simulated,
}

impl WorldPhysics {
    /// Wraps an engine simulation created for world `key`.
    #[must_use]
    pub fn new(key: impl Into<String>, settings: SpaceSettings, simulation: Box<dyn Simulation>) -> Self {
        Self {
            label: ScopeLabel::new(ScopeKind::World, key),
            settings,
            inner: Simulated::new(simulation),
        }
    }

    /// World key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.label.key
    }

    /// Settings the space was created with.
    #[must_use]
    pub const fn settings(&self) -> &SpaceSettings {
        &self.settings
    }

    /// The engine simulation.
    #[must_use]
    pub fn simulation(&self) -> &dyn Simulation {
        self.inner.simulation.as_ref()
    }

    /// The engine simulation, for adding or editing bodies between ticks.
    pub fn simulation_mut(&mut self) -> &mut dyn Simulation {
        self.inner.simulation.as_mut()
    }

    /// Registers `listener` to run before every step of this scope.
    pub fn add_step_listener(
        &mut self,
        listener: impl FnMut(&mut dyn Simulation, f64) + Send + 'static,
    ) {
        self.inner.listeners.push(Box::new(listener));
    }

    /// Step bookkeeping.
    #[must_use]
    pub const fn stats(&self) -> StepStats {
        self.inner.stats
    }

    /// When the last step completed, if any has.
    #[must_use]
    pub const fn last_step(&self) -> Option<Instant> {
        self.inner.last_step
    }
}

impl Steppable for WorldPhysics {
    fn label(&self) -> &ScopeLabel {
        &self.label
    }

    fn on_physics_step(&mut self, dt: f64) {
        self.inner.before_step(dt);
    }

    fn step(&mut self, dt: f64) -> Result<(), StepFailure> {
        self.inner.step(&self.label, dt)
    }
}

impl fmt::Debug for WorldPhysics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldPhysics")
            .field("label", &self.label)
            .field("settings", &self.settings)
            .field("listeners", &self.inner.listeners.len())
            .field("stats", &self.inner.stats)
            .finish_non_exhaustive()
    }
}

/// Player-scoped physics: the player's own simulation (collision proxy,
/// held bodies) and the world it is in.
pub struct PlayerPhysics {
    label: ScopeLabel,
    world: String,
    inner: Simulated,
}

impl PlayerPhysics {
    /// Wraps an engine simulation created for player `key` in world `world`.
    #[must_use]
    pub fn new(key: impl Into<String>, world: impl Into<String>, simulation: Box<dyn Simulation>) -> Self {
        Self {
            label: ScopeLabel::new(ScopeKind::Player, key),
            world: world.into(),
            inner: Simulated::new(simulation),
        }
    }

    /// Player key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.label.key
    }

    /// Key of the world the player is in.
    #[must_use]
    pub fn world(&self) -> &str {
        &self.world
    }

    /// Records that the player moved to another world.
    pub fn set_world(&mut self, world: impl Into<String>) {
        self.world = world.into();
    }

    /// The engine simulation.
    #[must_use]
    pub fn simulation(&self) -> &dyn Simulation {
        self.inner.simulation.as_ref()
    }

    /// The engine simulation, mutably.
    pub fn simulation_mut(&mut self) -> &mut dyn Simulation {
        self.inner.simulation.as_mut()
    }

    /// Registers `listener` to run before every step of this scope.
    pub fn add_step_listener(
        &mut self,
        listener: impl FnMut(&mut dyn Simulation, f64) + Send + 'static,
    ) {
        self.inner.listeners.push(Box::new(listener));
    }

    /// Step bookkeeping.
    #[must_use]
    pub const fn stats(&self) -> StepStats {
        self.inner.stats
    }

    /// When the last step completed, if any has.
    #[must_use]
    pub const fn last_step(&self) -> Option<Instant> {
        self.inner.last_step
    }
}

impl Steppable for PlayerPhysics {
    fn label(&self) -> &ScopeLabel {
        &self.label
    }

    fn on_physics_step(&mut self, dt: f64) {
        self.inner.before_step(dt);
    }

    fn step(&mut self, dt: f64) -> Result<(), StepFailure> {
        self.inner.step(&self.label, dt)
    }
}

impl fmt::Debug for PlayerPhysics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerPhysics")
            .field("label", &self.label)
            .field("world", &self.world)
            .field("listeners", &self.inner.listeners.len())
            .field("stats", &self.inner.stats)
            .finish_non_exhaustive()
    }
}
