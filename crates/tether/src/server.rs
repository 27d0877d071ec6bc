//! # Server Physics
//!
//! The state attached to the host server. Owns the engine handle, the loaded
//! settings and the tick coordinator, and creates the world and player states.
//!
//! Unlike world and player states this one is not behind a
//! [`GuardedCell`]: everything mutable in it synchronizes itself, so a tick
//! never has to take a lock just to reach the stepping flag.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tether_core::{GuardedCell, TimingStats};

use crate::config::{timing_window, Settings};
use crate::engine::PhysicsEngine;
use crate::error::PhysicsResult;
use crate::scope::{HostScope, ScopeKind, ServerHost};
use crate::state::{PlayerPhysics, WorldPhysics};
use crate::tick::{StepScope, TickCoordinator, TickOutcome};

/// Simulated seconds per host tick at a multiplier of 1.0 (20 ticks/second).
pub const BASE_TIME_STEP: f64 = 0.05;

/// Physics attached to the host server.
pub struct ServerPhysics {
    engine: Arc<dyn PhysicsEngine>,
    settings: Settings,
    coordinator: TickCoordinator,
}

impl ServerPhysics {
    /// Validates `settings` and binds them to `engine`.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::Config`](crate::PhysicsError::Config) if the
    /// settings are out of range.
    pub fn new(engine: Arc<dyn PhysicsEngine>, settings: Settings) -> PhysicsResult<Self> {
        settings.validate()?;
        tracing::info!("Loaded physics engine {} v{}", engine.name(), engine.version());

        let coordinator = TickCoordinator::new(settings.stats.retention());
        Ok(Self {
            engine,
            settings,
            coordinator,
        })
    }

    /// The engine collaborator.
    #[must_use]
    pub fn engine(&self) -> &dyn PhysicsEngine {
        self.engine.as_ref()
    }

    /// Loaded settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The tick coordinator.
    #[must_use]
    pub const fn coordinator(&self) -> &TickCoordinator {
        &self.coordinator
    }

    /// Simulated seconds advanced per tick.
    #[inline]
    #[must_use]
    pub fn dt(&self) -> f64 {
        BASE_TIME_STEP * self.settings.time_step_multiplier
    }

    /// Creates a world state with the world's configured space settings.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::Engine`](crate::PhysicsError::Engine) if the
    /// engine cannot create the space.
    pub fn create_world_physics(&self, key: &str) -> PhysicsResult<GuardedCell<WorldPhysics>> {
        let settings = self.settings.space_settings_for(key);
        let simulation = self.engine.create_simulation(ScopeKind::World, &settings)?;
        Ok(GuardedCell::new(WorldPhysics::new(key, settings, simulation)))
    }

    /// Creates a player state for a player standing in `world`.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::Engine`](crate::PhysicsError::Engine) if the
    /// engine cannot create the simulation.
    pub fn create_player_physics(
        &self,
        key: &str,
        world: &str,
    ) -> PhysicsResult<GuardedCell<PlayerPhysics>> {
        let settings = self.settings.space_settings_for(world);
        let simulation = self.engine.create_simulation(ScopeKind::Player, &settings)?;
        Ok(GuardedCell::new(PlayerPhysics::new(key, world, simulation)))
    }

    /// Registers `hook` to run with `dt` before every executed tick.
    ///
    /// See [`TickCoordinator::on_before_step`].
    pub fn on_before_step(&self, hook: impl Fn(f64) + Send + Sync + 'static) {
        self.coordinator.on_before_step(hook);
    }

    /// Steps every world and player of `host` that has physics attached.
    ///
    /// Worlds step first, then players, each in the host's iteration order.
    pub fn on_tick<H: ServerHost>(&self, host: &H) -> TickOutcome {
        let worlds = host
            .worlds()
            .filter_map(|world| world.physics_slot().get())
            .map(|cell| cell as &dyn StepScope);
        let players = host
            .players()
            .filter_map(|player| player.physics_slot().get())
            .map(|cell| cell as &dyn StepScope);

        self.coordinator.tick(self.dt(), worlds.chain(players))
    }

    /// Detaches every world and player state of `host`.
    ///
    /// Every detached state is dropped here. Returns the number of world
    /// spaces destroyed.
    pub fn destroy_all<H: ServerHost>(&self, host: &mut H) -> usize {
        let worlds = host
            .worlds_mut()
            .filter_map(|world| world.physics_slot_mut().detach())
            .count();
        let players = host
            .players_mut()
            .filter_map(|player| player.physics_slot_mut().detach())
            .count();

        tracing::info!("Destroyed {worlds} world physics spaces");
        tracing::debug!(players, engine = self.engine.name(), "player physics detached");
        worlds
    }

    /// Tick durations over the last `window`, oldest first.
    #[must_use]
    pub fn timings(&self, window: Duration) -> Vec<Duration> {
        self.coordinator.timings(window)
    }

    /// Tick timing summary over the last `window`.
    #[must_use]
    pub fn timing_stats(&self, window: Duration) -> TimingStats {
        self.coordinator.timing_stats(window)
    }

    /// Tick timing summary for every configured window, in configured order.
    #[must_use]
    pub fn timing_report(&self) -> Vec<(Duration, TimingStats)> {
        self.settings
            .stats
            .timing_buffers
            .iter()
            .filter_map(|secs| timing_window(*secs))
            .map(|window| (window, self.timing_stats(window)))
            .collect()
    }

    /// Tick timing summary over the short live window (`timing_bar_buffer`).
    #[must_use]
    pub fn timing_bar_stats(&self) -> TimingStats {
        timing_window(self.settings.stats.timing_bar_buffer)
            .map(|window| self.timing_stats(window))
            .unwrap_or_default()
    }
}

impl fmt::Debug for ServerPhysics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerPhysics")
            .field("engine", &self.engine.name())
            .field("dt", &self.dt())
            .field("stepping", &self.coordinator.is_stepping())
            .finish_non_exhaustive()
    }
}
