//! # Lifecycle Hooks
//!
//! Functions the host calls from its own object lifecycle. Together they are
//! the only host callbacks tether depends on.
//!
//! ```text
//!   host event                 hook                       slot
//!   ────────────────────────   ────────────────────────   ─────────────────
//!   server constructed    ──>  on_server_constructed ──>  attach ServerPhysics
//!   world constructed     ──>  on_world_constructed  ──>  attach world state
//!   world unloaded        ──>  on_world_unloaded     ──>  detach + drop
//!   player joined         ──>  on_player_constructed ──>  attach player state
//!   player left           ──>  on_player_removed     ──>  detach + drop
//!   server tick           ──>  on_server_tick        ──>  (step everything)
//!   server stopping       ──>  on_server_stopping    ──>  detach + drop all
//! ```
//!
//! Hooks hand back borrows from the slot, never an owned handle: a state
//! lives exactly as long as its slot holds it.

use std::sync::Arc;

use tether_core::GuardedCell;

use crate::config::Settings;
use crate::engine::PhysicsEngine;
use crate::error::PhysicsResult;
use crate::scope::{HostScope, PlayerHost, ServerHost, WorldHost};
use crate::server::ServerPhysics;
use crate::state::{PlayerPhysics, WorldPhysics};
use crate::tick::TickOutcome;

/// Attaches server physics to a newly constructed server.
///
/// # Errors
///
/// Fails if the server already has physics or the settings are invalid.
/// Nothing is attached on failure.
pub fn on_server_constructed<S: ServerHost>(
    server: &mut S,
    engine: Arc<dyn PhysicsEngine>,
    settings: Settings,
) -> PhysicsResult<&ServerPhysics> {
    let label = server.label();
    let physics = server
        .physics_slot_mut()
        .attach_with(|| ServerPhysics::new(engine, settings))?;
    tracing::info!(scope = %label, "server physics attached");
    Ok(physics)
}

/// Creates and attaches physics for a newly constructed world.
///
/// # Errors
///
/// Fails if the world already has physics, in which case the engine is not
/// asked for a space and the existing state stays attached. Also fails if
/// the engine cannot create the space.
pub fn on_world_constructed<'w, W: WorldHost>(
    physics: &ServerPhysics,
    world: &'w mut W,
) -> PhysicsResult<&'w GuardedCell<WorldPhysics>> {
    let label = world.label();
    let state = world
        .physics_slot_mut()
        .attach_with(|| physics.create_world_physics(&label.key))?;
    tracing::info!(scope = %label, "world physics attached");
    Ok(state)
}

/// Returns the world's physics, creating and attaching it on first use.
///
/// # Errors
///
/// Fails if the engine cannot create the space.
pub fn physics_or_create<'w, W: WorldHost>(
    physics: &ServerPhysics,
    world: &'w mut W,
) -> PhysicsResult<&'w GuardedCell<WorldPhysics>> {
    let label = world.label();
    let created = !world.physics_slot().is_attached();
    let state = world
        .physics_slot_mut()
        .get_or_attach_with(|| physics.create_world_physics(&label.key))?;
    if created {
        tracing::info!(scope = %label, "world physics attached");
    }
    Ok(state)
}

/// Detaches and drops a world's physics when the host unloads it.
///
/// Returns whether anything was attached.
pub fn on_world_unloaded<W: WorldHost>(world: &mut W) -> bool {
    let detached = world.physics_slot_mut().detach().is_some();
    if detached {
        tracing::info!(scope = %world.label(), "world physics detached");
    }
    detached
}

/// Creates and attaches physics for a player who joined.
///
/// # Errors
///
/// Fails if the player already has physics (without asking the engine), or
/// if the engine cannot create the simulation.
pub fn on_player_constructed<'p, P: PlayerHost>(
    physics: &ServerPhysics,
    player: &'p mut P,
) -> PhysicsResult<&'p GuardedCell<PlayerPhysics>> {
    let label = player.label();
    let world = player.world_key().to_owned();
    let state = player
        .physics_slot_mut()
        .attach_with(|| physics.create_player_physics(&label.key, &world))?;
    tracing::debug!(scope = %label, world = %world, "player physics attached");
    Ok(state)
}

/// Detaches and drops a player's physics when the player leaves.
///
/// Returns whether anything was attached.
pub fn on_player_removed<P: PlayerHost>(player: &mut P) -> bool {
    let detached = player.physics_slot_mut().detach().is_some();
    if detached {
        tracing::debug!(scope = %player.label(), "player physics detached");
    }
    detached
}

/// Forwards the host's tick to the server's coordinator.
///
/// `None` if the server has no physics attached.
pub fn on_server_tick<S: ServerHost>(server: &S) -> Option<TickOutcome> {
    server
        .physics_slot()
        .get()
        .map(|physics| physics.on_tick(server))
}

/// Tears down all physics of a stopping server.
///
/// Detaches the server's own state, then drops every world and player state.
/// Returns the number of world spaces destroyed.
pub fn on_server_stopping<S: ServerHost>(server: &mut S) -> usize {
    let Some(physics) = server.physics_slot_mut().detach() else {
        return 0;
    };
    physics.destroy_all(server)
}
