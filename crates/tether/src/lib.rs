//! # TETHER
//!
//! Attaches physics simulation state to a host's servers, worlds and
//! players, and advances every attached state once per host tick.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────── HOST ─────────────────────────────┐
//! │  server ──── worlds ──── players         (host-owned objects)  │
//! └─────┬────────────┬──────────┬──────────────────────────────────┘
//!       │ slot       │ slot     │ slot        lifecycle hooks fill/clear
//!       ▼            ▼          ▼
//!  ServerPhysics  GuardedCell  GuardedCell
//!   ├ engine      <World>      <Player>
//!   ├ settings       ▲            ▲
//!   └ coordinator ───┴── tick ────┘          one step at a time
//! ```
//!
//! ## Entry Points
//!
//! - [`lifecycle`] - called by the host on construction, unload, tick, stop
//! - [`access`] - `physics_of` + `with_lock`, for everything else
//! - [`engine`] - implemented by the physics engine
//!
//! Logging goes through `tracing`; installing a subscriber is the host's job.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod access;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod scope;
pub mod server;
pub mod state;
pub mod tick;

pub use access::{has_physics, physics_of, with_lock, with_physics};
pub use config::{Settings, SpaceSettings, StatsSettings, MAX_TIMING_BUFFER_SECS};
pub use engine::{BodyCounts, PhysicsEngine, Simulation};
pub use error::{ConfigError, EngineError, PhysicsError, PhysicsResult, StepFailure};
pub use scope::{HostScope, PlayerHost, ScopeKind, ScopeLabel, ServerHost, WorldHost};
pub use server::{ServerPhysics, BASE_TIME_STEP};
pub use state::{PlayerPhysics, StepListener, StepStats, Steppable, WorldPhysics};
pub use tick::{BeforeStep, StepReport, StepScope, TickCoordinator, TickOutcome};

pub use tether_core::{AttachmentSlot, CoreError, GuardedCell, TimingStats};
