//! Fake engine and host objects shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tether::{
    lifecycle, AttachmentSlot, BodyCounts, EngineError, GuardedCell, HostScope, PhysicsEngine,
    PlayerHost, PlayerPhysics, ScopeKind, ServerHost, ServerPhysics, Settings, Simulation,
    SpaceSettings, WorldHost, WorldPhysics,
};

/// How long a test waits on a channel before declaring the other side stuck.
pub const PATIENCE: Duration = Duration::from_secs(5);

/// Pauses one advance until released.
pub struct Gate {
    entered: Sender<()>,
    release: Receiver<()>,
}

/// Test-side ends of a [`Gate`].
pub struct GateHandle {
    pub entered: Receiver<()>,
    pub release: Sender<()>,
}

/// Creates a gate and the handle that drives it.
pub fn gate() -> (Gate, GateHandle) {
    let (entered_tx, entered_rx) = crossbeam_channel::bounded(1);
    let (release_tx, release_rx) = crossbeam_channel::bounded(1);
    (
        Gate {
            entered: entered_tx,
            release: release_rx,
        },
        GateHandle {
            entered: entered_rx,
            release: release_tx,
        },
    )
}

/// Instrumentation shared between a fake simulation and the test.
#[derive(Default)]
pub struct Tracker {
    advances: AtomicU64,
    overlaps: AtomicU64,
    active: AtomicBool,
    last_dt_bits: AtomicU64,
    fail: AtomicBool,
    panic: AtomicBool,
    dropped: AtomicBool,
    gate: Mutex<Option<Gate>>,
}

impl Tracker {
    /// Completed advances.
    pub fn advances(&self) -> u64 {
        self.advances.load(Ordering::SeqCst)
    }

    /// Times an advance started while another was still running.
    pub fn overlaps(&self) -> u64 {
        self.overlaps.load(Ordering::SeqCst)
    }

    /// Whether an advance is running right now.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// `dt` of the most recent advance.
    pub fn last_dt(&self) -> f64 {
        f64::from_bits(self.last_dt_bits.load(Ordering::SeqCst))
    }

    /// Whether the simulation has been dropped.
    pub fn is_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }

    /// Makes every advance fail until cleared.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Makes the next advance panic.
    pub fn panic_once(&self) {
        self.panic.store(true, Ordering::SeqCst);
    }

    /// Blocks the next advance on `gate`.
    pub fn hold_next(&self, gate: Gate) {
        *self.gate.lock().unwrap() = Some(gate);
    }
}

/// Simulation that counts and checks its advances.
pub struct FakeSimulation {
    tracker: Arc<Tracker>,
}

impl FakeSimulation {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

impl Drop for FakeSimulation {
    fn drop(&mut self) {
        self.tracker.dropped.store(true, Ordering::SeqCst);
    }
}

/// Clears the active flag even if the advance panics.
struct Leave<'a>(&'a AtomicBool);

impl Drop for Leave<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Simulation for FakeSimulation {
    fn advance(&mut self, dt: f64) -> Result<(), EngineError> {
        if self.tracker.active.swap(true, Ordering::SeqCst) {
            self.tracker.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        let _leave = Leave(&self.tracker.active);

        let gate = self.tracker.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.send(()).unwrap();
            gate.release.recv_timeout(PATIENCE).unwrap();
        }
        if self.tracker.panic.swap(false, Ordering::SeqCst) {
            panic!("fake engine panicked");
        }
        if self.tracker.fail.load(Ordering::SeqCst) {
            return Err(EngineError::new("fake engine failure"));
        }

        self.tracker.last_dt_bits.store(dt.to_bits(), Ordering::SeqCst);
        self.tracker.advances.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn counts(&self) -> BodyCounts {
        let bodies = usize::try_from(self.tracker.advances()).unwrap();
        BodyCounts {
            colliders: bodies,
            rigid_bodies: bodies,
            active_rigid_bodies: bodies,
        }
    }
}

/// Engine handing out [`FakeSimulation`]s, one fresh tracker per simulation.
#[derive(Default)]
pub struct FakeEngine {
    created: Mutex<Vec<(ScopeKind, Arc<Tracker>)>>,
    refuse: AtomicBool,
}

impl FakeEngine {
    /// Trackers of every created simulation, in creation order.
    pub fn trackers(&self) -> Vec<Arc<Tracker>> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|(_, tracker)| Arc::clone(tracker))
            .collect()
    }

    /// Number of simulations created so far.
    pub fn created(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    /// Makes the engine refuse to create simulations.
    pub fn set_refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }
}

impl PhysicsEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn create_simulation(
        &self,
        kind: ScopeKind,
        _settings: &SpaceSettings,
    ) -> Result<Box<dyn Simulation>, EngineError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(EngineError::new("fake engine refused"));
        }
        let tracker = Arc::new(Tracker::default());
        self.created.lock().unwrap().push((kind, Arc::clone(&tracker)));
        Ok(Box::new(FakeSimulation::new(tracker)))
    }
}

pub struct TestWorld {
    pub key: String,
    slot: AttachmentSlot<GuardedCell<WorldPhysics>>,
}

impl TestWorld {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_owned(),
            slot: AttachmentSlot::empty(),
        }
    }
}

impl HostScope for TestWorld {
    const KIND: ScopeKind = ScopeKind::World;
    type State = GuardedCell<WorldPhysics>;

    fn key(&self) -> &str {
        &self.key
    }

    fn physics_slot(&self) -> &AttachmentSlot<Self::State> {
        &self.slot
    }

    fn physics_slot_mut(&mut self) -> &mut AttachmentSlot<Self::State> {
        &mut self.slot
    }
}

impl WorldHost for TestWorld {}

pub struct TestPlayer {
    pub key: String,
    pub world: String,
    slot: AttachmentSlot<GuardedCell<PlayerPhysics>>,
}

impl TestPlayer {
    pub fn new(key: &str, world: &str) -> Self {
        Self {
            key: key.to_owned(),
            world: world.to_owned(),
            slot: AttachmentSlot::empty(),
        }
    }
}

impl HostScope for TestPlayer {
    const KIND: ScopeKind = ScopeKind::Player;
    type State = GuardedCell<PlayerPhysics>;

    fn key(&self) -> &str {
        &self.key
    }

    fn physics_slot(&self) -> &AttachmentSlot<Self::State> {
        &self.slot
    }

    fn physics_slot_mut(&mut self) -> &mut AttachmentSlot<Self::State> {
        &mut self.slot
    }
}

impl PlayerHost for TestPlayer {
    fn world_key(&self) -> &str {
        &self.world
    }
}

#[derive(Default)]
pub struct TestServer {
    pub worlds: Vec<TestWorld>,
    pub players: Vec<TestPlayer>,
    pub slot: AttachmentSlot<ServerPhysics>,
}

impl HostScope for TestServer {
    const KIND: ScopeKind = ScopeKind::Server;
    type State = ServerPhysics;

    fn key(&self) -> &str {
        "server"
    }

    fn physics_slot(&self) -> &AttachmentSlot<Self::State> {
        &self.slot
    }

    fn physics_slot_mut(&mut self) -> &mut AttachmentSlot<Self::State> {
        &mut self.slot
    }
}

impl ServerHost for TestServer {
    type World = TestWorld;
    type Player = TestPlayer;

    fn worlds(&self) -> impl Iterator<Item = &Self::World> {
        self.worlds.iter()
    }

    fn worlds_mut(&mut self) -> impl Iterator<Item = &mut Self::World> {
        self.worlds.iter_mut()
    }

    fn players(&self) -> impl Iterator<Item = &Self::Player> {
        self.players.iter()
    }

    fn players_mut(&mut self) -> impl Iterator<Item = &mut Self::Player> {
        self.players.iter_mut()
    }
}

/// A server with physics attached to it and to every given world and player.
pub struct Booted {
    pub server: TestServer,
    pub engine: Arc<FakeEngine>,
}

impl Booted {
    /// The server's attached physics.
    pub fn physics(&self) -> &ServerPhysics {
        self.server.slot.get().unwrap()
    }

    /// Tracker of the `index`-th created simulation (worlds first, then players).
    pub fn tracker(&self, index: usize) -> Arc<Tracker> {
        Arc::clone(&self.engine.trackers()[index])
    }
}

/// Runs the construction hooks for a server with `worlds` and `players`.
pub fn boot(worlds: &[&str], players: &[(&str, &str)], settings: Settings) -> Booted {
    let engine = Arc::new(FakeEngine::default());
    let mut server = TestServer::default();

    lifecycle::on_server_constructed(
        &mut server,
        Arc::clone(&engine) as Arc<dyn PhysicsEngine>,
        settings,
    )
    .unwrap();

    // Slot and host lists are separate fields, so hooks can borrow both.
    let physics = server.slot.get().unwrap();
    for key in worlds {
        let mut world = TestWorld::new(key);
        lifecycle::on_world_constructed(physics, &mut world).unwrap();
        server.worlds.push(world);
    }
    for (key, world) in players {
        let mut player = TestPlayer::new(key, world);
        lifecycle::on_player_constructed(physics, &mut player).unwrap();
        server.players.push(player);
    }

    Booted { server, engine }
}
