use std::sync::Arc;

use log::{info, warn};

use crate::bodies::{BodyId, BodyStore, SpawnRequest};
use crate::error::{ConnectionError, SettingsError, StoreError};
use crate::physics::{PhysicsEngine, StepReport};
use crate::protocol::Frame;
use crate::service::SimulationService;
use crate::settings::SimulationSettings;

/// Runs the simulation in lock-step with the caller's tick. No connection
/// states: ready means the id pool has room.
pub struct LocalSimulation {
    store: BodyStore,
    engine: PhysicsEngine,
    active: bool,
    status_changed: bool,
}

impl LocalSimulation {
    pub fn new(settings: SimulationSettings, pool_size: usize) -> Result<Self, SettingsError> {
        Ok(Self::with_store(PhysicsEngine::new(settings)?, BodyStore::new(pool_size)))
    }

    pub fn with_store(engine: PhysicsEngine, store: BodyStore) -> Self {
        Self {
            store,
            engine,
            active: false,
            status_changed: false,
        }
    }

    pub fn try_add_body(&mut self, spawn: &SpawnRequest) -> Result<BodyId, StoreError> {
        self.store.spawn(spawn, self.engine.settings().mass_exponent)
    }

    /// One physics step, returning what it removed.
    pub fn step(&mut self, dt: f32) -> StepReport {
        self.engine.step(&mut self.store, dt)
    }

    pub fn store(&self) -> &BodyStore {
        &self.store
    }

    pub fn settings(&self) -> &SimulationSettings {
        self.engine.settings()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn reset(&mut self) {
        self.store.reset();
        self.status_changed = true;
    }
}

impl SimulationService for LocalSimulation {
    fn activate(&mut self) {
        info!("local simulation activated ({} ids)", self.store.capacity());
        self.reset();
        self.active = true;
    }

    fn deactivate(&mut self) {
        info!("local simulation deactivated");
        self.reset();
        self.active = false;
    }

    fn reactivate(&mut self) {
        self.activate();
    }

    fn is_ready(&self) -> bool {
        self.active && self.store.is_ready()
    }

    fn add_body(&mut self, spawn: SpawnRequest) {
        if !self.active {
            return;
        }
        if let Err(e) = self.try_add_body(&spawn) {
            warn!("spawn dropped: {}", e);
        }
    }

    fn read_bodies(&self) -> Arc<Frame> {
        Arc::new(Frame::new(1, self.store.snapshot()))
    }

    fn player_count(&self) -> u16 {
        1
    }

    fn object_count(&self) -> usize {
        self.store.len()
    }

    fn try_get_connection_error(&self) -> Option<ConnectionError> {
        None
    }

    fn take_status_changed(&mut self) -> bool {
        std::mem::take(&mut self.status_changed)
    }

    fn tick(&mut self, dt: f32) {
        if self.active {
            self.step(dt);
        }
    }
}
