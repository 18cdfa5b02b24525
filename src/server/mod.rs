//! Authoritative simulation for remote clients.
//!
//! [`SimulationServer`] is the transport-free core: it turns spawn commands
//! into bodies, steps, and encodes frames. [`hub`] runs it over TCP.

pub mod hub;

use log::{debug, warn};

use crate::bodies::{BodyId, BodyStore, SpawnRequest};
use crate::error::{CodecError, SettingsError};
use crate::physics::{PhysicsEngine, StepReport};
use crate::protocol::{decode_spawn, encode_frame, Frame};
use crate::settings::SimulationSettings;

pub use hub::{serve, ServerConfig};

pub struct SimulationServer {
    store: BodyStore,
    engine: PhysicsEngine,
    tick: u64,
}

impl SimulationServer {
    pub fn new(settings: SimulationSettings, max_bodies: usize) -> Result<Self, SettingsError> {
        Ok(Self {
            store: BodyStore::new(max_bodies),
            engine: PhysicsEngine::new(settings)?,
            tick: 0,
        })
    }

    /// Decodes and applies one spawn command. `Ok(None)` when the command
    /// was valid but the simulation is full.
    pub fn ingest(&mut self, bytes: &[u8]) -> Result<Option<BodyId>, CodecError> {
        let spawn = decode_spawn(bytes)?;
        Ok(self.spawn(spawn))
    }

    pub fn spawn(&mut self, spawn: SpawnRequest) -> Option<BodyId> {
        // One slot is always kept free
        if self.store.len() + 1 >= self.store.capacity() {
            warn!("ignoring spawn, simulation at capacity ({})", self.store.len());
            return None;
        }
        // The store clamps the radius and derives mass from it
        match self.store.spawn(&spawn, self.engine.settings().mass_exponent) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("ignoring spawn: {}", e);
                None
            }
        }
    }

    pub fn step(&mut self, dt: f32) -> StepReport {
        self.tick += 1;
        let report = self.engine.step(&mut self.store, dt);
        if !report.is_empty() {
            debug!("tick {}: {:?}", self.tick, report);
        }
        report
    }

    pub fn frame(&self, player_count: u16) -> Frame {
        Frame::new(player_count, self.store.snapshot())
    }

    pub fn encoded_frame(&self, player_count: u16) -> Vec<u8> {
        encode_frame(&self.frame(player_count))
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn store(&self) -> &BodyStore {
        &self.store
    }
}
