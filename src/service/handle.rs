use std::sync::Arc;

use log::info;

use crate::bodies::SpawnRequest;
use crate::error::ConnectionError;
use crate::protocol::Frame;
use crate::service::{ConnectionManager, LocalSimulation, SimulationService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationMode {
    Local,
    Remote,
}

/// The one simulation a game loop holds. Only the wrapped service is ever
/// active; switching deactivates it before the next one is activated.
pub enum SimulationHandle {
    Local(LocalSimulation),
    Remote(ConnectionManager),
}

impl SimulationHandle {
    pub fn mode(&self) -> SimulationMode {
        match self {
            Self::Local(_) => SimulationMode::Local,
            Self::Remote(_) => SimulationMode::Remote,
        }
    }

    /// Deactivates the current service, activates `next`, and returns the
    /// service that was replaced.
    pub fn switch_to(&mut self, next: SimulationHandle) -> SimulationHandle {
        info!("switching simulation {:?} -> {:?}", self.mode(), next.mode());
        self.deactivate();
        let previous = std::mem::replace(self, next);
        self.activate();
        previous
    }

    fn service(&self) -> &dyn SimulationService {
        match self {
            Self::Local(local) => local,
            Self::Remote(remote) => remote,
        }
    }

    fn service_mut(&mut self) -> &mut dyn SimulationService {
        match self {
            Self::Local(local) => local,
            Self::Remote(remote) => remote,
        }
    }
}

impl SimulationService for SimulationHandle {
    fn activate(&mut self) {
        self.service_mut().activate()
    }

    fn deactivate(&mut self) {
        self.service_mut().deactivate()
    }

    fn reactivate(&mut self) {
        self.service_mut().reactivate()
    }

    fn is_ready(&self) -> bool {
        self.service().is_ready()
    }

    fn add_body(&mut self, spawn: SpawnRequest) {
        self.service_mut().add_body(spawn)
    }

    fn read_bodies(&self) -> Arc<Frame> {
        self.service().read_bodies()
    }

    fn player_count(&self) -> u16 {
        self.service().player_count()
    }

    fn object_count(&self) -> usize {
        self.service().object_count()
    }

    fn try_get_connection_error(&self) -> Option<ConnectionError> {
        self.service().try_get_connection_error()
    }

    fn take_status_changed(&mut self) -> bool {
        self.service_mut().take_status_changed()
    }

    fn tick(&mut self, dt: f32) {
        self.service_mut().tick(dt)
    }
}
