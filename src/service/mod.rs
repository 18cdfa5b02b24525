//! The capability a game loop talks to, whether the simulation runs here
//! ([`LocalSimulation`]) or on a server ([`ConnectionManager`]).

pub mod handle;
pub mod local;
pub mod remote;

use std::sync::Arc;

use crate::bodies::SpawnRequest;
use crate::error::ConnectionError;
use crate::protocol::Frame;

pub use handle::{SimulationHandle, SimulationMode};
pub use local::LocalSimulation;
pub use remote::{ConnectionManager, ConnectionState, RemoteConfig};

pub trait SimulationService {
    fn activate(&mut self);

    fn deactivate(&mut self);

    /// Reset cached state and bring the service back up.
    fn reactivate(&mut self);

    /// A spawn request would be accepted right now.
    fn is_ready(&self) -> bool;

    /// Silently dropped when not ready.
    fn add_body(&mut self, spawn: SpawnRequest);

    /// Latest complete frame. Never partially updated.
    fn read_bodies(&self) -> Arc<Frame>;

    fn player_count(&self) -> u16;

    fn object_count(&self) -> usize;

    fn try_get_connection_error(&self) -> Option<ConnectionError>;

    /// Whether the connection status changed since the last call.
    fn take_status_changed(&mut self) -> bool;

    /// Advance by `dt` seconds of caller time. The only place state changes.
    fn tick(&mut self, dt: f32);
}
