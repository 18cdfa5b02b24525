pub mod bodies;
pub mod error;
pub mod physics;
pub mod protocol;
pub mod render;
pub mod server;
pub mod service;
pub mod settings;
pub mod transport;

pub use bodies::{mass_for_radius, Body, BodyId, BodyStore, IdPool, SpawnRequest};
pub use error::{CodecError, ConnectionError, ServerError, SettingsError, StoreError};
pub use physics::{PhysicsEngine, StepReport};
pub use protocol::{decode_frame, decode_spawn, encode_frame, encode_spawn, Frame};
pub use render::{FrameDelta, RenderTracker};
pub use server::{ServerConfig, SimulationServer};
pub use service::{
    ConnectionManager, ConnectionState, LocalSimulation, RemoteConfig, SimulationHandle, SimulationMode,
    SimulationService,
};
pub use settings::SimulationSettings;
pub use transport::{TcpTransport, Transport, TransportEvent, TransportState};
