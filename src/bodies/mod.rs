pub mod body;
pub mod id_pool;
pub mod store;

pub use body::{mass_for_radius, Body, BodyId, SpawnRequest, MAX_SPAWN_RADIUS, MIN_SPAWN_RADIUS, WHITE};
pub use id_pool::IdPool;
pub use store::{BodyStore, DEFAULT_POOL_SIZE};
