pub mod engine;
pub mod forces;

pub use engine::{PhysicsEngine, StepReport};
pub use forces::{attraction, clamp_magnitude, mass_factor, MIN_DISTANCE};
