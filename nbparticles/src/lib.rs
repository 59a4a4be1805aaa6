pub mod simulation;
pub mod configuration;
pub mod error;

pub use error::{Error, Result};

pub use simulation::states::{NVec3, Particle, ParticleBuilder, ParticleId, ParticleType, DIM};
pub use simulation::particles::{NewBody, ParticleKey, Particles};
pub use simulation::orbits::{cartesian_to_orbit, orbit_to_cartesian, OrbitalElements};
pub use simulation::scenario::Scenario;

pub use configuration::config::{BodyConfig, ParametersConfig, ScenarioConfig};
