pub mod states;
pub mod particles;
pub mod orbits;
pub mod scenario;
