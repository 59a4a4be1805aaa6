//! Configuration types for loading initial conditions from YAML.
//!
//! A scenario is the gravitational constant plus the list of bodies to
//! register, in order. Each body is given either by cartesian state (`x`,
//! `v`) or by orbital elements around an earlier body (`orbit`, `primary`).
//!
//! # YAML format
//!
//! ```yaml
//! parameters:
//!   G: 1.0                  # gravitational constant
//!
//! bodies:
//!   - name: sun
//!     m: 1.0
//!     x: [0.0, 0.0, 0.0]
//!     v: [0.0, 0.0, 0.0]
//!   - name: earth
//!     type: normal          # normal | massless | low-mass
//!     m: 3.0e-6
//!     radius: 4.26e-5
//!     orbit: { a: 1.0, e: 0.0167, i: 0.0, Omega: 0.0, omega: 1.99, f: 0.0 }
//!     primary: sun          # name or index of an earlier body
//! ```
//!
//! [`crate::Scenario::build`] turns this into a populated `Particles`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::simulation::orbits::OrbitalElements;
use crate::simulation::particles::ParticleKey;
use crate::simulation::states::ParticleType;

/// Global physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    #[serde(rename = "G")]
    pub g: f64, // gravitational constant
}

/// Initial state of one body
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    #[serde(default)]
    pub name: Option<String>, // optional label, usable as a `primary` key
    #[serde(rename = "type", default)]
    pub ptype: ParticleType, // applies to cartesian and orbital bodies
    pub m: f64, // mass
    #[serde(default)]
    pub radius: f64,
    #[serde(default)]
    pub x: Option<Vec<f64>>, // position, must have 3 components
    #[serde(default)]
    pub v: Option<Vec<f64>>, // velocity, must have 3 components
    #[serde(default)]
    pub orbit: Option<OrbitalElements>,
    #[serde(default)]
    pub primary: Option<ParticleKey>,
}

/// Top-level scenario configuration loaded from YAML
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}
