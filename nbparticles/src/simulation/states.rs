//! Core state types for a single body.
//!
//! Defines:
//! - `NVec3`        3d vector alias over nalgebra
//! - `ParticleType` normal / massless / low-mass tag read by force code
//! - `ParticleId`   opaque identity handed out at construction
//! - `Particle`     one body's state, with validated position/velocity setters
//!
//! Identity is not derived from the particle's contents: positions and
//! velocities change during a run, the id never does.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use nalgebra::Vector3;
use serde::Deserialize;

use crate::error::{Error, Result};

pub type NVec3 = Vector3<f64>;

/// Spatial dimension of every position/velocity vector
pub const DIM: usize = 3;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// How the external force code should treat a body
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ParticleType {
    #[default]
    Normal, // full gravitating body
    Massless, // test particle, feels gravity but sources none
    LowMass, // sources gravity only on normal bodies
}

impl fmt::Display for ParticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParticleType::Normal => "normal",
            ParticleType::Massless => "massless",
            ParticleType::LowMass => "low-mass",
        };
        f.write_str(s)
    }
}

/// Stable identity of a particle, shared by its clones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(u64);

impl ParticleId {
    fn next() -> Self {
        ParticleId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Check that `values` is a finite 3-vector and convert it
pub fn vec3_from_slice(values: &[f64], what: &str) -> Result<NVec3> {
    if values.len() != DIM {
        return Err(Error::invalid(format!(
            "{what} must be a len={DIM} vector, got len={}",
            values.len()
        )));
    }
    if !values.iter().all(|c| c.is_finite()) {
        return Err(Error::invalid(format!("{what} components must be finite")));
    }
    Ok(NVec3::new(values[0], values[1], values[2]))
}

fn check_scalar(value: f64, what: &str) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::invalid(format!("{what} must be finite and >= 0, got {value}")));
    }
    Ok(value)
}

/// One simulated body.
///
/// Position and velocity are private so every replacement goes through
/// [`Particle::set_position`] / [`Particle::set_velocity`].
#[derive(Debug, Clone)]
pub struct Particle {
    id: ParticleId,
    ptype: ParticleType,
    x: NVec3, // position
    v: NVec3, // velocity
    m: f64, // mass
    radius: f64, // radius
    name: Option<String>, // label, display only
}

impl Particle {
    /// Start building a particle of the given type
    pub fn builder(ptype: ParticleType) -> ParticleBuilder {
        ParticleBuilder {
            ptype,
            x: None,
            v: None,
            m: 0.0,
            radius: 0.0,
            name: None,
        }
    }

    pub fn id(&self) -> ParticleId {
        self.id
    }

    pub fn particle_type(&self) -> ParticleType {
        self.ptype
    }

    /// Current position (a copy)
    pub fn position(&self) -> NVec3 {
        self.x
    }

    /// Current velocity (a copy)
    pub fn velocity(&self) -> NVec3 {
        self.v
    }

    pub fn mass(&self) -> f64 {
        self.m
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Replace the position. Fails with `InvalidArgument` unless `pos` has
    /// exactly three finite components; the old value is kept on failure.
    pub fn set_position(&mut self, pos: &[f64]) -> Result<()> {
        self.x = vec3_from_slice(pos, "position")?;
        Ok(())
    }

    /// Replace the velocity, same rules as [`Particle::set_position`]
    pub fn set_velocity(&mut self, vel: &[f64]) -> Result<()> {
        self.v = vec3_from_slice(vel, "velocity")?;
        Ok(())
    }
}

/// Builder returned by [`Particle::builder`]. Validation happens in `build`.
#[derive(Debug, Clone)]
pub struct ParticleBuilder {
    ptype: ParticleType,
    x: Option<NVec3>,
    v: Option<NVec3>,
    m: f64,
    radius: f64,
    name: Option<String>,
}

impl ParticleBuilder {
    pub fn position(mut self, x: NVec3) -> Self {
        self.x = Some(x);
        self
    }

    pub fn velocity(mut self, v: NVec3) -> Self {
        self.v = Some(v);
        self
    }

    pub fn mass(mut self, m: f64) -> Self {
        self.m = m;
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn maybe_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Validate and produce the particle with a fresh id.
    /// Omitted position/velocity default to a new zero vector.
    pub fn build(self) -> Result<Particle> {
        let x = self.x.unwrap_or_else(NVec3::zeros);
        let v = self.v.unwrap_or_else(NVec3::zeros);
        vec3_from_slice(x.as_slice(), "position")?;
        vec3_from_slice(v.as_slice(), "velocity")?;
        let m = check_scalar(self.m, "mass")?;
        let radius = check_scalar(self.radius, "radius")?;

        Ok(Particle {
            id: ParticleId::next(),
            ptype: self.ptype,
            x,
            v,
            m,
            radius,
            name: self.name,
        })
    }
}
