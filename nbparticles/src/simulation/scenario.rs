//! Build a populated particle registry from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and registers its bodies in file
//! order, so a body may name any earlier body as its `primary`.

use tracing::info;

use crate::configuration::config::{BodyConfig, ScenarioConfig};
use crate::error::{Error, Result};
use crate::simulation::orbits::orbit_to_cartesian;
use crate::simulation::particles::Particles;
use crate::simulation::states::{vec3_from_slice, Particle, ParticleId};

pub struct Scenario;

impl Scenario {
    /// Register every body of `cfg` in a new registry.
    /// Stops at the first body that fails validation.
    pub fn build(cfg: ScenarioConfig) -> Result<Particles> {
        let mut particles = Particles::new(cfg.parameters.g)?;

        for (i, bc) in cfg.bodies.into_iter().enumerate() {
            let label = bc.name.clone().unwrap_or_else(|| format!("#{i}"));
            add_body(&mut particles, bc).map_err(|e| match e {
                Error::InvalidArgument(msg) => Error::InvalidArgument(format!("body {label}: {msg}")),
                Error::NotFound(msg) => Error::NotFound(format!("body {label}: {msg}")),
                other => other,
            })?;
        }

        info!(
            bodies = particles.count(),
            g = particles.gravitational_constant(),
            "scenario built"
        );
        Ok(particles)
    }
}

fn add_body(particles: &mut Particles, bc: BodyConfig) -> Result<ParticleId> {
    let (x, v) = match (bc.orbit, bc.x.as_deref(), bc.v.as_deref()) {
        // Orbital path: vectors relative to the primary, as in `Particles::add`
        (Some(orbit), None, None) => {
            let key = bc
                .primary
                .as_ref()
                .ok_or_else(|| Error::invalid("orbital elements need a primary to orbit"))?;
            let primary_mass = particles.lookup(key)?.mass();
            orbit_to_cartesian(bc.m, primary_mass, &orbit, particles.gravitational_constant())?
        }
        (Some(_), _, _) => {
            return Err(Error::invalid(
                "give either the cartesian state (x and v) or the orbital elements, not both",
            ));
        }
        (None, Some(x), Some(v)) => (vec3_from_slice(x, "position")?, vec3_from_slice(v, "velocity")?),
        (None, _, _) => {
            return Err(Error::invalid(
                "either the cartesian state (x and v) or the orbital elements must be supplied",
            ));
        }
    };

    // Both paths keep the configured type
    let mut builder = Particle::builder(bc.ptype)
        .position(x)
        .velocity(v)
        .mass(bc.m)
        .radius(bc.radius);
    if let Some(name) = bc.name {
        builder = builder.name(name);
    }
    let particle = builder.build()?;
    let id = particle.id();
    particles.add_particle(particle);
    Ok(id)
}
