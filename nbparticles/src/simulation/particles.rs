//! Registry of the bodies taking part in a simulation
//!
//! `Particles` owns its bodies in insertion order together with the
//! gravitational constant `G` used for every orbital conversion. Bodies can
//! be looked up by position or by name; the name index is updated on every
//! add and remove so it always agrees with the member list.
//!
//! Duplicate adds (same `ParticleId`) and removals of absent bodies are
//! silent no-ops. Every other failure returns an error and leaves the
//! registry untouched.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::simulation::orbits::{cartesian_to_orbit, orbit_to_cartesian, OrbitalElements};
use crate::simulation::states::{NVec3, Particle, ParticleId, ParticleType};

/// Key for [`Particles::lookup`]: a position in insertion order or a name
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ParticleKey {
    Index(usize),
    Name(String),
}

impl From<usize> for ParticleKey {
    fn from(i: usize) -> Self {
        ParticleKey::Index(i)
    }
}

impl From<&str> for ParticleKey {
    fn from(name: &str) -> Self {
        ParticleKey::Name(name.to_owned())
    }
}

impl From<String> for ParticleKey {
    fn from(name: String) -> Self {
        ParticleKey::Name(name)
    }
}

impl From<&ParticleKey> for ParticleKey {
    fn from(key: &ParticleKey) -> Self {
        key.clone()
    }
}

impl fmt::Display for ParticleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticleKey::Index(i) => write!(f, "index {i}"),
            ParticleKey::Name(n) => write!(f, "name '{n}'"),
        }
    }
}

/// Arguments for [`Particles::add`].
///
/// Either `position` and `velocity` are both set (cartesian path) or
/// `orbit` and `primary` are set (orbital path). When `orbit` is present it
/// wins and any cartesian fields are ignored.
#[derive(Debug, Clone, Default)]
pub struct NewBody {
    pub position: Option<NVec3>,
    pub velocity: Option<NVec3>,
    pub mass: f64,
    pub radius: f64,
    pub name: Option<String>,
    pub orbit: Option<OrbitalElements>,
    pub primary: Option<ParticleKey>,
}

impl NewBody {
    /// Body given by cartesian state
    pub fn cartesian(position: NVec3, velocity: NVec3, mass: f64) -> Self {
        Self {
            position: Some(position),
            velocity: Some(velocity),
            mass,
            ..Self::default()
        }
    }

    /// Body given by orbital elements around `primary`
    pub fn orbiting(primary: impl Into<ParticleKey>, orbit: OrbitalElements, mass: f64) -> Self {
        Self {
            orbit: Some(orbit),
            primary: Some(primary.into()),
            mass,
            ..Self::default()
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Ordered, deduplicated set of particles sharing one `G`
#[derive(Debug, Clone)]
pub struct Particles {
    g: f64, // gravitational constant
    members: Vec<Particle>, // insertion order
    names: HashMap<String, usize>, // name -> position in `members`
}

impl Particles {
    /// Empty registry with gravitational constant `g`.
    /// Fails with `InvalidArgument` unless `g` is finite and > 0.
    pub fn new(g: f64) -> Result<Self> {
        if !g.is_finite() || g <= 0.0 {
            return Err(Error::invalid(format!(
                "gravitational constant must be finite and > 0, got {g}"
            )));
        }
        Ok(Self {
            g,
            members: Vec::new(),
            names: HashMap::new(),
        })
    }

    pub fn gravitational_constant(&self) -> f64 {
        self.g
    }

    /// All members in insertion order
    pub fn all_particles(&self) -> &[Particle] {
        &self.members
    }

    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.members.iter()
    }

    /// Registered names, in no particular order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.position_of(id).is_some()
    }

    fn position_of(&self, id: ParticleId) -> Option<usize> {
        self.members.iter().position(|p| p.id() == id)
    }

    fn resolve(&self, key: &ParticleKey) -> Result<usize> {
        match key {
            ParticleKey::Index(i) if *i < self.members.len() => Ok(*i),
            ParticleKey::Name(n) => self
                .names
                .get(n)
                .copied()
                .ok_or_else(|| Error::NotFound(key.to_string())),
            ParticleKey::Index(_) => Err(Error::NotFound(format!(
                "{key} (registry holds {})",
                self.members.len()
            ))),
        }
    }

    /// Member at an index or with a name. Misses fail with `NotFound`.
    pub fn lookup(&self, key: impl Into<ParticleKey>) -> Result<&Particle> {
        let i = self.resolve(&key.into())?;
        Ok(&self.members[i])
    }

    /// Mutable access, same rules as [`Particles::lookup`]
    pub fn lookup_mut(&mut self, key: impl Into<ParticleKey>) -> Result<&mut Particle> {
        let i = self.resolve(&key.into())?;
        Ok(&mut self.members[i])
    }

    /// Append `particle` unless a particle with the same id is already
    /// registered. Returns whether it was inserted.
    pub fn add_particle(&mut self, particle: Particle) -> bool {
        if self.contains(particle.id()) {
            debug!(id = %particle.id(), "particle already registered, ignoring");
            return false;
        }

        let index = self.members.len();
        if let Some(name) = particle.name() {
            if self.names.contains_key(name) {
                // first registration keeps the name
                warn!(name, "duplicate particle name, lookups resolve to the earlier body");
            } else {
                self.names.insert(name.to_owned(), index);
            }
        }
        debug!(id = %particle.id(), index, "particle registered");
        self.members.push(particle);
        true
    }

    /// Remove the particle with `id`. Absent ids are ignored.
    pub fn remove_particle(&mut self, id: ParticleId) -> Option<Particle> {
        let Some(index) = self.position_of(id) else {
            debug!(%id, "particle not registered, nothing to remove");
            return None;
        };
        let removed = self.members.remove(index);
        self.rebuild_names();
        debug!(%id, index, "particle removed");
        Some(removed)
    }

    fn rebuild_names(&mut self) {
        self.names.clear();
        for (i, p) in self.members.iter().enumerate() {
            if let Some(name) = p.name() {
                self.names.entry(name.to_owned()).or_insert(i);
            }
        }
    }

    /// Build a normal particle from cartesian state or orbital elements and
    /// register it. Returns the new particle's id.
    ///
    /// On the orbital path the vectors are exactly those returned by
    /// [`orbit_to_cartesian`], i.e. relative to the primary.
    pub fn add(&mut self, body: NewBody) -> Result<ParticleId> {
        let (x, v) = match (&body.orbit, body.position, body.velocity) {
            (Some(elements), _, _) => {
                let key = body.primary.as_ref().ok_or_else(|| {
                    Error::invalid("orbital elements need a primary to orbit")
                })?;
                let primary_mass = self.lookup(key)?.mass();
                orbit_to_cartesian(body.mass, primary_mass, elements, self.g)?
            }
            (None, Some(x), Some(v)) => (x, v),
            _ => {
                return Err(Error::invalid(
                    "either the cartesian state (position and velocity) or the orbital elements must be supplied",
                ));
            }
        };

        let particle = Particle::builder(ParticleType::Normal)
            .position(x)
            .velocity(v)
            .mass(body.mass)
            .radius(body.radius)
            .maybe_name(body.name)
            .build()?;
        let id = particle.id();
        self.add_particle(particle);
        Ok(id)
    }

    /// Sum of member masses
    pub fn total_mass(&self) -> f64 {
        self.members.iter().map(Particle::mass).sum()
    }

    /// Mass-weighted mean position, `None` when the total mass is zero
    pub fn center_of_mass(&self) -> Option<NVec3> {
        let m_tot = self.total_mass();
        if m_tot <= 0.0 {
            return None;
        }
        let weighted = self
            .members
            .iter()
            .fold(NVec3::zeros(), |acc, p| acc + p.mass() * p.position());
        Some(weighted / m_tot)
    }

    /// Orbital elements of `body` around `primary`, from their relative state
    pub fn orbital_elements(
        &self,
        body: impl Into<ParticleKey>,
        primary: impl Into<ParticleKey>,
    ) -> Result<OrbitalElements> {
        let b = self.lookup(body)?;
        let p = self.lookup(primary)?;
        cartesian_to_orbit(
            &(b.position() - p.position()),
            &(b.velocity() - p.velocity()),
            b.mass(),
            p.mass(),
            self.g,
        )
    }
}

impl<'a> IntoIterator for &'a Particles {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
