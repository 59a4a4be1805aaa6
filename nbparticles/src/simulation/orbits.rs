//! Keplerian orbital elements and conversions to and from cartesian state
//!
//! Angles are in radians. Elements describe the orbit of a body around a
//! primary, with the gravitational parameter `mu = G * (m + M)`.
//! Elliptic orbits use `a > 0, 0 <= e < 1`, hyperbolic ones `a < 0, e > 1`.
//! Parabolic orbits (`e == 1`) have no finite semi-major axis and are rejected.

use std::f64::consts::PI;

use nalgebra::Matrix3;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::simulation::states::NVec3;

/// Below this, eccentricity / node-vector length is treated as zero
const ANGLE_EPS: f64 = 1e-11;

/// Classical orbital elements relative to a primary
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct OrbitalElements {
    #[serde(rename = "a")]
    pub semi_major_axis: f64,
    #[serde(rename = "e", default)]
    pub eccentricity: f64,
    #[serde(rename = "i", default)]
    pub inclination: f64,
    #[serde(rename = "Omega", default)]
    pub ascending_node: f64, // longitude of the ascending node
    #[serde(rename = "omega", default)]
    pub arg_periapsis: f64, // argument of periapsis
    #[serde(rename = "f", default)]
    pub true_anomaly: f64,
}

impl OrbitalElements {
    /// Circular, equatorial orbit of radius `a` at true anomaly 0
    pub fn circular(a: f64) -> Self {
        Self {
            semi_major_axis: a,
            ..Self::default()
        }
    }

    pub fn with_eccentricity(mut self, e: f64) -> Self {
        self.eccentricity = e;
        self
    }

    pub fn with_inclination(mut self, i: f64) -> Self {
        self.inclination = i;
        self
    }

    pub fn with_ascending_node(mut self, node: f64) -> Self {
        self.ascending_node = node;
        self
    }

    pub fn with_arg_periapsis(mut self, arg: f64) -> Self {
        self.arg_periapsis = arg;
        self
    }

    pub fn with_true_anomaly(mut self, f: f64) -> Self {
        self.true_anomaly = f;
        self
    }

    /// Semi-latus rectum p = a (1 - e^2)
    pub fn semi_latus_rectum(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentricity)
    }

    /// Rotation matrix from the perifocal frame to the reference frame
    /// R_z(Omega) * R_x(i) * R_z(omega)
    pub fn perifocal_rotation(&self) -> Matrix3<f64> {
        let (sin_o, cos_o) = self.ascending_node.sin_cos();
        let (sin_i, cos_i) = self.inclination.sin_cos();
        let (sin_w, cos_w) = self.arg_periapsis.sin_cos();

        Matrix3::new(
            cos_o * cos_w - sin_o * sin_w * cos_i,
            -cos_o * sin_w - sin_o * cos_w * cos_i,
            sin_o * sin_i,

            sin_o * cos_w + cos_o * sin_w * cos_i,
            -sin_o * sin_w + cos_o * cos_w * cos_i,
            -cos_o * sin_i,

            sin_w * sin_i,
            cos_w * sin_i,
            cos_i,
        )
    }

    fn validate(&self) -> Result<()> {
        let all = [
            self.semi_major_axis,
            self.eccentricity,
            self.inclination,
            self.ascending_node,
            self.arg_periapsis,
            self.true_anomaly,
        ];
        if !all.iter().all(|v| v.is_finite()) {
            return Err(Error::invalid("orbital elements must be finite"));
        }
        if self.eccentricity < 0.0 {
            return Err(Error::invalid("eccentricity must be >= 0"));
        }
        if self.eccentricity == 1.0 {
            return Err(Error::invalid("parabolic orbits (e = 1) are not supported"));
        }
        if self.semi_latus_rectum() <= 0.0 {
            return Err(Error::invalid(format!(
                "semi-major axis {} is inconsistent with eccentricity {} (need a > 0 for e < 1, a < 0 for e > 1)",
                self.semi_major_axis, self.eccentricity
            )));
        }
        Ok(())
    }
}

fn gravitational_parameter(mass: f64, primary_mass: f64, g: f64) -> Result<f64> {
    let mu = g * (mass + primary_mass);
    if !mu.is_finite() || mu <= 0.0 {
        return Err(Error::invalid(format!(
            "G * (m + M) must be finite and > 0, got {mu}"
        )));
    }
    Ok(mu)
}

/// Convert orbital elements of a body of mass `mass` around a primary of
/// mass `primary_mass` into position and velocity relative to the primary
pub fn orbit_to_cartesian(
    mass: f64,
    primary_mass: f64,
    elements: &OrbitalElements,
    g: f64,
) -> Result<(NVec3, NVec3)> {
    elements.validate()?;
    let mu = gravitational_parameter(mass, primary_mass, g)?;

    let e = elements.eccentricity;
    let (sin_f, cos_f) = elements.true_anomaly.sin_cos();
    let p = elements.semi_latus_rectum();

    // 1 + e cos f <= 0 only on hyperbolae, past the asymptote
    let denom = 1.0 + e * cos_f;
    if denom <= 0.0 {
        return Err(Error::invalid(format!(
            "true anomaly {} lies beyond the asymptote of a hyperbola with e = {e}",
            elements.true_anomaly
        )));
    }
    let r = p / denom;

    // Perifocal frame: x toward periapsis, z along angular momentum
    let pos_pf = NVec3::new(r * cos_f, r * sin_f, 0.0);
    let vel_pf = (mu / p).sqrt() * NVec3::new(-sin_f, e + cos_f, 0.0);

    let rot = elements.perifocal_rotation();
    Ok((rot * pos_pf, rot * vel_pf))
}

/// Recover orbital elements from the relative position and velocity of a
/// body around its primary. Angles are returned in [0, 2pi).
///
/// Undefined angles get conventional values: for equatorial orbits the
/// node is 0, for circular orbits the argument of periapsis is 0 and the
/// anomaly is measured from the node (or the x axis when also equatorial).
pub fn cartesian_to_orbit(
    position: &NVec3,
    velocity: &NVec3,
    mass: f64,
    primary_mass: f64,
    g: f64,
) -> Result<OrbitalElements> {
    let mu = gravitational_parameter(mass, primary_mass, g)?;

    let r = position.norm();
    if !(r.is_finite() && r > 0.0) || !velocity.iter().all(|c| c.is_finite()) {
        return Err(Error::invalid("relative state must be finite with non-zero separation"));
    }

    let h = position.cross(velocity);
    let h_norm = h.norm();
    if h_norm <= 0.0 {
        return Err(Error::invalid("radial trajectory has no orbital plane"));
    }

    let energy = 0.5 * velocity.norm_squared() - mu / r;
    if energy == 0.0 {
        return Err(Error::invalid("parabolic trajectory has no finite semi-major axis"));
    }
    let a = -mu / (2.0 * energy);

    let e_vec = velocity.cross(&h) / mu - position / r;
    let e = e_vec.norm();

    let h_hat = h / h_norm;
    let i = h_hat.z.clamp(-1.0, 1.0).acos();

    // Node vector k x h
    let n = NVec3::new(-h.y, h.x, 0.0);
    let n_norm = n.norm();
    let equatorial = n_norm <= ANGLE_EPS * h_norm;
    let circular = e <= ANGLE_EPS;

    let node = if equatorial { 0.0 } else { n.y.atan2(n.x) };

    // Signed angle from `from` to `to`, measured about h
    let angle_about_h = |from: &NVec3, to: &NVec3| h_hat.dot(&from.cross(to)).atan2(from.dot(to));
    // In-plane longitude for equatorial orbits, reversed when retrograde
    let longitude = |v: &NVec3| {
        let l = v.y.atan2(v.x);
        if h.z < 0.0 { -l } else { l }
    };

    let arg = match (circular, equatorial) {
        (true, _) => 0.0,
        (false, false) => angle_about_h(&n, &e_vec),
        (false, true) => longitude(&e_vec),
    };

    let f = match (circular, equatorial) {
        (false, _) => angle_about_h(&e_vec, position),
        (true, false) => angle_about_h(&n, position),
        (true, true) => longitude(position),
    };

    Ok(OrbitalElements {
        semi_major_axis: a,
        eccentricity: e,
        inclination: i,
        ascending_node: normalize_angle(node),
        arg_periapsis: normalize_angle(arg),
        true_anomaly: normalize_angle(f),
    })
}

/// Normalize angle to [0, 2pi)
fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(2.0 * PI);
    if a >= 2.0 * PI { 0.0 } else { a }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn circular_orbit_at_periapsis() {
        // G = M = 1, a = 1: r = (1,0,0), v = (0,1,0)
        let (x, v) = orbit_to_cartesian(0.0, 1.0, &OrbitalElements::circular(1.0), 1.0).unwrap();
        assert!((x - NVec3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((v - NVec3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn vis_viva_holds() {
        let el = OrbitalElements::circular(2.0)
            .with_eccentricity(0.4)
            .with_inclination(0.3)
            .with_true_anomaly(1.2);
        let g = 0.5;
        let (m, big_m) = (0.1, 3.0);
        let (x, v) = orbit_to_cartesian(m, big_m, &el, g).unwrap();
        let mu = g * (m + big_m);
        let expected = mu * (2.0 / x.norm() - 1.0 / el.semi_major_axis);
        assert!(close(v.norm_squared(), expected, 1e-12));
    }

    #[test]
    fn inclined_ellipse_round_trip() {
        let el = OrbitalElements {
            semi_major_axis: 1.7,
            eccentricity: 0.3,
            inclination: 0.7,
            ascending_node: 1.1,
            arg_periapsis: 2.0,
            true_anomaly: 0.5,
        };
        let (x, v) = orbit_to_cartesian(1e-3, 1.0, &el, 1.0).unwrap();
        let back = cartesian_to_orbit(&x, &v, 1e-3, 1.0, 1.0).unwrap();

        assert!(close(back.semi_major_axis, el.semi_major_axis, 1e-9));
        assert!(close(back.eccentricity, el.eccentricity, 1e-9));
        assert!(close(back.inclination, el.inclination, 1e-9));
        assert!(close(back.ascending_node, el.ascending_node, 1e-9));
        assert!(close(back.arg_periapsis, el.arg_periapsis, 1e-9));
        assert!(close(back.true_anomaly, el.true_anomaly, 1e-9));
    }

    #[test]
    fn hyperbola_needs_negative_axis() {
        let bad = OrbitalElements::circular(1.0).with_eccentricity(1.5);
        assert!(matches!(
            orbit_to_cartesian(0.0, 1.0, &bad, 1.0),
            Err(Error::InvalidArgument(_))
        ));

        let ok = OrbitalElements::circular(-1.0).with_eccentricity(1.5);
        let (x, _) = orbit_to_cartesian(0.0, 1.0, &ok, 1.0).unwrap();
        // periapsis distance |a| (e - 1)
        assert!(close(x.norm(), 0.5, 1e-12));
    }

    #[test]
    fn beyond_asymptote_rejected() {
        // e = 2: asymptote at cos f = -1/2
        let el = OrbitalElements::circular(-1.0)
            .with_eccentricity(2.0)
            .with_true_anomaly(PI);
        assert!(orbit_to_cartesian(0.0, 1.0, &el, 1.0).is_err());
    }

    #[test]
    fn negative_eccentricity_and_parabola_rejected() {
        let neg = OrbitalElements::circular(1.0).with_eccentricity(-0.1);
        assert!(orbit_to_cartesian(0.0, 1.0, &neg, 1.0).is_err());
        let para = OrbitalElements::circular(1.0).with_eccentricity(1.0);
        assert!(orbit_to_cartesian(0.0, 1.0, &para, 1.0).is_err());
    }

    #[test]
    fn zero_mu_rejected() {
        let el = OrbitalElements::circular(1.0);
        assert!(orbit_to_cartesian(0.0, 0.0, &el, 1.0).is_err());
    }

    #[test]
    fn circular_equatorial_angles_collapse_to_anomaly() {
        let el = OrbitalElements::circular(1.0).with_true_anomaly(0.9);
        let (x, v) = orbit_to_cartesian(0.0, 1.0, &el, 1.0).unwrap();
        let back = cartesian_to_orbit(&x, &v, 0.0, 1.0, 1.0).unwrap();
        assert!(back.eccentricity < 1e-12);
        assert_eq!(back.ascending_node, 0.0);
        assert_eq!(back.arg_periapsis, 0.0);
        assert!(close(back.true_anomaly, 0.9, 1e-12));
    }

    #[test]
    fn retrograde_equatorial_keeps_periapsis_direction() {
        let el = OrbitalElements::circular(1.5)
            .with_eccentricity(0.3)
            .with_inclination(PI)
            .with_arg_periapsis(0.8)
            .with_true_anomaly(1.1);
        let (x, v) = orbit_to_cartesian(0.0, 1.0, &el, 1.0).unwrap();
        let back = cartesian_to_orbit(&x, &v, 0.0, 1.0, 1.0).unwrap();

        assert!(close(back.inclination, PI, 1e-9));
        assert_eq!(back.ascending_node, 0.0);
        assert!(close(back.arg_periapsis, 0.8, 1e-9));
        assert!(close(back.true_anomaly, 1.1, 1e-9));
        assert!(close(back.eccentricity, 0.3, 1e-12));
    }

    #[test]
    fn circular_inclined_anomaly_measured_from_node() {
        let el = OrbitalElements::circular(1.0)
            .with_inclination(0.4)
            .with_ascending_node(0.9)
            .with_true_anomaly(2.5);
        let (x, v) = orbit_to_cartesian(0.0, 1.0, &el, 1.0).unwrap();
        let back = cartesian_to_orbit(&x, &v, 0.0, 1.0, 1.0).unwrap();

        assert!(back.eccentricity < 1e-12);
        assert!(close(back.inclination, 0.4, 1e-12));
        assert!(close(back.ascending_node, 0.9, 1e-12));
        assert_eq!(back.arg_periapsis, 0.0);
        assert!(close(back.true_anomaly, 2.5, 1e-12));
    }

    #[test]
    fn hyperbola_round_trip_before_periapsis() {
        let el = OrbitalElements::circular(-2.0)
            .with_eccentricity(1.4)
            .with_inclination(0.3)
            .with_ascending_node(0.5)
            .with_arg_periapsis(1.0)
            .with_true_anomaly(-0.6);
        let (x, v) = orbit_to_cartesian(0.0, 1.0, &el, 1.0).unwrap();
        let back = cartesian_to_orbit(&x, &v, 0.0, 1.0, 1.0).unwrap();

        assert!(close(back.semi_major_axis, -2.0, 1e-9));
        assert!(close(back.eccentricity, 1.4, 1e-9));
        assert!(close(back.arg_periapsis, 1.0, 1e-9));
        // incoming branch comes back in [0, 2pi)
        assert!(close(back.true_anomaly, 2.0 * PI - 0.6, 1e-9));
    }
}
