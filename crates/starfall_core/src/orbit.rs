//! Orbital kinematics.
//!
//! [`planet_position`] is a pure function of a planet's orbit and current
//! phase. Advancing the phase is a separate step, [`advance_orbits`], which
//! the simulation driver runs exactly once per frame.

use crate::components::{Orbit, Planet};
use crate::math::Vec2;

/// Position on an orbit at the given phase, in star-centered world coordinates.
#[must_use]
pub fn orbit_position(orbit: &Orbit, angle: f64) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    match *orbit {
        Orbit::Circular { radius } => Vec2::new(cos * radius, sin * radius),
        Orbit::Elliptical {
            semi_major_axis,
            semi_minor_axis,
            rotation_angle,
            ..
        } => Vec2::new(semi_major_axis * cos, semi_minor_axis * sin).rotate(rotation_angle),
    }
}

/// Current world position of a planet.
#[must_use]
pub fn planet_position(planet: &Planet) -> Vec2 {
    orbit_position(&planet.orbit, planet.angle)
}

/// Distance between two planets at their current phases.
#[must_use]
pub fn world_distance(a: &Planet, b: &Planet) -> f64 {
    planet_position(a).distance(planet_position(b))
}

/// Advance every planet's phase by its angular speed.
pub fn advance_orbits(planets: &mut [Planet]) {
    for planet in planets {
        planet.angle += planet.speed;
    }
}
