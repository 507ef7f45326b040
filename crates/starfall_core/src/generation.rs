//! Procedural star system generation.
//!
//! Generates a star and an ordered list of planets with:
//! - Non-overlapping orbits, placed outward from the star
//! - A mix of circular and elliptical orbits
//! - Randomized phase, direction and angular speed
//! - AI or neutral garrisons (the player's home is assigned afterwards)
//!
//! Generation never fails. When the next planet cannot fit inside the
//! outermost allowed orbit, generation stops early and returns the planets
//! placed so far.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::components::{Color, Orbit, Planet, PlanetId, Star};
use crate::config::GenerationConfig;
use crate::factions::Owner;

/// Smallest base unit, so a degenerate canvas still yields a usable system.
const MIN_BASE_UNIT: f64 = 1.0;

/// A freshly generated star system.
#[derive(Debug, Clone)]
pub struct GeneratedSystem {
    /// The central star.
    pub star: Star,
    /// Planets sorted by orbit radius, ids matching their index.
    pub planets: Vec<Planet>,
    /// World units per base unit for this canvas.
    pub base_unit: f64,
    /// Innermost allowed orbit radius.
    pub min_orbit_radius: f64,
    /// Outermost allowed orbit radius.
    pub max_orbit_radius: f64,
    /// Planet count drawn before placement; may exceed `planets.len()`.
    pub requested_planets: u32,
}

/// Generate a system using a seeded generator.
#[must_use]
pub fn generate_system_seeded(
    config: &GenerationConfig,
    canvas_width: f64,
    canvas_height: f64,
    seed: u64,
) -> GeneratedSystem {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_system(config, canvas_width, canvas_height, &mut rng)
}

/// Generate a star system for a canvas of the given size.
pub fn generate_system<R: Rng + ?Sized>(
    config: &GenerationConfig,
    canvas_width: f64,
    canvas_height: f64,
    rng: &mut R,
) -> GeneratedSystem {
    let base_unit = (canvas_width.min(canvas_height) / 100.0).max(MIN_BASE_UNIT);

    let star_radius = uniform(
        rng,
        config.min_star_multiplier,
        config.max_star_multiplier,
    ) * base_unit;
    let requested_planets = uniform_int(rng, config.min_planets, config.max_planets);

    let star_margin = config.star_margin * base_unit;
    let min_orbit_radius = star_radius + star_margin;
    let screen_extent = canvas_width.max(canvas_height) / 2.0;
    let max_orbit_radius = (screen_extent * config.extent_multiplier)
        .max(star_radius * config.star_extent_multiplier);
    let clearance = config.orbit_clearance * base_unit;

    let mut names = NamePool::shuffled(&config.name_pool, rng);
    let mut planets = Vec::with_capacity(requested_planets as usize);
    // (orbit radius, planet radius) of the last placed planet
    let mut previous: Option<(f64, f64)> = None;

    for _ in 0..requested_planets {
        let size_steps = uniform_int(rng, config.min_planet_radius, config.max_planet_radius);
        let radius = f64::from(size_steps) * config.planet_radius_scale * base_unit;

        let clears_star = star_radius + radius + star_margin;
        let clears_previous =
            previous.map_or(0.0, |(orbit, prev_radius)| orbit + prev_radius + radius + clearance);
        let min_feasible = clears_star.max(clears_previous);

        if min_feasible > max_orbit_radius {
            tracing::debug!(
                placed = planets.len(),
                requested = requested_planets,
                min_feasible,
                max_orbit_radius,
                "No room for further orbits, stopping early"
            );
            break;
        }

        let last_orbit = previous.map_or(min_orbit_radius, |(orbit, _)| orbit);
        let spacing =
            uniform(rng, config.min_orbit_spacing, config.max_orbit_spacing) * base_unit;
        let orbit_radius = (last_orbit + spacing)
            .max(min_feasible)
            .min(max_orbit_radius);

        let planet = build_planet(
            config,
            PlanetId(planets.len()),
            names.next_name(),
            radius,
            size_steps,
            orbit_radius,
            rng,
        );
        planets.push(planet);
        previous = Some((orbit_radius, radius));
    }

    planets.sort_by(|a, b| a.orbit_radius().total_cmp(&b.orbit_radius()));
    for (index, planet) in planets.iter_mut().enumerate() {
        planet.id = PlanetId(index);
    }

    tracing::info!(
        star_radius,
        planets = planets.len(),
        requested = requested_planets,
        "Generated star system"
    );

    GeneratedSystem {
        star: Star {
            radius: star_radius,
        },
        planets,
        base_unit,
        min_orbit_radius,
        max_orbit_radius,
        requested_planets,
    }
}

fn build_planet<R: Rng + ?Sized>(
    config: &GenerationConfig,
    id: PlanetId,
    name: String,
    radius: f64,
    size_steps: u32,
    orbit_radius: f64,
    rng: &mut R,
) -> Planet {
    let orbit = if rng.gen_bool(probability(config.elliptical_probability)) {
        let eccentricity = uniform(rng, config.min_eccentricity, config.max_eccentricity);
        let rotation = rng.gen_range(0.0..TAU);
        Orbit::elliptical(orbit_radius, eccentricity, rotation)
    } else {
        Orbit::Circular {
            radius: orbit_radius,
        }
    };

    let angle = rng.gen_range(0.0..TAU);
    let magnitude = uniform(rng, config.min_orbit_speed, config.max_orbit_speed);
    let speed = if rng.gen_bool(0.5) {
        magnitude
    } else {
        -magnitude
    };

    let (owner, units) = if rng.gen_bool(probability(config.ai_planet_probability)) {
        (Owner::Ai, config.ai_starting_units)
    } else {
        (Owner::Neutral, config.neutral_starting_units)
    };

    let building_slots = (size_steps / config.radius_per_slot.max(1)) as usize;
    let building_slots = building_slots.clamp(1, config.max_building_slots.max(1));

    let color = Color::new(
        rng.gen_range(96..=255),
        rng.gen_range(96..=255),
        rng.gen_range(96..=255),
    );

    Planet {
        id,
        name,
        radius,
        orbit,
        angle,
        speed,
        owner,
        units,
        buildings: Vec::new(),
        building_slots,
        color,
    }
}

/// Shuffled planet names, handed out without replacement.
///
/// Once every name has been used the pool starts over and appends the lap
/// number ("Rhea 2"), so names stay unique within a session.
struct NamePool {
    names: Vec<String>,
    next: usize,
}

impl NamePool {
    fn shuffled<R: Rng + ?Sized>(pool: &[String], rng: &mut R) -> Self {
        let mut names = pool.to_vec();
        names.shuffle(rng);
        Self { names, next: 0 }
    }

    fn next_name(&mut self) -> String {
        let index = self.next;
        self.next += 1;

        if self.names.is_empty() {
            return format!("Planet {}", index + 1);
        }

        let lap = index / self.names.len();
        let name = &self.names[index % self.names.len()];
        if lap == 0 {
            name.clone()
        } else {
            format!("{name} {}", lap + 1)
        }
    }
}

/// Uniform float in `[min, max)`, or `min` for an empty range.
fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max > min && (max - min).is_finite() {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// Config probability as a valid `gen_bool` argument; NaN counts as never.
fn probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Uniform integer in `[min, max]`, or `min` for an empty range.
fn uniform_int<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}
