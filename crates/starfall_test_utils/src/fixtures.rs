//! Test fixtures and helpers.
//!
//! Hand-built planets and sessions for consistent testing, plus a scripted
//! driver that plays both sides without any randomness.

use rand::rngs::StdRng;
use rand::SeedableRng;

use starfall_core::buildings::BuildingId;
use starfall_core::components::{Color, Orbit, Planet, PlanetId, Star};
use starfall_core::config::GameConfig;
use starfall_core::factions::Owner;
use starfall_core::generation::GeneratedSystem;
use starfall_core::orbit::world_distance;
use starfall_core::simulation::Simulation;

/// Session seconds per frame for scripted runs.
pub const FRAME_SECS: f64 = 1.0 / 60.0;

/// Frames between production ticks in scripted runs (5 s at 60 fps).
pub const PRODUCTION_EVERY: u64 = 300;

/// Frames between scripted orders.
pub const ORDERS_EVERY: u64 = 90;

/// Builder for hand-placed planets.
///
/// Defaults: circular orbit of `100 × (id + 1)`, radius 6, stationary,
/// neutral with 10 units, two building slots.
#[derive(Debug, Clone)]
pub struct PlanetBuilder {
    planet: Planet,
}

impl PlanetBuilder {
    /// Start a planet with the given id.
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self {
            planet: Planet {
                id: PlanetId(id),
                name: format!("Planet {id}"),
                radius: 6.0,
                orbit: Orbit::Circular {
                    radius: 100.0 * (id as f64 + 1.0),
                },
                angle: 0.0,
                speed: 0.0,
                owner: Owner::Neutral,
                units: 10,
                buildings: Vec::new(),
                building_slots: 2,
                color: Color::new(200, 200, 200),
            },
        }
    }

    /// Circular orbit radius.
    #[must_use]
    pub fn orbit_radius(mut self, radius: f64) -> Self {
        self.planet.orbit = Orbit::Circular { radius };
        self
    }

    /// Elliptical orbit.
    #[must_use]
    pub fn elliptical(mut self, semi_major_axis: f64, eccentricity: f64, rotation: f64) -> Self {
        self.planet.orbit = Orbit::elliptical(semi_major_axis, eccentricity, rotation);
        self
    }

    /// Owner and garrison.
    #[must_use]
    pub fn owned_by(mut self, owner: Owner, units: u32) -> Self {
        self.planet.owner = owner;
        self.planet.units = units;
        self
    }

    /// Phase and angular speed.
    #[must_use]
    pub fn moving(mut self, angle: f64, speed: f64) -> Self {
        self.planet.angle = angle;
        self.planet.speed = speed;
        self
    }

    /// Add a constructed building.
    #[must_use]
    pub fn with_building(mut self, id: &str) -> Self {
        self.planet.buildings.push(BuildingId::new(id));
        self
    }

    /// Slot capacity.
    #[must_use]
    pub fn slots(mut self, slots: usize) -> Self {
        self.planet.building_slots = slots;
        self
    }

    /// Finish.
    #[must_use]
    pub fn build(self) -> Planet {
        self.planet
    }
}

/// Stationary planet on a circular orbit.
#[must_use]
pub fn planet(id: usize, orbit_radius: f64, owner: Owner, units: u32) -> Planet {
    PlanetBuilder::new(id)
        .orbit_radius(orbit_radius)
        .owned_by(owner, units)
        .build()
}

/// Session on hand-placed planets with a given config.
///
/// Planets must already be sorted by orbit with ids matching their index.
#[must_use]
pub fn session_with_config(config: GameConfig, planets: Vec<Planet>) -> Simulation {
    let max_orbit = planets
        .iter()
        .map(Planet::orbit_radius)
        .fold(0.0, f64::max);
    let requested = planets.len() as u32;
    Simulation::new(
        config,
        GeneratedSystem {
            star: Star { radius: 30.0 },
            planets,
            base_unit: 10.0,
            min_orbit_radius: 70.0,
            max_orbit_radius: max_orbit,
            requested_planets: requested,
        },
    )
}

/// Session on hand-placed planets with default config.
#[must_use]
pub fn session(planets: Vec<Planet>) -> Simulation {
    session_with_config(GameConfig::default(), planets)
}

/// Three planets in a row: player home (30 units) at 100, neutral (10) at
/// 200, AI (20) at 300. Nothing orbits.
#[must_use]
pub fn duel_session() -> Simulation {
    let mut sim = session(vec![
        planet(0, 100.0, Owner::Neutral, 10),
        planet(1, 200.0, Owner::Neutral, 10),
        planet(2, 300.0, Owner::Ai, 20),
    ]);
    if let Err(error) = sim.assign_player_home(PlanetId(0)) {
        tracing::warn!(%error, "Duel session has no player home");
    }
    sim
}

/// Generated 1280×720 session with a player home picked from the same seed.
#[must_use]
pub fn seeded_session(seed: u64) -> Simulation {
    let mut sim = Simulation::from_seed(GameConfig::default(), 1280.0, 720.0, seed);
    let mut rng = StdRng::seed_from_u64(seed);
    if let Err(error) = sim.choose_player_home(&mut rng) {
        tracing::warn!(seed, %error, "Seeded session has no player home");
    }
    sim
}

/// Queue an order sending half the garrison of `owner`'s strongest planet
/// to the nearest planet it does not own. Returns whether an order was
/// queued.
pub fn send_from_strongest(sim: &mut Simulation, owner: Owner) -> bool {
    let planets = sim.planets();
    let Some(source) = planets
        .iter()
        .filter(|p| p.owner == owner && p.units >= 2)
        .max_by_key(|p| (p.units, std::cmp::Reverse(p.id)))
    else {
        return false;
    };
    let Some(target) = planets
        .iter()
        .filter(|p| p.owner != owner)
        .min_by(|a, b| world_distance(source, a).total_cmp(&world_distance(source, b)))
    else {
        return false;
    };

    let (source, target, units) = (source.id, target.id, i64::from(source.units / 2));
    sim.issue_order(owner, source, target, units).is_ok()
}

/// Advance a session by one scripted frame.
///
/// Production runs every [`PRODUCTION_EVERY`] frames; every
/// [`ORDERS_EVERY`] frames both sides send half of their strongest
/// garrison at the nearest planet they do not hold.
pub fn scripted_frame(sim: &mut Simulation) {
    let frame = sim.frame() + 1;

    if frame % PRODUCTION_EVERY == 0 {
        sim.production_tick();
    }
    if frame % ORDERS_EVERY == 0 {
        send_from_strongest(sim, Owner::Player);
        send_from_strongest(sim, Owner::Ai);
        sim.launch_all_pending();
    }

    sim.advance_frame(frame as f64 * FRAME_SECS);
}
