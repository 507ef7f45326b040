//! Simulation state and frame driver.
//!
//! A [`Simulation`] owns everything about one session: the star, the
//! planets, fleets, the player's income and the frame counter. The driver
//! (a browser loop, the headless runner, a test) feeds it time and input:
//!
//! - [`Simulation::advance_frame`] once per rendered frame
//! - [`Simulation::production_tick`] whenever a [`ProductionTimer`] says so
//! - orders and construction in between frames
//!
//! and reads [`Simulation::snapshot`] to draw. Nothing here touches a clock
//! or draws anything.
//!
//! [`ProductionTimer`]: crate::economy::ProductionTimer

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::buildings::{construct_building, BuildingId};
use crate::components::{Color, Planet, PlanetId, Star};
use crate::config::GameConfig;
use crate::economy::{production_tick, PlayerEconomy, ProductionReport};
use crate::error::{GameError, Result};
use crate::factions::Owner;
use crate::fleets::{parse_unit_request, ArrivalEvent, FleetBoard, FleetId, Mission, PendingOrder};
use crate::generation::{generate_system, generate_system_seeded, GeneratedSystem};
use crate::math::Vec2;
use crate::orbit::{advance_orbits, planet_position};

/// Whether the session still accepts input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Frames, production and orders are processed.
    #[default]
    Running,
    /// Everything is a no-op until a new session is generated.
    Stopped,
}

/// How the session stands for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Both sides still have planets or fleets.
    InProgress,
    /// The AI holds no planets and has no fleets in flight.
    Victory,
    /// The player holds no planets and has no fleets in flight.
    Defeat,
}

/// Events generated during a frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameEvents {
    /// Frame number after the update.
    pub frame: u64,
    /// Fleets that arrived this frame, in launch order.
    pub arrivals: Vec<ArrivalEvent>,
}

/// Render data for one planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetView {
    /// Planet id.
    pub id: PlanetId,
    /// Display name.
    pub name: String,
    /// World position.
    pub position: Vec2,
    /// Body radius.
    pub radius: f64,
    /// Semi-major axis, for drawing the orbit path.
    pub orbit_radius: f64,
    /// Current owner.
    pub owner: Owner,
    /// Garrison.
    pub units: u32,
    /// Constructed buildings.
    pub buildings: Vec<BuildingId>,
    /// Slot capacity.
    pub building_slots: usize,
    /// Display color.
    pub color: Color,
}

/// Render data for one fleet in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FleetView {
    /// Fleet id.
    pub id: FleetId,
    /// Owner.
    pub owner: Owner,
    /// Units aboard.
    pub units: u32,
    /// World position.
    pub position: Vec2,
    /// Trip completed, in `[0, 1]`.
    pub progress: f64,
    /// Arrival behaviour.
    pub mission: Mission,
}

/// A queued order, for drawing a preview line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderPreview {
    /// Source planet position.
    pub from: Vec2,
    /// Target planet position.
    pub to: Vec2,
    /// Units to send.
    pub units: u32,
    /// Issuer.
    pub owner: Owner,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    /// Frame counter.
    pub frame: u64,
    /// Session time, seconds.
    pub now: f64,
    /// Star radius.
    pub star_radius: f64,
    /// Planets in orbit order.
    pub planets: Vec<PlanetView>,
    /// Fleets in flight.
    pub fleets: Vec<FleetView>,
    /// Queued orders.
    pub pending_orders: Vec<OrderPreview>,
    /// Banked player income.
    pub player_income: u64,
    /// Session phase.
    pub phase: Phase,
}

/// The star system simulation.
///
/// # Frame Order
///
/// Each [`advance_frame`](Self::advance_frame):
/// 1. **Orbits** - every planet's phase advances by its speed
/// 2. **Fleets** - positions are interpolated against the new planet
///    positions, then arrivals resolve in launch order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    config: GameConfig,
    star: Star,
    planets: Vec<Planet>,
    fleets: FleetBoard,
    economy: PlayerEconomy,
    frame: u64,
    now: f64,
    phase: Phase,
    player_home: Option<PlanetId>,
}

impl Simulation {
    /// Start a session on an already generated system.
    #[must_use]
    pub fn new(config: GameConfig, system: GeneratedSystem) -> Self {
        Self {
            config,
            star: system.star,
            planets: system.planets,
            fleets: FleetBoard::new(),
            economy: PlayerEconomy::default(),
            frame: 0,
            now: 0.0,
            phase: Phase::Running,
            player_home: None,
        }
    }

    /// Generate a system for the canvas and start a session on it.
    pub fn generate<R: Rng + ?Sized>(
        config: GameConfig,
        canvas_width: f64,
        canvas_height: f64,
        rng: &mut R,
    ) -> Self {
        let system = generate_system(&config.generation, canvas_width, canvas_height, rng);
        Self::new(config, system)
    }

    /// Generate a system from a seed and start a session on it.
    #[must_use]
    pub fn from_seed(config: GameConfig, canvas_width: f64, canvas_height: f64, seed: u64) -> Self {
        let system = generate_system_seeded(&config.generation, canvas_width, canvas_height, seed);
        Self::new(config, system)
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The central star.
    #[must_use]
    pub const fn star(&self) -> Star {
        self.star
    }

    /// Planets in orbit order; `planets()[i].id == PlanetId(i)`.
    #[must_use]
    pub fn planets(&self) -> &[Planet] {
        &self.planets
    }

    /// Look up one planet.
    #[must_use]
    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.get(id.index())
    }

    /// Pending orders and fleets in flight.
    #[must_use]
    pub fn fleets(&self) -> &FleetBoard {
        &self.fleets
    }

    /// The player's income pool.
    #[must_use]
    pub const fn economy(&self) -> PlayerEconomy {
        self.economy
    }

    /// Frames advanced so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Session time of the last frame, seconds.
    #[must_use]
    pub const fn now(&self) -> f64 {
        self.now
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the session accepts input.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// The planet the player started on, once assigned.
    #[must_use]
    pub const fn player_home(&self) -> Option<PlanetId> {
        self.player_home
    }

    fn ensure_running(&self) -> Result<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(GameError::SessionStopped)
        }
    }

    /// Give the player a starting planet with the configured garrison.
    ///
    /// # Errors
    ///
    /// Fails if the planet does not exist or the session is stopped.
    pub fn assign_player_home(&mut self, id: PlanetId) -> Result<()> {
        self.ensure_running()?;
        let units = self.config.generation.player_starting_units;
        let planet = self
            .planets
            .get_mut(id.index())
            .ok_or(GameError::PlanetNotFound(id.index()))?;

        planet.owner = Owner::Player;
        planet.units = units;
        self.player_home = Some(id);

        tracing::info!(planet = %planet.name, units, "Player home assigned");
        Ok(())
    }

    /// Pick a random neutral planet (any planet if none is neutral) and
    /// make it the player's home.
    ///
    /// # Errors
    ///
    /// Fails if the system has no planets or the session is stopped.
    pub fn choose_player_home<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<PlanetId> {
        let neutral: Vec<PlanetId> = self
            .planets
            .iter()
            .filter(|planet| planet.owner == Owner::Neutral)
            .map(|planet| planet.id)
            .collect();
        let candidates = if neutral.is_empty() {
            self.planets.iter().map(|planet| planet.id).collect()
        } else {
            neutral
        };

        let home = *candidates.choose(rng).ok_or(GameError::EmptySystem)?;
        self.assign_player_home(home)?;
        Ok(home)
    }

    /// Queue a fleet order. See [`FleetBoard::issue_order`].
    ///
    /// # Errors
    ///
    /// Returns the rejection reason; nothing is queued on error.
    pub fn issue_order(
        &mut self,
        issuer: Owner,
        source: PlanetId,
        target: PlanetId,
        requested: i64,
    ) -> Result<PendingOrder> {
        self.ensure_running()?;
        Ok(self
            .fleets
            .issue_order(&self.planets, issuer, source, target, requested)?)
    }

    /// Queue a fleet order from typed input such as `"25"`.
    ///
    /// # Errors
    ///
    /// Rejects input that is not a positive number, then behaves like
    /// [`issue_order`](Self::issue_order).
    pub fn issue_order_text(
        &mut self,
        issuer: Owner,
        source: PlanetId,
        target: PlanetId,
        input: &str,
    ) -> Result<PendingOrder> {
        let requested = parse_unit_request(input)?;
        self.issue_order(issuer, source, target, requested)
    }

    /// Launch every queued order at the current session time.
    pub fn launch_all_pending(&mut self) -> Vec<FleetId> {
        if !self.is_running() {
            return Vec::new();
        }
        self.fleets
            .launch_all(&mut self.planets, self.now, self.config.fleets.travel_speed)
    }

    /// Build on one of the player's planets, paying from player income.
    ///
    /// # Errors
    ///
    /// Fails if the planet does not exist, the session is stopped, or the
    /// construction itself is refused.
    pub fn construct_building(&mut self, planet: PlanetId, building: &BuildingId) -> Result<()> {
        self.ensure_running()?;
        let target = self
            .planets
            .get_mut(planet.index())
            .ok_or(GameError::PlanetNotFound(planet.index()))?;
        construct_building(target, &self.config.buildings, &mut self.economy, building)?;
        Ok(())
    }

    /// Advance one frame to session time `now` (seconds).
    ///
    /// Orbits advance first, then fleets move and arrive. Returns an empty
    /// event set once the session is stopped.
    pub fn advance_frame(&mut self, now: f64) -> FrameEvents {
        if !self.is_running() {
            return FrameEvents {
                frame: self.frame,
                arrivals: Vec::new(),
            };
        }

        self.frame += 1;
        self.now = now;

        advance_orbits(&mut self.planets);
        let arrivals = self.fleets.update(
            &mut self.planets,
            now,
            &self.config.buildings,
            &self.config.combat,
        );

        tracing::trace!(
            frame = self.frame,
            fleets = self.fleets.active().len(),
            arrivals = arrivals.len(),
            "Frame advanced"
        );

        FrameEvents {
            frame: self.frame,
            arrivals,
        }
    }

    /// Run one production tick. No-op once stopped.
    pub fn production_tick(&mut self) -> ProductionReport {
        if !self.is_running() {
            return ProductionReport::default();
        }
        production_tick(
            &mut self.planets,
            &self.config.buildings,
            &self.config.production,
            &mut self.economy,
        )
    }

    /// End the session, discarding queued orders and fleets in flight.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.fleets.clear();
        self.phase = Phase::Stopped;
        tracing::info!(frame = self.frame, now = self.now, "Session stopped");
    }

    /// Where the session stands.
    ///
    /// Always in progress until the player has a home.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        if self.player_home.is_none() {
            return Outcome::InProgress;
        }
        let holds = |owner: Owner| {
            self.planets.iter().any(|planet| planet.owner == owner)
                || self.fleets.has_fleets_of(owner)
        };

        if !holds(Owner::Player) {
            Outcome::Defeat
        } else if !holds(Owner::Ai) {
            Outcome::Victory
        } else {
            Outcome::InProgress
        }
    }

    /// Read-only view for rendering.
    #[must_use]
    pub fn snapshot(&self) -> RenderSnapshot {
        let planets = self
            .planets
            .iter()
            .map(|planet| PlanetView {
                id: planet.id,
                name: planet.name.clone(),
                position: planet_position(planet),
                radius: planet.radius,
                orbit_radius: planet.orbit_radius(),
                owner: planet.owner,
                units: planet.units,
                buildings: planet.buildings.clone(),
                building_slots: planet.building_slots,
                color: planet.color,
            })
            .collect();

        let fleets = self
            .fleets
            .active()
            .iter()
            .map(|fleet| FleetView {
                id: fleet.id,
                owner: fleet.owner,
                units: fleet.units,
                position: fleet.position,
                progress: fleet.progress,
                mission: fleet.mission,
            })
            .collect();

        let pending_orders = self
            .fleets
            .pending()
            .iter()
            .filter_map(|order| {
                Some(OrderPreview {
                    from: self.planet(order.source).map(planet_position)?,
                    to: self.planet(order.target).map(planet_position)?,
                    units: order.units,
                    owner: order.owner,
                })
            })
            .collect();

        RenderSnapshot {
            frame: self.frame,
            now: self.now,
            star_radius: self.star.radius,
            planets,
            fleets,
            pending_orders,
            player_income: self.economy.income,
            phase: self.phase,
        }
    }

    /// Hash of the simulation state.
    ///
    /// Two runs fed the same seed and inputs produce the same hash.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.frame.hash(&mut hasher);
        self.now.to_bits().hash(&mut hasher);
        self.phase.hash(&mut hasher);
        self.economy.income.hash(&mut hasher);

        self.planets.len().hash(&mut hasher);
        for planet in &self.planets {
            planet.id.hash(&mut hasher);
            planet.angle.to_bits().hash(&mut hasher);
            planet.owner.hash(&mut hasher);
            planet.units.hash(&mut hasher);
            planet.buildings.hash(&mut hasher);
        }

        for order in self.fleets.pending() {
            order.source.hash(&mut hasher);
            order.target.hash(&mut hasher);
            order.units.hash(&mut hasher);
            order.owner.hash(&mut hasher);
        }

        for fleet in self.fleets.active() {
            fleet.id.hash(&mut hasher);
            fleet.owner.hash(&mut hasher);
            fleet.units.hash(&mut hasher);
            fleet.mission.hash(&mut hasher);
            fleet.departure_time.to_bits().hash(&mut hasher);
            fleet.travel_duration.to_bits().hash(&mut hasher);
        }

        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Orbit;

    fn planet(id: usize, orbit_radius: f64, owner: Owner, units: u32) -> Planet {
        Planet {
            id: PlanetId(id),
            name: format!("P{id}"),
            radius: 5.0,
            orbit: Orbit::Circular {
                radius: orbit_radius,
            },
            angle: 0.0,
            speed: 0.0,
            owner,
            units,
            buildings: Vec::new(),
            building_slots: 2,
            color: Color::default(),
        }
    }

    fn simulation(planets: Vec<Planet>) -> Simulation {
        Simulation::new(
            GameConfig::default(),
            GeneratedSystem {
                star: Star { radius: 30.0 },
                planets,
                base_unit: 10.0,
                min_orbit_radius: 70.0,
                max_orbit_radius: 700.0,
                requested_planets: 3,
            },
        )
    }

    /// Player home at x = 100, neutral at x = 160 (one second away at the
    /// default speed of 60), AI at x = 400.
    fn three_planets() -> Simulation {
        let mut sim = simulation(vec![
            planet(0, 100.0, Owner::Neutral, 10),
            planet(1, 160.0, Owner::Neutral, 10),
            planet(2, 400.0, Owner::Ai, 20),
        ]);
        sim.assign_player_home(PlanetId(0)).unwrap();
        sim
    }

    #[test]
    fn test_assign_home() {
        let sim = three_planets();
        let home = sim.planet(PlanetId(0)).unwrap();
        assert_eq!(home.owner, Owner::Player);
        assert_eq!(home.units, 30);
        assert_eq!(sim.player_home(), Some(PlanetId(0)));
    }

    #[test]
    fn test_assign_unknown_home_fails() {
        let mut sim = three_planets();
        assert!(matches!(
            sim.assign_player_home(PlanetId(7)),
            Err(GameError::PlanetNotFound(7))
        ));
    }

    #[test]
    fn test_choose_home_prefers_neutral() {
        use rand::SeedableRng;
        for seed in 0..20 {
            let mut sim = simulation(vec![
                planet(0, 100.0, Owner::Ai, 10),
                planet(1, 160.0, Owner::Neutral, 10),
            ]);
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            assert_eq!(sim.choose_player_home(&mut rng).unwrap(), PlanetId(1));
        }
    }

    #[test]
    fn test_choose_home_in_empty_system() {
        use rand::SeedableRng;
        let mut sim = simulation(Vec::new());
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        assert!(matches!(
            sim.choose_player_home(&mut rng),
            Err(GameError::EmptySystem)
        ));
    }

    #[test]
    fn test_order_launch_and_capture() {
        let mut sim = three_planets();
        sim.issue_order_text(Owner::Player, PlanetId(0), PlanetId(1), "25")
            .unwrap();
        assert_eq!(sim.snapshot().pending_orders.len(), 1);

        sim.advance_frame(0.0);
        sim.launch_all_pending();
        assert_eq!(sim.planet(PlanetId(0)).unwrap().units, 5);

        let midway = sim.advance_frame(0.5);
        assert!(midway.arrivals.is_empty());
        assert_eq!(sim.snapshot().fleets.len(), 1);

        let arrival = sim.advance_frame(1.0);
        assert_eq!(arrival.arrivals.len(), 1);
        // 25 vs 10 × 1.1 = 11
        let target = sim.planet(PlanetId(1)).unwrap();
        assert_eq!(target.owner, Owner::Player);
        assert_eq!(target.units, 14);
        assert!(sim.snapshot().fleets.is_empty());
    }

    #[test]
    fn test_bad_order_input() {
        let mut sim = three_planets();
        assert!(matches!(
            sim.issue_order_text(Owner::Player, PlanetId(0), PlanetId(1), "abc"),
            Err(GameError::Order(_))
        ));
        assert!(sim.fleets().pending().is_empty());
    }

    #[test]
    fn test_orbits_advance_once_per_frame() {
        let mut sim = three_planets();
        let mut planets = sim.planets.clone();
        for planet in &mut planets {
            planet.speed = 0.01;
        }
        sim.planets = planets;

        sim.advance_frame(0.016);
        sim.advance_frame(0.033);
        assert!((sim.planet(PlanetId(0)).unwrap().angle - 0.02).abs() < 1e-12);
        assert_eq!(sim.frame(), 2);
    }

    #[test]
    fn test_production_and_construction() {
        let mut sim = three_planets();
        for _ in 0..25 {
            sim.production_tick();
        }
        // 25 ticks × base income 2
        assert_eq!(sim.economy().income, 50);
        assert_eq!(sim.planet(PlanetId(0)).unwrap().units, 55);
        assert_eq!(sim.planet(PlanetId(1)).unwrap().units, 10);
        assert_eq!(sim.planet(PlanetId(2)).unwrap().units, 45);

        sim.construct_building(PlanetId(0), &BuildingId::new("factory"))
            .unwrap();
        assert_eq!(sim.economy().income, 0);
        assert!(matches!(
            sim.construct_building(PlanetId(0), &BuildingId::new("factory")),
            Err(GameError::Build(_))
        ));
    }

    #[test]
    fn test_stop_discards_fleets_and_ignores_input() {
        let mut sim = three_planets();
        sim.issue_order(Owner::Player, PlanetId(0), PlanetId(1), 10)
            .unwrap();
        sim.launch_all_pending();
        sim.issue_order(Owner::Player, PlanetId(0), PlanetId(1), 5)
            .unwrap();

        sim.stop();
        let hash = sim.state_hash();

        assert!(sim.fleets().active().is_empty());
        assert!(sim.fleets().pending().is_empty());
        assert!(sim.advance_frame(10.0).arrivals.is_empty());
        assert_eq!(sim.production_tick(), ProductionReport::default());
        assert!(sim.launch_all_pending().is_empty());
        assert!(matches!(
            sim.issue_order(Owner::Player, PlanetId(0), PlanetId(1), 5),
            Err(GameError::SessionStopped)
        ));
        assert_eq!(sim.state_hash(), hash);
        assert_eq!(sim.snapshot().phase, Phase::Stopped);
    }

    #[test]
    fn test_outcome() {
        let mut sim = simulation(vec![
            planet(0, 100.0, Owner::Neutral, 10),
            planet(1, 160.0, Owner::Ai, 1),
        ]);
        assert_eq!(sim.outcome(), Outcome::InProgress);

        sim.assign_player_home(PlanetId(0)).unwrap();
        assert_eq!(sim.outcome(), Outcome::InProgress);

        sim.issue_order(Owner::Player, PlanetId(0), PlanetId(1), 30)
            .unwrap();
        sim.launch_all_pending();
        sim.advance_frame(5.0);
        assert_eq!(sim.outcome(), Outcome::Victory);

        sim.planets[0].owner = Owner::Ai;
        sim.planets[1].owner = Owner::Ai;
        assert_eq!(sim.outcome(), Outcome::Defeat);
    }

    #[test]
    fn test_snapshot_matches_state() {
        let sim = three_planets();
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.planets.len(), 3);
        assert_eq!(snapshot.star_radius, 30.0);
        assert_eq!(snapshot.planets[0].position, Vec2::new(100.0, 0.0));
        assert_eq!(snapshot.planets[2].owner, Owner::Ai);
    }

    #[test]
    fn test_seeded_sessions_hash_equal() {
        let a = Simulation::from_seed(GameConfig::default(), 1280.0, 720.0, 99);
        let b = Simulation::from_seed(GameConfig::default(), 1280.0, 720.0, 99);
        assert_eq!(a.state_hash(), b.state_hash());
    }
}
