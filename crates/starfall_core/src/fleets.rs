//! Fleet orders, travel and arrival.
//!
//! A fleet moves through three states:
//!
//! 1. **Pending** - an order queued by [`FleetBoard::issue_order`]. Nothing
//!    has left the source planet yet.
//! 2. **In flight** - created by [`FleetBoard::launch_all`], which detaches
//!    the units from the source and fixes the travel duration.
//! 3. **Arrived** - reached in [`FleetBoard::update`] once progress hits 1.
//!    The fleet is removed and its effect applied exactly once: a
//!    reinforcement merges into the garrison, an invasion goes to
//!    [`crate::combat`].
//!
//! Fleets refer to planets by [`PlanetId`]. Their position is interpolated
//! between the source's and target's *current* positions every frame, so a
//! fleet tracks its target as both keep orbiting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buildings::BuildingCatalog;
use crate::combat::{invade, BattleOutcome};
use crate::components::{Planet, PlanetId};
use crate::config::CombatBonuses;
use crate::factions::Owner;
use crate::math::Vec2;
use crate::orbit::planet_position;

/// Unique identifier for a launched fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FleetId(pub u64);

/// What a fleet does when it arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mission {
    /// Fight the garrison of a planet the sender did not own at order time.
    Invasion,
    /// Join the garrison of one of the sender's own planets.
    Reinforcement,
}

/// Reasons an order is refused. Refused orders are never queued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The unit count is not a number.
    #[error("'{0}' is not a unit count")]
    NotANumber(String),
    /// The unit count is zero or negative.
    #[error("unit count must be positive, got {0}")]
    NonPositive(i64),
    /// The source planet has nothing to send.
    #[error("{0} has no units to send")]
    NoUnitsAvailable(String),
    /// The issuer does not own the source planet.
    #[error("{planet} is not controlled by {issuer}")]
    NotOwned {
        /// Source planet name.
        planet: String,
        /// Who tried to give the order.
        issuer: Owner,
    },
    /// Source and target are the same planet.
    #[error("source and target are the same planet")]
    SameSourceAndTarget,
    /// A planet id does not exist.
    #[error("unknown planet {0}")]
    UnknownPlanet(PlanetId),
}

/// Parse a unit count typed by the player.
///
/// Accepts integers and decimals (truncated). Rejects anything that is not
/// a finite number, and anything that is not positive.
pub fn parse_unit_request(input: &str) -> Result<i64, OrderError> {
    let trimmed = input.trim();
    let value = match trimmed.parse::<i64>() {
        Ok(value) => value,
        Err(_) => match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => value.trunc() as i64,
            _ => return Err(OrderError::NotANumber(input.to_string())),
        },
    };
    if value <= 0 {
        return Err(OrderError::NonPositive(value));
    }
    Ok(value)
}

/// An order waiting for the next launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    /// Planet the units leave from.
    pub source: PlanetId,
    /// Planet the units head to.
    pub target: PlanetId,
    /// Units to send, already clamped to the source garrison.
    pub units: u32,
    /// Decided at order time.
    pub mission: Mission,
    /// Who issued the order.
    pub owner: Owner,
}

/// A fleet in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    /// Unique id.
    pub id: FleetId,
    /// Planet the fleet left.
    pub source: PlanetId,
    /// Planet the fleet is heading to.
    pub target: PlanetId,
    /// Units aboard.
    pub units: u32,
    /// Arrival behaviour.
    pub mission: Mission,
    /// Owner at launch.
    pub owner: Owner,
    /// Session time of launch, seconds.
    pub departure_time: f64,
    /// Seconds from launch to arrival.
    pub travel_duration: f64,
    /// Interpolated world position.
    pub position: Vec2,
    /// Fraction of the trip completed, in `[0, 1]`.
    pub progress: f64,
}

impl Fleet {
    /// Whether the fleet has reached its target.
    #[must_use]
    pub fn has_arrived(&self) -> bool {
        self.progress >= 1.0
    }
}

/// Fraction of a trip completed at `now`, clamped to `[0, 1]`.
///
/// A zero-length trip counts as complete.
#[must_use]
pub fn travel_progress(departure_time: f64, travel_duration: f64, now: f64) -> f64 {
    if !(travel_duration > 0.0) {
        return 1.0;
    }
    ((now - departure_time) / travel_duration).clamp(0.0, 1.0)
}

/// Something a fleet did on arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArrivalEvent {
    /// Units joined a garrison without a fight.
    Reinforced {
        /// Arriving fleet.
        fleet: FleetId,
        /// Planet reinforced.
        planet: PlanetId,
        /// Planet name.
        planet_name: String,
        /// Owner of the fleet.
        fleet_owner: Owner,
        /// Owner of the planet at arrival (may differ if it changed hands).
        planet_owner: Owner,
        /// Units delivered.
        units: u32,
        /// Garrison after the merge.
        garrison: u32,
    },
    /// An invasion was fought.
    Battle {
        /// Arriving fleet.
        fleet: FleetId,
        /// Result of the battle.
        outcome: BattleOutcome,
    },
}

/// Pending orders and fleets in flight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetBoard {
    pending: Vec<PendingOrder>,
    active: Vec<Fleet>,
    next_fleet_id: u64,
}

impl FleetBoard {
    /// Create an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders waiting for launch, in issue order.
    #[must_use]
    pub fn pending(&self) -> &[PendingOrder] {
        &self.pending
    }

    /// Fleets in flight, in launch order.
    #[must_use]
    pub fn active(&self) -> &[Fleet] {
        &self.active
    }

    /// Queue an order from `issuer` to send `requested` units from `source`
    /// to `target`.
    ///
    /// The unit count is clamped to `[1, source.units]`. The mission is an
    /// invasion unless the issuer already owns the target.
    pub fn issue_order(
        &mut self,
        planets: &[Planet],
        issuer: Owner,
        source: PlanetId,
        target: PlanetId,
        requested: i64,
    ) -> Result<PendingOrder, OrderError> {
        let source_planet = planets
            .get(source.index())
            .ok_or(OrderError::UnknownPlanet(source))?;
        let target_planet = planets
            .get(target.index())
            .ok_or(OrderError::UnknownPlanet(target))?;

        if source == target {
            return Err(OrderError::SameSourceAndTarget);
        }
        if source_planet.owner != issuer {
            return Err(OrderError::NotOwned {
                planet: source_planet.name.clone(),
                issuer,
            });
        }
        if source_planet.units == 0 {
            return Err(OrderError::NoUnitsAvailable(source_planet.name.clone()));
        }
        if requested <= 0 {
            return Err(OrderError::NonPositive(requested));
        }

        let units = requested.clamp(1, i64::from(source_planet.units)) as u32;
        let mission = if target_planet.owner == issuer {
            Mission::Reinforcement
        } else {
            Mission::Invasion
        };

        let order = PendingOrder {
            source,
            target,
            units,
            mission,
            owner: issuer,
        };
        tracing::debug!(
            source = %source_planet.name,
            target = %target_planet.name,
            units,
            ?mission,
            "Order queued"
        );
        self.pending.push(order);
        Ok(order)
    }

    /// Drop every pending order without launching.
    pub fn cancel_pending(&mut self) {
        self.pending.clear();
    }

    /// Launch every pending order and empty the queue.
    ///
    /// Units leave the source now, not on arrival. An order whose source
    /// has since changed hands or emptied is dropped; one asking for more
    /// than the source still holds sends what is left.
    pub fn launch_all(&mut self, planets: &mut [Planet], now: f64, travel_speed: f64) -> Vec<FleetId> {
        let mut launched = Vec::with_capacity(self.pending.len());

        for order in std::mem::take(&mut self.pending) {
            let (Some(from), Some(to)) = (
                planets.get(order.source.index()).map(planet_position),
                planets.get(order.target.index()).map(planet_position),
            ) else {
                continue;
            };
            let Some(source) = planets.get_mut(order.source.index()) else {
                continue;
            };

            if source.owner != order.owner || source.units == 0 {
                tracing::debug!(
                    source = %source.name,
                    owner = %source.owner,
                    units = source.units,
                    "Dropping stale order"
                );
                continue;
            }

            let units = order.units.min(source.units);
            source.units -= units;

            let travel_duration = if travel_speed > 0.0 {
                from.distance(to) / travel_speed
            } else {
                0.0
            };

            let id = FleetId(self.next_fleet_id);
            self.next_fleet_id += 1;

            tracing::debug!(
                fleet = id.0,
                source = %source.name,
                units,
                travel_duration,
                "Fleet launched"
            );

            self.active.push(Fleet {
                id,
                source: order.source,
                target: order.target,
                units,
                mission: order.mission,
                owner: order.owner,
                departure_time: now,
                travel_duration,
                position: from,
                progress: 0.0,
            });
            launched.push(id);
        }

        launched
    }

    /// Move every fleet to its position at `now` and resolve arrivals.
    ///
    /// Arrived fleets leave the active set before their effects run, in
    /// launch order, so each one fires exactly once.
    pub fn update(
        &mut self,
        planets: &mut [Planet],
        now: f64,
        catalog: &BuildingCatalog,
        bonuses: &CombatBonuses,
    ) -> Vec<ArrivalEvent> {
        for fleet in &mut self.active {
            let (Some(from), Some(to)) = (
                planets.get(fleet.source.index()).map(planet_position),
                planets.get(fleet.target.index()).map(planet_position),
            ) else {
                continue;
            };
            fleet.progress = travel_progress(fleet.departure_time, fleet.travel_duration, now);
            fleet.position = from.lerp(to, fleet.progress);
        }

        let (arrived, in_flight): (Vec<Fleet>, Vec<Fleet>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(Fleet::has_arrived);
        self.active = in_flight;

        arrived
            .into_iter()
            .filter_map(|fleet| {
                let planet = planets.get_mut(fleet.target.index())?;
                Some(resolve_arrival(fleet, planet, catalog, bonuses))
            })
            .collect()
    }

    /// Discard all pending orders and fleets in flight.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.active.clear();
    }

    /// Whether `owner` has any fleet in flight.
    #[must_use]
    pub fn has_fleets_of(&self, owner: Owner) -> bool {
        self.active.iter().any(|fleet| fleet.owner == owner)
    }
}

fn resolve_arrival(
    fleet: Fleet,
    planet: &mut Planet,
    catalog: &BuildingCatalog,
    bonuses: &CombatBonuses,
) -> ArrivalEvent {
    // An invasion whose target already fell to the same owner lands as a
    // reinforcement instead of fighting its own garrison.
    let merges = match fleet.mission {
        Mission::Reinforcement => true,
        Mission::Invasion => planet.owner == fleet.owner,
    };

    if merges {
        planet.units = planet.units.saturating_add(fleet.units);
        tracing::debug!(
            fleet = fleet.id.0,
            planet = %planet.name,
            units = fleet.units,
            garrison = planet.units,
            "Reinforcements arrived"
        );
        return ArrivalEvent::Reinforced {
            fleet: fleet.id,
            planet: planet.id,
            planet_name: planet.name.clone(),
            fleet_owner: fleet.owner,
            planet_owner: planet.owner,
            units: fleet.units,
            garrison: planet.units,
        };
    }

    let outcome = invade(fleet.units, fleet.owner, planet, catalog, bonuses);
    ArrivalEvent::Battle {
        fleet: fleet.id,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Color, Orbit};

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

    /// Two planets 100 units apart on the x axis.
    fn pair(target_owner: Owner, target_units: u32) -> Vec<Planet> {
        vec![
            planet(0, 100.0, Owner::Player, 50),
            planet(1, 200.0, target_owner, target_units),
        ]
    }

    #[test]
    fn test_parse_unit_request() {
        assert_eq!(parse_unit_request(" 25 "), Ok(25));
        assert_eq!(parse_unit_request("12.9"), Ok(12));
        assert_eq!(
            parse_unit_request("lots"),
            Err(OrderError::NotANumber("lots".to_string()))
        );
        assert_eq!(parse_unit_request(""), Err(OrderError::NotANumber(String::new())));
        assert_eq!(parse_unit_request("0"), Err(OrderError::NonPositive(0)));
        assert_eq!(parse_unit_request("-4"), Err(OrderError::NonPositive(-4)));
        assert!(parse_unit_request("NaN").is_err());
    }

    #[test]
    fn test_order_clamps_to_garrison() {
        let planets = pair(Owner::Neutral, 10);
        let mut board = FleetBoard::new();
        let order = board
            .issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 500)
            .unwrap();
        assert_eq!(order.units, 50);
        assert_eq!(order.mission, Mission::Invasion);
        assert_eq!(board.pending().len(), 1);
        // Nothing leaves until launch.
        assert_eq!(planets[0].units, 50);
    }

    #[test]
    fn test_cancelled_orders_never_launch() {
        let mut planets = pair(Owner::Neutral, 10);
        let mut board = FleetBoard::new();
        board
            .issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 20)
            .unwrap();
        board.cancel_pending();
        assert!(board.launch_all(&mut planets, 0.0, 100.0).is_empty());
        assert_eq!(planets[0].units, 50);
    }

    #[test]
    fn test_order_to_own_planet_is_reinforcement() {
        let planets = pair(Owner::Player, 10);
        let mut board = FleetBoard::new();
        let order = board
            .issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 5)
            .unwrap();
        assert_eq!(order.mission, Mission::Reinforcement);
    }

    #[test]
    fn test_rejected_orders_are_not_queued() {
        let mut planets = pair(Owner::Ai, 10);
        let mut board = FleetBoard::new();

        assert_eq!(
            board.issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(0), 5),
            Err(OrderError::SameSourceAndTarget)
        );
        assert!(matches!(
            board.issue_order(&planets, Owner::Player, PlanetId(1), PlanetId(0), 5),
            Err(OrderError::NotOwned { .. })
        ));
        assert_eq!(
            board.issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 0),
            Err(OrderError::NonPositive(0))
        );
        assert_eq!(
            board.issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(9), 5),
            Err(OrderError::UnknownPlanet(PlanetId(9)))
        );

        planets[0].units = 0;
        assert!(matches!(
            board.issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 5),
            Err(OrderError::NoUnitsAvailable(_))
        ));
        assert!(board.pending().is_empty());
    }

    #[test]
    fn test_launch_deducts_and_stamps() {
        let mut planets = pair(Owner::Neutral, 10);
        let mut board = FleetBoard::new();
        board
            .issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 20)
            .unwrap();

        let launched = board.launch_all(&mut planets, 3.0, 50.0);

        assert_eq!(launched, vec![FleetId(0)]);
        assert!(board.pending().is_empty());
        assert_eq!(planets[0].units, 30);
        let fleet = &board.active()[0];
        assert_eq!(fleet.departure_time, 3.0);
        // 100 units of distance at 50 per second
        assert!((fleet.travel_duration - 2.0).abs() < 1e-9);
        assert_eq!(fleet.position, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_launch_clamps_overcommitted_source() {
        let mut planets = pair(Owner::Neutral, 10);
        let mut board = FleetBoard::new();
        board
            .issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 40)
            .unwrap();
        board
            .issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 40)
            .unwrap();

        board.launch_all(&mut planets, 0.0, 50.0);

        let sent: Vec<u32> = board.active().iter().map(|f| f.units).collect();
        assert_eq!(sent, vec![40, 10]);
        assert_eq!(planets[0].units, 0);
    }

    #[test]
    fn test_launch_drops_order_from_lost_planet() {
        let mut planets = pair(Owner::Neutral, 10);
        let mut board = FleetBoard::new();
        board
            .issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 10)
            .unwrap();
        planets[0].owner = Owner::Ai;

        assert!(board.launch_all(&mut planets, 0.0, 50.0).is_empty());
        assert!(board.active().is_empty());
        assert_eq!(planets[0].units, 50);
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(travel_progress(10.0, 4.0, 5.0), 0.0);
        assert_eq!(travel_progress(10.0, 4.0, 12.0), 0.5);
        assert_eq!(travel_progress(10.0, 4.0, 99.0), 1.0);
        assert_eq!(travel_progress(10.0, 0.0, 10.0), 1.0);
    }

    #[test]
    fn test_position_tracks_moving_target() {
        let mut planets = pair(Owner::Neutral, 10);
        let mut board = FleetBoard::new();
        board
            .issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 10)
            .unwrap();
        board.launch_all(&mut planets, 0.0, 50.0);

        // Target swings to (0, 200) while the fleet is halfway.
        planets[1].angle = std::f64::consts::FRAC_PI_2;
        let events = board.update(
            &mut planets,
            1.0,
            &BuildingCatalog::default(),
            &CombatBonuses::default(),
        );

        assert!(events.is_empty());
        let fleet = &board.active()[0];
        assert_eq!(fleet.progress, 0.5);
        assert!(fleet.position.distance(Vec2::new(50.0, 100.0)) < 1e-9);
    }

    #[test]
    fn test_reinforcement_merges() {
        let mut planets = pair(Owner::Player, 30);
        let mut board = FleetBoard::new();
        board
            .issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 50)
            .unwrap();
        board.launch_all(&mut planets, 0.0, 50.0);

        let events = board.update(
            &mut planets,
            2.0,
            &BuildingCatalog::default(),
            &CombatBonuses::default(),
        );

        assert_eq!(planets[1].units, 80);
        assert_eq!(planets[1].owner, Owner::Player);
        assert!(matches!(
            events.as_slice(),
            [ArrivalEvent::Reinforced {
                units: 50,
                garrison: 80,
                ..
            }]
        ));
    }

    #[test]
    fn test_reinforcement_feeds_new_owner() {
        let mut planets = pair(Owner::Player, 30);
        let mut board = FleetBoard::new();
        board
            .issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 20)
            .unwrap();
        board.launch_all(&mut planets, 0.0, 50.0);
        planets[1].owner = Owner::Ai;

        let events = board.update(
            &mut planets,
            5.0,
            &BuildingCatalog::default(),
            &CombatBonuses::default(),
        );

        assert_eq!(planets[1].units, 50);
        assert_eq!(planets[1].owner, Owner::Ai);
        assert!(matches!(
            events.as_slice(),
            [ArrivalEvent::Reinforced {
                fleet_owner: Owner::Player,
                planet_owner: Owner::Ai,
                ..
            }]
        ));
    }

    #[test]
    fn test_invasion_fights() {
        let mut planets = pair(Owner::Ai, 10);
        let mut board = FleetBoard::new();
        board
            .issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 50)
            .unwrap();
        board.launch_all(&mut planets, 0.0, 50.0);

        let events = board.update(
            &mut planets,
            2.0,
            &BuildingCatalog::default(),
            &CombatBonuses::default(),
        );

        // 50 vs 10 × 1.1 = 11: attacker keeps 39.
        assert_eq!(planets[1].owner, Owner::Player);
        assert_eq!(planets[1].units, 39);
        match events.as_slice() {
            [ArrivalEvent::Battle { outcome, .. }] => assert!(outcome.attacker_won()),
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn test_arrival_fires_once() {
        let mut planets = pair(Owner::Player, 0);
        let mut board = FleetBoard::new();
        board
            .issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 5)
            .unwrap();
        board.launch_all(&mut planets, 0.0, 50.0);

        let catalog = BuildingCatalog::default();
        let bonuses = CombatBonuses::default();
        let first = board.update(&mut planets, 2.0, &catalog, &bonuses);
        let second = board.update(&mut planets, 3.0, &catalog, &bonuses);

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert!(board.active().is_empty());
        assert_eq!(planets[1].units, 5);
    }

    #[test]
    fn test_simultaneous_arrivals_apply_in_launch_order() {
        let mut planets = vec![
            planet(0, 100.0, Owner::Player, 100),
            planet(1, 200.0, Owner::Neutral, 10),
        ];
        let mut board = FleetBoard::new();
        // First wave takes the planet, second lands as reinforcement.
        board
            .issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 20)
            .unwrap();
        board
            .issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 30)
            .unwrap();
        board.launch_all(&mut planets, 0.0, 50.0);

        let events = board.update(
            &mut planets,
            10.0,
            &BuildingCatalog::default(),
            &CombatBonuses::default(),
        );

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ArrivalEvent::Battle { .. }));
        assert!(matches!(events[1], ArrivalEvent::Reinforced { units: 30, .. }));
        // 20 vs 11: keeps 9, then +30
        assert_eq!(planets[1].units, 39);
        assert_eq!(planets[1].owner, Owner::Player);
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut planets = pair(Owner::Neutral, 10);
        let mut board = FleetBoard::new();
        board
            .issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 10)
            .unwrap();
        board.launch_all(&mut planets, 0.0, 50.0);
        board
            .issue_order(&planets, Owner::Player, PlanetId(0), PlanetId(1), 10)
            .unwrap();

        board.clear();
        assert!(board.pending().is_empty());
        assert!(board.active().is_empty());
        assert!(!board.has_fleets_of(Owner::Player));
    }
}
