//! Notifications and end-of-run summaries.
//!
//! The core reports arrivals as data; this module turns them into the
//! one-line messages a player would see, and gathers a serializable
//! summary of a whole run.

use std::fmt;

use serde::{Deserialize, Serialize};

use starfall_core::factions::Owner;
use starfall_core::fleets::ArrivalEvent;
use starfall_core::simulation::{Outcome, Simulation};

/// Human-readable message for an arrival.
#[derive(Debug, Clone, Copy)]
pub struct Notification<'a>(pub &'a ArrivalEvent);

impl fmt::Display for Notification<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ArrivalEvent::Reinforced {
                planet_name,
                fleet_owner,
                planet_owner,
                units,
                garrison,
                ..
            } => {
                if fleet_owner == planet_owner {
                    write!(
                        f,
                        "{units} reinforcements arrived at {planet_name} ({garrison} stationed)"
                    )
                } else {
                    write!(
                        f,
                        "{units} {fleet_owner} reinforcements joined {planet_owner} forces at \
                         {planet_name} ({garrison} stationed)"
                    )
                }
            }
            ArrivalEvent::Battle { outcome, .. } if outcome.attacker_won() => write!(
                f,
                "{} captured {} from {} with {} units remaining",
                outcome.winner, outcome.planet_name, outcome.defender, outcome.remaining_units
            ),
            ArrivalEvent::Battle { outcome, .. } => write!(
                f,
                "{} repelled the {} invasion of {}, {} units remaining",
                outcome.winner, outcome.attacker, outcome.planet_name, outcome.remaining_units
            ),
        }
    }
}

/// Running tallies of arrivals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalTally {
    /// Battles fought.
    pub battles: u32,
    /// Battles that changed a planet's owner.
    pub captures: u32,
    /// Peaceful arrivals.
    pub reinforcements: u32,
}

impl ArrivalTally {
    /// Count one arrival.
    pub fn record(&mut self, event: &ArrivalEvent) {
        match event {
            ArrivalEvent::Reinforced { .. } => self.reinforcements += 1,
            ArrivalEvent::Battle { outcome, .. } => {
                self.battles += 1;
                if outcome.attacker_won() {
                    self.captures += 1;
                }
            }
        }
    }
}

/// Planet and unit counts for one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideSummary {
    /// Planets held.
    pub planets: usize,
    /// Units stationed on those planets.
    pub units: u64,
    /// Units in flight.
    pub units_in_flight: u64,
}

impl SideSummary {
    /// Count `owner`'s holdings in a session.
    #[must_use]
    pub fn of(sim: &Simulation, owner: Owner) -> Self {
        let (planets, units) = sim
            .planets()
            .iter()
            .filter(|p| p.owner == owner)
            .fold((0, 0u64), |(count, units), p| (count + 1, units + u64::from(p.units)));
        let units_in_flight = sim
            .fleets()
            .active()
            .iter()
            .filter(|fleet| fleet.owner == owner)
            .map(|fleet| u64::from(fleet.units))
            .sum();
        Self {
            planets,
            units,
            units_in_flight,
        }
    }
}

/// Result of one headless run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Generation seed.
    pub seed: u64,
    /// Frames simulated.
    pub frames: u64,
    /// Session seconds simulated.
    pub duration_secs: f64,
    /// Planets in the system.
    pub planets: usize,
    /// Player standing.
    pub outcome: Outcome,
    /// Player holdings.
    pub player: SideSummary,
    /// AI holdings.
    pub ai: SideSummary,
    /// Neutral planets left.
    pub neutral_planets: usize,
    /// Player income banked at the end.
    pub player_income: u64,
    /// Production ticks run.
    pub production_ticks: u64,
    /// Fleets launched by both sides.
    pub fleets_launched: u64,
    /// Arrival tallies.
    pub arrivals: ArrivalTally,
    /// Final state hash.
    pub state_hash: u64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Starfall Run Summary ===")?;
        writeln!(f, "Seed:            {}", self.seed)?;
        writeln!(
            f,
            "Duration:        {:.1}s ({} frames)",
            self.duration_secs, self.frames
        )?;
        writeln!(f, "Outcome:         {:?}", self.outcome)?;
        writeln!(
            f,
            "Player:          {} planets, {} units (+{} in flight), {} income",
            self.player.planets, self.player.units, self.player.units_in_flight, self.player_income
        )?;
        writeln!(
            f,
            "AI:              {} planets, {} units (+{} in flight)",
            self.ai.planets, self.ai.units, self.ai.units_in_flight
        )?;
        writeln!(
            f,
            "Neutral:         {} of {} planets",
            self.neutral_planets, self.planets
        )?;
        writeln!(
            f,
            "Fleets:          {} launched, {} battles, {} captures, {} reinforcements",
            self.fleets_launched,
            self.arrivals.battles,
            self.arrivals.captures,
            self.arrivals.reinforcements
        )?;
        write!(f, "State hash:      {:016x}", self.state_hash)
    }
}
