//! Scripted commanders for headless sessions.
//!
//! A commander plays one side. Every few seconds it looks at the board,
//! spends player income on its build order, and sends part of each strong
//! garrison at the nearest planet it expects to take with a margin to
//! spare. Expectations come from [`resolve_battle`] against the target's
//! current garrison, so a commander never attacks a planet it would lose
//! against today.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use starfall_core::buildings::{BuildError, BuildingId};
use starfall_core::combat::resolve_battle;
use starfall_core::components::PlanetId;
use starfall_core::error::GameError;
use starfall_core::factions::Owner;
use starfall_core::orbit::world_distance;
use starfall_core::simulation::Simulation;

/// Error type for commander profiles.
#[derive(Error, Debug)]
pub enum CommanderError {
    /// File not found.
    #[error("Commander profile not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read commander profile: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse commander profile: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// A field is out of range.
    #[error("Invalid commander profile '{profile}': {reason}")]
    Invalid {
        /// Profile name.
        profile: String,
        /// What is wrong.
        reason: String,
    },
}

/// How a commander plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommanderProfile {
    /// Profile name.
    pub name: String,
    /// Seconds between decisions.
    pub decision_interval_secs: f64,
    /// Fraction of the spare garrison sent per attack.
    pub attack_fraction: f64,
    /// Units always kept at home.
    pub min_garrison: u32,
    /// Required edge over the defender, in percent of its strength.
    pub safety_margin_percent: u32,
    /// Buildings to construct, cycled in order (player side only).
    pub build_order: Vec<BuildingId>,
}

impl Default for CommanderProfile {
    fn default() -> Self {
        Self {
            name: "Balanced".to_string(),
            decision_interval_secs: 2.0,
            attack_fraction: 0.6,
            min_garrison: 5,
            safety_margin_percent: 20,
            build_order: vec![
                BuildingId::new("trade_hub"),
                BuildingId::new("factory"),
                BuildingId::new("shield_generator"),
            ],
        }
    }
}

impl CommanderProfile {
    /// Load a profile from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CommanderError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CommanderError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, CommanderError> {
        let profile: CommanderProfile = ron::from_str(ron)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Check that timings and fractions are usable.
    pub fn validate(&self) -> Result<(), CommanderError> {
        let invalid = |reason: String| CommanderError::Invalid {
            profile: self.name.clone(),
            reason,
        };
        if !(self.decision_interval_secs.is_finite() && self.decision_interval_secs >= 0.0) {
            return Err(invalid(format!(
                "decision_interval_secs {} must be a non-negative number",
                self.decision_interval_secs
            )));
        }
        if !(0.0..=1.0).contains(&self.attack_fraction) {
            return Err(invalid(format!(
                "attack_fraction {} must be within 0..=1",
                self.attack_fraction
            )));
        }
        Ok(())
    }

    /// Early pressure: decides often, sends most of every garrison.
    #[must_use]
    pub fn aggressive() -> Self {
        Self {
            name: "Aggressive".to_string(),
            decision_interval_secs: 1.5,
            attack_fraction: 0.8,
            min_garrison: 2,
            safety_margin_percent: 5,
            build_order: vec![BuildingId::new("factory")],
        }
    }

    /// Builds up before committing.
    #[must_use]
    pub fn cautious() -> Self {
        Self {
            name: "Cautious".to_string(),
            decision_interval_secs: 4.0,
            attack_fraction: 0.5,
            min_garrison: 15,
            safety_margin_percent: 50,
            build_order: vec![
                BuildingId::new("shield_generator"),
                BuildingId::new("trade_hub"),
                BuildingId::new("orbital_fortress"),
            ],
        }
    }
}

/// What a commander did on one decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommanderTurn {
    /// Orders queued.
    pub orders: usize,
    /// Buildings constructed.
    pub buildings: usize,
}

/// Plays one side of a session.
#[derive(Debug, Clone)]
pub struct Commander {
    owner: Owner,
    profile: CommanderProfile,
    next_decision: f64,
    next_building: usize,
}

impl Commander {
    /// Commander for `owner`; its first decision happens immediately.
    #[must_use]
    pub fn new(owner: Owner, profile: CommanderProfile) -> Self {
        Self {
            owner,
            profile,
            next_decision: 0.0,
            next_building: 0,
        }
    }

    /// Side this commander plays.
    #[must_use]
    pub const fn owner(&self) -> Owner {
        self.owner
    }

    /// Profile in use.
    #[must_use]
    pub fn profile(&self) -> &CommanderProfile {
        &self.profile
    }

    /// Decide if one is due at the session's current time. Orders are
    /// queued, not launched.
    pub fn act(&mut self, sim: &mut Simulation) -> CommanderTurn {
        let now = sim.now();
        if !sim.is_running() || now < self.next_decision {
            return CommanderTurn::default();
        }
        self.next_decision = now + self.profile.decision_interval_secs.max(0.0);

        let turn = CommanderTurn {
            buildings: self.build(sim),
            orders: self.attack(sim),
        };
        if turn != CommanderTurn::default() {
            tracing::debug!(
                owner = %self.owner,
                orders = turn.orders,
                buildings = turn.buildings,
                "Commander acted"
            );
        }
        turn
    }

    /// Spend income on the build order until money or slots run out.
    fn build(&mut self, sim: &mut Simulation) -> usize {
        // Only the player banks income.
        if self.owner != Owner::Player || self.profile.build_order.is_empty() {
            return 0;
        }

        let mut built = 0;
        let sites: Vec<PlanetId> = sim
            .planets()
            .iter()
            .filter(|p| p.owner == self.owner && p.has_free_slot())
            .map(|p| p.id)
            .collect();

        for site in sites {
            let order = &self.profile.build_order;
            let building = &order[self.next_building % order.len()];
            match sim.construct_building(site, building) {
                Ok(()) => {
                    built += 1;
                    self.next_building += 1;
                }
                Err(GameError::Build(BuildError::InsufficientIncome { .. })) => break,
                Err(error) => {
                    tracing::debug!(%error, planet = %site, "Skipping build site");
                }
            }
        }
        built
    }

    /// Queue attacks from every garrison with units to spare.
    fn attack(&self, sim: &mut Simulation) -> usize {
        let mut sources: Vec<(PlanetId, u32)> = sim
            .planets()
            .iter()
            .filter(|p| p.owner == self.owner && p.units > self.profile.min_garrison)
            .map(|p| (p.id, p.units))
            .collect();
        sources.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut claimed: HashSet<PlanetId> = HashSet::new();
        let mut queued = 0;

        for (source, units) in sources {
            let spare = units - self.profile.min_garrison;
            let sending = (f64::from(spare) * self.profile.attack_fraction).floor() as u32;
            if sending == 0 {
                continue;
            }
            let Some(target) = self.pick_target(sim, source, sending, &claimed) else {
                continue;
            };
            match sim.issue_order(self.owner, source, target, i64::from(sending)) {
                Ok(_) => {
                    claimed.insert(target);
                    queued += 1;
                }
                Err(error) => tracing::debug!(%error, "Commander order refused"),
            }
        }
        queued
    }

    /// Nearest unclaimed enemy or neutral planet that `sending` units would
    /// take with the profile's margin.
    fn pick_target(
        &self,
        sim: &Simulation,
        source: PlanetId,
        sending: u32,
        claimed: &HashSet<PlanetId>,
    ) -> Option<PlanetId> {
        let config = sim.config();
        let origin = sim.planet(source)?;
        let margin = 1.0 + f64::from(self.profile.safety_margin_percent) / 100.0;

        sim.planets()
            .iter()
            .filter(|p| p.owner != self.owner && !claimed.contains(&p.id))
            .filter(|p| {
                let estimate =
                    resolve_battle(sending, self.owner, p, &config.buildings, &config.combat);
                estimate.effective_attacker >= estimate.effective_defender * margin
                    && estimate.attacker_won()
            })
            .min_by(|a, b| world_distance(origin, a).total_cmp(&world_distance(origin, b)))
            .map(|p| p.id)
    }
}
