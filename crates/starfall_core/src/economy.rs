//! Economy and production.
//!
//! Every production tick, each planet held by the player or the AI gains
//! its base unit rate plus the unit bonus of its buildings. Player planets
//! also pay base income plus building income into the shared player pool.
//! Neutral planets never produce.
//!
//! Production is a monotonic accumulator: nothing here ever decreases a
//! garrison or the income pool. Counts saturate instead of wrapping.

use serde::{Deserialize, Serialize};

use crate::buildings::BuildingCatalog;
use crate::components::Planet;
use crate::config::ProductionRates;
use crate::factions::Owner;

/// The player's shared income pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerEconomy {
    /// Banked income.
    pub income: u64,
}

impl PlayerEconomy {
    /// Create an economy with a starting balance.
    #[must_use]
    pub const fn new(income: u64) -> Self {
        Self { income }
    }

    /// Add income.
    pub fn deposit(&mut self, amount: u64) {
        self.income = self.income.saturating_add(amount);
    }

    /// Spend income if available.
    ///
    /// Returns true if the transaction succeeded.
    pub fn spend(&mut self, amount: u64) -> bool {
        if self.income >= amount {
            self.income -= amount;
            true
        } else {
            false
        }
    }

    /// Check if the player can afford a cost.
    #[must_use]
    pub const fn can_afford(&self, cost: u64) -> bool {
        self.income >= cost
    }
}

/// What a production tick handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductionReport {
    /// Units added to player planets.
    pub player_units: u64,
    /// Units added to AI planets.
    pub ai_units: u64,
    /// Income added to the player pool.
    pub income: u64,
    /// Planets that produced.
    pub producing_planets: usize,
}

/// Run one production tick over all planets.
pub fn production_tick(
    planets: &mut [Planet],
    catalog: &BuildingCatalog,
    rates: &ProductionRates,
    economy: &mut PlayerEconomy,
) -> ProductionReport {
    let mut report = ProductionReport::default();

    for planet in planets.iter_mut().filter(|p| p.owner.is_producer()) {
        let bonuses = catalog.bonuses_for(&planet.buildings);
        let units = rates.base_units_per_tick.saturating_add(bonuses.units);
        planet.units = planet.units.saturating_add(units);
        report.producing_planets += 1;

        match planet.owner {
            Owner::Player => {
                let income = rates.base_income_per_tick.saturating_add(bonuses.income);
                economy.deposit(u64::from(income));
                report.player_units += u64::from(units);
                report.income += u64::from(income);
            }
            Owner::Ai => report.ai_units += u64::from(units),
            Owner::Neutral => {}
        }
    }

    tracing::debug!(
        player_units = report.player_units,
        ai_units = report.ai_units,
        income = report.income,
        "Production tick"
    );

    report
}

/// Turns elapsed session time into production ticks.
///
/// The driver polls this each frame; it reports how many whole intervals
/// have elapsed since the last poll so slow frames never skip a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductionTimer {
    interval: f64,
    next_due: f64,
}

impl ProductionTimer {
    /// Create a timer whose first tick is due one interval after `start`.
    #[must_use]
    pub fn new(interval_secs: f64, start: f64) -> Self {
        Self {
            interval: interval_secs,
            next_due: start + interval_secs,
        }
    }

    /// Number of ticks due at `now`; advances the schedule past them.
    pub fn poll(&mut self, now: f64) -> u32 {
        if !(self.interval > 0.0) {
            return 0;
        }
        let mut due = 0;
        while now >= self.next_due {
            self.next_due += self.interval;
            due += 1;
        }
        due
    }

    /// Restart the schedule from `now`.
    pub fn reset(&mut self, now: f64) {
        self.next_due = now + self.interval;
    }

    /// Time of the next tick.
    #[must_use]
    pub const fn next_due(&self) -> f64 {
        self.next_due
    }
}
