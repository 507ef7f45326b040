//! Deterministic invasion combat.
//!
//! A battle is a single calculation, no rounds and no randomness:
//!
//! ```text
//! Effective Attacker = Attackers × (1 + Attacker Bonus)
//! Effective Defender = Garrison × (1 + Defender Bonus + Building Defense)
//!
//! Attacker wins (strictly stronger):
//!     Losses    = round(Effective Defender / (1 + Attacker Bonus))
//!     Planet    → attacker's owner, garrison = Attackers - Losses
//! Defender wins (stronger or tied):
//!     Losses    = round(Effective Attacker / (1 + Defender Bonus + Building Defense))
//!     Planet    → same owner, garrison = Garrison - Losses
//! ```
//!
//! Bonuses are whole percentages. Strengths are kept as integers scaled by
//! 100 so the comparison is exact for any garrison size, and the loss
//! division runs in fixed-point so it rounds identically on every platform.

use serde::{Deserialize, Serialize};

use crate::buildings::BuildingCatalog;
use crate::components::{Planet, PlanetId};
use crate::config::CombatBonuses;
use crate::factions::Owner;
use crate::math::Fixed;

/// Result of one battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// Contested planet.
    pub planet: PlanetId,
    /// Contested planet's name.
    pub planet_name: String,
    /// Owner of the arriving fleet.
    pub attacker: Owner,
    /// Owner of the planet before the battle.
    pub defender: Owner,
    /// Units in the arriving fleet.
    pub attacker_units: u32,
    /// Garrison before the battle.
    pub defender_units: u32,
    /// Attacker strength after bonuses.
    pub effective_attacker: f64,
    /// Defender strength after bonuses.
    pub effective_defender: f64,
    /// Units the winning side lost.
    pub losses: u32,
    /// Garrison left on the planet after the battle.
    pub remaining_units: u32,
    /// Owner of the planet after the battle.
    pub winner: Owner,
}

impl BattleOutcome {
    /// Whether the planet changed hands.
    #[must_use]
    pub fn attacker_won(&self) -> bool {
        self.winner == self.attacker && self.attacker != self.defender
    }

    /// Write the result onto the contested planet.
    pub fn apply_to(&self, planet: &mut Planet) {
        planet.owner = self.winner;
        planet.units = self.remaining_units;
    }
}

/// Combat strength scaled by 100: `units × (100 + bonus percent)`.
///
/// Exact for every `u32` pair, so comparisons never clip.
fn scaled_strength(units: u32, factor_percent: u32) -> u64 {
    u64::from(units) * u64::from(factor_percent)
}

/// `round(scaled_strength / factor_percent)`, the loser's strength expressed
/// in the winner's units. Halves round away from zero.
fn losses_against(scaled_strength: u64, factor_percent: u32) -> u32 {
    (Fixed::from_num(scaled_strength) / Fixed::from_num(factor_percent))
        .round()
        .saturating_to_num::<u32>()
}

/// Resolve an invasion of `defender` by `attacker_units` belonging to `attacker`.
///
/// Pure: the planet is not modified. Use [`BattleOutcome::apply_to`] or
/// [`invade`] to commit the result.
#[must_use]
pub fn resolve_battle(
    attacker_units: u32,
    attacker: Owner,
    defender: &Planet,
    catalog: &BuildingCatalog,
    bonuses: &CombatBonuses,
) -> BattleOutcome {
    let building_defense = catalog.bonuses_for(&defender.buildings).defense_percent;

    let attacker_factor = 100u32.saturating_add(bonuses.attacker_bonus_percent);
    let defender_factor = 100u32
        .saturating_add(bonuses.defender_bonus_percent)
        .saturating_add(building_defense);

    let effective_attacker = scaled_strength(attacker_units, attacker_factor);
    let effective_defender = scaled_strength(defender.units, defender_factor);

    let (winner, losses, remaining_units) = if effective_attacker > effective_defender {
        let losses = losses_against(effective_defender, attacker_factor);
        (attacker, losses, attacker_units.saturating_sub(losses))
    } else {
        let losses = losses_against(effective_attacker, defender_factor);
        (defender.owner, losses, defender.units.saturating_sub(losses))
    };

    BattleOutcome {
        planet: defender.id,
        planet_name: defender.name.clone(),
        attacker,
        defender: defender.owner,
        attacker_units,
        defender_units: defender.units,
        effective_attacker: effective_attacker as f64 / 100.0,
        effective_defender: effective_defender as f64 / 100.0,
        losses,
        remaining_units,
        winner,
    }
}

/// Resolve a battle and apply it to the planet.
pub fn invade(
    attacker_units: u32,
    attacker: Owner,
    defender: &mut Planet,
    catalog: &BuildingCatalog,
    bonuses: &CombatBonuses,
) -> BattleOutcome {
    let outcome = resolve_battle(attacker_units, attacker, defender, catalog, bonuses);
    outcome.apply_to(defender);

    if outcome.attacker_won() {
        tracing::info!(
            planet = %outcome.planet_name,
            new_owner = %outcome.winner,
            garrison = outcome.remaining_units,
            "Planet captured"
        );
    } else {
        tracing::debug!(
            planet = %outcome.planet_name,
            garrison = outcome.remaining_units,
            "Invasion repelled"
        );
    }

    outcome
}
