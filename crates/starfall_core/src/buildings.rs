//! Building catalog and construction.
//!
//! Buildings are static catalog entries. A planet's slots store only the
//! [`BuildingId`], so bonuses are always looked up from the catalog the
//! session was configured with. An id that no longer resolves contributes
//! nothing instead of failing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::Planet;
use crate::economy::PlayerEconomy;
use crate::factions::Owner;

/// String identifier of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingId(pub String);

impl BuildingId {
    /// Create a building id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BuildingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A buildable structure.
///
/// # Example RON
///
/// ```ron
/// BuildingData(
///     id: "shield_generator",
///     name: "Shield Generator",
///     cost: 60,
///     defense_bonus_percent: 25,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingData {
    /// Unique identifier.
    pub id: BuildingId,
    /// Display name.
    pub name: String,
    /// Income spent to construct it.
    pub cost: u32,
    /// Extra units per production tick.
    #[serde(default)]
    pub unit_bonus: u32,
    /// Extra income per production tick (player planets only).
    #[serde(default)]
    pub income_bonus: u32,
    /// Defender strength bonus in whole percent.
    #[serde(default)]
    pub defense_bonus_percent: u32,
}

/// Summed bonuses of a planet's buildings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildingBonuses {
    /// Extra units per tick.
    pub units: u32,
    /// Extra income per tick.
    pub income: u32,
    /// Extra defense in whole percent.
    pub defense_percent: u32,
}

/// The set of buildings available in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingCatalog {
    entries: Vec<BuildingData>,
}

impl Default for BuildingCatalog {
    fn default() -> Self {
        Self::new(vec![
            BuildingData {
                id: BuildingId::new("factory"),
                name: "Factory".to_string(),
                cost: 50,
                unit_bonus: 2,
                income_bonus: 0,
                defense_bonus_percent: 0,
            },
            BuildingData {
                id: BuildingId::new("trade_hub"),
                name: "Trade Hub".to_string(),
                cost: 40,
                unit_bonus: 0,
                income_bonus: 5,
                defense_bonus_percent: 0,
            },
            BuildingData {
                id: BuildingId::new("shield_generator"),
                name: "Shield Generator".to_string(),
                cost: 60,
                unit_bonus: 0,
                income_bonus: 0,
                defense_bonus_percent: 25,
            },
            BuildingData {
                id: BuildingId::new("orbital_fortress"),
                name: "Orbital Fortress".to_string(),
                cost: 120,
                unit_bonus: 1,
                income_bonus: 0,
                defense_bonus_percent: 50,
            },
        ])
    }
}

impl BuildingCatalog {
    /// Create a catalog from entries. Later duplicates of an id are ignored
    /// by lookups.
    #[must_use]
    pub fn new(entries: Vec<BuildingData>) -> Self {
        Self { entries }
    }

    /// An empty catalog.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Look up a building.
    #[must_use]
    pub fn get(&self, id: &BuildingId) -> Option<&BuildingData> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// All entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &BuildingData> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum the bonuses of the given building slots.
    ///
    /// Ids missing from the catalog count as zero.
    #[must_use]
    pub fn bonuses_for(&self, buildings: &[BuildingId]) -> BuildingBonuses {
        buildings
            .iter()
            .fold(BuildingBonuses::default(), |mut total, id| {
                match self.get(id) {
                    Some(data) => {
                        total.units = total.units.saturating_add(data.unit_bonus);
                        total.income = total.income.saturating_add(data.income_bonus);
                        total.defense_percent = total
                            .defense_percent
                            .saturating_add(data.defense_bonus_percent);
                    }
                    None => {
                        tracing::warn!(building = %id, "Building missing from catalog, ignoring");
                    }
                }
                total
            })
    }
}

/// Reasons a building cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The building id is not in the catalog.
    #[error("unknown building '{0}'")]
    UnknownBuilding(BuildingId),
    /// Only the player's own planets can be built on.
    #[error("planet {0} is not owned by the player")]
    NotPlayerOwned(String),
    /// Every slot is occupied.
    #[error("planet {planet} has no free building slots ({slots} total)")]
    NoFreeSlot {
        /// Planet name.
        planet: String,
        /// Slot capacity.
        slots: usize,
    },
    /// Not enough income banked.
    #[error("insufficient income: need {required}, have {available}")]
    InsufficientIncome {
        /// Cost of the building.
        required: u64,
        /// Income available.
        available: u64,
    },
}

/// Construct a building on a player planet, paying from the player's income.
///
/// Nothing is changed when an error is returned.
pub fn construct_building(
    planet: &mut Planet,
    catalog: &BuildingCatalog,
    economy: &mut PlayerEconomy,
    id: &BuildingId,
) -> Result<(), BuildError> {
    let data = catalog
        .get(id)
        .ok_or_else(|| BuildError::UnknownBuilding(id.clone()))?;

    if planet.owner != Owner::Player {
        return Err(BuildError::NotPlayerOwned(planet.name.clone()));
    }

    if !planet.has_free_slot() {
        return Err(BuildError::NoFreeSlot {
            planet: planet.name.clone(),
            slots: planet.building_slots,
        });
    }

    let cost = u64::from(data.cost);
    if !economy.spend(cost) {
        return Err(BuildError::InsufficientIncome {
            required: cost,
            available: economy.income,
        });
    }

    planet.buildings.push(data.id.clone());
    tracing::debug!(planet = %planet.name, building = %data.id, cost, "Building constructed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Color, Orbit, PlanetId};

    fn player_planet(slots: usize) -> Planet {
        Planet {
            id: PlanetId(0),
            name: "Ceres".to_string(),
            radius: 8.0,
            orbit: Orbit::Circular { radius: 120.0 },
            angle: 0.0,
            speed: 0.002,
            owner: Owner::Player,
            units: 10,
            buildings: Vec::new(),
            building_slots: slots,
            color: Color::default(),
        }
    }

    #[test]
    fn test_bonuses_sum_over_slots() {
        let catalog = BuildingCatalog::default();
        let bonuses = catalog.bonuses_for(&[
            BuildingId::new("factory"),
            BuildingId::new("factory"),
            BuildingId::new("shield_generator"),
        ]);
        assert_eq!(bonuses.units, 4);
        assert_eq!(bonuses.income, 0);
        assert_eq!(bonuses.defense_percent, 25);
    }

    #[test]
    fn test_missing_building_contributes_nothing() {
        let catalog = BuildingCatalog::default();
        let bonuses = catalog.bonuses_for(&[
            BuildingId::new("demolished_shipyard"),
            BuildingId::new("trade_hub"),
        ]);
        assert_eq!(
            bonuses,
            BuildingBonuses {
                units: 0,
                income: 5,
                defense_percent: 0,
            }
        );
    }

    #[test]
    fn test_construct_spends_income() {
        let catalog = BuildingCatalog::default();
        let mut economy = PlayerEconomy::new(100);
        let mut planet = player_planet(2);

        construct_building(
            &mut planet,
            &catalog,
            &mut economy,
            &BuildingId::new("factory"),
        )
        .unwrap();

        assert_eq!(economy.income, 50);
        assert_eq!(planet.buildings, vec![BuildingId::new("factory")]);
    }

    #[test]
    fn test_construct_rejects_full_planet() {
        let catalog = BuildingCatalog::default();
        let mut economy = PlayerEconomy::new(500);
        let mut planet = player_planet(1);
        let id = BuildingId::new("trade_hub");

        construct_building(&mut planet, &catalog, &mut economy, &id).unwrap();
        let err = construct_building(&mut planet, &catalog, &mut economy, &id).unwrap_err();

        assert!(matches!(err, BuildError::NoFreeSlot { slots: 1, .. }));
        assert_eq!(economy.income, 460);
    }

    #[test]
    fn test_construct_rejects_when_broke() {
        let catalog = BuildingCatalog::default();
        let mut economy = PlayerEconomy::new(10);
        let mut planet = player_planet(2);

        let err = construct_building(
            &mut planet,
            &catalog,
            &mut economy,
            &BuildingId::new("orbital_fortress"),
        )
        .unwrap_err();

        assert_eq!(
            err,
            BuildError::InsufficientIncome {
                required: 120,
                available: 10,
            }
        );
        assert!(planet.buildings.is_empty());
    }

    #[test]
    fn test_construct_rejects_foreign_planet() {
        let catalog = BuildingCatalog::default();
        let mut economy = PlayerEconomy::new(500);
        let mut planet = player_planet(2);
        planet.owner = Owner::Ai;

        let err = construct_building(
            &mut planet,
            &catalog,
            &mut economy,
            &BuildingId::new("factory"),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::NotPlayerOwned(_)));
        assert_eq!(economy.income, 500);
    }

    #[test]
    fn test_catalog_from_ron() {
        let catalog: BuildingCatalog = ron::from_str(
            r#"[
                (id: "mine", name: "Mine", cost: 30, income_bonus: 3),
            ]"#,
        )
        .unwrap();
        let mine = catalog.get(&BuildingId::new("mine")).unwrap();
        assert_eq!(mine.income_bonus, 3);
        assert_eq!(mine.unit_bonus, 0);
    }
}
