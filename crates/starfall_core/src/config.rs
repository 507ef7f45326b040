//! Session configuration.
//!
//! Every tunable number of the simulation lives here: generation ranges,
//! production rates, combat bonuses, fleet speed, camera limits and the
//! building catalog. A [`GameConfig`] is built once (from defaults or a RON
//! file) and then only read.
//!
//! Generation lengths are expressed in *base units*, where one base unit
//! is 1% of the smaller canvas dimension. This keeps a system's layout the
//! same shape on any screen size.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buildings::BuildingCatalog;

/// Error type for configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found.
    #[error("Config file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// A value is out of range or a range is inverted.
    #[error("Invalid config value '{field}': {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Procedural generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Smallest star radius, in base units.
    pub min_star_multiplier: f64,
    /// Largest star radius, in base units.
    pub max_star_multiplier: f64,
    /// Fewest planets to attempt.
    pub min_planets: u32,
    /// Most planets to attempt.
    pub max_planets: u32,
    /// Gap between the star's surface and the nearest allowed orbit, in base units.
    pub star_margin: f64,
    /// Outermost orbit as a multiple of half the larger canvas dimension.
    pub extent_multiplier: f64,
    /// Outermost orbit as a multiple of the star radius (whichever is larger wins).
    pub star_extent_multiplier: f64,
    /// Smallest planet size step.
    pub min_planet_radius: u32,
    /// Largest planet size step.
    pub max_planet_radius: u32,
    /// Base units per planet size step.
    pub planet_radius_scale: f64,
    /// Size steps per building slot.
    pub radius_per_slot: u32,
    /// Upper bound on building slots.
    pub max_building_slots: usize,
    /// Smallest gap between consecutive orbits, in base units.
    pub min_orbit_spacing: f64,
    /// Largest gap between consecutive orbits, in base units.
    pub max_orbit_spacing: f64,
    /// Extra clearance between neighbouring planets' discs, in base units.
    pub orbit_clearance: f64,
    /// Chance that an orbit is elliptical.
    pub elliptical_probability: f64,
    /// Smallest eccentricity of elliptical orbits.
    pub min_eccentricity: f64,
    /// Largest eccentricity of elliptical orbits.
    pub max_eccentricity: f64,
    /// Slowest angular speed, radians per frame.
    pub min_orbit_speed: f64,
    /// Fastest angular speed, radians per frame.
    pub max_orbit_speed: f64,
    /// Chance that a planet starts under AI control.
    pub ai_planet_probability: f64,
    /// Garrison of AI planets at start.
    pub ai_starting_units: u32,
    /// Garrison of neutral planets at start.
    pub neutral_starting_units: u32,
    /// Garrison of the player's home planet once assigned.
    pub player_starting_units: u32,
    /// Planet names, shuffled per session.
    pub name_pool: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            min_star_multiplier: 4.0,
            max_star_multiplier: 7.0,
            min_planets: 5,
            max_planets: 12,
            star_margin: 4.0,
            extent_multiplier: 1.4,
            star_extent_multiplier: 8.0,
            min_planet_radius: 4,
            max_planet_radius: 10,
            planet_radius_scale: 0.3,
            radius_per_slot: 3,
            max_building_slots: 4,
            min_orbit_spacing: 6.0,
            max_orbit_spacing: 12.0,
            orbit_clearance: 2.0,
            elliptical_probability: 0.35,
            min_eccentricity: 0.05,
            max_eccentricity: 0.25,
            min_orbit_speed: 0.002,
            max_orbit_speed: 0.008,
            ai_planet_probability: 0.3,
            ai_starting_units: 20,
            neutral_starting_units: 10,
            player_starting_units: 30,
            name_pool: default_name_pool(),
        }
    }
}

fn default_name_pool() -> Vec<String> {
    [
        "Aurelia", "Boreas", "Calyx", "Dione", "Erebus", "Fornax", "Gaspra", "Halcyon",
        "Ixion", "Juno", "Kallisto", "Lethe", "Mimas", "Nereid", "Oberon", "Pallas",
        "Quaoar", "Rhea", "Sedna", "Tethys",
    ]
    .iter()
    .map(|name| (*name).to_string())
    .collect()
}

/// Per-tick production rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionRates {
    /// Units every producing planet gains per tick before bonuses.
    pub base_units_per_tick: u32,
    /// Income every player planet yields per tick before bonuses.
    pub base_income_per_tick: u32,
    /// Seconds between production ticks.
    pub interval_secs: f64,
}

impl Default for ProductionRates {
    fn default() -> Self {
        Self {
            base_units_per_tick: 1,
            base_income_per_tick: 2,
            interval_secs: 5.0,
        }
    }
}

/// Flat combat modifiers applied to every battle, in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatBonuses {
    /// Bonus for the arriving fleet.
    pub attacker_bonus_percent: u32,
    /// Bonus for the garrison, before building bonuses.
    pub defender_bonus_percent: u32,
}

impl Default for CombatBonuses {
    fn default() -> Self {
        Self {
            attacker_bonus_percent: 0,
            defender_bonus_percent: 10,
        }
    }
}

/// Fleet movement parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// World units travelled per second.
    pub travel_speed: f64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self { travel_speed: 60.0 }
    }
}

/// Camera limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Furthest zoom out.
    pub min_zoom: f64,
    /// Closest zoom in.
    pub max_zoom: f64,
    /// Extra screen pixels around a planet that still count as a hit.
    pub pick_tolerance: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.25,
            max_zoom: 4.0,
            pick_tolerance: 4.0,
        }
    }
}

/// Complete, frozen configuration of a session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// System generation.
    pub generation: GenerationConfig,
    /// Production tick.
    pub production: ProductionRates,
    /// Combat modifiers.
    pub combat: CombatBonuses,
    /// Fleet travel.
    pub fleets: FleetConfig,
    /// Camera limits.
    pub camera: CameraConfig,
    /// Available buildings.
    pub buildings: BuildingCatalog,
}

impl GameConfig {
    /// Load a configuration from a RON file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse a configuration from a RON string and validate it.
    pub fn from_ron_str(ron: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges and probabilities.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.generation;
        ordered("star_multiplier", g.min_star_multiplier, g.max_star_multiplier)?;
        ordered("planets", f64::from(g.min_planets), f64::from(g.max_planets))?;
        ordered(
            "planet_radius",
            f64::from(g.min_planet_radius),
            f64::from(g.max_planet_radius),
        )?;
        ordered("orbit_spacing", g.min_orbit_spacing, g.max_orbit_spacing)?;
        ordered("eccentricity", g.min_eccentricity, g.max_eccentricity)?;
        ordered("orbit_speed", g.min_orbit_speed, g.max_orbit_speed)?;
        ordered("zoom", self.camera.min_zoom, self.camera.max_zoom)?;

        probability("elliptical_probability", g.elliptical_probability)?;
        probability("ai_planet_probability", g.ai_planet_probability)?;

        if g.min_eccentricity < 0.0 || g.max_eccentricity >= 1.0 {
            return Err(ConfigError::Invalid {
                field: "eccentricity",
                reason: "must lie in [0, 1)".to_string(),
            });
        }
        if g.min_star_multiplier <= 0.0 || g.min_planet_radius == 0 {
            return Err(ConfigError::Invalid {
                field: "sizes",
                reason: "star and planet sizes must be positive".to_string(),
            });
        }
        positive("planet_radius_scale", g.planet_radius_scale)?;
        positive("travel_speed", self.fleets.travel_speed)?;
        positive("interval_secs", self.production.interval_secs)?;
        positive("min_zoom", self.camera.min_zoom)?;
        Ok(())
    }
}

fn ordered(field: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min.is_nan() || max.is_nan() || min > max {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("minimum {min} exceeds maximum {max}"),
        });
    }
    Ok(())
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is not a probability"),
        });
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must be positive"),
        });
    }
    Ok(())
}
