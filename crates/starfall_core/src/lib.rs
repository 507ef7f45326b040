//! # Starfall Core
//!
//! Simulation core for a single-star real-time strategy game.
//!
//! This crate contains the game rules and nothing else:
//! - No rendering
//! - No input handling
//! - No wall clock (the driver passes session time in)
//! - Randomness only through a caller-supplied or seeded generator
//!
//! A driver generates a [`Simulation`](simulation::Simulation), feeds it
//! frames, production ticks and player orders, and reads back a
//! serializable snapshot to draw.
//!
//! ## Crate Structure
//!
//! - [`generation`] - Procedural star system generation
//! - [`orbit`] - Orbital kinematics
//! - [`economy`] - Production ticks and player income
//! - [`buildings`] - Building catalog and construction
//! - [`fleets`] - Orders, fleet travel and arrivals
//! - [`combat`] - Deterministic invasion resolution
//! - [`camera`] - World/screen viewport transform
//! - [`simulation`] - Session state and frame driver
//! - [`config`] - RON-loadable game configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod buildings;
pub mod camera;
pub mod combat;
pub mod components;
pub mod config;
pub mod economy;
pub mod error;
pub mod factions;
pub mod fleets;
pub mod generation;
pub mod math;
pub mod orbit;
pub mod simulation;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::buildings::{BuildError, BuildingCatalog, BuildingData, BuildingId};
    pub use crate::camera::Viewport;
    pub use crate::combat::BattleOutcome;
    pub use crate::components::*;
    pub use crate::config::{
        CameraConfig, CombatBonuses, FleetConfig, GameConfig, GenerationConfig, ProductionRates,
    };
    pub use crate::economy::{PlayerEconomy, ProductionReport, ProductionTimer};
    pub use crate::error::{GameError, Result};
    pub use crate::factions::Owner;
    pub use crate::fleets::{ArrivalEvent, Fleet, FleetId, Mission, OrderError, PendingOrder};
    pub use crate::generation::GeneratedSystem;
    pub use crate::math::{Fixed, Vec2};
    pub use crate::simulation::{FrameEvents, Outcome, Phase, RenderSnapshot, Simulation};
}
