//! Star system data: the star, planets and their orbits.
//!
//! Planets live in a single ordered `Vec` owned by the simulation. A
//! [`PlanetId`] is the planet's index in that list, which never changes
//! after generation, so fleets and orders can refer to planets without
//! borrowing them.

use serde::{Deserialize, Serialize};

use crate::buildings::BuildingId;
use crate::factions::Owner;

/// Stable identifier for a planet: its index in orbit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlanetId(pub usize);

impl PlanetId {
    /// Index into the planet list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for PlanetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The central star. One per session, immutable after generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Star {
    /// Radius in world units.
    pub radius: f64,
}

/// Orbit shape, centered on the star.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Orbit {
    /// Circle of the given radius.
    Circular {
        /// Orbit radius in world units.
        radius: f64,
    },
    /// Ellipse centered on the star, rotated by `rotation_angle`.
    Elliptical {
        /// Half the long axis.
        semi_major_axis: f64,
        /// Half the short axis, `a * sqrt(1 - e²)`.
        semi_minor_axis: f64,
        /// Eccentricity in `[0, 1)`.
        eccentricity: f64,
        /// Rotation of the long axis in radians.
        rotation_angle: f64,
    },
}

impl Orbit {
    /// Build an elliptical orbit, deriving the semi-minor axis.
    #[must_use]
    pub fn elliptical(semi_major_axis: f64, eccentricity: f64, rotation_angle: f64) -> Self {
        Self::Elliptical {
            semi_major_axis,
            semi_minor_axis: semi_major_axis * (1.0 - eccentricity * eccentricity).sqrt(),
            eccentricity,
            rotation_angle,
        }
    }

    /// The orbit radius used for spacing: the radius of a circle or the
    /// semi-major axis of an ellipse.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        match *self {
            Self::Circular { radius } => radius,
            Self::Elliptical {
                semi_major_axis, ..
            } => semi_major_axis,
        }
    }

    /// Whether this orbit is an ellipse.
    #[must_use]
    pub const fn is_elliptical(&self) -> bool {
        matches!(self, Self::Elliptical { .. })
    }
}

/// Cosmetic planet color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Create a new color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A planet in the star system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// Index in the ordered planet list.
    pub id: PlanetId,
    /// Unique name within the session.
    pub name: String,
    /// Render and pick radius in world units.
    pub radius: f64,
    /// Orbit shape.
    pub orbit: Orbit,
    /// Current orbital phase in radians.
    pub angle: f64,
    /// Signed angular velocity in radians per frame.
    pub speed: f64,
    /// Current owner.
    pub owner: Owner,
    /// Garrisoned units.
    pub units: u32,
    /// Constructed buildings, in construction order.
    pub buildings: Vec<BuildingId>,
    /// Number of building slots, derived from the radius at generation.
    pub building_slots: usize,
    /// Cosmetic color.
    pub color: Color,
}

impl Planet {
    /// Number of unoccupied building slots.
    #[must_use]
    pub fn free_slots(&self) -> usize {
        self.building_slots.saturating_sub(self.buildings.len())
    }

    /// Whether another building fits.
    #[must_use]
    pub fn has_free_slot(&self) -> bool {
        self.free_slots() > 0
    }

    /// Orbit radius (circle radius or semi-major axis).
    #[must_use]
    pub const fn orbit_radius(&self) -> f64 {
        self.orbit.radius()
    }
}
