//! Camera and viewport transform.
//!
//! The star sits at the world origin. On screen it appears at the canvas
//! center shifted by the pan `offset`, and world distances are multiplied
//! by `zoom`:
//!
//! ```text
//! screen = center + offset + world × zoom
//! world  = (screen - center - offset) / zoom
//! ```

use serde::{Deserialize, Serialize};

use crate::components::{Planet, PlanetId};
use crate::config::CameraConfig;
use crate::math::Vec2;
use crate::orbit::planet_position;

/// Maps between world and screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Canvas width in pixels.
    pub width: f64,
    /// Canvas height in pixels.
    pub height: f64,
    /// Pan offset in pixels.
    pub offset: Vec2,
    /// Pixels per world unit.
    pub zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    pick_tolerance: f64,
}

fn zoom_limits(config: &CameraConfig) -> (f64, f64) {
    let (min, max) = (config.min_zoom, config.max_zoom);
    if min.is_finite() && max.is_finite() && min > 0.0 && min <= max {
        (min, max)
    } else {
        let fallback = CameraConfig::default();
        (fallback.min_zoom, fallback.max_zoom)
    }
}

impl Viewport {
    /// Viewport for a canvas, centered on the star at zoom 1 (clamped to the
    /// configured limits).
    ///
    /// Unordered, non-finite or non-positive zoom limits fall back to the
    /// defaults.
    #[must_use]
    pub fn new(width: f64, height: f64, config: &CameraConfig) -> Self {
        let (min_zoom, max_zoom) = zoom_limits(config);
        Self {
            width,
            height,
            offset: Vec2::ZERO,
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
            pick_tolerance: config.pick_tolerance,
        }
    }

    /// Canvas center in screen space.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Change the canvas size. Pan and zoom are kept.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Screen position of a world point.
    #[must_use]
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.center() + self.offset + world.scale(self.zoom)
    }

    /// World position under a screen point.
    #[must_use]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.center() - self.offset).scale(1.0 / self.zoom)
    }

    /// Multiply the zoom by `factor`, keeping the world point under
    /// `screen` in place.
    pub fn zoom_at(&mut self, screen: Vec2, factor: f64) {
        if !(factor > 0.0) {
            return;
        }
        let anchor = self.screen_to_world(screen);
        self.zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        self.offset = screen - self.center() - anchor.scale(self.zoom);
    }

    /// Shift the view by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset = self.offset + Vec2::new(dx, dy);
    }

    /// Back to the star at the canvas center, zoom 1.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }

    /// Planet under a screen point.
    ///
    /// A planet is hit when the point falls within its radius plus the pick
    /// tolerance (in pixels, so it stays the same size at any zoom). When
    /// discs overlap the planet whose center is nearest wins.
    #[must_use]
    pub fn planet_at(&self, screen: Vec2, planets: &[Planet]) -> Option<PlanetId> {
        let world = self.screen_to_world(screen);
        let tolerance = self.pick_tolerance / self.zoom;

        planets
            .iter()
            .map(|planet| (planet.id, planet.radius, planet_position(planet).distance(world)))
            .filter(|&(_, radius, distance)| distance <= radius + tolerance)
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(id, _, _)| id)
    }
}
