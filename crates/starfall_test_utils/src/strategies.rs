//! Proptest strategies.
//!
//! These generate random but reproducible inputs for property-based tests
//! of generation, kinematics, production and combat.

use proptest::prelude::*;

use starfall_core::buildings::BuildingId;
use starfall_core::components::{Orbit, Planet};
use starfall_core::factions::Owner;

use crate::fixtures::PlanetBuilder;

/// Canvas sizes from tiny to large, both orientations.
pub fn arb_canvas() -> impl Strategy<Value = (f64, f64)> {
    (50u32..3000, 50u32..3000).prop_map(|(w, h)| (f64::from(w), f64::from(h)))
}

/// Any owner.
pub fn arb_owner() -> impl Strategy<Value = Owner> {
    prop_oneof![Just(Owner::Player), Just(Owner::Ai), Just(Owner::Neutral)]
}

/// Garrison sizes, including empty.
pub fn arb_units() -> impl Strategy<Value = u32> {
    0u32..5_000
}

/// Unit counts across the whole `u32` range, biased toward the extremes
/// that long sessions and saturating merges reach.
pub fn arb_any_units() -> impl Strategy<Value = u32> {
    prop_oneof![
        0u32..5_000,
        any::<u32>(),
        (u32::MAX - 1_000)..=u32::MAX,
    ]
}

/// Circular or elliptical orbit.
pub fn arb_orbit() -> impl Strategy<Value = Orbit> {
    prop_oneof![
        (10.0f64..2000.0).prop_map(|radius| Orbit::Circular { radius }),
        (10.0f64..2000.0, 0.0f64..0.9, 0.0f64..std::f64::consts::TAU)
            .prop_map(|(a, e, rot)| Orbit::elliptical(a, e, rot)),
    ]
}

/// Up to four default-catalog building ids (plus one unknown id).
pub fn arb_buildings() -> impl Strategy<Value = Vec<BuildingId>> {
    prop::collection::vec(
        prop_oneof![
            Just("factory"),
            Just("trade_hub"),
            Just("shield_generator"),
            Just("orbital_fortress"),
            Just("collapsed_mine"),
        ]
        .prop_map(BuildingId::new),
        0..4,
    )
}

/// A single planet with arbitrary orbit, phase, owner, garrison and
/// buildings.
pub fn arb_planet() -> impl Strategy<Value = Planet> {
    (
        arb_orbit(),
        -10.0f64..10.0,
        -0.05f64..0.05,
        arb_owner(),
        arb_units(),
        arb_buildings(),
    )
        .prop_map(|(orbit, angle, speed, owner, units, buildings)| {
            let mut planet = PlanetBuilder::new(0)
                .moving(angle, speed)
                .owned_by(owner, units)
                .slots(4)
                .build();
            planet.orbit = orbit;
            planet.buildings = buildings;
            planet
        })
}

/// A list of planets with ids matching their index.
pub fn arb_planets(max: usize) -> impl Strategy<Value = Vec<Planet>> {
    prop::collection::vec(arb_planet(), 0..=max).prop_map(|mut planets| {
        for (index, planet) in planets.iter_mut().enumerate() {
            planet.id = starfall_core::components::PlanetId(index);
        }
        planets
    })
}
