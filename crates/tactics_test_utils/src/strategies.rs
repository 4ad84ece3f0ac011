//! Property-based testing strategies.
//!
//! Positions are generated on a quarter-tile grid so that generated worlds
//! stay exactly representable in fixed point.

use proptest::prelude::*;
use tactics_core::math::{Fixed, Vec2Fixed};
use tactics_core::orders::{ArmyAssessment, NearbyArmy};
use tactics_core::unit::{Alliance, Unit, UnitTag};
use tactics_core::unit_type::{Race, UnitType};
use tactics_core::world::Situation;

/// First tag used for generated enemy units.
pub const ENEMY_TAG_BASE: UnitTag = 10_000;

/// Combat unit types an own army is drawn from.
pub const OWN_ARMY_TYPES: &[UnitType] = &[
    UnitType::Marine,
    UnitType::Marauder,
    UnitType::Ghost,
    UnitType::Medivac,
    UnitType::SiegeTank,
    UnitType::VikingFighter,
    UnitType::Raven,
];

/// Unit types an enemy force is drawn from.
pub const ENEMY_TYPES: &[UnitType] = &[
    UnitType::Zergling,
    UnitType::Roach,
    UnitType::Hydralisk,
    UnitType::Queen,
    UnitType::Drone,
    UnitType::Hatchery,
    UnitType::SporeCrawler,
];

fn quarter(n: i32) -> Fixed {
    Fixed::from_num(n) / 4
}

/// A fixed-point value in `[lo, hi]` on a 1/4 grid.
pub fn arb_fixed(lo: i32, hi: i32) -> impl Strategy<Value = Fixed> {
    (lo * 4..=hi * 4).prop_map(quarter)
}

/// A point inside the square `[-extent, extent]²`.
pub fn arb_position(extent: i32) -> impl Strategy<Value = Vec2Fixed> {
    let coord = -extent * 4..=extent * 4;
    (coord.clone(), coord).prop_map(|(x, y)| Vec2Fixed::new(quarter(x), quarter(y)))
}

/// A movement speed between standing still and faster than any real unit.
pub fn arb_speed() -> impl Strategy<Value = Fixed> {
    arb_fixed(0, 8)
}

fn arb_units(
    types: &'static [UnitType],
    alliance: Alliance,
    first_tag: UnitTag,
    max_units: usize,
    extent: i32,
) -> impl Strategy<Value = Vec<Unit>> {
    let unit = (
        prop::sample::select(types),
        arb_position(extent),
        1u32..=100,
    );
    prop::collection::vec(unit, 0..=max_units).prop_map(move |specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (unit_type, position, percent))| {
                let unit = Unit::new(first_tag + i as UnitTag, unit_type, alliance, position);
                let health = (unit.health_max * percent / 100).max(1);
                unit.with_health(health)
            })
            .collect()
    })
}

/// Own combat units with unique tags starting at 1.
pub fn arb_own_army(max_units: usize, extent: i32) -> impl Strategy<Value = Vec<Unit>> {
    arb_units(OWN_ARMY_TYPES, Alliance::Own, 1, max_units, extent)
}

/// Enemy units with unique tags starting at [`ENEMY_TAG_BASE`].
pub fn arb_enemy_units(max_units: usize, extent: i32) -> impl Strategy<Value = Vec<Unit>> {
    arb_units(ENEMY_TYPES, Alliance::Enemy, ENEMY_TAG_BASE, max_units, extent)
}

/// Any macro situation.
pub fn arb_situation() -> impl Strategy<Value = Situation> {
    prop_oneof![
        Just(Situation::Stable),
        Just(Situation::UnderAttack),
        Just(Situation::BunkerRush),
        Just(Situation::CannonRush),
    ]
}

/// Any opponent race.
pub fn arb_race() -> impl Strategy<Value = Race> {
    prop_oneof![
        Just(Race::Terran),
        Just(Race::Zerg),
        Just(Race::Protoss),
        Just(Race::Random),
    ]
}

/// An arbitrary but internally consistent assessment for decision tests.
pub fn arb_assessment() -> impl Strategy<Value = ArmyAssessment> {
    let own = (
        arb_fixed(0, 120),
        arb_fixed(0, 40),
        arb_fixed(0, 40),
        arb_fixed(0, 60),
        arb_fixed(0, 1),
        0u32..6,
        arb_fixed(0, 1),
        0u32..24,
        any::<bool>(),
        arb_fixed(0, 1),
    );
    let local = (
        arb_fixed(0, 80),
        arb_fixed(0, 40),
        0u32..20,
        0u32..10,
        arb_fixed(0, 20),
        arb_fixed(0, 100),
    );
    let world = (
        arb_situation(),
        arb_race(),
        prop::option::of(arb_fixed(0, 80)),
        arb_fixed(0, 40),
        prop::option::of(arb_fixed(0, 80)),
        arb_fixed(0, 1),
        prop::option::of((arb_fixed(0, 80), arb_fixed(0, 120))),
        arb_fixed(0, 1),
        any::<bool>(),
    );
    (own, local, world).prop_map(|(own, local, world)| {
        let (weighted, extra, cargo, loose_bio, health, healers, healer_energy, capacity, detector, stim) =
            own;
        let (known, remembered, workers, structures, anti_air, remembered_total) = local;
        let (
            situation,
            race,
            threat_distance,
            threat_supply,
            structure_distance,
            creep,
            ally,
            bio_health,
            ground,
        ) = world;
        let cargo = cargo.min(extra);
        ArmyAssessment {
            situation,
            enemy_race: race,
            weighted_supply: weighted,
            potential_supply: weighted + extra,
            cargo_supply: cargo,
            cargo_bio_supply: cargo,
            loose_bio_supply: loose_bio,
            health_fraction: health,
            bio_health,
            can_attack_ground: ground,
            healer_count: healers,
            healer_energy: if healers == 0 { Fixed::ZERO } else { healer_energy },
            drop_capacity: capacity,
            has_detector: detector,
            stim_progress: stim,
            local_known_enemy: known,
            local_remembered_enemy: remembered,
            local_enemy_workers: workers,
            local_enemy_structures: structures,
            local_anti_air: anti_air.min(known + remembered),
            remembered_enemy: remembered_total.max(remembered),
            threat_distance,
            threat_supply,
            threatened_structure_distance: structure_distance,
            creep_density: creep,
            nearest_ally: ally.map(|(distance, weighted_supply)| NearbyArmy {
                distance,
                weighted_supply,
            }),
        }
    })
}
