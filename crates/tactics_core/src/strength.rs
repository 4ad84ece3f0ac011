//! Strength model: supply and composition queries over a set of units.
//!
//! Every function is pure and takes any iterator of `&Unit`, so the same
//! code scores live friendly armies, visible enemies and remembered ghosts.
//!
//! Weighting uses [`cosine_falloff`]: a unit at half health is worth half its
//! cost, and the curve drops faster below that, since a badly damaged unit
//! contributes little before it dies.

use crate::math::{cosine_falloff, ratio_or, Fixed};
use crate::unit::{Passenger, Unit};
use crate::unit_type::UnitRole;

/// Supply value credited to an armed static structure, which has no supply
/// cost of its own but still fights.
pub const STATIC_DEFENSE_SUPPLY: Fixed = Fixed::from_bits(2 << 32);

/// Table supply, or [`STATIC_DEFENSE_SUPPLY`] for armed structures.
fn base_supply(unit: &Unit) -> Fixed {
    if unit.is_structure() && unit.can_attack() {
        STATIC_DEFENSE_SUPPLY
    } else {
        unit.unit_type.supply()
    }
}

/// Raw supply of one unit, including occupants of a garrison structure.
///
/// Transport cargo is not included: it is counted separately by
/// [`cargo_supply`] because it only fights once unloaded.
#[must_use]
pub fn unit_supply(unit: &Unit) -> Fixed {
    let own = base_supply(unit);
    if unit.has_role(UnitRole::GARRISON) {
        own + unit
            .passengers
            .iter()
            .map(|p| p.unit_type.supply())
            .sum::<Fixed>()
    } else {
        own
    }
}

/// Health-weighted supply of one passenger.
fn passenger_weighted(passenger: &Passenger) -> Fixed {
    let fraction = ratio_or(
        Fixed::from_num(passenger.health),
        Fixed::from_num(passenger.health_max),
        Fixed::ONE,
    );
    passenger.unit_type.supply() * cosine_falloff(fraction)
}

/// Weighted supply of one unit.
///
/// Support units without a weapon are scaled by their energy, everything
/// else by health plus shield. The result lies in `[0, unit_supply(unit)]`.
#[must_use]
pub fn unit_weighted_supply(unit: &Unit) -> Fixed {
    let fraction = if !unit.can_attack() && unit.has_role(UnitRole::HEALER) {
        unit.energy_fraction()
    } else {
        unit.health_fraction()
    };
    let own = base_supply(unit) * cosine_falloff(fraction);
    if unit.has_role(UnitRole::GARRISON) {
        own + unit.passengers.iter().map(passenger_weighted).sum::<Fixed>()
    } else {
        own
    }
}

/// Sum of raw supply costs.
pub fn supply<'a, I>(units: I) -> Fixed
where
    I: IntoIterator<Item = &'a Unit>,
{
    units.into_iter().map(unit_supply).sum()
}

/// Sum of health/energy-weighted supply.
pub fn weighted_supply<'a, I>(units: I) -> Fixed
where
    I: IntoIterator<Item = &'a Unit>,
{
    units.into_iter().map(unit_weighted_supply).sum()
}

/// Supply of units carried inside transports (not garrison structures).
pub fn cargo_supply<'a, I>(units: I) -> Fixed
where
    I: IntoIterator<Item = &'a Unit>,
{
    units
        .into_iter()
        .filter(|u| !u.has_role(UnitRole::GARRISON))
        .flat_map(|u| u.passengers.iter())
        .map(passenger_weighted)
        .sum()
}

/// Fighting potential: weighted attackers plus carried cargo.
///
/// With no attack-capable unit present only the cargo counts, so a group of
/// empty transports has zero potential.
pub fn potential_supply<'a, I>(units: I) -> Fixed
where
    I: IntoIterator<Item = &'a Unit>,
{
    let mut attackers = Fixed::ZERO;
    let mut any_attacker = false;
    let mut cargo = Fixed::ZERO;
    for unit in units {
        if unit.can_attack() {
            any_attacker = true;
            attackers += unit_weighted_supply(unit);
        }
        if !unit.has_role(UnitRole::GARRISON) {
            cargo += unit.passengers.iter().map(passenger_weighted).sum::<Fixed>();
        }
    }
    if any_attacker {
        attackers + cargo
    } else {
        cargo
    }
}

/// Supply of units able to shoot at air targets.
pub fn anti_air_supply<'a, I>(units: I) -> Fixed
where
    I: IntoIterator<Item = &'a Unit>,
{
    units
        .into_iter()
        .filter(|u| u.can_attack_air())
        .map(unit_weighted_supply)
        .sum()
}

/// Raw supply of biological units.
pub fn bio_supply<'a, I>(units: I) -> Fixed
where
    I: IntoIterator<Item = &'a Unit>,
{
    units
        .into_iter()
        .filter(|u| u.is_bio())
        .map(unit_supply)
        .sum()
}

/// Share of supply held by armored units; 0 for an empty set.
pub fn armored_ratio<'a, I>(units: I) -> Fixed
where
    I: IntoIterator<Item = &'a Unit>,
{
    let mut armored = Fixed::ZERO;
    let mut total = Fixed::ZERO;
    for unit in units {
        let s = unit_supply(unit);
        total += s;
        if unit.is_armored() {
            armored += s;
        }
    }
    ratio_or(armored, total, Fixed::ZERO)
}

/// Current over maximum health of biological units; 1 when there are none.
pub fn bio_health_percentage<'a, I>(units: I) -> Fixed
where
    I: IntoIterator<Item = &'a Unit>,
{
    let mut health = 0u64;
    let mut health_max = 0u64;
    for unit in units.into_iter().filter(|u| u.is_bio()) {
        health += u64::from(unit.health);
        health_max += u64::from(unit.health_max);
    }
    ratio_or(
        Fixed::from_num(health),
        Fixed::from_num(health_max),
        Fixed::ONE,
    )
}

/// Whether any unit can shoot at ground targets.
pub fn can_attack_ground<'a, I>(units: I) -> bool
where
    I: IntoIterator<Item = &'a Unit>,
{
    units.into_iter().any(Unit::can_attack_ground)
}

/// Number of economy workers.
pub fn worker_count<'a, I>(units: I) -> usize
where
    I: IntoIterator<Item = &'a Unit>,
{
    units.into_iter().filter(|u| u.is_worker()).count()
}
