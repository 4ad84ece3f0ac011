//! Unit snapshots.
//!
//! Units are owned by the game engine. The tactical core only ever sees an
//! immutable per-tick snapshot, referenced by its [`UnitTag`], and changes the
//! world exclusively by issuing commands.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, ratio_or, Fixed, Vec2Fixed};
use crate::unit_type::{MicroRole, UnitRole, UnitType};

/// Stable engine-assigned unit identity.
pub type UnitTag = u64;

/// Which side a unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Alliance {
    /// Controlled by this agent.
    #[default]
    Own,
    /// Controlled by the opponent.
    Enemy,
    /// Map features, rocks, critters.
    Neutral,
}

/// Weapon profile against one layer (ground or air).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    /// Attack range, edge to edge.
    #[serde(with = "fixed_serde")]
    pub range: Fixed,
    /// Damage per second against a neutral target.
    #[serde(with = "fixed_serde")]
    pub dps: Fixed,
    /// Frames between shots.
    #[serde(with = "fixed_serde")]
    pub cooldown: Fixed,
}

/// A unit carried inside a transport or garrison structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    /// Passenger identity.
    pub tag: UnitTag,
    /// Passenger type.
    pub unit_type: UnitType,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub health_max: u32,
}

impl Passenger {
    /// A full-health passenger of the given type.
    #[must_use]
    pub fn new(tag: UnitTag, unit_type: UnitType) -> Self {
        let health = unit_type.default_health();
        Self {
            tag,
            unit_type,
            health,
            health_max: health,
        }
    }

    /// Whether the passenger is at full health.
    #[must_use]
    pub const fn is_full_health(&self) -> bool {
        self.health >= self.health_max
    }
}

/// Immutable snapshot of one unit for the current tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Engine identity.
    pub tag: UnitTag,
    /// Type.
    pub unit_type: UnitType,
    /// Owner.
    pub alliance: Alliance,
    /// World position.
    pub position: Vec2Fixed,
    /// Facing in radians.
    #[serde(with = "fixed_serde")]
    pub facing: Fixed,
    /// Footprint radius.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub health_max: u32,
    /// Current shield.
    pub shield: u32,
    /// Maximum shield.
    pub shield_max: u32,
    /// Current energy.
    pub energy: u32,
    /// Maximum energy.
    pub energy_max: u32,
    /// Movement speed, distance units per second.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Frames until the weapon can fire again.
    #[serde(with = "fixed_serde")]
    pub weapon_cooldown: Fixed,
    /// Weapon against ground targets.
    pub ground_weapon: Option<Weapon>,
    /// Weapon against air targets.
    pub air_weapon: Option<Weapon>,
    /// Airborne.
    pub is_flying: bool,
    /// Currently cloaked.
    pub is_cloaked: bool,
    /// Under the stim buff.
    pub is_stimmed: bool,
    /// Carries an armor-reducing debuff.
    pub has_armor_debuff: bool,
    /// Units carried inside.
    pub passengers: Vec<Passenger>,
    /// Total cargo slots.
    pub cargo_max: u8,
    /// Current rally point for structures.
    #[serde(default)]
    pub rally_point: Option<Vec2Fixed>,
    /// Build progress, 0..=1.
    #[serde(with = "fixed_serde")]
    pub build_progress: Fixed,
}

impl Unit {
    /// Create a full-health snapshot with the catalogue defaults for `unit_type`.
    #[must_use]
    pub fn new(tag: UnitTag, unit_type: UnitType, alliance: Alliance, position: Vec2Fixed) -> Self {
        let health = unit_type.default_health();
        let shield = unit_type.default_shield();
        let energy = unit_type.default_energy();
        Self {
            tag,
            unit_type,
            alliance,
            position,
            facing: Fixed::ZERO,
            radius: unit_type.default_radius(),
            health,
            health_max: health,
            shield,
            shield_max: shield,
            energy,
            energy_max: energy,
            speed: unit_type.default_speed(),
            weapon_cooldown: Fixed::ZERO,
            ground_weapon: unit_type.default_ground_weapon(),
            air_weapon: unit_type.default_air_weapon(),
            is_flying: unit_type.has_role(UnitRole::FLYING),
            is_cloaked: false,
            is_stimmed: false,
            has_armor_debuff: false,
            passengers: Vec::new(),
            cargo_max: unit_type.cargo_capacity(),
            rally_point: None,
            build_progress: Fixed::ONE,
        }
    }

    /// Builder method to set current health.
    #[must_use]
    pub fn with_health(mut self, health: u32) -> Self {
        self.health = health.min(self.health_max);
        self
    }

    /// Builder method to set current shield.
    #[must_use]
    pub fn with_shield(mut self, shield: u32) -> Self {
        self.shield = shield.min(self.shield_max);
        self
    }

    /// Builder method to set current energy.
    #[must_use]
    pub fn with_energy(mut self, energy: u32) -> Self {
        self.energy = energy.min(self.energy_max);
        self
    }

    /// Builder method to set facing.
    #[must_use]
    pub fn with_facing(mut self, facing: Fixed) -> Self {
        self.facing = facing;
        self
    }

    /// Builder method to set remaining weapon cooldown.
    #[must_use]
    pub fn with_weapon_cooldown(mut self, frames: Fixed) -> Self {
        self.weapon_cooldown = frames;
        self
    }

    /// Builder method to add a passenger.
    #[must_use]
    pub fn with_passenger(mut self, passenger: Passenger) -> Self {
        self.passengers.push(passenger);
        self
    }

    /// Builder method to set the stim buff.
    #[must_use]
    pub fn stimmed(mut self) -> Self {
        self.is_stimmed = true;
        self
    }

    /// Builder method to set the cloak state.
    #[must_use]
    pub fn cloaked(mut self) -> Self {
        self.is_cloaked = true;
        self
    }

    /// Builder method to set the armor debuff.
    #[must_use]
    pub fn armor_debuffed(mut self) -> Self {
        self.has_armor_debuff = true;
        self
    }

    /// Builder method to set the rally point.
    #[must_use]
    pub fn with_rally_point(mut self, point: Vec2Fixed) -> Self {
        self.rally_point = Some(point);
        self
    }

    /// Builder method to set build progress.
    #[must_use]
    pub fn with_build_progress(mut self, progress: Fixed) -> Self {
        self.build_progress = progress.clamp(Fixed::ZERO, Fixed::ONE);
        self
    }

    /// Whether the type carries all of `role`.
    #[must_use]
    pub const fn has_role(&self, role: UnitRole) -> bool {
        self.unit_type.has_role(role)
    }

    /// Biological.
    #[must_use]
    pub const fn is_bio(&self) -> bool {
        self.has_role(UnitRole::BIO)
    }

    /// Armored.
    #[must_use]
    pub const fn is_armored(&self) -> bool {
        self.has_role(UnitRole::ARMORED)
    }

    /// Static structure.
    #[must_use]
    pub const fn is_structure(&self) -> bool {
        self.has_role(UnitRole::STRUCTURE)
    }

    /// Economy worker.
    #[must_use]
    pub const fn is_worker(&self) -> bool {
        self.has_role(UnitRole::WORKER)
    }

    /// Detector.
    #[must_use]
    pub const fn is_detector(&self) -> bool {
        self.has_role(UnitRole::DETECTOR)
    }

    /// Construction finished.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.build_progress >= Fixed::ONE
    }

    /// Micro behaviour for this unit.
    #[must_use]
    pub const fn micro_role(&self) -> MicroRole {
        self.unit_type.micro_role()
    }

    /// Has any weapon.
    #[must_use]
    pub const fn can_attack(&self) -> bool {
        self.ground_weapon.is_some() || self.air_weapon.is_some()
    }

    /// Has a weapon against ground targets.
    #[must_use]
    pub const fn can_attack_ground(&self) -> bool {
        self.ground_weapon.is_some()
    }

    /// Has a weapon against air targets.
    #[must_use]
    pub const fn can_attack_air(&self) -> bool {
        self.air_weapon.is_some()
    }

    /// Weapon usable against `target`, if any.
    #[must_use]
    pub fn weapon_against(&self, target: &Unit) -> Option<Weapon> {
        if target.is_flying {
            self.air_weapon
        } else {
            self.ground_weapon
        }
    }

    /// Whether this unit has a weapon that can hit `target`.
    #[must_use]
    pub fn can_attack_unit(&self, target: &Unit) -> bool {
        self.weapon_against(target).is_some()
    }

    /// Center-to-center distance at which this unit can hit `target`.
    ///
    /// `None` when no weapon can hit the target.
    #[must_use]
    pub fn real_range_against(&self, target: &Unit) -> Option<Fixed> {
        self.weapon_against(target)
            .map(|w| w.range + self.radius + target.radius)
    }

    /// Whether `target` is inside weapon range, with an extra `margin`.
    #[must_use]
    pub fn in_range_of(&self, target: &Unit, margin: Fixed) -> bool {
        self.real_range_against(target)
            .is_some_and(|range| self.position.is_within(target.position, range + margin))
    }

    /// Longest weapon range against either layer.
    #[must_use]
    pub fn max_range(&self) -> Fixed {
        let ground = self.ground_weapon.map_or(Fixed::ZERO, |w| w.range);
        let air = self.air_weapon.map_or(Fixed::ZERO, |w| w.range);
        ground.max(air)
    }

    /// Distance to another unit (center to center).
    #[must_use]
    pub fn distance_to(&self, other: &Unit) -> Fixed {
        self.position.distance(other.position)
    }

    /// Health plus shield.
    #[must_use]
    pub const fn effective_health(&self) -> u32 {
        self.health.saturating_add(self.shield)
    }

    /// Maximum health plus shield.
    #[must_use]
    pub const fn effective_health_max(&self) -> u32 {
        self.health_max.saturating_add(self.shield_max)
    }

    /// Health and shield as a 0..=1 fraction; a zero maximum reads as full.
    #[must_use]
    pub fn health_fraction(&self) -> Fixed {
        ratio_or(
            Fixed::from_num(self.effective_health()),
            Fixed::from_num(self.effective_health_max()),
            Fixed::ONE,
        )
    }

    /// Energy as a 0..=1 fraction; units without energy read as empty.
    #[must_use]
    pub fn energy_fraction(&self) -> Fixed {
        ratio_or(
            Fixed::from_num(self.energy),
            Fixed::from_num(self.energy_max),
            Fixed::ZERO,
        )
    }

    /// Whether health is below maximum.
    #[must_use]
    pub const fn is_damaged(&self) -> bool {
        self.health < self.health_max
    }

    /// Cargo slots in use.
    #[must_use]
    pub fn cargo_used(&self) -> u8 {
        self.passengers
            .iter()
            .map(|p| p.unit_type.cargo_size())
            .fold(0u8, u8::saturating_add)
    }

    /// Cargo slots still free.
    #[must_use]
    pub fn cargo_free(&self) -> u8 {
        self.cargo_max.saturating_sub(self.cargo_used())
    }

    /// Whether the weapon is still cooling down.
    #[must_use]
    pub fn weapon_on_cooldown(&self) -> bool {
        self.weapon_cooldown > Fixed::ZERO
    }

    /// Whether this unit is roughly facing `point` (within `cos_half_angle`).
    #[must_use]
    pub fn is_facing(&self, point: Vec2Fixed, cos_half_angle: Fixed) -> bool {
        let to_point = (point - self.position).normalize();
        if to_point == Vec2Fixed::ZERO {
            return true;
        }
        Vec2Fixed::from_angle(self.facing).dot(to_point) >= cos_half_angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::PI;

    fn at(x: i32, y: i32, unit_type: UnitType, alliance: Alliance) -> Unit {
        Unit::new(1, unit_type, alliance, Vec2Fixed::from_ints(x, y))
    }

    #[test]
    fn test_new_uses_catalogue_defaults() {
        let marine = at(0, 0, UnitType::Marine, Alliance::Own);
        assert_eq!(marine.health, 45);
        assert_eq!(marine.health_max, 45);
        assert!(marine.can_attack_ground());
        assert!(marine.can_attack_air());
        assert!(!marine.is_flying);

        let medivac = at(0, 0, UnitType::Medivac, Alliance::Own);
        assert!(medivac.is_flying);
        assert!(!medivac.can_attack());
        assert_eq!(medivac.cargo_free(), 8);
    }

    #[test]
    fn test_health_fraction_includes_shield() {
        let stalker = at(0, 0, UnitType::Stalker, Alliance::Enemy).with_shield(0);
        assert_eq!(stalker.health_fraction(), Fixed::from_num(0.5));
    }

    #[test]
    fn test_energy_fraction_without_energy_is_zero() {
        let marine = at(0, 0, UnitType::Marine, Alliance::Own);
        assert_eq!(marine.energy_fraction(), Fixed::ZERO);
    }

    #[test]
    fn test_real_range_adds_radii() {
        let marine = at(0, 0, UnitType::Marine, Alliance::Own);
        let zergling = at(5, 0, UnitType::Zergling, Alliance::Enemy);
        assert!(marine.in_range_of(&zergling, Fixed::ZERO));
        let far = at(7, 0, UnitType::Zergling, Alliance::Enemy);
        assert!(!marine.in_range_of(&far, Fixed::ZERO));
    }

    #[test]
    fn test_marauder_cannot_hit_air() {
        let marauder = at(0, 0, UnitType::Marauder, Alliance::Own);
        let mutalisk = at(1, 0, UnitType::Mutalisk, Alliance::Enemy);
        assert!(!marauder.can_attack_unit(&mutalisk));
        assert!(marauder.real_range_against(&mutalisk).is_none());
    }

    #[test]
    fn test_cargo_accounting() {
        let medivac = at(0, 0, UnitType::Medivac, Alliance::Own)
            .with_passenger(Passenger::new(10, UnitType::Marauder))
            .with_passenger(Passenger::new(11, UnitType::Marine));
        assert_eq!(medivac.cargo_used(), 3);
        assert_eq!(medivac.cargo_free(), 5);
    }

    #[test]
    fn test_is_facing() {
        let east = at(0, 0, UnitType::Stalker, Alliance::Enemy).with_facing(Fixed::ZERO);
        let cos45 = Fixed::from_num(0.7071);
        assert!(east.is_facing(Vec2Fixed::from_ints(5, 1), cos45));
        assert!(!east.is_facing(Vec2Fixed::from_ints(-5, 0), cos45));
        let west = east.clone().with_facing(PI);
        assert!(west.is_facing(Vec2Fixed::from_ints(-5, 0), cos45));
    }
}
