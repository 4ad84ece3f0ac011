//! Read-only views onto collaborators owned outside the tactical core.
//!
//! - [`WorldView`]: the engine's per-tick unit state and map queries
//! - [`DangerField`]: threat-level and safe-positioning queries
//! - [`Situation`] / [`CompositionQuotas`]: macro-level inputs
//!
//! Decision code only ever talks to these traits, so every component can be
//! exercised against a [`SnapshotWorld`] instead of a live game connection.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::math::{Fixed, Vec2Fixed};
use crate::unit::{Unit, UnitTag};
use crate::unit_type::{Race, UnitType, Upgrade};

/// A base held by this agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base {
    /// Townhall at this base.
    pub townhall: UnitTag,
    /// Townhall position.
    pub position: Vec2Fixed,
    /// Protected spot behind the mineral line where retreating units gather.
    pub safe_point: Vec2Fixed,
}

/// Movement layer for danger queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Ground units.
    Ground,
    /// Air units.
    Air,
}

impl Layer {
    /// Layer a unit moves on.
    #[must_use]
    pub const fn of(unit: &Unit) -> Self {
        if unit.is_flying {
            Self::Air
        } else {
            Self::Ground
        }
    }
}

/// Macro situation reported by the situation detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Situation {
    /// Nothing unusual.
    #[default]
    Stable,
    /// Bases are being attacked.
    UnderAttack,
    /// Opponent is building bunkers near our base.
    BunkerRush,
    /// Opponent is building cannons near our base.
    CannonRush,
}

impl Situation {
    /// Whether this is a cheese pattern that overrides normal decisions.
    #[must_use]
    pub const fn is_cheese(self) -> bool {
        matches!(self, Self::BunkerRush | Self::CannonRush)
    }
}

/// Target unit counts from the composition planner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionQuotas {
    quotas: BTreeMap<UnitType, u32>,
}

impl CompositionQuotas {
    /// Create an empty quota table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the quota for one type.
    #[must_use]
    pub fn with(mut self, unit_type: UnitType, count: u32) -> Self {
        self.quotas.insert(unit_type, count);
        self
    }

    /// Target count for a type (0 if unplanned).
    #[must_use]
    pub fn quota(&self, unit_type: UnitType) -> u32 {
        self.quotas.get(&unit_type).copied().unwrap_or(0)
    }
}

/// Read-only engine state for the current tick.
///
/// Implementations must be authoritative for the current tick: every query
/// answers from one consistent snapshot.
pub trait WorldView {
    /// Current game frame.
    fn frame(&self) -> u32;

    /// All own units, excluding units carried inside others.
    fn own_units(&self) -> &[Unit];

    /// Currently visible enemy units.
    fn enemy_units(&self) -> &[Unit];

    /// Look up a live own or visible enemy unit.
    fn unit(&self, tag: UnitTag) -> Option<&Unit>;

    /// Whether a point is currently inside friendly vision.
    fn is_visible(&self, point: Vec2Fixed) -> bool;

    /// Terrain height at a point.
    fn terrain_height(&self, point: Vec2Fixed) -> Fixed;

    /// Research progress, 0..=1.
    fn upgrade_progress(&self, upgrade: Upgrade) -> Fixed;

    /// Bases currently held.
    fn bases(&self) -> &[Base];

    /// Opponent's starting location.
    fn enemy_start(&self) -> Vec2Fixed;

    /// Opponent's race, once known.
    fn enemy_race(&self) -> Race;

    /// Fraction (0..=1) of the circle covered by opponent map-control terrain.
    fn creep_density(&self, center: Vec2Fixed, radius: Fixed) -> Fixed;

    /// Tags of units destroyed this frame.
    fn destroyed_units(&self) -> &[UnitTag] {
        &[]
    }

    /// Whether an upgrade has finished.
    fn has_upgrade(&self, upgrade: Upgrade) -> bool {
        self.upgrade_progress(upgrade) >= Fixed::ONE
    }

    /// Own units within `radius` of `point`.
    fn own_units_near(&self, point: Vec2Fixed, radius: Fixed) -> Vec<&Unit> {
        self.own_units()
            .iter()
            .filter(|u| u.position.is_within(point, radius))
            .collect()
    }

    /// Nearest held base to a point.
    fn nearest_base(&self, point: Vec2Fixed) -> Option<&Base> {
        self.bases()
            .iter()
            .min_by_key(|b| (b.position.distance_squared(point), b.townhall))
    }
}

/// Threat-level and safe-positioning queries.
pub trait DangerField {
    /// Danger at `point`, integrated over `radius`, for one layer.
    fn danger(&self, point: Vec2Fixed, radius: Fixed, layer: Layer) -> Fixed;

    /// Safest reachable tile within `radius` of `origin`, optionally biased
    /// toward `bias`.
    fn safest_tile(
        &self,
        origin: Vec2Fixed,
        radius: Fixed,
        bias: Option<Vec2Fixed>,
        layer: Layer,
    ) -> Vec2Fixed;

    /// Best spot for `attacker` to fire on `target` from.
    fn best_attack_position(&self, attacker: &Unit, target: &Unit) -> Vec2Fixed;
}

/// An owned, in-memory [`WorldView`].
///
/// Used by the headless runner and by tests; a live engine binding would
/// implement [`WorldView`] directly instead.
#[derive(Debug, Clone, Default)]
pub struct SnapshotWorld {
    /// Current frame.
    pub frame: u32,
    /// Own units.
    pub own: Vec<Unit>,
    /// Visible enemy units.
    pub enemies: Vec<Unit>,
    /// Held bases.
    pub bases: Vec<Base>,
    /// Opponent start.
    pub enemy_start: Vec2Fixed,
    /// Opponent race.
    pub enemy_race: Race,
    /// Sight radius of own units used for [`WorldView::is_visible`].
    pub sight_radius: Fixed,
    /// Research progress.
    pub upgrades: BTreeMap<Upgrade, Fixed>,
    /// Terrain heights keyed by integer tile.
    pub heights: BTreeMap<(i32, i32), Fixed>,
    /// Tiles covered by opponent map-control terrain.
    pub creep: BTreeSet<(i32, i32)>,
    /// Units destroyed this frame.
    pub destroyed: Vec<UnitTag>,
}

impl SnapshotWorld {
    /// Empty world at frame 0 with the default sight radius.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sight_radius: Fixed::from_num(9),
            ..Self::default()
        }
    }

    /// Integer tile containing a point.
    #[must_use]
    pub fn tile_of(point: Vec2Fixed) -> (i32, i32) {
        (point.x.floor().to_num(), point.y.floor().to_num())
    }
}

impl WorldView for SnapshotWorld {
    fn frame(&self) -> u32 {
        self.frame
    }

    fn own_units(&self) -> &[Unit] {
        &self.own
    }

    fn enemy_units(&self) -> &[Unit] {
        &self.enemies
    }

    fn unit(&self, tag: UnitTag) -> Option<&Unit> {
        self.own
            .iter()
            .chain(self.enemies.iter())
            .find(|u| u.tag == tag)
    }

    fn is_visible(&self, point: Vec2Fixed) -> bool {
        self.own
            .iter()
            .any(|u| u.position.is_within(point, self.sight_radius))
    }

    fn terrain_height(&self, point: Vec2Fixed) -> Fixed {
        self.heights
            .get(&Self::tile_of(point))
            .copied()
            .unwrap_or(Fixed::ZERO)
    }

    fn upgrade_progress(&self, upgrade: Upgrade) -> Fixed {
        self.upgrades.get(&upgrade).copied().unwrap_or(Fixed::ZERO)
    }

    fn bases(&self) -> &[Base] {
        &self.bases
    }

    fn enemy_start(&self) -> Vec2Fixed {
        self.enemy_start
    }

    fn enemy_race(&self) -> Race {
        self.enemy_race
    }

    fn creep_density(&self, center: Vec2Fixed, radius: Fixed) -> Fixed {
        let r: i32 = radius.ceil().to_num();
        let (cx, cy) = Self::tile_of(center);
        let mut total = 0i32;
        let mut covered = 0i32;
        for x in (cx - r)..=(cx + r) {
            for y in (cy - r)..=(cy + r) {
                let tile_center = Vec2Fixed::new(
                    Fixed::from_num(x) + Fixed::from_num(0.5),
                    Fixed::from_num(y) + Fixed::from_num(0.5),
                );
                if !tile_center.is_within(center, radius) {
                    continue;
                }
                total += 1;
                if self.creep.contains(&(x, y)) {
                    covered += 1;
                }
            }
        }
        if total == 0 {
            return Fixed::ZERO;
        }
        Fixed::from_num(covered) / Fixed::from_num(total)
    }

    fn destroyed_units(&self) -> &[UnitTag] {
        &self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::Alliance;

    fn world_with_marine() -> SnapshotWorld {
        let mut world = SnapshotWorld::new();
        world.own.push(Unit::new(
            1,
            UnitType::Marine,
            Alliance::Own,
            Vec2Fixed::from_ints(10, 10),
        ));
        world
    }

    #[test]
    fn test_visibility_follows_own_units() {
        let world = world_with_marine();
        assert!(world.is_visible(Vec2Fixed::from_ints(15, 10)));
        assert!(!world.is_visible(Vec2Fixed::from_ints(30, 10)));
    }

    #[test]
    fn test_lookup_and_upgrades() {
        let mut world = world_with_marine();
        assert!(world.unit(1).is_some());
        assert!(world.unit(2).is_none());
        assert!(!world.has_upgrade(Upgrade::Stimpack));
        world.upgrades.insert(Upgrade::Stimpack, Fixed::ONE);
        assert!(world.has_upgrade(Upgrade::Stimpack));
    }

    #[test]
    fn test_creep_density() {
        let mut world = SnapshotWorld::new();
        let center = Vec2Fixed::from_ints(0, 0);
        assert_eq!(world.creep_density(center, Fixed::from_num(3)), Fixed::ZERO);
        for x in -4..4 {
            for y in -4..4 {
                world.creep.insert((x, y));
            }
        }
        assert_eq!(world.creep_density(center, Fixed::from_num(3)), Fixed::ONE);
    }

    #[test]
    fn test_cheese_situations() {
        assert!(Situation::BunkerRush.is_cheese());
        assert!(Situation::CannonRush.is_cheese());
        assert!(!Situation::UnderAttack.is_cheese());
    }

    #[test]
    fn test_quotas_default_to_zero() {
        let quotas = CompositionQuotas::new().with(UnitType::Medivac, 4);
        assert_eq!(quotas.quota(UnitType::Medivac), 4);
        assert_eq!(quotas.quota(UnitType::Marine), 0);
    }
}
