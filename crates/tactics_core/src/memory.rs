//! Enemy memory: time-boxed snapshots of enemy units that persist after
//! vision is lost.
//!
//! A ghost is refreshed on every frame its unit is visible and expires
//! `max(0, 300 − speed·60)` frames after it was last seen, so fast units are
//! forgotten sooner. A ghost is also dropped as soon as its last known
//! position is back in vision without the unit there.
//!
//! Live and remembered views never overlap: a unit visible this frame is
//! reported by [`EnemyMemory::known_enemy_units`] only, and everything else
//! by [`EnemyMemory::assumed_enemy_units`].

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::trace;

use crate::config::MemoryConfig;
use crate::math::Fixed;
use crate::unit::{Unit, UnitTag};
use crate::world::WorldView;

/// A remembered enemy unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhostUnit {
    /// Snapshot from the last frame the unit was visible.
    pub unit: Unit,
    /// Frame the unit was last visible.
    pub last_seen_frame: u32,
    /// Last frame on which the ghost still exists.
    pub expiry_frame: u32,
}

impl GhostUnit {
    /// Whether the ghost has expired at `frame`.
    #[must_use]
    pub const fn is_expired(&self, frame: u32) -> bool {
        frame > self.expiry_frame
    }
}

/// Frames a ghost of a unit with `speed` survives after last sight.
#[must_use]
pub fn ghost_lifetime(speed: Fixed, config: &MemoryConfig) -> u32 {
    let lifetime = Fixed::from_num(config.base_lifetime_frames) - speed * config.frames_per_speed;
    if lifetime <= Fixed::ZERO {
        0
    } else {
        lifetime.to_num::<u32>()
    }
}

/// Outcome of one [`EnemyMemory::refresh`], for logging and reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshStats {
    /// Ghosts created or refreshed from live vision.
    pub refreshed: usize,
    /// Ghosts dropped because their expiry passed.
    pub expired: usize,
    /// Ghosts dropped because vision disproved them.
    pub disproved: usize,
    /// Ghosts dropped because the unit was destroyed.
    pub destroyed: usize,
}

/// Table of ghost units keyed by tag.
#[derive(Debug, Clone, Default)]
pub struct EnemyMemory {
    ghosts: BTreeMap<UnitTag, GhostUnit>,
    visible: BTreeSet<UnitTag>,
    frame: u32,
}

impl EnemyMemory {
    /// Create an empty memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Update from the current world snapshot.
    ///
    /// Order: upsert visible enemies, drop expired ghosts, drop ghosts whose
    /// position is visible but empty, drop destroyed units.
    pub fn refresh(&mut self, world: &dyn WorldView, config: &MemoryConfig) -> RefreshStats {
        let frame = world.frame();
        let mut stats = RefreshStats::default();
        self.frame = frame;
        self.visible.clear();

        for enemy in world.enemy_units() {
            let lifetime = ghost_lifetime(enemy.speed, config);
            self.ghosts.insert(
                enemy.tag,
                GhostUnit {
                    unit: enemy.clone(),
                    last_seen_frame: frame,
                    expiry_frame: frame.saturating_add(lifetime),
                },
            );
            self.visible.insert(enemy.tag);
            stats.refreshed += 1;
        }

        let visible = &self.visible;
        self.ghosts.retain(|tag, ghost| {
            if visible.contains(tag) {
                return true;
            }
            if ghost.is_expired(frame) {
                stats.expired += 1;
                return false;
            }
            if world.is_visible(ghost.unit.position) {
                trace!(tag, "ghost disproved by vision");
                stats.disproved += 1;
                return false;
            }
            true
        });

        for tag in world.destroyed_units() {
            if self.ghosts.remove(tag).is_some() {
                stats.destroyed += 1;
            }
            self.visible.remove(tag);
        }

        stats
    }

    /// Enemy units visible this frame.
    pub fn known_enemy_units(&self) -> impl Iterator<Item = &Unit> {
        self.ghosts
            .iter()
            .filter(|(tag, _)| self.visible.contains(*tag))
            .map(|(_, g)| &g.unit)
    }

    /// Remembered enemy units not contradicted by current vision.
    pub fn assumed_enemy_units(&self) -> impl Iterator<Item = &Unit> {
        self.ghosts
            .iter()
            .filter(|(tag, _)| !self.visible.contains(*tag))
            .map(|(_, g)| &g.unit)
    }

    /// Every enemy unit, live or remembered.
    pub fn all_enemy_units(&self) -> impl Iterator<Item = &Unit> {
        self.ghosts.values().map(|g| &g.unit)
    }

    /// Enemy structures, live or remembered.
    pub fn remembered_structures(&self) -> impl Iterator<Item = &Unit> {
        self.all_enemy_units().filter(|u| u.is_structure())
    }

    /// Look up a ghost by tag.
    #[must_use]
    pub fn ghost(&self, tag: UnitTag) -> Option<&GhostUnit> {
        self.ghosts.get(&tag)
    }

    /// Whether a tag is visible this frame.
    #[must_use]
    pub fn is_live(&self, tag: UnitTag) -> bool {
        self.visible.contains(&tag)
    }

    /// Number of tracked units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ghosts.len()
    }

    /// Whether nothing is remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ghosts.is_empty()
    }

    /// Frame of the last refresh.
    #[must_use]
    pub const fn frame(&self) -> u32 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2Fixed;
    use crate::unit::Alliance;
    use crate::unit_type::UnitType;
    use crate::world::SnapshotWorld;

    fn enemy_at(tag: UnitTag, unit_type: UnitType, x: i32) -> Unit {
        Unit::new(tag, unit_type, Alliance::Enemy, Vec2Fixed::from_ints(x, 0))
    }

    fn scout_at(x: i32) -> Unit {
        Unit::new(1, UnitType::Marine, Alliance::Own, Vec2Fixed::from_ints(x, 0))
    }

    #[test]
    fn test_lifetime_shrinks_with_speed() {
        let config = MemoryConfig::default();
        assert_eq!(ghost_lifetime(Fixed::ZERO, &config), 300);
        assert_eq!(ghost_lifetime(Fixed::from_num(2), &config), 180);
        assert_eq!(ghost_lifetime(Fixed::from_num(10), &config), 0);
    }

    #[test]
    fn test_ghost_persists_after_vision_lost() {
        let config = MemoryConfig::default();
        let mut memory = EnemyMemory::new();
        let mut world = SnapshotWorld::new();
        world.own.push(scout_at(0));
        world.enemies.push(enemy_at(50, UnitType::Roach, 5));
        memory.refresh(&world, &config);
        assert_eq!(memory.known_enemy_units().count(), 1);
        assert_eq!(memory.assumed_enemy_units().count(), 0);

        // scout walks away, roach leaves vision
        world.frame = 10;
        world.enemies.clear();
        world.own[0].position = Vec2Fixed::from_ints(-50, 0);
        memory.refresh(&world, &config);
        assert_eq!(memory.known_enemy_units().count(), 0);
        assert_eq!(memory.assumed_enemy_units().count(), 1);
        let ghost = memory.ghost(50).unwrap();
        assert_eq!(ghost.last_seen_frame, 0);
    }

    #[test]
    fn test_ghost_expires() {
        let config = MemoryConfig::default();
        let mut memory = EnemyMemory::new();
        let mut world = SnapshotWorld::new();
        world.enemies.push(enemy_at(50, UnitType::Roach, 100));
        memory.refresh(&world, &config);
        let expiry = memory.ghost(50).unwrap().expiry_frame;

        world.enemies.clear();
        world.frame = expiry;
        memory.refresh(&world, &config);
        assert!(memory.ghost(50).is_some());

        world.frame = expiry + 1;
        let stats = memory.refresh(&world, &config);
        assert!(memory.is_empty());
        assert_eq!(stats.expired, 1);
    }

    #[test]
    fn test_ghost_disproved_same_tick() {
        let config = MemoryConfig::default();
        let mut memory = EnemyMemory::new();
        let mut world = SnapshotWorld::new();
        world.enemies.push(enemy_at(50, UnitType::SiegeTank, 40));
        memory.refresh(&world, &config);

        // tank gone, a scout now sees the spot
        world.frame = 1;
        world.enemies.clear();
        world.own.push(scout_at(38));
        let stats = memory.refresh(&world, &config);
        assert!(memory.ghost(50).is_none());
        assert_eq!(stats.disproved, 1);
    }

    #[test]
    fn test_destroyed_units_forgotten() {
        let config = MemoryConfig::default();
        let mut memory = EnemyMemory::new();
        let mut world = SnapshotWorld::new();
        world.enemies.push(enemy_at(50, UnitType::Zergling, 100));
        memory.refresh(&world, &config);

        world.enemies.clear();
        world.destroyed.push(50);
        world.frame = 1;
        let stats = memory.refresh(&world, &config);
        assert!(memory.is_empty());
        assert_eq!(stats.destroyed, 1);
    }

    #[test]
    fn test_remembered_structures() {
        let config = MemoryConfig::default();
        let mut memory = EnemyMemory::new();
        let mut world = SnapshotWorld::new();
        world.enemies.push(enemy_at(50, UnitType::Hatchery, 100));
        world.enemies.push(enemy_at(51, UnitType::Zergling, 100));
        memory.refresh(&world, &config);
        let structures: Vec<_> = memory.remembered_structures().map(|u| u.tag).collect();
        assert_eq!(structures, vec![50]);
        assert_eq!(memory.len(), 2);
    }
}
