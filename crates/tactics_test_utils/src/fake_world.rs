//! Fluent builder for [`SnapshotWorld`] test states.
//!
//! ```ignore
//! use tactics_test_utils::fake_world::FakeWorld;
//! use tactics_core::unit_type::UnitType;
//!
//! let world = FakeWorld::new()
//!     .squad(UnitType::Marine, 8, (0, 0))
//!     .enemy_squad(UnitType::Zergling, 4, (6, 0))
//!     .build();
//! ```

use tactics_core::math::{Fixed, Vec2Fixed};
use tactics_core::unit::{Alliance, Unit, UnitTag};
use tactics_core::unit_type::{Race, UnitType, Upgrade};
use tactics_core::world::{Base, SnapshotWorld};

use crate::fixtures::{line_of, point};

/// Tag the builder starts auto-assigning from.
const FIRST_TAG: UnitTag = 1;

/// Builds a [`SnapshotWorld`], assigning tags in insertion order.
#[derive(Debug, Clone)]
pub struct FakeWorld {
    world: SnapshotWorld,
    next_tag: UnitTag,
}

impl Default for FakeWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeWorld {
    /// Empty world at frame 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            world: SnapshotWorld::new(),
            next_tag: FIRST_TAG,
        }
    }

    /// Tag the next added unit will receive.
    #[must_use]
    pub fn next_tag(&self) -> UnitTag {
        self.next_tag
    }

    /// Set the frame.
    #[must_use]
    pub fn frame(mut self, frame: u32) -> Self {
        self.world.frame = frame;
        self
    }

    /// Add an already built unit, keeping its tag.
    #[must_use]
    pub fn unit(mut self, unit: Unit) -> Self {
        self.next_tag = self.next_tag.max(unit.tag + 1);
        match unit.alliance {
            Alliance::Enemy => self.world.enemies.push(unit),
            Alliance::Own | Alliance::Neutral => self.world.own.push(unit),
        }
        self
    }

    /// Add one own unit with the next free tag.
    #[must_use]
    pub fn own(self, unit_type: UnitType, at: (i32, i32)) -> Self {
        self.squad(unit_type, 1, at)
    }

    /// Add one enemy unit with the next free tag.
    #[must_use]
    pub fn enemy(self, unit_type: UnitType, at: (i32, i32)) -> Self {
        self.enemy_squad(unit_type, 1, at)
    }

    /// Add a row of own units starting at `at`.
    #[must_use]
    pub fn squad(self, unit_type: UnitType, count: u32, at: (i32, i32)) -> Self {
        self.line(unit_type, count, Alliance::Own, at)
    }

    /// Add a row of enemy units starting at `at`.
    #[must_use]
    pub fn enemy_squad(self, unit_type: UnitType, count: u32, at: (i32, i32)) -> Self {
        self.line(unit_type, count, Alliance::Enemy, at)
    }

    fn line(mut self, unit_type: UnitType, count: u32, alliance: Alliance, at: (i32, i32)) -> Self {
        let units = line_of(self.next_tag, count, unit_type, alliance, point(at.0, at.1));
        for unit in units {
            self = self.unit(unit);
        }
        self
    }

    /// Add a held base.
    #[must_use]
    pub fn base(mut self, townhall: UnitTag, position: (i32, i32), safe_point: (i32, i32)) -> Self {
        self.world.bases.push(Base {
            townhall,
            position: point(position.0, position.1),
            safe_point: point(safe_point.0, safe_point.1),
        });
        self
    }

    /// Set the opponent start location.
    #[must_use]
    pub fn enemy_start(mut self, x: i32, y: i32) -> Self {
        self.world.enemy_start = point(x, y);
        self
    }

    /// Set the opponent race.
    #[must_use]
    pub fn enemy_race(mut self, race: Race) -> Self {
        self.world.enemy_race = race;
        self
    }

    /// Set research progress (0..=1).
    #[must_use]
    pub fn upgrade(mut self, upgrade: Upgrade, progress: Fixed) -> Self {
        self.world.upgrades.insert(upgrade, progress);
        self
    }

    /// Mark an upgrade as finished.
    #[must_use]
    pub fn researched(self, upgrade: Upgrade) -> Self {
        self.upgrade(upgrade, Fixed::ONE)
    }

    /// Set the terrain height of one tile.
    #[must_use]
    pub fn height(mut self, tile: (i32, i32), height: Fixed) -> Self {
        self.world.heights.insert(tile, height);
        self
    }

    /// Cover a square of tiles centred on `center` with creep.
    #[must_use]
    pub fn creep(mut self, center: (i32, i32), half_width: i32) -> Self {
        for x in center.0 - half_width..=center.0 + half_width {
            for y in center.1 - half_width..=center.1 + half_width {
                self.world.creep.insert((x, y));
            }
        }
        self
    }

    /// Override the sight radius used for visibility.
    #[must_use]
    pub fn sight_radius(mut self, radius: Fixed) -> Self {
        self.world.sight_radius = radius;
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> SnapshotWorld {
        self.world
    }
}

/// Move a unit in place, leaving everything else untouched.
pub fn move_unit(world: &mut SnapshotWorld, tag: UnitTag, to: Vec2Fixed) {
    if let Some(unit) = world
        .own
        .iter_mut()
        .chain(world.enemies.iter_mut())
        .find(|u| u.tag == tag)
    {
        unit.position = to;
    }
}

/// Remove an enemy from the visible set, as if it walked into the fog.
pub fn hide_enemy(world: &mut SnapshotWorld, tag: UnitTag) -> Option<Unit> {
    let index = world.enemies.iter().position(|u| u.tag == tag)?;
    Some(world.enemies.remove(index))
}
