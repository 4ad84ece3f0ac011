//! Per-tick decision context.
//!
//! Built once per tick by the commander and passed by reference to every
//! component, so no decision code reaches for global state.

use crate::config::TacticsConfig;
use crate::math::{Fixed, Vec2Fixed};
use crate::memory::EnemyMemory;
use crate::unit::Unit;
use crate::unit_type::UnitRole;
use crate::world::{Base, CompositionQuotas, DangerField, Situation, WorldView};

/// Everything a component may read while deciding one tick.
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    /// Engine state.
    pub world: &'a dyn WorldView,
    /// Threat and positioning queries.
    pub danger: &'a dyn DangerField,
    /// Enemy memory after this tick's refresh.
    pub memory: &'a EnemyMemory,
    /// Current macro situation.
    pub situation: Situation,
    /// Composition targets.
    pub quotas: &'a CompositionQuotas,
    /// Tuning.
    pub config: &'a TacticsConfig,
}

impl<'a> TickContext<'a> {
    /// Bundle the per-tick inputs.
    #[must_use]
    pub fn new(
        world: &'a dyn WorldView,
        danger: &'a dyn DangerField,
        memory: &'a EnemyMemory,
        situation: Situation,
        quotas: &'a CompositionQuotas,
        config: &'a TacticsConfig,
    ) -> Self {
        Self {
            world,
            danger,
            memory,
            situation,
            quotas,
            config,
        }
    }

    /// Current frame.
    #[must_use]
    pub fn frame(&self) -> u32 {
        self.world.frame()
    }

    /// Own production structures and townhalls.
    pub fn key_structures(&self) -> impl Iterator<Item = &'a Unit> {
        self.world.own_units().iter().filter(|u| {
            u.is_structure() && u.unit_type.roles().intersects(UnitRole::PRODUCTION | UnitRole::TOWNHALL)
        })
    }

    /// Visible enemy units that fight (not workers, not unarmed structures).
    pub fn known_threats(&self) -> impl Iterator<Item = &'a Unit> {
        self.memory.known_enemy_units().filter(|u| is_threat(u))
    }

    /// Visible enemies within `radius` of `point`.
    pub fn known_enemies_near(&self, point: Vec2Fixed, radius: Fixed) -> impl Iterator<Item = &'a Unit> {
        self.memory
            .known_enemy_units()
            .filter(move |u| u.position.is_within(point, radius))
    }

    /// Held bases with a visible threat within `radius`.
    pub fn threatened_bases(&self, radius: Fixed) -> impl Iterator<Item = &'a Base> {
        let memory = self.memory;
        self.world.bases().iter().filter(move |b| {
            memory
                .known_enemy_units()
                .any(|e| is_threat(e) && e.position.is_within(b.position, radius))
        })
    }

    /// Where to fall back to when nothing better is known: the nearest held
    /// base, or a point away from the enemy start.
    #[must_use]
    pub fn home(&self, from: Vec2Fixed) -> Vec2Fixed {
        self.world.nearest_base(from).map_or_else(
            || from.away_from(self.world.enemy_start(), Fixed::from_num(10)),
            |b| b.safe_point,
        )
    }

    /// Nearest known objective: a remembered enemy unit or structure, else
    /// the enemy start location.
    #[must_use]
    pub fn nearest_objective(&self, from: Vec2Fixed) -> Vec2Fixed {
        self.memory
            .all_enemy_units()
            .min_by_key(|u| (u.position.distance_squared(from), u.tag))
            .map_or_else(|| self.world.enemy_start(), |u| u.position)
    }
}

/// Whether an enemy unit contributes to fighting strength.
#[must_use]
pub fn is_threat(unit: &Unit) -> bool {
    (!unit.is_worker() && unit.can_attack())
        || (unit.has_role(UnitRole::GARRISON) && !unit.passengers.is_empty())
}
