//! In-crate test helpers.

use crate::clustering::{cluster_world, Army};
use crate::config::TacticsConfig;
use crate::context::TickContext;
use crate::math::{Fixed, Vec2Fixed};
use crate::memory::EnemyMemory;
use crate::unit::{Alliance, Unit, UnitTag};
use crate::unit_type::UnitType;
use crate::world::{CompositionQuotas, DangerField, Layer, Situation, SnapshotWorld};

pub(crate) fn own(tag: UnitTag, unit_type: UnitType, x: i32, y: i32) -> Unit {
    Unit::new(tag, unit_type, Alliance::Own, Vec2Fixed::from_ints(x, y))
}

pub(crate) fn enemy(tag: UnitTag, unit_type: UnitType, x: i32, y: i32) -> Unit {
    Unit::new(tag, unit_type, Alliance::Enemy, Vec2Fixed::from_ints(x, y))
}

/// Danger from a list of hot spots; safe tiles drift toward the bias.
#[derive(Debug, Clone, Default)]
pub(crate) struct FlatDanger {
    spots: Vec<(Vec2Fixed, Fixed)>,
}

impl FlatDanger {
    pub(crate) fn add(&mut self, point: Vec2Fixed, level: Fixed) {
        self.spots.push((point, level));
    }
}

impl DangerField for FlatDanger {
    fn danger(&self, point: Vec2Fixed, radius: Fixed, _layer: Layer) -> Fixed {
        self.spots
            .iter()
            .filter(|(p, _)| p.is_within(point, radius))
            .map(|(_, level)| *level)
            .sum()
    }

    fn safest_tile(&self, origin: Vec2Fixed, radius: Fixed, bias: Option<Vec2Fixed>, _layer: Layer) -> Vec2Fixed {
        bias.map_or(origin, |b| origin.towards(b, radius.min(origin.distance(b))))
    }

    fn best_attack_position(&self, attacker: &Unit, target: &Unit) -> Vec2Fixed {
        let range = attacker.real_range_against(target).unwrap_or(Fixed::ZERO);
        target.position.towards(attacker.position, range)
    }
}

/// Owns every per-tick input so tests can build a [`TickContext`].
pub(crate) struct Harness {
    pub world: SnapshotWorld,
    pub danger: FlatDanger,
    pub memory: EnemyMemory,
    pub quotas: CompositionQuotas,
    pub config: TacticsConfig,
    pub situation: Situation,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self {
            world: SnapshotWorld::new(),
            danger: FlatDanger::default(),
            memory: EnemyMemory::new(),
            quotas: CompositionQuotas::new(),
            config: TacticsConfig::default(),
            situation: Situation::Stable,
        }
    }

    /// Pull the current snapshot into enemy memory.
    pub(crate) fn refresh(&mut self) {
        self.memory.refresh(&self.world, &self.config.memory);
    }

    pub(crate) fn ctx(&self) -> TickContext<'_> {
        TickContext::new(
            &self.world,
            &self.danger,
            &self.memory,
            self.situation,
            &self.quotas,
            &self.config,
        )
    }

    pub(crate) fn armies(&self) -> Vec<Army> {
        cluster_world(&self.world, &self.config.clustering)
    }
}
