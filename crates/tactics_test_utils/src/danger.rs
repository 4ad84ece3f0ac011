//! Stub [`DangerField`] for tests.

use tactics_core::math::{Fixed, Vec2Fixed};
use tactics_core::unit::Unit;
use tactics_core::world::{DangerField, Layer};

/// Danger from a fixed list of hot spots.
///
/// `danger` sums every spot inside the query circle, `safest_tile` steps from
/// the origin toward the bias (or stays put without one), and attackers stand
/// at exactly their range from the target.
#[derive(Debug, Clone, Default)]
pub struct StubDanger {
    spots: Vec<(Vec2Fixed, Fixed, Option<Layer>)>,
}

impl StubDanger {
    /// No danger anywhere.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add danger at a point on both layers.
    #[must_use]
    pub fn with_spot(mut self, point: Vec2Fixed, level: Fixed) -> Self {
        self.add(point, level);
        self
    }

    /// Add danger at a point on both layers.
    pub fn add(&mut self, point: Vec2Fixed, level: Fixed) {
        self.spots.push((point, level, None));
    }

    /// Add danger at a point on one layer only.
    pub fn add_on(&mut self, point: Vec2Fixed, level: Fixed, layer: Layer) {
        self.spots.push((point, level, Some(layer)));
    }

    /// Remove every spot.
    pub fn clear(&mut self) {
        self.spots.clear();
    }
}

impl DangerField for StubDanger {
    fn danger(&self, point: Vec2Fixed, radius: Fixed, layer: Layer) -> Fixed {
        self.spots
            .iter()
            .filter(|(p, _, l)| l.map_or(true, |l| l == layer) && p.is_within(point, radius))
            .map(|(_, level, _)| *level)
            .sum()
    }

    fn safest_tile(
        &self,
        origin: Vec2Fixed,
        radius: Fixed,
        bias: Option<Vec2Fixed>,
        _layer: Layer,
    ) -> Vec2Fixed {
        bias.map_or(origin, |b| origin.towards(b, radius.min(origin.distance(b))))
    }

    fn best_attack_position(&self, attacker: &Unit, target: &Unit) -> Vec2Fixed {
        let range = attacker.real_range_against(target).unwrap_or(Fixed::ZERO);
        target.position.towards(attacker.position, range)
    }
}
