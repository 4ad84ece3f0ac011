//! A danger field computed from visible enemy weapons.

use tactics_core::math::{Fixed, Vec2Fixed, TAU};
use tactics_core::unit::Unit;
use tactics_core::world::{DangerField, Layer};

/// Candidate directions sampled by [`ProximityDanger::safest_tile`].
const DIRECTIONS: i32 = 8;

#[derive(Debug, Clone, Copy)]
struct Threat {
    position: Vec2Fixed,
    ground_reach: Option<Fixed>,
    air_reach: Option<Fixed>,
    dps: Fixed,
}

impl Threat {
    fn reach(&self, layer: Layer) -> Option<Fixed> {
        match layer {
            Layer::Ground => self.ground_reach,
            Layer::Air => self.air_reach,
        }
    }
}

/// Danger at a point is the summed dps of every enemy whose weapon reaches
/// the query circle on that layer.
#[derive(Debug, Clone, Default)]
pub struct ProximityDanger {
    threats: Vec<Threat>,
}

impl ProximityDanger {
    /// Build from the enemies visible this tick.
    pub fn from_enemies<'a, I>(enemies: I) -> Self
    where
        I: IntoIterator<Item = &'a Unit>,
    {
        let threats = enemies
            .into_iter()
            .filter(|e| e.can_attack())
            .map(|e| {
                let dps = e
                    .ground_weapon
                    .or(e.air_weapon)
                    .map_or(Fixed::ZERO, |w| w.dps);
                Threat {
                    position: e.position,
                    ground_reach: e.ground_weapon.map(|w| w.range + e.radius),
                    air_reach: e.air_weapon.map(|w| w.range + e.radius),
                    dps,
                }
            })
            .collect();
        Self { threats }
    }
}

impl DangerField for ProximityDanger {
    fn danger(&self, point: Vec2Fixed, radius: Fixed, layer: Layer) -> Fixed {
        self.threats
            .iter()
            .filter(|t| {
                t.reach(layer)
                    .is_some_and(|reach| t.position.is_within(point, reach + radius))
            })
            .map(|t| t.dps)
            .sum()
    }

    fn safest_tile(
        &self,
        origin: Vec2Fixed,
        radius: Fixed,
        bias: Option<Vec2Fixed>,
        layer: Layer,
    ) -> Vec2Fixed {
        let step = TAU / Fixed::from_num(DIRECTIONS);
        let ring = (0..DIRECTIONS).map(|i| origin + Vec2Fixed::from_angle(step * Fixed::from_num(i)).scale(radius));
        std::iter::once(origin)
            .chain(ring)
            .min_by_key(|c| {
                (
                    self.danger(*c, Fixed::ONE, layer),
                    bias.map_or(Fixed::ZERO, |b| c.distance_squared(b)),
                )
            })
            .unwrap_or(origin)
    }

    fn best_attack_position(&self, attacker: &Unit, target: &Unit) -> Vec2Fixed {
        let range = attacker.real_range_against(target).unwrap_or(Fixed::ZERO);
        target.position.towards(attacker.position, range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::unit::Alliance;
    use tactics_core::unit_type::UnitType;

    fn enemy(unit_type: UnitType, x: i32, y: i32) -> Unit {
        Unit::new(1, unit_type, Alliance::Enemy, Vec2Fixed::from_ints(x, y))
    }

    #[test]
    fn test_danger_respects_layer() {
        let roach = enemy(UnitType::Roach, 0, 0);
        let field = ProximityDanger::from_enemies([&roach]);
        let near = Vec2Fixed::from_ints(3, 0);
        assert!(field.danger(near, Fixed::ONE, Layer::Ground) > Fixed::ZERO);
        assert_eq!(field.danger(near, Fixed::ONE, Layer::Air), Fixed::ZERO);
        assert_eq!(
            field.danger(Vec2Fixed::from_ints(20, 0), Fixed::ONE, Layer::Ground),
            Fixed::ZERO
        );
    }

    #[test]
    fn test_safest_tile_leaves_danger() {
        let roach = enemy(UnitType::Roach, 0, 0);
        let field = ProximityDanger::from_enemies([&roach]);
        let origin = Vec2Fixed::from_ints(4, 0);
        let safe = field.safest_tile(origin, Fixed::from_num(3), None, Layer::Ground);
        assert!(
            field.danger(safe, Fixed::ONE, Layer::Ground)
                < field.danger(origin, Fixed::ONE, Layer::Ground)
        );
    }

    #[test]
    fn test_no_enemies_keeps_origin() {
        let field = ProximityDanger::default();
        let origin = Vec2Fixed::from_ints(4, 4);
        assert_eq!(field.safest_tile(origin, Fixed::ONE, None, Layer::Ground), origin);
    }
}
