//! Test fixtures and helpers.
//!
//! Pre-built units and squads for consistent testing.

use tactics_core::math::{Fixed, Vec2Fixed};
use tactics_core::unit::{Alliance, Unit, UnitTag};
use tactics_core::unit_type::UnitType;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> Fixed {
    Fixed::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: decision code never uses floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> Fixed {
    Fixed::from_num(n)
}

/// Point from integer coordinates.
#[must_use]
pub fn point(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::from_ints(x, y)
}

/// A full-health own unit with catalogue defaults.
#[must_use]
pub fn own_unit(tag: UnitTag, unit_type: UnitType, x: i32, y: i32) -> Unit {
    Unit::new(tag, unit_type, Alliance::Own, point(x, y))
}

/// A full-health enemy unit with catalogue defaults.
#[must_use]
pub fn enemy_unit(tag: UnitTag, unit_type: UnitType, x: i32, y: i32) -> Unit {
    Unit::new(tag, unit_type, Alliance::Enemy, point(x, y))
}

/// `count` units in a row along +x, one tile apart, tagged from `first_tag`.
#[must_use]
pub fn line_of(
    first_tag: UnitTag,
    count: u32,
    unit_type: UnitType,
    alliance: Alliance,
    origin: Vec2Fixed,
) -> Vec<Unit> {
    (0..count)
        .map(|i| {
            let offset = Vec2Fixed::new(Fixed::from_num(i), Fixed::ZERO);
            Unit::new(first_tag + UnitTag::from(i), unit_type, alliance, origin + offset)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of_tags_and_spacing() {
        let squad = line_of(10, 3, UnitType::Marine, Alliance::Own, point(5, 5));
        let tags: Vec<_> = squad.iter().map(|u| u.tag).collect();
        assert_eq!(tags, vec![10, 11, 12]);
        assert_eq!(squad[2].position, point(7, 5));
    }

    #[test]
    fn test_unit_defaults() {
        let roach = enemy_unit(1, UnitType::Roach, 0, 0);
        assert_eq!(roach.alliance, Alliance::Enemy);
        assert_eq!(roach.health, roach.health_max);
        assert_eq!(fixed_f(0.5), fixed(1) / 2);
    }
}
