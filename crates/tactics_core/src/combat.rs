//! Target scoring and threat queries shared by unit micro and the garrison
//! controller.
//!
//! All selections are deterministic: ties break on the lowest tag so that
//! the same snapshot always yields the same target.

use crate::math::{Fixed, Vec2Fixed};
use crate::unit::Unit;

/// Whether `attacker` deals bonus damage to `target`.
#[must_use]
pub fn bonus_applies(attacker: &Unit, target: &Unit) -> bool {
    attacker
        .unit_type
        .bonus_vs()
        .is_some_and(|role| target.has_role(role))
}

/// Pick the target with the lowest effective health among `candidates`,
/// preferring those for which `preferred` holds.
pub fn lowest_health_target<'a, I, P>(candidates: I, preferred: P) -> Option<&'a Unit>
where
    I: IntoIterator<Item = &'a Unit>,
    P: Fn(&Unit) -> bool,
{
    candidates
        .into_iter()
        .min_by_key(|t| (!preferred(t), t.effective_health(), t.tag))
}

/// Best target for `attacker` among `enemies` that are inside weapon range.
///
/// Lowest current effective health wins; when the attacker has a bonus
/// damage class, targets of that class come first.
pub fn select_target<'a, I>(attacker: &Unit, enemies: I) -> Option<&'a Unit>
where
    I: IntoIterator<Item = &'a Unit>,
{
    let has_bonus = attacker.unit_type.bonus_vs().is_some();
    lowest_health_target(
        enemies
            .into_iter()
            .filter(|t| attacker.in_range_of(t, Fixed::ZERO)),
        |t| has_bonus && bonus_applies(attacker, t),
    )
}

/// Nearest enemy that can hit `unit`, if it is within its own range plus `margin`.
pub fn nearest_threat<'a, I>(unit: &Unit, enemies: I, margin: Fixed) -> Option<&'a Unit>
where
    I: IntoIterator<Item = &'a Unit>,
{
    enemies
        .into_iter()
        .filter(|e| e.in_range_of(unit, margin))
        .min_by_key(|e| (e.position.distance_squared(unit.position), e.tag))
}

/// Nearest unit to a point among `units`.
pub fn nearest<'a, I>(units: I, point: Vec2Fixed) -> Option<&'a Unit>
where
    I: IntoIterator<Item = &'a Unit>,
{
    units
        .into_iter()
        .min_by_key(|u| (u.position.distance_squared(point), u.tag))
}

/// Whether `threat` shoots more often than `unit` against its layer.
#[must_use]
pub fn fires_faster(threat: &Unit, unit: &Unit) -> bool {
    let theirs = threat.weapon_against(unit).map(|w| w.cooldown);
    let ours = unit.weapon_against(threat).map(|w| w.cooldown);
    match (theirs, ours) {
        (Some(theirs), Some(ours)) => theirs < ours,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Whether `unit` outranges `threat` in the matchup between them.
#[must_use]
pub fn outranges(unit: &Unit, threat: &Unit) -> bool {
    match (unit.weapon_against(threat), threat.weapon_against(unit)) {
        (Some(ours), Some(theirs)) => ours.range > theirs.range,
        (Some(_), None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::Alliance;
    use crate::unit_type::UnitType;

    fn enemy(tag: u64, unit_type: UnitType, x: i32) -> Unit {
        Unit::new(tag, unit_type, Alliance::Enemy, Vec2Fixed::from_ints(x, 0))
    }

    fn own(unit_type: UnitType) -> Unit {
        Unit::new(1, unit_type, Alliance::Own, Vec2Fixed::ZERO)
    }

    #[test]
    fn test_select_lowest_health_in_range() {
        let marine = own(UnitType::Marine);
        let enemies = vec![
            enemy(10, UnitType::Zergling, 3).with_health(30),
            enemy(11, UnitType::Zergling, 4).with_health(10),
            enemy(12, UnitType::Zergling, 20).with_health(1),
        ];
        let target = select_target(&marine, &enemies).map(|t| t.tag);
        assert_eq!(target, Some(11));
    }

    #[test]
    fn test_bonus_class_preferred() {
        let marauder = own(UnitType::Marauder);
        let enemies = vec![
            enemy(10, UnitType::Zergling, 3).with_health(5),
            enemy(11, UnitType::Roach, 4),
        ];
        assert_eq!(select_target(&marauder, &enemies).map(|t| t.tag), Some(11));
        // no bonus: plain lowest health
        let marine = own(UnitType::Marine);
        assert_eq!(select_target(&marine, &enemies).map(|t| t.tag), Some(10));
    }

    #[test]
    fn test_ties_break_on_tag() {
        let marine = own(UnitType::Marine);
        let enemies = vec![enemy(21, UnitType::Zergling, 3), enemy(20, UnitType::Zergling, 3)];
        assert_eq!(select_target(&marine, &enemies).map(|t| t.tag), Some(20));
    }

    #[test]
    fn test_nearest_threat_requires_weapon() {
        let medivac = own(UnitType::Medivac);
        let enemies = vec![enemy(10, UnitType::Zergling, 1), enemy(11, UnitType::Hydralisk, 5)];
        let threat = nearest_threat(&medivac, &enemies, Fixed::ZERO).map(|t| t.tag);
        assert_eq!(threat, Some(11));
    }

    #[test]
    fn test_fire_rate_and_range_comparisons() {
        let marauder = own(UnitType::Marauder);
        let zealot = enemy(10, UnitType::Zealot, 1);
        assert!(outranges(&marauder, &zealot));
        let marine = own(UnitType::Marine);
        let stalker = enemy(11, UnitType::Stalker, 1);
        assert!(!outranges(&marine, &stalker));
        assert!(fires_faster(&marine, &stalker));
        assert!(!fires_faster(&stalker, &marine));
    }
}
