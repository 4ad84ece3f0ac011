//! Defending around a structure: infantry take cover in a nearby garrison
//! when the threat outside their reach is serious enough.

use tracing::trace;

use super::Engagement;
use crate::command::{Action, CommandBuffer};
use crate::context::TickContext;
use crate::garrison::effective_capacity;
use crate::math::Fixed;
use crate::strength;
use crate::unit::Unit;
use crate::unit_type::UnitRole;

/// Nearest finished own garrison with room for `unit`, within the seek radius.
#[must_use]
pub fn find_garrison<'a>(ctx: &TickContext<'a>, unit: &Unit) -> Option<&'a Unit> {
    let size = unit.unit_type.cargo_size();
    let radius = ctx.config.micro.garrison_seek_radius;
    ctx.world
        .own_units_near(unit.position, radius)
        .into_iter()
        .filter(|g| {
            g.has_role(UnitRole::GARRISON)
                && g.is_ready()
                && effective_capacity(ctx, g).saturating_sub(g.cargo_used()) >= size
        })
        .min_by_key(|g| (g.position.distance_squared(unit.position), g.tag))
}

/// Move toward, then enter, a nearby garrison when a significant threat sits
/// outside the unit's weapon range. Returns whether a command was issued;
/// `false` means the unit should fight in place.
pub fn seek_garrison(
    ctx: &TickContext<'_>,
    unit: &Unit,
    engagement: &Engagement<'_>,
    commands: &mut CommandBuffer,
) -> bool {
    if !unit.unit_type.is_garrison_eligible() {
        return false;
    }
    let Some(garrison) = find_garrison(ctx, unit) else {
        return false;
    };
    let micro = &ctx.config.micro;
    let unengaged = strength::weighted_supply(
        engagement
            .enemies
            .iter()
            .copied()
            .filter(|e| e.can_attack() && !unit.in_range_of(e, Fixed::ZERO)),
    );
    if unengaged < micro.garrison_threat_supply {
        return false;
    }
    if garrison
        .position
        .is_within(unit.position, micro.garrison_enter_distance + garrison.radius)
    {
        trace!(unit = unit.tag, garrison = garrison.tag, "entering garrison");
        commands.issue(unit.tag, Action::EnterGarrison(garrison.tag));
    } else {
        commands.issue(unit.tag, Action::Move(garrison.position));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2Fixed;
    use crate::orders::Order;
    use crate::testing::{enemy, own, Harness};
    use crate::unit::Passenger;
    use crate::unit_type::{UnitType, Upgrade};

    fn roach_pack(h: &mut Harness, x: i32) {
        for i in 0..3 {
            h.world.enemies.push(enemy(10 + i, UnitType::Roach, x, i as i32));
        }
    }

    fn seek(h: &Harness, tag: u64) -> (bool, Vec<Action>) {
        let armies = h.armies();
        let unit = h.world.own.iter().find(|u| u.tag == tag).unwrap();
        let engagement = Engagement {
            army: &armies[0],
            order: Order::Defend,
            members: vec![unit],
            enemies: h.world.enemies.iter().collect(),
            destination: unit.position,
        };
        let mut commands = CommandBuffer::new();
        let handled = seek_garrison(&h.ctx(), unit, &engagement, &mut commands);
        (handled, commands.for_unit(tag).copied().collect())
    }

    #[test]
    fn test_marine_enters_adjacent_bunker() {
        let mut h = Harness::new();
        h.world.own.push(own(1, UnitType::Marine, 0, 0));
        h.world.own.push(own(2, UnitType::Bunker, 2, 0));
        roach_pack(&mut h, 20);
        h.refresh();
        assert_eq!(seek(&h, 1), (true, vec![Action::EnterGarrison(2)]));
    }

    #[test]
    fn test_marine_walks_to_bunker() {
        let mut h = Harness::new();
        h.world.own.push(own(1, UnitType::Marine, 0, 0));
        h.world.own.push(own(2, UnitType::Bunker, 9, 0));
        roach_pack(&mut h, 25);
        h.refresh();
        assert_eq!(
            seek(&h, 1),
            (true, vec![Action::Move(Vec2Fixed::from_ints(9, 0))])
        );
    }

    #[test]
    fn test_fights_in_place_without_room_or_threat() {
        let mut h = Harness::new();
        h.world.own.push(own(1, UnitType::Marine, 0, 0));
        let full = (0..4).fold(own(2, UnitType::Bunker, 2, 0), |b, i| {
            b.with_passenger(Passenger::new(100 + i, UnitType::Marine))
        });
        h.world.own.push(full);
        roach_pack(&mut h, 20);
        h.refresh();
        assert_eq!(seek(&h, 1), (false, vec![]));

        let mut quiet = Harness::new();
        quiet.world.own.push(own(1, UnitType::Marine, 0, 0));
        quiet.world.own.push(own(2, UnitType::Bunker, 2, 0));
        quiet.world.enemies.push(enemy(10, UnitType::Zergling, 20, 0));
        quiet.refresh();
        assert_eq!(seek(&quiet, 1), (false, vec![]));
    }

    #[test]
    fn test_capacity_research_makes_room() {
        let mut h = Harness::new();
        h.world.own.push(own(1, UnitType::Marine, 0, 0));
        let full = (0..4).fold(own(2, UnitType::Bunker, 2, 0), |b, i| {
            b.with_passenger(Passenger::new(100 + i, UnitType::Marine))
        });
        h.world.own.push(full);
        h.world.upgrades.insert(Upgrade::NeosteelArmor, Fixed::ONE);
        roach_pack(&mut h, 20);
        h.refresh();
        assert_eq!(find_garrison(&h.ctx(), &h.world.own[0]).map(|g| g.tag), Some(2));
        assert_eq!(seek(&h, 1), (true, vec![Action::EnterGarrison(2)]));
    }
}
