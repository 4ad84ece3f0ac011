//! Sniper micro: cloak under fire, snipe valuable biological targets and
//! decloak once the area is quiet.

use tracing::trace;

use super::infantry::attack_or_close_in;
use super::Engagement;
use crate::command::{Ability, CommandBuffer, Target};
use crate::context::TickContext;
use crate::math::Fixed;
use crate::unit::Unit;
use crate::unit_type::Upgrade;

/// Whether any enemy is within cloak radius, and whether one of them can hit `unit`.
fn nearby_enemies(ctx: &TickContext<'_>, unit: &Unit, engagement: &Engagement<'_>) -> (bool, bool) {
    let radius = ctx.config.micro.cloak_radius;
    let mut close = engagement
        .enemies
        .iter()
        .filter(|e| e.position.is_within(unit.position, radius))
        .peekable();
    let any = close.peek().is_some();
    let threatened = close.any(|e| e.can_attack_unit(unit));
    (any, threatened)
}

/// Best snipe target: the healthiest biological enemy in range above the
/// health floor.
fn snipe_target<'a>(ctx: &TickContext<'_>, unit: &Unit, engagement: &Engagement<'a>) -> Option<&'a Unit> {
    let floor = ctx.config.micro.snipe_min_health;
    engagement
        .enemies
        .iter()
        .copied()
        .filter(|e| e.is_bio() && e.health >= floor && unit.in_range_of(e, Fixed::ZERO))
        .max_by_key(|e| (e.health, std::cmp::Reverse(e.tag)))
}

pub(super) fn sniper(ctx: &TickContext<'_>, unit: &Unit, engagement: &Engagement<'_>, commands: &mut CommandBuffer) {
    let micro = &ctx.config.micro;
    let has_energy = unit.energy >= micro.sniper_energy;
    let (any_close, threatened) = nearby_enemies(ctx, unit, engagement);

    if !unit.is_cloaked && threatened && has_energy && ctx.world.has_upgrade(Upgrade::PersonalCloaking) {
        trace!(unit = unit.tag, "cloak");
        commands.use_ability(unit.tag, Ability::Cloak, Target::None);
    } else if unit.is_cloaked && !any_close {
        trace!(unit = unit.tag, "decloak");
        commands.use_ability(unit.tag, Ability::Decloak, Target::None);
    }

    if has_energy {
        if let Some(target) = snipe_target(ctx, unit, engagement) {
            commands.use_ability(unit.tag, Ability::Snipe, Target::Unit(target.tag));
            return;
        }
    }
    attack_or_close_in(ctx, unit, engagement, commands);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Action;
    use crate::orders::Order;
    use crate::testing::{enemy, own, Harness};
    use crate::unit_type::UnitType;

    fn run(h: &Harness, unit_tag: u64) -> Vec<Action> {
        let mut armies = h.armies();
        armies[0].order = Order::Chase;
        let mut commands = CommandBuffer::new();
        super::super::execute(&armies, &h.ctx(), &mut commands);
        commands.for_unit(unit_tag).copied().collect()
    }

    #[test]
    fn test_snipes_healthy_bio_target() {
        let mut h = Harness::new();
        h.world.own.push(own(1, UnitType::Ghost, 0, 0));
        h.world.enemies.push(enemy(10, UnitType::Roach, 4, 0));
        h.world.enemies.push(enemy(11, UnitType::Zergling, 3, 0));
        h.refresh();
        let actions = run(&h, 1);
        assert!(actions.contains(&Action::UseAbility {
            ability: Ability::Snipe,
            target: Target::Unit(10),
        }));
    }

    #[test]
    fn test_cloaks_when_threatened_and_researched() {
        let mut h = Harness::new();
        h.world
            .upgrades
            .insert(Upgrade::PersonalCloaking, Fixed::ONE);
        h.world.own.push(own(1, UnitType::Ghost, 0, 0));
        h.world.enemies.push(enemy(10, UnitType::Zergling, 3, 0));
        h.refresh();
        let actions = run(&h, 1);
        assert!(actions.contains(&Action::UseAbility {
            ability: Ability::Cloak,
            target: Target::None,
        }));
        // zerglings are below the snipe floor, so the ghost shoots
        assert!(actions.contains(&Action::Attack(10)));
    }

    #[test]
    fn test_decloaks_when_clear() {
        let mut h = Harness::new();
        h.world.own.push(own(1, UnitType::Ghost, 0, 0).cloaked());
        h.world.enemies.push(enemy(10, UnitType::Roach, 30, 0));
        h.refresh();
        let armies = h.armies();
        let members = vec![&h.world.own[0]];
        let engagement = Engagement {
            army: &armies[0],
            order: Order::Attack,
            members,
            enemies: vec![&h.world.enemies[0]],
            destination: h.world.enemies[0].position,
        };
        let mut commands = CommandBuffer::new();
        sniper(&h.ctx(), &h.world.own[0], &engagement, &mut commands);
        assert!(commands.for_unit(1).any(|a| *a
            == Action::UseAbility {
                ability: Ability::Decloak,
                target: Target::None,
            }));
    }
}
