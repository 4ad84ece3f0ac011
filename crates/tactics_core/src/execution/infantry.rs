//! Ranged infantry micro: stim, focus fire and stutter-step.

use tracing::trace;

use super::Engagement;
use crate::combat::{fires_faster, nearest, nearest_threat, outranges, select_target};
use crate::command::{Ability, Action, CommandBuffer, Target};
use crate::context::TickContext;
use crate::math::Vec2Fixed;
use crate::unit::Unit;
use crate::unit_type::{UnitType, Upgrade};

/// Whether `unit` should stim now.
///
/// Requires finished research, an unstimmed stim-capable unit and enough
/// health to pay for it.
#[must_use]
pub fn should_stim(ctx: &TickContext<'_>, unit: &Unit) -> bool {
    matches!(unit.unit_type, UnitType::Marine | UnitType::Marauder)
        && !unit.is_stimmed
        && ctx.world.has_upgrade(Upgrade::Stimpack)
        && unit.health_fraction() >= ctx.config.micro.stim_min_health
}

/// Point to step back to while the weapon reloads, if stepping back pays.
///
/// The unit steps away only from a threat that is in range, fires faster,
/// is facing it, and that the unit itself outranges.
#[must_use]
pub fn stutter_step<'a, I>(ctx: &TickContext<'_>, unit: &Unit, enemies: I) -> Option<Vec2Fixed>
where
    I: IntoIterator<Item = &'a Unit>,
{
    if !unit.weapon_on_cooldown() {
        return None;
    }
    let micro = &ctx.config.micro;
    let threat = nearest_threat(unit, enemies, micro.threat_margin)?;
    let kite = fires_faster(threat, unit)
        && threat.is_facing(unit.position, micro.facing_cos)
        && outranges(unit, threat);
    kite.then(|| unit.position.away_from(threat.position, micro.stutter_step))
}

/// Attack the best target in range, or close in on the nearest enemy.
///
/// Closing in heads for the danger field's firing position against that
/// enemy rather than its exact location.
pub(super) fn attack_or_close_in(
    ctx: &TickContext<'_>,
    unit: &Unit,
    engagement: &Engagement<'_>,
    commands: &mut CommandBuffer,
) -> bool {
    if let Some(target) = select_target(unit, engagement.enemies.iter().copied()) {
        commands.issue(unit.tag, Action::Attack(target.tag));
        return true;
    }
    let towards = nearest(
        engagement
            .enemies
            .iter()
            .copied()
            .filter(|e| unit.can_attack_unit(e)),
        unit.position,
    )
    .map_or(engagement.destination, |e| ctx.danger.best_attack_position(unit, e));
    commands.issue(unit.tag, Action::AttackMove(towards));
    false
}

/// Micro for stim-capable ranged infantry.
pub(super) fn ranged_bio(
    ctx: &TickContext<'_>,
    unit: &Unit,
    engagement: &Engagement<'_>,
    commands: &mut CommandBuffer,
) {
    let in_range = engagement
        .enemies
        .iter()
        .any(|e| unit.in_range_of(e, ctx.config.micro.threat_margin));
    if in_range && should_stim(ctx, unit) {
        commands.use_ability(unit.tag, Ability::Stim, Target::None);
    }
    if let Some(step) = stutter_step(ctx, unit, engagement.enemies.iter().copied()) {
        trace!(unit = unit.tag, "stutter step");
        commands.issue(unit.tag, Action::Move(step));
        return;
    }
    attack_or_close_in(ctx, unit, engagement, commands);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Fixed, PI};
    use crate::orders::Order;
    use crate::testing::{enemy, own, Harness};
    use crate::world::DangerField;

    #[test]
    fn test_stim_needs_research_and_health() {
        let mut h = Harness::new();
        let marine = own(1, UnitType::Marine, 0, 0);
        assert!(!should_stim(&h.ctx(), &marine));

        h.world.upgrades.insert(Upgrade::Stimpack, Fixed::ONE);
        assert!(should_stim(&h.ctx(), &marine));
        assert!(!should_stim(&h.ctx(), &marine.clone().stimmed()));
        assert!(!should_stim(&h.ctx(), &marine.clone().with_health(20)));
        assert!(!should_stim(&h.ctx(), &own(2, UnitType::Reaper, 0, 0)));
    }

    #[test]
    fn test_stutter_step_away_from_facing_faster_shorter_threat() {
        let h = Harness::new();
        // marauder reloading, zergling to the east facing west
        let marauder = own(1, UnitType::Marauder, 0, 0).with_weapon_cooldown(Fixed::from_num(10));
        let ling = enemy(10, UnitType::Zergling, 1, 0).with_facing(PI);
        let step = stutter_step(&h.ctx(), &marauder, [&ling]).unwrap();
        assert!(step.x < Fixed::ZERO);
    }

    #[test]
    fn test_no_stutter_step_when_ready_or_outranged() {
        let h = Harness::new();
        let ready = own(1, UnitType::Marauder, 0, 0);
        let ling = enemy(10, UnitType::Zergling, 1, 0).with_facing(PI);
        assert!(stutter_step(&h.ctx(), &ready, [&ling]).is_none());

        // threat facing away
        let reloading = own(1, UnitType::Marauder, 0, 0).with_weapon_cooldown(Fixed::from_num(10));
        let turned = enemy(10, UnitType::Zergling, 1, 0);
        assert!(stutter_step(&h.ctx(), &reloading, [&turned]).is_none());
    }

    #[test]
    fn test_close_in_stops_at_firing_range() {
        let mut h = Harness::new();
        h.world.own.push(own(1, UnitType::Marine, 0, 0));
        h.world.enemies.push(enemy(10, UnitType::Roach, 20, 0));
        h.world.enemies.push(enemy(11, UnitType::Roach, 30, 0));
        h.refresh();
        let armies = h.armies();
        let engagement = Engagement {
            army: &armies[0],
            order: Order::Attack,
            members: h.world.own.iter().collect(),
            enemies: h.world.enemies.iter().collect(),
            destination: Vec2Fixed::from_ints(40, 0),
        };
        let mut commands = CommandBuffer::new();
        assert!(!attack_or_close_in(&h.ctx(), &h.world.own[0], &engagement, &mut commands));

        let marine = &h.world.own[0];
        let roach = &h.world.enemies[0];
        let firing = h.danger.best_attack_position(marine, roach);
        assert!(firing.x > marine.position.x && firing.x < roach.position.x);
        assert_eq!(
            commands.for_unit(1).copied().collect::<Vec<_>>(),
            vec![Action::AttackMove(firing)]
        );
    }
}
