//! Retreat, disengage and hold-back movement.

use tracing::trace;

use super::healer::heal_target;
use crate::clustering::Army;
use crate::combat::nearest_threat;
use crate::command::{Ability, Action, CommandBuffer, Target};
use crate::context::TickContext;
use crate::math::{Fixed, Vec2Fixed};
use crate::unit::Unit;
use crate::unit_type::UnitRole;
use crate::world::Layer;

/// Where a retreating army gathers.
///
/// The nearest held base's safe point, pulled toward a base that is being
/// harassed when there is one.
#[must_use]
pub fn retreat_anchor(ctx: &TickContext<'_>, from: Vec2Fixed) -> Vec2Fixed {
    let home = ctx.home(from);
    let harassed = ctx
        .threatened_bases(ctx.config.orders.base_defense_radius)
        .min_by_key(|b| (b.position.distance_squared(from), b.townhall))
        .map(|b| b.position);
    match harassed {
        Some(bias) => ctx.danger.safest_tile(
            home,
            ctx.config.micro.retreat_arrive_distance,
            Some(bias),
            Layer::Ground,
        ),
        None => home,
    }
}

/// A step away from the nearest ranged threat, toward `anchor` where safe.
#[must_use]
pub fn step_away<'a, I>(ctx: &TickContext<'_>, unit: &Unit, enemies: I, anchor: Vec2Fixed) -> Option<Vec2Fixed>
where
    I: IntoIterator<Item = &'a Unit>,
{
    let micro = &ctx.config.micro;
    let threat = nearest_threat(unit, enemies, micro.threat_margin)?;
    let ranged = threat
        .weapon_against(unit)
        .is_some_and(|w| w.range > Fixed::ONE);
    if !ranged {
        return None;
    }
    let away = unit.position.away_from(threat.position, micro.stutter_step);
    Some(
        ctx.danger
            .safest_tile(away, micro.stutter_step, Some(anchor), Layer::of(unit)),
    )
}

fn retreat_unit(ctx: &TickContext<'_>, unit: &Unit, anchor: Vec2Fixed, commands: &mut CommandBuffer) {
    let nearby = ctx.known_enemies_near(unit.position, unit.max_range() + Fixed::from_num(10));
    if let Some(step) = step_away(ctx, unit, nearby, anchor) {
        trace!(unit = unit.tag, "stepping away before retreat");
        commands.issue(unit.tag, Action::Move(step));
        return;
    }
    if !unit
        .position
        .is_within(anchor, ctx.config.micro.retreat_arrive_distance)
    {
        commands.issue(unit.tag, Action::Move(anchor));
    } else if !unit.passengers.is_empty() && !unit.has_role(UnitRole::GARRISON) {
        trace!(unit = unit.tag, cargo = unit.passengers.len(), "unloading at retreat anchor");
        commands.issue(unit.tag, Action::UnloadAll);
    }
}

pub(super) fn retreat_army(ctx: &TickContext<'_>, army: &Army, members: &[&Unit], commands: &mut CommandBuffer) {
    let anchor = retreat_anchor(ctx, army.center);
    for unit in members {
        retreat_unit(ctx, unit, anchor, commands);
    }
}

/// Fall back to the anchor while healers keep healing.
pub(super) fn hold_back(ctx: &TickContext<'_>, army: &Army, members: &[&Unit], commands: &mut CommandBuffer) {
    let anchor = retreat_anchor(ctx, army.center);
    let heal_range = ctx.config.micro.heal_range;
    for unit in members {
        if unit.has_role(UnitRole::HEALER) && unit.energy > 0 {
            if let Some(target) = heal_target(ctx, unit, members.iter().copied()) {
                if target.position.is_within(unit.position, heal_range) {
                    commands.use_ability(unit.tag, Ability::Heal, Target::Unit(target.tag));
                } else {
                    commands.issue(unit.tag, Action::Move(target.position));
                }
                continue;
            }
        }
        retreat_unit(ctx, unit, anchor, commands);
    }
}
