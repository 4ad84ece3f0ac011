//! Healer micro.

use super::Engagement;
use crate::command::{Ability, Action, CommandBuffer, Target};
use crate::context::TickContext;
use crate::math::Vec2Fixed;
use crate::unit::Unit;

/// Damaged biological ally to heal: allies inside heal range first, then the
/// nearest.
pub fn heal_target<'a, I>(ctx: &TickContext<'_>, healer: &Unit, allies: I) -> Option<&'a Unit>
where
    I: IntoIterator<Item = &'a Unit>,
{
    let range = ctx.config.micro.heal_range;
    allies
        .into_iter()
        .filter(|a| a.tag != healer.tag && a.is_bio() && a.is_damaged())
        .min_by_key(|a| {
            (
                !a.position.is_within(healer.position, range),
                a.position.distance_squared(healer.position),
                a.tag,
            )
        })
}

/// Where an idle healer should stand: over the army's ground units, or at
/// the nearest base when it has none.
fn reposition_point(ctx: &TickContext<'_>, healer: &Unit, engagement: &Engagement<'_>) -> Vec2Fixed {
    let mut ground = engagement.ground_allies(healer).peekable();
    if ground.peek().is_some() {
        Vec2Fixed::centroid(ground.map(|u| u.position))
    } else {
        ctx.home(healer.position)
    }
}

pub(super) fn healer(ctx: &TickContext<'_>, unit: &Unit, engagement: &Engagement<'_>, commands: &mut CommandBuffer) {
    if unit.energy > 0 {
        if let Some(target) = heal_target(ctx, unit, engagement.members.iter().copied()) {
            if target.position.is_within(unit.position, ctx.config.micro.heal_range) {
                commands.use_ability(unit.tag, Ability::Heal, Target::Unit(target.tag));
            } else {
                commands.issue(unit.tag, Action::Move(target.position));
            }
            return;
        }
    }
    let point = reposition_point(ctx, unit, engagement);
    if !point.is_within(unit.position, ctx.config.micro.heal_range) {
        commands.issue(unit.tag, Action::Move(point));
    }
}
