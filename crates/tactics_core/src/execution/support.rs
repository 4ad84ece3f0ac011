//! Micro for the detector escort, combat vehicles, air units and everything
//! without a routine of its own.

use super::infantry::attack_or_close_in;
use super::Engagement;
use crate::command::{Action, CommandBuffer};
use crate::context::TickContext;
use crate::unit::Unit;
use crate::world::Layer;

/// Follow the army center, settling on the safest tile near it.
pub(super) fn detector(ctx: &TickContext<'_>, unit: &Unit, engagement: &Engagement<'_>, commands: &mut CommandBuffer) {
    let center = engagement.army.center;
    let spot = ctx
        .danger
        .safest_tile(center, ctx.config.micro.detector_leash, Some(center), Layer::of(unit));
    commands.issue(unit.tag, Action::Move(spot));
}

/// Shoot the best target in range, otherwise close in.
pub(super) fn gunner(ctx: &TickContext<'_>, unit: &Unit, engagement: &Engagement<'_>, commands: &mut CommandBuffer) {
    attack_or_close_in(ctx, unit, engagement, commands);
}

/// Tag along with the army.
pub(super) fn passive(_ctx: &TickContext<'_>, unit: &Unit, engagement: &Engagement<'_>, commands: &mut CommandBuffer) {
    if unit.can_attack() {
        commands.issue(unit.tag, Action::AttackMove(engagement.destination));
    } else {
        commands.issue(unit.tag, Action::Move(engagement.army.center));
    }
}
