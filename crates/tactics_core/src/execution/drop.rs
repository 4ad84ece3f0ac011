//! Drop play: loading ground units into transports, flying to the target,
//! unloading, and picking units back up from a losing drop.
//!
//! A drop aborts to the retreat anchor whenever the danger at a transport
//! passes `drop_abort_danger`.

use std::cmp::Reverse;

use tracing::debug;

use super::retreat::retreat_anchor;
use super::{engagement_targets, handler_for, Engagement};
use crate::clustering::Army;
use crate::command::{Action, CommandBuffer};
use crate::context::TickContext;
use crate::math::{Fixed, Vec2Fixed};
use crate::orders::Order;
use crate::unit::{Unit, UnitTag};
use crate::unit_type::UnitRole;
use crate::world::Layer;

/// Where to drop: the nearest remembered enemy townhall, any remembered
/// structure, or the enemy start.
#[must_use]
pub fn drop_target(ctx: &TickContext<'_>, from: Vec2Fixed) -> Vec2Fixed {
    let nearest = |townhall_only: bool| {
        ctx.memory
            .remembered_structures()
            .filter(|s| !townhall_only || s.has_role(UnitRole::TOWNHALL))
            .min_by_key(|s| (s.position.distance_squared(from), s.tag))
            .map(|s| s.position)
    };
    nearest(true)
        .or_else(|| nearest(false))
        .unwrap_or_else(|| ctx.world.enemy_start())
}

/// Whether a transport is close enough to `target` to unload: inside the
/// unload distance, or on the target's terrain level within the plateau
/// distance.
#[must_use]
pub fn should_unload(ctx: &TickContext<'_>, transport: &Unit, target: Vec2Fixed) -> bool {
    let micro = &ctx.config.micro;
    if transport.position.is_within(target, micro.unload_distance) {
        return true;
    }
    transport.position.is_within(target, micro.plateau_distance)
        && ctx.world.terrain_height(transport.position) == ctx.world.terrain_height(target)
}

fn overextended(ctx: &TickContext<'_>, transport: &Unit) -> bool {
    let micro = &ctx.config.micro;
    ctx.danger
        .danger(transport.position, micro.unload_distance, Layer::of(transport))
        >= micro.drop_abort_danger
}

/// Assign `cargo` units to `transports`, largest cargo size first.
///
/// Each unit goes to the nearest transport within `load_distance` that still
/// has room for it. Returns `(transport, passenger)` pairs.
#[must_use]
pub fn plan_loads(transports: &[&Unit], cargo: &[&Unit], load_distance: Fixed) -> Vec<(UnitTag, UnitTag)> {
    let mut free: Vec<(u8, &Unit)> = transports.iter().map(|t| (t.cargo_free(), *t)).collect();
    let mut candidates: Vec<&Unit> = cargo
        .iter()
        .copied()
        .filter(|u| u.unit_type.cargo_size() > 0)
        .collect();
    candidates.sort_by_key(|u| (Reverse(u.unit_type.cargo_size()), u.tag));

    let mut plan = Vec::new();
    for unit in candidates {
        let size = unit.unit_type.cargo_size();
        let slot = free
            .iter_mut()
            .filter(|(room, t)| *room >= size && t.position.is_within(unit.position, load_distance))
            .min_by_key(|(_, t)| (t.position.distance_squared(unit.position), t.tag));
        if let Some((room, transport)) = slot {
            *room -= size;
            plan.push((transport.tag, unit.tag));
        }
    }
    plan
}

pub(super) fn execute_drop(ctx: &TickContext<'_>, army: &Army, members: &[&Unit], commands: &mut CommandBuffer) {
    let transports: Vec<&Unit> = members
        .iter()
        .copied()
        .filter(|u| u.has_role(UnitRole::TRANSPORT))
        .collect();
    let ground: Vec<&Unit> = members.iter().copied().filter(|u| !u.is_flying).collect();
    let anchor = retreat_anchor(ctx, army.center);
    let target = drop_target(ctx, army.center);

    for transport in &transports {
        if overextended(ctx, transport) {
            debug!(transport = transport.tag, "drop aborted, transport in danger");
            commands.issue(transport.tag, Action::Move(anchor));
        }
    }
    let flying: Vec<&Unit> = transports
        .iter()
        .copied()
        .filter(|t| !commands.has_command(t.tag))
        .collect();

    match army.order {
        Order::DropLoad => load(ctx, &flying, &ground, None, commands),
        Order::DropPickUp => {
            let bio: Vec<&Unit> = ground.iter().copied().filter(|u| u.is_bio()).collect();
            load(ctx, &flying, &bio, Some(anchor), commands);
        }
        Order::DropMove => {
            for transport in &flying {
                if !transport.passengers.is_empty() && should_unload(ctx, transport, target) {
                    commands.issue(transport.tag, Action::UnloadAt(target));
                } else {
                    commands.issue(transport.tag, Action::Move(target));
                }
            }
            for unit in &ground {
                commands.issue(unit.tag, Action::Move(anchor));
            }
        }
        Order::DropUnload => unload(ctx, army, members, &flying, target, commands),
        _ => {}
    }
}

/// Load `cargo` into `transports`; whatever cannot board walks to a
/// transport with room, or to `fallback` when there is none.
fn load(
    ctx: &TickContext<'_>,
    transports: &[&Unit],
    cargo: &[&Unit],
    fallback: Option<Vec2Fixed>,
    commands: &mut CommandBuffer,
) {
    let plan = plan_loads(transports, cargo, ctx.config.micro.load_distance);
    for (transport, passenger) in &plan {
        commands.issue(*transport, Action::Load(*passenger));
    }

    let open = |unit: &Unit| {
        transports
            .iter()
            .copied()
            .filter(|t| t.cargo_free() >= unit.unit_type.cargo_size())
            .min_by_key(|t| (t.position.distance_squared(unit.position), t.tag))
    };
    for unit in cargo {
        if plan.iter().any(|(_, p)| *p == unit.tag) {
            continue;
        }
        match (open(unit), fallback) {
            (Some(transport), _) => commands.issue(unit.tag, Action::Move(transport.position)),
            (None, Some(point)) => commands.issue(unit.tag, Action::Move(point)),
            (None, None) => {}
        }
    }

    let gather = Vec2Fixed::centroid(cargo.iter().map(|u| u.position));
    for transport in transports {
        if plan.iter().any(|(t, _)| *t == transport.tag) {
            continue;
        }
        match fallback {
            Some(point) if transport.cargo_free() == 0 || cargo.is_empty() => {
                commands.issue(transport.tag, Action::Move(point));
            }
            _ if !cargo.is_empty() => commands.issue(transport.tag, Action::Move(gather)),
            _ => {}
        }
    }
}

/// Empty the transports and turn the dropped units on the nearest workers.
fn unload(
    ctx: &TickContext<'_>,
    army: &Army,
    members: &[&Unit],
    transports: &[&Unit],
    target: Vec2Fixed,
    commands: &mut CommandBuffer,
) {
    for transport in transports {
        if !transport.passengers.is_empty() {
            commands.issue(transport.tag, Action::UnloadAll);
        }
    }
    let engagement = Engagement {
        army,
        order: Order::DropUnload,
        members: members.to_vec(),
        enemies: engagement_targets(Order::Harass, army, target, ctx),
        destination: target,
    };
    for unit in members {
        if !commands.has_command(unit.tag) {
            handler_for(unit)(ctx, unit, &engagement, commands);
        }
    }
}
