//! Execution layer: turns each army's order into unit commands.
//!
//! Orders split into three families:
//!
//! - retreat-like orders (`Retreat`, `Disengage`, `Heal`) handled by
//!   [`retreat`],
//! - drop play (`DropLoad`, `DropMove`, `DropUnload`, `DropPickUp`) handled by
//!   [`drop`],
//! - everything else engages: an [`Engagement`] is built once per army and
//!   every member is dispatched through [`MICRO_HANDLERS`] by its
//!   [`MicroRole`].
//!
//! No path here fails. Units that no longer resolve are skipped, and a fight
//! order with nothing to fight logs a warning and attack-moves to the nearest
//! known objective.

mod defense;
mod drop;
mod healer;
mod infantry;
mod retreat;
mod sniper;
mod support;

pub use defense::{find_garrison, seek_garrison};
pub use drop::{drop_target, should_unload};
pub use healer::heal_target;
pub use infantry::{should_stim, stutter_step};
pub use retreat::{retreat_anchor, step_away};

use tracing::{trace, warn};

use crate::clustering::Army;
use crate::combat::nearest;
use crate::command::{Action, CommandBuffer};
use crate::context::{is_threat, TickContext};
use crate::math::Vec2Fixed;
use crate::orders::Order;
use crate::unit::Unit;
use crate::unit_type::{MicroRole, UnitRole, UnitType};

/// Everything unit micro needs to know about its army's fight.
#[derive(Debug, Clone)]
pub struct Engagement<'a> {
    /// The army being executed.
    pub army: &'a Army,
    /// Its order this tick.
    pub order: Order,
    /// Resolved army members.
    pub members: Vec<&'a Unit>,
    /// Enemies the army should shoot at, best candidates only.
    pub enemies: Vec<&'a Unit>,
    /// Where the order points.
    pub destination: Vec2Fixed,
}

impl<'a> Engagement<'a> {
    /// Ground members other than `unit`.
    pub fn ground_allies<'s>(&'s self, unit: &'s Unit) -> impl Iterator<Item = &'a Unit> + 's {
        self.members
            .iter()
            .copied()
            .filter(move |m| m.tag != unit.tag && !m.is_flying)
    }
}

/// Per-role micro routine.
pub type MicroHandler = fn(&TickContext<'_>, &Unit, &Engagement<'_>, &mut CommandBuffer);

/// Handlers indexed by [`MicroRole::index`].
pub const MICRO_HANDLERS: [MicroHandler; MicroRole::COUNT] = [
    infantry::ranged_bio,
    sniper::sniper,
    healer::healer,
    support::detector,
    support::gunner,
    support::gunner,
    support::passive,
];

/// Handler for a unit's role.
#[must_use]
pub fn handler_for(unit: &Unit) -> MicroHandler {
    MICRO_HANDLERS[unit.micro_role().index()]
}

/// Issue commands for every army.
pub fn execute(armies: &[Army], ctx: &TickContext<'_>, commands: &mut CommandBuffer) {
    for army in armies {
        execute_army(army, armies, ctx, commands);
    }
}

/// Issue commands for one army according to its order.
pub fn execute_army(army: &Army, armies: &[Army], ctx: &TickContext<'_>, commands: &mut CommandBuffer) {
    let members: Vec<&Unit> = army.members(ctx.world).collect();
    if members.is_empty() {
        return;
    }
    trace!(army = army.id.0, order = ?army.order, units = members.len(), "executing");

    match army.order {
        Order::Retreat | Order::Disengage => retreat::retreat_army(ctx, army, &members, commands),
        Order::Heal => retreat::hold_back(ctx, army, &members, commands),
        Order::DropLoad | Order::DropMove | Order::DropUnload | Order::DropPickUp => {
            drop::execute_drop(ctx, army, &members, commands);
        }
        order => {
            let destination = destination(order, army, armies, ctx);
            let enemies = engagement_targets(order, army, destination, ctx);
            let engagement = Engagement {
                army,
                order,
                members,
                enemies,
                destination,
            };
            engage(ctx, &engagement, commands);
        }
    }
}

fn engage(ctx: &TickContext<'_>, engagement: &Engagement<'_>, commands: &mut CommandBuffer) {
    let order = engagement.order;
    if order.is_fight() && engagement.enemies.is_empty() {
        let objective = ctx.nearest_objective(engagement.army.center);
        warn!(
            army = engagement.army.id.0,
            order = ?order,
            "fight order without resolvable enemies, seeking nearest objective"
        );
        for unit in &engagement.members {
            if unloads_first(order, unit) {
                commands.issue(unit.tag, Action::UnloadAll);
            }
            commands.issue(unit.tag, Action::AttackMove(objective));
        }
        return;
    }

    let defending = matches!(
        order,
        Order::Defend | Order::DefendBase | Order::DefendAgainstCheese
    );
    for unit in &engagement.members {
        if unloads_first(order, unit) {
            commands.issue(unit.tag, Action::UnloadAll);
            continue;
        }
        if defending && seek_garrison(ctx, unit, engagement, commands) {
            continue;
        }
        handler_for(unit)(ctx, unit, engagement, commands);
    }
}

fn unloads_first(order: Order, unit: &Unit) -> bool {
    order.is_fight() && !unit.passengers.is_empty() && !unit.has_role(UnitRole::GARRISON)
}

/// Point an order moves the army toward.
#[must_use]
pub fn destination(order: Order, army: &Army, armies: &[Army], ctx: &TickContext<'_>) -> Vec2Fixed {
    let center = army.center;
    let radius = ctx.config.orders.base_defense_radius;
    let memory = ctx.memory;

    let found = match order {
        Order::Regroup => armies
            .iter()
            .filter(|other| other.id != army.id)
            .min_by_key(|other| (other.center.distance_squared(center), other.id))
            .map(|other| other.center),
        Order::Defend | Order::DefendBase => nearest_position(
            ctx.key_structures().filter(|s| {
                memory
                    .all_enemy_units()
                    .any(|e| is_threat(e) && e.position.is_within(s.position, radius))
            }),
            center,
        ),
        Order::DefendAgainstCheese => {
            let home = ctx.world.nearest_base(center).map_or(center, |b| b.position);
            nearest_position(memory.all_enemy_units(), home)
        }
        Order::Harass => nearest_position(memory.known_enemy_units().filter(|u| u.is_worker()), center),
        Order::ClearCreep => nearest_position(
            memory
                .all_enemy_units()
                .filter(|u| u.unit_type == UnitType::CreepTumor),
            center,
        ),
        Order::KillStructures => {
            nearest_position(memory.all_enemy_units().filter(|u| u.is_structure()), center)
        }
        Order::Advance => nearest_position(memory.remembered_structures(), center),
        _ => None,
    };
    found.unwrap_or_else(|| ctx.nearest_objective(center))
}

/// Enemies worth shooting for an order.
///
/// Worker harassment focuses workers and creep clearing includes tumors.
/// Defensive orders also pick up threats around the defended point. Other
/// orders prefer threats and fall back to anything in reach.
#[must_use]
pub fn engagement_targets<'a>(
    order: Order,
    army: &Army,
    destination: Vec2Fixed,
    ctx: &TickContext<'a>,
) -> Vec<&'a Unit> {
    let defense_radius = ctx.config.orders.base_defense_radius;
    let defending = matches!(order, Order::Defend | Order::DefendBase);
    let in_reach: Vec<&'a Unit> = ctx
        .memory
        .known_enemy_units()
        .filter(|u| {
            u.position.is_within(army.center, army.radius)
                || (defending && u.position.is_within(destination, defense_radius))
        })
        .collect();

    let only = |keep: fn(&Unit) -> bool| -> Vec<&'a Unit> {
        in_reach.iter().copied().filter(|u| keep(u)).collect()
    };
    let focused = match order {
        Order::KillStructures => return in_reach,
        Order::ClearCreep => return only(|u| is_threat(u) || u.unit_type == UnitType::CreepTumor),
        Order::Harass => only(Unit::is_worker),
        _ => only(is_threat),
    };
    if focused.is_empty() {
        in_reach
    } else {
        focused
    }
}

fn nearest_position<'a>(units: impl Iterator<Item = &'a Unit>, point: Vec2Fixed) -> Option<Vec2Fixed> {
    nearest(units, point).map(|u| u.position)
}
