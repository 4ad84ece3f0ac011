//! Bunker garrison controller.
//!
//! Runs every tick over every own garrison structure, independently of the
//! army orders. Per structure, in order:
//!
//! 1. Below the critical health floor it unloads unconditionally.
//! 2. With no visible threat in range or just beyond it, occupants are
//!    released and the rally point moves to the nearest base's safe point.
//! 3. Otherwise it fires on the weakest threat in range, armor-debuffed
//!    targets first, and stims when an occupant is at full health.
//! 4. Spare capacity is filled from nearby eligible infantry when one of
//!    them is in danger or a remembered threat is approaching.

use serde::Serialize;
use tracing::debug;

use crate::combat::lowest_health_target;
use crate::command::{Ability, Action, CommandBuffer, Target};
use crate::context::{is_threat, TickContext};
use crate::math::Fixed;
use crate::strength::armored_ratio;
use crate::unit::{Unit, UnitTag};
use crate::unit_type::{UnitRole, UnitType, Upgrade};
use crate::world::Layer;

/// Load priority when the threat is mostly armored.
pub const ANTI_ARMOR_PRIORITY: [UnitType; 4] = [
    UnitType::Marauder,
    UnitType::Marine,
    UnitType::Ghost,
    UnitType::Reaper,
];

/// Default load priority.
pub const DEFAULT_PRIORITY: [UnitType; 4] = [
    UnitType::Marine,
    UnitType::Ghost,
    UnitType::Marauder,
    UnitType::Reaper,
];

/// What the controller did with one structure this tick.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GarrisonReport {
    /// The structure.
    pub garrison: UnitTag,
    /// Unloaded below the critical health floor.
    pub critical: bool,
    /// Released occupants and re-rallied because the area was clear.
    pub released: bool,
    /// Threat fired upon.
    pub target: Option<UnitTag>,
    /// Units ordered in.
    pub loaded: Vec<UnitTag>,
}

/// Occupant weapon range, including the range research.
#[must_use]
pub fn effective_range(ctx: &TickContext<'_>) -> Fixed {
    let config = &ctx.config.garrison;
    if ctx.world.has_upgrade(Upgrade::HiSecAutoTracking) {
        config.base_range + config.range_bonus
    } else {
        config.base_range
    }
}

/// Cargo capacity, including the capacity research.
#[must_use]
pub fn effective_capacity(ctx: &TickContext<'_>, garrison: &Unit) -> u8 {
    if ctx.world.has_upgrade(Upgrade::NeosteelArmor) {
        garrison.cargo_max.saturating_add(ctx.config.garrison.capacity_bonus)
    } else {
        garrison.cargo_max
    }
}

/// Load order for a threat mix.
#[must_use]
pub fn load_priority(ctx: &TickContext<'_>, threats: &[&Unit]) -> &'static [UnitType] {
    if !threats.is_empty()
        && armored_ratio(threats.iter().copied()) >= ctx.config.garrison.armored_threat_ratio
    {
        &ANTI_ARMOR_PRIORITY
    } else {
        &DEFAULT_PRIORITY
    }
}

/// Run the controller over every own garrison structure.
pub fn control_garrisons(ctx: &TickContext<'_>, commands: &mut CommandBuffer) -> Vec<GarrisonReport> {
    ctx.world
        .own_units()
        .iter()
        .filter(|u| u.has_role(UnitRole::GARRISON) && u.is_ready())
        .map(|g| control_garrison(ctx, g, commands))
        .collect()
}

/// Run the controller for one structure.
pub fn control_garrison(ctx: &TickContext<'_>, garrison: &Unit, commands: &mut CommandBuffer) -> GarrisonReport {
    let config = &ctx.config.garrison;
    let mut report = GarrisonReport {
        garrison: garrison.tag,
        ..GarrisonReport::default()
    };

    if garrison.health < config.critical_health {
        if !garrison.passengers.is_empty() {
            debug!(garrison = garrison.tag, health = garrison.health, "critical, unloading");
            commands.issue(garrison.tag, Action::UnloadAll);
        }
        report.critical = true;
        return report;
    }

    let range = effective_range(ctx);
    let reach = |e: &Unit, extra: Fixed| {
        e.position
            .is_within(garrison.position, range + garrison.radius + e.radius + extra)
    };
    let threats: Vec<&Unit> = ctx
        .memory
        .known_enemy_units()
        .filter(|e| is_threat(e) && reach(e, config.safety_margin))
        .collect();
    let approaching: Vec<&Unit> = ctx
        .memory
        .assumed_enemy_units()
        .filter(|e| is_threat(e) && reach(e, config.approach_margin))
        .collect();

    if threats.is_empty() {
        let safe = ctx.world.nearest_base(garrison.position).map(|b| b.safe_point);
        if let Some(safe) = safe.filter(|s| garrison.rally_point != Some(*s)) {
            if !garrison.passengers.is_empty() {
                commands.issue(garrison.tag, Action::UnloadAll);
            }
            commands.issue(garrison.tag, Action::Rally(safe));
            debug!(garrison = garrison.tag, "area clear, released occupants");
            report.released = true;
        }
        if report.released || approaching.is_empty() {
            return report;
        }
    } else if !garrison.passengers.is_empty() {
        let in_range = threats.iter().copied().filter(|e| reach(e, Fixed::ZERO));
        if let Some(target) = lowest_health_target(in_range, |t| t.has_armor_debuff) {
            commands.issue(garrison.tag, Action::Attack(target.tag));
            report.target = Some(target.tag);
            let fresh = garrison.passengers.iter().any(|p| p.is_full_health());
            if fresh && ctx.world.has_upgrade(Upgrade::Stimpack) {
                commands.use_ability(garrison.tag, Ability::Stim, Target::None);
            }
        }
    }

    report.loaded = load_nearby(ctx, garrison, &threats, &approaching, commands);
    report
}

/// Fill spare capacity from nearby eligible units in priority order.
fn load_nearby(
    ctx: &TickContext<'_>,
    garrison: &Unit,
    threats: &[&Unit],
    approaching: &[&Unit],
    commands: &mut CommandBuffer,
) -> Vec<UnitTag> {
    let config = &ctx.config.garrison;
    let mut free = effective_capacity(ctx, garrison).saturating_sub(garrison.cargo_used());
    if free == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<&Unit> = ctx
        .world
        .own_units_near(garrison.position, config.load_distance + garrison.radius)
        .into_iter()
        .filter(|u| u.unit_type.is_garrison_eligible() && u.is_ready())
        .collect();
    if candidates.is_empty() {
        return Vec::new();
    }

    let in_danger = candidates.iter().any(|u| {
        ctx.danger.danger(u.position, u.radius, Layer::of(u)) >= config.danger_threshold
    });
    if !in_danger && approaching.is_empty() {
        return Vec::new();
    }

    let mix: Vec<&Unit> = threats.iter().chain(approaching.iter()).copied().collect();
    let priority = load_priority(ctx, &mix);
    let rank = |u: &Unit| {
        priority
            .iter()
            .position(|t| *t == u.unit_type)
            .unwrap_or(priority.len())
    };
    candidates.sort_by_key(|u| {
        (
            rank(u),
            u.position.distance_squared(garrison.position),
            u.tag,
        )
    });

    let mut loaded = Vec::new();
    for unit in candidates {
        let size = unit.unit_type.cargo_size();
        if size > free {
            continue;
        }
        free -= size;
        commands.issue(garrison.tag, Action::Load(unit.tag));
        loaded.push(unit.tag);
        if free == 0 {
            break;
        }
    }
    debug!(garrison = garrison.tag, loaded = loaded.len(), "loading garrison");
    loaded
}
