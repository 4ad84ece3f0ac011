//! Orders engine: one tactical order per army.
//!
//! Deciding is split in two:
//!
//! 1. [`assess`] reads the world, memory and other armies and condenses
//!    everything the rules need into a plain [`ArmyAssessment`].
//! 2. [`decide`] walks the ordered [`RULES`] table and returns the first
//!    match. It is a pure function of the assessment and thresholds, so the
//!    same inputs always give the same order.
//!
//! The order carried on an army is only a continuity hint for execution; it
//! never feeds back into the next decision.

use serde::{Deserialize, Serialize};

use crate::clustering::Army;
use crate::config::OrderThresholds;
use crate::context::{is_threat, TickContext};
use crate::math::{fixed_sqrt, ratio_or, Fixed};
use crate::strength;
use crate::unit::Unit;
use crate::unit_type::{Race, UnitRole, UnitType, Upgrade};
use crate::world::Situation;

/// Tactical intent for one army.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Order {
    /// Fall back to a safe base.
    #[default]
    Retreat,
    /// Answer a detected bunker or cannon rush.
    DefendAgainstCheese,
    /// Aggressively pursue a clearly weaker enemy.
    Chase,
    /// Sustained offense against a weaker enemy.
    Attack,
    /// Break off a losing fight.
    Disengage,
    /// Fight near a threatened friendly structure, whatever the odds.
    DefendBase,
    /// Move to a structure under threat and fight there.
    Defend,
    /// Hunt enemy workers.
    Harass,
    /// Clear enemy map-control terrain.
    ClearCreep,
    /// Join a comparable friendly army.
    Regroup,
    /// Destroy nearby enemy structures.
    KillStructures,
    /// Push toward the next known enemy structure.
    Advance,
    /// Hold back and heal up.
    Heal,
    /// Load ground units into transports.
    DropLoad,
    /// Fly loaded transports to the drop target.
    DropMove,
    /// Unload at the drop target and harass.
    DropUnload,
    /// Unload and fight a winnable engagement.
    DropFight,
    /// Pick up units from a losing drop.
    DropPickUp,
}

impl Order {
    /// Orders whose units engage enemies.
    #[must_use]
    pub const fn is_fight(self) -> bool {
        matches!(
            self,
            Self::DefendAgainstCheese
                | Self::Chase
                | Self::Attack
                | Self::DefendBase
                | Self::Defend
                | Self::Harass
                | Self::ClearCreep
                | Self::KillStructures
                | Self::DropFight
        )
    }

    /// Orders belonging to drop play.
    #[must_use]
    pub const fn is_drop(self) -> bool {
        matches!(
            self,
            Self::DropLoad | Self::DropMove | Self::DropUnload | Self::DropFight | Self::DropPickUp
        )
    }
}

// ============================================================================
// Assessment
// ============================================================================

/// A comparable friendly army nearby.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearbyArmy {
    /// Center-to-center distance.
    pub distance: Fixed,
    /// Its weighted supply.
    pub weighted_supply: Fixed,
}

/// Every input the rules look at, for one army.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArmyAssessment {
    /// Macro situation.
    pub situation: Situation,
    /// Opponent race.
    pub enemy_race: Race,
    /// Health/energy-weighted strength.
    pub weighted_supply: Fixed,
    /// Weighted attackers plus carried cargo.
    pub potential_supply: Fixed,
    /// Weighted supply carried in transports.
    pub cargo_supply: Fixed,
    /// Biological supply carried in transports.
    pub cargo_bio_supply: Fixed,
    /// Biological ground supply not inside transports.
    pub loose_bio_supply: Fixed,
    /// Members' health plus shield over maximum.
    pub health_fraction: Fixed,
    /// Biological members' health over maximum.
    pub bio_health: Fixed,
    /// Some member can shoot ground targets.
    pub can_attack_ground: bool,
    /// Number of healers.
    pub healer_count: u32,
    /// Mean healer energy fraction.
    pub healer_energy: Fixed,
    /// Free transport slots usable for a drop.
    pub drop_capacity: u32,
    /// Army includes a detector.
    pub has_detector: bool,
    /// Stim research progress.
    pub stim_progress: Fixed,
    /// Strength of visible enemies within the army radius.
    pub local_known_enemy: Fixed,
    /// Strength of remembered, unseen enemies within the army radius.
    pub local_remembered_enemy: Fixed,
    /// Enemy workers within the army radius.
    pub local_enemy_workers: u32,
    /// Enemy structures within the army radius.
    pub local_enemy_structures: u32,
    /// Enemy anti-air strength within the army radius.
    pub local_anti_air: Fixed,
    /// Strength of every remembered, unseen enemy.
    pub remembered_enemy: Fixed,
    /// Distance from the nearest production structure to the nearest threat.
    pub threat_distance: Option<Fixed>,
    /// Enemy strength around that structure.
    pub threat_supply: Fixed,
    /// Distance from the army to the nearest structure with a visible threat.
    pub threatened_structure_distance: Option<Fixed>,
    /// Creep coverage around the army.
    pub creep_density: Fixed,
    /// Nearest other army.
    pub nearest_ally: Option<NearbyArmy>,
}

impl ArmyAssessment {
    /// Local enemy strength, visible plus remembered.
    #[must_use]
    pub fn local_enemy(&self) -> Fixed {
        self.local_known_enemy + self.local_remembered_enemy
    }

    /// Own strength over local enemy strength.
    #[must_use]
    pub fn local_ratio(&self) -> Fixed {
        ratio_or(self.weighted_supply, self.local_enemy(), Fixed::MAX)
    }

    /// Whether the army carries passengers.
    #[must_use]
    pub fn is_drop_army(&self) -> bool {
        self.cargo_supply > Fixed::ZERO
    }
}

fn members<'w>(army: &Army, ctx: &TickContext<'w>) -> Vec<&'w Unit> {
    army.units
        .iter()
        .filter_map(|tag| ctx.world.unit(*tag))
        .collect()
}

/// Gather every rule input for `army`.
#[must_use]
pub fn assess(army: &Army, armies: &[Army], ctx: &TickContext<'_>) -> ArmyAssessment {
    let thresholds = &ctx.config.orders;
    let units = members(army, ctx);

    let healers: Vec<&Unit> = units
        .iter()
        .copied()
        .filter(|u| u.has_role(UnitRole::HEALER))
        .collect();
    let healer_energy = ratio_or(
        healers.iter().map(|u| u.energy_fraction()).sum(),
        Fixed::from_num(healers.len()),
        Fixed::ZERO,
    );

    let transports: Vec<&Unit> = units
        .iter()
        .copied()
        .filter(|u| u.has_role(UnitRole::TRANSPORT))
        .collect();
    let quota = ctx.quotas.quota(UnitType::Medivac) as usize;
    let usable = if quota == 0 { transports.len() } else { quota.min(transports.len()) };
    let drop_capacity = transports
        .iter()
        .take(usable)
        .map(|u| u32::from(u.cargo_free()))
        .sum();
    let cargo_bio_supply = transports
        .iter()
        .flat_map(|u| u.passengers.iter())
        .filter(|p| p.unit_type.has_role(UnitRole::BIO))
        .map(|p| p.unit_type.supply())
        .sum();

    let health = units.iter().map(|u| u64::from(u.effective_health())).sum::<u64>();
    let health_max = units.iter().map(|u| u64::from(u.effective_health_max())).sum::<u64>();

    let in_radius = |u: &&Unit| u.position.is_within(army.center, army.radius);
    let local_known: Vec<&Unit> = ctx.memory.known_enemy_units().filter(in_radius).collect();
    let local_remembered: Vec<&Unit> = ctx.memory.assumed_enemy_units().filter(in_radius).collect();
    let local_all = || local_known.iter().chain(local_remembered.iter()).copied();

    let (threat_distance, threat_supply) = structure_threat(ctx);
    let threatened_structure_distance = ctx
        .key_structures()
        .filter(|s| {
            ctx.known_threats()
                .any(|e| e.position.is_within(s.position, thresholds.base_defense_radius))
        })
        .map(|s| s.position.distance(army.center))
        .min();

    let nearest_ally = armies
        .iter()
        .filter(|other| other.id != army.id)
        .min_by_key(|other| (other.center.distance_squared(army.center), other.id))
        .map(|other| NearbyArmy {
            distance: other.center.distance(army.center),
            weighted_supply: strength::weighted_supply(members(other, ctx)),
        });

    ArmyAssessment {
        situation: ctx.situation,
        enemy_race: ctx.world.enemy_race(),
        weighted_supply: strength::weighted_supply(units.iter().copied()),
        potential_supply: strength::potential_supply(units.iter().copied()),
        cargo_supply: strength::cargo_supply(units.iter().copied()),
        cargo_bio_supply,
        loose_bio_supply: strength::bio_supply(units.iter().copied().filter(|u| !u.is_flying)),
        health_fraction: ratio_or(Fixed::from_num(health), Fixed::from_num(health_max), Fixed::ONE),
        bio_health: strength::bio_health_percentage(units.iter().copied()),
        can_attack_ground: strength::can_attack_ground(units.iter().copied()),
        healer_count: healers.len() as u32,
        healer_energy,
        drop_capacity,
        has_detector: units.iter().any(|u| u.is_detector()),
        stim_progress: ctx.world.upgrade_progress(Upgrade::Stimpack),
        local_known_enemy: strength::weighted_supply(local_known.iter().copied().filter(|u| is_threat(u))),
        local_remembered_enemy: strength::weighted_supply(
            local_remembered.iter().copied().filter(|u| is_threat(u)),
        ),
        local_enemy_workers: strength::worker_count(local_all()) as u32,
        local_enemy_structures: local_all().filter(|u| u.is_structure()).count() as u32,
        local_anti_air: strength::anti_air_supply(local_all()),
        remembered_enemy: strength::weighted_supply(ctx.memory.assumed_enemy_units().filter(|u| is_threat(u))),
        threat_distance,
        threat_supply,
        threatened_structure_distance,
        creep_density: ctx.world.creep_density(army.center, army.radius),
        nearest_ally,
    }
}

/// Closest approach of any enemy threat to a production structure, and the
/// enemy strength gathered around that structure.
fn structure_threat(ctx: &TickContext<'_>) -> (Option<Fixed>, Fixed) {
    let radius = ctx.config.orders.base_defense_radius;
    let closest = ctx
        .key_structures()
        .flat_map(|s| {
            ctx.memory
                .all_enemy_units()
                .filter(|e| is_threat(e) && !e.is_structure())
                .map(move |e| (e.position.distance_squared(s.position), s.tag, s))
        })
        .min_by_key(|(d, tag, _)| (*d, *tag));

    match closest {
        Some((distance_sq, _, structure)) => {
            let around = ctx
                .memory
                .all_enemy_units()
                .filter(|e| is_threat(e) && e.position.is_within(structure.position, radius));
            (
                Some(fixed_sqrt(distance_sq)),
                strength::weighted_supply(around),
            )
        }
        None => (None, Fixed::ZERO),
    }
}

// ============================================================================
// Rules
// ============================================================================

/// One named entry in the priority cascade.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Name reported when the rule wins.
    pub name: &'static str,
    /// Returns an order when the rule applies.
    pub eval: fn(&ArmyAssessment, &OrderThresholds) -> Option<Order>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Name of the fallback when no rule matches.
pub const DEFAULT_RULE: &str = "default_retreat";

/// The cascade, highest priority first.
pub const RULES: &[Rule] = &[
    Rule {
        name: "cheese_defense",
        eval: cheese_defense,
    },
    Rule {
        name: "drop",
        eval: drop,
    },
    Rule {
        name: "local_fight",
        eval: local_fight,
    },
    Rule {
        name: "structure_threat",
        eval: structure_threat_rule,
    },
    Rule {
        name: "harass_workers",
        eval: harass_workers,
    },
    Rule {
        name: "clear_creep",
        eval: clear_creep,
    },
    Rule {
        name: "regroup",
        eval: regroup,
    },
    Rule {
        name: "kill_structures",
        eval: kill_structures,
    },
    Rule {
        name: "global_push",
        eval: global_push,
    },
];

/// A decided order and the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Chosen order.
    pub order: Order,
    /// Winning rule name.
    pub rule: &'static str,
}

/// Walk [`RULES`] and return the first match, or retreat.
#[must_use]
pub fn decide(assessment: &ArmyAssessment, thresholds: &OrderThresholds) -> Decision {
    RULES
        .iter()
        .find_map(|rule| {
            (rule.eval)(assessment, thresholds).map(|order| Decision {
                order,
                rule: rule.name,
            })
        })
        .unwrap_or(Decision {
            order: Order::Retreat,
            rule: DEFAULT_RULE,
        })
}

/// A detected rush pattern overrides everything.
pub fn cheese_defense(a: &ArmyAssessment, _t: &OrderThresholds) -> Option<Order> {
    a.situation.is_cheese().then_some(Order::DefendAgainstCheese)
}

/// Armies carrying passengers play the drop.
pub fn drop(a: &ArmyAssessment, t: &OrderThresholds) -> Option<Order> {
    if !a.is_drop_army() {
        return None;
    }
    let local = a.local_enemy();
    if local > Fixed::ZERO {
        if a.potential_supply >= local * t.drop_win_ratio {
            return Some(Order::DropFight);
        }
        if a.loose_bio_supply > Fixed::ZERO {
            return Some(Order::DropPickUp);
        }
        return Some(Order::Retreat);
    }
    if a.local_enemy_workers > 0 || a.local_enemy_structures > 0 {
        return Some(Order::DropUnload);
    }
    if a.local_anti_air <= t.drop_max_anti_air && a.cargo_bio_supply >= t.drop_min_bio_supply {
        return Some(Order::DropMove);
    }
    Some(Order::Retreat)
}

/// Fight or flee a local enemy according to the strength ratio.
pub fn local_fight(a: &ArmyAssessment, t: &OrderThresholds) -> Option<Order> {
    if a.local_enemy() <= Fixed::ZERO {
        return None;
    }
    if a
        .threatened_structure_distance
        .is_some_and(|d| d <= t.base_defense_radius)
    {
        return Some(Order::DefendBase);
    }
    let ratio = a.local_ratio();
    if ratio >= t.chase_ratio {
        Some(Order::Chase)
    } else if ratio >= t.offense_ratio && a.stim_progress >= t.stim_ready {
        Some(Order::Attack)
    } else {
        Some(Order::Disengage)
    }
}

/// Defend a structure with a sizeable threat close to it.
pub fn structure_threat_rule(a: &ArmyAssessment, t: &OrderThresholds) -> Option<Order> {
    let near = a.threat_distance.is_some_and(|d| d <= t.threat_distance);
    (near && a.threat_supply >= t.threat_supply).then_some(Order::Defend)
}

/// Hunt enemy workers in reach.
pub fn harass_workers(a: &ArmyAssessment, _t: &OrderThresholds) -> Option<Order> {
    (a.local_enemy_workers > 0 && a.can_attack_ground).then_some(Order::Harass)
}

/// Against Zerg, a detector-escorted army clears dense creep.
pub fn clear_creep(a: &ArmyAssessment, t: &OrderThresholds) -> Option<Order> {
    (a.enemy_race == Race::Zerg && a.has_detector && a.creep_density >= t.creep_density)
        .then_some(Order::ClearCreep)
}

/// Merge with a comparable army nearby.
pub fn regroup(a: &ArmyAssessment, t: &OrderThresholds) -> Option<Order> {
    let ally = a.nearest_ally?;
    if ally.distance > t.regroup_distance || a.weighted_supply <= Fixed::ZERO {
        return None;
    }
    let ratio = ally.weighted_supply / a.weighted_supply;
    let comparable = ratio >= t.regroup_min_ratio && ratio <= t.regroup_max_ratio;
    let combined = a.weighted_supply + ally.weighted_supply;
    (comparable && combined >= t.regroup_min_supply).then_some(Order::Regroup)
}

/// Destroy enemy structures within the army radius.
pub fn kill_structures(a: &ArmyAssessment, _t: &OrderThresholds) -> Option<Order> {
    (a.local_enemy_structures > 0 && a.can_attack_ground).then_some(Order::KillStructures)
}

/// Take the fight to the enemy when healthy, stimmed and strong enough.
pub fn global_push(a: &ArmyAssessment, t: &OrderThresholds) -> Option<Order> {
    let can_drop = a.drop_capacity >= u32::from(t.drop_min_cargo);
    let ready = a.potential_supply >= t.push_potential
        && a.health_fraction >= t.push_health
        && a.bio_health >= t.push_health
        && a.stim_progress >= t.stim_ready
        && (a.potential_supply >= t.overwhelming_supply || can_drop);
    if !ready {
        return None;
    }
    let enemy_estimate = a.local_known_enemy + a.remembered_enemy;
    if a.potential_supply >= enemy_estimate * t.offense_ratio {
        Some(Order::Advance)
    } else if can_drop {
        Some(Order::DropLoad)
    } else {
        Some(Order::Heal)
    }
}
