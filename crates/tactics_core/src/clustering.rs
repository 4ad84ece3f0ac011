//! Spatial clustering of friendly combat units into armies.
//!
//! Two units share an army when they are linked, directly or through other
//! units, by hops of at most `R = sqrt(total_army_supply) + base_radius`.
//! The link radius grows with the army, so a large army stays one group
//! while genuinely distant detachments still split off.
//!
//! Full recomputation runs every `recompute_interval` ticks. In between,
//! [`ArmyCache::rehydrate`] re-resolves each stored tag against the current
//! world and keeps the previously assigned order.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClusteringConfig;
use crate::math::{fixed_sqrt, Fixed, Vec2Fixed};
use crate::orders::Order;
use crate::strength;
use crate::unit::{Alliance, Unit, UnitTag};
use crate::world::WorldView;

/// Stable army identity: the lowest member tag at clustering time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArmyId(pub UnitTag);

/// How the current army list was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterPass {
    /// Clustered from scratch; orders are re-derived this tick.
    Recomputed,
    /// Carried over from the last recomputation with refreshed membership.
    Rehydrated,
}

/// A transient group of friendly combat units sharing one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Army {
    /// Identity.
    pub id: ArmyId,
    /// Member tags, ascending.
    pub units: Vec<UnitTag>,
    /// Mean member position.
    pub center: Vec2Fixed,
    /// Member spread plus the engagement margin.
    pub radius: Fixed,
    /// Current order.
    pub order: Order,
    /// Name of the rule that produced `order`.
    pub rule: &'static str,
}

impl Army {
    /// Build an army from resolved members.
    fn from_members(members: &[&Unit], config: &ClusteringConfig, order: Order, rule: &'static str) -> Self {
        let mut units: Vec<UnitTag> = members.iter().map(|u| u.tag).collect();
        units.sort_unstable();
        let center = Vec2Fixed::centroid(members.iter().map(|u| u.position));
        let spread = members
            .iter()
            .map(|u| u.position.distance(center))
            .max()
            .unwrap_or(Fixed::ZERO);
        Self {
            id: ArmyId(units.first().copied().unwrap_or_default()),
            units,
            center,
            radius: spread + config.engagement_margin,
            order,
            rule,
        }
    }

    /// Resolve members against the world, skipping tags that no longer exist.
    pub fn members<'w>(&'w self, world: &'w dyn WorldView) -> impl Iterator<Item = &'w Unit> + 'w {
        self.units.iter().filter_map(move |tag| world.unit(*tag))
    }

    /// Whether a tag belongs to this army.
    #[must_use]
    pub fn contains(&self, tag: UnitTag) -> bool {
        self.units.binary_search(&tag).is_ok()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the army has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Whether a unit takes part in clustering.
#[must_use]
pub fn is_eligible(unit: &Unit) -> bool {
    unit.alliance == Alliance::Own
        && unit.unit_type.is_army_unit()
        && !unit.is_structure()
        && unit.is_ready()
}

/// Link radius for a given total army supply.
#[must_use]
pub fn link_radius(total_supply: Fixed, config: &ClusteringConfig) -> Fixed {
    fixed_sqrt(total_supply) + config.base_radius
}

// ============================================================================
// Union-find
// ============================================================================

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

fn cell_of(point: Vec2Fixed, cell_size: Fixed) -> (i64, i64) {
    (
        (point.x / cell_size).floor().to_num(),
        (point.y / cell_size).floor().to_num(),
    )
}

/// Partition `units` into armies.
///
/// Units are bucketed into a grid of cell size `R`, so only neighbouring
/// cells are compared. Armies come back ordered by id with
/// [`Order::default`] attached.
#[must_use]
pub fn cluster(units: &[&Unit], config: &ClusteringConfig) -> Vec<Army> {
    if units.is_empty() {
        return Vec::new();
    }

    let radius = link_radius(strength::supply(units.iter().copied()), config);
    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, unit) in units.iter().enumerate() {
        grid.entry(cell_of(unit.position, radius)).or_default().push(i);
    }

    let mut sets = DisjointSet::new(units.len());
    for (i, unit) in units.iter().enumerate() {
        let (cx, cy) = cell_of(unit.position, radius);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = grid.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &j in bucket {
                    if j > i && unit.position.is_within(units[j].position, radius) {
                        sets.union(i, j);
                    }
                }
            }
        }
    }

    let mut groups: BTreeMap<usize, Vec<&Unit>> = BTreeMap::new();
    for (i, unit) in units.iter().enumerate() {
        groups.entry(sets.find(i)).or_default().push(*unit);
    }

    let mut armies: Vec<Army> = groups
        .values()
        .map(|members| Army::from_members(members, config, Order::default(), ""))
        .collect();
    armies.sort_by_key(|a| a.id);
    debug!(
        units = units.len(),
        armies = armies.len(),
        radius = %radius,
        "recomputed armies"
    );
    armies
}

/// Cluster every eligible own unit in the world.
#[must_use]
pub fn cluster_world(world: &dyn WorldView, config: &ClusteringConfig) -> Vec<Army> {
    let eligible: Vec<&Unit> = world.own_units().iter().filter(|u| is_eligible(u)).collect();
    cluster(&eligible, config)
}

// ============================================================================
// Frame-scoped cache
// ============================================================================

/// Armies from the last recomputation, reused on throttled ticks.
#[derive(Debug, Clone, Default)]
pub struct ArmyCache {
    armies: Vec<Army>,
    recomputed_frame: Option<u32>,
    ticks_since: u32,
}

impl ArmyCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cached armies may still be reused on the next tick.
    #[must_use]
    pub fn is_valid(&self, config: &ClusteringConfig) -> bool {
        self.recomputed_frame.is_some()
            && !self.armies.is_empty()
            && self.ticks_since + 1 < config.recompute_interval
    }

    /// Store freshly recomputed armies (with their orders decided).
    pub fn store(&mut self, armies: &[Army], frame: u32) {
        self.armies = armies.to_vec();
        self.recomputed_frame = Some(frame);
        self.ticks_since = 0;
    }

    /// Previous order of an army, if it was cached.
    #[must_use]
    pub fn previous(&self, id: ArmyId) -> Option<&Army> {
        self.armies.iter().find(|a| a.id == id)
    }

    /// Frame of the last recomputation.
    #[must_use]
    pub const fn recomputed_frame(&self) -> Option<u32> {
        self.recomputed_frame
    }

    /// Cached armies.
    #[must_use]
    pub fn armies(&self) -> &[Army] {
        &self.armies
    }

    /// Re-resolve cached armies against the current world.
    ///
    /// Returns `None` when the cache is stale or when no army survives, in
    /// which case the caller must recompute.
    pub fn rehydrate(&mut self, world: &dyn WorldView, config: &ClusteringConfig) -> Option<Vec<Army>> {
        if !self.is_valid(config) {
            return None;
        }
        self.ticks_since += 1;

        let rehydrated: Vec<Army> = self
            .armies
            .iter()
            .filter_map(|army| {
                let members: Vec<&Unit> = army
                    .members(world)
                    .filter(|u| is_eligible(u))
                    .collect();
                if members.is_empty() {
                    return None;
                }
                let mut refreshed = Army::from_members(&members, config, army.order, army.rule);
                refreshed.id = army.id;
                Some(refreshed)
            })
            .collect();

        if rehydrated.is_empty() {
            self.armies.clear();
            return None;
        }
        self.armies.clone_from(&rehydrated);
        Some(rehydrated)
    }

    /// Run one clustering step: rehydrate when possible, otherwise recompute.
    ///
    /// Recomputed armies are not stored; call [`ArmyCache::store`] once their
    /// orders are decided.
    pub fn update(&mut self, world: &dyn WorldView, config: &ClusteringConfig) -> (ClusterPass, Vec<Army>) {
        if let Some(armies) = self.rehydrate(world, config) {
            return (ClusterPass::Rehydrated, armies);
        }
        (ClusterPass::Recomputed, cluster_world(world, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit_type::UnitType;
    use crate::world::SnapshotWorld;

    fn marine(tag: UnitTag, x: i32, y: i32) -> Unit {
        Unit::new(tag, UnitType::Marine, Alliance::Own, Vec2Fixed::from_ints(x, y))
    }

    fn tags(armies: &[Army]) -> Vec<Vec<UnitTag>> {
        armies.iter().map(|a| a.units.clone()).collect()
    }

    #[test]
    fn test_empty_input_yields_no_armies() {
        assert!(cluster(&[], &ClusteringConfig::default()).is_empty());
    }

    #[test]
    fn test_single_unit_is_own_army() {
        let unit = marine(5, 0, 0);
        let armies = cluster(&[&unit], &ClusteringConfig::default());
        assert_eq!(tags(&armies), vec![vec![5]]);
        assert_eq!(armies[0].id, ArmyId(5));
        assert_eq!(armies[0].center, Vec2Fixed::ZERO);
    }

    #[test]
    fn test_transitive_chain_joins() {
        // R = sqrt(3) + 10 ≈ 11.7; hops of 11 chain all three together
        let a = marine(1, 0, 0);
        let b = marine(2, 11, 0);
        let c = marine(3, 22, 0);
        let armies = cluster(&[&a, &b, &c], &ClusteringConfig::default());
        assert_eq!(tags(&armies), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_distant_detachments_split() {
        let a = marine(1, 0, 0);
        let b = marine(2, 3, 0);
        let c = marine(3, 100, 100);
        let armies = cluster(&[&c, &a, &b], &ClusteringConfig::default());
        assert_eq!(tags(&armies), vec![vec![1, 2], vec![3]]);
    }

    #[test]
    fn test_radius_grows_with_supply() {
        let config = ClusteringConfig::default();
        assert_eq!(link_radius(Fixed::ZERO, &config), Fixed::from_num(10));
        let big = link_radius(Fixed::from_num(100), &config);
        assert!((big - Fixed::from_num(20)).abs() < Fixed::from_num(0.001));
    }

    #[test]
    fn test_eligibility() {
        assert!(is_eligible(&marine(1, 0, 0)));
        let scv = Unit::new(2, UnitType::Scv, Alliance::Own, Vec2Fixed::ZERO);
        assert!(!is_eligible(&scv));
        let bunker = Unit::new(3, UnitType::Bunker, Alliance::Own, Vec2Fixed::ZERO);
        assert!(!is_eligible(&bunker));
        let enemy = Unit::new(4, UnitType::Marine, Alliance::Enemy, Vec2Fixed::ZERO);
        assert!(!is_eligible(&enemy));
    }

    #[test]
    fn test_cache_rehydrates_then_recomputes() {
        let config = ClusteringConfig::default();
        let mut world = SnapshotWorld::new();
        world.own.push(marine(1, 0, 0));
        world.own.push(marine(2, 2, 0));
        let mut cache = ArmyCache::new();

        let (pass, mut armies) = cache.update(&world, &config);
        assert_eq!(pass, ClusterPass::Recomputed);
        armies[0].order = Order::Attack;
        cache.store(&armies, 0);

        // unit 2 dies; the order survives rehydration
        world.own.retain(|u| u.tag != 2);
        for _ in 1..config.recompute_interval {
            let (pass, armies) = cache.update(&world, &config);
            assert_eq!(pass, ClusterPass::Rehydrated);
            assert_eq!(armies[0].units, vec![1]);
            assert_eq!(armies[0].order, Order::Attack);
        }
        let (pass, _) = cache.update(&world, &config);
        assert_eq!(pass, ClusterPass::Recomputed);
    }

    #[test]
    fn test_empty_rehydration_falls_back() {
        let config = ClusteringConfig::default();
        let mut world = SnapshotWorld::new();
        world.own.push(marine(1, 0, 0));
        let mut cache = ArmyCache::new();
        let (_, armies) = cache.update(&world, &config);
        cache.store(&armies, 0);

        world.own.clear();
        world.own.push(marine(9, 50, 50));
        let (pass, armies) = cache.update(&world, &config);
        assert_eq!(pass, ClusterPass::Recomputed);
        assert_eq!(tags(&armies), vec![vec![9]]);
    }
}
