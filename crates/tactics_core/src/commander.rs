//! The tactical commander: one decision pass per tick.
//!
//! Pipeline per tick:
//!
//! 1. Refresh enemy memory from the current snapshot.
//! 2. Cluster own combat units into armies, or rehydrate the cached armies
//!    while the recomputation throttle allows it.
//! 3. On recomputation passes only, assess and decide every army's order.
//! 4. Turn orders into unit commands.
//! 5. Run the garrison controller over every garrison structure.
//!
//! The commander owns the only state that crosses tick boundaries (enemy
//! memory and the army cache) and is the single writer for both.

use serde::Serialize;
use tracing::debug;

use crate::clustering::{Army, ArmyCache, ArmyId, ClusterPass};
use crate::command::{CommandBuffer, UnitCommand};
use crate::config::TacticsConfig;
use crate::context::TickContext;
use crate::error::Result;
use crate::execution;
use crate::garrison::{self, GarrisonReport};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::memory::{EnemyMemory, RefreshStats};
use crate::orders::{assess, decide, Order};
use crate::strength;
use crate::unit::UnitTag;
use crate::world::{CompositionQuotas, DangerField, Situation, WorldView};

/// One army as reported after a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArmySummary {
    /// Army identity.
    pub id: ArmyId,
    /// Member tags.
    pub units: Vec<UnitTag>,
    /// Mean member position.
    pub center: Vec2Fixed,
    /// Engagement radius.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Health/energy-weighted strength.
    #[serde(with = "fixed_serde")]
    pub weighted_supply: Fixed,
    /// Order in force.
    pub order: Order,
    /// Rule that produced the order.
    pub rule: &'static str,
}

/// Everything one tick decided.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    /// Frame the tick ran on.
    pub frame: u32,
    /// Whether armies were recomputed or rehydrated.
    pub pass: ClusterPass,
    /// Enemy memory bookkeeping.
    pub memory: RefreshStats,
    /// Armies and their orders.
    pub armies: Vec<ArmySummary>,
    /// Garrison controller outcomes.
    pub garrisons: Vec<GarrisonReport>,
    /// Commands to send to the engine.
    pub commands: Vec<UnitCommand>,
}

impl TickReport {
    /// Order of the army containing `tag`, if any.
    #[must_use]
    pub fn order_of(&self, tag: UnitTag) -> Option<Order> {
        self.armies
            .iter()
            .find(|a| a.units.contains(&tag))
            .map(|a| a.order)
    }
}

/// Owns cross-tick state and runs the per-tick pipeline.
#[derive(Debug, Clone, Default)]
pub struct TacticalCommander {
    config: TacticsConfig,
    memory: EnemyMemory,
    cache: ArmyCache,
}

impl TacticalCommander {
    /// Create a commander, rejecting invalid configuration.
    pub fn new(config: TacticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            memory: EnemyMemory::new(),
            cache: ArmyCache::new(),
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &TacticsConfig {
        &self.config
    }

    /// Enemy memory as of the last tick.
    #[must_use]
    pub fn memory(&self) -> &EnemyMemory {
        &self.memory
    }

    /// Armies from the last recomputation.
    #[must_use]
    pub fn armies(&self) -> &[Army] {
        self.cache.armies()
    }

    /// Run one tick.
    pub fn tick(
        &mut self,
        world: &dyn WorldView,
        danger: &dyn DangerField,
        situation: Situation,
        quotas: &CompositionQuotas,
    ) -> TickReport {
        let frame = world.frame();
        let stats = self.memory.refresh(world, &self.config.memory);
        let (pass, mut armies) = self.cache.update(world, &self.config.clustering);

        let ctx = TickContext::new(world, danger, &self.memory, situation, quotas, &self.config);

        if pass == ClusterPass::Recomputed {
            let assessments: Vec<_> = armies.iter().map(|a| assess(a, &armies, &ctx)).collect();
            for (army, assessment) in armies.iter_mut().zip(&assessments) {
                let decision = decide(assessment, &self.config.orders);
                let previous = self.cache.previous(army.id).map(|p| p.order);
                if previous != Some(decision.order) {
                    debug!(
                        army = army.id.0,
                        from = ?previous,
                        to = ?decision.order,
                        rule = decision.rule,
                        "order changed"
                    );
                }
                army.order = decision.order;
                army.rule = decision.rule;
            }
            self.cache.store(&armies, frame);
        }

        let mut commands = CommandBuffer::new();
        execution::execute(&armies, &ctx, &mut commands);
        let garrisons = garrison::control_garrisons(&ctx, &mut commands);

        let summaries = armies
            .iter()
            .map(|army| ArmySummary {
                id: army.id,
                units: army.units.clone(),
                center: army.center,
                radius: army.radius,
                weighted_supply: strength::weighted_supply(army.members(world)),
                order: army.order,
                rule: army.rule,
            })
            .collect();

        debug!(
            frame,
            pass = ?pass,
            armies = armies.len(),
            commands = commands.len(),
            "tick complete"
        );

        TickReport {
            frame,
            pass,
            memory: stats,
            armies: summaries,
            garrisons,
            commands: commands.drain(),
        }
    }
}
