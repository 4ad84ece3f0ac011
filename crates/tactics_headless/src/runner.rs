//! Headless runner: the commander plays one scenario against the
//! [`Battlefield`] and every decision tick is written out as a JSON line.

use std::collections::BTreeMap;
use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tactics_core::clustering::{ArmyId, ClusterPass};
use tactics_core::commander::{TacticalCommander, TickReport};
use tactics_core::config::TacticsConfig;
use tactics_core::math::{fixed_serde, Fixed};
use tactics_core::orders::Order;
use tactics_core::world::{CompositionQuotas, Situation};

use crate::battlefield::Battlefield;
use crate::danger::ProximityDanger;
use crate::scenario::{Scenario, ScenarioError};

/// One army in a [`TickLine`].
#[derive(Debug, Clone, Serialize)]
pub struct ArmyLine {
    /// Army identity.
    pub id: ArmyId,
    /// Member count.
    pub size: usize,
    /// Order in force.
    pub order: Order,
    /// Rule that produced it.
    pub rule: &'static str,
    /// Health/energy-weighted strength.
    #[serde(with = "fixed_serde")]
    pub weighted_supply: Fixed,
}

/// Per-tick output line.
#[derive(Debug, Clone, Serialize)]
pub struct TickLine {
    /// Frame the decision ran on.
    pub frame: u32,
    /// Recomputed or rehydrated armies.
    pub pass: ClusterPass,
    /// Armies and their orders.
    pub armies: Vec<ArmyLine>,
    /// Commands issued.
    pub commands: usize,
    /// Own units on the field, carried ones excluded.
    pub own_units: usize,
    /// Enemies in vision.
    pub visible_enemies: usize,
    /// Enemies remembered but not seen.
    pub ghosts: usize,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Every enemy unit destroyed.
    Victory,
    /// Every own army unit destroyed.
    Defeat,
    /// Tick limit reached with both sides standing.
    Timeout,
}

/// Result of one complete run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Scenario name.
    pub scenario: String,
    /// Decision ticks executed.
    pub ticks: u32,
    /// Game frame at the end.
    pub final_frame: u32,
    /// Own army units alive at the end.
    pub own_remaining: usize,
    /// Enemy units alive at the end.
    pub enemy_remaining: usize,
    /// Own units lost.
    pub own_lost: u32,
    /// Enemy units destroyed.
    pub enemy_lost: u32,
    /// Times any army switched order.
    pub order_changes: u32,
    /// How often each decision rule fired on recomputation passes.
    pub rules_fired: BTreeMap<String, u32>,
    /// How the run ended.
    pub outcome: Outcome,
}

/// Drives one scenario to completion.
pub struct HeadlessRunner {
    name: String,
    commander: TacticalCommander,
    battlefield: Battlefield,
    situation: Situation,
    quotas: CompositionQuotas,
    frames_per_tick: u32,
    ticks: u32,
    executed: u32,
    last_orders: BTreeMap<ArmyId, Order>,
    order_changes: u32,
    rules_fired: BTreeMap<String, u32>,
}

impl HeadlessRunner {
    /// Set up a run of `scenario` with explicit tuning.
    pub fn new(scenario: &Scenario, config: TacticsConfig) -> Result<Self, ScenarioError> {
        let commander = TacticalCommander::new(config)?;
        Ok(Self {
            name: scenario.name.clone(),
            commander,
            battlefield: Battlefield::new(scenario.build_world()),
            situation: scenario.situation,
            quotas: scenario.quotas.clone(),
            frames_per_tick: scenario.frames_per_tick.max(1),
            ticks: scenario.ticks,
            executed: 0,
            last_orders: BTreeMap::new(),
            order_changes: 0,
            rules_fired: BTreeMap::new(),
        })
    }

    /// Set up a run with the scenario's own tuning.
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, ScenarioError> {
        let config = scenario.tactics_config(None)?;
        Self::new(scenario, config)
    }

    /// Override the tick limit.
    #[must_use]
    pub fn with_ticks(mut self, ticks: u32) -> Self {
        self.ticks = ticks;
        self
    }

    /// The simulated world.
    #[must_use]
    pub fn battlefield(&self) -> &Battlefield {
        &self.battlefield
    }

    /// The commander under test.
    #[must_use]
    pub fn commander(&self) -> &TacticalCommander {
        &self.commander
    }

    /// Whether the run is over.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.executed >= self.ticks
            || self.battlefield.enemies_alive() == 0
            || self.battlefield.own_army_alive() == 0
    }

    /// Run one decision tick and advance the battlefield.
    pub fn step(&mut self) -> TickLine {
        let snapshot = self.battlefield.snapshot();
        let danger = ProximityDanger::from_enemies(&snapshot.enemies);
        let report = self
            .commander
            .tick(&snapshot, &danger, self.situation, &self.quotas);
        self.record(&report);

        let line = TickLine {
            frame: report.frame,
            pass: report.pass,
            armies: report
                .armies
                .iter()
                .map(|a| ArmyLine {
                    id: a.id,
                    size: a.units.len(),
                    order: a.order,
                    rule: a.rule,
                    weighted_supply: a.weighted_supply,
                })
                .collect(),
            commands: report.commands.len(),
            own_units: snapshot.own.len(),
            visible_enemies: snapshot.enemies.len(),
            ghosts: self.commander.memory().assumed_enemy_units().count(),
        };

        self.battlefield.apply(&report.commands);
        self.battlefield.advance(self.frames_per_tick);
        self.executed += 1;
        line
    }

    fn record(&mut self, report: &TickReport) {
        if report.pass != ClusterPass::Recomputed {
            return;
        }
        let mut orders = BTreeMap::new();
        for army in &report.armies {
            *self.rules_fired.entry(army.rule.to_string()).or_insert(0) += 1;
            if self
                .last_orders
                .get(&army.id)
                .is_some_and(|previous| *previous != army.order)
            {
                self.order_changes += 1;
            }
            orders.insert(army.id, army.order);
        }
        self.last_orders = orders;
    }

    /// Run to completion, writing one JSON line per tick to `out`.
    pub fn run<W: Write>(mut self, out: &mut W) -> std::io::Result<RunSummary> {
        info!(scenario = %self.name, ticks = self.ticks, "starting run");
        while !self.is_finished() {
            let line = self.step();
            serde_json::to_writer(&mut *out, &line).map_err(std::io::Error::other)?;
            writeln!(out)?;
        }
        let summary = self.summary();
        info!(
            scenario = %summary.scenario,
            outcome = ?summary.outcome,
            own_lost = summary.own_lost,
            enemy_lost = summary.enemy_lost,
            "run finished"
        );
        Ok(summary)
    }

    /// Run to completion without tick output.
    #[must_use]
    pub fn run_silent(mut self) -> RunSummary {
        while !self.is_finished() {
            self.step();
        }
        debug!(scenario = %self.name, ticks = self.executed, "silent run finished");
        self.summary()
    }

    /// Summary of the run so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let own_remaining = self.battlefield.own_army_alive();
        let enemy_remaining = self.battlefield.enemies_alive();
        let outcome = if enemy_remaining == 0 {
            Outcome::Victory
        } else if own_remaining == 0 {
            Outcome::Defeat
        } else {
            Outcome::Timeout
        };
        RunSummary {
            scenario: self.name.clone(),
            ticks: self.executed,
            final_frame: self.battlefield.frame(),
            own_remaining,
            enemy_remaining,
            own_lost: self.battlefield.own_lost(),
            enemy_lost: self.battlefield.enemy_lost(),
            order_changes: self.order_changes,
            rules_fired: self.rules_fired.clone(),
            outcome,
        }
    }
}
