//! Decision purity utilities.
//!
//! Provides a harness for verifying that the tactical core produces
//! identical orders and commands given identical inputs.
//!
//! # Sources of non-determinism
//!
//! - **Floating-point math**: all geometry and strength arithmetic uses
//!   [`tactics_core::math::Fixed`].
//! - **HashMap iteration order**: the core keeps ordered maps and breaks
//!   every distance tie on the unit tag.
//! - **Hidden state**: the only state crossing ticks lives in the
//!   [`TacticalCommander`]; two commanders fed the same script must agree.
//!
//! # Example
//!
//! ```ignore
//! use tactics_test_utils::determinism::verify_script;
//!
//! let result = verify_script(3, || scripted_worlds(), &config, &danger);
//! result.assert_deterministic();
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use tactics_core::commander::{TacticalCommander, TickReport};
use tactics_core::config::TacticsConfig;
use tactics_core::orders::{decide, ArmyAssessment};
use tactics_core::world::{CompositionQuotas, DangerField, Situation, SnapshotWorld};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Final trace hash from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks run.
    pub ticks: usize,
}

impl DeterminismResult {
    fn from_hashes(hashes: Vec<u64>, ticks: usize) -> Self {
        let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
        if !is_deterministic {
            tracing::warn!(runs = hashes.len(), ticks, ?hashes, "runs diverged");
        }
        Self {
            is_deterministic,
            hashes,
            ticks,
        }
    }

    /// Get all unique hashes (should be 1 for a pure core).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Tactical decisions are non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Hash everything a tick decided: the pass, every army's membership,
/// order and rule, and the command list in order.
#[must_use]
pub fn hash_report(report: &TickReport) -> u64 {
    let mut hasher = DefaultHasher::new();
    report.frame.hash(&mut hasher);
    report.pass.hash(&mut hasher);
    for army in &report.armies {
        army.id.hash(&mut hasher);
        army.units.hash(&mut hasher);
        army.center.hash(&mut hasher);
        army.radius.hash(&mut hasher);
        army.weighted_supply.hash(&mut hasher);
        army.order.hash(&mut hasher);
        army.rule.hash(&mut hasher);
    }
    report.commands.hash(&mut hasher);
    hasher.finish()
}

/// Feed one script of worlds through a fresh commander and fold every
/// report into one hash.
#[must_use]
pub fn run_script(
    worlds: &[SnapshotWorld],
    config: &TacticsConfig,
    danger: &dyn DangerField,
    situation: Situation,
    quotas: &CompositionQuotas,
) -> u64 {
    let mut commander = TacticalCommander::new(config.clone()).unwrap_or_default();
    let mut hasher = DefaultHasher::new();
    for world in worlds {
        let report = commander.tick(world, danger, situation, quotas);
        hash_report(&report).hash(&mut hasher);
    }
    hasher.finish()
}

/// Run the same script `runs` times on fresh commanders and compare.
///
/// # Arguments
///
/// * `runs` - Number of fresh commanders
/// * `setup` - Builds the sequence of world snapshots, one per tick
/// * `config` - Tuning shared by every run
/// * `danger` - Danger field shared by every run
pub fn verify_script<Setup>(
    runs: usize,
    setup: Setup,
    config: &TacticsConfig,
    danger: &dyn DangerField,
) -> DeterminismResult
where
    Setup: Fn() -> Vec<SnapshotWorld>,
{
    let quotas = CompositionQuotas::new();
    let mut hashes = Vec::with_capacity(runs);
    let mut ticks = 0;
    for _ in 0..runs {
        let worlds = setup();
        ticks = worlds.len();
        hashes.push(run_script(&worlds, config, danger, Situation::Stable, &quotas));
    }
    DeterminismResult::from_hashes(hashes, ticks)
}

/// Run the same script on `threads` OS threads at once and compare.
///
/// Catches accidental shared state between commanders.
pub fn verify_script_parallel<Setup, Danger>(
    threads: usize,
    setup: Setup,
    config: &TacticsConfig,
    danger: &Danger,
) -> DeterminismResult
where
    Setup: Fn() -> Vec<SnapshotWorld> + Sync,
    Danger: DangerField + Sync,
{
    let quotas = CompositionQuotas::new();
    let worlds_len = setup().len();
    let hashes = thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                scope.spawn(|| {
                    let worlds = setup();
                    run_script(&worlds, config, danger, Situation::Stable, &quotas)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_default())
            .collect::<Vec<_>>()
    });
    DeterminismResult::from_hashes(hashes, worlds_len)
}

/// Whether `decide` returns the same decision on `runs` repeated calls.
#[must_use]
pub fn decide_is_pure(assessment: &ArmyAssessment, config: &TacticsConfig, runs: usize) -> bool {
    let first = decide(assessment, &config.orders);
    (1..runs).all(|_| decide(&assessment.clone(), &config.orders) == first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::danger::StubDanger;
    use crate::fake_world::FakeWorld;
    use tactics_core::unit_type::UnitType;

    fn script() -> Vec<SnapshotWorld> {
        (0..12)
            .map(|frame| {
                FakeWorld::new()
                    .frame(frame)
                    .squad(UnitType::Marine, 10, (0, 0))
                    .squad(UnitType::Medivac, 1, (0, 1))
                    .enemy_squad(UnitType::Zergling, 6, (8, 0))
                    .enemy_start(100, 100)
                    .build()
            })
            .collect()
    }

    #[test]
    fn test_script_is_deterministic() {
        let result = verify_script(3, script, &TacticsConfig::default(), &StubDanger::new());
        result.assert_deterministic();
        assert_eq!(result.ticks, 12);
    }

    #[test]
    fn test_parallel_scripts_match() {
        let result =
            verify_script_parallel(4, script, &TacticsConfig::default(), &StubDanger::new());
        result.assert_deterministic();
        assert_eq!(result.hashes.len(), 4);
    }

    #[test]
    fn test_different_scripts_differ() {
        let config = TacticsConfig::default();
        let danger = StubDanger::new();
        let quotas = CompositionQuotas::new();
        let a = run_script(&script(), &config, &danger, Situation::Stable, &quotas);
        let b = run_script(&script()[..6], &config, &danger, Situation::Stable, &quotas);
        assert_ne!(a, b);
    }
}
