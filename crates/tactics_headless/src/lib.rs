//! Headless scenario runner for the tactical core.
//!
//! Plays the [`tactics_core`] commander against a small kinematic
//! battlefield so decision logic can be exercised without a game client:
//!
//! - **Scenarios**: RON files describing both sides' opening forces
//! - **Runs**: one JSON line per decision tick on stdout, a summary at the end
//! - **Batches**: every scenario in a directory, in parallel
//!
//! # Example
//!
//! ```bash
//! # Run one scenario
//! cargo run -p tactics_headless -- run crates/tactics_headless/scenarios/bunker_hold.ron
//!
//! # Run all shipped scenarios and save the summaries
//! cargo run -p tactics_headless -- batch crates/tactics_headless/scenarios --output results.json
//! ```

pub mod batch;
pub mod battlefield;
pub mod danger;
pub mod runner;
pub mod scenario;

pub use batch::{run_batch, scenario_files, BatchEntry, BatchResults};
pub use battlefield::Battlefield;
pub use danger::ProximityDanger;
pub use runner::{HeadlessRunner, Outcome, RunSummary, TickLine};
pub use scenario::{Scenario, ScenarioError, UnitPlacement};
