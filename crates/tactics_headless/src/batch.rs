//! Batch runner: every scenario in a directory, in parallel with rayon.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::runner::{HeadlessRunner, RunSummary};
use crate::scenario::{Scenario, ScenarioError};

/// Outcome of one scenario in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    /// Scenario file.
    pub scenario: PathBuf,
    /// Run summary when the scenario loaded and ran.
    pub summary: Option<RunSummary>,
    /// Load or setup failure.
    pub error: Option<String>,
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// One entry per scenario file, in file-name order.
    pub runs: Vec<BatchEntry>,
    /// Wall-clock runtime.
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }

    /// Entries that failed to load or set up.
    pub fn failures(&self) -> impl Iterator<Item = &BatchEntry> {
        self.runs.iter().filter(|r| r.error.is_some())
    }
}

/// `*.ron` files directly inside `dir`, sorted by path.
pub fn scenario_files(dir: &Path) -> Result<Vec<PathBuf>, ScenarioError> {
    if !dir.is_dir() {
        return Err(ScenarioError::FileNotFound(dir.display().to_string()));
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();
    Ok(files)
}

fn run_one(path: &Path, ticks: Option<u32>) -> Result<RunSummary, ScenarioError> {
    let scenario = Scenario::load(path)?;
    let mut runner = HeadlessRunner::from_scenario(&scenario)?;
    if let Some(ticks) = ticks {
        runner = runner.with_ticks(ticks);
    }
    Ok(runner.run_silent())
}

/// Run every scenario in `dir`, optionally overriding each tick limit.
///
/// A scenario that fails to load is recorded in its entry; the batch
/// itself only fails when the directory cannot be read.
pub fn run_batch(dir: &Path, ticks: Option<u32>) -> Result<BatchResults, ScenarioError> {
    let start = Instant::now();
    let files = scenario_files(dir)?;
    info!(dir = %dir.display(), scenarios = files.len(), "starting batch");

    let runs: Vec<BatchEntry> = files
        .par_iter()
        .map(|path| match run_one(path, ticks) {
            Ok(summary) => BatchEntry {
                scenario: path.clone(),
                summary: Some(summary),
                error: None,
            },
            Err(e) => {
                warn!(scenario = %path.display(), error = %e, "scenario failed");
                BatchEntry {
                    scenario: path.clone(),
                    summary: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    let duration_seconds = start.elapsed().as_secs_f64();
    info!(runs = runs.len(), duration_seconds, "batch complete");
    Ok(BatchResults {
        runs,
        duration_seconds,
    })
}
