//! Headless tactics runner.
//!
//! # Usage
//!
//! ```bash
//! # Run one scenario, tick lines on stdout
//! cargo run -p tactics_headless -- run scenarios/bio_vs_lings.ron
//!
//! # Override tuning and length
//! cargo run -p tactics_headless -- run scenarios/drop_harass.ron --config tuning.ron --ticks 50
//!
//! # Run every scenario in a directory
//! cargo run -p tactics_headless -- batch scenarios --output results/batch.json
//! ```
//!
//! Logs go to stderr so stdout stays machine-readable.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tactics_headless::{run_batch, HeadlessRunner, Scenario, ScenarioError};

#[derive(Parser)]
#[command(name = "tactics_headless")]
#[command(about = "Headless runner for tactical decision scenarios")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single scenario
    Run {
        /// Scenario file to load
        scenario: PathBuf,

        /// Override the scenario's tick limit
        #[arg(short, long)]
        ticks: Option<u32>,

        /// Tuning file, replacing the scenario's own
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Run every scenario in a directory
    Batch {
        /// Directory of scenario files
        dir: PathBuf,

        /// Override every scenario's tick limit
        #[arg(short, long)]
        ticks: Option<u32>,

        /// Write results as JSON here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Run {
            scenario,
            ticks,
            config,
        } => cmd_run(&scenario, ticks, config),
        Commands::Batch { dir, ticks, output } => cmd_batch(&dir, ticks, output),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        process::exit(1);
    }
}

/// Run one scenario, tick lines to stdout and the summary last.
fn cmd_run(path: &Path, ticks: Option<u32>, config: Option<PathBuf>) -> Result<(), ScenarioError> {
    let scenario = Scenario::load(path)?;
    let tuning = scenario.tactics_config(config.as_deref())?;
    let mut runner = HeadlessRunner::new(&scenario, tuning)?;
    if let Some(ticks) = ticks {
        runner = runner.with_ticks(ticks);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = runner.run(&mut out)?;
    let json = serde_json::to_string(&summary).map_err(std::io::Error::other)?;
    writeln!(out, "{json}")?;
    Ok(())
}

/// Run a directory of scenarios in parallel.
fn cmd_batch(dir: &Path, ticks: Option<u32>, output: Option<PathBuf>) -> Result<(), ScenarioError> {
    let results = run_batch(dir, ticks)?;

    for entry in &results.runs {
        match (&entry.summary, &entry.error) {
            (Some(summary), _) => println!(
                "{:<40} {:?} in {} ticks (lost {}, killed {})",
                entry.scenario.display(),
                summary.outcome,
                summary.ticks,
                summary.own_lost,
                summary.enemy_lost
            ),
            (None, Some(error)) => println!("{:<40} FAILED: {error}", entry.scenario.display()),
            (None, None) => {}
        }
    }

    if let Some(path) = output {
        results.save(&path)?;
        tracing::info!(path = %path.display(), "results saved");
    }
    if results.failures().next().is_some() {
        tracing::warn!("some scenarios failed to run");
    }
    Ok(())
}
