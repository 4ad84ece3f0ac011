//! # Tactics Core
//!
//! Deterministic tactical control layer for a real-time strategy agent.
//!
//! Each tick the core reads a read-only [`world::WorldView`] snapshot and
//! produces unit commands:
//!
//! 1. [`memory`] keeps time-boxed ghosts of enemy units that left vision.
//! 2. [`clustering`] groups own combat units into armies.
//! 3. [`orders`] assigns each army one tactical order from a ranked rule table.
//! 4. [`execution`] turns orders into per-unit micro.
//! 5. [`garrison`] runs bunkers independently of the armies.
//!
//! This crate contains **only** deterministic logic:
//! - No IO apart from loading configuration
//! - No randomness
//! - No floating-point math (uses fixed-point)
//!
//! so the same snapshot always yields the same orders and commands.
//!
//! ## Crate Structure
//!
//! - [`commander`] - Per-tick pipeline and cross-tick state
//! - [`strength`] - Supply and composition queries
//! - [`combat`] - Target selection and threat queries
//! - [`config`] - Tuned thresholds, loadable from RON
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod clustering;
pub mod combat;
pub mod command;
pub mod commander;
pub mod config;
pub mod context;
pub mod error;
pub mod execution;
pub mod garrison;
pub mod math;
pub mod memory;
pub mod orders;
pub mod strength;
pub mod unit;
pub mod unit_type;
pub mod world;

#[cfg(test)]
mod testing;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::clustering::{Army, ArmyCache, ArmyId, ClusterPass};
    pub use crate::command::{Ability, Action, CommandBuffer, Target, UnitCommand};
    pub use crate::commander::{ArmySummary, TacticalCommander, TickReport};
    pub use crate::config::{
        ClusteringConfig, GarrisonConfig, MemoryConfig, MicroConfig, OrderThresholds,
        TacticsConfig,
    };
    pub use crate::context::TickContext;
    pub use crate::error::{Result, TacticsError};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::memory::{EnemyMemory, GhostUnit};
    pub use crate::orders::{ArmyAssessment, Decision, Order};
    pub use crate::unit::{Alliance, Passenger, Unit, UnitTag, Weapon};
    pub use crate::unit_type::{MicroRole, Race, UnitRole, UnitType, Upgrade};
    pub use crate::world::{
        Base, CompositionQuotas, DangerField, Layer, Situation, SnapshotWorld, WorldView,
    };
}
