//! # Tactics Test Utilities
//!
//! Shared testing utilities for the tactical crates:
//! - Unit fixtures and fixed-point helpers
//! - A fake world builder producing [`tactics_core::world::SnapshotWorld`]
//! - A stub danger field
//! - Property-based testing strategies
//! - Decision purity harness

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod danger;
pub mod determinism;
pub mod fake_world;
pub mod fixtures;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
