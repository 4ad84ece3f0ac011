//! Scenario loading.
//!
//! A scenario is a RON file describing the opening state of one skirmish:
//! units on both sides, held bases, research, and how long to run.
//!
//! ```ron
//! Scenario(
//!     name: "Marines vs lings",
//!     description: "Stimmed bio meets a small ling pack",
//!     upgrades: [Stimpack],
//!     bases: [(townhall: (-30, 0), safe_point: (-36, 0))],
//!     enemy_start: (120, 0),
//!     units: [
//!         (kind: Marine, position: (0, 0), count: 12),
//!         (kind: Zergling, alliance: Enemy, position: (14, 0), count: 10),
//!     ],
//! )
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tactics_core::config::TacticsConfig;
use tactics_core::error::TacticsError;
use tactics_core::math::{Fixed, Vec2Fixed};
use tactics_core::unit::{Alliance, Passenger, Unit, UnitTag};
use tactics_core::unit_type::{Race, UnitType, Upgrade};
use tactics_core::world::{Base, CompositionQuotas, Situation, SnapshotWorld};

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The referenced tuning file is missing or invalid.
    #[error("Invalid tactics config: {0}")]
    Config(#[from] TacticsError),
}

const fn default_ticks() -> u32 {
    200
}

const fn default_frames_per_tick() -> u32 {
    8
}

const fn default_count() -> u32 {
    1
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Decision ticks to run.
    #[serde(default = "default_ticks")]
    pub ticks: u32,
    /// Game frames simulated per decision tick.
    #[serde(default = "default_frames_per_tick")]
    pub frames_per_tick: u32,
    /// Macro situation reported for the whole run.
    #[serde(default)]
    pub situation: Situation,
    /// Research finished at start.
    #[serde(default)]
    pub upgrades: Vec<Upgrade>,
    /// Held bases.
    #[serde(default)]
    pub bases: Vec<BasePlacement>,
    /// Opponent start location.
    #[serde(default)]
    pub enemy_start: (i32, i32),
    /// Opponent race.
    #[serde(default)]
    pub enemy_race: Race,
    /// Composition targets.
    #[serde(default)]
    pub quotas: CompositionQuotas,
    /// Starting units for both sides.
    #[serde(default)]
    pub units: Vec<UnitPlacement>,
    /// Tuning override, relative to the scenario file.
    #[serde(default)]
    pub config: Option<PathBuf>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "Default Skirmish".to_string(),
            description: "A bio squad meets a roach pack in the open".to_string(),
            ticks: default_ticks(),
            frames_per_tick: default_frames_per_tick(),
            situation: Situation::Stable,
            upgrades: vec![Upgrade::Stimpack],
            bases: vec![BasePlacement::new((-30, 0), (-36, 0))],
            enemy_start: (120, 0),
            enemy_race: Race::Zerg,
            quotas: CompositionQuotas::new(),
            units: vec![
                UnitPlacement::new(UnitType::Marine, Alliance::Own, 0, 0, 12),
                UnitPlacement::new(UnitType::Marauder, Alliance::Own, 0, 2, 4),
                UnitPlacement::new(UnitType::Medivac, Alliance::Own, -2, 1, 1),
                UnitPlacement::new(UnitType::Roach, Alliance::Enemy, 20, 0, 6),
            ],
            config: None,
        }
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let mut scenario = Self::from_ron_str(&contents)?;
        if let (Some(config), Some(dir)) = (scenario.config.as_mut(), path.parent()) {
            if config.is_relative() {
                *config = dir.join(&*config);
            }
        }
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Tuning for this run: `override_path` first, then the scenario's own
    /// config file, then the defaults.
    pub fn tactics_config(&self, override_path: Option<&Path>) -> Result<TacticsConfig, ScenarioError> {
        match override_path.or(self.config.as_deref()) {
            Some(path) => Ok(TacticsConfig::load(path)?),
            None => Ok(TacticsConfig::default()),
        }
    }

    /// Build the opening world. Tags are assigned in placement order,
    /// townhalls first.
    #[must_use]
    pub fn build_world(&self) -> SnapshotWorld {
        let mut world = SnapshotWorld::new();
        world.enemy_start = point(self.enemy_start);
        world.enemy_race = self.enemy_race;
        for upgrade in &self.upgrades {
            world.upgrades.insert(*upgrade, Fixed::ONE);
        }

        let mut next_tag: UnitTag = 1;
        for base in &self.bases {
            let townhall = Unit::new(
                next_tag,
                UnitType::CommandCenter,
                Alliance::Own,
                point(base.townhall),
            );
            world.bases.push(Base {
                townhall: next_tag,
                position: townhall.position,
                safe_point: point(base.safe_point),
            });
            world.own.push(townhall);
            next_tag += 1;
        }

        for placement in &self.units {
            for i in 0..placement.count {
                let (unit, used) = placement.spawn(next_tag, i);
                next_tag += used;
                match unit.alliance {
                    Alliance::Enemy => world.enemies.push(unit),
                    Alliance::Own | Alliance::Neutral => world.own.push(unit),
                }
            }
        }
        world
    }
}

fn point((x, y): (i32, i32)) -> Vec2Fixed {
    Vec2Fixed::from_ints(x, y)
}

/// A held base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasePlacement {
    /// Townhall position.
    pub townhall: (i32, i32),
    /// Where retreating units gather.
    pub safe_point: (i32, i32),
}

impl BasePlacement {
    /// Create a new base placement.
    #[must_use]
    pub fn new(townhall: (i32, i32), safe_point: (i32, i32)) -> Self {
        Self {
            townhall,
            safe_point,
        }
    }
}

/// Placement of a row of identical units at scenario start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitPlacement {
    /// Unit type.
    pub kind: UnitType,
    /// Owning side.
    #[serde(default)]
    pub alliance: Alliance,
    /// Position of the first unit; the rest follow along +x.
    pub position: (i32, i32),
    /// Number of units to spawn.
    #[serde(default = "default_count")]
    pub count: u32,
    /// Health override.
    #[serde(default)]
    pub health: Option<u32>,
    /// Energy override.
    #[serde(default)]
    pub energy: Option<u32>,
    /// Units carried inside each spawned transport or garrison.
    #[serde(default)]
    pub passengers: Vec<UnitType>,
}

impl UnitPlacement {
    /// Create a new unit placement.
    #[must_use]
    pub fn new(kind: UnitType, alliance: Alliance, x: i32, y: i32, count: u32) -> Self {
        Self {
            kind,
            alliance,
            position: (x, y),
            count,
            health: None,
            energy: None,
            passengers: Vec::new(),
        }
    }

    /// Spawn the `index`-th unit of this row with tag `tag`. Passengers take
    /// the following tags; returns the unit and the number of tags used.
    fn spawn(&self, tag: UnitTag, index: u32) -> (Unit, UnitTag) {
        let position = Vec2Fixed::from_ints(self.position.0 + index as i32, self.position.1);
        let mut unit = Unit::new(tag, self.kind, self.alliance, position);
        if let Some(health) = self.health {
            unit = unit.with_health(health);
        }
        if let Some(energy) = self.energy {
            unit = unit.with_energy(energy);
        }
        let mut used = 1;
        for kind in &self.passengers {
            unit = unit.with_passenger(Passenger::new(tag + used, *kind));
            used += 1;
        }
        (unit, used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario() {
        let scenario = Scenario::default();
        let world = scenario.build_world();
        assert_eq!(world.bases.len(), 1);
        assert_eq!(world.bases[0].townhall, 1);
        assert_eq!(world.own.len(), 1 + 12 + 4 + 1);
        assert_eq!(world.enemies.len(), 6);
    }

    #[test]
    fn test_parse_from_ron_with_defaults() {
        let ron = r#"
            Scenario(
                name: "Test",
                units: [
                    (kind: Marine, position: (0, 0), count: 3),
                    (kind: Bunker, position: (5, 5), passengers: [Marine, Marauder]),
                    (kind: Zergling, alliance: Enemy, position: (20, 0), health: Some(10)),
                ],
            )
        "#;
        let scenario = Scenario::from_ron_str(ron).unwrap();
        assert_eq!(scenario.ticks, 200);
        assert_eq!(scenario.frames_per_tick, 8);
        assert_eq!(scenario.situation, Situation::Stable);

        let world = scenario.build_world();
        let tags: Vec<_> = world.own.iter().map(|u| u.tag).collect();
        assert_eq!(tags, vec![1, 2, 3, 4]);
        assert_eq!(world.own[3].passengers.len(), 2);
        assert_eq!(world.own[3].passengers[1].tag, 6);
        assert_eq!(world.enemies[0].tag, 7);
        assert_eq!(world.enemies[0].health, 10);
    }

    #[test]
    fn test_parse_error_reported() {
        let err = Scenario::from_ron_str("Scenario(name: 3)").unwrap_err();
        assert!(matches!(err, ScenarioError::ParseError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Scenario::load("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }
}
