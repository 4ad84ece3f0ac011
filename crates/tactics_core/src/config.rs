//! Tuning configuration for the tactical core.
//!
//! Every threshold the decision code uses is a named field here. The defaults
//! are play-tested values; a game can override any subset from a RON file:
//!
//! ```ron
//! (
//!     orders: (chase_ratio: 2.5),
//!     garrison: (critical_health: 120),
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TacticsError};
use crate::math::{fixed_serde, Fixed};

/// Top-level configuration, grouped by component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TacticsConfig {
    /// Army clustering.
    pub clustering: ClusteringConfig,
    /// Enemy memory.
    pub memory: MemoryConfig,
    /// Orders engine thresholds.
    pub orders: OrderThresholds,
    /// Unit micro.
    pub micro: MicroConfig,
    /// Garrison controller.
    pub garrison: GarrisonConfig,
}

impl TacticsConfig {
    /// Load and validate a configuration from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TacticsError::ConfigNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse and validate a configuration from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the decision code misbehave.
    pub fn validate(&self) -> Result<()> {
        let c = &self.clustering;
        if c.recompute_interval == 0 {
            return Err(invalid("clustering.recompute_interval", "must be at least 1"));
        }
        positive("clustering.base_radius", c.base_radius)?;
        non_negative("clustering.engagement_margin", c.engagement_margin)?;

        non_negative("memory.frames_per_speed", self.memory.frames_per_speed)?;

        let o = &self.orders;
        positive("orders.offense_ratio", o.offense_ratio)?;
        if o.chase_ratio < o.offense_ratio {
            return Err(invalid(
                "orders.chase_ratio",
                format!("must be >= offense_ratio ({})", o.offense_ratio),
            ));
        }
        positive("orders.base_defense_radius", o.base_defense_radius)?;
        positive("orders.threat_distance", o.threat_distance)?;
        positive("orders.regroup_distance", o.regroup_distance)?;
        positive("orders.regroup_min_ratio", o.regroup_min_ratio)?;
        if o.regroup_min_ratio > o.regroup_max_ratio {
            return Err(invalid(
                "orders.regroup_min_ratio",
                format!("must not exceed regroup_max_ratio ({})", o.regroup_max_ratio),
            ));
        }
        fraction("orders.stim_ready", o.stim_ready)?;
        fraction("orders.push_health", o.push_health)?;
        fraction("orders.creep_density", o.creep_density)?;
        positive("orders.drop_win_ratio", o.drop_win_ratio)?;

        let m = &self.micro;
        fraction("micro.stim_min_health", m.stim_min_health)?;
        fraction("micro.facing_cos", m.facing_cos)?;
        positive("micro.stutter_step", m.stutter_step)?;
        positive("micro.heal_range", m.heal_range)?;
        positive("micro.load_distance", m.load_distance)?;
        positive("micro.unload_distance", m.unload_distance)?;
        non_negative("micro.retreat_arrive_distance", m.retreat_arrive_distance)?;

        let g = &self.garrison;
        positive("garrison.base_range", g.base_range)?;
        non_negative("garrison.safety_margin", g.safety_margin)?;
        positive("garrison.load_distance", g.load_distance)?;
        fraction("garrison.armored_threat_ratio", g.armored_threat_ratio)?;
        Ok(())
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> TacticsError {
    TacticsError::InvalidConfig {
        field,
        message: message.into(),
    }
}

fn positive(field: &'static str, value: Fixed) -> Result<()> {
    if value > Fixed::ZERO {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &'static str, value: Fixed) -> Result<()> {
    if value >= Fixed::ZERO {
        Ok(())
    } else {
        Err(invalid(field, format!("must not be negative, got {value}")))
    }
}

fn fraction(field: &'static str, value: Fixed) -> Result<()> {
    if (Fixed::ZERO..=Fixed::ONE).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("must be within 0..=1, got {value}")))
    }
}

// ============================================================================
// Component sections
// ============================================================================

/// Army clustering parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Full recomputation happens every this many ticks.
    pub recompute_interval: u32,
    /// Link radius offset: `R = sqrt(total_supply) + base_radius`.
    #[serde(with = "fixed_serde")]
    pub base_radius: Fixed,
    /// Added to the member spread to form the army's engagement radius.
    #[serde(with = "fixed_serde")]
    pub engagement_margin: Fixed,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            recompute_interval: 4,
            base_radius: Fixed::from_num(10),
            engagement_margin: Fixed::from_num(10),
        }
    }
}

/// Ghost lifetime parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Lifetime of a ghost for a stationary unit, in frames.
    pub base_lifetime_frames: u32,
    /// Frames of lifetime lost per unit of movement speed.
    #[serde(with = "fixed_serde")]
    pub frames_per_speed: Fixed,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            base_lifetime_frames: 300,
            frames_per_speed: Fixed::from_num(60),
        }
    }
}

/// Orders engine thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderThresholds {
    /// Own/enemy strength ratio for an aggressive chase.
    #[serde(with = "fixed_serde")]
    pub chase_ratio: Fixed,
    /// Own/enemy strength ratio for sustained offense (needs stim).
    #[serde(with = "fixed_serde")]
    pub offense_ratio: Fixed,
    /// Stim research progress that counts as available.
    #[serde(with = "fixed_serde")]
    pub stim_ready: Fixed,
    /// Army within this distance of a threatened structure defends it.
    #[serde(with = "fixed_serde")]
    pub base_defense_radius: Fixed,
    /// Enemy within this distance of a production structure is a threat.
    #[serde(with = "fixed_serde")]
    pub threat_distance: Fixed,
    /// Minimum enemy strength near a structure to trigger defense.
    #[serde(with = "fixed_serde")]
    pub threat_supply: Fixed,
    /// Creep coverage that warrants clearing.
    #[serde(with = "fixed_serde")]
    pub creep_density: Fixed,
    /// Maximum center distance to a friendly army for regrouping.
    #[serde(with = "fixed_serde")]
    pub regroup_distance: Fixed,
    /// Lower bound of the size ratio between regrouping armies.
    #[serde(with = "fixed_serde")]
    pub regroup_min_ratio: Fixed,
    /// Upper bound of the size ratio between regrouping armies.
    #[serde(with = "fixed_serde")]
    pub regroup_max_ratio: Fixed,
    /// Merged strength must exceed this for a regroup.
    #[serde(with = "fixed_serde")]
    pub regroup_min_supply: Fixed,
    /// Minimum potential supply for a global push.
    #[serde(with = "fixed_serde")]
    pub push_potential: Fixed,
    /// Minimum army health fraction for a global push.
    #[serde(with = "fixed_serde")]
    pub push_health: Fixed,
    /// Potential supply that counts as overwhelming regardless of the enemy.
    #[serde(with = "fixed_serde")]
    pub overwhelming_supply: Fixed,
    /// Free transport slots needed to open a drop.
    pub drop_min_cargo: u8,
    /// Own/enemy strength ratio at which a drop unloads and fights.
    #[serde(with = "fixed_serde")]
    pub drop_win_ratio: Fixed,
    /// Enemy anti-air strength above which a drop turns back.
    #[serde(with = "fixed_serde")]
    pub drop_max_anti_air: Fixed,
    /// Minimum carried biological supply to keep a drop going.
    #[serde(with = "fixed_serde")]
    pub drop_min_bio_supply: Fixed,
}

impl Default for OrderThresholds {
    fn default() -> Self {
        Self {
            chase_ratio: Fixed::from_num(2),
            offense_ratio: Fixed::from_num(1.5),
            stim_ready: Fixed::from_num(0.9),
            base_defense_radius: Fixed::from_num(15),
            threat_distance: Fixed::from_num(10),
            threat_supply: Fixed::from_num(12),
            creep_density: Fixed::from_num(0.3),
            regroup_distance: Fixed::from_num(30),
            regroup_min_ratio: Fixed::from_num(2) / Fixed::from_num(3),
            regroup_max_ratio: Fixed::from_num(1.5),
            regroup_min_supply: Fixed::from_num(16),
            push_potential: Fixed::from_num(8),
            push_health: Fixed::from_num(0.75),
            overwhelming_supply: Fixed::from_num(80),
            drop_min_cargo: 8,
            drop_win_ratio: Fixed::from_num(2),
            drop_max_anti_air: Fixed::from_num(4),
            drop_min_bio_supply: Fixed::from_num(4),
        }
    }
}

/// Per-unit micro parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicroConfig {
    /// Minimum health fraction before a unit stims.
    #[serde(with = "fixed_serde")]
    pub stim_min_health: Fixed,
    /// Cosine of the half-angle within which a threat counts as facing.
    #[serde(with = "fixed_serde")]
    pub facing_cos: Fixed,
    /// Distance of one stutter step.
    #[serde(with = "fixed_serde")]
    pub stutter_step: Fixed,
    /// Extra distance beyond weapon range at which a threat is "near".
    #[serde(with = "fixed_serde")]
    pub threat_margin: Fixed,
    /// Healing ability range.
    #[serde(with = "fixed_serde")]
    pub heal_range: Fixed,
    /// Energy needed to cloak or snipe.
    pub sniper_energy: u32,
    /// Biological targets above this health are worth a snipe.
    pub snipe_min_health: u32,
    /// Enemies within this distance make a sniper cloak.
    #[serde(with = "fixed_serde")]
    pub cloak_radius: Fixed,
    /// Search radius for the detector's safe escort position.
    #[serde(with = "fixed_serde")]
    pub detector_leash: Fixed,
    /// Ground units within this distance of a transport can be loaded.
    #[serde(with = "fixed_serde")]
    pub load_distance: Fixed,
    /// A drop unloads within this distance of its target.
    #[serde(with = "fixed_serde")]
    pub unload_distance: Fixed,
    /// A drop on the target's terrain level unloads within this distance.
    #[serde(with = "fixed_serde")]
    pub plateau_distance: Fixed,
    /// Danger at a transport above which a drop aborts.
    #[serde(with = "fixed_serde")]
    pub drop_abort_danger: Fixed,
    /// Units closer than this to the retreat anchor stop moving.
    #[serde(with = "fixed_serde")]
    pub retreat_arrive_distance: Fixed,
    /// Search radius for a garrison structure to enter.
    #[serde(with = "fixed_serde")]
    pub garrison_seek_radius: Fixed,
    /// Distance at which a unit requests garrison entry instead of moving.
    #[serde(with = "fixed_serde")]
    pub garrison_enter_distance: Fixed,
    /// Unengaged enemy strength that justifies entering a garrison.
    #[serde(with = "fixed_serde")]
    pub garrison_threat_supply: Fixed,
}

impl Default for MicroConfig {
    fn default() -> Self {
        Self {
            stim_min_health: Fixed::from_num(0.7),
            facing_cos: Fixed::from_num(0.7071),
            stutter_step: Fixed::from_num(1.5),
            threat_margin: Fixed::from_num(1),
            heal_range: Fixed::from_num(4),
            sniper_energy: 50,
            snipe_min_health: 90,
            cloak_radius: Fixed::from_num(10),
            detector_leash: Fixed::from_num(4),
            load_distance: Fixed::from_num(5),
            unload_distance: Fixed::from_num(6),
            plateau_distance: Fixed::from_num(15),
            drop_abort_danger: Fixed::from_num(20),
            retreat_arrive_distance: Fixed::from_num(5),
            garrison_seek_radius: Fixed::from_num(12),
            garrison_enter_distance: Fixed::from_num(3),
            garrison_threat_supply: Fixed::from_num(4),
        }
    }
}

/// Garrison controller parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarrisonConfig {
    /// Weapon range of a garrison's occupants before research.
    #[serde(with = "fixed_serde")]
    pub base_range: Fixed,
    /// Range added by the garrison range research.
    #[serde(with = "fixed_serde")]
    pub range_bonus: Fixed,
    /// Cargo slots added by the garrison capacity research.
    pub capacity_bonus: u8,
    /// Threats this far beyond range still count.
    #[serde(with = "fixed_serde")]
    pub safety_margin: Fixed,
    /// Remembered threats this far beyond range count as approaching.
    #[serde(with = "fixed_serde")]
    pub approach_margin: Fixed,
    /// Below this absolute health the garrison unloads unconditionally.
    pub critical_health: u32,
    /// Eligible units within this distance can be loaded.
    #[serde(with = "fixed_serde")]
    pub load_distance: Fixed,
    /// Danger at a unit above which it counts as in danger.
    #[serde(with = "fixed_serde")]
    pub danger_threshold: Fixed,
    /// Armored share of threats that switches to anti-armor load priority.
    #[serde(with = "fixed_serde")]
    pub armored_threat_ratio: Fixed,
}

impl Default for GarrisonConfig {
    fn default() -> Self {
        Self {
            base_range: Fixed::from_num(6),
            range_bonus: Fixed::from_num(1),
            capacity_bonus: 2,
            safety_margin: Fixed::from_num(3),
            approach_margin: Fixed::from_num(10),
            critical_health: 100,
            load_distance: Fixed::from_num(6),
            danger_threshold: Fixed::from_num(5),
            armored_threat_ratio: Fixed::from_num(0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(TacticsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config = TacticsConfig::from_ron_str(
            "(orders: (chase_ratio: 2.5), garrison: (critical_health: 120))",
        )
        .unwrap();
        assert_eq!(config.orders.chase_ratio, Fixed::from_num(2.5));
        assert_eq!(config.orders.offense_ratio, Fixed::from_num(1.5));
        assert_eq!(config.garrison.critical_health, 120);
        assert_eq!(config.clustering.recompute_interval, 4);
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = TacticsConfig::from_ron_str("()").unwrap();
        assert_eq!(config, TacticsConfig::default());
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = TacticsConfig::from_ron_str("(clustering: (recompute_interval: 0))").unwrap_err();
        assert!(matches!(
            err,
            TacticsError::InvalidConfig {
                field: "clustering.recompute_interval",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_inverted_regroup_bounds() {
        let err = TacticsConfig::from_ron_str(
            "(orders: (regroup_min_ratio: 2.0, regroup_max_ratio: 1.0))",
        )
        .unwrap_err();
        assert!(matches!(err, TacticsError::InvalidConfig { .. }));
    }

    #[test]
    fn test_rejects_chase_below_offense() {
        let mut config = TacticsConfig::default();
        config.orders.chase_ratio = Fixed::ONE;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error_surfaces() {
        let err = TacticsConfig::from_ron_str("(orders: [").unwrap_err();
        assert!(matches!(err, TacticsError::ParseError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = TacticsConfig::load("/nonexistent/tactics.ron").unwrap_err();
        assert!(matches!(err, TacticsError::ConfigNotFound(_)));
    }
}
