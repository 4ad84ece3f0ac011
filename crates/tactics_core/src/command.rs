//! Commands issued to the engine.
//!
//! Commands are fire-and-forget and idempotent: issuing the same command to
//! the same unit twice in a tick has no extra effect, so [`CommandBuffer`]
//! drops exact duplicates.

use serde::{Deserialize, Serialize};

use crate::math::Vec2Fixed;
use crate::unit::UnitTag;

/// Unit abilities the core uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// Trade health for attack and movement speed.
    Stim,
    /// Heal a biological ally.
    Heal,
    /// Turn cloak on.
    Cloak,
    /// Turn cloak off.
    Decloak,
    /// High-damage shot against a biological target.
    Snipe,
}

/// Target of an ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// Self-cast.
    None,
    /// Unit-targeted.
    Unit(UnitTag),
    /// Point-targeted.
    Point(Vec2Fixed),
}

/// What a unit is told to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Attack a specific unit.
    Attack(UnitTag),
    /// Move to a point, attacking anything on the way.
    AttackMove(Vec2Fixed),
    /// Move to a point, ignoring enemies.
    Move(Vec2Fixed),
    /// Use an ability.
    UseAbility {
        /// Ability to use.
        ability: Ability,
        /// Ability target.
        target: Target,
    },
    /// Load a unit into this transport or garrison.
    Load(UnitTag),
    /// Enter a garrison structure.
    EnterGarrison(UnitTag),
    /// Unload every passenger in place.
    UnloadAll,
    /// Move to a point and unload there.
    UnloadAt(Vec2Fixed),
    /// Set the rally point of a structure.
    Rally(Vec2Fixed),
    /// Stop and hold position.
    Hold,
}

/// One command for one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitCommand {
    /// Commanded unit.
    pub unit: UnitTag,
    /// Action to take.
    pub action: Action,
}

/// Commands collected during one tick, in issue order.
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    commands: Vec<UnitCommand>,
}

impl CommandBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a command. Exact duplicates of an earlier command are dropped.
    pub fn issue(&mut self, unit: UnitTag, action: Action) {
        let command = UnitCommand { unit, action };
        if !self.commands.contains(&command) {
            self.commands.push(command);
        }
    }

    /// Issue an ability command.
    pub fn use_ability(&mut self, unit: UnitTag, ability: Ability, target: Target) {
        self.issue(unit, Action::UseAbility { ability, target });
    }

    /// Commands issued to one unit.
    pub fn for_unit(&self, unit: UnitTag) -> impl Iterator<Item = &Action> {
        self.commands
            .iter()
            .filter(move |c| c.unit == unit)
            .map(|c| &c.action)
    }

    /// Whether a unit received any command.
    #[must_use]
    pub fn has_command(&self, unit: UnitTag) -> bool {
        self.commands.iter().any(|c| c.unit == unit)
    }

    /// All commands in issue order.
    #[must_use]
    pub fn commands(&self) -> &[UnitCommand] {
        &self.commands
    }

    /// Number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing was issued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Take the commands out, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<UnitCommand> {
        std::mem::take(&mut self.commands)
    }
}
