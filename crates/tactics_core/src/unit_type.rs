//! Static unit catalogue.
//!
//! This module is the single source of truth for per-type facts the tactical
//! core needs:
//! - [`UnitType`]: closed set of unit and structure types
//! - [`UnitRole`]: bitflags for fast classification queries
//! - [`MicroRole`]: the micro behaviour a unit type is driven by
//!
//! Every lookup is a `match` over a `const` table, so no allocation and no
//! string handling happens at runtime.

use serde::{Deserialize, Serialize};

use crate::math::Fixed;
use crate::unit::Weapon;

/// Bitflags for fast unit classification queries.
///
/// # Example
///
/// ```
/// use tactics_core::unit_type::UnitRole;
///
/// let role = UnitRole::BIO.union(UnitRole::ARMORED);
/// assert!(role.contains(UnitRole::ARMORED));
/// assert!(role.intersects(UnitRole::BIO));
/// assert!(!role.contains(UnitRole::FLYING));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UnitRole(u32);

impl UnitRole {
    // ========================================
    // Attributes
    // ========================================

    /// Biological (healable by healers, affected by snipe).
    pub const BIO: Self = Self(1 << 0);
    /// Mechanical.
    pub const MECHANICAL: Self = Self(1 << 1);
    /// Armored.
    pub const ARMORED: Self = Self(1 << 2);
    /// Light.
    pub const LIGHT: Self = Self(1 << 3);
    /// Massive.
    pub const MASSIVE: Self = Self(1 << 4);
    /// Airborne.
    pub const FLYING: Self = Self(1 << 5);

    // ========================================
    // Function
    // ========================================

    /// Can see cloaked and burrowed units.
    pub const DETECTOR: Self = Self(1 << 6);
    /// Economy worker.
    pub const WORKER: Self = Self(1 << 7);
    /// Static structure.
    pub const STRUCTURE: Self = Self(1 << 8);
    /// Restores health of biological allies.
    pub const HEALER: Self = Self(1 << 9);
    /// Mobile transport.
    pub const TRANSPORT: Self = Self(1 << 10);
    /// Static structure units can garrison inside.
    pub const GARRISON: Self = Self(1 << 11);
    /// Produces units.
    pub const PRODUCTION: Self = Self(1 << 12);
    /// Main base structure.
    pub const TOWNHALL: Self = Self(1 << 13);
    /// Friendly mobile combat unit eligible for army clustering.
    pub const ARMY: Self = Self(1 << 14);

    // ========================================
    // Methods
    // ========================================

    /// Empty role (no flags set).
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Check if all flags in `other` are set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any flags in `other` are set in `self`.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Combine two roles (union of flags).
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Get raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl std::ops::BitOr for UnitRole {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// Playable race, used for matchup-specific behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Race {
    /// Terran.
    Terran,
    /// Zerg.
    Zerg,
    /// Protoss.
    Protoss,
    /// Not yet scouted.
    #[default]
    Random,
}

/// Micro behaviour a unit is driven by during execution.
///
/// Resolved once per unit from its type, then dispatched through a handler
/// table indexed by [`MicroRole::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MicroRole {
    /// Stim-capable ranged infantry.
    RangedBio,
    /// Cloaking infantry with a snipe ability.
    Sniper,
    /// Healer that doubles as a transport.
    Healer,
    /// Flying detector escorting the army.
    Detector,
    /// Ground vehicle.
    Vehicle,
    /// Air combat unit.
    Air,
    /// No micro (structures, workers, opponent types).
    Passive,
}

impl MicroRole {
    /// Number of roles, for handler tables.
    pub const COUNT: usize = 7;

    /// Dense index into a handler table.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::RangedBio => 0,
            Self::Sniper => 1,
            Self::Healer => 2,
            Self::Detector => 3,
            Self::Vehicle => 4,
            Self::Air => 5,
            Self::Passive => 6,
        }
    }
}

/// Research the core cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Upgrade {
    /// Infantry stim.
    Stimpack,
    /// +10 infantry health.
    CombatShield,
    /// Slowing anti-armor shells.
    ConcussiveShells,
    /// Sniper cloak.
    PersonalCloaking,
    /// +1 range for garrison structures.
    HiSecAutoTracking,
    /// +2 cargo for garrison structures.
    NeosteelArmor,
}

/// Static weapon description stored in the table.
#[derive(Debug, Clone, Copy)]
struct WeaponSpec {
    range_tenths: u16,
    dps_tenths: u16,
    cooldown_frames: u16,
}

impl WeaponSpec {
    fn to_weapon(self) -> Weapon {
        Weapon {
            range: Fixed::from_num(self.range_tenths) / Fixed::from_num(10),
            dps: Fixed::from_num(self.dps_tenths) / Fixed::from_num(10),
            cooldown: Fixed::from_num(self.cooldown_frames),
        }
    }
}

/// One row of the catalogue.
#[derive(Debug, Clone, Copy)]
struct UnitTypeInfo {
    supply_halves: u8,
    roles: UnitRole,
    cargo_size: u8,
    cargo_capacity: u8,
    health: u32,
    shield: u32,
    energy: u32,
    speed_cents: u16,
    radius_cents: u16,
    ground: Option<WeaponSpec>,
    air: Option<WeaponSpec>,
    bonus_vs: Option<UnitRole>,
    race: Race,
}

impl UnitTypeInfo {
    const fn new(race: Race, supply_halves: u8, roles: UnitRole, health: u32) -> Self {
        Self {
            supply_halves,
            roles,
            cargo_size: 0,
            cargo_capacity: 0,
            health,
            shield: 0,
            energy: 0,
            speed_cents: 0,
            radius_cents: 50,
            ground: None,
            air: None,
            bonus_vs: None,
            race,
        }
    }

    const fn mobile(mut self, speed_cents: u16, radius_cents: u16, cargo_size: u8) -> Self {
        self.speed_cents = speed_cents;
        self.radius_cents = radius_cents;
        self.cargo_size = cargo_size;
        self
    }

    const fn shield(mut self, shield: u32) -> Self {
        self.shield = shield;
        self
    }

    const fn energy(mut self, energy: u32) -> Self {
        self.energy = energy;
        self
    }

    const fn capacity(mut self, slots: u8) -> Self {
        self.cargo_capacity = slots;
        self
    }

    const fn radius(mut self, radius_cents: u16) -> Self {
        self.radius_cents = radius_cents;
        self
    }

    const fn ground(mut self, range_tenths: u16, dps_tenths: u16, cooldown_frames: u16) -> Self {
        self.ground = Some(WeaponSpec {
            range_tenths,
            dps_tenths,
            cooldown_frames,
        });
        self
    }

    const fn air(mut self, range_tenths: u16, dps_tenths: u16, cooldown_frames: u16) -> Self {
        self.air = Some(WeaponSpec {
            range_tenths,
            dps_tenths,
            cooldown_frames,
        });
        self
    }

    const fn bonus(mut self, role: UnitRole) -> Self {
        self.bonus_vs = Some(role);
        self
    }
}

/// Unit and structure types known to the tactical core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum UnitType {
    // Terran
    Scv,
    Marine,
    Marauder,
    Reaper,
    Ghost,
    Hellion,
    Hellbat,
    SiegeTank,
    Cyclone,
    Thor,
    VikingFighter,
    Medivac,
    Liberator,
    Raven,
    Banshee,
    Battlecruiser,
    CommandCenter,
    OrbitalCommand,
    PlanetaryFortress,
    SupplyDepot,
    Barracks,
    Factory,
    Starport,
    Bunker,
    MissileTurret,
    EngineeringBay,
    // Zerg
    Drone,
    Zergling,
    Baneling,
    Queen,
    Roach,
    Ravager,
    Hydralisk,
    Lurker,
    Mutalisk,
    Corruptor,
    Ultralisk,
    Infestor,
    Overlord,
    Overseer,
    BroodLord,
    Hatchery,
    SpineCrawler,
    SporeCrawler,
    CreepTumor,
    // Protoss
    Probe,
    Zealot,
    Stalker,
    Adept,
    Sentry,
    HighTemplar,
    DarkTemplar,
    Archon,
    Immortal,
    Colossus,
    Disruptor,
    Observer,
    WarpPrism,
    Phoenix,
    VoidRay,
    Oracle,
    Carrier,
    Tempest,
    Nexus,
    Pylon,
    Gateway,
    PhotonCannon,
    ShieldBattery,
    /// Anything the catalogue does not model.
    Unknown,
}

const BIO: UnitRole = UnitRole::BIO;
const MECH: UnitRole = UnitRole::MECHANICAL;
const ARMORED: UnitRole = UnitRole::ARMORED;
const LIGHT: UnitRole = UnitRole::LIGHT;
const MASSIVE: UnitRole = UnitRole::MASSIVE;
const FLYING: UnitRole = UnitRole::FLYING;
const DETECTOR: UnitRole = UnitRole::DETECTOR;
const WORKER: UnitRole = UnitRole::WORKER;
const STRUCTURE: UnitRole = UnitRole::STRUCTURE;
const ARMY: UnitRole = UnitRole::ARMY;

const fn roles(flags: &[UnitRole]) -> UnitRole {
    let mut bits = 0;
    let mut i = 0;
    while i < flags.len() {
        bits |= flags[i].0;
        i += 1;
    }
    UnitRole(bits)
}

impl UnitType {
    #[allow(clippy::too_many_lines)]
    const fn info(self) -> UnitTypeInfo {
        use Race::{Protoss as P, Terran as T, Zerg as Z};
        type I = UnitTypeInfo;
        match self {
            // ---------------------------------------------------------------
            // Terran
            // ---------------------------------------------------------------
            Self::Scv => I::new(T, 2, roles(&[BIO, MECH, LIGHT, WORKER]), 45)
                .mobile(394, 38, 1)
                .ground(1, 47, 24),
            Self::Marine => I::new(T, 2, roles(&[BIO, LIGHT, ARMY]), 45)
                .mobile(315, 38, 1)
                .ground(50, 98, 14)
                .air(50, 98, 14),
            Self::Marauder => I::new(T, 4, roles(&[BIO, ARMORED, ARMY]), 125)
                .mobile(315, 56, 2)
                .ground(60, 93, 24)
                .bonus(ARMORED),
            Self::Reaper => I::new(T, 2, roles(&[BIO, LIGHT, ARMY]), 60)
                .mobile(525, 38, 1)
                .ground(50, 101, 18),
            Self::Ghost => I::new(T, 4, roles(&[BIO, ARMY]), 100)
                .energy(200)
                .mobile(394, 38, 2)
                .ground(60, 93, 24)
                .air(60, 93, 24)
                .bonus(LIGHT),
            Self::Hellion => I::new(T, 4, roles(&[MECH, LIGHT, ARMY]), 90)
                .mobile(595, 63, 2)
                .ground(50, 45, 40)
                .bonus(LIGHT),
            Self::Hellbat => I::new(T, 4, roles(&[BIO, MECH, LIGHT, ARMY]), 135)
                .mobile(315, 63, 4)
                .ground(20, 126, 28)
                .bonus(LIGHT),
            Self::SiegeTank => I::new(T, 6, roles(&[MECH, ARMORED, ARMY]), 175)
                .mobile(315, 88, 4)
                .ground(70, 204, 33)
                .bonus(ARMORED),
            Self::Cyclone => I::new(T, 6, roles(&[MECH, ARMORED, ARMY]), 120)
                .mobile(472, 75, 4)
                .ground(50, 252, 16)
                .air(50, 252, 16),
            Self::Thor => I::new(T, 12, roles(&[MECH, ARMORED, MASSIVE, ARMY]), 400)
                .mobile(262, 125, 8)
                .ground(70, 659, 22)
                .air(100, 112, 48),
            Self::VikingFighter => I::new(T, 4, roles(&[MECH, ARMORED, FLYING, ARMY]), 135)
                .mobile(385, 75, 0)
                .air(90, 140, 43)
                .bonus(ARMORED),
            Self::Medivac => I::new(
                T,
                4,
                roles(&[MECH, ARMORED, FLYING, UnitRole::HEALER, UnitRole::TRANSPORT, ARMY]),
                150,
            )
            .energy(200)
            .mobile(350, 75, 0)
            .capacity(8),
            Self::Liberator => I::new(T, 6, roles(&[MECH, ARMORED, FLYING, ARMY]), 180)
                .mobile(472, 75, 0)
                .air(50, 78, 29),
            Self::Raven => I::new(T, 4, roles(&[MECH, LIGHT, FLYING, DETECTOR, ARMY]), 140)
                .energy(200)
                .mobile(385, 63, 0),
            Self::Banshee => I::new(T, 6, roles(&[MECH, LIGHT, FLYING, ARMY]), 140)
                .energy(200)
                .mobile(385, 75, 0)
                .ground(60, 270, 25),
            Self::Battlecruiser => I::new(T, 12, roles(&[MECH, ARMORED, MASSIVE, FLYING, ARMY]), 550)
                .mobile(262, 125, 0)
                .ground(60, 498, 4)
                .air(60, 311, 4),
            Self::CommandCenter | Self::OrbitalCommand => {
                I::new(T, 0, roles(&[MECH, ARMORED, STRUCTURE, UnitRole::TOWNHALL]), 1500)
                    .radius(275)
            }
            Self::PlanetaryFortress => {
                I::new(T, 0, roles(&[MECH, ARMORED, STRUCTURE, UnitRole::TOWNHALL]), 1500)
                    .radius(275)
                    .ground(60, 280, 43)
            }
            Self::SupplyDepot => I::new(T, 0, roles(&[MECH, ARMORED, STRUCTURE]), 400).radius(100),
            Self::Barracks => {
                I::new(T, 0, roles(&[MECH, ARMORED, STRUCTURE, UnitRole::PRODUCTION]), 1000)
                    .radius(181)
            }
            Self::Factory => {
                I::new(T, 0, roles(&[MECH, ARMORED, STRUCTURE, UnitRole::PRODUCTION]), 1250)
                    .radius(181)
            }
            Self::Starport => {
                I::new(T, 0, roles(&[MECH, ARMORED, STRUCTURE, UnitRole::PRODUCTION]), 1300)
                    .radius(181)
            }
            Self::Bunker => I::new(T, 0, roles(&[MECH, ARMORED, STRUCTURE, UnitRole::GARRISON]), 400)
                .radius(125)
                .capacity(4),
            Self::MissileTurret => I::new(T, 0, roles(&[MECH, ARMORED, STRUCTURE, DETECTOR]), 250)
                .radius(100)
                .air(70, 393, 14),
            Self::EngineeringBay => I::new(T, 0, roles(&[MECH, ARMORED, STRUCTURE]), 850).radius(181),

            // ---------------------------------------------------------------
            // Zerg
            // ---------------------------------------------------------------
            Self::Drone => I::new(Z, 2, roles(&[BIO, LIGHT, WORKER]), 40)
                .mobile(394, 38, 1)
                .ground(1, 47, 24),
            Self::Zergling => I::new(Z, 1, roles(&[BIO, LIGHT]), 35)
                .mobile(413, 38, 1)
                .ground(1, 100, 11),
            Self::Baneling => I::new(Z, 1, roles(&[BIO]), 30)
                .mobile(350, 38, 2)
                .ground(3, 200, 22)
                .bonus(LIGHT),
            Self::Queen => I::new(Z, 4, roles(&[BIO]), 175)
                .energy(200)
                .mobile(131, 88, 2)
                .ground(50, 112, 16)
                .air(70, 126, 16),
            Self::Roach => I::new(Z, 4, roles(&[BIO, ARMORED]), 145)
                .mobile(315, 63, 2)
                .ground(40, 112, 27),
            Self::Ravager => I::new(Z, 6, roles(&[BIO]), 120)
                .mobile(385, 75, 4)
                .ground(60, 140, 23),
            Self::Hydralisk => I::new(Z, 4, roles(&[BIO, LIGHT]), 90)
                .mobile(315, 63, 2)
                .ground(50, 224, 13)
                .air(50, 224, 13),
            Self::Lurker => I::new(Z, 6, roles(&[BIO, ARMORED]), 200)
                .mobile(413, 75, 4)
                .ground(80, 140, 32)
                .bonus(ARMORED),
            Self::Mutalisk => I::new(Z, 4, roles(&[BIO, LIGHT, FLYING]), 120)
                .mobile(560, 63, 0)
                .ground(30, 126, 24)
                .air(30, 126, 24),
            Self::Corruptor => I::new(Z, 4, roles(&[BIO, ARMORED, FLYING]), 200)
                .mobile(472, 63, 0)
                .air(60, 107, 30),
            Self::Ultralisk => I::new(Z, 12, roles(&[BIO, ARMORED, MASSIVE]), 500)
                .mobile(413, 100, 8)
                .ground(10, 574, 14),
            Self::Infestor => I::new(Z, 4, roles(&[BIO, ARMORED]), 90)
                .energy(200)
                .mobile(315, 75, 2),
            Self::Overlord => I::new(Z, 0, roles(&[BIO, ARMORED, FLYING]), 200).mobile(90, 100, 0),
            Self::Overseer => {
                I::new(Z, 0, roles(&[BIO, ARMORED, FLYING, DETECTOR]), 200).mobile(262, 75, 0)
            }
            Self::BroodLord => I::new(Z, 8, roles(&[BIO, ARMORED, MASSIVE, FLYING]), 225)
                .mobile(197, 100, 0)
                .ground(100, 224, 40),
            Self::Hatchery => {
                I::new(Z, 0, roles(&[BIO, ARMORED, STRUCTURE, UnitRole::TOWNHALL]), 1500)
                    .radius(275)
            }
            Self::SpineCrawler => I::new(Z, 0, roles(&[BIO, ARMORED, STRUCTURE]), 300)
                .radius(100)
                .ground(70, 225, 41)
                .bonus(ARMORED),
            Self::SporeCrawler => I::new(Z, 0, roles(&[BIO, ARMORED, STRUCTURE, DETECTOR]), 400)
                .radius(100)
                .air(70, 150, 14),
            Self::CreepTumor => I::new(Z, 0, roles(&[STRUCTURE]), 50).radius(50),

            // ---------------------------------------------------------------
            // Protoss
            // ---------------------------------------------------------------
            Self::Probe => I::new(P, 2, roles(&[MECH, LIGHT, WORKER]), 20)
                .shield(20)
                .mobile(394, 38, 1)
                .ground(1, 37, 24),
            Self::Zealot => I::new(P, 4, roles(&[BIO, LIGHT]), 100)
                .shield(50)
                .mobile(315, 50, 2)
                .ground(1, 186, 19),
            Self::Stalker => I::new(P, 4, roles(&[MECH, ARMORED]), 80)
                .shield(80)
                .mobile(413, 63, 2)
                .ground(60, 97, 30)
                .air(60, 97, 30)
                .bonus(ARMORED),
            Self::Adept => I::new(P, 4, roles(&[BIO, LIGHT]), 70)
                .shield(70)
                .mobile(350, 50, 2)
                .ground(40, 62, 25)
                .bonus(LIGHT),
            Self::Sentry => I::new(P, 4, roles(&[MECH, LIGHT]), 40)
                .shield(40)
                .energy(200)
                .mobile(315, 50, 2)
                .ground(50, 84, 16)
                .air(50, 84, 16),
            Self::HighTemplar => I::new(P, 4, roles(&[BIO, LIGHT]), 40)
                .shield(40)
                .energy(200)
                .mobile(262, 38, 2),
            Self::DarkTemplar => I::new(P, 4, roles(&[BIO, LIGHT]), 40)
                .shield(80)
                .mobile(394, 50, 2)
                .ground(1, 372, 27),
            Self::Archon => I::new(P, 8, roles(&[MASSIVE]), 10)
                .shield(350)
                .mobile(394, 100, 4)
                .ground(30, 200, 20)
                .air(30, 200, 20)
                .bonus(BIO),
            Self::Immortal => I::new(P, 8, roles(&[MECH, ARMORED]), 200)
                .shield(100)
                .mobile(315, 75, 4)
                .ground(60, 192, 23)
                .bonus(ARMORED),
            Self::Colossus => I::new(P, 12, roles(&[MECH, ARMORED, MASSIVE]), 200)
                .shield(150)
                .mobile(315, 100, 8)
                .ground(70, 187, 24)
                .bonus(LIGHT),
            Self::Disruptor => I::new(P, 6, roles(&[MECH, ARMORED]), 100)
                .shield(100)
                .mobile(315, 50, 4),
            Self::Observer => {
                I::new(P, 2, roles(&[MECH, LIGHT, FLYING, DETECTOR]), 40)
                    .shield(20)
                    .mobile(263, 50, 0)
            }
            Self::WarpPrism => I::new(P, 4, roles(&[MECH, ARMORED, FLYING, UnitRole::TRANSPORT]), 80)
                .shield(100)
                .mobile(413, 88, 0)
                .capacity(8),
            Self::Phoenix => I::new(P, 4, roles(&[MECH, LIGHT, FLYING]), 120)
                .shield(60)
                .mobile(590, 75, 0)
                .air(50, 224, 18)
                .bonus(LIGHT),
            Self::VoidRay => I::new(P, 8, roles(&[MECH, ARMORED, FLYING]), 150)
                .shield(100)
                .mobile(385, 100, 0)
                .ground(60, 168, 8)
                .air(60, 168, 8)
                .bonus(ARMORED),
            Self::Oracle => I::new(P, 6, roles(&[MECH, ARMORED, FLYING]), 100)
                .shield(60)
                .energy(200)
                .mobile(560, 75, 0)
                .ground(40, 244, 14)
                .bonus(LIGHT),
            Self::Carrier => I::new(P, 12, roles(&[MECH, ARMORED, MASSIVE, FLYING]), 300)
                .shield(150)
                .mobile(262, 125, 0)
                .ground(80, 374, 48)
                .air(80, 374, 48),
            Self::Tempest => I::new(P, 10, roles(&[MECH, ARMORED, MASSIVE, FLYING]), 200)
                .shield(150)
                .mobile(315, 125, 0)
                .ground(100, 170, 45)
                .air(140, 127, 45),
            Self::Nexus => I::new(P, 0, roles(&[MECH, ARMORED, STRUCTURE, UnitRole::TOWNHALL]), 1000)
                .shield(1000)
                .radius(275),
            Self::Pylon => I::new(P, 0, roles(&[MECH, ARMORED, STRUCTURE]), 200)
                .shield(200)
                .radius(100),
            Self::Gateway => {
                I::new(P, 0, roles(&[MECH, ARMORED, STRUCTURE, UnitRole::PRODUCTION]), 500)
                    .shield(500)
                    .radius(181)
            }
            Self::PhotonCannon => I::new(P, 0, roles(&[MECH, ARMORED, STRUCTURE, DETECTOR]), 150)
                .shield(150)
                .radius(100)
                .ground(70, 224, 28)
                .air(70, 224, 28),
            Self::ShieldBattery => I::new(P, 0, roles(&[MECH, ARMORED, STRUCTURE]), 150)
                .shield(150)
                .energy(100)
                .radius(100),

            Self::Unknown => I::new(Race::Random, 0, UnitRole::empty(), 1),
        }
    }

    /// Supply cost.
    #[must_use]
    pub fn supply(self) -> Fixed {
        Fixed::from_num(self.info().supply_halves) / Fixed::from_num(2)
    }

    /// Classification flags.
    #[must_use]
    pub const fn roles(self) -> UnitRole {
        self.info().roles
    }

    /// Whether the type carries all of `role`.
    #[must_use]
    pub const fn has_role(self, role: UnitRole) -> bool {
        self.info().roles.contains(role)
    }

    /// Cargo slots this unit occupies inside a transport or garrison.
    #[must_use]
    pub const fn cargo_size(self) -> u8 {
        self.info().cargo_size
    }

    /// Cargo slots this unit provides (0 for non-carriers).
    #[must_use]
    pub const fn cargo_capacity(self) -> u8 {
        self.info().cargo_capacity
    }

    /// Default maximum health.
    #[must_use]
    pub const fn default_health(self) -> u32 {
        self.info().health
    }

    /// Default maximum shield.
    #[must_use]
    pub const fn default_shield(self) -> u32 {
        self.info().shield
    }

    /// Default maximum energy.
    #[must_use]
    pub const fn default_energy(self) -> u32 {
        self.info().energy
    }

    /// Movement speed in distance units per second.
    #[must_use]
    pub fn default_speed(self) -> Fixed {
        Fixed::from_num(self.info().speed_cents) / Fixed::from_num(100)
    }

    /// Footprint radius.
    #[must_use]
    pub fn default_radius(self) -> Fixed {
        Fixed::from_num(self.info().radius_cents) / Fixed::from_num(100)
    }

    /// Default weapon against ground targets.
    #[must_use]
    pub fn default_ground_weapon(self) -> Option<Weapon> {
        self.info().ground.map(WeaponSpec::to_weapon)
    }

    /// Default weapon against air targets.
    #[must_use]
    pub fn default_air_weapon(self) -> Option<Weapon> {
        self.info().air.map(WeaponSpec::to_weapon)
    }

    /// Attribute this type deals bonus damage against, if any.
    #[must_use]
    pub const fn bonus_vs(self) -> Option<UnitRole> {
        self.info().bonus_vs
    }

    /// Race the type belongs to.
    #[must_use]
    pub const fn race(self) -> Race {
        self.info().race
    }

    /// Whether a friendly unit of this type is clustered into armies.
    #[must_use]
    pub const fn is_army_unit(self) -> bool {
        self.has_role(UnitRole::ARMY)
    }

    /// Infantry that may enter a garrison structure.
    #[must_use]
    pub const fn is_garrison_eligible(self) -> bool {
        matches!(
            self,
            Self::Marine | Self::Marauder | Self::Reaper | Self::Ghost
        )
    }

    /// Micro behaviour for this type.
    #[must_use]
    pub const fn micro_role(self) -> MicroRole {
        match self {
            Self::Marine | Self::Marauder | Self::Reaper => MicroRole::RangedBio,
            Self::Ghost => MicroRole::Sniper,
            Self::Medivac => MicroRole::Healer,
            Self::Raven => MicroRole::Detector,
            Self::Hellion | Self::Hellbat | Self::SiegeTank | Self::Cyclone | Self::Thor => {
                MicroRole::Vehicle
            }
            Self::VikingFighter | Self::Liberator | Self::Banshee | Self::Battlecruiser => {
                MicroRole::Air
            }
            _ => MicroRole::Passive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supply_table() {
        assert_eq!(UnitType::Marine.supply(), Fixed::ONE);
        assert_eq!(UnitType::Marauder.supply(), Fixed::from_num(2));
        assert_eq!(UnitType::Zergling.supply(), Fixed::from_num(0.5));
        assert_eq!(UnitType::Bunker.supply(), Fixed::ZERO);
        assert_eq!(UnitType::Thor.supply(), Fixed::from_num(6));
    }

    #[test]
    fn test_roles() {
        assert!(UnitType::Marine.has_role(UnitRole::BIO));
        assert!(UnitType::Marauder.has_role(UnitRole::ARMORED));
        assert!(UnitType::Medivac.has_role(UnitRole::HEALER | UnitRole::TRANSPORT));
        assert!(UnitType::Drone.has_role(UnitRole::WORKER));
        assert!(!UnitType::Drone.is_army_unit());
        assert!(UnitType::Bunker.has_role(UnitRole::GARRISON));
        assert!(UnitType::Overseer.has_role(UnitRole::DETECTOR));
    }

    #[test]
    fn test_army_allow_list_is_friendly_mobile_only() {
        for unit_type in [
            UnitType::Marine,
            UnitType::Medivac,
            UnitType::SiegeTank,
            UnitType::Raven,
        ] {
            assert!(unit_type.is_army_unit(), "{unit_type:?}");
        }
        for unit_type in [
            UnitType::Scv,
            UnitType::Bunker,
            UnitType::Zergling,
            UnitType::Stalker,
        ] {
            assert!(!unit_type.is_army_unit(), "{unit_type:?}");
        }
    }

    #[test]
    fn test_micro_roles() {
        assert_eq!(UnitType::Marine.micro_role(), MicroRole::RangedBio);
        assert_eq!(UnitType::Ghost.micro_role(), MicroRole::Sniper);
        assert_eq!(UnitType::Medivac.micro_role(), MicroRole::Healer);
        assert_eq!(UnitType::Raven.micro_role(), MicroRole::Detector);
        assert_eq!(UnitType::Bunker.micro_role(), MicroRole::Passive);
        assert!(MicroRole::Passive.index() < MicroRole::COUNT);
    }

    #[test]
    fn test_weapons_and_bonus() {
        let marine = UnitType::Marine.default_ground_weapon().unwrap();
        assert_eq!(marine.range, Fixed::from_num(5));
        assert!(UnitType::Marauder.default_air_weapon().is_none());
        assert_eq!(UnitType::Marauder.bonus_vs(), Some(UnitRole::ARMORED));
        assert_eq!(UnitType::Medivac.cargo_capacity(), 8);
        assert_eq!(UnitType::Marauder.cargo_size(), 2);
    }
}
