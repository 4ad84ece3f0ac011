//! Minimal kinematic world the headless runner plays against.
//!
//! Owns the ground truth (every unit on both sides), hands the commander a
//! snapshot with only the enemies own units can see, and resolves commands:
//! movement at unit speed, continuous dps damage in weapon range, cargo
//! loading and unloading, and the handful of abilities the core uses.
//! Enemies are driven by a simple rule: fire on the nearest own unit in
//! range, else close on one within aggro range.

use std::collections::BTreeMap;

use tracing::trace;

use tactics_core::command::{Ability, Action, Target, UnitCommand};
use tactics_core::math::{Fixed, Vec2Fixed};
use tactics_core::unit::{Alliance, Passenger, Unit, UnitTag};
use tactics_core::unit_type::{UnitRole, Upgrade};
use tactics_core::world::{SnapshotWorld, WorldView};

/// Game frames per second of game time.
pub const FRAMES_PER_SECOND: i32 = 22;

/// Enemies close on own units within this distance.
const AGGRO_RANGE: i32 = 12;

/// Edge-to-edge distance at which a unit can board a carrier.
const BOARD_REACH: i32 = 1;

/// Health spent by one stim.
const STIM_COST: u32 = 10;

/// Health restored per heal command.
const HEAL_AMOUNT: u32 = 10;

/// Energy spent per heal command.
const HEAL_ENERGY: u32 = 3;

/// Energy and damage of a snipe.
const SNIPE_ENERGY: u32 = 50;
const SNIPE_DAMAGE: u32 = 170;

/// Range of occupants firing from a garrison before research.
const GARRISON_RANGE: i32 = 6;

/// Damage multiplier against a shooter's bonus attribute.
const BONUS_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Move(Vec2Fixed),
    AttackMove(Vec2Fixed),
    Attack(UnitTag),
    UnloadAt(Vec2Fixed),
    Board(UnitTag),
}

/// Ground truth for one headless skirmish.
#[derive(Debug, Clone)]
pub struct Battlefield {
    world: SnapshotWorld,
    intents: BTreeMap<UnitTag, Intent>,
    destroyed: Vec<UnitTag>,
    own_lost: u32,
    enemy_lost: u32,
}

impl Battlefield {
    /// Take ownership of the opening world. Every enemy in it exists, seen
    /// or not.
    #[must_use]
    pub fn new(world: SnapshotWorld) -> Self {
        Self {
            world,
            intents: BTreeMap::new(),
            destroyed: Vec::new(),
            own_lost: 0,
            enemy_lost: 0,
        }
    }

    /// Current game frame.
    #[must_use]
    pub fn frame(&self) -> u32 {
        self.world.frame
    }

    /// Full world including unseen enemies.
    #[must_use]
    pub fn ground_truth(&self) -> &SnapshotWorld {
        &self.world
    }

    /// Own units lost so far, passengers included.
    #[must_use]
    pub fn own_lost(&self) -> u32 {
        self.own_lost
    }

    /// Enemy units killed so far.
    #[must_use]
    pub fn enemy_lost(&self) -> u32 {
        self.enemy_lost
    }

    /// Own mobile units still alive, carried ones included.
    #[must_use]
    pub fn own_army_alive(&self) -> usize {
        self.world
            .own
            .iter()
            .map(|u| usize::from(!u.is_structure()) + u.passengers.len())
            .sum()
    }

    /// Enemy units still alive.
    #[must_use]
    pub fn enemies_alive(&self) -> usize {
        self.world.enemies.len()
    }

    /// What the commander sees: enemies inside own vision, plus the units
    /// destroyed during the last advance.
    #[must_use]
    pub fn snapshot(&self) -> SnapshotWorld {
        let mut snapshot = self.world.clone();
        snapshot
            .enemies
            .retain(|e| self.world.is_visible(e.position));
        snapshot.destroyed.clone_from(&self.destroyed);
        snapshot
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Apply one tick's commands in issue order.
    pub fn apply(&mut self, commands: &[UnitCommand]) {
        for command in commands {
            let unit = command.unit;
            match command.action {
                Action::Move(point) => self.set_intent(unit, Intent::Move(point)),
                Action::AttackMove(point) => self.set_intent(unit, Intent::AttackMove(point)),
                Action::Attack(target) => self.set_intent(unit, Intent::Attack(target)),
                Action::UnloadAt(point) => self.set_intent(unit, Intent::UnloadAt(point)),
                Action::EnterGarrison(garrison) => self.set_intent(unit, Intent::Board(garrison)),
                Action::Load(passenger) => {
                    if !self.board(unit, passenger) {
                        self.set_intent(passenger, Intent::Board(unit));
                    }
                }
                Action::UnloadAll => self.unload(unit),
                Action::Rally(point) => {
                    if let Some(u) = self.own_mut(unit) {
                        u.rally_point = Some(point);
                    }
                }
                Action::Hold => {
                    self.intents.remove(&unit);
                }
                Action::UseAbility { ability, target } => self.use_ability(unit, ability, target),
            }
        }
    }

    fn set_intent(&mut self, unit: UnitTag, intent: Intent) {
        if self.own(unit).is_some() {
            self.intents.insert(unit, intent);
        }
    }

    fn own(&self, tag: UnitTag) -> Option<&Unit> {
        self.world.own.iter().find(|u| u.tag == tag)
    }

    fn own_mut(&mut self, tag: UnitTag) -> Option<&mut Unit> {
        self.world.own.iter_mut().find(|u| u.tag == tag)
    }

    fn enemy(&self, tag: UnitTag) -> Option<&Unit> {
        self.world.enemies.iter().find(|u| u.tag == tag)
    }

    fn capacity(&self, carrier: &Unit) -> u8 {
        if carrier.has_role(UnitRole::GARRISON) && self.world.has_upgrade(Upgrade::NeosteelArmor) {
            carrier.cargo_free().saturating_add(2)
        } else {
            carrier.cargo_free()
        }
    }

    /// Move `passenger` into `carrier` if it is close enough and fits.
    fn board(&mut self, carrier: UnitTag, passenger: UnitTag) -> bool {
        let (Some(c), Some(p)) = (self.own(carrier), self.own(passenger)) else {
            return false;
        };
        let size = p.unit_type.cargo_size();
        let reach = c.radius + p.radius + Fixed::from_num(BOARD_REACH);
        if size == 0 || self.capacity(c) < size || !c.position.is_within(p.position, reach) {
            return false;
        }
        let Some(index) = self.world.own.iter().position(|u| u.tag == passenger) else {
            return false;
        };
        let unit = self.world.own.remove(index);
        self.intents.remove(&passenger);
        if let Some(c) = self.own_mut(carrier) {
            c.passengers.push(Passenger {
                tag: unit.tag,
                unit_type: unit.unit_type,
                health: unit.health,
                health_max: unit.health_max,
            });
        }
        trace!(carrier, passenger, "boarded");
        true
    }

    fn unload(&mut self, carrier: UnitTag) {
        let Some(c) = self.own_mut(carrier) else {
            return;
        };
        let position = c.position;
        let passengers = std::mem::take(&mut c.passengers);
        for (i, p) in passengers.into_iter().enumerate() {
            let offset = Vec2Fixed::new(Fixed::from_num(i) / 2, Fixed::ONE);
            let unit = Unit::new(p.tag, p.unit_type, Alliance::Own, position + offset)
                .with_health(p.health);
            self.world.own.push(unit);
        }
    }

    fn use_ability(&mut self, caster: UnitTag, ability: Ability, target: Target) {
        match (ability, target) {
            (Ability::Stim, _) => {
                if let Some(u) = self.own_mut(caster) {
                    if !u.is_stimmed && !u.is_structure() {
                        u.is_stimmed = true;
                        u.health = u.health.saturating_sub(STIM_COST).max(1);
                    }
                }
            }
            (Ability::Heal, Target::Unit(tag)) => {
                let paid = self.own_mut(caster).is_some_and(|u| {
                    let ok = u.energy >= HEAL_ENERGY;
                    if ok {
                        u.energy -= HEAL_ENERGY;
                    }
                    ok
                });
                if let Some(t) = self.own_mut(tag).filter(|_| paid) {
                    t.health = (t.health + HEAL_AMOUNT).min(t.health_max);
                }
            }
            (Ability::Snipe, Target::Unit(tag)) => {
                let paid = self.own_mut(caster).is_some_and(|u| {
                    let ok = u.energy >= SNIPE_ENERGY;
                    if ok {
                        u.energy -= SNIPE_ENERGY;
                    }
                    ok
                });
                if paid {
                    self.damage(tag, SNIPE_DAMAGE);
                }
            }
            (Ability::Cloak, _) => {
                if let Some(u) = self.own_mut(caster) {
                    u.is_cloaked = true;
                }
            }
            (Ability::Decloak, _) => {
                if let Some(u) = self.own_mut(caster) {
                    u.is_cloaked = false;
                }
            }
            _ => {}
        }
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Advance game time by `frames`.
    pub fn advance(&mut self, frames: u32) {
        let seconds = Fixed::from_num(frames) / Fixed::from_num(FRAMES_PER_SECOND);
        self.destroyed.clear();

        let mut hits: BTreeMap<UnitTag, Fixed> = BTreeMap::new();
        let mut fired: Vec<UnitTag> = Vec::new();
        let mut moves: Vec<(UnitTag, Vec2Fixed)> = Vec::new();
        let mut arrived: Vec<(UnitTag, Intent)> = Vec::new();

        for unit in &self.world.own {
            if unit.is_structure() {
                if let Some((target, dps)) = self.garrison_shot(unit) {
                    *hits.entry(target).or_default() += dps * seconds;
                }
                continue;
            }
            let intent = self.intents.get(&unit.tag).copied();
            match intent {
                Some(Intent::Attack(tag)) => match self.enemy(tag) {
                    Some(target) if unit.in_range_of(target, Fixed::ZERO) => {
                        shoot(unit, target, seconds, &mut hits, &mut fired);
                    }
                    Some(target) => moves.push((unit.tag, target.position)),
                    None => {
                        arrived.push((unit.tag, Intent::Attack(tag)));
                    }
                },
                Some(Intent::AttackMove(point)) => match nearest_in_range(unit, &self.world.enemies) {
                    Some(target) => shoot(unit, target, seconds, &mut hits, &mut fired),
                    None => moves.push((unit.tag, point)),
                },
                Some(Intent::Move(point)) => {
                    if unit.position == point {
                        arrived.push((unit.tag, Intent::Move(point)));
                    } else {
                        moves.push((unit.tag, point));
                    }
                }
                Some(Intent::UnloadAt(point)) => {
                    if unit.position.is_within(point, Fixed::ONE) {
                        arrived.push((unit.tag, Intent::UnloadAt(point)));
                    } else {
                        moves.push((unit.tag, point));
                    }
                }
                Some(Intent::Board(carrier)) => match self.own(carrier) {
                    Some(c) => {
                        arrived.push((unit.tag, Intent::Board(carrier)));
                        moves.push((unit.tag, c.position));
                    }
                    None => arrived.push((unit.tag, Intent::Board(carrier))),
                },
                None => {
                    if let Some(target) = nearest_in_range(unit, &self.world.enemies) {
                        shoot(unit, target, seconds, &mut hits, &mut fired);
                    }
                }
            }
        }

        for enemy in &self.world.enemies {
            let nearest = self
                .world
                .own
                .iter()
                .filter(|u| !u.is_cloaked)
                .min_by_key(|u| (u.position.distance_squared(enemy.position), u.tag));
            match nearest {
                Some(target) if enemy.in_range_of(target, Fixed::ZERO) => {
                    shoot(enemy, target, seconds, &mut hits, &mut fired);
                }
                Some(target) if target.position.is_within(enemy.position, Fixed::from_num(AGGRO_RANGE)) => {
                    moves.push((enemy.tag, target.position));
                }
                _ => {}
            }
        }

        self.step_positions(&moves, seconds);
        self.cool_down(&fired, frames);
        for (tag, intent) in arrived {
            self.resolve_arrival(tag, intent);
        }
        for (tag, damage) in hits {
            self.damage(tag, damage.round().to_num::<u32>());
        }
        self.world.frame = self.world.frame.saturating_add(frames);
    }

    /// Occupants fire from inside a garrison at the nearest enemy in range.
    fn garrison_shot(&self, garrison: &Unit) -> Option<(UnitTag, Fixed)> {
        if !garrison.has_role(UnitRole::GARRISON) || garrison.passengers.is_empty() {
            return None;
        }
        let bonus = i32::from(self.world.has_upgrade(Upgrade::HiSecAutoTracking));
        let range = Fixed::from_num(GARRISON_RANGE + bonus) + garrison.radius;
        let dps: Fixed = garrison
            .passengers
            .iter()
            .filter_map(|p| p.unit_type.default_ground_weapon())
            .map(|w| w.dps)
            .sum();
        self.world
            .enemies
            .iter()
            .filter(|e| e.position.is_within(garrison.position, range + e.radius))
            .min_by_key(|e| (e.position.distance_squared(garrison.position), e.tag))
            .map(|e| (e.tag, dps))
    }

    fn step_positions(&mut self, moves: &[(UnitTag, Vec2Fixed)], seconds: Fixed) {
        let stim = Fixed::from_num(1.5);
        for (tag, destination) in moves {
            let Some(unit) = self
                .world
                .own
                .iter_mut()
                .chain(self.world.enemies.iter_mut())
                .find(|u| u.tag == *tag)
            else {
                continue;
            };
            let speed = if unit.is_stimmed { unit.speed * stim } else { unit.speed };
            let remaining = unit.position.distance(*destination);
            unit.position = unit
                .position
                .towards(*destination, (speed * seconds).min(remaining));
        }
    }

    fn cool_down(&mut self, fired: &[UnitTag], frames: u32) {
        let elapsed = Fixed::from_num(frames);
        for unit in self.world.own.iter_mut().chain(self.world.enemies.iter_mut()) {
            if fired.contains(&unit.tag) {
                let cooldown = unit.ground_weapon.or(unit.air_weapon).map_or(Fixed::ZERO, |w| w.cooldown);
                unit.weapon_cooldown = cooldown;
            } else {
                unit.weapon_cooldown = (unit.weapon_cooldown - elapsed).max(Fixed::ZERO);
            }
        }
    }

    fn resolve_arrival(&mut self, tag: UnitTag, intent: Intent) {
        match intent {
            Intent::Board(carrier) => {
                if self.own(carrier).is_none() || self.board(carrier, tag) {
                    self.intents.remove(&tag);
                }
            }
            Intent::UnloadAt(_) => {
                self.unload(tag);
                self.intents.remove(&tag);
            }
            Intent::Move(_) | Intent::Attack(_) | Intent::AttackMove(_) => {
                self.intents.remove(&tag);
            }
        }
    }

    /// Shield first, then health. Units at zero health are removed.
    fn damage(&mut self, tag: UnitTag, amount: u32) {
        let Some(unit) = self
            .world
            .own
            .iter_mut()
            .chain(self.world.enemies.iter_mut())
            .find(|u| u.tag == tag)
        else {
            return;
        };
        let absorbed = amount.min(unit.shield);
        unit.shield -= absorbed;
        unit.health = unit.health.saturating_sub(amount - absorbed);
        if unit.health > 0 {
            return;
        }
        let alliance = unit.alliance;
        let carried = unit.passengers.len() as u32;
        match alliance {
            Alliance::Enemy => {
                self.world.enemies.retain(|u| u.tag != tag);
                self.enemy_lost += 1;
            }
            Alliance::Own | Alliance::Neutral => {
                self.world.own.retain(|u| u.tag != tag);
                self.own_lost += 1 + carried;
            }
        }
        self.intents.remove(&tag);
        self.destroyed.push(tag);
        trace!(tag, ?alliance, "destroyed");
    }
}

fn nearest_in_range<'a>(unit: &Unit, enemies: &'a [Unit]) -> Option<&'a Unit> {
    enemies
        .iter()
        .filter(|e| unit.in_range_of(e, Fixed::ZERO))
        .min_by_key(|e| (e.position.distance_squared(unit.position), e.tag))
}

fn shoot(
    shooter: &Unit,
    target: &Unit,
    seconds: Fixed,
    hits: &mut BTreeMap<UnitTag, Fixed>,
    fired: &mut Vec<UnitTag>,
) {
    let Some(weapon) = shooter.weapon_against(target) else {
        return;
    };
    let bonus = match shooter.unit_type.bonus_vs() {
        Some(role) if target.has_role(role) => Fixed::from_num(BONUS_FACTOR),
        _ => Fixed::ONE,
    };
    *hits.entry(target.tag).or_default() += weapon.dps * bonus * seconds;
    fired.push(shooter.tag);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::unit_type::UnitType;

    fn unit(tag: UnitTag, unit_type: UnitType, alliance: Alliance, x: i32, y: i32) -> Unit {
        Unit::new(tag, unit_type, alliance, Vec2Fixed::from_ints(x, y))
    }

    fn command(unit: UnitTag, action: Action) -> UnitCommand {
        UnitCommand { unit, action }
    }

    #[test]
    fn test_snapshot_hides_unseen_enemies() {
        let mut world = SnapshotWorld::new();
        world.own.push(unit(1, UnitType::Marine, Alliance::Own, 0, 0));
        world.enemies.push(unit(2, UnitType::Roach, Alliance::Enemy, 5, 0));
        world.enemies.push(unit(3, UnitType::Roach, Alliance::Enemy, 50, 0));
        let field = Battlefield::new(world);
        let seen: Vec<_> = field.snapshot().enemies.iter().map(|u| u.tag).collect();
        assert_eq!(seen, vec![2]);
        assert_eq!(field.enemies_alive(), 2);
    }

    #[test]
    fn test_move_at_unit_speed() {
        let mut world = SnapshotWorld::new();
        world.own.push(unit(1, UnitType::Marine, Alliance::Own, 0, 0));
        let mut field = Battlefield::new(world);
        field.apply(&[command(1, Action::Move(Vec2Fixed::from_ints(100, 0)))]);
        field.advance(22);
        let marine = &field.ground_truth().own[0];
        assert_eq!(marine.position.x, marine.speed);
        assert_eq!(field.frame(), 22);
    }

    #[test]
    fn test_attack_kills_and_reports_destroyed() {
        let mut world = SnapshotWorld::new();
        world.own.push(unit(1, UnitType::Marine, Alliance::Own, 0, 0));
        world
            .enemies
            .push(unit(2, UnitType::Zergling, Alliance::Enemy, 40, 0).with_health(1));
        world.own.push(unit(3, UnitType::Marine, Alliance::Own, 38, 0));
        let mut field = Battlefield::new(world);
        field.apply(&[command(3, Action::Attack(2))]);
        field.advance(8);
        assert_eq!(field.enemies_alive(), 0);
        assert_eq!(field.enemy_lost(), 1);
        assert_eq!(field.snapshot().destroyed, vec![2]);
    }

    #[test]
    fn test_load_and_unload() {
        let mut world = SnapshotWorld::new();
        world.own.push(unit(1, UnitType::Medivac, Alliance::Own, 0, 0));
        world.own.push(unit(2, UnitType::Marine, Alliance::Own, 1, 0));
        world.own.push(unit(3, UnitType::Marine, Alliance::Own, 10, 0));
        let mut field = Battlefield::new(world);
        field.apply(&[command(1, Action::Load(2)), command(1, Action::Load(3))]);
        assert_eq!(field.ground_truth().own.len(), 2);
        assert_eq!(field.ground_truth().own[0].passengers.len(), 1);

        // the far marine walks over and boards
        for _ in 0..10 {
            field.advance(8);
        }
        assert_eq!(field.ground_truth().own.len(), 1);
        assert_eq!(field.own_army_alive(), 3);

        field.apply(&[command(1, Action::UnloadAll)]);
        assert_eq!(field.ground_truth().own.len(), 3);
        assert!(field.ground_truth().own[0].passengers.is_empty());
    }

    #[test]
    fn test_stim_costs_health_once() {
        let mut world = SnapshotWorld::new();
        world.own.push(unit(1, UnitType::Marine, Alliance::Own, 0, 0));
        let mut field = Battlefield::new(world);
        let stim = Action::UseAbility {
            ability: Ability::Stim,
            target: Target::None,
        };
        field.apply(&[command(1, stim), command(1, stim)]);
        let marine = &field.ground_truth().own[0];
        assert!(marine.is_stimmed);
        assert_eq!(marine.health, marine.health_max - STIM_COST);
    }
}
