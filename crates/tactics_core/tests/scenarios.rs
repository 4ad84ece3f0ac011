//! End-to-end scenarios through the tactical commander.
//!
//! Every test drives [`TacticalCommander::tick`] against a fake world, the
//! same way the game loop does.

use tactics_core::prelude::*;
use tactics_test_utils::danger::StubDanger;
use tactics_test_utils::fake_world::{hide_enemy, move_unit, FakeWorld};
use tactics_test_utils::fixtures::{fixed, own_unit, point};

fn tick(commander: &mut TacticalCommander, world: &SnapshotWorld) -> TickReport {
    commander.tick(
        world,
        &StubDanger::new(),
        Situation::Stable,
        &CompositionQuotas::new(),
    )
}

// =============================================================================
// Orders
// =============================================================================

mod orders {
    use super::*;

    /// Weighted supply 20 against a local enemy of 8 is a 2.5x edge.
    #[test]
    fn test_strong_army_goes_aggressive() {
        let world = FakeWorld::new()
            .squad(UnitType::Marine, 20, (0, 0))
            .enemy_squad(UnitType::Roach, 4, (12, 3))
            .researched(Upgrade::Stimpack)
            .enemy_start(150, 150)
            .build();
        let mut commander = TacticalCommander::default();
        let report = tick(&mut commander, &world);

        assert_eq!(report.armies.len(), 1);
        assert_eq!(report.armies[0].weighted_supply, fixed(20));
        assert_eq!(report.armies[0].order, Order::Chase);
        assert_eq!(report.armies[0].rule, "local_fight");
    }

    #[test]
    fn test_small_idle_army_retreats() {
        let world = FakeWorld::new()
            .squad(UnitType::Marine, 4, (0, 0))
            .base(100, (-30, 0), (-35, 0))
            .enemy_start(150, 150)
            .build();
        let mut commander = TacticalCommander::default();
        let report = tick(&mut commander, &world);

        assert_eq!(report.order_of(1), Some(Order::Retreat));
        assert_eq!(report.armies[0].rule, "default_retreat");
        assert!(report
            .commands
            .iter()
            .all(|c| c.action == Action::Move(point(-35, 0))));
    }

    #[test]
    fn test_weak_army_disengages() {
        let world = FakeWorld::new()
            .squad(UnitType::Marine, 4, (0, 0))
            .enemy_squad(UnitType::Roach, 4, (6, 0))
            .base(100, (-30, 0), (-35, 0))
            .enemy_start(150, 150)
            .build();
        let mut commander = TacticalCommander::default();
        let report = tick(&mut commander, &world);
        assert_eq!(report.order_of(1), Some(Order::Disengage));
        assert_eq!(report.armies[0].rule, "local_fight");
    }

    #[test]
    fn test_cheese_overrides_everything() {
        let world = FakeWorld::new()
            .squad(UnitType::Marine, 20, (0, 0))
            .enemy_squad(UnitType::Zergling, 2, (5, 0))
            .build();
        let mut commander = TacticalCommander::default();
        let report = commander.tick(
            &world,
            &StubDanger::new(),
            Situation::CannonRush,
            &CompositionQuotas::new(),
        );
        assert_eq!(report.order_of(1), Some(Order::DefendAgainstCheese));
    }

    #[test]
    fn test_orders_held_between_recomputes() {
        let mut world = FakeWorld::new()
            .squad(UnitType::Marine, 20, (0, 0))
            .enemy_squad(UnitType::Roach, 4, (12, 3))
            .researched(Upgrade::Stimpack)
            .build();
        let mut commander = TacticalCommander::default();
        let first = tick(&mut commander, &world);
        let decided = first.armies[0].order;

        // the enemy leaves; the order stays until the next recompute
        for tag in 21..=24 {
            hide_enemy(&mut world, tag);
        }
        world.frame = 1;
        let second = tick(&mut commander, &world);
        assert_eq!(second.pass, ClusterPass::Rehydrated);
        assert_eq!(second.armies[0].order, decided);
    }
}

// =============================================================================
// Drops
// =============================================================================

mod drops {
    use super::*;
    use tactics_test_utils::fixtures::enemy_unit;

    /// Tick frame by frame until the armies are recomputed.
    fn until_recompute(commander: &mut TacticalCommander, world: &mut SnapshotWorld) -> TickReport {
        for _ in 0..8 {
            world.frame += 1;
            let report = tick(commander, world);
            if report.pass == ClusterPass::Recomputed {
                return report;
            }
        }
        panic!("no recompute within eight frames");
    }

    fn actions_of(report: &TickReport, tag: UnitTag) -> Vec<Action> {
        report
            .commands
            .iter()
            .filter(|c| c.unit == tag)
            .map(|c| c.action)
            .collect()
    }

    /// Medivacs 1-2, marines 3-10, roaches 11-18 remembered in the fog.
    fn drop_world() -> SnapshotWorld {
        FakeWorld::new()
            .squad(UnitType::Medivac, 2, (0, 0))
            .squad(UnitType::Marine, 8, (0, 2))
            .enemy_squad(UnitType::Roach, 8, (40, 0))
            .base(100, (-30, 0), (-35, 0))
            .researched(Upgrade::Stimpack)
            .enemy_start(100, 0)
            .build()
    }

    #[test]
    fn test_drop_cycle_load_move_unload_fight() {
        let mut world = drop_world();
        let mut commander = TacticalCommander::default();
        tick(&mut commander, &world);
        for tag in 11..=18 {
            hide_enemy(&mut world, tag);
        }

        // too few to push into 16 remembered roach supply, enough to drop
        let loading = until_recompute(&mut commander, &mut world);
        assert_eq!(loading.order_of(3), Some(Order::DropLoad));
        assert_eq!(loading.armies[0].rule, "global_push");
        assert!(loading
            .commands
            .iter()
            .any(|c| matches!(c.action, Action::Load(_))));

        // everyone boards
        let marines: Vec<Unit> = world
            .own
            .iter()
            .filter(|u| u.unit_type == UnitType::Marine)
            .cloned()
            .collect();
        world.own.retain(|u| u.unit_type != UnitType::Marine);
        for (i, marine) in marines.iter().enumerate() {
            let transport = &mut world.own[i % 2];
            transport.passengers.push(Passenger::new(marine.tag, UnitType::Marine));
        }
        let flying = until_recompute(&mut commander, &mut world);
        assert_eq!(flying.order_of(1), Some(Order::DropMove));
        assert_eq!(flying.armies[0].rule, "drop");
        assert_eq!(actions_of(&flying, 1), vec![Action::Move(point(100, 0))]);

        // arrival over the enemy mineral line
        move_unit(&mut world, 1, point(96, 0));
        move_unit(&mut world, 2, point(97, 0));
        for i in 0..3 {
            world.enemies.push(enemy_unit(30 + i, UnitType::Drone, 100 + i as i32, 3));
        }
        let unloading = until_recompute(&mut commander, &mut world);
        assert_eq!(unloading.order_of(1), Some(Order::DropUnload));
        assert_eq!(actions_of(&unloading, 1), vec![Action::UnloadAll]);
        assert_eq!(actions_of(&unloading, 2), vec![Action::UnloadAll]);

        // the cargo is on the ground and goes for the drones
        for transport in world.own.iter_mut() {
            transport.passengers.clear();
        }
        for (i, marine) in marines.iter().enumerate() {
            world.own.push(own_unit(marine.tag, UnitType::Marine, 93 + i as i32, 1));
        }
        let fighting = until_recompute(&mut commander, &mut world);
        assert_eq!(fighting.armies.len(), 1);
        assert_eq!(fighting.order_of(3), Some(Order::Harass));
        assert_eq!(fighting.armies[0].rule, "harass_workers");
        assert!(fighting
            .commands
            .iter()
            .any(|c| matches!(c.action, Action::Attack(target) if (30..33).contains(&target))));
    }

    #[test]
    fn test_retreating_transport_unloads_at_home() {
        let carrier = own_unit(1, UnitType::Medivac, -34, 0)
            .with_passenger(Passenger::new(2, UnitType::Marine))
            .with_passenger(Passenger::new(3, UnitType::Marine));
        let mut world = FakeWorld::new()
            .unit(carrier)
            .base(100, (-30, 0), (-35, 0))
            .enemy_start(150, 0)
            .build();
        let mut commander = TacticalCommander::default();

        let first = tick(&mut commander, &world);
        assert_eq!(first.order_of(1), Some(Order::Retreat));
        assert_eq!(first.armies[0].rule, "drop");
        assert_eq!(actions_of(&first, 1), vec![Action::UnloadAll]);

        // held order keeps unloading on the cached passes too
        world.frame = 1;
        let cached = tick(&mut commander, &world);
        assert_eq!(cached.pass, ClusterPass::Rehydrated);
        assert_eq!(actions_of(&cached, 1), vec![Action::UnloadAll]);
    }
}

// =============================================================================
// Garrison
// =============================================================================

mod garrison {
    use super::*;

    fn bunker(health: u32) -> Unit {
        own_unit(50, UnitType::Bunker, 0, 0)
            .with_health(health)
            .with_passenger(Passenger::new(60, UnitType::Marine))
            .with_passenger(Passenger::new(61, UnitType::Marine))
    }

    #[test]
    fn test_critical_bunker_unloads_on_same_tick() {
        let mut world = FakeWorld::new()
            .unit(bunker(400))
            .enemy_squad(UnitType::Roach, 3, (6, 0))
            .build();
        let mut commander = TacticalCommander::default();

        let healthy = tick(&mut commander, &world);
        assert!(!healthy.garrisons[0].critical);
        assert!(healthy.garrisons[0].target.is_some());

        // 15% of 400
        world.own[0].health = 60;
        world.frame = 1;
        let critical = tick(&mut commander, &world);
        assert!(critical.garrisons[0].critical);
        let actions: Vec<_> = critical
            .commands
            .iter()
            .filter(|c| c.unit == 50)
            .map(|c| c.action)
            .collect();
        assert_eq!(actions, vec![Action::UnloadAll]);
    }

    #[test]
    fn test_critical_bunker_unloads_without_enemies() {
        let world = FakeWorld::new().unit(bunker(60)).build();
        let mut commander = TacticalCommander::default();
        let report = tick(&mut commander, &world);
        assert!(report.garrisons[0].critical);
        assert!(report
            .commands
            .contains(&UnitCommand {
                unit: 50,
                action: Action::UnloadAll,
            }));
    }

    #[test]
    fn test_quiet_bunker_releases_to_safe_point() {
        let world = FakeWorld::new()
            .unit(bunker(400))
            .base(100, (-10, 0), (-14, 0))
            .build();
        let mut commander = TacticalCommander::default();
        let report = tick(&mut commander, &world);
        assert!(report.garrisons[0].released);
        assert!(report
            .commands
            .contains(&UnitCommand {
                unit: 50,
                action: Action::Rally(point(-14, 0)),
            }));
    }
}

// =============================================================================
// Enemy memory
// =============================================================================

mod memory {
    use super::*;

    #[test]
    fn test_ghost_survives_in_fog() {
        let mut world = FakeWorld::new()
            .own(UnitType::Marine, (0, 0))
            .enemy(UnitType::Roach, (20, 0))
            .build();
        let mut commander = TacticalCommander::default();
        tick(&mut commander, &world);

        hide_enemy(&mut world, 2);
        world.frame = 10;
        tick(&mut commander, &world);
        let ghost = commander.memory().ghost(2).expect("ghost remembered");
        assert_eq!(ghost.last_seen_frame, 0);
        assert!(!commander.memory().is_live(2));
    }

    #[test]
    fn test_ghost_disproved_by_vision() {
        let mut world = FakeWorld::new()
            .own(UnitType::Marine, (0, 0))
            .enemy(UnitType::Roach, (20, 0))
            .build();
        let mut commander = TacticalCommander::default();
        tick(&mut commander, &world);

        hide_enemy(&mut world, 2);
        world.frame = 10;
        tick(&mut commander, &world);
        let expiry = commander.memory().ghost(2).map(|g| g.expiry_frame);
        assert!(expiry.is_some_and(|e| e > 11));

        // the marine walks up and sees an empty tile
        move_unit(&mut world, 1, point(15, 0));
        world.frame = 11;
        let report = tick(&mut commander, &world);
        assert!(commander.memory().ghost(2).is_none());
        assert_eq!(report.memory.disproved, 1);
    }

    #[test]
    fn test_destroyed_unit_forgotten() {
        let mut world = FakeWorld::new()
            .own(UnitType::Marine, (0, 0))
            .enemy(UnitType::Roach, (30, 0))
            .build();
        let mut commander = TacticalCommander::default();
        tick(&mut commander, &world);

        hide_enemy(&mut world, 2);
        world.destroyed.push(2);
        world.frame = 1;
        let report = tick(&mut commander, &world);
        assert!(commander.memory().is_empty());
        assert_eq!(report.memory.destroyed, 1);
    }
}
