use std::time::Duration;

use castle_defence_core::{Command, Damage, EnemyKind, Event, WeaponKind};
use castle_defence_system_movement::Movement;
use castle_defence_world::{self as world, query, World};

fn frame(world: &mut World, movement: &mut Movement) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );

    let enemies = query::enemy_view(world);
    let mut commands = Vec::new();
    movement.handle(
        &events,
        &enemies,
        query::steering_targets(world),
        query::tuning(world),
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, &mut events);
    }
    world::apply(world, Command::EndFrame, &mut events);
    events
}

#[test]
fn enemies_walk_the_whole_path_and_leak() {
    let mut world = World::new();
    let mut movement = Movement::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Mono,
            health_multiplier: 1.0,
        },
        &mut events,
    );
    world::apply(&mut world, Command::EndFrame, &mut events);

    let targets = query::steering_targets(&world).len();
    let mut highest_waypoint = 0;
    let mut leaked_on = None;
    for frame_index in 0..5_000 {
        if let Some(enemy) = query::enemy_view(&world).iter().next() {
            assert!(enemy.waypoint >= highest_waypoint, "waypoint index regressed");
            highest_waypoint = enemy.waypoint;
        }

        let events = frame(&mut world, &mut movement);
        if events
            .iter()
            .any(|event| matches!(event, Event::EnemyLeaked { .. }))
        {
            leaked_on = Some(frame_index);
            break;
        }
        assert!(
            !events
                .iter()
                .any(|event| matches!(event, Event::EnemyDespawned { .. })),
            "enemy strayed off the grid"
        );
    }

    assert!(leaked_on.is_some(), "enemy never reached the exit");
    assert_eq!(highest_waypoint, targets - 1, "the final target lies below the grid");
    assert_eq!(query::lives(&world), query::tuning(&world).player.lives - 1);
}

#[test]
fn healers_mend_wounded_neighbours() {
    let mut world = World::new();
    let mut movement = Movement::new();
    let mut events = Vec::new();
    for kind in [EnemyKind::Locus, EnemyKind::Poly] {
        world::apply(
            &mut world,
            Command::SpawnEnemy {
                kind,
                health_multiplier: 1.0,
            },
            &mut events,
        );
    }
    world::apply(&mut world, Command::EndFrame, &mut events);

    let locus = query::enemy_view(&world)
        .iter()
        .find(|enemy| enemy.kind == EnemyKind::Locus)
        .map(|enemy| enemy.id)
        .expect("locus spawned");
    world::apply(
        &mut world,
        Command::DamageEnemy {
            enemy: locus,
            damage: Damage::Direct {
                weapon: WeaponKind::MeltdownBeam,
                amount: 5.0,
            },
        },
        &mut events,
    );

    let events = frame(&mut world, &mut movement);
    assert!(events.contains(&Event::EnemyHealed {
        enemy: locus,
        amount: 2.0
    }));

    let events = frame(&mut world, &mut movement);
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, Event::EnemyHealed { .. })),
        "heal must wait for the cooldown"
    );
}

#[test]
fn ready_healers_stack_on_the_same_target() {
    let mut world = World::new();
    let mut movement = Movement::new();
    let mut events = Vec::new();
    for kind in [EnemyKind::Locus, EnemyKind::Poly, EnemyKind::Poly] {
        world::apply(
            &mut world,
            Command::SpawnEnemy {
                kind,
                health_multiplier: 1.0,
            },
            &mut events,
        );
    }
    world::apply(&mut world, Command::EndFrame, &mut events);

    let locus = query::enemy_view(&world)
        .iter()
        .find(|enemy| enemy.kind == EnemyKind::Locus)
        .map(|enemy| enemy.id)
        .expect("locus spawned");
    world::apply(
        &mut world,
        Command::DamageEnemy {
            enemy: locus,
            damage: Damage::Direct {
                weapon: WeaponKind::MeltdownBeam,
                amount: 10.0,
            },
        },
        &mut events,
    );
    let wounded = query::enemy_view(&world)
        .get(locus)
        .expect("locus survives")
        .health;

    let events = frame(&mut world, &mut movement);
    let heals = events
        .iter()
        .filter(|event| {
            **event
                == Event::EnemyHealed {
                    enemy: locus,
                    amount: 2.0,
                }
        })
        .count();
    assert_eq!(heals, 2);
    assert_eq!(
        query::enemy_view(&world).get(locus).expect("locus alive").health,
        wounded + 4.0
    );
}
