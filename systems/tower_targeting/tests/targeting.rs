use castle_defence_core::{
    Command, EnemyId, EnemyKind, Event, TileCoord, TurretId, TurretKind, TurretTarget,
};
use castle_defence_system_tower_targeting::TowerTargeting;
use castle_defence_world::{self as world, query, World};

fn spawn(world: &mut World, kind: EnemyKind) -> EnemyId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnEnemy {
            kind,
            health_multiplier: 1.0,
        },
        &mut events,
    );
    world::apply(world, Command::EndFrame, &mut events);
    events
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .expect("enemy spawned")
}

fn place(world: &mut World, tile: TileCoord) -> TurretId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::PlaceTurret {
            kind: TurretKind::Duo,
            tile,
        },
        &mut events,
    );
    query::turret_at(world, tile).expect("turret placed")
}

fn targets(world: &World) -> Vec<TurretTarget> {
    let mut targeting = TowerTargeting::new();
    let mut out = Vec::new();
    targeting.handle(
        &query::turret_view(world),
        &query::enemy_view(world),
        query::tuning(world),
        &mut out,
    );
    out
}

#[test]
fn duo_ignores_enemies_at_or_beyond_its_range() {
    let mut world = World::new();
    // The entry tile is (1, 0); turret ranges are three tiles.
    let near = place(&mut world, TileCoord::new(3, 0));
    let _edge = place(&mut world, TileCoord::new(4, 0));
    let _far = place(&mut world, TileCoord::new(5, 0));
    let enemy = spawn(&mut world, EnemyKind::Flare);

    let out = targets(&world);

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].turret, near);
    assert_eq!(out[0].enemy, enemy);
    assert_eq!(out[0].distance_sq, 80.0 * 80.0);
}

#[test]
fn equidistant_enemies_go_to_the_lower_id() {
    let mut world = World::new();
    let turret = place(&mut world, TileCoord::new(2, 0));
    let first = spawn(&mut world, EnemyKind::Flare);
    let second = spawn(&mut world, EnemyKind::Mono);
    assert!(first < second);

    let out = targets(&world);

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].turret, turret);
    assert_eq!(out[0].enemy, first);
}

#[test]
fn hidden_crawlers_are_not_targeted() {
    let mut world = World::new();
    let _ = place(&mut world, TileCoord::new(2, 0));
    let crawler = spawn(&mut world, EnemyKind::Crawler);
    assert!(
        !query::enemy_view(&world)
            .get(crawler)
            .expect("crawler on the field")
            .visible
    );

    assert!(targets(&world).is_empty());
}
