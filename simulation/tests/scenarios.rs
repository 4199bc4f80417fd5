use std::time::Duration;

use castle_defence_core::{
    EnemyKind, Event, TileCoord, TurretKind, TurretPhase, Tuning, WavePhase,
};
use castle_defence_simulation::Simulation;
use castle_defence_system_spawning::{Config, SpawnCommand};

fn flares(count: usize) -> Vec<SpawnCommand> {
    vec![SpawnCommand::new(EnemyKind::Flare, Duration::ZERO); count]
}

#[test]
fn slow_aura_cycles_on_its_own() {
    let mut simulation = Simulation::new();
    let wave = simulation
        .place_turret(TurretKind::Wave, TileCoord::new(2, 5))
        .expect("tile is buildable");

    let mut runs: Vec<(bool, u32)> = Vec::new();
    for _ in 0..200 {
        let _ = simulation.advance_frame(Duration::from_millis(250));
        let active = match simulation.turrets().get(wave).map(|turret| turret.phase) {
            Some(TurretPhase::Aura { active, .. }) => active,
            other => panic!("unexpected phase: {other:?}"),
        };
        match runs.last_mut() {
            Some((state, length)) if *state == active => *length += 1,
            _ => runs.push((active, 1)),
        }
    }

    let tuning = Tuning::default();
    let on = (tuning.aura.active_duration / 0.25).round() as u32;
    let off = (tuning.aura.cooldown_duration / 0.25).round() as u32;
    assert_eq!(&runs[..5], &[(true, on), (false, off), (true, on), (false, off), (true, on)]);
}

#[test]
fn wave_waits_for_the_field_to_clear() {
    let mut simulation =
        Simulation::with_config(Tuning::default(), Config::new(vec![flares(2)], 10, 1.0))
            .expect("default tuning is valid");
    simulation
        .start_next_wave()
        .expect("director waits for the player");

    let mut finished_on = None;
    for frame in 0..10_000 {
        let _ = simulation.advance_frame(Duration::from_millis(16));
        let status = simulation.wave_status();
        if status.phase == WavePhase::WaveInProgress {
            assert!(
                !simulation.enemies().is_empty(),
                "a cleared field must complete the wave in the same frame"
            );
        }
        if simulation.is_finished() {
            finished_on = Some(frame);
            break;
        }
    }

    assert!(finished_on.is_some(), "the wave never completed");
    assert!(simulation.enemies().is_empty());
    assert_eq!(simulation.lives(), Tuning::default().player.lives - 2);
    assert_eq!(simulation.stats().leaks, 2);
}

#[test]
fn defeat_clears_the_field_and_blocks_spawns() {
    let mut simulation =
        Simulation::with_config(Tuning::default(), Config::new(vec![flares(8)], 10, 1.0))
            .expect("default tuning is valid");
    simulation
        .start_next_wave()
        .expect("director waits for the player");

    let mut defeats = 0;
    for _ in 0..10_000 {
        defeats += simulation
            .advance_frame(Duration::from_millis(16))
            .iter()
            .filter(|event| matches!(event, Event::PlayerDefeated))
            .count();
        if simulation.is_defeated() {
            break;
        }
    }
    for _ in 0..10 {
        defeats += simulation
            .advance_frame(Duration::from_millis(16))
            .iter()
            .filter(|event| matches!(event, Event::PlayerDefeated))
            .count();
    }

    assert_eq!(defeats, 1);
    assert_eq!(simulation.lives(), 0);
    assert!(simulation.enemies().is_empty());

    simulation.request_spawn(EnemyKind::Antumbra);
    let spawned = simulation
        .advance_frame(Duration::from_millis(16))
        .iter()
        .any(|event| matches!(event, Event::EnemySpawned { .. }));
    assert!(!spawned, "no enemy spawns after defeat");
}

#[test]
fn a_duo_beside_the_entry_damages_passing_enemies() {
    let mut simulation = Simulation::new();
    let _ = simulation
        .place_turret(TurretKind::Duo, TileCoord::new(2, 5))
        .expect("tile is buildable");
    simulation.request_spawn(EnemyKind::Locus);

    for _ in 0..600 {
        let _ = simulation.advance_frame(Duration::from_millis(16));
    }

    assert!(
        simulation.stats().damage_dealt > 0.0,
        "the duo never hit the locus"
    );
}
