//! Authored wave scripts of the campaign.

use std::time::Duration;

use castle_defence_core::EnemyKind::{self, Antumbra, Crawler, Flare, Locus, Mono, Poly};

use crate::{SpawnCommand, WaveScript};

/// Builds a script from `(kind, delay in milliseconds, repetitions)` runs.
fn script(runs: &[(EnemyKind, u64, usize)]) -> WaveScript {
    runs.iter()
        .flat_map(|&(kind, delay_ms, count)| {
            std::iter::repeat(SpawnCommand::new(kind, Duration::from_millis(delay_ms))).take(count)
        })
        .collect()
}

/// The twenty scripted waves; every tenth closes with a boss.
pub(crate) fn waves() -> Vec<WaveScript> {
    vec![
        script(&[(Flare, 1000, 10)]),
        script(&[(Flare, 800, 5), (Mono, 500, 5)]),
        script(&[(Flare, 400, 1), (Mono, 400, 1)]).repeat(5),
        script(&[(Flare, 300, 8), (Locus, 300, 1), (Flare, 300, 8)]),
        script(&[(Mono, 150, 20)]),
        script(&[
            (Locus, 200, 1),
            (Poly, 2000, 1),
            (Locus, 200, 1),
            (Poly, 200, 1),
            (Poly, 2000, 1),
            (Locus, 200, 1),
            (Poly, 200, 1),
            (Locus, 200, 1),
            (Poly, 200, 1),
        ]),
        script(&[(Crawler, 800, 1), (Mono, 400, 1)]).repeat(6),
        script(&[(Locus, 200, 1), (Poly, 100, 1)]).repeat(10),
        script(&[(Mono, 100, 20), (Crawler, 200, 10)]),
        script(&[
            (Flare, 500, 4),
            (Flare, 5000, 1),
            (Antumbra, 100, 1),
            (Mono, 1000, 4),
            (Mono, 5000, 1),
            (Locus, 200, 1),
            (Poly, 100, 1),
            (Mono, 1000, 4),
        ]),
        script(&[(Flare, 150, 1), (Mono, 150, 1)]).repeat(15),
        tank_check(),
        script(&[(Mono, 80, 50)]),
        invisibility_check(),
        script(&[
            (Locus, 200, 1),
            (Poly, 100, 1),
            (Mono, 100, 2),
            (Crawler, 500, 1),
            (Mono, 100, 2),
            (Locus, 200, 1),
            (Poly, 100, 1),
            (Crawler, 500, 1),
            (Mono, 100, 4),
        ])
        .repeat(4),
        escorted_tank_check(),
        script(&[(Mono, 50, 200)]),
        script(&[(Crawler, 200, 5), (Poly, 100, 1)]).repeat(3),
        script(&[
            (Locus, 200, 1),
            (Poly, 100, 1),
            (Mono, 50, 3),
            (Crawler, 300, 1),
        ])
        .repeat(8),
        triple_boss(),
    ]
}

fn tank_check() -> WaveScript {
    (0..=50)
        .map(|index| {
            let kind = if index % 2 == 0 { Locus } else { Poly };
            SpawnCommand::new(kind, Duration::from_millis(100))
        })
        .collect()
}

fn escorted_tank_check() -> WaveScript {
    let mut wave = Vec::new();
    for index in 0..100 {
        let kind = if index % 2 == 0 { Locus } else { Poly };
        wave.push(SpawnCommand::new(kind, Duration::from_millis(100)));
        if index % 5 == 0 {
            wave.push(SpawnCommand::new(Mono, Duration::from_millis(50)));
        }
    }
    wave
}

fn invisibility_check() -> WaveScript {
    let pack = script(&[(Crawler, 400, 4), (Crawler, 3000, 1)]);
    let mut wave = script(&[(Locus, 3000, 1)]);
    for _ in 0..3 {
        wave.extend_from_slice(&pack);
    }
    wave.extend(script(&[(Locus, 200, 1), (Poly, 3000, 1), (Crawler, 400, 5)]));
    wave.extend_from_slice(&pack);
    wave.extend(script(&[(Crawler, 400, 4), (Crawler, 100, 1)]));
    wave
}

fn triple_boss() -> WaveScript {
    let escort = script(&[
        (Locus, 200, 1),
        (Poly, 100, 1),
        (Locus, 200, 1),
        (Poly, 100, 1),
        (Locus, 200, 1),
        (Poly, 5000, 1),
    ])
    .repeat(3);

    let mut wave = script(&[(Antumbra, 200, 1), (Poly, 100, 4)]);
    wave.extend_from_slice(&escort);
    wave.extend(script(&[(Antumbra, 100, 1)]));
    wave.extend_from_slice(&escort);
    wave.extend(script(&[(Antumbra, 100, 1)]));
    wave
}
