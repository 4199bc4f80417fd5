#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that steers enemies along the path.
//!
//! Enemies travel toward the steering target matching their waypoint index.
//! Once an enemy's centre lies within its own radius of that target, the index
//! advances and the velocity is re-aimed. Past the last target the enemy walks
//! straight down until the world reports it leaked. Healer enemies also pulse
//! their area heal from here whenever their ability is off cooldown.

use castle_defence_core::{geometry, Command, EnemySnapshot, EnemyView, Event, Tuning};
use glam::Vec2;

/// Pure system that reacts to world events and emits movement commands.
#[derive(Debug, Default)]
pub struct Movement {
    healers: Vec<EnemySnapshot>,
}

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and the enemy view to emit steering and heal commands.
    ///
    /// Nothing is emitted for frames in which simulated time did not advance.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        steering_targets: &[Vec2],
        tuning: &Tuning,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        self.emit_heals(enemies, tuning, out);

        for enemy in enemies.iter() {
            if let Some(command) = steer(enemy, steering_targets) {
                out.push(command);
            }
        }
    }

    fn emit_heals(&mut self, enemies: &EnemyView, tuning: &Tuning, out: &mut Vec<Command>) {
        self.healers.clear();
        self.healers.extend(
            enemies
                .iter()
                .filter(|enemy| enemy.kind.is_healer() && enemy.ability_ready),
        );

        let range_sq = tuning.healer.range * tuning.healer.range;
        for healer in &self.healers {
            for patient in enemies.iter() {
                if patient.id == healer.id || patient.kind.is_healer() {
                    continue;
                }
                if patient.health >= patient.max_health {
                    continue;
                }
                if patient.position.distance_squared(healer.position) <= range_sq {
                    out.push(Command::HealEnemy {
                        enemy: patient.id,
                        amount: tuning.healer.amount,
                    });
                }
            }
            out.push(Command::ResetAbility { enemy: healer.id });
        }
    }
}

fn steer(enemy: &EnemySnapshot, targets: &[Vec2]) -> Option<Command> {
    let mut waypoint = enemy.waypoint;
    if let Some(target) = targets.get(waypoint) {
        if enemy.position.distance_squared(*target) < enemy.radius * enemy.radius {
            waypoint += 1;
        }
    }

    let velocity = match targets.get(waypoint) {
        Some(target) => geometry::velocity_towards(enemy.position, *target, enemy.speed),
        None => Vec2::new(0.0, enemy.speed),
    };

    if waypoint == enemy.waypoint && velocity == enemy.velocity {
        return None;
    }

    Some(Command::SteerEnemy {
        enemy: enemy.id,
        waypoint,
        velocity,
    })
}
