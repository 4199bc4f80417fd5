#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile versus enemy overlap detection.
//!
//! Every projectile remembers which enemies it is currently overlapping. A
//! pair only counts as a hit on the first frame of an overlap; once the two
//! circles separate the enemy is released so a later approach hits again.
//! The world applies pierce and damage when it executes the emitted
//! `ResolveContact` commands, skipping pairs whose projectile or enemy was
//! removed earlier in the same pass.

use castle_defence_core::{geometry, Command, EnemyView, ProjectileView};

/// Pure system that compares projectile and enemy circles once per frame.
#[derive(Debug, Default)]
pub struct Collision;

impl Collision {
    /// Creates a new collision system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits contact commands for every projectile and enemy pair.
    ///
    /// Projectiles are visited in id order, enemies in id order within each
    /// projectile, which fixes the order in which pierce is consumed.
    pub fn handle(
        &mut self,
        projectiles: &ProjectileView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        for projectile in projectiles.iter() {
            for enemy in enemies.iter() {
                let overlapping = geometry::circles_overlap(
                    projectile.position,
                    projectile.radius,
                    enemy.position,
                    enemy.radius,
                );
                let in_contact = projectile.contacts.contains(&enemy.id);

                if overlapping && !in_contact {
                    out.push(Command::ResolveContact {
                        projectile: projectile.id,
                        enemy: enemy.id,
                    });
                } else if !overlapping && in_contact {
                    out.push(Command::ReleaseContact {
                        projectile: projectile.id,
                        enemy: enemy.id,
                    });
                }
            }
        }
    }
}
