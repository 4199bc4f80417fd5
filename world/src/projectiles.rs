//! Projectiles in flight and their contact bookkeeping.

use std::collections::BTreeSet;

use castle_defence_core::{
    geometry, tuning::WeaponTuning, EnemyId, ProjectileId, ProjectileMotion, ProjectileSnapshot,
    TurretId, WeaponKind,
};
use glam::Vec2;
use rand::Rng;

use crate::entity::Lifecycle;

/// Outcome of a fresh overlap between a projectile and an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Contact {
    /// Enemies hit by the projectile before this one.
    pub(crate) hits_before: u32,
    /// Whether the hit exhausted the projectile's pierce count.
    pub(crate) spent: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    id: ProjectileId,
    turret: TurretId,
    weapon: WeaponKind,
    origin: Vec2,
    position: Vec2,
    velocity: Vec2,
    radius: f32,
    pierce: u32,
    hits: u32,
    contacts: BTreeSet<EnemyId>,
    max_range: f32,
    life: f32,
    max_life: f32,
    spawn_timer: f32,
    spawn_delay: f32,
    active: bool,
}

impl Projectile {
    /// Launches a projectile from `origin` toward `aim`.
    ///
    /// Stream weapons draw their speed jitter and launch angle from `rng`.
    pub(crate) fn launch<R: Rng>(
        id: ProjectileId,
        turret: TurretId,
        weapon: WeaponKind,
        origin: Vec2,
        aim: Vec2,
        stats: &WeaponTuning,
        rng: &mut R,
    ) -> Self {
        let mut direction = (aim - origin).normalize_or_zero();
        let mut speed = stats.speed;
        let mut max_life = 0.0;

        if weapon.motion() == ProjectileMotion::DecayingStream {
            if stats.speed_jitter > 0.0 {
                speed *= 1.0 + rng.gen_range(-stats.speed_jitter..=stats.speed_jitter);
            }
            if stats.spread > 0.0 {
                let offset = rng.gen_range(-stats.spread..=stats.spread);
                direction = geometry::direction_from_degrees(offset).rotate(direction);
            }
            if speed > 0.0 {
                max_life = stats.max_range / speed * stats.life_factor;
            }
        }

        let spawn_delay = if weapon.motion() == ProjectileMotion::DelayedSpawn {
            stats.spawn_delay
        } else {
            0.0
        };

        Self {
            id,
            turret,
            weapon,
            origin,
            position: origin,
            velocity: direction * speed,
            radius: stats.radius,
            pierce: stats.pierce.max(1),
            hits: 0,
            contacts: BTreeSet::new(),
            max_range: stats.max_range,
            life: max_life,
            max_life,
            spawn_timer: spawn_delay,
            spawn_delay,
            active: true,
        }
    }

    pub(crate) const fn weapon(&self) -> WeaponKind {
        self.weapon
    }

    /// Moves the projectile, expiring it once it strays beyond its range.
    ///
    /// Returns `true` when the projectile expired during this tick.
    pub(crate) fn tick(&mut self, dt: f32) -> bool {
        if self.position.distance_squared(self.origin) > self.max_range * self.max_range
            || !self.position.is_finite()
        {
            self.active = false;
            return true;
        }

        if self.spawn_timer > 0.0 {
            self.spawn_timer -= dt;
            return false;
        }

        if self.max_life > 0.0 {
            self.life = (self.life - dt).max(0.0);
        }
        self.position += self.velocity * dt;
        false
    }

    /// Records a fresh overlap with `enemy`.
    ///
    /// Returns `None` while the enemy is still inside the overlap that was
    /// already counted.
    pub(crate) fn resolve_contact(&mut self, enemy: EnemyId) -> Option<Contact> {
        if !self.contacts.insert(enemy) {
            return None;
        }

        let hits_before = self.hits;
        self.hits += 1;
        self.pierce = self.pierce.saturating_sub(1);
        let spent = self.pierce == 0;
        if spent {
            self.active = false;
        }
        Some(Contact { hits_before, spent })
    }

    pub(crate) fn release_contact(&mut self, enemy: EnemyId) -> bool {
        self.contacts.remove(&enemy)
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        let life_fraction = if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let spawn_progress = if self.spawn_delay > 0.0 {
            ((self.spawn_delay - self.spawn_timer) / self.spawn_delay).clamp(0.0, 1.0)
        } else {
            1.0
        };

        ProjectileSnapshot {
            id: self.id,
            turret: self.turret,
            weapon: self.weapon,
            position: self.position,
            velocity: self.velocity,
            radius: self.radius,
            pierce: self.pierce,
            contacts: self.contacts.iter().copied().collect(),
            life_fraction,
            spawn_progress,
        }
    }
}

impl Lifecycle for Projectile {
    type Id = ProjectileId;

    fn id(&self) -> ProjectileId {
        self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use castle_defence_core::Tuning;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn launch(weapon: WeaponKind, aim: Vec2) -> Projectile {
        let tuning = Tuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        Projectile::launch(
            ProjectileId::new(0),
            TurretId::new(0),
            weapon,
            Vec2::ZERO,
            aim,
            tuning.weapon(weapon),
            &mut rng,
        )
    }

    #[test]
    fn bullets_fly_straight_at_nominal_speed() {
        let mut bullet = launch(WeaponKind::Bullet, Vec2::new(10.0, 0.0));
        assert!(!bullet.tick(0.5));
        assert_eq!(bullet.position, Vec2::new(200.0, 0.0));
    }

    #[test]
    fn lasers_wait_out_their_spawn_window() {
        let mut laser = launch(WeaponKind::Laser, Vec2::new(0.0, 10.0));
        assert_eq!(laser.snapshot().spawn_progress, 0.0);

        let _ = laser.tick(0.02);
        assert_eq!(laser.position, Vec2::ZERO);
        let _ = laser.tick(0.03);
        assert_eq!(laser.position, Vec2::ZERO);
        assert_eq!(laser.snapshot().spawn_progress, 1.0);

        let _ = laser.tick(0.01);
        assert!(laser.position.y > 0.0);
    }

    #[test]
    fn streams_jitter_within_bounds() {
        let tuning = Tuning::default();
        let stats = tuning.weapon(WeaponKind::Flame);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for index in 0..64 {
            let flame = Projectile::launch(
                ProjectileId::new(index),
                TurretId::new(0),
                WeaponKind::Flame,
                Vec2::ZERO,
                Vec2::new(100.0, 0.0),
                stats,
                &mut rng,
            );
            let speed = flame.velocity.length();
            assert!(speed >= 180.0 - 1.0e-3 && speed <= 220.0 + 1.0e-3);
            let heading = flame.velocity.y.atan2(flame.velocity.x).to_degrees();
            assert!(heading.abs() <= 10.0 + 1.0e-3);
            assert!(flame.max_life > 0.0);
        }
    }

    #[test]
    fn projectiles_expire_past_their_range() {
        let mut flame = launch(WeaponKind::Flame, Vec2::new(100.0, 0.0));
        let mut expired = false;
        for _ in 0..200 {
            if flame.tick(0.05) {
                expired = true;
                break;
            }
        }
        assert!(expired);
        assert!(!flame.is_active());
        assert!(flame.snapshot().life_fraction < 1.0);
    }

    #[test]
    fn continuous_overlap_counts_once() {
        let mut laser = launch(WeaponKind::Laser, Vec2::new(0.0, 10.0));
        let enemy = EnemyId::new(4);

        let first = laser.resolve_contact(enemy);
        assert_eq!(
            first,
            Some(Contact {
                hits_before: 0,
                spent: false
            })
        );
        assert_eq!(laser.resolve_contact(enemy), None);
        assert_eq!(laser.snapshot().pierce, 1);

        assert!(laser.release_contact(enemy));
        let second = laser.resolve_contact(enemy);
        assert_eq!(
            second,
            Some(Contact {
                hits_before: 1,
                spent: true
            })
        );
        assert!(!laser.is_active());
    }
}
