//! Enemy state owned by the world.

use castle_defence_core::{
    geometry, tuning::StatusTuning, EnemyId, EnemyKind, EnemySnapshot, StatusEffect, Tuning,
};
use glam::Vec2;

use crate::entity::Lifecycle;

/// Result of advancing an enemy by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    /// The enemy is still on the field.
    Moving,
    /// The enemy crossed the exit boundary.
    Leaked,
    /// The enemy left the grid sideways or its position stopped being finite.
    Strayed,
}

/// Health removed by a single damage application.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DamageOutcome {
    pub(crate) applied: f32,
    pub(crate) killed: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    position: Vec2,
    velocity: Vec2,
    radius: f32,
    speed: f32,
    base_speed: f32,
    health: f32,
    max_health: f32,
    waypoint: usize,
    status: StatusEffect,
    status_timer: f32,
    visible: bool,
    reward: u32,
    ability_cooldown: f32,
    damaged: bool,
    healed: bool,
    active: bool,
}

impl Enemy {
    /// Creates an enemy on the path entry heading toward the first waypoint.
    pub(crate) fn spawn(
        id: EnemyId,
        kind: EnemyKind,
        tuning: &Tuning,
        health_multiplier: f32,
        start: Vec2,
        first_target: Vec2,
    ) -> Self {
        let stats = tuning.enemy(kind);
        let multiplier = if health_multiplier.is_finite() && health_multiplier > 0.0 {
            health_multiplier
        } else {
            1.0
        };
        let max_health = stats.health * multiplier;

        Self {
            id,
            kind,
            position: start,
            velocity: geometry::velocity_towards(start, first_target, stats.speed),
            radius: stats.radius,
            speed: stats.speed,
            base_speed: stats.speed,
            health: max_health,
            max_health,
            waypoint: 0,
            status: StatusEffect::None,
            status_timer: 0.0,
            visible: kind.starts_visible(),
            reward: stats.reward,
            ability_cooldown: 0.0,
            damaged: false,
            healed: false,
            active: true,
        }
    }

    pub(crate) const fn kind(&self) -> EnemyKind {
        self.kind
    }

    pub(crate) const fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) const fn max_health(&self) -> f32 {
        self.max_health
    }

    pub(crate) const fn reward(&self) -> u32 {
        self.reward
    }

    /// Clears the presentation flags raised during the previous frame.
    pub(crate) fn begin_frame(&mut self) {
        self.damaged = false;
        self.healed = false;
    }

    /// Advances status timers, ability cooldown, boundary checks and motion.
    pub(crate) fn tick(
        &mut self,
        dt: f32,
        status: &StatusTuning,
        width: f32,
        height: f32,
    ) -> TickOutcome {
        self.update_status(dt, status);

        if self.ability_cooldown > 0.0 {
            self.ability_cooldown = (self.ability_cooldown - dt).max(0.0);
        }

        if !self.position.is_finite()
            || self.position.x < 0.0
            || self.position.x >= width
            || self.position.y < 0.0
        {
            self.active = false;
            return TickOutcome::Strayed;
        }

        if self.position.y >= height {
            self.active = false;
            return TickOutcome::Leaked;
        }

        self.position += self.velocity * dt;
        TickOutcome::Moving
    }

    fn update_status(&mut self, dt: f32, status: &StatusTuning) {
        if self.status == StatusEffect::Slowed && self.status_timer <= 0.0 {
            if self.kind == EnemyKind::Crawler {
                self.speed = self.base_speed * status.crawler_slow_multiplier;
                self.status_timer = status.crawler_slow_duration;
                self.visible = true;
            } else {
                self.speed = self.base_speed * status.slow_multiplier;
                self.status_timer = status.slow_duration;
            }
        }

        if self.status_timer > 0.0 {
            self.status_timer -= dt;
            if self.status_timer <= 0.0 {
                self.speed = self.base_speed;
                if self.kind == EnemyKind::Crawler {
                    self.visible = false;
                }
                self.status = StatusEffect::None;
                self.status_timer = 0.0;
            }
        }
    }

    /// Removes health, clamping at zero; the first blow to reach zero kills.
    pub(crate) fn apply_damage(&mut self, amount: f32, slows: bool) -> DamageOutcome {
        let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
        let applied = amount.min(self.health);
        self.health -= applied;

        if slows {
            let _ = self.slow();
        }

        if self.health <= 0.0 {
            self.health = 0.0;
            self.active = false;
            return DamageOutcome {
                applied,
                killed: true,
            };
        }

        self.damaged = true;
        DamageOutcome {
            applied,
            killed: false,
        }
    }

    /// Marks the enemy slowed unless it already carries a status.
    ///
    /// The speed change takes effect on the next tick.
    pub(crate) fn slow(&mut self) -> bool {
        if self.status != StatusEffect::None {
            return false;
        }
        self.status = StatusEffect::Slowed;
        true
    }

    /// Restores health up to the maximum, returning the amount restored.
    pub(crate) fn heal(&mut self, amount: f32) -> f32 {
        if !amount.is_finite() || amount <= 0.0 || self.health >= self.max_health {
            return 0.0;
        }
        let restored = amount.min(self.max_health - self.health);
        self.health += restored;
        self.healed = true;
        restored
    }

    pub(crate) fn reset_ability(&mut self, cooldown: f32) {
        self.ability_cooldown = cooldown;
    }

    /// Points the enemy at a waypoint; the waypoint index never decreases.
    pub(crate) fn steer(&mut self, waypoint: usize, velocity: Vec2, waypoint_count: usize) {
        self.waypoint = waypoint.clamp(self.waypoint, waypoint_count.max(self.waypoint));
        if velocity.is_finite() {
            self.velocity = velocity;
        }
    }

    pub(crate) fn despawn(&mut self) {
        self.active = false;
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            velocity: self.velocity,
            radius: self.radius,
            speed: self.speed,
            health: self.health,
            max_health: self.max_health,
            waypoint: self.waypoint,
            status: self.status,
            visible: self.visible,
            ability_ready: self.ability_cooldown <= 0.0,
            damaged: self.damaged,
            healed: self.healed,
        }
    }
}

impl Lifecycle for Enemy {
    type Id = EnemyId;

    fn id(&self) -> EnemyId {
        self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f32 = 840.0;
    const HEIGHT: f32 = 560.0;

    fn flare() -> Enemy {
        Enemy::spawn(
            EnemyId::new(0),
            EnemyKind::Flare,
            &Tuning::default(),
            1.0,
            Vec2::new(60.0, 20.0),
            Vec2::new(60.0, 500.0),
        )
    }

    #[test]
    fn spawn_heads_toward_first_waypoint() {
        let enemy = flare();
        assert_eq!(enemy.velocity, Vec2::new(0.0, 100.0));
        assert_eq!(enemy.health, 10.0);
        assert!(enemy.visible);
    }

    #[test]
    fn health_multiplier_scales_maximum() {
        let enemy = Enemy::spawn(
            EnemyId::new(1),
            EnemyKind::Locus,
            &Tuning::default(),
            2.0,
            Vec2::ZERO,
            Vec2::X,
        );
        assert_eq!(enemy.max_health(), 40.0);
        assert_eq!(enemy.health, 40.0);
    }

    #[test]
    fn damage_clamps_and_kills_once() {
        let mut enemy = flare();
        let first = enemy.apply_damage(6.0, false);
        assert!(!first.killed);
        assert!(enemy.damaged);

        let second = enemy.apply_damage(6.0, false);
        assert!(second.killed);
        assert_eq!(second.applied, 4.0);
        assert_eq!(enemy.health, 0.0);
        assert!(!enemy.is_active());
    }

    #[test]
    fn slow_applies_on_next_tick_and_expires() {
        let status = StatusTuning::default();
        let mut enemy = flare();
        assert!(enemy.slow());
        assert!(!enemy.slow(), "a second slow must not stack");

        let _ = enemy.tick(1.0, &status, WIDTH, HEIGHT);
        assert_eq!(enemy.speed, 50.0);
        assert_eq!(enemy.status, StatusEffect::Slowed);

        for _ in 0..4 {
            let _ = enemy.tick(1.0, &status, WIDTH, HEIGHT);
        }
        assert_eq!(enemy.speed, 100.0);
        assert_eq!(enemy.status, StatusEffect::None);
    }

    #[test]
    fn crawler_is_visible_only_while_slowed() {
        let status = StatusTuning::default();
        let mut crawler = Enemy::spawn(
            EnemyId::new(2),
            EnemyKind::Crawler,
            &Tuning::default(),
            1.0,
            Vec2::new(60.0, 20.0),
            Vec2::new(60.0, 500.0),
        );
        assert!(!crawler.visible);

        let outcome = crawler.apply_damage(0.1, true);
        assert!(!outcome.killed);
        let _ = crawler.tick(0.5, &status, WIDTH, HEIGHT);
        assert!(crawler.visible);
        assert!((crawler.speed - 45.0).abs() < 1.0e-4);

        let _ = crawler.tick(1.5, &status, WIDTH, HEIGHT);
        assert!(!crawler.visible);
        assert_eq!(crawler.speed, 150.0);
    }

    #[test]
    fn heal_is_capped_at_maximum() {
        let mut enemy = flare();
        let _ = enemy.apply_damage(1.0, false);
        assert_eq!(enemy.heal(5.0), 1.0);
        assert_eq!(enemy.heal(5.0), 0.0);
        assert_eq!(enemy.health, enemy.max_health());
    }

    #[test]
    fn crossing_the_bottom_edge_leaks() {
        let mut enemy = flare();
        enemy.position = Vec2::new(60.0, HEIGHT + 1.0);
        assert_eq!(
            enemy.tick(0.016, &StatusTuning::default(), WIDTH, HEIGHT),
            TickOutcome::Leaked
        );
        assert!(!enemy.is_active());
    }

    #[test]
    fn non_finite_positions_stray() {
        let mut enemy = flare();
        enemy.position = Vec2::new(f32::NAN, 10.0);
        assert_eq!(
            enemy.tick(0.016, &StatusTuning::default(), WIDTH, HEIGHT),
            TickOutcome::Strayed
        );
    }

    #[test]
    fn leaving_the_sides_strays() {
        for x in [-1.0, WIDTH] {
            let mut enemy = flare();
            enemy.position = Vec2::new(x, 100.0);
            assert_eq!(
                enemy.tick(0.016, &StatusTuning::default(), WIDTH, HEIGHT),
                TickOutcome::Strayed,
                "x = {x}"
            );
            assert!(!enemy.is_active());
        }
    }

    #[test]
    fn last_column_is_still_on_the_grid() {
        let mut enemy = flare();
        enemy.position = Vec2::new(WIDTH - 0.5, 100.0);
        assert_eq!(
            enemy.tick(0.016, &StatusTuning::default(), WIDTH, HEIGHT),
            TickOutcome::Moving
        );
    }

    #[test]
    fn steering_never_moves_backwards() {
        let mut enemy = flare();
        enemy.steer(3, Vec2::X, 14);
        enemy.steer(1, Vec2::Y, 14);
        assert_eq!(enemy.waypoint, 3);
        enemy.steer(40, Vec2::Y, 14);
        assert_eq!(enemy.waypoint, 14);
    }
}
