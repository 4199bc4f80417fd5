#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic turret targets from world snapshots.

use castle_defence_core::{
    geometry, EnemyId, EnemyView, FiringBehavior, StatusEffect, TurretId, TurretKind,
    TurretPhase, TurretTarget, TurretView, Tuning,
};
use glam::Vec2;

/// Turret targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    turret_workspace: Vec<TurretWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes turret targets for the provided world snapshot.
    ///
    /// Each turret selects the nearest eligible enemy strictly inside its
    /// range, preferring the smaller identifier on ties. Projectile turrets aim
    /// at the predicted intercept point while beams aim at the enemy itself.
    /// The output buffer is cleared before populating it with the latest
    /// assignments.
    pub fn handle(
        &mut self,
        turrets: &TurretView,
        enemies: &EnemyView,
        tuning: &Tuning,
        out: &mut Vec<TurretTarget>,
    ) {
        out.clear();

        if turrets.is_empty() || enemies.is_empty() {
            return;
        }

        self.prepare_turret_workspace(turrets, tuning);
        if self.turret_workspace.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);

        for turret in &self.turret_workspace {
            let max_distance = turret.range * turret.range;
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                if !candidate.eligible_for(turret.kind) {
                    continue;
                }

                let distance_sq = candidate.position.distance_squared(turret.position);
                if distance_sq >= max_distance {
                    continue;
                }

                let current = BestCandidate {
                    distance_sq,
                    enemy: candidate.id,
                    position: candidate.position,
                    velocity: candidate.velocity,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                let aim = if turret.muzzle_speed > 0.0 {
                    geometry::intercept_point(
                        turret.position,
                        best_candidate.position,
                        best_candidate.velocity,
                        turret.muzzle_speed,
                    )
                } else {
                    best_candidate.position
                };

                out.push(TurretTarget {
                    turret: turret.id,
                    enemy: best_candidate.enemy,
                    aim,
                    distance_sq: best_candidate.distance_sq,
                });
            }
        }
    }

    fn prepare_turret_workspace(&mut self, turrets: &TurretView, tuning: &Tuning) {
        self.turret_workspace.clear();
        let (lower, _) = turrets.iter().size_hint();
        self.turret_workspace.reserve(lower);

        for snapshot in turrets.iter() {
            let seeks_target = match snapshot.kind.behavior() {
                FiringBehavior::AreaSlowAura => false,
                FiringBehavior::InstantBeam => {
                    !matches!(snapshot.phase, TurretPhase::Beam { active: true, .. })
                }
                _ => true,
            };
            if !seeks_target || !snapshot.range.is_finite() || snapshot.range <= 0.0 {
                continue;
            }

            self.turret_workspace.push(TurretWorkspace {
                id: snapshot.id,
                kind: snapshot.kind,
                position: snapshot.position,
                range: snapshot.range,
                muzzle_speed: tuning.muzzle_speed(snapshot.kind),
            });
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        let (lower, _) = enemies.iter().size_hint();
        self.enemy_workspace.reserve(lower);

        for snapshot in enemies.iter() {
            if !snapshot.position.is_finite() {
                continue;
            }

            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
                velocity: snapshot.velocity,
                visible: snapshot.visible,
                slowed: snapshot.status == StatusEffect::Slowed,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TurretWorkspace {
    id: TurretId,
    kind: TurretKind,
    position: Vec2,
    range: f32,
    muzzle_speed: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
    velocity: Vec2,
    visible: bool,
    slowed: bool,
}

impl EnemyCandidate {
    fn eligible_for(&self, kind: TurretKind) -> bool {
        if kind.targets_hidden() {
            !self.slowed
        } else {
            self.visible
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_sq: f32,
    enemy: EnemyId,
    position: Vec2,
    velocity: Vec2,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.enemy < other.enemy
    }
}

#[cfg(test)]
mod tests {
    use super::{TowerTargeting, TurretTarget};
    use castle_defence_core::{
        EnemyId, EnemyKind, EnemySnapshot, EnemyView, StatusEffect, TileCoord, TurretId,
        TurretKind, TurretPhase, TurretSnapshot, TurretView, Tuning,
    };
    use glam::Vec2;

    fn turret(id: u32, kind: TurretKind, position: Vec2, range: f32) -> TurretSnapshot {
        let phase = match kind {
            TurretKind::Cyclone | TurretKind::Meltdown => TurretPhase::Beam {
                active: false,
                end: position,
                remaining: 0.0,
                cooldown: 0.0,
            },
            TurretKind::Wave => TurretPhase::Aura {
                active: true,
                remaining: 1.0,
            },
            _ => TurretPhase::Gun { ready_in: 0.0 },
        };
        TurretSnapshot {
            id: TurretId::new(id),
            kind,
            tile: TileCoord::new(0, 0),
            position,
            range,
            rotation: 0.0,
            recoil: 0.0,
            phase,
        }
    }

    fn enemy(id: u32, position: Vec2) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Flare,
            position,
            velocity: Vec2::ZERO,
            radius: 12.0,
            speed: 100.0,
            health: 10.0,
            max_health: 10.0,
            waypoint: 0,
            status: StatusEffect::None,
            visible: true,
            ability_ready: true,
            damaged: false,
            healed: false,
        }
    }

    fn targets(turrets: Vec<TurretSnapshot>, enemies: Vec<EnemySnapshot>) -> Vec<TurretTarget> {
        let mut system = TowerTargeting::new();
        let mut out = Vec::new();
        system.handle(
            &TurretView::from_snapshots(turrets),
            &EnemyView::from_snapshots(enemies),
            &Tuning::default(),
            &mut out,
        );
        out
    }

    #[test]
    fn enemy_beyond_range_is_ignored() {
        let out = targets(
            vec![turret(1, TurretKind::Duo, Vec2::ZERO, 120.0)],
            vec![enemy(2, Vec2::new(150.0, 0.0))],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn enemy_on_the_range_boundary_is_ignored() {
        let out = targets(
            vec![turret(1, TurretKind::Duo, Vec2::ZERO, 120.0)],
            vec![enemy(2, Vec2::new(120.0, 0.0))],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn nearest_enemy_wins() {
        let out = targets(
            vec![turret(1, TurretKind::Duo, Vec2::ZERO, 200.0)],
            vec![enemy(1, Vec2::new(90.0, 0.0)), enemy(2, Vec2::new(0.0, 40.0))],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(2));
        assert_eq!(out[0].distance_sq, 1600.0);
    }

    #[test]
    fn smaller_enemy_id_is_preferred_when_distances_match() {
        let out = targets(
            vec![turret(1, TurretKind::Duo, Vec2::ZERO, 200.0)],
            vec![enemy(20, Vec2::new(50.0, 0.0)), enemy(10, Vec2::new(-50.0, 0.0))],
        );
        assert_eq!(out[0].enemy, EnemyId::new(10));
    }

    #[test]
    fn hidden_enemies_are_only_seen_by_ice_streams() {
        let mut crawler = enemy(3, Vec2::new(30.0, 0.0));
        crawler.kind = EnemyKind::Crawler;
        crawler.visible = false;

        let out = targets(
            vec![
                turret(1, TurretKind::Duo, Vec2::ZERO, 200.0),
                turret(2, TurretKind::Salvo, Vec2::ZERO, 200.0),
            ],
            vec![crawler],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].turret, TurretId::new(2));
    }

    #[test]
    fn ice_streams_skip_slowed_enemies() {
        let mut slowed = enemy(1, Vec2::new(20.0, 0.0));
        slowed.status = StatusEffect::Slowed;
        let fresh = enemy(2, Vec2::new(60.0, 0.0));

        let out = targets(
            vec![turret(1, TurretKind::Salvo, Vec2::ZERO, 200.0)],
            vec![slowed, fresh],
        );
        assert_eq!(out[0].enemy, EnemyId::new(2));
    }

    #[test]
    fn aura_never_targets() {
        let out = targets(
            vec![turret(1, TurretKind::Wave, Vec2::ZERO, 200.0)],
            vec![enemy(1, Vec2::new(10.0, 0.0))],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn instant_beam_waits_while_drawn() {
        let mut cyclone = turret(1, TurretKind::Cyclone, Vec2::ZERO, 200.0);
        cyclone.phase = TurretPhase::Beam {
            active: true,
            end: Vec2::X,
            remaining: 0.05,
            cooldown: 0.0,
        };
        let out = targets(vec![cyclone], vec![enemy(1, Vec2::new(10.0, 0.0))]);
        assert!(out.is_empty());
    }

    #[test]
    fn projectiles_lead_moving_targets_but_beams_do_not() {
        let mut runner = enemy(1, Vec2::new(100.0, 0.0));
        runner.velocity = Vec2::new(0.0, 100.0);

        let out = targets(
            vec![
                turret(1, TurretKind::Duo, Vec2::ZERO, 300.0),
                turret(2, TurretKind::Meltdown, Vec2::ZERO, 300.0),
            ],
            vec![runner],
        );
        assert_eq!(out.len(), 2);
        assert!(out[0].aim.y > 0.0, "bullet aim should lead the target");
        assert_eq!(out[1].aim, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn stale_assignments_are_cleared() {
        let mut system = TowerTargeting::new();
        let mut out = vec![TurretTarget {
            turret: TurretId::new(99),
            enemy: EnemyId::new(99),
            aim: Vec2::ZERO,
            distance_sq: 0.0,
        }];
        system.handle(
            &TurretView::default(),
            &EnemyView::default(),
            &Tuning::default(),
            &mut out,
        );
        assert!(out.is_empty());
    }
}
