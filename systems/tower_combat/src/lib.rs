#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns targeting data into aiming, firing and beam commands.
//!
//! Every turret rotates its gun toward its assigned aim point by at most its
//! rotation speed per frame. Once the remaining aim error is inside the
//! turret's tolerance it discharges using the routine of its kind: single
//! projectiles, a fan of pellets, an instant piercing beam, or a continuous
//! beam. Area-slow auras ignore targeting entirely and slow every unaffected
//! enemy in range while their duty cycle is active.

use std::time::Duration;

use castle_defence_core::{
    geometry, Command, Damage, EnemySnapshot, EnemyView, Event, FiringBehavior, StatusEffect,
    TurretId, TurretPhase, TurretSnapshot, TurretTarget, TurretView, Tuning, WeaponKind,
};
use glam::Vec2;

/// Turret combat system that queues commands for every armed turret.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
    beam_hits: Vec<BeamHit>,
}

impl TowerCombat {
    /// Creates a new combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits combat commands for the current frame.
    ///
    /// `events` are the world events of the frame so far; their
    /// `TimeAdvanced` entries provide the frame time used by continuous beams.
    /// `targets` must be sorted by turret identifier, as produced by the
    /// targeting system.
    pub fn handle(
        &mut self,
        events: &[Event],
        turrets: &TurretView,
        enemies: &EnemyView,
        targets: &[TurretTarget],
        tuning: &Tuning,
        out: &mut Vec<Command>,
    ) {
        if turrets.is_empty() {
            return;
        }

        let dt = frame_time(events).as_secs_f32();
        self.scratch.clear();

        for turret in turrets.iter() {
            let behavior = turret.kind.behavior();
            if behavior == FiringBehavior::AreaSlowAura {
                self.pulse_aura(turret, enemies);
                continue;
            }

            let Some(target) = find_target(targets, turret.id) else {
                if behavior == FiringBehavior::ContinuousBeam
                    && matches!(turret.phase, TurretPhase::Beam { active: true, .. })
                {
                    self.scratch.push(Command::EndBeam { turret: turret.id });
                }
                continue;
            };

            let stats = tuning.turret(turret.kind);
            let desired = geometry::heading_degrees(turret.position, target.aim);
            let rotation = geometry::move_angle(turret.rotation, desired, stats.rotation_speed);
            if rotation != turret.rotation {
                self.scratch.push(Command::AimTurret {
                    turret: turret.id,
                    rotation,
                });
            }
            let error = geometry::angle_difference(rotation, desired);

            match behavior {
                FiringBehavior::Basic
                | FiringBehavior::DecayingStream
                | FiringBehavior::PiercingLaser => {
                    if turret.fire_ready() && error < stats.aim_tolerance {
                        if let Some(weapon) = turret.kind.weapon() {
                            self.scratch.push(Command::FireProjectile {
                                turret: turret.id,
                                weapon,
                                origin: turret.position,
                                aim: target.aim,
                            });
                        }
                    }
                }
                FiringBehavior::AreaBurst => {
                    if turret.fire_ready() && error < stats.aim_tolerance {
                        self.fire_burst(turret, rotation, tuning);
                    }
                }
                FiringBehavior::InstantBeam => {
                    let ready = matches!(
                        turret.phase,
                        TurretPhase::Beam { active: false, cooldown, .. } if cooldown <= 0.0
                    );
                    if ready && error <= stats.aim_tolerance {
                        self.discharge_beam(turret, target, enemies, tuning);
                    }
                }
                FiringBehavior::ContinuousBeam => {
                    let ready = matches!(
                        turret.phase,
                        TurretPhase::Beam { active, cooldown, .. } if active || cooldown <= 0.0
                    );
                    if ready && error <= stats.aim_tolerance {
                        self.sustain_beam(turret, target, enemies, tuning, dt);
                    }
                }
                FiringBehavior::AreaSlowAura => {}
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    fn pulse_aura(&mut self, turret: &TurretSnapshot, enemies: &EnemyView) {
        if !matches!(turret.phase, TurretPhase::Aura { active: true, .. }) {
            return;
        }

        let range_sq = turret.range * turret.range;
        for enemy in enemies.iter() {
            if enemy.status == StatusEffect::None
                && enemy.position.distance_squared(turret.position) <= range_sq
            {
                self.scratch.push(Command::SlowEnemy { enemy: enemy.id });
            }
        }
    }

    fn fire_burst(&mut self, turret: &TurretSnapshot, rotation: f32, tuning: &Tuning) {
        let Some(weapon) = turret.kind.weapon() else {
            return;
        };

        let rays = tuning.burst.rays.max(2);
        let spread = tuning.burst.spread;
        let step = spread / (rays - 1) as f32;
        for ray in 0..rays {
            let heading = rotation - spread / 2.0 + step * ray as f32;
            let direction = geometry::direction_from_degrees(heading);
            self.scratch.push(Command::FireProjectile {
                turret: turret.id,
                weapon,
                origin: turret.position,
                aim: turret.position + direction * turret.range,
            });
        }
    }

    fn discharge_beam(
        &mut self,
        turret: &TurretSnapshot,
        target: &TurretTarget,
        enemies: &EnemyView,
        tuning: &Tuning,
    ) {
        let end = beam_end(turret, target);
        self.scratch.push(Command::DischargeBeam {
            turret: turret.id,
            end,
        });

        self.collect_beam_hits(turret.position, end, 0.0, enemies);
        let max_pierce = tuning.beams.cyclone_max_pierce as usize;
        for (index, hit) in self.beam_hits.iter().take(max_pierce).enumerate() {
            self.scratch.push(Command::DamageEnemy {
                enemy: hit.enemy.id,
                damage: Damage::Weapon {
                    weapon: WeaponKind::CycloneBeam,
                    falloff: geometry::damage_falloff(hit.distance_sq, turret.range, index as u32),
                },
            });
        }
    }

    fn sustain_beam(
        &mut self,
        turret: &TurretSnapshot,
        target: &TurretTarget,
        enemies: &EnemyView,
        tuning: &Tuning,
        dt: f32,
    ) {
        let end = beam_end(turret, target);
        self.scratch.push(Command::SustainBeam {
            turret: turret.id,
            end,
        });

        let amount = tuning.beams.meltdown_dps * dt;
        if amount <= 0.0 {
            return;
        }

        let half_width = tuning.beams.meltdown_thickness / 2.0;
        self.collect_beam_hits(turret.position, end, half_width, enemies);
        for hit in &self.beam_hits {
            self.scratch.push(Command::DamageEnemy {
                enemy: hit.enemy.id,
                damage: Damage::Direct {
                    weapon: WeaponKind::MeltdownBeam,
                    amount,
                },
            });
        }
    }

    /// Enemies crossed by the segment, nearest first.
    fn collect_beam_hits(&mut self, start: Vec2, end: Vec2, padding: f32, enemies: &EnemyView) {
        self.beam_hits.clear();
        for enemy in enemies.iter() {
            if geometry::circle_intersects_segment(enemy.position, enemy.radius + padding, start, end)
            {
                self.beam_hits.push(BeamHit {
                    distance_sq: enemy.position.distance_squared(start),
                    enemy: *enemy,
                });
            }
        }
        self.beam_hits.sort_by(|a, b| {
            a.distance_sq
                .total_cmp(&b.distance_sq)
                .then(a.enemy.id.cmp(&b.enemy.id))
        });
    }
}

#[derive(Clone, Copy, Debug)]
struct BeamHit {
    distance_sq: f32,
    enemy: EnemySnapshot,
}

fn beam_end(turret: &TurretSnapshot, target: &TurretTarget) -> Vec2 {
    turret.position + (target.aim - turret.position).normalize_or_zero() * turret.range
}

fn find_target(targets: &[TurretTarget], turret: TurretId) -> Option<&TurretTarget> {
    targets
        .binary_search_by_key(&turret, |target| target.turret)
        .ok()
        .map(|index| &targets[index])
}

fn frame_time(events: &[Event]) -> Duration {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TimeAdvanced { dt } => Some(*dt),
            _ => None,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use castle_defence_core::{EnemyId, EnemyKind, TileCoord, TurretKind};

    fn turret(id: u32, kind: TurretKind, phase: TurretPhase) -> TurretSnapshot {
        TurretSnapshot {
            id: TurretId::new(id),
            kind,
            tile: TileCoord::new(0, 0),
            position: Vec2::ZERO,
            range: Tuning::default().turret(kind).range,
            rotation: 0.0,
            recoil: 0.0,
            phase,
        }
    }

    fn gun(id: u32, kind: TurretKind) -> TurretSnapshot {
        turret(id, kind, TurretPhase::Gun { ready_in: 0.0 })
    }

    fn beam(id: u32, kind: TurretKind, active: bool, cooldown: f32) -> TurretSnapshot {
        turret(
            id,
            kind,
            TurretPhase::Beam {
                active,
                end: Vec2::ZERO,
                remaining: 0.0,
                cooldown,
            },
        )
    }

    fn enemy(id: u32, position: Vec2) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Locus,
            position,
            velocity: Vec2::ZERO,
            radius: 16.0,
            speed: 75.0,
            health: 20.0,
            max_health: 20.0,
            waypoint: 0,
            status: StatusEffect::None,
            visible: true,
            ability_ready: true,
            damaged: false,
            healed: false,
        }
    }

    fn target(turret: u32, enemy: u32, aim: Vec2) -> TurretTarget {
        TurretTarget {
            turret: TurretId::new(turret),
            enemy: EnemyId::new(enemy),
            aim,
            distance_sq: aim.length_squared(),
        }
    }

    fn run(
        turrets: Vec<TurretSnapshot>,
        enemies: Vec<EnemySnapshot>,
        targets: &[TurretTarget],
    ) -> Vec<Command> {
        let mut system = TowerCombat::new();
        let mut out = Vec::new();
        system.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_millis(250),
            }],
            &TurretView::from_snapshots(turrets),
            &EnemyView::from_snapshots(enemies),
            targets,
            &Tuning::default(),
            &mut out,
        );
        out
    }

    #[test]
    fn aligned_ready_gun_fires_at_the_aim_point() {
        let aim = Vec2::new(100.0, 0.0);
        let out = run(
            vec![gun(1, TurretKind::Duo)],
            vec![enemy(1, aim)],
            &[target(1, 1, aim)],
        );
        assert_eq!(
            out,
            vec![Command::FireProjectile {
                turret: TurretId::new(1),
                weapon: WeaponKind::Bullet,
                origin: Vec2::ZERO,
                aim,
            }]
        );
    }

    #[test]
    fn misaligned_gun_only_rotates() {
        let aim = Vec2::new(0.0, 100.0);
        let out = run(
            vec![gun(1, TurretKind::Duo)],
            vec![enemy(1, aim)],
            &[target(1, 1, aim)],
        );
        assert_eq!(
            out,
            vec![Command::AimTurret {
                turret: TurretId::new(1),
                rotation: 5.0,
            }]
        );
    }

    #[test]
    fn cooling_gun_holds_fire() {
        let aim = Vec2::new(100.0, 0.0);
        let out = run(
            vec![turret(1, TurretKind::Duo, TurretPhase::Gun { ready_in: 0.1 })],
            vec![enemy(1, aim)],
            &[target(1, 1, aim)],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn burst_fans_pellets_across_the_cone() {
        let aim = Vec2::new(100.0, 0.0);
        let out = run(
            vec![gun(1, TurretKind::Smite)],
            vec![enemy(1, aim)],
            &[target(1, 1, aim)],
        );
        let headings: Vec<f32> = out
            .iter()
            .filter_map(|command| match command {
                Command::FireProjectile {
                    weapon: WeaponKind::Shotgun,
                    origin,
                    aim,
                    ..
                } => Some((*aim - *origin).y.atan2((*aim - *origin).x).to_degrees()),
                _ => None,
            })
            .collect();
        assert_eq!(headings.len(), 10);
        assert!((headings[0] + 15.0).abs() < 1.0e-3);
        assert!((headings[9] - 15.0).abs() < 1.0e-3);
    }

    #[test]
    fn instant_beam_damages_nearest_enemies_first() {
        let aim = Vec2::new(60.0, 0.0);
        let enemies: Vec<_> = (0..7)
            .map(|index| enemy(index, Vec2::new(300.0 - 40.0 * index as f32, 0.0)))
            .collect();
        let out = run(
            vec![beam(1, TurretKind::Cyclone, false, 0.0)],
            enemies,
            &[target(1, 6, aim)],
        );

        assert!(matches!(out[0], Command::DischargeBeam { end, .. } if end == Vec2::new(360.0, 0.0)));
        let hits: Vec<(EnemyId, f32)> = out
            .iter()
            .filter_map(|command| match command {
                Command::DamageEnemy {
                    enemy,
                    damage: Damage::Weapon { falloff, .. },
                } => Some((*enemy, *falloff)),
                _ => None,
            })
            .collect();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].0, EnemyId::new(6));
        assert_eq!(hits[2].0, EnemyId::new(4));
        assert!(hits.windows(2).all(|pair| pair[0].1 > pair[1].1));
    }

    #[test]
    fn instant_beam_respects_its_cooldown() {
        let aim = Vec2::new(60.0, 0.0);
        let out = run(
            vec![beam(1, TurretKind::Cyclone, false, 0.3)],
            vec![enemy(1, aim)],
            &[target(1, 1, aim)],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn continuous_beam_deals_damage_per_second() {
        let aim = Vec2::new(100.0, 0.0);
        let out = run(
            vec![beam(1, TurretKind::Meltdown, false, 0.0)],
            vec![enemy(1, aim), enemy(2, Vec2::new(100.0, 20.0)), enemy(3, Vec2::new(100.0, 40.0))],
            &[target(1, 1, aim)],
        );

        assert!(matches!(out[0], Command::SustainBeam { .. }));
        let damaged: Vec<EnemyId> = out
            .iter()
            .filter_map(|command| match command {
                Command::DamageEnemy {
                    enemy,
                    damage: Damage::Direct { amount, .. },
                } => {
                    assert_eq!(*amount, 5.0);
                    Some(*enemy)
                }
                _ => None,
            })
            .collect();
        assert_eq!(damaged, vec![EnemyId::new(1), EnemyId::new(2)]);
    }

    #[test]
    fn continuous_beam_releases_without_a_target() {
        let out = run(vec![beam(1, TurretKind::Meltdown, true, 0.0)], Vec::new(), &[]);
        assert_eq!(
            out,
            vec![Command::EndBeam {
                turret: TurretId::new(1)
            }]
        );
    }

    #[test]
    fn active_aura_slows_unaffected_enemies_in_range() {
        let mut slowed = enemy(2, Vec2::new(10.0, 0.0));
        slowed.status = StatusEffect::Slowed;
        let out = run(
            vec![turret(
                1,
                TurretKind::Wave,
                TurretPhase::Aura {
                    active: true,
                    remaining: 5.0,
                },
            )],
            vec![enemy(1, Vec2::new(20.0, 0.0)), slowed, enemy(3, Vec2::new(5000.0, 0.0))],
            &[],
        );
        assert_eq!(
            out,
            vec![Command::SlowEnemy {
                enemy: EnemyId::new(1)
            }]
        );
    }

    #[test]
    fn resting_aura_is_silent() {
        let out = run(
            vec![turret(
                1,
                TurretKind::Wave,
                TurretPhase::Aura {
                    active: false,
                    remaining: 5.0,
                },
            )],
            vec![enemy(1, Vec2::new(20.0, 0.0))],
            &[],
        );
        assert!(out.is_empty());
    }
}
