//! Authoritative turret state management utilities.

use std::collections::BTreeMap;

use castle_defence_core::{
    geometry, FiringBehavior, TileCoord, TurretId, TurretKind, TurretPhase, TurretSnapshot, Tuning,
};
use glam::Vec2;

#[derive(Clone, Copy, Debug, PartialEq)]
struct BeamState {
    active: bool,
    timer: f32,
    cooldown: f32,
    end: Vec2,
}

impl BeamState {
    fn idle(origin: Vec2) -> Self {
        Self {
            active: false,
            timer: 0.0,
            cooldown: 0.0,
            end: origin,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TurretState {
    Gun { fire_timer: f32 },
    InstantBeam(BeamState),
    ContinuousBeam(BeamState),
    Aura { active: bool, timer: f32 },
}

/// Turret stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Turret {
    id: TurretId,
    kind: TurretKind,
    tile: TileCoord,
    position: Vec2,
    range: f32,
    rotation: f32,
    recoil: f32,
    state: TurretState,
}

impl Turret {
    fn new(id: TurretId, kind: TurretKind, tile: TileCoord, position: Vec2, tuning: &Tuning) -> Self {
        let state = match kind.behavior() {
            FiringBehavior::InstantBeam => TurretState::InstantBeam(BeamState::idle(position)),
            FiringBehavior::ContinuousBeam => {
                TurretState::ContinuousBeam(BeamState::idle(position))
            }
            FiringBehavior::AreaSlowAura => TurretState::Aura {
                active: false,
                timer: 0.0,
            },
            FiringBehavior::Basic
            | FiringBehavior::AreaBurst
            | FiringBehavior::PiercingLaser
            | FiringBehavior::DecayingStream => TurretState::Gun { fire_timer: 0.0 },
        };

        Self {
            id,
            kind,
            tile,
            position,
            range: tuning.turret(kind).range,
            rotation: 0.0,
            recoil: 0.0,
            state,
        }
    }

    pub(crate) const fn kind(&self) -> TurretKind {
        self.kind
    }

    pub(crate) const fn tile(&self) -> TileCoord {
        self.tile
    }

    /// Advances cooldowns, beam windows, the aura duty cycle and recoil decay.
    pub(crate) fn tick(&mut self, dt: f32, tuning: &Tuning) {
        let peak = tuning.turret(self.kind).recoil;
        match &mut self.state {
            TurretState::Gun { fire_timer } => {
                if *fire_timer > 0.0 {
                    *fire_timer = (*fire_timer - dt).max(0.0);
                    self.recoil = geometry::lerp(self.recoil, 0.0, 0.2);
                }
            }
            TurretState::InstantBeam(beam) => {
                if beam.active {
                    beam.timer -= dt;
                    self.recoil = peak;
                    if beam.timer <= 0.0 {
                        beam.active = false;
                        beam.timer = 0.0;
                        beam.cooldown = tuning.beams.cyclone_cooldown;
                    }
                } else {
                    beam.cooldown = (beam.cooldown - dt).max(0.0);
                    self.recoil = geometry::lerp(self.recoil, 0.0, 0.5);
                }
            }
            TurretState::ContinuousBeam(beam) => {
                if beam.active {
                    beam.timer -= dt;
                    if self.recoil <= peak {
                        self.recoil += tuning.beams.meltdown_recoil_velocity * dt;
                    }
                    if beam.timer <= 0.0 {
                        beam.active = false;
                        beam.timer = 0.0;
                        beam.cooldown = tuning.beams.meltdown_cooldown;
                    }
                } else {
                    beam.cooldown = (beam.cooldown - dt).max(0.0);
                    self.recoil = geometry::lerp(self.recoil, 0.0, 0.1);
                }
            }
            TurretState::Aura { active, timer } => {
                *timer -= dt;
                if *timer <= 0.0 {
                    *active = !*active;
                    *timer = if *active {
                        tuning.aura.active_duration
                    } else {
                        tuning.aura.cooldown_duration
                    };
                }
            }
        }
    }

    pub(crate) fn aim(&mut self, rotation: f32) {
        self.rotation = geometry::normalise_angle(rotation);
    }

    /// Restarts the fire cooldown; returns `false` for turrets without a gun.
    pub(crate) fn fire(&mut self, tuning: &Tuning) -> bool {
        let stats = tuning.turret(self.kind);
        match &mut self.state {
            TurretState::Gun { fire_timer } => {
                *fire_timer = 1.0 / stats.fire_rate;
                self.recoil = stats.recoil;
                true
            }
            _ => false,
        }
    }

    /// Opens an instant beam's visible window.
    pub(crate) fn discharge(&mut self, end: Vec2, tuning: &Tuning) -> bool {
        match &mut self.state {
            TurretState::InstantBeam(beam) => {
                beam.active = true;
                beam.timer = tuning.beams.cyclone_duration;
                beam.cooldown = 0.0;
                beam.end = end;
                self.recoil = tuning.turret(self.kind).recoil;
                true
            }
            _ => false,
        }
    }

    /// Keeps a continuous beam switched on, starting its window if it was off.
    pub(crate) fn sustain(&mut self, end: Vec2, tuning: &Tuning) -> bool {
        match &mut self.state {
            TurretState::ContinuousBeam(beam) => {
                if !beam.active || beam.timer <= 0.0 {
                    beam.timer = tuning.beams.meltdown_duration;
                }
                beam.active = true;
                beam.cooldown = 0.0;
                beam.end = end;
                true
            }
            _ => false,
        }
    }

    /// Switches a continuous beam off and starts its cooldown.
    pub(crate) fn release(&mut self, tuning: &Tuning) -> bool {
        match &mut self.state {
            TurretState::ContinuousBeam(beam) if beam.active => {
                beam.active = false;
                beam.timer = 0.0;
                beam.cooldown = tuning.beams.meltdown_cooldown;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn snapshot(&self) -> TurretSnapshot {
        let phase = match self.state {
            TurretState::Gun { fire_timer } => TurretPhase::Gun {
                ready_in: fire_timer,
            },
            TurretState::InstantBeam(beam) | TurretState::ContinuousBeam(beam) => {
                TurretPhase::Beam {
                    active: beam.active,
                    end: beam.end,
                    remaining: beam.timer,
                    cooldown: beam.cooldown,
                }
            }
            TurretState::Aura { active, timer } => TurretPhase::Aura {
                active,
                remaining: timer.max(0.0),
            },
        };

        TurretSnapshot {
            id: self.id,
            kind: self.kind,
            tile: self.tile,
            position: self.position,
            range: self.range,
            rotation: self.rotation,
            recoil: self.recoil,
            phase,
        }
    }
}

/// Registry that stores turrets and manages identifier allocation.
#[derive(Debug, Default)]
pub(crate) struct TurretRegistry {
    entries: BTreeMap<TurretId, Turret>,
    next_turret_id: u32,
}

impl TurretRegistry {
    /// Constructs a turret and returns the identifier allocated to it.
    pub(crate) fn insert(
        &mut self,
        kind: TurretKind,
        tile: TileCoord,
        position: Vec2,
        tuning: &Tuning,
    ) -> TurretId {
        let id = TurretId::new(self.next_turret_id);
        self.next_turret_id = self.next_turret_id.wrapping_add(1);
        let _ = self
            .entries
            .insert(id, Turret::new(id, kind, tile, position, tuning));
        id
    }

    pub(crate) fn remove(&mut self, id: TurretId) -> Option<Turret> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: TurretId) -> Option<&Turret> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TurretId) -> Option<&mut Turret> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Turret> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Turret> {
        self.entries.values_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_turret_id = 0;
    }
}
