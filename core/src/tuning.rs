//! Immutable balance table injected into the world at construction time.
//!
//! Every field carries a default so adapters may deserialize partial
//! overrides. Distances are expressed in world units, durations in seconds
//! and angles in degrees.

use serde::Deserialize;
use thiserror::Error;

use crate::{EnemyKind, TurretKind, WeaponKind};

const TILE_SIZE: f32 = 40.0;
const DUO_RANGE: f32 = 3.0 * TILE_SIZE;
const RIPPLE_RANGE: f32 = 3.0 * TILE_SIZE;
const WAVE_RANGE: f32 = 3.0 * TILE_SIZE;
const SALVO_RANGE: f32 = 1.5 * WAVE_RANGE;
const UNBOUNDED_TRAVEL: f32 = 1024.0;

/// Complete set of balance constants consumed by the simulation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    /// Seed for the random stream driving projectile jitter.
    pub seed: u64,
    /// Tile grid dimensions.
    pub grid: GridTuning,
    /// Player lives, purse and refund policy.
    pub player: PlayerTuning,
    /// Campaign pacing and difficulty escalation.
    pub waves: WaveTuning,
    /// Slow status strengths and durations.
    pub status: StatusTuning,
    /// Area heal performed by healer enemies.
    pub healer: HealerTuning,
    /// Per-enemy statistics.
    pub enemies: EnemyTable,
    /// Per-turret statistics.
    pub turrets: TurretTable,
    /// Per-weapon statistics.
    pub weapons: WeaponTable,
    /// Timers of the instant and continuous beam turrets.
    pub beams: BeamTuning,
    /// Duty cycle of the area-slow aura.
    pub aura: AuraTuning,
    /// Fan geometry of the area-burst turret.
    pub burst: BurstTuning,
}

impl Tuning {
    /// Statistics for the provided enemy kind.
    #[must_use]
    pub fn enemy(&self, kind: EnemyKind) -> &EnemyTuning {
        match kind {
            EnemyKind::Flare => &self.enemies.flare,
            EnemyKind::Mono => &self.enemies.mono,
            EnemyKind::Crawler => &self.enemies.crawler,
            EnemyKind::Poly => &self.enemies.poly,
            EnemyKind::Locus => &self.enemies.locus,
            EnemyKind::Antumbra => &self.enemies.antumbra,
        }
    }

    /// Statistics for the provided turret kind.
    #[must_use]
    pub fn turret(&self, kind: TurretKind) -> &TurretTuning {
        match kind {
            TurretKind::Duo => &self.turrets.duo,
            TurretKind::Ripple => &self.turrets.ripple,
            TurretKind::Smite => &self.turrets.smite,
            TurretKind::Lancer => &self.turrets.lancer,
            TurretKind::Cyclone => &self.turrets.cyclone,
            TurretKind::Meltdown => &self.turrets.meltdown,
            TurretKind::Wave => &self.turrets.wave,
            TurretKind::Salvo => &self.turrets.salvo,
        }
    }

    /// Statistics for the provided weapon kind.
    #[must_use]
    pub fn weapon(&self, kind: WeaponKind) -> &WeaponTuning {
        match kind {
            WeaponKind::Bullet => &self.weapons.bullet,
            WeaponKind::Flame => &self.weapons.flame,
            WeaponKind::Shotgun => &self.weapons.shotgun,
            WeaponKind::Laser => &self.weapons.laser,
            WeaponKind::CycloneBeam => &self.weapons.cyclone_beam,
            WeaponKind::MeltdownBeam => &self.weapons.meltdown_beam,
            WeaponKind::IceStream => &self.weapons.ice_stream,
        }
    }

    /// Speed at which the turret's projectiles leave the muzzle.
    ///
    /// Beam and aura turrets report zero.
    #[must_use]
    pub fn muzzle_speed(&self, kind: TurretKind) -> f32 {
        match kind.weapon() {
            Some(weapon) if weapon.is_projectile() => self.weapon(weapon).speed,
            _ => 0.0,
        }
    }

    /// Checks that every value is usable by the simulation.
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.grid.columns < 2 || self.grid.rows < 3 {
            return Err(TuningError::GridTooSmall {
                columns: self.grid.columns,
                rows: self.grid.rows,
            });
        }
        at_least_one("grid.segment_spacing", self.grid.segment_spacing)?;
        if self.grid.vertical_runs() % 2 == 0 {
            return Err(TuningError::UnreachableExit {
                columns: self.grid.columns,
                segment_spacing: self.grid.segment_spacing,
            });
        }
        positive("grid.tile_size", self.grid.tile_size)?;
        fraction("player.refund_fraction", self.player.refund_fraction)?;
        at_least_one("waves.boss_wave_interval", self.waves.boss_wave_interval)?;
        non_negative("waves.health_step", self.waves.health_step)?;

        fraction("status.slow_multiplier", self.status.slow_multiplier)?;
        non_negative("status.slow_duration", self.status.slow_duration)?;
        fraction(
            "status.crawler_slow_multiplier",
            self.status.crawler_slow_multiplier,
        )?;
        non_negative(
            "status.crawler_slow_duration",
            self.status.crawler_slow_duration,
        )?;
        non_negative("healer.range", self.healer.range)?;
        non_negative("healer.amount", self.healer.amount)?;
        non_negative("healer.cooldown", self.healer.cooldown)?;

        for kind in EnemyKind::ALL {
            let enemy = self.enemy(kind);
            let field = |attribute: &str| format!("enemies.{}.{attribute}", kind.name());
            positive(&field("radius"), enemy.radius)?;
            positive(&field("speed"), enemy.speed)?;
            positive(&field("health"), enemy.health)?;
        }

        for kind in TurretKind::ALL {
            let turret = self.turret(kind);
            let field = |attribute: &str| format!("turrets.{}.{attribute}", kind.name());
            positive(&field("range"), turret.range)?;
            positive(&field("fire_rate"), turret.fire_rate)?;
            non_negative(&field("rotation_speed"), turret.rotation_speed)?;
            non_negative(&field("recoil"), turret.recoil)?;
            non_negative(&field("aim_tolerance"), turret.aim_tolerance)?;
        }

        for kind in WeaponKind::ALL {
            let weapon = self.weapon(kind);
            let field = |attribute: &str| format!("weapons.{}.{attribute}", kind.name());
            non_negative(&field("damage"), weapon.damage)?;
            non_negative(&field("spread"), weapon.spread)?;
            fraction(&field("speed_jitter"), weapon.speed_jitter)?;
            non_negative(&field("life_factor"), weapon.life_factor)?;
            non_negative(&field("spawn_delay"), weapon.spawn_delay)?;
            if kind.is_projectile() {
                positive(&field("speed"), weapon.speed)?;
                positive(&field("radius"), weapon.radius)?;
                positive(&field("max_range"), weapon.max_range)?;
                at_least_one(&field("pierce"), weapon.pierce)?;
            }
        }

        non_negative("beams.cyclone_duration", self.beams.cyclone_duration)?;
        non_negative("beams.cyclone_cooldown", self.beams.cyclone_cooldown)?;
        non_negative("beams.meltdown_duration", self.beams.meltdown_duration)?;
        non_negative("beams.meltdown_cooldown", self.beams.meltdown_cooldown)?;
        non_negative("beams.meltdown_dps", self.beams.meltdown_dps)?;
        non_negative("beams.meltdown_thickness", self.beams.meltdown_thickness)?;
        non_negative(
            "beams.meltdown_recoil_velocity",
            self.beams.meltdown_recoil_velocity,
        )?;
        positive("aura.active_duration", self.aura.active_duration)?;
        positive("aura.cooldown_duration", self.aura.cooldown_duration)?;
        if self.burst.rays < 2 {
            return Err(TuningError::TooFewRays {
                rays: self.burst.rays,
            });
        }
        non_negative("burst.spread", self.burst.spread)?;

        Ok(())
    }
}

/// Reasons a tuning table is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TuningError {
    /// A value was negative, infinite or not a number.
    #[error("`{field}` must be a finite, non-negative number (found {value})")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: String,
        /// Value found in the table.
        value: f32,
    },
    /// A value that must be strictly positive was zero.
    #[error("`{field}` must be strictly positive")]
    NotPositive {
        /// Dotted path of the offending field.
        field: String,
    },
    /// A fractional value fell outside `[0, 1]`.
    #[error("`{field}` must lie within [0, 1] (found {value})")]
    NotAFraction {
        /// Dotted path of the offending field.
        field: String,
        /// Value found in the table.
        value: f32,
    },
    /// The grid cannot hold a path between its entry and exit rows.
    #[error("a {columns}x{rows} grid is too small to lay out a path")]
    GridTooSmall {
        /// Configured number of columns.
        columns: u32,
        /// Configured number of rows.
        rows: u32,
    },
    /// The path's final vertical run would climb away from the exit row.
    #[error("{columns} columns with a segment spacing of {segment_spacing} end the path on an upward run")]
    UnreachableExit {
        /// Configured number of columns.
        columns: u32,
        /// Configured spacing between vertical runs.
        segment_spacing: u32,
    },
    /// The area-burst fan needs at least two rays to span its cone.
    #[error("the burst fan needs at least two rays (found {rays})")]
    TooFewRays {
        /// Configured ray count.
        rays: u32,
    },
}

fn non_negative(field: &str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::InvalidValue {
            field: field.to_owned(),
            value,
        })
    }
}

fn positive(field: &str, value: f32) -> Result<(), TuningError> {
    non_negative(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(TuningError::NotPositive {
            field: field.to_owned(),
        })
    }
}

fn at_least_one(field: &str, value: u32) -> Result<(), TuningError> {
    if value > 0 {
        Ok(())
    } else {
        Err(TuningError::NotPositive {
            field: field.to_owned(),
        })
    }
}

fn fraction(field: &str, value: f32) -> Result<(), TuningError> {
    non_negative(field, value)?;
    if value <= 1.0 {
        Ok(())
    } else {
        Err(TuningError::NotAFraction {
            field: field.to_owned(),
            value,
        })
    }
}

/// Tile grid dimensions and the spacing between vertical path runs.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridTuning {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Side length of a square tile in world units.
    pub tile_size: f32,
    /// Columns between consecutive vertical runs of the path.
    pub segment_spacing: u32,
}

impl GridTuning {
    /// Number of vertical runs the zig-zag path makes across the grid.
    #[must_use]
    pub fn vertical_runs(&self) -> u32 {
        if self.segment_spacing == 0 || self.columns < 2 {
            return 0;
        }
        (self.columns - 2) / self.segment_spacing + 1
    }
}

impl Default for GridTuning {
    fn default() -> Self {
        Self {
            columns: 21,
            rows: 14,
            tile_size: TILE_SIZE,
            segment_spacing: 3,
        }
    }
}

/// Player purse and life pool.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerTuning {
    /// Lives available before the session is lost.
    pub lives: u32,
    /// Currency available when the session starts.
    pub currency: u32,
    /// Share of a turret's cost returned when it is sold.
    pub refund_fraction: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            lives: 5,
            currency: 200,
            refund_fraction: 0.6,
        }
    }
}

/// Campaign pacing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaveTuning {
    /// Completed waves between stage increments.
    pub boss_wave_interval: u32,
    /// Health multiplier added to future spawns per stage.
    pub health_step: f32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            boss_wave_interval: 10,
            health_step: 1.0,
        }
    }
}

/// Strength and duration of the slow status.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusTuning {
    /// Speed multiplier applied to slowed enemies.
    pub slow_multiplier: f32,
    /// Seconds a slow lasts.
    pub slow_duration: f32,
    /// Speed multiplier applied to slowed crawlers.
    pub crawler_slow_multiplier: f32,
    /// Seconds a slow lasts on crawlers.
    pub crawler_slow_duration: f32,
}

impl Default for StatusTuning {
    fn default() -> Self {
        Self {
            slow_multiplier: 0.5,
            slow_duration: 5.0,
            crawler_slow_multiplier: 0.3,
            crawler_slow_duration: 2.0,
        }
    }
}

/// Area heal performed by healer enemies.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealerTuning {
    /// Radius of the heal in world units.
    pub range: f32,
    /// Health restored per pulse.
    pub amount: f32,
    /// Seconds between pulses.
    pub cooldown: f32,
}

impl Default for HealerTuning {
    fn default() -> Self {
        Self {
            range: 3.0 * TILE_SIZE,
            amount: 2.0,
            cooldown: 2.0,
        }
    }
}

/// Statistics shared by every enemy of a kind.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnemyTuning {
    /// Collision radius in world units.
    pub radius: f32,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Base health before the stage multiplier.
    pub health: f32,
    /// Currency awarded on a kill.
    pub reward: u32,
}

impl EnemyTuning {
    const fn new(radius: f32, speed: f32, health: f32, reward: u32) -> Self {
        Self {
            radius,
            speed,
            health,
            reward,
        }
    }
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self::new(12.0, 100.0, 10.0, 5)
    }
}

/// Enemy statistics keyed by kind.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnemyTable {
    /// Baseline walker.
    pub flare: EnemyTuning,
    /// Fast, fragile runner.
    pub mono: EnemyTuning,
    /// Runner that hides until slowed.
    pub crawler: EnemyTuning,
    /// Healer supporting nearby enemies.
    pub poly: EnemyTuning,
    /// Slow, durable tank.
    pub locus: EnemyTuning,
    /// Boss closing out the boss waves.
    pub antumbra: EnemyTuning,
}

impl Default for EnemyTable {
    fn default() -> Self {
        Self {
            flare: EnemyTuning::new(12.0, 100.0, 10.0, 5),
            mono: EnemyTuning::new(6.0, 200.0, 5.0, 3),
            crawler: EnemyTuning::new(6.0, 150.0, 5.0, 6),
            poly: EnemyTuning::new(8.0, 100.0, 5.0, 8),
            locus: EnemyTuning::new(16.0, 75.0, 20.0, 12),
            antumbra: EnemyTuning::new(28.0, 40.0, 300.0, 100),
        }
    }
}

/// Statistics shared by every turret of a kind.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TurretTuning {
    /// Purchase or upgrade cost.
    pub cost: u32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Shots per second for projectile turrets.
    pub fire_rate: f32,
    /// Maximum gun rotation per frame, in degrees.
    pub rotation_speed: f32,
    /// Peak recoil offset after a discharge.
    pub recoil: f32,
    /// Largest aim error, in degrees, at which the turret discharges.
    pub aim_tolerance: f32,
}

impl TurretTuning {
    const fn new(
        cost: u32,
        range: f32,
        fire_rate: f32,
        rotation_speed: f32,
        recoil: f32,
        aim_tolerance: f32,
    ) -> Self {
        Self {
            cost,
            range,
            fire_rate,
            rotation_speed,
            recoil,
            aim_tolerance,
        }
    }
}

impl Default for TurretTuning {
    fn default() -> Self {
        Self::new(50, DUO_RANGE, 4.0, 5.0, 4.0, 8.0)
    }
}

/// Turret statistics keyed by kind.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TurretTable {
    /// Basic single-shot turret.
    pub duo: TurretTuning,
    /// Flame stream turret.
    pub ripple: TurretTuning,
    /// Area-burst shotgun turret.
    pub smite: TurretTuning,
    /// Piercing laser turret.
    pub lancer: TurretTuning,
    /// Instant beam turret.
    pub cyclone: TurretTuning,
    /// Continuous beam turret.
    pub meltdown: TurretTuning,
    /// Area-slow aura turret.
    pub wave: TurretTuning,
    /// Ice stream turret.
    pub salvo: TurretTuning,
}

impl Default for TurretTable {
    fn default() -> Self {
        Self {
            duo: TurretTuning::new(50, DUO_RANGE, 4.0, 5.0, 4.0, 8.0),
            ripple: TurretTuning::new(150, RIPPLE_RANGE, 1000.0, 15.0, 10.0, 8.0),
            smite: TurretTuning::new(400, 5.0 * TILE_SIZE, 1.0, 15.0, 20.0, 8.0),
            lancer: TurretTuning::new(100, 6.0 * TILE_SIZE, 1.0, 2.5, 8.0, 8.0),
            cyclone: TurretTuning::new(300, 9.0 * TILE_SIZE, 1.0, 5.0, 5.0, 5.0),
            meltdown: TurretTuning::new(600, 5.0 * TILE_SIZE, 1.0, 8.0, 10.0, 10.0),
            wave: TurretTuning::new(120, WAVE_RANGE, 1.0, 0.0, 0.0, 0.0),
            salvo: TurretTuning::new(350, SALVO_RANGE, 1000.0, 15.0, 5.0, 8.0),
        }
    }
}

/// Statistics of a weapon and of the projectiles it launches.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeaponTuning {
    /// Base damage per hit.
    pub damage: f32,
    /// Nominal projectile speed in world units per second.
    pub speed: f32,
    /// Projectile collision radius.
    pub radius: f32,
    /// Distinct enemies a projectile may hit.
    pub pierce: u32,
    /// Travel distance from the muzzle after which the projectile expires.
    pub max_range: f32,
    /// Half-angle of the random launch cone, in degrees.
    pub spread: f32,
    /// Relative speed randomisation applied at launch.
    pub speed_jitter: f32,
    /// Stream life expressed as multiples of `max_range / speed`.
    pub life_factor: f32,
    /// Seconds the projectile lingers at the muzzle before flying.
    pub spawn_delay: f32,
}

impl WeaponTuning {
    const fn bullet(damage: f32, speed: f32, radius: f32, pierce: u32) -> Self {
        Self {
            damage,
            speed,
            radius,
            pierce,
            max_range: UNBOUNDED_TRAVEL,
            spread: 0.0,
            speed_jitter: 0.0,
            life_factor: 0.0,
            spawn_delay: 0.0,
        }
    }

    const fn stream(damage: f32, speed: f32, max_range: f32, spread: f32, life: f32) -> Self {
        Self {
            damage,
            speed,
            radius: 5.0,
            pierce: 1,
            max_range,
            spread,
            speed_jitter: 0.1,
            life_factor: life,
            spawn_delay: 0.0,
        }
    }

    const fn beam(damage: f32) -> Self {
        Self {
            damage,
            speed: 0.0,
            radius: 0.0,
            pierce: 0,
            max_range: 0.0,
            spread: 0.0,
            speed_jitter: 0.0,
            life_factor: 0.0,
            spawn_delay: 0.0,
        }
    }
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self::bullet(5.0, 400.0, 3.0, 1)
    }
}

/// Weapon statistics keyed by kind.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeaponTable {
    /// Single-shot bullet.
    pub bullet: WeaponTuning,
    /// Decaying flame stream.
    pub flame: WeaponTuning,
    /// Area-burst pellet.
    pub shotgun: WeaponTuning,
    /// Piercing laser bolt.
    pub laser: WeaponTuning,
    /// Instant beam discharge.
    pub cyclone_beam: WeaponTuning,
    /// Continuous beam; damage comes from `beams.meltdown_dps`.
    pub meltdown_beam: WeaponTuning,
    /// Decaying ice stream that slows.
    pub ice_stream: WeaponTuning,
}

impl Default for WeaponTable {
    fn default() -> Self {
        let mut laser = WeaponTuning::bullet(10.0, 1000.0, 1.5, 2);
        laser.spawn_delay = 0.04;

        Self {
            bullet: WeaponTuning::bullet(5.0, 400.0, 3.0, 1),
            flame: WeaponTuning::stream(0.5, 200.0, RIPPLE_RANGE, 10.0, 3.0),
            shotgun: WeaponTuning::bullet(5.0, 400.0, 3.0, 5),
            laser,
            cyclone_beam: WeaponTuning::beam(10.0),
            meltdown_beam: WeaponTuning::beam(0.0),
            ice_stream: WeaponTuning::stream(0.1, 300.0, SALVO_RANGE, 5.0, 2.0),
        }
    }
}

/// Timers of the beam turrets.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BeamTuning {
    /// Seconds an instant beam stays visible after discharging.
    pub cyclone_duration: f32,
    /// Seconds between instant beam discharges.
    pub cyclone_cooldown: f32,
    /// Enemies a single instant beam may damage.
    pub cyclone_max_pierce: u32,
    /// Longest uninterrupted continuous beam, in seconds.
    pub meltdown_duration: f32,
    /// Seconds the continuous beam rests after switching off.
    pub meltdown_cooldown: f32,
    /// Damage per second dealt by the continuous beam.
    pub meltdown_dps: f32,
    /// Width of the continuous beam.
    pub meltdown_thickness: f32,
    /// Recoil growth per second while the continuous beam fires.
    pub meltdown_recoil_velocity: f32,
}

impl Default for BeamTuning {
    fn default() -> Self {
        Self {
            cyclone_duration: 0.08,
            cyclone_cooldown: 0.6,
            cyclone_max_pierce: 3,
            meltdown_duration: 5.0,
            meltdown_cooldown: 2.0,
            meltdown_dps: 20.0,
            meltdown_thickness: 10.0,
            meltdown_recoil_velocity: 100.0,
        }
    }
}

/// Duty cycle of the area-slow aura.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuraTuning {
    /// Seconds the aura slows enemies.
    pub active_duration: f32,
    /// Seconds the aura rests between activations.
    pub cooldown_duration: f32,
}

impl Default for AuraTuning {
    fn default() -> Self {
        Self {
            active_duration: 15.0,
            cooldown_duration: 5.0,
        }
    }
}

/// Fan geometry of the area-burst turret.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BurstTuning {
    /// Rays released per trigger.
    pub rays: u32,
    /// Full opening angle of the fan, in degrees.
    pub spread: f32,
}

impl Default for BurstTuning {
    fn default() -> Self {
        Self {
            rays: 10,
            spread: 30.0,
        }
    }
}
