#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Castle Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what actually happened. Systems read immutable snapshot views
//! and respond exclusively with new command batches, so the world remains the
//! only owner of enemies, turrets and projectiles.

pub mod geometry;
pub mod tuning;

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use tuning::{Tuning, TuningError};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances every entity's own timers, statuses and motion.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Queues a new enemy at the path entry; it joins the field at `EndFrame`.
    SpawnEnemy {
        /// Kind of enemy to create.
        kind: EnemyKind,
        /// Multiplier applied to the kind's base health.
        health_multiplier: f32,
    },
    /// Requests construction of a turret on a buildable tile.
    PlaceTurret {
        /// Kind of turret to construct.
        kind: TurretKind,
        /// Tile that will host the turret.
        tile: TileCoord,
    },
    /// Requests that a turret be sold for a partial refund.
    SellTurret {
        /// Identifier of the turret to sell.
        turret: TurretId,
    },
    /// Requests that a turret be replaced by the next tier of its chain.
    UpgradeTurret {
        /// Identifier of the turret to upgrade.
        turret: TurretId,
    },
    /// Rotates a turret's gun to the provided heading.
    AimTurret {
        /// Identifier of the turret being aimed.
        turret: TurretId,
        /// New gun heading in degrees.
        rotation: f32,
    },
    /// Launches a projectile and restarts the turret's fire cooldown.
    FireProjectile {
        /// Turret discharging the projectile.
        turret: TurretId,
        /// Weapon describing the projectile's behaviour.
        weapon: WeaponKind,
        /// Muzzle position the projectile starts from.
        origin: Vec2,
        /// Point the projectile is launched toward.
        aim: Vec2,
    },
    /// Starts an instant beam's visible window and its cooldown cycle.
    DischargeBeam {
        /// Turret discharging the beam.
        turret: TurretId,
        /// Far end of the drawn beam.
        end: Vec2,
    },
    /// Keeps a continuous beam active for another frame.
    SustainBeam {
        /// Turret sustaining the beam.
        turret: TurretId,
        /// Far end of the drawn beam.
        end: Vec2,
    },
    /// Switches a continuous beam off and starts its cooldown.
    EndBeam {
        /// Turret whose beam is released.
        turret: TurretId,
    },
    /// Applies damage to an enemy.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Amount and provenance of the damage.
        damage: Damage,
    },
    /// Applies the slow status to an enemy that carries no status yet.
    SlowEnemy {
        /// Enemy to slow.
        enemy: EnemyId,
    },
    /// Restores health to a wounded enemy.
    HealEnemy {
        /// Enemy receiving the heal.
        enemy: EnemyId,
        /// Health restored before clamping to the maximum.
        amount: f32,
    },
    /// Restarts the cooldown of an enemy's special ability.
    ResetAbility {
        /// Enemy whose ability was used.
        enemy: EnemyId,
    },
    /// Points an enemy toward a waypoint of the path.
    SteerEnemy {
        /// Enemy being steered.
        enemy: EnemyId,
        /// Index of the waypoint the enemy now travels toward.
        waypoint: usize,
        /// Velocity the enemy adopts.
        velocity: Vec2,
    },
    /// Records the first frame of overlap between a projectile and an enemy.
    ResolveContact {
        /// Projectile involved in the overlap.
        projectile: ProjectileId,
        /// Enemy involved in the overlap.
        enemy: EnemyId,
    },
    /// Records that a projectile and an enemy no longer overlap.
    ReleaseContact {
        /// Projectile leaving the overlap.
        projectile: ProjectileId,
        /// Enemy leaving the overlap.
        enemy: EnemyId,
    },
    /// Merges queued spawns and removes every inactive entity.
    EndFrame,
}

/// Damage delivered to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Damage {
    /// Base weapon damage scaled by a falloff multiplier clamped into `[0, 1]`.
    Weapon {
        /// Weapon whose base damage applies.
        weapon: WeaponKind,
        /// Multiplier applied to the base damage.
        falloff: f32,
    },
    /// A precomputed amount, as dealt by continuous beams.
    Direct {
        /// Weapon credited with the damage.
        weapon: WeaponKind,
        /// Health removed before clamping.
        amount: f32,
    },
}

impl Damage {
    /// Weapon credited with the damage.
    #[must_use]
    pub const fn weapon(&self) -> WeaponKind {
        match self {
            Self::Weapon { weapon, .. } | Self::Direct { weapon, .. } => *weapon,
        }
    }
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy was queued at the path entry.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of enemy created.
        kind: EnemyKind,
        /// Maximum health after the stage multiplier.
        max_health: f32,
    },
    /// Reports that an enemy lost health.
    EnemyDamaged {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Weapon credited with the damage.
        weapon: WeaponKind,
        /// Health actually removed.
        amount: f32,
    },
    /// Reports that an enemy regained health.
    EnemyHealed {
        /// Enemy that was healed.
        enemy: EnemyId,
        /// Health actually restored.
        amount: f32,
    },
    /// Reports an enemy destroyed by damage; presentation layers play the death effect.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Kind of the enemy that died.
        kind: EnemyKind,
        /// Weapon that landed the killing blow.
        weapon: WeaponKind,
        /// Position at the moment of death.
        position: Vec2,
        /// Currency awarded to the player.
        reward: u32,
    },
    /// Reports an enemy that crossed the exit boundary.
    EnemyLeaked {
        /// Enemy that escaped.
        enemy: EnemyId,
        /// Kind of the enemy that escaped.
        kind: EnemyKind,
        /// Lives left after the leak.
        lives_remaining: u32,
    },
    /// Reports an enemy removed without reward or penalty.
    EnemyDespawned {
        /// Enemy that was removed.
        enemy: EnemyId,
        /// Kind of the enemy that was removed.
        kind: EnemyKind,
    },
    /// Announces that the player ran out of lives.
    PlayerDefeated,
    /// Confirms that a turret was constructed.
    TurretPlaced {
        /// Identifier assigned to the turret.
        turret: TurretId,
        /// Kind of turret constructed.
        kind: TurretKind,
        /// Tile hosting the turret.
        tile: TileCoord,
        /// Currency spent.
        cost: u32,
    },
    /// Reports that a placement request was rejected.
    TurretPlacementRejected {
        /// Kind of turret requested.
        kind: TurretKind,
        /// Tile provided in the request.
        tile: TileCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a turret was sold.
    TurretSold {
        /// Identifier of the sold turret.
        turret: TurretId,
        /// Kind of the sold turret.
        kind: TurretKind,
        /// Tile freed by the sale.
        tile: TileCoord,
        /// Currency returned to the player.
        refund: u32,
    },
    /// Reports that a sale request was rejected.
    TurretSaleRejected {
        /// Identifier provided in the request.
        turret: TurretId,
        /// Specific reason the sale failed.
        reason: SaleError,
    },
    /// Confirms that a turret was replaced by its next tier.
    TurretUpgraded {
        /// Identifier of the replaced turret.
        previous: TurretId,
        /// Identifier of the new turret.
        turret: TurretId,
        /// Kind of the new turret.
        kind: TurretKind,
        /// Tile hosting both turrets.
        tile: TileCoord,
        /// Currency spent.
        cost: u32,
    },
    /// Reports that an upgrade request was rejected.
    TurretUpgradeRejected {
        /// Identifier provided in the request.
        turret: TurretId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a projectile was launched; it joins the field at `EndFrame`.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Turret that fired it.
        turret: TurretId,
        /// Weapon describing its behaviour.
        weapon: WeaponKind,
    },
    /// Reports a projectile destroyed after exhausting its pierce count.
    ProjectileSpent {
        /// Identifier of the projectile.
        projectile: ProjectileId,
    },
    /// Reports a projectile destroyed after travelling past its range.
    ProjectileExpired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
    },
    /// Reports that an instant beam was discharged.
    BeamDischarged {
        /// Turret that discharged.
        turret: TurretId,
        /// Far end of the beam.
        end: Vec2,
    },
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a turret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TurretId(u32);

impl TurretId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a tile within the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Role a tile plays in the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Part of the route enemies walk.
    Path,
    /// Free ground that may host a turret.
    Buildable,
    /// Decorative ground that hosts nothing.
    Other,
}

/// Enemy archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline walker.
    Flare,
    /// Fast, fragile runner.
    Mono,
    /// Runner that stays hidden unless slowed.
    Crawler,
    /// Healer restoring health to nearby enemies.
    Poly,
    /// Slow, durable tank.
    Locus,
    /// Boss.
    Antumbra,
}

impl EnemyKind {
    /// Every enemy kind in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Flare,
        Self::Mono,
        Self::Crawler,
        Self::Poly,
        Self::Locus,
        Self::Antumbra,
    ];

    /// Stable lowercase name used in configuration files and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Flare => "flare",
            Self::Mono => "mono",
            Self::Crawler => "crawler",
            Self::Poly => "poly",
            Self::Locus => "locus",
            Self::Antumbra => "antumbra",
        }
    }

    /// Parses a name produced by [`EnemyKind::name`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Reports whether a freshly spawned enemy can be targeted.
    #[must_use]
    pub const fn starts_visible(self) -> bool {
        !matches!(self, Self::Crawler)
    }

    /// Reports whether the enemy periodically heals its neighbours.
    #[must_use]
    pub const fn is_healer(self) -> bool {
        matches!(self, Self::Poly)
    }
}

/// Turret archetypes, grouped into three upgrade chains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TurretKind {
    /// First tier of the projectile chain.
    Duo,
    /// Second tier of the projectile chain; sprays flame.
    Ripple,
    /// Final tier of the projectile chain; fires a pellet fan.
    Smite,
    /// First tier of the laser chain.
    Lancer,
    /// Second tier of the laser chain; instant beam.
    Cyclone,
    /// Final tier of the laser chain; continuous beam.
    Meltdown,
    /// First tier of the status chain; slowing aura.
    Wave,
    /// Final tier of the status chain; sprays ice.
    Salvo,
}

impl TurretKind {
    /// Every turret kind in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Duo,
        Self::Ripple,
        Self::Smite,
        Self::Lancer,
        Self::Cyclone,
        Self::Meltdown,
        Self::Wave,
        Self::Salvo,
    ];

    /// Stable lowercase name used in configuration files and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Duo => "duo",
            Self::Ripple => "ripple",
            Self::Smite => "smite",
            Self::Lancer => "lancer",
            Self::Cyclone => "cyclone",
            Self::Meltdown => "meltdown",
            Self::Wave => "wave",
            Self::Salvo => "salvo",
        }
    }

    /// Parses a name produced by [`TurretKind::name`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Reports whether the kind may be placed directly on an empty tile.
    ///
    /// Higher tiers are only reachable through upgrades.
    #[must_use]
    pub const fn is_buildable(self) -> bool {
        matches!(self, Self::Duo | Self::Lancer | Self::Wave)
    }

    /// Next tier in the kind's upgrade chain, if any.
    #[must_use]
    pub const fn upgrade(self) -> Option<Self> {
        match self {
            Self::Duo => Some(Self::Ripple),
            Self::Ripple => Some(Self::Smite),
            Self::Lancer => Some(Self::Cyclone),
            Self::Cyclone => Some(Self::Meltdown),
            Self::Wave => Some(Self::Salvo),
            Self::Smite | Self::Meltdown | Self::Salvo => None,
        }
    }

    /// Firing routine used by the kind.
    #[must_use]
    pub const fn behavior(self) -> FiringBehavior {
        match self {
            Self::Duo => FiringBehavior::Basic,
            Self::Ripple | Self::Salvo => FiringBehavior::DecayingStream,
            Self::Smite => FiringBehavior::AreaBurst,
            Self::Lancer => FiringBehavior::PiercingLaser,
            Self::Cyclone => FiringBehavior::InstantBeam,
            Self::Meltdown => FiringBehavior::ContinuousBeam,
            Self::Wave => FiringBehavior::AreaSlowAura,
        }
    }

    /// Weapon discharged by the kind; the aura has none.
    #[must_use]
    pub const fn weapon(self) -> Option<WeaponKind> {
        match self {
            Self::Duo => Some(WeaponKind::Bullet),
            Self::Ripple => Some(WeaponKind::Flame),
            Self::Smite => Some(WeaponKind::Shotgun),
            Self::Lancer => Some(WeaponKind::Laser),
            Self::Cyclone => Some(WeaponKind::CycloneBeam),
            Self::Meltdown => Some(WeaponKind::MeltdownBeam),
            Self::Salvo => Some(WeaponKind::IceStream),
            Self::Wave => None,
        }
    }

    /// Reports whether the kind engages hidden enemies.
    ///
    /// Such turrets skip enemies that are already slowed instead.
    #[must_use]
    pub const fn targets_hidden(self) -> bool {
        matches!(self, Self::Salvo)
    }
}

/// Firing routines shared by turret kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiringBehavior {
    /// One bullet at the aim point.
    Basic,
    /// A fan of piercing pellets across a fixed cone.
    AreaBurst,
    /// One piercing laser bolt.
    PiercingLaser,
    /// One jittered stream droplet.
    DecayingStream,
    /// Instantaneous piercing line to maximum range.
    InstantBeam,
    /// Damage-over-time line maintained while a target remains.
    ContinuousBeam,
    /// Periodic slowing field around the turret.
    AreaSlowAura,
}

/// Weapons and the projectiles they launch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Single-shot bullet.
    Bullet,
    /// Flame droplet.
    Flame,
    /// Area-burst pellet.
    Shotgun,
    /// Piercing laser bolt.
    Laser,
    /// Instant beam discharge.
    CycloneBeam,
    /// Continuous beam.
    MeltdownBeam,
    /// Ice droplet that slows.
    IceStream,
}

impl WeaponKind {
    /// Every weapon kind in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Bullet,
        Self::Flame,
        Self::Shotgun,
        Self::Laser,
        Self::CycloneBeam,
        Self::MeltdownBeam,
        Self::IceStream,
    ];

    /// Stable lowercase name used in configuration files and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bullet => "bullet",
            Self::Flame => "flame",
            Self::Shotgun => "shotgun",
            Self::Laser => "laser",
            Self::CycloneBeam => "cyclone_beam",
            Self::MeltdownBeam => "meltdown_beam",
            Self::IceStream => "ice_stream",
        }
    }

    /// Reports whether the weapon launches a travelling projectile.
    #[must_use]
    pub const fn is_projectile(self) -> bool {
        !matches!(self, Self::CycloneBeam | Self::MeltdownBeam)
    }

    /// Motion profile of the projectiles launched by the weapon.
    #[must_use]
    pub const fn motion(self) -> ProjectileMotion {
        match self {
            Self::Laser => ProjectileMotion::DelayedSpawn,
            Self::Flame | Self::IceStream => ProjectileMotion::DecayingStream,
            _ => ProjectileMotion::Instant,
        }
    }

    /// Reports whether a hit from the weapon slows its target.
    #[must_use]
    pub const fn applies_slow(self) -> bool {
        matches!(self, Self::IceStream)
    }
}

/// Motion profiles of projectiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileMotion {
    /// Travels in a straight line from the moment it is fired.
    Instant,
    /// Lingers at the muzzle for a short spawn window before flying.
    DelayedSpawn,
    /// Launches with randomised speed and heading and fades over its life.
    DecayingStream,
}

/// Timed modifiers carried by enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusEffect {
    /// No modifier.
    None,
    /// Movement speed reduced.
    Slowed,
    /// Reserved; carries no behaviour.
    Burning,
    /// Reserved; carries no behaviour.
    Stunned,
}

/// Phases of the wave director.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WavePhase {
    /// Idle until the player starts the next wave.
    WaitingForPlayer,
    /// Working through the current wave script.
    Spawning,
    /// Script exhausted; waiting for the field to clear.
    WaveInProgress,
    /// Every scripted wave has been cleared.
    Finished,
}

/// Wave progress published for presentation layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveStatus {
    /// Current phase of the director.
    pub phase: WavePhase,
    /// One-based number of the current wave; stays on the last wave once finished.
    pub wave_number: u32,
    /// Number of scripted waves.
    pub total_waves: u32,
    /// Current difficulty stage, starting at one.
    pub stage: u32,
    /// Waves left until the next boss wave completes.
    pub waves_until_boss: u32,
    /// Health multiplier applied to new spawns.
    pub health_multiplier: f32,
}

/// Cumulative statistics for a session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatsReport {
    /// Kills tallied per enemy kind.
    pub kills_by_kind: BTreeMap<EnemyKind, u32>,
    /// Enemies that reached the exit.
    pub leaks: u32,
    /// Currency spent on placements and upgrades.
    pub currency_spent: u64,
    /// Health removed from enemies by every weapon.
    pub damage_dealt: f64,
}

impl StatsReport {
    /// Total kills across every enemy kind.
    #[must_use]
    pub fn total_kills(&self) -> u32 {
        self.kills_by_kind.values().sum()
    }
}

/// Immutable representation of a single enemy's state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier allocated to the enemy.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Centre of the enemy in world units.
    pub position: Vec2,
    /// Current velocity in world units per second.
    pub velocity: Vec2,
    /// Collision radius.
    pub radius: f32,
    /// Current travel speed after status modifiers.
    pub speed: f32,
    /// Remaining health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Index of the waypoint the enemy is travelling toward.
    pub waypoint: usize,
    /// Active status modifier.
    pub status: StatusEffect,
    /// Whether turrets may target the enemy.
    pub visible: bool,
    /// Whether the enemy's special ability is off cooldown.
    pub ability_ready: bool,
    /// Whether the enemy took damage during the current frame.
    pub damaged: bool,
    /// Whether the enemy was healed during the current frame.
    pub healed: bool,
}

/// Read-only snapshot describing every active enemy.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a view from the provided snapshots, sorted by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a snapshot by identifier.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Phase-specific state of a turret.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TurretPhase {
    /// Projectile turret; `ready_in` counts down to the next shot.
    Gun {
        /// Seconds until the turret may fire again.
        ready_in: f32,
    },
    /// Beam turret.
    Beam {
        /// Whether the beam is currently drawn.
        active: bool,
        /// Far end of the most recent beam.
        end: Vec2,
        /// Seconds the beam stays drawn.
        remaining: f32,
        /// Seconds until the beam may discharge again.
        cooldown: f32,
    },
    /// Area-slow aura.
    Aura {
        /// Whether the aura is slowing enemies.
        active: bool,
        /// Seconds left in the current window.
        remaining: f32,
    },
}

/// Immutable representation of a single turret's state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretSnapshot {
    /// Identifier allocated to the turret.
    pub id: TurretId,
    /// Kind of the turret.
    pub kind: TurretKind,
    /// Tile hosting the turret.
    pub tile: TileCoord,
    /// Centre of the turret in world units.
    pub position: Vec2,
    /// Targeting radius.
    pub range: f32,
    /// Gun heading in degrees, normalised into `[0, 360)`.
    pub rotation: f32,
    /// Cosmetic recoil offset.
    pub recoil: f32,
    /// Phase-specific state.
    pub phase: TurretPhase,
}

impl TurretSnapshot {
    /// Reports whether a projectile turret may fire this frame.
    #[must_use]
    pub fn fire_ready(&self) -> bool {
        matches!(self.phase, TurretPhase::Gun { ready_in } if ready_in <= 0.0)
    }
}

/// Read-only snapshot describing every turret.
#[derive(Clone, Debug, Default)]
pub struct TurretView {
    snapshots: Vec<TurretSnapshot>,
}

impl TurretView {
    /// Creates a view from the provided snapshots, sorted by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TurretSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured turret snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TurretSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a snapshot by identifier.
    #[must_use]
    pub fn get(&self, id: TurretId) -> Option<&TurretSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured turrets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no turrets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TurretSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile's state.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Turret that fired the projectile.
    pub turret: TurretId,
    /// Weapon describing the projectile.
    pub weapon: WeaponKind,
    /// Centre of the projectile.
    pub position: Vec2,
    /// Current velocity.
    pub velocity: Vec2,
    /// Collision radius.
    pub radius: f32,
    /// Distinct enemies the projectile may still hit.
    pub pierce: u32,
    /// Enemies the projectile currently overlaps, sorted by identifier.
    pub contacts: Vec<EnemyId>,
    /// Fraction of a stream droplet's life left, or one for other weapons.
    pub life_fraction: f32,
    /// Progress through a laser's spawn window, or one once flying.
    pub spawn_progress: f32,
}

/// Read-only snapshot describing every active projectile.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a view from the provided snapshots, sorted by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no projectiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Target assignment produced by the targeting system for one turret.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretTarget {
    /// Turret that acquired the target.
    pub turret: TurretId,
    /// Enemy selected as the target.
    pub enemy: EnemyId,
    /// Point the turret should aim at.
    pub aim: Vec2,
    /// Squared distance between turret and enemy.
    pub distance_sq: f32,
}

/// Reasons a turret placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The tile lies outside the grid.
    #[error("tile lies outside the grid")]
    OutOfBounds,
    /// The tile is part of the path or otherwise unbuildable.
    #[error("tile cannot host a turret")]
    NotBuildable,
    /// The tile already hosts a turret.
    #[error("tile is occupied by another turret")]
    Occupied,
    /// The kind can only be obtained through an upgrade.
    #[error("turret kind is only reachable through an upgrade")]
    RequiresUpgrade,
    /// The player cannot afford the turret.
    #[error("insufficient funds")]
    InsufficientFunds,
}

/// Reasons a sale request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum SaleError {
    /// No turret with the provided identifier exists.
    #[error("no such turret")]
    MissingTurret,
}

/// Reasons an upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UpgradeError {
    /// No turret with the provided identifier exists.
    #[error("no such turret")]
    MissingTurret,
    /// The turret is already the last tier of its chain.
    #[error("turret is already at its final tier")]
    MaxTier,
    /// The player cannot afford the next tier.
    #[error("insufficient funds")]
    InsufficientFunds,
}

/// Reasons a request to start the next wave may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum WaveStartError {
    /// A wave is still spawning or in progress.
    #[error("the current wave has not been cleared")]
    NotWaiting,
    /// Every scripted wave has been cleared.
    #[error("the campaign is finished")]
    Finished,
}
