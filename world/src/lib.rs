#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Castle Defence.
//!
//! The world owns the tile map, every enemy, turret and projectile, and the
//! player's purse and lives. It only changes in response to [`Command`]
//! values passed to [`apply`], and reports every change as an [`Event`].
//! Enemies and projectiles created during a frame are buffered and only join
//! the field, together with the removal of inactive entities, when
//! [`Command::EndFrame`] is applied.

mod enemies;
mod entity;
mod map;
mod projectiles;
mod turrets;

use castle_defence_core::{
    geometry, Command, Damage, EnemyId, EnemyKind, Event, PlacementError, ProjectileId, SaleError,
    TileCoord, TileKind, TurretId, TurretKind, Tuning, TuningError, UpgradeError,
};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    enemies::{Enemy, TickOutcome},
    entity::{Arena, Lifecycle},
    map::Map,
    projectiles::Projectile,
    turrets::TurretRegistry,
};

pub use map::TileInfo;

/// Represents the authoritative Castle Defence world state.
#[derive(Debug)]
pub struct World {
    tuning: Tuning,
    map: Map,
    enemies: Arena<Enemy>,
    turrets: TurretRegistry,
    projectiles: Arena<Projectile>,
    lives: u32,
    currency: u32,
    defeated: bool,
    next_enemy_id: u32,
    next_projectile_id: u32,
    rng: ChaCha8Rng,
    tick_index: u64,
}

impl World {
    /// Creates a new world using the default balance table.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_tuning(Tuning::default())
    }

    /// Creates a new world using the provided balance table.
    pub fn with_tuning(tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::from_valid_tuning(tuning))
    }

    fn from_valid_tuning(tuning: Tuning) -> Self {
        Self {
            map: Map::generate(&tuning.grid),
            enemies: Arena::default(),
            turrets: TurretRegistry::default(),
            projectiles: Arena::default(),
            lives: tuning.player.lives,
            currency: tuning.player.currency,
            defeated: false,
            next_enemy_id: 0,
            next_projectile_id: 0,
            rng: ChaCha8Rng::seed_from_u64(tuning.seed),
            tick_index: 0,
            tuning,
        }
    }

    /// Restores the state the world had right after construction.
    pub fn reset(&mut self) {
        self.map.clear_occupants();
        self.enemies.clear();
        self.turrets.clear();
        self.projectiles.clear();
        self.lives = self.tuning.player.lives;
        self.currency = self.tuning.player.currency;
        self.defeated = false;
        self.next_enemy_id = 0;
        self.next_projectile_id = 0;
        self.rng = ChaCha8Rng::seed_from_u64(self.tuning.seed);
        self.tick_index = 0;
    }

    fn check_placement(&self, kind: TurretKind, tile: TileCoord) -> Result<(), PlacementError> {
        let Some(info) = self.map.tile(tile) else {
            return Err(PlacementError::OutOfBounds);
        };
        if !kind.is_buildable() {
            return Err(PlacementError::RequiresUpgrade);
        }
        if info.kind != TileKind::Buildable {
            return Err(PlacementError::NotBuildable);
        }
        if info.occupant.is_some() {
            return Err(PlacementError::Occupied);
        }
        if self.currency < self.tuning.turret(kind).cost {
            return Err(PlacementError::InsufficientFunds);
        }
        Ok(())
    }

    fn advance(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let width = self.map.width();
        let height = self.map.height();

        for enemy in self.enemies.iter_active_mut() {
            enemy.begin_frame();
            match enemy.tick(dt, &self.tuning.status, width, height) {
                TickOutcome::Moving => {}
                TickOutcome::Leaked => {
                    self.lives = self.lives.saturating_sub(1);
                    debug!(
                        "enemy {} ({}) leaked, {} lives left",
                        enemy.id().get(),
                        enemy.kind().name(),
                        self.lives
                    );
                    out_events.push(Event::EnemyLeaked {
                        enemy: enemy.id(),
                        kind: enemy.kind(),
                        lives_remaining: self.lives,
                    });
                }
                TickOutcome::Strayed => {
                    warn!(
                        "despawning enemy {} ({}) at non-finite or out-of-bounds position {:?}",
                        enemy.id().get(),
                        enemy.kind().name(),
                        enemy.position()
                    );
                    out_events.push(Event::EnemyDespawned {
                        enemy: enemy.id(),
                        kind: enemy.kind(),
                    });
                }
            }
        }

        if self.lives == 0 && !self.defeated {
            self.defeat(out_events);
        }

        for turret in self.turrets.iter_mut() {
            turret.tick(dt, &self.tuning);
        }

        for projectile in self.projectiles.iter_active_mut() {
            if projectile.tick(dt) {
                out_events.push(Event::ProjectileExpired {
                    projectile: projectile.id(),
                });
            }
        }
    }

    fn defeat(&mut self, out_events: &mut Vec<Event>) {
        self.defeated = true;
        info!("player defeated on tick {}", self.tick_index);
        out_events.push(Event::PlayerDefeated);

        for enemy in self.enemies.iter_active_mut() {
            enemy.despawn();
            out_events.push(Event::EnemyDespawned {
                enemy: enemy.id(),
                kind: enemy.kind(),
            });
        }
        for enemy in self.enemies.discard_pending() {
            out_events.push(Event::EnemyDespawned {
                enemy: enemy.id(),
                kind: enemy.kind(),
            });
        }
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, health_multiplier: f32, out_events: &mut Vec<Event>) {
        if self.defeated {
            debug!("ignoring {} spawn after defeat", kind.name());
            return;
        }

        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        let start = self.map.start();
        let first_target = self
            .map
            .steering_targets()
            .first()
            .copied()
            .unwrap_or(start);
        let enemy = Enemy::spawn(id, kind, &self.tuning, health_multiplier, start, first_target);
        let max_health = enemy.max_health();
        self.enemies.queue(enemy);

        debug!(
            "spawned enemy {} ({}) with {max_health} health",
            id.get(),
            kind.name()
        );
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            max_health,
        });
    }

    fn place_turret(&mut self, kind: TurretKind, tile: TileCoord, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.check_placement(kind, tile) {
            out_events.push(Event::TurretPlacementRejected { kind, tile, reason });
            return;
        }

        let cost = self.tuning.turret(kind).cost;
        self.currency -= cost;
        let position = self.map.tile_center(tile);
        let turret = self.turrets.insert(kind, tile, position, &self.tuning);
        if let Some(slot) = self.map.tile_mut(tile) {
            slot.occupant = Some(turret);
        }

        debug!(
            "placed turret {} ({}) at {},{}",
            turret.get(),
            kind.name(),
            tile.column(),
            tile.row()
        );
        out_events.push(Event::TurretPlaced {
            turret,
            kind,
            tile,
            cost,
        });
    }

    fn sell_turret(&mut self, turret: TurretId, out_events: &mut Vec<Event>) {
        let Some(removed) = self.turrets.remove(turret) else {
            out_events.push(Event::TurretSaleRejected {
                turret,
                reason: SaleError::MissingTurret,
            });
            return;
        };

        let kind = removed.kind();
        let tile = removed.tile();
        let refund =
            (self.tuning.turret(kind).cost as f32 * self.tuning.player.refund_fraction).floor() as u32;
        self.currency = self.currency.saturating_add(refund);
        if let Some(slot) = self.map.tile_mut(tile) {
            slot.occupant = None;
        }

        out_events.push(Event::TurretSold {
            turret,
            kind,
            tile,
            refund,
        });
    }

    fn upgrade_turret(&mut self, previous: TurretId, out_events: &mut Vec<Event>) {
        let Some(existing) = self.turrets.get(previous) else {
            out_events.push(Event::TurretUpgradeRejected {
                turret: previous,
                reason: UpgradeError::MissingTurret,
            });
            return;
        };

        let Some(kind) = existing.kind().upgrade() else {
            out_events.push(Event::TurretUpgradeRejected {
                turret: previous,
                reason: UpgradeError::MaxTier,
            });
            return;
        };

        let cost = self.tuning.turret(kind).cost;
        if self.currency < cost {
            out_events.push(Event::TurretUpgradeRejected {
                turret: previous,
                reason: UpgradeError::InsufficientFunds,
            });
            return;
        }

        let tile = existing.tile();
        let _ = self.turrets.remove(previous);
        self.currency -= cost;
        let position = self.map.tile_center(tile);
        let turret = self.turrets.insert(kind, tile, position, &self.tuning);
        if let Some(slot) = self.map.tile_mut(tile) {
            slot.occupant = Some(turret);
        }

        debug!(
            "upgraded turret {} into {} ({})",
            previous.get(),
            turret.get(),
            kind.name()
        );
        out_events.push(Event::TurretUpgraded {
            previous,
            turret,
            kind,
            tile,
            cost,
        });
    }

    fn damage_enemy(&mut self, enemy: EnemyId, damage: Damage, out_events: &mut Vec<Event>) {
        let weapon = damage.weapon();
        let (amount, slows) = match damage {
            Damage::Weapon { weapon, falloff } => {
                let falloff = if falloff.is_nan() {
                    0.0
                } else {
                    falloff.clamp(0.0, 1.0)
                };
                (
                    self.tuning.weapon(weapon).damage * falloff,
                    weapon.applies_slow(),
                )
            }
            Damage::Direct { amount, .. } => (amount, false),
        };

        let Some(target) = self.enemies.get_active_mut(enemy) else {
            return;
        };
        let outcome = target.apply_damage(amount, slows);

        if outcome.applied > 0.0 {
            out_events.push(Event::EnemyDamaged {
                enemy,
                weapon,
                amount: outcome.applied,
            });
        }

        if outcome.killed {
            let reward = target.reward();
            let kind = target.kind();
            let position = target.position();
            self.currency = self.currency.saturating_add(reward);
            debug!(
                "enemy {} ({}) killed by {}, awarding {reward}",
                enemy.get(),
                kind.name(),
                weapon.name()
            );
            out_events.push(Event::EnemyKilled {
                enemy,
                kind,
                weapon,
                position,
                reward,
            });
        }
    }

    fn resolve_contact(
        &mut self,
        projectile: ProjectileId,
        enemy: EnemyId,
        out_events: &mut Vec<Event>,
    ) {
        if self.enemies.get_active_mut(enemy).is_none() {
            return;
        }
        let Some(shot) = self.projectiles.get_active_mut(projectile) else {
            return;
        };
        let weapon = shot.weapon();
        let Some(contact) = shot.resolve_contact(enemy) else {
            return;
        };

        if contact.spent {
            out_events.push(Event::ProjectileSpent { projectile });
        }

        let falloff = geometry::damage_falloff(0.0, 0.0, contact.hits_before);
        self.damage_enemy(enemy, Damage::Weapon { weapon, falloff }, out_events);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.advance(dt.as_secs_f32(), out_events);
        }
        Command::SpawnEnemy {
            kind,
            health_multiplier,
        } => world.spawn_enemy(kind, health_multiplier, out_events),
        Command::PlaceTurret { kind, tile } => world.place_turret(kind, tile, out_events),
        Command::SellTurret { turret } => world.sell_turret(turret, out_events),
        Command::UpgradeTurret { turret } => world.upgrade_turret(turret, out_events),
        Command::AimTurret { turret, rotation } => {
            if let Some(turret) = world.turrets.get_mut(turret) {
                turret.aim(rotation);
            }
        }
        Command::FireProjectile {
            turret,
            weapon,
            origin,
            aim,
        } => {
            if !weapon.is_projectile() {
                return;
            }
            let Some(shooter) = world.turrets.get_mut(turret) else {
                return;
            };
            if !shooter.fire(&world.tuning) {
                return;
            }

            let projectile = ProjectileId::new(world.next_projectile_id);
            world.next_projectile_id = world.next_projectile_id.wrapping_add(1);
            world.projectiles.queue(Projectile::launch(
                projectile,
                turret,
                weapon,
                origin,
                aim,
                world.tuning.weapon(weapon),
                &mut world.rng,
            ));
            out_events.push(Event::ProjectileFired {
                projectile,
                turret,
                weapon,
            });
        }
        Command::DischargeBeam { turret, end } => {
            if let Some(shooter) = world.turrets.get_mut(turret) {
                if shooter.discharge(end, &world.tuning) {
                    out_events.push(Event::BeamDischarged { turret, end });
                }
            }
        }
        Command::SustainBeam { turret, end } => {
            if let Some(shooter) = world.turrets.get_mut(turret) {
                let _ = shooter.sustain(end, &world.tuning);
            }
        }
        Command::EndBeam { turret } => {
            if let Some(shooter) = world.turrets.get_mut(turret) {
                let _ = shooter.release(&world.tuning);
            }
        }
        Command::DamageEnemy { enemy, damage } => world.damage_enemy(enemy, damage, out_events),
        Command::SlowEnemy { enemy } => {
            if let Some(target) = world.enemies.get_active_mut(enemy) {
                let _ = target.slow();
            }
        }
        Command::HealEnemy { enemy, amount } => {
            if let Some(target) = world.enemies.get_active_mut(enemy) {
                let restored = target.heal(amount);
                if restored > 0.0 {
                    out_events.push(Event::EnemyHealed {
                        enemy,
                        amount: restored,
                    });
                }
            }
        }
        Command::ResetAbility { enemy } => {
            let cooldown = world.tuning.healer.cooldown;
            if let Some(target) = world.enemies.get_active_mut(enemy) {
                target.reset_ability(cooldown);
            }
        }
        Command::SteerEnemy {
            enemy,
            waypoint,
            velocity,
        } => {
            let waypoint_count = world.map.steering_targets().len();
            if let Some(target) = world.enemies.get_active_mut(enemy) {
                target.steer(waypoint, velocity, waypoint_count);
            }
        }
        Command::ResolveContact { projectile, enemy } => {
            world.resolve_contact(projectile, enemy, out_events);
        }
        Command::ReleaseContact { projectile, enemy } => {
            if let Some(shot) = world.projectiles.get_active_mut(projectile) {
                let _ = shot.release_contact(enemy);
            }
        }
        Command::EndFrame => {
            world.enemies.end_frame();
            world.projectiles.end_frame();
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use castle_defence_core::{
        EnemyView, PlacementError, ProjectileView, TileCoord, TurretId, TurretKind, TurretView,
        Tuning,
    };
    use glam::Vec2;

    use super::{Lifecycle, TileInfo, World};

    /// Dimensions of the tile grid.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct GridInfo {
        /// Number of tile columns.
        pub columns: u32,
        /// Number of tile rows.
        pub rows: u32,
        /// Side length of a tile in world units.
        pub tile_size: f32,
    }

    /// Balance table the world was built with.
    #[must_use]
    pub fn tuning(world: &World) -> &Tuning {
        &world.tuning
    }

    /// Dimensions of the tile grid.
    #[must_use]
    pub fn grid(world: &World) -> GridInfo {
        GridInfo {
            columns: world.map.columns(),
            rows: world.map.rows(),
            tile_size: world.map.tile_size(),
        }
    }

    /// Captures a read-only view of the enemies on the field.
    ///
    /// Enemies spawned during the current frame are not included until the
    /// frame ends.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter_active().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures a read-only view of every turret.
    #[must_use]
    pub fn turret_view(world: &World) -> TurretView {
        TurretView::from_snapshots(world.turrets.iter().map(|turret| turret.snapshot()).collect())
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter_active()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Tile centres of the path's corners, ending on the exit tile.
    #[must_use]
    pub fn waypoints(world: &World) -> &[Vec2] {
        world.map.waypoints()
    }

    /// Points enemies steer toward, one per waypoint.
    ///
    /// The last target lies one tile below the exit so enemies walk off the grid.
    #[must_use]
    pub fn steering_targets(world: &World) -> &[Vec2] {
        world.map.steering_targets()
    }

    /// Position where enemies enter the field.
    #[must_use]
    pub fn entry_position(world: &World) -> Vec2 {
        world.map.start()
    }

    /// Tile under the provided world position.
    #[must_use]
    pub fn tile_at(world: &World, position: Vec2) -> Option<TileCoord> {
        world.map.tile_at(position)
    }

    /// Describes the tile at the provided coordinate.
    #[must_use]
    pub fn tile(world: &World, coord: TileCoord) -> Option<TileInfo> {
        world.map.info(coord)
    }

    /// Turret standing on the provided tile.
    #[must_use]
    pub fn turret_at(world: &World, coord: TileCoord) -> Option<TurretId> {
        world.map.tile(coord).and_then(|tile| tile.occupant)
    }

    /// Reason a placement would currently be rejected, if any.
    #[must_use]
    pub fn placement_error(
        world: &World,
        kind: TurretKind,
        coord: TileCoord,
    ) -> Option<PlacementError> {
        world.check_placement(kind, coord).err()
    }

    /// Number of turrets on the grid.
    #[must_use]
    pub fn turret_count(world: &World) -> usize {
        world.turrets.len()
    }

    /// Enemies still on the field, including those waiting to join it.
    #[must_use]
    pub fn active_enemy_count(world: &World) -> usize {
        let live = world.enemies.iter_active().count();
        let pending = world
            .enemies
            .pending()
            .iter()
            .filter(|enemy| enemy.is_active())
            .count();
        live + pending
    }

    /// Lives the player has left.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Currency the player can spend.
    #[must_use]
    pub fn currency(world: &World) -> u32 {
        world.currency
    }

    /// Reports whether the player ran out of lives.
    #[must_use]
    pub fn is_defeated(world: &World) -> bool {
        world.defeated
    }

    /// Number of ticks processed since construction or the last reset.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
