#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-stepped combat simulation that wires the world to its systems.
//!
//! Each call to [`Simulation::advance_frame`] runs one fixed pass:
//!
//! 1. `Tick` lets every entity advance its own timers, statuses and motion.
//! 2. Pending build input is turned into placement, sale and upgrade commands.
//! 3. Turrets pick targets from the advanced enemy view and queue shots.
//! 4. Enemies use their abilities and steer toward their next waypoint.
//! 5. Manual spawn requests and the wave director queue new enemies.
//! 6. Projectiles are tested against enemies at their post-movement positions.
//! 7. `EndFrame` merges queued entities and drops every inactive one.
//!
//! Systems never touch the world directly. They read views built from
//! snapshots and push commands that the simulation applies once the system
//! has finished, so no collection is mutated while it is being iterated.

use std::time::Duration;

use castle_defence_core::{
    Command, EnemyKind, EnemyView, Event, PlacementError, ProjectileView, SaleError, StatsReport,
    TileCoord, TurretId, TurretKind, TurretTarget, TurretView, Tuning, TuningError, UpgradeError,
    WaveStartError, WaveStatus,
};
use castle_defence_system_builder::{Builder, BuilderInput, RangePreview};
use castle_defence_system_collision::Collision;
use castle_defence_system_movement::Movement;
use castle_defence_system_spawning::{Config as SpawningConfig, Spawning};
use castle_defence_system_statistics::Statistics;
use castle_defence_system_tower_combat::TowerCombat;
use castle_defence_system_tower_targeting::TowerTargeting;
use castle_defence_world::{self as world, query, World};
use glam::Vec2;
use log::{debug, info};

/// Owns the world, every system and the per-frame scratch buffers.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    targeting: TowerTargeting,
    combat: TowerCombat,
    movement: Movement,
    spawning: Spawning,
    collision: Collision,
    builder: Builder,
    statistics: Statistics,
    input: BuilderInput,
    spawn_requests: Vec<EnemyKind>,
    targets: Vec<TurretTarget>,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates a simulation with the default tuning and the authored campaign.
    #[must_use]
    pub fn new() -> Self {
        let world = World::new();
        let config = SpawningConfig::campaign(&query::tuning(&world).waves);
        Self::assemble(world, config)
    }

    /// Creates a simulation from validated tuning and the authored campaign.
    pub fn with_tuning(tuning: Tuning) -> Result<Self, TuningError> {
        let config = SpawningConfig::campaign(&tuning.waves);
        Self::with_config(tuning, config)
    }

    /// Creates a simulation from validated tuning and custom wave scripts.
    pub fn with_config(tuning: Tuning, waves: SpawningConfig) -> Result<Self, TuningError> {
        let world = World::with_tuning(tuning)?;
        Ok(Self::assemble(world, waves))
    }

    fn assemble(world: World, waves: SpawningConfig) -> Self {
        Self {
            world,
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            movement: Movement::new(),
            spawning: Spawning::new(waves),
            collision: Collision::new(),
            builder: Builder::new(),
            statistics: Statistics::new(),
            input: BuilderInput::default(),
            spawn_requests: Vec::new(),
            targets: Vec::new(),
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Runs one complete frame and returns the events it produced.
    pub fn advance_frame(&mut self, dt: Duration) -> &[Event] {
        self.events.clear();
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        let input = std::mem::take(&mut self.input);
        self.builder.handle(
            &self.events,
            input,
            &query::turret_view(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        let turrets = query::turret_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.targeting.handle(
            &turrets,
            &enemies,
            query::tuning(&self.world),
            &mut self.targets,
        );
        self.combat.handle(
            &self.events,
            &turrets,
            &enemies,
            &self.targets,
            query::tuning(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        self.movement.handle(
            &self.events,
            &query::enemy_view(&self.world),
            query::steering_targets(&self.world),
            query::tuning(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        let health_multiplier = self.spawning.health_multiplier();
        self.commands
            .extend(self.spawn_requests.drain(..).map(|kind| Command::SpawnEnemy {
                kind,
                health_multiplier,
            }));
        self.flush_commands();
        if !query::is_defeated(&self.world) {
            self.spawning.handle(
                &self.events,
                query::active_enemy_count(&self.world),
                &mut self.commands,
            );
            self.flush_commands();
        }

        self.collision.handle(
            &query::projectile_view(&self.world),
            &query::enemy_view(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        world::apply(&mut self.world, Command::EndFrame, &mut self.events);
        self.statistics.handle(&self.events);
        &self.events
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    /// Applies a command outside the frame loop and returns what it produced.
    fn apply_now(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.statistics.handle(&events);
        events
    }

    /// Builds a turret immediately.
    pub fn place_turret(
        &mut self,
        kind: TurretKind,
        tile: TileCoord,
    ) -> Result<TurretId, PlacementError> {
        let events = self.apply_now(Command::PlaceTurret { kind, tile });
        for event in events {
            match event {
                Event::TurretPlaced { turret, .. } => return Ok(turret),
                Event::TurretPlacementRejected { reason, .. } => return Err(reason),
                _ => {}
            }
        }
        Err(PlacementError::OutOfBounds)
    }

    /// Sells a turret immediately and returns the refund.
    pub fn sell_turret(&mut self, turret: TurretId) -> Result<u32, SaleError> {
        let events = self.apply_now(Command::SellTurret { turret });
        for event in events {
            match event {
                Event::TurretSold { refund, .. } => return Ok(refund),
                Event::TurretSaleRejected { reason, .. } => return Err(reason),
                _ => {}
            }
        }
        Err(SaleError::MissingTurret)
    }

    /// Replaces a turret with its next tier and returns the new identifier.
    pub fn upgrade_turret(&mut self, turret: TurretId) -> Result<TurretId, UpgradeError> {
        let events = self.apply_now(Command::UpgradeTurret { turret });
        for event in events {
            match event {
                Event::TurretUpgraded { turret, .. } => return Ok(turret),
                Event::TurretUpgradeRejected { reason, .. } => return Err(reason),
                _ => {}
            }
        }
        Err(UpgradeError::MissingTurret)
    }

    /// Queues an enemy outside the wave script; it spawns during the next frame.
    pub fn request_spawn(&mut self, kind: EnemyKind) {
        debug!("manual spawn of {} requested", kind.name());
        self.spawn_requests.push(kind);
    }

    /// Starts the next scripted wave.
    pub fn start_next_wave(&mut self) -> Result<(), WaveStartError> {
        self.spawning.start_next_wave()
    }

    /// Selects the turret kind that confirmed build input places.
    pub fn select_turret(&mut self, kind: Option<TurretKind>) {
        self.builder.select(kind);
    }

    /// Records build input to be processed by the next frame.
    pub fn submit_input(&mut self, input: BuilderInput) {
        self.input = input;
    }

    /// Range circle to draw for the hovered tile.
    #[must_use]
    pub fn range_preview(&self, tile: TileCoord) -> Option<RangePreview> {
        self.builder.range_preview(
            tile,
            &query::turret_view(&self.world),
            query::tuning(&self.world),
            |kind, tile| query::placement_error(&self.world, kind, tile),
        )
    }

    /// Restores the state the simulation had right after construction.
    pub fn reset(&mut self) {
        self.world.reset();
        self.spawning.reset();
        self.statistics.reset();
        self.builder = Builder::new();
        self.input = BuilderInput::default();
        self.spawn_requests.clear();
        self.targets.clear();
        self.commands.clear();
        self.events.clear();
        info!("simulation reset");
    }

    /// Read-only access to the world for the `query` functions.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Live enemies sorted by identifier.
    #[must_use]
    pub fn enemies(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Turrets sorted by identifier.
    #[must_use]
    pub fn turrets(&self) -> TurretView {
        query::turret_view(&self.world)
    }

    /// Projectiles in flight sorted by identifier.
    #[must_use]
    pub fn projectiles(&self) -> ProjectileView {
        query::projectile_view(&self.world)
    }

    /// Target assignments computed during the last frame.
    #[must_use]
    pub fn targets(&self) -> &[TurretTarget] {
        &self.targets
    }

    /// Tile under a world position.
    #[must_use]
    pub fn tile_at(&self, position: Vec2) -> Option<TileCoord> {
        query::tile_at(&self.world, position)
    }

    /// Turret standing on a tile.
    #[must_use]
    pub fn turret_at(&self, tile: TileCoord) -> Option<TurretId> {
        query::turret_at(&self.world, tile)
    }

    /// Lives the player has left.
    #[must_use]
    pub fn lives(&self) -> u32 {
        query::lives(&self.world)
    }

    /// Currency the player can spend.
    #[must_use]
    pub fn currency(&self) -> u32 {
        query::currency(&self.world)
    }

    /// Reports whether the player ran out of lives.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        query::is_defeated(&self.world)
    }

    /// Wave number, stage and director phase.
    #[must_use]
    pub fn wave_status(&self) -> WaveStatus {
        self.spawning.status()
    }

    /// Reports whether a wave is spawning or still has enemies to clear.
    #[must_use]
    pub fn is_wave_active(&self) -> bool {
        self.spawning.is_wave_active()
    }

    /// Reports whether every scripted wave has been cleared.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.spawning.is_finished()
    }

    /// Statistics gathered since construction or the last reset.
    #[must_use]
    pub fn stats(&self) -> &StatsReport {
        self.statistics.report()
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn api_calls_report_world_outcomes() {
        let mut simulation = Simulation::new();
        let tile = TileCoord::new(2, 5);

        let duo = simulation
            .place_turret(TurretKind::Duo, tile)
            .expect("tile is buildable");
        assert_eq!(
            simulation.place_turret(TurretKind::Duo, tile),
            Err(PlacementError::Occupied)
        );

        let ripple = simulation.upgrade_turret(duo).expect("affordable upgrade");
        assert_ne!(ripple, duo);
        assert_eq!(simulation.upgrade_turret(duo), Err(UpgradeError::MissingTurret));

        let refund = simulation.sell_turret(ripple).expect("turret exists");
        assert_eq!(refund, 90);
        assert_eq!(simulation.sell_turret(ripple), Err(SaleError::MissingTurret));
        assert_eq!(simulation.stats().currency_spent, 200);
    }

    #[test]
    fn manual_spawns_join_during_the_next_frame() {
        let mut simulation = Simulation::new();
        simulation.request_spawn(EnemyKind::Mono);
        simulation.request_spawn(EnemyKind::Flare);
        assert!(simulation.enemies().is_empty());

        let spawned = simulation
            .advance_frame(FRAME)
            .iter()
            .filter(|event| matches!(event, Event::EnemySpawned { .. }))
            .count();
        assert_eq!(spawned, 2);
        assert_eq!(simulation.enemies().len(), 2);
        assert!(!simulation.is_wave_active(), "manual spawns bypass the director");
    }

    #[test]
    fn build_input_is_applied_within_the_frame() {
        let mut simulation = Simulation::new();
        let tile = TileCoord::new(2, 5);
        simulation.select_turret(Some(TurretKind::Lancer));
        assert!(simulation
            .range_preview(tile)
            .is_some_and(|preview| preview.placeable));

        simulation.submit_input(BuilderInput {
            cursor_tile: Some(tile),
            confirm_action: true,
            ..BuilderInput::default()
        });
        let _ = simulation.advance_frame(FRAME);
        assert!(simulation.turret_at(tile).is_some());

        let _ = simulation.advance_frame(FRAME);
        assert_eq!(simulation.turrets().len(), 1, "input is consumed once");
    }

    #[test]
    fn reset_restores_a_fresh_session() {
        let mut simulation = Simulation::new();
        let _ = simulation.place_turret(TurretKind::Wave, TileCoord::new(2, 5));
        simulation
            .start_next_wave()
            .expect("director waits for the player");
        for _ in 0..10 {
            let _ = simulation.advance_frame(FRAME);
        }

        simulation.reset();
        assert!(simulation.turrets().is_empty());
        assert!(simulation.enemies().is_empty());
        assert_eq!(simulation.currency(), query::tuning(simulation.world()).player.currency);
        assert_eq!(simulation.wave_status().wave_number, 1);
        assert_eq!(simulation.stats(), &StatsReport::default());
    }
}
