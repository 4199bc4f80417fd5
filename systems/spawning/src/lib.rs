#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave director responsible for emitting enemy spawn commands.
//!
//! The director idles until the player starts a wave, then works through the
//! wave's script one spawn at a time, waiting out each command's delay before
//! the next one. Once the script is exhausted the wave stays in progress until
//! the field reports no active enemies. Every `boss_wave_interval` completed
//! waves raise the stage and permanently add `health_step` to the health
//! multiplier of later spawns.

mod campaign;

use std::time::Duration;

use castle_defence_core::{
    tuning::WaveTuning, Command, EnemyKind, Event, WavePhase, WaveStartError, WaveStatus,
};
use log::info;

/// Single scripted spawn: which enemy to create and how long to wait afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnCommand {
    /// Kind of enemy to spawn.
    pub kind: EnemyKind,
    /// Delay before the next command of the script runs.
    pub delay_until_next: Duration,
}

impl SpawnCommand {
    /// Creates a new spawn command.
    #[must_use]
    pub const fn new(kind: EnemyKind, delay_until_next: Duration) -> Self {
        Self {
            kind,
            delay_until_next,
        }
    }
}

/// Ordered spawn commands making up one wave.
pub type WaveScript = Vec<SpawnCommand>;

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Debug)]
pub struct Config {
    scripts: Vec<WaveScript>,
    boss_wave_interval: u32,
    health_step: f32,
}

impl Config {
    /// Creates a configuration using the provided scripts and pacing.
    #[must_use]
    pub fn new(scripts: Vec<WaveScript>, boss_wave_interval: u32, health_step: f32) -> Self {
        Self {
            scripts,
            boss_wave_interval: boss_wave_interval.max(1),
            health_step,
        }
    }

    /// The authored twenty-wave campaign paced by `waves`.
    #[must_use]
    pub fn campaign(waves: &WaveTuning) -> Self {
        Self::new(campaign::waves(), waves.boss_wave_interval, waves.health_step)
    }

    /// Keeps only the first `count` waves of the script list.
    #[must_use]
    pub fn truncated(mut self, count: usize) -> Self {
        self.scripts.truncate(count);
        self
    }
}

/// Pure system that tracks wave progress and emits spawn commands.
#[derive(Debug)]
pub struct Spawning {
    scripts: Vec<WaveScript>,
    boss_wave_interval: u32,
    health_step: f32,
    phase: WavePhase,
    wave_index: usize,
    command_index: usize,
    spawn_timer: Duration,
    stage: u32,
    health_multiplier: f32,
}

impl Spawning {
    /// Creates a new wave director using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut spawning = Self {
            scripts: config.scripts,
            boss_wave_interval: config.boss_wave_interval,
            health_step: config.health_step,
            phase: WavePhase::WaitingForPlayer,
            wave_index: 0,
            command_index: 0,
            spawn_timer: Duration::ZERO,
            stage: 1,
            health_multiplier: 1.0,
        };
        spawning.reset();
        spawning
    }

    /// Starts the next wave; only accepted while waiting for the player.
    pub fn start_next_wave(&mut self) -> Result<(), WaveStartError> {
        match self.phase {
            WavePhase::WaitingForPlayer => {
                self.phase = WavePhase::Spawning;
                self.command_index = 0;
                self.spawn_timer = Duration::ZERO;
                info!(
                    "wave {} of {} started",
                    self.wave_index + 1,
                    self.scripts.len()
                );
                Ok(())
            }
            WavePhase::Finished => Err(WaveStartError::Finished),
            WavePhase::Spawning | WavePhase::WaveInProgress => Err(WaveStartError::NotWaiting),
        }
    }

    /// Consumes frame events and the live enemy count to emit spawn commands.
    ///
    /// At most one enemy is spawned per call. `active_enemies` must include
    /// enemies spawned earlier in the frame that have not joined the field yet.
    pub fn handle(&mut self, events: &[Event], active_enemies: usize, out: &mut Vec<Command>) {
        match self.phase {
            WavePhase::WaitingForPlayer | WavePhase::Finished => {}
            WavePhase::Spawning => {
                let mut elapsed = Duration::ZERO;
                for event in events {
                    if let Event::TimeAdvanced { dt } = event {
                        elapsed = elapsed.saturating_add(*dt);
                    }
                }
                self.spawn_timer = self.spawn_timer.saturating_sub(elapsed);
                if self.spawn_timer.is_zero() {
                    self.spawn_next(out);
                }
            }
            WavePhase::WaveInProgress => {
                if active_enemies == 0 {
                    self.complete_wave();
                }
            }
        }
    }

    fn spawn_next(&mut self, out: &mut Vec<Command>) {
        let script = &self.scripts[self.wave_index];
        if let Some(command) = script.get(self.command_index) {
            out.push(Command::SpawnEnemy {
                kind: command.kind,
                health_multiplier: self.health_multiplier,
            });
            self.spawn_timer = command.delay_until_next;
            self.command_index += 1;
        }

        if self.command_index >= script.len() {
            self.phase = WavePhase::WaveInProgress;
        }
    }

    fn complete_wave(&mut self) {
        self.wave_index += 1;
        info!("wave {} cleared", self.wave_index);

        if self.wave_index % self.boss_wave_interval as usize == 0 {
            self.stage += 1;
            self.health_multiplier += self.health_step;
            info!(
                "stage {} reached, enemy health multiplier now {}",
                self.stage, self.health_multiplier
            );
        }

        if self.wave_index >= self.scripts.len() {
            self.phase = WavePhase::Finished;
            info!("campaign finished");
        } else {
            self.phase = WavePhase::WaitingForPlayer;
        }
    }

    /// Returns the director to the first wave and the first stage.
    pub fn reset(&mut self) {
        self.phase = if self.scripts.is_empty() {
            WavePhase::Finished
        } else {
            WavePhase::WaitingForPlayer
        };
        self.wave_index = 0;
        self.command_index = 0;
        self.spawn_timer = Duration::ZERO;
        self.stage = 1;
        self.health_multiplier = 1.0;
    }

    /// Reports whether a wave is spawning or still has enemies to clear.
    #[must_use]
    pub fn is_wave_active(&self) -> bool {
        matches!(self.phase, WavePhase::Spawning | WavePhase::WaveInProgress)
    }

    /// Reports whether every scripted wave has been cleared.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == WavePhase::Finished
    }

    /// Health multiplier applied to new spawns.
    #[must_use]
    pub fn health_multiplier(&self) -> f32 {
        self.health_multiplier
    }

    /// Wave progress for presentation layers.
    #[must_use]
    pub fn status(&self) -> WaveStatus {
        let interval = self.boss_wave_interval as usize;
        let wave_number = (self.wave_index + 1).min(self.scripts.len().max(1));
        WaveStatus {
            phase: self.phase,
            wave_number: wave_number as u32,
            total_waves: self.scripts.len() as u32,
            stage: self.stage,
            waves_until_boss: (interval - self.wave_index % interval) as u32,
            health_multiplier: self.health_multiplier,
        }
    }
}
