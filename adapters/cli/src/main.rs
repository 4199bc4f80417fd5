#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for the Castle Defence simulation.
//!
//! Places the scripted turrets, starts waves whenever the director is waiting
//! and steps the simulation at a fixed frame length, then prints a summary.

mod build_order;
mod config;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use castle_defence_core::WavePhase;
use castle_defence_simulation::Simulation;
use clap::Parser;
use log::{info, warn};

use crate::build_order::BuildOrder;

/// Command-line arguments accepted by the runner.
#[derive(Debug, Parser)]
#[command(name = "castle-defence", about = "Runs a headless Castle Defence session")]
struct Args {
    /// TOML file overriding the default tuning.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of frames to simulate.
    #[arg(short, long, default_value_t = 3_600)]
    frames: u32,
    /// Frame length in milliseconds.
    #[arg(long, default_value_t = 16)]
    dt_ms: u64,
    /// Seed for projectile jitter; overrides the tuning file.
    #[arg(long)]
    seed: Option<u64>,
    /// Turret to place before the first frame, as `kind@column,row`.
    #[arg(short, long = "build")]
    builds: Vec<BuildOrder>,
    /// Number of waves to start.
    #[arg(short, long, default_value_t = 1)]
    waves: u32,
}

/// Entry point for the Castle Defence command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    run(Args::parse())
}

fn run(args: Args) -> Result<()> {
    let tuning = config::load_tuning(args.config.as_deref(), args.seed)?;
    let mut simulation =
        Simulation::with_tuning(tuning).context("failed to construct the simulation")?;

    for order in &args.builds {
        match simulation.place_turret(order.kind, order.tile) {
            Ok(turret) => info!(
                "placed {} as turret {} at {:?}",
                order.kind.name(),
                turret.get(),
                order.tile
            ),
            Err(error) => warn!(
                "could not place {} at {:?}: {error}",
                order.kind.name(),
                order.tile
            ),
        }
    }

    let dt = Duration::from_millis(args.dt_ms);
    let mut waves_started = 0;
    let mut frames_run = 0;
    for _ in 0..args.frames {
        if waves_started < args.waves
            && simulation.wave_status().phase == WavePhase::WaitingForPlayer
        {
            simulation
                .start_next_wave()
                .context("director refused to start a waiting wave")?;
            waves_started += 1;
        }

        let _ = simulation.advance_frame(dt);
        frames_run += 1;

        if simulation.is_defeated() || simulation.is_finished() {
            break;
        }
        if waves_started == args.waves && !simulation.is_wave_active() {
            break;
        }
    }

    let status = simulation.wave_status();
    let stats = simulation.stats();
    println!("frames simulated: {frames_run}");
    println!(
        "wave {}/{} (stage {}), phase {:?}",
        status.wave_number, status.total_waves, status.stage, status.phase
    );
    println!(
        "lives {}, currency {}{}",
        simulation.lives(),
        simulation.currency(),
        if simulation.is_defeated() {
            ", defeated"
        } else {
            ""
        }
    );
    println!(
        "kills {}, leaks {}, spent {}, damage {:.1}",
        stats.total_kills(),
        stats.leaks,
        stats.currency_spent,
        stats.damage_dealt
    );
    for (kind, kills) in &stats.kills_by_kind {
        println!("  {:<8} {kills}", kind.name());
    }
    Ok(())
}
