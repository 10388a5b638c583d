//! Vesper Player - Headless level runner binary
//!
//! Runs a level for a fixed number of frames and reports where every actor
//! ended up.
//!
//! Usage:
//!   vesper-player <level.toml> [--frames N] [--fps HZ] [--fixed-rate HZ]

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use vesper_actor::{FORM, STATUS};
use vesper_player::{logging, LevelFile, Stage};

#[derive(Parser)]
#[command(name = "vesper-player")]
#[command(about = "Vesper level runner - step platformer actors through a level")]
struct Args {
    /// Path to level file
    level: PathBuf,

    /// Number of frames to run
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Frame rate the run is simulated at
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Physics steps per second
    #[arg(long, default_value_t = 50.0)]
    fixed_rate: f64,

    /// Log an actor report every N frames (0 disables)
    #[arg(long, default_value_t = 60)]
    report_every: u32,

    /// Trace each actor's probe boxes every frame
    #[arg(long)]
    gizmos: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    anyhow::ensure!(args.fps > 0.0, "--fps must be positive");
    anyhow::ensure!(args.fixed_rate > 0.0, "--fixed-rate must be positive");

    let level = LevelFile::load(&args.level)
        .with_context(|| format!("Failed to load level {}", args.level.display()))?;
    let mut stage = Stage::from_level(&level, args.fixed_rate).context("Failed to build stage")?;
    stage.set_draw_gizmos(args.gizmos);

    let dt = 1.0 / args.fps;
    stage.start();
    for frame in 1..=args.frames {
        stage.frame(dt);
        if args.report_every > 0 && frame % args.report_every == 0 {
            report(&stage, frame);
        }
    }
    stage.stop();

    println!("Level: {}", level.name);
    println!(
        "Frames: {} ({} physics steps, {:.2}s)",
        stage.clock().frames,
        stage.clock().fixed_steps,
        stage.clock().total_time
    );
    for actor in stage.actors() {
        let position = stage
            .world()
            .position(actor.motion().body())
            .unwrap_or_default();
        println!(
            "  {:<12} pos ({:>7.2}, {:>7.2})  form {:<8} status {}",
            actor.name(),
            position.x,
            position.y,
            actor.form_id(),
            actor.states().active_state(STATUS).unwrap_or("-"),
        );
    }

    Ok(())
}

fn report(stage: &Stage, frame: u32) {
    for actor in stage.actors() {
        let motion = actor.motion();
        info!(
            "frame {frame}: {} at {:?} v {:?} grounded {} {}={} {}={}",
            actor.name(),
            motion.position(),
            motion.velocity(),
            motion.is_grounded(),
            FORM,
            actor.form_id(),
            STATUS,
            actor.states().active_state(STATUS).unwrap_or("-"),
        );
    }
}
