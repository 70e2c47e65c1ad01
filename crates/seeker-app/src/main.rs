//! Seeking-missile runner: builds a random level, fires the power-up and
//! follows each round to completion.
//!
//! Usage:
//!   cargo run -p seeker-app -- --seed 7 --blocks 30 --rounds 3
//!   RUST_LOG=seeker_sim=debug cargo run -p seeker-app -- --config missiles.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::filter::EnvFilter;

use seeker_app::config::load_config;
use seeker_app::game_loop::{
    spawn_game_loop, GameLoopCommand, LevelLayout, LevelSettings, Pacing,
};
use seeker_app::session::Session;
use seeker_core::constants::DEFAULT_ARENA_CAPACITY;
use seeker_sim::engine::SimConfig;

#[derive(Parser)]
#[command(name = "seeker-run")]
#[command(about = "Run seeking-missile rounds against a random level")]
struct Args {
    /// RNG seed (level layout, spawn offsets, target choice)
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Number of blocks in a random level
    #[arg(long, default_value_t = 24)]
    blocks: usize,
    /// Lay the blocks out as a grid with this many rows instead of at random
    #[arg(long, requires = "grid_cols")]
    grid_rows: Option<u32>,
    /// Grid columns (with --grid-rows)
    #[arg(long, requires = "grid_rows")]
    grid_cols: Option<u32>,
    /// In a grid, every Nth block is special (0 = none)
    #[arg(long, default_value_t = 4)]
    special_every: u32,
    /// Chance that a block is special, in [0, 1]
    #[arg(long, default_value_t = 0.25)]
    special_ratio: f64,
    /// JSON missile config (camelCase keys, missing keys use defaults)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Tick cap per round before the round is cleared
    #[arg(long, default_value_t = 3600)]
    max_ticks: u64,
    /// Rounds to play on the same level
    #[arg(long, default_value_t = 1)]
    rounds: u32,
    /// Pace ticks at wall-clock speed instead of running flat out
    #[arg(long)]
    realtime: bool,
    /// Print each round summary as a JSON line
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let missile = load_config(args.config.as_deref())?;

    let sim = SimConfig {
        seed: args.seed,
        missile,
        arena_capacity: DEFAULT_ARENA_CAPACITY,
        time_scale: 1.0,
    };
    let layout = match (args.grid_rows, args.grid_cols) {
        (Some(rows), Some(cols)) => LevelLayout::Grid {
            rows,
            cols,
            special_every: args.special_every,
        },
        _ => LevelLayout::Random,
    };
    let level = LevelSettings {
        layout,
        blocks: args.blocks,
        special_ratio: args.special_ratio,
        ..LevelSettings::default()
    };
    let pacing = if args.realtime {
        Pacing::Realtime
    } else {
        Pacing::Unpaced
    };

    let handle = spawn_game_loop(sim, level, pacing).context("failed to start game loop")?;
    let summaries = Session::new(&handle.commands, &handle.snapshots, args.max_ticks)
        .run_rounds(args.rounds)?;

    let _ = handle.commands.send(GameLoopCommand::Shutdown);
    drop(handle.snapshots);
    if handle.thread.join().is_err() {
        anyhow::bail!("game loop thread panicked");
    }

    if args.json {
        for summary in &summaries {
            println!("{}", serde_json::to_string(summary)?);
        }
        return Ok(());
    }

    println!("=== SEEKING MISSILE RUN (seed {}) ===", args.seed);
    for s in &summaries {
        println!(
            "  Round {}: {} launched, {} hits, {} expired, {} cleared, {}/{} blocks lit, {:.2}s{}",
            s.round,
            s.launched,
            s.hits,
            s.expired,
            s.cleared,
            s.blocks_lit,
            s.blocks_total,
            s.ended_at_secs - s.started_at_secs,
            if s.completed { "" } else { " (tick cap)" },
        );
    }
    Ok(())
}
