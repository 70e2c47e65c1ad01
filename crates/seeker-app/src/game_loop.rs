//! Game loop thread: runs the simulation engine and streams snapshots.
//!
//! The engine is created inside the thread, so it never crosses threads.
//! Commands arrive over an `mpsc` channel and are drained before every tick.
//! Snapshots go out over a bounded channel; a slow consumer holds the loop
//! back instead of buffering without limit.

use std::io;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::debug;

use seeker_core::commands::PlayerCommand;
use seeker_core::constants::TICK_RATE;
use seeker_core::state::RoundSnapshot;
use seeker_core::types::Position;
use seeker_sim::engine::{SimConfig, SimulationEngine};

/// Nominal duration of one tick at 1x speed.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Snapshots buffered before the loop waits for the consumer.
const SNAPSHOT_BUFFER: usize = 256;

/// Commands sent to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A command to forward to the simulation engine.
    PlayerCommand(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// How the blocks of the level are placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelLayout {
    /// `blocks` scattered in a `spread`-sized square above `center`.
    Random,
    /// A grid whose lower-left corner is `center`. Every `special_every`-th
    /// block is special (0 = none).
    Grid {
        rows: u32,
        cols: u32,
        special_every: u32,
    },
}

/// Level built when the loop starts.
#[derive(Debug, Clone)]
pub struct LevelSettings {
    pub launcher: Position,
    pub layout: LevelLayout,
    pub blocks: usize,
    pub special_ratio: f64,
    pub center: Position,
    pub spread: f64,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            launcher: Position::new(0.0, 0.0),
            layout: LevelLayout::Random,
            blocks: 24,
            special_ratio: 0.25,
            center: Position::new(0.0, 4.0),
            spread: 16.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep between ticks to hold `TICK_RATE` (scaled by the time scale).
    Realtime,
    /// Tick as fast as the consumer takes snapshots.
    Unpaced,
}

/// Handles to a running game loop.
pub struct GameLoopHandle {
    pub commands: mpsc::Sender<GameLoopCommand>,
    pub snapshots: mpsc::Receiver<RoundSnapshot>,
    pub thread: JoinHandle<()>,
}

/// Spawns the game loop in a new thread.
pub fn spawn_game_loop(
    sim: SimConfig,
    level: LevelSettings,
    pacing: Pacing,
) -> io::Result<GameLoopHandle> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();
    let (snap_tx, snap_rx) = mpsc::sync_channel::<RoundSnapshot>(SNAPSHOT_BUFFER);

    let thread = std::thread::Builder::new()
        .name("seeker-game-loop".into())
        .spawn(move || {
            let engine = build_engine(sim, &level);
            run_game_loop(engine, cmd_rx, snap_tx, pacing);
        })?;

    Ok(GameLoopHandle {
        commands: cmd_tx,
        snapshots: snap_rx,
        thread,
    })
}

/// Engine with the launcher placed and the level spawned.
pub fn build_engine(sim: SimConfig, level: &LevelSettings) -> SimulationEngine {
    let mut engine = SimulationEngine::new(sim);
    engine.spawn_launcher(level.launcher);
    match level.layout {
        LevelLayout::Random => {
            engine.spawn_random_level(level.blocks, level.special_ratio, level.center, level.spread);
        }
        LevelLayout::Grid {
            rows,
            cols,
            special_every,
        } => {
            engine.spawn_grid_level(level.center, rows, cols, special_every);
        }
    }
    engine
}

/// The game loop. Runs until Shutdown, or until either channel disconnects.
fn run_game_loop(
    mut engine: SimulationEngine,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    snap_tx: mpsc::SyncSender<RoundSnapshot>,
    pacing: Pacing,
) {
    let mut next_tick_time = Instant::now();

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::PlayerCommand(cmd)) => {
                    engine.queue_command(cmd);
                }
                Ok(GameLoopCommand::Shutdown) => return,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return,
            }
        }

        // 2. Advance one tick
        let snapshot = engine.tick();

        // 3. Hand the snapshot to the consumer
        if snap_tx.send(snapshot).is_err() {
            debug!("snapshot receiver dropped, stopping game loop");
            return;
        }

        // 4. Sleep until next tick, adjusting for time_scale
        if pacing == Pacing::Unpaced {
            continue;
        }
        let time_scale = engine.time_scale();
        let effective_tick_duration = if time_scale > 0.001 {
            TICK_DURATION.div_f64(time_scale)
        } else {
            TICK_DURATION
        };

        next_tick_time += effective_tick_duration;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > effective_tick_duration * 2 {
            // Too far behind, skip the missed ticks
            next_tick_time = now;
        }
    }
}
