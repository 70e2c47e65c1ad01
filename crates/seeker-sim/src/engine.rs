//! Simulation engine: the seeking-missile round driver.
//!
//! `SimulationEngine` owns the hecs level world, the target reservation pool,
//! the missile arena, the spawn orchestrator and the round gate, processes
//! commands, runs the per-tick systems and produces `RoundSnapshot`s.
//! Completely headless, so a seed fully determines a run.

use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use seeker_core::commands::PlayerCommand;
use seeker_core::config::MissileConfig;
use seeker_core::constants::{DEFAULT_ARENA_CAPACITY, DT};
use seeker_core::enums::ButtonState;
use seeker_core::events::SimEvent;
use seeker_core::state::RoundSnapshot;
use seeker_core::types::{MissileId, Position, SimTime};

use crate::arena::MissileArena;
use crate::missile::GuidanceUnit;
use crate::orchestrator::{RoundContext, SpawnOrchestrator};
use crate::reservation::TargetReservationPool;
use crate::round_gate::RoundGate;
use crate::systems;
use crate::world_setup;

/// Configuration for a new simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Power-up parameters. Out-of-range values are clamped.
    pub missile: MissileConfig,
    /// Maximum number of simultaneously allocated guidance units.
    pub arena_capacity: usize,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            missile: MissileConfig::default(),
            arena_capacity: DEFAULT_ARENA_CAPACITY,
            time_scale: 1.0,
        }
    }
}

/// The simulation engine. Owns the level world and all round state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    time_scale: f64,
    rng: ChaCha8Rng,
    command_queue: VecDeque<PlayerCommand>,
    events: Vec<SimEvent>,

    pool: TargetReservationPool,
    arena: MissileArena,
    orchestrator: SpawnOrchestrator,
    gate: RoundGate,
}

impl SimulationEngine {
    /// Create an engine with an empty level.
    pub fn new(config: SimConfig) -> Self {
        let orchestrator = SpawnOrchestrator::new(config.missile);
        let gate = RoundGate::new(&orchestrator);
        Self {
            world: World::new(),
            time: SimTime::default(),
            time_scale: config.time_scale.clamp(0.0, 4.0),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            events: Vec::new(),
            pool: TargetReservationPool::new(),
            arena: MissileArena::with_capacity(config.arena_capacity),
            orchestrator,
            gate,
        }
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance one fixed tick: `DT` scaled by the time scale in effect after
    /// this tick's commands.
    pub fn tick(&mut self) -> RoundSnapshot {
        self.process_commands();
        self.advance(DT * self.time_scale)
    }

    /// Advance by `dt` seconds and return the resulting snapshot.
    /// A non-positive `dt` only processes commands.
    pub fn step(&mut self, dt: f64) -> RoundSnapshot {
        self.process_commands();
        self.advance(dt)
    }

    fn advance(&mut self, dt: f64) -> RoundSnapshot {
        if dt > 0.0 {
            self.time.advance(dt);
            self.run_systems(dt);
        }
        self.refresh_gate();

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            self.gate.state(),
            &self.orchestrator,
            &self.arena,
            &self.pool,
            events,
        )
    }

    /// Spawn the launch origin.
    pub fn spawn_launcher(&mut self, position: Position) -> Entity {
        world_setup::spawn_launcher(&mut self.world, position)
    }

    /// Scatter `count` blocks above `center` using the engine RNG, then
    /// re-seed the pool from the level.
    pub fn spawn_random_level(
        &mut self,
        count: usize,
        special_ratio: f64,
        center: Position,
        spread: f64,
    ) -> Vec<Entity> {
        let blocks = world_setup::spawn_random_level(
            &mut self.world,
            &mut self.rng,
            count,
            special_ratio,
            center,
            spread,
        );
        self.pool.initialize(&self.world);
        blocks
    }

    /// Lay out a `rows x cols` block grid from `origin`, then re-seed the
    /// pool from the level.
    pub fn spawn_grid_level(
        &mut self,
        origin: Position,
        rows: u32,
        cols: u32,
        special_every: u32,
    ) -> Vec<Entity> {
        let blocks =
            world_setup::spawn_grid_level(&mut self.world, origin, rows, cols, special_every);
        self.pool.initialize(&self.world);
        blocks
    }

    /// Start the spawn sequence. No-op (false) unless `can_fire()` and a
    /// launcher exists.
    pub fn fire(&mut self) -> bool {
        let (orchestrator, mut ctx) = self.split();
        let fired = orchestrator.fire(&mut ctx);
        self.refresh_gate();
        fired
    }

    /// Press the power-up button. Fires only from the `Ready` state.
    pub fn press_fire_button(&mut self) -> bool {
        self.refresh_gate();
        if !self.gate.accepts_press(&self.orchestrator) {
            debug!(state = ?self.gate.state(), "fire button press ignored");
            return false;
        }
        self.fire()
    }

    /// Force-terminate every active missile and cancel a pending sequence.
    pub fn clear_active(&mut self) {
        let (orchestrator, mut ctx) = self.split();
        orchestrator.clear_active(&mut ctx);
        self.refresh_gate();
    }

    /// Re-arm the power-up and re-seed the pool from the level.
    pub fn reset_round(&mut self) {
        let (orchestrator, mut ctx) = self.split();
        orchestrator.reset_round(&mut ctx);
        self.refresh_gate();
    }

    /// Replace the power-up configuration (clamped into range).
    pub fn set_config(&mut self, config: MissileConfig) {
        self.orchestrator.set_config(config);
        self.refresh_gate();
    }

    /// Apply a contact detected outside the engine. The missile is reaped
    /// immediately on success.
    pub fn resolve_contact(&mut self, missile: MissileId, target: Entity) -> bool {
        let (orchestrator, mut ctx) = self.split();
        let hit = systems::contact::resolve_hit(&mut ctx, missile, target);
        if hit {
            orchestrator.reap(&mut ctx);
        }
        hit
    }

    pub fn can_fire(&self) -> bool {
        self.orchestrator.can_fire()
    }

    pub fn has_fired_this_round(&self) -> bool {
        self.orchestrator.has_fired_this_round()
    }

    pub fn active_count(&self) -> usize {
        self.orchestrator.active_count()
    }

    pub fn is_spawning(&self) -> bool {
        self.orchestrator.is_spawning()
    }

    /// Active missiles in spawn order.
    pub fn active_missiles(&self) -> &[MissileId] {
        self.orchestrator.active()
    }

    pub fn unit(&self, id: MissileId) -> Option<&GuidanceUnit> {
        self.arena.get(id)
    }

    pub fn button_state(&self) -> ButtonState {
        self.gate.state()
    }

    pub fn config(&self) -> &MissileConfig {
        self.orchestrator.config()
    }

    pub fn pool(&self) -> &TargetReservationPool {
        &self.pool
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Get a read-only reference to the level world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the level, for the surrounding game (moving the
    /// launcher, lighting blocks by other means).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Take the events emitted since the last snapshot.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    fn split(&mut self) -> (&mut SpawnOrchestrator, RoundContext<'_>) {
        (
            &mut self.orchestrator,
            RoundContext {
                world: &mut self.world,
                pool: &mut self.pool,
                arena: &mut self.arena,
                rng: &mut self.rng,
                events: &mut self.events,
                now: self.time.elapsed_secs,
            },
        )
    }

    fn refresh_gate(&mut self) {
        self.gate.refresh(&self.orchestrator, &mut self.events);
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::PressFireButton => {
                self.press_fire_button();
            }
            PlayerCommand::Fire => {
                self.fire();
            }
            PlayerCommand::ClearActive => self.clear_active(),
            PlayerCommand::ResetRound => self.reset_round(),
            PlayerCommand::SetConfig { config } => self.set_config(config),
            PlayerCommand::SetTimeScale { scale } => {
                self.time_scale = scale.clamp(0.0, 4.0);
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) {
        let (orchestrator, mut ctx) = self.split();
        // 1. Spawn sequence
        orchestrator.advance_spawns(&mut ctx);
        // 2. Guidance, in spawn order
        orchestrator.tick_units(dt, &mut ctx);
        // 3. Contact
        systems::contact::run(&mut ctx, orchestrator.active());
        // 4. Block motion
        systems::movement::run(ctx.world, dt);
        // 5. Return terminated units, round completion
        orchestrator.reap(&mut ctx);
    }
}
