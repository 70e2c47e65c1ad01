//! Spawn orchestrator: the per-round fire sequence and the active list.
//!
//! `fire()` starts a spawn sequence that suspends `spawnDelay` simulated
//! seconds between spawns. The sequence is plain data polled every tick by
//! `advance_spawns`, so cancelling it is just dropping it: a cleared or
//! reset round never emits another spawn from the old sequence.
//!
//! Only the orchestrator touches the active list. Units report their own
//! termination through their `active` flag and are reaped at the end of
//! the tick.

use std::f64::consts::TAU;

use glam::DVec2;
use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use seeker_core::config::MissileConfig;
use seeker_core::constants::{SPAWN_JITTER_RADIUS, TIME_EPSILON};
use seeker_core::enums::TerminationCause;
use seeker_core::events::SimEvent;
use seeker_core::types::{MissileId, Position};

use crate::arena::MissileArena;
use crate::missile::{GuidanceContext, GuidanceParams};
use crate::reservation::TargetReservationPool;
use crate::world_setup::launcher_position;

/// Mutable borrows of everything the round logic operates on for one call.
pub struct RoundContext<'a> {
    pub world: &'a mut World,
    pub pool: &'a mut TargetReservationPool,
    pub arena: &'a mut MissileArena,
    pub rng: &'a mut ChaCha8Rng,
    pub events: &'a mut Vec<SimEvent>,
    /// Simulation time of the call, in seconds.
    pub now: f64,
}

impl RoundContext<'_> {
    /// Split into the arena and the services a guidance unit ticks against.
    pub fn split(&mut self) -> (&mut MissileArena, GuidanceContext<'_>) {
        (
            &mut *self.arena,
            GuidanceContext {
                world: &*self.world,
                pool: &mut *self.pool,
                rng: &mut *self.rng,
                events: &mut *self.events,
            },
        )
    }
}

/// An in-flight spawn sequence.
#[derive(Debug, Clone, Copy)]
struct SpawnSequence {
    remaining: u32,
    spawned: u32,
    next_spawn_at: f64,
    /// Launch origin resolved at fire time. Used if the launcher disappears
    /// mid-sequence.
    origin: Position,
}

#[derive(Debug, Clone)]
pub struct SpawnOrchestrator {
    config: MissileConfig,
    used_this_round: bool,
    sequence: Option<SpawnSequence>,
    /// Live units in spawn order.
    active: Vec<MissileId>,
}

impl SpawnOrchestrator {
    pub fn new(config: MissileConfig) -> Self {
        Self {
            config: config.clamped(),
            used_this_round: false,
            sequence: None,
            active: Vec::new(),
        }
    }

    /// Enabled, not yet used this round and not mid-sequence.
    pub fn can_fire(&self) -> bool {
        self.config.enabled && !self.used_this_round && self.sequence.is_none()
    }

    /// Start the round's spawn sequence. The first missile spawns immediately.
    ///
    /// Returns false (and changes nothing) if firing is not allowed or no
    /// launch origin exists.
    pub fn fire(&mut self, ctx: &mut RoundContext<'_>) -> bool {
        if !self.can_fire() {
            debug!(
                enabled = self.config.enabled,
                used = self.used_this_round,
                spawning = self.is_spawning(),
                "fire ignored"
            );
            return false;
        }
        let Some(origin) = launcher_position(ctx.world) else {
            warn!("fire ignored: no launch origin in the world");
            return false;
        };

        self.clear_active(ctx);
        let available = ctx.pool.initialize(ctx.world);

        self.used_this_round = true;
        self.sequence = Some(SpawnSequence {
            remaining: self.config.missile_count,
            spawned: 0,
            next_spawn_at: ctx.now,
            origin,
        });
        info!(
            missiles = self.config.missile_count,
            available_targets = available,
            at = ctx.now,
            "seeking missiles fired"
        );

        self.advance_spawns(ctx);
        true
    }

    /// Spawn the next missile if the sequence is due. At most one spawn per
    /// call, so consecutive spawns are always at least `spawnDelay` apart.
    pub fn advance_spawns(&mut self, ctx: &mut RoundContext<'_>) {
        let Some(mut seq) = self.sequence else {
            return;
        };
        if seq.next_spawn_at > ctx.now + TIME_EPSILON {
            return;
        }

        if let Some(pos) = launcher_position(ctx.world) {
            seq.origin = pos;
        }
        if self.spawn_one(seq.origin, ctx) {
            seq.spawned += 1;
        }
        seq.remaining -= 1;

        if seq.remaining == 0 {
            self.sequence = None;
            ctx.events.push(SimEvent::MissilesSpawned { count: seq.spawned });
            info!(spawned = seq.spawned, active = self.active.len(), "spawn sequence finished");
            if self.active.is_empty() {
                self.complete_round(ctx);
            }
        } else {
            seq.next_spawn_at = ctx.now + self.config.spawn_delay_sec;
            self.sequence = Some(seq);
        }
    }

    /// Take one unit from the arena, place it near `origin` and initialize it.
    fn spawn_one(&mut self, origin: Position, ctx: &mut RoundContext<'_>) -> bool {
        let Some(id) = ctx.arena.acquire() else {
            warn!(
                capacity = ctx.arena.capacity(),
                "missile arena exhausted, spawn skipped"
            );
            return false;
        };

        let angle = ctx.rng.gen_range(0.0..TAU);
        let radius = SPAWN_JITTER_RADIUS * ctx.rng.gen::<f64>().sqrt();
        let position = origin.as_vec() + DVec2::from_angle(angle) * radius;
        let params = GuidanceParams::from_config(&self.config);

        ctx.events.push(SimEvent::MissileLaunched {
            missile: id,
            position: Position::from_vec(position),
            at_secs: ctx.now,
        });
        if self.config.include_in_camera_tracking {
            ctx.events.push(SimEvent::CameraTrackRequested {
                missile: id,
                duration_secs: self.config.camera_tracking_duration_sec,
            });
        }

        let (arena, mut guidance) = ctx.split();
        if let Some(unit) = arena.get_mut(id) {
            unit.initialize(params, position, &mut guidance);
        }
        self.active.push(id);
        debug!(missile = ?id, x = position.x, y = position.y, "missile spawned");
        true
    }

    /// Tick every active unit in spawn order.
    pub fn tick_units(&self, dt: f64, ctx: &mut RoundContext<'_>) {
        for &id in &self.active {
            let (arena, mut guidance) = ctx.split();
            if let Some(unit) = arena.get_mut(id) {
                unit.tick(dt, &mut guidance);
            }
        }
    }

    /// Return terminated units to the arena. Emits `RoundCompleted` when the
    /// last unit of a finished sequence goes.
    pub fn reap(&mut self, ctx: &mut RoundContext<'_>) -> usize {
        let arena = &mut *ctx.arena;
        let before = self.active.len();
        self.active.retain(|&id| {
            let alive = arena.get(id).is_some_and(|unit| unit.is_active());
            if !alive {
                arena.release(id);
            }
            alive
        });
        let reaped = before - self.active.len();

        // Units lost between spawns leave the list empty mid-sequence; the
        // round only completes once the sequence is done too.
        if reaped > 0 && self.active.is_empty() && self.sequence.is_none() {
            self.complete_round(ctx);
        }
        reaped
    }

    fn complete_round(&self, ctx: &mut RoundContext<'_>) {
        ctx.events.push(SimEvent::RoundCompleted);
        info!(
            at = ctx.now,
            targets_left = ctx.pool.available_count(),
            "seeking missile round completed"
        );
    }

    /// Force-terminate every active unit and cancel any in-flight sequence.
    /// Does not count as round completion.
    pub fn clear_active(&mut self, ctx: &mut RoundContext<'_>) {
        if let Some(seq) = self.sequence.take() {
            debug!(remaining = seq.remaining, "spawn sequence cancelled");
        }

        let cleared = self.active.len();
        for id in std::mem::take(&mut self.active) {
            let (arena, mut guidance) = ctx.split();
            if let Some(unit) = arena.get_mut(id) {
                unit.terminate(TerminationCause::Cleared, &mut guidance);
            }
            ctx.arena.release(id);
        }

        // Catches reservations whose holder bypassed its own release.
        let returned = ctx.pool.release_all(ctx.world);
        if cleared > 0 || returned > 0 {
            debug!(cleared, returned, "active missiles cleared");
        }
    }

    /// Reopen firing for a new round and re-seed the pool from the level.
    pub fn reset_round(&mut self, ctx: &mut RoundContext<'_>) {
        self.used_this_round = false;
        self.clear_active(ctx);
        let available = ctx.pool.initialize(ctx.world);
        info!(available_targets = available, "seeking missile round reset");
    }

    /// Replace the configuration. Applies to missiles spawned afterwards.
    pub fn set_config(&mut self, config: MissileConfig) {
        self.config = config.clamped();
    }

    pub fn config(&self) -> &MissileConfig {
        &self.config
    }

    /// Active units in spawn order.
    pub fn active(&self) -> &[MissileId] {
        &self.active
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_spawning(&self) -> bool {
        self.sequence.is_some()
    }

    pub fn has_fired_this_round(&self) -> bool {
        self.used_this_round
    }
}
