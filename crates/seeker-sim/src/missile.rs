//! Guidance unit: one seeking missile and its state machine.
//!
//! `Idle` (pooled) → `Seeking` (no target) ⇄ `Pursuing` (holds a reservation)
//! → `Terminated` (hit, expired or cleared). The `active` flag drops in the
//! same call that emits the destroyed notification, so every later tick or
//! termination request is a no-op.

use glam::DVec2;
use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use seeker_core::config::MissileConfig;
use seeker_core::constants::TIME_EPSILON;
use seeker_core::enums::{MissilePhase, TerminationCause};
use seeker_core::events::SimEvent;
use seeker_core::types::MissileId;

use crate::guidance::{self, SteeringParams, SteeringState};
use crate::reservation::{TargetFilter, TargetReservationPool};
use crate::targets::{block_position, is_valid_target, target_id};

/// Per-unit parameters captured from the config at `initialize`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuidanceParams {
    pub steering: SteeringParams,
    pub max_lifetime_secs: f64,
    pub impact_force: f64,
    pub radius: f64,
    pub filter: TargetFilter,
}

impl GuidanceParams {
    pub fn from_config(config: &MissileConfig) -> Self {
        Self {
            steering: SteeringParams {
                speed: config.speed,
                turn_rate: config.rotation_speed_rad_per_sec(),
            },
            max_lifetime_secs: config.max_lifetime_sec,
            impact_force: config.impact_force,
            radius: config.missile_radius(),
            filter: TargetFilter {
                prioritize_regular: config.prioritize_regular_targets,
            },
        }
    }
}

/// Shared services a unit touches while ticking.
pub struct GuidanceContext<'a> {
    pub world: &'a World,
    pub pool: &'a mut TargetReservationPool,
    pub rng: &'a mut ChaCha8Rng,
    pub events: &'a mut Vec<SimEvent>,
}

#[derive(Debug, Clone)]
pub struct GuidanceUnit {
    id: MissileId,
    phase: MissilePhase,
    active: bool,
    steering: SteeringState,
    target: Option<Entity>,
    lifetime_secs: f64,
    params: GuidanceParams,
}

impl GuidanceUnit {
    /// A pooled unit. Does nothing until `initialize`.
    pub fn idle(id: MissileId) -> Self {
        Self {
            id,
            phase: MissilePhase::Idle,
            active: false,
            steering: SteeringState::default(),
            target: None,
            lifetime_secs: 0.0,
            params: GuidanceParams::from_config(&MissileConfig::default()),
        }
    }

    /// `Idle → Seeking`, then an immediate acquisition attempt.
    pub fn initialize(
        &mut self,
        params: GuidanceParams,
        position: DVec2,
        ctx: &mut GuidanceContext<'_>,
    ) {
        self.params = params;
        self.lifetime_secs = 0.0;
        self.target = None;
        self.steering = SteeringState {
            position,
            velocity: DVec2::ZERO,
            heading: 0.0,
        };
        self.active = true;
        self.phase = MissilePhase::Seeking;
        self.acquire(ctx);
    }

    /// Advance one tick: lifetime, target re-validation, acquisition, steering.
    pub fn tick(&mut self, dt: f64, ctx: &mut GuidanceContext<'_>) {
        if !self.active {
            return;
        }

        self.lifetime_secs += dt;
        if self.lifetime_secs + TIME_EPSILON >= self.params.max_lifetime_secs {
            self.terminate(TerminationCause::Expired, ctx);
            return;
        }

        self.revalidate_target(ctx);
        if self.target.is_none() {
            self.acquire(ctx);
        }

        match self.target.and_then(|t| block_position(ctx.world, t)) {
            Some(target_pos) => {
                guidance::steer_toward(&mut self.steering, target_pos, &self.params.steering, dt)
            }
            None => guidance::coast(&mut self.steering, dt),
        }
    }

    /// Contact with `block`. The reservation on `block` is consumed, not
    /// released; a different held reservation goes back to the pool.
    pub fn register_hit(&mut self, block: Entity, ctx: &mut GuidanceContext<'_>) -> bool {
        if !self.active {
            return false;
        }
        if self.target == Some(block) {
            self.target = None;
        }
        ctx.events.push(SimEvent::MissileHitTarget {
            missile: self.id,
            target: target_id(block),
        });
        self.terminate(TerminationCause::Hit, ctx)
    }

    /// Enter `Terminated`, returning any held reservation to the pool.
    /// Idempotent: only the first call has any effect and it returns true.
    pub fn terminate(&mut self, cause: TerminationCause, ctx: &mut GuidanceContext<'_>) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.phase = MissilePhase::Terminated;

        if let Some(target) = self.target.take() {
            let outcome = ctx.pool.release(ctx.world, target);
            debug!(missile = ?self.id, ?target, ?outcome, "reservation released");
        }

        ctx.events.push(SimEvent::MissileDestroyed {
            missile: self.id,
            cause,
        });
        debug!(missile = ?self.id, ?cause, lifetime = self.lifetime_secs, "missile terminated");
        true
    }

    /// `Pursuing → Seeking` when the held block was lit or removed.
    fn revalidate_target(&mut self, ctx: &mut GuidanceContext<'_>) {
        let Some(target) = self.target else {
            return;
        };
        if is_valid_target(ctx.world, target) {
            return;
        }

        // The pool drops invalid blocks on release, so this never
        // puts the lost block back in `available`.
        ctx.pool.release(ctx.world, target);
        self.target = None;
        self.phase = MissilePhase::Seeking;
        ctx.events.push(SimEvent::TargetLost {
            missile: self.id,
            target: target_id(target),
        });
        debug!(missile = ?self.id, ?target, "held target lost");
    }

    fn acquire(&mut self, ctx: &mut GuidanceContext<'_>) {
        match ctx.pool.acquire(ctx.world, ctx.rng, self.params.filter) {
            Some(target) => {
                self.target = Some(target);
                self.phase = MissilePhase::Pursuing;
                ctx.events.push(SimEvent::TargetAcquired {
                    missile: self.id,
                    target: target_id(target),
                });
                debug!(
                    missile = ?self.id,
                    ?target,
                    available = ctx.pool.available_count(),
                    reserved = ctx.pool.reserved_count(),
                    "target acquired"
                );
            }
            None => self.phase = MissilePhase::Seeking,
        }
    }

    pub fn id(&self) -> MissileId {
        self.id
    }

    pub fn phase(&self) -> MissilePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn position(&self) -> DVec2 {
        self.steering.position
    }

    pub fn velocity(&self) -> DVec2 {
        self.steering.velocity
    }

    /// Radians, 0 = +x, counter-clockwise.
    pub fn heading(&self) -> f64 {
        self.steering.heading
    }

    pub fn lifetime_secs(&self) -> f64 {
        self.lifetime_secs
    }

    pub fn radius(&self) -> f64 {
        self.params.radius
    }

    pub fn impact_force(&self) -> f64 {
        self.params.impact_force
    }
}
