//! Missile/block contact resolution.
//!
//! After guidance, every active unit is tested against every valid block.
//! Overlap is `distance <= missile radius + BLOCK_RADIUS`; the nearest
//! overlapping block is hit. The hit block need not be the unit's own
//! reservation.

use glam::DVec2;
use hecs::{Entity, World};
use tracing::debug;

use seeker_core::components::{Block, Body, BlockState};
use seeker_core::constants::BLOCK_RADIUS;
use seeker_core::events::SimEvent;
use seeker_core::types::{MissileId, Position, Velocity};

use crate::orchestrator::RoundContext;
use crate::targets::{block_position, is_valid_target, neutralize, target_id};

/// Resolve contacts for `active` units. Returns the number of hits.
pub fn run(ctx: &mut RoundContext<'_>, active: &[MissileId]) -> usize {
    let mut hits = 0;
    for &id in active {
        let Some(unit) = ctx.arena.get(id) else {
            continue;
        };
        if !unit.is_active() {
            continue;
        }
        let reach = unit.radius() + BLOCK_RADIUS;
        if let Some(block) = nearest_overlap(ctx.world, unit.position(), reach) {
            if resolve_hit(ctx, id, block) {
                hits += 1;
            }
        }
    }
    hits
}

/// Nearest valid block within `reach` of `point`.
fn nearest_overlap(world: &World, point: DVec2, reach: f64) -> Option<Entity> {
    world
        .query::<(&Block, &BlockState, &Position)>()
        .iter()
        .filter(|(_, (_, state, _))| !state.lit)
        .map(|(entity, (_, _, pos))| (entity, pos.as_vec().distance(point)))
        .filter(|&(_, d)| d <= reach)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| entity)
}

/// Apply one missile/block contact: push the block, light it, take it out
/// of the pool and terminate the missile.
///
/// Returns false if the missile is not active or the block is not a valid
/// target, in which case nothing changes.
pub fn resolve_hit(ctx: &mut RoundContext<'_>, missile: MissileId, block: Entity) -> bool {
    let Some(unit) = ctx.arena.get(missile) else {
        return false;
    };
    if !unit.is_active() || !is_valid_target(ctx.world, block) {
        return false;
    }
    let (from, heading_dir, force) = (
        unit.position(),
        unit.velocity().normalize_or_zero(),
        unit.impact_force(),
    );

    if let Some(to) = block_position(ctx.world, block) {
        let dir = (to - from).try_normalize().unwrap_or(heading_dir);
        apply_impulse(ctx.world, block, dir * force);
    }
    light_block(ctx.world, block, ctx.events);
    ctx.pool.retire(block);

    let (arena, mut guidance) = ctx.split();
    if let Some(unit) = arena.get_mut(missile) {
        unit.register_hit(block, &mut guidance);
    }
    ctx.events.push(SimEvent::AnyHit);
    debug!(?missile, ?block, "missile hit block");
    true
}

/// Neutralize a block on contact and announce it.
pub fn light_block(world: &mut World, block: Entity, events: &mut Vec<SimEvent>) -> bool {
    if !neutralize(world, block) {
        return false;
    }
    events.push(SimEvent::BlockLit {
        target: target_id(block),
    });
    true
}

/// `Δv = impulse / mass` for blocks with a body and a velocity.
fn apply_impulse(world: &mut World, block: Entity, impulse: DVec2) {
    if impulse == DVec2::ZERO {
        return;
    }
    if let Ok((vel, body)) = world.query_one_mut::<(&mut Velocity, &Body)>(block) {
        if body.mass > 0.0 {
            let dv = impulse / body.mass;
            vel.x += dv.x;
            vel.y += dv.y;
        }
    }
}
