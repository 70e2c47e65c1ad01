//! Read and neutralize helpers for target blocks.
//!
//! Blocks are only ever referenced by `hecs::Entity`. The handle does not keep
//! the block alive, so every read goes through these helpers and re-checks
//! that the block still exists and is unlit.

use glam::DVec2;
use hecs::{Entity, World};

use seeker_core::components::{Block, BlockState};
use seeker_core::enums::BlockKind;
use seeker_core::types::{Position, TargetId};

/// A block is a valid target while it exists and is not lit.
pub fn is_valid_target(world: &World, entity: Entity) -> bool {
    match world.get::<&BlockState>(entity) {
        Ok(state) => !state.lit && world.get::<&Block>(entity).is_ok(),
        Err(_) => false,
    }
}

/// Classification of a block, if it exists.
pub fn block_kind(world: &World, entity: Entity) -> Option<BlockKind> {
    world.get::<&Block>(entity).ok().map(|block| block.kind)
}

/// Current position of a block, if it exists.
pub fn block_position(world: &World, entity: Entity) -> Option<DVec2> {
    world
        .get::<&Position>(entity)
        .ok()
        .map(|pos| pos.as_vec())
}

/// Mark a block lit. Returns false if it was already lit or does not exist.
pub fn neutralize(world: &mut World, entity: Entity) -> bool {
    match world.get::<&mut BlockState>(entity) {
        Ok(mut state) if !state.lit => {
            state.lit = true;
            true
        }
        _ => false,
    }
}

/// Identity carried in events and snapshots.
pub fn target_id(entity: Entity) -> TargetId {
    TargetId(entity.to_bits().get())
}
