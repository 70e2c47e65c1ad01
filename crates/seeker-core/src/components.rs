//! ECS components for hecs entities.
//!
//! Components are plain data structs with no behavior.
//! Game logic lives in systems, not components.

use serde::{Deserialize, Serialize};

use crate::enums::BlockKind;

/// A destructible block in the level. Blocks are the missiles' targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
}

/// Mutable gameplay state of a block.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BlockState {
    /// A lit block is neutralized: no longer a valid target.
    pub lit: bool,
}

/// Rigid body parameters for blocks that can be pushed by impacts.
/// Blocks without a `Body` ignore impact impulses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Body {
    pub mass: f64,
}

/// Marks the launch origin (the player).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Launcher;
