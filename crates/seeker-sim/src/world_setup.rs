//! Entity spawn factories for setting up a level.
//!
//! Creates the launcher and block entities with the appropriate
//! component bundles.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use seeker_core::components::*;
use seeker_core::constants::*;
use seeker_core::enums::BlockKind;
use seeker_core::types::{Position, Velocity};

/// Spawn the launch origin (the player).
pub fn spawn_launcher(world: &mut World, position: Position) -> Entity {
    world.spawn((Launcher, position))
}

/// Move every launcher to `position`.
pub fn move_launcher(world: &mut World, position: Position) {
    for (_entity, (_launcher, pos)) in world.query_mut::<(&Launcher, &mut Position)>() {
        *pos = position;
    }
}

/// Position of the first launcher, if any.
pub fn launcher_position(world: &World) -> Option<Position> {
    world
        .query::<(&Launcher, &Position)>()
        .iter()
        .next()
        .map(|(_, (_, pos))| *pos)
}

/// Spawn a block that can be pushed by impacts.
pub fn spawn_block(world: &mut World, position: Position, kind: BlockKind) -> Entity {
    world.spawn((
        Block { kind },
        BlockState::default(),
        position,
        Velocity::default(),
        Body {
            mass: DEFAULT_BLOCK_MASS,
        },
    ))
}

/// Spawn a block that ignores impact impulses.
pub fn spawn_static_block(world: &mut World, position: Position, kind: BlockKind) -> Entity {
    world.spawn((Block { kind }, BlockState::default(), position))
}

/// Spawn a `rows x cols` grid of blocks whose lower-left corner is `origin`.
/// Every `special_every`-th block (1-based, 0 = never) is special,
/// alternating between exploding and moving.
pub fn spawn_grid_level(
    world: &mut World,
    origin: Position,
    rows: u32,
    cols: u32,
    special_every: u32,
) -> Vec<Entity> {
    let mut blocks = Vec::with_capacity((rows * cols) as usize);
    let mut specials = 0;
    for row in 0..rows {
        for col in 0..cols {
            let index = row * cols + col + 1;
            let kind = if special_every > 0 && index % special_every == 0 {
                specials += 1;
                if specials % 2 == 1 {
                    BlockKind::Exploding
                } else {
                    BlockKind::Moving
                }
            } else {
                BlockKind::Regular
            };
            let position = Position::new(
                origin.x + col as f64 * LEVEL_GRID_SPACING,
                origin.y + row as f64 * LEVEL_GRID_SPACING,
            );
            blocks.push(spawn_block(world, position, kind));
        }
    }
    blocks
}

/// Spawn `count` blocks scattered uniformly in a `spread`-sized square above
/// `center`. `special_ratio` is the chance each block is special.
pub fn spawn_random_level(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    count: usize,
    special_ratio: f64,
    center: Position,
    spread: f64,
) -> Vec<Entity> {
    let spread = spread.max(0.0);
    let half = spread * 0.5;
    (0..count)
        .map(|_| {
            let position = Position::new(
                center.x + rng.gen_range(-half..=half),
                center.y + rng.gen_range(0.0..=spread),
            );
            let kind = if rng.gen_bool(special_ratio.clamp(0.0, 1.0)) {
                if rng.gen_bool(0.5) {
                    BlockKind::Exploding
                } else {
                    BlockKind::Moving
                }
            } else {
                BlockKind::Regular
            };
            spawn_block(world, position, kind)
        })
        .collect()
}
