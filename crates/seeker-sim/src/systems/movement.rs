//! Block motion.
//!
//! Pushed blocks slide with their velocity and slow down under linear damping.

use hecs::World;

use seeker_core::components::Block;
use seeker_core::constants::BLOCK_LINEAR_DAMPING;
use seeker_core::types::{Position, Velocity};

/// Integrate every moving block by `dt`.
pub fn run(world: &mut World, dt: f64) {
    let damping = (-BLOCK_LINEAR_DAMPING * dt).exp();
    for (_entity, (_block, pos, vel)) in world.query_mut::<(&Block, &mut Position, &mut Velocity)>() {
        pos.x += vel.x * dt;
        pos.y += vel.y * dt;
        vel.x *= damping;
        vel.y *= damping;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seeker_core::constants::DT;
    use seeker_core::enums::BlockKind;

    use crate::world_setup::{spawn_block, spawn_static_block};

    #[test]
    fn test_resting_block_stays_put() {
        let mut world = World::new();
        let e = spawn_block(&mut world, Position::new(1.0, 2.0), BlockKind::Regular);
        run(&mut world, DT);
        assert_eq!(*world.get::<&Position>(e).unwrap(), Position::new(1.0, 2.0));
    }

    #[test]
    fn test_pushed_block_slides_and_slows() {
        let mut world = World::new();
        let e = spawn_block(&mut world, Position::new(0.0, 0.0), BlockKind::Moving);
        *world.get::<&mut Velocity>(e).unwrap() = Velocity::new(4.0, 0.0);

        for _ in 0..60 {
            run(&mut world, DT);
        }
        let pos = *world.get::<&Position>(e).unwrap();
        let vel = *world.get::<&Velocity>(e).unwrap();
        assert!(pos.x > 1.0 && pos.x < 4.0, "x = {}", pos.x);
        assert!(vel.x < 1.0, "damped speed = {}", vel.x);
    }

    #[test]
    fn test_static_block_has_no_velocity() {
        let mut world = World::new();
        let e = spawn_static_block(&mut world, Position::new(3.0, 3.0), BlockKind::Regular);
        run(&mut world, DT);
        assert!(world.get::<&Velocity>(e).is_err());
    }
}
