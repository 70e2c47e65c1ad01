//! ECS systems that operate on the level world each tick.
//!
//! Systems are plain functions over the world and the round's collaborators.
//! They own no state.

pub mod contact;
pub mod movement;
pub mod snapshot;
