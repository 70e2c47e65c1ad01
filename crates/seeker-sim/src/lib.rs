//! Simulation engine for the seeking-missile power-up.
//!
//! Owns the hecs world of targets, the target reservation pool, the missile
//! arena and the spawn orchestrator, advances them one tick at a time,
//! and produces `RoundSnapshot`s for consumers.

pub mod arena;
pub mod engine;
pub mod guidance;
pub mod missile;
pub mod orchestrator;
pub mod reservation;
pub mod round_gate;
pub mod systems;
pub mod targets;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use seeker_core as core;

#[cfg(test)]
mod tests;
