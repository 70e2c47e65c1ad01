//! Headless runner for the seeking-missile simulation.
//!
//! Runs the engine on a game-loop thread fed by command channels and
//! drives whole rounds from the calling thread.

pub mod config;
pub mod game_loop;
pub mod session;

pub use seeker_core as core;
