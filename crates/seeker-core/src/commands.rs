//! Player and session commands sent to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::config::MissileConfig;

/// All possible actions from the player or the surrounding game session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// Press the power-up button. Ignored unless the button is ready.
    PressFireButton,
    /// Fire directly, bypassing the button.
    Fire,
    /// Force-terminate every active missile.
    ClearActive,
    /// Start a new round: re-arm the power-up and re-seed targets.
    ResetRound,
    /// Replace the missile configuration (clamped into range).
    SetConfig { config: MissileConfig },
    /// Set time scale (1.0 = normal, 0.0 = paused).
    SetTimeScale { scale: f64 },
}
