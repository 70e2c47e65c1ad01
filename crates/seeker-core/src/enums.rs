//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Guidance unit lifecycle phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissilePhase {
    /// Pooled, not yet initialized.
    #[default]
    Idle,
    /// Active with no target, re-trying acquisition every tick.
    Seeking,
    /// Holding a reserved target and steering toward it.
    Pursuing,
    /// Hit or expired. Terminal; waiting to be returned to the arena.
    Terminated,
}

/// Why a guidance unit terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationCause {
    /// Made contact with a block.
    Hit,
    /// Lifetime ran out.
    Expired,
    /// Force-terminated by the orchestrator (round abort or reset).
    Cleared,
}

/// Block classification. Anything other than `Regular` is "special".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    #[default]
    Regular,
    /// Explodes when lit.
    Exploding,
    /// Moves along a path.
    Moving,
}

impl BlockKind {
    pub fn is_special(self) -> bool {
        !matches!(self, BlockKind::Regular)
    }
}

/// The three logical states the fire button reflects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonState {
    #[default]
    Ready,
    Used,
    Disabled,
}

/// Outcome of returning a reservation to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseOutcome {
    /// Still valid, moved back to `available`.
    Returned,
    /// No longer valid (lit or despawned), dropped from the pool.
    Dropped,
    /// Was not reserved; nothing changed.
    NotReserved,
}
