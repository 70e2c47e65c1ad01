//! Events emitted by the simulation for UI, camera and scoring consumers.

use serde::{Deserialize, Serialize};

use crate::enums::{ButtonState, TerminationCause};
use crate::types::{MissileId, Position, TargetId};

/// Everything the simulation reports outward. Collected per tick and
/// delivered with the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A guidance unit was created by the spawn sequence.
    MissileLaunched {
        missile: MissileId,
        position: Position,
        at_secs: f64,
    },
    /// Ask the camera to follow a missile for a while.
    CameraTrackRequested {
        missile: MissileId,
        duration_secs: f64,
    },
    /// A unit reserved a target.
    TargetAcquired { missile: MissileId, target: TargetId },
    /// A unit's held target was neutralized or removed before contact.
    TargetLost { missile: MissileId, target: TargetId },
    /// Per-unit hit notification.
    MissileHitTarget { missile: MissileId, target: TargetId },
    /// Round-level hit notification (one per hit, any unit).
    AnyHit,
    /// Per-unit destroyed notification. Emitted exactly once per unit.
    MissileDestroyed {
        missile: MissileId,
        cause: TerminationCause,
    },
    /// A block was lit by a missile contact.
    BlockLit { target: TargetId },
    /// The spawn sequence finished.
    MissilesSpawned { count: u32 },
    /// Every missile of the round terminated naturally.
    RoundCompleted,
    /// The fire button changed state.
    ButtonStateChanged { state: ButtonState },
}
