//! Round state snapshot: the complete visible state handed to consumers each tick.

use serde::{Deserialize, Serialize};

use crate::enums::{ButtonState, MissilePhase};
use crate::events::SimEvent;
use crate::types::{MissileId, Position, SimTime, TargetId, Velocity};

/// Complete power-up state after one tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub time: SimTime,
    pub button: ButtonState,
    pub can_fire: bool,
    pub has_fired_this_round: bool,
    pub is_spawning: bool,
    /// Active missiles in spawn order.
    pub missiles: Vec<MissileView>,
    pub pool: PoolView,
    pub level: LevelView,
    /// Events emitted since the previous snapshot, in emission order.
    pub events: Vec<SimEvent>,
}

/// One active guidance unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissileView {
    pub id: MissileId,
    pub phase: MissilePhase,
    pub position: Position,
    pub velocity: Velocity,
    /// Heading in degrees (0 = +x, counter-clockwise).
    pub heading_deg: f64,
    pub target: Option<TargetId>,
    pub lifetime_secs: f64,
}

/// Reservation pool occupancy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PoolView {
    pub available: u32,
    pub reserved: u32,
}

/// Level progress.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LevelView {
    pub blocks_total: u32,
    pub blocks_lit: u32,
}
