//! Snapshot system: builds a `RoundSnapshot` from the current round state.

use hecs::World;

use seeker_core::components::{Block, BlockState};
use seeker_core::enums::ButtonState;
use seeker_core::events::SimEvent;
use seeker_core::state::{LevelView, MissileView, PoolView, RoundSnapshot};
use seeker_core::types::{Position, SimTime, Velocity};

use crate::arena::MissileArena;
use crate::orchestrator::SpawnOrchestrator;
use crate::reservation::TargetReservationPool;
use crate::targets::target_id;

/// Build the snapshot for the tick that just ran.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    button: ButtonState,
    orchestrator: &SpawnOrchestrator,
    arena: &MissileArena,
    pool: &TargetReservationPool,
    events: Vec<SimEvent>,
) -> RoundSnapshot {
    let missiles = orchestrator
        .active()
        .iter()
        .filter_map(|&id| arena.get(id))
        .map(|unit| MissileView {
            id: unit.id(),
            phase: unit.phase(),
            position: Position::from_vec(unit.position()),
            velocity: Velocity::from_vec(unit.velocity()),
            heading_deg: unit.heading().to_degrees(),
            target: unit.target().map(target_id),
            lifetime_secs: unit.lifetime_secs(),
        })
        .collect();

    RoundSnapshot {
        time: *time,
        button,
        can_fire: orchestrator.can_fire(),
        has_fired_this_round: orchestrator.has_fired_this_round(),
        is_spawning: orchestrator.is_spawning(),
        missiles,
        pool: PoolView {
            available: pool.available_count() as u32,
            reserved: pool.reserved_count() as u32,
        },
        level: level_view(world),
        events,
    }
}

fn level_view(world: &World) -> LevelView {
    let mut view = LevelView::default();
    for (_entity, (_block, state)) in world.query::<(&Block, &BlockState)>().iter() {
        view.blocks_total += 1;
        if state.lit {
            view.blocks_lit += 1;
        }
    }
    view
}
