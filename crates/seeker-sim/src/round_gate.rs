//! Fire button state, derived from the orchestrator.

use tracing::debug;

use seeker_core::enums::ButtonState;
use seeker_core::events::SimEvent;

use crate::orchestrator::SpawnOrchestrator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundGate {
    state: ButtonState,
}

impl RoundGate {
    pub fn new(orchestrator: &SpawnOrchestrator) -> Self {
        Self {
            state: Self::evaluate(orchestrator),
        }
    }

    /// `Used` once fired this round, otherwise `Ready` if firing is allowed,
    /// otherwise `Disabled`.
    pub fn evaluate(orchestrator: &SpawnOrchestrator) -> ButtonState {
        if orchestrator.has_fired_this_round() {
            ButtonState::Used
        } else if orchestrator.can_fire() {
            ButtonState::Ready
        } else {
            ButtonState::Disabled
        }
    }

    /// Re-derive the state. Emits `ButtonStateChanged` and returns true if it
    /// changed.
    pub fn refresh(&mut self, orchestrator: &SpawnOrchestrator, events: &mut Vec<SimEvent>) -> bool {
        let next = Self::evaluate(orchestrator);
        if next == self.state {
            return false;
        }
        debug!(from = ?self.state, to = ?next, "fire button state changed");
        self.state = next;
        events.push(SimEvent::ButtonStateChanged { state: next });
        true
    }

    /// Whether a press should turn into a fire request.
    pub fn accepts_press(&self, orchestrator: &SpawnOrchestrator) -> bool {
        self.state == ButtonState::Ready && !orchestrator.has_fired_this_round()
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }
}
