//! Target reservation pool: which blocks are currently being pursued.
//!
//! Partitions the round's eligible blocks into `available` and `reserved`.
//! Every mutation moves a block between the two sets in one step, so the sets
//! stay disjoint and a block is reserved by at most one guidance unit.
//! Ordered sets keep candidate order, and therefore seeded random picks,
//! reproducible.

use std::collections::BTreeSet;

use hecs::{Entity, World};
use rand::Rng;
use tracing::{debug, warn};

use seeker_core::components::{Block, BlockState};
use seeker_core::enums::{BlockKind, ReleaseOutcome};

use crate::targets::{block_kind, is_valid_target};

/// Candidate narrowing applied on top of the validity check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetFilter {
    /// Skip special blocks while any regular block is available.
    /// Never narrows the candidate set to nothing.
    pub prioritize_regular: bool,
}

impl TargetFilter {
    fn narrow(&self, world: &World, candidates: Vec<Entity>) -> Vec<Entity> {
        if !self.prioritize_regular {
            return candidates;
        }
        let regular: Vec<Entity> = candidates
            .iter()
            .copied()
            .filter(|&e| block_kind(world, e) == Some(BlockKind::Regular))
            .collect();
        if regular.is_empty() {
            candidates
        } else {
            regular
        }
    }
}

#[derive(Debug, Default)]
pub struct TargetReservationPool {
    available: BTreeSet<Entity>,
    reserved: BTreeSet<Entity>,
}

impl TargetReservationPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear both sets and make every unlit block in the world available.
    /// Returns the number of available targets. An empty world yields an
    /// empty pool, not an error.
    pub fn initialize(&mut self, world: &World) -> usize {
        let blocks: Vec<Entity> = world
            .query::<(&Block, &BlockState)>()
            .iter()
            .filter(|(_, (_, state))| !state.lit)
            .map(|(entity, _)| entity)
            .collect();
        let total = world.query::<&Block>().iter().count();
        let count = self.seed(world, blocks);

        if count == 0 {
            warn!(total_blocks = total, "target pool initialized with no valid targets");
        } else {
            debug!(valid = count, total_blocks = total, "target pool initialized");
        }
        count
    }

    /// Clear both sets and make the valid members of `candidates` available.
    pub fn seed(&mut self, world: &World, candidates: impl IntoIterator<Item = Entity>) -> usize {
        self.available.clear();
        self.reserved.clear();
        self.available.extend(
            candidates
                .into_iter()
                .filter(|&e| is_valid_target(world, e)),
        );
        self.available.len()
    }

    /// Reserve one available target chosen uniformly at random among the
    /// valid candidates that pass `filter`.
    ///
    /// Invalid members met during the scan are evicted from the pool.
    pub fn acquire<R: Rng + ?Sized>(
        &mut self,
        world: &World,
        rng: &mut R,
        filter: TargetFilter,
    ) -> Option<Entity> {
        let before = self.available.len();
        self.available.retain(|&e| is_valid_target(world, e));
        let evicted = before - self.available.len();
        if evicted > 0 {
            debug!(evicted, "evicted neutralized targets from pool");
        }

        if self.available.is_empty() {
            return None;
        }

        let candidates = filter.narrow(world, self.available.iter().copied().collect());
        let chosen = candidates[rng.gen_range(0..candidates.len())];

        self.available.remove(&chosen);
        self.reserved.insert(chosen);
        Some(chosen)
    }

    /// Return a reservation. The block goes back to `available` only if it is
    /// still valid; a lit or despawned block is dropped from the pool.
    pub fn release(&mut self, world: &World, target: Entity) -> ReleaseOutcome {
        if !self.reserved.remove(&target) {
            return ReleaseOutcome::NotReserved;
        }
        if is_valid_target(world, target) {
            self.available.insert(target);
            ReleaseOutcome::Returned
        } else {
            ReleaseOutcome::Dropped
        }
    }

    /// Return every reservation (round abort). Returns how many went back
    /// to `available`.
    pub fn release_all(&mut self, world: &World) -> usize {
        let reserved = std::mem::take(&mut self.reserved);
        let mut returned = 0;
        for target in reserved {
            if is_valid_target(world, target) {
                self.available.insert(target);
                returned += 1;
            }
        }
        returned
    }

    /// Remove a block from the pool entirely (it was hit).
    pub fn retire(&mut self, target: Entity) -> bool {
        let was_reserved = self.reserved.remove(&target);
        let was_available = self.available.remove(&target);
        was_reserved || was_available
    }

    pub fn is_available(&self, target: Entity) -> bool {
        self.available.contains(&target)
    }

    pub fn is_reserved(&self, target: Entity) -> bool {
        self.reserved.contains(&target)
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    pub fn reserved_count(&self) -> usize {
        self.reserved.len()
    }

    pub fn available(&self) -> impl Iterator<Item = Entity> + '_ {
        self.available.iter().copied()
    }

    /// True if no block is both available and reserved.
    pub fn is_disjoint(&self) -> bool {
        self.available.is_disjoint(&self.reserved)
    }
}
