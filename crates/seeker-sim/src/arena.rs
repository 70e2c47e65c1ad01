//! Bounded allocator for guidance units.
//!
//! Slots are generational, so a stale `MissileId` held by a caller after
//! release resolves to nothing instead of aliasing a newer missile.

use slotmap::SlotMap;

use seeker_core::types::MissileId;

use crate::missile::GuidanceUnit;

#[derive(Debug, Clone)]
pub struct MissileArena {
    units: SlotMap<MissileId, GuidanceUnit>,
    capacity: usize,
}

impl MissileArena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            units: SlotMap::with_capacity_and_key(capacity),
            capacity,
        }
    }

    /// Hand out an idle unit, or `None` when every slot is in use.
    pub fn acquire(&mut self) -> Option<MissileId> {
        if self.units.len() >= self.capacity {
            return None;
        }
        Some(self.units.insert_with_key(GuidanceUnit::idle))
    }

    /// Return a unit to the allocator. False if the id was already released.
    pub fn release(&mut self, id: MissileId) -> bool {
        self.units.remove(id).is_some()
    }

    pub fn get(&self, id: MissileId) -> Option<&GuidanceUnit> {
        self.units.get(id)
    }

    pub fn get_mut(&mut self, id: MissileId) -> Option<&mut GuidanceUnit> {
        self.units.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
