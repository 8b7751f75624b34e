//! Capacity-bounded, FIFO-queued resource slots.

use std::collections::VecDeque;

use bps_core::{CaseId, Resource, ResourceId};

use crate::{SimError, SimResult};

/// Proof of holding one unit of a resource's capacity.
///
/// Not `Clone`: releasing consumes the token, so a slot cannot be released
/// twice.
#[derive(Debug, PartialEq, Eq)]
pub struct Slot {
    resource: ResourceId,
}

impl Slot {
    pub fn resource(&self) -> ResourceId {
        self.resource
    }
}

/// Outcome of [`ResourcePool::acquire`].
#[derive(Debug, PartialEq, Eq)]
pub enum Acquire {
    Granted(Slot),
    /// The case was appended to the resource's wait queue.  It receives its
    /// slot from a later [`ResourcePool::release`].
    Queued,
}

#[derive(Clone, Debug)]
struct SlotState {
    capacity: u32,
    in_use:   u32,
    waiters:  VecDeque<CaseId>,
}

/// Per-resource occupancy, indexed by `ResourceId`.
#[derive(Clone, Debug)]
pub struct ResourcePool {
    slots: Vec<SlotState>,
}

impl ResourcePool {
    /// One slot set per resource.  Resource ids must be dense from zero.
    pub fn new(resources: &[Resource]) -> Self {
        let slots = resources
            .iter()
            .map(|r| SlotState { capacity: r.capacity, in_use: 0, waiters: VecDeque::new() })
            .collect();
        Self { slots }
    }

    /// Take a slot of `resource` for `case`, or queue behind earlier callers.
    pub fn acquire(&mut self, resource: ResourceId, case: CaseId) -> SimResult<Acquire> {
        let state = self.state_mut(resource)?;
        if state.in_use < state.capacity {
            state.in_use += 1;
            Ok(Acquire::Granted(Slot { resource }))
        } else {
            state.waiters.push_back(case);
            Ok(Acquire::Queued)
        }
    }

    /// Give a slot back.
    ///
    /// If a case is waiting, the slot passes straight to the oldest waiter and
    /// is returned alongside it; `in_use` does not change.  Otherwise the slot
    /// becomes free.
    pub fn release(&mut self, slot: Slot) -> SimResult<Option<(CaseId, Slot)>> {
        let state = self.state_mut(slot.resource)?;
        debug_assert!(state.in_use > 0, "release of idle {}", slot.resource);
        match state.waiters.pop_front() {
            Some(next) => Ok(Some((next, slot))),
            None => {
                state.in_use = state.in_use.saturating_sub(1);
                Ok(None)
            }
        }
    }

    pub fn in_use(&self, resource: ResourceId) -> u32 {
        self.slots.get(resource.index()).map_or(0, |s| s.in_use)
    }

    pub fn capacity(&self, resource: ResourceId) -> u32 {
        self.slots.get(resource.index()).map_or(0, |s| s.capacity)
    }

    /// Number of cases queued on `resource`.
    pub fn waiting(&self, resource: ResourceId) -> usize {
        self.slots.get(resource.index()).map_or(0, |s| s.waiters.len())
    }

    /// Cases queued on `resource`, oldest first.
    pub fn waiters(&self, resource: ResourceId) -> impl Iterator<Item = CaseId> + '_ {
        self.slots
            .get(resource.index())
            .into_iter()
            .flat_map(|s| s.waiters.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Free every slot and drop every waiter.
    pub fn reset(&mut self) {
        for state in &mut self.slots {
            state.in_use = 0;
            state.waiters.clear();
        }
    }

    fn state_mut(&mut self, resource: ResourceId) -> SimResult<&mut SlotState> {
        self.slots
            .get_mut(resource.index())
            .ok_or_else(|| SimError::Config(format!("unknown {resource}")))
    }
}
