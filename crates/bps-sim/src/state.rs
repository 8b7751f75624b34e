//! Read-only views of engine state.

use std::collections::BTreeMap;

use bps_core::{ActivityId, ResourceId, SimTime};

/// Where a case is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CasePhase {
    Arrived,
    AwaitingDecision,
    AwaitingCalendar,
    AwaitingResource,
    Executing,
    Completed,
}

/// Occupancy of one resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceState {
    pub resource: ResourceId,
    pub in_use:   u32,
    pub capacity: u32,
    pub waiting:  usize,
}

impl ResourceState {
    pub fn utilisation(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        f64::from(self.in_use) / f64::from(self.capacity)
    }
}

/// Point-in-time snapshot, recomputed by [`Sim::snapshot`][crate::Sim::snapshot].
#[derive(Clone, Debug, PartialEq)]
pub struct EngineState {
    pub now:               SimTime,
    pub resources:         Vec<ResourceState>,
    /// Cases that chose an activity and are waiting on its calendar or its
    /// resource, per activity.
    pub waiting_by_activity: BTreeMap<ActivityId, usize>,
    pub active_cases:      usize,
    pub awaiting_decision: usize,
    pub completed_cases:   usize,
    pub arrivals_exhausted: bool,
}

impl EngineState {
    /// Cases waiting on a calendar or a resource, across all activities.
    pub fn waiting_cases(&self) -> usize {
        self.waiting_by_activity.values().sum()
    }
}
