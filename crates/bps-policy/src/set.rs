//! `PolicySet` — the four collaborators the engine consults.

use crate::{ArrivalPolicy, ProcessingTimePolicy, ResourcePolicy, RoutingPolicy};

/// Owned, type-erased bundle of policies for one simulation.
pub struct PolicySet {
    pub arrival:   Box<dyn ArrivalPolicy>,
    pub routing:   Box<dyn RoutingPolicy>,
    pub resources: Box<dyn ResourcePolicy>,
    pub durations: Box<dyn ProcessingTimePolicy>,
}

impl PolicySet {
    pub fn new(
        arrival:   impl ArrivalPolicy,
        routing:   impl RoutingPolicy,
        resources: impl ResourcePolicy,
        durations: impl ProcessingTimePolicy,
    ) -> Self {
        Self {
            arrival:   Box::new(arrival),
            routing:   Box::new(routing),
            resources: Box::new(resources),
            durations: Box::new(durations),
        }
    }

    /// Rewind stateful policies for a fresh run.
    pub fn reset(&mut self) {
        self.arrival.reset();
    }
}
