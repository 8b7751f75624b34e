//! Resource-allocation strategies.

use std::collections::HashMap;

use bps_core::{ActivityId, Case, Resource, ResourceId, SimRng};

use crate::{PolicyError, PolicyResult, ResourcePolicy};

// ── SkillBasedAllocation ──────────────────────────────────────────────────────

/// Picks uniformly among the resources whose skills include the activity.
///
/// The choice ignores current occupancy: a busy resource may be chosen and the
/// case then queues on it.
#[derive(Clone, Debug)]
pub struct SkillBasedAllocation {
    by_activity: HashMap<ActivityId, Vec<ResourceId>>,
}

impl SkillBasedAllocation {
    pub fn new(resources: &[Resource]) -> Self {
        let mut by_activity: HashMap<ActivityId, Vec<ResourceId>> = HashMap::new();
        for resource in resources {
            for &skill in &resource.skills {
                by_activity.entry(skill).or_default().push(resource.id);
            }
        }
        Self { by_activity }
    }

    /// Resources able to perform `activity`, in resource-table order.
    pub fn eligible(&self, activity: ActivityId) -> &[ResourceId] {
        self.by_activity.get(&activity).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl ResourcePolicy for SkillBasedAllocation {
    fn select_resource(
        &self,
        activity: ActivityId,
        _case:    &Case,
        rng:      &mut SimRng,
    ) -> PolicyResult<ResourceId> {
        rng.choose(self.eligible(activity))
            .copied()
            .ok_or(PolicyError::NoEligibleResource(activity))
    }
}

// ── FixedAllocation ───────────────────────────────────────────────────────────

/// Every activity is always performed by the same resource.
#[derive(Clone, Debug, Default)]
pub struct FixedAllocation {
    assignments: HashMap<ActivityId, ResourceId>,
}

impl FixedAllocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(mut self, activity: ActivityId, resource: ResourceId) -> Self {
        self.assignments.insert(activity, resource);
        self
    }
}

impl ResourcePolicy for FixedAllocation {
    fn select_resource(
        &self,
        activity: ActivityId,
        _case:    &Case,
        _rng:     &mut SimRng,
    ) -> PolicyResult<ResourceId> {
        self.assignments
            .get(&activity)
            .copied()
            .ok_or(PolicyError::NoEligibleResource(activity))
    }
}
