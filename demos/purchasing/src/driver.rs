//! A greedy stand-in for an external decision maker, driving the engine in
//! controlled mode.

use bps_core::{ActivityId, Case, Resource, ResourceId};
use bps_policy::{PolicyError, ProbabilisticRouting, SkillBasedAllocation};
use bps_sim::{Sim, SimObserver, SimResult};
use tracing::{debug, warn};

pub struct GreedyDriver {
    routing:    ProbabilisticRouting,
    allocation: SkillBasedAllocation,
}

impl GreedyDriver {
    pub fn new(routing: ProbabilisticRouting, resources: &[Resource]) -> Self {
        Self { routing, allocation: SkillBasedAllocation::new(resources) }
    }

    /// Most likely successor of the case's last activity.  Ties go to the
    /// first edge listed.
    fn next_activity(&self, case: &Case) -> Option<ActivityId> {
        let mut best: Option<(Option<ActivityId>, f64)> = None;
        for &(to, weight) in self.routing.successors(case.last_activity()) {
            if best.is_none_or(|(_, w)| weight > w) {
                best = Some((to, weight));
            }
        }
        best.and_then(|(to, _)| to)
    }

    /// Eligible resource with the fewest busy slots plus queued cases.
    fn least_loaded(&self, activity: ActivityId, load: &[usize]) -> Option<ResourceId> {
        self.allocation
            .eligible(activity)
            .iter()
            .copied()
            .min_by_key(|r| (load[r.index()], r.0))
    }

    /// Answer every decision until the run terminates.  Returns the number
    /// of decisions made.
    pub fn run<O: SimObserver>(&self, sim: &mut Sim, observer: &mut O) -> SimResult<usize> {
        let mut decisions = 0;
        loop {
            for case in sim.run_until_decision(observer)? {
                debug!(case = %case.id, cycle_time = ?case.cycle_time(), "case completed");
            }
            if sim.is_finished() {
                break;
            }
            if sim.case_awaiting_decision().is_none() {
                warn!(now = %sim.now(), "engine idle with no decision pending");
                break;
            }

            let mut load: Vec<usize> = sim
                .snapshot()
                .resources
                .iter()
                .map(|r| r.in_use as usize + r.waiting)
                .collect();

            while let Some(case) = sim.case_awaiting_decision() {
                let activity = self.next_activity(case);
                let resource = match activity {
                    Some(a) => {
                        let r = self
                            .least_loaded(a, &load)
                            .ok_or(PolicyError::NoEligibleResource(a))?;
                        load[r.index()] += 1;
                        r
                    }
                    // Ignored when the case ends.
                    None => ResourceId::INVALID,
                };
                sim.apply_decision(activity, resource)?;
                decisions += 1;
            }
        }
        Ok(decisions)
    }
}
