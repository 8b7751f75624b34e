//! Integration tests for bps-sim.

use bps_core::{
    ActivityId, Case, CaseId, EventLogEntry, Resource, ResourceId, SimConfig, SimRng, SimTime,
    TimeUnit,
};
use bps_policy::{
    FixedArrivals, FixedDurations, PolicyResult, PolicySet, ProbabilisticRouting,
    ProcessingTimePolicy, SkillBasedAllocation,
};

use crate::{Sim, SimBuilder, SimObserver};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// 2024-01-01 00:00:00 UTC, a Monday.
const MONDAY_MIDNIGHT: i64 = 1_704_067_200;

const A: ActivityId = ActivityId(0);
const B: ActivityId = ActivityId(1);
const R0: ResourceId = ResourceId(0);

fn test_config() -> SimConfig {
    SimConfig {
        start_unix_secs: MONDAY_MIDNIGHT,
        time_unit:       TimeUnit::Hours,
        seed:            42,
        max_cases:       None,
    }
}

fn t(x: f64) -> SimTime {
    SimTime::new(x).unwrap()
}

fn one_resource(capacity: u32) -> Vec<Resource> {
    vec![Resource::new(R0, capacity).with_skills([A, B])]
}

/// Routing `A → B → end`, durations A=5, B=3.
fn ab_policies(delays: Vec<f64>, resources: &[Resource]) -> PolicySet {
    PolicySet::new(
        FixedArrivals::new(delays),
        ProbabilisticRouting::sequence(&[A, B]),
        SkillBasedAllocation::new(resources),
        FixedDurations::new().with(A, 5.0).with(B, 3.0),
    )
}

fn ab_sim(delays: Vec<f64>, capacity: u32) -> Sim {
    let resources = one_resource(capacity);
    let policies = ab_policies(delays, &resources);
    SimBuilder::new(test_config(), resources, policies).build().unwrap()
}

fn entry(case: u32, activity: ActivityId, start: f64, end: f64) -> EventLogEntry {
    EventLogEntry { case: CaseId(case), activity, resource: R0, start: t(start), end: t(end) }
}

#[derive(Default)]
struct Recorder {
    arrived:   Vec<CaseId>,
    decisions: Vec<CaseId>,
    entries:   Vec<EventLogEntry>,
    completed: Vec<CaseId>,
    ends:      usize,
}

impl SimObserver for Recorder {
    fn on_case_arrived(&mut self, case: &Case) {
        self.arrived.push(case.id);
    }
    fn on_decision_needed(&mut self, case: &Case, _now: SimTime) {
        self.decisions.push(case.id);
    }
    fn on_activity_complete(&mut self, entry: &EventLogEntry) {
        self.entries.push(*entry);
    }
    fn on_case_complete(&mut self, case: &Case) {
        self.completed.push(case.id);
    }
    fn on_sim_end(&mut self, _now: SimTime, _completed: usize) {
        self.ends += 1;
    }
}

struct NegativeDuration;

impl ProcessingTimePolicy for NegativeDuration {
    fn duration(&self, _a: ActivityId, _r: ResourceId, _rng: &mut SimRng) -> PolicyResult<f64> {
        Ok(-1.0)
    }
}

// ── ResourcePool ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod pool_tests {
    use super::*;
    use crate::{Acquire, ResourcePool, SimError};

    #[test]
    fn grants_up_to_capacity_then_queues() {
        let mut pool = ResourcePool::new(&one_resource(2));
        assert!(matches!(pool.acquire(R0, CaseId(0)).unwrap(), Acquire::Granted(_)));
        assert!(matches!(pool.acquire(R0, CaseId(1)).unwrap(), Acquire::Granted(_)));
        assert_eq!(pool.acquire(R0, CaseId(2)).unwrap(), Acquire::Queued);
        assert_eq!(pool.in_use(R0), 2);
        assert_eq!(pool.waiting(R0), 1);
    }

    #[test]
    fn release_hands_slot_to_oldest_waiter() {
        let mut pool = ResourcePool::new(&one_resource(1));
        let Acquire::Granted(slot) = pool.acquire(R0, CaseId(0)).unwrap() else {
            panic!("first acquire should be granted");
        };
        pool.acquire(R0, CaseId(1)).unwrap();
        pool.acquire(R0, CaseId(2)).unwrap();
        assert_eq!(pool.waiters(R0).collect::<Vec<_>>(), vec![CaseId(1), CaseId(2)]);

        let (next, slot) = pool.release(slot).unwrap().unwrap();
        assert_eq!(next, CaseId(1));
        assert_eq!(slot.resource(), R0);
        assert_eq!(pool.in_use(R0), 1);
        assert_eq!(pool.waiting(R0), 1);
    }

    #[test]
    fn release_without_waiters_frees_slot() {
        let mut pool = ResourcePool::new(&one_resource(1));
        let Acquire::Granted(slot) = pool.acquire(R0, CaseId(0)).unwrap() else {
            panic!("first acquire should be granted");
        };
        assert!(pool.release(slot).unwrap().is_none());
        assert_eq!(pool.in_use(R0), 0);
    }

    #[test]
    fn unknown_resource_is_config_error() {
        let mut pool = ResourcePool::new(&one_resource(1));
        assert!(matches!(pool.acquire(ResourceId(5), CaseId(0)), Err(SimError::Config(_))));
    }
}

#[cfg(test)]
mod pool_props {
    use std::collections::VecDeque;

    use proptest::prelude::*;

    use super::*;
    use crate::{Acquire, ResourcePool, Slot};

    proptest! {
        /// `true` acquires for a fresh case, `false` releases the oldest held
        /// slot.  Occupancy never exceeds capacity and waiters are served in
        /// exactly the order they queued.
        #[test]
        fn capacity_and_fifo_hold(
            capacity in 1u32..4,
            ops in proptest::collection::vec(any::<bool>(), 0..64),
        ) {
            let mut pool = ResourcePool::new(&one_resource(capacity));
            let mut held: VecDeque<(CaseId, Slot)> = VecDeque::new();
            let mut expected_waiters: VecDeque<CaseId> = VecDeque::new();
            let mut next_case = 0u32;

            for acquire in ops {
                if acquire {
                    let case = CaseId(next_case);
                    next_case += 1;
                    match pool.acquire(R0, case).unwrap() {
                        Acquire::Granted(slot) => held.push_back((case, slot)),
                        Acquire::Queued => expected_waiters.push_back(case),
                    }
                } else if let Some((_, slot)) = held.pop_front() {
                    match pool.release(slot).unwrap() {
                        Some((waiter, slot)) => {
                            prop_assert_eq!(Some(waiter), expected_waiters.pop_front());
                            held.push_back((waiter, slot));
                        }
                        None => prop_assert!(expected_waiters.is_empty()),
                    }
                }
                prop_assert!(pool.in_use(R0) <= capacity);
                prop_assert_eq!(pool.in_use(R0) as usize, held.len());
                prop_assert_eq!(pool.waiting(R0), expected_waiters.len());
            }
        }
    }
}

// ── DecisionBridge / Termination ──────────────────────────────────────────────

#[cfg(test)]
mod bridge_tests {
    use super::*;
    use crate::{Decision, DecisionBridge, Termination};

    #[test]
    fn pops_in_push_order_and_signal_is_level_triggered() {
        let mut bridge = DecisionBridge::new();
        assert!(!bridge.is_signalled());
        bridge.push(CaseId(3));
        bridge.push(CaseId(1));
        assert!(bridge.is_signalled());
        assert_eq!(bridge.peek(), Some(CaseId(3)));

        assert_eq!(bridge.pop(), Some(CaseId(3)));
        assert!(bridge.is_signalled(), "one decision still pending");
        assert_eq!(bridge.pop(), Some(CaseId(1)));
        assert!(!bridge.is_signalled());
        assert_eq!(bridge.pop(), None);
    }

    #[test]
    fn decision_from_parts() {
        assert_eq!(Decision::from_parts(None, R0), Decision::Complete);
        assert_eq!(
            Decision::from_parts(Some(A), R0),
            Decision::Execute { activity: A, resource: R0 }
        );
    }

    #[test]
    fn termination_fires_exactly_once() {
        let mut term = Termination::default();
        term.case_started();
        term.arrivals_exhausted();
        assert!(!term.check(), "one case still active");
        term.case_finished();
        assert!(term.check());
        assert!(!term.check());
        assert!(term.has_fired());
    }

    #[test]
    fn termination_waits_for_arrivals() {
        let mut term = Termination::default();
        assert!(!term.check());
        term.arrivals_exhausted();
        assert!(term.check());
    }
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use bps_schedule::{CalendarSet, WeeklyCalendar};

    use super::*;
    use crate::SimError;

    #[test]
    fn builds_with_defaults() {
        let sim = ab_sim(vec![0.0], 1);
        assert_eq!(sim.resources().len(), 1);
        assert_eq!(sim.now(), SimTime::ZERO);
        assert!(!sim.is_finished());
    }

    #[test]
    fn non_dense_resource_ids_rejected() {
        let resources = vec![Resource::new(ResourceId(1), 1).with_skills([A])];
        let policies = ab_policies(vec![0.0], &resources);
        let result = SimBuilder::new(test_config(), resources, policies).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn zero_capacity_rejected() {
        let resources = one_resource(0);
        let policies = ab_policies(vec![0.0], &resources);
        let result = SimBuilder::new(test_config(), resources, policies).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn empty_calendar_rejected() {
        let resources = one_resource(1);
        let policies = ab_policies(vec![0.0], &resources);
        let result = SimBuilder::new(test_config(), resources, policies)
            .calendars(CalendarSet::uniform(WeeklyCalendar::never_available()))
            .build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn empty_override_rejected() {
        let resources = one_resource(1);
        let policies = ab_policies(vec![0.0], &resources);
        let calendars = CalendarSet::uniform(WeeklyCalendar::always_available())
            .with_override(R0, WeeklyCalendar::never_available());
        let result = SimBuilder::new(test_config(), resources, policies)
            .calendars(calendars)
            .build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn override_for_unknown_resource_rejected() {
        let resources = one_resource(1);
        let policies = ab_policies(vec![0.0], &resources);
        let calendars = CalendarSet::uniform(WeeklyCalendar::always_available())
            .with_override(ResourceId(7), WeeklyCalendar::weekdays(9, 17));
        let result = SimBuilder::new(test_config(), resources, policies)
            .calendars(calendars)
            .build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }
}

// ── Autonomous runs ───────────────────────────────────────────────────────────

#[cfg(test)]
mod autonomous {
    use bps_policy::{ExponentialArrivals, NormalDurations, PolicyError};

    use super::*;
    use crate::{NoopObserver, SimError};

    #[test]
    fn single_case_a_then_b() {
        let mut sim = ab_sim(vec![0.0], 1);
        let log = sim.simulate(None, &mut NoopObserver).unwrap().to_vec();
        assert_eq!(log, vec![entry(0, A, 0.0, 5.0), entry(0, B, 5.0, 8.0)]);

        let case = sim.case(CaseId(0)).unwrap();
        assert_eq!(case.cycle_time(), Some(8.0));
        assert_eq!(case.history, vec![A, B]);
        assert!(sim.is_finished());
    }

    #[test]
    fn capacity_one_serialises_cases_fifo() {
        let mut sim = ab_sim(vec![0.0, 0.0], 1);
        let log = sim.simulate(None, &mut NoopObserver).unwrap().to_vec();
        assert_eq!(
            log,
            vec![
                entry(0, A, 0.0, 5.0),
                entry(1, A, 5.0, 10.0),
                entry(0, B, 10.0, 13.0),
                entry(1, B, 13.0, 16.0),
            ]
        );
        let cycle: Vec<f64> = sim.completed_cases().filter_map(Case::cycle_time).collect();
        assert_eq!(cycle, vec![13.0, 16.0]);
    }

    #[test]
    fn capacity_two_runs_cases_in_parallel() {
        let mut sim = ab_sim(vec![0.0, 0.0], 2);
        let log = sim.simulate(None, &mut NoopObserver).unwrap();
        assert!(log.iter().all(|e| e.start == t(0.0) || e.start == t(5.0)));
        assert_eq!(sim.now(), t(8.0));
    }

    #[test]
    fn every_entry_matches_sampled_duration() {
        let mut sim = ab_sim(vec![0.0, 1.0, 2.5, 0.5], 1);
        let log = sim.simulate(None, &mut NoopObserver).unwrap();
        assert_eq!(log.len(), 8);
        for e in log {
            let expected = if e.activity == A { 5.0 } else { 3.0 };
            assert!(e.start <= e.end);
            assert_eq!(e.duration(), expected);
        }
    }

    #[test]
    fn observer_sees_lifecycle_and_end_once() {
        let mut sim = ab_sim(vec![0.0, 0.0], 1);
        let mut rec = Recorder::default();
        sim.simulate(None, &mut rec).unwrap();
        assert_eq!(rec.arrived, vec![CaseId(0), CaseId(1)]);
        assert!(rec.decisions.is_empty(), "autonomous mode raises no decisions");
        assert_eq!(rec.entries.len(), 4);
        assert_eq!(rec.completed, vec![CaseId(0), CaseId(1)]);
        assert_eq!(rec.ends, 1);

        // A second call finds the run finished and does not re-fire.
        sim.simulate(None, &mut rec).unwrap();
        assert_eq!(rec.ends, 1);
    }

    #[test]
    fn empty_arrival_source_finishes_immediately() {
        let mut sim = ab_sim(vec![], 1);
        let mut rec = Recorder::default();
        let log = sim.simulate(None, &mut rec).unwrap();
        assert!(log.is_empty());
        assert_eq!(rec.ends, 1);
        assert!(sim.is_finished());
    }

    #[test]
    fn max_cases_caps_unbounded_arrivals() {
        let resources = one_resource(3);
        let policies = PolicySet::new(
            ExponentialArrivals::new(0.5).unwrap(),
            ProbabilisticRouting::sequence(&[A, B]),
            SkillBasedAllocation::new(&resources),
            NormalDurations::new().with(A, 4.0, 1.0).unwrap().with(B, 2.0, 0.5).unwrap(),
        );
        let mut sim = SimBuilder::new(test_config(), resources, policies).build().unwrap();
        let log = sim.simulate(Some(5), &mut NoopObserver).unwrap();
        assert_eq!(log.len(), 10);
        assert_eq!(sim.completed_cases().count(), 5);
        assert!(sim.is_finished());
    }

    #[test]
    fn zero_cap_finishes_without_cases() {
        let mut sim = ab_sim(vec![0.0, 0.0], 1);
        let log = sim.simulate(Some(0), &mut NoopObserver).unwrap();
        assert!(log.is_empty());
        assert!(sim.is_finished());
    }

    #[test]
    fn raising_cap_after_it_stopped_arrivals_is_rejected() {
        let mut sim = ab_sim(vec![0.0, 0.0, 0.0], 1);
        assert_eq!(sim.simulate(Some(1), &mut NoopObserver).unwrap().len(), 2);

        let err = sim.simulate(Some(3), &mut NoopObserver).unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
        assert_eq!(sim.event_log().len(), 2);
        assert_eq!(sim.cases().count(), 1);

        // Repeating the same cap is fine.
        assert_eq!(sim.simulate(Some(1), &mut NoopObserver).unwrap().len(), 2);
    }

    #[test]
    fn cap_above_a_drained_source_is_accepted() {
        let mut sim = ab_sim(vec![0.0], 1);
        sim.simulate(None, &mut NoopObserver).unwrap();
        assert_eq!(sim.simulate(Some(5), &mut NoopObserver).unwrap().len(), 2);
        assert!(sim.is_finished());
    }

    #[test]
    fn negative_duration_is_policy_error() {
        let resources = one_resource(1);
        let policies = PolicySet::new(
            FixedArrivals::new(vec![0.0]),
            ProbabilisticRouting::sequence(&[A]),
            SkillBasedAllocation::new(&resources),
            NegativeDuration,
        );
        let mut sim = SimBuilder::new(test_config(), resources, policies).build().unwrap();
        let err = sim.simulate(None, &mut NoopObserver).unwrap_err();
        assert!(matches!(err, SimError::Policy(PolicyError::InvalidSample { what: "duration", .. })));
    }

    #[test]
    fn negative_inter_arrival_is_policy_error() {
        let mut sim = ab_sim(vec![-2.0], 1);
        let err = sim.simulate(None, &mut NoopObserver).unwrap_err();
        assert!(matches!(err, SimError::Policy(PolicyError::InvalidSample { .. })));
    }

    #[test]
    fn missing_skill_is_policy_error() {
        let resources = vec![Resource::new(R0, 1).with_skills([B])];
        let policies = ab_policies(vec![0.0], &resources);
        let mut sim = SimBuilder::new(test_config(), resources, policies).build().unwrap();
        let err = sim.simulate(None, &mut NoopObserver).unwrap_err();
        assert!(matches!(err, SimError::Policy(PolicyError::NoEligibleResource(a)) if a == A));
    }

    fn stochastic_sim(seed: u64) -> Sim {
        let resources = vec![
            Resource::new(ResourceId(0), 1).with_skills([A]),
            Resource::new(ResourceId(1), 2).with_skills([A, B]),
        ];
        let policies = PolicySet::new(
            ExponentialArrivals::new(1.0).unwrap(),
            ProbabilisticRouting::new()
                .with_transition(None, Some(A), 1.0)
                .with_transition(Some(A), Some(B), 0.7)
                .with_transition(Some(A), Some(A), 0.1)
                .with_transition(Some(A), None, 0.2)
                .with_transition(Some(B), None, 1.0),
            SkillBasedAllocation::new(&resources),
            NormalDurations::new().with(A, 1.5, 0.5).unwrap().with(B, 2.0, 1.0).unwrap(),
        );
        let config = SimConfig { seed, max_cases: Some(40), ..test_config() };
        SimBuilder::new(config, resources, policies).build().unwrap()
    }

    #[test]
    fn same_seed_same_log() {
        let mut a = stochastic_sim(7);
        let mut b = stochastic_sim(7);
        let log_a = a.simulate(None, &mut NoopObserver).unwrap().to_vec();
        let log_b = b.simulate(None, &mut NoopObserver).unwrap().to_vec();
        assert!(!log_a.is_empty());
        assert_eq!(log_a, log_b);
    }

    #[test]
    fn reset_reproduces_run() {
        let mut sim = stochastic_sim(11);
        let first = sim.simulate(None, &mut NoopObserver).unwrap().to_vec();
        sim.reset();
        assert_eq!(sim.now(), SimTime::ZERO);
        assert!(sim.event_log().is_empty());
        assert!(!sim.is_finished());
        let second = sim.simulate(None, &mut NoopObserver).unwrap().to_vec();
        assert_eq!(first, second);
        assert_eq!(sim.completed_cases().count(), 40);
    }
}

// ── Calendar gating ───────────────────────────────────────────────────────────

#[cfg(test)]
mod calendar_gate {
    use bps_schedule::{CalendarSet, WeeklyCalendar};

    use super::*;
    use crate::{CasePhase, NoopObserver};

    fn office_hours_sim(delays: Vec<f64>) -> Sim {
        let resources = one_resource(1);
        let policies = ab_policies(delays, &resources);
        SimBuilder::new(test_config(), resources, policies)
            .calendars(CalendarSet::uniform(WeeklyCalendar::weekdays(9, 17)))
            .build()
            .unwrap()
    }

    #[test]
    fn waits_for_opening_hour() {
        // Arrives Monday 00:00; work starts at 09:00.
        let mut sim = office_hours_sim(vec![0.0]);
        let log = sim.simulate(None, &mut NoopObserver).unwrap().to_vec();
        assert_eq!(log, vec![entry(0, A, 9.0, 14.0), entry(0, B, 14.0, 17.0)]);
    }

    #[test]
    fn execution_may_overrun_but_next_start_waits_for_next_day() {
        // A starts Monday 15:00 and runs to 20:00; B waits until Tuesday 09:00.
        let mut sim = office_hours_sim(vec![15.0]);
        let log = sim.simulate(None, &mut NoopObserver).unwrap().to_vec();
        assert_eq!(log, vec![entry(0, A, 15.0, 20.0), entry(0, B, 33.0, 36.0)]);
    }

    #[test]
    fn gated_case_reports_awaiting_calendar() {
        let mut sim = office_hours_sim(vec![0.0]);
        sim.run_until_time(3.0, &mut NoopObserver).unwrap();
        assert_eq!(sim.case_phase(CaseId(0)), Some(CasePhase::AwaitingCalendar));
        assert_eq!(sim.snapshot().waiting_by_activity.get(&A), Some(&1));
    }

    #[test]
    fn per_resource_override_applies() {
        let resources = vec![
            Resource::new(ResourceId(0), 1).with_skills([A]),
            Resource::new(ResourceId(1), 1).with_skills([B]),
        ];
        let policies = ab_policies(vec![0.0], &resources);
        let calendars = CalendarSet::uniform(WeeklyCalendar::always_available())
            .with_override(ResourceId(1), WeeklyCalendar::weekdays(9, 17));
        let mut sim = SimBuilder::new(test_config(), resources, policies)
            .calendars(calendars)
            .build()
            .unwrap();
        let log = sim.simulate(None, &mut NoopObserver).unwrap();
        assert_eq!(log[0].start, t(0.0));
        assert_eq!(log[1].resource, ResourceId(1));
        assert_eq!(log[1].start, t(9.0));
    }
}

// ── Controlled mode ───────────────────────────────────────────────────────────

#[cfg(test)]
mod controlled {
    use super::*;
    use crate::{CasePhase, DecisionMode, NoopObserver, ProtocolViolation, SimError};

    #[test]
    fn pauses_before_execution_and_resolves_oldest_first() {
        let mut sim = ab_sim(vec![0.0, 1.0], 1);
        let mut rec = Recorder::default();

        let done = sim.run_until_decision(&mut rec).unwrap();
        assert!(done.is_empty());
        assert_eq!(sim.mode(), DecisionMode::Controlled);
        assert_eq!(sim.now(), t(0.0));
        assert_eq!(sim.case_awaiting_decision().map(|c| c.id), Some(CaseId(0)));

        // Let the second case arrive and pause as well.
        sim.run_until_time(1.0, &mut rec).unwrap();
        assert_eq!(sim.pending_decisions().collect::<Vec<_>>(), vec![CaseId(0), CaseId(1)]);
        assert!(sim.event_log().is_empty());
        assert_eq!(rec.decisions, vec![CaseId(0), CaseId(1)]);

        assert_eq!(sim.apply_decision(Some(A), R0).unwrap(), CaseId(0));
        assert_eq!(sim.case_awaiting_decision().map(|c| c.id), Some(CaseId(1)));
    }

    #[test]
    fn simultaneous_arrivals_pause_together() {
        let mut sim = ab_sim(vec![0.0, 0.0], 1);
        sim.run_until_decision(&mut NoopObserver).unwrap();
        assert_eq!(sim.pending_decisions().collect::<Vec<_>>(), vec![CaseId(0), CaseId(1)]);
        assert_eq!(sim.snapshot().awaiting_decision, 2);
    }

    #[test]
    fn stays_paused_until_decision_applied() {
        let mut sim = ab_sim(vec![0.0, 1.0], 1);
        sim.run_until_decision(&mut NoopObserver).unwrap();
        sim.run_until_decision(&mut NoopObserver).unwrap();
        assert_eq!(sim.now(), t(0.0));
        assert_eq!(sim.pending_decisions().count(), 1);
    }

    #[test]
    fn apply_without_pending_is_protocol_violation() {
        let mut sim = ab_sim(vec![0.0], 1);
        let err = sim.apply_decision(Some(A), R0).unwrap_err();
        assert!(matches!(err, SimError::Protocol(ProtocolViolation::NoPendingDecision)));
        assert_eq!(sim.pending_events(), 0);
    }

    #[test]
    fn unknown_resource_leaves_pending_untouched() {
        let mut sim = ab_sim(vec![0.0], 1);
        sim.run_until_decision(&mut NoopObserver).unwrap();
        let err = sim.apply_decision(Some(A), ResourceId(9)).unwrap_err();
        assert!(matches!(
            err,
            SimError::Protocol(ProtocolViolation::UnknownResource(r)) if r == ResourceId(9)
        ));
        assert_eq!(sim.pending_decisions().collect::<Vec<_>>(), vec![CaseId(0)]);
        assert_eq!(sim.case_phase(CaseId(0)), Some(CasePhase::AwaitingDecision));
    }

    #[test]
    fn driver_walks_case_through_a_and_b() {
        let mut sim = ab_sim(vec![0.0], 1);
        let mut completed = Vec::new();
        loop {
            completed.extend(sim.run_until_decision(&mut NoopObserver).unwrap());
            if sim.is_finished() {
                break;
            }
            let next = match sim.case_awaiting_decision().unwrap().last_activity() {
                None => Some(A),
                Some(a) if a == A => Some(B),
                Some(_) => None,
            };
            sim.apply_decision(next, R0).unwrap();
        }

        assert_eq!(sim.event_log(), &[entry(0, A, 0.0, 5.0), entry(0, B, 5.0, 8.0)]);
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].cycle_time(), Some(8.0));
    }

    #[test]
    fn completed_cases_are_reported_once() {
        let mut sim = ab_sim(vec![0.0], 1);
        sim.run_until_decision(&mut NoopObserver).unwrap();
        sim.apply_decision(None, R0).unwrap();
        let first = sim.run_until_decision(&mut NoopObserver).unwrap();
        assert_eq!(first.len(), 1);
        assert!(first[0].is_complete());
        let second = sim.run_until_decision(&mut NoopObserver).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn simulate_resolves_leftover_decisions() {
        let mut sim = ab_sim(vec![0.0, 0.0], 1);
        sim.run_until_decision(&mut NoopObserver).unwrap();
        assert_eq!(sim.pending_decisions().count(), 2);

        let log = sim.simulate(None, &mut NoopObserver).unwrap().to_vec();
        assert_eq!(log.len(), 4);
        assert_eq!(log[0], entry(0, A, 0.0, 5.0));
        assert_eq!(sim.pending_decisions().count(), 0);
        assert!(sim.is_finished());
    }

    #[test]
    fn simulate_keeps_applied_decision_ahead_of_leftovers() {
        let mut sim = ab_sim(vec![0.0, 0.0], 1);
        sim.run_until_decision(&mut NoopObserver).unwrap();
        assert_eq!(sim.apply_decision(Some(A), R0).unwrap(), CaseId(0));
        assert_eq!(sim.pending_decisions().collect::<Vec<_>>(), vec![CaseId(1)]);

        let log = sim.simulate(None, &mut NoopObserver).unwrap().to_vec();
        assert_eq!(log[0], entry(0, A, 0.0, 5.0));
        assert_eq!(log[1], entry(1, A, 5.0, 10.0));
        assert_eq!(log.len(), 4);
        assert!(sim.is_finished());
    }

    #[test]
    fn later_arrival_is_not_waited_for() {
        let mut sim = ab_sim(vec![0.0, 1.0], 1);
        sim.run_until_decision(&mut NoopObserver).unwrap();
        sim.apply_decision(Some(A), R0).unwrap();

        // Case 0 takes the resource before case 1 shows up at t=1.
        sim.run_until_decision(&mut NoopObserver).unwrap();
        assert_eq!(sim.now(), t(1.0));
        assert_eq!(sim.case_phase(CaseId(0)), Some(CasePhase::Executing));
        assert_eq!(sim.pending_decisions().collect::<Vec<_>>(), vec![CaseId(1)]);

        sim.apply_decision(Some(A), R0).unwrap();
        sim.run_until_time(2.0, &mut NoopObserver).unwrap();
        assert_eq!(sim.case_phase(CaseId(1)), Some(CasePhase::AwaitingResource));
    }
}

// ── Snapshot and time horizon ─────────────────────────────────────────────────

#[cfg(test)]
mod snapshot_tests {
    use super::*;
    use crate::{CasePhase, NoopObserver, ProtocolViolation, SimError};

    #[test]
    fn snapshot_reflects_contention() {
        let mut sim = ab_sim(vec![0.0, 0.0], 1);
        sim.run_until_time(1.0, &mut NoopObserver).unwrap();
        assert_eq!(sim.now(), t(1.0));

        let state = sim.snapshot();
        assert_eq!(state.now, t(1.0));
        assert_eq!(state.resources[0].in_use, 1);
        assert_eq!(state.resources[0].capacity, 1);
        assert_eq!(state.resources[0].waiting, 1);
        assert_eq!(state.resources[0].utilisation(), 1.0);
        assert_eq!(state.waiting_by_activity.get(&A), Some(&1));
        assert_eq!(state.waiting_cases(), 1);
        assert_eq!(state.active_cases, 2);
        assert_eq!(state.completed_cases, 0);
        assert!(state.arrivals_exhausted);

        assert_eq!(sim.case_phase(CaseId(0)), Some(CasePhase::Executing));
        assert_eq!(sim.case_phase(CaseId(1)), Some(CasePhase::AwaitingResource));
    }

    #[test]
    fn run_until_time_includes_events_at_horizon() {
        let mut sim = ab_sim(vec![0.0], 1);
        sim.run_until_time(5.0, &mut NoopObserver).unwrap();
        assert_eq!(sim.event_log(), &[entry(0, A, 0.0, 5.0)]);
        assert_eq!(sim.case_phase(CaseId(0)), Some(CasePhase::Executing));
    }

    #[test]
    fn run_until_time_rejects_bad_targets() {
        let mut sim = ab_sim(vec![0.0], 1);
        sim.run_until_time(2.0, &mut NoopObserver).unwrap();
        assert!(matches!(
            sim.run_until_time(1.0, &mut NoopObserver),
            Err(SimError::Protocol(ProtocolViolation::TimeInPast { .. }))
        ));
        assert!(matches!(
            sim.run_until_time(f64::NAN, &mut NoopObserver),
            Err(SimError::Protocol(ProtocolViolation::InvalidTime(_)))
        ));
        assert_eq!(sim.now(), t(2.0));
    }

    #[test]
    fn timestamps_map_through_epoch() {
        let mut sim = ab_sim(vec![0.0], 1);
        let log = sim.simulate(None, &mut NoopObserver).unwrap().to_vec();
        // Hours: B ends 8h after Monday midnight.
        assert_eq!(sim.clock().to_unix_secs(log[1].end), (MONDAY_MIDNIGHT + 8 * 3_600) as f64);
    }
}

// ── Replications ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod replicate_tests {
    use bps_policy::{ExponentialArrivals, NormalDurations};

    use super::*;
    use crate::{replicate, SimResult};

    fn factory(seed: u64) -> SimResult<Sim> {
        let resources = one_resource(2);
        let policies = PolicySet::new(
            ExponentialArrivals::new(0.8).unwrap(),
            ProbabilisticRouting::sequence(&[A, B]),
            SkillBasedAllocation::new(&resources),
            NormalDurations::new().with(A, 2.0, 0.5).unwrap().with(B, 1.0, 0.2).unwrap(),
        );
        let config = SimConfig { seed, max_cases: Some(10), ..test_config() };
        SimBuilder::new(config, resources, policies).build()
    }

    #[test]
    fn one_result_per_seed_in_order() {
        let reps = replicate(&[1, 2, 3], factory).unwrap();
        assert_eq!(reps.iter().map(|r| r.seed).collect::<Vec<_>>(), vec![1, 2, 3]);
        for rep in &reps {
            assert_eq!(rep.cases.len(), 10);
            assert_eq!(rep.event_log.len(), 20);
            assert!(rep.mean_cycle_time().unwrap() > 0.0);
        }
    }

    #[test]
    fn replications_are_reproducible() {
        let a = replicate(&[5, 5], factory).unwrap();
        assert_eq!(a[0].event_log, a[1].event_log);
    }
}
