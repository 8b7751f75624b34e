//! The `Sim` struct and its event loop.

use std::collections::BTreeMap;

use bps_core::{
    ActivityId, ActivityRegistry, Case, CaseId, EventLogEntry, Resource, ResourceId, SimClock,
    SimConfig, SimRng, SimTime,
};
use bps_policy::{PolicyError, PolicySet};
use bps_schedule::{CalendarSet, EventQueue};
use tracing::{debug, info, trace, warn};

use crate::pool::{Acquire, Slot};
use crate::{
    CasePhase, Decision, DecisionBridge, DecisionMode, EngineState, ProtocolViolation,
    ResourcePool, ResourceState, SimError, SimObserver, SimResult, Termination,
};

// ── Events ────────────────────────────────────────────────────────────────────

/// Why a suspended case process is resumed.
#[derive(Debug)]
pub(crate) enum Wake {
    Start,
    Decided(Decision),
    CalendarOpen,
    /// A released slot was handed to this case while it waited in the queue.
    SlotGranted(Slot),
    ExecutionDone,
}

#[derive(Debug)]
pub(crate) enum Event {
    /// The arrival generator fires: spawn a case, sample the next arrival.
    Arrival,
    Resume { case: CaseId, wake: Wake },
}

// ── Per-case state machine ────────────────────────────────────────────────────

#[derive(Debug)]
pub(crate) enum Phase {
    Arrived,
    AwaitingDecision,
    AwaitingCalendar { activity: ActivityId, resource: ResourceId },
    AwaitingResource { activity: ActivityId, resource: ResourceId },
    Executing {
        activity: ActivityId,
        resource: ResourceId,
        since:    SimTime,
        slot:     Slot,
    },
    Completed,
}

impl Phase {
    fn kind(&self) -> CasePhase {
        match self {
            Phase::Arrived                  => CasePhase::Arrived,
            Phase::AwaitingDecision         => CasePhase::AwaitingDecision,
            Phase::AwaitingCalendar { .. }  => CasePhase::AwaitingCalendar,
            Phase::AwaitingResource { .. }  => CasePhase::AwaitingResource,
            Phase::Executing { .. }         => CasePhase::Executing,
            Phase::Completed                => CasePhase::Completed,
        }
    }
}

#[derive(Debug)]
pub(crate) struct CaseProcess {
    pub(crate) case:  Case,
    pub(crate) phase: Phase,
}

fn invariant(case: CaseId, expected: &str) -> SimError {
    SimError::Invariant(format!("{case} resumed while not {expected}"))
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The discrete-event process simulator.
///
/// Each case is an explicit state machine advanced by events from a single
/// [`EventQueue`]:
///
/// ```text
/// ARRIVED → AWAITING_DECISION → AWAITING_CALENDAR → AWAITING_RESOURCE
///         → EXECUTING → (back to AWAITING_DECISION) … → COMPLETED
/// ```
///
/// The decision step is answered either by the routing and allocation
/// policies ([`simulate`](Self::simulate)) or by an external driver
/// ([`run_until_decision`](Self::run_until_decision) +
/// [`apply_decision`](Self::apply_decision)).
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    /// Epoch, time unit, seed, case cap.
    pub config: SimConfig,

    pub(crate) queue:       EventQueue<Event>,
    pub(crate) rng:         SimRng,
    pub(crate) policies:    PolicySet,
    pub(crate) resources:   Vec<Resource>,
    pub(crate) calendars:   CalendarSet,
    pub(crate) activities:  ActivityRegistry,
    pub(crate) pool:        ResourcePool,
    pub(crate) bridge:      DecisionBridge,
    pub(crate) termination: Termination,
    pub(crate) mode:        DecisionMode,

    /// Every case spawned so far, indexed by `CaseId`.
    pub(crate) processes: Vec<CaseProcess>,
    /// Completion order.
    pub(crate) completed: Vec<CaseId>,
    /// How much of `completed` `run_until_decision` has already returned.
    pub(crate) reported:  usize,
    pub(crate) event_log: Vec<EventLogEntry>,

    pub(crate) arrivals:  u64,
    pub(crate) max_cases: Option<u64>,
    /// Whether the first arrival has been sampled.
    pub(crate) started:   bool,
}

impl Sim {
    // ── Driver API ────────────────────────────────────────────────────────

    /// Run to completion with the policies answering every decision.
    ///
    /// `max_cases` overrides `config.max_cases` for this run.  Decisions left
    /// pending by an earlier controlled phase are queued behind any already
    /// applied, oldest first.  Returns the full event log.
    ///
    /// Once arrivals have stopped because the cap was reached, the cap cannot
    /// be raised: asking for more cases than have arrived is a config error.
    pub fn simulate<O: SimObserver>(
        &mut self,
        max_cases: Option<u64>,
        observer:  &mut O,
    ) -> SimResult<&[EventLogEntry]> {
        if let Some(requested) = max_cases {
            if requested > self.arrivals && self.termination.is_exhausted() && self.cap_reached() {
                return Err(SimError::Config(format!(
                    "case cap raised to {requested} after arrivals stopped at {}",
                    self.arrivals
                )));
            }
        }
        if max_cases.is_some() {
            self.max_cases = max_cases;
        }
        self.mode = DecisionMode::Autonomous;
        info!(seed = self.config.seed, max_cases = ?self.max_cases, "autonomous run starting");

        self.ensure_started(observer)?;
        while let Some(case) = self.bridge.pop() {
            let decision = self.decide_with_policies(case)?;
            self.queue.schedule(0.0, Event::Resume { case, wake: Wake::Decided(decision) })?;
        }
        while !self.termination.has_fired() {
            if !self.step(observer)? {
                break;
            }
        }

        info!(
            now       = %self.now(),
            completed = self.completed.len(),
            entries   = self.event_log.len(),
            "autonomous run finished"
        );
        Ok(&self.event_log)
    }

    /// Advance until a case needs an external decision or the run completes.
    ///
    /// Events already due at the instant a decision is raised are still
    /// processed, so cases arriving together pause together.  Only those do:
    /// a case arriving later than the paused instant is not waited for, and
    /// after the pending decisions are applied it may find earlier cases
    /// already holding the resource.  Use
    /// [`run_until_time`](Self::run_until_time) to collect later arrivals
    /// before deciding.  Returns the cases completed since the previous call.
    pub fn run_until_decision<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<Vec<Case>> {
        self.mode = DecisionMode::Controlled;
        self.ensure_started(observer)?;

        while !self.termination.has_fired() {
            if self.bridge.is_signalled() && self.queue.next_time() != Some(self.now()) {
                break;
            }
            if !self.step(observer)? {
                break;
            }
        }

        let fresh: Vec<Case> = self.completed[self.reported..]
            .iter()
            .map(|id| self.processes[id.index()].case.clone())
            .collect();
        self.reported = self.completed.len();
        Ok(fresh)
    }

    /// Resolve the oldest pending decision.
    ///
    /// `None` for `activity` ends the case; `resource` is then ignored.
    /// Fails without touching any state if nothing is pending or the
    /// resource is unknown.
    pub fn apply_decision(
        &mut self,
        activity: Option<ActivityId>,
        resource: ResourceId,
    ) -> SimResult<CaseId> {
        let Some(case) = self.bridge.peek() else {
            warn!("apply_decision called with no pending decision");
            return Err(ProtocolViolation::NoPendingDecision.into());
        };
        if let Some(activity) = activity {
            let Some(res) = self.resources.get(resource.index()) else {
                warn!(case = %case, resource = %resource, "apply_decision named an unknown resource");
                return Err(ProtocolViolation::UnknownResource(resource).into());
            };
            if !res.can_execute(activity) {
                warn!(case = %case, activity = %activity, resource = %resource,
                      "resource lacks the skill for the chosen activity");
            }
        }

        self.bridge.pop();
        let decision = Decision::from_parts(activity, resource);
        self.queue.schedule(0.0, Event::Resume { case, wake: Wake::Decided(decision) })?;
        debug!(case = %case, ?decision, "external decision applied");
        Ok(case)
    }

    /// The case the next [`apply_decision`](Self::apply_decision) resolves.
    pub fn case_awaiting_decision(&self) -> Option<&Case> {
        self.bridge.peek().map(|id| &self.processes[id.index()].case)
    }

    /// Process every event due at or before `until`, then park the clock there.
    ///
    /// Honours the current decision mode; pending decisions stay pending.
    pub fn run_until_time<O: SimObserver>(&mut self, until: f64, observer: &mut O) -> SimResult<()> {
        let target = SimTime::new(until).map_err(|_| ProtocolViolation::InvalidTime(until))?;
        let now = self.now();
        if target < now {
            return Err(ProtocolViolation::TimeInPast { now, to: target }.into());
        }

        self.ensure_started(observer)?;
        while self.queue.next_time().is_some_and(|t| t <= target) {
            self.step(observer)?;
        }
        self.queue.advance_to(target)?;
        Ok(())
    }

    /// Discard all run state and re-seed, so the next run reproduces the first.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.rng = SimRng::new(self.config.seed);
        self.policies.reset();
        self.pool.reset();
        self.bridge.clear();
        self.termination = Termination::default();
        self.mode = DecisionMode::default();
        self.processes.clear();
        self.completed.clear();
        self.reported = 0;
        self.event_log.clear();
        self.arrivals = 0;
        self.max_cases = self.config.max_cases;
        self.started = false;
        info!(seed = self.config.seed, "simulation reset");
    }

    /// Read-only view of the current state.
    pub fn snapshot(&self) -> EngineState {
        let resources = self
            .resources
            .iter()
            .map(|r| ResourceState {
                resource: r.id,
                in_use:   self.pool.in_use(r.id),
                capacity: self.pool.capacity(r.id),
                waiting:  self.pool.waiting(r.id),
            })
            .collect();

        let mut waiting_by_activity = BTreeMap::new();
        for process in &self.processes {
            if let Phase::AwaitingCalendar { activity, .. } | Phase::AwaitingResource { activity, .. } =
                &process.phase
            {
                *waiting_by_activity.entry(*activity).or_insert(0) += 1;
            }
        }

        EngineState {
            now: self.now(),
            resources,
            waiting_by_activity,
            active_cases:       self.termination.active(),
            awaiting_decision:  self.bridge.len(),
            completed_cases:    self.completed.len(),
            arrivals_exhausted: self.termination.is_exhausted(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn now(&self) -> SimTime {
        self.queue.now()
    }

    pub fn clock(&self) -> &SimClock {
        self.queue.clock()
    }

    pub fn mode(&self) -> DecisionMode {
        self.mode
    }

    /// Whether the completion signal has fired.
    pub fn is_finished(&self) -> bool {
        self.termination.has_fired()
    }

    pub fn event_log(&self) -> &[EventLogEntry] {
        &self.event_log
    }

    pub fn case(&self, id: CaseId) -> Option<&Case> {
        self.processes.get(id.index()).map(|p| &p.case)
    }

    pub fn case_phase(&self, id: CaseId) -> Option<CasePhase> {
        self.processes.get(id.index()).map(|p| p.phase.kind())
    }

    /// Every case spawned so far, in arrival order.
    pub fn cases(&self) -> impl Iterator<Item = &Case> + '_ {
        self.processes.iter().map(|p| &p.case)
    }

    /// Completed cases, in completion order.
    pub fn completed_cases(&self) -> impl Iterator<Item = &Case> + '_ {
        self.completed.iter().map(|id| &self.processes[id.index()].case)
    }

    /// Cases paused for a decision, oldest first.
    pub fn pending_decisions(&self) -> impl Iterator<Item = CaseId> + '_ {
        self.bridge.pending()
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn activities(&self) -> &ActivityRegistry {
        &self.activities
    }

    pub fn calendars(&self) -> &CalendarSet {
        &self.calendars
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    // ── Event loop ────────────────────────────────────────────────────────

    /// Sample the first arrival on first use.
    fn ensure_started<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        self.schedule_next_arrival()?;
        self.check_termination(observer);
        Ok(())
    }

    /// Pop and dispatch one event.  `false` once the queue is empty.
    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<bool> {
        let Some((t, event)) = self.queue.pop() else {
            return Ok(false);
        };
        trace!(%t, ?event, "event");
        match event {
            Event::Arrival => self.on_arrival(observer)?,
            Event::Resume { case, wake } => match wake {
                Wake::Start               => self.enter_decision(case, observer)?,
                Wake::Decided(decision)   => self.resolve(case, decision, observer)?,
                Wake::CalendarOpen        => self.try_acquire(case)?,
                Wake::SlotGranted(slot)   => self.begin_execution(case, slot)?,
                Wake::ExecutionDone       => self.finish_execution(case, observer)?,
            },
        }
        Ok(true)
    }

    fn cap_reached(&self) -> bool {
        self.max_cases.is_some_and(|max| self.arrivals >= max)
    }

    fn mark_exhausted(&mut self) {
        if !self.termination.is_exhausted() {
            debug!(arrivals = self.arrivals, now = %self.now(), "arrivals exhausted");
            self.termination.arrivals_exhausted();
        }
    }

    fn schedule_next_arrival(&mut self) -> SimResult<()> {
        if self.cap_reached() {
            self.mark_exhausted();
            return Ok(());
        }
        match self.policies.arrival.next_inter_arrival(&mut self.rng) {
            None => self.mark_exhausted(),
            Some(delay) if delay.is_finite() && delay >= 0.0 => {
                self.queue.schedule(delay, Event::Arrival)?;
            }
            Some(value) => {
                return Err(PolicyError::InvalidSample { what: "inter-arrival delay", value }.into());
            }
        }
        Ok(())
    }

    fn on_arrival<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        // The cap may have been lowered after this arrival was sampled.
        if self.cap_reached() {
            self.mark_exhausted();
            self.check_termination(observer);
            return Ok(());
        }

        let id = CaseId::try_from(self.processes.len())
            .map_err(|_| SimError::Config("case id space exhausted".into()))?;
        let now = self.now();
        self.processes.push(CaseProcess { case: Case::new(id, now), phase: Phase::Arrived });
        self.arrivals += 1;
        self.termination.case_started();
        debug!(case = %id, %now, "case arrived");
        observer.on_case_arrived(&self.processes[id.index()].case);

        // Start is queued before the next arrival is sampled, so a zero
        // inter-arrival delay still lets this case move first.
        self.queue.schedule(0.0, Event::Resume { case: id, wake: Wake::Start })?;
        self.schedule_next_arrival()
    }

    // ── Case state machine ────────────────────────────────────────────────

    fn enter_decision<O: SimObserver>(&mut self, case: CaseId, observer: &mut O) -> SimResult<()> {
        let process = &mut self.processes[case.index()];
        process.phase = Phase::AwaitingDecision;
        process.case.current_activity = None;

        match self.mode {
            DecisionMode::Autonomous => {
                let decision = self.decide_with_policies(case)?;
                self.resolve(case, decision, observer)
            }
            DecisionMode::Controlled => {
                let now = self.now();
                self.bridge.push(case);
                debug!(case = %case, %now, pending = self.bridge.len(), "decision needed");
                observer.on_decision_needed(&self.processes[case.index()].case, now);
                Ok(())
            }
        }
    }

    fn decide_with_policies(&mut self, case: CaseId) -> SimResult<Decision> {
        let current = &self.processes[case.index()].case;
        let next = self
            .policies
            .routing
            .next_activity(current, current.last_activity(), &mut self.rng);
        let Some(activity) = next else {
            return Ok(Decision::Complete);
        };
        let resource = self
            .policies
            .resources
            .select_resource(activity, current, &mut self.rng)?;
        if resource.index() >= self.resources.len() {
            return Err(SimError::Config(format!(
                "resource policy chose unknown {resource} for {activity}"
            )));
        }
        Ok(Decision::Execute { activity, resource })
    }

    fn resolve<O: SimObserver>(
        &mut self,
        case:     CaseId,
        decision: Decision,
        observer: &mut O,
    ) -> SimResult<()> {
        match decision {
            Decision::Complete => self.complete_case(case, observer),
            Decision::Execute { activity, resource } => {
                let process = &mut self.processes[case.index()];
                process.case.current_activity = Some(activity);
                process.phase = Phase::AwaitingCalendar { activity, resource };
                debug!(case = %case, activity = %activity, resource = %resource, "activity chosen");
                self.gate_calendar(case, resource)
            }
        }
    }

    fn gate_calendar(&mut self, case: CaseId, resource: ResourceId) -> SimResult<()> {
        let now = self.now();
        let open = self
            .calendars
            .for_resource(resource)
            .next_working_instant(self.queue.clock(), now)?;
        if open > now {
            trace!(case = %case, %open, "outside working hours");
            self.queue.schedule_at(open, Event::Resume { case, wake: Wake::CalendarOpen })?;
            return Ok(());
        }
        self.try_acquire(case)
    }

    fn try_acquire(&mut self, case: CaseId) -> SimResult<()> {
        let process = &mut self.processes[case.index()];
        let &Phase::AwaitingCalendar { activity, resource } = &process.phase else {
            return Err(invariant(case, "awaiting calendar"));
        };
        process.phase = Phase::AwaitingResource { activity, resource };

        match self.pool.acquire(resource, case)? {
            Acquire::Granted(slot) => self.begin_execution(case, slot),
            Acquire::Queued => {
                trace!(case = %case, resource = %resource, waiting = self.pool.waiting(resource), "queued");
                Ok(())
            }
        }
    }

    fn begin_execution(&mut self, case: CaseId, slot: Slot) -> SimResult<()> {
        let now = self.now();
        let process = &mut self.processes[case.index()];
        let &Phase::AwaitingResource { activity, resource } = &process.phase else {
            return Err(invariant(case, "awaiting resource"));
        };
        debug_assert_eq!(slot.resource(), resource);

        let duration = self.policies.durations.duration(activity, resource, &mut self.rng)?;
        if !(duration.is_finite() && duration >= 0.0) {
            return Err(PolicyError::InvalidSample { what: "duration", value: duration }.into());
        }
        process.phase = Phase::Executing { activity, resource, since: now, slot };
        debug!(case = %case, activity = %activity, resource = %resource, %now, duration, "execution started");
        self.queue.schedule(duration, Event::Resume { case, wake: Wake::ExecutionDone })?;
        Ok(())
    }

    fn finish_execution<O: SimObserver>(&mut self, case: CaseId, observer: &mut O) -> SimResult<()> {
        let now = self.now();
        let process = &mut self.processes[case.index()];
        let Phase::Executing { activity, resource, since, slot } =
            std::mem::replace(&mut process.phase, Phase::AwaitingDecision)
        else {
            return Err(invariant(case, "executing"));
        };
        process.case.history.push(activity);

        let entry = EventLogEntry { case, activity, resource, start: since, end: now };
        self.event_log.push(entry);
        debug!(case = %case, activity = %activity, resource = %resource, %now, "execution finished");
        observer.on_activity_complete(&entry);

        if let Some((waiter, slot)) = self.pool.release(slot)? {
            trace!(case = %waiter, resource = %resource, "slot handed over");
            self.queue.schedule(0.0, Event::Resume { case: waiter, wake: Wake::SlotGranted(slot) })?;
        }
        self.enter_decision(case, observer)
    }

    fn complete_case<O: SimObserver>(&mut self, case: CaseId, observer: &mut O) -> SimResult<()> {
        let now = self.now();
        let process = &mut self.processes[case.index()];
        process.case.finalize(now);
        process.phase = Phase::Completed;
        self.completed.push(case);
        self.termination.case_finished();
        debug!(case = %case, %now, cycle_time = ?process.case.cycle_time(), "case completed");
        observer.on_case_complete(&process.case);
        self.check_termination(observer);
        Ok(())
    }

    fn check_termination<O: SimObserver>(&mut self, observer: &mut O) {
        if self.termination.check() {
            let now = self.now();
            info!(%now, completed = self.completed.len(), "all cases completed");
            observer.on_sim_end(now, self.completed.len());
        }
    }
}
