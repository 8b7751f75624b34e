//! Fluent builder for constructing a [`Sim`].

use bps_core::{ActivityRegistry, Resource, SimConfig, SimRng};
use bps_policy::PolicySet;
use bps_schedule::{CalendarSet, EventQueue, WeeklyCalendar};

use crate::{DecisionBridge, ResourcePool, Sim, SimError, SimResult, Termination};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`] — epoch, time unit, seed, case cap
/// - `Vec<Resource>` — ids dense from zero, capacity ≥ 1
/// - [`PolicySet`] — arrival, routing, allocation, and duration policies
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                               |
/// |-------------------|---------------------------------------|
/// | `.calendars(c)`   | `WeeklyCalendar::always_available()`  |
/// | `.activities(r)`  | empty `ActivityRegistry`              |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, resources, policies)
///     .calendars(CalendarSet::uniform(WeeklyCalendar::weekdays(9, 17)))
///     .activities(registry)
///     .build()?;
/// sim.simulate(None, &mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:     SimConfig,
    resources:  Vec<Resource>,
    policies:   PolicySet,
    calendars:  Option<CalendarSet>,
    activities: Option<ActivityRegistry>,
}

impl SimBuilder {
    pub fn new(config: SimConfig, resources: Vec<Resource>, policies: PolicySet) -> Self {
        Self {
            config,
            resources,
            policies,
            calendars:  None,
            activities: None,
        }
    }

    /// Working-time calendars.  Every resource uses the default calendar
    /// unless it has an override.
    pub fn calendars(mut self, calendars: CalendarSet) -> Self {
        self.calendars = Some(calendars);
        self
    }

    /// Activity names, used by output writers and drivers.
    pub fn activities(mut self, activities: ActivityRegistry) -> Self {
        self.activities = Some(activities);
        self
    }

    /// Validate inputs and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim> {
        // ── Resources: dense ids, positive capacity ───────────────────────
        for (i, resource) in self.resources.iter().enumerate() {
            if resource.id.index() != i {
                return Err(SimError::Config(format!(
                    "resource ids must be dense from 0: position {i} holds {}",
                    resource.id
                )));
            }
            if resource.capacity == 0 {
                return Err(SimError::Config(format!(
                    "{} has zero capacity",
                    resource.id
                )));
            }
        }

        // ── Calendars: known resources, at least one working hour ─────────
        let calendars = self
            .calendars
            .unwrap_or_else(|| CalendarSet::uniform(WeeklyCalendar::always_available()));
        if let Some(unknown) = calendars
            .overridden_resources()
            .into_iter()
            .find(|r| r.index() >= self.resources.len())
        {
            return Err(SimError::Config(format!(
                "calendar override for unknown {unknown}"
            )));
        }
        match calendars.first_empty() {
            Some(None) => {
                return Err(SimError::Config("default calendar has no working hours".into()));
            }
            Some(Some(resource)) => {
                return Err(SimError::Config(format!(
                    "calendar of {resource} has no working hours"
                )));
            }
            None => {}
        }

        let max_cases = self.config.max_cases;
        Ok(Sim {
            queue:       EventQueue::new(self.config.make_clock()),
            rng:         SimRng::new(self.config.seed),
            config:      self.config,
            pool:        ResourcePool::new(&self.resources),
            resources:   self.resources,
            calendars,
            activities:  self.activities.unwrap_or_default(),
            policies:    self.policies,
            bridge:      DecisionBridge::new(),
            termination: Termination::default(),
            mode:        Default::default(),
            processes:   Vec::new(),
            completed:   Vec::new(),
            reported:    0,
            event_log:   Vec::new(),
            arrivals:    0,
            max_cases,
            started:     false,
        })
    }
}
