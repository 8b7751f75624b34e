//! Simulation observer trait for progress reporting and data collection.

use bps_core::{Case, EventLogEntry, SimTime};

/// Callbacks invoked by the engine as cases move through their lifecycle.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: completion counter
///
/// ```rust,ignore
/// struct Counter(usize);
///
/// impl SimObserver for Counter {
///     fn on_case_complete(&mut self, _case: &Case) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SimObserver {
    /// A new case has entered the process.
    fn on_case_arrived(&mut self, _case: &Case) {}

    /// A case paused for an external decision (controlled mode only).
    fn on_decision_needed(&mut self, _case: &Case, _now: SimTime) {}

    /// An activity execution finished; `entry` was just appended to the log.
    fn on_activity_complete(&mut self, _entry: &EventLogEntry) {}

    /// A case reached its terminal state.  `case.end` is set.
    fn on_case_complete(&mut self, _case: &Case) {}

    /// Called once, when arrivals are exhausted and the last case completes.
    fn on_sim_end(&mut self, _now: SimTime, _completed: usize) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
