//! The policy traits: the extension points for user code.

use bps_core::{ActivityId, Case, ResourceId, SimRng};

use crate::PolicyResult;

/// When new cases enter the simulation.
///
/// # Contract
///
/// - Returns the delay (in virtual time units) from the previous arrival (or
///   from time zero for the first case) to the next one.
/// - `None` means the source is exhausted; no further cases arrive.
/// - A negative or non-finite delay is a policy bug and aborts the run.
pub trait ArrivalPolicy: Send + 'static {
    fn next_inter_arrival(&mut self, rng: &mut SimRng) -> Option<f64>;

    /// Rewind any internal cursor so a reset run replays the same source.
    ///
    /// Default: nothing to rewind.
    fn reset(&mut self) {}
}

/// Which activity a case performs next.
///
/// `last` is the activity just completed, or `None` at the start of the
/// case.  Returning `None` ends the case.
pub trait RoutingPolicy: Send + Sync + 'static {
    fn next_activity(
        &self,
        case: &Case,
        last: Option<ActivityId>,
        rng:  &mut SimRng,
    ) -> Option<ActivityId>;
}

/// Which resource performs a chosen activity.
///
/// # Contract
///
/// - Must not block or wait for the resource to become free; queuing is the
///   engine's job.
/// - An error (e.g. nobody has the skill) aborts the run: the case could never
///   make progress.
pub trait ResourcePolicy: Send + Sync + 'static {
    fn select_resource(
        &self,
        activity: ActivityId,
        case:     &Case,
        rng:      &mut SimRng,
    ) -> PolicyResult<ResourceId>;
}

/// How long an activity takes once its resource slot is held.
///
/// The returned duration must be finite and ≥ 0.
pub trait ProcessingTimePolicy: Send + Sync + 'static {
    fn duration(
        &self,
        activity: ActivityId,
        resource: ResourceId,
        rng:      &mut SimRng,
    ) -> PolicyResult<f64>;
}
