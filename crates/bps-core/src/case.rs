//! `Case` — one instance of the business process.

use crate::{ActivityId, CaseId, SimTime};

/// The lifecycle record of a single case.
///
/// Created when the case arrives; mutated only by the engine on behalf of the
/// case's own process; finalised (`end` set) when its process completes and
/// never touched again after that.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Case {
    pub id: CaseId,
    /// Arrival instant.
    pub start: SimTime,
    /// Completion instant; `None` while the case is in flight.
    pub end: Option<SimTime>,
    /// Activity currently chosen or executing, if any.
    pub current_activity: Option<ActivityId>,
    /// Activities executed so far, in order.
    pub history: Vec<ActivityId>,
}

impl Case {
    pub fn new(id: CaseId, start: SimTime) -> Self {
        Self {
            id,
            start,
            end: None,
            current_activity: None,
            history: Vec::new(),
        }
    }

    /// The most recently completed activity.
    pub fn last_activity(&self) -> Option<ActivityId> {
        self.history.last().copied()
    }

    pub fn is_complete(&self) -> bool {
        self.end.is_some()
    }

    /// `end − start`, once the case has completed.
    pub fn cycle_time(&self) -> Option<f64> {
        self.end.map(|end| end.since(self.start))
    }

    /// Mark the case finished at `at`.
    pub fn finalize(&mut self, at: SimTime) {
        debug_assert!(self.end.is_none(), "{} finalized twice", self.id);
        self.current_activity = None;
        self.end = Some(at);
    }
}
