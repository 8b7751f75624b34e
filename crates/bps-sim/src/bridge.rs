//! The decision bridge: cases paused at a routing/resource decision.

use std::collections::VecDeque;

use bps_core::{ActivityId, CaseId, ResourceId};

/// How `AWAITING_DECISION` is resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum DecisionMode {
    /// Routing and allocation policies answer immediately.
    #[default]
    Autonomous,
    /// Cases pause until a driver calls `apply_decision`.
    Controlled,
}

/// The answer to a pending decision.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Execute { activity: ActivityId, resource: ResourceId },
    /// No further activity; the case completes.
    Complete,
}

impl Decision {
    pub fn from_parts(activity: Option<ActivityId>, resource: ResourceId) -> Self {
        match activity {
            Some(activity) => Decision::Execute { activity, resource },
            None => Decision::Complete,
        }
    }
}

/// Ordered queue of paused cases plus a level-triggered "decision needed"
/// signal.
///
/// The signal is raised by every [`push`](Self::push) and lowered only when
/// the queue drains.
#[derive(Clone, Debug, Default)]
pub struct DecisionBridge {
    pending: VecDeque<CaseId>,
    signal:  bool,
}

impl DecisionBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, case: CaseId) {
        debug_assert!(!self.pending.contains(&case), "{case} already awaits a decision");
        self.pending.push_back(case);
        self.signal = true;
    }

    /// The oldest paused case, without resolving it.
    pub fn peek(&self) -> Option<CaseId> {
        self.pending.front().copied()
    }

    /// Remove the oldest paused case.  Lowers the signal once nothing is left.
    pub fn pop(&mut self) -> Option<CaseId> {
        let case = self.pending.pop_front();
        if self.pending.is_empty() {
            self.signal = false;
        }
        case
    }

    pub fn is_signalled(&self) -> bool {
        self.signal
    }

    pub fn contains(&self, case: CaseId) -> bool {
        self.pending.contains(&case)
    }

    pub fn pending(&self) -> impl Iterator<Item = CaseId> + '_ {
        self.pending.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.signal = false;
    }
}
