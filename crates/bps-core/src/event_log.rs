//! Append-only execution record.

use crate::{ActivityId, CaseId, ResourceId, SimTime};

/// One completed activity execution.
///
/// `start`/`end` are virtual times; map them to wall-clock timestamps with
/// [`SimClock::to_unix_secs`][crate::SimClock::to_unix_secs].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventLogEntry {
    pub case:     CaseId,
    pub activity: ActivityId,
    pub resource: ResourceId,
    pub start:    SimTime,
    pub end:      SimTime,
}

impl EventLogEntry {
    /// Time the resource slot was held.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end.since(self.start)
    }
}
