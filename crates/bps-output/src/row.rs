//! Plain data row types written by output backends, and the labels that turn
//! engine ids and virtual times into them.

use bps_core::{ActivityRegistry, Case, EventLogEntry, Resource, SimClock, SimTime};
use bps_sim::Sim;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::{OutputError, OutputResult};

/// One executed activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLogRow {
    pub case_id:         u32,
    pub activity:        String,
    pub resource:        String,
    /// RFC 3339, UTC.
    pub start_timestamp: String,
    pub end_timestamp:   String,
}

/// One completed case.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRow {
    pub case_id:    u32,
    pub start:      String,
    pub end:        String,
    /// `end − start`, in the configured time unit.
    pub cycle_time: f64,
}

/// Names and epoch needed to render rows.
///
/// Activities missing from the registry and resources missing from the table
/// fall back to their numeric id.
#[derive(Clone, Debug)]
pub struct Labels {
    clock:      SimClock,
    activities: Vec<String>,
    resources:  Vec<String>,
}

impl Labels {
    pub fn new(clock: SimClock, activities: &ActivityRegistry, resources: &[Resource]) -> Self {
        Self {
            clock,
            activities: activities
                .ids()
                .map(|id| activities.name(id).unwrap_or_default().to_owned())
                .collect(),
            resources: resources.iter().map(|r| r.name.clone()).collect(),
        }
    }

    /// Labels matching a built simulation.
    pub fn from_sim(sim: &Sim) -> Self {
        Self::new(sim.clock().clone(), sim.activities(), sim.resources())
    }

    /// RFC 3339 UTC rendering of virtual time `t`.  Fractional seconds are
    /// printed only when present.
    pub fn timestamp(&self, t: SimTime) -> OutputResult<String> {
        let millis = self.clock.to_unix_millis(t);
        let dt = DateTime::<Utc>::from_timestamp_millis(millis).ok_or(OutputError::Timestamp(millis))?;
        Ok(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn event_row(&self, entry: &EventLogEntry) -> OutputResult<EventLogRow> {
        Ok(EventLogRow {
            case_id:         entry.case.0,
            activity:        self
                .activities
                .get(entry.activity.index())
                .cloned()
                .unwrap_or_else(|| entry.activity.0.to_string()),
            resource:        self
                .resources
                .get(entry.resource.index())
                .cloned()
                .unwrap_or_else(|| entry.resource.0.to_string()),
            start_timestamp: self.timestamp(entry.start)?,
            end_timestamp:   self.timestamp(entry.end)?,
        })
    }

    /// `None` for a case that has not completed.
    pub fn case_row(&self, case: &Case) -> OutputResult<Option<CaseRow>> {
        let (Some(end), Some(cycle_time)) = (case.end, case.cycle_time()) else {
            return Ok(None);
        };
        Ok(Some(CaseRow {
            case_id: case.id.0,
            start:   self.timestamp(case.start)?,
            end:     self.timestamp(end)?,
            cycle_time,
        }))
    }
}
