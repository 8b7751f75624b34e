//! Weekly working-hours calendars.
//!
//! # Slot model
//!
//! A week is 7 days × 24 hours = 168 one-hour slots.  Day 0 is Monday.  A
//! virtual time `t` is mapped to a slot through the run's [`SimClock`]:
//!
//! ```text
//! unix  = start_unix_secs + t * unit_secs
//! day   = (floor(unix / 86400) + 3) mod 7      // 1970-01-01 was a Thursday
//! hour  = (unix mod 86400) / 3600
//! ```
//!
//! All arithmetic is in UTC.
//!
//! # Gate
//!
//! [`WeeklyCalendar::next_working_instant`] returns `from` unchanged when its
//! slot is available, and otherwise the first available hour boundary after
//! it.  The scan covers at most one week, so an empty calendar fails with
//! [`ScheduleError::NoWorkingHours`] instead of looping.

use std::collections::HashMap;
use std::fmt;

use bps_core::{ResourceId, SimClock, SimTime};

use crate::{ScheduleError, ScheduleResult};

pub const DAYS_PER_WEEK: usize = 7;
pub const HOURS_PER_DAY: usize = 24;
pub const HOURS_PER_WEEK: usize = DAYS_PER_WEEK * HOURS_PER_DAY;

const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_DAY: i64 = 86_400;
/// Weekday index (Monday = 0) of the Unix epoch.
const EPOCH_WEEKDAY: i64 = 3;

// ── WeeklyCalendar ────────────────────────────────────────────────────────────

/// A 7×24 availability table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeeklyCalendar {
    availability: [[bool; HOURS_PER_DAY]; DAYS_PER_WEEK],
}

impl WeeklyCalendar {
    pub fn from_table(availability: [[bool; HOURS_PER_DAY]; DAYS_PER_WEEK]) -> Self {
        Self { availability }
    }

    /// Every hour of every day is available.
    pub fn always_available() -> Self {
        Self::from_table([[true; HOURS_PER_DAY]; DAYS_PER_WEEK])
    }

    /// No hour is available.  Useful as a starting point for [`set`][Self::set];
    /// rejected by the simulator if left empty.
    pub fn never_available() -> Self {
        Self::from_table([[false; HOURS_PER_DAY]; DAYS_PER_WEEK])
    }

    /// Monday–Friday, hours `[start_hour, end_hour)`.
    pub fn weekdays(start_hour: usize, end_hour: usize) -> Self {
        let mut cal = Self::never_available();
        for day in 0..5 {
            for hour in start_hour..end_hour.min(HOURS_PER_DAY) {
                cal.availability[day][hour] = true;
            }
        }
        cal
    }

    /// Mark one slot.  Out-of-range indices are ignored.
    pub fn set(&mut self, day: usize, hour: usize, available: bool) {
        if day < DAYS_PER_WEEK && hour < HOURS_PER_DAY {
            self.availability[day][hour] = available;
        }
    }

    pub fn is_available(&self, day: usize, hour: usize) -> bool {
        day < DAYS_PER_WEEK && hour < HOURS_PER_DAY && self.availability[day][hour]
    }

    /// Number of available hours in the week.
    pub fn working_hours(&self) -> usize {
        self.availability.iter().flatten().filter(|&&a| a).count()
    }

    pub fn has_working_hours(&self) -> bool {
        self.working_hours() > 0
    }

    /// `true` if virtual time `t` falls in an available slot.
    pub fn is_working_time(&self, clock: &SimClock, t: SimTime) -> bool {
        self.available_at_unix(clock.to_unix_secs(t).floor() as i64)
    }

    /// The earliest instant ≥ `from` at which work may begin.
    pub fn next_working_instant(&self, clock: &SimClock, from: SimTime) -> ScheduleResult<SimTime> {
        let whole_secs = clock.to_unix_secs(from).floor() as i64;
        if self.available_at_unix(whole_secs) {
            return Ok(from);
        }

        let mut boundary = (whole_secs.div_euclid(SECS_PER_HOUR) + 1) * SECS_PER_HOUR;
        for _ in 0..HOURS_PER_WEEK {
            if self.available_at_unix(boundary) {
                // Float round-trip may land a hair before `from`; never go back.
                return Ok(clock.from_unix_secs(boundary as f64).max(from));
            }
            boundary += SECS_PER_HOUR;
        }
        Err(ScheduleError::NoWorkingHours)
    }

    fn available_at_unix(&self, unix_secs: i64) -> bool {
        let (day, hour) = slot_of(unix_secs);
        self.availability[day][hour]
    }
}

impl Default for WeeklyCalendar {
    fn default() -> Self {
        Self::always_available()
    }
}

impl fmt::Display for WeeklyCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const DAYS: [&str; DAYS_PER_WEEK] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
        writeln!(f, "WeeklyCalendar")?;
        for (name, row) in DAYS.iter().zip(self.availability.iter()) {
            let cells: Vec<&str> = row.iter().map(|&a| if a { "X" } else { "." }).collect();
            writeln!(f, "{name}: {}", cells.join(" "))?;
        }
        Ok(())
    }
}

/// (weekday, hour) of a Unix timestamp, Monday = 0.
fn slot_of(unix_secs: i64) -> (usize, usize) {
    let days = unix_secs.div_euclid(SECS_PER_DAY);
    let day = (days + EPOCH_WEEKDAY).rem_euclid(DAYS_PER_WEEK as i64) as usize;
    let hour = (unix_secs.rem_euclid(SECS_PER_DAY) / SECS_PER_HOUR) as usize;
    (day, hour)
}

// ── CalendarSet ───────────────────────────────────────────────────────────────

/// A default calendar plus optional per-resource overrides.
#[derive(Clone, Debug, Default)]
pub struct CalendarSet {
    default:   WeeklyCalendar,
    overrides: HashMap<ResourceId, WeeklyCalendar>,
}

impl CalendarSet {
    /// Every resource follows `default`.
    pub fn uniform(default: WeeklyCalendar) -> Self {
        Self { default, overrides: HashMap::new() }
    }

    /// Give `resource` its own calendar.
    pub fn with_override(mut self, resource: ResourceId, calendar: WeeklyCalendar) -> Self {
        self.overrides.insert(resource, calendar);
        self
    }

    pub fn set_override(&mut self, resource: ResourceId, calendar: WeeklyCalendar) {
        self.overrides.insert(resource, calendar);
    }

    pub fn default_calendar(&self) -> &WeeklyCalendar {
        &self.default
    }

    /// The calendar gating `resource`.
    pub fn for_resource(&self, resource: ResourceId) -> &WeeklyCalendar {
        self.overrides.get(&resource).unwrap_or(&self.default)
    }

    /// Resources with an explicit override, ascending.
    pub fn overridden_resources(&self) -> Vec<ResourceId> {
        let mut ids: Vec<ResourceId> = self.overrides.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// The first calendar without any working hours: `Some(None)` for the
    /// default, `Some(Some(id))` for an override, `None` if all are usable.
    pub fn first_empty(&self) -> Option<Option<ResourceId>> {
        if !self.default.has_working_hours() {
            return Some(None);
        }
        self.overridden_resources()
            .into_iter()
            .find(|id| !self.overrides[id].has_working_hours())
            .map(Some)
    }
}
