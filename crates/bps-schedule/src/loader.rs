//! CSV loaders for resources and calendars.
//!
//! # Resources CSV
//!
//! One row per resource.  Ids must be dense from zero (any order).
//!
//! ```csv
//! resource_id,name,capacity,skills
//! 0,Kim Passa,1,Create Purchase Requisition;Approve Purchase Requisition
//! 1,Esmeralda Clay,2,Create Request for Quotation
//! ```
//!
//! `skills` is a `;`-separated list of activity names.  Names are interned
//! into the caller's [`ActivityRegistry`], so the same registry must later be
//! used to build routing tables.
//!
//! # Calendars CSV
//!
//! One row per available (or explicitly unavailable) hour slot.
//!
//! ```csv
//! day,hour,available,resource_id
//! 0,9,1,
//! 0,10,1,
//! 0,9,1,3
//! ```
//!
//! | Column        | Meaning                                               |
//! |---------------|-------------------------------------------------------|
//! | `day`         | 0 = Monday … 6 = Sunday                               |
//! | `hour`        | 0–23                                                  |
//! | `available`   | `1`/`0`, `true`/`false`, `yes`/`no`, `x`/`.`          |
//! | `resource_id` | optional; empty means the default calendar            |
//!
//! Every calendar mentioned in the file starts fully unavailable and only the
//! listed slots are opened.  If no row targets the default calendar it stays
//! always-available.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use bps_core::{ActivityRegistry, Resource, ResourceId};

use crate::calendar::{CalendarSet, WeeklyCalendar, DAYS_PER_WEEK, HOURS_PER_DAY};
use crate::ScheduleError;

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ResourceRecord {
    resource_id: u32,
    #[serde(default)]
    name:        Option<String>,
    capacity:    u32,
    #[serde(default)]
    skills:      String,
}

#[derive(Deserialize)]
struct CalendarRecord {
    day:         usize,
    hour:        usize,
    available:   String,
    #[serde(default)]
    resource_id: Option<u32>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load resources from a CSV file, interning skill names into `activities`.
///
/// Returns a `Vec` indexed by `ResourceId`.
pub fn load_resources_csv(
    path: &Path,
    activities: &mut ActivityRegistry,
) -> Result<Vec<Resource>, ScheduleError> {
    let file = std::fs::File::open(path).map_err(ScheduleError::Io)?;
    load_resources_reader(file, activities)
}

/// Like [`load_resources_csv`] but accepts any `Read` source.
pub fn load_resources_reader<R: Read>(
    reader: R,
    activities: &mut ActivityRegistry,
) -> Result<Vec<Resource>, ScheduleError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut by_id: HashMap<u32, Resource> = HashMap::new();

    for result in csv_reader.deserialize::<ResourceRecord>() {
        let row = result.map_err(|e| ScheduleError::Parse(e.to_string()))?;
        if row.capacity == 0 {
            return Err(ScheduleError::Parse(format!(
                "resource {} has capacity 0",
                row.resource_id
            )));
        }

        let mut resource = Resource::new(ResourceId(row.resource_id), row.capacity);
        if let Some(name) = row.name.filter(|n| !n.trim().is_empty()) {
            resource = resource.with_name(name.trim());
        }
        for skill in row.skills.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            resource.skills.insert(activities.intern(skill)?);
        }

        if by_id.insert(row.resource_id, resource).is_some() {
            return Err(ScheduleError::Parse(format!(
                "duplicate resource_id {}",
                row.resource_id
            )));
        }
    }

    // ── Ids must be dense from zero ───────────────────────────────────────
    let count = by_id.len() as u32;
    (0..count)
        .map(|i| {
            by_id.remove(&i).ok_or_else(|| {
                ScheduleError::Parse(format!(
                    "resource ids must be dense from 0: missing {i} among {count} rows"
                ))
            })
        })
        .collect()
}

/// Load a [`CalendarSet`] from a CSV file.
pub fn load_calendars_csv(path: &Path) -> Result<CalendarSet, ScheduleError> {
    let file = std::fs::File::open(path).map_err(ScheduleError::Io)?;
    load_calendars_reader(file)
}

/// Like [`load_calendars_csv`] but accepts any `Read` source.
pub fn load_calendars_reader<R: Read>(reader: R) -> Result<CalendarSet, ScheduleError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut default: Option<WeeklyCalendar> = None;
    let mut overrides: HashMap<u32, WeeklyCalendar> = HashMap::new();

    for result in csv_reader.deserialize::<CalendarRecord>() {
        let row = result.map_err(|e| ScheduleError::Parse(e.to_string()))?;
        if row.day >= DAYS_PER_WEEK || row.hour >= HOURS_PER_DAY {
            return Err(ScheduleError::Parse(format!(
                "slot (day {}, hour {}) out of range: expected day 0-6, hour 0-23",
                row.day, row.hour
            )));
        }
        let available = parse_flag(&row.available)?;
        let calendar = match row.resource_id {
            None => default.get_or_insert_with(WeeklyCalendar::never_available),
            Some(id) => overrides
                .entry(id)
                .or_insert_with(WeeklyCalendar::never_available),
        };
        calendar.set(row.day, row.hour, available);
    }

    let mut set = CalendarSet::uniform(default.unwrap_or_default());
    for (id, calendar) in overrides {
        set.set_override(ResourceId(id), calendar);
    }
    Ok(set)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_flag(s: &str) -> Result<bool, ScheduleError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "x" => Ok(true),
        "0" | "false" | "no" | "." | "" => Ok(false),
        other => Err(ScheduleError::Parse(format!(
            "invalid availability flag {other:?}: expected 1/0, true/false, yes/no or x/."
        ))),
    }
}
