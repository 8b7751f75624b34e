//! `bps-schedule` — virtual-time event queue, working-hours calendars, and
//! CSV input loading.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`event_queue`] | `EventQueue<E>` (`SimClock` + `BTreeMap<SimTime, VecDeque<E>>`) |
//! | [`calendar`]    | `WeeklyCalendar`, `CalendarSet`                           |
//! | [`loader`]      | `load_resources_csv`, `load_calendars_csv` and reader variants |
//! | [`error`]       | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! # Time model (summary)
//!
//! ```text
//! schedule(delay, ev)   → ev fires at now + delay   (delay ≥ 0, finite)
//! pop()                 → earliest event; ties in insertion order
//! calendar gate         → first available hour slot at or after `from`
//! ```

pub mod calendar;
pub mod error;
pub mod event_queue;
pub mod loader;


pub use calendar::{CalendarSet, WeeklyCalendar, DAYS_PER_WEEK, HOURS_PER_DAY, HOURS_PER_WEEK};
pub use error::{ScheduleError, ScheduleResult};
pub use event_queue::EventQueue;
pub use loader::{load_calendars_csv, load_calendars_reader, load_resources_csv, load_resources_reader};
