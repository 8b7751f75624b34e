//! `bps-output` — simulation output writers for the rust_bps simulator.
//!
//! Two backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                    |
//! |-----------|---------|----------------------------------|
//! | *(none)*  | CSV     | `event_log.csv`, `cases.csv`     |
//! | `sqlite`  | SQLite  | `output.db`                      |
//!
//! Both backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `bps_sim::SimObserver`.
//! Timestamps are RFC 3339 in UTC, derived from the simulation epoch.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bps_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output")).unwrap();
//! let mut obs = SimOutputObserver::new(writer, &sim);
//! sim.simulate(None, &mut obs).unwrap();
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use self::csv::{export_csv, write_event_log, CsvWriter};
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{CaseRow, EventLogRow, Labels};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
