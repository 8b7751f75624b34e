//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `event_log.csv`
//! - `cases.csv`

use std::fs::File;
use std::path::Path;

use bps_core::EventLogEntry;
use bps_sim::Sim;
use csv::Writer;

use crate::writer::OutputWriter;
use crate::{CaseRow, EventLogRow, Labels, OutputResult};

const EVENT_HEADER: [&str; 5] = ["case_id", "activity", "resource", "start_timestamp", "end_timestamp"];
const CASE_HEADER: [&str; 4] = ["case_id", "start", "end", "cycle_time"];

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    events:   Writer<File>,
    cases:    Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut events = Writer::from_path(dir.join("event_log.csv"))?;
        events.write_record(EVENT_HEADER)?;

        let mut cases = Writer::from_path(dir.join("cases.csv"))?;
        cases.write_record(CASE_HEADER)?;

        Ok(Self { events, cases, finished: false })
    }
}

fn event_record(row: &EventLogRow) -> [String; 5] {
    [
        row.case_id.to_string(),
        row.activity.clone(),
        row.resource.clone(),
        row.start_timestamp.clone(),
        row.end_timestamp.clone(),
    ]
}

impl OutputWriter for CsvWriter {
    fn write_event(&mut self, row: &EventLogRow) -> OutputResult<()> {
        self.events.write_record(&event_record(row))?;
        Ok(())
    }

    fn write_case(&mut self, row: &CaseRow) -> OutputResult<()> {
        self.cases.write_record(&[
            row.case_id.to_string(),
            row.start.clone(),
            row.end.clone(),
            row.cycle_time.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.events.flush()?;
        self.cases.flush()?;
        Ok(())
    }
}

/// Write `entries` to a single event-log CSV at `path`.  Returns the number of
/// rows written.
pub fn write_event_log(path: &Path, entries: &[EventLogEntry], labels: &Labels) -> OutputResult<usize> {
    let mut w = Writer::from_path(path)?;
    w.write_record(EVENT_HEADER)?;
    for entry in entries {
        w.write_record(&event_record(&labels.event_row(entry)?))?;
    }
    w.flush()?;
    Ok(entries.len())
}

/// Dump a finished (or paused) simulation's log and completed cases into `dir`.
pub fn export_csv(dir: &Path, sim: &Sim) -> OutputResult<()> {
    let labels = Labels::from_sim(sim);
    let mut w = CsvWriter::new(dir)?;
    for entry in sim.event_log() {
        w.write_event(&labels.event_row(entry)?)?;
    }
    for case in sim.completed_cases() {
        if let Some(row) = labels.case_row(case)? {
            w.write_case(&row)?;
        }
    }
    w.finish()
}
