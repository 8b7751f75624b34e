//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use bps_core::{Case, EventLogEntry, SimTime};
use bps_sim::{Sim, SimObserver};
use tracing::debug;

use crate::writer::OutputWriter;
use crate::{Labels, OutputError, OutputResult};

/// A [`SimObserver`] that streams event-log rows and completed cases to any
/// [`OutputWriter`] backend (CSV, SQLite).
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After the run returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    labels:     Labels,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, labelling rows with `sim`'s
    /// epoch, activity names, and resource names.
    pub fn new(writer: W, sim: &Sim) -> Self {
        Self::with_labels(writer, Labels::from_sim(sim))
    }

    pub fn with_labels(writer: W, labels: Labels) -> Self {
        Self { writer, labels, last_error: None }
    }

    /// Take the stored write error (if any) after the run returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush the writer without waiting for the end of the run, e.g. when a
    /// controlled session is abandoned part-way.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.finish()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_activity_complete(&mut self, entry: &EventLogEntry) {
        let result = self
            .labels
            .event_row(entry)
            .and_then(|row| self.writer.write_event(&row));
        self.store_err(result);
    }

    fn on_case_complete(&mut self, case: &Case) {
        let result = match self.labels.case_row(case) {
            Ok(Some(row)) => self.writer.write_case(&row),
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };
        self.store_err(result);
    }

    fn on_sim_end(&mut self, now: SimTime, completed: usize) {
        debug!(%now, completed, "flushing simulation output");
        let result = self.writer.finish();
        self.store_err(result);
    }
}
