//! The `OutputWriter` trait implemented by all backend writers.

use crate::{CaseRow, EventLogRow, OutputResult};

/// Trait implemented by the CSV and SQLite writers.
///
/// All methods are infallible from the observer's perspective: errors are
/// stored internally and retrieved with [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Append one event-log row.
    fn write_event(&mut self, row: &EventLogRow) -> OutputResult<()>;

    /// Append one completed-case row.
    fn write_case(&mut self, row: &CaseRow) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent; safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
