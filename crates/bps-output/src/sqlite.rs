//! SQLite output backend (feature `sqlite`).
//!
//! Creates `output.db` in the output directory with an `event_log` table
//! (indexed by case) and a `cases` table.  Rows arrive one at a time from the
//! observer, so the whole run is written inside a single transaction that
//! [`finish`](OutputWriter::finish) commits.

use std::path::Path;

use rusqlite::{params, Connection};
use tracing::warn;

use crate::writer::OutputWriter;
use crate::{CaseRow, EventLogRow, OutputResult};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS event_log (
        case_id         INTEGER NOT NULL,
        activity        TEXT    NOT NULL,
        resource        TEXT    NOT NULL,
        start_timestamp TEXT    NOT NULL,
        end_timestamp   TEXT    NOT NULL
    );
    CREATE INDEX IF NOT EXISTS event_log_case ON event_log (case_id);
    CREATE TABLE IF NOT EXISTS cases (
        case_id    INTEGER PRIMARY KEY,
        start      TEXT    NOT NULL,
        end        TEXT    NOT NULL,
        cycle_time REAL    NOT NULL
    );";

/// Writes the event log and case summaries to an SQLite database.
pub struct SqliteWriter {
    conn: Connection,
    /// A transaction is open until `finish`.
    open: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir`, create the schema, and begin the
    /// run's transaction.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch(SCHEMA)?;
        conn.execute_batch("BEGIN")?;
        Ok(Self { conn, open: true })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_event(&mut self, row: &EventLogRow) -> OutputResult<()> {
        self.conn
            .prepare_cached(
                "INSERT INTO event_log \
                 (case_id, activity, resource, start_timestamp, end_timestamp) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?
            .execute(params![
                row.case_id,
                row.activity,
                row.resource,
                row.start_timestamp,
                row.end_timestamp,
            ])?;
        Ok(())
    }

    fn write_case(&mut self, row: &CaseRow) -> OutputResult<()> {
        self.conn
            .prepare_cached("INSERT INTO cases (case_id, start, end, cycle_time) VALUES (?1, ?2, ?3, ?4)")?
            .execute(params![row.case_id, row.start, row.end, row.cycle_time])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.conn.execute_batch("COMMIT; PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}

impl Drop for SqliteWriter {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            warn!(error = %e, "sqlite output not committed");
        }
    }
}
