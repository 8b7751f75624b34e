use bps_core::{CoreError, SimTime};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid delay {0}: must be finite and non-negative")]
    InvalidDelay(f64),

    #[error("cannot schedule at {at}: clock is already at {now}")]
    InPast { now: SimTime, at: SimTime },

    #[error("cannot advance to {to}: an event is pending at {next}")]
    WouldSkip { next: SimTime, to: SimTime },

    #[error("calendar has no working hours")]
    NoWorkingHours,

    #[error("schedule parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
