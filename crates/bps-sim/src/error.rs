use bps_core::{CoreError, ResourceId, SimTime};
use bps_policy::PolicyError;
use bps_schedule::ScheduleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    /// A driver call that was refused; engine state is unchanged.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// Internal bookkeeping disagreed with the case state machine.
    #[error("engine invariant broken: {0}")]
    Invariant(String),
}

/// Misuse of the driver protocol.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolViolation {
    #[error("no decision is pending")]
    NoPendingDecision,

    #[error("unknown {0}")]
    UnknownResource(ResourceId),

    #[error("invalid target time {0}")]
    InvalidTime(f64),

    #[error("cannot run back to {to}: clock is already at {now}")]
    TimeInPast { now: SimTime, to: SimTime },
}

pub type SimResult<T> = Result<T, SimError>;
