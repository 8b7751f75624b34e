//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::SimTime;

/// The top-level error type for `bps-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid simulation time {0}: must be finite and non-negative")]
    InvalidTime(f64),

    #[error("clock cannot move backwards from {now} to {to}")]
    ClockRegression { now: SimTime, to: SimTime },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `bps-core`.
pub type CoreResult<T> = Result<T, CoreError>;
