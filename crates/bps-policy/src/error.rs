use bps_core::ActivityId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("no eligible resource for {0}")]
    NoEligibleResource(ActivityId),

    #[error("no duration samples for {0}")]
    NoSamples(ActivityId),

    #[error("invalid policy parameter: {0}")]
    InvalidParameter(String),

    /// A sampled delay or duration was negative or not finite.
    #[error("policy produced an invalid {what}: {value}")]
    InvalidSample { what: &'static str, value: f64 },
}

pub type PolicyResult<T> = Result<T, PolicyError>;
