//! Simulation time model.
//!
//! # Design
//!
//! Virtual time is a non-negative, finite `f64` offset from the start of the
//! run, measured in the configured [`TimeUnit`].  The mapping to wall-clock
//! time is held in `SimClock`:
//!
//!   unix_secs = start_unix_secs + t * unit_secs
//!
//! Sampled durations come from continuous distributions, so time is not
//! quantised to ticks.  `SimTime` is totally ordered (NaN and negative values
//! are rejected at construction) which lets it key a `BTreeMap` directly.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute point on the virtual timeline.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    /// Validate `t` as a point in virtual time.
    ///
    /// `-0.0` is normalised to `0.0` so equality agrees with ordering.
    pub fn new(t: f64) -> CoreResult<SimTime> {
        if t.is_finite() && t >= 0.0 {
            Ok(SimTime(t + 0.0))
        } else {
            Err(CoreError::InvalidTime(t))
        }
    }

    /// Raw offset from the start of the run.
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    /// The instant `delay` units after `self`.
    ///
    /// Rejects negative and non-finite delays instead of clamping them.
    pub fn after(self, delay: f64) -> CoreResult<SimTime> {
        if !delay.is_finite() || delay < 0.0 {
            return Err(CoreError::InvalidTime(delay));
        }
        SimTime::new(self.0 + delay)
    }

    /// Units elapsed from `earlier` to `self` (negative if `earlier` is later).
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}

// ── TimeUnit ──────────────────────────────────────────────────────────────────

/// The wall-clock length of one unit of virtual time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TimeUnit {
    #[default]
    Seconds,
    Minutes,
    Hours,
}

impl TimeUnit {
    /// Seconds per unit.
    #[inline]
    pub fn secs(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Hours => 3_600.0,
        }
    }

    /// Convert a span of wall-clock seconds into units.
    #[inline]
    pub fn from_secs(self, secs: f64) -> f64 {
        secs / self.secs()
    }
}

impl FromStr for TimeUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(TimeUnit::Seconds),
            "m" | "min" | "mins" | "minute" | "minutes" => Ok(TimeUnit::Minutes),
            "h" | "hour" | "hours" => Ok(TimeUnit::Hours),
            other => Err(CoreError::Parse(format!(
                "unknown time unit {other:?}: expected seconds, minutes or hours"
            ))),
        }
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The engine's virtual clock.  Converts between virtual time and Unix
/// wall-clock seconds.
///
/// `SimClock` is cheap to copy and holds no heap data.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Unix timestamp (seconds since epoch) of virtual time zero.
    pub start_unix_secs: i64,
    /// Length of one unit of virtual time.
    pub time_unit: TimeUnit,
    now: SimTime,
}

impl SimClock {
    /// Create a clock at virtual time zero.
    pub fn new(start_unix_secs: i64, time_unit: TimeUnit) -> Self {
        Self {
            start_unix_secs,
            time_unit,
            now: SimTime::ZERO,
        }
    }

    /// The current virtual time.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Jump forward to `t`.  Moving backwards is an error; staying put is not.
    pub fn advance_to(&mut self, t: SimTime) -> CoreResult<()> {
        if t < self.now {
            return Err(CoreError::ClockRegression { now: self.now, to: t });
        }
        self.now = t;
        Ok(())
    }

    /// Rewind to virtual time zero (used by engine reset only).
    pub fn reset(&mut self) {
        self.now = SimTime::ZERO;
    }

    /// Unix timestamp, in fractional seconds, of virtual time `t`.
    #[inline]
    pub fn to_unix_secs(&self, t: SimTime) -> f64 {
        self.start_unix_secs as f64 + t.get() * self.time_unit.secs()
    }

    /// Unix timestamp in whole milliseconds, for datetime formatting.
    #[inline]
    pub fn to_unix_millis(&self, t: SimTime) -> i64 {
        (self.to_unix_secs(t) * 1_000.0).round() as i64
    }

    /// Virtual time corresponding to Unix timestamp `secs`.
    ///
    /// Instants before the epoch clamp to zero.
    pub fn from_unix_secs(&self, secs: f64) -> SimTime {
        let units = self.time_unit.from_secs(secs - self.start_unix_secs as f64);
        SimTime::new(units).unwrap_or(SimTime::ZERO)
    }

    /// Break elapsed time into (day, hour, minute) components from sim start.
    /// Useful for human-readable logging without a datetime library.
    pub fn elapsed_dhm(&self) -> (u64, u32, u32) {
        let total_secs = (self.now.get() * self.time_unit.secs()).max(0.0) as u64;
        let days = total_secs / 86_400;
        let hours = ((total_secs % 86_400) / 3_600) as u32;
        let minutes = ((total_secs % 3_600) / 60) as u32;
        (days, hours, minutes)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (d, h, m) = self.elapsed_dhm();
        write!(f, "{} (day {} {:02}:{:02})", self.now, d, h, m)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically loaded from a JSON file by the application crate and passed
/// to the simulation builder.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Unix timestamp for virtual time zero (typically the first event of the
    /// source log).
    pub start_unix_secs: i64,

    /// Length of one unit of virtual time.
    #[cfg_attr(feature = "serde", serde(default))]
    pub time_unit: TimeUnit,

    /// Master RNG seed.  The same seed (and the same sequence of external
    /// decisions) always produces identical results.
    pub seed: u64,

    /// Stop generating arrivals after this many cases.  `None` runs until the
    /// arrival policy is exhausted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_cases: Option<u64>,
}

impl SimConfig {
    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.start_unix_secs, self.time_unit)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_unix_secs: 0,
            time_unit:       TimeUnit::Seconds,
            seed:            0,
            max_cases:       None,
        }
    }
}
