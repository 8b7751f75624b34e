//! Processing-time strategies.

use std::collections::HashMap;
use std::fmt;

use bps_core::{ActivityId, ResourceId, SimRng};
use rand_distr::{Distribution, Normal};

use crate::{PolicyError, PolicyResult, ProcessingTimePolicy};

// ── FixedDurations ────────────────────────────────────────────────────────────

/// A constant duration per activity.  Activities without an entry take zero
/// time.
#[derive(Clone, Debug, Default)]
pub struct FixedDurations {
    by_activity: HashMap<ActivityId, f64>,
}

impl FixedDurations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, activity: ActivityId, duration: f64) -> Self {
        self.by_activity.insert(activity, duration);
        self
    }
}

impl ProcessingTimePolicy for FixedDurations {
    fn duration(&self, activity: ActivityId, _resource: ResourceId, _rng: &mut SimRng) -> PolicyResult<f64> {
        Ok(self.by_activity.get(&activity).copied().unwrap_or(0.0))
    }
}

// ── EmpiricalDurations ────────────────────────────────────────────────────────

/// Draws uniformly from observed durations of the same activity.
#[derive(Clone, Debug, Default)]
pub struct EmpiricalDurations {
    samples: HashMap<ActivityId, Vec<f64>>,
}

impl EmpiricalDurations {
    pub fn new(samples: HashMap<ActivityId, Vec<f64>>) -> Self {
        Self { samples }
    }
}

impl ProcessingTimePolicy for EmpiricalDurations {
    fn duration(&self, activity: ActivityId, _resource: ResourceId, rng: &mut SimRng) -> PolicyResult<f64> {
        self.samples
            .get(&activity)
            .and_then(|s| rng.choose(s))
            .copied()
            .ok_or(PolicyError::NoSamples(activity))
    }
}

impl fmt::Display for EmpiricalDurations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "EmpiricalDurations")?;
        let mut ids: Vec<&ActivityId> = self.samples.keys().collect();
        ids.sort();
        for id in ids {
            let s = &self.samples[id];
            if s.is_empty() {
                writeln!(f, "  {}: n=0", id.0)?;
                continue;
            }
            let mean = s.iter().sum::<f64>() / s.len() as f64;
            let min = s.iter().copied().fold(f64::INFINITY, f64::min);
            let max = s.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            writeln!(f, "  {}: n={}, mean={mean:.2}, min={min:.2}, max={max:.2}", id.0, s.len())?;
        }
        Ok(())
    }
}

// ── NormalDurations ───────────────────────────────────────────────────────────

/// Normally distributed durations, clamped at zero.
///
/// Activities without parameters take zero time.
#[derive(Clone, Debug, Default)]
pub struct NormalDurations {
    by_activity: HashMap<ActivityId, Normal<f64>>,
}

impl NormalDurations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `(mean, std_dev)` for `activity`.
    pub fn with(mut self, activity: ActivityId, mean: f64, std_dev: f64) -> PolicyResult<Self> {
        if !(mean.is_finite() && std_dev.is_finite() && std_dev >= 0.0) {
            return Err(PolicyError::InvalidParameter(format!(
                "normal duration for {activity} needs finite mean and std_dev >= 0"
            )));
        }
        let dist = Normal::new(mean, std_dev)
            .map_err(|e| PolicyError::InvalidParameter(format!("normal duration for {activity}: {e}")))?;
        self.by_activity.insert(activity, dist);
        Ok(self)
    }
}

impl ProcessingTimePolicy for NormalDurations {
    fn duration(&self, activity: ActivityId, _resource: ResourceId, rng: &mut SimRng) -> PolicyResult<f64> {
        let Some(dist) = self.by_activity.get(&activity) else {
            return Ok(0.0);
        };
        Ok(dist.sample(rng.inner()).max(0.0))
    }
}
