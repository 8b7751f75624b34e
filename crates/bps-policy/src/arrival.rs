//! Arrival sources.

use std::fmt;

use bps_core::SimRng;
use rand_distr::{Distribution, Exp};

use crate::{ArrivalPolicy, PolicyError, PolicyResult};

// ── FixedArrivals ─────────────────────────────────────────────────────────────

/// Replays a finite list of inter-arrival delays, then reports exhaustion.
///
/// `FixedArrivals::new(vec![0.0, 1.0])` produces cases at t=0 and t=1.
#[derive(Clone, Debug)]
pub struct FixedArrivals {
    delays: Vec<f64>,
    next:   usize,
}

impl FixedArrivals {
    pub fn new(delays: Vec<f64>) -> Self {
        Self { delays, next: 0 }
    }

    /// `count` arrivals spaced `every` units apart, the first at t=0.
    pub fn evenly_spaced(count: usize, every: f64) -> Self {
        let delays = (0..count).map(|i| if i == 0 { 0.0 } else { every }).collect();
        Self::new(delays)
    }
}

impl ArrivalPolicy for FixedArrivals {
    fn next_inter_arrival(&mut self, _rng: &mut SimRng) -> Option<f64> {
        let delay = self.delays.get(self.next).copied()?;
        self.next += 1;
        Some(delay)
    }

    fn reset(&mut self) {
        self.next = 0;
    }
}

// ── EmpiricalArrivals ─────────────────────────────────────────────────────────

/// Draws inter-arrival delays uniformly from observed samples.  Never exhausts.
#[derive(Clone, Debug)]
pub struct EmpiricalArrivals {
    samples: Vec<f64>,
}

impl EmpiricalArrivals {
    pub fn new(samples: Vec<f64>) -> PolicyResult<Self> {
        if samples.is_empty() {
            return Err(PolicyError::InvalidParameter(
                "empirical arrivals need at least one sample".into(),
            ));
        }
        Ok(Self { samples })
    }
}

impl ArrivalPolicy for EmpiricalArrivals {
    fn next_inter_arrival(&mut self, rng: &mut SimRng) -> Option<f64> {
        rng.choose(&self.samples).copied()
    }
}

impl fmt::Display for EmpiricalArrivals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mean = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
        write!(f, "EmpiricalArrivals(samples={}, mean={mean:.2})", self.samples.len())
    }
}

// ── ExponentialArrivals ───────────────────────────────────────────────────────

/// Poisson arrival process: exponentially distributed gaps with rate `λ`.
#[derive(Clone, Debug)]
pub struct ExponentialArrivals {
    rate: f64,
    dist: Exp<f64>,
}

impl ExponentialArrivals {
    pub fn new(rate: f64) -> PolicyResult<Self> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(PolicyError::InvalidParameter(format!(
                "exponential arrival rate must be positive, got {rate}"
            )));
        }
        let dist = Exp::new(rate)
            .map_err(|e| PolicyError::InvalidParameter(format!("exponential arrival rate {rate}: {e}")))?;
        Ok(Self { rate, dist })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl ArrivalPolicy for ExponentialArrivals {
    fn next_inter_arrival(&mut self, rng: &mut SimRng) -> Option<f64> {
        Some(self.dist.sample(rng.inner()))
    }
}

impl fmt::Display for ExponentialArrivals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExponentialArrivals(lambda={:.4})", self.rate)
    }
}
