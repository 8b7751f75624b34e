//! Independent replications of one model under different seeds.

use bps_core::{Case, EventLogEntry};

use crate::{NoopObserver, Sim, SimResult};

/// Output of one autonomous replication.
#[derive(Clone, Debug)]
pub struct Replication {
    pub seed:      u64,
    pub event_log: Vec<EventLogEntry>,
    /// Completed cases, in completion order.
    pub cases:     Vec<Case>,
}

impl Replication {
    /// Mean cycle time over completed cases, if any completed.
    pub fn mean_cycle_time(&self) -> Option<f64> {
        let times: Vec<f64> = self.cases.iter().filter_map(Case::cycle_time).collect();
        if times.is_empty() {
            return None;
        }
        Some(times.iter().sum::<f64>() / times.len() as f64)
    }
}

/// Build one `Sim` per seed with `factory` and run each to completion.
///
/// Results come back in `seeds` order.  With the `parallel` feature the
/// replications run on Rayon's thread pool; each owns its own `Sim`, so
/// nothing is shared.
pub fn replicate<F>(seeds: &[u64], factory: F) -> SimResult<Vec<Replication>>
where
    F: Fn(u64) -> SimResult<Sim> + Sync,
{
    #[cfg(not(feature = "parallel"))]
    {
        seeds.iter().map(|&seed| run_one(seed, &factory)).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        seeds.par_iter().map(|&seed| run_one(seed, &factory)).collect()
    }
}

fn run_one<F>(seed: u64, factory: &F) -> SimResult<Replication>
where
    F: Fn(u64) -> SimResult<Sim>,
{
    let mut sim = factory(seed)?;
    let event_log = sim.simulate(None, &mut NoopObserver)?.to_vec();
    let cases = sim.completed_cases().cloned().collect();
    Ok(Replication { seed, event_log, cases })
}
