//! Probabilistic routing over an activity transition table.
//!
//! The table maps the last completed activity (`None` = case start) to
//! weighted successors.  A successor of `None` is the end of the case.
//!
//! ```text
//! START -> A (1.0)
//! A     -> B (0.8), END (0.2)
//! B     -> END (1.0)
//! ```
//!
//! A missing or empty row also ends the case.

use std::collections::HashMap;
use std::fmt;

use bps_core::{ActivityId, Case, SimRng};

use crate::RoutingPolicy;

/// First-order Markov routing.
#[derive(Clone, Debug, Default)]
pub struct ProbabilisticRouting {
    table: HashMap<Option<ActivityId>, Vec<(Option<ActivityId>, f64)>>,
}

impl ProbabilisticRouting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a weighted edge `from → to`.  Weights need not sum to one.
    pub fn with_transition(
        mut self,
        from:   Option<ActivityId>,
        to:     Option<ActivityId>,
        weight: f64,
    ) -> Self {
        self.add_transition(from, to, weight);
        self
    }

    pub fn add_transition(&mut self, from: Option<ActivityId>, to: Option<ActivityId>, weight: f64) {
        self.table.entry(from).or_default().push((to, weight));
    }

    /// A deterministic chain `start → seq[0] → seq[1] → … → end`.
    pub fn sequence(seq: &[ActivityId]) -> Self {
        let mut routing = Self::new();
        let mut prev = None;
        for &activity in seq {
            routing.add_transition(prev, Some(activity), 1.0);
            prev = Some(activity);
        }
        routing.add_transition(prev, None, 1.0);
        routing
    }

    /// Successors of `from`, with their raw weights.
    pub fn successors(&self, from: Option<ActivityId>) -> &[(Option<ActivityId>, f64)] {
        self.table.get(&from).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl RoutingPolicy for ProbabilisticRouting {
    fn next_activity(
        &self,
        _case: &Case,
        last:  Option<ActivityId>,
        rng:   &mut SimRng,
    ) -> Option<ActivityId> {
        let row = self.successors(last);
        if row.is_empty() {
            return None;
        }
        let weights: Vec<f64> = row.iter().map(|(_, w)| *w).collect();
        let idx = rng.weighted_index(&weights)?;
        row[idx].0
    }
}

impl fmt::Display for ProbabilisticRouting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = |a: &Option<ActivityId>| match a {
            Some(id) => id.0.to_string(),
            None => "END".to_owned(),
        };
        writeln!(f, "ProbabilisticRouting:")?;
        let mut sources: Vec<&Option<ActivityId>> = self.table.keys().collect();
        sources.sort();
        for src in sources {
            let src_label = if src.is_none() { "START".to_owned() } else { label(src) };
            let rhs: Vec<String> = self.table[src]
                .iter()
                .map(|(to, w)| format!("{} ({w:.2})", label(to)))
                .collect();
            writeln!(f, "  {src_label} -> {}", rhs.join(", "))?;
        }
        Ok(())
    }
}
