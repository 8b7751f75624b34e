//! JSON model description for the purchasing demo.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use bps_core::{ActivityId, ActivityRegistry, Resource, SimConfig};
use bps_policy::{
    ExponentialArrivals, NormalDurations, PolicyError, PolicyResult, PolicySet,
    ProbabilisticRouting, SkillBasedAllocation,
};

#[derive(Debug, Deserialize)]
pub struct DemoConfig {
    pub sim:               SimConfig,
    /// Relative to the config file.
    pub resources_csv:     PathBuf,
    /// Relative to the config file.
    pub calendar_csv:      PathBuf,
    /// Relative to the working directory.
    pub output_dir:        PathBuf,
    /// Mean arrivals per time unit.
    pub arrival_rate:      f64,
    #[serde(default)]
    pub replication_seeds: Vec<u64>,
    pub activities:        Vec<ActivitySpec>,
    pub routing:           Vec<TransitionSpec>,
}

/// Processing time of one activity, normally distributed.
#[derive(Debug, Deserialize)]
pub struct ActivitySpec {
    pub name:    String,
    pub mean:    f64,
    pub std_dev: f64,
}

/// One weighted routing edge; `null` is the start (as `from`) or the end (as `to`).
#[derive(Debug, Deserialize)]
pub struct TransitionSpec {
    pub from:   Option<String>,
    pub to:     Option<String>,
    pub weight: f64,
}

impl DemoConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: DemoConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;

        let base = path.parent().unwrap_or(Path::new("."));
        config.resources_csv = base.join(&config.resources_csv);
        config.calendar_csv = base.join(&config.calendar_csv);
        Ok(config)
    }

    pub fn routing(&self, activities: &ActivityRegistry) -> PolicyResult<ProbabilisticRouting> {
        let mut routing = ProbabilisticRouting::new();
        for edge in &self.routing {
            routing.add_transition(
                lookup(activities, edge.from.as_deref())?,
                lookup(activities, edge.to.as_deref())?,
                edge.weight,
            );
        }
        Ok(routing)
    }

    /// Fresh policies for one run: exponential arrivals, the routing table,
    /// skill-based allocation, and normal processing times.
    pub fn policies(
        &self,
        activities: &ActivityRegistry,
        resources:  &[Resource],
    ) -> PolicyResult<PolicySet> {
        let mut durations = NormalDurations::new();
        for spec in &self.activities {
            let id = activities.id(&spec.name).ok_or_else(|| unknown(&spec.name))?;
            durations = durations.with(id, spec.mean, spec.std_dev)?;
        }

        Ok(PolicySet::new(
            ExponentialArrivals::new(self.arrival_rate)?,
            self.routing(activities)?,
            SkillBasedAllocation::new(resources),
            durations,
        ))
    }
}

fn lookup(activities: &ActivityRegistry, name: Option<&str>) -> PolicyResult<Option<ActivityId>> {
    name.map(|n| activities.id(n).ok_or_else(|| unknown(n)))
        .transpose()
}

fn unknown(name: &str) -> PolicyError {
    PolicyError::InvalidParameter(format!("unknown activity {name:?}"))
}
