//! purchasing — a procure-to-pay process simulated with rust_bps.
//!
//! Runs one model three ways:
//!
//! 1. autonomously, with the reference policies answering every decision and
//!    the event log streamed to CSV;
//! 2. in controlled mode over the same seed, with a greedy driver standing in
//!    for an external agent;
//! 3. as independent replications over the configured seeds.
//!
//! ```text
//! RUST_LOG=debug cargo run -p purchasing -- [path/to/config.json]
//! ```

mod config;
mod driver;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bps_core::{ActivityRegistry, Resource, ResourceId};
use bps_output::{CsvWriter, SimOutputObserver, export_csv};
use bps_schedule::{CalendarSet, load_calendars_csv, load_resources_csv};
use bps_sim::{NoopObserver, Sim, SimBuilder, SimResult, replicate};

use config::DemoConfig;
use driver::GreedyDriver;

// ── Model ─────────────────────────────────────────────────────────────────────

/// Everything needed to build a fresh `Sim` for any seed.
struct Model {
    config:     DemoConfig,
    activities: ActivityRegistry,
    resources:  Vec<Resource>,
    calendars:  CalendarSet,
}

impl Model {
    fn load(path: &Path) -> Result<Self> {
        let config = DemoConfig::load(path)?;

        // Intern in config order so activity ids follow the model description.
        let mut activities = ActivityRegistry::new();
        for spec in &config.activities {
            activities.intern(&spec.name)?;
        }
        let resources = load_resources_csv(&config.resources_csv, &mut activities)
            .with_context(|| format!("loading {}", config.resources_csv.display()))?;
        let calendars = load_calendars_csv(&config.calendar_csv)
            .with_context(|| format!("loading {}", config.calendar_csv.display()))?;

        Ok(Self { config, activities, resources, calendars })
    }

    fn build(&self, seed: u64) -> SimResult<Sim> {
        let mut sim_config = self.config.sim.clone();
        sim_config.seed = seed;
        let policies = self.config.policies(&self.activities, &self.resources)?;
        SimBuilder::new(sim_config, self.resources.clone(), policies)
            .calendars(self.calendars.clone())
            .activities(self.activities.clone())
            .build()
    }
}

// ── Reporting ─────────────────────────────────────────────────────────────────

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn print_summary(sim: &Sim) {
    let mean_cycle = mean(sim.completed_cases().filter_map(|c| c.cycle_time()));
    println!(
        "  cases completed : {}  |  log entries : {}  |  ended at t = {}",
        sim.completed_cases().count(),
        sim.event_log().len(),
        sim.now(),
    );
    if let Some(m) = mean_cycle {
        println!("  mean cycle time : {m:.2} {:?}", sim.config.time_unit);
    }

    let mut busy: HashMap<ResourceId, f64> = HashMap::new();
    for entry in sim.event_log() {
        *busy.entry(entry.resource).or_default() += entry.duration();
    }
    println!("  {:<16} {:>5} {:>10}", "Resource", "Cap", "Busy");
    println!("  {}", "-".repeat(33));
    for r in sim.resources() {
        println!(
            "  {:<16} {:>5} {:>10.2}",
            r.name,
            r.capacity,
            busy.get(&r.id).copied().unwrap_or(0.0),
        );
    }
    println!();
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("data/config.json"));
    let model = Model::load(&config_path)?;
    let out = &model.config.output_dir;

    println!("=== purchasing — rust_bps process simulation ===");
    println!(
        "Activities: {}  |  Resources: {}  |  Seed: {}  |  Cases: {:?}",
        model.activities.len(),
        model.resources.len(),
        model.config.sim.seed,
        model.config.sim.max_cases,
    );
    println!();

    // 1. Autonomous run, streamed to CSV.
    let mut sim = model.build(model.config.sim.seed)?;
    let auto_dir = out.join("autonomous");
    std::fs::create_dir_all(&auto_dir)?;
    let mut obs = SimOutputObserver::new(CsvWriter::new(&auto_dir)?, &sim);

    let t0 = Instant::now();
    sim.simulate(None, &mut obs)?;
    if let Some(e) = obs.take_error() {
        warn!(error = %e, "autonomous output incomplete");
    }
    println!("Autonomous run ({:.3} s) → {}", t0.elapsed().as_secs_f64(), auto_dir.display());
    print_summary(&sim);

    // 2. Controlled run over the same seed, exported in one shot.
    sim.reset();
    let driver = GreedyDriver::new(model.config.routing(&model.activities)?, &model.resources);
    let t0 = Instant::now();
    let decisions = driver.run(&mut sim, &mut NoopObserver)?;

    let ctrl_dir = out.join("controlled");
    std::fs::create_dir_all(&ctrl_dir)?;
    export_csv(&ctrl_dir, &sim)?;
    println!(
        "Controlled run ({:.3} s, {decisions} decisions) → {}",
        t0.elapsed().as_secs_f64(),
        ctrl_dir.display(),
    );
    print_summary(&sim);

    // 3. Independent replications.
    let seeds = &model.config.replication_seeds;
    if !seeds.is_empty() {
        let t0 = Instant::now();
        let reps = replicate(seeds, |seed| model.build(seed))?;
        info!(count = reps.len(), elapsed_s = t0.elapsed().as_secs_f64(), "replications finished");

        println!("{:<8} {:>8} {:>12}", "Seed", "Cases", "Mean cycle");
        println!("{}", "-".repeat(30));
        for rep in &reps {
            println!(
                "{:<8} {:>8} {:>12}",
                rep.seed,
                rep.cases.len(),
                rep.mean_cycle_time().map_or_else(|| "-".to_owned(), |m| format!("{m:.2}")),
            );
        }
    }

    Ok(())
}
