//! `bps-sim` — discrete-event engine for the rust_bps process simulator.
//!
//! # Event loop
//!
//! ```text
//! loop:
//!   pop the earliest event (FIFO among equal instants); clock jumps to it
//!   Arrival            → spawn case, queue its Start, sample next arrival
//!   Resume(Start)      → AWAITING_DECISION
//!   Resume(Decided)    → AWAITING_CALENDAR, or COMPLETED on the end sentinel
//!   Resume(CalendarOpen) → AWAITING_RESOURCE (acquire or queue)
//!   Resume(SlotGranted)  → EXECUTING for a sampled duration
//!   Resume(ExecutionDone) → log entry, release slot, AWAITING_DECISION
//! ```
//!
//! `AWAITING_DECISION` is answered by the policies in autonomous mode
//! ([`Sim::simulate`]) or by a driver in controlled mode
//! ([`Sim::run_until_decision`] / [`Sim::apply_decision`]).
//!
//! # Cargo features
//!
//! | Feature    | Effect                                              |
//! |------------|-----------------------------------------------------|
//! | `parallel` | [`replicate`] runs replications on Rayon's pool.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use bps_policy::{FixedArrivals, FixedDurations, PolicySet, ProbabilisticRouting, SkillBasedAllocation};
//! use bps_sim::{NoopObserver, SimBuilder};
//!
//! let policies = PolicySet::new(
//!     FixedArrivals::evenly_spaced(10, 2.0),
//!     ProbabilisticRouting::sequence(&[a, b]),
//!     SkillBasedAllocation::new(&resources),
//!     FixedDurations::new().with(a, 5.0).with(b, 3.0),
//! );
//! let mut sim = SimBuilder::new(config, resources, policies).build()?;
//! let log = sim.simulate(None, &mut NoopObserver)?;
//! ```

pub mod bridge;
pub mod builder;
pub mod error;
pub mod observer;
pub mod pool;
pub mod replicate;
pub mod sim;
pub mod state;
pub mod termination;

#[cfg(test)]
mod tests;

pub use bridge::{Decision, DecisionBridge, DecisionMode};
pub use builder::SimBuilder;
pub use error::{ProtocolViolation, SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use pool::{Acquire, ResourcePool, Slot};
pub use replicate::{replicate, Replication};
pub use sim::Sim;
pub use state::{CasePhase, EngineState, ResourceState};
pub use termination::Termination;
