//! `bps-policy` — the decision-making collaborators of the simulator.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                          |
//! |----------------|-------------------------------------------------------------------|
//! | [`model`]      | `ArrivalPolicy`, `RoutingPolicy`, `ResourcePolicy`, `ProcessingTimePolicy` |
//! | [`set`]        | `PolicySet` — the four policies bundled for the engine            |
//! | [`arrival`]    | `FixedArrivals`, `EmpiricalArrivals`, `ExponentialArrivals`       |
//! | [`routing`]    | `ProbabilisticRouting`                                            |
//! | [`allocation`] | `SkillBasedAllocation`, `FixedAllocation`                         |
//! | [`duration`]   | `FixedDurations`, `EmpiricalDurations`, `NormalDurations`         |
//! | [`error`]      | `PolicyError`, `PolicyResult<T>`                                  |
//!
//! # Design notes
//!
//! Every policy call receives the engine's `&mut SimRng`.  Policies hold no
//! hidden randomness of their own, so a run is reproducible from its seed.
//!
//! Only `ArrivalPolicy` takes `&mut self`: an arrival source may replay a
//! finite trace and needs a cursor.  The other policies are pure functions of
//! their inputs and the RNG.

pub mod allocation;
pub mod arrival;
pub mod duration;
pub mod error;
pub mod model;
pub mod routing;
pub mod set;


pub use allocation::{FixedAllocation, SkillBasedAllocation};
pub use arrival::{EmpiricalArrivals, ExponentialArrivals, FixedArrivals};
pub use duration::{EmpiricalDurations, FixedDurations, NormalDurations};
pub use error::{PolicyError, PolicyResult};
pub use model::{ArrivalPolicy, ProcessingTimePolicy, ResourcePolicy, RoutingPolicy};
pub use routing::ProbabilisticRouting;
pub use set::PolicySet;
