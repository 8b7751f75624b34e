//! `bps-core` — foundational types for the `rust_bps` business process simulator.
//!
//! This crate is a dependency of every other `bps-*` crate.  It has no
//! `bps-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `CaseId`, `ResourceId`, `ActivityId`                  |
//! | [`activity`]    | `ActivityRegistry` (id ↔ display name)                |
//! | [`time`]        | `SimTime`, `TimeUnit`, `SimClock`, `SimConfig`        |
//! | [`rng`]         | `SimRng` (seeded, deterministic)                      |
//! | [`case`]        | `Case` lifecycle record                               |
//! | [`resource`]    | `Resource` (skills + capacity)                        |
//! | [`event_log`]   | `EventLogEntry`                                       |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod activity;
pub mod case;
pub mod error;
pub mod event_log;
pub mod ids;
pub mod resource;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use activity::ActivityRegistry;
pub use case::Case;
pub use error::{CoreError, CoreResult};
pub use event_log::EventLogEntry;
pub use ids::{ActivityId, CaseId, ResourceId};
pub use resource::Resource;
pub use rng::SimRng;
pub use time::{SimClock, SimConfig, SimTime, TimeUnit};
