//! `haul-planner`: stochastic haul-route planning over a survey grid.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`config`]   | `PlannerConfig`, `ScraperConfig`, `ScoreWeights`, `Step`   |
//! | [`route`]    | `RouteCandidate`, `HaulRoute`, candidate selection         |
//! | [`plan`]     | `RoutePlanner` (synchronous engine), `PlanOutcome`         |
//! | [`observer`] | `PlanObserver` trait, `NoopObserver`                       |
//! | [`worker`]   | `HaulPlanner` background handle, `PlannerEvent`            |
//! | [`error`]    | `PlannerError`, `PlannerResult<T>`                         |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Scores candidate batches on Rayon's thread pool.       |
//! | `serde`    | Derives `Serialize`/`Deserialize` on config and routes.|
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use std::sync::atomic::AtomicBool;
//! use haul_planner::{NoopObserver, PlannerConfig, RoutePlanner};
//!
//! let config = PlannerConfig { seed: Some(7), ..PlannerConfig::default() };
//! let mut planner = RoutePlanner::new(grid.clone(), regions, config)?;
//! let summary = planner.run(&mut NoopObserver, &AtomicBool::new(false))?;
//! ```

pub mod config;
pub mod error;
pub mod observer;
pub mod plan;
pub mod route;
pub mod worker;

#[cfg(test)]
mod tests;

pub use config::{PlannerConfig, ScoreInputs, ScoreWeights, ScraperConfig, Step};
pub use error::{PlannerError, PlannerResult};
pub use observer::{NoopObserver, PlanObserver};
pub use plan::{PlanOutcome, PlanSummary, RoutePlanner};
pub use route::{HaulRoute, RouteCandidate, best_candidate};
pub use worker::{FinishedPlan, HaulPlanner, PlannerEvent, PlannerState, Progress, StopOutcome};
