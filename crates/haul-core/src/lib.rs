//! `haul-core`: foundational types for the haul analyzer workspace.
//!
//! This crate is a dependency of every other `haul-*` crate.  It has no
//! `haul-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `EntryId`, `RegionId`                                 |
//! | [`geo`]         | `GeoPoint`, `PlanarPoint`, `Dms`                      |
//! | [`utm`]         | `UtmZone`, `UtmCoord`, forward/inverse projection     |
//! | [`units`]       | Feet / cubic-yard conversion constants                |
//! | [`rng`]         | `PlannerRng` (seedable, single-threaded)              |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod units;
pub mod utm;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{Dms, GeoPoint, PlanarPoint};
pub use ids::{EntryId, RegionId};
pub use rng::PlannerRng;
pub use utm::{UtmCoord, UtmZone, geo_to_utm, utm_to_geo};
