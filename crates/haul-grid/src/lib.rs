//! `haul-grid`: the survey grid graph and everything that edits it.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`entry`]   | `Entry`, `EntryCode`, `Direction`, `Neighbors`              |
//! | [`graph`]   | `GridGraph` (arena + R-tree), `GridGraphBuilder`            |
//! | [`polygon`] | `point_in_polygon`, `Extents`                               |
//! | [`region`]  | `Region`, `RegionSet`                                       |
//! | [`cutfill`] | `Footprint`, cut/fill passes, `HeightChange`                |
//! | [`band`]    | `CutFillBand` and the band histogram                        |
//! | [`error`]   | `GridError`, `GridResult<T>`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod band;
pub mod cutfill;
pub mod entry;
pub mod error;
pub mod graph;
pub mod polygon;
pub mod region;


pub use band::CutFillBand;
pub use cutfill::{Footprint, HeightChange, PassReport, cut_height, fill_height};
pub use entry::{Direction, Elevations, Entry, EntryCode, Neighbors};
pub use error::{GridError, GridResult};
pub use graph::{GridGraph, GridGraphBuilder};
pub use polygon::{Extents, point_in_polygon};
pub use region::{Region, RegionSet};
