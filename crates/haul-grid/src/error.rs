//! Grid-subsystem error type.

use thiserror::Error;

use haul_core::EntryId;

/// Errors produced by `haul-grid`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("grid spacing must be a positive finite length, got {0} m")]
    InvalidGridSpacing(f64),

    #[error("region {name:?} has {vertices} vertices; at least 3 are required")]
    DegenerateRegion { name: String, vertices: usize },

    #[error("entry {0} not found in grid")]
    EntryNotFound(EntryId),

    #[error("dataset has no master benchmark")]
    MissingMasterBenchmark,
}

pub type GridResult<T> = Result<T, GridError>;
