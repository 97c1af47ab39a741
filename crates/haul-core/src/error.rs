//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]` where they can surface it.

use thiserror::Error;

/// Errors produced by `haul-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// A UTM zone label that is not `<1..=60><band letter>`.
    #[error("malformed UTM zone label {0:?}")]
    MalformedZone(String),
}

/// Shorthand result type for `haul-core`.
pub type CoreResult<T> = Result<T, CoreError>;
