//! `haul-io`: survey files in and out.
//!
//! | Module     | Contents                                              |
//! |------------|-------------------------------------------------------|
//! | [`import`] | Seven-column survey CSV → linked `GridGraph`          |
//! | [`worker`] | `spawn_import` background import with events          |
//! | [`export`] | Tab-separated survey export in feet                   |
//! | [`error`]  | `ImportError`, `RowError`, `ExportError`              |

pub mod error;
pub mod export;
pub mod import;
pub mod worker;


pub use error::{ExportError, ExportResult, ImportError, ImportResult, RowError};
pub use export::{export_survey, write_survey};
pub use import::{ImportOptions, load_survey_csv, load_survey_reader, load_survey_with_progress};
pub use worker::{ImportEvent, ImportHandle, spawn_import};
