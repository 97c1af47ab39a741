use thiserror::Error;

use haul_grid::GridError;

/// Why a single survey record could not be read.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RowError {
    #[error("expected 7 fields, found {0}")]
    FieldCount(usize),

    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field}: {value:?} is not a number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },

    #[error("second master benchmark (0MB) row")]
    DuplicateMasterBenchmark,
}

#[derive(Debug, Error)]
pub enum ImportError {
    /// The file as a whole does not follow the survey layout.
    #[error("survey schema error: {0}")]
    Schema(String),

    #[error("survey line {line}: {source}")]
    Row { line: u64, source: RowError },

    #[error("survey grid error: {0}")]
    Grid(#[from] GridError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type ImportResult<T> = Result<T, ImportError>;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;
