//! Survey CSV importer.
//!
//! # CSV format
//!
//! Comma separated, one header row, exactly seven columns:
//!
//! ```csv
//! lat,lon,existing_m,proposed_m,cut_fill_m,code,comment
//! 30.6954,-88.0399,12.40,12.40,0.0,0MB,master
//! 30.6955,-88.0399,12.10,12.10,0.0,0BM1,
//! 30.6957,-88.0398,,,,2PER,fence corner
//! 30.6956,-88.0398,12.32,12.05,-0.27,3GRD,
//! ```
//!
//! | Code          | Becomes                | Elevations                       |
//! |---------------|------------------------|----------------------------------|
//! | `3GRD`        | grid point             | proposed required                |
//! | `2PER`        | boundary vertex        | optional (blank → 0)             |
//! | `0MB`         | master benchmark       | optional; at most one row        |
//! | `0BM…`        | benchmark              | optional                         |
//! | anything else | skipped with a warning |                                  |
//!
//! Blank existing elevation falls back to the proposed one; blank cut/fill
//! height falls back to `proposed − existing`.  Blank lines are skipped.
//! Any bad record fails the whole import; nothing partial is returned.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use haul_core::GeoPoint;
use haul_core::units::feet_to_meters;
use haul_grid::{Elevations, Entry, EntryCode, GridGraph, GridGraphBuilder};

use crate::{ImportError, ImportResult, RowError};

const COLUMNS: usize = 7;

/// Column names for row errors, in file order.
const FIELDS: [&str; COLUMNS] = [
    "latitude",
    "longitude",
    "existing elevation",
    "proposed elevation",
    "cut/fill height",
    "code",
    "comment",
];

// ── Options ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ImportOptions {
    /// Nominal grid spacing of the survey, metres.  Default 5 ft.
    pub grid_spacing_m: f64,
    /// Report progress after this many records.
    pub progress_every: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            grid_spacing_m: feet_to_meters(5.0),
            progress_every: 1_000,
        }
    }
}

// ── CSV record ────────────────────────────────────────────────────────────────

/// Raw fields; blanks are meaningful, so nothing is parsed by serde.
#[derive(Deserialize)]
struct SurveyRecord {
    lat:        String,
    lon:        String,
    existing_m: String,
    proposed_m: String,
    cut_fill_m: String,
    code:       String,
    comment:    String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a survey file into a linked [`GridGraph`].
pub fn load_survey_csv(path: &Path, options: &ImportOptions) -> ImportResult<GridGraph> {
    let file = File::open(path)?;
    load_survey_reader(file, options)
}

/// Like [`load_survey_csv`] but accepts any `Read` source.
pub fn load_survey_reader<R: Read>(reader: R, options: &ImportOptions) -> ImportResult<GridGraph> {
    load_survey_with_progress(reader, options, |_| {})
}

/// The importer proper.
///
/// The whole input is read up front.  `on_progress` receives the share of
/// bytes parsed every `options.progress_every` records, capped at 99, and
/// `100` once the graph is built.
pub fn load_survey_with_progress<R, F>(
    mut reader:      R,
    options:         &ImportOptions,
    mut on_progress: F,
) -> ImportResult<GridGraph>
where
    R: Read,
    F: FnMut(u8),
{
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    let total = input.len() as u64;

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(&input[..]);

    let columns = csv_reader.byte_headers()?.len();
    if columns != COLUMNS {
        return Err(ImportError::Schema(format!(
            "survey must have {COLUMNS} columns, header has {columns}"
        )));
    }

    let mut builder = GridGraphBuilder::new(options.grid_spacing_m);
    let mut raw_record = csv::ByteRecord::new();
    let mut records: usize = 0;
    let mut skipped: usize = 0;
    let every = options.progress_every.max(1);

    while csv_reader.read_byte_record(&mut raw_record)? {
        let line = record_line(&input, &raw_record);
        let byte = raw_record.position().map_or(0, |p| p.byte());
        let row_err = |source| ImportError::Row { line, source };

        if raw_record.len() != COLUMNS {
            return Err(row_err(RowError::FieldCount(raw_record.len())));
        }
        let record = csv::StringRecord::from_byte_record(std::mem::take(&mut raw_record))
            .map_err(|e| {
                let field = FIELDS.get(e.utf8_error().field()).copied().unwrap_or("field");
                row_err(RowError::InvalidUtf8 { field })
            })?;
        let raw: SurveyRecord = record.deserialize(None)?;

        match parse_entry(&raw).map_err(row_err)? {
            Some(entry) => {
                if entry.code == EntryCode::MasterBenchmark && builder.has_master_benchmark() {
                    return Err(row_err(RowError::DuplicateMasterBenchmark));
                }
                builder.add(entry);
            }
            None => {
                warn!(line, code = raw.code.trim(), "unknown survey code, row skipped");
                skipped += 1;
            }
        }

        records += 1;
        if records % every == 0 {
            on_progress(percent(byte, total));
        }
    }

    if !builder.has_master_benchmark() {
        return Err(ImportError::Schema("survey has no master benchmark (0MB) row".into()));
    }

    let grid = builder.build()?;
    info!(
        records,
        skipped,
        grid_points = grid.len(),
        benchmarks = grid.benchmarks().len(),
        boundary = grid.boundary().len(),
        "survey imported"
    );
    on_progress(100);
    Ok(grid)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `Ok(None)` for a code the importer does not know.
fn parse_entry(raw: &SurveyRecord) -> Result<Option<Entry>, RowError> {
    let label = raw.code.trim();
    let Some(code) = EntryCode::classify(label) else {
        return Ok(None);
    };

    let lat = required("latitude", &raw.lat)?;
    let lon = required("longitude", &raw.lon)?;

    let proposed_m = match code {
        EntryCode::GridPoint => required("proposed elevation", &raw.proposed_m)?,
        _ => optional("proposed elevation", &raw.proposed_m)?.unwrap_or(0.0),
    };
    let existing_m = optional("existing elevation", &raw.existing_m)?.unwrap_or(proposed_m);
    let cut_fill_m =
        optional("cut/fill height", &raw.cut_fill_m)?.unwrap_or(proposed_m - existing_m);

    let elev = Elevations { existing_m, proposed_m, cut_fill_m };
    Ok(Some(Entry::from_geo(GeoPoint::new(lat, lon), elev, code, label, raw.comment.trim())))
}

fn optional(field: &'static str, value: &str) -> Result<Option<f64>, RowError> {
    let v = value.trim();
    if v.is_empty() {
        return Ok(None);
    }
    v.parse::<f64>()
        .map(Some)
        .map_err(|_| RowError::InvalidNumber { field, value: v.to_owned() })
}

fn required(field: &'static str, value: &str) -> Result<f64, RowError> {
    optional(field, value)?.ok_or(RowError::Missing { field })
}

/// 1-based line the record starts on.
///
/// The reader skips blank lines before a record but reports the position it
/// resumed from, so the skipped line breaks are counted here.
fn record_line(input: &[u8], record: &csv::ByteRecord) -> u64 {
    let Some(pos) = record.position() else {
        return 0;
    };
    let rest = input.get(pos.byte() as usize..).unwrap_or_default();
    let skipped = rest
        .iter()
        .take_while(|&&b| b == b'\r' || b == b'\n')
        .filter(|&&b| b == b'\n')
        .count();
    pos.line() + skipped as u64
}

fn percent(byte: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    (byte.saturating_mul(100) / total).min(99) as u8
}
