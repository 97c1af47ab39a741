//! Flat-file survey export.
//!
//! # Format
//!
//! Tab separated ASCII for the land-levelling design tool:
//!
//! ```text
//! 0001	0.000	0.000	100.000	MB N30:41:43.440 / W88:2:23.640	0.000
//! 1	12.500	-3.281	39.698	BM1
//! 2	0.000	16.404	40.026
//! 3	16.404	16.404	39.370
//! ```
//!
//! The header pins the master benchmark in degrees/minutes/seconds.  Every
//! benchmark and grid point follows with a running line number, its offset
//! east and north of the master benchmark and an elevation, all in feet.
//! Benchmarks carry their existing elevation; grid points carry the current
//! design elevation, so an export after planning reflects the simulation.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use haul_core::Dms;
use haul_core::units::meters_to_feet;
use haul_grid::{Entry, GridGraph};

use crate::ExportResult;

/// Write `grid` to `path`, replacing any existing file.
pub fn export_survey(grid: &GridGraph, path: &Path) -> ExportResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_survey(grid, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Like [`export_survey`] but accepts any `Write` sink.
pub fn write_survey<W: Write>(grid: &GridGraph, out: &mut W) -> ExportResult<()> {
    let master = grid.master_benchmark();
    let lat = master.geo.lat_dms().rounded(3);
    let lon = master.geo.lon_dms().rounded(3);
    writeln!(
        out,
        "0001\t0.000\t0.000\t100.000\tMB {} / {}\t0.000",
        dms(lat),
        dms(lon)
    )?;

    let mut line = 1u64;
    for (n, bm) in grid.benchmarks().iter().enumerate() {
        let (east, north) = offset_ft(master, bm);
        writeln!(
            out,
            "{line}\t{east:.3}\t{north:.3}\t{:.3}\tBM{}",
            meters_to_feet(bm.existing_m),
            n + 1
        )?;
        line += 1;
    }

    for e in grid.entries() {
        let (east, north) = offset_ft(master, e);
        writeln!(out, "{line}\t{east:.3}\t{north:.3}\t{:.3}", meters_to_feet(e.design_elevation_m()))?;
        line += 1;
    }
    Ok(())
}

fn dms(d: Dms) -> String {
    format!("{}{}:{}:{:.3}", d.hemisphere, d.degrees, d.minutes, d.seconds)
}

fn offset_ft(master: &Entry, e: &Entry) -> (f64, f64) {
    (
        meters_to_feet(e.utm.easting - master.utm.easting),
        meters_to_feet(e.utm.northing - master.utm.northing),
    )
}
