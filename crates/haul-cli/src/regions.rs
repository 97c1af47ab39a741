//! Region files.
//!
//! A JSON array of named polygons in geographic coordinates:
//!
//! ```json
//! [
//!   { "name": "north field", "vertices": [
//!       { "lat": 30.6950, "lon": -88.0400 },
//!       { "lat": 30.6950, "lon": -88.0390 },
//!       { "lat": 30.6960, "lon": -88.0390 }
//!   ] }
//! ]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use haul_core::GeoPoint;
use haul_grid::{Region, RegionSet};

#[derive(Debug, Deserialize)]
struct RegionRecord {
    name:     String,
    vertices: Vec<GeoPoint>,
}

pub fn load_regions(path: &Path) -> Result<RegionSet> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading regions file {}", path.display()))?;
    parse_regions(&text).with_context(|| format!("in regions file {}", path.display()))
}

pub fn parse_regions(text: &str) -> Result<RegionSet> {
    let records: Vec<RegionRecord> = serde_json::from_str(text)?;
    records
        .into_iter()
        .map(|r| {
            let name = r.name.clone();
            Region::from_geo(r.name, &r.vertices).with_context(|| format!("region {name:?}"))
        })
        .collect()
}
