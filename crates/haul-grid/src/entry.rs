//! Survey entries and their neighbor links.

use haul_core::{EntryId, GeoPoint, PlanarPoint, UtmCoord, geo_to_utm};

// ── EntryCode ─────────────────────────────────────────────────────────────────

/// What a survey row represents.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryCode {
    /// `0MB`: the single reference point; also the dataset's origin.
    MasterBenchmark,
    /// `0BM…`: secondary reference points.
    Benchmark,
    /// `2PER`: vertex of the field boundary polygon.
    Boundary,
    /// `3GRD`: a grid cell carrying cut/fill state.
    GridPoint,
}

impl EntryCode {
    /// Classify a raw survey code.  Returns `None` for unknown codes.
    pub fn classify(code: &str) -> Option<EntryCode> {
        match code.trim() {
            "3GRD" => Some(EntryCode::GridPoint),
            "2PER" => Some(EntryCode::Boundary),
            "0MB" => Some(EntryCode::MasterBenchmark),
            c if c.starts_with("0BM") => Some(EntryCode::Benchmark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryCode::MasterBenchmark => "master-benchmark",
            EntryCode::Benchmark       => "benchmark",
            EntryCode::Boundary        => "boundary",
            EntryCode::GridPoint       => "grid-point",
        }
    }
}

impl std::fmt::Display for EntryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Direction / Neighbors ─────────────────────────────────────────────────────

/// One of the four grid directions.  East is +x, north is +y.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::North, Direction::South, Direction::East, Direction::West];

    /// Unit step `(dx, dy)`.
    #[inline]
    pub fn unit(self) -> (f64, f64) {
        match self {
            Direction::North => (0.0, 1.0),
            Direction::South => (0.0, -1.0),
            Direction::East  => (1.0, 0.0),
            Direction::West  => (-1.0, 0.0),
        }
    }

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

/// Four directional links into the graph arena.  Unlinked slots hold
/// `EntryId::INVALID`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Neighbors([EntryId; 4]);

impl Neighbors {
    #[inline]
    pub fn get(&self, dir: Direction) -> Option<EntryId> {
        self.0[dir.slot()].valid()
    }

    #[inline]
    pub(crate) fn set(&mut self, dir: Direction, id: EntryId) {
        self.0[dir.slot()] = id;
    }

    /// Number of linked directions (0..=4).
    pub fn count(&self) -> usize {
        self.0.iter().filter(|id| id.is_valid()).count()
    }
}

// ── Entry ─────────────────────────────────────────────────────────────────────

/// Survey elevations of one row, metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Elevations {
    pub existing_m:  f64,
    pub proposed_m:  f64,
    /// Negative = must be cut down, positive = must be filled up.
    pub cut_fill_m:  f64,
}

/// One surveyed grid cell (or benchmark / boundary vertex).
///
/// Everything except `cut_fill_m` is fixed after import; the cut/fill height
/// is mutated only by the footprint engine in [`crate::cutfill`].
#[derive(Clone, Debug)]
pub struct Entry {
    /// Geographic position as surveyed.
    pub geo:         GeoPoint,
    /// Projected position and zone.
    pub utm:         UtmCoord,
    pub existing_m:  f64,
    pub proposed_m:  f64,
    pub(crate) cut_fill_m: f64,
    pub code:        EntryCode,
    /// The code string exactly as it appeared in the file (e.g. `0BM2`).
    pub label:       String,
    pub comment:     String,
    pub(crate) neighbors: Neighbors,
}

impl Entry {
    /// Build an entry from a geographic position, projecting it to UTM.
    pub fn from_geo(
        geo:     GeoPoint,
        elev:    Elevations,
        code:    EntryCode,
        label:   impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self::with_position(geo, geo_to_utm(geo), elev, code, label.into(), comment.into())
    }

    /// Build an entry from a projected position; the geographic position is
    /// recovered with the inverse projection.
    pub fn from_utm(
        utm:     UtmCoord,
        elev:    Elevations,
        code:    EntryCode,
        label:   impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self::with_position(utm.to_geo(), utm, elev, code, label.into(), comment.into())
    }

    fn with_position(
        geo:     GeoPoint,
        utm:     UtmCoord,
        elev:    Elevations,
        code:    EntryCode,
        label:   String,
        comment: String,
    ) -> Self {
        Self {
            geo,
            utm,
            existing_m: elev.existing_m,
            proposed_m: elev.proposed_m,
            cut_fill_m: elev.cut_fill_m,
            code,
            label,
            comment,
            neighbors: Neighbors::default(),
        }
    }

    /// Planar position (`x` = easting, `y` = northing).
    #[inline]
    pub fn planar(&self) -> PlanarPoint {
        self.utm.planar()
    }

    /// Current cut/fill height in metres.
    #[inline]
    pub fn cut_fill_m(&self) -> f64 {
        self.cut_fill_m
    }

    #[inline]
    pub fn needs_cut(&self) -> bool {
        self.cut_fill_m < 0.0
    }

    #[inline]
    pub fn needs_fill(&self) -> bool {
        self.cut_fill_m > 0.0
    }

    /// Live design elevation: `proposed − cut_fill`.
    #[inline]
    pub fn design_elevation_m(&self) -> f64 {
        self.proposed_m - self.cut_fill_m
    }

    #[inline]
    pub fn neighbors(&self) -> &Neighbors {
        &self.neighbors
    }

    #[inline]
    pub fn distance_m(&self, other: &Entry) -> f64 {
        self.planar().distance_m(other.planar())
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {:+.3} m", self.code, self.planar(), self.cut_fill_m)
    }
}
