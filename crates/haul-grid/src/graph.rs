//! Grid graph representation and builder.
//!
//! # Data layout
//!
//! Grid points live in a single arena (`Vec<Entry>`) addressed by
//! `EntryId`.  Each entry's four neighbor links are arena indices, so the
//! whole graph is plain owned data and `Clone` is a full deep copy: a
//! planner run works on its own clone while the caller keeps the original.
//!
//! Benchmarks and boundary vertices are stored beside the arena.  They are
//! never linked and never take part in cut/fill.
//!
//! # Neighbor linking
//!
//! Links are derived once, in [`GridGraphBuilder::build`], from planar
//! geometry alone.  Entry `P` is the east neighbor of `X` when
//! `0.5·g ≤ P.x − X.x < 1.5·g` and `|P.y − X.y| < g`; the other directions
//! are the same band rotated.  When several entries fall in a band the one
//! loaded first wins.  Links are not forced to be symmetric.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over planar positions serves the band queries at
//! build time, nearest-entry snapping, and the bounding-box prefilter of the
//! polygon queries.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashSet;
use tracing::debug;

use haul_core::{EntryId, PlanarPoint};

use crate::entry::{Direction, Entry, EntryCode};
use crate::polygon::{Extents, point_in_polygon};
use crate::{GridError, GridResult};

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Point stored in the spatial index: planar `[x, y]` plus the arena index.
#[derive(Clone, Debug)]
struct IndexedPoint {
    point: [f64; 2],
    id:    EntryId,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── GridGraph ─────────────────────────────────────────────────────────────────

/// The loaded survey: grid points with neighbor links, the master benchmark,
/// secondary benchmarks and the field boundary.
///
/// Do not construct directly; use [`GridGraphBuilder`].
#[derive(Clone, Debug)]
pub struct GridGraph {
    pub(crate) entries:  Vec<Entry>,
    master_benchmark:    Entry,
    benchmarks:          Vec<Entry>,
    boundary:            Vec<Entry>,
    grid_spacing_m:      f64,
    extents:             Option<Extents>,
    spatial_idx:         RTree<IndexedPoint>,
}

impl GridGraph {
    // ── Dimensions ────────────────────────────────────────────────────────

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn grid_spacing_m(&self) -> f64 {
        self.grid_spacing_m
    }

    /// Bounding box of the grid points, `None` for an empty grid.
    pub fn extents(&self) -> Option<Extents> {
        self.extents
    }

    // ── Entry access ──────────────────────────────────────────────────────

    #[inline]
    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.index())
    }

    /// Like [`entry`](Self::entry) but reports a missing id as an error.
    pub fn try_entry(&self, id: EntryId) -> GridResult<&Entry> {
        self.entry(id).ok_or(GridError::EntryNotFound(id))
    }

    /// All grid points in load order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// `(id, entry)` pairs in load order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &Entry)> + '_ {
        self.entries.iter().enumerate().map(|(i, e)| (EntryId(i as u32), e))
    }

    pub fn master_benchmark(&self) -> &Entry {
        &self.master_benchmark
    }

    pub fn benchmarks(&self) -> &[Entry] {
        &self.benchmarks
    }

    pub fn boundary(&self) -> &[Entry] {
        &self.boundary
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    #[inline]
    pub fn neighbor(&self, id: EntryId, dir: Direction) -> Option<EntryId> {
        self.entry(id)?.neighbors.get(dir)
    }

    /// Walk `dx` steps east/west (negative = west) and then `dy` steps
    /// north/south (negative = south) along neighbor links.
    ///
    /// Returns `None` as soon as a link along the path is missing.
    pub fn relative_entry(&self, start: EntryId, dx: i32, dy: i32) -> Option<EntryId> {
        let mut cur = self.entry(start).map(|_| start)?;

        let x_dir = if dx < 0 { Direction::West } else { Direction::East };
        for _ in 0..dx.unsigned_abs() {
            cur = self.neighbor(cur, x_dir)?;
        }

        let y_dir = if dy < 0 { Direction::South } else { Direction::North };
        for _ in 0..dy.unsigned_abs() {
            cur = self.neighbor(cur, y_dir)?;
        }

        Some(cur)
    }

    /// Entries within `radius_m` of `center`, found by walking every
    /// [`relative_entry`](Self::relative_entry) offset in
    /// `[-R, R] × [-R, R]` with `R = floor(radius_m / g)`.
    ///
    /// The center comes first; the rest follow in offset order without
    /// duplicates.  Empty only when `center` is not in the grid.
    pub fn entries_in_radius(&self, center: EntryId, radius_m: f64) -> Vec<EntryId> {
        let Some(origin) = self.entry(center).map(Entry::planar) else {
            return Vec::new();
        };

        let hops = (radius_m / self.grid_spacing_m).floor().max(0.0) as i32;
        let mut seen = FxHashSet::default();
        seen.insert(center);
        let mut out = vec![center];

        for dx in -hops..=hops {
            for dy in -hops..=hops {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let Some(id) = self.relative_entry(center, dx, dy) else {
                    continue;
                };
                let within = self.entries[id.index()].planar().distance_m(origin) <= radius_m;
                if within && seen.insert(id) {
                    out.push(id);
                }
            }
        }
        out
    }

    /// All grid points inside `polygon` (even-odd rule, see
    /// [`point_in_polygon`]), in load order.  Polygons with fewer than three
    /// vertices match nothing.
    pub fn entries_in_polygon(&self, polygon: &[PlanarPoint]) -> Vec<EntryId> {
        if polygon.len() < 3 {
            return Vec::new();
        }
        let Some(bounds) = Extents::of(polygon.iter().copied()) else {
            return Vec::new();
        };

        let envelope = AABB::from_corners(
            [bounds.min.x, bounds.min.y],
            [bounds.max.x, bounds.max.y],
        );
        let mut ids: Vec<EntryId> = self
            .spatial_idx
            .locate_in_envelope(&envelope)
            .filter(|p| point_in_polygon(polygon, PlanarPoint::new(p.point[0], p.point[1])))
            .map(|p| p.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The grid point closest to `pos`.  `None` only for an empty grid.
    pub fn nearest_entry(&self, pos: PlanarPoint) -> Option<EntryId> {
        self.spatial_idx.nearest_neighbor(&[pos.x, pos.y]).map(|p| p.id)
    }

    // ── Cut/fill state ────────────────────────────────────────────────────

    pub fn count_needing_cut(&self) -> usize {
        self.entries.iter().filter(|e| e.needs_cut()).count()
    }

    pub fn count_needing_fill(&self) -> usize {
        self.entries.iter().filter(|e| e.needs_fill()).count()
    }

    /// `true` while at least one entry still needs cutting or filling.
    pub fn has_work(&self) -> bool {
        self.entries.iter().any(|e| e.needs_cut() || e.needs_fill())
    }

    /// Outstanding cut volume in m³ (each cell is `g × g`).
    pub fn remaining_cut_m3(&self) -> f64 {
        let cell = self.grid_spacing_m * self.grid_spacing_m;
        self.entries.iter().filter(|e| e.needs_cut()).map(|e| -e.cut_fill_m * cell).sum()
    }

    /// Outstanding fill volume in m³.
    pub fn remaining_fill_m3(&self) -> f64 {
        let cell = self.grid_spacing_m * self.grid_spacing_m;
        self.entries.iter().filter(|e| e.needs_fill()).map(|e| e.cut_fill_m * cell).sum()
    }
}

// ── GridGraphBuilder ──────────────────────────────────────────────────────────

/// Collect survey rows, then call [`build`](Self::build) to link neighbors
/// and index the grid.
///
/// # Example
///
/// ```
/// use haul_core::{GeoPoint, UtmCoord, UtmZone};
/// use haul_grid::{Elevations, Entry, EntryCode, GridGraphBuilder};
///
/// let zone = UtmZone { number: 16, letter: 'R' };
/// let at = |x: f64, y: f64, code| {
///     let utm = UtmCoord { easting: 400_000.0 + x, northing: 3_396_000.0 + y, zone };
///     Entry::from_utm(utm, Elevations::default(), code, "", "")
/// };
///
/// let mut b = GridGraphBuilder::new(1.524);
/// b.add(at(0.0, 0.0, EntryCode::MasterBenchmark));
/// b.add(at(0.0, 0.0, EntryCode::GridPoint));
/// b.add(at(1.524, 0.0, EntryCode::GridPoint));
/// let grid = b.build().unwrap();
/// assert_eq!(grid.len(), 2);
/// ```
pub struct GridGraphBuilder {
    grid_spacing_m: f64,
    entries:        Vec<Entry>,
    master:         Option<Entry>,
    benchmarks:     Vec<Entry>,
    boundary:       Vec<Entry>,
}

impl GridGraphBuilder {
    pub fn new(grid_spacing_m: f64) -> Self {
        Self {
            grid_spacing_m,
            entries:    Vec::new(),
            master:     None,
            benchmarks: Vec::new(),
            boundary:   Vec::new(),
        }
    }

    /// Add a row, routed by its code.  Returns the `EntryId` for grid points
    /// and `None` for benchmarks and boundary vertices.
    ///
    /// A second master benchmark replaces the first; the importer rejects
    /// duplicates before they get here.
    pub fn add(&mut self, entry: Entry) -> Option<EntryId> {
        match entry.code {
            EntryCode::GridPoint => {
                let id = EntryId(self.entries.len() as u32);
                self.entries.push(entry);
                Some(id)
            }
            EntryCode::MasterBenchmark => {
                self.master = Some(entry);
                None
            }
            EntryCode::Benchmark => {
                self.benchmarks.push(entry);
                None
            }
            EntryCode::Boundary => {
                self.boundary.push(entry);
                None
            }
        }
    }

    pub fn has_master_benchmark(&self) -> bool {
        self.master.is_some()
    }

    /// Consume the builder and produce a linked [`GridGraph`].
    ///
    /// # Errors
    ///
    /// - [`GridError::InvalidGridSpacing`] unless the spacing is finite and
    ///   positive.
    /// - [`GridError::MissingMasterBenchmark`] if no `0MB` row was added.
    pub fn build(self) -> GridResult<GridGraph> {
        let g = self.grid_spacing_m;
        if !(g.is_finite() && g > 0.0) {
            return Err(GridError::InvalidGridSpacing(g));
        }
        let master_benchmark = self.master.ok_or(GridError::MissingMasterBenchmark)?;

        let mut entries = self.entries;
        let points: Vec<IndexedPoint> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let p = e.planar();
                IndexedPoint { point: [p.x, p.y], id: EntryId(i as u32) }
            })
            .collect();
        let spatial_idx = RTree::bulk_load(points);

        let mut linked = 0usize;
        for i in 0..entries.len() {
            let origin = entries[i].planar();
            for dir in Direction::ALL {
                if let Some(id) = band_neighbor(&spatial_idx, origin, dir, g) {
                    entries[i].neighbors.set(dir, id);
                    linked += 1;
                }
            }
        }

        let extents = Extents::of(entries.iter().map(Entry::planar));
        debug!(
            entries = entries.len(),
            links = linked,
            benchmarks = self.benchmarks.len(),
            boundary = self.boundary.len(),
            "grid graph built"
        );

        Ok(GridGraph {
            entries,
            master_benchmark,
            benchmarks: self.benchmarks,
            boundary: self.boundary,
            grid_spacing_m: g,
            extents,
            spatial_idx,
        })
    }
}

/// Lowest-id entry inside the `dir` band of `origin`.
fn band_neighbor(
    idx:    &RTree<IndexedPoint>,
    origin: PlanarPoint,
    dir:    Direction,
    g:      f64,
) -> Option<EntryId> {
    let (ux, uy) = dir.unit();
    // Band half-extents along and across the direction of travel.
    let (hx, hy) = if ux != 0.0 { (0.5 * g, g) } else { (g, 0.5 * g) };
    let cx = origin.x + ux * g;
    let cy = origin.y + uy * g;
    let envelope = AABB::from_corners([cx - hx, cy - hy], [cx + hx, cy + hy]);

    idx.locate_in_envelope(&envelope)
        .filter(|p| {
            let dx = p.point[0] - origin.x;
            let dy = p.point[1] - origin.y;
            let along = dx * ux + dy * uy;
            let across = dx * uy - dy * ux;
            (0.5 * g..1.5 * g).contains(&along) && across.abs() < g
        })
        .map(|p| p.id)
        .min()
}
