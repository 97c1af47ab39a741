//! Rotated-rectangle cut and fill.
//!
//! A scraper pass covers a rectangle anchored at an entry: corners
//! `(x, y)`, `(x+L, y)`, `(x+L, y+W)`, `(x, y+W)` rotated about the anchor by
//! the pass angle (0° = east, counter-clockwise).  Every grid point inside
//! moves toward zero by the pass depth and is clamped there.

use haul_core::{EntryId, PlanarPoint};

use crate::GridResult;
use crate::graph::GridGraph;

/// Shape and orientation of one scraper pass.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Footprint {
    pub length_m:  f64,
    pub width_m:   f64,
    pub angle_deg: f64,
}

impl Footprint {
    pub fn new(length_m: f64, width_m: f64, angle_deg: f64) -> Self {
        Self { length_m, width_m, angle_deg }
    }

    /// The rectangle's corners, rotated about `anchor`.
    pub fn corners(&self, anchor: PlanarPoint) -> [PlanarPoint; 4] {
        [
            anchor,
            anchor.offset(self.length_m, 0.0),
            anchor.offset(self.length_m, self.width_m),
            anchor.offset(0.0, self.width_m),
        ]
        .map(|c| c.rotate_about(anchor, self.angle_deg))
    }
}

/// New cut/fill height of one entry.  A change set can be replayed onto any
/// clone of the graph it came from.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeightChange {
    pub entry:      EntryId,
    pub cut_fill_m: f64,
}

/// Outcome of one cut or fill pass.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PassReport {
    /// Material removed (cut) or placed (fill), m³.
    pub volume_m3: f64,
    /// Only the entries whose height actually changed, in footprint order.
    pub changes:   Vec<HeightChange>,
}

// ── Clamp laws ────────────────────────────────────────────────────────────────

/// One cut pass on a single height.  Returns `(new_height, depth_moved)`, or
/// `None` when the entry does not need cutting.
#[inline]
pub fn cut_height(height_m: f64, depth_m: f64) -> Option<(f64, f64)> {
    if height_m >= 0.0 {
        None
    } else if height_m + depth_m < 0.0 {
        Some((height_m + depth_m, depth_m))
    } else {
        Some((0.0, -height_m))
    }
}

/// One fill pass on a single height.  Mirror of [`cut_height`].
#[inline]
pub fn fill_height(height_m: f64, depth_m: f64) -> Option<(f64, f64)> {
    if height_m <= 0.0 {
        None
    } else if height_m - depth_m > 0.0 {
        Some((height_m - depth_m, depth_m))
    } else {
        Some((0.0, height_m))
    }
}

// ── GridGraph operations ──────────────────────────────────────────────────────

impl GridGraph {
    /// Entries covered by `footprint` anchored at `anchor`: the anchor first,
    /// then every other grid point inside the rotated rectangle in load order.
    ///
    /// The anchor sits on a corner, where the even-odd test may exclude it,
    /// so it is always added explicitly.
    pub fn footprint_entries(
        &self,
        anchor:    EntryId,
        footprint: &Footprint,
    ) -> GridResult<Vec<EntryId>> {
        let origin = self.try_entry(anchor)?.planar();
        let corners = footprint.corners(origin);

        let mut ids = vec![anchor];
        ids.extend(self.entries_in_polygon(&corners).into_iter().filter(|&id| id != anchor));
        Ok(ids)
    }

    /// Cut `depth_m` from every entry in the footprint that needs cutting.
    ///
    /// # Errors
    ///
    /// [`GridError::EntryNotFound`](crate::GridError::EntryNotFound) for an
    /// unknown anchor.
    pub fn cut(
        &mut self,
        anchor:    EntryId,
        depth_m:   f64,
        footprint: &Footprint,
    ) -> GridResult<PassReport> {
        self.apply_pass(anchor, depth_m, footprint, cut_height)
    }

    /// Fill `depth_m` into every entry in the footprint that needs filling.
    pub fn fill(
        &mut self,
        anchor:    EntryId,
        depth_m:   f64,
        footprint: &Footprint,
    ) -> GridResult<PassReport> {
        self.apply_pass(anchor, depth_m, footprint, fill_height)
    }

    fn apply_pass(
        &mut self,
        anchor:    EntryId,
        depth_m:   f64,
        footprint: &Footprint,
        law:       fn(f64, f64) -> Option<(f64, f64)>,
    ) -> GridResult<PassReport> {
        debug_assert!(depth_m > 0.0, "pass depth must be positive");
        let cell_m2 = self.grid_spacing_m() * self.grid_spacing_m();

        let mut report = PassReport::default();
        for id in self.footprint_entries(anchor, footprint)? {
            let entry = &mut self.entries[id.index()];
            if let Some((height, moved)) = law(entry.cut_fill_m, depth_m) {
                entry.cut_fill_m = height;
                report.volume_m3 += cell_m2 * moved;
                report.changes.push(HeightChange { entry: id, cut_fill_m: height });
            }
        }
        Ok(report)
    }

    /// Replay a change set produced on a structurally identical graph.
    ///
    /// Validates every id before writing anything.
    pub fn apply_changes(&mut self, changes: &[HeightChange]) -> GridResult<()> {
        for c in changes {
            self.try_entry(c.entry)?;
        }
        for c in changes {
            self.entries[c.entry.index()].cut_fill_m = c.cut_fill_m;
        }
        Ok(())
    }
}
