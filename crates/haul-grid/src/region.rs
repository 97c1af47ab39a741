//! Named planar regions used to constrain routes.

use haul_core::{GeoPoint, PlanarPoint, RegionId, geo_to_utm};

use crate::polygon::{Extents, point_in_polygon};
use crate::{GridError, GridResult};

/// A named polygon in the planar frame.
///
/// Deserializing goes through [`Region::new`], so the vertex count is
/// checked and the bounds are recomputed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RegionRecord")
)]
pub struct Region {
    name:     String,
    vertices: Vec<PlanarPoint>,
    bounds:   Extents,
}

impl Region {
    /// # Errors
    ///
    /// [`GridError::DegenerateRegion`] for fewer than three vertices.
    pub fn new(name: impl Into<String>, vertices: Vec<PlanarPoint>) -> GridResult<Self> {
        let name = name.into();
        let bounds = match Extents::of(vertices.iter().copied()) {
            Some(b) if vertices.len() >= 3 => b,
            _ => return Err(GridError::DegenerateRegion { name, vertices: vertices.len() }),
        };
        Ok(Self { name, vertices, bounds })
    }

    /// Build a region from surveyed latitude/longitude vertices.
    pub fn from_geo(name: impl Into<String>, vertices: &[GeoPoint]) -> GridResult<Self> {
        let planar = vertices.iter().map(|&g| geo_to_utm(g).planar()).collect();
        Self::new(name, planar)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[PlanarPoint] {
        &self.vertices
    }

    pub fn bounds(&self) -> Extents {
        self.bounds
    }

    /// Even-odd membership test; boundary behavior follows
    /// [`point_in_polygon`].
    pub fn contains(&self, p: PlanarPoint) -> bool {
        self.bounds.contains(p) && point_in_polygon(&self.vertices, p)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RegionRecord {
    name:     String,
    vertices: Vec<PlanarPoint>,
}

#[cfg(feature = "serde")]
impl TryFrom<RegionRecord> for Region {
    type Error = GridError;

    fn try_from(record: RegionRecord) -> GridResult<Self> {
        Region::new(record.name, record.vertices)
    }
}

/// An ordered list of regions.
///
/// Two points are compatible when every region contains both of them or
/// neither.  An empty set imposes no constraint.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, region: Region) -> RegionId {
        let id = RegionId(self.regions.len() as u16);
        self.regions.push(region);
        id
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &Region)> + '_ {
        self.regions.iter().enumerate().map(|(i, r)| (RegionId(i as u16), r))
    }

    /// Ids of the regions containing `p`, in insertion order.
    pub fn containing(&self, p: PlanarPoint) -> Vec<RegionId> {
        self.iter().filter(|(_, r)| r.contains(p)).map(|(id, _)| id).collect()
    }

    /// `true` when `a` and `b` lie in exactly the same regions.
    pub fn same_membership(&self, a: PlanarPoint, b: PlanarPoint) -> bool {
        self.regions.iter().all(|r| r.contains(a) == r.contains(b))
    }
}

impl FromIterator<Region> for RegionSet {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        Self { regions: iter.into_iter().collect() }
    }
}
