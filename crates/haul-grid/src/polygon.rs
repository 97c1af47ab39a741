//! Planar polygon helpers.

use haul_core::PlanarPoint;

/// Axis-aligned bounding box in planar metres.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extents {
    pub min: PlanarPoint,
    pub max: PlanarPoint,
}

impl Extents {
    /// Bounding box of `points`, or `None` when empty.
    pub fn of(points: impl IntoIterator<Item = PlanarPoint>) -> Option<Extents> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Extents { min: p, max: p },
                Some(e) => Extents {
                    min: PlanarPoint::new(e.min.x.min(p.x), e.min.y.min(p.y)),
                    max: PlanarPoint::new(e.max.x.max(p.x), e.max.y.max(p.y)),
                },
            })
        })
    }

    #[inline]
    pub fn width_m(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height_m(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Closed containment test.
    #[inline]
    pub fn contains(&self, p: PlanarPoint) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Even-odd ray-casting test.
///
/// Casts a ray towards −x and counts edge crossings.  Each edge is treated
/// as half-open in `y`, so a point exactly on a shared vertex is counted
/// once.  Points on the top/right edges of an axis-aligned rectangle count as
/// inside, points on the bottom/left edges as outside.  Polygons with fewer
/// than three vertices contain nothing.
pub fn point_in_polygon(polygon: &[PlanarPoint], p: PlanarPoint) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y < p.y && b.y >= p.y) || (b.y < p.y && a.y >= p.y) {
            let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if x_cross < p.x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
