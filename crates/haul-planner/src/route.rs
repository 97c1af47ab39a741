//! Route candidates and applied haul routes.

use haul_core::EntryId;
use haul_grid::{HeightChange, PassReport};

/// A scored cut → fill pairing.  Produced and discarded every iteration.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteCandidate {
    /// Needs cutting.
    pub start:      EntryId,
    /// Needs filling.
    pub end:        EntryId,
    pub distance_m: f64,
    pub score:      u32,
}

/// Highest-scoring candidate; the earliest one wins ties.
pub fn best_candidate(candidates: &[RouteCandidate]) -> Option<RouteCandidate> {
    candidates.iter().copied().fold(None, |best, c| match best {
        Some(b) if b.score >= c.score => Some(b),
        _ => Some(c),
    })
}

/// A candidate that was executed against the planner's grid.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HaulRoute {
    /// 0-based position in the run.
    pub sequence:  u64,
    pub candidate: RouteCandidate,
    /// Heading from start to end, degrees counter-clockwise from east.
    pub angle_deg: f64,
    pub cut:       PassReport,
    pub fill:      PassReport,
}

impl HaulRoute {
    #[inline]
    pub fn start(&self) -> EntryId {
        self.candidate.start
    }

    #[inline]
    pub fn end(&self) -> EntryId {
        self.candidate.end
    }

    /// Cut changes followed by fill changes.  Replaying them in this order
    /// onto a copy of the grid reproduces the planner's state.
    pub fn changes(&self) -> impl Iterator<Item = &HeightChange> + '_ {
        self.cut.changes.iter().chain(&self.fill.changes)
    }
}
