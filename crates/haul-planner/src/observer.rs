//! Planner observer trait for progress reporting.

use haul_grid::GridGraph;

use crate::{HaulRoute, PlanSummary};

/// Callbacks invoked by [`RoutePlanner::run`][crate::RoutePlanner::run].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait PlanObserver {
    /// Called once before the first iteration.
    fn on_plan_start(&mut self, _grid: &GridGraph) {}

    /// Called after each route has been applied.  `grid` already reflects
    /// the route's changes.
    fn on_route_applied(&mut self, _route: &HaulRoute, _grid: &GridGraph) {}

    /// Called once when the loop terminates without error.
    fn on_plan_end(&mut self, _summary: &PlanSummary) {}
}

/// A [`PlanObserver`] that does nothing.
pub struct NoopObserver;

impl PlanObserver for NoopObserver {}
