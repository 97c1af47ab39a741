//! The synchronous planning engine.
//!
//! # Iteration
//!
//! ```text
//! loop:
//!   ① Cancel / limit check.
//!   ② Batch:     `batch_size` random (cut, fill) pairs, each endpoint found
//!                 by bounded random probing; pairs whose endpoints sit in
//!                 different regions are dropped.
//!   ③ Score:     additive step tables (parallel with the `parallel`
//!                 feature).
//!   ④ Select:    highest score, earliest wins ties.  Empty batch → done.
//!   ⑤ Apply:     cut at the start and fill at the end, both heading
//!                 start → end; remember the route for continuity.
//! ```
//!
//! All randomness is drawn in ② on the calling thread, so a fixed seed gives
//! the same route sequence whether or not scoring runs in parallel.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use haul_core::{EntryId, PlannerRng};
use haul_grid::{Entry, GridGraph, RegionSet};

use crate::config::ScoreInputs;
use crate::route::best_candidate;
use crate::{HaulRoute, PlanObserver, PlannerConfig, PlannerResult, RouteCandidate};

/// Why a planning run ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlanOutcome {
    /// The cancel flag was observed.
    Canceled,
    /// A batch produced no valid candidate.
    Exhausted,
    /// `max_routes` routes were applied.
    RouteLimit,
}

/// Totals of a finished run.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanSummary {
    pub outcome:        PlanOutcome,
    pub routes_applied: u64,
    /// Bank volume removed, m³.
    pub cut_m3:         f64,
    /// Volume placed, m³.
    pub fill_m3:        f64,
}

/// Owns a private grid snapshot and applies one haul route per
/// [`step`](Self::step).
pub struct RoutePlanner {
    grid:           GridGraph,
    regions:        RegionSet,
    config:         PlannerConfig,
    rng:            PlannerRng,
    /// Easting of the grid's east edge.
    east_edge_x:    f64,
    previous:       Option<(EntryId, EntryId)>,
    routes_applied: u64,
    cut_m3:         f64,
    fill_m3:        f64,
}

impl RoutePlanner {
    /// # Errors
    ///
    /// [`PlannerError::Config`][crate::PlannerError::Config] if `config`
    /// fails validation.
    pub fn new(grid: GridGraph, regions: RegionSet, config: PlannerConfig) -> PlannerResult<Self> {
        config.validate()?;
        let east_edge_x = grid.extents().map_or(0.0, |e| e.max.x);
        let rng = PlannerRng::from_seed_opt(config.seed);
        Ok(Self {
            grid,
            regions,
            config,
            rng,
            east_edge_x,
            previous: None,
            routes_applied: 0,
            cut_m3: 0.0,
            fill_m3: 0.0,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn grid(&self) -> &GridGraph {
        &self.grid
    }

    /// Give back the simulated grid.
    pub fn into_grid(self) -> GridGraph {
        self.grid
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn routes_applied(&self) -> u64 {
        self.routes_applied
    }

    pub fn cut_m3(&self) -> f64 {
        self.cut_m3
    }

    pub fn fill_m3(&self) -> f64 {
        self.fill_m3
    }

    fn summary(&self, outcome: PlanOutcome) -> PlanSummary {
        PlanSummary {
            outcome,
            routes_applied: self.routes_applied,
            cut_m3: self.cut_m3,
            fill_m3: self.fill_m3,
        }
    }

    // ── Run loop ──────────────────────────────────────────────────────────

    /// Step until cancelled, exhausted or at the route limit.
    ///
    /// `cancel` is checked once per iteration; the thread yields after every
    /// applied route.
    pub fn run<O: PlanObserver>(
        &mut self,
        observer: &mut O,
        cancel:   &AtomicBool,
    ) -> PlannerResult<PlanSummary> {
        info!(
            entries = self.grid.len(),
            cut = self.grid.count_needing_cut(),
            fill = self.grid.count_needing_fill(),
            regions = self.regions.len(),
            "haul planning started"
        );
        observer.on_plan_start(&self.grid);

        let outcome = loop {
            if cancel.load(Ordering::Acquire) {
                break PlanOutcome::Canceled;
            }
            if self.config.max_routes.is_some_and(|max| self.routes_applied >= max) {
                break PlanOutcome::RouteLimit;
            }
            match self.step()? {
                Some(route) => {
                    observer.on_route_applied(&route, &self.grid);
                    std::thread::yield_now();
                }
                None => break PlanOutcome::Exhausted,
            }
        };

        let summary = self.summary(outcome);
        info!(
            outcome = ?summary.outcome,
            routes = summary.routes_applied,
            cut_m3 = summary.cut_m3,
            fill_m3 = summary.fill_m3,
            "haul planning finished"
        );
        observer.on_plan_end(&summary);
        Ok(summary)
    }

    /// Generate, score and apply one route.  `Ok(None)` when no valid
    /// candidate remains.
    pub fn step(&mut self) -> PlannerResult<Option<HaulRoute>> {
        let pairs = self.generate_batch();
        let scored = self.score_batch(&pairs);
        let Some(best) = best_candidate(&scored) else {
            return Ok(None);
        };
        self.apply(best).map(Some)
    }

    // ── ② Batch ───────────────────────────────────────────────────────────

    /// Random `(cut, fill)` pairs that satisfy the region constraint.
    ///
    /// Empty when nothing needs cutting or nothing needs filling.
    pub fn generate_batch(&mut self) -> Vec<(EntryId, EntryId)> {
        if self.grid.count_needing_cut() == 0 || self.grid.count_needing_fill() == 0 {
            return Vec::new();
        }

        let mut pairs = Vec::with_capacity(self.config.batch_size);
        for _ in 0..self.config.batch_size {
            let Some(start) = self.random_entry(Entry::needs_cut) else { continue };
            let Some(end) = self.random_entry(Entry::needs_fill) else { continue };

            let (a, b) = (self.entry(start).planar(), self.entry(end).planar());
            if self.regions.same_membership(a, b) {
                pairs.push((start, end));
            }
        }
        pairs
    }

    /// Uniformly random entry matching `pred`, giving up after as many
    /// draws as the grid has entries.
    fn random_entry(&mut self, pred: fn(&Entry) -> bool) -> Option<EntryId> {
        let n = self.grid.len();
        (0..n)
            .map(|_| EntryId(self.rng.index(n) as u32))
            .find(|&id| pred(&self.grid.entries()[id.index()]))
    }

    #[inline]
    fn entry(&self, id: EntryId) -> &Entry {
        &self.grid.entries()[id.index()]
    }

    // ── ③ Score ───────────────────────────────────────────────────────────

    /// Score `pairs`, preserving their order.
    pub fn score_batch(&self, pairs: &[(EntryId, EntryId)]) -> Vec<RouteCandidate> {
        #[cfg(not(feature = "parallel"))]
        {
            pairs.iter().map(|&(s, e)| self.score_pair(s, e)).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            pairs.par_iter().map(|&(s, e)| self.score_pair(s, e)).collect()
        }
    }

    fn score_pair(&self, start: EntryId, end: EntryId) -> RouteCandidate {
        let (s, e) = (self.entry(start), self.entry(end));
        let (sp, ep) = (s.planar(), e.planar());
        let distance_m = sp.distance_m(ep);

        let prev = self
            .previous
            .map(|(ps, pe)| (self.entry(ps).planar(), self.entry(pe).planar()));
        let inputs = ScoreInputs {
            distance_m,
            cut_height_m:   s.cut_fill_m(),
            fill_height_m:  e.cut_fill_m(),
            cut_to_edge_m:  self.east_edge_x - sp.x,
            fill_to_edge_m: self.east_edge_x - ep.x,
            cut_to_prev_m:  prev.map(|(p, _)| p.distance_m(sp)),
            fill_to_prev_m: prev.map(|(_, p)| p.distance_m(ep)),
        };

        RouteCandidate { start, end, distance_m, score: self.config.weights.score(&inputs) }
    }

    // ── ⑤ Apply ───────────────────────────────────────────────────────────

    fn apply(&mut self, candidate: RouteCandidate) -> PlannerResult<HaulRoute> {
        let from = self.grid.try_entry(candidate.start)?.planar();
        let to = self.grid.try_entry(candidate.end)?.planar();
        let angle_deg = from.angle_to_deg(to);

        let scraper = &self.config.scraper;
        let footprint = scraper.footprint(angle_deg);
        let depth = scraper.cut_depth_m;

        let cut = self.grid.cut(candidate.start, depth, &footprint)?;
        let fill = self.grid.fill(candidate.end, depth, &footprint)?;

        let route = HaulRoute {
            sequence: self.routes_applied,
            candidate,
            angle_deg,
            cut,
            fill,
        };
        self.cut_m3 += route.cut.volume_m3;
        self.fill_m3 += route.fill.volume_m3;
        self.routes_applied += 1;
        self.previous = Some((candidate.start, candidate.end));

        debug!(
            seq = route.sequence,
            start = %candidate.start,
            end = %candidate.end,
            score = candidate.score,
            distance_m = candidate.distance_m,
            cut_m3 = route.cut.volume_m3,
            fill_m3 = route.fill.volume_m3,
            "route applied"
        );
        Ok(route)
    }
}
