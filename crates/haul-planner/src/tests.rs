//! Tests for haul-planner.

use haul_core::units::cubic_meters_to_cubic_yards;
use haul_core::{PlanarPoint, UtmCoord, UtmZone};
use haul_grid::{Elevations, Entry, EntryCode, GridGraph, GridGraphBuilder, Region, RegionSet};

use crate::{PlannerConfig, ScraperConfig};

// ── Helpers ───────────────────────────────────────────────────────────────────

const BASE_E: f64 = 500_000.0;
const BASE_N: f64 = 3_400_000.0;

fn entry(x: f64, y: f64, cut_fill_m: f64, code: EntryCode) -> Entry {
    let utm = UtmCoord {
        easting:  BASE_E + x,
        northing: BASE_N + y,
        zone:     UtmZone { number: 16, letter: 'R' },
    };
    let elev = Elevations { existing_m: 5.0, proposed_m: 5.0 + cut_fill_m, cut_fill_m };
    Entry::from_utm(utm, elev, code, "", "")
}

/// `cols × rows` grid at spacing `g` with heights from `height(col, row)`.
fn grid(cols: u32, rows: u32, g: f64, height: impl Fn(u32, u32) -> f64) -> GridGraph {
    let mut b = GridGraphBuilder::new(g);
    b.add(entry(-5.0, -5.0, 0.0, EntryCode::MasterBenchmark));
    for row in 0..rows {
        for col in 0..cols {
            b.add(entry(col as f64 * g, row as f64 * g, height(col, row), EntryCode::GridPoint));
        }
    }
    b.build().unwrap()
}

/// West half needs cutting, east half needs filling, by the same amount.
fn balanced(cols: u32, rows: u32, depth: f64) -> GridGraph {
    grid(cols, rows, 1.0, |c, _| if c < cols / 2 { -depth } else { depth })
}

/// A scraper whose footprint is 2 m × 1 m at 0.05 m per pass.
fn small_scraper() -> ScraperConfig {
    ScraperConfig {
        cut_depth_m:  0.05,
        width_m:      1.0,
        capacity_yd3: cubic_meters_to_cubic_yards(0.1),
        swell_factor: 1.0,
    }
}

fn config(seed: u64) -> PlannerConfig {
    PlannerConfig {
        scraper: small_scraper(),
        batch_size: 64,
        seed: Some(seed),
        ..PlannerConfig::default()
    }
}

fn rect(name: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Region {
    Region::new(name, vec![
        PlanarPoint::new(BASE_E + x0, BASE_N + y0),
        PlanarPoint::new(BASE_E + x1, BASE_N + y0),
        PlanarPoint::new(BASE_E + x1, BASE_N + y1),
        PlanarPoint::new(BASE_E + x0, BASE_N + y1),
    ])
    .unwrap()
}

// ── Configuration & scoring ───────────────────────────────────────────────────

#[cfg(test)]
mod config_tests {
    use super::*;
    use crate::config::{points_at_least, points_below};
    use crate::{PlannerError, ScoreInputs, ScoreWeights, Step};

    #[test]
    fn default_scraper_geometry() {
        let s = ScraperConfig::default();
        assert!((s.cut_depth_m - 0.06096).abs() < 1e-12);
        assert!((s.width_m - 4.572).abs() < 1e-12);
        assert!((s.load_m3() - 20.0 * 0.764555 / 1.3).abs() < 1e-9);
        assert!((s.cut_length_m() - 42.203).abs() < 0.01, "{}", s.cut_length_m());
    }

    #[test]
    fn small_scraper_footprint() {
        let fp = small_scraper().footprint(30.0);
        assert!((fp.length_m - 2.0).abs() < 1e-9);
        assert_eq!(fp.width_m, 1.0);
        assert_eq!(fp.angle_deg, 30.0);
    }

    #[test]
    fn defaults_validate() {
        let c = PlannerConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.batch_size, 500);
        assert_eq!(c.stop_timeout().as_millis(), 4_000);
    }

    #[test]
    fn invalid_configs_rejected() {
        let zero_batch = PlannerConfig { batch_size: 0, ..PlannerConfig::default() };
        assert!(matches!(zero_batch.validate(), Err(PlannerError::Config(_))));

        for scraper in [
            ScraperConfig { cut_depth_m: 0.0, ..ScraperConfig::default() },
            ScraperConfig { width_m: -1.0, ..ScraperConfig::default() },
            ScraperConfig { swell_factor: f64::NAN, ..ScraperConfig::default() },
        ] {
            let c = PlannerConfig { scraper, ..PlannerConfig::default() };
            assert!(matches!(c.validate(), Err(PlannerError::Config(_))), "{c:?}");
        }
    }

    #[test]
    fn step_tables() {
        let near = [Step::new(30.0, 40), Step::new(60.0, 20)];
        assert_eq!(points_below(&near, 10.0), 40);
        assert_eq!(points_below(&near, 30.0), 20);
        assert_eq!(points_below(&near, 100.0), 0);

        let deep = [Step::new(0.6, 30), Step::new(0.3, 15)];
        assert_eq!(points_at_least(&deep, 0.7), 30);
        assert_eq!(points_at_least(&deep, 0.3), 15);
        assert_eq!(points_at_least(&deep, 0.1), 0);
        assert_eq!(points_at_least(&[], 5.0), 0);
    }

    #[test]
    fn default_score_is_additive() {
        let w = ScoreWeights::default();
        let mut m = ScoreInputs {
            distance_m:     20.0,
            cut_height_m:   -0.35,
            fill_height_m:  0.65,
            cut_to_edge_m:  40.0,
            fill_to_edge_m: 5.0,
            cut_to_prev_m:  None,
            fill_to_prev_m: None,
        };
        assert_eq!(w.score(&m), 40 + 15 + 20 + 10);

        m.cut_to_prev_m = Some(5.0);
        m.fill_to_prev_m = Some(15.0);
        assert_eq!(w.score(&m), 40 + 15 + 20 + 10 + 15 + 7);
    }

    #[test]
    fn huge_weights_saturate() {
        let big = vec![Step::new(1_000.0, u32::MAX)];
        let w = ScoreWeights { distance: big.clone(), continuity: big, ..ScoreWeights::default() };
        let m = ScoreInputs {
            distance_m:     20.0,
            cut_height_m:   -0.35,
            fill_height_m:  0.65,
            cut_to_edge_m:  40.0,
            fill_to_edge_m: 5.0,
            cut_to_prev_m:  Some(1.0),
            fill_to_prev_m: None,
        };
        assert_eq!(w.score(&m), u32::MAX);
    }
}

#[cfg(test)]
mod selection_tests {
    use haul_core::EntryId;

    use crate::{RouteCandidate, best_candidate};

    fn cand(start: u32, score: u32) -> RouteCandidate {
        RouteCandidate { start: EntryId(start), end: EntryId(99), distance_m: 1.0, score }
    }

    #[test]
    fn highest_score_wins() {
        let best = best_candidate(&[cand(0, 3), cand(1, 9), cand(2, 4)]).unwrap();
        assert_eq!(best.start, EntryId(1));
    }

    #[test]
    fn ties_go_to_earliest() {
        let best = best_candidate(&[cand(0, 1), cand(1, 7), cand(2, 7)]).unwrap();
        assert_eq!(best.start, EntryId(1));
    }

    #[test]
    fn empty_batch() {
        assert!(best_candidate(&[]).is_none());
    }
}

// ── Synchronous engine ────────────────────────────────────────────────────────

#[cfg(test)]
mod engine_tests {
    use std::sync::atomic::AtomicBool;

    use haul_core::EntryId;

    use super::*;
    use crate::{HaulRoute, NoopObserver, PlanObserver, PlanOutcome, PlannerError, RoutePlanner};

    /// Records every route plus the remaining cut after it.
    #[derive(Default)]
    struct Recorder {
        routes:        Vec<HaulRoute>,
        remaining_cut: Vec<f64>,
        started:       bool,
        ended:         bool,
    }

    impl PlanObserver for Recorder {
        fn on_plan_start(&mut self, _grid: &GridGraph) {
            self.started = true;
        }
        fn on_route_applied(&mut self, route: &HaulRoute, grid: &GridGraph) {
            self.routes.push(route.clone());
            self.remaining_cut.push(grid.remaining_cut_m3());
        }
        fn on_plan_end(&mut self, _summary: &crate::PlanSummary) {
            self.ended = true;
        }
    }

    fn not_canceled() -> AtomicBool {
        AtomicBool::new(false)
    }

    #[test]
    fn invalid_config_rejected() {
        let bad = PlannerConfig { batch_size: 0, ..config(1) };
        let result = RoutePlanner::new(balanced(4, 4, 0.1), RegionSet::new(), bad);
        assert!(matches!(result, Err(PlannerError::Config(_))));
    }

    #[test]
    fn nothing_to_cut_exhausts_immediately() {
        let g = grid(4, 4, 1.0, |c, _| if c == 0 { 0.3 } else { 0.0 });
        let mut planner = RoutePlanner::new(g, RegionSet::new(), config(1)).unwrap();
        let mut rec = Recorder::default();
        let summary = planner.run(&mut rec, &not_canceled()).unwrap();

        assert_eq!(summary.outcome, PlanOutcome::Exhausted);
        assert_eq!(summary.routes_applied, 0);
        assert!(rec.started && rec.ended);
        assert_eq!(planner.grid().count_needing_fill(), 4);
    }

    #[test]
    fn region_constraint_blocks_every_pair() {
        // Only cuttable point inside region A, only fillable point outside.
        let g = grid(4, 1, 1.0, |c, _| match c {
            0 => -0.5,
            3 => 0.5,
            _ => 0.0,
        });
        let mut regions = RegionSet::new();
        regions.push(rect("A", -0.5, -0.5, 0.5, 0.5));

        let mut planner = RoutePlanner::new(g.clone(), regions, config(3)).unwrap();
        let summary = planner.run(&mut NoopObserver, &not_canceled()).unwrap();
        assert_eq!(summary.outcome, PlanOutcome::Exhausted);
        assert_eq!(summary.routes_applied, 0);

        // Without the region the same pair is routable.
        let mut free = RoutePlanner::new(g, RegionSet::new(), config(3)).unwrap();
        assert!(free.step().unwrap().is_some());
    }

    #[test]
    fn balanced_site_converges() {
        let g = balanced(6, 6, 0.1);
        let initial_cut = g.remaining_cut_m3();
        let mut planner = RoutePlanner::new(g, RegionSet::new(), config(42)).unwrap();
        let mut rec = Recorder::default();
        let summary = planner.run(&mut rec, &not_canceled()).unwrap();

        assert_eq!(summary.outcome, PlanOutcome::Exhausted);
        assert!(summary.routes_applied > 0);
        assert_eq!(rec.routes.len() as u64, summary.routes_applied);

        let mut last = initial_cut;
        for &r in &rec.remaining_cut {
            assert!(r < last, "remaining cut must strictly decrease: {:?}", rec.remaining_cut);
            last = r;
        }

        let done = planner.grid();
        assert!(done.count_needing_cut() == 0 || done.count_needing_fill() == 0);
        assert!((initial_cut - done.remaining_cut_m3() - summary.cut_m3).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_routes() {
        let run = |seed| {
            let mut planner = RoutePlanner::new(balanced(6, 4, 0.1), RegionSet::new(), config(seed))
                .unwrap();
            let mut rec = Recorder::default();
            planner.run(&mut rec, &not_canceled()).unwrap();
            let pairs: Vec<(EntryId, EntryId)> =
                rec.routes.iter().map(|r| (r.start(), r.end())).collect();
            let heights: Vec<f64> = planner.grid().entries().iter().map(|e| e.cut_fill_m()).collect();
            (pairs, heights)
        };
        let (a_pairs, a_heights) = run(7);
        let (b_pairs, b_heights) = run(7);
        assert!(!a_pairs.is_empty());
        assert_eq!(a_pairs, b_pairs);
        assert_eq!(a_heights, b_heights);
    }

    #[test]
    fn route_limit() {
        let cfg = PlannerConfig { max_routes: Some(3), ..config(5) };
        let mut planner = RoutePlanner::new(balanced(6, 6, 0.5), RegionSet::new(), cfg).unwrap();
        let summary = planner.run(&mut NoopObserver, &not_canceled()).unwrap();
        assert_eq!(summary.outcome, PlanOutcome::RouteLimit);
        assert_eq!(summary.routes_applied, 3);
        assert_eq!(planner.routes_applied(), 3);
    }

    #[test]
    fn cancel_flag_checked_first() {
        let mut planner =
            RoutePlanner::new(balanced(6, 6, 0.5), RegionSet::new(), config(5)).unwrap();
        let summary = planner.run(&mut NoopObserver, &AtomicBool::new(true)).unwrap();
        assert_eq!(summary.outcome, PlanOutcome::Canceled);
        assert_eq!(summary.routes_applied, 0);
    }

    #[test]
    fn route_geometry_and_replay() {
        let original = balanced(6, 6, 0.2);
        let mut planner =
            RoutePlanner::new(original.clone(), RegionSet::new(), config(11)).unwrap();

        let mut display = original.clone();
        for seq in 0..5 {
            let route = planner.step().unwrap().unwrap();
            assert_eq!(route.sequence, seq);

            let s = original.entry(route.start()).unwrap();
            let e = original.entry(route.end()).unwrap();
            assert!(s.needs_cut() && e.needs_fill());
            assert!((route.angle_deg - s.planar().angle_to_deg(e.planar())).abs() < 1e-12);
            assert!((route.candidate.distance_m - s.distance_m(e)).abs() < 1e-12);
            assert!(route.cut.volume_m3 > 0.0 && route.fill.volume_m3 > 0.0);

            let changes: Vec<_> = route.changes().copied().collect();
            display.apply_changes(&changes).unwrap();
        }

        for (a, b) in display.entries().iter().zip(planner.grid().entries()) {
            assert_eq!(a.cut_fill_m(), b.cut_fill_m());
        }
        // The caller's copy is untouched.
        assert_eq!(original.remaining_cut_m3(), balanced(6, 6, 0.2).remaining_cut_m3());
    }

    #[test]
    fn batch_respects_sign_constraints() {
        let mut planner =
            RoutePlanner::new(balanced(4, 4, 0.1), RegionSet::new(), config(9)).unwrap();
        let pairs = planner.generate_batch();
        assert!(!pairs.is_empty() && pairs.len() <= 64);
        for (s, e) in pairs {
            assert!(planner.grid().entry(s).unwrap().needs_cut());
            assert!(planner.grid().entry(e).unwrap().needs_fill());
        }
    }
}

// ── Background handle ─────────────────────────────────────────────────────────

#[cfg(test)]
mod worker_tests {
    use std::sync::mpsc::Receiver;
    use std::time::Duration;

    use super::*;
    use crate::{HaulPlanner, PlanOutcome, PlannerError, PlannerEvent, PlannerState, StopOutcome};

    const WAIT: Duration = Duration::from_secs(10);

    /// A site that takes thousands of routes to balance.
    fn long_site() -> GridGraph {
        grid(30, 30, 1.0, |c, _| if c < 15 { -2.0 } else { 2.0 })
    }

    fn slow_config() -> PlannerConfig {
        PlannerConfig {
            scraper: ScraperConfig {
                cut_depth_m:  0.0005,
                capacity_yd3: cubic_meters_to_cubic_yards(0.001),
                ..small_scraper()
            },
            batch_size: 32,
            seed: Some(1),
            ..PlannerConfig::default()
        }
    }

    fn wait_for_first_route(rx: &Receiver<PlannerEvent>) {
        loop {
            match rx.recv_timeout(WAIT).expect("planner produced no events") {
                PlannerEvent::RouteApplied(_) => return,
                PlannerEvent::Started { .. } => continue,
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    fn last_outcome(rx: &Receiver<PlannerEvent>) -> Option<PlanOutcome> {
        rx.iter()
            .filter_map(|ev| match ev {
                PlannerEvent::Finished(s) => Some(s.outcome),
                _ => None,
            })
            .last()
    }

    #[test]
    fn stop_when_idle() {
        let planner = HaulPlanner::new();
        assert_eq!(planner.state(), PlannerState::Idle);
        assert_eq!(planner.stop(), StopOutcome::AlreadyIdle);
    }

    #[test]
    fn no_work_returns_to_idle() {
        let mut planner = HaulPlanner::new();
        let g = grid(3, 3, 1.0, |_, _| 0.2);
        let rx = planner.start(g, RegionSet::new(), config(1)).unwrap();

        match rx.recv_timeout(WAIT).unwrap() {
            PlannerEvent::Started { entries } => assert_eq!(entries, 9),
            other => panic!("expected Started, got {other:?}"),
        }
        match rx.recv_timeout(WAIT).unwrap() {
            PlannerEvent::Finished(s) => {
                assert_eq!(s.outcome, PlanOutcome::Exhausted);
                assert_eq!(s.routes_applied, 0);
            }
            other => panic!("expected Finished, got {other:?}"),
        }

        let done = planner.join().unwrap().unwrap();
        assert_eq!(done.summary.routes_applied, 0);
        assert_eq!(planner.state(), PlannerState::Idle);
        assert!(planner.join().is_none());
    }

    #[test]
    fn stop_cancels_long_run() {
        let mut planner = HaulPlanner::new();
        let rx = planner.start(long_site(), RegionSet::new(), slow_config()).unwrap();
        wait_for_first_route(&rx);
        assert!(planner.is_running());

        assert_eq!(planner.stop(), StopOutcome::Stopped);
        assert_eq!(planner.state(), PlannerState::Idle);

        let done = planner.join().unwrap().unwrap();
        assert_eq!(done.summary.outcome, PlanOutcome::Canceled);
        assert!(done.summary.routes_applied >= 1);
        assert_eq!(planner.progress().routes_applied, done.summary.routes_applied);
        assert!(done.grid.remaining_cut_m3() < long_site().remaining_cut_m3());
        assert_eq!(last_outcome(&rx), Some(PlanOutcome::Canceled));
    }

    #[test]
    fn stop_timed_out_still_cancels() {
        let mut planner = HaulPlanner::new();
        let cfg = PlannerConfig { stop_timeout_ms: 0, ..slow_config() };
        let rx = planner.start(long_site(), RegionSet::new(), cfg).unwrap();
        wait_for_first_route(&rx);

        assert_eq!(planner.stop(), StopOutcome::TimedOut);

        let done = planner.join().unwrap().unwrap();
        assert_eq!(done.summary.outcome, PlanOutcome::Canceled);
        assert_eq!(planner.state(), PlannerState::Idle);
        assert_eq!(last_outcome(&rx), Some(PlanOutcome::Canceled));
    }

    #[test]
    fn start_while_running_restarts() {
        let mut planner = HaulPlanner::new();
        let first = planner.start(long_site(), RegionSet::new(), slow_config()).unwrap();
        wait_for_first_route(&first);

        let cfg = PlannerConfig { max_routes: Some(2), ..config(2) };
        let second = planner.start(balanced(6, 6, 0.5), RegionSet::new(), cfg).unwrap();

        assert_eq!(last_outcome(&first), Some(PlanOutcome::Canceled));
        let done = planner.join().unwrap().unwrap();
        assert_eq!(done.summary.outcome, PlanOutcome::RouteLimit);
        assert_eq!(planner.progress().routes_applied, 2);
        assert_eq!(last_outcome(&second), Some(PlanOutcome::RouteLimit));
    }

    #[test]
    fn invalid_config_starts_nothing() {
        let mut planner = HaulPlanner::new();
        let bad = PlannerConfig { batch_size: 0, ..PlannerConfig::default() };
        let result = planner.start(balanced(4, 4, 0.1), RegionSet::new(), bad);
        assert!(matches!(result, Err(PlannerError::Config(_))));
        assert_eq!(planner.state(), PlannerState::Idle);
        assert!(planner.join().is_none());
    }
}
