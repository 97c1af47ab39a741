//! Planner configuration.
//!
//! # Design
//!
//! Every tunable of a planning run lives here and is passed to the planner
//! at start: scraper geometry, batch size, the scoring step tables, the stop
//! timeout, an optional RNG seed and an optional route limit.  The defaults
//! describe a 20 yd³ scraper with a 15 ft blade taking 0.2 ft per pass.

use std::time::Duration;

use haul_core::units::{cubic_yards_to_cubic_meters, feet_to_meters};
use haul_grid::Footprint;

use crate::{PlannerError, PlannerResult};

// ── ScraperConfig ─────────────────────────────────────────────────────────────

/// Idealised earthmoving unit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ScraperConfig {
    /// Depth taken off (or placed) per pass, metres.  Default 0.2 ft.
    pub cut_depth_m: f64,
    /// Blade width, metres.  Default 15 ft.
    pub width_m: f64,
    /// Bowl capacity in loose cubic yards.
    pub capacity_yd3: f64,
    /// Loose volume / bank volume.
    pub swell_factor: f64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            cut_depth_m:  feet_to_meters(0.2),
            width_m:      feet_to_meters(15.0),
            capacity_yd3: 20.0,
            swell_factor: 1.3,
        }
    }
}

impl ScraperConfig {
    /// Bank volume of one full load, m³.
    pub fn load_m3(&self) -> f64 {
        cubic_yards_to_cubic_meters(self.capacity_yd3) / self.swell_factor
    }

    /// Length of ground one load strips at `cut_depth_m` over `width_m`.
    pub fn cut_length_m(&self) -> f64 {
        self.load_m3() / self.cut_depth_m / self.width_m
    }

    /// Footprint of one pass heading `angle_deg`.
    pub fn footprint(&self, angle_deg: f64) -> Footprint {
        Footprint::new(self.cut_length_m(), self.width_m, angle_deg)
    }

    fn validate(&self) -> PlannerResult<()> {
        let fields = [
            ("cut_depth_m", self.cut_depth_m),
            ("width_m", self.width_m),
            ("capacity_yd3", self.capacity_yd3),
            ("swell_factor", self.swell_factor),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(PlannerError::Config(format!(
                    "scraper {name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

// ── Scoring ───────────────────────────────────────────────────────────────────

/// One rung of a step table: `points` are awarded when a measurement passes
/// `threshold`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    pub threshold: f64,
    pub points:    u32,
}

impl Step {
    pub const fn new(threshold: f64, points: u32) -> Self {
        Self { threshold, points }
    }
}

/// Points of the first step with `value < threshold`, else 0.
///
/// Tables list their tightest threshold first.
pub fn points_below(steps: &[Step], value: f64) -> u32 {
    steps.iter().find(|s| value < s.threshold).map_or(0, |s| s.points)
}

/// Points of the first step with `value >= threshold`, else 0.
pub fn points_at_least(steps: &[Step], value: f64) -> u32 {
    steps.iter().find(|s| value >= s.threshold).map_or(0, |s| s.points)
}

/// Additive step tables used to score a candidate route.
///
/// Distances are metres, severities are metres of cut (as a positive depth)
/// or fill.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ScoreWeights {
    /// Start-to-end haul distance; shorter scores higher.
    pub distance:       Vec<Step>,
    /// Depth still to cut at the start.
    pub cut_severity:   Vec<Step>,
    /// Height still to fill at the end.
    pub fill_severity:  Vec<Step>,
    /// Distance from the fill point to the east edge of the grid.
    pub fill_east_edge: Vec<Step>,
    /// Distance from the cut point to the east edge of the grid.
    pub cut_east_edge:  Vec<Step>,
    /// Distance of each endpoint from the previous route's matching endpoint.
    pub continuity:     Vec<Step>,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            distance:       vec![Step::new(30.0, 40), Step::new(60.0, 20), Step::new(120.0, 5)],
            cut_severity:   vec![Step::new(0.6, 30), Step::new(0.3, 15), Step::new(0.1, 5)],
            fill_severity:  vec![Step::new(0.6, 20), Step::new(0.3, 10), Step::new(0.1, 3)],
            fill_east_edge: vec![Step::new(15.0, 10), Step::new(30.0, 5)],
            cut_east_edge:  vec![Step::new(15.0, 5), Step::new(30.0, 2)],
            continuity:     vec![Step::new(10.0, 15), Step::new(20.0, 7)],
        }
    }
}

/// Measurements of one candidate, gathered by the planner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScoreInputs {
    pub distance_m:       f64,
    /// Negative.
    pub cut_height_m:     f64,
    /// Positive.
    pub fill_height_m:    f64,
    pub cut_to_edge_m:    f64,
    pub fill_to_edge_m:   f64,
    /// `None` before the first route is applied.
    pub cut_to_prev_m:    Option<f64>,
    pub fill_to_prev_m:   Option<f64>,
}

impl ScoreWeights {
    /// Sum of every table's points, saturating at `u32::MAX`.
    pub fn score(&self, m: &ScoreInputs) -> u32 {
        let continuity = |d: Option<f64>| d.map_or(0, |d| points_below(&self.continuity, d));

        [
            points_below(&self.distance, m.distance_m),
            points_at_least(&self.cut_severity, -m.cut_height_m),
            points_at_least(&self.fill_severity, m.fill_height_m),
            points_below(&self.fill_east_edge, m.fill_to_edge_m),
            points_below(&self.cut_east_edge, m.cut_to_edge_m),
            continuity(m.cut_to_prev_m),
            continuity(m.fill_to_prev_m),
        ]
        .into_iter()
        .fold(0u32, u32::saturating_add)
    }
}

// ── PlannerConfig ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct PlannerConfig {
    pub scraper:         ScraperConfig,
    pub weights:         ScoreWeights,
    /// Candidates generated per iteration.
    pub batch_size:      usize,
    /// Upper bound on how long `stop` blocks.
    pub stop_timeout_ms: u64,
    /// Fixed seed for reproducible runs; entropy when `None`.
    pub seed:            Option<u64>,
    /// Finish with `RouteLimit` after this many routes.
    pub max_routes:      Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            scraper:         ScraperConfig::default(),
            weights:         ScoreWeights::default(),
            batch_size:      500,
            stop_timeout_ms: 4_000,
            seed:            None,
            max_routes:      None,
        }
    }
}

impl PlannerConfig {
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    /// # Errors
    ///
    /// [`PlannerError::Config`] for a zero batch size or a non-positive
    /// scraper dimension.
    pub fn validate(&self) -> PlannerResult<()> {
        if self.batch_size == 0 {
            return Err(PlannerError::Config("batch_size must be at least 1".into()));
        }
        self.scraper.validate()
    }
}
