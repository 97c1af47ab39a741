//! Nine-way cut/fill severity bands.
//!
//! Thresholds are survey-standard feet: ±0.05 ft is on grade, then steps of
//! 0.9 ft up to the heavy classes beyond ±2.7 ft.

use haul_core::units::feet_to_meters;

use crate::graph::GridGraph;

const ON_GRADE_FT: f64 = 0.05;
const STEP_1_FT:   f64 = 0.9;
const STEP_2_FT:   f64 = 1.8;
const STEP_3_FT:   f64 = 2.7;

/// Severity class of a cut/fill height.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CutFillBand {
    HeavyFill,
    Fill3,
    Fill2,
    Fill1,
    OnGrade,
    Cut1,
    Cut2,
    Cut3,
    HeavyCut,
}

impl CutFillBand {
    /// Ordered from heaviest fill to heaviest cut.
    pub const ALL: [CutFillBand; 9] = [
        CutFillBand::HeavyFill,
        CutFillBand::Fill3,
        CutFillBand::Fill2,
        CutFillBand::Fill1,
        CutFillBand::OnGrade,
        CutFillBand::Cut1,
        CutFillBand::Cut2,
        CutFillBand::Cut3,
        CutFillBand::HeavyCut,
    ];

    /// Classify a cut/fill height in metres.
    pub fn classify(height_m: f64) -> CutFillBand {
        let at_least = |ft: f64| height_m >= feet_to_meters(ft);
        if at_least(STEP_3_FT) {
            CutFillBand::HeavyFill
        } else if at_least(STEP_2_FT) {
            CutFillBand::Fill3
        } else if at_least(STEP_1_FT) {
            CutFillBand::Fill2
        } else if at_least(ON_GRADE_FT) {
            CutFillBand::Fill1
        } else if at_least(-ON_GRADE_FT) {
            CutFillBand::OnGrade
        } else if at_least(-STEP_1_FT) {
            CutFillBand::Cut1
        } else if at_least(-STEP_2_FT) {
            CutFillBand::Cut2
        } else if at_least(-STEP_3_FT) {
            CutFillBand::Cut3
        } else {
            CutFillBand::HeavyCut
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            CutFillBand::HeavyFill => "fill > 2.7 ft",
            CutFillBand::Fill3     => "fill 1.8-2.7 ft",
            CutFillBand::Fill2     => "fill 0.9-1.8 ft",
            CutFillBand::Fill1     => "fill 0.05-0.9 ft",
            CutFillBand::OnGrade   => "on grade",
            CutFillBand::Cut1      => "cut 0.05-0.9 ft",
            CutFillBand::Cut2      => "cut 0.9-1.8 ft",
            CutFillBand::Cut3      => "cut 1.8-2.7 ft",
            CutFillBand::HeavyCut  => "cut > 2.7 ft",
        }
    }
}

impl std::fmt::Display for CutFillBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl GridGraph {
    /// Count of grid points per band, indexed by [`CutFillBand::index`].
    pub fn band_histogram(&self) -> [usize; 9] {
        let mut counts = [0usize; 9];
        for e in self.entries() {
            counts[CutFillBand::classify(e.cut_fill_m()).index()] += 1;
        }
        counts
    }
}
