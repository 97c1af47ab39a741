//! Unit conversion constants.
//!
//! Everything inside the workspace is metric.  Survey files exported for the
//! design tool and scraper ratings are imperial, so the conversions live in
//! one place.

/// International feet per metre.
pub const FEET_PER_METER: f64 = 3.28084;

/// Metres per international foot.
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Cubic metres per cubic yard.
pub const CUBIC_METERS_PER_CUBIC_YARD: f64 = 0.764555;

#[inline]
pub fn feet_to_meters(ft: f64) -> f64 {
    ft * METERS_PER_FOOT
}

#[inline]
pub fn meters_to_feet(m: f64) -> f64 {
    m * FEET_PER_METER
}

#[inline]
pub fn cubic_yards_to_cubic_meters(yd3: f64) -> f64 {
    yd3 * CUBIC_METERS_PER_CUBIC_YARD
}

#[inline]
pub fn cubic_meters_to_cubic_yards(m3: f64) -> f64 {
    m3 / CUBIC_METERS_PER_CUBIC_YARD
}
