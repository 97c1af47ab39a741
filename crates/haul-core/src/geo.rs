//! Geographic and planar coordinate types.
//!
//! `GeoPoint` holds WGS-84 latitude/longitude in double precision.  Unlike a
//! city-scale simulation, grading works at centimetre resolution on a grid a
//! few feet wide, so `f32` is not enough here.
//!
//! `PlanarPoint` is a position in the projected metric frame (UTM easting /
//! northing).  All grid, region and footprint geometry happens in this frame.

/// A WGS-84 geographic coordinate in decimal degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Break the latitude into degrees/minutes/seconds with `N`/`S`.
    pub fn lat_dms(self) -> Dms {
        Dms::from_decimal(self.lat, 'N', 'S')
    }

    /// Break the longitude into degrees/minutes/seconds with `E`/`W`.
    pub fn lon_dms(self) -> Dms {
        Dms::from_decimal(self.lon, 'E', 'W')
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.8}, {:.8})", self.lat, self.lon)
    }
}

// ── PlanarPoint ───────────────────────────────────────────────────────────────

/// A point in the planar metric frame: `x` = easting, `y` = northing (m).
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance_m(self, other: PlanarPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Direction from `self` towards `other` in degrees.
    ///
    /// 0° = east, 90° = north (counter-clockwise), range (-180, 180].
    #[inline]
    pub fn angle_to_deg(self, other: PlanarPoint) -> f64 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }

    /// Rotate `self` counter-clockwise by `angle_deg` around `origin`.
    pub fn rotate_about(self, origin: PlanarPoint, angle_deg: f64) -> PlanarPoint {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let dx = self.x - origin.x;
        let dy = self.y - origin.y;
        PlanarPoint {
            x: dx * cos - dy * sin + origin.x,
            y: dx * sin + dy * cos + origin.y,
        }
    }

    /// Offset by `(dx, dy)` metres.
    #[inline]
    pub fn offset(self, dx: f64, dy: f64) -> PlanarPoint {
        PlanarPoint { x: self.x + dx, y: self.y + dy }
    }
}

impl std::fmt::Display for PlanarPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3} E, {:.3} N)", self.x, self.y)
    }
}

// ── Dms ───────────────────────────────────────────────────────────────────────

/// An angle split into whole degrees, whole minutes and fractional seconds,
/// with a hemisphere letter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Dms {
    pub hemisphere: char,
    pub degrees:    u32,
    pub minutes:    u32,
    pub seconds:    f64,
}

impl Dms {
    /// Split `value` (decimal degrees).  `positive` is used for values ≥ 0,
    /// `negative` otherwise; the components are always non-negative.
    pub fn from_decimal(value: f64, positive: char, negative: char) -> Self {
        let hemisphere = if value < 0.0 { negative } else { positive };
        let abs = value.abs();
        let degrees = abs.trunc();
        let minutes_dec = (abs - degrees) * 60.0;
        let minutes = minutes_dec.trunc();
        let seconds = (minutes_dec - minutes) * 60.0;
        Self {
            hemisphere,
            degrees: degrees as u32,
            minutes: minutes as u32,
            seconds,
        }
    }

    /// Round the seconds to `decimals` places, carrying a full 60 into the
    /// minutes and degrees.
    pub fn rounded(self, decimals: u32) -> Self {
        let scale = 10f64.powi(decimals as i32);
        let mut seconds = (self.seconds * scale).round() / scale;
        let mut minutes = self.minutes;
        let mut degrees = self.degrees;
        if seconds >= 60.0 {
            seconds -= 60.0;
            minutes += 1;
        }
        if minutes >= 60 {
            minutes -= 60;
            degrees += 1;
        }
        Self { hemisphere: self.hemisphere, degrees, minutes, seconds }
    }

    /// Back to signed decimal degrees (negative hemisphere letters are `S`/`W`).
    pub fn to_decimal(self) -> f64 {
        let abs = self.degrees as f64 + self.minutes as f64 / 60.0 + self.seconds / 3_600.0;
        if matches!(self.hemisphere, 'S' | 'W') { -abs } else { abs }
    }
}

impl std::fmt::Display for Dms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}:{}:{:.4}", self.hemisphere, self.degrees, self.minutes, self.seconds)
    }
}
