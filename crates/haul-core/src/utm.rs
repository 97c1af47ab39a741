//! WGS-84 ⇄ UTM projection.
//!
//! Series expansions from USGS Bulletin 1532 (Snyder, "Map Projections: A
//! Working Manual").  Accuracy is well below a millimetre inside a zone,
//! which is far finer than survey-grade GNSS.
//!
//! The forward transform applies the Norway (zone 32V) and Svalbard (zones
//! 31X/33X/35X/37X) exceptions.  The inverse does not need them: the zone
//! number is part of its input.

use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult, GeoPoint, PlanarPoint};

/// WGS-84 equatorial radius, metres.
const A: f64 = 6_378_137.0;
/// WGS-84 first eccentricity squared.
const ECC_SQ: f64 = 0.006_694_38;
/// UTM central-meridian scale factor.
const K0: f64 = 0.9996;
/// False easting applied to every zone.
const FALSE_EASTING: f64 = 500_000.0;
/// False northing applied in the southern hemisphere.
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Latitude band letters from 80°S northwards, 8° each (X spans 12°).
const BAND_LETTERS: &[u8] = b"CDEFGHJKLMNPQRSTUVWX";

// ── UtmZone ───────────────────────────────────────────────────────────────────

/// A UTM zone label: longitudinal zone number and latitude band letter.
///
/// Formats and parses as e.g. `"17S"`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UtmZone {
    /// 1..=60
    pub number: u8,
    /// `C`..=`X` (no `I`/`O`), or `Z` when the latitude is outside UTM limits.
    pub letter: char,
}

impl UtmZone {
    /// `true` for bands `N` and above.
    #[inline]
    pub fn is_northern(self) -> bool {
        self.letter >= 'N'
    }

    /// Longitude of the zone's central meridian, degrees.
    #[inline]
    pub fn central_meridian_deg(self) -> f64 {
        (self.number as f64 - 1.0) * 6.0 - 180.0 + 3.0
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.letter)
    }
}

impl FromStr for UtmZone {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let malformed = || CoreError::MalformedZone(s.to_owned());

        let letter = label.chars().last().ok_or_else(malformed)?;
        let letter = letter.to_ascii_uppercase();
        if !letter.is_ascii() || !BAND_LETTERS.contains(&(letter as u8)) {
            return Err(malformed());
        }

        let number: u8 = label[..label.len() - 1].parse().map_err(|_| malformed())?;
        if !(1..=60).contains(&number) {
            return Err(malformed());
        }

        Ok(UtmZone { number, letter })
    }
}

// ── UtmCoord ──────────────────────────────────────────────────────────────────

/// A projected position: easting/northing in metres plus the zone.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UtmCoord {
    pub easting:  f64,
    pub northing: f64,
    pub zone:     UtmZone,
}

impl UtmCoord {
    /// The planar part (`x` = easting, `y` = northing).
    #[inline]
    pub fn planar(&self) -> PlanarPoint {
        PlanarPoint::new(self.easting, self.northing)
    }

    /// Inverse-project back to latitude/longitude.
    pub fn to_geo(&self) -> GeoPoint {
        inverse(self.easting, self.northing, self.zone)
    }
}

// ── Forward ───────────────────────────────────────────────────────────────────

/// Normalise a longitude into `[-180, 180)`.
pub fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Latitude band letter for `lat`, or `'Z'` outside 80°S..=84°N.
pub fn band_letter(lat: f64) -> char {
    if !(-80.0..=84.0).contains(&lat) {
        return 'Z';
    }
    // X covers 72..=84, every other band is 8° wide.
    let idx = (((lat + 80.0) / 8.0).floor() as usize).min(BAND_LETTERS.len() - 1);
    BAND_LETTERS[idx] as char
}

/// Zone number for a position, including the Norway/Svalbard exceptions.
///
/// `lon` must already be normalised.
pub fn zone_number(lat: f64, lon: f64) -> u8 {
    let mut zone = (((lon + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u8;

    if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
        zone = 32;
    }

    if (72.0..84.0).contains(&lat) {
        zone = match lon {
            l if (0.0..9.0).contains(&l) => 31,
            l if (9.0..21.0).contains(&l) => 33,
            l if (21.0..33.0).contains(&l) => 35,
            l if (33.0..42.0).contains(&l) => 37,
            _ => zone,
        };
    }

    zone
}

/// Project a WGS-84 position into UTM.  Never fails.
pub fn geo_to_utm(point: GeoPoint) -> UtmCoord {
    let lat = point.lat;
    let lon = normalize_lon(point.lon);

    let zone = UtmZone {
        number: zone_number(lat, lon),
        letter: band_letter(lat),
    };

    let lat_rad = lat.to_radians();
    let lon_rad = lon.to_radians();
    let origin_rad = zone.central_meridian_deg().to_radians();

    let ecc_prime_sq = ECC_SQ / (1.0 - ECC_SQ);
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let tan_lat = lat_rad.tan();

    let n = A / (1.0 - ECC_SQ * sin_lat * sin_lat).sqrt();
    let t = tan_lat * tan_lat;
    let c = ecc_prime_sq * cos_lat * cos_lat;
    let a = cos_lat * (lon_rad - origin_rad);

    let e2 = ECC_SQ;
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let m = A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat_rad
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat_rad).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat_rad).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * lat_rad).sin());

    let a2 = a * a;
    let a3 = a2 * a;
    let a4 = a3 * a;
    let a5 = a4 * a;
    let a6 = a5 * a;

    let easting = K0
        * n
        * (a + (1.0 - t + c) * a3 / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ecc_prime_sq) * a5 / 120.0)
        + FALSE_EASTING;

    let mut northing = K0
        * (m + n
            * tan_lat
            * (a2 / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ecc_prime_sq) * a6 / 720.0));

    if lat < 0.0 {
        northing += FALSE_NORTHING_SOUTH;
    }

    UtmCoord { easting, northing, zone }
}

// ── Inverse ───────────────────────────────────────────────────────────────────

/// Inverse-project a UTM position given as a textual zone label.
///
/// # Errors
///
/// [`CoreError::MalformedZone`] if `zone` is not `<1..=60><band letter>`.
pub fn utm_to_geo(easting: f64, northing: f64, zone: &str) -> CoreResult<GeoPoint> {
    let zone: UtmZone = zone.parse()?;
    Ok(inverse(easting, northing, zone))
}

fn inverse(easting: f64, northing: f64, zone: UtmZone) -> GeoPoint {
    let ecc_prime_sq = ECC_SQ / (1.0 - ECC_SQ);
    let sqrt_1_e2 = (1.0 - ECC_SQ).sqrt();
    let e1 = (1.0 - sqrt_1_e2) / (1.0 + sqrt_1_e2);

    let x = easting - FALSE_EASTING;
    let y = if zone.is_northern() { northing } else { northing - FALSE_NORTHING_SOUTH };

    let e2 = ECC_SQ;
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let m = y / K0;
    let mu = m / (A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin();

    let (sin_phi1, cos_phi1) = phi1.sin_cos();
    let tan_phi1 = phi1.tan();
    let denom = 1.0 - ECC_SQ * sin_phi1 * sin_phi1;

    let n1 = A / denom.sqrt();
    let t1 = tan_phi1 * tan_phi1;
    let c1 = ecc_prime_sq * cos_phi1 * cos_phi1;
    let r1 = A * (1.0 - ECC_SQ) / denom.powf(1.5);
    let d = x / (n1 * K0);

    let d2 = d * d;
    let d3 = d2 * d;
    let d4 = d3 * d;
    let d5 = d4 * d;
    let d6 = d5 * d;

    let lat = phi1
        - (n1 * tan_phi1 / r1)
            * (d2 / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ecc_prime_sq) * d4 / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                    - 252.0 * ecc_prime_sq
                    - 3.0 * c1 * c1)
                    * d6
                    / 720.0);

    let lon = (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ecc_prime_sq + 24.0 * t1 * t1)
            * d5
            / 120.0)
        / cos_phi1;

    GeoPoint {
        lat: lat.to_degrees(),
        lon: zone.central_meridian_deg() + lon.to_degrees(),
    }
}
