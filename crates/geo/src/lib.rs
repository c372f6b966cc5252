//! Geospatial math for pinmap.
//!
//! This crate provides:
//! - Haversine distance calculations
//! - Web Mercator projection (map coordinates to and from longitude/latitude)
//! - Nearest-point search over saved locations
//! - Distance ranking with optional parallelism
//! - WASM bindings for browser usage
//!
//! # Example
//!
//! ```
//! use pinmap_geo::{distance_km, GeoPoint};
//!
//! let city_hall = GeoPoint::new(107.6098, -6.9175);
//! let gedung_sate = GeoPoint::new(107.6191, -6.9025);
//!
//! let distance = distance_km(&city_hall, &gedung_sate);
//! assert!((distance - 1.96).abs() < 0.05);
//! ```

mod error;
mod haversine;
pub mod nearest;
pub mod projection;
pub mod ranking;
pub mod stored;

#[cfg(feature = "wasm")]
mod wasm;

pub use error::{GeoError, GeoErrorCode, Result};
pub use haversine::{distance_km, distance_meters, EARTH_RADIUS_KM, EARTH_RADIUS_M};
pub use nearest::{find_nearest, Located, Nearest};
pub use projection::{from_lon_lat, to_lon_lat, ProjectedPoint};
pub use ranking::{rank_by_distance, within_radius, RankedEntry};
pub use stored::{nearest_stored, parse_stored, StoredEntry};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A geographic position as (longitude, latitude) in degrees.
///
/// Serialized as a two-element array `[longitude, latitude]`, the order map
/// libraries use for lon/lat pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
}

impl GeoPoint {
    /// Creates a new point. Values are not range checked.
    #[inline]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }

    /// Creates a point, rejecting values outside the WGS84 ranges.
    pub fn checked(longitude: f64, latitude: f64) -> Result<Self> {
        let point = Self::new(longitude, latitude);
        if point.is_valid() {
            Ok(point)
        } else {
            Err(GeoError::InvalidCoordinate(format!(
                "longitude {longitude} / latitude {latitude} out of range"
            )))
        }
    }

    /// Builds a point from a persisted coordinate list.
    ///
    /// Returns `None` unless the slice holds exactly two finite numbers.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [lon, lat] if lon.is_finite() && lat.is_finite() => Some(Self::new(*lon, *lat)),
            _ => None,
        }
    }

    /// Reads a persisted `[longitude, latitude]` JSON value.
    ///
    /// Anything but an array of exactly two finite numbers yields `None`:
    /// `null` members, strings, objects and short arrays included.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let values = value
            .as_array()?
            .iter()
            .map(serde_json::Value::as_f64)
            .collect::<Option<Vec<f64>>>()?;
        Self::from_slice(&values)
    }

    /// Returns true if longitude and latitude are within their ranges.
    #[inline]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Returns `(latitude, longitude)` in radians.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([longitude, latitude]: [f64; 2]) -> Self {
        Self::new(longitude, latitude)
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(point: GeoPoint) -> Self {
        [point.longitude, point.latitude]
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((longitude, latitude): (f64, f64)) -> Self {
        Self::new(longitude, latitude)
    }
}

/// Formats as `latitude, longitude` with five decimals, the way locations are
/// shown to users.
impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// Parses `"lon,lat"`.
impl FromStr for GeoPoint {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        let (lon, lat) = s
            .split_once(',')
            .ok_or_else(|| GeoError::InvalidCoordinate(format!("expected `lon,lat`, got `{s}`")))?;

        let parse = |part: &str, axis: &str| {
            part.trim().parse::<f64>().map_err(|e| {
                GeoError::InvalidCoordinate(format!("{axis} `{}`: {e}", part.trim()))
            })
        };

        Self::checked(parse(lon, "longitude")?, parse(lat, "latitude")?)
    }
}
