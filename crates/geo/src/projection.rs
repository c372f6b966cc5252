//! Web Mercator (EPSG:3857) projection.
//!
//! Map surfaces report clicks and position markers in projected meters; saved
//! locations are stored as longitude/latitude. These functions convert between
//! the two using the spherical Mercator formulas map renderers use.

use crate::{GeoError, GeoPoint, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Sphere radius used by Web Mercator, in meters.
pub const RADIUS: f64 = 6_378_137.0;

/// Half the projected world width, in meters.
pub const HALF_SIZE: f64 = PI * RADIUS;

/// A position on the projected map surface, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Creates a projected point, rejecting non-finite values.
    pub fn checked(x: f64, y: f64) -> Result<Self> {
        if x.is_finite() && y.is_finite() {
            Ok(Self::new(x, y))
        } else {
            Err(GeoError::InvalidProjection(format!("({x}, {y}) is not finite")))
        }
    }
}

impl fmt::Display for ProjectedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}, {:.2}", self.x, self.y)
    }
}

/// Projects a longitude/latitude point onto the map surface.
///
/// Latitudes beyond the Mercator limit (about ±85.05°) clamp to the edge of the
/// projected world.
pub fn from_lon_lat(point: &GeoPoint) -> ProjectedPoint {
    let x = RADIUS * point.longitude.to_radians();
    let y = RADIUS * (PI * (point.latitude + 90.0) / 360.0).tan().ln();

    ProjectedPoint::new(x, y.clamp(-HALF_SIZE, HALF_SIZE))
}

/// Converts a projected map position back to longitude/latitude.
///
/// Positions left or right of the primary world copy wrap into [-180, 180].
pub fn to_lon_lat(point: &ProjectedPoint) -> GeoPoint {
    let longitude = 180.0 * point.x / HALF_SIZE;
    let latitude = 360.0 * (point.y / RADIUS).exp().atan() / PI - 90.0;

    GeoPoint::new(wrap_longitude(longitude), latitude)
}

fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        longitude
    } else {
        (longitude + 180.0).rem_euclid(360.0) - 180.0
    }
}
