//! Device location queries
//!
//! A [`LocationProvider`] answers "where is the user right now". Hosts supply
//! the provider; the session only sees the result. [`LocationRequests`] keeps
//! at most one query in flight.

use crate::error::{Error, ErrorCode, Result};
use chrono::{DateTime, Utc};
use pinmap_geo::GeoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Options passed to the location service with each query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeolocationOptions {
    pub enable_high_accuracy: bool,
    /// Milliseconds to wait for a reply
    pub timeout_ms: u64,
    /// Oldest acceptable cached position, in milliseconds
    pub maximum_age_ms: u64,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: 15_000,
            maximum_age_ms: 0,
        }
    }
}

/// A position reported by the location service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub point: GeoPoint,
    /// Accuracy radius in meters, when known
    pub accuracy_m: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Position {
    pub fn new(point: GeoPoint) -> Self {
        Self {
            point,
            accuracy_m: None,
            timestamp: Utc::now(),
        }
    }
}

/// Why a position could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    /// The host has no location service at all
    Unsupported,
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "Location permission was denied"),
            Self::PositionUnavailable => write!(f, "Position is unavailable"),
            Self::Timeout => write!(f, "Location request timed out"),
            Self::Unsupported => write!(f, "Geolocation is not supported"),
        }
    }
}

impl std::error::Error for PositionError {}

impl From<PositionError> for Error {
    fn from(err: PositionError) -> Self {
        let code = match err {
            PositionError::PermissionDenied => ErrorCode::GeolocationDenied,
            PositionError::PositionUnavailable => ErrorCode::PositionUnavailable,
            PositionError::Timeout => ErrorCode::GeolocationTimeout,
            PositionError::Unsupported => ErrorCode::GeolocationUnsupported,
        };
        Error::new(code, err.to_string())
            .with_suggestion("Enable location access, or pass --from <lon,lat>")
    }
}

/// Source of the device's current position.
pub trait LocationProvider {
    fn current_position(
        &self,
        options: &GeolocationOptions,
    ) -> std::result::Result<Position, PositionError>;
}

/// Always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationProvider {
    point: GeoPoint,
}

impl FixedLocationProvider {
    pub fn new(point: GeoPoint) -> Self {
        Self { point }
    }
}

impl LocationProvider for FixedLocationProvider {
    fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> std::result::Result<Position, PositionError> {
        Ok(Position {
            point: self.point,
            accuracy_m: Some(0.0),
            timestamp: Utc::now(),
        })
    }
}

/// Reports a fixed failure, for hosts without a location service.
#[derive(Debug, Clone, Copy)]
pub struct FailingLocationProvider {
    error: PositionError,
}

impl FailingLocationProvider {
    pub fn new(error: PositionError) -> Self {
        Self { error }
    }

    pub fn unsupported() -> Self {
        Self::new(PositionError::Unsupported)
    }
}

impl LocationProvider for FailingLocationProvider {
    fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> std::result::Result<Position, PositionError> {
        Err(self.error)
    }
}

/// Guard against overlapping location queries.
#[derive(Debug, Clone, Default)]
pub struct LocationRequests {
    in_flight: Arc<AtomicBool>,
}

impl LocationRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a query as started.
    ///
    /// Fails with [`ErrorCode::RequestInFlight`] while another query holds its
    /// ticket. The ticket releases the slot when dropped.
    pub fn begin(&self) -> Result<RequestTicket> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Location request refused, another one is in flight");
            return Err(Error::request_in_flight());
        }

        Ok(RequestTicket {
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Held while a location query is pending.
#[derive(Debug)]
pub struct RequestTicket {
    in_flight: Arc<AtomicBool>,
}

impl Drop for RequestTicket {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}
