//! Configuration schema definitions

use crate::geolocation::GeolocationOptions;
use crate::session::{DEFAULT_CENTER, DEFAULT_FOCUS_ZOOM, DEFAULT_ZOOM};
use pinmap_geo::GeoPoint;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub geolocation: GeolocationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where saved locations are kept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// File backing the key/value store
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Key the location list is stored under
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            key: default_storage_key(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("pinmap")
        .join("local-storage.json")
}

fn default_storage_key() -> String {
    crate::store::LOCATIONS_KEY.to_string()
}

/// Initial map view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// View center as `[longitude, latitude]`
    #[serde(default = "default_center")]
    pub center: GeoPoint,

    /// Zoom level of the initial view
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Zoom level used when focusing a single location
    #[serde(default = "default_focus_zoom")]
    pub focus_zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: default_center(),
            zoom: default_zoom(),
            focus_zoom: default_focus_zoom(),
        }
    }
}

fn default_center() -> GeoPoint {
    DEFAULT_CENTER
}

fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}

fn default_focus_zoom() -> u8 {
    DEFAULT_FOCUS_ZOOM
}

/// Geolocation request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    #[serde(default = "default_true")]
    pub enable_high_accuracy: bool,

    /// Milliseconds to wait for a position
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Oldest acceptable cached position, in milliseconds
    #[serde(default)]
    pub maximum_age_ms: u64,

    /// Device position for hosts without a location service, as `[lon, lat]`
    #[serde(default)]
    pub position: Option<GeoPoint>,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: default_timeout_ms(),
            maximum_age_ms: 0,
            position: None,
        }
    }
}

impl GeolocationConfig {
    /// Request options derived from this section
    pub fn options(&self) -> GeolocationOptions {
        GeolocationOptions {
            enable_high_accuracy: self.enable_high_accuracy,
            timeout_ms: self.timeout_ms,
            maximum_age_ms: self.maximum_age_ms,
        }
    }
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_true() -> bool {
    true
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to this file instead of stderr
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
