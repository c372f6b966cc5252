//! Core of pinmap: saved locations and the map workflows around them
//!
//! This crate provides the pieces every pinmap host shares:
//!
//! - **Error handling**: errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with defaults
//! - **Storage**: local-storage style key/value backends
//! - **Location store**: the persisted, append-only list of named points
//! - **Geolocation**: position providers and the in-flight guard
//! - **Adapters**: dialog and map surface contracts
//! - **Session**: click-to-save and nearest-location workflows
//!
//! # Example
//!
//! ```rust
//! use pinmap_core::prelude::*;
//! use pinmap_geo::GeoPoint;
//!
//! let mut store = LocationStore::open(MemoryStorage::new());
//! store.append("Gedung Sate", GeoPoint::new(107.6191, -6.9025)).unwrap();
//!
//! let nearest = store.nearest(&GeoPoint::new(107.61, -6.915)).unwrap();
//! assert_eq!(nearest.entry.name(), "Gedung Sate");
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dialog;
pub mod error;
pub mod geolocation;
pub mod map;
pub mod session;
pub mod storage;
pub mod store;

pub use error::{Error, ErrorCode, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::dialog::{Dialog, Notice, NoticeLevel, NoticeLine, TextPrompt};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result};
    pub use crate::geolocation::{
        FailingLocationProvider, FixedLocationProvider, GeolocationOptions, LocationProvider,
        LocationRequests, Position, PositionError,
    };
    pub use crate::map::MapSurface;
    pub use crate::session::{ClickOutcome, MapSession, NearestOutcome};
    pub use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage};
    pub use crate::store::{LocationStore, SavedLocation, LOCATIONS_KEY};
}
