//! Saved locations and their persistence
//!
//! The store is an append-only list of named points mirrored in key/value
//! storage as one JSON array:
//!
//! ```json
//! [{ "name": "Gedung Sate", "coordinate": [107.6191, -6.9025] }]
//! ```
//!
//! Every append rewrites the whole array. Loading never fails: missing or
//! unreadable data yields an empty list, and a malformed entry only hides
//! itself.

use crate::error::{Error, ErrorCode, Result};
use crate::storage::KeyValueStorage;
use pinmap_geo::{
    find_nearest, rank_by_distance, within_radius, GeoPoint, Located, Nearest, RankedEntry,
    StoredEntry,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Storage key of the location list.
pub const LOCATIONS_KEY: &str = "locations";

/// A named point saved by the user.
///
/// The entry is kept exactly as persisted, so a damaged one (a non-string
/// name, a coordinate that is not two numbers) still loads, is skipped by
/// searches, and is written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedLocation {
    entry: StoredEntry,
}

impl SavedLocation {
    /// Create a location with its display summary.
    pub fn new(name: impl Into<String>, point: GeoPoint) -> Self {
        let name = name.into();
        let content = format!("<strong>{}</strong><br>Koordinat: {}", name, point);
        Self {
            entry: StoredEntry(json!({
                "name": name,
                "coordinate": [point.longitude, point.latitude],
                "content": content,
            })),
        }
    }

    /// The stored name; empty when it is missing or not a string.
    pub fn name(&self) -> &str {
        self.entry.name().unwrap_or_default()
    }

    /// The coordinate as stored, if present.
    pub fn coordinate(&self) -> Option<&Value> {
        self.entry.coordinate()
    }

    /// Display summary written alongside new entries
    pub fn content(&self) -> Option<&str> {
        self.entry.0.get("content").and_then(Value::as_str)
    }

    /// The coordinate, if it is a well-formed lon/lat pair.
    pub fn point(&self) -> Option<GeoPoint> {
        self.entry.position()
    }
}

impl Located for SavedLocation {
    fn position(&self) -> Option<GeoPoint> {
        self.point()
    }
}

/// Read the location list under `key`, failing open to an empty list.
pub fn load_locations<S: KeyValueStorage + ?Sized>(storage: &S, key: &str) -> Vec<SavedLocation> {
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Could not read saved locations, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<SavedLocation>>(&raw) {
        Ok(locations) => locations,
        Err(e) => {
            tracing::warn!(key, error = %e, "Saved locations are malformed, starting empty");
            Vec::new()
        }
    }
}

/// The saved location list with write-through persistence.
#[derive(Debug)]
pub struct LocationStore<S> {
    storage: S,
    key: String,
    locations: Vec<SavedLocation>,
}

impl<S: KeyValueStorage> LocationStore<S> {
    /// Open the store under the default key and load what is persisted.
    pub fn open(storage: S) -> Self {
        Self::open_with_key(storage, LOCATIONS_KEY)
    }

    /// Open the store under a custom key.
    pub fn open_with_key(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let locations = load_locations(&storage, &key);
        tracing::debug!(key = %key, count = locations.len(), "Loaded saved locations");

        Self {
            storage,
            key,
            locations,
        }
    }

    /// Re-read the persisted list.
    pub fn load(&self) -> Vec<SavedLocation> {
        load_locations(&self.storage, &self.key)
    }

    /// Save a new named location and persist the whole list.
    ///
    /// The in-memory list is left untouched when persisting fails.
    pub fn append(&mut self, name: &str, coordinate: GeoPoint) -> Result<&SavedLocation> {
        if name.trim().is_empty() {
            return Err(Error::empty_name());
        }
        if !coordinate.longitude.is_finite() || !coordinate.latitude.is_finite() {
            return Err(Error::new(
                ErrorCode::InvalidCoordinate,
                format!("Coordinate for \"{}\" is not a finite number", name),
            ));
        }

        self.locations.push(SavedLocation::new(name, coordinate));

        if let Err(e) = self.persist() {
            self.locations.pop();
            return Err(e.with_context(format!("While saving \"{}\"", name)));
        }

        tracing::info!(name, %coordinate, total = self.locations.len(), "Saved location");
        Ok(&self.locations[self.locations.len() - 1])
    }

    fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.locations)?;
        self.storage.set_item(&self.key, &json)
    }

    /// All saved locations in save order
    pub fn locations(&self) -> &[SavedLocation] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SavedLocation> {
        self.locations.get(index)
    }

    /// First location saved under `name`.
    pub fn find_by_name(&self, name: &str) -> Option<(usize, &SavedLocation)> {
        self.locations
            .iter()
            .enumerate()
            .find(|(_, location)| location.name() == name)
    }

    /// The saved location closest to `query`.
    pub fn nearest(&self, query: &GeoPoint) -> Option<Nearest<'_, SavedLocation>> {
        find_nearest(query, &self.locations)
    }

    /// Saved locations by distance from `query`, closest first.
    pub fn ranked(&self, query: &GeoPoint, limit: Option<usize>) -> Vec<RankedEntry> {
        rank_by_distance(query, &self.locations, limit)
    }

    /// Saved locations within `radius_km` of `query`, closest first.
    pub fn within_radius(&self, query: &GeoPoint, radius_km: f64) -> Vec<RankedEntry> {
        within_radius(query, &self.locations, radius_km)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
