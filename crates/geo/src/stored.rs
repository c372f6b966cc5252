//! Location lists as persisted in local storage.
//!
//! Entries are read leniently. Whatever an entry holds is kept as raw JSON,
//! and an entry whose coordinate is not a lon/lat pair is only skipped when
//! searching.

use crate::{find_nearest, GeoPoint, Located, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of a persisted location array, exactly as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredEntry(pub Value);

impl StoredEntry {
    /// The `name` member, if it is a string.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// The `coordinate` member as stored, if present.
    pub fn coordinate(&self) -> Option<&Value> {
        self.0.get("coordinate")
    }
}

impl Located for StoredEntry {
    fn position(&self) -> Option<GeoPoint> {
        self.coordinate().and_then(GeoPoint::from_json)
    }
}

/// Parse a persisted location array.
///
/// Fails only when the text is not a JSON array.
pub fn parse_stored(locations_json: &str) -> Result<Vec<StoredEntry>> {
    Ok(serde_json::from_str(locations_json)?)
}

/// The entry nearest to `query` as `{"index", "name", "coordinate", "distance_km"}`.
///
/// `name` and `coordinate` are echoed as stored.
pub fn nearest_stored(query: &GeoPoint, locations_json: &str) -> Result<Option<Value>> {
    let entries = parse_stored(locations_json)?;

    Ok(find_nearest(query, &entries).map(|nearest| {
        serde_json::json!({
            "index": nearest.index,
            "name": nearest.entry.0.get("name"),
            "coordinate": nearest.entry.coordinate(),
            "distance_km": nearest.distance_km,
        })
    }))
}
