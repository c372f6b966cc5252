//! WASM bindings for the geo crate.
//!
//! These bindings let the browser map page call into the same distance and
//! projection code as the native host. Location lists are passed as the JSON
//! array kept in local storage.

use crate::{
    distance_km as haversine_km, from_lon_lat as project, nearest_stored, parse_stored,
    rank_by_distance, to_lon_lat as unproject, GeoError, GeoPoint, ProjectedPoint,
};
use wasm_bindgen::prelude::*;

fn to_js(error: GeoError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Distance in kilometers between two lon/lat points.
#[wasm_bindgen]
pub fn distance_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    haversine_km(&GeoPoint::new(lon1, lat1), &GeoPoint::new(lon2, lat2))
}

/// Projects lon/lat to Web Mercator. Returns `[x, y]`.
#[wasm_bindgen]
pub fn from_lon_lat(lon: f64, lat: f64) -> js_sys::Float64Array {
    let projected = project(&GeoPoint::new(lon, lat));
    js_sys::Float64Array::from(&[projected.x, projected.y][..])
}

/// Converts a Web Mercator position to lon/lat. Returns `[lon, lat]`.
#[wasm_bindgen]
pub fn to_lon_lat(x: f64, y: f64) -> js_sys::Float64Array {
    let point = unproject(&ProjectedPoint::new(x, y));
    js_sys::Float64Array::from(&[point.longitude, point.latitude][..])
}

/// Finds the saved location nearest to the given position.
///
/// # Returns
/// JSON string `{"index", "name", "coordinate", "distance_km"}`, or `"null"`
/// when the list is empty or has no well-formed entry. Malformed entries are
/// skipped, not rejected.
#[wasm_bindgen]
pub fn find_nearest(lon: f64, lat: f64, locations_json: &str) -> Result<String, JsValue> {
    let nearest = nearest_stored(&GeoPoint::new(lon, lat), locations_json).map_err(to_js)?;
    Ok(nearest.map_or_else(|| "null".to_string(), |value| value.to_string()))
}

/// Ranks saved locations by distance.
///
/// # Arguments
/// * `max_results` - Maximum results to return (0 for all)
///
/// # Returns
/// JSON string of `{"index", "distance_km"}` objects, closest first
#[wasm_bindgen]
pub fn rank_locations(
    lon: f64,
    lat: f64,
    locations_json: &str,
    max_results: u32,
) -> Result<String, JsValue> {
    let entries = parse_stored(locations_json).map_err(to_js)?;

    let max = if max_results == 0 { None } else { Some(max_results as usize) };
    let results = rank_by_distance(&GeoPoint::new(lon, lat), &entries, max);

    serde_json::to_string(&results)
        .map_err(|e| JsValue::from_str(&format!("JSON serialize error: {}", e)))
}
