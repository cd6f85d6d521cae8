//! WASM bindings for the geo crate.
//!
//! These bindings let web map views correct device positions in the browser
//! without a server round-trip.

use crate::{
    correct, correct_points, is_in_correction_region, parse_point_items, restore, GeoError, GeoPoint,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn js_error(err: GeoError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_error(e.into()))
}

/// Correct a WGS84 coordinate into GCJ-02.
///
/// # Returns
/// JSON string `{"latitude": .., "longitude": ..}`
#[wasm_bindgen]
pub fn correct_coordinate(lat: f64, lng: f64) -> Result<String, JsValue> {
    let corrected = correct(GeoPoint::new(lat, lng)).map_err(js_error)?;
    to_json(&corrected)
}

/// Convert a GCJ-02 coordinate back into WGS84.
///
/// # Returns
/// JSON string `{"latitude": .., "longitude": ..}`
#[wasm_bindgen]
pub fn restore_coordinate(lat: f64, lng: f64) -> Result<String, JsValue> {
    let restored = restore(GeoPoint::new(lat, lng)).map_err(js_error)?;
    to_json(&restored)
}

/// Whether the offset applies at this coordinate.
#[wasm_bindgen]
pub fn in_correction_region(lat: f64, lng: f64) -> bool {
    is_in_correction_region(GeoPoint::new(lat, lng))
}

/// Correct a list of places.
///
/// # Arguments
/// * `points_json` - JSON array of `{"id", "latitude", "longitude"}`
///
/// # Returns
/// JSON array of correction results, one per input, in input order
#[wasm_bindgen]
pub fn correct_points_json(points_json: &str) -> Result<String, JsValue> {
    let items = parse_point_items(points_json).map_err(js_error)?;
    to_json(&correct_points(&items))
}
