//! Coordinate correction and geospatial utilities for TimeJourney.
//!
//! This crate provides:
//! - WGS84 to GCJ-02 correction for display on regionally offset map tiles
//! - The inverse correction for storing map-picked points in WGS84
//! - Haversine distance calculations
//! - Batch and route-track correction with optional parallelism
//! - WASM bindings for browser usage
//!
//! # Example
//!
//! ```
//! use timejourney_geo::{correct, GeoPoint};
//!
//! let beijing = GeoPoint::new(39.9042, 116.4074);
//! let on_map = correct(beijing).unwrap();
//!
//! assert!(on_map != beijing);
//! assert!(beijing.distance_to(&on_map) < 1000.0);
//! ```

mod error;
mod gcj02;
mod haversine;
pub mod batch;

#[cfg(feature = "wasm")]
mod wasm;

pub use batch::{
    correct_points, correct_track, parse_point_items, summarize_track, CorrectionResult, TrackSummary,
};
pub use error::{GeoError, GeoErrorCode, Result};
pub use gcj02::{
    correct, correction_offset, is_in_correction_region, restore, restore_with, wgs84_to_gcj02,
    DEFAULT_RESTORE_MAX_ITERATIONS, DEFAULT_RESTORE_TOLERANCE, ECCENTRICITY_SQUARED,
    REGION_MAX_LATITUDE, REGION_MAX_LONGITUDE, REGION_MIN_LATITUDE, REGION_MIN_LONGITUDE,
    SEMI_MAJOR_AXIS,
};
pub use haversine::{haversine_distance, haversine_distance_meters, EARTH_RADIUS_KM, EARTH_RADIUS_M};

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a new point. No validation happens here; see [`GeoPoint::validate`].
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Returns true if both axes are finite and within their degree ranges.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Returns the point itself if valid, otherwise [`GeoError::InvalidCoordinate`].
    ///
    /// NaN fails every comparison, so it is rejected together with infinities
    /// and out-of-range values.
    #[inline]
    pub fn validate(self) -> Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(GeoError::invalid(self.latitude, self.longitude))
        }
    }

    /// Great-circle distance to another point, in meters.
    #[inline]
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_distance_meters(self, other)
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl From<GeoPoint> for (f64, f64) {
    fn from(point: GeoPoint) -> Self {
        (point.latitude, point.longitude)
    }
}
