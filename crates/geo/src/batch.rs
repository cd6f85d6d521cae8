//! Batch and route-track correction with optional parallelism.
//!
//! Stored places are corrected independently: a bad coordinate on one place
//! must not hide the others, so [`correct_points`] reports per-item errors.
//! Recorded tracks are all-or-nothing, since a track with a hole in it would
//! draw a wrong polyline.

use crate::{correct, GeoPoint, Result};
use serde::{Deserialize, Serialize};

/// Input item for batch correction, typically a stored place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointItem {
    /// Item ID
    pub id: i64,
    /// Latitude in WGS84 degrees
    pub latitude: f64,
    /// Longitude in WGS84 degrees
    pub longitude: f64,
}

/// Result of correcting a single item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionResult {
    /// The item ID
    pub id: i64,
    /// Corrected point, `None` when the input was invalid
    pub point: Option<GeoPoint>,
    /// True when the point fell inside the correction region and moved
    pub shifted: bool,
    /// Validation error for invalid input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Latitude/longitude extent of a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Southernmost latitude
    pub min_latitude: f64,
    /// Westernmost longitude
    pub min_longitude: f64,
    /// Northernmost latitude
    pub max_latitude: f64,
    /// Easternmost longitude
    pub max_longitude: f64,
}

impl Bounds {
    fn from_point(point: GeoPoint) -> Self {
        Self {
            min_latitude: point.latitude,
            min_longitude: point.longitude,
            max_latitude: point.latitude,
            max_longitude: point.longitude,
        }
    }

    fn extend(mut self, point: GeoPoint) -> Self {
        self.min_latitude = self.min_latitude.min(point.latitude);
        self.min_longitude = self.min_longitude.min(point.longitude);
        self.max_latitude = self.max_latitude.max(point.latitude);
        self.max_longitude = self.max_longitude.max(point.longitude);
        self
    }

    /// Returns true if the point lies within the bounds, edges included.
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&point.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&point.longitude)
    }
}

/// Summary metrics of a recorded route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSummary {
    /// Number of points in the track
    pub point_count: usize,
    /// Sum of the great-circle legs between consecutive points, in meters
    pub distance_meters: f64,
    /// First point
    pub start: GeoPoint,
    /// Last point
    pub end: GeoPoint,
    /// Extent of all points
    pub bounds: Bounds,
}

/// Correct many points at once.
///
/// Returns one result per input item, in input order.
///
/// # Example
/// ```
/// use timejourney_geo::{batch::PointItem, correct_points};
///
/// let items = vec![
///     PointItem { id: 1, latitude: 39.9042, longitude: 116.4074 },
///     PointItem { id: 2, latitude: 48.8566, longitude: 2.3522 },
///     PointItem { id: 3, latitude: f64::NAN, longitude: 0.0 },
/// ];
///
/// let results = correct_points(&items);
/// assert!(results[0].shifted);
/// assert!(!results[1].shifted);
/// assert!(results[2].error.is_some());
/// ```
pub fn correct_points(items: &[PointItem]) -> Vec<CorrectionResult> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        items.par_iter().map(correct_single).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        items.iter().map(correct_single).collect()
    }
}

/// Parse a JSON array of `{"id", "latitude", "longitude"}` items.
///
/// # Errors
/// Returns [`GeoError::Json`](crate::GeoError::Json) for malformed input.
pub fn parse_point_items(json: &str) -> Result<Vec<PointItem>> {
    Ok(serde_json::from_str(json)?)
}

/// Correct every point of a recorded track.
///
/// # Errors
/// Fails with the first invalid point's error; no partial track is returned.
pub fn correct_track(points: &[GeoPoint]) -> Result<Vec<GeoPoint>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        points.par_iter().map(|p| correct(*p)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        points.iter().map(|p| correct(*p)).collect()
    }
}

/// Summarize a track: length, endpoints and extent. `None` for an empty track.
pub fn summarize_track(points: &[GeoPoint]) -> Option<TrackSummary> {
    let (&start, rest) = points.split_first()?;
    let end = *points.last()?;

    let distance_meters = points
        .windows(2)
        .map(|leg| leg[0].distance_to(&leg[1]))
        .sum();

    let bounds = rest
        .iter()
        .fold(Bounds::from_point(start), |bounds, p| bounds.extend(*p));

    Some(TrackSummary {
        point_count: points.len(),
        distance_meters,
        start,
        end,
        bounds,
    })
}

#[inline]
fn correct_single(item: &PointItem) -> CorrectionResult {
    let input = GeoPoint::new(item.latitude, item.longitude);
    match correct(input) {
        Ok(point) => CorrectionResult {
            id: item.id,
            point: Some(point),
            shifted: point != input,
            error: None,
        },
        Err(e) => CorrectionResult {
            id: item.id,
            point: None,
            shifted: false,
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeoError;

    fn create_test_items() -> Vec<PointItem> {
        vec![
            // Beijing
            PointItem { id: 1, latitude: 39.9042, longitude: 116.4074 },
            // Paris
            PointItem { id: 2, latitude: 48.8566, longitude: 2.3522 },
            // Shanghai
            PointItem { id: 3, latitude: 31.2304, longitude: 121.4737 },
            // Invalid location
            PointItem { id: 4, latitude: 120.0, longitude: 0.0 },
        ]
    }

    fn walk_in_beijing() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(39.9042, 116.4074),
            GeoPoint::new(39.9142, 116.4074),
            GeoPoint::new(39.9142, 116.4174),
        ]
    }

    #[test]
    fn test_batch_keeps_order_and_ids() {
        let items = create_test_items();
        let results = correct_points(&items);

        let ids: Vec<i64> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_batch_flags_shifted_points() {
        let results = correct_points(&create_test_items());

        assert!(results[0].shifted);
        assert!(!results[1].shifted);
        assert_eq!(results[1].point, Some(GeoPoint::new(48.8566, 2.3522)));
        assert!(results[2].shifted);
    }

    #[test]
    fn test_batch_isolates_invalid_item() {
        let results = correct_points(&create_test_items());

        let invalid = results.iter().find(|r| r.id == 4).unwrap();
        assert!(invalid.point.is_none());
        assert!(invalid.error.as_deref().unwrap().contains("Invalid coordinate"));
        assert!(results.iter().filter(|r| r.id != 4).all(|r| r.error.is_none()));
    }

    #[test]
    fn test_batch_result_json_omits_missing_error() {
        let results = correct_points(&create_test_items()[1..2]);
        let json = serde_json::to_value(&results[0]).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["shifted"], serde_json::json!(false));
    }

    #[test]
    fn test_parse_point_items() {
        let items = parse_point_items(r#"[{"id": 7, "latitude": 39.9042, "longitude": 116.4074}]"#).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 7);

        let err = parse_point_items(r#"[{"id": 7, "latitude": "north"}]"#).unwrap_err();
        assert!(matches!(err, GeoError::Json(_)));
        assert_eq!(err.code(), crate::GeoErrorCode::JsonParsing);
    }

    #[test]
    fn test_track_correction_matches_single_correction() {
        let track = walk_in_beijing();
        let corrected = correct_track(&track).unwrap();

        assert_eq!(corrected.len(), track.len());
        for (raw, fixed) in track.iter().zip(&corrected) {
            assert_eq!(*fixed, correct(*raw).unwrap());
        }
    }

    #[test]
    fn test_track_with_invalid_point_fails() {
        let mut track = walk_in_beijing();
        track.push(GeoPoint::new(f64::NAN, 116.0));

        let err = correct_track(&track).unwrap_err();
        assert!(matches!(err, GeoError::InvalidCoordinate(_)));
    }

    #[test]
    fn test_summary_of_empty_track() {
        assert!(summarize_track(&[]).is_none());
    }

    #[test]
    fn test_summary_of_single_point() {
        let p = GeoPoint::new(39.9042, 116.4074);
        let summary = summarize_track(&[p]).unwrap();
        assert_eq!(summary.point_count, 1);
        assert_eq!(summary.distance_meters, 0.0);
        assert_eq!(summary.start, p);
        assert_eq!(summary.end, p);
        assert!(summary.bounds.contains(p));
    }

    #[test]
    fn test_summary_distance_and_bounds() {
        let track = walk_in_beijing();
        let summary = summarize_track(&track).unwrap();

        // ~1112 m north, then ~853 m east
        assert!((summary.distance_meters - 1964.8).abs() < 1.0, "{}", summary.distance_meters);
        assert_eq!(summary.start, track[0]);
        assert_eq!(summary.end, track[2]);
        assert_eq!(summary.bounds.min_latitude, 39.9042);
        assert_eq!(summary.bounds.max_latitude, 39.9142);
        assert_eq!(summary.bounds.min_longitude, 116.4074);
        assert_eq!(summary.bounds.max_longitude, 116.4174);
    }
}
