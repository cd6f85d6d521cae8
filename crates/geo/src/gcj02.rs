//! WGS84 to GCJ-02 coordinate correction.
//!
//! Consumer map tile sources inside mainland China draw their tiles in GCJ-02,
//! a frame that differs from the WGS84 positions reported by GPS receivers by a
//! smooth, position-dependent offset of a few hundred meters. Positions captured
//! on a device must be corrected before they are placed on such a map.
//!
//! The offset is only applied inside a fixed rectangular region. Everything
//! outside it passes through untouched, which means the correction jumps at the
//! region edges: a point just inside the edge moves, its neighbour just outside
//! does not. That discontinuity is part of the published algorithm and is kept.

use std::f64::consts::PI;

use crate::{GeoError, GeoPoint, Result};

/// Semi-major axis of the Krasovsky 1940 ellipsoid, in meters.
pub const SEMI_MAJOR_AXIS: f64 = 6_378_245.0;

/// First eccentricity squared of the Krasovsky 1940 ellipsoid.
pub const ECCENTRICITY_SQUARED: f64 = 0.006_693_421_622_965_943_23;

/// Region where the offset applies; edges are inclusive.
pub const REGION_MIN_LONGITUDE: f64 = 72.004;
/// Eastern edge of the correction region.
pub const REGION_MAX_LONGITUDE: f64 = 137.8347;
/// Southern edge of the correction region.
pub const REGION_MIN_LATITUDE: f64 = 0.8293;
/// Northern edge of the correction region.
pub const REGION_MAX_LATITUDE: f64 = 55.8271;

/// Default convergence tolerance for [`restore`], in degrees.
pub const DEFAULT_RESTORE_TOLERANCE: f64 = 1e-10;

/// Default iteration limit for [`restore`].
pub const DEFAULT_RESTORE_MAX_ITERATIONS: u32 = 30;

/// Corrects a WGS84 point into the GCJ-02 frame.
///
/// Points outside the correction region are returned unchanged, bit for bit.
///
/// # Errors
/// Returns [`GeoError::InvalidCoordinate`] for NaN, infinite or out-of-range
/// input.
///
/// # Example
/// ```
/// use timejourney_geo::{correct, GeoPoint};
///
/// let paris = GeoPoint::new(48.8566, 2.3522);
/// assert_eq!(correct(paris).unwrap(), paris);
///
/// let beijing = correct(GeoPoint::new(39.9042, 116.4074)).unwrap();
/// assert!((beijing.longitude - 116.41364).abs() < 1e-5);
/// ```
pub fn correct(point: GeoPoint) -> Result<GeoPoint> {
    let point = point.validate()?;
    Ok(correct_unchecked(point))
}

/// Plain-pair form of [`correct`], for callers that do not carry a [`GeoPoint`].
///
/// # Errors
/// Same as [`correct`].
pub fn wgs84_to_gcj02(latitude: f64, longitude: f64) -> Result<(f64, f64)> {
    let corrected = correct(GeoPoint::new(latitude, longitude))?;
    Ok((corrected.latitude, corrected.longitude))
}

/// Returns the `(latitude, longitude)` offset in degrees that [`correct`] adds.
///
/// Zero outside the correction region.
///
/// # Errors
/// Same as [`correct`].
pub fn correction_offset(point: GeoPoint) -> Result<(f64, f64)> {
    let point = point.validate()?;
    if !is_in_correction_region(point) {
        return Ok((0.0, 0.0));
    }
    Ok(offset(point))
}

/// Returns true if the point lies inside the region where the offset applies.
#[inline]
pub fn is_in_correction_region(point: GeoPoint) -> bool {
    (REGION_MIN_LONGITUDE..=REGION_MAX_LONGITUDE).contains(&point.longitude)
        && (REGION_MIN_LATITUDE..=REGION_MAX_LATITUDE).contains(&point.latitude)
}

/// Converts a GCJ-02 point back into WGS84 with the default tolerance.
///
/// # Errors
/// See [`restore_with`].
pub fn restore(point: GeoPoint) -> Result<GeoPoint> {
    restore_with(point, DEFAULT_RESTORE_TOLERANCE, DEFAULT_RESTORE_MAX_ITERATIONS)
}

/// Converts a GCJ-02 point back into WGS84.
///
/// The forward correction has no closed-form inverse, so the WGS84 position is
/// found by fixed-point iteration: apply the offset to the current estimate,
/// subtract the residual against the target, repeat until both residual
/// components are below `tolerance` degrees. The offset varies slowly, so three
/// or four rounds are typical.
///
/// The iteration always applies the offset formula, even when the estimate
/// strays past the region edge, and only checks membership once it has
/// settled. A point corrected just inside the eastern or northern edge can
/// land outside the region; it is still restored to its in-region origin.
///
/// Such a target is ambiguous: it is also its own preimage, because points
/// outside the region are never moved. When both exist the in-region preimage
/// wins. A target outside the region with no in-region preimage is returned
/// unchanged.
///
/// # Errors
/// Returns [`GeoError::InvalidCoordinate`] for invalid input or a non-positive
/// tolerance. Returns [`GeoError::NotConverged`] when `max_iterations` is spent,
/// or when the target lies inside the region but no point corrects onto it
/// (the strip just inside the western and southern edges).
pub fn restore_with(point: GeoPoint, tolerance: f64, max_iterations: u32) -> Result<GeoPoint> {
    let target = point.validate()?;
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(GeoError::InvalidCoordinate(format!(
            "restore tolerance must be a positive number, got {tolerance}"
        )));
    }

    // Nothing further out than the largest offset can have been moved here.
    if !is_near_correction_region(target, RESTORE_SEARCH_MARGIN) {
        return Ok(target);
    }

    if let Some(origin) = solve_offset(target, tolerance, max_iterations) {
        if is_near_correction_region(origin, tolerance) {
            return Ok(origin);
        }
    }

    if is_in_correction_region(target) {
        return Err(GeoError::NotConverged {
            iterations: max_iterations,
        });
    }
    Ok(target)
}

/// Farther than any offset the correction produces, in degrees.
const RESTORE_SEARCH_MARGIN: f64 = 0.02;

fn is_near_correction_region(point: GeoPoint, margin: f64) -> bool {
    (REGION_MIN_LONGITUDE - margin..=REGION_MAX_LONGITUDE + margin).contains(&point.longitude)
        && (REGION_MIN_LATITUDE - margin..=REGION_MAX_LATITUDE + margin).contains(&point.latitude)
}

/// Finds `p` with `p + offset(p) == target`, ignoring region membership.
fn solve_offset(target: GeoPoint, tolerance: f64, max_iterations: u32) -> Option<GeoPoint> {
    let mut estimate = target;
    for _ in 0..max_iterations {
        let (offset_lat, offset_lon) = offset(estimate);
        let d_lat = estimate.latitude + offset_lat - target.latitude;
        let d_lon = estimate.longitude + offset_lon - target.longitude;
        if d_lat.abs() < tolerance && d_lon.abs() < tolerance {
            return Some(estimate);
        }
        estimate = GeoPoint::new(estimate.latitude - d_lat, estimate.longitude - d_lon);
    }
    None
}

#[inline]
fn correct_unchecked(point: GeoPoint) -> GeoPoint {
    if !is_in_correction_region(point) {
        return point;
    }
    let (d_lat, d_lon) = offset(point);
    GeoPoint::new(point.latitude + d_lat, point.longitude + d_lon)
}

/// Offset in degrees, without the region check.
fn offset(point: GeoPoint) -> (f64, f64) {
    let x = point.longitude - 105.0;
    let y = point.latitude - 35.0;
    let d_lat = transform_lat(x, y);
    let d_lon = transform_lon(x, y);

    let rad_lat = point.latitude / 180.0 * PI;
    let magic = 1.0 - ECCENTRICITY_SQUARED * rad_lat.sin() * rad_lat.sin();
    let sqrt_magic = magic.sqrt();

    let d_lat = (d_lat * 180.0)
        / ((SEMI_MAJOR_AXIS * (1.0 - ECCENTRICITY_SQUARED)) / (magic * sqrt_magic) * PI);
    let d_lon = (d_lon * 180.0) / (SEMI_MAJOR_AXIS / sqrt_magic * rad_lat.cos() * PI);

    (d_lat, d_lon)
}

fn transform_lat(x: f64, y: f64) -> f64 {
    let mut ret = -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn transform_lon(x: f64, y: f64) -> f64 {
    let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}
