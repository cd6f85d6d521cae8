//! Error types for the geo crate.

use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during geo operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Latitude/longitude is NaN, infinite or outside the valid degree range
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Inverse correction did not settle within the iteration limit
    #[error("Inverse correction did not converge after {iterations} iterations")]
    NotConverged {
        /// Iterations performed before giving up
        iterations: u32,
    },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error code for integration with timejourney-core error handling.
/// Range: 10xxx for geo errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Invalid coordinate values
    InvalidCoordinate = 10001,
    /// Inverse correction did not converge
    NotConverged = 10002,
    /// JSON parsing error
    JsonParsing = 10003,
}

impl GeoError {
    /// Returns the error code for this error.
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::InvalidCoordinate(_) => GeoErrorCode::InvalidCoordinate,
            GeoError::NotConverged { .. } => GeoErrorCode::NotConverged,
            GeoError::Json(_) => GeoErrorCode::JsonParsing,
        }
    }

    pub(crate) fn invalid(latitude: f64, longitude: f64) -> Self {
        GeoError::InvalidCoordinate(format!(
            "latitude {latitude} must be within [-90, 90] and longitude {longitude} within [-180, 180]"
        ))
    }
}
