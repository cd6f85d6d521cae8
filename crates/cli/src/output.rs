//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }

    /// Print an aligned `label: value` line
    pub fn field(label: &str, value: &str) {
        println!("  {:<10} {}", format!("{}:", label).dimmed(), value);
    }
}

/// Format a latitude/longitude pair with a fixed number of decimals
pub fn format_coordinate(latitude: f64, longitude: f64, precision: usize) -> String {
    format!("{:.*}, {:.*}", precision, latitude, precision, longitude)
}

/// Format a distance in meters, switching to kilometers from 1 km
pub fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.2} km", meters / 1000.0)
    } else {
        format!("{:.1} m", meters)
    }
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_coordinate_six_decimals() {
        assert_eq!(
            format_coordinate(39.90560334316507, 116.41364225378803, 6),
            "39.905603, 116.413642"
        );
    }

    #[test]
    fn test_format_coordinate_negative() {
        assert_eq!(format_coordinate(-33.8688, 151.2093, 2), "-33.87, 151.21");
    }

    #[test]
    fn test_format_distance_meters() {
        assert_eq!(format_distance(554.85), "554.9 m");
    }

    #[test]
    fn test_format_distance_km() {
        assert_eq!(format_distance(1964.8), "1.96 km");
    }

    #[test]
    fn test_format_duration_ms() {
        let d = Duration::from_millis(500);
        assert_eq!(format_duration(d), "500ms");
    }

    #[test]
    fn test_format_duration_mins() {
        let d = Duration::from_secs(125);
        assert_eq!(format_duration(d), "2m 5s");
    }

    #[test]
    fn test_format_count_singular() {
        assert_eq!(format_count(1, "point", "points"), "1 point");
    }

    #[test]
    fn test_format_count_plural() {
        assert_eq!(format_count(5, "point", "points"), "5 points");
    }
}
