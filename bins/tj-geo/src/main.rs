//! tj-geo - coordinate correction for TimeJourney
//!
//! Converts WGS84 positions captured on a device into the GCJ-02 frame used
//! by regionally offset map tiles, and back.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use timejourney_cli::output::{format_coordinate, format_count, format_distance, format_duration, Status};
use timejourney_cli::progress;
use timejourney_core::config::{Config, OutputFormat, MAX_PRECISION};
use timejourney_core::error::{exit_codes, Error, Result, ResultExt};
use timejourney_geo::batch::PointItem;
use timejourney_geo::{
    correct, correct_points, correct_track, is_in_correction_region, restore_with, summarize_track,
    GeoError, GeoPoint, TrackSummary,
};
use timejourney_telemetry::{metrics, TelemetryConfig, Timer};

#[derive(Parser)]
#[command(name = "tj-geo")]
#[command(about = "Correct WGS84 coordinates for GCJ-02 map tiles")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Decimals printed for degree values
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(0..=MAX_PRECISION as i64))]
    precision: Option<u8>,

    /// Path to a configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Correct a WGS84 coordinate into GCJ-02
    Correct {
        /// Latitude in degrees
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        /// Longitude in degrees
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Convert a GCJ-02 coordinate back into WGS84
    Restore {
        /// Latitude in degrees
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        /// Longitude in degrees
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Check whether the correction applies at a coordinate
    Region {
        /// Latitude in degrees
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        /// Longitude in degrees
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Correct a JSON array of places ({"id", "latitude", "longitude"})
    Batch {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Correct a recorded track (JSON array of {"latitude", "longitude"})
    Track {
        /// Path to the JSON file
        file: PathBuf,
    },
}

/// Settings resolved from the config file and command-line overrides.
struct Settings {
    json: bool,
    precision: usize,
    config: Config,
}

#[derive(Serialize)]
struct ConversionReport {
    input: GeoPoint,
    output: GeoPoint,
    in_region: bool,
    shift_meters: f64,
}

#[derive(Serialize)]
struct TrackReport {
    points: Vec<GeoPoint>,
    summary: TrackSummary,
}

fn main() {
    let cli = Cli::parse();
    let json_requested = cli.json;

    let exit_code = match run(cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err((e, json)) => {
            report_error(&e, json || json_requested);
            e.exit_code()
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> std::result::Result<(), (Error, bool)> {
    let config = Config::load(cli.config.as_deref()).map_err(|e| (e, false))?;

    let settings = Settings {
        json: cli.json || config.schema.output.format == OutputFormat::Json,
        precision: cli.precision.map_or(config.schema.output.precision, usize::from),
        config,
    };
    let json = settings.json;

    init_logging(&settings, cli.verbose).map_err(|e| (e, json))?;

    let result = match cli.command {
        Commands::Correct { latitude, longitude } => run_correct(GeoPoint::new(latitude, longitude), &settings),
        Commands::Restore { latitude, longitude } => run_restore(GeoPoint::new(latitude, longitude), &settings),
        Commands::Region { latitude, longitude } => run_region(GeoPoint::new(latitude, longitude), &settings),
        Commands::Batch { file } => run_batch(&file, &settings),
        Commands::Track { file } => run_track(&file, &settings),
    };

    tracing::debug!(metrics = %metrics().export_json(), "Session metrics");

    result.map_err(|e| (e, json))
}

fn init_logging(settings: &Settings, verbose: bool) -> Result<()> {
    let logging = &settings.config.schema.logging;
    let config = TelemetryConfig {
        log_level: if verbose { "debug".to_string() } else { logging.level.clone() },
        show_target: logging.show_target,
        show_thread_ids: logging.show_thread_ids,
        show_file: logging.show_location,
        show_line_number: logging.show_location,
    };

    timejourney_telemetry::init_with_config(config)
        .map_err(|e| Error::config(e.to_string()).with_context("Setting up logging"))?;

    if let Some(path) = &settings.config.path {
        tracing::debug!(path = %path.display(), "Loaded configuration");
    }
    Ok(())
}

fn run_correct(point: GeoPoint, settings: &Settings) -> Result<()> {
    let corrected = correct(point).map_err(geo_error)?;
    metrics().increment("points_corrected");

    let report = ConversionReport {
        input: point,
        output: corrected,
        in_region: is_in_correction_region(point),
        shift_meters: point.distance_to(&corrected),
    };
    tracing::info!(
        latitude = corrected.latitude,
        longitude = corrected.longitude,
        in_region = report.in_region,
        "Corrected coordinate"
    );

    print_conversion(&report, "WGS84", "GCJ-02", settings)
}

fn run_restore(point: GeoPoint, settings: &Settings) -> Result<()> {
    let restore = &settings.config.schema.restore;
    let restored = restore_with(point, restore.tolerance, restore.max_iterations).map_err(geo_error)?;
    metrics().increment("points_restored");

    let report = ConversionReport {
        input: point,
        output: restored,
        in_region: is_in_correction_region(restored),
        shift_meters: point.distance_to(&restored),
    };
    tracing::info!(
        latitude = restored.latitude,
        longitude = restored.longitude,
        "Restored coordinate"
    );

    print_conversion(&report, "GCJ-02", "WGS84", settings)
}

fn run_region(point: GeoPoint, settings: &Settings) -> Result<()> {
    let point = point.validate().map_err(geo_error)?;
    let in_region = is_in_correction_region(point);

    if settings.json {
        print_json(&serde_json::json!({ "point": point, "in_region": in_region }))
    } else {
        let coordinate = format_coordinate(point.latitude, point.longitude, settings.precision);
        if in_region {
            Status::success(&format!("{coordinate} is inside the correction region"));
        } else {
            Status::info(&format!("{coordinate} is outside the correction region"));
        }
        Ok(())
    }
}

fn run_batch(file: &Path, settings: &Settings) -> Result<()> {
    let items: Vec<PointItem> = read_json(file)?;

    let pb = if settings.json { progress::hidden() } else { progress::spinner("Correcting places...") };
    let timer = Timer::start("batch_ms");
    let results = correct_points(&items);
    let elapsed = timer.stop();

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let shifted = results.iter().filter(|r| r.shifted).count();
    metrics().increment_by("points_corrected", (results.len() - failed) as u64);
    metrics().increment_by("points_invalid", failed as u64);
    tracing::info!(total = results.len(), shifted, failed, "Batch corrected");

    if failed == 0 {
        progress::finish_success(&pb, &format!("Corrected {}", format_count(results.len(), "place", "places")));
    } else {
        progress::finish_error(&pb, &format_count(failed, "invalid place", "invalid places"));
    }

    if settings.json {
        print_json(&results)?;
    } else {
        Status::header("Batch correction");
        for result in &results {
            match (&result.point, &result.error) {
                (Some(point), _) => Status::field(
                    &format!("#{}", result.id),
                    &format_coordinate(point.latitude, point.longitude, settings.precision),
                ),
                (None, Some(error)) => Status::error(&format!("#{}: {}", result.id, error)),
                (None, None) => {}
            }
        }
        println!();
        Status::info(&format!(
            "{} moved, {} unchanged, {} in {}",
            shifted,
            results.len() - failed - shifted,
            format_count(failed, "invalid", "invalid"),
            format_duration(elapsed)
        ));
    }

    if failed > 0 {
        return Err(Error::invalid_coordinate(format!(
            "{} of {} places have invalid coordinates",
            failed,
            results.len()
        ))
        .with_context(format!("While correcting {}", file.display())));
    }
    Ok(())
}

fn run_track(file: &Path, settings: &Settings) -> Result<()> {
    let points: Vec<GeoPoint> = read_json(file)?;
    if points.is_empty() {
        return Err(Error::input(format!("Track {} has no points", file.display())));
    }

    timejourney_telemetry::timed_span!("track_correction", points = points.len());
    let corrected = correct_track(&points)
        .map_err(geo_error)
        .context(format!("While correcting {}", file.display()))?;
    metrics().increment_by("points_corrected", corrected.len() as u64);

    let summary = summarize_track(&corrected)
        .ok_or_else(|| Error::input(format!("Track {} has no points", file.display())))?;
    tracing::info!(
        points = summary.point_count,
        distance_meters = summary.distance_meters,
        "Track corrected"
    );

    if settings.json {
        return print_json(&TrackReport { points: corrected, summary });
    }

    let p = settings.precision;
    Status::header("Track correction");
    Status::field("Points", &summary.point_count.to_string());
    Status::field("Distance", &format_distance(summary.distance_meters));
    Status::field("Start", &format_coordinate(summary.start.latitude, summary.start.longitude, p));
    Status::field("End", &format_coordinate(summary.end.latitude, summary.end.longitude, p));
    Status::field(
        "Bounds",
        &format!(
            "{} to {}",
            format_coordinate(summary.bounds.min_latitude, summary.bounds.min_longitude, p),
            format_coordinate(summary.bounds.max_latitude, summary.bounds.max_longitude, p)
        ),
    );
    Ok(())
}

fn print_conversion(report: &ConversionReport, from: &str, to: &str, settings: &Settings) -> Result<()> {
    if settings.json {
        return print_json(report);
    }

    let p = settings.precision;
    Status::header(&format!("{from} → {to}"));
    Status::field(from, &format_coordinate(report.input.latitude, report.input.longitude, p));
    Status::field(to, &format_coordinate(report.output.latitude, report.output.longitude, p));
    if report.in_region {
        Status::field("Shift", &format_distance(report.shift_meters));
    } else {
        Status::info("Outside the correction region; coordinates unchanged");
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(file: &Path) -> Result<T> {
    let content = std::fs::read_to_string(file)
        .map_err(Error::from)
        .context(format!("Reading {}", file.display()))?;
    serde_json::from_str(&content)
        .map_err(Error::from)
        .context(format!("Parsing {}", file.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn geo_error(err: GeoError) -> Error {
    match err {
        GeoError::InvalidCoordinate(message) => Error::invalid_coordinate(message),
        GeoError::NotConverged { .. } => Error::not_converged(err.to_string()),
        GeoError::Json(e) => Error::from(e),
    }
}

fn report_error(err: &Error, json: bool) {
    tracing::debug!(code = %err.code, category = err.code.category(), "Command failed");
    if json {
        match serde_json::to_string(&err.to_report()) {
            Ok(report) => eprintln!("{report}"),
            Err(_) => Status::error(&err.to_string()),
        }
    } else {
        Status::error(&err.to_string());
    }
}
