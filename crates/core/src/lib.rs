//! Core utilities for TimeJourney tools
//!
//! Shared functionality used by the command-line front end:
//!
//! - **Error handling**: coded errors with context and recovery suggestions
//! - **Configuration**: TOML-based configuration with validation
//!
//! # Example
//!
//! ```rust,no_run
//! use timejourney_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! println!("printing {} decimals", config.schema.output.precision);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;

pub use error::{Error, ErrorCode, Result, ResultExt};
