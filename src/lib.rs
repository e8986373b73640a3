//! GPX Densify Library
//!
//! Fills temporal gaps in recorded GPS tracks. Every gap longer than one
//! second between two consecutive points is bridged with synthetic points
//! one second apart, linearly interpolated in latitude, longitude and (when
//! both ends have it) elevation. Recorded points are never changed.
//!
//! # Features
//!
//! - **`cli`** (default): Build the `gpx-densify` command-line binary
//! - **`parallel`**: Plan segments concurrently with rayon
//! - **`serde`**: Enable serialization/deserialization of types
//!
//! # Quick Start
//!
//! Densify a single segment:
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use gpx_densify::{interpolate_segment, Segment, TrackPoint};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let segment = Segment::new(vec![
//!     TrackPoint::new(0.0, 0.0).with_time(start),
//!     TrackPoint::new(4.0, 8.0).with_time(start + chrono::TimeDelta::seconds(4)),
//! ]);
//! let dense = interpolate_segment(&segment);
//! assert_eq!(dense.len(), 5);
//! ```
//!
//! Densify a GPX file:
//! ```rust,no_run
//! use gpx_densify::{densify_file, InterpolationOptions};
//! use std::path::Path;
//!
//! let report = densify_file(
//!     Path::new("ride.gpx"),
//!     Path::new("ride.1hz.gpx"),
//!     &InterpolationOptions::default(),
//! )
//! .unwrap();
//! println!("Inserted {} points", report.inserted_points);
//! ```
//!
//! # Public API
//!
//! ## Interpolation
//! - [`interpolate_segment`] - Densify a segment with default options
//! - [`interpolate_segment_with`] - Densify a segment with explicit options
//! - [`plan_segment`] - Low-level plan of originals and synthetic points
//!
//! ## Files and containers
//! - [`densify_file`] - Read, densify and write a GPX file
//! - [`densify_bytes`] - Densify an in-memory document of any [`TrackFormat`]
//! - [`densify_container`] - Densify every segment of a decoded document
//! - [`parse_gpx_str`] / [`parse_gpx_file`] - Read GPX into a [`GpxDocument`]
//! - [`encode_gpx`] / [`write_gpx_file`] - Write a [`GpxDocument`] back out
//!
//! ## Conversion Utilities
//! - [`parse_timestamp`] / [`format_timestamp`] - UTC timestamp handling
//! - [`format_coordinate`] / [`format_elevation`] - Fixed precision output

pub mod conversion;
pub mod densify;
pub mod error;
pub mod export;
pub mod interpolate;
pub mod parser;
pub mod types;

pub use conversion::*;
pub use densify::*;
pub use error::*;
pub use export::*;
pub use interpolate::*;
pub use parser::*;
pub use types::*;
