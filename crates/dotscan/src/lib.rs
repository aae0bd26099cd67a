//! High-level facade for the `dotscan-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core, scanning and projection crates
//! - a JSON session config ([`DotscanConfig`])
//! - an offline sweep runner that drives the scan line and scheduler over a
//!   still frame ([`sweep`])
//! - (feature `image`) conversion from `image` buffers into [`core::ColorFrame`]
//!
//! ## Quickstart
//!
//! ```no_run
//! use dotscan::core::FastDetector;
//! use dotscan::{sweep, DotscanConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DotscanConfig::load_json("dotscan.json")?;
//! let img = image::open("frame.png")?.to_rgba8();
//! let frame = dotscan::frame::color_frame_from_image(&img)?;
//! let report = sweep::run_sweep(&frame, &config, &sweep::SweepOptions::default(), FastDetector::default())?;
//! println!("{} dots at threshold {}", report.dots.len(), report.threshold);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `dotscan::core`: geometry tags, frames, region clipping, threshold, mapping, FAST.
//! - `dotscan::scan`: the finder context, scheduler and scan line.
//! - `dotscan::projection`: intrinsics, background alignment, projection matrices.

pub use dotscan_core as core;
pub use dotscan_projection as projection;
pub use dotscan_scan as scan;

pub use dotscan_core::{ImageSize, NormalizedRect, Orientation, Platform, PointDetector};
pub use dotscan_projection::{ArCameraRig, ProjectionConfig, ProjectionMatrix};
pub use dotscan_scan::{DotFinder, ScanConfig, ScanResult, ScanScheduler};

mod config;
pub mod sweep;

#[cfg(feature = "image")]
pub mod frame;

pub use config::{ConfigIoError, DotscanConfig};
