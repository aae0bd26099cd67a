//! Core geometry and image plumbing for AR dot scanning.
//!
//! The crate covers one detection cycle minus scheduling:
//! - clip a normalized region of interest to sensor pixels ([`normalize_frame_area`]),
//! - sample it into a luma buffer ([`luma_region`]),
//! - run a [`PointDetector`] (the bundled [`FastDetector`] or an external one),
//! - keep the detector yield in band ([`ThresholdController`]),
//! - remap raw points into normalized display space ([`CoordinateMapper`]).
//!
//! It has no threads and no global state; the scheduler lives in `dotscan-scan`.

mod area;
mod detector;
mod fast;
mod frame;
mod geometry;
mod image;
mod logger;
mod mapper;
mod threshold;

pub use area::{normalize_frame_area, FrameArea, FrameAreaError};
pub use detector::{detector_fn, FnDetector, PointDetector};
pub use fast::{FastConfigError, FastCorner, FastDetector};
pub use frame::{luma_region, ColorFrame, FrameError, Rgba};
pub use geometry::{
    ImageSize, NormalizedRect, Orientation, ParseGeometryError, PixelRect, Platform,
};
pub use image::{GrayImage, GrayImageView};
pub use mapper::{AspectCompensation, CoordinateMapper};
pub use threshold::{
    ThresholdController, ThresholdParams, YieldClass, DEFAULT_THRESHOLD, MAX_THRESHOLD,
    MIN_THRESHOLD,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
