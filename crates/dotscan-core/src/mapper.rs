//! Mapping of raw detector output into normalized display coordinates.

use nalgebra::Point2;

use crate::{ImageSize, PixelRect, Platform};

/// Correction for a sensor image stretched onto a screen of a different
/// aspect ratio. Applied about the 0.5 midpoint of one axis only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AspectCompensation {
    /// Ratios match; points are left alone.
    None,
    /// Screen is more elongated than the sensor: scale x by the factor.
    Horizontal(f32),
    /// Sensor is more elongated than the screen: scale y by the factor.
    Vertical(f32),
}

impl AspectCompensation {
    /// `None` when either size is empty: hosts report 0x0 mid-rotation.
    pub fn between(screen: ImageSize, sensor: ImageSize) -> Self {
        if screen.is_empty() || sensor.is_empty() {
            return AspectCompensation::None;
        }
        let screen_ratio = screen.aspect_ratio();
        let sensor_ratio = sensor.aspect_ratio();
        if screen_ratio > sensor_ratio {
            AspectCompensation::Horizontal(screen_ratio / sensor_ratio)
        } else if screen_ratio < sensor_ratio {
            AspectCompensation::Vertical(sensor_ratio / screen_ratio)
        } else {
            AspectCompensation::None
        }
    }

    #[inline]
    pub fn apply(self, p: Point2<f32>) -> Point2<f32> {
        match self {
            AspectCompensation::None => p,
            AspectCompensation::Horizontal(f) => Point2::new(about_center(p.x, f), p.y),
            AspectCompensation::Vertical(f) => Point2::new(p.x, about_center(p.y, f)),
        }
    }

    /// Undo [`AspectCompensation::apply`].
    #[inline]
    pub fn invert(self, p: Point2<f32>) -> Point2<f32> {
        match self {
            AspectCompensation::None => p,
            AspectCompensation::Horizontal(f) => Point2::new(about_center(p.x, 1.0 / f), p.y),
            AspectCompensation::Vertical(f) => Point2::new(p.x, about_center(p.y, 1.0 / f)),
        }
    }
}

#[inline]
fn about_center(v: f32, factor: f32) -> f32 {
    0.5 + (v - 0.5) * factor
}

/// Remaps detector points from cropped sensor pixels to display space.
#[derive(Clone, Copy, Debug)]
pub struct CoordinateMapper {
    platform: Platform,
    sensor: ImageSize,
    compensation: AspectCompensation,
    clamp: bool,
}

impl CoordinateMapper {
    pub fn new(platform: Platform, sensor: ImageSize, screen: ImageSize) -> Self {
        Self {
            platform,
            sensor,
            compensation: AspectCompensation::between(screen, sensor),
            clamp: false,
        }
    }

    /// Clamp mapped points into [0,1]. Off by default: points near the region
    /// edge may leak slightly outside the unit square under strong aspect
    /// mismatch.
    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    pub fn compensation(&self) -> AspectCompensation {
        self.compensation
    }

    /// Orientation remap only: sensor pixel (already offset into the full
    /// frame) to normalized display coordinates.
    ///
    /// Handheld displays are rotated against the sensor, so the axes swap and
    /// both flip.
    #[inline]
    pub fn sensor_to_display(&self, p: Point2<f32>) -> Point2<f32> {
        let sw = self.sensor.width as f32;
        let sh = self.sensor.height as f32;
        match self.platform {
            Platform::Handheld => Point2::new(1.0 - p.y / sh, 1.0 - p.x / sw),
            Platform::Desktop => Point2::new(p.x / sw, 1.0 - p.y / sh),
        }
    }

    /// Map one raw detector point found inside `area`.
    #[inline]
    pub fn map(&self, raw: Point2<f32>, area: &PixelRect) -> Point2<f32> {
        let sensor = raw + area.origin().coords;
        let p = self.compensation.apply(self.sensor_to_display(sensor));
        if self.clamp {
            Point2::new(p.x.clamp(0.0, 1.0), p.y.clamp(0.0, 1.0))
        } else {
            p
        }
    }

    /// Map at most `limit` points, preserving detector order.
    pub fn map_all(&self, raw: &[Point2<f32>], area: &PixelRect, limit: usize) -> Vec<Point2<f32>> {
        raw.iter().take(limit).map(|&p| self.map(p, area)).collect()
    }
}
