//! Region-of-interest clipping into sensor pixel bounds.

use crate::{ImageSize, NormalizedRect, PixelRect, Platform};

/// Reasons a requested region cannot be scanned.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAreaError {
    #[error("region of interest is empty after clipping")]
    EmptyRegion,
    #[error("invalid sensor size {width}x{height}")]
    InvalidSensorSize { width: u32, height: u32 },
}

/// A clipped region, both in normalized units and in sensor pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameArea {
    /// Clipped rectangle in sensor-normalized units.
    pub normalized: NormalizedRect,
    /// Integer pixel bounds; always inside the sensor.
    pub pixels: PixelRect,
}

/// Largest extent from `origin` that keeps `origin + extent <= 1.0` in f32.
fn trim_to_unit(origin: f32, extent: f32) -> f32 {
    if origin + extent <= 1.0 {
        return extent;
    }
    let mut e = 1.0 - origin;
    while e > 0.0 && origin + e > 1.0 {
        e = f32::from_bits(e.to_bits() - 1);
    }
    e
}

#[inline]
fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Convert a requested region of interest into sensor pixel bounds.
///
/// On desktop hosts the region axes are swapped before clamping. Each
/// component is clamped to [0,1]; overflow past the right/bottom edge is
/// trimmed from the width/height, never from the origin.
pub fn normalize_frame_area(
    roi: NormalizedRect,
    sensor: ImageSize,
    platform: Platform,
) -> Result<FrameArea, FrameAreaError> {
    if sensor.is_empty() {
        return Err(FrameAreaError::InvalidSensorSize {
            width: sensor.width,
            height: sensor.height,
        });
    }

    let roi = match platform {
        Platform::Handheld => roi,
        Platform::Desktop => roi.transposed(),
    };

    let mut r = NormalizedRect::new(
        clamp_unit(roi.x),
        clamp_unit(roi.y),
        clamp_unit(roi.width),
        clamp_unit(roi.height),
    );
    r.width = trim_to_unit(r.x, r.width);
    r.height = trim_to_unit(r.y, r.height);
    if r.width <= 0.0 || r.height <= 0.0 {
        return Err(FrameAreaError::EmptyRegion);
    }

    let sw = sensor.width as f32;
    let sh = sensor.height as f32;
    let x = ((r.x * sw) as u32).min(sensor.width);
    let y = ((r.y * sh) as u32).min(sensor.height);
    let width = ((r.width * sw) as u32).min(sensor.width - x);
    let height = ((r.height * sh) as u32).min(sensor.height - y);
    if width == 0 || height == 0 {
        return Err(FrameAreaError::EmptyRegion);
    }

    Ok(FrameArea {
        normalized: r,
        pixels: PixelRect::new(x, y, width, height),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENSOR: ImageSize = ImageSize::new(640, 480);

    #[test]
    fn handheld_region_maps_axes_directly() {
        let area = normalize_frame_area(
            NormalizedRect::new(0.4, 0.0, 0.2, 1.0),
            SENSOR,
            Platform::Handheld,
        )
        .expect("area");
        assert_eq!(area.pixels, PixelRect::new(256, 0, 128, 480));
    }

    #[test]
    fn desktop_region_swaps_axes_before_clamping() {
        let area = normalize_frame_area(
            NormalizedRect::new(0.4, 0.0, 0.2, 1.0),
            SENSOR,
            Platform::Desktop,
        )
        .expect("area");
        assert_eq!(area.normalized, NormalizedRect::new(0.0, 0.4, 1.0, 0.2));
        assert_eq!(area.pixels, PixelRect::new(0, 192, 640, 96));
    }

    #[test]
    fn overflow_is_trimmed_from_extent_not_origin() {
        let area = normalize_frame_area(
            NormalizedRect::new(0.75, -0.5, 0.5, 3.0),
            SENSOR,
            Platform::Handheld,
        )
        .expect("area");
        assert_eq!(area.normalized.x, 0.75);
        assert_eq!(area.normalized.y, 0.0);
        assert_eq!(area.normalized.width, 0.25);
        assert_eq!(area.normalized.height, 1.0);
        assert_eq!(area.pixels, PixelRect::new(480, 0, 160, 480));
    }

    #[test]
    fn collapsed_regions_are_empty() {
        for roi in [
            NormalizedRect::new(1.0, 0.0, 0.5, 1.0),
            NormalizedRect::new(0.2, 0.2, 0.0, 0.5),
            NormalizedRect::new(0.2, 0.2, -1.0, 0.5),
            NormalizedRect::new(0.2, 0.2, 0.0001, 0.5),
            NormalizedRect::new(f32::NAN, 0.0, f32::NAN, 1.0),
        ] {
            assert_eq!(
                normalize_frame_area(roi, SENSOR, Platform::Handheld),
                Err(FrameAreaError::EmptyRegion),
                "{roi:?}"
            );
        }
    }

    #[test]
    fn clipped_regions_stay_inside_the_unit_square() {
        let samples = [-2.5_f32, -0.1, 0.0, 0.05, 0.33, 0.5, 0.9, 1.0, 1.7, 40.0];
        for &x in &samples {
            for &y in &samples {
                for &w in &samples {
                    for &h in &samples {
                        let roi = NormalizedRect::new(x, y, w, h);
                        for platform in [Platform::Handheld, Platform::Desktop] {
                            let Ok(area) = normalize_frame_area(roi, SENSOR, platform) else {
                                continue;
                            };
                            let r = area.normalized;
                            assert!(r.x >= 0.0 && r.y >= 0.0, "{roi:?}");
                            assert!(r.right() <= 1.0 && r.bottom() <= 1.0, "{roi:?}");
                            assert!(area.pixels.fits_in(SENSOR), "{roi:?}");
                            assert!(area.pixels.width > 0 && area.pixels.height > 0);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn empty_sensor_is_rejected() {
        let err = normalize_frame_area(
            NormalizedRect::full(),
            ImageSize::new(0, 480),
            Platform::Handheld,
        )
        .unwrap_err();
        assert!(matches!(err, FrameAreaError::InvalidSensorSize { .. }));
    }
}
