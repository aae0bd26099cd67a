//! One detection cycle: sample a region, detect, remap.

use dotscan_core::{
    luma_region, normalize_frame_area, ColorFrame, CoordinateMapper, FrameArea, FrameAreaError,
    ImageSize, NormalizedRect, Platform, PointDetector, ThresholdController,
};
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{ScanConfig, ScanError};

/// Output of a single cycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Detection {
    /// Remapped points, truncated to the point limit.
    pub points: Vec<Point2<f32>>,
    /// Number of points the detector reported before truncation. `None` when
    /// the detector did not run or reported nothing, in which case the
    /// threshold must not be adjusted.
    pub raw_count: Option<usize>,
}

impl Detection {
    fn none() -> Self {
        Self::default()
    }
}

/// Per-session scanning context: sensor geometry, host platform and the
/// output limits. Shared read-only between the update loop and the worker.
#[derive(Clone, Debug)]
pub struct DotFinder {
    sensor: ImageSize,
    platform: Platform,
    max_points: usize,
    clamp_points: bool,
}

impl DotFinder {
    pub fn new(sensor: ImageSize, platform: Platform, config: &ScanConfig) -> Result<Self, ScanError> {
        if sensor.is_empty() {
            return Err(ScanError::InvalidSensorSize {
                width: sensor.width,
                height: sensor.height,
            });
        }
        config.validate()?;
        Ok(Self {
            sensor,
            platform,
            max_points: config.max_points,
            clamp_points: config.clamp_points,
        })
    }

    pub fn sensor(&self) -> ImageSize {
        self.sensor
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// Clip a region of interest to the sensor.
    pub fn frame_area(&self, roi: NormalizedRect) -> Result<FrameArea, FrameAreaError> {
        normalize_frame_area(roi, self.sensor, self.platform)
    }

    /// Run the detector over `area` of `frame` and map the result to display
    /// space. Every failure collapses into an empty detection.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, area, frame, detector), fields(area = ?area.pixels))
    )]
    pub fn detect<D: PointDetector + ?Sized>(
        &self,
        area: &FrameArea,
        frame: Option<&ColorFrame>,
        screen: ImageSize,
        threshold: u8,
        detector: &D,
    ) -> Detection {
        let Some(frame) = frame else {
            log::trace!("no camera frame available");
            return Detection::none();
        };
        if frame.size() != self.sensor {
            log::warn!(
                "frame size {} does not match sensor size {}",
                frame.size(),
                self.sensor
            );
            return Detection::none();
        }

        let gray = match luma_region(frame, area.pixels) {
            Ok(gray) => gray,
            Err(err) => {
                log::warn!("failed to sample scan region: {err}");
                return Detection::none();
            }
        };

        let Some(raw) = detector.detect(&gray.view(), threshold) else {
            log::debug!("detector returned no result at threshold {threshold}");
            return Detection::none();
        };

        let mapper = CoordinateMapper::new(self.platform, self.sensor, screen)
            .with_clamp(self.clamp_points);
        let points = mapper.map_all(&raw, &area.pixels, self.max_points);
        log::trace!(
            "detected {} points, kept {} (threshold {threshold})",
            raw.len(),
            points.len()
        );
        Detection {
            points,
            raw_count: Some(raw.len()),
        }
    }

    /// Synchronous cycle: clip, detect, then feed the raw yield into
    /// `threshold`.
    pub fn find_points<D: PointDetector + ?Sized>(
        &self,
        roi: NormalizedRect,
        frame: Option<&ColorFrame>,
        screen: ImageSize,
        threshold: &mut ThresholdController,
        detector: &D,
    ) -> Result<Detection, FrameAreaError> {
        let area = self.frame_area(roi)?;
        let detection = self.detect(&area, frame, screen, threshold.value(), detector);
        if let Some(count) = detection.raw_count {
            threshold.update(count);
        }
        Ok(detection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use dotscan_core::{detector_fn, GrayImageView, Rgba};

    const SENSOR: ImageSize = ImageSize::new(640, 480);

    fn finder(platform: Platform) -> DotFinder {
        DotFinder::new(SENSOR, platform, &ScanConfig::default()).expect("finder")
    }

    #[test]
    fn rejects_empty_sensor() {
        let err = DotFinder::new(ImageSize::new(640, 0), Platform::Handheld, &ScanConfig::default())
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidSensorSize { width: 640, height: 0 }));
    }

    #[test]
    fn detector_sees_only_the_clipped_region() {
        let f = finder(Platform::Handheld);
        let frame = ColorFrame::filled(SENSOR, Rgba::gray(50));
        let det = detector_fn(|img: &GrayImageView<'_>, threshold: u8| {
            assert_eq!((img.width, img.height), (128, 480));
            assert_eq!(threshold, 82);
            Some(vec![Point2::new(10.0, 10.0)])
        });
        let mut threshold = ThresholdController::default();
        let out = f
            .find_points(
                NormalizedRect::new(0.4, 0.0, 0.2, 1.0),
                Some(&frame),
                SENSOR,
                &mut threshold,
                &det,
            )
            .expect("detection");
        assert_eq!(out.raw_count, Some(1));
        assert_abs_diff_eq!(out.points[0].x, 1.0 - 10.0 / 480.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out.points[0].y, 1.0 - 266.0 / 640.0, epsilon = 1e-6);
        // single point is a low yield
        assert_eq!(threshold.value(), 79);
    }

    #[test]
    fn failures_leave_the_threshold_alone() {
        let f = finder(Platform::Handheld);
        let frame = ColorFrame::filled(SENSOR, Rgba::gray(50));
        let roi = NormalizedRect::new(0.0, 0.0, 0.5, 0.5);
        let mut threshold = ThresholdController::default();

        let failing = detector_fn(|_: &GrayImageView<'_>, _: u8| None);
        let out = f
            .find_points(roi, Some(&frame), SENSOR, &mut threshold, &failing)
            .expect("area");
        assert!(out.points.is_empty());
        assert_eq!(out.raw_count, None);

        let never = detector_fn(|_: &GrayImageView<'_>, _: u8| -> Option<Vec<Point2<f32>>> {
            panic!("detector must not run without a frame")
        });
        let out = f
            .find_points(roi, None, SENSOR, &mut threshold, &never)
            .expect("area");
        assert_eq!(out, Detection::default());

        let small = ColorFrame::filled(ImageSize::new(320, 240), Rgba::gray(0));
        let out = f
            .find_points(roi, Some(&small), SENSOR, &mut threshold, &never)
            .expect("area");
        assert_eq!(out, Detection::default());
        assert_eq!(threshold.value(), 82);
    }

    #[test]
    fn output_is_truncated_but_threshold_sees_raw_yield() {
        let config = ScanConfig {
            max_points: 5,
            ..ScanConfig::default()
        };
        let f = DotFinder::new(SENSOR, Platform::Desktop, &config).expect("finder");
        let frame = ColorFrame::filled(SENSOR, Rgba::gray(0));
        let det = detector_fn(|_: &GrayImageView<'_>, _: u8| {
            Some((0..600).map(|i| Point2::new((i % 100) as f32, 0.0)).collect())
        });
        let mut threshold = ThresholdController::default();
        let out = f
            .find_points(NormalizedRect::full(), Some(&frame), SENSOR, &mut threshold, &det)
            .expect("detection");
        assert_eq!(out.points.len(), 5);
        assert_eq!(out.raw_count, Some(600));
        assert_eq!(threshold.value(), 85);
    }

    #[test]
    fn empty_region_is_reported_before_detection() {
        let f = finder(Platform::Handheld);
        let never = detector_fn(|_: &GrayImageView<'_>, _: u8| -> Option<Vec<Point2<f32>>> {
            panic!("detector must not run for an empty region")
        });
        let mut threshold = ThresholdController::default();
        let err = f
            .find_points(
                NormalizedRect::new(1.2, 0.0, 0.2, 1.0),
                None,
                SENSOR,
                &mut threshold,
                &never,
            )
            .unwrap_err();
        assert_eq!(err, FrameAreaError::EmptyRegion);
    }
}
