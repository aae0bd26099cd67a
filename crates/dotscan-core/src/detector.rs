use nalgebra::Point2;

use crate::GrayImageView;

/// Interest-point detector boundary.
///
/// Implementations return points in pixel coordinates of `image`, in
/// detector order. `None` means the detector is unavailable or failed; callers
/// treat it as zero points and never as an error.
pub trait PointDetector: Send + Sync {
    fn detect(&self, image: &GrayImageView<'_>, threshold: u8) -> Option<Vec<Point2<f32>>>;
}

/// Detector backed by a closure, see [`detector_fn`].
#[derive(Clone, Copy)]
pub struct FnDetector<F>(F);

/// Wrap a closure as a [`PointDetector`].
///
/// ```
/// use dotscan_core::{detector_fn, GrayImageView, PointDetector};
/// use nalgebra::Point2;
///
/// let center = detector_fn(|img: &GrayImageView<'_>, _threshold| {
///     Some(vec![Point2::new(img.width as f32 / 2.0, img.height as f32 / 2.0)])
/// });
/// let data = [0u8; 16];
/// let view = GrayImageView { width: 4, height: 4, data: &data };
/// assert_eq!(center.detect(&view, 20), Some(vec![Point2::new(2.0, 2.0)]));
/// ```
pub fn detector_fn<F>(f: F) -> FnDetector<F>
where
    F: Fn(&GrayImageView<'_>, u8) -> Option<Vec<Point2<f32>>> + Send + Sync,
{
    FnDetector(f)
}

impl<F> PointDetector for FnDetector<F>
where
    F: Fn(&GrayImageView<'_>, u8) -> Option<Vec<Point2<f32>>> + Send + Sync,
{
    fn detect(&self, image: &GrayImageView<'_>, threshold: u8) -> Option<Vec<Point2<f32>>> {
        (self.0)(image, threshold)
    }
}
