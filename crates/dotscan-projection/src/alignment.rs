//! Fitting the camera image to the screen.

use dotscan_core::{ImageSize, Orientation, Platform};
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::DeviceProfile;

/// Transform of the background plane showing the camera image, plus the
/// share of the image that remains visible on screen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackgroundAlignment {
    /// Rotation of the background plane about the view axis, in degrees.
    pub rotation_deg: f32,
    /// Visible fraction of the camera image, `(horizontal, vertical)`. This is
    /// the ratio consumed by the projection builder.
    pub on_screen_ratio: Vector2<f32>,
    /// Orthographic half-height of the background camera.
    pub ortho_size: f32,
    /// Scale of the background plane.
    pub scale: Vector3<f32>,
}

impl BackgroundAlignment {
    /// Fit a `sensor` image to `screen`. The image keeps its aspect and is
    /// cropped along whichever screen axis is relatively longer.
    pub fn compute(
        platform: Platform,
        orientation: Orientation,
        sensor: ImageSize,
        screen: ImageSize,
        device: DeviceProfile,
    ) -> Self {
        let camera_ratio = sensor.aspect_ratio();
        let screen_ratio = screen.aspect_ratio();
        let cropped = screen_ratio > camera_ratio;

        let orientation = orientation.effective(platform);
        let rotation_deg = match orientation {
            Orientation::Portrait => 0.0,
            Orientation::LandscapeLeft => 90.0,
            Orientation::PortraitUpsideDown => 180.0,
            Orientation::LandscapeRight => 270.0,
        };
        let (on_screen_ratio, ortho_size) = match (orientation.is_portrait(), cropped) {
            (true, true) => (Vector2::new(camera_ratio / screen_ratio, 1.0), camera_ratio),
            (true, false) => (Vector2::new(1.0, 1.0), screen_ratio),
            (false, true) => (
                Vector2::new(1.0, camera_ratio / screen_ratio),
                camera_ratio / screen_ratio,
            ),
            (false, false) => (Vector2::new(1.0, 1.0), 1.0),
        };

        let mirror = if device.is_mirrored() { -1.0 } else { 1.0 };
        Self {
            rotation_deg,
            on_screen_ratio,
            ortho_size,
            scale: Vector3::new(mirror, camera_ratio, 1.0),
        }
    }
}
