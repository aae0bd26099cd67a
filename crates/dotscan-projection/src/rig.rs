//! Keeping a rendering camera in sync with the display.

use dotscan_core::{ImageSize, Orientation, Platform};

use crate::{
    BackgroundAlignment, DeviceProfile, ProjectionConfig, ProjectionError, ProjectionMatrix,
    ProjectionMatrixBuilder,
};

/// Receiver of the computed camera state.
pub trait RenderCamera {
    fn set_projection(&mut self, projection: &ProjectionMatrix);

    fn set_background(&mut self, _alignment: &BackgroundAlignment) {}
}

/// Remembers the last display state and reports when it changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayTracker {
    last: Option<(Orientation, ImageSize)>,
}

impl DisplayTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<(Orientation, ImageSize)> {
        self.last
    }

    /// Record the display state; true if it differs from the last one.
    /// Zero-sized screens are ignored; hosts report them mid-rotation.
    pub fn observe(&mut self, orientation: Orientation, screen: ImageSize) -> bool {
        if screen.is_empty() {
            return false;
        }
        let next = Some((orientation, screen));
        if self.last == next {
            return false;
        }
        self.last = next;
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Rendering-camera controller for one camera session.
#[derive(Clone, Debug)]
pub struct ArCameraRig {
    platform: Platform,
    sensor: ImageSize,
    device: DeviceProfile,
    builder: ProjectionMatrixBuilder,
    tracker: DisplayTracker,
    alignment: Option<BackgroundAlignment>,
    projection: Option<ProjectionMatrix>,
}

impl ArCameraRig {
    pub fn new(
        platform: Platform,
        sensor: ImageSize,
        config: &ProjectionConfig,
    ) -> Result<Self, ProjectionError> {
        config.validate()?;
        Ok(Self {
            platform,
            sensor,
            device: config.device,
            builder: ProjectionMatrixBuilder::new(
                config.resolved_intrinsics(),
                config.near,
                config.far,
            ),
            tracker: DisplayTracker::new(),
            alignment: None,
            projection: None,
        })
    }

    pub fn builder(&self) -> &ProjectionMatrixBuilder {
        &self.builder
    }

    /// Alignment from the last refresh.
    pub fn alignment(&self) -> Option<&BackgroundAlignment> {
        self.alignment.as_ref()
    }

    /// Last projection handed to the camera.
    pub fn projection(&self) -> Option<&ProjectionMatrix> {
        self.projection.as_ref()
    }

    /// Per-frame hook: refresh only when the display changed. Returns true if
    /// a new projection was applied.
    pub fn update(
        &mut self,
        orientation: Orientation,
        screen: ImageSize,
        camera: &mut dyn RenderCamera,
    ) -> bool {
        if !self.tracker.observe(orientation, screen) {
            return false;
        }
        log::debug!("display changed to {orientation:?} {screen}");
        self.refresh(orientation, screen, camera)
    }

    /// Recompute alignment and projection and push them to `camera`. A
    /// degenerate projection is dropped and the camera keeps its previous one.
    pub fn refresh(
        &mut self,
        orientation: Orientation,
        screen: ImageSize,
        camera: &mut dyn RenderCamera,
    ) -> bool {
        let orientation = orientation.effective(self.platform);
        let alignment = BackgroundAlignment::compute(
            self.platform,
            orientation,
            self.sensor,
            screen,
            self.device,
        );
        camera.set_background(&alignment);
        self.alignment = Some(alignment);

        let projection = self
            .builder
            .build(orientation, self.sensor, alignment.on_screen_ratio);
        if projection.is_degenerate() {
            log::warn!("skipping degenerate projection for {orientation:?}");
            return false;
        }
        camera.set_projection(&projection);
        self.projection = Some(projection);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_reports_changes_only() {
        let mut t = DisplayTracker::new();
        let tall = ImageSize::new(1080, 1920);
        assert!(t.observe(Orientation::Portrait, tall));
        assert!(!t.observe(Orientation::Portrait, tall));
        assert!(t.observe(Orientation::LandscapeLeft, tall));
        assert!(t.observe(Orientation::LandscapeLeft, ImageSize::new(1920, 1080)));
        assert!(!t.observe(Orientation::Portrait, ImageSize::new(0, 0)));
        assert_eq!(
            t.current(),
            Some((Orientation::LandscapeLeft, ImageSize::new(1920, 1080)))
        );
        t.reset();
        assert!(t.observe(Orientation::LandscapeLeft, ImageSize::new(1920, 1080)));
    }
}
