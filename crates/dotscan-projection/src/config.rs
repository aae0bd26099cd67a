use serde::{Deserialize, Serialize};

use crate::{DeviceProfile, IntrinsicParams};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("invalid clip planes: near {near}, far {far} (need 0 < near < far)")]
    InvalidClipPlanes { near: f32, far: f32 },
    #[error("invalid intrinsics {0:?}")]
    InvalidIntrinsics(IntrinsicParams),
}

/// Rendering camera settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub device: DeviceProfile,
    /// Replaces the device table entry when set.
    pub intrinsics: Option<IntrinsicParams>,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            device: DeviceProfile::default(),
            intrinsics: None,
            near: 0.3,
            far: 1000.0,
        }
    }
}

impl ProjectionConfig {
    pub fn resolved_intrinsics(&self) -> IntrinsicParams {
        self.intrinsics.unwrap_or_else(|| self.device.intrinsics())
    }

    pub fn validate(&self) -> Result<(), ProjectionError> {
        if !(self.near > 0.0 && self.far > self.near && self.far.is_finite()) {
            return Err(ProjectionError::InvalidClipPlanes {
                near: self.near,
                far: self.far,
            });
        }
        let intrinsics = self.resolved_intrinsics();
        if !intrinsics.is_valid() {
            return Err(ProjectionError::InvalidIntrinsics(intrinsics));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = ProjectionConfig::default();
        cfg.validate().expect("valid");
        assert_eq!(cfg.resolved_intrinsics(), DeviceProfile::Android.intrinsics());
    }

    #[test]
    fn override_wins_over_the_device_table() {
        let cfg: ProjectionConfig = serde_json::from_str(
            r#"{ "device": "iphone", "intrinsics": { "fx": 500.0, "fy": 501.0, "cx": 320.0, "cy": 240.0 } }"#,
        )
        .expect("parse");
        assert_eq!(cfg.device, DeviceProfile::IPhone);
        assert_eq!(cfg.resolved_intrinsics().fx, 500.0);
        assert_eq!(cfg.near, 0.3);
    }

    #[test]
    fn rejects_bad_clip_planes() {
        for (near, far) in [(0.0, 10.0), (5.0, 5.0), (1.0, f32::INFINITY), (f32::NAN, 1.0)] {
            let cfg = ProjectionConfig {
                near,
                far,
                ..ProjectionConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ProjectionError::InvalidClipPlanes { .. })
            ));
        }
    }
}
