use std::fmt;
use std::str::FromStr;

use dotscan_core::Platform;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// Pinhole calibration in sensor pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntrinsicParams {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
}

impl IntrinsicParams {
    pub const fn new(fx: f32, fy: f32, cx: f32, cy: f32) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Camera matrix `K`.
    pub fn camera_matrix(&self) -> Matrix3<f32> {
        Matrix3::new(
            self.fx, 0.0, self.cx, //
            0.0, self.fy, self.cy, //
            0.0, 0.0, 1.0,
        )
    }

    /// Focal lengths are positive and every value is finite.
    pub fn is_valid(&self) -> bool {
        [self.fx, self.fy, self.cx, self.cy]
            .iter()
            .all(|v| v.is_finite())
            && self.fx > 0.0
            && self.fy > 0.0
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown device profile '{0}' (expected iphone, ipad, android or desktop)")]
pub struct ParseDeviceError(pub String);

/// Device family the calibration table is keyed on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceProfile {
    #[serde(rename = "iphone")]
    IPhone,
    #[serde(rename = "ipad")]
    IPad,
    #[default]
    #[serde(rename = "android")]
    Android,
    #[serde(rename = "desktop")]
    Desktop,
}

const IPHONE: IntrinsicParams = IntrinsicParams::new(617.750, 618.238, 317.206, 244.322);
const IPAD: IntrinsicParams = IntrinsicParams::new(785.392, 783.778, 318.726, 225.411);
const GENERIC: IntrinsicParams = IntrinsicParams::new(785.39254, 783.77783, 318.72601, 225.41132);

impl DeviceProfile {
    pub const ALL: [DeviceProfile; 4] = [
        DeviceProfile::IPhone,
        DeviceProfile::IPad,
        DeviceProfile::Android,
        DeviceProfile::Desktop,
    ];

    /// Profile used when none is configured.
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Handheld => DeviceProfile::Android,
            Platform::Desktop => DeviceProfile::Desktop,
        }
    }

    pub fn intrinsics(self) -> IntrinsicParams {
        match self {
            DeviceProfile::IPhone => IPHONE,
            DeviceProfile::IPad => IPAD,
            DeviceProfile::Android | DeviceProfile::Desktop => GENERIC,
        }
    }

    /// Whether the camera image is shown mirrored on this device family.
    pub fn is_mirrored(self) -> bool {
        matches!(self, DeviceProfile::IPhone | DeviceProfile::IPad)
    }

    pub fn name(self) -> &'static str {
        match self {
            DeviceProfile::IPhone => "iphone",
            DeviceProfile::IPad => "ipad",
            DeviceProfile::Android => "android",
            DeviceProfile::Desktop => "desktop",
        }
    }
}

impl fmt::Display for DeviceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeviceProfile {
    type Err = ParseDeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        DeviceProfile::ALL
            .into_iter()
            .find(|d| d.name() == lower)
            .ok_or_else(|| ParseDeviceError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_matrix_layout() {
        let k = DeviceProfile::IPhone.intrinsics().camera_matrix();
        assert_eq!(k[(0, 0)], 617.750);
        assert_eq!(k[(1, 1)], 618.238);
        assert_eq!(k[(0, 2)], 317.206);
        assert_eq!(k[(1, 2)], 244.322);
        assert_eq!(k[(2, 2)], 1.0);
        assert_eq!(k[(1, 0)], 0.0);
    }

    #[test]
    fn android_and_desktop_share_calibration() {
        assert_eq!(
            DeviceProfile::Android.intrinsics(),
            DeviceProfile::Desktop.intrinsics()
        );
        assert_ne!(
            DeviceProfile::IPad.intrinsics(),
            DeviceProfile::IPhone.intrinsics()
        );
        assert!(DeviceProfile::ALL.iter().all(|d| d.intrinsics().is_valid()));
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("iPhone".parse::<DeviceProfile>(), Ok(DeviceProfile::IPhone));
        assert_eq!(" desktop ".parse::<DeviceProfile>(), Ok(DeviceProfile::Desktop));
        assert!("pixel".parse::<DeviceProfile>().is_err());
        let json = serde_json::to_string(&DeviceProfile::IPad).expect("json");
        assert_eq!(json, "\"ipad\"");
    }

    #[test]
    fn invalid_intrinsics_are_detected() {
        assert!(!IntrinsicParams::new(0.0, 600.0, 320.0, 240.0).is_valid());
        assert!(!IntrinsicParams::new(600.0, 600.0, f32::NAN, 240.0).is_valid());
    }
}
