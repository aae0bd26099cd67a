//! Session configuration.

use std::fs;
use std::path::Path;

use dotscan_core::{ImageSize, Platform};
use dotscan_projection::ProjectionConfig;
use dotscan_scan::ScanConfig;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Everything fixed at session start. Missing JSON fields take defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotscanConfig {
    pub platform: Platform,
    /// Expected camera frame size.
    pub sensor: ImageSize,
    /// Initial screen size.
    pub screen: ImageSize,
    pub scan: ScanConfig,
    pub projection: ProjectionConfig,
}

impl Default for DotscanConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Handheld,
            sensor: ImageSize::new(640, 480),
            screen: ImageSize::new(1080, 1920),
            scan: ScanConfig::default(),
            projection: ProjectionConfig::default(),
        }
    }
}

impl DotscanConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotscan_projection::DeviceProfile;

    #[test]
    fn sparse_json_keeps_defaults() {
        let cfg: DotscanConfig = serde_json::from_str(
            r#"{ "platform": "desktop", "scan": { "frame_skip": 2 }, "projection": { "device": "ipad" } }"#,
        )
        .expect("parse");
        assert_eq!(cfg.platform, Platform::Desktop);
        assert_eq!(cfg.scan.frame_skip, 2);
        assert_eq!(cfg.scan.max_points, 500);
        assert_eq!(cfg.projection.device, DeviceProfile::IPad);
        assert_eq!(cfg.projection.far, 1000.0);
        assert_eq!(cfg.sensor, ImageSize::new(640, 480));
    }
}
