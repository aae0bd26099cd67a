use dotscan_core::ThresholdParams;
use serde::{Deserialize, Serialize};

use crate::ScanError;

/// Scan settings, fixed for the lifetime of a scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum number of points published per cycle.
    pub max_points: usize,
    /// Number of update ticks between two dispatched cycles.
    pub frame_skip: u32,
    /// Adaptive threshold settings.
    pub threshold: ThresholdParams,
    /// Flip frame snapshots upside down before sampling (bottom-up sensor readout).
    pub flip_vertically: bool,
    /// Clamp published points into the unit square.
    pub clamp_points: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_points: 500,
            frame_skip: 5,
            threshold: ThresholdParams::default(),
            flip_vertically: true,
            clamp_points: false,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.max_points == 0 {
            return Err(ScanError::InvalidConfig("max_points must be > 0".into()));
        }
        if self.threshold.step < 0 {
            return Err(ScanError::InvalidConfig(format!(
                "threshold step must be >= 0 (got {})",
                self.threshold.step
            )));
        }
        if self.threshold.low_yield > self.threshold.high_yield {
            return Err(ScanError::InvalidConfig(format!(
                "threshold band is inverted ({} > {})",
                self.threshold.low_yield, self.threshold.high_yield
            )));
        }
        Ok(())
    }
}
