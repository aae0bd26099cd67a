use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Outcome of the most recent completed scan cycle.
///
/// Published as a whole and replaced by the next cycle, never appended to.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Points in normalized display space, at most `max_points`.
    pub points: Vec<Point2<f32>>,
    /// Threshold the detector ran with.
    pub threshold: u8,
    /// Cycle number, starting at 1. Zero means no cycle has completed yet.
    pub cycle: u64,
}

impl ScanResult {
    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
