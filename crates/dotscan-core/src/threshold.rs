//! Adaptive detection threshold.
//!
//! A coarse fixed-step controller: a low yield lowers the threshold, a high
//! yield raises it, anything in between leaves it alone. The step is kept
//! small so the dot cloud does not flicker from one cycle to the next.

use serde::{Deserialize, Serialize};

pub const MIN_THRESHOLD: u8 = 1;
pub const MAX_THRESHOLD: u8 = 255;
pub const DEFAULT_THRESHOLD: u8 = 82;

/// Controller settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdParams {
    /// Starting threshold; clamped into `[MIN_THRESHOLD, MAX_THRESHOLD]`.
    pub initial: i32,
    /// Yields strictly below this lower the threshold.
    pub low_yield: usize,
    /// Yields strictly above this raise the threshold.
    ///
    /// The band documented for the dot effect is 100..300, but the shipped
    /// controller reacts at 500 and that is what is kept here.
    pub high_yield: usize,
    /// Adjustment applied per cycle.
    pub step: i32,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            initial: DEFAULT_THRESHOLD as i32,
            low_yield: 100,
            high_yield: 500,
            step: 3,
        }
    }
}

/// How a cycle's point count compares to the target band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum YieldClass {
    Low,
    InBand,
    High,
}

/// Process-wide detection threshold, updated once per completed cycle.
#[derive(Clone, Debug)]
pub struct ThresholdController {
    params: ThresholdParams,
    value: u8,
}

#[inline]
fn clamp_threshold(v: i32) -> u8 {
    v.clamp(MIN_THRESHOLD as i32, MAX_THRESHOLD as i32) as u8
}

impl ThresholdController {
    pub fn new(params: ThresholdParams) -> Self {
        Self {
            value: clamp_threshold(params.initial),
            params,
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn params(&self) -> &ThresholdParams {
        &self.params
    }

    pub fn classify(&self, count: usize) -> YieldClass {
        if count < self.params.low_yield {
            YieldClass::Low
        } else if count > self.params.high_yield {
            YieldClass::High
        } else {
            YieldClass::InBand
        }
    }

    /// Feed the raw detector yield of a completed cycle and return the new
    /// threshold.
    pub fn update(&mut self, count: usize) -> u8 {
        let current = self.value as i32;
        let next = match self.classify(count) {
            YieldClass::Low => current.saturating_sub(self.params.step),
            YieldClass::High => current.saturating_add(self.params.step),
            YieldClass::InBand => current,
        };
        self.value = clamp_threshold(next);
        self.value
    }

    pub fn reset(&mut self) {
        self.value = clamp_threshold(self.params.initial);
    }
}

impl Default for ThresholdController {
    fn default() -> Self {
        Self::new(ThresholdParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_follow_the_yield_band() {
        let mut c = ThresholdController::default();
        assert_eq!(c.value(), 82);
        assert_eq!(c.update(99), 79);
        assert_eq!(c.update(100), 79);
        assert_eq!(c.update(500), 79);
        assert_eq!(c.update(501), 82);
        assert_eq!(c.update(300), 82);
    }

    #[test]
    fn low_yield_walks_down_to_the_floor() {
        let mut c = ThresholdController::default();
        let mut prev = c.value();
        for _ in 0..100 {
            let next = c.update(0);
            if prev > MIN_THRESHOLD {
                assert!(next < prev);
                assert!(prev - next <= 3);
            } else {
                assert_eq!(next, MIN_THRESHOLD);
            }
            prev = next;
        }
        assert_eq!(c.value(), MIN_THRESHOLD);
    }

    #[test]
    fn never_leaves_the_valid_range() {
        let mut c = ThresholdController::new(ThresholdParams {
            step: 40,
            ..ThresholdParams::default()
        });
        let counts = [0usize, 10_000, 7, 501, 99, 100_000, 0, 0, 0, 0, 0, 0];
        for _ in 0..50 {
            for &n in &counts {
                let v = c.update(n);
                assert!((MIN_THRESHOLD..=MAX_THRESHOLD).contains(&v));
            }
        }
        for _ in 0..20 {
            c.update(usize::MAX);
        }
        assert_eq!(c.value(), MAX_THRESHOLD);
    }

    #[test]
    fn out_of_range_initial_values_are_clamped() {
        let c = ThresholdController::new(ThresholdParams {
            initial: 900,
            ..ThresholdParams::default()
        });
        assert_eq!(c.value(), MAX_THRESHOLD);
        let mut c = ThresholdController::new(ThresholdParams {
            initial: -4,
            ..ThresholdParams::default()
        });
        assert_eq!(c.value(), MIN_THRESHOLD);
        c.update(10_000);
        c.reset();
        assert_eq!(c.value(), MIN_THRESHOLD);
    }
}
