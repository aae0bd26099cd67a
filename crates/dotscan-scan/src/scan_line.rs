//! Sweeping scan line.
//!
//! The line ping-pongs across the screen once every [`SCAN_PERIOD_SECS`]
//! seconds. The region scanned each cycle is a band of
//! `2 * SCAN_AREA_HALF_WIDTH` centred on the line (in sensor-normalized
//! units), and dots fade out behind the line as it moves away from them.

use dotscan_core::NormalizedRect;

/// Seconds for one pass across the screen.
pub const SCAN_PERIOD_SECS: f32 = 5.0;

/// Half width of the scanned band, and distance over which dots fade.
pub const SCAN_AREA_HALF_WIDTH: f32 = 1.0 / 5.0;

const MAX_DOT_ALPHA: f32 = 0.5;

fn ping_pong(t: f32, length: f32) -> f32 {
    let t = t.rem_euclid(length * 2.0);
    length - (t - length).abs()
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScanLine {
    elapsed: f32,
    position: f32,
    going_down: bool,
}

impl Default for ScanLine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanLine {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            position: Self::position_at(0.0),
            going_down: true,
        }
    }

    /// Normalized screen position at `elapsed` seconds; starts at the top.
    fn position_at(elapsed: f32) -> f32 {
        ping_pong(SCAN_PERIOD_SECS + elapsed, SCAN_PERIOD_SECS) / SCAN_PERIOD_SECS
    }

    /// Advance by `dt` seconds and return the new position in [0,1].
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt.max(0.0);
        let next = Self::position_at(self.elapsed);
        self.going_down = next <= self.position;
        self.position = next;
        next
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    /// True while the line moves towards 0.
    pub fn going_down(&self) -> bool {
        self.going_down
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Region of interest for the current line position.
    ///
    /// The band is trimmed at whichever screen edge it crosses.
    pub fn scan_area(&self) -> NormalizedRect {
        let mut area = NormalizedRect::new(
            (1.0 - self.position) - SCAN_AREA_HALF_WIDTH,
            0.0,
            SCAN_AREA_HALF_WIDTH * 2.0,
            1.0,
        );
        if area.x + area.width > 1.0 {
            area.width = 1.0 - area.x;
        } else if area.x < 0.0 {
            area.width += area.x;
            area.x = 0.0;
        }
        area
    }

    /// Opacity for a dot at display height `y`: hidden ahead of the line,
    /// fading with distance behind it.
    pub fn dot_alpha(&self, y: f32) -> f32 {
        let behind = if self.going_down {
            y - self.position
        } else {
            self.position - y
        };
        if behind < 0.0 {
            return 0.0;
        }
        (1.0 - behind / SCAN_AREA_HALF_WIDTH).clamp(0.0, 1.0) * MAX_DOT_ALPHA
    }
}
