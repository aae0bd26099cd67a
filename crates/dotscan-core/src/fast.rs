//! FAST segment-test corner detector.
//!
//! Reference detector for the dot scanner. A pixel is a corner when at least
//! `arc_length` contiguous pixels on the radius-3 Bresenham circle are all
//! brighter than `center + threshold` or all darker than `center - threshold`.

use nalgebra::Point2;

use crate::{GrayImageView, PointDetector};

/// Bresenham circle of radius 3, clockwise from 12 o'clock.
const CIRCLE_OFFSETS: [(i32, i32); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

const BORDER: usize = 3;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastConfigError {
    #[error("arc length must be in 9..=12 (got {0})")]
    ArcLength(usize),
}

/// One segment-test corner with its response.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FastCorner {
    pub x: u32,
    pub y: u32,
    /// Sum of `|circle - center| - threshold` over the qualifying arc pixels.
    pub score: u32,
}

/// FAST-N detector with optional 3x3 non-maximum suppression.
#[derive(Clone, Copy, Debug)]
pub struct FastDetector {
    arc_length: usize,
    nonmax_suppression: bool,
}

impl Default for FastDetector {
    fn default() -> Self {
        Self {
            arc_length: 9,
            nonmax_suppression: true,
        }
    }
}

impl FastDetector {
    pub fn new(arc_length: usize) -> Result<Self, FastConfigError> {
        if !(9..=12).contains(&arc_length) {
            return Err(FastConfigError::ArcLength(arc_length));
        }
        Ok(Self {
            arc_length,
            ..Self::default()
        })
    }

    pub fn with_nonmax_suppression(mut self, enabled: bool) -> Self {
        self.nonmax_suppression = enabled;
        self
    }

    pub fn arc_length(&self) -> usize {
        self.arc_length
    }

    /// Run the segment test over the whole image, skipping a 3 px border.
    pub fn detect_corners(&self, image: &GrayImageView<'_>, threshold: u8) -> Vec<FastCorner> {
        let (w, h) = (image.width, image.height);
        if w <= 2 * BORDER || h <= 2 * BORDER || image.data.len() < w * h {
            return Vec::new();
        }

        let t = threshold as i16;
        let mut corners = Vec::new();
        let mut scores = if self.nonmax_suppression {
            vec![0u32; w * h]
        } else {
            Vec::new()
        };

        for y in BORDER..h - BORDER {
            for x in BORDER..w - BORDER {
                let center = image.data[y * w + x] as i16;
                let mut circle = [0i16; 16];
                for (c, &(dx, dy)) in circle.iter_mut().zip(CIRCLE_OFFSETS.iter()) {
                    let xi = (x as i32 + dx) as usize;
                    let yi = (y as i32 + dy) as usize;
                    *c = image.data[yi * w + xi] as i16;
                }
                if let Some(score) = segment_score(center, &circle, t, self.arc_length) {
                    if self.nonmax_suppression {
                        scores[y * w + x] = score;
                    }
                    corners.push(FastCorner {
                        x: x as u32,
                        y: y as u32,
                        score,
                    });
                }
            }
        }

        if self.nonmax_suppression {
            corners.retain(|c| is_local_max(&scores, w, c.x as usize, c.y as usize));
        }
        corners
    }
}

impl PointDetector for FastDetector {
    fn detect(&self, image: &GrayImageView<'_>, threshold: u8) -> Option<Vec<Point2<f32>>> {
        Some(
            self.detect_corners(image, threshold)
                .into_iter()
                .map(|c| Point2::new(c.x as f32, c.y as f32))
                .collect(),
        )
    }
}

/// True if `mask` (16 bits, circular) holds a run of at least `n` set bits.
#[inline]
fn has_arc(mask: u16, n: usize) -> bool {
    let mut run = mask as u32 | ((mask as u32) << 16);
    for _ in 1..n {
        run &= run >> 1;
    }
    run != 0
}

fn segment_score(center: i16, circle: &[i16; 16], t: i16, n: usize) -> Option<u32> {
    let mut bright = 0u16;
    let mut dark = 0u16;
    for (i, &v) in circle.iter().enumerate() {
        let d = v - center;
        if d > t {
            bright |= 1 << i;
        } else if d < -t {
            dark |= 1 << i;
        }
    }

    let mask = if has_arc(bright, n) {
        bright
    } else if has_arc(dark, n) {
        dark
    } else {
        return None;
    };

    let score = circle
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & (1 << i) != 0)
        .map(|(_, &v)| ((v - center).abs() - t).max(0) as u32)
        .sum();
    Some(score)
}

fn is_local_max(scores: &[u32], w: usize, x: usize, y: usize) -> bool {
    let s = scores[y * w + x];
    for ny in y - 1..=y + 1 {
        for nx in x - 1..=x + 1 {
            if (nx, ny) == (x, y) {
                continue;
            }
            let n = scores[ny * w + nx];
            // Ties go to the earlier pixel in raster order.
            let earlier = ny < y || (ny == y && nx < x);
            if n > s || (n == s && earlier) {
                return false;
            }
        }
    }
    true
}
