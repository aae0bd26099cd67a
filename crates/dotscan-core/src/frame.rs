//! Color sensor frames and luma extraction.

use crate::{GrayImage, ImageSize, PixelRect};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced when building frames or sampling them.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid frame buffer length (expected {expected} pixels, got {got})")]
    BufferSize { expected: usize, got: usize },

    #[error(
        "region {x},{y} {width}x{height} does not fit in a {frame_width}x{frame_height} frame"
    )]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },
}

/// One 8-bit RGBA pixel.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn gray(v: u8) -> Self {
        Self::new(v, v, v, 255)
    }

    /// Unweighted average of the color channels, rounded down. Alpha is ignored.
    #[inline]
    pub fn luma(self) -> u8 {
        ((self.r as u16 + self.g as u16 + self.b as u16) / 3) as u8
    }
}

/// A captured color image, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorFrame {
    size: ImageSize,
    pixels: Vec<Rgba>,
}

impl ColorFrame {
    pub fn new(size: ImageSize, pixels: Vec<Rgba>) -> Result<Self, FrameError> {
        let expected = size.pixel_count();
        if pixels.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                got: pixels.len(),
            });
        }
        Ok(Self { size, pixels })
    }

    /// Build a frame from interleaved RGBA bytes.
    pub fn from_rgba_bytes(size: ImageSize, bytes: &[u8]) -> Result<Self, FrameError> {
        let expected = size.pixel_count();
        if bytes.len() != expected * 4 {
            return Err(FrameError::BufferSize {
                expected,
                got: bytes.len() / 4,
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|p| Rgba::new(p[0], p[1], p[2], p[3]))
            .collect();
        Ok(Self { size, pixels })
    }

    /// A frame filled with a single color.
    pub fn filled(size: ImageSize, color: Rgba) -> Self {
        Self {
            size,
            pixels: vec![color; size.pixel_count()],
        }
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.size.width as usize + x as usize)
            .copied()
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x < self.size.width && y < self.size.height {
            let idx = y as usize * self.size.width as usize + x as usize;
            self.pixels[idx] = color;
        }
    }

    /// Reverse the row order in place.
    ///
    /// Sensor readout starts at the bottom row; sampling assumes a top-left
    /// origin.
    pub fn flip_vertically(&mut self) {
        let w = self.size.width as usize;
        let h = self.size.height as usize;
        if w == 0 {
            return;
        }
        for row in 0..h / 2 {
            let (top, bottom) = self.pixels.split_at_mut((h - 1 - row) * w);
            top[row * w..(row + 1) * w].swap_with_slice(&mut bottom[..w]);
        }
    }
}

/// Sample the luma of `area` out of `frame`.
///
/// Output byte `i` is the luma of the pixel at column `area.x + i % area.width`
/// and row `area.y + i / area.width`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "trace", skip(frame), fields(width = area.width, height = area.height))
)]
pub fn luma_region(frame: &ColorFrame, area: PixelRect) -> Result<GrayImage, FrameError> {
    let size = frame.size();
    if !area.fits_in(size) {
        return Err(FrameError::RegionOutOfBounds {
            x: area.x,
            y: area.y,
            width: area.width,
            height: area.height,
            frame_width: size.width,
            frame_height: size.height,
        });
    }

    let stride = size.width as usize;
    let w = area.width as usize;
    let mut data = Vec::with_capacity(area.area());
    for row in area.y as usize..(area.y + area.height) as usize {
        let start = row * stride + area.x as usize;
        data.extend(frame.pixels[start..start + w].iter().map(|p| p.luma()));
    }

    Ok(GrayImage {
        width: w,
        height: area.height as usize,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(size: ImageSize) -> ColorFrame {
        let pixels = (0..size.pixel_count())
            .map(|i| {
                let x = (i % size.width as usize) as u8;
                let y = (i / size.width as usize) as u8;
                Rgba::new(x, y, x.wrapping_add(y), 255)
            })
            .collect();
        ColorFrame::new(size, pixels).expect("frame")
    }

    #[test]
    fn luma_is_floor_of_channel_average() {
        assert_eq!(Rgba::new(255, 255, 255, 0).luma(), 255);
        assert_eq!(Rgba::new(1, 1, 0, 255).luma(), 0);
        assert_eq!(Rgba::new(10, 20, 31, 255).luma(), 20);
    }

    #[test]
    fn region_addresses_sensor_rows() {
        let frame = gradient_frame(ImageSize::new(8, 6));
        let gray = luma_region(&frame, PixelRect::new(2, 1, 3, 4)).expect("region");
        assert_eq!((gray.width, gray.height), (3, 4));
        assert_eq!(gray.data.len(), 12);
        for (i, &v) in gray.data.iter().enumerate() {
            let col = 2 + i % 3;
            let row = 1 + i / 3;
            let expected = frame.pixel(col as u32, row as u32).unwrap().luma();
            assert_eq!(v, expected, "byte {i}");
        }
    }

    #[test]
    fn region_outside_frame_is_rejected() {
        let frame = gradient_frame(ImageSize::new(8, 6));
        let err = luma_region(&frame, PixelRect::new(6, 0, 3, 1)).unwrap_err();
        assert!(matches!(err, FrameError::RegionOutOfBounds { .. }));
    }

    #[test]
    fn frame_length_must_match_size() {
        let err = ColorFrame::new(ImageSize::new(4, 4), vec![Rgba::default(); 15]).unwrap_err();
        assert_eq!(
            err,
            FrameError::BufferSize {
                expected: 16,
                got: 15
            }
        );
        assert!(ColorFrame::from_rgba_bytes(ImageSize::new(2, 1), &[0; 8]).is_ok());
    }

    #[test]
    fn vertical_flip_reverses_rows() {
        let mut frame = gradient_frame(ImageSize::new(4, 5));
        let original = frame.clone();
        frame.flip_vertically();
        for y in 0..5 {
            for x in 0..4 {
                assert_eq!(frame.pixel(x, y), original.pixel(x, 4 - y));
            }
        }
        frame.flip_vertically();
        assert_eq!(frame, original);
    }
}
