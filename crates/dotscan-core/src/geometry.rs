use std::fmt;
use std::str::FromStr;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Errors from parsing geometry tags on the command line or in configs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseGeometryError {
    #[error("unknown platform `{0}` (expected handheld or desktop)")]
    Platform(String),
    #[error("unknown orientation `{0}`")]
    Orientation(String),
    #[error("invalid size `{0}` (expected WIDTHxHEIGHT)")]
    Size(String),
}

/// Host platform class.
///
/// On handheld devices the sensor axes line up with the reported frame. On
/// desktop hosts the sensor is mounted rotated by 90 degrees, which swaps the
/// axes of the requested region and leaves the detector output unrotated.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    Handheld,
    Desktop,
}

impl Platform {
    pub fn is_handheld(self) -> bool {
        matches!(self, Platform::Handheld)
    }
}

impl FromStr for Platform {
    type Err = ParseGeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "handheld" | "mobile" => Ok(Platform::Handheld),
            "desktop" | "editor" => Ok(Platform::Desktop),
            _ => Err(ParseGeometryError::Platform(s.to_string())),
        }
    }
}

/// Physical device orientation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::Portrait,
        Orientation::PortraitUpsideDown,
        Orientation::LandscapeLeft,
        Orientation::LandscapeRight,
    ];

    /// Decode a host orientation code (1..=4).
    ///
    /// Unknown codes (including the host's "unknown" and "auto rotation"
    /// values) fall back to [`Orientation::Portrait`].
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Orientation::Portrait,
            2 => Orientation::PortraitUpsideDown,
            3 => Orientation::LandscapeLeft,
            4 => Orientation::LandscapeRight,
            other => {
                log::warn!("unknown orientation code {other}, falling back to portrait");
                Orientation::Portrait
            }
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Orientation::Portrait => 1,
            Orientation::PortraitUpsideDown => 2,
            Orientation::LandscapeLeft => 3,
            Orientation::LandscapeRight => 4,
        }
    }

    pub fn is_portrait(self) -> bool {
        matches!(
            self,
            Orientation::Portrait | Orientation::PortraitUpsideDown
        )
    }

    /// Orientation that drives rendering on `platform`.
    ///
    /// Desktop hosts do not report a meaningful orientation and always render
    /// as landscape-left.
    pub fn effective(self, platform: Platform) -> Self {
        if platform.is_handheld() {
            self
        } else {
            Orientation::LandscapeLeft
        }
    }
}

impl FromStr for Orientation {
    type Err = ParseGeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.to_ascii_lowercase().replace('_', "-");
        match key.as_str() {
            "portrait" | "upright" => Ok(Orientation::Portrait),
            "portrait-upside-down" | "upside-down" => Ok(Orientation::PortraitUpsideDown),
            "landscape-left" | "rotated-left" => Ok(Orientation::LandscapeLeft),
            "landscape-right" | "rotated-right" => Ok(Orientation::LandscapeRight),
            _ => match key.parse::<i32>() {
                Ok(code @ 1..=4) => Ok(Orientation::from_code(code)),
                _ => Err(ParseGeometryError::Orientation(s.to_string())),
            },
        }
    }
}

/// Pixel dimensions of a sensor frame or a screen.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the image is at least as wide as it is tall.
    pub fn is_wide(self) -> bool {
        self.width >= self.height
    }

    /// Long side over short side, always >= 1.
    ///
    /// Degenerate sizes report 1.0.
    pub fn aspect_ratio(self) -> f32 {
        let long = self.width.max(self.height) as f32;
        let short = self.width.min(self.height) as f32;
        if short <= 0.0 {
            1.0
        } else {
            long / short
        }
    }

    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ImageSize {
    type Err = ParseGeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseGeometryError::Size(s.to_string());
        let (w, h) = s.split_once(['x', 'X']).ok_or_else(err)?;
        let width = w.trim().parse().map_err(|_| err())?;
        let height = h.trim().parse().map_err(|_| err())?;
        Ok(Self { width, height })
    }
}

/// Rectangle in normalized [0,1] x [0,1] camera coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NormalizedRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole frame.
    pub const fn full() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Swap the roles of the two axes.
    pub fn transposed(&self) -> Self {
        Self::new(self.y, self.x, self.height, self.width)
    }
}

/// Integer sub-rectangle of a sensor frame.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Top-left corner as a floating point offset.
    pub fn origin(&self) -> Point2<f32> {
        Point2::new(self.x as f32, self.y as f32)
    }

    /// True if the rectangle lies fully inside an image of `size`.
    pub fn fits_in(&self, size: ImageSize) -> bool {
        self.x as u64 + self.width as u64 <= size.width as u64
            && self.y as u64 + self.height as u64 <= size.height as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_is_orientation_independent() {
        assert_eq!(ImageSize::new(640, 480).aspect_ratio(), 640.0 / 480.0);
        assert_eq!(ImageSize::new(480, 640).aspect_ratio(), 640.0 / 480.0);
        assert_eq!(ImageSize::new(0, 480).aspect_ratio(), 1.0);
    }

    #[test]
    fn parses_sizes_and_tags() {
        assert_eq!(
            "1080x1920".parse::<ImageSize>().unwrap(),
            ImageSize::new(1080, 1920)
        );
        assert!("1080".parse::<ImageSize>().is_err());
        assert_eq!(
            "landscape_left".parse::<Orientation>().unwrap(),
            Orientation::LandscapeLeft
        );
        assert_eq!("2".parse::<Orientation>().unwrap(), Orientation::PortraitUpsideDown);
        assert!("sideways".parse::<Orientation>().is_err());
        assert_eq!("Desktop".parse::<Platform>().unwrap(), Platform::Desktop);
    }

    #[test]
    fn unknown_orientation_codes_fall_back_to_portrait() {
        for code in [0, 5, 6, -1] {
            assert_eq!(Orientation::from_code(code), Orientation::Portrait);
        }
        for o in Orientation::ALL {
            assert_eq!(Orientation::from_code(o.code()), o);
        }
    }

    #[test]
    fn desktop_always_renders_landscape_left() {
        for o in Orientation::ALL {
            assert_eq!(o.effective(Platform::Desktop), Orientation::LandscapeLeft);
            assert_eq!(o.effective(Platform::Handheld), o);
        }
    }
}
