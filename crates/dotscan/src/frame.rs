//! Bridges from `image` buffers.

use dotscan_core::{ColorFrame, FrameError, GrayImage, ImageSize};

/// Copy an RGBA image into a [`ColorFrame`].
pub fn color_frame_from_image(img: &image::RgbaImage) -> Result<ColorFrame, FrameError> {
    ColorFrame::from_rgba_bytes(ImageSize::new(img.width(), img.height()), img.as_raw())
}

/// Convert any decoded image into a [`ColorFrame`].
pub fn color_frame_from_dynamic(img: &image::DynamicImage) -> Result<ColorFrame, FrameError> {
    color_frame_from_image(&img.to_rgba8())
}

/// Wrap a sampled grayscale region as an `image` buffer, e.g. for debug dumps.
pub fn gray_to_image(gray: &GrayImage) -> Option<image::GrayImage> {
    image::GrayImage::from_raw(gray.width as u32, gray.height as u32, gray.data.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotscan_core::{luma_region, PixelRect, Rgba};

    #[test]
    fn rgba_pixels_keep_their_positions() {
        let mut img = image::RgbaImage::new(4, 3);
        img.put_pixel(3, 1, image::Rgba([30, 60, 90, 255]));
        let frame = color_frame_from_image(&img).expect("frame");
        assert_eq!(frame.size(), ImageSize::new(4, 3));
        assert_eq!(frame.pixel(3, 1), Some(Rgba::new(30, 60, 90, 255)));
        assert_eq!(frame.pixel(0, 0), Some(Rgba::new(0, 0, 0, 0)));
    }

    #[test]
    fn sampled_region_round_trips_into_an_image() {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            8,
            8,
            image::Rgba([90, 120, 150, 255]),
        ));
        let frame = color_frame_from_dynamic(&img).expect("frame");
        let gray = luma_region(&frame, PixelRect::new(2, 2, 4, 3)).expect("gray");
        let out = gray_to_image(&gray).expect("image");
        assert_eq!(out.dimensions(), (4, 3));
        assert!(out.pixels().all(|p| p.0[0] == 120));
    }
}
