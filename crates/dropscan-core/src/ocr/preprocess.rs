//! Shared region preprocessing.
//!
//! Every backend receives its crops through the same path: clip the
//! rectangle to the image bounds, convert to single-channel luminance,
//! and upscale 3x with Lanczos resampling to help recognition on small
//! print. Backends never preprocess differently.

use image::{imageops::FilterType, DynamicImage, GenericImageView, GrayImage};
use tracing::warn;

use crate::regions::Region;

/// Fixed upscale factor applied to every region crop.
pub const UPSCALE_FACTOR: u32 = 3;

/// Crop a region out of the image, clipping to the image bounds.
///
/// A rectangle that extends past the image edge is reduced to its
/// intersection with the image. Returns `None` when the intersection is
/// empty; the pipeline records empty text for such a region.
pub fn crop_region(image: &DynamicImage, region: &Region) -> Option<DynamicImage> {
    let (img_w, img_h) = image.dimensions();

    if region.x >= img_w || region.y >= img_h {
        warn!(
            "Region '{}' at ({}, {}) lies outside the {}x{} image",
            region.name, region.x, region.y, img_w, img_h
        );
        return None;
    }

    let width = region.width.min(img_w - region.x);
    let height = region.height.min(img_h - region.y);

    if width < region.width || height < region.height {
        warn!(
            "Region '{}' clipped to {}x{} to fit the image",
            region.name, width, height
        );
    }

    Some(image.crop_imm(region.x, region.y, width, height))
}

/// Convert a crop to grayscale and upscale it for recognition.
pub fn prepare_crop(crop: &DynamicImage) -> GrayImage {
    let gray = crop.to_luma8();
    let (w, h) = gray.dimensions();

    image::imageops::resize(
        &gray,
        w * UPSCALE_FACTOR,
        h * UPSCALE_FACTOR,
        FilterType::Lanczos3,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    fn blank_image(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(ImageBuffer::from_pixel(w, h, Luma([255u8])))
    }

    fn region(x: u32, y: u32, w: u32, h: u32) -> Region {
        Region {
            name: "area_1".to_string(),
            x,
            y,
            width: w,
            height: h,
        }
    }

    #[test]
    fn test_crop_within_bounds() {
        let img = blank_image(100, 100);
        let crop = crop_region(&img, &region(10, 20, 30, 40)).unwrap();
        assert_eq!(crop.dimensions(), (30, 40));
    }

    #[test]
    fn test_crop_clips_to_image_edge() {
        let img = blank_image(100, 100);
        let crop = crop_region(&img, &region(90, 90, 50, 50)).unwrap();
        assert_eq!(crop.dimensions(), (10, 10));
    }

    #[test]
    fn test_crop_fully_outside_is_none() {
        let img = blank_image(100, 100);
        assert!(crop_region(&img, &region(100, 0, 10, 10)).is_none());
        assert!(crop_region(&img, &region(0, 200, 10, 10)).is_none());
    }

    #[test]
    fn test_prepare_upscales_three_times() {
        let img = blank_image(20, 10);
        let prepared = prepare_crop(&img);
        assert_eq!(prepared.dimensions(), (60, 30));
    }
}
