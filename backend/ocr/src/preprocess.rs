//! Image preparation before recognition: contrast boost, then greyscale.
//!
//! Contrast works like a blend against a flat grey image at the picture's
//! mean luminance: `mean + factor * (v - mean)` per channel.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

/// ITU-R 601-2 luma in 16.16 fixed point, rounded.
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

fn is_grey(image: &DynamicImage) -> bool {
    matches!(
        image,
        DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_)
    )
}

/// Blended level, clamped then truncated toward zero.
fn stretch(v: u8, mean: f32, factor: f32) -> u8 {
    (mean + factor * (v as f32 - mean)).clamp(0.0, 255.0).floor() as u8
}

/// Contrast-enhance and convert to 8-bit grey for tesseract.
pub fn prepare_for_ocr(image: &DynamicImage, contrast: f32) -> GrayImage {
    if is_grey(image) {
        let grey = image.to_luma8();
        let mean = mean_level(grey.pixels().map(|p| p.0[0]));
        return GrayImage::from_fn(grey.width(), grey.height(), |x, y| {
            Luma([stretch(grey.get_pixel(x, y).0[0], mean, contrast)])
        });
    }

    let rgb = image.to_rgb8();
    let enhanced = enhance_contrast(&rgb, contrast);
    GrayImage::from_fn(enhanced.width(), enhanced.height(), |x, y| {
        let Rgb([r, g, b]) = *enhanced.get_pixel(x, y);
        Luma([luma(r, g, b)])
    })
}

/// Blend every channel away from (factor > 1) or toward the mean grey level.
pub fn enhance_contrast(rgb: &RgbImage, factor: f32) -> RgbImage {
    let mean = mean_level(rgb.pixels().map(|p| luma(p.0[0], p.0[1], p.0[2])));
    RgbImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let Rgb([r, g, b]) = *rgb.get_pixel(x, y);
        Rgb([
            stretch(r, mean, factor),
            stretch(g, mean, factor),
            stretch(b, mean, factor),
        ])
    })
}

/// Rounded mean of grey levels; 0 for an empty image.
fn mean_level(levels: impl Iterator<Item = u8>) -> f32 {
    let (sum, count) = levels.fold((0u64, 0u64), |(s, n), v| (s + v as u64, n + 1));
    if count == 0 {
        return 0.0;
    }
    (sum as f64 / count as f64).round() as f32
}
