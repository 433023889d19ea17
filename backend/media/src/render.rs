//! Drawing edited text blocks back onto the uploaded image.
//!
//! Everything is drawn on a transparent overlay that is alpha-composited
//! onto the original, so a "transparent" background still hides the old
//! text behind a mostly-opaque white patch.

use ab_glyph::{FontArc, PxScale};
use image::{imageops, DynamicImage, Rgba, RgbaImage, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use textlift_core::{parse_hex_color, Result, TextBlock, TextliftError};
use tracing::{debug, warn};

use crate::fonts::FontBook;

/// Pixels the background patch extends past the block on each side.
pub const PATCH_MARGIN: i32 = 2;

/// Alpha of the white patch used for "transparent" backgrounds.
pub const COVER_ALPHA: u8 = 200;

pub const UNDERLINE_THICKNESS: u32 = 2;

/// Largest `fontSize` drawn; glyphs are rasterised at full size even when
/// they fall off the image.
pub const MAX_FONT_SIZE: u32 = 200;

/// Bound on `|x|`, `|y|`, `width` and `height` of a block.
pub const MAX_COORDINATE: i64 = 1 << 20;

/// Longest text drawn for one block.
pub const MAX_BLOCK_CHARS: usize = 10_000;

pub struct RenderOutcome {
    pub image: RgbImage,
    pub drawn: usize,
    /// Index and reason for each block that was not drawn.
    pub skipped: Vec<(usize, String)>,
}

pub fn render_edits(image: &DynamicImage, blocks: &[TextBlock], fonts: &FontBook) -> RenderOutcome {
    let mut base = image.to_rgba8();
    let mut overlay = RgbaImage::new(base.width(), base.height());

    let mut drawn = 0;
    let mut skipped = Vec::new();
    for (idx, block) in blocks.iter().enumerate() {
        match draw_block(&mut overlay, block, fonts) {
            Ok(()) => {
                drawn += 1;
                debug!(block = idx + 1, text = %preview(&block.text), "Block drawn");
            }
            Err(e) => {
                warn!(block = idx + 1, error = %e, "Block skipped");
                skipped.push((idx, e.to_string()));
            }
        }
    }

    imageops::overlay(&mut base, &overlay, 0, 0);
    RenderOutcome {
        image: DynamicImage::ImageRgba8(base).to_rgb8(),
        drawn,
        skipped,
    }
}

/// Reject sizes and positions that cannot be drawn safely.
fn check_block(block: &TextBlock) -> Result<()> {
    if block.font_size == 0 || block.font_size > MAX_FONT_SIZE {
        return Err(TextliftError::Render(format!(
            "font size {} outside 1..={MAX_FONT_SIZE}",
            block.font_size
        )));
    }
    if block.text.chars().count() > MAX_BLOCK_CHARS {
        return Err(TextliftError::Render(format!(
            "text longer than {MAX_BLOCK_CHARS} characters"
        )));
    }
    let coords = [
        block.x as i64,
        block.y as i64,
        block.width as i64,
        block.height as i64,
    ];
    if coords.iter().any(|c| c.abs() > MAX_COORDINATE) {
        return Err(TextliftError::Render("block geometry out of range".into()));
    }
    Ok(())
}

fn draw_block(overlay: &mut RgbaImage, block: &TextBlock, fonts: &FontBook) -> Result<()> {
    check_block(block)?;
    let bounds = overlay.dimensions();
    let patch = patch_rect(block, bounds)
        .ok_or_else(|| TextliftError::Render("block lies outside the image".into()))?;

    let [r, g, b] = parse_hex_color(&block.text_color)?;
    let text_color = Rgba([r, g, b, 255]);

    let patch_color = if block.background_transparent {
        Rgba([255, 255, 255, COVER_ALPHA])
    } else {
        let [r, g, b] = parse_hex_color(&block.background_color)?;
        Rgba([r, g, b, 255])
    };

    let font: FontArc = fonts
        .load(&block.font_family, block.bold, block.italic)
        .ok_or_else(|| TextliftError::Render("no usable font installed".into()))?;

    draw_filled_rect_mut(overlay, patch, patch_color);

    let scale = PxScale::from(block.font_size as f32);
    draw_text_mut(overlay, text_color, block.x, block.y, scale, &font, &block.text);

    if block.underline {
        let (text_w, text_h) = text_size(scale, &font, &block.text);
        let left = block.x as i64;
        let top = block.y as i64 + text_h as i64 + 1;
        let underline = clip_rect(
            left,
            top,
            left + text_w.max(1) as i64 - 1,
            top + UNDERLINE_THICKNESS as i64 - 1,
            bounds,
        );
        if let Some(underline) = underline {
            draw_filled_rect_mut(overlay, underline, text_color);
        }
    }

    Ok(())
}

/// `[x-2, y-2, x+w+2, y+h+2]`, both corners inclusive, clipped to the image.
fn patch_rect(block: &TextBlock, bounds: (u32, u32)) -> Option<Rect> {
    let margin = PATCH_MARGIN as i64;
    let (x, y) = (block.x as i64, block.y as i64);
    clip_rect(
        x - margin,
        y - margin,
        x + block.width as i64 + margin,
        y + block.height as i64 + margin,
        bounds,
    )
}

/// Inclusive corners clipped to `(width, height)`; `None` when nothing is left.
fn clip_rect(left: i64, top: i64, right: i64, bottom: i64, bounds: (u32, u32)) -> Option<Rect> {
    let (width, height) = bounds;
    let left = left.max(0);
    let top = top.max(0);
    let right = right.min(width as i64 - 1);
    let bottom = bottom.min(height as i64 - 1);
    if left > right || top > bottom {
        return None;
    }
    Some(
        Rect::at(left as i32, top as i32)
            .of_size((right - left + 1) as u32, (bottom - top + 1) as u32),
    )
}

fn preview(text: &str) -> String {
    text.chars().take(30).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn no_fonts() -> FontBook {
        FontBook::with_dirs("/nonexistent/lib", "/nonexistent/win", vec![])
    }

    fn black_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 20, Rgb([0, 0, 0])))
    }

    #[test]
    fn bad_colour_skips_block_and_keeps_image() {
        let mut block = TextBlock::new("hi", 5, 5, 10, 5);
        block.text_color = "not-a-colour".into();

        let out = render_edits(&black_image(), &[block], &no_fonts());
        assert_eq!(out.drawn, 0);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].0, 0);
        assert_eq!(out.image.dimensions(), (40, 20));
        assert_eq!(*out.image.get_pixel(7, 7), Rgb([0, 0, 0]));
    }

    #[test]
    fn missing_font_skips_without_partial_drawing() {
        let mut block = TextBlock::new("hi", 5, 5, 10, 5);
        block.background_transparent = false;
        block.background_color = "#FF0000".into();

        let out = render_edits(&black_image(), &[block], &no_fonts());
        assert_eq!(out.drawn, 0);
        assert!(out.skipped[0].1.contains("font"));
        assert_eq!(*out.image.get_pixel(7, 7), Rgb([0, 0, 0]));
    }

    #[test]
    fn patch_covers_block_with_margin() {
        let rect = patch_rect(&TextBlock::new("x", 5, 8, 10, 4), (40, 20)).unwrap();
        assert_eq!((rect.left(), rect.top()), (3, 6));
        assert_eq!((rect.right(), rect.bottom()), (17, 14));
    }

    #[test]
    fn patch_is_clipped_to_the_image() {
        let rect = patch_rect(&TextBlock::new("x", -5, -5, 10, 4), (40, 20)).unwrap();
        assert_eq!((rect.left(), rect.top()), (0, 0));
        assert_eq!((rect.right(), rect.bottom()), (7, 1));

        let rect = patch_rect(&TextBlock::new("x", 0, 0, u32::MAX, u32::MAX), (40, 20)).unwrap();
        assert_eq!((rect.right(), rect.bottom()), (39, 19));

        assert!(patch_rect(&TextBlock::new("x", 100, 100, 5, 5), (40, 20)).is_none());
        assert!(patch_rect(&TextBlock::new("x", i32::MIN, i32::MIN, 5, 5), (40, 20)).is_none());
    }

    #[test]
    fn out_of_range_blocks_are_skipped() {
        let mut huge_font = TextBlock::new("hi", 5, 5, 10, 5);
        huge_font.font_size = 1_000_000;
        let mut zero_font = TextBlock::new("hi", 5, 5, 10, 5);
        zero_font.font_size = 0;
        let wide = TextBlock::new("hi", 0, 0, u32::MAX, 5);
        let far_left = TextBlock::new("hi", i32::MIN, 0, 10, 5);
        let outside = TextBlock::new("hi", 500, 500, 10, 5);
        let long = TextBlock::new("a".repeat(MAX_BLOCK_CHARS + 1), 5, 5, 10, 5);

        let blocks = [huge_font, zero_font, wide, far_left, outside, long];
        let out = render_edits(&black_image(), &blocks, &no_fonts());
        assert_eq!(out.drawn, 0);
        assert_eq!(out.skipped.len(), 6);
        assert!(out.skipped[0].1.contains("font size"));
        assert!(out.skipped[1].1.contains("font size"));
        assert!(out.skipped[2].1.contains("geometry"));
        assert!(out.skipped[3].1.contains("geometry"));
        assert!(out.skipped[4].1.contains("outside the image"));
        assert!(out.skipped[5].1.contains("longer than"));
        assert!(out.image.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    const SYSTEM_FONTS: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
    ];

    fn system_fonts() -> Option<FontBook> {
        let path = SYSTEM_FONTS
            .iter()
            .map(std::path::PathBuf::from)
            .find(|p| p.is_file())?;
        Some(FontBook::with_dirs("/nonexistent/lib", "/nonexistent/win", vec![path]))
    }

    #[test]
    fn draws_text_patch_and_underline_with_real_font() {
        let Some(fonts) = system_fonts() else {
            return;
        };
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(160, 80, Rgb([0, 0, 0])));
        let mut block = TextBlock::new("Hello", 10, 10, 90, 30);
        block.font_size = 24;
        block.underline = true;
        block.text_color = "#FF0000".into();
        block.background_transparent = false;
        block.background_color = "#0000FF".into();

        let out = render_edits(&image, &[block], &fonts);
        assert_eq!(out.drawn, 1);
        assert!(out.skipped.is_empty());

        // Margin corner of the patch holds no glyph.
        assert_eq!(*out.image.get_pixel(8, 8), Rgb([0, 0, 255]));
        // Outside the patch is untouched.
        assert_eq!(*out.image.get_pixel(150, 5), Rgb([0, 0, 0]));

        let glyph_pixels = (10..100)
            .flat_map(|x| (10..40).map(move |y| (x, y)))
            .filter(|&(x, y)| out.image.get_pixel(x, y)[0] > 128)
            .count();
        assert!(glyph_pixels > 20, "only {glyph_pixels} text pixels drawn");

        let font = fonts.load("Arial", false, false).unwrap();
        let (_, text_h) = text_size(PxScale::from(24.0), &font, "Hello");
        let underline_y = 10 + text_h + 1;
        assert_eq!(*out.image.get_pixel(11, underline_y), Rgb([255, 0, 0]));
        assert_eq!(*out.image.get_pixel(11, underline_y + 1), Rgb([255, 0, 0]));
    }

    #[test]
    fn good_block_still_drawn_next_to_oversized_ones() {
        let Some(fonts) = system_fonts() else {
            return;
        };
        let mut huge_font = TextBlock::new("big", 5, 5, 10, 5);
        huge_font.font_size = 100_000;
        let mut wide = TextBlock::new("wide", 0, 0, u32::MAX, u32::MAX);
        wide.underline = true;
        let mut good = TextBlock::new("ok", 20, 5, 15, 10);
        good.background_transparent = false;
        good.background_color = "#00FF00".into();

        let out = render_edits(&black_image(), &[huge_font, wide, good], &fonts);
        assert_eq!(out.drawn, 1);
        assert_eq!(
            out.skipped.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert_eq!(*out.image.get_pixel(19, 4), Rgb([0, 255, 0]));
        assert_eq!(*out.image.get_pixel(2, 2), Rgb([0, 0, 0]));
    }

    #[test]
    fn underline_past_the_bottom_edge_is_clipped() {
        let Some(fonts) = system_fonts() else {
            return;
        };
        let mut block = TextBlock::new("low", 2, 15, 20, 5);
        block.underline = true;
        block.font_size = 30;

        let out = render_edits(&black_image(), &[block], &fonts);
        assert_eq!(out.drawn, 1);
        assert_eq!(out.image.dimensions(), (40, 20));
    }

    #[test]
    fn empty_block_list_returns_original_pixels() {
        let out = render_edits(&black_image(), &[], &no_fonts());
        assert_eq!(out.drawn, 0);
        assert!(out.image.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}
