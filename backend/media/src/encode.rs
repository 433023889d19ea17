//! Image encoding for responses and saved edits.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::{BufWriter, Cursor};
use std::path::Path;
use textlift_core::{Result, TextliftError};

/// JPEG quality for saved edits.
pub const JPEG_QUALITY: u8 = 95;

/// `data:image/png;base64,...` for inline display in the editor.
pub fn png_data_url(image: &DynamicImage) -> Result<String> {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| TextliftError::Render(e.to_string()))?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// Save in the format implied by the extension; PNG when there is none.
pub fn save_image(image: &DynamicImage, path: &Path) -> Result<()> {
    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);
    let render_err = |e: image::ImageError| TextliftError::Render(e.to_string());

    match format {
        ImageFormat::Jpeg => {
            let file = std::fs::File::create(path)?;
            let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY);
            image.to_rgb8().write_with_encoder(encoder).map_err(render_err)
        }
        other => image.save_with_format(path, other).map_err(render_err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 2, Rgb([10, 20, 30])))
    }

    #[test]
    fn data_url_decodes_back_to_png() {
        let url = png_data_url(&sample()).unwrap();
        let b64 = url.strip_prefix("data:image/png;base64,").unwrap();
        let bytes = STANDARD.decode(b64).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn save_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        for (name, expected) in [
            ("a.jpg", ImageFormat::Jpeg),
            ("a.png", ImageFormat::Png),
            ("noext", ImageFormat::Png),
        ] {
            let path = dir.path().join(name);
            save_image(&sample(), &path).unwrap();
            let bytes = std::fs::read(&path).unwrap();
            assert_eq!(image::guess_format(&bytes).unwrap(), expected, "{name}");
        }
    }
}
