//! MIME type detection for stored uploads.

use std::path::Path;

/// Detect MIME type by file extension.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png"          => "image/png",
        "gif"          => "image/gif",
        "webp"         => "image/webp",
        "bmp"          => "image/bmp",
        "tiff" | "tif" => "image/tiff",
        "ico"          => "image/x-icon",
        "pnm" | "pbm" | "pgm" | "ppm" => "image/x-portable-anymap",
        "txt"          => "text/plain",
        "json"         => "application/json",
        _              => "application/octet-stream",
    }
}
