//! Font lookup for rendering edited text.
//!
//! Families map to Liberation fonts (installed with `fonts-liberation` in
//! the container) and to the stock Windows fonts for local development.
//! Unknown families fall back to Arial's candidates.

use ab_glyph::FontArc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

const LIBERATION_DIR: &str = "/usr/share/fonts/truetype/liberation";
const WINDOWS_FONT_DIR: &str = "C:/Windows/Fonts";

pub const FALLBACK_FAMILY: &str = "Arial";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (true, true) => FontStyle::BoldItalic,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Italic,
            (false, false) => FontStyle::Regular,
        }
    }

    /// Styles to try, most specific first.
    fn preference(self) -> &'static [FontStyle] {
        match self {
            FontStyle::BoldItalic => &[
                FontStyle::BoldItalic,
                FontStyle::Bold,
                FontStyle::Italic,
                FontStyle::Regular,
            ],
            FontStyle::Bold => &[FontStyle::Bold, FontStyle::Regular],
            FontStyle::Italic => &[FontStyle::Italic, FontStyle::Regular],
            FontStyle::Regular => &[FontStyle::Regular],
        }
    }
}

/// Liberation file stem for a family, if there is a metric-compatible one.
fn liberation_stem(family: &str) -> Option<&'static str> {
    match family {
        "Arial" => Some("LiberationSans"),
        "Times New Roman" => Some("LiberationSerif"),
        "Courier New" => Some("LiberationMono"),
        _ => None,
    }
}

fn liberation_file(stem: &str, style: FontStyle) -> String {
    let suffix = match style {
        FontStyle::Regular => "Regular",
        FontStyle::Bold => "Bold",
        FontStyle::Italic => "Italic",
        FontStyle::BoldItalic => "BoldItalic",
    };
    format!("{stem}-{suffix}.ttf")
}

fn windows_file(family: &str, style: FontStyle) -> Option<&'static str> {
    use FontStyle::*;
    let file = match (family, style) {
        ("Arial", Regular) => "arial.ttf",
        ("Arial", Bold) => "arialbd.ttf",
        ("Arial", Italic) => "ariali.ttf",
        ("Arial", BoldItalic) => "arialbi.ttf",
        ("Times New Roman", Regular) => "times.ttf",
        ("Times New Roman", Bold) => "timesbd.ttf",
        ("Times New Roman", Italic) => "timesi.ttf",
        ("Times New Roman", BoldItalic) => "timesbi.ttf",
        ("Courier New", Regular) => "cour.ttf",
        ("Courier New", Bold) => "courbd.ttf",
        ("Comic Sans MS", Regular) => "comic.ttf",
        ("Comic Sans MS", Bold) => "comicbd.ttf",
        ("Verdana", Regular) => "verdana.ttf",
        ("Verdana", Bold) => "verdanab.ttf",
        ("Georgia", Regular) => "georgia.ttf",
        ("Georgia", Bold) => "georgiab.ttf",
        _ => return None,
    };
    Some(file)
}

fn is_known_family(family: &str) -> bool {
    liberation_stem(family).is_some() || windows_file(family, FontStyle::Regular).is_some()
}

pub struct FontBook {
    liberation_dir: PathBuf,
    windows_dir: PathBuf,
    extra_paths: Vec<PathBuf>,
    cache: Mutex<HashMap<PathBuf, FontArc>>,
}

impl FontBook {
    pub fn new(extra_paths: Vec<PathBuf>) -> Self {
        Self::with_dirs(LIBERATION_DIR, WINDOWS_FONT_DIR, extra_paths)
    }

    pub fn with_dirs(
        liberation_dir: impl Into<PathBuf>,
        windows_dir: impl Into<PathBuf>,
        extra_paths: Vec<PathBuf>,
    ) -> Self {
        Self {
            liberation_dir: liberation_dir.into(),
            windows_dir: windows_dir.into(),
            extra_paths,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Candidate files for a family and style, in lookup order.
    ///
    /// Linux paths come before Windows paths for each style, and styled
    /// variants come before the regular face.
    pub fn candidates(&self, family: &str, bold: bool, italic: bool) -> Vec<PathBuf> {
        let family = if is_known_family(family) {
            family
        } else {
            FALLBACK_FAMILY
        };

        let mut out = Vec::new();
        for &style in FontStyle::from_flags(bold, italic).preference() {
            if let Some(stem) = liberation_stem(family) {
                out.push(self.liberation_dir.join(liberation_file(stem, style)));
            }
            if let Some(file) = windows_file(family, style) {
                out.push(self.windows_dir.join(file));
            }
        }
        // A family with only Windows files (e.g. Verdana) still gets Liberation Sans on Linux.
        if family != FALLBACK_FAMILY {
            if let Some(stem) = liberation_stem(FALLBACK_FAMILY) {
                out.push(self.liberation_dir.join(liberation_file(stem, FontStyle::Regular)));
            }
        }
        out.extend(self.extra_paths.iter().cloned());
        out
    }

    /// First candidate that exists and parses; `None` if no font is usable.
    pub fn load(&self, family: &str, bold: bool, italic: bool) -> Option<FontArc> {
        for path in self.candidates(family, bold, italic) {
            if let Some(font) = self.load_path(&path) {
                return Some(font);
            }
        }
        warn!(family, bold, italic, "No usable font found");
        None
    }

    /// Whether any font at all can be loaded.
    pub fn has_any(&self) -> bool {
        self.load(FALLBACK_FAMILY, false, false).is_some()
    }

    fn load_path(&self, path: &Path) -> Option<FontArc> {
        if let Ok(cache) = self.cache.lock() {
            if let Some(font) = cache.get(path) {
                return Some(font.clone());
            }
        }
        if !path.is_file() {
            return None;
        }

        let bytes = std::fs::read(path).ok()?;
        match FontArc::try_from_vec(bytes) {
            Ok(font) => {
                debug!(path = %path.display(), "Loaded font");
                if let Ok(mut cache) = self.cache.lock() {
                    cache.insert(path.to_path_buf(), font.clone());
                }
                Some(font)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not parse font");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> FontBook {
        FontBook::with_dirs("/lib", "/win", vec![PathBuf::from("/extra/Font.ttf")])
    }

    #[test]
    fn bold_prefers_bold_file() {
        let c = book().candidates("Arial", true, false);
        assert_eq!(c[0], PathBuf::from("/lib/LiberationSans-Bold.ttf"));
        assert_eq!(c[1], PathBuf::from("/win/arialbd.ttf"));
        assert_eq!(c[2], PathBuf::from("/lib/LiberationSans-Regular.ttf"));
        assert_eq!(c.last(), Some(&PathBuf::from("/extra/Font.ttf")));
    }

    #[test]
    fn unknown_family_uses_arial() {
        let c = book().candidates("Papyrus", false, false);
        assert_eq!(c[0], PathBuf::from("/lib/LiberationSans-Regular.ttf"));
    }

    #[test]
    fn windows_only_family_falls_back_to_liberation_sans() {
        let c = book().candidates("Verdana", false, false);
        assert_eq!(c[0], PathBuf::from("/win/verdana.ttf"));
        assert!(c.contains(&PathBuf::from("/lib/LiberationSans-Regular.ttf")));
    }

    #[test]
    fn missing_and_garbage_fonts_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let garbage = dir.path().join("garbage.ttf");
        std::fs::write(&garbage, b"not a font").unwrap();
        let book = FontBook::with_dirs(dir.path(), dir.path(), vec![garbage]);
        assert!(book.load("Arial", false, false).is_none());
        assert!(!book.has_any());
    }
}
