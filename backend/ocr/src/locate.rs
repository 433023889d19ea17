//! Finding the tesseract binary.
//!
//! Priority: configured path > `PATH` lookup > common Linux paths >
//! common Windows paths.

use serde::Serialize;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Install locations checked when `PATH` has no tesseract (Docker, Heroku apt buildpack).
pub const LINUX_PATHS: &[&str] = &[
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/app/.apt/usr/bin/tesseract",
];

/// Default installer locations for local development on Windows.
pub const WINDOWS_PATHS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocateSource {
    Configured,
    SearchPath,
    CommonPath,
}

impl fmt::Display for LocateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LocateSource::Configured => "configured",
            LocateSource::SearchPath => "PATH",
            LocateSource::CommonPath => "common path",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TesseractLocation {
    pub path: PathBuf,
    pub source: LocateSource,
}

#[derive(Debug, Clone)]
pub struct TesseractLocator {
    configured: Option<PathBuf>,
    search_path: Option<OsString>,
    fallback_paths: Vec<PathBuf>,
}

impl TesseractLocator {
    /// Locator using the process `PATH` and the built-in fallback list.
    pub fn new(configured: Option<PathBuf>) -> Self {
        Self {
            configured,
            search_path: std::env::var_os("PATH"),
            fallback_paths: LINUX_PATHS
                .iter()
                .chain(WINDOWS_PATHS)
                .map(PathBuf::from)
                .collect(),
        }
    }

    pub fn with_search_path(mut self, search_path: Option<OsString>) -> Self {
        self.search_path = search_path;
        self
    }

    pub fn with_fallback_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.fallback_paths = paths;
        self
    }

    pub fn locate(&self) -> Option<TesseractLocation> {
        if let Some(path) = &self.configured {
            if path.is_file() {
                info!(path = %path.display(), "Tesseract from configuration");
                return Some(TesseractLocation {
                    path: path.clone(),
                    source: LocateSource::Configured,
                });
            }
            warn!(path = %path.display(), "Configured tesseract path does not exist; auto-detecting");
        }

        if let Some(path) = self.which() {
            info!(path = %path.display(), "Tesseract auto-detected on PATH");
            return Some(TesseractLocation {
                path,
                source: LocateSource::SearchPath,
            });
        }

        let found = self.fallback_paths.iter().find(|p| p.is_file())?;
        info!(path = %found.display(), "Tesseract found at common path");
        Some(TesseractLocation {
            path: found.clone(),
            source: LocateSource::CommonPath,
        })
    }

    /// First `tesseract` on the search path, like `which tesseract`.
    pub fn which(&self) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        std::env::split_paths(search_path)
            .filter(|dir| !dir.as_os_str().is_empty())
            .flat_map(|dir| executable_names().map(move |name| dir.join(name)))
            .find(|candidate| is_executable(candidate))
    }
}

fn executable_names() -> impl Iterator<Item = &'static str> {
    let names: &'static [&'static str] = if cfg!(windows) {
        &["tesseract.exe", "tesseract"]
    } else {
        &["tesseract"]
    };
    names.iter().copied()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch_executable(path: &Path) {
        fs::write(path, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[test]
    fn configured_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let configured = dir.path().join("my-tesseract");
        touch_executable(&configured);
        let on_path = dir.path().join("bin");
        fs::create_dir(&on_path).unwrap();
        touch_executable(&on_path.join("tesseract"));

        let loc = TesseractLocator::new(Some(configured.clone()))
            .with_search_path(Some(on_path.into_os_string()))
            .locate()
            .unwrap();
        assert_eq!(loc.path, configured);
        assert_eq!(loc.source, LocateSource::Configured);
    }

    #[test]
    fn missing_configured_path_falls_through_to_search_path() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        fs::create_dir(&bin).unwrap();
        touch_executable(&bin.join("tesseract"));

        let loc = TesseractLocator::new(Some(dir.path().join("missing")))
            .with_search_path(Some(bin.clone().into_os_string()))
            .with_fallback_paths(vec![])
            .locate()
            .unwrap();
        assert_eq!(loc.path, bin.join("tesseract"));
        assert_eq!(loc.source, LocateSource::SearchPath);
    }

    #[test]
    fn falls_back_to_common_paths() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("usr-bin-tesseract");
        touch_executable(&fallback);

        let loc = TesseractLocator::new(None)
            .with_search_path(None)
            .with_fallback_paths(vec![dir.path().join("absent"), fallback.clone()])
            .locate()
            .unwrap();
        assert_eq!(loc.path, fallback);
        assert_eq!(loc.source, LocateSource::CommonPath);
    }

    #[test]
    fn nothing_found() {
        let dir = tempfile::tempdir().unwrap();
        let loc = TesseractLocator::new(None)
            .with_search_path(Some(dir.path().as_os_str().to_owned()))
            .with_fallback_paths(vec![dir.path().join("absent")])
            .locate();
        assert!(loc.is_none());
    }
}
