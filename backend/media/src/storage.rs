//! Upload directory: sanitised names, saving, and lookups that cannot
//! escape the directory.

use std::path::{Path, PathBuf};
use textlift_core::{Result, TextliftError};
use tokio::fs;
use tracing::debug;

/// Prefix of rendered copies written next to the original upload.
pub const EDITED_PREFIX: &str = "edited_";

/// Reduce a client-supplied name to a safe flat file name.
///
/// Non-ASCII characters are dropped, path separators become word breaks,
/// whitespace runs become `_`, and only `[A-Za-z0-9_.-]` survive. Leading
/// and trailing `.`/`_` are stripped. `None` if nothing is left.
pub fn secure_filename(name: &str) -> Option<String> {
    let ascii: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Absolute form of the upload directory, for diagnostics.
    pub fn absolute_dir(&self) -> PathBuf {
        std::path::absolute(&self.dir).unwrap_or_else(|_| self.dir.clone())
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Whether a file can be created in the upload directory right now.
    pub async fn is_writable(&self) -> bool {
        let marker = self.dir.join(".write-check");
        match fs::write(&marker, b"ok").await {
            Ok(()) => {
                let _ = fs::remove_file(&marker).await;
                true
            }
            Err(_) => false,
        }
    }

    /// Store an upload under its sanitised name; returns the stored path.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let name = secure_filename(filename).ok_or_else(|| {
            TextliftError::InvalidRequest(format!("Invalid filename: {filename:?}"))
        })?;
        let path = self.dir.join(&name);
        fs::write(&path, bytes).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "File saved");
        Ok(path)
    }

    /// Existing file in the upload directory with this (sanitised) name.
    pub async fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let name = secure_filename(filename)?;
        let path = self.dir.join(name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(path),
            _ => None,
        }
    }

    /// Resolve a path previously handed to the client.
    ///
    /// Only the final component is honoured, so any directory the client
    /// names is ignored in favour of the upload directory.
    pub async fn resolve_client_path(&self, image_path: &str) -> Option<PathBuf> {
        let basename = image_path
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or(image_path);
        self.resolve(basename).await
    }

    /// Name of the rendered copy of `original`.
    pub fn edited_name(&self, original: &Path) -> Option<String> {
        let base = original.file_name()?.to_str()?;
        secure_filename(&format!("{EDITED_PREFIX}{base}"))
    }
}
