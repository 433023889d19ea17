//! Tesseract command-line invocation.
//!
//! Images are piped on stdin as PNG; `tsv` output is read from stdout.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use textlift_config::OcrConfig;
use textlift_core::{Result, TextliftError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::tsv::{parse_tsv, OcrWord};

/// Cap on metadata commands (`--version`, `--list-langs`).
const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Something that turns an image into positioned words.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Binary (or backend identifier) used for recognition.
    fn command_path(&self) -> &Path;

    async fn version(&self) -> Result<String>;

    async fn languages(&self) -> Result<Vec<String>>;

    /// Recognise words in a PNG-encoded image.
    async fn recognize(&self, png: Vec<u8>) -> Result<Vec<OcrWord>>;
}

#[derive(Debug, Clone)]
pub struct TesseractEngine {
    path: PathBuf,
    language: String,
    oem: u8,
    psm: u8,
    timeout: Duration,
}

impl TesseractEngine {
    pub fn new(path: impl Into<PathBuf>, config: &OcrConfig) -> Self {
        Self {
            path: path.into(),
            language: config.language.clone(),
            oem: config.oem,
            psm: config.psm,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Arguments for a TSV recognition run reading stdin, writing stdout.
    pub fn recognize_args(&self) -> Vec<String> {
        vec![
            "stdin".into(),
            "stdout".into(),
            "-l".into(),
            self.language.clone(),
            "--oem".into(),
            self.oem.to_string(),
            "--psm".into(),
            self.psm.to_string(),
            "tsv".into(),
        ]
    }

    async fn run(&self, args: &[String], input: Option<Vec<u8>>, timeout: Duration) -> Result<Output> {
        let mut cmd = Command::new(&self.path);
        cmd.args(args)
            .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            TextliftError::OcrFailed(format!("failed to start {}: {e}", self.path.display()))
        })?;

        let stdin = child.stdin.take();
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| TextliftError::OcrFailed("stdout not captured".into()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| TextliftError::OcrFailed("stderr not captured".into()))?;

        let result = tokio::time::timeout(timeout, async move {
            let feed = async move {
                if let (Some(mut stdin), Some(bytes)) = (stdin, input) {
                    stdin.write_all(&bytes).await?;
                    stdin.shutdown().await?;
                }
                Ok::<_, std::io::Error>(())
            };

            let mut out = Vec::new();
            let mut err = Vec::new();
            let (fed, read_out, read_err) = tokio::join!(
                feed,
                stdout.read_to_end(&mut out),
                stderr.read_to_end(&mut err)
            );
            read_out?;
            read_err?;
            let status = child.wait().await?;
            // A broken pipe on stdin only matters if the process also failed.
            if let Err(e) = fed {
                if !status.success() {
                    return Err(e);
                }
            }
            Ok::<_, std::io::Error>(Output {
                success: status.success(),
                code: status.code(),
                stdout: String::from_utf8_lossy(&out).into_owned(),
                stderr: String::from_utf8_lossy(&err).into_owned(),
            })
        })
        .await;

        match result {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(TextliftError::OcrFailed(e.to_string())),
            Err(_) => {
                warn!(path = %self.path.display(), "Tesseract timed out after {}s", timeout.as_secs());
                Err(TextliftError::OcrTimeout(timeout.as_secs()))
            }
        }
    }
}

struct Output {
    success: bool,
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl Output {
    fn into_failure(self) -> TextliftError {
        let code = self
            .code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".into());
        let detail = self.stderr.trim();
        if detail.is_empty() {
            TextliftError::OcrFailed(format!("tesseract exited with {code}"))
        } else {
            TextliftError::OcrFailed(format!("tesseract exited with {code}: {detail}"))
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn command_path(&self) -> &Path {
        &self.path
    }

    async fn version(&self) -> Result<String> {
        let output = self.run(&["--version".into()], None, QUERY_TIMEOUT).await?;
        if !output.success {
            return Err(output.into_failure());
        }
        // Tesseract 3.x printed the banner on stderr.
        parse_version(&output.stdout)
            .or_else(|| parse_version(&output.stderr))
            .ok_or_else(|| TextliftError::OcrFailed("unrecognised --version output".into()))
    }

    async fn languages(&self) -> Result<Vec<String>> {
        let output = self.run(&["--list-langs".into()], None, QUERY_TIMEOUT).await?;
        if !output.success {
            return Err(output.into_failure());
        }
        let listing = if output.stdout.trim().is_empty() {
            &output.stderr
        } else {
            &output.stdout
        };
        Ok(parse_languages(listing))
    }

    async fn recognize(&self, png: Vec<u8>) -> Result<Vec<OcrWord>> {
        debug!(bytes = png.len(), lang = %self.language, psm = self.psm, "Running tesseract");
        let output = self.run(&self.recognize_args(), Some(png), self.timeout).await?;
        if !output.success {
            return Err(output.into_failure());
        }
        Ok(parse_tsv(&output.stdout))
    }
}

/// `tesseract 5.3.0` / `tesseract v5.0.0-alpha` → `5.3.0` / `5.0.0-alpha`.
pub fn parse_version(banner: &str) -> Option<String> {
    let first = banner.lines().find(|l| !l.trim().is_empty())?.trim();
    let rest = first.strip_prefix("tesseract")?.trim();
    let version = rest.strip_prefix('v').unwrap_or(rest);
    (!version.is_empty()).then(|| version.to_string())
}

/// Language codes from `--list-langs`, skipping the header line.
pub fn parse_languages(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("List of available languages"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_version_banners() {
        assert_eq!(
            parse_version("tesseract 5.3.0\n leptonica-1.82.0\n").as_deref(),
            Some("5.3.0")
        );
        assert_eq!(
            parse_version("tesseract v5.0.0-alpha.20201127\n").as_deref(),
            Some("5.0.0-alpha.20201127")
        );
        assert_eq!(parse_version("leptonica-1.82.0"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn parses_language_listing() {
        let listing = "List of available languages in \"/usr/share/tesseract-ocr/5/tessdata/\" (2):\neng\nosd\n";
        assert_eq!(parse_languages(listing), vec!["eng", "osd"]);
    }

    #[test]
    fn recognition_args_follow_config() {
        let engine = TesseractEngine::new("/usr/bin/tesseract", &OcrConfig::default());
        assert_eq!(
            engine.recognize_args(),
            vec!["stdin", "stdout", "-l", "eng", "--oem", "3", "--psm", "6", "tsv"]
        );
    }

    #[tokio::test]
    async fn missing_binary_is_ocr_failure() {
        let dir = tempfile::tempdir().unwrap();
        let engine = TesseractEngine::new(dir.path().join("no-tesseract"), &OcrConfig::default());
        let err = engine.version().await.unwrap_err();
        assert!(matches!(err, TextliftError::OcrFailed(_)));
    }
}
