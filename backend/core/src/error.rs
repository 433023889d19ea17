use thiserror::Error;

/// Top-level error type for the textlift service.
#[derive(Debug, Error)]
pub enum TextliftError {
    #[error("Tesseract OCR is not configured properly")]
    TesseractNotFound,

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("OCR timed out after {0}s")]
    OcrTimeout(u64),

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TextliftError>;
