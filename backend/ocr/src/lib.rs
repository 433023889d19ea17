//! Optical Character Recognition (OCR)
//!
//! Bridges the tesseract command-line tool: finds the binary, prepares
//! images, runs recognition and parses the positioned words it reports.

pub mod engine;
pub mod locate;
pub mod preprocess;
pub mod service;
pub mod tsv;

pub use engine::{parse_languages, parse_version, OcrEngine, TesseractEngine};
pub use locate::{LocateSource, TesseractLocation, TesseractLocator, LINUX_PATHS, WINDOWS_PATHS};
pub use preprocess::prepare_for_ocr;
pub use service::{words_to_blocks, OcrOutcome, OcrService};
pub use tsv::{parse_tsv, OcrWord};
