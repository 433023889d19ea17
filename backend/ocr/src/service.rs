//! OCR pipeline: decode, preprocess, recognise, build text blocks.

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;
use textlift_config::OcrConfig;
use textlift_core::{Result, TextBlock, TextliftError};
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{debug, error, info};

use crate::engine::OcrEngine;
use crate::preprocess::prepare_for_ocr;
use crate::tsv::OcrWord;

/// Result of one extraction.
pub struct OcrOutcome {
    /// The decoded upload, before preprocessing.
    pub original: DynamicImage,
    pub blocks: Vec<TextBlock>,
}

pub struct OcrService {
    engine: Arc<dyn OcrEngine>,
    contrast: f32,
    permits: Semaphore,
}

impl OcrService {
    pub fn new(engine: Arc<dyn OcrEngine>, config: &OcrConfig) -> Self {
        let permits = config.max_concurrent.unwrap_or(1).max(1);
        Self {
            engine,
            contrast: config.contrast,
            permits: Semaphore::new(permits),
        }
    }

    pub fn engine(&self) -> &Arc<dyn OcrEngine> {
        &self.engine
    }

    /// Run the full pipeline over raw upload bytes.
    pub async fn extract(&self, bytes: Vec<u8>) -> Result<OcrOutcome> {
        let started = Instant::now();
        let contrast = self.contrast;

        let (original, png) = tokio::task::spawn_blocking(move || decode_and_prepare(&bytes, contrast))
            .await
            .map_err(preparation_failed)??;

        let words = {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|e| TextliftError::Other(e.into()))?;
            debug!(width = original.width(), height = original.height(), "Running OCR");
            self.engine.recognize(png).await?
        };

        let blocks = words_to_blocks(words);
        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(blocks = blocks.len(), elapsed_ms, "Found {} text blocks", blocks.len());

        Ok(OcrOutcome { original, blocks })
    }
}

/// A crashed preparation task is logged; callers only see a generic failure.
fn preparation_failed(err: JoinError) -> TextliftError {
    error!(error = %err, "Image preparation task failed");
    TextliftError::OcrFailed("image preparation failed".into())
}

/// Decode the upload and produce the greyscale PNG handed to the engine.
fn decode_and_prepare(bytes: &[u8], contrast: f32) -> Result<(DynamicImage, Vec<u8>)> {
    let original =
        image::load_from_memory(bytes).map_err(|e| TextliftError::InvalidImage(e.to_string()))?;

    let prepared = DynamicImage::ImageLuma8(prepare_for_ocr(&original, contrast));
    let mut png = Vec::new();
    prepared
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| TextliftError::InvalidImage(e.to_string()))?;
    Ok((original, png))
}

/// One block per recognised word, default styling.
pub fn words_to_blocks(words: Vec<OcrWord>) -> Vec<TextBlock> {
    words
        .into_iter()
        .filter(|w| !w.text.trim().is_empty())
        .map(|w| {
            TextBlock::new(w.text.trim(), w.left, w.top, w.width, w.height).with_confidence(w.conf)
        })
        .collect()
}
