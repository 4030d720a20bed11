// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text extraction — the image-to-text step of the verification pipeline.
//
// Preprocessing runs in a fixed order: load, grayscale, optional
// Gaussian denoise, contrast boost, Otsu binarization. The binarized
// image is handed to an injected `TextRecognizer`, so pipeline tests
// can script the recognition step instead of loading neural network
// models.

use image::DynamicImage;
use tracing::{debug, instrument};
use veridoc_core::error::VeridocError;

use crate::image::processor::ImageProcessor;

/// An external text-recognition capability.
///
/// The real engine holds only loaded models and configuration, no
/// mutable shared buffers, so callers wanting parallel batches can
/// instantiate one recognizer per worker.
pub trait TextRecognizer {
    /// Recognize all text in an image, returning it as one unstructured
    /// string.
    fn recognize(&self, image: &DynamicImage) -> Result<String, VeridocError>;
}

/// Default Gaussian sigma for the denoise step.
const DENOISE_SIGMA: f32 = 1.2;

/// Default contrast boost applied before binarization.
const CONTRAST_FACTOR: f32 = 1.4;

/// Image-to-text extraction engine.
///
/// Owns the recognizer and applies the document-photo preprocessing
/// pipeline before recognition. Extraction quality is the main source
/// of noisy downstream candidates, so this is the first place to add
/// retries or quality gates when extending the system.
pub struct TextExtractor {
    recognizer: Box<dyn TextRecognizer>,
    denoise: bool,
    contrast: f32,
}

impl TextExtractor {
    /// Create an extractor around the given recognizer, with denoising
    /// enabled and the default contrast boost.
    pub fn new(recognizer: Box<dyn TextRecognizer>) -> Self {
        Self {
            recognizer,
            denoise: true,
            contrast: CONTRAST_FACTOR,
        }
    }

    /// Toggle the Gaussian denoise step.
    pub fn with_denoise(mut self, denoise: bool) -> Self {
        self.denoise = denoise;
        self
    }

    /// Override the contrast boost factor (1.0 disables it).
    pub fn with_contrast(mut self, factor: f32) -> Self {
        self.contrast = factor;
        self
    }

    /// Extract text from an image file.
    ///
    /// Fails with [`VeridocError::InvalidImage`] when the path does not
    /// resolve to a decodable image, or [`VeridocError::Ocr`] when
    /// recognition itself fails.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn extract(&self, path: impl AsRef<std::path::Path>) -> Result<String, VeridocError> {
        let processor = ImageProcessor::open(path)?;
        self.extract_processed(processor)
    }

    /// Extract text from an already-decoded image.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn extract_image(&self, image: DynamicImage) -> Result<String, VeridocError> {
        self.extract_processed(ImageProcessor::from_dynamic(image))
    }

    fn extract_processed(&self, processor: ImageProcessor) -> Result<String, VeridocError> {
        let mut processor = processor.grayscale();
        if self.denoise {
            processor = processor.denoise(DENOISE_SIGMA);
        }
        let binarized = processor
            .adjust_contrast(self.contrast)
            .binarize_otsu()
            .into_dynamic();

        let text = self.recognizer.recognize(&binarized)?;
        debug!(text_len = text.len(), "text extraction complete");
        Ok(text)
    }
}
