// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR (Optical Character Recognition) module for Veridoc.
//
// Provides text extraction from photographed identity documents using the
// `ocrs` crate, a pure-Rust OCR engine backed by neural network models
// executed via `rten`.
//
// # Model Setup
//
// The OCR engine requires two ONNX model files:
//
// - **Detection model** (`text-detection.rten`) — locates text regions in the image.
// - **Recognition model** (`text-recognition.rten`) — decodes characters from detected regions.
//
// Models can be downloaded from the ocrs-models repository, or obtained
// automatically by running the `ocrs-cli` tool once:
//   ```sh
//   cargo install ocrs-cli
//   ocrs some-image.png  # downloads models to ~/.cache/ocrs/
//   ```
//
// The default cache directory is `$XDG_CACHE_HOME/ocrs` (typically `~/.cache/ocrs`).

use std::path::{Path, PathBuf};

use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use rten::Model;
use tracing::{debug, info, instrument};
use veridoc_core::error::VeridocError;

use crate::extract::TextRecognizer;

/// Default directory for cached OCR model files.
///
/// Follows the XDG Base Directory specification: `$XDG_CACHE_HOME/ocrs`,
/// falling back to `~/.cache/ocrs` when `XDG_CACHE_HOME` is unset.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        // Last resort — current directory.
        PathBuf::from("ocrs-models")
    }
}

/// Well-known filenames for the detection and recognition models.
const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Configuration for constructing an [`OcrEngine`].
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Path to the text-detection model file (`.rten`).
    pub detection_model_path: PathBuf,
    /// Path to the text-recognition model file (`.rten`).
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    /// Returns a config pointing at the default model cache directory.
    fn default() -> Self {
        let dir = default_model_dir();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }
}

impl OcrConfig {
    /// Create a config with explicit model directory.
    ///
    /// Expects the directory to contain `text-detection.rten` and
    /// `text-recognition.rten`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Create a config pointing at two specific model files.
    pub fn from_paths(
        detection_model: impl Into<PathBuf>,
        recognition_model: impl Into<PathBuf>,
    ) -> Self {
        Self {
            detection_model_path: detection_model.into(),
            recognition_model_path: recognition_model.into(),
        }
    }

    /// Verify that both model files exist and are readable.
    pub fn validate(&self) -> Result<(), VeridocError> {
        if !self.detection_model_path.exists() {
            return Err(VeridocError::Ocr(format!(
                "detection model not found at {}; run `ocrs-cli` once to download models",
                self.detection_model_path.display()
            )));
        }
        if !self.recognition_model_path.exists() {
            return Err(VeridocError::Ocr(format!(
                "recognition model not found at {}; run `ocrs-cli` once to download models",
                self.recognition_model_path.display()
            )));
        }
        Ok(())
    }
}

/// Veridoc OCR engine — extracts text from photographed identity documents.
///
/// Wraps the `ocrs` engine with Veridoc error handling and logging. The
/// engine is initialised once with pre-trained neural network models and
/// can then be reused for many images; it holds only configuration state,
/// so sharing one instance across worker threads is safe.
pub struct OcrEngine {
    /// The underlying `ocrs` engine instance.
    engine: OcrsEngine,
}

impl OcrEngine {
    /// Create a new OCR engine, loading models from the paths given in `config`.
    ///
    /// Model loading is the expensive step — keep the engine around and
    /// recognize many images with it.
    ///
    /// # Errors
    ///
    /// Returns [`VeridocError::Ocr`] if model files are missing or corrupt.
    ///
    /// # Performance
    ///
    /// **Important:** The `ocrs` and `rten` crates must be compiled in release
    /// mode. Debug builds will be extremely slow (10-100x slower).
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: OcrConfig) -> Result<Self, VeridocError> {
        config.validate()?;

        info!("Loading OCR detection model");
        let detection_model = Model::load_file(&config.detection_model_path).map_err(|err| {
            VeridocError::Ocr(format!(
                "failed to load detection model from {}: {}",
                config.detection_model_path.display(),
                err
            ))
        })?;

        info!("Loading OCR recognition model");
        let recognition_model =
            Model::load_file(&config.recognition_model_path).map_err(|err| {
                VeridocError::Ocr(format!(
                    "failed to load recognition model from {}: {}",
                    config.recognition_model_path.display(),
                    err
                ))
            })?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| VeridocError::Ocr(format!("failed to initialise OCR engine: {err}")))?;

        info!("OCR engine initialised successfully");
        Ok(Self { engine })
    }

    /// Create an OCR engine using the default model cache directory.
    ///
    /// Equivalent to `OcrEngine::new(OcrConfig::default())`.
    pub fn with_defaults() -> Result<Self, VeridocError> {
        Self::new(OcrConfig::default())
    }

    /// Create an OCR engine loading models from a specific directory.
    ///
    /// The directory must contain `text-detection.rten` and
    /// `text-recognition.rten`.
    pub fn from_model_dir(dir: impl AsRef<Path>) -> Result<Self, VeridocError> {
        Self::new(OcrConfig::from_dir(dir))
    }
}

impl TextRecognizer for OcrEngine {
    /// Extract all text from a document image.
    ///
    /// Returns the recognised text as a single `String`, with lines
    /// separated by newline characters. No positional or structural
    /// information is retained — photographed ID cards are one dense
    /// text block, so the downstream pattern matcher works on the flat
    /// text alone.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize(&self, image: &DynamicImage) -> Result<String, VeridocError> {
        info!(
            width = image.width(),
            height = image.height(),
            "Starting OCR text recognition"
        );

        // Convert to RGB8 — the format expected by ocrs.
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            VeridocError::Ocr(format!(
                "failed to create image source ({width}x{height}): {err}"
            ))
        })?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| VeridocError::Ocr(format!("OCR preprocessing failed: {err}")))?;

        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| VeridocError::Ocr(format!("OCR text recognition failed: {err}")))?;

        let line_count = text.lines().count();
        let char_count = text.len();
        debug!(line_count, char_count, "OCR recognition complete");

        Ok(text)
    }
}

/// Check whether OCR model files exist in the default cache location.
pub fn models_available() -> bool {
    let config = OcrConfig::default();
    config.detection_model_path.exists() && config.recognition_model_path.exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_to_cache_dir() {
        let config = OcrConfig::default();
        let path_str = config.detection_model_path.to_string_lossy();
        // Should end with the expected filename regardless of platform.
        assert!(
            path_str.ends_with(DETECTION_MODEL_FILENAME),
            "detection model path should end with {DETECTION_MODEL_FILENAME}, got {path_str}"
        );
        let rec_str = config.recognition_model_path.to_string_lossy();
        assert!(
            rec_str.ends_with(RECOGNITION_MODEL_FILENAME),
            "recognition model path should end with {RECOGNITION_MODEL_FILENAME}, got {rec_str}"
        );
    }

    #[test]
    fn config_from_dir() {
        let config = OcrConfig::from_dir("/tmp/my-models");
        assert_eq!(
            config.detection_model_path,
            PathBuf::from("/tmp/my-models/text-detection.rten")
        );
        assert_eq!(
            config.recognition_model_path,
            PathBuf::from("/tmp/my-models/text-recognition.rten")
        );
    }

    #[test]
    fn validate_missing_models() {
        let config = OcrConfig::from_dir("/nonexistent/path/ocr-models");
        let result = config.validate();
        assert!(result.is_err(), "validate should fail for missing models");
    }

    #[test]
    fn models_available_agrees_with_default_validation() {
        // Whether or not this machine has cached models, the cheap
        // availability probe and full validation must not disagree.
        assert_eq!(models_available(), OcrConfig::default().validate().is_ok());
    }
}
