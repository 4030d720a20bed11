// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// veridoc-document — Document-photo processing for the Veridoc pipeline.
//
// Provides image preprocessing (grayscale conversion, denoising, Otsu
// binarization) and OCR-based text extraction. The OCR capability sits
// behind the `TextRecognizer` trait so the rest of the pipeline can be
// tested with scripted recognizers instead of the real engine.

pub mod extract;
pub mod image;
pub mod ocr;

pub use extract::{TextExtractor, TextRecognizer};
pub use image::processor::ImageProcessor;
pub use ocr::{OcrConfig, OcrEngine};
