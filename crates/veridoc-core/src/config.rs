// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Persistent application settings for the verification service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path of the enrollment (trust store) database.
    pub users_db_path: PathBuf,
    /// Path of the verification ledger database.
    pub verify_db_path: PathBuf,
    /// Directory holding uploaded document photos.
    pub uploads_dir: PathBuf,
    /// Directory holding the OCR model files; `None` uses the model cache.
    pub ocr_model_dir: Option<PathBuf>,
    /// Apply Gaussian denoising before binarization.
    pub denoise_before_binarize: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            users_db_path: PathBuf::from("users.db"),
            verify_db_path: PathBuf::from("verify.db"),
            uploads_dir: PathBuf::from("uploads/ocr"),
            ocr_model_dir: None,
            denoise_before_binarize: true,
        }
    }
}
