// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Veridoc.
//
// The pipeline distinguishes operational failures (bad uploads, unknown
// document types, missing enrollment records) from ordinary FAIL verdicts.
// Failures are surfaced as distinct variants and never collapsed into a
// verdict, so callers can tell "prompt for a re-upload" apart from
// "genuine identity mismatch".

use thiserror::Error;

/// Top-level error type for all Veridoc operations.
#[derive(Debug, Error)]
pub enum VeridocError {
    // -- Configuration errors --
    #[error("unsupported document type: {0}")]
    UnsupportedDocumentType(String),

    // -- Input errors --
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    // -- Lookup errors --
    #[error("no enrollment record for subject {0}")]
    SubjectNotFound(i64),

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VeridocError>;

impl VeridocError {
    /// Whether a retry with corrected input can succeed.
    ///
    /// Undecodable images and OCR failures are worth a fresh upload;
    /// unknown document types and missing subjects indicate a data bug
    /// upstream and retrying the same call cannot help.
    pub fn retriable_with_new_input(&self) -> bool {
        matches!(self, Self::InvalidImage(_) | Self::Ocr(_) | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_subject_id() {
        let err = VeridocError::SubjectNotFound(217);
        assert!(err.to_string().contains("217"));
    }

    #[test]
    fn retriability_classification() {
        assert!(VeridocError::InvalidImage("truncated jpeg".into()).retriable_with_new_input());
        assert!(!VeridocError::UnsupportedDocumentType("dl".into()).retriable_with_new_input());
        assert!(!VeridocError::SubjectNotFound(5).retriable_with_new_input());
    }
}
