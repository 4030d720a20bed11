// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Verification engine — the PASS/FAIL decision for one document photo.
//
// The run is a linear state machine: lookup, canonicalize-expected,
// extract, constrain-extract, canonicalize-extracted, compare. The
// expected document type is always taken from the enrollment record and
// never inferred from the image. Operational failures (bad image,
// unknown type tag, missing subject) propagate as errors; "the expected
// pattern is simply not in the picture" is an ordinary FAIL verdict.

use tracing::{info, instrument, warn};
use veridoc_core::error::Result;
use veridoc_core::{DocumentType, ExpectedIdRecord, Verdict, VerdictStatus};
use veridoc_document::TextExtractor;
use veridoc_formats::{canonicalize, extract_expected};

/// Reason attached to the verdict when the expected pattern is absent.
pub const REASON_NOT_LOCATED: &str = "expected identity pattern not located in image";

/// Read-only access to enrollment records.
///
/// Implemented by the SQLite trust store in this crate and by in-memory
/// doubles in tests. Connection ownership and concurrency control stay
/// entirely with the implementation; callers wanting parallel batches
/// build one verifier per worker.
pub trait TrustStore {
    /// Fetch the (type, value) pair a subject registered at enrollment.
    ///
    /// Fails with [`VeridocError::SubjectNotFound`] when no record
    /// exists for `subject_id`.
    fn expected_record(&self, subject_id: i64) -> Result<ExpectedIdRecord>;
}

/// The verification decision engine.
///
/// Pure with respect to storage: it reads one enrollment record and
/// produces a [`Verdict`]; persisting the verdict is the caller's
/// responsibility.
pub struct Verifier {
    store: Box<dyn TrustStore>,
    extractor: TextExtractor,
}

impl Verifier {
    /// Build a verifier from a trust store and a text extractor.
    pub fn new(store: Box<dyn TrustStore>, extractor: TextExtractor) -> Self {
        Self { store, extractor }
    }

    /// Verify that the document photographed at `image_path` carries the
    /// identity value `subject_id` enrolled with.
    ///
    /// # Errors
    ///
    /// - [`VeridocError::SubjectNotFound`] — no enrollment record.
    /// - [`VeridocError::UnsupportedDocumentType`] — corrupt type tag in
    ///   the enrollment record.
    /// - [`VeridocError::InvalidImage`] / [`VeridocError::Ocr`] — the
    ///   photo could not be decoded or recognised.
    ///
    /// A missing or mismatching identity value is *not* an error; it is
    /// a FAIL verdict.
    #[instrument(skip_all, fields(subject_id, path = %image_path.as_ref().display()))]
    pub fn verify(
        &self,
        image_path: impl AsRef<std::path::Path>,
        subject_id: i64,
    ) -> Result<Verdict> {
        // Step 1: Lookup — the enrollment record is the source of truth
        // for both the expected type and the expected value.
        let record = self.store.expected_record(subject_id)?;
        let expected_type: DocumentType = record.id_type.parse()?;

        // Step 2: Canonicalize the enrolled value.
        let expected_value = canonicalize(&record.id_value, expected_type);

        // Step 3: Extract text from the photo.
        let text = self.extractor.extract(image_path)?;

        self.decide(subject_id, expected_type, expected_value, &text)
    }

    /// Verify against an already-decoded image. Used by callers that
    /// receive uploads in memory rather than on disk.
    #[instrument(skip_all, fields(subject_id))]
    pub fn verify_image(&self, image: image::DynamicImage, subject_id: i64) -> Result<Verdict> {
        let record = self.store.expected_record(subject_id)?;
        let expected_type: DocumentType = record.id_type.parse()?;
        let expected_value = canonicalize(&record.id_value, expected_type);

        let text = self.extractor.extract_image(image)?;

        self.decide(subject_id, expected_type, expected_value, &text)
    }

    /// Steps 4-6: constrain-extract, canonicalize, compare.
    fn decide(
        &self,
        subject_id: i64,
        expected_type: DocumentType,
        expected_value: String,
        text: &str,
    ) -> Result<Verdict> {
        // Step 4: Extract only the expected document type. Candidates of
        // other types, however plausible, are never considered.
        let Some(candidate) = extract_expected(text, expected_type) else {
            warn!(
                subject_id,
                doc_type = %expected_type,
                "expected identity pattern not located"
            );
            return Ok(Verdict {
                status: VerdictStatus::Fail,
                expected_type,
                expected_value,
                extracted_value: None,
                matched: false,
                reason: Some(REASON_NOT_LOCATED.to_string()),
            });
        };

        // Step 5: Canonicalize the candidate with the same type.
        let extracted_value = canonicalize(&candidate, expected_type);

        // Step 6: Strong identifiers match exactly or not at all.
        let matched = extracted_value == expected_value;
        let status = if matched {
            VerdictStatus::Pass
        } else {
            VerdictStatus::Fail
        };

        info!(subject_id, doc_type = %expected_type, %status, "verification decided");

        Ok(Verdict {
            status,
            expected_type,
            expected_value,
            extracted_value: Some(extracted_value),
            matched,
            reason: None,
        })
    }
}
