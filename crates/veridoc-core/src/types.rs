// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Domain types for the identity verification pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::VeridocError;

/// A supported identity-document class.
///
/// The set is closed: a stored type tag that does not parse into one of
/// these variants is a data bug, reported as
/// [`VeridocError::UnsupportedDocumentType`]. The type is always looked
/// up from the enrollment record, never inferred from a photographed
/// document — presenting a different (possibly stolen) document of
/// another type must not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Aadhaar — 12-digit national identity number, often space-grouped 4-4-4.
    Aadhaar,
    /// PAN — permanent account number, 5 letters + 4 digits + 1 letter.
    Pan,
    /// Passport number, 1 letter + 7 digits.
    Passport,
    /// Voter ID (EPIC), 3 letters + 7 digits.
    Voter,
}

impl DocumentType {
    /// All supported document types, for enumeration and diagnostics.
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Aadhaar,
        DocumentType::Pan,
        DocumentType::Passport,
        DocumentType::Voter,
    ];

    /// The lowercase tag stored in enrollment records.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Aadhaar => "aadhaar",
            DocumentType::Pan => "pan",
            DocumentType::Passport => "passport",
            DocumentType::Voter => "voter",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = VeridocError;

    /// Parse a stored type tag. Case-insensitive, since enrollment
    /// records captured through the web form are not guaranteed a case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aadhaar" => Ok(DocumentType::Aadhaar),
            "pan" => Ok(DocumentType::Pan),
            "passport" => Ok(DocumentType::Passport),
            "voter" => Ok(DocumentType::Voter),
            other => Err(VeridocError::UnsupportedDocumentType(other.to_string())),
        }
    }
}

/// The (type, value) pair a subject registered at enrollment.
///
/// Owned by the trust store; the pipeline only ever reads it. The type
/// tag is kept as the stored string here and parsed into a
/// [`DocumentType`] at the start of a verification run, so that a
/// corrupt tag surfaces as a configuration error rather than panicking
/// deep in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedIdRecord {
    /// Stored document-type tag, e.g. "aadhaar" or "pan".
    pub id_type: String,
    /// The identity value captured at enrollment (raw or canonical).
    pub id_value: String,
}

/// Outcome of one verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerdictStatus::Pass => f.write_str("PASS"),
            VerdictStatus::Fail => f.write_str("FAIL"),
        }
    }
}

/// The structured result of one verification call.
///
/// Ephemeral — the pipeline never persists it. Callers write it into
/// the verification ledger keyed by subject id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// PASS or FAIL.
    pub status: VerdictStatus,
    /// The document type the subject enrolled with.
    pub expected_type: DocumentType,
    /// Canonical form of the enrolled value.
    pub expected_value: String,
    /// Canonical form of the value found in the image, if any.
    pub extracted_value: Option<String>,
    /// True only when the canonical values are exactly equal.
    #[serde(rename = "match")]
    pub matched: bool,
    /// Present only on the "pattern not located" FAIL path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Verdict {
    /// True when this verdict is the non-exceptional "expected pattern
    /// absent from the extracted text" terminal state.
    pub fn is_not_located(&self) -> bool {
        self.status == VerdictStatus::Fail && self.extracted_value.is_none()
    }
}

/// Lifecycle states recorded in the verification ledger.
///
/// Broader than [`VerdictStatus`]: the ledger also tracks subjects whose
/// document upload has been acknowledged but not yet verified, and
/// subjects whose verification attempt hit an operational error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LedgerStatus {
    Pass,
    Fail,
    Pending,
    Error,
    /// Document photo received, verification not yet run. The wire
    /// string matches what the candidate dashboard already accepts.
    #[serde(rename = "OCR_UPLOADED")]
    Uploaded,
}

impl LedgerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerStatus::Pass => "PASS",
            LedgerStatus::Fail => "FAIL",
            LedgerStatus::Pending => "PENDING",
            LedgerStatus::Error => "ERROR",
            LedgerStatus::Uploaded => "OCR_UPLOADED",
        }
    }
}

impl std::fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<VerdictStatus> for LedgerStatus {
    fn from(status: VerdictStatus) -> Self {
        match status {
            VerdictStatus::Pass => LedgerStatus::Pass,
            VerdictStatus::Fail => LedgerStatus::Fail,
        }
    }
}

impl std::str::FromStr for LedgerStatus {
    type Err = VeridocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PASS" => Ok(LedgerStatus::Pass),
            "FAIL" => Ok(LedgerStatus::Fail),
            "PENDING" => Ok(LedgerStatus::Pending),
            "ERROR" => Ok(LedgerStatus::Error),
            "OCR_UPLOADED" => Ok(LedgerStatus::Uploaded),
            other => Err(VeridocError::Database(format!(
                "unknown ledger status: {other}"
            ))),
        }
    }
}

/// One row of the verification ledger, keyed by subject id.
///
/// The face fields are opaque pass-throughs for a separate biometric
/// subsystem; this pipeline never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub subject_id: i64,
    pub status: LedgerStatus,
    /// Canonical value extracted from the document photo, if any.
    pub extracted_value: Option<String>,
    /// Canonical value from the enrollment record.
    pub expected_value: Option<String>,
    /// Path of the source document image.
    pub image_path: Option<String>,
    /// Reference face image path (pass-through).
    pub face_path: Option<String>,
    /// Live face capture path (pass-through).
    pub face_attempt_path: Option<String>,
    /// Secondary biometric score (pass-through).
    pub face_score: Option<f64>,
    /// When this row was last written.
    pub last_update: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn document_type_tags_round_trip() {
        for doc_type in DocumentType::ALL {
            let parsed = DocumentType::from_str(doc_type.as_str()).expect("tag must parse");
            assert_eq!(parsed, doc_type);
        }
    }

    #[test]
    fn document_type_parse_is_case_insensitive() {
        assert_eq!(
            DocumentType::from_str("Aadhaar").unwrap(),
            DocumentType::Aadhaar
        );
        assert_eq!(DocumentType::from_str(" PAN ").unwrap(), DocumentType::Pan);
    }

    #[test]
    fn unknown_tag_is_configuration_error() {
        let err = DocumentType::from_str("driving-licence").unwrap_err();
        assert!(matches!(err, VeridocError::UnsupportedDocumentType(_)));
    }

    #[test]
    fn verdict_serializes_with_wire_spelling() {
        let verdict = Verdict {
            status: VerdictStatus::Pass,
            expected_type: DocumentType::Pan,
            expected_value: "ABCDE1234F".into(),
            extracted_value: Some("ABCDE1234F".into()),
            matched: true,
            reason: None,
        };
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["status"], "PASS");
        assert_eq!(json["expected_type"], "pan");
        assert_eq!(json["match"], true);
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn ledger_status_round_trip() {
        for status in [
            LedgerStatus::Pass,
            LedgerStatus::Fail,
            LedgerStatus::Pending,
            LedgerStatus::Error,
            LedgerStatus::Uploaded,
        ] {
            assert_eq!(LedgerStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn upload_acknowledgement_uses_dashboard_wire_string() {
        assert_eq!(LedgerStatus::Uploaded.as_str(), "OCR_UPLOADED");
        assert_eq!(
            serde_json::to_value(LedgerStatus::Uploaded).unwrap(),
            "OCR_UPLOADED"
        );
    }
}
