// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch verification — walk the enrollment roster, find each subject's
// uploaded document photo, verify it, and record the outcome in the
// ledger. Per-subject failures are recorded as ERROR rows and never
// abort the batch.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use veridoc_core::error::Result;
use veridoc_core::LedgerStatus;
use veridoc_verify::{SqliteTrustStore, VerificationLedger, Verifier};

/// Outcome counters for one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
}

/// Upload filename extensions tried, in order.
const IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "png"];

/// Locate the uploaded document photo for a subject.
///
/// Upload filenames follow the `ad<N>` convention. Candidates are tried
/// in order:
///
/// 1. `ad{last-two-digits-of-subject-id}` (e.g. subject 216 → `ad16`)
/// 2. `ad{position}` — 1-based position of the subject in the roster
/// 3. `ad{subject_id}`
///
/// each with `.jpg` then `.png`. Returns `None` when nothing matches.
pub fn find_image_for(uploads_dir: &Path, subject_id: i64, position: usize) -> Option<PathBuf> {
    let stems = [
        format!("ad{}", subject_id % 100),
        format!("ad{position}"),
        format!("ad{subject_id}"),
    ];

    for stem in &stems {
        for ext in IMAGE_EXTENSIONS {
            let candidate = uploads_dir.join(format!("{stem}.{ext}"));
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}

/// Verify every enrolled subject with an upload in `uploads_dir`.
///
/// Ledger writes happen here, not inside the verifier — the decision
/// engine stays free of persistence.
pub fn run(
    verifier: &Verifier,
    store: &SqliteTrustStore,
    ledger: &VerificationLedger,
    uploads_dir: &Path,
) -> Result<BatchSummary> {
    let subjects = store.subject_ids()?;
    info!(subjects = subjects.len(), "starting batch verification");

    let mut summary = BatchSummary::default();

    for (idx, subject_id) in subjects.iter().copied().enumerate() {
        let position = idx + 1;
        let Some(image) = find_image_for(uploads_dir, subject_id, position) else {
            warn!(subject_id, "no upload found, skipping");
            summary.skipped += 1;
            continue;
        };
        let image_str = image.display().to_string();

        match verifier.verify(&image, subject_id) {
            Ok(verdict) => {
                info!(
                    subject_id,
                    file = %image.display(),
                    status = %verdict.status,
                    extracted = verdict.extracted_value.as_deref().unwrap_or("-"),
                    expected = %verdict.expected_value,
                    "subject verified"
                );
                ledger.upsert_verdict(subject_id, &verdict, Some(&image_str))?;
                if verdict.matched {
                    summary.passed += 1;
                } else {
                    summary.failed += 1;
                }
            }
            Err(err) => {
                warn!(subject_id, file = %image.display(), error = %err, "verification errored");
                ledger.upsert_status(subject_id, LedgerStatus::Error, Some(&image_str))?;
                summary.errored += 1;
            }
        }
    }

    info!(
        passed = summary.passed,
        failed = summary.failed,
        errored = summary.errored,
        skipped = summary.skipped,
        "batch verification complete"
    );
    Ok(summary)
}
