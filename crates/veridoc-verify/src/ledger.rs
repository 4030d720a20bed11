// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Verification ledger backed by SQLite.
//
// Records the latest verification outcome per subject: status, extracted
// and expected canonical values, the source image, and pass-through face
// fields owned by a separate biometric subsystem. The verification
// engine itself never touches this table — callers persist verdicts.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, instrument};
use veridoc_core::error::{Result, VeridocError};
use veridoc_core::{LedgerEntry, LedgerStatus, Verdict};

/// SQLite schema for the verifications table.
const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS verifications (
        candidate_id INTEGER PRIMARY KEY,
        status TEXT,
        ocr_value TEXT,
        db_value TEXT,
        ocr_path TEXT,
        face_path TEXT,
        face_attempt_path TEXT,
        face_score REAL,
        last_update TEXT
    )
"#;

/// Latest-outcome store, one row per subject.
pub struct VerificationLedger {
    /// The open SQLite connection.
    conn: Connection,
}

impl VerificationLedger {
    /// Open (or create) the ledger database at the given path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| VeridocError::Database(format!("open: {e}")))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| VeridocError::Database(format!("WAL pragma: {e}")))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| VeridocError::Database(format!("create table: {e}")))?;

        info!("verification ledger opened");
        Ok(Self { conn })
    }

    /// Open an in-memory ledger (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| VeridocError::Database(format!("open in-memory: {e}")))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| VeridocError::Database(format!("create table: {e}")))?;

        debug!("in-memory verification ledger opened");
        Ok(Self { conn })
    }

    /// Write (or replace) a subject's verification outcome.
    ///
    /// Face fields of an existing row are preserved — this pipeline does
    /// not own them, so replacing an outcome must not wipe what the
    /// biometric subsystem wrote.
    #[instrument(skip(self, verdict), fields(subject_id, status = %LedgerStatus::from(verdict.status)))]
    pub fn upsert_verdict(
        &self,
        subject_id: i64,
        verdict: &Verdict,
        image_path: Option<&str>,
    ) -> Result<()> {
        self.upsert(
            subject_id,
            verdict.status.into(),
            verdict.extracted_value.as_deref(),
            Some(&verdict.expected_value),
            image_path,
        )
    }

    /// Write a bare status row — used for upload acknowledgements and
    /// per-subject batch errors.
    #[instrument(skip(self), fields(subject_id, %status))]
    pub fn upsert_status(
        &self,
        subject_id: i64,
        status: LedgerStatus,
        image_path: Option<&str>,
    ) -> Result<()> {
        self.upsert(subject_id, status, None, None, image_path)
    }

    fn upsert(
        &self,
        subject_id: i64,
        status: LedgerStatus,
        extracted_value: Option<&str>,
        expected_value: Option<&str>,
        image_path: Option<&str>,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO verifications
                    (candidate_id, status, ocr_value, db_value, ocr_path, last_update)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(candidate_id) DO UPDATE SET
                    status = excluded.status,
                    ocr_value = excluded.ocr_value,
                    db_value = excluded.db_value,
                    ocr_path = excluded.ocr_path,
                    last_update = excluded.last_update",
                params![
                    subject_id,
                    status.as_str(),
                    extracted_value,
                    expected_value,
                    image_path,
                    now,
                ],
            )
            .map_err(|e| VeridocError::Database(format!("upsert: {e}")))?;

        debug!(subject_id, "ledger row written");
        Ok(())
    }

    /// Attach a secondary biometric score to a subject's row.
    ///
    /// Pass-through only — the score is produced and interpreted
    /// elsewhere.
    pub fn set_face_score(&self, subject_id: i64, score: f64) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self
            .conn
            .execute(
                "UPDATE verifications SET face_score = ?2, last_update = ?3
                 WHERE candidate_id = ?1",
                params![subject_id, score, now],
            )
            .map_err(|e| VeridocError::Database(format!("set_face_score: {e}")))?;

        if changed == 0 {
            return Err(VeridocError::SubjectNotFound(subject_id));
        }
        Ok(())
    }

    /// Fetch a subject's latest outcome, or `None` when the subject has
    /// never been through verification.
    pub fn fetch(&self, subject_id: i64) -> Result<Option<LedgerEntry>> {
        self.conn
            .query_row(
                "SELECT candidate_id, status, ocr_value, db_value, ocr_path,
                        face_path, face_attempt_path, face_score, last_update
                 FROM verifications WHERE candidate_id = ?1",
                params![subject_id],
                |row| {
                    Ok(RawRow {
                        subject_id: row.get(0)?,
                        status: row.get(1)?,
                        extracted_value: row.get(2)?,
                        expected_value: row.get(3)?,
                        image_path: row.get(4)?,
                        face_path: row.get(5)?,
                        face_attempt_path: row.get(6)?,
                        face_score: row.get(7)?,
                        last_update: row.get(8)?,
                    })
                },
            )
            .optional()
            .map_err(|e| VeridocError::Database(format!("fetch: {e}")))?
            .map(RawRow::into_entry)
            .transpose()
    }
}

/// Row as stored, before parsing the status and timestamp columns.
struct RawRow {
    subject_id: i64,
    status: Option<String>,
    extracted_value: Option<String>,
    expected_value: Option<String>,
    image_path: Option<String>,
    face_path: Option<String>,
    face_attempt_path: Option<String>,
    face_score: Option<f64>,
    last_update: Option<String>,
}

impl RawRow {
    fn into_entry(self) -> Result<LedgerEntry> {
        let status = self
            .status
            .as_deref()
            .unwrap_or("PENDING")
            .parse::<LedgerStatus>()?;

        let last_update = match self.last_update.as_deref() {
            Some(ts) => DateTime::parse_from_rfc3339(ts)
                .map_err(|e| VeridocError::Database(format!("bad last_update: {e}")))?
                .with_timezone(&Utc),
            None => Utc::now(),
        };

        Ok(LedgerEntry {
            subject_id: self.subject_id,
            status,
            extracted_value: self.extracted_value,
            expected_value: self.expected_value,
            image_path: self.image_path,
            face_path: self.face_path,
            face_attempt_path: self.face_attempt_path,
            face_score: self.face_score,
            last_update,
        })
    }
}
