// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Enrollment trust store backed by SQLite.
//
// Holds the (type, value) pair each subject declared at enrollment. The
// verification pipeline only ever reads this table; writes happen at
// enrollment time through `enroll`.

use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, instrument};
use veridoc_core::error::{Result, VeridocError};
use veridoc_core::{DocumentType, ExpectedIdRecord};

use crate::engine::TrustStore;

/// SQLite schema for the enrollment table.
const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        user_id INTEGER PRIMARY KEY,
        id_type TEXT NOT NULL,
        id_value TEXT NOT NULL
    )
"#;

/// Enrollment records in a local SQLite database.
///
/// All methods are synchronous because `rusqlite` does not support async
/// natively; the verification pipeline is itself a blocking call chain.
pub struct SqliteTrustStore {
    /// The open SQLite connection.
    conn: Connection,
}

impl SqliteTrustStore {
    /// Open (or create) the enrollment database at the given path.
    ///
    /// Applies WAL journal mode for better concurrent-read behaviour and
    /// creates the `users` table if it does not exist.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| VeridocError::Database(format!("open: {e}")))?;

        // WAL mode tolerates a batch writer alongside dashboard readers.
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| VeridocError::Database(format!("WAL pragma: {e}")))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| VeridocError::Database(format!("create table: {e}")))?;

        info!("enrollment database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| VeridocError::Database(format!("open in-memory: {e}")))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| VeridocError::Database(format!("create table: {e}")))?;

        debug!("in-memory enrollment database opened");
        Ok(Self { conn })
    }

    /// Record (or replace) a subject's enrolled identity document.
    ///
    /// The type is taken as a [`DocumentType`] so that only supported
    /// tags ever reach the table.
    #[instrument(skip(self, id_value), fields(subject_id, doc_type = %doc_type))]
    pub fn enroll(&self, subject_id: i64, doc_type: DocumentType, id_value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO users (user_id, id_type, id_value) VALUES (?1, ?2, ?3)",
                params![subject_id, doc_type.as_str(), id_value],
            )
            .map_err(|e| VeridocError::Database(format!("enroll: {e}")))?;
        debug!(subject_id, "subject enrolled");
        Ok(())
    }

    /// Seed the demo roster: one reference subject plus twenty aadhaar
    /// enrollments, ids 200-219.
    ///
    /// Uses `INSERT OR IGNORE`, so re-running against an existing
    /// database neither duplicates nor overwrites records.
    #[instrument(skip(self))]
    pub fn seed_sample_roster(&self) -> Result<()> {
        const ROSTER: [(i64, &str); 21] = [
            (103, "342506531151"),
            (200, "735882193971"),
            (201, "342506531151"),
            (202, "234500000003"),
            (203, "342506531151"),
            (204, "735882193971"),
            (205, "342506531151"),
            (206, "735882193971"),
            (207, "735882193971"),
            (208, "9147385602"),
            (209, "982663598852"),
            (210, "405030827062"),
            (211, "123456789012"),
            (212, "234500000013"),
            (213, "566769986356"),
            (214, "987654321098"),
            (215, "234500000016"),
            (216, "234500000017"),
            (217, "234500000018"),
            (218, "234500000019"),
            (219, "234500000020"),
        ];

        for (subject_id, id_value) in ROSTER {
            self.conn
                .execute(
                    "INSERT OR IGNORE INTO users (user_id, id_type, id_value) VALUES (?1, ?2, ?3)",
                    params![subject_id, DocumentType::Aadhaar.as_str(), id_value],
                )
                .map_err(|e| VeridocError::Database(format!("seed: {e}")))?;
        }

        info!(subjects = ROSTER.len(), "sample roster seeded");
        Ok(())
    }

    /// All enrolled subject ids, in ascending order. Used by the batch
    /// driver to walk the roster.
    pub fn subject_ids(&self) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id FROM users ORDER BY user_id")
            .map_err(|e| VeridocError::Database(format!("prepare subject_ids: {e}")))?;

        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))
            .map_err(|e| VeridocError::Database(format!("query subject_ids: {e}")))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| VeridocError::Database(format!("read subject_ids: {e}")))?;

        Ok(ids)
    }
}

impl TrustStore for SqliteTrustStore {
    fn expected_record(&self, subject_id: i64) -> Result<ExpectedIdRecord> {
        let record = self
            .conn
            .query_row(
                "SELECT id_type, id_value FROM users WHERE user_id = ?1",
                params![subject_id],
                |row| {
                    Ok(ExpectedIdRecord {
                        id_type: row.get(0)?,
                        id_value: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(|e| VeridocError::Database(format!("expected_record: {e}")))?;

        record.ok_or(VeridocError::SubjectNotFound(subject_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enroll_then_fetch_round_trip() {
        let store = SqliteTrustStore::open_in_memory().unwrap();
        store
            .enroll(103, DocumentType::Aadhaar, "342506531151")
            .unwrap();

        let record = store.expected_record(103).unwrap();
        assert_eq!(record.id_type, "aadhaar");
        assert_eq!(record.id_value, "342506531151");
    }

    #[test]
    fn missing_subject_is_not_found() {
        let store = SqliteTrustStore::open_in_memory().unwrap();
        let err = store.expected_record(42).unwrap_err();
        assert!(matches!(err, VeridocError::SubjectNotFound(42)));
    }

    #[test]
    fn enroll_replaces_existing_record() {
        let store = SqliteTrustStore::open_in_memory().unwrap();
        store.enroll(5, DocumentType::Pan, "ABCDE1234F").unwrap();
        store
            .enroll(5, DocumentType::Aadhaar, "342506531151")
            .unwrap();

        let record = store.expected_record(5).unwrap();
        assert_eq!(record.id_type, "aadhaar");
    }

    #[test]
    fn subject_ids_are_ascending() {
        let store = SqliteTrustStore::open_in_memory().unwrap();
        for id in [210, 103, 5] {
            store.enroll(id, DocumentType::Aadhaar, "342506531151").unwrap();
        }
        assert_eq!(store.subject_ids().unwrap(), vec![5, 103, 210]);
    }

    #[test]
    fn seed_populates_roster_without_overwriting() {
        let store = SqliteTrustStore::open_in_memory().unwrap();
        // Pre-existing enrollment must survive the seed untouched.
        store.enroll(103, DocumentType::Pan, "ABCDE1234F").unwrap();

        store.seed_sample_roster().unwrap();
        store.seed_sample_roster().unwrap();

        let ids = store.subject_ids().unwrap();
        assert_eq!(ids.len(), 21, "seeding twice must not duplicate rows");
        assert_eq!(ids.first(), Some(&103));
        assert_eq!(ids.last(), Some(&219));

        let record = store.expected_record(103).unwrap();
        assert_eq!(record.id_type, "pan");
        assert_eq!(record.id_value, "ABCDE1234F");

        let record = store.expected_record(209).unwrap();
        assert_eq!(record.id_value, "982663598852");
    }

    #[test]
    fn open_on_disk_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");

        {
            let store = SqliteTrustStore::open(&path).unwrap();
            store.enroll(103, DocumentType::Pan, "ABCDE1234F").unwrap();
        }

        let store = SqliteTrustStore::open(&path).unwrap();
        let record = store.expected_record(103).unwrap();
        assert_eq!(record.id_value, "ABCDE1234F");
    }
}
