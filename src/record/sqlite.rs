//! SQLite-backed record store.
//!
//! A single bundled SQLite database stands in for the system of record. The
//! connection sits behind a `Mutex`; every operation is a short synchronous
//! statement, so the lock is never held across an await point.

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::record::types::{Document, DocumentStatus, NewDocument, RecordError, RecordStore};

/// Record store backed by a local SQLite database.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Open or create the database at the given path and apply the schema.
    pub fn open(path: &str) -> Result<Self, RecordError> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory().map_err(storage)?
        } else {
            if let Some(parent) = Path::new(path).parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|err| RecordError::Storage(err.to_string()))?;
            }
            let conn = Connection::open(path).map_err(storage)?;
            conn.execute_batch("PRAGMA journal_mode=WAL;").map_err(storage)?;
            conn
        };

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                owner_scope TEXT NOT NULL,
                name TEXT NOT NULL,
                location_ref TEXT NOT NULL,
                media_kind TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                error_message TEXT,
                vector_refs TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS memberships (
                principal_id TEXT NOT NULL,
                owner_scope TEXT NOT NULL,
                PRIMARY KEY (principal_id, owner_scope)
            );
            "#,
        )
        .map_err(storage)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a document record in `Pending` with an empty vector set.
    ///
    /// Belongs to the upload flow, which runs before either orchestrator.
    pub fn insert_document(&self, new: NewDocument) -> Result<Document, RecordError> {
        let conn = self.conn.lock().unwrap();
        let now = now_rfc3339();
        let document = Document {
            id: Uuid::new_v4().to_string(),
            owner_scope: new.owner_scope,
            name: new.name,
            location_ref: new.location_ref,
            media_kind: new.media_kind,
            status: DocumentStatus::Pending,
            error_message: None,
            vector_refs: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        };

        conn.execute(
            r#"
            INSERT INTO documents
                (id, owner_scope, name, location_ref, media_kind, status, error_message, vector_refs, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, '[]', ?7, ?8)
            "#,
            params![
                document.id,
                document.owner_scope,
                document.name,
                document.location_ref,
                document.media_kind,
                document.status.as_str(),
                document.created_at,
                document.updated_at,
            ],
        )
        .map_err(storage)?;

        Ok(document)
    }

    /// Register a principal as a member of an owner scope.
    pub fn add_member(&self, principal: &str, owner_scope: &str) -> Result<(), RecordError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO memberships (principal_id, owner_scope) VALUES (?1, ?2)",
            params![principal, owner_scope],
        )
        .map_err(storage)?;
        Ok(())
    }

    /// Fetch a document by id without the ownership constraint.
    ///
    /// Test and tooling helper; request paths go through `find_owned`.
    pub fn get(&self, document_id: &str) -> Result<Option<Document>, RecordError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, owner_scope, name, location_ref, media_kind, status, error_message, vector_refs, created_at, updated_at \
             FROM documents WHERE id = ?1",
            params![document_id],
            row_to_document,
        )
        .optional()
        .map_err(storage)
    }

    fn current_status(
        conn: &Connection,
        document_id: &str,
    ) -> Result<Option<DocumentStatus>, RecordError> {
        let status: Option<String> = conn
            .query_row(
                "SELECT status FROM documents WHERE id = ?1",
                params![document_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(storage)?;

        match status {
            None => Ok(None),
            Some(raw) => DocumentStatus::parse(&raw)
                .map(Some)
                .ok_or_else(|| RecordError::Storage(format!("unknown stored status '{raw}'"))),
        }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn find_owned(
        &self,
        document_id: &str,
        principal: &str,
    ) -> Result<Option<Document>, RecordError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            r#"
            SELECT d.id, d.owner_scope, d.name, d.location_ref, d.media_kind, d.status,
                   d.error_message, d.vector_refs, d.created_at, d.updated_at
            FROM documents d
            WHERE d.id = ?1
              AND EXISTS (
                  SELECT 1 FROM memberships m
                  WHERE m.owner_scope = d.owner_scope AND m.principal_id = ?2
              )
            "#,
            params![document_id, principal],
            row_to_document,
        )
        .optional()
        .map_err(storage)
    }

    async fn mark_processing(
        &self,
        document_id: &str,
        expected: DocumentStatus,
    ) -> Result<(), RecordError> {
        let conn = self.conn.lock().unwrap();
        let rows = conn
            .execute(
                "UPDATE documents SET status = 'processing', error_message = NULL, updated_at = ?3 \
                 WHERE id = ?1 AND status = ?2",
                params![document_id, expected.as_str(), now_rfc3339()],
            )
            .map_err(storage)?;

        if rows > 0 {
            return Ok(());
        }

        match Self::current_status(&conn, document_id)? {
            None => Err(RecordError::Missing),
            Some(_) => Err(RecordError::StatusConflict { expected }),
        }
    }

    async fn mark_completed(
        &self,
        document_id: &str,
        vector_refs: &[String],
    ) -> Result<(), RecordError> {
        let encoded = serde_json::to_string(vector_refs)
            .map_err(|err| RecordError::Storage(err.to_string()))?;
        let conn = self.conn.lock().unwrap();
        let rows = conn
            .execute(
                "UPDATE documents SET status = 'completed', error_message = NULL, vector_refs = ?2, updated_at = ?3 \
                 WHERE id = ?1",
                params![document_id, encoded, now_rfc3339()],
            )
            .map_err(storage)?;

        if rows > 0 { Ok(()) } else { Err(RecordError::Missing) }
    }

    async fn mark_failed(
        &self,
        document_id: &str,
        error_message: &str,
    ) -> Result<(), RecordError> {
        let conn = self.conn.lock().unwrap();
        let rows = conn
            .execute(
                "UPDATE documents SET status = 'failed', error_message = ?2, updated_at = ?3 \
                 WHERE id = ?1",
                params![document_id, error_message, now_rfc3339()],
            )
            .map_err(storage)?;

        if rows > 0 { Ok(()) } else { Err(RecordError::Missing) }
    }

    async fn delete(&self, document_id: &str) -> Result<(), RecordError> {
        let conn = self.conn.lock().unwrap();
        let rows = conn
            .execute("DELETE FROM documents WHERE id = ?1", params![document_id])
            .map_err(storage)?;

        if rows > 0 { Ok(()) } else { Err(RecordError::Missing) }
    }
}

fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
    let raw_status: String = row.get(5)?;
    let raw_refs: String = row.get(7)?;
    Ok(Document {
        id: row.get(0)?,
        owner_scope: row.get(1)?,
        name: row.get(2)?,
        location_ref: row.get(3)?,
        media_kind: row.get(4)?,
        status: DocumentStatus::parse(&raw_status).unwrap_or(DocumentStatus::Pending),
        error_message: row.get(6)?,
        vector_refs: serde_json::from_str(&raw_refs).unwrap_or_default(),
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn storage(err: rusqlite::Error) -> RecordError {
    RecordError::Storage(err.to_string())
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> (SqliteRecordStore, Document) {
        let store = SqliteRecordStore::open(":memory:").expect("open store");
        store.add_member("u1", "s1").expect("membership");
        let document = store
            .insert_document(NewDocument {
                owner_scope: "s1".into(),
                name: "guide.pdf".into(),
                location_ref: "https://blobs.example/uploads/guide.pdf".into(),
                media_kind: "application/pdf".into(),
            })
            .expect("insert");
        (store, document)
    }

    #[tokio::test]
    async fn find_owned_requires_membership() {
        let (store, document) = seeded_store();

        let found = store.find_owned(&document.id, "u1").await.expect("query");
        assert!(found.is_some());

        // Same document, principal outside the owning scope.
        let hidden = store.find_owned(&document.id, "u2").await.expect("query");
        assert!(hidden.is_none());
    }

    #[tokio::test]
    async fn mark_processing_is_conditional_on_status() {
        let (store, document) = seeded_store();

        store
            .mark_processing(&document.id, DocumentStatus::Pending)
            .await
            .expect("first transition");

        let err = store
            .mark_processing(&document.id, DocumentStatus::Pending)
            .await
            .expect_err("stale expectation");
        assert!(matches!(err, RecordError::StatusConflict { .. }));

        let current = store.get(&document.id).expect("get").expect("present");
        assert_eq!(current.status, DocumentStatus::Processing);
        assert!(current.error_message.is_none());
    }

    #[tokio::test]
    async fn completion_replaces_vector_refs_and_clears_error() {
        let (store, document) = seeded_store();

        store
            .mark_failed(&document.id, "rate limited")
            .await
            .expect("fail");
        let failed = store.get(&document.id).expect("get").expect("present");
        assert_eq!(failed.status, DocumentStatus::Failed);
        assert_eq!(failed.error_message.as_deref(), Some("rate limited"));

        store
            .mark_completed(&document.id, &["v1".into(), "v2".into()])
            .await
            .expect("complete");
        store
            .mark_completed(&document.id, &["v3".into()])
            .await
            .expect("complete again");

        let current = store.get(&document.id).expect("get").expect("present");
        assert_eq!(current.status, DocumentStatus::Completed);
        assert_eq!(current.vector_refs, vec!["v3".to_string()]);
        assert!(current.error_message.is_none());
    }

    #[tokio::test]
    async fn delete_is_not_idempotent() {
        let (store, document) = seeded_store();

        store.delete(&document.id).await.expect("delete");
        let err = store.delete(&document.id).await.expect_err("second delete");
        assert!(matches!(err, RecordError::Missing));
        assert!(store.get(&document.id).expect("get").is_none());
    }
}
