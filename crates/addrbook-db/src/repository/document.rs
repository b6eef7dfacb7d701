//! # Document Repository
//!
//! Stores opaque JSON documents grouped by collection path.
//!
//! ## Write Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Document Writes                                      │
//! │                                                                         │
//! │  insert(collection, {street: "Main St"})                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  id = UUID v4  ─────► INSERT (collection, id, data, now, now)          │
//! │                                                                         │
//! │  update(collection, id, {city: "Kyoto"})                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────── SINGLE TRANSACTION ──────────────────────────┐   │
//! │  │  1. SELECT data WHERE collection = ? AND id = ?  (NotFound?)    │   │
//! │  │  2. merge top-level keys: {street: "Main St", city: "Kyoto"}    │   │
//! │  │  3. UPDATE data, updated_at                                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  delete(collection, id) ─────► DELETE, rows_affected == 0 → NotFound   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! `list` returns documents in creation order. Timestamps are written with a
//! fixed microsecond width so text order equals time order; rowid breaks ties.

use addrbook_core::Document;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// A document as persisted, with its bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Id unique within the collection.
    pub id: String,

    /// Document body.
    pub data: Document,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository for document operations.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
}

impl DocumentRepository {
    /// Creates a new DocumentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DocumentRepository { pool }
    }

    /// Lists every document in a collection, oldest first.
    ///
    /// An unknown collection is simply empty.
    pub async fn list(&self, collection: &str) -> DbResult<Vec<StoredDocument>> {
        let rows = sqlx::query(
            r#"
            SELECT id, data, created_at, updated_at
            FROM documents
            WHERE collection = ?1
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        debug!(collection = %collection, count = rows.len(), "Listed documents");

        rows.iter().map(row_to_document).collect()
    }

    /// Gets a single document.
    ///
    /// ## Returns
    /// * `Ok(Some(doc))` - Document found
    /// * `Ok(None)` - No document with that id in the collection
    pub async fn get(&self, collection: &str, id: &str) -> DbResult<Option<StoredDocument>> {
        let row = sqlx::query(
            r#"
            SELECT id, data, created_at, updated_at
            FROM documents
            WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_document).transpose()
    }

    /// Inserts a document under a freshly generated id.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let doc = repo.insert("users/u1/addresses", &fields).await?;
    /// println!("assigned id {}", doc.id);
    /// ```
    pub async fn insert(&self, collection: &str, data: &Document) -> DbResult<StoredDocument> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let body = serde_json::to_string(data)?;

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(collection)
        .bind(&id)
        .bind(&body)
        .bind(format_timestamp(&now))
        .execute(&self.pool)
        .await?;

        debug!(collection = %collection, id = %id, "Inserted document");

        Ok(StoredDocument {
            id,
            data: data.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Merges `data` into an existing document.
    ///
    /// Top-level keys in `data` overwrite the stored ones; keys not named in
    /// `data` are kept.
    ///
    /// ## Returns
    /// * `Ok(doc)` - The merged document
    /// * `Err(DbError::NotFound)` - No such document
    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        data: &Document,
    ) -> DbResult<StoredDocument> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT id, data, created_at, updated_at
            FROM documents
            WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Document", document_path(collection, id)))?;

        let mut merged = row_to_document(&row)?;
        for (key, value) in data {
            merged.data.insert(key.clone(), value.clone());
        }
        merged.updated_at = Utc::now();

        let body = serde_json::to_string(&merged.data)?;

        sqlx::query(
            r#"
            UPDATE documents
            SET data = ?3, updated_at = ?4
            WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(&body)
        .bind(format_timestamp(&merged.updated_at))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(collection = %collection, id = %id, "Updated document");
        Ok(merged)
    }

    /// Deletes a document.
    ///
    /// ## Returns
    /// * `Ok(())` - Deleted
    /// * `Err(DbError::NotFound)` - No such document
    pub async fn delete(&self, collection: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Document", document_path(collection, id)));
        }

        debug!(collection = %collection, id = %id, "Deleted document");
        Ok(())
    }

    /// Counts the documents in a collection.
    pub async fn count(&self, collection: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?1")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

fn row_to_document(row: &SqliteRow) -> DbResult<StoredDocument> {
    let id: String = row.try_get("id")?;
    let body: String = row.try_get("data")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    let data = match serde_json::from_str::<Value>(&body)? {
        Value::Object(map) => map,
        other => {
            return Err(DbError::Serialization(format!(
                "document {} is not an object: {}",
                id, other
            )))
        }
    };

    Ok(StoredDocument {
        id,
        data,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DbError::Serialization(format!("bad timestamp '{}': {}", raw, e)))
}

fn document_path(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, id)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use serde_json::json;

    const COLLECTION: &str = "users/u1/addresses";

    async fn repo() -> DocumentRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.documents()
    }

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_unique_ids() {
        let repo = repo().await;

        let a = repo.insert(COLLECTION, &doc(json!({"street": "Main St"}))).await.unwrap();
        let b = repo.insert(COLLECTION, &doc(json!({"street": "Main St"}))).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(repo.count(COLLECTION).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_keeps_creation_order() {
        let repo = repo().await;
        let mut ids = Vec::new();
        for street in ["First St", "Second St", "Third St"] {
            let stored = repo.insert(COLLECTION, &doc(json!({"street": street}))).await.unwrap();
            ids.push(stored.id);
        }

        let listed: Vec<String> = repo
            .list(COLLECTION)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();

        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let repo = repo().await;
        repo.insert(COLLECTION, &doc(json!({"street": "Main St"}))).await.unwrap();

        assert!(repo.list("users/u2/addresses").await.unwrap().is_empty());
        assert_eq!(repo.count("users/u2/addresses").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_merges_top_level_keys() {
        let repo = repo().await;
        let stored = repo
            .insert(COLLECTION, &doc(json!({"street": "Main St", "zip": "100"})))
            .await
            .unwrap();

        let merged = repo
            .update(COLLECTION, &stored.id, &doc(json!({"zip": "200", "city": "Kyoto"})))
            .await
            .unwrap();

        assert_eq!(
            merged.data,
            doc(json!({"street": "Main St", "zip": "200", "city": "Kyoto"}))
        );
        let reread = repo.get(COLLECTION, &stored.id).await.unwrap().unwrap();
        assert_eq!(reread.data, merged.data);
        assert!(reread.updated_at >= reread.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let repo = repo().await;

        let result = repo.update(COLLECTION, "missing", &doc(json!({"a": 1}))).await;

        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let stored = repo.insert(COLLECTION, &doc(json!({"street": "Main St"}))).await.unwrap();

        repo.delete(COLLECTION, &stored.id).await.unwrap();

        assert!(repo.get(COLLECTION, &stored.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(COLLECTION, &stored.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[test]
    fn test_timestamp_format_roundtrips() {
        let now = Utc::now();
        let parsed = parse_timestamp(&format_timestamp(&now)).unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }
}
