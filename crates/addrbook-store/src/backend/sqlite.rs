//! # SQLite Document Backend
//!
//! Adapts `addrbook-db`'s [`DocumentRepository`] to the [`DocumentBackend`]
//! port so the store can run against a local database file.

use addrbook_core::Document;
use addrbook_db::{Database, DbError, DocumentRepository};
use async_trait::async_trait;

use super::{DocumentBackend, RemoteDocument};
use crate::error::{BackendError, BackendResult};

/// Document port backed by SQLite.
#[derive(Debug, Clone)]
pub struct SqliteDocumentBackend {
    documents: DocumentRepository,
}

impl SqliteDocumentBackend {
    pub fn new(db: &Database) -> Self {
        SqliteDocumentBackend {
            documents: db.documents(),
        }
    }
}

/// ```text
/// DbError::NotFound                    → BackendError::NotFound
/// DbError::is_transient()             → BackendError::Unavailable
/// DbError::Serialization               → BackendError::InvalidArgument
/// Other                                → BackendError::Internal
/// ```
impl From<DbError> for BackendError {
    fn from(err: DbError) -> Self {
        match err {
            err if err.is_transient() => BackendError::Unavailable(err.to_string()),
            DbError::NotFound { id, .. } => BackendError::NotFound { path: id },
            DbError::Serialization(msg) => BackendError::InvalidArgument(msg),
            other => BackendError::Internal(other.to_string()),
        }
    }
}

#[async_trait]
impl DocumentBackend for SqliteDocumentBackend {
    async fn list(&self, path: &str) -> BackendResult<Vec<RemoteDocument>> {
        let docs = self.documents.list(path).await?;
        Ok(docs
            .into_iter()
            .map(|d| RemoteDocument::new(d.id, d.data))
            .collect())
    }

    async fn add(&self, path: &str, data: &Document) -> BackendResult<String> {
        let mut body = data.clone();
        body.remove("id");
        let stored = self.documents.insert(path, &body).await?;
        Ok(stored.id)
    }

    async fn update(&self, path: &str, id: &str, data: &Document) -> BackendResult<()> {
        let mut body = data.clone();
        body.remove("id");
        self.documents.update(path, id, &body).await?;
        Ok(())
    }

    async fn delete(&self, path: &str, id: &str) -> BackendResult<()> {
        self.documents.delete(path, id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addrbook_db::DbConfig;
    use serde_json::json;

    const PATH: &str = "users/u1/addresses";

    async fn backend() -> SqliteDocumentBackend {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        SqliteDocumentBackend::new(&db)
    }

    #[tokio::test]
    async fn test_add_list_update_delete() {
        let backend = backend().await;
        let body = json!({"street": "Main St"}).as_object().cloned().unwrap();

        let id = backend.add(PATH, &body).await.unwrap();
        let listed = backend.list(PATH).await.unwrap();
        assert_eq!(listed, vec![RemoteDocument::new(id.clone(), body)]);

        let patch = json!({"city": "Kyoto"}).as_object().cloned().unwrap();
        backend.update(PATH, &id, &patch).await.unwrap();
        let listed = backend.list(PATH).await.unwrap();
        assert_eq!(listed[0].data.get("city"), Some(&json!("Kyoto")));
        assert_eq!(listed[0].data.get("street"), Some(&json!("Main St")));

        backend.delete(PATH, &id).await.unwrap();
        assert!(backend.list(PATH).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_document_maps_to_not_found() {
        let backend = backend().await;

        let result = backend.delete(PATH, "missing").await;

        assert_eq!(
            result,
            Err(BackendError::not_found("users/u1/addresses/missing"))
        );
    }

    #[test]
    fn test_transient_db_errors_are_retryable() {
        let err = BackendError::from(DbError::PoolExhausted);
        assert!(err.is_retryable());
        assert!(BackendError::from(DbError::ConnectionFailed("closed".into())).is_retryable());
        assert!(!BackendError::from(DbError::QueryFailed("syntax".into())).is_retryable());
    }
}
