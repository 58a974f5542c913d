//! Shared mirror service used by the CLI and the webhook server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::{
    Database, DatabaseOptions, EntryStore, LibSqlEntryStore, LibSqlRelationWriter, RelationWriter,
};
use crate::models::{EntryPayload, Record};
use crate::registry::ModelRegistry;
use crate::sync::{EntryHandler, Outcome, WebhookAction};
use crate::Result;

/// Thread-safe service applying webhooks to one database.
///
/// Webhooks are applied one at a time; the lock spans the whole
/// read-modify-write of an entry and its relation edges.
#[derive(Clone)]
pub struct MirrorService {
    db: Arc<Mutex<Database>>,
    registry: Arc<ModelRegistry>,
    locale: Arc<str>,
    db_path: Option<PathBuf>,
}

impl MirrorService {
    /// Wrap an open database
    pub fn new(db: Database, registry: ModelRegistry, locale: impl Into<String>) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            registry: Arc::new(registry),
            locale: Arc::from(locale.into()),
            db_path: None,
        }
    }

    /// Open a mirror service at the given filesystem path.
    pub async fn open_path(
        db_path: impl Into<PathBuf>,
        options: DatabaseOptions,
        registry: ModelRegistry,
        locale: impl Into<String>,
    ) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&db_path, options).await?;
        tracing::info!("Opened mirror database at {}", db_path.display());
        let mut service = Self::new(db, registry, locale);
        service.db_path = Some(db_path);
        Ok(service)
    }

    /// Open an in-memory mirror service (primarily for tests).
    pub async fn open_in_memory(registry: ModelRegistry, locale: impl Into<String>) -> Result<Self> {
        let db = Database::open_in_memory(DatabaseOptions::default()).await?;
        Ok(Self::new(db, registry, locale))
    }

    /// Path of the backing database file, if any
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Apply one webhook action
    pub async fn apply(&self, action: &WebhookAction, payload: &EntryPayload) -> Result<Outcome> {
        let db = self.db.lock().await;
        let handler = EntryHandler::new(
            &self.registry,
            LibSqlEntryStore::new(db.connection()),
            LibSqlRelationWriter::new(db.connection()),
            &self.locale,
        );
        handler.handle(action, payload).await
    }

    /// Mirrored rows of a content type
    pub async fn records(&self, content_type: &str) -> Result<Vec<Record>> {
        let model = self.registry.resolve_model(content_type)?;
        let db = self.db.lock().await;
        LibSqlEntryStore::new(db.connection()).list(&model).await
    }

    /// Linked ids of one relation of a mirrored entry
    pub async fn related_ids(
        &self,
        content_type: &str,
        contentful_id: &str,
        relation: &str,
    ) -> Result<Vec<String>> {
        let model = self.registry.resolve_model(content_type)?;
        let db = self.db.lock().await;
        LibSqlRelationWriter::new(db.connection())
            .related_ids(&model.table, contentful_id, relation)
            .await
    }

    /// Run package migrations (for databases opened without them)
    pub async fn migrate(&self) -> Result<()> {
        let db = self.db.lock().await;
        db.migrate().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ContentType, Field};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    fn registry() -> ModelRegistry {
        let mut registry = ModelRegistry::with_defaults("");
        registry.register_schema(
            &[ContentType {
                id: "article".to_string(),
                name: "Article".to_string(),
                display_field: None,
                fields: vec![Field::new("title", "Symbol")],
            }],
            "",
        );
        registry
    }

    fn payload() -> EntryPayload {
        serde_json::from_value(json!({
            "sys": {"id": "abc123", "contentType": {"sys": {"id": "article"}}},
            "fields": {"title": {"en-US": "Hello"}}
        }))
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn apply_and_list() {
        let service = MirrorService::open_in_memory(registry(), "en-US")
            .await
            .unwrap();
        service
            .apply(&WebhookAction::Publish, &payload())
            .await
            .unwrap();

        let records = service.records("article").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].contentful_id, "abc123");
        assert_eq!(records[0].get("title"), &json!("Hello"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_publishes_keep_one_row() {
        let service = MirrorService::open_in_memory(registry(), "en-US")
            .await
            .unwrap();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .apply(&WebhookAction::Publish, &payload())
                        .await
                        .unwrap()
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(service.records("article").await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn open_path_creates_parent_directories() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested").join("mirror.db");
        let service =
            MirrorService::open_path(&path, DatabaseOptions::default(), registry(), "en-US")
                .await
                .unwrap();
        assert_eq!(service.db_path(), Some(path.as_path()));
        assert!(path.exists());
    }
}
