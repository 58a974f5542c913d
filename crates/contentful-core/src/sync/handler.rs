//! Webhook entry handler: routes an action to an upsert or delete

use crate::db::{EntryStore, RelationWriter};
use crate::error::{Error, Result};
use crate::models::EntryPayload;
use crate::registry::ModelRegistry;

use super::action::{Effect, WebhookAction};

/// Result of handling one webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new row was inserted
    Created {
        table: String,
        contentful_id: String,
        id: i64,
    },
    /// An existing row was updated
    Updated {
        table: String,
        contentful_id: String,
        id: i64,
    },
    /// Rows matching the entry were removed (possibly none)
    Deleted {
        table: String,
        contentful_id: String,
        rows: u64,
    },
    /// The action does not touch the mirror
    Ignored { action: String },
}

/// Applies webhook actions to the mirror
pub struct EntryHandler<'a, S, R> {
    registry: &'a ModelRegistry,
    store: S,
    relations: R,
    locale: &'a str,
}

impl<'a, S: EntryStore, R: RelationWriter> EntryHandler<'a, S, R> {
    pub const fn new(registry: &'a ModelRegistry, store: S, relations: R, locale: &'a str) -> Self {
        Self {
            registry,
            store,
            relations,
            locale,
        }
    }

    /// Handle one webhook action for a payload
    pub async fn handle(&self, action: &WebhookAction, payload: &EntryPayload) -> Result<Outcome> {
        match action.effect() {
            Effect::Upsert => self.upsert(payload).await,
            Effect::Delete => self.delete(payload).await,
            Effect::Ignore => {
                tracing::debug!(action = %action, "Ignoring webhook action");
                Ok(Outcome::Ignored {
                    action: action.to_string(),
                })
            }
        }
    }

    async fn upsert(&self, payload: &EntryPayload) -> Result<Outcome> {
        let content_type = payload.content_type_id()?;
        let model = self.registry.resolve_model(content_type)?;
        let mapper = self.registry.resolve_mapper(content_type)?;

        let contentful_id = payload.id()?;
        let record = mapper.map(payload, self.locale)?;
        match record.contentful_id() {
            Some(mapped) if mapped == contentful_id => {}
            Some(mapped) => {
                return Err(Error::MalformedPayload(format!(
                    "mapper for \"{content_type}\" produced contentful_id \"{mapped}\" for entry \"{contentful_id}\""
                )));
            }
            None => {
                return Err(Error::MalformedPayload(format!(
                    "mapper for \"{content_type}\" produced no contentful_id"
                )));
            }
        }

        self.store.ensure_table(&model).await?;
        let outcome = match self.store.find(&model, contentful_id).await? {
            Some(existing) => {
                let row = self.store.update(&model, existing.id, &record.fields).await?;
                tracing::info!(table = %model.table, contentful_id = %contentful_id, "Updated entry");
                Outcome::Updated {
                    table: model.table.clone(),
                    contentful_id: contentful_id.to_string(),
                    id: row.id,
                }
            }
            None => {
                let row = self.store.insert(&model, &record.fields).await?;
                tracing::info!(table = %model.table, contentful_id = %contentful_id, "Created entry");
                Outcome::Created {
                    table: model.table.clone(),
                    contentful_id: contentful_id.to_string(),
                    id: row.id,
                }
            }
        };

        if !record.relations.is_empty() {
            self.relations
                .handle_relations(&model.table, contentful_id, &record.relations)
                .await?;
        }
        Ok(outcome)
    }

    async fn delete(&self, payload: &EntryPayload) -> Result<Outcome> {
        let content_type = payload.content_type_id()?;
        let model = self.registry.resolve_model(content_type)?;
        let contentful_id = payload.id()?;

        let rows = self.store.delete(&model, contentful_id).await?;
        let edges = self
            .relations
            .remove_relations(&model.table, contentful_id)
            .await?;
        tracing::info!(
            table = %model.table,
            contentful_id,
            rows,
            edges,
            "Deleted entry"
        );

        Ok(Outcome::Deleted {
            table: model.table,
            contentful_id: contentful_id.to_string(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, DatabaseOptions, LibSqlEntryStore, LibSqlRelationWriter};
    use crate::mapper::EntryMapper;
    use crate::models::MappedRecord;
    use crate::schema::{ContentType, Field};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    type Handler<'a> = EntryHandler<'a, LibSqlEntryStore<'a>, LibSqlRelationWriter<'a>>;

    fn registry() -> ModelRegistry {
        let mut related = Field::new("relatedArticles", "Array");
        related.items = Some(crate::schema::FieldItems {
            item_type: "Link".to_string(),
            link_type: Some("Entry".to_string()),
        });
        let article = ContentType {
            id: "article".to_string(),
            name: "Article".to_string(),
            display_field: Some("title".to_string()),
            fields: vec![Field::new("title", "Symbol"), related],
        };
        let mut registry = ModelRegistry::with_defaults("");
        registry.register_schema(&[article], "");
        registry
    }

    fn handler<'a>(db: &'a Database, registry: &'a ModelRegistry) -> Handler<'a> {
        EntryHandler::new(
            registry,
            LibSqlEntryStore::new(db.connection()),
            LibSqlRelationWriter::new(db.connection()),
            "en-US",
        )
    }

    fn article(title: &str) -> EntryPayload {
        serde_json::from_value(json!({
            "sys": {"id": "abc123", "contentType": {"sys": {"id": "article"}}},
            "fields": {"title": {"en": title}}
        }))
        .unwrap()
    }

    async fn setup() -> Database {
        Database::open_in_memory(DatabaseOptions::default())
            .await
            .unwrap()
    }

    async fn count(db: &Database, registry: &ModelRegistry, content_type: &str) -> u64 {
        let model = registry.resolve_model(content_type).unwrap();
        LibSqlEntryStore::new(db.connection())
            .count(&model)
            .await
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn publish_then_unpublish() {
        let db = setup().await;
        let registry = registry();
        let handler = handler(&db, &registry);

        let outcome = handler
            .handle(&WebhookAction::Publish, &article("Hello"))
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Created { ref table, .. } if table == "articles"));

        let model = registry.resolve_model("article").unwrap();
        let row = LibSqlEntryStore::new(db.connection())
            .find(&model, "abc123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.get("title"), &json!("Hello"));

        let outcome = handler
            .handle(&WebhookAction::Unpublish, &article("Hello"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Deleted {
                table: "articles".to_string(),
                contentful_id: "abc123".to_string(),
                rows: 1,
            }
        );
        assert_eq!(count(&db, &registry, "article").await, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn repeated_create_keeps_one_row_with_latest_values() {
        let db = setup().await;
        let registry = registry();
        let handler = handler(&db, &registry);

        handler
            .handle(&WebhookAction::Create, &article("First"))
            .await
            .unwrap();
        let outcome = handler
            .handle(&WebhookAction::Create, &article("Second"))
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Updated { .. }));
        assert_eq!(count(&db, &registry, "article").await, 1);

        let model = registry.resolve_model("article").unwrap();
        let row = LibSqlEntryStore::new(db.connection())
            .find(&model, "abc123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.get("title"), &json!("Second"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn update_preserves_unmapped_columns() {
        let db = setup().await;
        let registry = registry();
        let handler = handler(&db, &registry);

        handler
            .handle(&WebhookAction::Create, &article("First"))
            .await
            .unwrap();
        db.connection()
            .execute("ALTER TABLE articles ADD COLUMN local_note TEXT", ())
            .await
            .unwrap();
        db.connection()
            .execute("UPDATE articles SET local_note = 'keep me'", ())
            .await
            .unwrap();

        handler
            .handle(&WebhookAction::Publish, &article("Second"))
            .await
            .unwrap();

        let model = registry.resolve_model("article").unwrap();
        let row = LibSqlEntryStore::new(db.connection())
            .find(&model, "abc123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.get("local_note"), &json!("keep me"));
        assert_eq!(row.get("title"), &json!("Second"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_of_missing_entry_succeeds() {
        let db = setup().await;
        let registry = registry();
        let handler = handler(&db, &registry);

        for _ in 0..2 {
            let outcome = handler
                .handle(&WebhookAction::Delete, &article("Hello"))
                .await
                .unwrap();
            assert!(matches!(outcome, Outcome::Deleted { rows: 0, .. }));
        }
        assert_eq!(count(&db, &registry, "article").await, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn draft_saves_and_unknown_actions_are_ignored() {
        let db = setup().await;
        let registry = registry();
        let handler = handler(&db, &registry);

        for action in ["save", "auto_save", "transition"] {
            let outcome = handler
                .handle(&WebhookAction::parse(action), &article("Hello"))
                .await
                .unwrap();
            assert!(matches!(outcome, Outcome::Ignored { .. }), "{action}");
        }
        assert_eq!(count(&db, &registry, "article").await, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unknown_content_type_fails_without_mutation() {
        let db = setup().await;
        let registry = registry();
        let handler = handler(&db, &registry);

        let payload: EntryPayload = serde_json::from_value(json!({
            "sys": {"id": "w1", "contentType": {"sys": {"id": "widget"}}},
            "fields": {"title": {"en-US": "Gadget"}}
        }))
        .unwrap();

        let result = handler.handle(&WebhookAction::Create, &payload).await;
        assert!(matches!(result, Err(Error::UnknownModel(id)) if id == "widget"));

        let mut rows = db
            .connection()
            .query(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'widgets'",
                (),
            )
            .await
            .unwrap();
        let tables = rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap();
        assert_eq!(tables, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn payload_without_content_type_is_malformed() {
        let db = setup().await;
        let registry = registry();
        let handler = handler(&db, &registry);

        let payload: EntryPayload =
            serde_json::from_value(json!({"sys": {"id": "abc123"}})).unwrap();
        let result = handler.handle(&WebhookAction::Publish, &payload).await;
        assert!(matches!(result, Err(Error::MalformedPayload(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn relations_follow_the_latest_payload() {
        let db = setup().await;
        let registry = registry();
        let handler = handler(&db, &registry);
        let writer = LibSqlRelationWriter::new(db.connection());

        let with_links = |ids: &[&str]| -> EntryPayload {
            let links: Vec<_> = ids
                .iter()
                .map(|id| json!({"sys": {"type": "Link", "linkType": "Entry", "id": id}}))
                .collect();
            serde_json::from_value(json!({
                "sys": {"id": "abc123", "contentType": {"sys": {"id": "article"}}},
                "fields": {"title": {"en-US": "Hello"}, "relatedArticles": {"en-US": links}}
            }))
            .unwrap()
        };

        handler
            .handle(&WebhookAction::Publish, &with_links(&["a1", "a2"]))
            .await
            .unwrap();
        assert_eq!(
            writer
                .related_ids("articles", "abc123", "related_articles")
                .await
                .unwrap(),
            vec!["a1", "a2"]
        );

        handler
            .handle(&WebhookAction::Publish, &with_links(&["a3"]))
            .await
            .unwrap();
        assert_eq!(
            writer
                .related_ids("articles", "abc123", "related_articles")
                .await
                .unwrap(),
            vec!["a3"]
        );

        handler
            .handle(&WebhookAction::Delete, &with_links(&[]))
            .await
            .unwrap();
        assert!(writer
            .related_ids("articles", "abc123", "related_articles")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn assets_use_the_default_asset_model() {
        let db = setup().await;
        let registry = registry();
        let handler = handler(&db, &registry);

        let payload: EntryPayload = serde_json::from_value(json!({
            "sys": {"id": "img1", "type": "Asset"},
            "fields": {
                "title": {"en-US": "Logo"},
                "file": {"en-US": {"url": "//images.ctfassets.net/logo.png", "fileName": "logo.png"}}
            }
        }))
        .unwrap();

        let outcome = handler
            .handle(&WebhookAction::Publish, &payload)
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Created { ref table, .. } if table == "assets"));
        assert_eq!(count(&db, &registry, "asset").await, 1);
    }

    struct EditorialMapper {
        relation: &'static str,
        related: &'static str,
        contentful_id: Option<&'static str>,
    }

    impl EntryMapper for EditorialMapper {
        fn map(&self, payload: &EntryPayload, _locale: &str) -> Result<MappedRecord> {
            let id = self.contentful_id.map_or(payload.id()?, |id| id);
            let mut record = MappedRecord::new(id);
            record.relate(self.relation, vec![self.related.to_string()]);
            Ok(record)
        }
    }

    fn editorial_registry(
        relation: &'static str,
        related: &'static str,
        contentful_id: Option<&'static str>,
    ) -> ModelRegistry {
        let mut registry = registry();
        registry.register_mapper("article", move || {
            Box::new(EditorialMapper {
                relation,
                related,
                contentful_id,
            })
        });
        registry
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn renamed_relation_does_not_leave_stale_edges() {
        let db = setup().await;
        let writer = LibSqlRelationWriter::new(db.connection());

        let first = editorial_registry("authors", "p1", None);
        handler(&db, &first)
            .handle(&WebhookAction::Publish, &article("Hello"))
            .await
            .unwrap();
        assert_eq!(
            writer.related_ids("articles", "abc123", "authors").await.unwrap(),
            vec!["p1"]
        );

        let second = editorial_registry("editors", "p2", None);
        handler(&db, &second)
            .handle(&WebhookAction::Publish, &article("Hello"))
            .await
            .unwrap();
        assert!(writer
            .related_ids("articles", "abc123", "authors")
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            writer.related_ids("articles", "abc123", "editors").await.unwrap(),
            vec!["p2"]
        );

        let plain = registry();
        handler(&db, &plain)
            .handle(&WebhookAction::Publish, &article("Hello"))
            .await
            .unwrap();
        assert!(writer
            .related_ids("articles", "abc123", "editors")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn mapper_changing_the_entry_id_is_rejected() {
        let db = setup().await;
        let registry = editorial_registry("authors", "p1", Some("other"));
        let handler = handler(&db, &registry);

        let result = handler
            .handle(&WebhookAction::Publish, &article("Hello"))
            .await;
        assert!(matches!(result, Err(Error::MalformedPayload(message)) if message.contains("other")));
        assert_eq!(count(&db, &registry, "article").await, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn publish_and_delete_work_without_migrations() {
        let db = Database::open_in_memory(DatabaseOptions::default().without_migrations())
            .await
            .unwrap();
        let registry = registry();
        let handler = handler(&db, &registry);

        handler
            .handle(&WebhookAction::Publish, &article("Hello"))
            .await
            .unwrap();
        for expected in [1, 0] {
            let outcome = handler
                .handle(&WebhookAction::Delete, &article("Hello"))
                .await
                .unwrap();
            assert!(matches!(outcome, Outcome::Deleted { rows, .. } if rows == expected));
        }
    }
}
