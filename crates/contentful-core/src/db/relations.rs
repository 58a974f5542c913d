//! Relation edges between mirrored entries

use std::collections::BTreeMap;

use chrono::Utc;
use libsql::Connection;

use crate::error::Result;

/// DDL for the edge table, shared by the v1 migration and on-demand creation
pub const RELATIONSHIPS_DDL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS entry_relationships (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        source_table TEXT NOT NULL,
        source_contentful_id TEXT NOT NULL,
        relation TEXT NOT NULL,
        related_contentful_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        created_at INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS idx_entry_relationships_source
        ON entry_relationships(source_table, source_contentful_id, relation, position)",
    "CREATE INDEX IF NOT EXISTS idx_entry_relationships_related
        ON entry_relationships(related_contentful_id)",
];

/// Trait for relation edge storage (async)
#[allow(async_fn_in_trait)]
pub trait RelationWriter {
    /// Replace every outgoing edge of an entry with `relations`
    async fn handle_relations(
        &self,
        table: &str,
        contentful_id: &str,
        relations: &BTreeMap<String, Vec<String>>,
    ) -> Result<()>;

    /// Drop every outgoing edge of an entry, returning how many were removed
    async fn remove_relations(&self, table: &str, contentful_id: &str) -> Result<u64>;

    /// Linked Contentful ids of one relation, in authored order
    async fn related_ids(
        &self,
        table: &str,
        contentful_id: &str,
        relation: &str,
    ) -> Result<Vec<String>>;
}

/// libSQL implementation of `RelationWriter` backed by `entry_relationships`
pub struct LibSqlRelationWriter<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlRelationWriter<'a> {
    /// Create a new writer with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl RelationWriter for LibSqlRelationWriter<'_> {
    async fn handle_relations(
        &self,
        table: &str,
        contentful_id: &str,
        relations: &BTreeMap<String, Vec<String>>,
    ) -> Result<()> {
        self.ensure_table().await?;
        self.conn.execute("BEGIN TRANSACTION", ()).await?;
        if let Err(e) = self.replace(table, contentful_id, relations).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e);
        }
        if let Err(e) = self.conn.execute("COMMIT", ()).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        tracing::debug!(
            table,
            contentful_id,
            relations = relations.len(),
            "Replaced relation edges"
        );
        Ok(())
    }

    async fn remove_relations(&self, table: &str, contentful_id: &str) -> Result<u64> {
        if !self.table_exists().await? {
            return Ok(0);
        }
        let removed = self
            .conn
            .execute(
                "DELETE FROM entry_relationships
                 WHERE source_table = ? AND source_contentful_id = ?",
                [table, contentful_id],
            )
            .await?;
        Ok(removed)
    }

    async fn related_ids(
        &self,
        table: &str,
        contentful_id: &str,
        relation: &str,
    ) -> Result<Vec<String>> {
        if !self.table_exists().await? {
            return Ok(Vec::new());
        }
        let mut rows = self
            .conn
            .query(
                "SELECT related_contentful_id FROM entry_relationships
                 WHERE source_table = ? AND source_contentful_id = ? AND relation = ?
                 ORDER BY position",
                [table, contentful_id, relation],
            )
            .await?;

        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        Ok(ids)
    }
}

impl LibSqlRelationWriter<'_> {
    async fn replace(
        &self,
        table: &str,
        contentful_id: &str,
        relations: &BTreeMap<String, Vec<String>>,
    ) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM entry_relationships
                 WHERE source_table = ? AND source_contentful_id = ?",
                [table, contentful_id],
            )
            .await?;

        let now = Utc::now().timestamp_millis();
        for (relation, ids) in relations {
            for (position, related) in (0_i64..).zip(ids) {
                self.conn
                    .execute(
                        "INSERT INTO entry_relationships (
                            source_table, source_contentful_id, relation,
                            related_contentful_id, position, created_at
                        ) VALUES (?, ?, ?, ?, ?, ?)",
                        libsql::params![
                            table,
                            contentful_id,
                            relation.as_str(),
                            related.as_str(),
                            position,
                            now
                        ],
                    )
                    .await?;
            }
        }
        Ok(())
    }

    /// Creates the edge table when migrations were skipped
    async fn ensure_table(&self) -> Result<()> {
        if self.table_exists().await? {
            return Ok(());
        }
        for stmt in RELATIONSHIPS_DDL {
            self.conn.execute(*stmt, ()).await?;
        }
        tracing::debug!("Created entry_relationships on demand");
        Ok(())
    }

    async fn table_exists(&self) -> Result<bool> {
        let mut rows = self
            .conn
            .query(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='entry_relationships')",
                (),
            )
            .await?;
        Ok(match rows.next().await? {
            Some(row) => row.get::<i32>(0)? != 0,
            None => false,
        })
    }
}
