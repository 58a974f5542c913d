//! Package migrations.
//!
//! Mirror tables are created on demand per model (see `entry_store`); these
//! migrations only own the shared tables.

use super::relations::RELATIONSHIPS_DDL;
use crate::error::Result;
use libsql::Connection;

/// Current schema version
const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations
pub async fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn).await?;
    if version >= CURRENT_VERSION {
        return Ok(());
    }

    if version < 1 {
        migrate_v1(conn).await?;
    }

    Ok(())
}

/// Get the current schema version
pub async fn get_version(conn: &Connection) -> Result<i32> {
    let mut rows = conn
        .query(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            (),
        )
        .await?;

    let exists: bool = if let Some(row) = rows.next().await? {
        row.get::<i32>(0)? != 0
    } else {
        false
    };

    if !exists {
        return Ok(0);
    }

    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM schema_version", ())
        .await?;

    let version: i32 = if let Some(row) = rows.next().await? {
        row.get(0)?
    } else {
        0
    };

    Ok(version)
}

async fn apply(conn: &Connection, version: i32, statements: &[&str]) -> Result<()> {
    conn.execute("BEGIN TRANSACTION", ()).await?;

    for stmt in statements {
        if let Err(e) = conn.execute(*stmt, ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }
    }
    if let Err(e) = conn
        .execute(
            "INSERT INTO schema_version (version) VALUES (?)",
            [i64::from(version)],
        )
        .await
    {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    tracing::info!("Migrated database to version {version}");
    Ok(())
}

/// Migration to version 1: schema version and relation edges
async fn migrate_v1(conn: &Connection) -> Result<()> {
    let mut statements = vec![
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
    ];
    statements.extend_from_slice(RELATIONSHIPS_DDL);
    apply(conn, 1, &statements).await
}
