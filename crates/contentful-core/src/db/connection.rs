//! Database connection management

use crate::error::Result;
use libsql::{Builder, Connection, Database as LibSqlDatabase};
use std::path::Path;

use super::migrations;

/// Options applied when opening a database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseOptions {
    /// Create the package tables (`entry_relationships`) on open
    pub run_migrations: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            run_migrations: true,
        }
    }
}

impl DatabaseOptions {
    /// Leave schema management to the application
    #[must_use]
    pub const fn without_migrations(mut self) -> Self {
        self.run_migrations = false;
        self
    }
}

/// Database wrapper for libSQL connections
pub struct Database {
    _db: LibSqlDatabase,
    conn: Connection,
    options: DatabaseOptions,
}

impl Database {
    /// Open a local database at the given path, creating it if it doesn't exist
    pub async fn open(path: impl AsRef<Path>, options: DatabaseOptions) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let db = Builder::new_local(&path_str).build().await?;
        Self::init(db, options).await
    }

    /// Open an in-memory database (useful for testing)
    pub async fn open_in_memory(options: DatabaseOptions) -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        Self::init(db, options).await
    }

    async fn init(db: LibSqlDatabase, options: DatabaseOptions) -> Result<Self> {
        let conn = db.connect()?;
        let database = Self {
            _db: db,
            conn,
            options,
        };
        database.configure().await?;
        if options.run_migrations {
            database.migrate().await?;
        } else {
            tracing::debug!("Skipping package migrations");
        }
        Ok(database)
    }

    /// Configure `SQLite` for a single-writer workload
    async fn configure(&self) -> Result<()> {
        // In-memory databases reject WAL
        self.conn
            .execute("PRAGMA journal_mode = WAL;", ())
            .await
            .ok();
        self.conn
            .execute("PRAGMA synchronous = NORMAL;", ())
            .await
            .ok();
        self.conn.execute("PRAGMA foreign_keys = ON;", ()).await?;
        Ok(())
    }

    /// Run package migrations
    pub async fn migrate(&self) -> Result<()> {
        migrations::run(&self.conn).await
    }

    /// Applied package schema version (0 before the first migration)
    pub async fn schema_version(&self) -> Result<i32> {
        migrations::get_version(&self.conn).await
    }

    /// Options the database was opened with
    pub const fn options(&self) -> DatabaseOptions {
        self.options
    }

    /// Get a reference to the underlying connection
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}
