//! Database layer for the mirror

mod connection;
mod entry_store;
mod migrations;
mod relations;

pub use connection::{Database, DatabaseOptions};
pub use entry_store::{EntryStore, LibSqlEntryStore};
pub use relations::{LibSqlRelationWriter, RelationWriter};
