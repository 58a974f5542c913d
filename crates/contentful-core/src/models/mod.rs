//! Data models for the Contentful mirror

mod definition;
mod entry;
mod location;
mod record;

pub use definition::{Column, ModelDefinition, SqlType};
pub use entry::{EntryPayload, EntrySys, MappedRecord, SysLink, SysRef, ASSET_CONTENT_TYPE};
pub use location::Location;
pub use record::Record;

/// Column holding the Contentful entry id; the natural key of every mirror table.
pub const CONTENTFUL_ID: &str = "contentful_id";
