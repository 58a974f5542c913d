//! Entry mappers: payload to column values and relation edges

use serde_json::Value;

use crate::caster;
use crate::error::Result;
use crate::inflect;
use crate::models::{EntryPayload, MappedRecord, ModelDefinition, SqlType};
use crate::schema::{self, ContentType, FieldDefinition};

/// Maps one content type's payloads into records.
///
/// Implementations must always set `contentful_id` and must be deterministic:
/// the same payload and locale always produce the same record.
pub trait EntryMapper: Send + Sync {
    fn map(&self, payload: &EntryPayload, locale: &str) -> Result<MappedRecord>;
}

/// Mapper driven by a content type schema at runtime
#[derive(Debug, Clone)]
pub struct SchemaMapper {
    fields: Vec<FieldDefinition>,
}

impl SchemaMapper {
    pub fn new(prefix: &str, content_type: &ContentType) -> Self {
        let table = inflect::table_name(prefix, &content_type.id);
        Self {
            fields: schema::definitions(&table, &content_type.fields),
        }
    }
}

impl EntryMapper for SchemaMapper {
    fn map(&self, payload: &EntryPayload, locale: &str) -> Result<MappedRecord> {
        let mut record = MappedRecord::new(payload.id()?);
        for field in &self.fields {
            let raw = payload.field(field.field_id(), locale);
            if field.relation().is_some() {
                record.relate(field.column(), field.link_ids(raw));
            } else {
                record.set(field.column(), field.cast(raw));
            }
        }
        Ok(record)
    }
}

/// Built-in mapper for asset payloads
#[derive(Debug, Default, Clone, Copy)]
pub struct AssetMapper;

impl AssetMapper {
    /// Table layout the asset mapper writes to
    pub fn definition(prefix: &str) -> ModelDefinition {
        ModelDefinition::new(
            inflect::model_name(prefix, crate::models::ASSET_CONTENT_TYPE),
            inflect::table_name(prefix, crate::models::ASSET_CONTENT_TYPE),
        )
        .with_column("title", SqlType::Text)
        .with_column("description", SqlType::Text)
        .with_column("url", SqlType::Text)
        .with_column("file_name", SqlType::Text)
        .with_column("content_type", SqlType::Text)
        .with_column("size", SqlType::Integer)
        .with_column("width", SqlType::Integer)
        .with_column("height", SqlType::Integer)
    }
}

impl EntryMapper for AssetMapper {
    fn map(&self, payload: &EntryPayload, locale: &str) -> Result<MappedRecord> {
        let mut record = MappedRecord::new(payload.id()?);
        let file = payload.field("file", locale);
        let file_str = |key: &str| {
            file.and_then(|file| file.get(key))
                .map_or(Value::Null, |value| text_or_null(caster::string(value)))
        };
        let details_int = |pointer: &str| {
            file.and_then(|file| file.pointer(pointer))
                .and_then(caster::integer)
                .map_or(Value::Null, Value::from)
        };

        record
            .set("title", text_field(payload, "title", locale))
            .set("description", text_field(payload, "description", locale))
            .set("url", file_str("url"))
            .set("file_name", file_str("fileName"))
            .set("content_type", file_str("contentType"))
            .set("size", details_int("/details/size"))
            .set("width", details_int("/details/image/width"))
            .set("height", details_int("/details/image/height"));
        Ok(record)
    }
}

fn text_field(payload: &EntryPayload, field_id: &str, locale: &str) -> Value {
    payload
        .field(field_id, locale)
        .map_or(Value::Null, |value| text_or_null(caster::string(value)))
}

fn text_or_null(text: String) -> Value {
    if text.is_empty() {
        Value::Null
    } else {
        Value::String(text)
    }
}
