//! Entry payload and mapped record models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::CONTENTFUL_ID;
use crate::error::{Error, Result};

/// Content type id that asset payloads resolve to.
pub const ASSET_CONTENT_TYPE: &str = "asset";

/// `{ "sys": { "id": ... } }` reference as found in `contentType` links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SysLink {
    /// Linked system metadata
    pub sys: SysRef,
}

/// The `sys` block of a link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SysRef {
    /// Linked id
    pub id: String,
}

/// The `sys` block of an entry or asset payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySys {
    /// Contentful id of the entry
    #[serde(default)]
    pub id: Option<String>,
    /// `Entry`, `Asset`, `DeletedEntry`, `DeletedAsset`, ...
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Content type link (absent on assets)
    #[serde(rename = "contentType", default)]
    pub content_type: Option<SysLink>,
}

/// Webhook / API representation of one entry.
///
/// `fields` maps field id to a `{ locale: value }` object. Delete and
/// unpublish payloads only carry `sys`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryPayload {
    /// System metadata
    #[serde(default)]
    pub sys: EntrySys,
    /// Localized field values
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl EntryPayload {
    /// Contentful id of the entry (`sys.id`)
    pub fn id(&self) -> Result<&str> {
        self.sys
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::MalformedPayload("missing sys.id".into()))
    }

    /// Whether the payload describes an asset rather than an entry
    pub fn is_asset(&self) -> bool {
        matches!(self.sys.kind.as_deref(), Some("Asset" | "DeletedAsset"))
    }

    /// Content type id (`sys.contentType.sys.id`, or `asset` for assets)
    pub fn content_type_id(&self) -> Result<&str> {
        if self.is_asset() {
            return Ok(ASSET_CONTENT_TYPE);
        }
        self.sys
            .content_type
            .as_ref()
            .map(|link| link.sys.id.as_str())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::MalformedPayload("missing sys.contentType.sys.id".into()))
    }

    /// Value of a field for the given locale.
    ///
    /// Falls back to the first locale present when the requested one is
    /// missing. Non-object field values are returned as-is.
    pub fn field(&self, field_id: &str, locale: &str) -> Option<&Value> {
        match self.fields.get(field_id)? {
            Value::Object(locales) => locales
                .get(locale)
                .or_else(|| locales.values().next())
                .filter(|value| !value.is_null()),
            Value::Null => None,
            other => Some(other),
        }
    }
}

/// Output of a mapper: column values plus outgoing relation edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappedRecord {
    /// Column values, always including `contentful_id`
    pub fields: BTreeMap<String, Value>,
    /// Relation name to linked Contentful ids, in order
    #[serde(default)]
    pub relations: BTreeMap<String, Vec<String>>,
}

impl MappedRecord {
    /// Create a record keyed by the given Contentful id
    pub fn new(contentful_id: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(CONTENTFUL_ID.to_string(), Value::String(contentful_id.into()));
        Self {
            fields,
            relations: BTreeMap::new(),
        }
    }

    /// Set a column value
    pub fn set(&mut self, column: impl Into<String>, value: Value) -> &mut Self {
        self.fields.insert(column.into(), value);
        self
    }

    /// Replace a relation's linked ids
    pub fn relate(&mut self, relation: impl Into<String>, ids: Vec<String>) -> &mut Self {
        self.relations.insert(relation.into(), ids);
        self
    }

    /// The mandatory `contentful_id` field
    pub fn contentful_id(&self) -> Option<&str> {
        self.fields
            .get(CONTENTFUL_ID)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article_payload() -> EntryPayload {
        serde_json::from_value(json!({
            "sys": {
                "id": "abc123",
                "type": "Entry",
                "contentType": {"sys": {"type": "Link", "linkType": "ContentType", "id": "article"}}
            },
            "fields": {
                "title": {"en-US": "Hello", "nl": "Hallo"},
                "summary": {"nl": "Samenvatting"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn reads_ids_from_sys() {
        let payload = article_payload();
        assert_eq!(payload.id().unwrap(), "abc123");
        assert_eq!(payload.content_type_id().unwrap(), "article");
        assert!(!payload.is_asset());
    }

    #[test]
    fn field_prefers_locale_then_falls_back() {
        let payload = article_payload();
        assert_eq!(payload.field("title", "nl"), Some(&json!("Hallo")));
        assert_eq!(payload.field("summary", "en-US"), Some(&json!("Samenvatting")));
        assert_eq!(payload.field("missing", "en-US"), None);
    }

    #[test]
    fn missing_sys_is_malformed() {
        let payload: EntryPayload = serde_json::from_value(json!({"fields": {}})).unwrap();
        assert!(matches!(payload.id(), Err(Error::MalformedPayload(_))));
        assert!(matches!(
            payload.content_type_id(),
            Err(Error::MalformedPayload(_))
        ));
    }

    #[test]
    fn asset_payload_resolves_to_asset_content_type() {
        let payload: EntryPayload =
            serde_json::from_value(json!({"sys": {"id": "img1", "type": "DeletedAsset"}})).unwrap();
        assert_eq!(payload.content_type_id().unwrap(), ASSET_CONTENT_TYPE);
    }

    #[test]
    fn mapped_record_carries_contentful_id() {
        let mut record = MappedRecord::new("abc123");
        record
            .set("title", json!("Hello"))
            .relate("authors", vec!["a1".into()]);
        assert_eq!(record.contentful_id(), Some("abc123"));
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.relations["authors"], vec!["a1".to_string()]);
    }
}
