//! Content type schema as reported by the Management API

use serde::{Deserialize, Serialize};

use crate::models::{SysRef, ASSET_CONTENT_TYPE};

/// A Contentful content type.
///
/// Deserializes from the Management API shape (`sys.id`) as well as the flat
/// `id` shape this crate serializes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ContentTypeWire")]
pub struct ContentType {
    /// Content type id (e.g. `blogPost`)
    pub id: String,
    /// Human readable name
    pub name: String,
    /// Field used as the entry title in the web app
    #[serde(rename = "displayField", skip_serializing_if = "Option::is_none")]
    pub display_field: Option<String>,
    /// Field schemas
    pub fields: Vec<Field>,
}

impl ContentType {
    /// Synthetic content type for assets, which the API does not list
    pub fn asset() -> Self {
        Self {
            id: ASSET_CONTENT_TYPE.to_string(),
            name: "Asset".to_string(),
            display_field: Some("title".to_string()),
            fields: vec![
                Field::new("title", "Symbol"),
                Field::new("description", "Text"),
                Field::new("file", "Object"),
            ],
        }
    }
}

/// Page of content types (`{ "items": [...] }`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTypeCollection {
    /// Content types of the page
    #[serde(default)]
    pub items: Vec<ContentType>,
    /// Total number of content types in the environment
    #[serde(default)]
    pub total: usize,
}

/// One field of a content type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Field id (camel case as authored in Contentful)
    pub id: String,
    /// Human readable name
    #[serde(default)]
    pub name: String,
    /// `Symbol`, `Text`, `Link`, `Array`, ...
    #[serde(rename = "type")]
    pub field_type: String,
    /// `Entry` or `Asset` for links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    /// Item schema for arrays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<FieldItems>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub localized: bool,
    /// Omitted fields are hidden from the delivery API
    #[serde(default)]
    pub omitted: bool,
}

impl Field {
    /// Create an enabled, optional, non-localized field
    pub fn new(id: impl Into<String>, field_type: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            field_type: field_type.into(),
            link_type: None,
            items: None,
            required: false,
            disabled: false,
            localized: false,
            omitted: false,
        }
    }
}

/// Item schema of an `Array` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldItems {
    /// `Symbol` or `Link`
    #[serde(rename = "type")]
    pub item_type: String,
    /// `Entry` or `Asset` for link items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
}

#[derive(Deserialize)]
struct ContentTypeWire {
    #[serde(default)]
    sys: Option<SysRef>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(rename = "displayField", default)]
    display_field: Option<String>,
    #[serde(default)]
    fields: Vec<Field>,
}

impl TryFrom<ContentTypeWire> for ContentType {
    type Error = String;

    fn try_from(wire: ContentTypeWire) -> Result<Self, Self::Error> {
        let id = wire
            .sys
            .map(|sys| sys.id)
            .or(wire.id)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| "content type is missing sys.id".to_string())?;

        Ok(Self {
            name: if wire.name.is_empty() {
                id.clone()
            } else {
                wire.name
            },
            id,
            display_field: wire.display_field,
            fields: wire.fields,
        })
    }
}
