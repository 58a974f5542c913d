//! Field definitions: per-field-type code generation and cast rules

use serde_json::{Number, Value};

use super::content_type::Field;
use crate::caster;
use crate::inflect;
use crate::models::SqlType;
use crate::template::{Substitutions, Template};

/// Table holding relation edges for every mirrored content type.
pub const RELATIONSHIPS_TABLE: &str = "entry_relationships";

/// Target of a `Link` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkType {
    Entry,
    Asset,
}

impl LinkType {
    fn parse(value: Option<&str>) -> Option<Self> {
        match value? {
            "Entry" => Some(Self::Entry),
            "Asset" => Some(Self::Asset),
            _ => None,
        }
    }

    const fn rust_path(self) -> &'static str {
        match self {
            Self::Entry => "LinkType::Entry",
            Self::Asset => "LinkType::Asset",
        }
    }
}

/// Item type of an `Array` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayItems {
    Symbol,
    Link(LinkType),
}

/// How many targets a relation field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    One,
    Many,
}

/// Kind of a content-type field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Symbol,
    /// Long text, stored raw and rendered as markdown on read
    Text,
    RichText,
    Integer,
    Number,
    Boolean,
    Date,
    Location,
    Object,
    Link(LinkType),
    Array(ArrayItems),
}

impl FieldKind {
    /// Kind of a field schema, `None` for types this crate does not know
    pub fn from_field(field: &Field) -> Option<Self> {
        let kind = match field.field_type.as_str() {
            "Symbol" => Self::Symbol,
            "Text" => Self::Text,
            "RichText" => Self::RichText,
            "Integer" => Self::Integer,
            "Number" => Self::Number,
            "Boolean" => Self::Boolean,
            "Date" => Self::Date,
            "Location" => Self::Location,
            "Object" => Self::Object,
            "Link" => Self::Link(LinkType::parse(field.link_type.as_deref())?),
            "Array" => {
                let items = field.items.as_ref()?;
                match items.item_type.as_str() {
                    "Symbol" => Self::Array(ArrayItems::Symbol),
                    "Link" => Self::Array(ArrayItems::Link(LinkType::parse(
                        items.link_type.as_deref(),
                    )?)),
                    _ => return None,
                }
            }
            _ => return None,
        };
        Some(kind)
    }

    /// Column type for scalar kinds; relation kinds have no column
    pub const fn sql_type(self) -> Option<SqlType> {
        match self {
            Self::Symbol | Self::Text => Some(SqlType::Text),
            Self::Integer => Some(SqlType::Integer),
            Self::Number => Some(SqlType::Real),
            Self::Boolean => Some(SqlType::Boolean),
            Self::Date => Some(SqlType::Timestamp),
            Self::RichText | Self::Location | Self::Object | Self::Array(ArrayItems::Symbol) => {
                Some(SqlType::Json)
            }
            Self::Link(_) | Self::Array(ArrayItems::Link(_)) => None,
        }
    }

    /// Cardinality for relation kinds
    pub const fn cardinality(self) -> Option<Cardinality> {
        match self {
            Self::Link(_) => Some(Cardinality::One),
            Self::Array(ArrayItems::Link(_)) => Some(Cardinality::Many),
            _ => None,
        }
    }

    /// Link target for relation kinds
    pub const fn link_type(self) -> Option<LinkType> {
        match self {
            Self::Link(link_type) | Self::Array(ArrayItems::Link(link_type)) => Some(link_type),
            _ => None,
        }
    }

    /// Cast a raw payload value into its column value (`null` when absent)
    pub fn cast(self, raw: Option<&Value>) -> Value {
        let Some(raw) = raw.filter(|value| !value.is_null()) else {
            return Value::Null;
        };

        match self {
            Self::Symbol | Self::Text | Self::Date => Value::String(caster::string(raw)),
            Self::Integer => caster::integer(raw).map_or(Value::Null, Value::from),
            Self::Number => caster::number(raw)
                .and_then(Number::from_f64)
                .map_or(Value::Null, Value::Number),
            Self::Boolean => Value::Bool(caster::boolean(raw)),
            Self::RichText | Self::Location | Self::Object | Self::Array(ArrayItems::Symbol) => {
                let json = caster::to_json(raw);
                if json.is_empty() {
                    Value::Null
                } else {
                    Value::String(json)
                }
            }
            Self::Link(_) | Self::Array(ArrayItems::Link(_)) => Value::Null,
        }
    }

    /// Linked Contentful ids of a relation value (empty for scalar kinds)
    pub fn link_ids(self, raw: Option<&Value>) -> Vec<String> {
        match (self.cardinality(), raw) {
            (Some(_), Some(value)) => caster::entry_ids(value),
            _ => Vec::new(),
        }
    }

    /// Rust type a generated getter returns, used in property docs
    pub const fn rust_type(self) -> &'static str {
        match self {
            Self::Symbol | Self::Text => "String",
            Self::Integer => "Option<i64>",
            Self::Number => "Option<f64>",
            Self::Boolean => "bool",
            Self::Date => "Option<DateTime<Utc>>",
            Self::Location => "Option<Location>",
            Self::RichText | Self::Object => "Option<Value>",
            Self::Array(ArrayItems::Symbol) => "Vec<String>",
            Self::Link(_) => "Option<String> (linked id)",
            Self::Array(ArrayItems::Link(_)) => "Vec<String> (linked ids)",
        }
    }

    /// Rust expression naming this kind in generated mappers
    pub fn rust_path(self) -> String {
        match self {
            Self::Symbol => "FieldKind::Symbol".to_string(),
            Self::Text => "FieldKind::Text".to_string(),
            Self::RichText => "FieldKind::RichText".to_string(),
            Self::Integer => "FieldKind::Integer".to_string(),
            Self::Number => "FieldKind::Number".to_string(),
            Self::Boolean => "FieldKind::Boolean".to_string(),
            Self::Date => "FieldKind::Date".to_string(),
            Self::Location => "FieldKind::Location".to_string(),
            Self::Object => "FieldKind::Object".to_string(),
            Self::Link(link_type) => format!("FieldKind::Link({})", link_type.rust_path()),
            Self::Array(ArrayItems::Symbol) => "FieldKind::Array(ArrayItems::Symbol)".to_string(),
            Self::Array(ArrayItems::Link(link_type)) => {
                format!("FieldKind::Array(ArrayItems::Link({}))", link_type.rust_path())
            }
        }
    }

    const fn getter_stub(self) -> &'static str {
        match self {
            Self::Symbol => include_str!("../../templates/fields/string.stub"),
            Self::Text => include_str!("../../templates/fields/markdown.stub"),
            Self::Integer => include_str!("../../templates/fields/integer.stub"),
            Self::Number => include_str!("../../templates/fields/number.stub"),
            Self::Boolean => include_str!("../../templates/fields/boolean.stub"),
            Self::Date => include_str!("../../templates/fields/date.stub"),
            Self::Location => include_str!("../../templates/fields/location.stub"),
            Self::RichText | Self::Object => include_str!("../../templates/fields/json.stub"),
            Self::Array(ArrayItems::Symbol) => include_str!("../../templates/fields/symbols.stub"),
            Self::Link(_) => include_str!("../../templates/fields/link.stub"),
            Self::Array(ArrayItems::Link(_)) => include_str!("../../templates/fields/links.stub"),
        }
    }
}

/// Relation materialized by a link field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDescriptor {
    /// Relation name (the field's column name)
    pub name: String,
    /// Table the edges live in
    pub table: &'static str,
    pub cardinality: Cardinality,
    pub link_type: LinkType,
}

/// A field of a content type, resolved to its kind.
///
/// The snake-cased field id is the single source of truth for the column
/// name, the accessor name, and the template substitution key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    table: String,
    field: Field,
    kind: FieldKind,
}

impl FieldDefinition {
    /// Resolve a field; disabled, omitted, and unknown fields yield `None`
    pub fn new(table: impl Into<String>, field: &Field) -> Option<Self> {
        if field.disabled || field.omitted {
            return None;
        }
        let kind = FieldKind::from_field(field)?;
        Some(Self {
            table: table.into(),
            field: field.clone(),
            kind,
        })
    }

    /// Field id as authored in Contentful
    pub fn field_id(&self) -> &str {
        &self.field.id
    }

    /// Table of the owning model
    pub fn table(&self) -> &str {
        &self.table
    }

    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Column name: lowercase snake case of the field id
    pub fn column(&self) -> String {
        inflect::snake(&self.field.id)
    }

    /// Accessor name: studly case of the column
    pub fn accessor(&self) -> String {
        inflect::studly(&self.column())
    }

    /// Relation descriptor for link fields
    pub fn relation(&self) -> Option<RelationDescriptor> {
        Some(RelationDescriptor {
            name: self.column(),
            table: RELATIONSHIPS_TABLE,
            cardinality: self.kind.cardinality()?,
            link_type: self.kind.link_type()?,
        })
    }

    /// Column type, `None` for relation fields
    pub const fn column_type(&self) -> Option<SqlType> {
        self.kind.sql_type()
    }

    pub fn cast(&self, raw: Option<&Value>) -> Value {
        self.kind.cast(raw)
    }

    pub fn link_ids(&self, raw: Option<&Value>) -> Vec<String> {
        self.kind.link_ids(raw)
    }

    /// Generated getter for the model
    pub fn model_getter(&self) -> String {
        Template::parse(self.kind.getter_stub()).render(&self.substitutions())
    }

    /// Generated documentation line for the model
    pub fn model_property(&self) -> String {
        format!(
            "/// * `{}` ({}): `{}`",
            self.column(),
            self.accessor(),
            self.kind.rust_type()
        )
    }

    /// Generated mapping statement for the mapper
    pub fn mapper_statement(&self) -> String {
        let stub = if self.kind.cardinality().is_some() {
            include_str!("../../templates/mapper/relation.stub")
        } else {
            include_str!("../../templates/mapper/column.stub")
        };
        Template::parse(stub).render(&self.substitutions())
    }

    fn substitutions(&self) -> Substitutions {
        Substitutions::new()
            .with("field", self.column())
            .with("field_studly", self.accessor())
            .with("field_id", self.field.id.clone())
            .with("table", self.table.clone())
            .with("kind", self.kind.rust_path())
    }
}
