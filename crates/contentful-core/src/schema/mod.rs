//! Content type schema and field definitions

mod content_type;
mod field;

pub use content_type::{ContentType, ContentTypeCollection, Field, FieldItems};
pub use field::{
    ArrayItems, Cardinality, FieldDefinition, FieldKind, LinkType, RelationDescriptor,
    RELATIONSHIPS_TABLE,
};

use crate::inflect;
use crate::models::{Column, ModelDefinition};

/// Resolve the usable fields of a content type, in schema order
pub fn definitions(table: &str, fields: &[Field]) -> Vec<FieldDefinition> {
    fields
        .iter()
        .filter_map(|field| {
            let definition = FieldDefinition::new(table, field);
            if definition.is_none() {
                tracing::debug!(
                    table,
                    field = %field.id,
                    field_type = %field.field_type,
                    "Skipping field without a definition"
                );
            }
            definition
        })
        .collect()
}

/// Table layout of a content type: one column per scalar field
pub fn model_definition(prefix: &str, content_type: &ContentType) -> ModelDefinition {
    let table = inflect::table_name(prefix, &content_type.id);
    let name = inflect::model_name(prefix, &content_type.id);

    definitions(&table, &content_type.fields)
        .iter()
        .filter_map(|definition| {
            definition
                .column_type()
                .map(|sql_type| Column::new(definition.column(), sql_type))
        })
        .fold(ModelDefinition::new(name, table.clone()), |model, column| {
            model.with_column(column.name, column.sql_type)
        })
}
