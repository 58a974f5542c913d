//! Model definitions: the table a content type mirrors into and its columns

use serde::{Deserialize, Serialize};

/// Storage type of a mirrored column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlType {
    /// Plain text (symbols, long text, markdown)
    Text,
    /// Whole number
    Integer,
    /// Floating point number
    Real,
    /// 0/1 flag
    Boolean,
    /// JSON-encoded text (objects, locations, rich text, symbol lists)
    Json,
    /// ISO-8601 date string
    Timestamp,
}

impl SqlType {
    /// `SQLite` column type used in `CREATE TABLE`
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Text | Self::Json | Self::Timestamp => "TEXT",
            Self::Integer | Self::Boolean => "INTEGER",
            Self::Real => "REAL",
        }
    }

    /// Path of the variant in generated code
    pub const fn rust_path(self) -> &'static str {
        match self {
            Self::Text => "SqlType::Text",
            Self::Integer => "SqlType::Integer",
            Self::Real => "SqlType::Real",
            Self::Boolean => "SqlType::Boolean",
            Self::Json => "SqlType::Json",
            Self::Timestamp => "SqlType::Timestamp",
        }
    }
}

/// A mirrored column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (snake case field id)
    pub name: String,
    /// Storage type
    pub sql_type: SqlType,
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
        }
    }
}

/// The model a content type is mirrored into.
///
/// Besides `columns`, every table carries `id`, `contentful_id`,
/// `created_at`, and `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Studly model name (e.g. `BlogPost`)
    pub name: String,
    /// Table name (e.g. `blog_posts`)
    pub table: String,
    /// Content columns
    pub columns: Vec<Column>,
}

impl ModelDefinition {
    /// Create a definition without content columns
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns: Vec::new(),
        }
    }

    /// Add a column, replacing any previous column with the same name
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, sql_type: SqlType) -> Self {
        let name = name.into();
        self.columns.retain(|column| column.name != name);
        self.columns.push(Column { name, sql_type });
        self
    }

    /// Whether the model declares the column
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_column_replaces_duplicates() {
        let model = ModelDefinition::new("Article", "articles")
            .with_column("title", SqlType::Text)
            .with_column("title", SqlType::Json);
        assert_eq!(model.columns.len(), 1);
        assert_eq!(model.columns[0].sql_type, SqlType::Json);
        assert!(model.has_column("title"));
        assert!(!model.has_column("body"));
    }

    #[test]
    fn sql_types_map_to_sqlite_affinities() {
        assert_eq!(SqlType::Json.as_sql(), "TEXT");
        assert_eq!(SqlType::Boolean.as_sql(), "INTEGER");
        assert_eq!(SqlType::Real.as_sql(), "REAL");
    }
}
