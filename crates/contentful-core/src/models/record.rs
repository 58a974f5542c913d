//! Persisted mirror row

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

static NULL: Value = Value::Null;

/// One persisted row of a mirror table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Surrogate primary key
    pub id: i64,
    /// Contentful entry id (unique per table)
    pub contentful_id: String,
    /// Content column values
    pub values: BTreeMap<String, Value>,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl Record {
    /// Value of a column, `null` when the column is absent
    pub fn get(&self, column: &str) -> &Value {
        self.values.get(column).unwrap_or(&NULL)
    }
}
